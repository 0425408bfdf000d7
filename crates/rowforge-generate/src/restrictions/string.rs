use std::collections::BTreeSet;
use std::fmt;

use rowforge_core::StandardType;

use crate::strings::standards;

use super::MergeResult;

/// Structural description of the strings a field admits.
///
/// A field is either free-form text under [`TextualRestrictions`] or a
/// fixed-format financial code. Negated standards fold into the textual
/// side as exclusions, so `Standard` is always positive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StringRestrictions {
    Textual(TextualRestrictions),
    Standard(StandardType),
}

/// Conjunction of free-form string requirements.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextualRestrictions {
    pub min_length: Option<u32>,
    pub max_length: Option<u32>,
    pub excluded_lengths: BTreeSet<u32>,
    /// Whole string must match every pattern.
    pub matching_patterns: BTreeSet<String>,
    /// Every pattern must occur somewhere in the string.
    pub containing_patterns: BTreeSet<String>,
    pub not_matching_patterns: BTreeSet<String>,
    pub not_containing_patterns: BTreeSet<String>,
    pub excluded_standards: BTreeSet<StandardType>,
}

impl TextualRestrictions {
    pub fn with_length(length: u32) -> Self {
        Self {
            min_length: Some(length),
            max_length: Some(length),
            ..Self::default()
        }
    }

    pub fn has_patterns(&self) -> bool {
        !self.matching_patterns.is_empty()
            || !self.containing_patterns.is_empty()
            || !self.not_matching_patterns.is_empty()
            || !self.not_containing_patterns.is_empty()
    }

    fn merge(&self, other: &Self) -> MergeResult<Self> {
        let min_length = match (self.min_length, other.min_length) {
            (Some(a), Some(b)) => Some(a.max(b)),
            (a, b) => a.or(b),
        };
        let max_length = match (self.max_length, other.max_length) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        };
        if let (Some(lo), Some(hi)) = (min_length, max_length)
            && lo > hi
        {
            return MergeResult::Contradiction;
        }
        MergeResult::Success(Self {
            min_length,
            max_length,
            excluded_lengths: union(&self.excluded_lengths, &other.excluded_lengths),
            matching_patterns: union(&self.matching_patterns, &other.matching_patterns),
            containing_patterns: union(&self.containing_patterns, &other.containing_patterns),
            not_matching_patterns: union(&self.not_matching_patterns, &other.not_matching_patterns),
            not_containing_patterns: union(
                &self.not_containing_patterns,
                &other.not_containing_patterns,
            ),
            excluded_standards: union(&self.excluded_standards, &other.excluded_standards),
        })
    }

    fn admits_length(&self, length: u32) -> bool {
        if self.excluded_lengths.contains(&length) {
            return false;
        }
        if let Some(min) = self.min_length
            && length < min
        {
            return false;
        }
        if let Some(max) = self.max_length
            && length > max
        {
            return false;
        }
        true
    }
}

impl StringRestrictions {
    /// A negated standard, expressed as a textual exclusion.
    pub fn excluding_standard(standard: StandardType) -> Self {
        StringRestrictions::Textual(TextualRestrictions {
            excluded_standards: BTreeSet::from([standard]),
            ..TextualRestrictions::default()
        })
    }

    /// Conjoins two string descriptions.
    ///
    /// A standard merges with textual restrictions only when the textual
    /// side carries no pattern requirements and its length window admits
    /// the code length.
    pub fn merge(&self, other: &Self) -> MergeResult<Self> {
        match (self, other) {
            (StringRestrictions::Textual(a), StringRestrictions::Textual(b)) => {
                a.merge(b).map(StringRestrictions::Textual)
            }
            (StringRestrictions::Standard(a), StringRestrictions::Standard(b)) => {
                if a == b {
                    MergeResult::Success(StringRestrictions::Standard(*a))
                } else {
                    MergeResult::Contradiction
                }
            }
            (StringRestrictions::Standard(standard), StringRestrictions::Textual(textual))
            | (StringRestrictions::Textual(textual), StringRestrictions::Standard(standard)) => {
                merge_standard_with_textual(*standard, textual)
            }
        }
    }

    /// Whether a concrete string satisfies this description.
    ///
    /// Patterns are validated when constraints are compiled, so a pattern
    /// that fails to compile here matches nothing.
    pub fn matches(&self, value: &str) -> bool {
        match self {
            StringRestrictions::Standard(standard) => standards::is_valid_code(*standard, value),
            StringRestrictions::Textual(textual) => {
                let length = value.chars().count() as u32;
                if !textual.admits_length(length) {
                    return false;
                }
                if !textual
                    .matching_patterns
                    .iter()
                    .all(|p| whole_match(p, value))
                {
                    return false;
                }
                if !textual
                    .containing_patterns
                    .iter()
                    .all(|p| found_anywhere(p, value))
                {
                    return false;
                }
                if textual
                    .not_matching_patterns
                    .iter()
                    .any(|p| whole_match(p, value))
                {
                    return false;
                }
                if textual
                    .not_containing_patterns
                    .iter()
                    .any(|p| found_anywhere(p, value))
                {
                    return false;
                }
                !textual
                    .excluded_standards
                    .iter()
                    .any(|s| standards::is_valid_code(*s, value))
            }
        }
    }
}

impl fmt::Display for StringRestrictions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StringRestrictions::Standard(standard) => write!(f, "string {standard:?}"),
            StringRestrictions::Textual(t) => {
                let mut parts = Vec::new();
                if let Some(min) = t.min_length {
                    parts.push(format!("len>={min}"));
                }
                if let Some(max) = t.max_length {
                    parts.push(format!("len<={max}"));
                }
                if t.has_patterns() {
                    parts.push(format!(
                        "{} pattern(s)",
                        t.matching_patterns.len()
                            + t.containing_patterns.len()
                            + t.not_matching_patterns.len()
                            + t.not_containing_patterns.len()
                    ));
                }
                write!(f, "string {}", parts.join(" "))
            }
        }
    }
}

fn merge_standard_with_textual(
    standard: StandardType,
    textual: &TextualRestrictions,
) -> MergeResult<StringRestrictions> {
    if textual.has_patterns() || textual.excluded_standards.contains(&standard) {
        return MergeResult::Contradiction;
    }
    match standards::code_length(standard) {
        Some(length) if textual.admits_length(length) => {
            MergeResult::Success(StringRestrictions::Standard(standard))
        }
        _ => MergeResult::Contradiction,
    }
}

fn whole_match(pattern: &str, value: &str) -> bool {
    regex::Regex::new(&format!("^(?:{pattern})$"))
        .map(|re| re.is_match(value))
        .unwrap_or(false)
}

fn found_anywhere(pattern: &str, value: &str) -> bool {
    regex::Regex::new(pattern)
        .map(|re| re.is_match(value))
        .unwrap_or(false)
}

fn union<T: Clone + Ord>(a: &BTreeSet<T>, b: &BTreeSet<T>) -> BTreeSet<T> {
    a.union(b).cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn textual(textual: TextualRestrictions) -> StringRestrictions {
        StringRestrictions::Textual(textual)
    }

    #[test]
    fn length_windows_tighten_and_invert_to_a_contradiction() {
        let short = textual(TextualRestrictions {
            max_length: Some(4),
            ..TextualRestrictions::default()
        });
        let long = textual(TextualRestrictions {
            min_length: Some(2),
            ..TextualRestrictions::default()
        });
        let merged = short.merge(&long).ok().expect("compatible windows");
        let StringRestrictions::Textual(merged) = merged else {
            panic!("textual merge changed shape");
        };
        assert_eq!(merged.min_length, Some(2));
        assert_eq!(merged.max_length, Some(4));

        let too_long = textual(TextualRestrictions {
            min_length: Some(5),
            ..TextualRestrictions::default()
        });
        assert!(short.merge(&too_long).is_contradiction());
    }

    #[test]
    fn a_standard_merges_only_into_an_admitting_length_window() {
        let isin = StringRestrictions::Standard(StandardType::Isin);
        let wide = textual(TextualRestrictions {
            max_length: Some(20),
            ..TextualRestrictions::default()
        });
        assert_eq!(
            isin.merge(&wide).ok(),
            Some(StringRestrictions::Standard(StandardType::Isin))
        );
        assert!(
            isin.merge(&textual(TextualRestrictions::with_length(5)))
                .is_contradiction()
        );
        assert!(
            isin.merge(&StringRestrictions::excluding_standard(StandardType::Isin))
                .is_contradiction()
        );
    }

    #[test]
    fn disagreeing_standards_contradict() {
        let isin = StringRestrictions::Standard(StandardType::Isin);
        let sedol = StringRestrictions::Standard(StandardType::Sedol);
        assert!(isin.merge(&sedol).is_contradiction());
        assert!(!isin.merge(&isin.clone()).is_contradiction());
    }

    #[test]
    fn matches_rejects_excluded_standards_and_failed_patterns() {
        let not_isin = StringRestrictions::excluding_standard(StandardType::Isin);
        assert!(!not_isin.matches("US0378331005"));
        assert!(not_isin.matches("plain text"));

        let patterned = textual(TextualRestrictions {
            matching_patterns: BTreeSet::from(["[a-z]+".to_string()]),
            not_containing_patterns: BTreeSet::from(["q".to_string()]),
            ..TextualRestrictions::default()
        });
        assert!(patterned.matches("abc"));
        assert!(!patterned.matches("abq"));
        assert!(!patterned.matches("ABC"));
    }
}
