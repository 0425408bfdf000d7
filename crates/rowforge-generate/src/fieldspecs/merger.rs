//! Pairwise merging of field specs.

use crate::fieldspecs::{FieldSpec, Whitelist};
use crate::restrictions::MergeResult;

/// Conjoins two field specs into one that admits exactly the values both
/// admit.
///
/// `None` means the pair is contradictory. A whitelist that filters down
/// to nothing merges into the null-only spec while null remains allowed;
/// with null ruled out as well, no value exists and the pair is
/// contradictory.
#[derive(Debug, Clone, Default)]
pub struct FieldSpecMerger;

impl FieldSpecMerger {
    pub fn new() -> Self {
        Self
    }

    pub fn merge(&self, a: &FieldSpec, b: &FieldSpec) -> Option<FieldSpec> {
        let source = a.source().combine(b.source());
        let nullable = a.is_nullable() && b.is_nullable();
        let formatting = a
            .formatting()
            .or(b.formatting())
            .map(str::to_string);

        let merged = match (a.whitelist(), b.whitelist()) {
            (Some(left), Some(right)) => FieldSpec::from_whitelist(left.intersect(right)),
            (Some(whitelist), None) => FieldSpec::from_whitelist(filtered(whitelist, b)),
            (None, Some(whitelist)) => FieldSpec::from_whitelist(filtered(whitelist, a)),
            (None, None) => {
                let types = merge_slot(a.types(), b.types(), |x, y| x.merge(y)).ok()?;
                let numeric = merge_slot(a.numeric(), b.numeric(), |x, y| x.merge(y)).ok()?;
                let datetime = merge_slot(a.datetime(), b.datetime(), |x, y| x.merge(y)).ok()?;
                let string = merge_slot(a.string(), b.string(), |x, y| x.merge(y)).ok()?;
                // Blacklist union cannot fail.
                let blacklist = match (a.blacklist(), b.blacklist()) {
                    (Some(x), Some(y)) => Some(x.merge(y)),
                    (x, y) => x.or(y).cloned(),
                };
                let mut spec = FieldSpec::empty();
                if let Some(types) = types {
                    spec = spec.with_types(types);
                }
                if let Some(numeric) = numeric {
                    spec = spec.with_numeric(numeric);
                }
                if let Some(datetime) = datetime {
                    spec = spec.with_datetime(datetime);
                }
                if let Some(string) = string {
                    spec = spec.with_string(string);
                }
                if let Some(blacklist) = blacklist {
                    spec = spec.with_blacklist(blacklist);
                }
                spec
            }
        };

        if !nullable
            && merged
                .whitelist()
                .is_some_and(|whitelist| whitelist.is_empty())
        {
            return None;
        }

        let merged = if nullable { merged } else { merged.not_nullable() };
        let merged = match formatting {
            Some(formatting) => merged.with_formatting(formatting),
            None => merged,
        };
        Some(merged.with_source(source))
    }
}

/// Whitelist values the restriction-side spec still admits.
fn filtered(whitelist: &Whitelist, restrictions: &FieldSpec) -> Whitelist {
    whitelist.filter(|value| {
        restrictions.permits(value)
            && !restrictions
                .blacklist()
                .is_some_and(|blacklist| blacklist.excludes(value))
    })
}

fn merge_slot<T: Clone>(
    a: Option<&T>,
    b: Option<&T>,
    merge: impl FnOnce(&T, &T) -> MergeResult<T>,
) -> MergeResult<Option<T>> {
    match (a, b) {
        (None, None) => MergeResult::Success(None),
        (Some(only), None) | (None, Some(only)) => MergeResult::Success(Some(only.clone())),
        (Some(x), Some(y)) => merge(x, y).map(Some),
    }
}
