//! String production for compiled string restrictions.
//!
//! A [`StringGenerator`] is built once per field spec and then drives both
//! random sampling and exhaustive enumeration. Candidates always pass back
//! through the restriction matcher, so pattern sampling never emits a value
//! the spec would reject.

pub mod standards;

use std::collections::BTreeSet;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_regex::Regex as RandRegex;
use tracing::warn;

use rowforge_core::StandardType;

use crate::defaults::DEFAULT_MAX_STRING_LENGTH;
use crate::errors::GenerationError;
use crate::restrictions::{StringRestrictions, TextualRestrictions};

/// Bound on `*`/`+` repetitions when sampling from a pattern.
pub(crate) const DEFAULT_MAX_REPEAT: u32 = 32;
/// Consecutive rejected candidates before a random stream gives up.
const GENERATION_ATTEMPT_LIMIT: u32 = 1000;
/// Upper bound on values emitted by exhaustive string enumeration.
const EXHAUSTIVE_VALUE_CAP: usize = 10_000;
// Fixed seed keeps exhaustive output stable between runs.
const EXHAUSTIVE_SAMPLE_SEED: u64 = 0;

const CHARSET: &str = "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Produces strings satisfying one field's merged string restrictions.
#[derive(Debug, Clone)]
pub struct StringGenerator {
    restrictions: StringRestrictions,
    excluded_values: BTreeSet<String>,
    samplers: Vec<RandRegex>,
    standard: Option<StandardType>,
    min_length: u32,
    max_length: u32,
    charset: Vec<char>,
}

impl StringGenerator {
    /// Compiles restrictions into a generator, building pattern samplers
    /// up front so an unsupported pattern fails before any value is drawn.
    pub fn from_restrictions(
        restrictions: Option<&StringRestrictions>,
        excluded_values: BTreeSet<String>,
    ) -> Result<Self, GenerationError> {
        let restrictions = restrictions
            .cloned()
            .unwrap_or_else(|| StringRestrictions::Textual(TextualRestrictions::default()));
        let mut samplers = Vec::new();
        let mut standard = None;
        let mut min_length = 0;
        let mut max_length = DEFAULT_MAX_STRING_LENGTH;
        match &restrictions {
            StringRestrictions::Standard(kind) => {
                standard = Some(*kind);
                if let Some(length) = standards::code_length(*kind) {
                    min_length = length;
                    max_length = length;
                }
            }
            StringRestrictions::Textual(textual) => {
                min_length = textual.min_length.unwrap_or(0);
                max_length = textual.max_length.unwrap_or(DEFAULT_MAX_STRING_LENGTH);
                for pattern in &textual.matching_patterns {
                    samplers.push(compile_sampler(without_anchors(pattern))?);
                }
                for pattern in &textual.containing_patterns {
                    let padded = format!(".*(?:{}).*", without_anchors(pattern));
                    samplers.push(compile_sampler(&padded)?);
                }
            }
        }
        Ok(Self {
            restrictions,
            excluded_values,
            samplers,
            standard,
            min_length,
            max_length,
            charset: CHARSET.chars().collect(),
        })
    }

    /// Whether a candidate satisfies every restriction and exclusion.
    pub fn accepts(&self, candidate: &str) -> bool {
        !self.excluded_values.contains(candidate) && self.restrictions.matches(candidate)
    }

    /// Endless random stream of accepted strings.
    ///
    /// Gives up after a run of consecutive rejections, so an effectively
    /// empty string space terminates instead of spinning.
    pub fn random_values(&self, rng: ChaCha8Rng) -> Box<dyn Iterator<Item = String>> {
        Box::new(RandomStrings {
            generator: self.clone(),
            rng,
            exhausted: false,
        })
    }

    /// Bounded exhaustive stream.
    ///
    /// Pattern-free restrictions enumerate charset strings shortest first.
    /// Patterns and standards have no cheap enumeration order, so those
    /// fall back to deduplicated sampling from a fixed seed.
    pub fn all_values(&self) -> Box<dyn Iterator<Item = String>> {
        if self.standard.is_some() || !self.samplers.is_empty() {
            return Box::new(SampledDistinct {
                inner: RandomStrings {
                    generator: self.clone(),
                    rng: ChaCha8Rng::seed_from_u64(EXHAUSTIVE_SAMPLE_SEED),
                    exhausted: false,
                },
                seen: BTreeSet::new(),
                produced: 0,
            });
        }
        let length = self.min_length;
        Box::new(CharsetEnumeration {
            generator: self.clone(),
            indices: vec![0; length as usize],
            length,
            produced: 0,
            done: false,
        })
    }

    fn candidate(&self, rng: &mut ChaCha8Rng) -> String {
        if let Some(standard) = self.standard {
            return standards::random_code(standard, rng);
        }
        if !self.samplers.is_empty() {
            let index = rng.random_range(0..self.samplers.len());
            return rng.sample(&self.samplers[index]);
        }
        let length = rng.random_range(self.min_length..=self.max_length);
        (0..length)
            .map(|_| self.charset[rng.random_range(0..self.charset.len())])
            .collect()
    }
}

struct RandomStrings {
    generator: StringGenerator,
    rng: ChaCha8Rng,
    exhausted: bool,
}

impl Iterator for RandomStrings {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        if self.exhausted {
            return None;
        }
        for _ in 0..GENERATION_ATTEMPT_LIMIT {
            let candidate = self.generator.candidate(&mut self.rng);
            if self.generator.accepts(&candidate) {
                return Some(candidate);
            }
        }
        self.exhausted = true;
        warn!(
            attempts = GENERATION_ATTEMPT_LIMIT,
            "string restrictions rejected every sampled candidate, ending stream"
        );
        None
    }
}

struct SampledDistinct {
    inner: RandomStrings,
    seen: BTreeSet<String>,
    produced: usize,
}

impl Iterator for SampledDistinct {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        if self.produced >= EXHAUSTIVE_VALUE_CAP {
            return None;
        }
        // Duplicates do not count as rejections upstream, so bound the
        // search for a fresh value separately.
        for _ in 0..GENERATION_ATTEMPT_LIMIT {
            let candidate = self.inner.next()?;
            if self.seen.insert(candidate.clone()) {
                self.produced += 1;
                return Some(candidate);
            }
        }
        None
    }
}

struct CharsetEnumeration {
    generator: StringGenerator,
    indices: Vec<usize>,
    length: u32,
    produced: usize,
    done: bool,
}

impl CharsetEnumeration {
    fn advance(&mut self) {
        let charset_len = self.generator.charset.len();
        let mut position = self.indices.len();
        loop {
            if position == 0 {
                self.length += 1;
                if self.length > self.generator.max_length {
                    self.done = true;
                } else {
                    self.indices = vec![0; self.length as usize];
                }
                return;
            }
            position -= 1;
            self.indices[position] += 1;
            if self.indices[position] < charset_len {
                return;
            }
            self.indices[position] = 0;
        }
    }
}

impl Iterator for CharsetEnumeration {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        loop {
            if self.done || self.produced >= EXHAUSTIVE_VALUE_CAP {
                return None;
            }
            let candidate: String = self
                .indices
                .iter()
                .map(|&index| self.generator.charset[index])
                .collect();
            self.advance();
            if self.generator.accepts(&candidate) {
                self.produced += 1;
                return Some(candidate);
            }
        }
    }
}

/// Checks a profile pattern compiles, and when it will be used to drive
/// generation, that it can also be sampled from.
pub(crate) fn validate_pattern(pattern: &str, sampled: bool) -> Result<(), GenerationError> {
    regex::Regex::new(&format!("^(?:{pattern})$")).map_err(|err| {
        GenerationError::InvalidProfile(format!("invalid regex '{pattern}': {err}"))
    })?;
    if sampled {
        compile_sampler(without_anchors(pattern))?;
    }
    Ok(())
}

fn compile_sampler(pattern: &str) -> Result<RandRegex, GenerationError> {
    RandRegex::compile(pattern, DEFAULT_MAX_REPEAT).map_err(|err| {
        GenerationError::Unsupported(format!(
            "pattern '{pattern}' cannot drive string generation: {err}"
        ))
    })
}

/// Strips explicit `^`/`$` anchors so a pattern can be fed to the sampler,
/// which already generates whole matches.
fn without_anchors(pattern: &str) -> &str {
    let pattern = pattern.strip_prefix('^').unwrap_or(pattern);
    match pattern.strip_suffix('$') {
        Some(head) if !head.ends_with('\\') => head,
        _ => pattern,
    }
}
