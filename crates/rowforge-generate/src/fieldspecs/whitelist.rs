//! Weighted whitelists of concrete values.

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use rowforge_core::DataValue;

/// One admissible value and its relative selection weight.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct WeightedElement {
    pub value: DataValue,
    pub weight: Decimal,
}

/// Closed set of values a field may take, with per-value weights that
/// steer random selection.
///
/// Elements are kept sorted and duplicate values collapse to a single
/// element, so two whitelists with the same contents compare equal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Whitelist {
    elements: Vec<WeightedElement>,
}

impl Whitelist {
    pub fn uniform(values: impl IntoIterator<Item = DataValue>) -> Self {
        Self::weighted(values.into_iter().map(|value| (value, Decimal::ONE)))
    }

    pub fn weighted(entries: impl IntoIterator<Item = (DataValue, Decimal)>) -> Self {
        let mut elements: Vec<WeightedElement> = entries
            .into_iter()
            .map(|(value, weight)| WeightedElement { value, weight })
            .collect();
        elements.sort();
        elements.dedup_by(|later, first| later.value == first.value);
        Self { elements }
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn contains(&self, value: &DataValue) -> bool {
        self.elements.iter().any(|element| &element.value == value)
    }

    pub fn values(&self) -> impl Iterator<Item = &DataValue> + '_ {
        self.elements.iter().map(|element| &element.value)
    }

    pub fn elements(&self) -> &[WeightedElement] {
        &self.elements
    }

    /// Keeps only the values the predicate admits, preserving weights.
    pub fn filter(&self, mut keep: impl FnMut(&DataValue) -> bool) -> Self {
        Self {
            elements: self
                .elements
                .iter()
                .filter(|element| keep(&element.value))
                .cloned()
                .collect(),
        }
    }

    /// Values present in both lists, keeping this list's weights.
    pub fn intersect(&self, other: &Self) -> Self {
        self.filter(|value| other.contains(value))
    }

    /// Weighted random pick, `None` when empty.
    pub fn pick_random(&self, rng: &mut ChaCha8Rng) -> Option<&DataValue> {
        if self.elements.is_empty() {
            return None;
        }
        let total: f64 = self
            .elements
            .iter()
            .map(|element| element.weight.to_f64().unwrap_or(0.0).max(0.0))
            .sum();
        if total <= 0.0 {
            let index = rng.random_range(0..self.elements.len());
            return Some(&self.elements[index].value);
        }
        let target = rng.random_range(0.0..total);
        let mut cumulative = 0.0;
        for element in &self.elements {
            cumulative += element.weight.to_f64().unwrap_or(0.0).max(0.0);
            if target < cumulative {
                return Some(&element.value);
            }
        }
        self.elements.last().map(|element| &element.value)
    }
}
