use std::collections::BTreeSet;
use std::fmt;

use rowforge_core::DataValue;

/// Values a field must never take.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlacklistRestrictions {
    pub values: BTreeSet<DataValue>,
}

impl BlacklistRestrictions {
    pub fn of(values: impl IntoIterator<Item = DataValue>) -> Self {
        Self {
            values: values.into_iter().collect(),
        }
    }

    pub fn excludes(&self, value: &DataValue) -> bool {
        self.values.contains(value)
    }

    /// Union. Two blacklists can never contradict each other.
    pub fn merge(&self, other: &Self) -> Self {
        Self {
            values: self.values.union(&other.values).cloned().collect(),
        }
    }
}

impl fmt::Display for BlacklistRestrictions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "not in set of {}", self.values.len())
    }
}
