use std::collections::BTreeSet;
use std::fmt;

use rowforge_core::DataType;

use super::MergeResult;

/// The value types a field may take.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeRestrictions {
    allowed: BTreeSet<DataType>,
}

impl TypeRestrictions {
    /// All generatable types.
    pub fn any() -> Self {
        Self {
            allowed: DataType::ALL.into_iter().collect(),
        }
    }

    /// Exactly one type.
    pub fn of(data_type: DataType) -> Self {
        Self {
            allowed: BTreeSet::from([data_type]),
        }
    }

    /// Every type except the given one.
    pub fn excluding(data_type: DataType) -> Self {
        Self {
            allowed: DataType::ALL
                .into_iter()
                .filter(|t| *t != data_type)
                .collect(),
        }
    }

    pub fn is_allowed(&self, data_type: DataType) -> bool {
        self.allowed.contains(&data_type)
    }

    pub fn allowed(&self) -> impl Iterator<Item = DataType> + '_ {
        self.allowed.iter().copied()
    }

    /// Intersection. An empty intersection is a contradiction.
    pub fn merge(&self, other: &Self) -> MergeResult<Self> {
        let allowed: BTreeSet<DataType> = self
            .allowed
            .intersection(&other.allowed)
            .copied()
            .collect();
        if allowed.is_empty() {
            MergeResult::Contradiction
        } else {
            MergeResult::Success(Self { allowed })
        }
    }
}

impl fmt::Display for TypeRestrictions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.allowed.iter().map(|t| t.name()).collect();
        write!(f, "type {}", names.join("|"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merging_intersects_the_allowed_sets() {
        let not_numeric = TypeRestrictions::excluding(DataType::Numeric);
        let not_datetime = TypeRestrictions::excluding(DataType::DateTime);
        let merged = not_numeric.merge(&not_datetime).ok().expect("string remains");
        assert!(merged.is_allowed(DataType::String));
        assert!(!merged.is_allowed(DataType::Numeric));
        assert!(!merged.is_allowed(DataType::DateTime));
    }

    #[test]
    fn disjoint_type_sets_contradict() {
        let numeric = TypeRestrictions::of(DataType::Numeric);
        let string = TypeRestrictions::of(DataType::String);
        assert!(numeric.merge(&string).is_contradiction());
    }
}
