use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The closed set of generatable value types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataType {
    Numeric,
    String,
    DateTime,
}

impl DataType {
    pub const ALL: [DataType; 3] = [DataType::Numeric, DataType::String, DataType::DateTime];

    /// Registry name for this type.
    pub fn name(self) -> &'static str {
        match self {
            DataType::Numeric => "numeric",
            DataType::String => "string",
            DataType::DateTime => "datetime",
        }
    }

    /// Whether a value belongs to this type. `Null` belongs to none.
    pub fn matches(self, value: &DataValue) -> bool {
        value.data_type() == Some(self)
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single generated or constrained value.
///
/// All numeric values use [`Decimal`], never floats, so values are totally
/// ordered and hashable and usable inside constraint payloads and
/// deterministic sets.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataValue {
    Null,
    Numeric(Decimal),
    String(String),
    DateTime(NaiveDateTime),
}

impl DataValue {
    pub fn is_null(&self) -> bool {
        matches!(self, DataValue::Null)
    }

    /// The type of this value, or `None` for `Null`.
    pub fn data_type(&self) -> Option<DataType> {
        match self {
            DataValue::Null => None,
            DataValue::Numeric(_) => Some(DataType::Numeric),
            DataValue::String(_) => Some(DataType::String),
            DataValue::DateTime(_) => Some(DataType::DateTime),
        }
    }

    pub fn as_decimal(&self) -> Option<Decimal> {
        match self {
            DataValue::Numeric(d) => Some(*d),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            DataValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_datetime(&self) -> Option<NaiveDateTime> {
        match self {
            DataValue::DateTime(dt) => Some(*dt),
            _ => None,
        }
    }
}

impl fmt::Display for DataValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataValue::Null => f.write_str("null"),
            DataValue::Numeric(d) => write!(f, "{d}"),
            DataValue::String(s) => f.write_str(s),
            DataValue::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%dT%H:%M:%S%.3f")),
        }
    }
}

impl From<Decimal> for DataValue {
    fn from(value: Decimal) -> Self {
        DataValue::Numeric(value)
    }
}

impl From<i64> for DataValue {
    fn from(value: i64) -> Self {
        DataValue::Numeric(Decimal::from(value))
    }
}

impl From<&str> for DataValue {
    fn from(value: &str) -> Self {
        DataValue::String(value.to_string())
    }
}

impl From<String> for DataValue {
    fn from(value: String) -> Self {
        DataValue::String(value)
    }
}

impl From<NaiveDateTime> for DataValue {
    fn from(value: NaiveDateTime) -> Self {
        DataValue::DateTime(value)
    }
}
