//! Bounds applied when a profile leaves a field open-ended.

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;

/// Largest numeric value generated without an explicit upper bound.
/// Equals 100_000_000_000_000_000_000 (1e20) at scale 0.
pub const NUMERIC_MAX: Decimal = Decimal::from_parts(0x6310_0000, 0x6BC7_5E2D, 0x5, false, 0);

/// Smallest numeric value generated without an explicit lower bound.
/// Equals -100_000_000_000_000_000_000 (-1e20) at scale 0.
pub const NUMERIC_MIN: Decimal = Decimal::from_parts(0x6310_0000, 0x6BC7_5E2D, 0x5, true, 0);

/// Decimal places generated when no numeric granularity is declared.
pub const DEFAULT_DECIMAL_PLACES: u32 = 0;

/// Longest string generated without an explicit length bound.
pub const DEFAULT_MAX_STRING_LENGTH: u32 = 1000;

/// Row cap applied to random generation when none is configured.
pub const DEFAULT_ROW_LIMIT: u64 = 1000;

/// Earliest datetime generated without an explicit lower bound.
pub fn datetime_min() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(1, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap_or(NaiveDateTime::MIN)
}

/// Latest datetime generated without an explicit upper bound.
pub fn datetime_max() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(9999, 12, 31)
        .and_then(|d| d.and_hms_milli_opt(23, 59, 59, 999))
        .unwrap_or(NaiveDateTime::MAX)
}
