//! Error types for the aggregation engine.
//!
//! Only boundary violations are errors. Empty windows and empty charts are
//! ordinary results and never show up here.

use thiserror::Error;

/// A window selector that the caller should never have sent.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SelectorError {
    #[error("window selector must be non-negative, got {0}")]
    Negative(i64),
    #[error("window selector must be an integer day count or a preset name, got {0:?}")]
    NotAnInteger(String),
}

/// Why a raw log entry was excluded from every computation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MeasurementError {
    #[error("missing date")]
    MissingDate,
    #[error("unparseable date {0:?}")]
    InvalidDate(String),
    #[error("missing value (neither `value` nor `weight` present)")]
    MissingValue,
    #[error("non-numeric value {0:?}")]
    NonNumericValue(String),
    #[error("value {0} is negative or not finite")]
    OutOfRange(f64),
}
