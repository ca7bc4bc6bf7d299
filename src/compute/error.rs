use crate::store::{YearKey, Years};
use super::select::Axis;
use thiserror::Error;

/// Usage errors of the variable layer. None of them are transient; each one
/// aborts the call that detected it before anything is built.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum VarError {
    #[error("A variable needs exactly one of a variable name or a values table, got {0}")]
    AmbiguousConstruction(&'static str),
    #[error("{value} is not a valid {axis} [{allowed}]")]
    InvalidFilterValue { axis: Axis, value: String, allowed: String },
    #[error("{0} selection filter not implemented yet")]
    NotImplementedFilter(Axis),
    #[error("Years of left var ({left}) not compatible with ({right})")]
    IncompatibleYears { left: Years, right: Years },
    #[error("Year '{0}' is not numeric and cannot be interpolated")]
    InvalidYear(YearKey),
    #[error("Known years missing from the dataset: {0}")]
    KnownYearsMissing(String),
    #[error("Interpolating '{variable}' at {year} failed: {msg}")]
    Interpolation { variable: String, year: YearKey, msg: String },
}
