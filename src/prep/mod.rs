//! Preprocessing of the raw scenario export: derived variables, unit
//! harmonisation and the scenario universe with its summary statistics.

pub mod derived;
pub mod units;
pub mod metadata;
pub mod import;

use crate::compute::VarError;
use thiserror::Error;

pub use derived::{create_extra_variables, create_variable, DerivedVariable, CO2, KYOTO};
pub use units::convert_units;
pub use metadata::{build_universe, VettingRecord, CUM_CO2, GHG_2030, NET_NEGATIVE, PEAK_CUM_CO2};
pub use import::{import, load};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PrepError {
    #[error("Variable '{0}' already exists")]
    DuplicateVariable(String),
    #[error("Dataset has no year columns")]
    EmptyDataset,
    #[error(transparent)]
    Var(#[from] VarError),
}
