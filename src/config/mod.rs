//! Process-wide configuration tables.
pub mod catalog;

pub use catalog::{Catalog, CatalogError, MarkerScenario, UnitConversion, YearRange};
