//! The immutable snapshots the variable layer reads from.
pub mod types;
pub mod dataset;
pub mod universe;
pub mod table;

pub use types::{Category, Operation, ScenarioName, YearKey, Years};
pub use dataset::{DataRow, Dataset};
pub use universe::{ScenarioMeta, ScenarioUniverse};
pub use table::ValueTable;
