// Crate root: the scenario variable algebra.
// `prep` turns a raw scenario export into the snapshots in `store`,
// `compute` builds variables on top of them and `config` holds the tables
// that parameterise both.

pub mod store;
pub mod config;
pub mod compute;
pub mod prep;

pub use compute::{AxisFilter, DataVar, Operand, SelectQuery, Selection, Var, VarError, VarOptions};
pub use config::Catalog;
pub use store::{Category, Operation, ScenarioName, YearKey, Years};
