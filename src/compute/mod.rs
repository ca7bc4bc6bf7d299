//! The variable algebra: construction, selection and arithmetic over scenarios.
pub mod error;
pub mod interp;
pub mod select;
pub mod var;
pub mod factory;

pub use error::VarError;
pub use interp::{Interpolator, LinearInterpolator};
pub use select::{Axis, AxisFilter, SelectQuery, Selection, SelectionKey};
pub use var::{DataContext, Operand, Var};
pub use factory::{DataVar, VarOptions};
