//! var.rs
//! A named, year-indexed quantity over the scenario universe.

use crate::config::Catalog;
use crate::store::{Dataset, Operation, ScenarioUniverse, ValueTable, YearKey, Years};
use super::error::VarError;
use super::interp::Interpolator;
use super::select::{self, Selection, SelectQuery};
use std::borrow::Cow;
use std::collections::HashSet;
use std::fmt;
use std::ops::{Add, Div, Mul, Sub};
use std::sync::Arc;
use tracing::debug;

/// The immutable snapshots every variable is defined against.
#[derive(Debug)]
pub struct DataContext {
    pub dataset: Dataset,
    pub scenarios: ScenarioUniverse,
    pub vetted_scenarios: ScenarioUniverse,
    pub catalog: Catalog,
    pub interpolator: Arc<dyn Interpolator>,
}

/// The right-hand side of an arithmetic operation.
#[derive(Debug, Clone, Copy)]
pub enum Operand<'a> {
    Scalar(f64),
    Variable(&'a Var),
}

impl From<f64> for Operand<'_> {
    fn from(v: f64) -> Self { Operand::Scalar(v) }
}

impl<'a> From<&'a Var> for Operand<'a> {
    fn from(v: &'a Var) -> Self { Operand::Variable(v) }
}

/// A variable: values per scenario for one year (scalar mode) or an ordered
/// list of years (vector mode).
///
/// Variables never change after construction. Arithmetic returns new
/// variables; `select` returns a filtered view.
#[derive(Debug, Clone)]
pub struct Var {
    ctx: Arc<DataContext>,
    variable: Option<String>,
    years: Years,
    values: ValueTable,
    default: Option<f64>,
}

impl Var {
    /// Builds a variable from exactly one source: a variable name looked up in
    /// the dataset, or an explicit values table. `years` only applies to the
    /// name lookup; a table carries its own year shape.
    pub fn new(
        ctx: Arc<DataContext>,
        variable: Option<&str>,
        years: Option<Years>,
        values: Option<ValueTable>,
        default: Option<f64>,
    ) -> Result<Self, VarError> {
        let (years, table) = match (variable, values) {
            (Some(_), Some(_)) => return Err(VarError::AmbiguousConstruction("both")),
            (None, None) => return Err(VarError::AmbiguousConstruction("neither")),
            (Some(name), None) => Self::lookup(&ctx, name, years)?,
            (None, Some(table)) => (table.years(), table),
        };

        let values = match default {
            Some(fill) => table.fill_missing(fill),
            None => table,
        };

        Ok(Self { ctx, variable: variable.map(String::from), years, values, default })
    }

    pub fn from_values(ctx: Arc<DataContext>, values: ValueTable, default: Option<f64>) -> Result<Self, VarError> {
        Self::new(ctx, None, None, Some(values), default)
    }

    /// Reads `name` from the dataset at the requested years. Known years are
    /// copied; any other year is asked of the interpolator.
    fn lookup(ctx: &DataContext, name: &str, years: Option<Years>) -> Result<(Years, ValueTable), VarError> {
        let requested = years.unwrap_or_else(|| Years::Multiple(ctx.catalog.known_years.clone()));
        let (known, to_interp): (Vec<YearKey>, Vec<YearKey>) =
            requested.to_vec().into_iter().partition(|y| ctx.catalog.is_known_year(y));

        let dataset = &ctx.dataset;
        let positions: Vec<Option<usize>> = known.iter().map(|y| dataset.year_position(y)).collect();
        let mut table = ValueTable::frame(known);
        for row in dataset.rows_for(name) {
            let values = positions.iter().map(|p| p.map_or(f64::NAN, |i| row.values[i])).collect();
            table.push_row(row.name.clone(), values);
        }

        for year in to_interp {
            let x = year.to_f64().ok_or_else(|| VarError::InvalidYear(year.clone()))?;
            let column = ctx.interpolator.interpolate(dataset, name, x)?;
            table = table.with_column(year, &column);
        }

        let table = table.select_columns(&requested);
        debug!(variable = name, years = %requested, scenarios = table.len(), "variable loaded");
        Ok((requested, table))
    }

    // --- Accessors ---

    pub fn variable(&self) -> Option<&str> { self.variable.as_deref() }
    pub fn years(&self) -> &Years { &self.years }
    pub fn values(&self) -> &ValueTable { &self.values }
    pub fn default(&self) -> Option<f64> { self.default }
    pub fn context(&self) -> &Arc<DataContext> { &self.ctx }
    pub fn is_single_year(&self) -> bool { self.years.is_single() }
    pub fn len(&self) -> usize { self.values.len() }
    pub fn is_empty(&self) -> bool { self.values.is_empty() }

    /// Filters scenarios by category, IP and SSP and annotates the result.
    pub fn select(&self, query: &SelectQuery) -> Result<Selection, VarError> {
        select::select(
            &self.values,
            &self.ctx.scenarios,
            &self.ctx.vetted_scenarios,
            &self.ctx.catalog,
            query,
        )
    }

    // --- Arithmetic ---

    /// `self op rhs`, year shapes harmonised first. The result inherits this
    /// variable's default.
    pub fn apply<'a>(&self, op: Operation, rhs: impl Into<Operand<'a>>) -> Result<Var, VarError> {
        let combined = match rhs.into() {
            Operand::Scalar(s) => self.values.map(|v| op.apply(v, s)),
            Operand::Variable(other) => {
                let (lhs, rhs) = self.harmonise(other)?;
                lhs.combine(&rhs, op)
            }
        };
        Var::from_values(self.ctx.clone(), combined, self.default)
    }

    /// Brings both tables to a common year shape. A single-year side is
    /// replicated across the other side's years; two multi-year sides must
    /// cover the same set of years.
    fn harmonise<'s>(&'s self, other: &'s Var) -> Result<(Cow<'s, ValueTable>, Cow<'s, ValueTable>), VarError> {
        match (&self.years, &other.years) {
            (Years::Multiple(left), Years::Multiple(right)) => {
                let l: HashSet<&YearKey> = left.iter().collect();
                let r: HashSet<&YearKey> = right.iter().collect();
                if l != r {
                    return Err(VarError::IncompatibleYears { left: self.years.clone(), right: other.years.clone() });
                }
                Ok((Cow::Borrowed(&self.values), Cow::Borrowed(&other.values)))
            }
            (Years::Multiple(left), Years::Single(_)) => {
                Ok((Cow::Borrowed(&self.values), Cow::Owned(other.values.broadcast(left))))
            }
            (Years::Single(_), Years::Multiple(right)) => {
                Ok((Cow::Owned(self.values.broadcast(right)), Cow::Borrowed(&other.values)))
            }
            (Years::Single(_), Years::Single(_)) => Ok((Cow::Borrowed(&self.values), Cow::Borrowed(&other.values))),
        }
    }
}

impl fmt::Display for Var {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Data object '{}' with {} scenarios over {}. Use select(...) to access values.",
            self.variable.as_deref().unwrap_or("<derived>"),
            self.values.len(),
            self.years
        )
    }
}

// `&a + &b`, `&a * 2.0`, ... Results are fallible because year shapes may clash.
macro_rules! impl_var_op {
    ($trait:ident, $method:ident, $op:expr) => {
        impl<'a> $trait<&'a Var> for &Var {
            type Output = Result<Var, VarError>;
            fn $method(self, rhs: &'a Var) -> Self::Output { self.apply($op, rhs) }
        }

        impl $trait<f64> for &Var {
            type Output = Result<Var, VarError>;
            fn $method(self, rhs: f64) -> Self::Output { self.apply($op, rhs) }
        }
    };
}

impl_var_op!(Add, add, Operation::Add);
impl_var_op!(Sub, sub, Operation::Subtract);
impl_var_op!(Mul, mul, Operation::Multiply);
impl_var_op!(Div, div, Operation::Divide);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compute::interp::LinearInterpolator;
    use crate::store::{DataRow, ScenarioMeta, ScenarioName};
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Returns a fixed value per scenario and records every requested year.
    #[derive(Debug, Default)]
    struct RecordingInterpolator {
        calls: Mutex<Vec<(String, f64)>>,
    }

    impl Interpolator for RecordingInterpolator {
        fn interpolate(&self, dataset: &Dataset, variable: &str, year: f64) -> Result<HashMap<ScenarioName, f64>, VarError> {
            self.calls.lock().unwrap().push((variable.to_string(), year));
            Ok(dataset.rows_for(variable).map(|r| (r.name.clone(), year * 10.0)).collect())
        }
    }

    fn dataset() -> Dataset {
        Dataset::from_rows(
            vec!["2020".into(), "2030".into(), "2040".into()],
            vec![
                DataRow::new("M1", "S1", "CO2", "Gt CO2/yr", vec![1.0, 1.5, 2.0]),
                DataRow::new("M1", "S2", "CO2", "Gt CO2/yr", vec![2.0, f64::NAN, 3.0]),
                DataRow::new("M1", "S1", "CH4", "Mt CH4/yr", vec![10.0, 20.0, 30.0]),
                DataRow::new("M1", "S3", "CH4", "Mt CH4/yr", vec![5.0, 5.0, 5.0]),
            ],
        )
    }

    fn context(interpolator: Arc<dyn Interpolator>) -> Arc<DataContext> {
        let scenarios = ScenarioUniverse::from_rows(vec![
            ScenarioMeta { vetted: true, ..ScenarioMeta::new("M1", "S1") },
            ScenarioMeta::new("M1", "S2"),
            ScenarioMeta::new("M1", "S3"),
        ]);
        Arc::new(DataContext {
            dataset: dataset(),
            vetted_scenarios: scenarios.vetted(),
            scenarios,
            catalog: Catalog { known_years: vec!["2020".into(), "2030".into(), "2040".into()], ..Catalog::ar6() },
            interpolator,
        })
    }

    fn ctx() -> Arc<DataContext> { context(Arc::new(LinearInterpolator)) }

    fn var(name: &str, years: impl Into<Years>) -> Var {
        Var::new(ctx(), Some(name), Some(years.into()), None, None).unwrap()
    }

    fn n(s: &str) -> ScenarioName { ScenarioName::from(s) }
    fn y(s: &str) -> YearKey { YearKey::from(s) }

    #[test]
    fn test_rejects_both_and_neither_sources() {
        let table = ValueTable::frame(vec![y("2020")]);
        assert_eq!(
            Var::new(ctx(), Some("CO2"), None, Some(table), None).unwrap_err(),
            VarError::AmbiguousConstruction("both")
        );
        assert_eq!(
            Var::new(ctx(), None, None, None, None).unwrap_err(),
            VarError::AmbiguousConstruction("neither")
        );
    }

    #[test]
    fn test_omitted_years_use_every_known_year() {
        let v = Var::new(ctx(), Some("CO2"), None, None, None).unwrap();
        assert_eq!(v.years(), &Years::from(["2020", "2030", "2040"]));
        assert_eq!(v.len(), 2);
        assert_eq!(v.values().row(&n("M1 S1")), Some(&[1.0, 1.5, 2.0][..]));
    }

    #[test]
    fn test_single_year_enters_scalar_mode() {
        let v = var("CO2", "2030");
        assert!(v.is_single_year());
        assert!(v.values().is_series());
        assert_eq!(v.values().get(&n("M1 S1"), &y("2030")), Some(1.5));
    }

    #[test]
    fn test_requested_order_is_kept() {
        let v = var("CO2", ["2040", "2020"]);
        assert_eq!(v.values().columns(), &[y("2040"), y("2020")]);
        assert_eq!(v.values().row(&n("M1 S2")), Some(&[3.0, 2.0][..]));
    }

    #[test]
    fn test_known_years_never_hit_the_interpolator() {
        let rec = Arc::new(RecordingInterpolator::default());
        let v = Var::new(context(rec.clone()), Some("CO2"), Some(Years::from(["2020", "2040"])), None, None).unwrap();
        assert!(rec.calls.lock().unwrap().is_empty());
        let names: Vec<&str> = v.values().index().iter().map(|s| s.as_str()).collect();
        assert_eq!(names, vec!["M1 S1", "M1 S2"]);
    }

    #[test]
    fn test_other_years_pass_through_the_interpolator() {
        let rec = Arc::new(RecordingInterpolator::default());
        let v = Var::new(context(rec.clone()), Some("CO2"), Some(Years::from(["2020", "2032.5"])), None, None).unwrap();
        assert_eq!(*rec.calls.lock().unwrap(), vec![("CO2".to_string(), 2032.5)]);
        assert_eq!(v.values().get(&n("M1 S1"), &y("2032.5")), Some(20325.0));
        assert_eq!(v.values().get(&n("M1 S2"), &y("2032.5")), Some(20325.0));
        assert_eq!(v.values().get(&n("M1 S1"), &y("2020")), Some(1.0));
    }

    #[test]
    fn test_linear_interpolation_of_single_year() {
        let v = var("CO2", "2025");
        assert!(v.is_single_year());
        assert_eq!(v.values().get(&n("M1 S1"), &y("2025")), Some(1.25));
    }

    #[test]
    fn test_non_numeric_year_is_rejected() {
        let err = Var::new(ctx(), Some("CO2"), Some(Years::from("soon")), None, None).unwrap_err();
        assert_eq!(err, VarError::InvalidYear(y("soon")));
    }

    #[test]
    fn test_default_fill_is_idempotent() {
        let v = Var::new(ctx(), Some("CO2"), None, None, Some(0.0)).unwrap();
        assert_eq!(v.values().missing_count(), 0);
        assert_eq!(v.values().get(&n("M1 S2"), &y("2030")), Some(0.0));
        let again = Var::from_values(ctx(), v.values().clone(), Some(0.0)).unwrap();
        assert_eq!(again.values(), v.values());
    }

    #[test]
    fn test_explicit_values_infer_year_shape() {
        let series = ValueTable::series_from(y("2030"), vec![(n("a"), 1.0)]);
        let v = Var::from_values(ctx(), series, None).unwrap();
        assert_eq!(v.years(), &Years::Single(y("2030")));
        assert!(v.variable().is_none());
    }

    #[test]
    fn test_add_then_subtract_round_trips() {
        let a = var("CO2", ["2020", "2040"]);
        let b = var("CH4", ["2040", "2020"]);
        let back = (&(&a + &b).unwrap() - &b).unwrap();
        for (name, row) in a.values().rows() {
            let restored = back.values().row(name).unwrap();
            for (x, r) in row.iter().zip(restored) {
                if !x.is_nan() && !r.is_nan() {
                    assert!((x - r).abs() < 1e-9);
                }
            }
        }
    }

    #[test]
    fn test_rows_missing_on_one_side_become_nan() {
        let sum = (&var("CO2", ["2020"]) + &var("CH4", ["2020"])).unwrap();
        assert_eq!(sum.values().get(&n("M1 S1"), &y("2020")), Some(11.0));
        assert!(sum.values().get(&n("M1 S2"), &y("2020")).unwrap().is_nan());
        assert!(sum.values().get(&n("M1 S3"), &y("2020")).unwrap().is_nan());
    }

    #[test]
    fn test_scalar_mode_broadcasts_over_vector() {
        let vector = var("CO2", ["2020", "2030"]);
        let scalar = var("CO2", "2025");
        let sum = (&vector + &scalar).unwrap();
        assert_eq!(sum.years(), &Years::from(["2020", "2030"]));
        assert_eq!(sum.values().row(&n("M1 S1")), Some(&[2.25, 2.75][..]));

        let flipped = (&scalar * &vector).unwrap();
        assert_eq!(flipped.years(), &Years::from(["2020", "2030"]));
        assert_eq!(flipped.values().row(&n("M1 S1")), Some(&[1.25, 1.875][..]));
    }

    #[test]
    fn test_two_scalar_modes_keep_left_label() {
        let q = (&var("CO2", "2040") / &var("CO2", "2020")).unwrap();
        assert_eq!(q.years(), &Years::Single(y("2040")));
        assert_eq!(q.values().get(&n("M1 S1"), &y("2040")), Some(2.0));
    }

    #[test]
    fn test_incompatible_years_are_rejected() {
        let err = (&var("CO2", ["2020", "2030"]) + &var("CO2", ["2020", "2040"])).unwrap_err();
        assert!(matches!(err, VarError::IncompatibleYears { .. }));
        assert!(err.to_string().contains("[2020, 2030]"));
    }

    #[test]
    fn test_number_operand_and_inherited_default() {
        let a = Var::new(ctx(), Some("CO2"), Some(Years::from(["2020", "2030"])), None, Some(-1.0)).unwrap();
        let scaled = (&a * 2.0).unwrap();
        assert_eq!(scaled.default(), Some(-1.0));
        assert_eq!(scaled.values().row(&n("M1 S2")), Some(&[4.0, -2.0][..]));
        let shifted = a.apply(Operation::Subtract, 1.0).unwrap();
        assert_eq!(shifted.values().row(&n("M1 S1")), Some(&[0.0, 0.5][..]));
    }

    #[test]
    fn test_display_summarises() {
        let text = var("CO2", "2030").to_string();
        assert!(text.contains("'CO2' with 2 scenarios over 2030"), "{}", text);
    }
}
