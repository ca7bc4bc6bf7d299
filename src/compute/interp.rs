//! interp.rs
//! Year interpolation for values between (or off) the known year columns.

use crate::store::{Dataset, ScenarioName, YearKey};
use super::error::VarError;
use std::collections::HashMap;
use std::fmt::Debug;

/// Resolves a variable at an arbitrary, possibly fractional, year.
///
/// Implementations return one value per scenario that carries `variable` in
/// the dataset; `NaN` where no value can be produced.
pub trait Interpolator: Debug + Send + Sync {
    fn interpolate(
        &self,
        dataset: &Dataset,
        variable: &str,
        year: f64,
    ) -> Result<HashMap<ScenarioName, f64>, VarError>;
}

/// Piecewise-linear interpolation between the nearest non-missing known years.
/// Targets outside the covered range are `NaN`; no extrapolation.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinearInterpolator;

impl Interpolator for LinearInterpolator {
    fn interpolate(
        &self,
        dataset: &Dataset,
        variable: &str,
        year: f64,
    ) -> Result<HashMap<ScenarioName, f64>, VarError> {
        let axis = numeric_axis(dataset.years());
        Ok(dataset
            .rows_for(variable)
            .map(|row| (row.name.clone(), interpolate_row(&axis, &row.values, year)))
            .collect())
    }
}

/// Numeric positions of the year labels; `None` for labels that are not numbers.
pub fn numeric_axis(years: &[YearKey]) -> Vec<Option<f64>> {
    years.iter().map(YearKey::to_f64).collect()
}

/// Linear interpolation of one row at `year`.
pub fn interpolate_row(axis: &[Option<f64>], values: &[f64], year: f64) -> f64 {
    let mut points: Vec<(f64, f64)> = axis
        .iter()
        .zip(values)
        .filter_map(|(x, &v)| x.filter(|_| !v.is_nan()).map(|x| (x, v)))
        .collect();
    points.sort_by(|a, b| a.0.total_cmp(&b.0));

    for pair in points.windows(2) {
        let ((x0, y0), (x1, y1)) = (pair[0], pair[1]);
        if year == x0 {
            return y0;
        }
        if year > x0 && year <= x1 {
            return y0 + (y1 - y0) * (year - x0) / (x1 - x0);
        }
    }
    match points.as_slice() {
        [(x, v)] if *x == year => *v,
        _ => f64::NAN,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::DataRow;
    use rstest::rstest;

    fn axis() -> Vec<Option<f64>> { vec![Some(2020.0), Some(2030.0), Some(2040.0)] }

    #[rstest]
    #[case(2020.0, 1.0)]
    #[case(2025.0, 2.0)]
    #[case(2030.0, 3.0)]
    #[case(2032.5, 2.5)]
    #[case(2040.0, 1.0)]
    fn test_interpolate_row_inside_range(#[case] year: f64, #[case] expected: f64) {
        let v = interpolate_row(&axis(), &[1.0, 3.0, 1.0], year);
        assert!((v - expected).abs() < 1e-12, "{} -> {}", year, v);
    }

    #[rstest]
    #[case(2019.0)]
    #[case(2041.0)]
    fn test_no_extrapolation(#[case] year: f64) {
        assert!(interpolate_row(&axis(), &[1.0, 3.0, 1.0], year).is_nan());
    }

    #[test]
    fn test_missing_values_are_skipped() {
        let v = interpolate_row(&axis(), &[1.0, f64::NAN, 5.0], 2030.0);
        assert!((v - 3.0).abs() < 1e-12);
        assert!(interpolate_row(&axis(), &[f64::NAN, f64::NAN, 5.0], 2030.0).is_nan());
        assert_eq!(interpolate_row(&axis(), &[f64::NAN, f64::NAN, 5.0], 2040.0), 5.0);
    }

    #[test]
    fn test_linear_interpolator_covers_every_row_of_variable() {
        let ds = Dataset::from_rows(
            vec!["2020".into(), "2030".into()],
            vec![
                DataRow::new("M", "S1", "CO2", "Gt", vec![0.0, 10.0]),
                DataRow::new("M", "S2", "CO2", "Gt", vec![f64::NAN, 10.0]),
                DataRow::new("M", "S1", "CH4", "Mt", vec![1.0, 1.0]),
            ],
        );
        let out = LinearInterpolator.interpolate(&ds, "CO2", 2025.0).unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out[&ScenarioName::from("M S1")], 5.0);
        assert!(out[&ScenarioName::from("M S2")].is_nan());
    }
}
