//! dataset.rs
//! The raw emissions table: one row per (scenario, variable, unit), one value per known year.

use super::types::{ScenarioName, YearKey};
use serde::{Serialize, Deserialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataRow {
    pub model: String,
    pub scenario: String,
    pub name: ScenarioName,
    pub variable: String,
    pub unit: String,
    /// Aligned with `Dataset::years`. `NaN` marks a missing value.
    pub values: Vec<f64>,
}

impl DataRow {
    pub fn new(model: &str, scenario: &str, variable: &str, unit: &str, values: Vec<f64>) -> Self {
        Self {
            model: model.to_string(),
            scenario: scenario.to_string(),
            name: ScenarioName::new(model, scenario),
            variable: variable.to_string(),
            unit: unit.to_string(),
            values,
        }
    }
}

/// Rows share one fixed list of year columns. The table is treated as an
/// immutable snapshot once imported; the preprocessing functions return new
/// datasets instead of editing in place.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    years: Vec<YearKey>,
    rows: Vec<DataRow>,
}

impl Dataset {
    pub fn new(years: Vec<YearKey>) -> Self {
        Self { years, rows: Vec::new() }
    }

    /// Builds a dataset from parsed rows. Rows shorter than the year list are
    /// padded with `NaN`, longer ones truncated.
    pub fn from_rows(years: Vec<YearKey>, rows: Vec<DataRow>) -> Self {
        let mut dataset = Self::new(years);
        for row in rows {
            dataset.push(row);
        }
        dataset
    }

    pub fn push(&mut self, mut row: DataRow) {
        row.values.resize(self.years.len(), f64::NAN);
        self.rows.push(row);
    }

    pub fn years(&self) -> &[YearKey] { &self.years }
    pub fn rows(&self) -> &[DataRow] { &self.rows }
    pub fn len(&self) -> usize { self.rows.len() }
    pub fn is_empty(&self) -> bool { self.rows.is_empty() }

    pub fn year_position(&self, year: &YearKey) -> Option<usize> {
        self.years.iter().position(|y| y == year)
    }

    /// All rows carrying `variable`, in table order.
    pub fn rows_for<'a>(&'a self, variable: &'a str) -> impl Iterator<Item = &'a DataRow> + 'a {
        self.rows.iter().filter(move |r| r.variable == variable)
    }

    pub fn find(&self, name: &ScenarioName, variable: &str) -> Option<&DataRow> {
        self.rows.iter().find(|r| &r.name == name && r.variable == variable)
    }

    pub fn has_variable(&self, variable: &str) -> bool {
        self.rows.iter().any(|r| r.variable == variable)
    }

    /// Returns a copy with `f` applied to every row.
    pub fn map_rows(&self, mut f: impl FnMut(DataRow) -> DataRow) -> Self {
        Self {
            years: self.years.clone(),
            rows: self.rows.iter().cloned().map(&mut f).collect(),
        }
    }

    /// Returns a copy with `extra` rows appended.
    pub fn with_rows(&self, extra: Vec<DataRow>) -> Self {
        let mut out = self.clone();
        for row in extra {
            out.push(row);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn years() -> Vec<YearKey> { vec!["2020".into(), "2030".into()] }

    #[test]
    fn test_push_pads_short_rows() {
        let ds = Dataset::from_rows(years(), vec![DataRow::new("M", "S", "V", "u", vec![1.0])]);
        let row = &ds.rows()[0];
        assert_eq!(row.values.len(), 2);
        assert!(row.values[1].is_nan());
    }

    #[test]
    fn test_rows_for_filters_by_variable() {
        let ds = Dataset::from_rows(years(), vec![
            DataRow::new("M", "S1", "A", "u", vec![1.0, 2.0]),
            DataRow::new("M", "S1", "B", "u", vec![3.0, 4.0]),
            DataRow::new("M", "S2", "A", "u", vec![5.0, 6.0]),
        ]);
        let names: Vec<&str> = ds.rows_for("A").map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["M S1", "M S2"]);
        assert!(ds.find(&"M S2".into(), "B").is_none());
        assert_eq!(ds.year_position(&"2030".into()), Some(1));
    }
}
