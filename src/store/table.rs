//! table.rs
//! A small dense value table: rows labelled by scenario, columns labelled by year.
//!
//! One representation covers both variable shapes. A scalar-mode variable is a
//! table with exactly one column and the `series` flag set; every other table
//! is a frame whose year shape is its column list.

use super::types::{Operation, ScenarioName, YearKey, Years};
use serde::{Serialize, Deserialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "TableData")]
pub struct ValueTable {
    index: Vec<ScenarioName>,
    columns: Vec<YearKey>,
    // Row-major, one inner vec per index entry
    data: Vec<Vec<f64>>,
    series: bool,

    #[serde(skip)]
    positions: HashMap<ScenarioName, usize>,
}

/// Serialized form of `ValueTable`; the row index is rebuilt on load.
#[derive(Deserialize)]
struct TableData {
    index: Vec<ScenarioName>,
    columns: Vec<YearKey>,
    data: Vec<Vec<f64>>,
    series: bool,
}

impl From<TableData> for ValueTable {
    fn from(raw: TableData) -> Self {
        let mut table = Self {
            index: raw.index,
            columns: raw.columns,
            data: raw.data,
            series: raw.series,
            positions: HashMap::new(),
        };
        table.rebuild_index();
        table
    }
}

impl PartialEq for ValueTable {
    fn eq(&self, other: &Self) -> bool {
        self.series == other.series
            && self.index == other.index
            && self.columns == other.columns
            && self.data.len() == other.data.len()
            && self.data.iter().zip(&other.data).all(|(a, b)| {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x == y || (x.is_nan() && y.is_nan()))
            })
    }
}

impl ValueTable {
    /// An empty frame with the given year columns.
    pub fn frame(columns: Vec<YearKey>) -> Self {
        Self { columns, ..Default::default() }
    }

    /// An empty one-column table in scalar mode.
    pub fn series(year: YearKey) -> Self {
        Self { columns: vec![year], series: true, ..Default::default() }
    }

    /// Builds a scalar-mode table from `(scenario, value)` pairs.
    pub fn series_from(year: YearKey, values: impl IntoIterator<Item = (ScenarioName, f64)>) -> Self {
        let mut table = Self::series(year);
        for (name, v) in values {
            table.push_row(name, vec![v]);
        }
        table
    }

    /// Appends a row. The row is padded with `NaN` (or truncated) to the column
    /// count; a name already present overwrites the existing row.
    pub fn push_row(&mut self, name: ScenarioName, mut values: Vec<f64>) {
        values.resize(self.columns.len(), f64::NAN);
        match self.positions.get(&name) {
            Some(&idx) => self.data[idx] = values,
            None => {
                self.positions.insert(name.clone(), self.index.len());
                self.index.push(name);
                self.data.push(values);
            }
        }
    }

    fn rebuild_index(&mut self) {
        self.positions = self.index.iter().enumerate().map(|(i, n)| (n.clone(), i)).collect();
    }

    // --- Shape ---

    pub fn is_series(&self) -> bool { self.series }
    pub fn index(&self) -> &[ScenarioName] { &self.index }
    pub fn columns(&self) -> &[YearKey] { &self.columns }
    pub fn len(&self) -> usize { self.index.len() }
    pub fn is_empty(&self) -> bool { self.index.is_empty() }

    /// The year shape this table implies.
    pub fn years(&self) -> Years {
        match (self.series, self.columns.first()) {
            (true, Some(y)) => Years::Single(y.clone()),
            _ => Years::Multiple(self.columns.clone()),
        }
    }

    // --- Access ---

    pub fn contains(&self, name: &ScenarioName) -> bool { self.positions.contains_key(name) }

    pub fn row(&self, name: &ScenarioName) -> Option<&[f64]> {
        self.positions.get(name).map(|&i| self.data[i].as_slice())
    }

    pub fn column_position(&self, year: &YearKey) -> Option<usize> {
        self.columns.iter().position(|c| c == year)
    }

    pub fn get(&self, name: &ScenarioName, year: &YearKey) -> Option<f64> {
        let col = self.column_position(year)?;
        self.row(name).map(|r| r[col])
    }

    /// A column as `(scenario, value)` pairs in row order.
    pub fn column(&self, year: &YearKey) -> Option<Vec<(ScenarioName, f64)>> {
        let col = self.column_position(year)?;
        Some(self.index.iter().cloned().zip(self.data.iter().map(|r| r[col])).collect())
    }

    pub fn rows(&self) -> impl Iterator<Item = (&ScenarioName, &[f64])> {
        self.index.iter().zip(self.data.iter().map(|r| r.as_slice()))
    }

    pub fn missing_count(&self) -> usize {
        self.data.iter().flatten().filter(|v| v.is_nan()).count()
    }

    // --- Transformations (all return new tables) ---

    /// Sets a column from labelled values. Rows of `self` without a value get
    /// `NaN`; values for scenarios not in `self` are ignored.
    pub fn with_column(&self, year: YearKey, values: &HashMap<ScenarioName, f64>) -> Self {
        let mut out = self.clone();
        let col = match out.column_position(&year) {
            Some(c) => c,
            None => {
                out.columns.push(year);
                for row in out.data.iter_mut() {
                    row.push(f64::NAN);
                }
                out.columns.len() - 1
            }
        };
        for (name, row) in out.index.iter().zip(out.data.iter_mut()) {
            row[col] = values.get(name).copied().unwrap_or(f64::NAN);
        }
        out
    }

    /// Reorders/selects columns. Unknown labels become all-`NaN` columns.
    pub fn select_columns(&self, years: &Years) -> Self {
        let wanted = years.to_vec();
        let picks: Vec<Option<usize>> = wanted.iter().map(|y| self.column_position(y)).collect();
        let data = self
            .data
            .iter()
            .map(|row| picks.iter().map(|p| p.map_or(f64::NAN, |i| row[i])).collect())
            .collect();
        Self {
            index: self.index.clone(),
            columns: wanted,
            data,
            series: years.is_single(),
            positions: self.positions.clone(),
        }
    }

    /// Keeps the rows accepted by `keep`, preserving order.
    pub fn filter_rows(&self, mut keep: impl FnMut(&ScenarioName) -> bool) -> Self {
        let mut out = Self { columns: self.columns.clone(), series: self.series, ..Default::default() };
        for (name, row) in self.rows() {
            if keep(name) {
                out.push_row(name.clone(), row.to_vec());
            }
        }
        out
    }

    /// Replaces every missing value with `value`.
    pub fn fill_missing(&self, value: f64) -> Self {
        self.map(|v| if v.is_nan() { value } else { v })
    }

    pub fn map(&self, f: impl Fn(f64) -> f64) -> Self {
        let mut out = self.clone();
        for v in out.data.iter_mut().flatten() {
            *v = f(*v);
        }
        out
    }

    /// Replicates a one-column table across `years`, producing a frame.
    pub fn broadcast(&self, years: &[YearKey]) -> Self {
        let data = self
            .data
            .iter()
            .map(|row| vec![row.first().copied().unwrap_or(f64::NAN); years.len()])
            .collect();
        Self {
            index: self.index.clone(),
            columns: years.to_vec(),
            data,
            series: false,
            positions: self.positions.clone(),
        }
    }

    /// Element-wise `self op other`, aligned by row label and column label.
    ///
    /// Rows are the union of both indexes (left order, then right-only rows);
    /// a row missing on either side yields `NaN`. Columns follow `self`; a
    /// column that `other` lacks yields `NaN`. When both sides are one-column
    /// tables the columns are paired positionally.
    pub fn combine(&self, other: &Self, op: Operation) -> Self {
        let paired: Vec<Option<usize>> = if self.columns.len() == 1 && other.columns.len() == 1 {
            vec![Some(0)]
        } else {
            self.columns.iter().map(|c| other.column_position(c)).collect()
        };

        let mut out = Self { columns: self.columns.clone(), series: self.series, ..Default::default() };
        let names = self.index.iter().chain(other.index.iter().filter(|n| !self.contains(n)));
        for name in names {
            let values = match (self.row(name), other.row(name)) {
                (Some(l), Some(r)) => l
                    .iter()
                    .zip(&paired)
                    .map(|(&lv, p)| p.map_or(f64::NAN, |i| op.apply(lv, r[i])))
                    .collect(),
                _ => vec![f64::NAN; self.columns.len()],
            };
            out.push_row(name.clone(), values);
        }
        out
    }
}
