//! select.rs
//! Filtering a variable down to a categorised subset of scenarios.

use crate::config::{Catalog, MarkerScenario};
use crate::store::{Category, ScenarioMeta, ScenarioName, ScenarioUniverse, ValueTable, YearKey, Years};
use super::error::VarError;
use serde::{Serialize, Deserialize};
use smallvec::SmallVec;
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::fmt;
use tracing::{debug, warn};

/// A metadata axis scenarios can be filtered on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    Category,
    Ip,
    Ssp,
    CurPol,
    Ndc,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Axis::Category => "Category",
            Axis::Ip => "IP",
            Axis::Ssp => "SSP",
            Axis::CurPol => "CurPol",
            Axis::Ndc => "NDC",
        })
    }
}

/// Requested values on one axis: every known value, or an explicit list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AxisFilter {
    All,
    Values(Vec<String>),
}

impl From<&str> for AxisFilter {
    fn from(v: &str) -> Self {
        if v == "all" { AxisFilter::All } else { AxisFilter::Values(vec![v.to_string()]) }
    }
}

impl From<Vec<&str>> for AxisFilter {
    fn from(vs: Vec<&str>) -> Self { AxisFilter::Values(vs.into_iter().map(String::from).collect()) }
}

impl<const N: usize> From<[&str; N]> for AxisFilter {
    fn from(vs: [&str; N]) -> Self { AxisFilter::Values(vs.iter().map(|v| v.to_string()).collect()) }
}

impl From<Category> for AxisFilter {
    fn from(c: Category) -> Self { AxisFilter::Values(vec![c.to_string()]) }
}

impl From<Vec<Category>> for AxisFilter {
    fn from(cs: Vec<Category>) -> Self { AxisFilter::Values(cs.iter().map(|c| c.to_string()).collect()) }
}

/// Filters for `Var::select`. Only vetted scenarios are considered unless
/// `vetted` is switched off.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectQuery {
    pub category: Option<AxisFilter>,
    pub ip: Option<AxisFilter>,
    pub ssp: Option<AxisFilter>,
    pub curpol: Option<bool>,
    pub ndc: Option<bool>,
    pub vetted: bool,
}

impl Default for SelectQuery {
    fn default() -> Self {
        Self { category: None, ip: None, ssp: None, curpol: None, ndc: None, vetted: true }
    }
}

impl SelectQuery {
    pub fn new() -> Self { Self::default() }
    pub fn category(mut self, f: impl Into<AxisFilter>) -> Self { self.category = Some(f.into()); self }
    pub fn ip(mut self, f: impl Into<AxisFilter>) -> Self { self.ip = Some(f.into()); self }
    pub fn ssp(mut self, f: impl Into<AxisFilter>) -> Self { self.ssp = Some(f.into()); self }
    pub fn curpol(mut self, on: bool) -> Self { self.curpol = Some(on); self }
    pub fn ndc(mut self, on: bool) -> Self { self.ndc = Some(on); self }
    pub fn vetted(mut self, on: bool) -> Self { self.vetted = on; self }
}

/// Row label of a selection: one metadata label per active axis, then the scenario.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionKey {
    pub labels: SmallVec<[Option<String>; 3]>,
    pub name: ScenarioName,
}

/// The filtered, annotated and sorted view returned by `Var::select`.
///
/// A scalar-mode variable yields a one-column selection with `is_series()` set.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "SelectionData")]
pub struct Selection {
    axes: SmallVec<[Axis; 3]>,
    years: Years,
    keys: Vec<SelectionKey>,
    data: Vec<Vec<f64>>,

    #[serde(skip)]
    positions: HashMap<ScenarioName, usize>,
}

#[derive(Deserialize)]
struct SelectionData {
    axes: SmallVec<[Axis; 3]>,
    years: Years,
    keys: Vec<SelectionKey>,
    data: Vec<Vec<f64>>,
}

impl From<SelectionData> for Selection {
    fn from(raw: SelectionData) -> Self { Selection::new(raw.axes, raw.years, raw.keys, raw.data) }
}

impl Selection {
    fn new(axes: SmallVec<[Axis; 3]>, years: Years, keys: Vec<SelectionKey>, data: Vec<Vec<f64>>) -> Self {
        let positions = keys.iter().enumerate().map(|(i, k)| (k.name.clone(), i)).collect();
        Self { axes, years, keys, data, positions }
    }

    pub fn axes(&self) -> &[Axis] { &self.axes }
    pub fn years(&self) -> &Years { &self.years }
    pub fn keys(&self) -> &[SelectionKey] { &self.keys }
    pub fn is_series(&self) -> bool { self.years.is_single() }
    pub fn len(&self) -> usize { self.keys.len() }
    pub fn is_empty(&self) -> bool { self.keys.is_empty() }

    pub fn names(&self) -> Vec<&ScenarioName> { self.keys.iter().map(|k| &k.name).collect() }

    pub fn rows(&self) -> impl Iterator<Item = (&SelectionKey, &[f64])> {
        self.keys.iter().zip(self.data.iter().map(|r| r.as_slice()))
    }

    pub fn row(&self, name: &ScenarioName) -> Option<&[f64]> {
        self.positions.get(name).map(|&i| self.data[i].as_slice())
    }

    pub fn get(&self, name: &ScenarioName, year: &YearKey) -> Option<f64> {
        let col = self.years.position(year)?;
        self.row(name).map(|r| r[col])
    }

    /// The label `name` carries on `axis`, if that axis is active.
    pub fn label(&self, name: &ScenarioName, axis: Axis) -> Option<&str> {
        let pos = self.axes.iter().position(|a| *a == axis)?;
        let key = &self.keys[*self.positions.get(name)?];
        key.labels[pos].as_deref()
    }
}

/// Runs a query against `values`.
///
/// `universe` is the full universe; the vetted one is used as the starting set
/// unless the query turns vetting off.
pub(crate) fn select(
    values: &ValueTable,
    universe: &ScenarioUniverse,
    vetted_universe: &ScenarioUniverse,
    catalog: &Catalog,
    query: &SelectQuery,
) -> Result<Selection, VarError> {
    let start = if query.vetted { vetted_universe } else { universe };
    let mut selection: Vec<&ScenarioMeta> = start.iter().collect();
    let mut axes: SmallVec<[Axis; 3]> = SmallVec::new();

    // --- Climate category ---
    if let Some(filter) = &query.category {
        let wanted: Vec<Category> = match filter {
            AxisFilter::All => Category::ALL.to_vec(),
            AxisFilter::Values(vs) => vs
                .iter()
                .map(|v| {
                    Category::ALL
                        .iter()
                        .copied()
                        .find(|c| c.as_str() == v.as_str())
                        .ok_or_else(|| invalid(Axis::Category, v, category_names()))
                })
                .collect::<Result<_, _>>()?,
        };
        selection.retain(|m| m.category.map_or(false, |c| wanted.contains(&c)));
        axes.push(Axis::Category);
    }

    // --- Illustrative pathways ---
    if let Some(filter) = &query.ip {
        let markers = resolve_markers(filter, &catalog.ip_scenarios, Axis::Ip)?;
        restrict_to_markers(&mut selection, &markers);
        axes.push(Axis::Ip);
    }

    // --- SSPs ---
    if let Some(filter) = &query.ssp {
        let markers = resolve_markers(filter, &catalog.ssp_scenarios, Axis::Ssp)?;
        restrict_to_markers(&mut selection, &markers);
        // Several SSP markers fail vetting; each requested one is taken from
        // the full universe when the current selection lacks it.
        for marker in &markers {
            if selection.iter().any(|m| m.name == marker.scenario) {
                continue;
            }
            match universe.get(&marker.scenario) {
                Some(meta) => selection.push(meta),
                None => warn!(ssp = %marker.name, scenario = %marker.scenario, "SSP marker scenario missing from universe"),
            }
        }
        axes.push(Axis::Ssp);
    }

    if query.curpol.is_some() {
        return Err(VarError::NotImplementedFilter(Axis::CurPol));
    }
    if query.ndc.is_some() {
        return Err(VarError::NotImplementedFilter(Axis::Ndc));
    }

    let chosen: HashMap<&ScenarioName, &ScenarioMeta> = selection.iter().map(|m| (&m.name, *m)).collect();

    let mut rows: Vec<(SelectionKey, Vec<f64>)> = values
        .rows()
        .filter_map(|(name, row)| {
            let meta = chosen.get(name)?;
            let labels = axes.iter().map(|a| axis_label(meta, *a)).collect();
            Some((SelectionKey { labels, name: name.clone() }, row.to_vec()))
        })
        .collect();

    // Stable, so scenarios with equal labels keep value-table order.
    rows.sort_by(|(a, _), (b, _)| compare_labels(&a.labels, &b.labels));

    debug!(
        axes = ?axes,
        vetted = query.vetted,
        candidates = selection.len(),
        rows = rows.len(),
        "selection done"
    );

    let (keys, data) = rows.into_iter().unzip();
    Ok(Selection::new(axes, values.years(), keys, data))
}

fn invalid(axis: Axis, value: &str, allowed: Vec<String>) -> VarError {
    VarError::InvalidFilterValue { axis, value: value.to_string(), allowed: allowed.join(", ") }
}

fn category_names() -> Vec<String> {
    Category::ALL.iter().map(|c| c.to_string()).collect()
}

/// Expands `All` and validates every requested marker name.
fn resolve_markers<'a>(
    filter: &AxisFilter,
    markers: &'a [MarkerScenario],
    axis: Axis,
) -> Result<Vec<&'a MarkerScenario>, VarError> {
    match filter {
        AxisFilter::All => Ok(markers.iter().collect()),
        AxisFilter::Values(vs) => vs
            .iter()
            .map(|v| {
                markers.iter().find(|m| &m.name == v).ok_or_else(|| {
                    invalid(axis, v, markers.iter().map(|m| m.name.clone()).collect())
                })
            })
            .collect(),
    }
}

fn restrict_to_markers(selection: &mut Vec<&ScenarioMeta>, markers: &[&MarkerScenario]) {
    let targets: HashSet<&ScenarioName> = markers.iter().map(|m| &m.scenario).collect();
    selection.retain(|m| targets.contains(&m.name));
}

fn axis_label(meta: &ScenarioMeta, axis: Axis) -> Option<String> {
    match axis {
        Axis::Category => meta.category.map(|c| c.to_string()),
        Axis::Ip => meta.ip.clone(),
        Axis::Ssp => meta.ssp.clone(),
        Axis::CurPol | Axis::Ndc => None,
    }
}

/// Ascending, axis by axis; missing labels sort after present ones.
fn compare_labels(a: &[Option<String>], b: &[Option<String>]) -> Ordering {
    for (x, y) in a.iter().zip(b) {
        let ord = match (x, y) {
            (Some(x), Some(y)) => x.cmp(y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }
    Ordering::Equal
}
