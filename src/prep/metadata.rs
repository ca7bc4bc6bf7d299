//! metadata.rs
//! Builds the scenario universe: vetting flags, categories, marker tags and
//! summary statistics.

use crate::compute::interp::{interpolate_row, numeric_axis};
use crate::config::{Catalog, YearRange};
use crate::store::{Category, DataRow, Dataset, ScenarioMeta, ScenarioName, ScenarioUniverse, YearKey};
use super::derived::{CO2, KYOTO};
use rayon::prelude::*;
use serde::{Serialize, Deserialize};
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

pub const CUM_CO2: &str = "Cum. CO2";
pub const GHG_2030: &str = "GHG 2030";
pub const NET_NEGATIVE: &str = "Total net negative";
pub const PEAK_CUM_CO2: &str = "Peak cum. CO2";

/// One row of the vetting sheet.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VettingRecord {
    pub model: String,
    pub scenario: String,
    pub category: Option<String>,
    /// Historical vetting outcome, compared case-insensitively.
    pub status: Option<String>,
}

impl VettingRecord {
    pub fn new(model: &str, scenario: &str, category: Option<&str>, status: Option<&str>) -> Self {
        Self {
            model: model.to_string(),
            scenario: scenario.to_string(),
            category: category.map(String::from),
            status: status.map(String::from),
        }
    }

    pub fn name(&self) -> ScenarioName { ScenarioName::new(&self.model, &self.scenario) }
}

/// One universe row per (model, scenario) in `dataset`, in first-seen order.
pub fn build_universe(dataset: &Dataset, vetting: &[VettingRecord], catalog: &Catalog) -> ScenarioUniverse {
    let by_name: HashMap<ScenarioName, &VettingRecord> = vetting.iter().map(|r| (r.name(), r)).collect();

    let mut seen = HashSet::new();
    let mut metas: Vec<ScenarioMeta> = dataset
        .rows()
        .iter()
        .filter(|r| seen.insert(&r.name))
        .map(|r| {
            let mut meta = ScenarioMeta::new(&r.model, &r.scenario);
            if let Some(record) = by_name.get(&meta.name) {
                meta.category = record.category.as_deref().and_then(|c| parse_category(&meta.name, c));
                meta.vetted = record
                    .status
                    .as_deref()
                    .map_or(false, |s| s.trim().to_uppercase() == catalog.vetting_pass);
            }
            meta
        })
        .collect();

    add_summary_stats(&mut metas, dataset, catalog);

    let mut universe = ScenarioUniverse::from_rows(metas);
    tag_markers(&mut universe, catalog);
    debug!(scenarios = universe.len(), vetted = universe.vetted().len(), "scenario universe built");
    universe
}

fn parse_category(name: &ScenarioName, raw: &str) -> Option<Category> {
    if raw.trim().is_empty() {
        return None;
    }
    match raw.parse() {
        Ok(c) => Some(c),
        Err(e) => {
            warn!(scenario = %name, "{}", e);
            None
        }
    }
}

fn tag_markers(universe: &mut ScenarioUniverse, catalog: &Catalog) {
    for marker in &catalog.ip_scenarios {
        match universe.get(&marker.scenario).cloned() {
            Some(meta) => universe.insert(ScenarioMeta { ip: Some(marker.name.clone()), ..meta }),
            None => warn!(ip = %marker.name, scenario = %marker.scenario, "IP marker not in dataset"),
        }
    }
    for marker in &catalog.ssp_scenarios {
        match universe.get(&marker.scenario).cloned() {
            Some(meta) => universe.insert(ScenarioMeta { ssp: Some(marker.name.clone()), ..meta }),
            None => warn!(ssp = %marker.name, scenario = %marker.scenario, "SSP marker not in dataset"),
        }
    }
}

/// Cumulative CO2, net negative CO2, peak cumulative CO2 and 2030 Kyoto
/// emissions, one scenario per task.
pub fn add_summary_stats(metas: &mut [ScenarioMeta], dataset: &Dataset, catalog: &Catalog) {
    let axis = numeric_axis(dataset.years());
    let co2: HashMap<&ScenarioName, &DataRow> = dataset.rows_for(CO2).map(|r| (&r.name, r)).collect();
    let kyoto: HashMap<&ScenarioName, &DataRow> = dataset.rows_for(KYOTO).map(|r| (&r.name, r)).collect();
    let y2030 = dataset.year_position(&YearKey::from("2030"));
    let range = catalog.cumulative_range;

    metas.par_iter_mut().for_each(|meta| {
        if let Some(row) = co2.get(&meta.name) {
            let cum = cumulative(&axis, &row.values, range, None);
            let net_negative = -cumulative(&axis, &row.values, range, Some(0.0));
            meta.stats.insert(CUM_CO2.to_string(), cum);
            meta.stats.insert(NET_NEGATIVE.to_string(), net_negative);
            meta.stats.insert(PEAK_CUM_CO2.to_string(), cum - net_negative);
        }
        if let (Some(row), Some(col)) = (kyoto.get(&meta.name), y2030) {
            meta.stats.insert(GHG_2030.to_string(), row.values[col]);
        }
    });
}

/// Sum of the yearly, linearly interpolated values over `range` (inclusive),
/// each value first capped at `clip_upper` when given. `NaN` if any year in
/// the range has no value.
pub fn cumulative(axis: &[Option<f64>], values: &[f64], range: YearRange, clip_upper: Option<f64>) -> f64 {
    range
        .years()
        .map(|y| {
            let v = interpolate_row(axis, values, y as f64);
            match clip_upper {
                Some(cap) if v > cap => cap,
                _ => v,
            }
        })
        .sum()
}
