use super::types::{Category, ScenarioName};
use serde::{Serialize, Deserialize};
use std::collections::{BTreeMap, HashMap};

/// Metadata attached to one scenario.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScenarioMeta {
    pub name: ScenarioName,
    pub model: String,
    pub scenario: String,
    pub category: Option<Category>,
    /// Illustrative pathway tag, only set on the canonical IP scenarios.
    pub ip: Option<String>,
    /// SSP tag, only set on the canonical SSP scenarios.
    pub ssp: Option<String>,
    pub vetted: bool,
    /// Summary statistics such as `"Cum. CO2"` or `"GHG 2030"`.
    pub stats: BTreeMap<String, f64>,
}

impl ScenarioMeta {
    pub fn new(model: &str, scenario: &str) -> Self {
        Self {
            name: ScenarioName::new(model, scenario),
            model: model.to_string(),
            scenario: scenario.to_string(),
            ..Default::default()
        }
    }

    pub fn stat(&self, key: &str) -> Option<f64> { self.stats.get(key).copied() }
}

/// An ordered, name-indexed table of scenario metadata.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "UniverseData")]
pub struct ScenarioUniverse {
    rows: Vec<ScenarioMeta>,

    // Not serialized, rebuilt on load
    #[serde(skip)]
    positions: HashMap<ScenarioName, usize>,
}

#[derive(Deserialize)]
struct UniverseData {
    rows: Vec<ScenarioMeta>,
}

impl From<UniverseData> for ScenarioUniverse {
    fn from(raw: UniverseData) -> Self { Self::from_rows(raw.rows) }
}

impl ScenarioUniverse {
    pub fn new() -> Self { Self::default() }

    /// Builds the universe; a later row with an already-seen name replaces the earlier one.
    pub fn from_rows(rows: impl IntoIterator<Item = ScenarioMeta>) -> Self {
        let mut universe = Self::new();
        for row in rows {
            universe.insert(row);
        }
        universe
    }

    pub fn insert(&mut self, meta: ScenarioMeta) {
        match self.positions.get(&meta.name) {
            Some(&idx) => self.rows[idx] = meta,
            None => {
                self.positions.insert(meta.name.clone(), self.rows.len());
                self.rows.push(meta);
            }
        }
    }

    pub fn len(&self) -> usize { self.rows.len() }
    pub fn is_empty(&self) -> bool { self.rows.is_empty() }
    pub fn rows(&self) -> &[ScenarioMeta] { &self.rows }
    pub fn iter(&self) -> impl Iterator<Item = &ScenarioMeta> { self.rows.iter() }

    #[inline(always)]
    pub fn get(&self, name: &ScenarioName) -> Option<&ScenarioMeta> {
        self.positions.get(name).map(|&i| &self.rows[i])
    }

    pub fn contains(&self, name: &ScenarioName) -> bool { self.positions.contains_key(name) }

    /// The sub-universe of scenarios that passed vetting.
    pub fn vetted(&self) -> Self {
        Self::from_rows(self.rows.iter().filter(|m| m.vetted).cloned())
    }
}
