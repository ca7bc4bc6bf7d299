//! catalog.rs
//! Read-only reference tables: known years, marker scenarios and unit rules.
//!
//! A `Catalog` is built once at startup (built-in defaults or a JSON file) and
//! handed to the variable layer and the import pipeline explicitly.

use crate::store::{ScenarioName, YearKey};
use serde::{Serialize, Deserialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Failed to read catalog '{}': {source}", .path.display())]
    Io { path: PathBuf, source: std::io::Error },
    #[error("Malformed catalog: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid catalog: {0}")]
    Invalid(String),
}

/// A named canonical scenario (an illustrative pathway or an SSP marker).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkerScenario {
    pub name: String,
    pub scenario: ScenarioName,
}

impl MarkerScenario {
    pub fn new(name: &str, scenario: &str) -> Self {
        Self { name: name.to_string(), scenario: ScenarioName(scenario.to_string()) }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitConversion {
    pub from: String,
    pub to: String,
    pub factor: f64,
}

/// Inclusive range of whole years used for cumulative sums.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearRange {
    pub start: u32,
    pub end: u32,
}

impl YearRange {
    pub fn years(&self) -> impl Iterator<Item = u32> { self.start..=self.end }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Catalog {
    /// Year columns present in every dataset row.
    pub known_years: Vec<YearKey>,
    pub ip_scenarios: Vec<MarkerScenario>,
    pub ssp_scenarios: Vec<MarkerScenario>,
    pub unit_conversions: Vec<UnitConversion>,
    pub cumulative_range: YearRange,
    /// Vetting status (upper-cased) that marks a scenario as vetted.
    pub vetting_pass: String,
}

impl Default for Catalog {
    fn default() -> Self { Self::ar6() }
}

impl Catalog {
    /// Built-in tables for the AR6 scenario database.
    pub fn ar6() -> Self {
        Self {
            known_years: (2010u32..=2100).step_by(5).map(YearKey::from).collect(),
            ip_scenarios: vec![
                MarkerScenario::new("CurPol", "GCAM 5.3 NGFS2_Current Policies"),
                MarkerScenario::new("ModAct", "IMAGE 3.0 EN_INDCi2030_3000f"),
                MarkerScenario::new("GS", "WITCH 5.0 CO_Bridge"),
                MarkerScenario::new("Neg", "COFFEE 1.1 EN_NPi2020_400f_lowBECCS"),
                MarkerScenario::new("Ren", "REMIND-MAgPIE 2.1-4.3 DeepElec_SSP2_ HighRE_Budg900"),
                MarkerScenario::new("LD", "MESSAGEix-GLOBIOM 1.0 LowEnergyDemand_1.3_IPCC"),
                MarkerScenario::new("SP", "REMIND-MAgPIE 2.1-4.2 SusDev_SDP-PkBudg1000"),
            ],
            ssp_scenarios: vec![
                MarkerScenario::new("SSP1-19", "IMAGE 3.0.1 SSP1-19"),
                MarkerScenario::new("SSP1-26", "IMAGE 3.0.1 SSP1-26"),
                MarkerScenario::new("SSP4-34", "GCAM 4.2 SSP4-34"),
                MarkerScenario::new("SSP2-45", "MESSAGE-GLOBIOM 1.0 SSP2-45"),
                MarkerScenario::new("SSP4-60", "GCAM 4.2 SSP4-60"),
                MarkerScenario::new("SSP3-70", "AIM/CGE 2.0 SSP3-Baseline"),
                MarkerScenario::new("SSP5-85", "REMIND-MAGPIE 1.5 SSP5-Baseline"),
            ],
            unit_conversions: vec![
                UnitConversion { from: "Mt CO2/yr".into(), to: "Gt CO2/yr".into(), factor: 0.001 },
                UnitConversion { from: "kt N2O/yr".into(), to: "Mt N2O/yr".into(), factor: 0.001 },
                UnitConversion { from: "Mt CO2-equiv/yr".into(), to: "Gt CO2-equiv/yr".into(), factor: 0.001 },
            ],
            cumulative_range: YearRange { start: 2020, end: 2100 },
            vetting_pass: "PASS".to_string(),
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
        let catalog: Self = serde_json::from_str(json)?;
        catalog.validate()?;
        Ok(catalog)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|source| CatalogError::Io { path: path.to_path_buf(), source })?;
        Self::from_json_str(&text)
    }

    pub fn validate(&self) -> Result<(), CatalogError> {
        if self.known_years.is_empty() {
            return Err(CatalogError::Invalid("known_years must not be empty".into()));
        }
        for (axis, markers) in [("IP", &self.ip_scenarios), ("SSP", &self.ssp_scenarios)] {
            let mut seen = HashSet::new();
            for m in markers {
                if !seen.insert(m.name.as_str()) {
                    return Err(CatalogError::Invalid(format!("duplicate {} marker '{}'", axis, m.name)));
                }
            }
        }
        if self.cumulative_range.start > self.cumulative_range.end {
            return Err(CatalogError::Invalid("cumulative_range start is after its end".into()));
        }
        Ok(())
    }

    pub fn is_known_year(&self, year: &YearKey) -> bool { self.known_years.contains(year) }

    pub fn ip(&self, name: &str) -> Option<&MarkerScenario> {
        self.ip_scenarios.iter().find(|m| m.name == name)
    }

    pub fn ssp(&self, name: &str) -> Option<&MarkerScenario> {
        self.ssp_scenarios.iter().find(|m| m.name == name)
    }

    pub fn ip_names(&self) -> Vec<String> { self.ip_scenarios.iter().map(|m| m.name.clone()).collect() }
    pub fn ssp_names(&self) -> Vec<String> { self.ssp_scenarios.iter().map(|m| m.name.clone()).collect() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_ar6_defaults_are_valid() {
        let c = Catalog::ar6();
        assert!(c.validate().is_ok());
        assert_eq!(c.known_years.first(), Some(&YearKey::from("2010")));
        assert_eq!(c.known_years.last(), Some(&YearKey::from("2100")));
        assert_eq!(c.ssp("SSP1-19").map(|m| m.scenario.as_str()), Some("IMAGE 3.0.1 SSP1-19"));
        assert!(c.ip("Nope").is_none());
    }

    #[test]
    fn test_partial_json_falls_back_to_defaults() {
        let c = Catalog::from_json_str(r#"{ "known_years": ["2020", "2030"] }"#).unwrap();
        assert_eq!(c.known_years, vec![YearKey::from("2020"), YearKey::from("2030")]);
        assert_eq!(c.ssp_scenarios.len(), 7);
        assert_eq!(c.vetting_pass, "PASS");
    }

    #[test]
    fn test_rejects_duplicate_markers() {
        let json = r#"{ "ip_scenarios": [
            { "name": "GS", "scenario": "A" },
            { "name": "GS", "scenario": "B" } ] }"#;
        let err = Catalog::from_json_str(json).unwrap_err();
        assert!(err.to_string().contains("duplicate IP marker 'GS'"), "Msg: {}", err);
    }

    #[test]
    fn test_rejects_empty_years() {
        assert!(matches!(
            Catalog::from_json_str(r#"{ "known_years": [] }"#),
            Err(CatalogError::Invalid(_))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{}", serde_json::to_string(&Catalog::ar6()).unwrap()).unwrap();
        let loaded = Catalog::from_path(file.path()).unwrap();
        assert_eq!(loaded, Catalog::ar6());
    }

    #[test]
    fn test_missing_file_reports_path() {
        let err = Catalog::from_path("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, CatalogError::Io { .. }));
        assert!(err.to_string().contains("/definitely/not/here.json"));
    }
}
