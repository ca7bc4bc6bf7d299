use crate::compute::DataVar;
use crate::config::Catalog;
use crate::store::{Dataset, ScenarioUniverse};
use super::derived::create_extra_variables;
use super::metadata::{build_universe, VettingRecord};
use super::units::convert_units;
use super::PrepError;
use tracing::info;

/// Runs the preprocessing stages on a raw export: derived variables, then
/// unit conversion, then the scenario universe.
pub fn import(raw: &Dataset, vetting: &[VettingRecord], catalog: &Catalog) -> Result<(Dataset, ScenarioUniverse), PrepError> {
    if raw.years().is_empty() {
        return Err(PrepError::EmptyDataset);
    }
    info!(rows = raw.len(), years = raw.years().len(), "importing scenario data");

    let dataset = create_extra_variables(raw)?;
    info!(rows = dataset.len(), "derived variables created");

    let dataset = convert_units(&dataset, &catalog.unit_conversions);
    let universe = build_universe(&dataset, vetting, catalog);
    info!(scenarios = universe.len(), "scenario metadata ready");

    Ok((dataset, universe))
}

/// [`import`] followed by construction of the variable factory. Every
/// catalog year must be a column of `raw`.
pub fn load(raw: &Dataset, vetting: &[VettingRecord], catalog: Catalog) -> Result<DataVar, PrepError> {
    let (dataset, universe) = import(raw, vetting, &catalog)?;
    Ok(DataVar::new(dataset, universe, catalog)?)
}
