use crate::config::Catalog;
use crate::store::{Dataset, ScenarioUniverse, Years};
use super::error::VarError;
use super::interp::{Interpolator, LinearInterpolator};
use super::var::{DataContext, Var};
use std::sync::Arc;
use tracing::info;

/// Extra construction options forwarded to `Var`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct VarOptions {
    /// Fill value for every missing cell.
    pub default: Option<f64>,
}

impl VarOptions {
    pub fn with_default(value: f64) -> Self { Self { default: Some(value) } }
}

/// Hands out variables bound to one loaded dataset.
///
/// Cloning is cheap; all clones share the same snapshots.
#[derive(Debug, Clone)]
pub struct DataVar {
    ctx: Arc<DataContext>,
}

impl DataVar {
    /// Uses the linear interpolator and derives the vetted universe from the
    /// `vetted` flags of `scenarios`.
    pub fn new(dataset: Dataset, scenarios: ScenarioUniverse, catalog: Catalog) -> Result<Self, VarError> {
        Self::with_interpolator(dataset, scenarios, catalog, Arc::new(LinearInterpolator))
    }

    pub fn with_interpolator(
        dataset: Dataset,
        scenarios: ScenarioUniverse,
        catalog: Catalog,
        interpolator: Arc<dyn Interpolator>,
    ) -> Result<Self, VarError> {
        let vetted_scenarios = scenarios.vetted();
        Self::from_parts(dataset, scenarios, vetted_scenarios, catalog, interpolator)
    }

    /// Fails when a catalog year has no column in the dataset; such a year
    /// would be read as all-missing instead of being interpolated.
    pub fn from_parts(
        dataset: Dataset,
        scenarios: ScenarioUniverse,
        vetted_scenarios: ScenarioUniverse,
        catalog: Catalog,
        interpolator: Arc<dyn Interpolator>,
    ) -> Result<Self, VarError> {
        let missing: Vec<&str> = catalog
            .known_years
            .iter()
            .filter(|y| dataset.year_position(y).is_none())
            .map(|y| y.0.as_str())
            .collect();
        if !missing.is_empty() {
            return Err(VarError::KnownYearsMissing(missing.join(", ")));
        }

        info!(
            rows = dataset.len(),
            scenarios = scenarios.len(),
            vetted = vetted_scenarios.len(),
            "variable factory ready"
        );
        Ok(Self {
            ctx: Arc::new(DataContext { dataset, scenarios, vetted_scenarios, catalog, interpolator }),
        })
    }

    /// A variable read from the dataset. `years` defaults to every known year.
    pub fn create(&self, variable: &str, years: Option<Years>, options: VarOptions) -> Result<Var, VarError> {
        Var::new(self.ctx.clone(), Some(variable), years, None, options.default)
    }

    /// Shorthand for `create` with a year (or year list) and no options.
    pub fn get(&self, variable: &str, years: impl Into<Years>) -> Result<Var, VarError> {
        self.create(variable, Some(years.into()), VarOptions::default())
    }

    pub fn context(&self) -> &Arc<DataContext> { &self.ctx }
    pub fn dataset(&self) -> &Dataset { &self.ctx.dataset }
    pub fn scenarios(&self) -> &ScenarioUniverse { &self.ctx.scenarios }
    pub fn vetted_scenarios(&self) -> &ScenarioUniverse { &self.ctx.vetted_scenarios }
    pub fn catalog(&self) -> &Catalog { &self.ctx.catalog }
}
