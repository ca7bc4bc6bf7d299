//! derived.rs
//! Composite variables built from two existing ones.

use crate::store::{DataRow, Dataset, Operation};
use super::PrepError;
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

pub const CO2: &str = "Emissions|CO2";
pub const KYOTO: &str = "Emissions|Kyoto Gases";

/// Recipe for `name = left op right`.
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedVariable {
    pub left: String,
    pub right: String,
    pub name: String,
    pub op: Operation,
    /// Stands in for a missing left value (or a scenario lacking `left`).
    pub left_default: Option<f64>,
    pub right_default: Option<f64>,
    /// Unit of the result; the left unit when unset.
    pub unit: Option<String>,
}

impl DerivedVariable {
    pub fn new(left: &str, right: &str, name: &str, op: Operation) -> Self {
        Self {
            left: left.to_string(),
            right: right.to_string(),
            name: name.to_string(),
            op,
            left_default: None,
            right_default: None,
            unit: None,
        }
    }

    pub fn defaults(mut self, left: f64, right: f64) -> Self {
        self.left_default = Some(left);
        self.right_default = Some(right);
        self
    }

    pub fn unit(mut self, unit: &str) -> Self {
        self.unit = Some(unit.to_string());
        self
    }
}

/// Returns `dataset` with the rows of `spec.name` appended.
///
/// A scenario gets a row when it has both operands, or when every operand it
/// lacks has a default.
pub fn create_variable(dataset: &Dataset, spec: &DerivedVariable) -> Result<Dataset, PrepError> {
    if dataset.has_variable(&spec.name) {
        return Err(PrepError::DuplicateVariable(spec.name.clone()));
    }

    let left: HashMap<_, _> = dataset.rows_for(&spec.left).map(|r| (&r.name, r)).collect();
    let right: HashMap<_, _> = dataset.rows_for(&spec.right).map(|r| (&r.name, r)).collect();
    if left.is_empty() && right.is_empty() {
        warn!(left = %spec.left, right = %spec.right, name = %spec.name, "no operand rows, variable not created");
        return Ok(dataset.clone());
    }

    // Scenario order: left rows first, then scenarios only the right side has.
    let mut seen = HashSet::new();
    let order: Vec<&DataRow> = dataset
        .rows_for(&spec.left)
        .chain(dataset.rows_for(&spec.right))
        .filter(|r| seen.insert(&r.name))
        .collect();

    let width = dataset.years().len();
    let mut created = Vec::new();
    for template in order {
        let l = left.get(&template.name).copied();
        let r = right.get(&template.name).copied();
        if (l.is_none() && spec.left_default.is_none()) || (r.is_none() && spec.right_default.is_none()) {
            continue;
        }
        let values = (0..width)
            .map(|i| {
                let a = operand(l, i, spec.left_default);
                let b = operand(r, i, spec.right_default);
                spec.op.apply(a, b)
            })
            .collect();
        let unit = spec
            .unit
            .clone()
            .or_else(|| l.map(|row| row.unit.clone()))
            .unwrap_or_else(|| template.unit.clone());
        created.push(DataRow::new(&template.model, &template.scenario, &spec.name, &unit, values));
    }

    debug!(name = %spec.name, op = spec.op.symbol(), rows = created.len(), "derived variable");
    Ok(dataset.with_rows(created))
}

fn operand(row: Option<&DataRow>, i: usize, default: Option<f64>) -> f64 {
    let v = row.map_or(f64::NAN, |r| r.values[i]);
    match default {
        Some(d) if v.is_nan() => d,
        _ => v,
    }
}

/// Simplified labels for the variables used in sector breakdowns.
pub const RENAMES: [(&str, &str); 8] = [
    ("Carbon Sequestration|CCS|Biomass", "BECCS"),
    ("Emissions|CO2|Energy|Supply", "Energy Supply"),
    ("Carbon Sequestration|BECCS+DAC", "Energy Supply (neg.)"),
    ("Emissions|CO2|Energy|Supply Gross Positive", "Energy Supply (pos.)"),
    ("Emissions|CO2|AFOLU", "LULUCF"),
    ("Emissions|CO2|Energy|Demand|Transportation", "Transport"),
    ("Emissions|CO2|Energy|Demand|Residential and Commercial", "Buildings"),
    ("Emissions|CO2|Other", "Other"),
];

/// The standard set of sector aggregates, followed by sign flipping of the
/// CCS variables (sequestration counts as negative emissions) and renaming.
pub fn create_extra_variables(dataset: &Dataset) -> Result<Dataset, PrepError> {
    let recipes = [
        DerivedVariable::new(
            "Emissions|CO2|Energy|Demand|Industry",
            "Emissions|CO2|Industrial Processes",
            "Industry",
            Operation::Add,
        )
        .defaults(0.0, 0.0),
        DerivedVariable::new(
            "Emissions|CO2|Energy|Demand|AFOFI",
            "Emissions|CO2|Energy|Demand|Other Sector",
            "Other Energy Demand",
            Operation::Add,
        )
        .defaults(0.0, 0.0),
        DerivedVariable::new(
            "Carbon Sequestration|CCS|Biomass",
            "Carbon Sequestration|Direct Air Capture",
            "Carbon Sequestration|BECCS+DAC",
            Operation::Add,
        )
        .defaults(0.0, 0.0),
        DerivedVariable::new(
            "Emissions|CO2|Energy|Supply",
            "Carbon Sequestration|BECCS+DAC",
            "Emissions|CO2|Energy|Supply Gross Positive",
            Operation::Add,
        )
        .defaults(0.0, 0.0),
        DerivedVariable::new(KYOTO, CO2, "Emissions|Non-CO2", Operation::Subtract).unit("Mt CO2-equiv/yr"),
    ];

    let mut out = dataset.clone();
    for recipe in &recipes {
        out = create_variable(&out, recipe)?;
    }

    let renames: HashMap<&str, &str> = RENAMES.iter().copied().collect();
    Ok(out.map_rows(|mut row| {
        if row.variable.contains("CCS") {
            for v in row.values.iter_mut() {
                *v = -*v;
            }
        }
        if let Some(&to) = renames.get(row.variable.as_str()) {
            row.variable = to.to_string();
        }
        row
    }))
}
