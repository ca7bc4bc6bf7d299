use crate::config::UnitConversion;
use crate::store::Dataset;
use tracing::debug;

/// Rescales rows to the standard units. Rules apply in order, so a later rule
/// may pick up rows an earlier one produced.
pub fn convert_units(dataset: &Dataset, rules: &[UnitConversion]) -> Dataset {
    rules.iter().fold(dataset.clone(), |data, rule| {
        let mut converted = 0usize;
        let out = data.map_rows(|mut row| {
            if row.unit == rule.from {
                for v in row.values.iter_mut() {
                    *v *= rule.factor;
                }
                row.unit = rule.to.clone();
                converted += 1;
            }
            row
        });
        debug!(from = %rule.from, to = %rule.to, rows = converted, "unit conversion");
        out
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Catalog;
    use crate::store::{DataRow, ScenarioName};
    use rstest::rstest;

    #[rstest]
    #[case("Mt CO2/yr", 1500.0, "Gt CO2/yr", 1.5)]
    #[case("kt N2O/yr", 200.0, "Mt N2O/yr", 0.2)]
    #[case("Mt CO2-equiv/yr", 40.0, "Gt CO2-equiv/yr", 0.04)]
    #[case("Mt CH4/yr", 300.0, "Mt CH4/yr", 300.0)]
    fn test_default_conversions(#[case] unit: &str, #[case] value: f64, #[case] to: &str, #[case] expected: f64) {
        let ds = Dataset::from_rows(vec!["2020".into()], vec![DataRow::new("M", "S", "V", unit, vec![value])]);
        let out = convert_units(&ds, &Catalog::ar6().unit_conversions);
        let row = out.find(&ScenarioName::new("M", "S"), "V").unwrap();
        assert_eq!(row.unit, to);
        assert!((row.values[0] - expected).abs() < 1e-12);
        assert_eq!(ds.rows()[0].unit, unit);
    }

    #[test]
    fn test_missing_values_stay_missing() {
        let ds = Dataset::from_rows(vec!["2020".into()], vec![DataRow::new("M", "S", "V", "Mt CO2/yr", vec![f64::NAN])]);
        let out = convert_units(&ds, &Catalog::ar6().unit_conversions);
        assert!(out.rows()[0].values[0].is_nan());
    }
}
