use serde::{Serialize, Deserialize};
use std::fmt;
use std::str::FromStr;

/// Unique identity of one (model, scenario) pair, e.g. `"IMAGE 3.0.1 SSP1-19"`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ScenarioName(pub String);

impl ScenarioName {
    pub fn new(model: &str, scenario: &str) -> Self { Self(format!("{} {}", model, scenario)) }
    pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for ScenarioName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

impl From<&str> for ScenarioName {
    fn from(s: &str) -> Self { Self(s.to_string()) }
}

/// A year column label. Labels are compared as strings, so `"2030"` and
/// `"2030.0"` are different columns.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct YearKey(pub String);

impl YearKey {
    pub fn as_str(&self) -> &str { &self.0 }

    /// Numeric position of the label on the time axis, if it has one.
    pub fn to_f64(&self) -> Option<f64> {
        self.0.trim().parse::<f64>().ok().filter(|y| y.is_finite())
    }
}

impl fmt::Display for YearKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

impl From<&str> for YearKey {
    fn from(s: &str) -> Self { Self(s.to_string()) }
}

impl From<String> for YearKey {
    fn from(s: String) -> Self { Self(s) }
}

impl From<u32> for YearKey {
    fn from(y: u32) -> Self { Self(y.to_string()) }
}

impl From<f64> for YearKey {
    fn from(y: f64) -> Self { Self(y.to_string()) }
}

/// The year shape of a variable.
///
/// `Single` is scalar mode (one value per scenario), `Multiple` is vector mode
/// (one value per scenario per listed year, in order).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Years {
    Single(YearKey),
    Multiple(Vec<YearKey>),
}

impl Years {
    pub fn is_single(&self) -> bool { matches!(self, Years::Single(_)) }

    /// The year labels as a list; a single year yields a one-element list.
    pub fn to_vec(&self) -> Vec<YearKey> {
        match self {
            Years::Single(y) => vec![y.clone()],
            Years::Multiple(ys) => ys.clone(),
        }
    }

    pub fn len(&self) -> usize {
        match self { Years::Single(_) => 1, Years::Multiple(ys) => ys.len() }
    }

    pub fn is_empty(&self) -> bool { self.len() == 0 }

    /// Position of `year` in the label list.
    pub fn position(&self, year: &YearKey) -> Option<usize> {
        match self {
            Years::Single(y) => (y == year).then_some(0),
            Years::Multiple(ys) => ys.iter().position(|y| y == year),
        }
    }
}

impl fmt::Display for Years {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Years::Single(y) => write!(f, "{}", y),
            Years::Multiple(ys) => {
                let labels: Vec<&str> = ys.iter().map(|y| y.as_str()).collect();
                write!(f, "[{}]", labels.join(", "))
            }
        }
    }
}

impl From<&str> for Years {
    fn from(y: &str) -> Self { Years::Single(y.into()) }
}

impl From<u32> for Years {
    fn from(y: u32) -> Self { Years::Single(y.into()) }
}

impl From<f64> for Years {
    fn from(y: f64) -> Self { Years::Single(y.into()) }
}

impl From<YearKey> for Years {
    fn from(y: YearKey) -> Self { Years::Single(y) }
}

impl<T: Into<YearKey>> From<Vec<T>> for Years {
    fn from(ys: Vec<T>) -> Self { Years::Multiple(ys.into_iter().map(Into::into).collect()) }
}

impl<T: Into<YearKey>, const N: usize> From<[T; N]> for Years {
    fn from(ys: [T; N]) -> Self { Years::Multiple(ys.into_iter().map(Into::into).collect()) }
}

/// Ordinal climate outcome class, `C1` (most ambitious) to `C8`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    C1,
    C2,
    C3,
    C4,
    C5,
    C6,
    C7,
    C8,
}

impl Category {
    pub const ALL: [Category; 8] = [
        Category::C1, Category::C2, Category::C3, Category::C4,
        Category::C5, Category::C6, Category::C7, Category::C8,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::C1 => "C1",
            Category::C2 => "C2",
            Category::C3 => "C3",
            Category::C4 => "C4",
            Category::C5 => "C5",
            Category::C6 => "C6",
            Category::C7 => "C7",
            Category::C8 => "C8",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == s.trim())
            .ok_or_else(|| format!("{} is not a valid climate category.", s))
    }
}

/// Element-wise binary operations shared by the variable algebra and the
/// derived-variable builder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operation {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl Operation {
    #[inline(always)]
    pub fn apply(&self, l: f64, r: f64) -> f64 {
        match self {
            Operation::Add => l + r,
            Operation::Subtract => l - r,
            Operation::Multiply => l * r,
            // Division by zero yields inf/NaN like any float table would.
            Operation::Divide => l / r,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Operation::Add => "+",
            Operation::Subtract => "-",
            Operation::Multiply => "*",
            Operation::Divide => "/",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("C1", Some(Category::C1))]
    #[case(" C8 ", Some(Category::C8))]
    #[case("C9", None)]
    #[case("c1", None)]
    #[case("", None)]
    fn test_category_parsing(#[case] input: &str, #[case] expected: Option<Category>) {
        assert_eq!(input.parse::<Category>().ok(), expected);
    }

    #[test]
    fn test_category_order_is_ordinal() {
        let mut cats = vec![Category::C3, Category::C1, Category::C8, Category::C2];
        cats.sort();
        assert_eq!(cats, vec![Category::C1, Category::C2, Category::C3, Category::C8]);
    }

    #[test]
    fn test_years_shapes() {
        assert_eq!(Years::from("2030"), Years::Single(YearKey::from("2030")));
        assert_eq!(Years::from(2030u32).to_vec(), vec![YearKey::from("2030")]);
        let multi = Years::from(["2020", "2030"]);
        assert!(!multi.is_single());
        assert_eq!(multi.len(), 2);
        assert_eq!(multi.to_string(), "[2020, 2030]");
    }

    #[rstest]
    #[case("2030", Some(2030.0))]
    #[case("2032.5", Some(2032.5))]
    #[case("next year", None)]
    fn test_year_key_numeric(#[case] label: &str, #[case] expected: Option<f64>) {
        assert_eq!(YearKey::from(label).to_f64(), expected);
    }

    #[test]
    fn test_scenario_name_joins_model_and_scenario() {
        assert_eq!(ScenarioName::new("M1", "S1").as_str(), "M1 S1");
    }
}
