use serde::Serialize;
use std::fmt::{Display, Formatter};

/// Output coordinates are written in metres, while geometry and configuration lengths are
/// normalized to millimetres.
pub const MM_PER_M: f64 = 1000.0;

/// Length units accepted in configuration column headers. All lengths are normalized to
/// millimetres, the smallest of them, before any geometric comparison.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LengthUnit {
    M,
    Dm,
    Cm,
    Mm,
}

impl LengthUnit {
    pub fn from_symbol(symbol: &str) -> Option<LengthUnit> {
        match symbol {
            "m" => Some(LengthUnit::M),
            "dm" => Some(LengthUnit::Dm),
            "cm" => Some(LengthUnit::Cm),
            "mm" => Some(LengthUnit::Mm),
            _ => None,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            LengthUnit::M => "m",
            LengthUnit::Dm => "dm",
            LengthUnit::Cm => "cm",
            LengthUnit::Mm => "mm",
        }
    }

    /// Millimetres per one of this unit
    pub fn factor(&self) -> f64 {
        match self {
            LengthUnit::M => 1000.0,
            LengthUnit::Dm => 100.0,
            LengthUnit::Cm => 10.0,
            LengthUnit::Mm => 1.0,
        }
    }

    pub fn to_base(&self, value: f64) -> f64 {
        value * self.factor()
    }
}

impl Display for LengthUnit {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use test_case::test_case;

    #[test_case("m", 2.5, 2500.0)]
    #[test_case("dm", 2.5, 250.0)]
    #[test_case("cm", 2.5, 25.0)]
    #[test_case("mm", 2.5, 2.5)]
    fn test_to_base(symbol: &str, value: f64, e: f64) {
        let unit = LengthUnit::from_symbol(symbol).unwrap();
        assert_relative_eq!(e, unit.to_base(value), epsilon = 1e-12);
        assert_eq!(symbol, unit.to_string());
    }

    #[test_case("K")]
    #[test_case("km")]
    #[test_case("")]
    fn test_unknown_symbol(symbol: &str) {
        assert_eq!(None, LengthUnit::from_symbol(symbol));
    }
}
