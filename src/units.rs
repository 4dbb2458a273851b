//! Mass and length conversions
//!
//! The metabolic core works in kilograms and centimeters. Pounds and inches only
//! appear at the input/display boundary, through these helpers or [`Units`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::DietError;

/// Kilograms per pound
pub const KG_PER_LB: f64 = 0.453592;

/// Centimeters per inch
pub const CM_PER_INCH: f64 = 2.54;

/// Pounds to kilograms
pub fn to_kg(lbs: f64) -> f64 {
    lbs * KG_PER_LB
}

/// Kilograms to pounds
pub fn to_lbs(kg: f64) -> f64 {
    kg / KG_PER_LB
}

/// Inches to centimeters
pub fn to_cm(inches: f64) -> f64 {
    inches * CM_PER_INCH
}

/// Centimeters to inches
pub fn to_inches(cm: f64) -> f64 {
    cm / CM_PER_INCH
}

/// Convert a sequence of kilogram values to pounds
pub fn slice_to_lbs(kgs: &[f64]) -> Vec<f64> {
    kgs.iter().copied().map(to_lbs).collect()
}

/// Measurement system used for user-facing input and output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    #[default]
    Metric,
    Imperial,
}

impl Units {
    /// Interpret a user-supplied mass as kilograms
    pub fn mass_to_kg(&self, value: f64) -> f64 {
        match self {
            Units::Metric => value,
            Units::Imperial => to_kg(value),
        }
    }

    /// Express a kilogram mass in this system
    pub fn mass_from_kg(&self, kg: f64) -> f64 {
        match self {
            Units::Metric => kg,
            Units::Imperial => to_lbs(kg),
        }
    }

    /// Interpret a user-supplied length as centimeters
    pub fn length_to_cm(&self, value: f64) -> f64 {
        match self {
            Units::Metric => value,
            Units::Imperial => to_cm(value),
        }
    }

    /// Express a centimeter length in this system
    pub fn length_from_cm(&self, cm: f64) -> f64 {
        match self {
            Units::Metric => cm,
            Units::Imperial => to_inches(cm),
        }
    }

    pub fn mass_label(&self) -> &'static str {
        match self {
            Units::Metric => "kg",
            Units::Imperial => "lbs",
        }
    }

    pub fn length_label(&self) -> &'static str {
        match self {
            Units::Metric => "cm",
            Units::Imperial => "in",
        }
    }
}

impl fmt::Display for Units {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Units::Metric => write!(f, "metric"),
            Units::Imperial => write!(f, "imperial"),
        }
    }
}

impl FromStr for Units {
    type Err = DietError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "metric" | "si" => Ok(Units::Metric),
            "imperial" | "us" => Ok(Units::Imperial),
            _ => Err(DietError::InvalidArgument(format!(
                "units: metric|imperial only, got '{}'",
                s
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_known_conversions() {
        assert!((to_cm(77.0) - 195.58).abs() < 1e-9);
        assert!((to_inches(2.54) - 1.0).abs() < 1e-12);
        assert!((to_kg(1.0) - 0.453592).abs() < 1e-12);
        assert!((to_lbs(100.0) - 220.462_26).abs() < 1e-3);
    }

    #[test]
    fn test_negative_values_pass_through() {
        assert!(to_kg(-10.0) < 0.0);
        assert!(to_inches(-2.54) < 0.0);
    }

    #[test]
    fn test_slice_to_lbs() {
        let lbs = slice_to_lbs(&[to_kg(222.0), to_kg(200.0)]);
        assert_eq!(lbs.len(), 2);
        assert!((lbs[0] - 222.0).abs() < 1e-9);
        assert!((lbs[1] - 200.0).abs() < 1e-9);
        assert!(slice_to_lbs(&[]).is_empty());
    }

    #[test]
    fn test_units_boundary_conversion() {
        assert_eq!(Units::Metric.mass_to_kg(80.0), 80.0);
        assert!((Units::Imperial.mass_to_kg(222.0) - to_kg(222.0)).abs() < 1e-12);
        assert!((Units::Imperial.length_to_cm(77.0) - 195.58).abs() < 1e-9);
        assert!((Units::Imperial.length_from_cm(195.58) - 77.0).abs() < 1e-9);
        assert_eq!(Units::Imperial.mass_label(), "lbs");
        assert_eq!(Units::Metric.length_label(), "cm");
    }

    #[test]
    fn test_units_parsing() {
        assert_eq!("Imperial".parse::<Units>().unwrap(), Units::Imperial);
        assert_eq!("metric".parse::<Units>().unwrap(), Units::Metric);
        assert!("furlongs".parse::<Units>().is_err());
    }

    proptest! {
        #[test]
        fn test_mass_round_trip(x in -1.0e6f64..1.0e6f64) {
            let back = to_lbs(to_kg(x));
            prop_assert!((back - x).abs() <= 1e-9 * x.abs().max(1.0));
        }

        #[test]
        fn test_length_round_trip(x in -1.0e6f64..1.0e6f64) {
            let back = to_inches(to_cm(x));
            prop_assert!((back - x).abs() <= 1e-9 * x.abs().max(1.0));
        }
    }
}
