//! Unit normalization - heterogeneous package measurements to inches and ounces

use serde::{Deserialize, Serialize};

/// Centimeters per inch
pub const CM_PER_INCH: f64 = 2.54;

/// Millimeters per inch
pub const MM_PER_INCH: f64 = 25.4;

/// Grams per ounce
pub const GRAMS_PER_OUNCE: f64 = 28.3495;

/// Ounces per pound
pub const OUNCES_PER_POUND: f64 = 16.0;

/// Length unit for a single package dimension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[derive(Default)]
pub enum LengthUnit {
    #[default]
    In,
    Cm,
    Mm,
}

impl LengthUnit {
    /// Convert a value in this unit to inches
    pub fn to_inches(self, value: f64) -> f64 {
        let value = sanitize(value);
        match self {
            LengthUnit::In => value,
            LengthUnit::Cm => value / CM_PER_INCH,
            LengthUnit::Mm => value / MM_PER_INCH,
        }
    }
}

impl std::fmt::Display for LengthUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LengthUnit::In => write!(f, "in"),
            LengthUnit::Cm => write!(f, "cm"),
            LengthUnit::Mm => write!(f, "mm"),
        }
    }
}

impl std::str::FromStr for LengthUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "in" | "inch" | "inches" => Ok(LengthUnit::In),
            "cm" => Ok(LengthUnit::Cm),
            "mm" => Ok(LengthUnit::Mm),
            _ => Err(format!("Invalid length unit: {}. Use in, cm, or mm", s)),
        }
    }
}

/// Weight unit for the package's actual weight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[derive(Default)]
pub enum WeightUnit {
    #[default]
    Oz,
    Lb,
    G,
    Kg,
}

impl WeightUnit {
    /// Convert a value in this unit to ounces
    pub fn to_ounces(self, value: f64) -> f64 {
        let value = sanitize(value);
        match self {
            WeightUnit::Oz => value,
            WeightUnit::Lb => value * OUNCES_PER_POUND,
            WeightUnit::G => value / GRAMS_PER_OUNCE,
            WeightUnit::Kg => value * 1000.0 / GRAMS_PER_OUNCE,
        }
    }
}

impl std::fmt::Display for WeightUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WeightUnit::Oz => write!(f, "oz"),
            WeightUnit::Lb => write!(f, "lb"),
            WeightUnit::G => write!(f, "g"),
            WeightUnit::Kg => write!(f, "kg"),
        }
    }
}

impl std::str::FromStr for WeightUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "oz" | "ounce" | "ounces" => Ok(WeightUnit::Oz),
            "lb" | "lbs" | "pound" | "pounds" => Ok(WeightUnit::Lb),
            "g" | "gram" | "grams" => Ok(WeightUnit::G),
            "kg" => Ok(WeightUnit::Kg),
            _ => Err(format!("Invalid weight unit: {}. Use oz, lb, g, or kg", s)),
        }
    }
}

/// Package measurements exactly as the caller entered them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackageSpec {
    pub length: f64,
    pub width: f64,
    pub height: f64,

    #[serde(default)]
    pub length_unit: LengthUnit,
    #[serde(default)]
    pub width_unit: LengthUnit,
    #[serde(default)]
    pub height_unit: LengthUnit,

    pub actual_weight: f64,

    #[serde(default)]
    pub weight_unit: WeightUnit,
}

impl PackageSpec {
    /// Create a spec with all dimensions in one length unit
    pub fn new(
        length: f64,
        width: f64,
        height: f64,
        length_unit: LengthUnit,
        actual_weight: f64,
        weight_unit: WeightUnit,
    ) -> Self {
        Self {
            length,
            width,
            height,
            length_unit,
            width_unit: length_unit,
            height_unit: length_unit,
            actual_weight,
            weight_unit,
        }
    }

    /// Convenience constructor for inches and ounces
    pub fn inches_ounces(length: f64, width: f64, height: f64, weight_oz: f64) -> Self {
        Self::new(length, width, height, LengthUnit::In, weight_oz, WeightUnit::Oz)
    }
}

/// Package measurements in canonical units (inches, ounces)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalizedPackage {
    pub length_in: f64,
    pub width_in: f64,
    pub height_in: f64,
    pub weight_oz: f64,
}

impl NormalizedPackage {
    /// Dimensions sorted longest first
    pub fn sorted_dims(&self) -> [f64; 3] {
        let mut dims = [self.length_in, self.width_in, self.height_in];
        dims.sort_by(|a, b| b.total_cmp(a));
        dims
    }

    /// Same dimensions with a different weight
    pub fn with_weight(&self, weight_oz: f64) -> Self {
        Self {
            weight_oz: sanitize(weight_oz),
            ..*self
        }
    }
}

/// Convert a package spec to inches and ounces. No rounding is applied.
pub fn normalize(spec: &PackageSpec) -> NormalizedPackage {
    NormalizedPackage {
        length_in: spec.length_unit.to_inches(spec.length),
        width_in: spec.width_unit.to_inches(spec.width),
        height_in: spec.height_unit.to_inches(spec.height),
        weight_oz: spec.weight_unit.to_ounces(spec.actual_weight),
    }
}

/// Coerce degenerate numeric input (negative, NaN, infinite) to zero
pub fn sanitize(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_inches_and_ounces_pass_through() {
        let n = normalize(&PackageSpec::inches_ounces(10.0, 8.0, 1.0, 14.0));
        assert_eq!(n.length_in, 10.0);
        assert_eq!(n.width_in, 8.0);
        assert_eq!(n.height_in, 1.0);
        assert_eq!(n.weight_oz, 14.0);
    }

    #[test]
    fn test_metric_conversion() {
        let spec = PackageSpec::new(25.4, 254.0, 2.54, LengthUnit::Cm, 283.495, WeightUnit::G);
        let n = normalize(&spec);
        assert!(approx(n.length_in, 10.0));
        assert!(approx(n.width_in, 100.0));
        assert!(approx(n.height_in, 1.0));
        assert!(approx(n.weight_oz, 10.0));
    }

    #[test]
    fn test_mixed_units_per_dimension() {
        let spec = PackageSpec {
            length: 10.0,
            width: 25.4,
            height: 254.0,
            length_unit: LengthUnit::In,
            width_unit: LengthUnit::Cm,
            height_unit: LengthUnit::Mm,
            actual_weight: 2.0,
            weight_unit: WeightUnit::Lb,
        };
        let n = normalize(&spec);
        assert!(approx(n.width_in, 10.0));
        assert!(approx(n.height_in, 10.0));
        assert!(approx(n.weight_oz, 32.0));
    }

    #[test]
    fn test_kilograms() {
        assert!(approx(WeightUnit::Kg.to_ounces(1.0), 1000.0 / GRAMS_PER_OUNCE));
    }

    #[test]
    fn test_degenerate_values_become_zero() {
        let spec = PackageSpec::inches_ounces(-3.0, f64::NAN, f64::INFINITY, -1.0);
        let n = normalize(&spec);
        assert_eq!(n.length_in, 0.0);
        assert_eq!(n.width_in, 0.0);
        assert_eq!(n.height_in, 0.0);
        assert_eq!(n.weight_oz, 0.0);
    }

    #[test]
    fn test_sorted_dims_descending() {
        let n = normalize(&PackageSpec::inches_ounces(2.0, 9.0, 5.0, 1.0));
        assert_eq!(n.sorted_dims(), [9.0, 5.0, 2.0]);
    }

    #[test]
    fn test_unit_parsing() {
        assert_eq!("CM".parse::<LengthUnit>().unwrap(), LengthUnit::Cm);
        assert_eq!("lbs".parse::<WeightUnit>().unwrap(), WeightUnit::Lb);
        assert!("furlong".parse::<LengthUnit>().is_err());
    }
}
