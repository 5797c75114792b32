//! Unit conversion and vet-precision rounding.
//!
//! Weight: kg, lbs, g, oz. Volume: mL, L. Dosage: mg, mcg, g, mL.
//!
//! All internal math runs at full `f64` precision. Rounding is applied once,
//! as the last step of a public conversion, using the per-unit table in
//! [`Unit::decimals`]. The `exact_*` helpers are the unrounded forms used by
//! the calculator.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{CalcResult, DosageError};

/// Pounds per kilogram.
pub const LBS_PER_KG: f64 = 2.20462;
/// Kilograms per gram.
pub const KG_PER_G: f64 = 0.001;
/// Pounds per ounce.
pub const LBS_PER_OZ: f64 = 0.0625;
/// Milligrams per gram.
pub const MG_PER_G: f64 = 1000.0;
/// Micrograms per milligram.
pub const MCG_PER_MG: f64 = 1000.0;
/// Millilitres per litre.
pub const ML_PER_L: f64 = 1000.0;

/// Every unit the engine knows how to convert or round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Unit {
    #[serde(rename = "kg")]
    Kg,
    #[serde(rename = "lbs", alias = "lb")]
    Lbs,
    #[serde(rename = "g")]
    G,
    #[serde(rename = "oz")]
    Oz,
    #[serde(rename = "mg")]
    Mg,
    #[serde(rename = "mcg")]
    Mcg,
    #[serde(rename = "mL", alias = "ml")]
    Ml,
    #[serde(rename = "L", alias = "l")]
    L,
    #[serde(rename = "tablets")]
    Tablets,
}

impl Unit {
    /// Canonical display string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Unit::Kg => "kg",
            Unit::Lbs => "lbs",
            Unit::G => "g",
            Unit::Oz => "oz",
            Unit::Mg => "mg",
            Unit::Mcg => "mcg",
            Unit::Ml => "mL",
            Unit::L => "L",
            Unit::Tablets => "tablets",
        }
    }

    /// Decimal places reported for this unit.
    pub fn decimals(&self) -> i32 {
        match self {
            Unit::Kg | Unit::Lbs | Unit::Oz => 2,
            Unit::G | Unit::Mg | Unit::Tablets => 1,
            Unit::Mcg => 0,
            Unit::Ml => 2,
            Unit::L => 3,
        }
    }

    /// Kilograms per one of this unit, for weight units.
    fn kg_factor(&self) -> Option<f64> {
        match self {
            Unit::Kg => Some(1.0),
            Unit::Lbs => Some(1.0 / LBS_PER_KG),
            Unit::G => Some(KG_PER_G),
            Unit::Oz => Some(LBS_PER_OZ / LBS_PER_KG),
            _ => None,
        }
    }

    /// Millilitres per one of this unit, for volume units.
    fn ml_factor(&self) -> Option<f64> {
        match self {
            Unit::Ml => Some(1.0),
            Unit::L => Some(ML_PER_L),
            _ => None,
        }
    }

    /// Milligrams per one of this unit, for mass dosage units.
    fn mg_factor(&self) -> Option<f64> {
        match self {
            Unit::Mg => Some(1.0),
            Unit::Mcg => Some(1.0 / MCG_PER_MG),
            Unit::G => Some(MG_PER_G),
            _ => None,
        }
    }

    pub fn is_weight(&self) -> bool {
        self.kg_factor().is_some()
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Unit {
    type Err = DosageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unit = match s.trim().to_lowercase().as_str() {
            "kg" | "kgs" | "kilogram" | "kilograms" => Unit::Kg,
            "lb" | "lbs" | "pound" | "pounds" => Unit::Lbs,
            "g" | "gram" | "grams" => Unit::G,
            "oz" | "ounce" | "ounces" => Unit::Oz,
            "mg" | "milligram" | "milligrams" => Unit::Mg,
            "mcg" | "ug" | "µg" | "microgram" | "micrograms" => Unit::Mcg,
            "ml" | "cc" | "milliliter" | "milliliters" => Unit::Ml,
            "l" | "liter" | "liters" => Unit::L,
            "tablet" | "tablets" | "tab" | "tabs" => Unit::Tablets,
            _ => return Err(DosageError::UnsupportedUnit(s.to_string())),
        };
        Ok(unit)
    }
}

/// Display unit a caller may request for a computed dose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetUnit {
    #[default]
    Mg,
    Ml,
    Tablets,
}

impl TargetUnit {
    pub fn unit(&self) -> Unit {
        match self {
            TargetUnit::Mg => Unit::Mg,
            TargetUnit::Ml => Unit::Ml,
            TargetUnit::Tablets => Unit::Tablets,
        }
    }
}

impl FromStr for TargetUnit {
    type Err = DosageError;

    /// Only the three wire names are accepted; `mL` is the display spelling.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mg" => Ok(TargetUnit::Mg),
            "ml" | "mL" => Ok(TargetUnit::Ml),
            "tablets" => Ok(TargetUnit::Tablets),
            _ => Err(DosageError::UnsupportedUnit(s.to_string())),
        }
    }
}

/// Round a value to the fixed precision for `unit`.
pub fn round_to_precision(value: f64, unit: Unit) -> f64 {
    let factor = 10f64.powi(unit.decimals());
    (value * factor).round() / factor
}

/// Convert a weight to kilograms without rounding.
pub fn exact_weight_to_kg(value: f64, unit: Unit) -> CalcResult<f64> {
    unit.kg_factor()
        .map(|factor| value * factor)
        .ok_or_else(|| DosageError::UnsupportedUnit(unit.to_string()))
}

/// Convert a weight to kilograms, rounded to kg precision.
pub fn weight_to_kg(value: f64, unit: Unit) -> CalcResult<f64> {
    Ok(round_to_precision(exact_weight_to_kg(value, unit)?, Unit::Kg))
}

/// Convert kilograms to another weight unit, rounded to that unit's precision.
pub fn kg_to_weight(kg: f64, unit: Unit) -> CalcResult<f64> {
    let factor = unit
        .kg_factor()
        .ok_or_else(|| DosageError::UnsupportedUnit(unit.to_string()))?;
    Ok(round_to_precision(kg / factor, unit))
}

/// Convert between any two weight units.
pub fn convert_weight(value: f64, from: Unit, to: Unit) -> CalcResult<f64> {
    let kg = exact_weight_to_kg(value, from)?;
    kg_to_weight(kg, to)
}

/// Convert between volume units (mL, L).
pub fn convert_volume(value: f64, from: Unit, to: Unit) -> CalcResult<f64> {
    let from_ml = from
        .ml_factor()
        .ok_or_else(|| DosageError::UnsupportedUnit(from.to_string()))?;
    let to_ml = to
        .ml_factor()
        .ok_or_else(|| DosageError::UnsupportedUnit(to.to_string()))?;
    Ok(round_to_precision(value * from_ml / to_ml, to))
}

/// Convert a dose between mg, mcg, g and mL without rounding.
///
/// Any conversion touching mL needs a concentration in mg/mL. There is no
/// implicit default.
pub fn exact_convert_dose(
    value: f64,
    from: Unit,
    to: Unit,
    concentration_mg_per_ml: Option<f64>,
) -> CalcResult<f64> {
    let mg = to_mg(value, from, concentration_mg_per_ml)?;
    from_mg(mg, to, concentration_mg_per_ml)
}

/// Convert a dose between mg, mcg, g and mL, rounded to the target precision.
pub fn convert_dose(
    value: f64,
    from: Unit,
    to: Unit,
    concentration_mg_per_ml: Option<f64>,
) -> CalcResult<f64> {
    let converted = exact_convert_dose(value, from, to, concentration_mg_per_ml)?;
    Ok(round_to_precision(converted, to))
}

/// Convert milligrams to a tablet count, rounded to tablet precision.
pub fn mg_to_tablets(mg: f64, mg_per_tablet: Option<f64>) -> CalcResult<f64> {
    let per_tablet = usable_fact(mg_per_tablet)
        .ok_or_else(|| DosageError::MissingUnitsPerTablet(format!("{} mg", mg)))?;
    Ok(round_to_precision(mg / per_tablet, Unit::Tablets))
}

fn to_mg(value: f64, from: Unit, concentration: Option<f64>) -> CalcResult<f64> {
    if from == Unit::Ml {
        let conc = usable_fact(concentration)
            .ok_or_else(|| DosageError::MissingConcentration(format!("{} mL", value)))?;
        return Ok(value * conc);
    }
    from.mg_factor()
        .map(|factor| value * factor)
        .ok_or_else(|| DosageError::UnsupportedUnit(from.to_string()))
}

fn from_mg(mg: f64, to: Unit, concentration: Option<f64>) -> CalcResult<f64> {
    if to == Unit::Ml {
        let conc = usable_fact(concentration)
            .ok_or_else(|| DosageError::MissingConcentration(format!("{} mg", mg)))?;
        return Ok(mg / conc);
    }
    to.mg_factor()
        .map(|factor| mg / factor)
        .ok_or_else(|| DosageError::UnsupportedUnit(to.to_string()))
}

/// Format a number for narrative text: at most two decimals, no trailing zeros.
pub fn format_number(value: f64) -> String {
    let formatted = format!("{:.2}", value);
    let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');
    if trimmed == "-0" {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

/// A conversion fact is usable only when it is finite and positive.
pub(crate) fn usable_fact(fact: Option<f64>) -> Option<f64> {
    fact.filter(|v| v.is_finite() && *v > 0.0)
}
