//! Vet-Dosage Core Library
//!
//! Deterministic veterinary dosage calculation with an auditable trail of
//! every adjustment applied.
//!
//! # Architecture
//!
//! ```text
//! DosageCalculationInput
//!         │
//!   Validate + Contraindication Gate ──► Err(Contraindicated)
//!         │
//!   Weight → kg
//!         │
//!   ┌─────┴──────────┬──────────────┬──────────────┐
//!   ▼                ▼              ▼              ▼
//! Species          Breed           Age           Route
//! (table)   (table → substring   (pediatric →   (table)
//!            → MDR1/greyhound)    geriatric)
//!   └─────┬──────────┴──────────────┴──────────────┘
//!         │  total = species × breed × age × route
//!         ▼
//!   mg/kg → mg → display unit (mg | mL | tablets)
//!         │
//!   Safety classification + report
//!         ▼
//!   DosageResult
//! ```
//!
//! # Core Principle
//!
//! **Nothing is approximated.** A missing conversion fact or a matched
//! contraindication is an error, never a fallback dose.
//!
//! # Modules
//!
//! - [`units`]: Weight, volume and dosage unit conversion with vet precision
//! - [`models`]: Domain types (MedicationData, AnimalInfo, DosageResult, etc.)
//! - [`adjustments`]: Species, breed, age and route multiplier resolution
//! - [`safety`]: Contraindication gate and safety classification
//! - [`calculator`]: The orchestrating `calculate` function

pub mod adjustments;
pub mod calculator;
pub mod error;
pub mod models;
pub mod safety;
pub mod units;

// Re-export commonly used types
pub use adjustments::{Adjustment, AdjustmentResolver, AdjustmentSet, AdjustmentSource};
pub use calculator::{calculate, DosageCalculator};
pub use error::{CalcResult, DosageError, ErrorKind};
pub use models::{
    AnimalInfo, CalculationMethod, DosageCalculationInput, DosageResult, MedicationData,
    SafetyLevel,
};
pub use safety::{SafetyClassifier, SafetyPolicy};
pub use units::{TargetUnit, Unit};

// UniFFI setup - using proc macros
uniffi::setup_scaffolding!();

// =========================================================================
// FFI Error Type
// =========================================================================

#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum VetDosageError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Contraindicated: {0}")]
    Contraindicated(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<DosageError> for VetDosageError {
    fn from(e: DosageError) -> Self {
        if e.is_configuration_error() {
            VetDosageError::Configuration(e.to_string())
        } else if e.kind() == ErrorKind::Contraindicated {
            VetDosageError::Contraindicated(e.to_string())
        } else {
            VetDosageError::InvalidInput(e.to_string())
        }
    }
}

impl From<serde_json::Error> for VetDosageError {
    fn from(e: serde_json::Error) -> Self {
        VetDosageError::SerializationError(e.to_string())
    }
}

// =========================================================================
// Exported Functions
// =========================================================================

/// Calculate a dose from a JSON `DosageCalculationInput`; returns the
/// `DosageResult` as pretty JSON.
#[uniffi::export]
pub fn calculate_dosage_json(input_json: String) -> Result<String, VetDosageError> {
    let input: DosageCalculationInput = serde_json::from_str(&input_json)?;
    let result = calculate(&input)?;
    Ok(serde_json::to_string_pretty(&result)?)
}

/// Calculate a dose from a JSON `DosageCalculationInput`; returns a flat
/// summary for native UIs.
#[uniffi::export]
pub fn calculate_dosage_summary(input_json: String) -> Result<FfiDosageSummary, VetDosageError> {
    let input: DosageCalculationInput = serde_json::from_str(&input_json)?;
    let result = calculate(&input)?;
    Ok(result.into())
}

/// Convert a weight between kg, lbs, g and oz with vet-precision rounding.
#[uniffi::export]
pub fn convert_weight_value(
    value: f64,
    from_unit: String,
    to_unit: String,
) -> Result<f64, VetDosageError> {
    let from: Unit = from_unit.parse()?;
    let to: Unit = to_unit.parse()?;
    Ok(units::convert_weight(value, from, to)?)
}

// =========================================================================
// FFI Types
// =========================================================================

/// FFI-safe dosage summary.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiDosageSummary {
    pub dose: f64,
    pub unit: String,
    pub min_dose: f64,
    pub max_dose: f64,
    pub frequency: String,
    pub safety_level: String,
    pub calculation_method: String,
    pub warnings: Vec<String>,
    pub applied_adjustments: Vec<String>,
    pub total_daily_dose: Option<f64>,
    pub doses_per_day: Option<u32>,
}

impl From<DosageResult> for FfiDosageSummary {
    fn from(result: DosageResult) -> Self {
        Self {
            dose: result.dose,
            unit: result.unit.to_string(),
            min_dose: result.min_dose,
            max_dose: result.max_dose,
            frequency: result.frequency,
            safety_level: result.safety_level.as_str().to_string(),
            calculation_method: result.calculation_method.as_str().to_string(),
            warnings: result.warnings,
            applied_adjustments: result.applied_adjustments,
            total_daily_dose: result.daily_info.as_ref().map(|d| d.total_daily_dose),
            doses_per_day: result.daily_info.as_ref().map(|d| d.doses_per_day),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const INPUT: &str = r#"{
        "medication": {
            "id": "CARP-100",
            "genericName": "Carprofen",
            "dosage": { "min": 10, "max": 20, "typical": 15 },
            "concentration": 50,
            "typicalFrequencyHours": 12
        },
        "animal": { "species": "dog", "weight": 30, "weightUnit": "kg" },
        "targetUnit": "ml"
    }"#;

    #[test]
    fn test_calculate_dosage_json() {
        let output = calculate_dosage_json(INPUT.to_string()).unwrap();
        let result: DosageResult = serde_json::from_str(&output).unwrap();
        assert_eq!(result.dose, 9.0);
        assert_eq!(result.unit, Unit::Ml);
        assert_eq!(result.safety_level, SafetyLevel::Safe);
    }

    #[test]
    fn test_calculate_dosage_summary() {
        let summary = calculate_dosage_summary(INPUT.to_string()).unwrap();
        assert_eq!(summary.dose, 9.0);
        assert_eq!(summary.unit, "mL");
        assert_eq!(summary.safety_level, "safe");
        assert_eq!(summary.calculation_method, "standard");
        assert_eq!(summary.frequency, "Twice daily");
        assert_eq!(summary.doses_per_day, Some(2));
        assert_eq!(summary.total_daily_dose, Some(18.0));
    }

    #[test]
    fn test_error_mapping() {
        let bad_json = calculate_dosage_json("{ not json".to_string());
        assert!(matches!(bad_json, Err(VetDosageError::SerializationError(_))));

        let no_tablets = INPUT.replace("\"ml\"", "\"tablets\"");
        assert!(matches!(
            calculate_dosage_json(no_tablets),
            Err(VetDosageError::Configuration(_))
        ));

        let zero_weight = INPUT.replace("\"weight\": 30", "\"weight\": 0");
        assert!(matches!(
            calculate_dosage_json(zero_weight),
            Err(VetDosageError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_convert_weight_value() {
        let lbs = convert_weight_value(10.0, "kg".into(), "lbs".into()).unwrap();
        assert_eq!(lbs, 22.05);
        assert!(matches!(
            convert_weight_value(10.0, "kg".into(), "mL".into()),
            Err(VetDosageError::Configuration(_))
        ));
    }
}
