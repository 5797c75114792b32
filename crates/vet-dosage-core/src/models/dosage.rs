//! Calculation input and result value objects.

use serde::{Deserialize, Serialize};

use super::{AnimalInfo, MedicationData};
use crate::error::CalcResult;
use crate::units::{TargetUnit, Unit};

/// Everything needed for one dosage calculation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DosageCalculationInput {
    pub medication: MedicationData,
    pub animal: AnimalInfo,
    /// Route override; falls back to the medication's own route
    #[serde(default)]
    pub route: Option<String>,
    /// "mg", "ml" or "tablets"; defaults to mg
    #[serde(default)]
    pub target_unit: Option<String>,
}

impl DosageCalculationInput {
    pub fn new(medication: MedicationData, animal: AnimalInfo) -> Self {
        Self {
            medication,
            animal,
            route: None,
            target_unit: None,
        }
    }

    /// Parsed display unit.
    pub fn target_unit(&self) -> CalcResult<TargetUnit> {
        match self.target_unit.as_deref() {
            None => Ok(TargetUnit::default()),
            Some(unit) => unit.parse(),
        }
    }
}

/// Discrete safety classification a caregiver can act on.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum SafetyLevel {
    Safe,
    Caution,
    Danger,
}

impl SafetyLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            SafetyLevel::Safe => "safe",
            SafetyLevel::Caution => "caution",
            SafetyLevel::Danger => "danger",
        }
    }
}

/// Which adjustment dominates the reported calculation, for display only.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CalculationMethod {
    BreedAdjusted,
    AgeAdjusted,
    RouteAdjusted,
    SpeciesAdjusted,
    Standard,
}

impl CalculationMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            CalculationMethod::BreedAdjusted => "breed_adjusted",
            CalculationMethod::AgeAdjusted => "age_adjusted",
            CalculationMethod::RouteAdjusted => "route_adjusted",
            CalculationMethod::SpeciesAdjusted => "species_adjusted",
            CalculationMethod::Standard => "standard",
        }
    }
}

/// Intermediate figures kept for auditability.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CalculationDetails {
    pub weight_in_kg: f64,
    pub base_dosage_mg_kg: f64,
    pub final_dosage_mg_kg: f64,
    pub total_multiplier: f64,
}

/// The same dose expressed in another unit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AlternativeFormat {
    pub dose: f64,
    pub unit: Unit,
    pub description: String,
}

/// Daily dosing summary.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DailyDosingInfo {
    pub total_daily_dose: f64,
    pub unit: Unit,
    pub doses_per_day: u32,
    pub time_between_doses: String,
}

/// The computed answer for one calculation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DosageResult {
    pub dose: f64,
    pub unit: Unit,
    pub frequency: String,
    pub min_dose: f64,
    pub max_dose: f64,
    pub warnings: Vec<String>,
    pub safety_level: SafetyLevel,
    pub calculation_method: CalculationMethod,
    pub applied_adjustments: Vec<String>,
    pub calculation_details: CalculationDetails,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alternative_formats: Option<Vec<AlternativeFormat>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub daily_info: Option<DailyDosingInfo>,
}

impl DosageResult {
    /// Check if the result carries anything a caregiver should read first.
    pub fn needs_attention(&self) -> bool {
        self.safety_level != SafetyLevel::Safe
    }
}
