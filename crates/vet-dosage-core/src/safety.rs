//! Contraindication gate and safety classification.
//!
//! The gate runs before any computation and is fatal. Classification runs
//! after the dose is computed and always yields a level.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::adjustments::AdjustmentSet;
use crate::error::{CalcResult, DosageError};
use crate::models::{AnimalInfo, MedicationData, SafetyLevel};
use crate::units::{format_number, usable_fact};

/// Prefix that marks a warning as dangerous.
pub const DANGER_PREFIX: &str = "WARNING:";

/// Marker text that marks a warning as dangerous.
pub const DANGER_MARKER: &str = "contraindicated";

/// Invalid safety policy.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PolicyError {
    #[error("Invalid safety policy: {0}")]
    Invalid(String),
}

/// Multiplier thresholds that turn an otherwise safe dose into "caution".
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SafetyPolicy {
    /// Total multiplier at or below this is a borderline reduction
    pub caution_low_multiplier: f64,
    /// Total multiplier at or above this is a borderline increase
    pub caution_high_multiplier: f64,
}

impl Default for SafetyPolicy {
    fn default() -> Self {
        Self {
            caution_low_multiplier: 0.5,
            caution_high_multiplier: 2.0,
        }
    }
}

impl SafetyPolicy {
    /// Check that both thresholds are positive and ordered.
    pub fn validate(&self) -> Result<(), PolicyError> {
        let low = self.caution_low_multiplier;
        let high = self.caution_high_multiplier;
        if !low.is_finite() || !high.is_finite() || low <= 0.0 || high <= 0.0 {
            return Err(PolicyError::Invalid(format!(
                "thresholds must be positive numbers (low={}, high={})",
                low, high
            )));
        }
        if low >= high {
            return Err(PolicyError::Invalid(format!(
                "caution_low_multiplier ({}) must be below caution_high_multiplier ({})",
                low, high
            )));
        }
        Ok(())
    }

    /// Whether a total multiplier halves/doubles the dose or worse.
    pub fn is_extreme(&self, total_multiplier: f64) -> bool {
        total_multiplier <= self.caution_low_multiplier
            || total_multiplier >= self.caution_high_multiplier
    }
}

/// Fail if any animal condition matches a medication contraindication.
///
/// A contraindication matches when it appears, case-insensitively, inside a
/// condition: "renal" matches "chronic renal failure", but "ear" does not
/// match "heart failure".
pub fn check_contraindications(medication: &MedicationData, animal: &AnimalInfo) -> CalcResult<()> {
    for contraindication in &medication.contraindications {
        let contra = contraindication.trim().to_lowercase();
        if contra.is_empty() {
            continue;
        }
        for condition in &animal.conditions {
            let cond = condition.trim().to_lowercase();
            if cond.is_empty() {
                continue;
            }
            if cond.contains(&contra) {
                warn!(
                    medication = %medication.id,
                    condition = %condition,
                    contraindication = %contraindication,
                    "contraindication gate hit"
                );
                return Err(DosageError::Contraindicated {
                    condition: condition.clone(),
                    contraindication: contraindication.clone(),
                });
            }
        }
    }
    Ok(())
}

/// Whether a single warning text signals danger.
pub fn is_danger_warning(warning: &str) -> bool {
    warning.trim_start().starts_with(DANGER_PREFIX) || warning.contains(DANGER_MARKER)
}

/// Warnings and level for one computed dose.
#[derive(Debug, Clone, PartialEq)]
pub struct SafetyAssessment {
    pub warnings: Vec<String>,
    pub level: SafetyLevel,
}

/// Post-computation classifier.
#[derive(Debug, Clone, Default)]
pub struct SafetyClassifier {
    policy: SafetyPolicy,
}

impl SafetyClassifier {
    pub fn new(policy: SafetyPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &SafetyPolicy {
        &self.policy
    }

    /// Collect warnings and classify.
    ///
    /// `daily_mg_kg` is the total mg/kg given per day, when a schedule is known.
    pub fn assess(
        &self,
        medication: &MedicationData,
        animal: &AnimalInfo,
        adjustments: &AdjustmentSet,
        effective_route: Option<&str>,
        daily_mg_kg: Option<f64>,
    ) -> SafetyAssessment {
        let total_multiplier = adjustments.total_multiplier();
        let warnings = self.collect_warnings(
            medication,
            animal,
            adjustments,
            effective_route,
            daily_mg_kg,
        );
        let level = self.classify(&warnings, total_multiplier, medication.controlled_substance);
        SafetyAssessment { warnings, level }
    }

    /// Gather warnings from the medication, every adjustment source, route
    /// contraindications, the daily maximum and the multiplier extremity.
    pub fn collect_warnings(
        &self,
        medication: &MedicationData,
        animal: &AnimalInfo,
        adjustments: &AdjustmentSet,
        effective_route: Option<&str>,
        daily_mg_kg: Option<f64>,
    ) -> Vec<String> {
        let mut warnings: Vec<String> = Vec::new();

        if let Some(text) = medication.warnings.as_deref().map(str::trim) {
            if !text.is_empty() {
                warnings.push(text.to_string());
            }
        }

        for adjustment in adjustments.iter() {
            warnings.extend(adjustment.warnings.iter().cloned());
        }

        if let Some(route) = effective_route.map(str::trim).filter(|r| !r.is_empty()) {
            if route_listed(&adjustments.species.contraindicated_routes, route) {
                warnings.push(format!(
                    "{} {} route is contraindicated for {}",
                    DANGER_PREFIX,
                    route,
                    animal.species.trim()
                ));
            }
            if route_listed(&adjustments.breed.contraindicated_routes, route) {
                let breed = animal.breed.as_deref().unwrap_or_default().trim();
                warnings.push(format!(
                    "{} {} route is unsuitable for {}",
                    DANGER_PREFIX, route, breed
                ));
            }
        }

        if let (Some(daily), Some(limit)) = (daily_mg_kg, daily_limit(medication, adjustments)) {
            if daily > limit {
                warnings.push(format!(
                    "{} Total daily dose of {} mg/kg exceeds maximum of {} mg/kg/day",
                    DANGER_PREFIX,
                    format_number(daily),
                    format_number(limit)
                ));
            }
        }

        let total_multiplier = adjustments.total_multiplier();
        if self.policy.is_extreme(total_multiplier) {
            warnings.push(format!(
                "Combined adjustments change the dose to {:.0}% of standard",
                total_multiplier * 100.0
            ));
        }

        let mut seen = std::collections::HashSet::new();
        warnings.retain(|w| seen.insert(w.clone()));
        warnings
    }

    /// Danger is checked before caution.
    pub fn classify(&self, warnings: &[String], total_multiplier: f64, controlled: bool) -> SafetyLevel {
        if warnings.iter().any(|w| is_danger_warning(w)) {
            SafetyLevel::Danger
        } else if self.policy.is_extreme(total_multiplier) || controlled || !warnings.is_empty() {
            SafetyLevel::Caution
        } else {
            SafetyLevel::Safe
        }
    }
}

fn route_listed(routes: &[String], route: &str) -> bool {
    routes.iter().any(|r| r.trim().eq_ignore_ascii_case(route))
}

/// The stricter of the medication and species daily maximums (mg/kg/day).
fn daily_limit(medication: &MedicationData, adjustments: &AdjustmentSet) -> Option<f64> {
    let limits = [
        usable_fact(medication.max_daily_dose),
        usable_fact(adjustments.species.max_daily_dose),
    ];
    limits.into_iter().flatten().reduce(f64::min)
}
