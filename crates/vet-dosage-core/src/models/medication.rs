//! Medication dosing rules.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Canonical dosing rules for one medication, as supplied by the catalog.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct MedicationData {
    /// Catalog identifier
    pub id: String,
    /// Generic (active ingredient) name, e.g. "Ivermectin"
    pub generic_name: String,
    /// Brand name, e.g. "Heartgard"
    pub brand_name: Option<String>,
    /// Default administration route (e.g. "oral", "IV")
    pub route: Option<String>,
    /// Dosage form (e.g. "tablet", "injection")
    pub form: Option<String>,
    /// Dosage range in mg/kg
    pub dosage: DosageRange,
    /// Maximum total mg/kg per day
    pub max_daily_dose: Option<f64>,
    /// Liquid concentration in mg/mL
    pub concentration: Option<f64>,
    /// Active drug per tablet in mg
    pub units_per_tablet: Option<f64>,
    /// Typical hours between doses
    pub typical_frequency_hours: Option<f64>,
    /// Maximum number of doses per day
    pub max_frequency_per_day: Option<u32>,
    /// Species rules, keyed by lowercase species name
    pub species_adjustments: BTreeMap<String, SpeciesAdjustment>,
    /// Route rules, keyed by lowercase route name
    pub route_adjustments: BTreeMap<String, RouteAdjustment>,
    /// Age rules, keyed by "pediatric" / "geriatric"
    pub age_adjustments: BTreeMap<String, AgeAdjustment>,
    /// Breed rules, keyed by lowercase breed name
    pub breed_considerations: BTreeMap<String, BreedConsideration>,
    /// Conditions under which the medication must not be given
    pub contraindications: Vec<String>,
    /// Free-text warning shown with every dose
    pub warnings: Option<String>,
    /// Whether this is a controlled substance
    pub controlled_substance: bool,
}

/// Dosage range in mg/kg.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct DosageRange {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub typical: Option<f64>,
}

impl DosageRange {
    /// Minimum mg/kg, falling back to the typical dose.
    pub fn min_or_typical(&self) -> Option<f64> {
        self.min.or(self.typical)
    }

    /// Maximum mg/kg, falling back to zero.
    pub fn max_or_zero(&self) -> f64 {
        self.max.unwrap_or(0.0)
    }
}

/// Species-specific rule.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SpeciesAdjustment {
    pub multiplier: f64,
    /// Species-specific maximum mg/kg per day
    #[serde(default)]
    pub max_daily_dose: Option<f64>,
    #[serde(default)]
    pub additional_warnings: Vec<String>,
    #[serde(default)]
    pub contraindicated_routes: Vec<String>,
}

/// Route-specific rule.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RouteAdjustment {
    pub multiplier: f64,
    #[serde(default)]
    pub additional_warnings: Vec<String>,
}

/// Age-bracket rule. The threshold is in months for "pediatric" and in
/// years for "geriatric".
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AgeAdjustment {
    pub multiplier: f64,
    #[serde(default)]
    pub age_threshold: Option<f64>,
    #[serde(default)]
    pub additional_warnings: Vec<String>,
}

/// Breed-specific rule.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BreedConsideration {
    pub multiplier: f64,
    #[serde(default)]
    pub contraindicated_routes: Vec<String>,
    #[serde(default)]
    pub additional_warnings: Vec<String>,
}

impl MedicationData {
    /// Create a medication with required fields and a typical mg/kg dose.
    pub fn new(id: impl Into<String>, generic_name: impl Into<String>, typical_mg_kg: f64) -> Self {
        Self {
            id: id.into(),
            generic_name: generic_name.into(),
            dosage: DosageRange {
                min: None,
                max: None,
                typical: Some(typical_mg_kg),
            },
            ..Self::default()
        }
    }

    /// The route to use when the caller gives no override.
    pub fn effective_route<'a>(&'a self, override_route: Option<&'a str>) -> Option<&'a str> {
        override_route
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .or_else(|| self.route.as_deref())
    }
}
