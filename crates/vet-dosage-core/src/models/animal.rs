//! Patient profile.

use serde::{Deserialize, Serialize};

/// The animal being dosed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AnimalInfo {
    /// Species (e.g., "dog", "cat"), matched case-insensitively
    pub species: String,
    /// Breed, matched case-insensitively
    #[serde(default)]
    pub breed: Option<String>,
    /// Body weight in `weight_unit`
    pub weight: f64,
    /// "kg" or "lbs"
    pub weight_unit: String,
    #[serde(default)]
    pub age_years: Option<f64>,
    #[serde(default)]
    pub age_months: Option<f64>,
    /// Known conditions (e.g., "kidney disease")
    #[serde(default)]
    pub conditions: Vec<String>,
}

impl AnimalInfo {
    /// Create an animal with weight in kilograms.
    pub fn new(species: impl Into<String>, weight_kg: f64) -> Self {
        Self {
            species: species.into(),
            breed: None,
            weight: weight_kg,
            weight_unit: "kg".into(),
            age_years: None,
            age_months: None,
            conditions: Vec::new(),
        }
    }

    /// Get the canonical species name (trimmed, lowercase).
    pub fn canonical_species(&self) -> String {
        self.species.trim().to_lowercase()
    }

    /// Get the canonical breed name, if a non-empty one was given.
    pub fn canonical_breed(&self) -> Option<String> {
        self.breed
            .as_deref()
            .map(|b| b.trim().to_lowercase())
            .filter(|b| !b.is_empty())
    }

    /// Total age in months, or `None` if no age data was supplied.
    pub fn age_in_months(&self) -> Option<f64> {
        match (self.age_years, self.age_months) {
            (None, None) => None,
            (years, months) => Some(years.unwrap_or(0.0) * 12.0 + months.unwrap_or(0.0)),
        }
    }
}
