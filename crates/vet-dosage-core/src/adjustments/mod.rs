//! Dose adjustment resolution.
//!
//! Four independent multiplier sources, each defaulting to 1.0:
//! - Species: exact lookup
//! - Breed: exact lookup, then bidirectional substring, then built-in genetics
//! - Age: pediatric (months) before geriatric (years)
//! - Route: exact lookup of the effective route

pub mod genetics;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::models::{AnimalInfo, MedicationData};

pub use genetics::{genetic_risk, GeneticRisk};

/// Default pediatric threshold, in months.
pub const DEFAULT_PEDIATRIC_MONTHS: f64 = 6.0;

/// Default geriatric threshold, in years.
pub const DEFAULT_GERIATRIC_YEARS: f64 = 7.0;

const PEDIATRIC_KEY: &str = "pediatric";
const GERIATRIC_KEY: &str = "geriatric";

/// Where a multiplier came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdjustmentSource {
    Species,
    Breed,
    Age,
    Route,
}

impl AdjustmentSource {
    pub fn display_name(&self) -> &'static str {
        match self {
            AdjustmentSource::Species => "Species",
            AdjustmentSource::Breed => "Breed",
            AdjustmentSource::Age => "Age",
            AdjustmentSource::Route => "Route",
        }
    }
}

/// One resolved multiplier with everything it contributes to the result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Adjustment {
    pub source: AdjustmentSource,
    pub multiplier: f64,
    /// What matched (table key, age bracket, or genetic rule label)
    pub detail: Option<String>,
    pub warnings: Vec<String>,
    pub contraindicated_routes: Vec<String>,
    /// Maximum mg/kg per day carried by a species rule
    pub max_daily_dose: Option<f64>,
}

impl Adjustment {
    /// No rule matched: multiplier 1.0.
    pub fn none(source: AdjustmentSource) -> Self {
        Self {
            source,
            multiplier: 1.0,
            detail: None,
            warnings: Vec::new(),
            contraindicated_routes: Vec::new(),
            max_daily_dose: None,
        }
    }

    fn matched(source: AdjustmentSource, detail: impl Into<String>, multiplier: f64) -> Self {
        Self {
            detail: Some(detail.into()),
            multiplier,
            ..Self::none(source)
        }
    }

    /// Whether this adjustment changes the dose.
    pub fn is_active(&self) -> bool {
        self.multiplier != 1.0
    }
}

/// The four resolved adjustments for one calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdjustmentSet {
    pub species: Adjustment,
    pub breed: Adjustment,
    pub age: Adjustment,
    pub route: Adjustment,
}

impl AdjustmentSet {
    /// Product of all four multipliers.
    pub fn total_multiplier(&self) -> f64 {
        self.species.multiplier * self.breed.multiplier * self.age.multiplier * self.route.multiplier
    }

    /// Adjustments in reporting order: species, breed, age, route.
    pub fn iter(&self) -> impl Iterator<Item = &Adjustment> {
        [&self.species, &self.breed, &self.age, &self.route].into_iter()
    }
}

/// Resolves adjustments from one medication's tables.
pub struct AdjustmentResolver<'a> {
    medication: &'a MedicationData,
}

impl<'a> AdjustmentResolver<'a> {
    /// Create a resolver for a medication.
    pub fn new(medication: &'a MedicationData) -> Self {
        Self { medication }
    }

    /// Resolve all four adjustments. Every source is always evaluated.
    pub fn resolve(&self, animal: &AnimalInfo, effective_route: Option<&str>) -> AdjustmentSet {
        AdjustmentSet {
            species: self.species(animal),
            breed: self.breed(animal),
            age: self.age(animal),
            route: self.route(effective_route),
        }
    }

    /// Species adjustment: exact case-insensitive lookup.
    pub fn species(&self, animal: &AnimalInfo) -> Adjustment {
        let species = animal.canonical_species();
        match lookup(&self.medication.species_adjustments, &species) {
            Some(rule) => {
                trace!(species = %species, multiplier = rule.multiplier, "species rule matched");
                Adjustment {
                    warnings: rule.additional_warnings.clone(),
                    contraindicated_routes: rule.contraindicated_routes.clone(),
                    max_daily_dose: rule.max_daily_dose,
                    ..Adjustment::matched(AdjustmentSource::Species, species, rule.multiplier)
                }
            }
            None => Adjustment::none(AdjustmentSource::Species),
        }
    }

    /// Breed adjustment. Explicit table entries always beat the built-in
    /// genetic rules.
    pub fn breed(&self, animal: &AnimalInfo) -> Adjustment {
        let Some(breed) = animal.canonical_breed() else {
            return Adjustment::none(AdjustmentSource::Breed);
        };
        let table = &self.medication.breed_considerations;

        let rule = lookup(table, &breed).map(|rule| (breed.clone(), rule)).or_else(|| {
            table
                .iter()
                .map(|(key, rule)| (normalize_key(key), rule))
                .find(|(key, _)| !key.is_empty() && (breed.contains(key.as_str()) || key.contains(&breed)))
        });

        if let Some((key, rule)) = rule {
            trace!(breed = %breed, key = %key, multiplier = rule.multiplier, "breed rule matched");
            return Adjustment {
                warnings: rule.additional_warnings.clone(),
                contraindicated_routes: rule.contraindicated_routes.clone(),
                ..Adjustment::matched(AdjustmentSource::Breed, key, rule.multiplier)
            };
        }

        let display_breed = animal.breed.as_deref().unwrap_or_default().trim();
        match genetic_risk(&animal.species, &breed, &self.medication.generic_name) {
            Some(risk) => {
                trace!(breed = %breed, rule = risk.label(), "built-in genetic rule matched");
                Adjustment {
                    warnings: vec![risk.warning(display_breed, &self.medication.generic_name)],
                    ..Adjustment::matched(AdjustmentSource::Breed, risk.label(), risk.multiplier())
                }
            }
            None => Adjustment::none(AdjustmentSource::Breed),
        }
    }

    /// Age adjustment. Pediatric is checked first.
    pub fn age(&self, animal: &AnimalInfo) -> Adjustment {
        let Some(age_months) = animal.age_in_months() else {
            return Adjustment::none(AdjustmentSource::Age);
        };
        let table = &self.medication.age_adjustments;

        if let Some(rule) = lookup(table, PEDIATRIC_KEY) {
            let threshold = rule.age_threshold.unwrap_or(DEFAULT_PEDIATRIC_MONTHS);
            if age_months < threshold {
                trace!(age_months, threshold, "pediatric rule matched");
                return Adjustment {
                    warnings: rule.additional_warnings.clone(),
                    ..Adjustment::matched(AdjustmentSource::Age, PEDIATRIC_KEY, rule.multiplier)
                };
            }
        }

        if let Some(rule) = lookup(table, GERIATRIC_KEY) {
            let threshold = rule.age_threshold.unwrap_or(DEFAULT_GERIATRIC_YEARS);
            if age_months / 12.0 >= threshold {
                trace!(age_months, threshold, "geriatric rule matched");
                return Adjustment {
                    warnings: rule.additional_warnings.clone(),
                    ..Adjustment::matched(AdjustmentSource::Age, GERIATRIC_KEY, rule.multiplier)
                };
            }
        }

        Adjustment::none(AdjustmentSource::Age)
    }

    /// Route adjustment: exact case-insensitive lookup of the effective route.
    pub fn route(&self, effective_route: Option<&str>) -> Adjustment {
        let Some(route) = effective_route.map(normalize_key).filter(|r| !r.is_empty()) else {
            return Adjustment::none(AdjustmentSource::Route);
        };
        match lookup(&self.medication.route_adjustments, &route) {
            Some(rule) => {
                trace!(route = %route, multiplier = rule.multiplier, "route rule matched");
                Adjustment {
                    warnings: rule.additional_warnings.clone(),
                    ..Adjustment::matched(
                        AdjustmentSource::Route,
                        effective_route.unwrap_or_default().trim(),
                        rule.multiplier,
                    )
                }
            }
            None => Adjustment::none(AdjustmentSource::Route),
        }
    }
}

/// Normalize a table key or lookup value: trimmed, lowercase.
pub fn normalize_key(key: &str) -> String {
    key.trim().to_lowercase()
}

/// Exact lookup of a normalized key, tolerating non-normalized table keys.
fn lookup<'t, T>(table: &'t BTreeMap<String, T>, key: &str) -> Option<&'t T> {
    table.get(key).or_else(|| {
        table
            .iter()
            .find(|(k, _)| normalize_key(k) == key)
            .map(|(_, rule)| rule)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AgeAdjustment, BreedConsideration, RouteAdjustment, SpeciesAdjustment};

    fn medication() -> MedicationData {
        let mut med = MedicationData::new("TEST-1", "Testamycin", 10.0);
        med.species_adjustments.insert(
            "cat".into(),
            SpeciesAdjustment {
                multiplier: 0.8,
                max_daily_dose: Some(20.0),
                additional_warnings: vec!["Monitor cats for sedation".into()],
                contraindicated_routes: vec!["IM".into()],
            },
        );
        med.breed_considerations.insert(
            "collie".into(),
            BreedConsideration {
                multiplier: 0.5,
                contraindicated_routes: vec![],
                additional_warnings: vec![],
            },
        );
        med.age_adjustments.insert(
            "pediatric".into(),
            AgeAdjustment {
                multiplier: 0.8,
                age_threshold: Some(2.0),
                additional_warnings: vec![],
            },
        );
        med.age_adjustments.insert(
            "geriatric".into(),
            AgeAdjustment {
                multiplier: 0.75,
                age_threshold: None,
                additional_warnings: vec!["Check renal values".into()],
            },
        );
        med.route_adjustments.insert(
            "iv".into(),
            RouteAdjustment {
                multiplier: 0.7,
                additional_warnings: vec![],
            },
        );
        med
    }

    #[test]
    fn test_species_lookup_case_insensitive() {
        let med = medication();
        let resolver = AdjustmentResolver::new(&med);

        let adj = resolver.species(&AnimalInfo::new("Cat", 4.0));
        assert_eq!(adj.multiplier, 0.8);
        assert_eq!(adj.max_daily_dose, Some(20.0));
        assert_eq!(adj.contraindicated_routes, vec!["IM"]);

        let adj = resolver.species(&AnimalInfo::new("rabbit", 2.0));
        assert_eq!(adj.multiplier, 1.0);
        assert!(!adj.is_active());
    }

    #[test]
    fn test_mixed_case_table_keys() {
        let mut med = MedicationData::new("TEST-2", "Testamycin", 10.0);
        med.species_adjustments.insert(
            "Dog".into(),
            SpeciesAdjustment {
                multiplier: 1.2,
                max_daily_dose: None,
                additional_warnings: vec![],
                contraindicated_routes: vec![],
            },
        );
        let resolver = AdjustmentResolver::new(&med);
        assert_eq!(resolver.species(&AnimalInfo::new("dog", 10.0)).multiplier, 1.2);
    }

    #[test]
    fn test_breed_exact_and_substring() {
        let med = medication();
        let resolver = AdjustmentResolver::new(&med);

        let mut animal = AnimalInfo::new("dog", 20.0);
        animal.breed = Some("Collie".into());
        assert_eq!(resolver.breed(&animal).multiplier, 0.5);

        // Breed contains table key
        animal.breed = Some("Rough Collie".into());
        let adj = resolver.breed(&animal);
        assert_eq!(adj.multiplier, 0.5);
        assert_eq!(adj.detail.as_deref(), Some("collie"));

        // Table key contains breed
        animal.breed = Some("coll".into());
        assert_eq!(resolver.breed(&animal).multiplier, 0.5);
    }

    #[test]
    fn test_breed_table_beats_genetics() {
        let mut med = MedicationData::new("IVM-1", "Ivermectin", 0.006);
        med.breed_considerations.insert(
            "border collie".into(),
            BreedConsideration {
                multiplier: 0.25,
                contraindicated_routes: vec![],
                additional_warnings: vec![],
            },
        );
        let resolver = AdjustmentResolver::new(&med);

        let mut animal = AnimalInfo::new("dog", 25.0);
        animal.breed = Some("Border Collie".into());
        assert_eq!(resolver.breed(&animal).multiplier, 0.25);
    }

    #[test]
    fn test_breed_genetic_fallback() {
        let med = MedicationData::new("IVM-1", "Ivermectin", 0.006);
        let resolver = AdjustmentResolver::new(&med);

        let mut animal = AnimalInfo::new("dog", 25.0);
        animal.breed = Some("Border Collie".into());
        let adj = resolver.breed(&animal);
        assert_eq!(adj.multiplier, 0.5);
        assert_eq!(adj.detail.as_deref(), Some("MDR1 sensitivity"));
        assert!(adj.warnings[0].starts_with("Border Collie may carry the MDR1"));

        animal.breed = Some("Greyhound".into());
        assert_eq!(resolver.breed(&animal).multiplier, 0.9);

        animal.breed = Some("Beagle".into());
        assert_eq!(resolver.breed(&animal).multiplier, 1.0);

        animal.breed = None;
        assert_eq!(resolver.breed(&animal).multiplier, 1.0);
    }

    #[test]
    fn test_age_brackets() {
        let med = medication();
        let resolver = AdjustmentResolver::new(&med);
        let mut animal = AnimalInfo::new("cat", 4.0);

        // No age data
        assert_eq!(resolver.age(&animal).multiplier, 1.0);

        animal.age_months = Some(1.0);
        let adj = resolver.age(&animal);
        assert_eq!(adj.multiplier, 0.8);
        assert_eq!(adj.detail.as_deref(), Some("pediatric"));

        // At the pediatric threshold: not pediatric
        animal.age_months = Some(2.0);
        assert_eq!(resolver.age(&animal).multiplier, 1.0);

        // Default geriatric threshold is 7 years, inclusive
        animal.age_months = None;
        animal.age_years = Some(7.0);
        let adj = resolver.age(&animal);
        assert_eq!(adj.multiplier, 0.75);
        assert_eq!(adj.warnings, vec!["Check renal values"]);

        animal.age_years = Some(6.0);
        animal.age_months = Some(11.0);
        assert_eq!(resolver.age(&animal).multiplier, 1.0);
    }

    #[test]
    fn test_default_pediatric_threshold() {
        let mut med = MedicationData::new("TEST-3", "Testamycin", 10.0);
        med.age_adjustments.insert(
            "pediatric".into(),
            AgeAdjustment {
                multiplier: 0.5,
                age_threshold: None,
                additional_warnings: vec![],
            },
        );
        let resolver = AdjustmentResolver::new(&med);
        let mut animal = AnimalInfo::new("dog", 3.0);

        animal.age_months = Some(5.0);
        assert_eq!(resolver.age(&animal).multiplier, 0.5);
        animal.age_months = Some(6.0);
        assert_eq!(resolver.age(&animal).multiplier, 1.0);
    }

    #[test]
    fn test_route_lookup() {
        let med = medication();
        let resolver = AdjustmentResolver::new(&med);

        let adj = resolver.route(Some("IV"));
        assert_eq!(adj.multiplier, 0.7);
        assert_eq!(adj.detail.as_deref(), Some("IV"));

        assert_eq!(resolver.route(Some("oral")).multiplier, 1.0);
        assert_eq!(resolver.route(None).multiplier, 1.0);
    }

    #[test]
    fn test_total_multiplier() {
        let med = medication();
        let resolver = AdjustmentResolver::new(&med);

        let mut animal = AnimalInfo::new("cat", 15.0);
        animal.breed = Some("Collie".into());
        animal.age_months = Some(1.0);

        let set = resolver.resolve(&animal, Some("IV"));
        assert!((set.total_multiplier() - 0.8 * 0.5 * 0.8 * 0.7).abs() < 1e-12);
        assert_eq!(set.iter().filter(|a| a.is_active()).count(), 4);
    }
}
