//! Human-readable reporting: method label, adjustment narrative, alternative formats.

use crate::adjustments::AdjustmentSet;
use crate::models::{AlternativeFormat, CalculationMethod, MedicationData};
use crate::units::{format_number, round_to_precision, usable_fact, Unit};

/// Reporting label by fixed precedence: breed > age > route > species > standard.
///
/// Independent of how the multiplier product is computed.
pub fn calculation_method(adjustments: &AdjustmentSet) -> CalculationMethod {
    if adjustments.breed.is_active() {
        CalculationMethod::BreedAdjusted
    } else if adjustments.age.is_active() {
        CalculationMethod::AgeAdjusted
    } else if adjustments.route.is_active() {
        CalculationMethod::RouteAdjusted
    } else if adjustments.species.is_active() {
        CalculationMethod::SpeciesAdjusted
    } else {
        CalculationMethod::Standard
    }
}

/// One line per non-neutral multiplier, as a percentage of baseline.
pub fn applied_adjustments(adjustments: &AdjustmentSet) -> Vec<String> {
    adjustments
        .iter()
        .filter(|adj| adj.is_active())
        .map(|adj| {
            let percent = format!("{:.0}%", adj.multiplier * 100.0);
            match adj.detail.as_deref() {
                Some(detail) => format!(
                    "{} adjustment ({}): {} of standard dose",
                    adj.source.display_name(),
                    detail,
                    percent
                ),
                None => format!(
                    "{} adjustment: {} of standard dose",
                    adj.source.display_name(),
                    percent
                ),
            }
        })
        .collect()
}

/// mL and tablet figures for an absolute mg dose, whatever the display unit.
pub fn alternative_formats(dose_mg: f64, medication: &MedicationData) -> Option<Vec<AlternativeFormat>> {
    let mut formats = Vec::new();

    if let Some(concentration) = usable_fact(medication.concentration) {
        formats.push(AlternativeFormat {
            dose: round_to_precision(dose_mg / concentration, Unit::Ml),
            unit: Unit::Ml,
            description: format!("mL of {} mg/mL solution", format_number(concentration)),
        });
    }

    if let Some(per_tablet) = usable_fact(medication.units_per_tablet) {
        formats.push(AlternativeFormat {
            dose: round_to_precision(dose_mg / per_tablet, Unit::Tablets),
            unit: Unit::Tablets,
            description: format!("tablets of {} mg", format_number(per_tablet)),
        });
    }

    if formats.is_empty() {
        None
    } else {
        Some(formats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adjustments::{Adjustment, AdjustmentSource};

    fn set(species: f64, breed: f64, age: f64, route: f64) -> AdjustmentSet {
        let adj = |source: AdjustmentSource, multiplier: f64, detail: &str| Adjustment {
            multiplier,
            detail: (multiplier != 1.0).then(|| detail.to_string()),
            ..Adjustment::none(source)
        };
        AdjustmentSet {
            species: adj(AdjustmentSource::Species, species, "cat"),
            breed: adj(AdjustmentSource::Breed, breed, "collie"),
            age: adj(AdjustmentSource::Age, age, "pediatric"),
            route: adj(AdjustmentSource::Route, route, "IV"),
        }
    }

    #[test]
    fn test_method_precedence() {
        assert_eq!(calculation_method(&set(1.0, 1.0, 1.0, 1.0)), CalculationMethod::Standard);
        assert_eq!(calculation_method(&set(0.8, 1.0, 1.0, 1.0)), CalculationMethod::SpeciesAdjusted);
        assert_eq!(calculation_method(&set(0.8, 1.0, 1.0, 0.7)), CalculationMethod::RouteAdjusted);
        assert_eq!(calculation_method(&set(0.8, 1.0, 0.8, 0.7)), CalculationMethod::AgeAdjusted);
        assert_eq!(calculation_method(&set(0.8, 0.5, 0.8, 0.7)), CalculationMethod::BreedAdjusted);
    }

    #[test]
    fn test_applied_adjustments_narrative() {
        let lines = applied_adjustments(&set(0.8, 0.5, 1.0, 0.7));
        assert_eq!(
            lines,
            vec![
                "Species adjustment (cat): 80% of standard dose",
                "Breed adjustment (collie): 50% of standard dose",
                "Route adjustment (IV): 70% of standard dose",
            ]
        );
        assert!(applied_adjustments(&set(1.0, 1.0, 1.0, 1.0)).is_empty());
    }

    #[test]
    fn test_alternative_formats() {
        let mut med = MedicationData::new("CARP-100", "Carprofen", 15.0);
        assert!(alternative_formats(450.0, &med).is_none());

        med.concentration = Some(50.0);
        med.units_per_tablet = Some(250.0);
        let formats = alternative_formats(450.0, &med).unwrap();
        assert_eq!(formats.len(), 2);
        assert_eq!(formats[0].dose, 9.0);
        assert_eq!(formats[0].unit, Unit::Ml);
        assert_eq!(formats[0].description, "mL of 50 mg/mL solution");
        assert_eq!(formats[1].dose, 1.8);
        assert_eq!(formats[1].unit, Unit::Tablets);
    }
}
