//! Dosage calculator (orchestrator).
//!
//! Pipeline: Validate → Contraindication Gate → Weight (kg) → Adjustments
//! → mg/kg → mg → Display Unit → Safety → Report
//!
//! Every call is independent: the calculator holds only its safety policy.

mod report;
mod schedule;

pub use report::*;
pub use schedule::*;

use tracing::{debug, debug_span};

use crate::adjustments::AdjustmentResolver;
use crate::error::{CalcResult, DosageError};
use crate::models::{CalculationDetails, DosageCalculationInput, DosageResult, MedicationData};
use crate::safety::{check_contraindications, SafetyClassifier, SafetyPolicy};
use crate::units::{exact_weight_to_kg, round_to_precision, usable_fact, TargetUnit, Unit};

/// Stateless dosage calculator.
#[derive(Debug, Clone, Default)]
pub struct DosageCalculator {
    classifier: SafetyClassifier,
}

impl DosageCalculator {
    /// Create a calculator with the default safety policy.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a calculator with a custom safety policy.
    pub fn with_policy(policy: SafetyPolicy) -> Self {
        Self {
            classifier: SafetyClassifier::new(policy),
        }
    }

    pub fn policy(&self) -> &SafetyPolicy {
        self.classifier.policy()
    }

    /// Compute a dose. Any error aborts the whole calculation.
    pub fn calculate(&self, input: &DosageCalculationInput) -> CalcResult<DosageResult> {
        let medication = &input.medication;
        let animal = &input.animal;
        let _span = debug_span!(
            "calculate_dosage",
            medication = %medication.id,
            species = %animal.species
        )
        .entered();

        // Step 1: Validate and gate
        let (weight_unit, typical_mg_kg) = validate(input)?;
        check_contraindications(medication, animal)?;

        // Step 2: Canonical weight
        let weight_kg = exact_weight_to_kg(animal.weight, weight_unit)?;

        // Step 3: Adjustments
        let effective_route = medication.effective_route(input.route.as_deref());
        let adjustments = AdjustmentResolver::new(medication).resolve(animal, effective_route);
        let total_multiplier = adjustments.total_multiplier();
        debug!(weight_kg, total_multiplier, "adjustments resolved");

        // Steps 4-5: mg/kg, then absolute mg
        let final_mg_kg = typical_mg_kg * total_multiplier;
        let min_mg_kg = medication.dosage.min_or_typical().unwrap_or(typical_mg_kg) * total_multiplier;
        let max_mg_kg = medication.dosage.max_or_zero() * total_multiplier;

        let dose_mg = final_mg_kg * weight_kg;
        let min_mg = min_mg_kg * weight_kg;
        let max_mg = max_mg_kg * weight_kg;

        // Step 6: Display unit
        let target = input.target_unit()?;
        let unit = target.unit();
        let dose = mg_to_display(dose_mg, target, medication)?;
        let min_dose = mg_to_display(min_mg, target, medication)?;
        let max_dose = mg_to_display(max_mg, target, medication)?;

        let daily_info = daily_info(dose, unit, medication);
        let daily_mg_kg = daily_info
            .as_ref()
            .map(|info| final_mg_kg * f64::from(info.doses_per_day));

        // Step 7: Warnings and level
        let assessment = self.classifier.assess(
            medication,
            animal,
            &adjustments,
            effective_route,
            daily_mg_kg,
        );

        let result = DosageResult {
            dose: round_to_precision(dose, unit),
            unit,
            frequency: frequency_description(medication),
            min_dose: round_to_precision(min_dose, unit),
            max_dose: round_to_precision(max_dose, unit),
            warnings: assessment.warnings,
            safety_level: assessment.level,
            calculation_method: calculation_method(&adjustments),
            applied_adjustments: applied_adjustments(&adjustments),
            calculation_details: CalculationDetails {
                weight_in_kg: round_to_precision(weight_kg, Unit::Kg),
                base_dosage_mg_kg: typical_mg_kg,
                final_dosage_mg_kg: final_mg_kg,
                total_multiplier,
            },
            alternative_formats: alternative_formats(dose_mg, medication),
            daily_info,
        };

        debug!(
            dose = result.dose,
            unit = %result.unit,
            safety_level = result.safety_level.as_str(),
            "dosage calculated"
        );
        Ok(result)
    }
}

/// Calculate with the default safety policy.
pub fn calculate(input: &DosageCalculationInput) -> CalcResult<DosageResult> {
    DosageCalculator::new().calculate(input)
}

/// Validate input fields. Returns the weight unit and typical mg/kg.
pub fn validate(input: &DosageCalculationInput) -> CalcResult<(Unit, f64)> {
    let animal = &input.animal;
    let medication = &input.medication;

    if animal.species.trim().is_empty() {
        return Err(DosageError::InvalidSpecies);
    }
    if !animal.weight.is_finite() || animal.weight <= 0.0 {
        return Err(DosageError::InvalidWeight(animal.weight));
    }
    let weight_unit = match animal.weight_unit.as_str() {
        "kg" => Unit::Kg,
        "lbs" => Unit::Lbs,
        _ => return Err(DosageError::InvalidWeightUnit(animal.weight_unit.clone())),
    };

    if medication.id.trim().is_empty() {
        return Err(DosageError::IncompleteMedication("id"));
    }
    if medication.generic_name.trim().is_empty() {
        return Err(DosageError::IncompleteMedication("genericName"));
    }
    let typical = medication
        .dosage
        .typical
        .filter(|t| t.is_finite())
        .ok_or_else(|| DosageError::MissingDosageConfig(medication.id.clone()))?;

    Ok((weight_unit, typical))
}

/// Convert an absolute mg dose to the display unit, unrounded.
fn mg_to_display(mg: f64, target: TargetUnit, medication: &MedicationData) -> CalcResult<f64> {
    match target {
        TargetUnit::Mg => Ok(mg),
        TargetUnit::Ml => usable_fact(medication.concentration)
            .map(|concentration| mg / concentration)
            .ok_or_else(|| DosageError::MissingConcentration(medication.id.clone())),
        TargetUnit::Tablets => usable_fact(medication.units_per_tablet)
            .map(|per_tablet| mg / per_tablet)
            .ok_or_else(|| DosageError::MissingUnitsPerTablet(medication.id.clone())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AnimalInfo, SafetyLevel};

    fn input(typical: f64, weight_kg: f64) -> DosageCalculationInput {
        let mut med = MedicationData::new("CARP-100", "Carprofen", typical);
        med.dosage.min = Some(10.0);
        med.dosage.max = Some(20.0);
        DosageCalculationInput::new(med, AnimalInfo::new("dog", weight_kg))
    }

    #[test]
    fn test_standard_dose() {
        let result = calculate(&input(15.0, 30.0)).unwrap();
        assert_eq!(result.dose, 450.0);
        assert_eq!(result.unit, Unit::Mg);
        assert_eq!(result.min_dose, 300.0);
        assert_eq!(result.max_dose, 600.0);
        assert_eq!(result.safety_level, SafetyLevel::Safe);
        assert!(result.warnings.is_empty());
        assert!(result.applied_adjustments.is_empty());
        assert_eq!(result.frequency, "As directed");
        assert!(result.daily_info.is_none());
    }

    #[test]
    fn test_pounds_converted_to_kg() {
        let mut input = input(15.0, 66.1386);
        input.animal.weight_unit = "lbs".into();
        let result = calculate(&input).unwrap();
        assert_eq!(result.calculation_details.weight_in_kg, 30.0);
        assert_eq!(result.dose, 450.0);
    }

    #[test]
    fn test_validation_errors() {
        let mut bad = input(15.0, 30.0);
        bad.animal.species = "  ".into();
        assert_eq!(calculate(&bad).unwrap_err(), DosageError::InvalidSpecies);

        let mut bad = input(15.0, 0.0);
        assert!(matches!(calculate(&bad), Err(DosageError::InvalidWeight(_))));
        bad.animal.weight = f64::NAN;
        assert!(matches!(calculate(&bad), Err(DosageError::InvalidWeight(_))));

        for unit in ["g", "KG", "pounds", ""] {
            let mut bad = input(15.0, 30.0);
            bad.animal.weight_unit = unit.into();
            assert!(matches!(calculate(&bad), Err(DosageError::InvalidWeightUnit(_))));
        }

        let mut bad = input(15.0, 30.0);
        bad.medication.id = String::new();
        assert_eq!(
            calculate(&bad).unwrap_err(),
            DosageError::IncompleteMedication("id")
        );

        let mut bad = input(15.0, 30.0);
        bad.medication.generic_name = String::new();
        assert_eq!(
            calculate(&bad).unwrap_err(),
            DosageError::IncompleteMedication("genericName")
        );

        let mut bad = input(15.0, 30.0);
        bad.medication.dosage.typical = None;
        assert!(matches!(calculate(&bad), Err(DosageError::MissingDosageConfig(_))));
    }

    #[test]
    fn test_missing_conversion_facts() {
        let mut req = input(15.0, 30.0);
        req.target_unit = Some("ml".into());
        assert_eq!(
            calculate(&req).unwrap_err(),
            DosageError::MissingConcentration("CARP-100".into())
        );

        req.target_unit = Some("tablets".into());
        assert_eq!(
            calculate(&req).unwrap_err(),
            DosageError::MissingUnitsPerTablet("CARP-100".into())
        );

        for unit in ["mcg", "cc", "tab"] {
            req.target_unit = Some(unit.into());
            assert!(matches!(calculate(&req), Err(DosageError::UnsupportedUnit(_))));
        }
    }

    #[test]
    fn test_contraindication_aborts() {
        let mut req = input(15.0, 30.0);
        req.medication.contraindications = vec!["liver disease".into()];
        req.animal.conditions = vec!["Liver Disease".into()];
        assert!(matches!(
            calculate(&req),
            Err(DosageError::Contraindicated { .. })
        ));
    }

    #[test]
    fn test_daily_info_and_frequency() {
        let mut req = input(15.0, 30.0);
        req.medication.typical_frequency_hours = Some(12.0);
        let result = calculate(&req).unwrap();

        assert_eq!(result.frequency, "Twice daily");
        let daily = result.daily_info.unwrap();
        assert_eq!(daily.doses_per_day, 2);
        assert_eq!(daily.total_daily_dose, 900.0);
        assert_eq!(daily.unit, Unit::Mg);
        assert_eq!(daily.time_between_doses, "12 hours");
    }

    #[test]
    fn test_daily_maximum_exceeded_is_danger() {
        let mut req = input(15.0, 30.0);
        req.medication.typical_frequency_hours = Some(8.0);
        req.medication.max_daily_dose = Some(30.0);
        let result = calculate(&req).unwrap();

        assert_eq!(result.safety_level, SafetyLevel::Danger);
        assert!(result.warnings[0].contains("exceeds maximum of 30 mg/kg/day"));
    }

    #[test]
    fn test_custom_policy() {
        let mut req = input(15.0, 30.0);
        req.medication.route = Some("IV".into());
        req.medication.route_adjustments.insert(
            "iv".into(),
            crate::models::RouteAdjustment {
                multiplier: 0.7,
                additional_warnings: vec![],
            },
        );

        assert_eq!(calculate(&req).unwrap().safety_level, SafetyLevel::Safe);

        let strict = DosageCalculator::with_policy(SafetyPolicy {
            caution_low_multiplier: 0.75,
            caution_high_multiplier: 1.5,
        });
        let result = strict.calculate(&req).unwrap();
        assert_eq!(result.safety_level, SafetyLevel::Caution);
        assert_eq!(result.calculation_method.as_str(), "route_adjusted");
    }
}
