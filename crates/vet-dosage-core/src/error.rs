//! Typed calculation errors.
//!
//! Every failure aborts the whole calculation. Nothing here is a warning:
//! warnings travel inside a successful [`crate::DosageResult`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised by the dosage engine.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DosageError {
    #[error("Invalid species: a species is required")]
    InvalidSpecies,

    #[error("Invalid weight: {0} (must be greater than zero)")]
    InvalidWeight(f64),

    #[error("Invalid weight unit: '{0}' (expected kg or lbs)")]
    InvalidWeightUnit(String),

    #[error("Incomplete medication data: {0} is missing")]
    IncompleteMedication(&'static str),

    #[error("No typical mg/kg dosage configured for medication '{0}'")]
    MissingDosageConfig(String),

    #[error("Contraindicated: condition '{condition}' matches contraindication '{contraindication}'")]
    Contraindicated {
        condition: String,
        contraindication: String,
    },

    #[error("Cannot convert to mL: no mg/mL concentration configured for '{0}'")]
    MissingConcentration(String),

    #[error("Cannot convert to tablets: no units per tablet configured for '{0}'")]
    MissingUnitsPerTablet(String),

    #[error("Unsupported unit: '{0}'")]
    UnsupportedUnit(String),
}

pub type CalcResult<T> = Result<T, DosageError>;

/// Stable, message-independent classification of a [`DosageError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidSpecies,
    InvalidWeight,
    InvalidWeightUnit,
    IncompleteMedication,
    MissingDosageConfig,
    Contraindicated,
    MissingConcentration,
    MissingUnitsPerTablet,
    UnsupportedUnit,
}

impl DosageError {
    /// The kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            DosageError::InvalidSpecies => ErrorKind::InvalidSpecies,
            DosageError::InvalidWeight(_) => ErrorKind::InvalidWeight,
            DosageError::InvalidWeightUnit(_) => ErrorKind::InvalidWeightUnit,
            DosageError::IncompleteMedication(_) => ErrorKind::IncompleteMedication,
            DosageError::MissingDosageConfig(_) => ErrorKind::MissingDosageConfig,
            DosageError::Contraindicated { .. } => ErrorKind::Contraindicated,
            DosageError::MissingConcentration(_) => ErrorKind::MissingConcentration,
            DosageError::MissingUnitsPerTablet(_) => ErrorKind::MissingUnitsPerTablet,
            DosageError::UnsupportedUnit(_) => ErrorKind::UnsupportedUnit,
        }
    }

    /// True for failures caused by missing or unusable conversion facts.
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::MissingConcentration
                | ErrorKind::MissingUnitsPerTablet
                | ErrorKind::UnsupportedUnit
        )
    }
}
