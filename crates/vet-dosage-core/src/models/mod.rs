//! Domain models for the dosage engine.

mod animal;
mod dosage;
mod medication;

pub use animal::*;
pub use dosage::*;
pub use medication::*;
