//! Built-in genetic-risk rules for dogs.
//!
//! Used only when a medication's breed table has no matching entry.

/// Breeds commonly carrying the MDR1 (ABCB1) mutation.
pub const MDR1_BREEDS: &[&str] = &[
    "collie",
    "border collie",
    "australian shepherd",
    "shetland sheepdog",
    "german shepherd",
    "old english sheepdog",
    "whippet",
    "silken windhound",
];

/// Drug-name fragments for P-glycoprotein substrates dangerous to MDR1 dogs.
pub const MDR1_SENSITIVE_DRUGS: &[&str] = &[
    "ivermectin",
    "loperamide",
    "acepromazine",
    "butorphanol",
    "cyclosporine",
    "digoxin",
    "doxorubicin",
];

/// Species names the built-in rules apply to.
pub const DOG_SPECIES: &[&str] = &["dog", "canine"];

pub const MDR1_MULTIPLIER: f64 = 0.5;
pub const SIGHTHOUND_MULTIPLIER: f64 = 0.9;

/// A built-in genetic risk that applies to a dog/drug pair.
#[derive(Debug, Clone, PartialEq)]
pub enum GeneticRisk {
    /// MDR1 breed given an MDR1-sensitive drug
    Mdr1 { sensitive_drug: &'static str },
    /// Greyhound metabolic difference
    Sighthound,
}

impl GeneticRisk {
    pub fn multiplier(&self) -> f64 {
        match self {
            GeneticRisk::Mdr1 { .. } => MDR1_MULTIPLIER,
            GeneticRisk::Sighthound => SIGHTHOUND_MULTIPLIER,
        }
    }

    /// Short label used in the applied-adjustment narrative.
    pub fn label(&self) -> &'static str {
        match self {
            GeneticRisk::Mdr1 { .. } => "MDR1 sensitivity",
            GeneticRisk::Sighthound => "greyhound metabolism",
        }
    }

    /// Caregiver-facing warning.
    pub fn warning(&self, breed: &str, generic_name: &str) -> String {
        match self {
            GeneticRisk::Mdr1 { .. } => format!(
                "{} may carry the MDR1 gene mutation: increased sensitivity to {}",
                breed, generic_name
            ),
            GeneticRisk::Sighthound => {
                "Sighthound metabolism: greyhounds clear some drugs more slowly".to_string()
            }
        }
    }
}

/// Check whether a breed is on the MDR1 list.
pub fn is_mdr1_breed(breed: &str) -> bool {
    let breed = breed.trim().to_lowercase();
    MDR1_BREEDS.iter().any(|b| breed.contains(b))
}

/// Find the MDR1-sensitive fragment in a drug name, if any.
pub fn mdr1_sensitive_fragment(generic_name: &str) -> Option<&'static str> {
    let name = generic_name.to_lowercase();
    MDR1_SENSITIVE_DRUGS
        .iter()
        .copied()
        .find(|drug| name.contains(drug))
}

/// Look up the built-in genetic risk for a species/breed/drug combination.
pub fn genetic_risk(species: &str, breed: &str, generic_name: &str) -> Option<GeneticRisk> {
    let species = species.trim().to_lowercase();
    if !DOG_SPECIES.contains(&species.as_str()) {
        return None;
    }

    if is_mdr1_breed(breed) {
        if let Some(sensitive_drug) = mdr1_sensitive_fragment(generic_name) {
            return Some(GeneticRisk::Mdr1 { sensitive_drug });
        }
    }

    if breed.to_lowercase().contains("greyhound") {
        return Some(GeneticRisk::Sighthound);
    }

    None
}
