//! Verification of the engine's algebraic properties
//!
//! The qualifier set is finite, so the lattice laws and the adaptation rules
//! can be checked exhaustively. Properties over larger domains (signatures of
//! arbitrary arity) are sampled with QuickCheck instead.

pub mod properties;
pub mod quickcheck;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

pub use properties::{all_properties, Property};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PropertyStatus {
    Proven,
    Violated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VerificationMethod {
    /// Every combination of inputs was enumerated
    Exhaustive,
    /// Random inputs; `tests` cases passed
    Sampled { tests: u64 },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationResult {
    pub property: String,
    pub status: PropertyStatus,
    pub method: VerificationMethod,
    /// First failing input, rendered for humans
    pub counterexample: Option<String>,
}

impl VerificationResult {
    pub fn is_proven(&self) -> bool {
        self.status == PropertyStatus::Proven
    }
}

pub struct PropertyVerifier {
    sample_tests: u64,
}

impl Default for PropertyVerifier {
    fn default() -> Self {
        Self::new()
    }
}

impl PropertyVerifier {
    pub fn new() -> Self {
        Self { sample_tests: 500 }
    }

    pub fn with_sample_tests(mut self, tests: u64) -> Self {
        self.sample_tests = tests;
        self
    }

    /// Run every registered property
    pub fn verify_all(&self) -> Vec<VerificationResult> {
        let mut results: Vec<VerificationResult> = all_properties().iter().map(|p| self.verify(p)).collect();
        results.extend(quickcheck::sampled_properties(self.sample_tests));

        for failed in results.iter().filter(|r| !r.is_proven()) {
            warn!(property = %failed.property, counterexample = ?failed.counterexample, "property violated");
        }
        results
    }

    pub fn verify(&self, property: &Property) -> VerificationResult {
        let counterexample = (property.check)();
        debug!(property = property.name, proven = counterexample.is_none(), "verified property");
        VerificationResult {
            property: property.name.to_string(),
            status: if counterexample.is_none() {
                PropertyStatus::Proven
            } else {
                PropertyStatus::Violated
            },
            method: VerificationMethod::Exhaustive,
            counterexample,
        }
    }
}
