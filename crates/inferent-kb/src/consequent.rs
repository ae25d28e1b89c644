//! Ordered batches of assignments.

use crate::assignment::AnyAssignment;
use crate::confidence::Confidence;
use crate::error::KbResult;
use crate::fact_db::FactDatabase;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// What a single assignment did when its consequent ran.
#[derive(Debug, Clone, PartialEq)]
pub struct AssignmentOutcome {
    pub fact: String,
    pub result: KbResult<()>,
}

impl AssignmentOutcome {
    pub fn applied(&self) -> bool {
        self.result.is_ok()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Consequent {
    pub assignments: Vec<AnyAssignment>,
}

impl Consequent {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, assignment: impl Into<AnyAssignment>) -> Self {
        self.assignments.push(assignment.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    pub fn fact_names(&self) -> BTreeSet<String> {
        self.assignments
            .iter()
            .map(|a| a.fact().to_string())
            .collect()
    }

    /// Apply every assignment in order. A failed assignment does not stop the rest.
    pub fn assign(
        &self,
        facts: &mut FactDatabase,
        confidence: Confidence,
    ) -> Vec<AssignmentOutcome> {
        self.assignments
            .iter()
            .map(|assignment| AssignmentOutcome {
                fact: assignment.fact().to_string(),
                result: assignment.try_assign(facts, confidence),
            })
            .collect()
    }
}
