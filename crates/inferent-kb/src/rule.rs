//! Production rules: an antecedent paired with a consequent.

use crate::antecedent::Antecedent;
use crate::condition::Evaluation;
use crate::consequent::{AssignmentOutcome, Consequent};
use crate::error::KbResult;
use crate::fact_db::FactDatabase;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Result of [`Rule::run`].
#[derive(Debug, Clone, PartialEq)]
pub struct RuleRun {
    pub evaluation: Evaluation,
    /// Empty unless the antecedent succeeded.
    pub assignments: Vec<AssignmentOutcome>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    #[serde(default)]
    pub description: String,
    pub antecedent: Antecedent,
    #[serde(default)]
    pub consequent: Consequent,
    /// Only meaningful inside one consultation.
    #[serde(skip)]
    fired: bool,
}

impl Rule {
    pub fn new(antecedent: Antecedent, consequent: Consequent) -> Self {
        Self {
            description: String::new(),
            antecedent,
            consequent,
            fired: false,
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl AsRef<str>) -> Self {
        self.description = description.as_ref().trim().to_string();
        self
    }

    pub fn has_fired(&self) -> bool {
        self.fired
    }

    pub fn mark_fired(&mut self) {
        self.fired = true;
    }

    pub fn reset(&mut self) {
        self.fired = false;
    }

    /// Facts read by the antecedent. Fails if any condition names no fact.
    pub fn trigger_facts(&self) -> KbResult<BTreeSet<String>> {
        self.antecedent.fact_names()
    }

    /// Facts written by the consequent.
    pub fn response_facts(&self) -> BTreeSet<String> {
        self.consequent.fact_names()
    }

    pub fn test(&self, facts: &FactDatabase) -> Evaluation {
        self.antecedent.test(facts)
    }

    /// Test the antecedent; on success apply the consequent at the propagated
    /// confidence and mark the rule fired.
    pub fn run(&mut self, facts: &mut FactDatabase) -> RuleRun {
        let evaluation = self.antecedent.test(facts);
        if !evaluation.is_success() {
            return RuleRun {
                evaluation,
                assignments: Vec::new(),
            };
        }
        let assignments = self.consequent.assign(facts, evaluation.confidence);
        self.fired = true;
        RuleRun {
            evaluation,
            assignments,
        }
    }
}
