//! Boolean trigger expressions: a root condition followed by connector-chained conditions.

use crate::condition::{AnyCondition, Evaluation, TestOutcome};
use crate::error::{KbError, KbResult};
use crate::fact_db::FactDatabase;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Connector {
    #[serde(rename = "AND")]
    And,
    #[serde(rename = "OR")]
    Or,
    #[serde(rename = "XOR")]
    Xor,
}

impl Connector {
    fn apply(self, left: bool, right: bool) -> bool {
        match self {
            Self::And => left && right,
            Self::Or => left || right,
            Self::Xor => left != right,
        }
    }
}

impl fmt::Display for Connector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::And => "AND",
            Self::Or => "OR",
            Self::Xor => "XOR",
        })
    }
}

/// Evaluated left to right, root first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Antecedent {
    pub root: AnyCondition,
    #[serde(default)]
    pub chain: Vec<(Connector, AnyCondition)>,
}

impl Antecedent {
    pub fn new(root: impl Into<AnyCondition>) -> Self {
        Self {
            root: root.into(),
            chain: Vec::new(),
        }
    }

    #[must_use]
    pub fn and(self, condition: impl Into<AnyCondition>) -> Self {
        self.then(Connector::And, condition)
    }

    #[must_use]
    pub fn or(self, condition: impl Into<AnyCondition>) -> Self {
        self.then(Connector::Or, condition)
    }

    #[must_use]
    pub fn xor(self, condition: impl Into<AnyCondition>) -> Self {
        self.then(Connector::Xor, condition)
    }

    #[must_use]
    pub fn then(mut self, connector: Connector, condition: impl Into<AnyCondition>) -> Self {
        self.chain.push((connector, condition.into()));
        self
    }

    /// Root first, then the chain in order.
    pub fn conditions(&self) -> impl Iterator<Item = &AnyCondition> {
        std::iter::once(&self.root).chain(self.chain.iter().map(|(_, c)| c))
    }

    /// Names of every referenced fact.
    ///
    /// Fails with [`KbError::InvalidAntecedent`] if any condition names no fact.
    pub fn fact_names(&self) -> KbResult<BTreeSet<String>> {
        self.conditions()
            .enumerate()
            .map(|(position, condition)| match condition.fact() {
                "" => Err(KbError::InvalidAntecedent(position)),
                name => Ok(name.to_string()),
            })
            .collect()
    }

    /// Any error outcome short-circuits; the rest of the chain is not evaluated.
    pub fn test(&self, facts: &FactDatabase) -> Evaluation {
        let mut running = self.root.test(facts);
        if running.outcome.is_error() {
            return running;
        }
        for (connector, condition) in &self.chain {
            let local = condition.test(facts);
            if local.outcome.is_error() {
                return local;
            }
            let holds = connector.apply(running.is_success(), local.is_success());
            running = Evaluation {
                outcome: if holds {
                    TestOutcome::Success
                } else {
                    TestOutcome::Failure
                },
                confidence: running.confidence.combine(local.confidence),
            };
        }
        running
    }
}

impl fmt::Display for Antecedent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.root)?;
        for (connector, condition) in &self.chain {
            write!(f, " {connector} {condition}")?;
        }
        Ok(())
    }
}
