//! Provenance of a consultation: rounds of logs, each attributed to a rule or to the user.

use crate::consultation::DoneReason;
use inferent_kb::FactValue;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "rule")]
pub enum Origin {
    /// Facts already known when the consultation started.
    InitialValue,
    /// A value the user supplied when asked.
    RequestedData,
    Rule(String),
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InitialValue => f.write_str("Initial Value"),
            Self::RequestedData => f.write_str("Requested Data"),
            Self::Rule(name) => f.write_str(name),
        }
    }
}

/// One explanation record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Log {
    pub origin: Origin,
    /// Snapshots of the values that actually took effect.
    pub assignments: BTreeMap<String, FactValue>,
    /// Facts whose assignment was attempted and rejected.
    pub rejected: BTreeSet<String>,
}

impl Log {
    pub fn new(origin: Origin) -> Self {
        Self {
            origin,
            assignments: BTreeMap::new(),
            rejected: BTreeSet::new(),
        }
    }

    /// The originating rule; `None` for user input.
    pub fn rule(&self) -> Option<&str> {
        match &self.origin {
            Origin::Rule(name) => Some(name),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Round {
    pub logs: Vec<Log>,
}

/// Everything a finished consultation produced. Round 0 holds the initial values.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Explanation {
    pub rounds: Vec<Round>,
    pub reason: DoneReason,
}

impl Explanation {
    pub fn logs(&self) -> impl Iterator<Item = &Log> {
        self.rounds.iter().flat_map(|round| round.logs.iter())
    }

    /// Rules that fired, in firing order.
    pub fn fired_rules(&self) -> Vec<&str> {
        self.logs().filter_map(Log::rule).collect()
    }

    /// The last log that set `fact`, with its value.
    pub fn why(&self, fact: &str) -> Option<(&Log, &FactValue)> {
        self.logs()
            .filter_map(|log| log.assignments.get(fact).map(|value| (log, value)))
            .last()
    }
}
