//! The consultation state machine.
//!
//! ```text
//!   begin ─► give* ─► step ──► Fired ──────────┐
//!                      ▲  ├──► NeedsInput ─► supply / cancel
//!                      │  └──► Done(reason)    │
//!                      └───────────────────────┘
//! ```
//!
//! A [`Consultation`] borrows the knowledge base exclusively. When it is
//! finished or dropped, every session value and fired flag is cleared.

use crate::explanation::{Explanation, Origin, Round};
use crate::forward::{
    find_triggered, identify_fact_requests, log_existing, log_specific, run_triggered,
    FactRequests,
};
use anyhow::Context;
use inferent_kb::{Confidence, FactFilter, KbError, KnowledgeBase, Literal, RuleFilter};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

// ============================================================================
// Configuration
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Upper bound on rounds after the initial one.
    pub max_rounds: usize,
    /// Rejected answers tolerated for one request before the consultation is cancelled.
    pub max_request_attempts: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_rounds: 10_000,
            max_request_attempts: 3,
        }
    }
}

impl EngineConfig {
    /// Read a JSON config file. Missing keys keep their defaults.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("failed to parse engine config {}", path.display()))
    }
}

// ============================================================================
// Steps and inputs
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DoneReason {
    /// Every fact holds a value.
    Saturated,
    /// Every rule has fired.
    RulesExhausted,
    /// Nothing triggered and no unknown fact is left to ask for.
    NoRequestableFacts,
    Cancelled,
    RoundLimit,
}

impl fmt::Display for DoneReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Saturated => "every fact is known",
            Self::RulesExhausted => "every rule has fired",
            Self::NoRequestableFacts => "no rule can make progress and nothing is left to ask",
            Self::Cancelled => "cancelled by the user",
            Self::RoundLimit => "round limit reached",
        })
    }
}

/// One value from the user.
#[derive(Debug, Clone, PartialEq)]
pub struct UserInput {
    pub fact: String,
    pub value: Literal,
    pub confidence: Confidence,
}

impl UserInput {
    pub fn new(fact: impl Into<String>, value: Literal, confidence: Confidence) -> Self {
        Self {
            fact: fact.into(),
            value,
            confidence,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// A round ran the listed rules.
    Fired { round: usize, rules: Vec<String> },
    /// Nothing triggered; one of these facts must be supplied (or the consultation cancelled).
    NeedsInput(FactRequests),
    Done(DoneReason),
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConsultationError {
    #[error("initial values can only be given before the first step")]
    AlreadyStarted,

    #[error("the consultation is not waiting for input")]
    NotAwaitingInput,

    #[error("'{0}' was not requested")]
    NotRequested(String),

    #[error("value for '{fact}' was rejected: {source}")]
    Rejected {
        fact: String,
        #[source]
        source: KbError,
    },
}

// ============================================================================
// Consultation
// ============================================================================

#[derive(Debug)]
enum Phase {
    Init,
    Running,
    Awaiting(FactRequests),
    Done(DoneReason),
}

pub struct Consultation<'kb> {
    kb: &'kb mut KnowledgeBase,
    config: EngineConfig,
    rounds: Vec<Round>,
    phase: Phase,
}

impl<'kb> Consultation<'kb> {
    /// Start a consultation. Values already present in `kb` count as initial values.
    pub fn begin(kb: &'kb mut KnowledgeBase, config: EngineConfig) -> Self {
        tracing::info!(
            facts = kb.facts.count(),
            rules = kb.rules.count(),
            "consultation started"
        );
        Self {
            kb,
            config,
            rounds: Vec::new(),
            phase: Phase::Init,
        }
    }

    pub fn knowledge_base(&self) -> &KnowledgeBase {
        &*self.kb
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Rounds recorded so far.
    pub fn rounds(&self) -> &[Round] {
        &self.rounds
    }

    pub fn pending(&self) -> Option<&FactRequests> {
        match &self.phase {
            Phase::Awaiting(requests) => Some(requests),
            _ => None,
        }
    }

    pub fn done(&self) -> Option<DoneReason> {
        match self.phase {
            Phase::Done(reason) => Some(reason),
            _ => None,
        }
    }

    /// Set an initial value. Only allowed before the first [`Consultation::step`].
    pub fn give(&mut self, input: UserInput) -> Result<(), ConsultationError> {
        if !matches!(self.phase, Phase::Init) {
            return Err(ConsultationError::AlreadyStarted);
        }
        self.apply(&input)
    }

    /// Advance by one round.
    ///
    /// Calling `step` again while input is pending repeats the same request;
    /// once done, it keeps returning the same reason.
    pub fn step(&mut self) -> Step {
        if matches!(self.phase, Phase::Init) {
            self.rounds.push(Round {
                logs: vec![log_existing(&self.kb.facts)],
            });
            self.phase = Phase::Running;
        }
        match &self.phase {
            Phase::Awaiting(requests) => return Step::NeedsInput(requests.clone()),
            Phase::Done(reason) => return Step::Done(*reason),
            Phase::Init | Phase::Running => {}
        }

        if let Some(reason) = self.terminal_reason() {
            return self.conclude(reason);
        }

        let triggered = find_triggered(&*self.kb);
        if !triggered.is_empty() {
            self.kb.facts.stamp_events(Some(self.rounds.len() as u64));
            let logs = run_triggered(&mut *self.kb, &triggered);
            self.rounds.push(Round { logs });
            let round = self.rounds.len() - 1;
            tracing::debug!(round, fired = triggered.len(), "round complete");
            return Step::Fired {
                round,
                rules: triggered,
            };
        }

        let requests = identify_fact_requests(&*self.kb);
        if requests.is_empty() {
            return self.conclude(DoneReason::NoRequestableFacts);
        }
        tracing::debug!(requestable = requests.facts.len(), "waiting for user input");
        self.phase = Phase::Awaiting(requests.clone());
        Step::NeedsInput(requests)
    }

    /// Answer the pending request. On error the request stays pending.
    pub fn supply(&mut self, input: UserInput) -> Result<(), ConsultationError> {
        let Phase::Awaiting(requests) = &self.phase else {
            return Err(ConsultationError::NotAwaitingInput);
        };
        if !requests.contains(&input.fact) {
            return Err(ConsultationError::NotRequested(input.fact));
        }
        self.apply(&input)?;
        let log = log_specific(
            &self.kb.facts,
            std::iter::once(&input.fact),
            Origin::RequestedData,
        );
        self.rounds.push(Round { logs: vec![log] });
        self.phase = Phase::Running;
        Ok(())
    }

    /// Stop early. The rounds recorded so far are kept.
    pub fn cancel(&mut self) {
        if self.done().is_none() {
            self.conclude(DoneReason::Cancelled);
        }
    }

    /// Hand back the explanation and reset the knowledge base.
    ///
    /// An unfinished consultation counts as cancelled.
    pub fn finish(mut self) -> Explanation {
        self.cancel();
        let reason = self.done().unwrap_or(DoneReason::Cancelled);
        Explanation {
            rounds: std::mem::take(&mut self.rounds),
            reason,
        }
    }

    /// Write a user value, stamped with the round it will be logged in.
    fn apply(&mut self, input: &UserInput) -> Result<(), ConsultationError> {
        self.kb.facts.stamp_events(Some(self.rounds.len() as u64));
        self.kb
            .facts
            .assign(&input.fact, &input.value, input.confidence)
            .map_err(|source| ConsultationError::Rejected {
                fact: input.fact.clone(),
                source,
            })
    }

    fn terminal_reason(&self) -> Option<DoneReason> {
        if self.kb.facts.list(FactFilter::HasNoValue).is_empty() {
            return Some(DoneReason::Saturated);
        }
        if self.kb.rules.list(RuleFilter::HasNotFired).is_empty() {
            return Some(DoneReason::RulesExhausted);
        }
        // Round 0 holds the initial values.
        if self.rounds.len() > self.config.max_rounds {
            return Some(DoneReason::RoundLimit);
        }
        None
    }

    fn conclude(&mut self, reason: DoneReason) -> Step {
        tracing::info!(rounds = self.rounds.len(), %reason, "consultation finished");
        self.phase = Phase::Done(reason);
        Step::Done(reason)
    }
}

impl Drop for Consultation<'_> {
    fn drop(&mut self) {
        self.kb.reset();
    }
}
