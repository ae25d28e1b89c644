//! The user-facing seam of a consultation, and the driver loop that uses it.

use crate::consultation::{Consultation, ConsultationError, EngineConfig, Step, UserInput};
use crate::explanation::Explanation;
use crate::forward::FactRequests;
use inferent_kb::KnowledgeBase;
use std::collections::VecDeque;

/// Reply to a fact request.
#[derive(Debug, Clone, PartialEq)]
pub enum Answer {
    Supply(UserInput),
    Cancel,
}

/// Whoever answers the consultation's questions: a terminal, a test script, a GUI.
pub trait UserAgent {
    /// Values the user already knows before any rule runs.
    fn initial_inputs(&mut self, kb: &KnowledgeBase) -> anyhow::Result<Vec<UserInput>>;

    /// Pick one of `requests.facts` and give it a value, or cancel.
    fn request(&mut self, kb: &KnowledgeBase, requests: &FactRequests) -> anyhow::Result<Answer>;

    /// Called when a value was not accepted.
    fn rejected(&mut self, _input: &UserInput, _error: &ConsultationError) {}
}

/// Run a whole consultation against `kb`, which is reset afterwards.
///
/// Agent errors abort the consultation (the knowledge base is still reset).
pub fn run_consultation(
    kb: &mut KnowledgeBase,
    agent: &mut dyn UserAgent,
    config: EngineConfig,
) -> anyhow::Result<Explanation> {
    let max_attempts = config.max_request_attempts.max(1);
    let mut consultation = Consultation::begin(kb, config);

    for input in agent.initial_inputs(consultation.knowledge_base())? {
        if let Err(err) = consultation.give(input.clone()) {
            tracing::warn!(fact = %input.fact, error = %err, "initial value ignored");
            agent.rejected(&input, &err);
        }
    }

    loop {
        let requests = match consultation.step() {
            Step::Fired { .. } => continue,
            Step::Done(_) => break,
            Step::NeedsInput(requests) => requests,
        };
        let mut attempts = 0;
        loop {
            match agent.request(consultation.knowledge_base(), &requests)? {
                Answer::Cancel => {
                    consultation.cancel();
                    break;
                }
                Answer::Supply(input) => match consultation.supply(input.clone()) {
                    Ok(()) => break,
                    Err(err) => {
                        agent.rejected(&input, &err);
                        attempts += 1;
                        if attempts >= max_attempts {
                            tracing::warn!(attempts, "too many rejected answers; cancelling");
                            consultation.cancel();
                            break;
                        }
                    }
                },
            }
        }
    }

    Ok(consultation.finish())
}

/// Answers from a fixed script. Once the script runs out, every request is cancelled.
#[derive(Debug, Clone, Default)]
pub struct ScriptedAgent {
    initial: Vec<UserInput>,
    answers: VecDeque<Answer>,
    /// Every request seen, in order.
    pub requests: Vec<FactRequests>,
    /// Every rejected input with its error message.
    pub rejections: Vec<(UserInput, String)>,
}

impl ScriptedAgent {
    pub fn new(initial: Vec<UserInput>) -> Self {
        Self {
            initial,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn answer(mut self, answer: Answer) -> Self {
        self.answers.push_back(answer);
        self
    }
}

impl UserAgent for ScriptedAgent {
    fn initial_inputs(&mut self, _kb: &KnowledgeBase) -> anyhow::Result<Vec<UserInput>> {
        Ok(std::mem::take(&mut self.initial))
    }

    fn request(&mut self, _kb: &KnowledgeBase, requests: &FactRequests) -> anyhow::Result<Answer> {
        self.requests.push(requests.clone());
        Ok(self.answers.pop_front().unwrap_or(Answer::Cancel))
    }

    fn rejected(&mut self, input: &UserInput, error: &ConsultationError) {
        self.rejections.push((input.clone(), error.to_string()));
    }
}
