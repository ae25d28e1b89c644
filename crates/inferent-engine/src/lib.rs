//! Inferent forward-chaining engine
//!
//! Runs consultations over an [`inferent_kb::KnowledgeBase`]:
//!
//! 1. snapshot the facts the user already knows (round 0),
//! 2. fire every unfired rule whose antecedent currently succeeds, one log per rule,
//! 3. when nothing triggers, ask the user for one unknown fact some unfired rule reads,
//! 4. repeat until every fact is known, every rule has fired, nothing is left to
//!    ask, or the user cancels; then reset the knowledge base.
//!
//! [`Consultation`] exposes this as a stepwise state machine;
//! [`run_consultation`] drives it with a [`UserAgent`].

pub mod agent;
pub mod consultation;
pub mod explanation;
pub mod forward;

pub use agent::{run_consultation, Answer, ScriptedAgent, UserAgent};
pub use consultation::{
    Consultation, ConsultationError, DoneReason, EngineConfig, Step, UserInput,
};
pub use explanation::{Explanation, Log, Origin, Round};
pub use forward::{
    find_triggered, identify_fact_requests, log_existing, log_specific, run_triggered,
    FactRequests,
};

#[cfg(test)]
mod tests {
    use super::*;
    use inferent_kb::{
        Antecedent, Assignment, Comparator, Condition, Confidence, Consequent, KnowledgeBase,
        Literal, Rule, RuleFilter, ValueKind,
    };
    use proptest::prelude::*;

    /// `f0 → f1 → … → fn`, one rule per link, named so map order is the
    /// reverse of chain order.
    fn ladder(links: usize) -> KnowledgeBase {
        let mut kb = KnowledgeBase::new();
        for i in 0..=links {
            kb.facts.create(format!("f{i}"), ValueKind::Int).unwrap();
        }
        for i in 0..links {
            let rule = Rule::new(
                Antecedent::new(Condition::new(
                    format!("f{i}"),
                    Comparator::GreaterThan,
                    0_i64,
                    Confidence::NONE,
                )),
                Consequent::new().with(Assignment::new(
                    format!("f{}", i + 1),
                    (i + 1) as i64,
                    Confidence::CERTAIN,
                )),
            );
            kb.rules.insert(format!("rule-{:03}", links - i), rule).unwrap();
        }
        kb
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn ladder_fires_each_rule_once_in_order(links in 1usize..12) {
            let mut kb = ladder(links);
            let mut consultation = Consultation::begin(&mut kb, EngineConfig::default());
            consultation
                .give(UserInput::new("f0", Literal::Int(1), Confidence::CERTAIN))
                .unwrap();

            let mut fired = Vec::new();
            let reason = loop {
                match consultation.step() {
                    Step::Fired { rules, .. } => {
                        prop_assert_eq!(rules.len(), 1);
                        fired.extend(rules);
                    }
                    Step::Done(reason) => break reason,
                    Step::NeedsInput(requests) => {
                        return Err(TestCaseError::fail(format!("unexpected request {requests:?}")));
                    }
                }
            };

            prop_assert_eq!(reason, DoneReason::Saturated);
            prop_assert_eq!(fired.len(), links);
            let unique: std::collections::BTreeSet<_> = fired.iter().collect();
            prop_assert_eq!(unique.len(), links);
            let rules = &consultation.knowledge_base().rules;
            prop_assert!(rules.list(RuleFilter::HasNotFired).is_empty());
            prop_assert_eq!(consultation.finish().rounds.len(), links + 1);
        }
    }
}
