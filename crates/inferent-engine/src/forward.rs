//! The forward-chaining operations a consultation is built from.
//!
//! Each function is a single match/resolve/act step over a [`KnowledgeBase`];
//! [`crate::Consultation`] sequences them.

use crate::explanation::{Log, Origin};
use inferent_kb::{FactDatabase, FactFilter, KnowledgeBase, RuleFilter};
use std::collections::BTreeSet;

/// Facts the user may be asked for when no rule triggers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FactRequests {
    pub facts: BTreeSet<String>,
    /// Unfired rules whose antecedent names no fact; they can never be requested for.
    pub blocked_rules: BTreeSet<String>,
}

impl FactRequests {
    pub fn is_empty(&self) -> bool {
        self.facts.is_empty()
    }

    pub fn contains(&self, fact: &str) -> bool {
        self.facts.contains(fact)
    }
}

/// Snapshot every known fact into one log tagged as initial input.
pub fn log_existing(facts: &FactDatabase) -> Log {
    log_specific(facts, &facts.list(FactFilter::HasValue), Origin::InitialValue)
}

/// Snapshot the named facts. Names without a session value land in `rejected`.
pub fn log_specific<'a, I>(facts: &FactDatabase, names: I, origin: Origin) -> Log
where
    I: IntoIterator<Item = &'a String>,
{
    let mut log = Log::new(origin);
    for name in names {
        match facts.value(name) {
            Some(value) => {
                log.assignments.insert(name.clone(), value);
            }
            None => {
                log.rejected.insert(name.clone());
            }
        }
    }
    log
}

/// Unfired rules whose antecedent currently tests as a success.
///
/// Error outcomes and failures are both excluded, without distinction.
pub fn find_triggered(kb: &KnowledgeBase) -> Vec<String> {
    kb.rules
        .iter()
        .filter(|(_, rule)| !rule.has_fired())
        .filter(|(name, rule)| {
            let evaluation = rule.test(&kb.facts);
            tracing::debug!(
                rule = %name,
                outcome = ?evaluation.outcome,
                confidence = %evaluation.confidence,
                "tested rule"
            );
            evaluation.is_success()
        })
        .map(|(name, _)| name.to_string())
        .collect()
}

/// Run each named rule and mark it fired, producing one log per rule.
///
/// The antecedent is re-tested before the consequent runs, so a rule whose
/// premise was invalidated by an earlier rule in the same batch assigns nothing.
pub fn run_triggered(kb: &mut KnowledgeBase, triggered: &[String]) -> Vec<Log> {
    let KnowledgeBase { facts, rules } = kb;
    let mut logs = Vec::with_capacity(triggered.len());
    for name in triggered {
        let Ok(rule) = rules.get_mut(name) else {
            tracing::warn!(rule = %name, "triggered rule disappeared before it could run");
            continue;
        };
        let run = rule.run(facts);
        rule.mark_fired();

        let mut log = Log::new(Origin::Rule(name.clone()));
        for outcome in &run.assignments {
            match (&outcome.result, facts.value(&outcome.fact)) {
                (Ok(()), Some(value)) => {
                    log.assignments.insert(outcome.fact.clone(), value);
                }
                (result, _) => {
                    if let Err(err) = result {
                        tracing::debug!(
                            rule = %name,
                            fact = %outcome.fact,
                            error = %err,
                            "assignment had no effect"
                        );
                    }
                    log.rejected.insert(outcome.fact.clone());
                }
            }
        }
        // A later successful write to the same fact wins over an earlier rejection.
        let applied: Vec<String> = log.assignments.keys().cloned().collect();
        for fact in applied {
            log.rejected.remove(&fact);
        }
        tracing::debug!(
            rule = %name,
            outcome = ?run.evaluation.outcome,
            applied = log.assignments.len(),
            rejected = log.rejected.len(),
            "fired rule"
        );
        logs.push(log);
    }
    logs
}

/// Unknown facts read by unfired rules.
///
/// Names that do not exist in the fact database are left out since no answer
/// could ever satisfy them.
pub fn identify_fact_requests(kb: &KnowledgeBase) -> FactRequests {
    let triggers = kb.rules.trigger_facts(RuleFilter::HasNotFired);
    for rule in &triggers.blocked {
        tracing::warn!(
            rule = %rule,
            "rule has a condition without a target fact and is never requested for"
        );
    }
    let facts = triggers
        .facts
        .into_iter()
        .filter(|name| {
            let exists = kb.facts.contains(name);
            if !exists {
                tracing::warn!(fact = %name, "rule reads a fact that does not exist");
            }
            exists && !kb.facts.known(name)
        })
        .collect();
    FactRequests {
        facts,
        blocked_rules: triggers.blocked,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use inferent_kb::{
        Antecedent, Assignment, Comparator, Condition, Confidence, Consequent, Literal, Rule,
        ValueKind,
    };

    fn kb() -> KnowledgeBase {
        let mut kb = KnowledgeBase::new();
        for name in ["a", "b", "c"] {
            kb.facts.create(name, ValueKind::Bool).unwrap();
        }
        let when = |fact: &str| {
            Antecedent::new(Condition::new(fact, Comparator::EqualTo, true, Confidence::NONE))
        };
        let set = |fact: &str| {
            Consequent::new().with(Assignment::new(fact, true, Confidence::CERTAIN))
        };
        kb.rules.insert("a-to-b", Rule::new(when("a"), set("b"))).unwrap();
        kb.rules.insert("b-to-c", Rule::new(when("b"), set("c"))).unwrap();
        kb.rules
            .insert(
                "bad-write",
                Rule::new(
                    when("a"),
                    Consequent::new().with(Assignment::new("c", 5_i64, Confidence::CERTAIN)),
                ),
            )
            .unwrap();
        kb
    }

    #[test]
    fn log_existing_snapshots_known_facts() {
        let mut kb = kb();
        assert!(log_existing(&kb.facts).assignments.is_empty());
        kb.facts
            .assign("b", &Literal::Bool(false), Confidence::new(0.3))
            .unwrap();
        let log = log_existing(&kb.facts);
        assert_eq!(log.origin, Origin::InitialValue);
        assert_eq!(log.assignments.keys().collect::<Vec<_>>(), ["b"]);
    }

    #[test]
    fn find_triggered_skips_fired_and_unknown() {
        let mut kb = kb();
        assert!(find_triggered(&kb).is_empty());
        kb.facts
            .assign("a", &Literal::Bool(true), Confidence::CERTAIN)
            .unwrap();
        assert_eq!(find_triggered(&kb), ["a-to-b", "bad-write"]);
        kb.rules.get_mut("a-to-b").unwrap().mark_fired();
        assert_eq!(find_triggered(&kb), ["bad-write"]);
    }

    #[test]
    fn run_triggered_logs_applied_and_rejected_assignments() {
        let mut kb = kb();
        kb.facts
            .assign("a", &Literal::Bool(true), Confidence::CERTAIN)
            .unwrap();
        let triggered = find_triggered(&kb);

        let logs = run_triggered(&mut kb, &triggered);

        assert_eq!(logs.len(), 2);
        assert_eq!(logs[0].rule(), Some("a-to-b"));
        assert!(logs[0].assignments.contains_key("b"));
        assert_eq!(logs[1].rule(), Some("bad-write"));
        assert!(logs[1].assignments.is_empty());
        assert_eq!(logs[1].rejected, BTreeSet::from(["c".to_string()]));
        assert!(kb.rules.get("bad-write").unwrap().has_fired());
    }

    #[test]
    fn rules_that_no_longer_test_true_still_fire_without_assigning() {
        let mut kb = kb();
        kb.facts
            .assign("a", &Literal::Bool(true), Confidence::CERTAIN)
            .unwrap();
        let triggered = find_triggered(&kb);
        kb.facts
            .assign("a", &Literal::Bool(false), Confidence::CERTAIN)
            .unwrap();

        let logs = run_triggered(&mut kb, &triggered);

        assert!(logs.iter().all(|log| log.assignments.is_empty()));
        assert!(kb.rules.list(RuleFilter::HasNotFired).contains("b-to-c"));
        assert_eq!(kb.rules.list(RuleFilter::HasFired).len(), 2);
    }

    #[test]
    fn fact_requests_exclude_known_missing_and_blocked() {
        let mut kb = kb();
        kb.rules
            .insert(
                "ghost",
                Rule::new(
                    Antecedent::new(Condition::new(
                        "ghost",
                        Comparator::EqualTo,
                        true,
                        Confidence::NONE,
                    )),
                    Consequent::new(),
                ),
            )
            .unwrap();
        kb.rules
            .insert(
                "blank",
                Rule::new(
                    Antecedent::new(Condition::new(
                        "",
                        Comparator::EqualTo,
                        true,
                        Confidence::NONE,
                    )),
                    Consequent::new(),
                ),
            )
            .unwrap();
        kb.facts
            .assign("a", &Literal::Bool(true), Confidence::CERTAIN)
            .unwrap();

        let requests = identify_fact_requests(&kb);

        assert_eq!(requests.facts, BTreeSet::from(["b".to_string()]));
        assert_eq!(requests.blocked_rules, BTreeSet::from(["blank".to_string()]));
    }
}
