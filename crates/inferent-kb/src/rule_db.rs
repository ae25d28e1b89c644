//! Named registry of rules.

use crate::error::{KbError, KbResult};
use crate::fact_db::FactDatabase;
use crate::rule::{Rule, RuleRun};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Filter for [`RuleDatabase::list`] and the fact-set queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RuleFilter {
    #[default]
    All,
    HasFired,
    HasNotFired,
}

impl RuleFilter {
    fn admits(self, rule: &Rule) -> bool {
        match self {
            Self::All => true,
            Self::HasFired => rule.has_fired(),
            Self::HasNotFired => !rule.has_fired(),
        }
    }
}

/// Union of trigger facts over a set of rules.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TriggerFacts {
    pub facts: BTreeSet<String>,
    /// Rules whose antecedent names no fact somewhere; they contribute nothing to `facts`.
    pub blocked: BTreeSet<String>,
}

/// Rules keyed by stable names. Editors may change `managed_rules` directly.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleDatabase {
    pub managed_rules: BTreeMap<String, Rule>,
}

impl RuleDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, rule: Rule) -> KbResult<&mut Rule> {
        use std::collections::btree_map::Entry;
        match self.managed_rules.entry(name.into()) {
            Entry::Occupied(entry) => Err(KbError::NameTaken(entry.key().clone())),
            Entry::Vacant(entry) => Ok(entry.insert(rule)),
        }
    }

    pub fn remove(&mut self, name: &str) -> KbResult<Rule> {
        self.managed_rules
            .remove(name)
            .ok_or_else(|| KbError::RuleNotFound(name.to_string()))
    }

    pub fn get(&self, name: &str) -> KbResult<&Rule> {
        self.managed_rules
            .get(name)
            .ok_or_else(|| KbError::RuleNotFound(name.to_string()))
    }

    pub fn get_mut(&mut self, name: &str) -> KbResult<&mut Rule> {
        self.managed_rules
            .get_mut(name)
            .ok_or_else(|| KbError::RuleNotFound(name.to_string()))
    }

    pub fn count(&self) -> usize {
        self.managed_rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.managed_rules.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Rule)> {
        self.managed_rules
            .iter()
            .map(|(name, rule)| (name.as_str(), rule))
    }

    pub fn list(&self, filter: RuleFilter) -> BTreeSet<String> {
        self.iter()
            .filter(|(_, rule)| filter.admits(rule))
            .map(|(name, _)| name.to_string())
            .collect()
    }

    pub fn trigger_facts(&self, filter: RuleFilter) -> TriggerFacts {
        let mut out = TriggerFacts::default();
        for (name, rule) in self.iter().filter(|(_, rule)| filter.admits(rule)) {
            match rule.trigger_facts() {
                Ok(facts) => out.facts.extend(facts),
                Err(_) => {
                    out.blocked.insert(name.to_string());
                }
            }
        }
        out
    }

    pub fn response_facts(&self, filter: RuleFilter) -> BTreeSet<String> {
        self.iter()
            .filter(|(_, rule)| filter.admits(rule))
            .flat_map(|(_, rule)| rule.response_facts())
            .collect()
    }

    /// Clear every fired flag.
    pub fn reset_rules(&mut self) {
        for rule in self.managed_rules.values_mut() {
            rule.reset();
        }
    }

    pub fn run(&mut self, name: &str, facts: &mut FactDatabase) -> KbResult<RuleRun> {
        Ok(self.get_mut(name)?.run(facts))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::antecedent::Antecedent;
    use crate::assignment::Assignment;
    use crate::condition::{Comparator, Condition};
    use crate::confidence::Confidence;
    use crate::consequent::Consequent;
    use crate::value::{Literal, ValueKind};

    fn rule(reads: &str, writes: &str) -> Rule {
        Rule::new(
            Antecedent::new(Condition::new(reads, Comparator::EqualTo, true, Confidence::NONE)),
            Consequent::new().with(Assignment::new(writes, true, Confidence::CERTAIN)),
        )
    }

    fn rules() -> RuleDatabase {
        let mut db = RuleDatabase::new();
        db.insert("r1", rule("a", "b")).unwrap();
        db.insert("r2", rule("b", "c")).unwrap();
        db.insert("broken", rule("", "d")).unwrap();
        db
    }

    #[test]
    fn insert_rejects_taken_names() {
        let mut db = rules();
        assert_eq!(
            db.insert("r1", rule("x", "y")).map(|_| ()),
            Err(KbError::NameTaken("r1".to_string()))
        );
        assert_eq!(db.count(), 3);
    }

    #[test]
    fn trigger_facts_reports_blocked_rules() {
        let db = rules();
        let triggers = db.trigger_facts(RuleFilter::All);
        assert_eq!(
            triggers.facts,
            BTreeSet::from(["a".to_string(), "b".to_string()])
        );
        assert_eq!(triggers.blocked, BTreeSet::from(["broken".to_string()]));
        assert_eq!(db.response_facts(RuleFilter::All).len(), 3);
    }

    #[test]
    fn filters_follow_fired_state_and_reset() {
        let mut db = rules();
        let mut facts = FactDatabase::new();
        for name in ["a", "b", "c"] {
            facts.create(name, ValueKind::Bool).unwrap();
        }
        facts
            .assign("a", &Literal::Bool(true), Confidence::CERTAIN)
            .unwrap();

        let run = db.run("r1", &mut facts).unwrap();
        assert!(run.evaluation.is_success());
        assert_eq!(db.list(RuleFilter::HasFired), BTreeSet::from(["r1".to_string()]));
        assert_eq!(db.list(RuleFilter::HasNotFired).len(), 2);
        assert_eq!(
            db.response_facts(RuleFilter::HasFired),
            BTreeSet::from(["b".to_string()])
        );

        db.reset_rules();
        assert!(db.list(RuleFilter::HasFired).is_empty());
        assert!(db.run("missing", &mut facts).is_err());
    }

    #[test]
    fn serializes_as_a_map_of_rules() {
        let db = rules();
        let json = serde_json::to_value(&db).unwrap();
        assert!(json.get("r2").is_some());
        let back: RuleDatabase = serde_json::from_value(json).unwrap();
        assert_eq!(back, db);
    }
}
