//! Editor-time checks of rules against the fact definitions they reference.
//!
//! The engine never calls this; a rule with issues is still offered to the
//! consultation and simply fails to trigger or to assign.

use crate::assignment::{AnyAssignment, Assignment};
use crate::condition::{AnyCondition, Condition};
use crate::error::KbError;
use crate::fact::Operand;
use crate::fact_db::FactDatabase;
use crate::rule::Rule;
use crate::rule_db::RuleDatabase;
use crate::value::ValueKind;
use std::collections::BTreeMap;
use std::fmt;

/// Where in a rule an issue was found. Condition 0 is the antecedent root.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Site {
    Condition(usize),
    Assignment(usize),
}

impl fmt::Display for Site {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Condition(i) => write!(f, "condition #{i}"),
            Self::Assignment(i) => write!(f, "assignment #{i}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RuleIssue {
    #[error("{site}: comparator is not set")]
    MissingComparator { site: Site },

    #[error("{site}: no target fact")]
    MissingFact { site: Site },

    #[error("{site}: fact '{fact}' does not exist")]
    UnknownFact { site: Site, fact: String },

    #[error("{site}: fact '{fact}' holds {actual} values, not {expected}")]
    KindMismatch {
        site: Site,
        fact: String,
        expected: ValueKind,
        actual: ValueKind,
    },

    #[error("{site}: '{name}' is not a member of the enumeration of '{fact}'")]
    UnknownEnumName {
        site: Site,
        fact: String,
        name: String,
    },

    #[error("{site}: value is outside the range of '{fact}'")]
    OutOfRange { site: Site, fact: String },
}

impl RuleIssue {
    pub fn site(&self) -> Site {
        match self {
            Self::MissingComparator { site }
            | Self::MissingFact { site }
            | Self::UnknownFact { site, .. }
            | Self::KindMismatch { site, .. }
            | Self::UnknownEnumName { site, .. }
            | Self::OutOfRange { site, .. } => *site,
        }
    }

    /// Issues that keep the antecedent from ever producing a comparison.
    pub fn blocks_trigger(&self) -> bool {
        matches!(self.site(), Site::Condition(_))
    }
}

fn check_target<T: Operand>(
    site: Site,
    fact_name: &str,
    target: &T,
    facts: &FactDatabase,
    check_range: bool,
    issues: &mut Vec<RuleIssue>,
) {
    if fact_name.is_empty() {
        issues.push(RuleIssue::MissingFact { site });
        return;
    }
    let Ok(fact) = facts.find(fact_name) else {
        issues.push(RuleIssue::UnknownFact {
            site,
            fact: fact_name.to_string(),
        });
        return;
    };
    if fact.kind() != T::KIND {
        issues.push(RuleIssue::KindMismatch {
            site,
            fact: fact_name.to_string(),
            expected: T::KIND,
            actual: fact.kind(),
        });
        return;
    }
    match target.resolve(fact) {
        Ok(stored) => {
            let outside = T::cell(fact).is_some_and(|cell| !cell.accepts(&stored));
            if check_range && outside {
                issues.push(RuleIssue::OutOfRange {
                    site,
                    fact: fact_name.to_string(),
                });
            }
        }
        Err(KbError::UnknownEnumName(name)) => issues.push(RuleIssue::UnknownEnumName {
            site,
            fact: fact_name.to_string(),
            name,
        }),
        Err(_) => {}
    }
}

fn check_condition<T: Operand>(
    site: Site,
    condition: &Condition<T>,
    facts: &FactDatabase,
    issues: &mut Vec<RuleIssue>,
) {
    if condition.comparator.is_none() {
        issues.push(RuleIssue::MissingComparator { site });
    }
    // Comparing against a value outside the range is legitimate.
    check_target(site, &condition.fact, &condition.target_value, facts, false, issues);
}

fn check_assignment<T: Operand>(
    site: Site,
    assignment: &Assignment<T>,
    facts: &FactDatabase,
    issues: &mut Vec<RuleIssue>,
) {
    check_target(site, &assignment.fact, &assignment.target_value, facts, true, issues);
}

impl Rule {
    /// Every issue found, conditions first, then assignments.
    pub fn validate(&self, facts: &FactDatabase) -> Vec<RuleIssue> {
        let mut issues = Vec::new();
        for (i, condition) in self.antecedent.conditions().enumerate() {
            let site = Site::Condition(i);
            match condition {
                AnyCondition::Bool(c) => check_condition(site, c, facts, &mut issues),
                AnyCondition::Int(c) => check_condition(site, c, facts, &mut issues),
                AnyCondition::Float(c) => check_condition(site, c, facts, &mut issues),
                AnyCondition::Enum(c) => check_condition(site, c, facts, &mut issues),
            }
        }
        for (i, assignment) in self.consequent.assignments.iter().enumerate() {
            let site = Site::Assignment(i);
            match assignment {
                AnyAssignment::Bool(a) => check_assignment(site, a, facts, &mut issues),
                AnyAssignment::Int(a) => check_assignment(site, a, facts, &mut issues),
                AnyAssignment::Float(a) => check_assignment(site, a, facts, &mut issues),
                AnyAssignment::Enum(a) => check_assignment(site, a, facts, &mut issues),
            }
        }
        issues
    }
}

impl RuleDatabase {
    /// Issues per rule name. Rules without issues are omitted.
    pub fn validate(&self, facts: &FactDatabase) -> BTreeMap<String, Vec<RuleIssue>> {
        self.iter()
            .map(|(name, rule)| (name.to_string(), rule.validate(facts)))
            .filter(|(_, issues)| !issues.is_empty())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::antecedent::Antecedent;
    use crate::condition::Comparator;
    use crate::confidence::Confidence;
    use crate::consequent::Consequent;
    use crate::dynamic_enum::DynamicEnum;
    use crate::fact::{EnumFact, TypedFact};

    fn facts() -> FactDatabase {
        let mut db = FactDatabase::new();
        db.create("flag", ValueKind::Bool).unwrap();
        if let TypedFact::Int(f) = db.create("count", ValueKind::Int).unwrap() {
            f.set_range(0, 10, true).unwrap();
        }
        db.insert(
            "mood",
            TypedFact::Enum(EnumFact::new(DynamicEnum::from_names(["sad", "happy"]))),
        )
        .unwrap();
        db
    }

    #[test]
    fn clean_rule_has_no_issues() {
        let rule = Rule::new(
            Antecedent::new(Condition::new("flag", Comparator::EqualTo, true, Confidence::NONE))
                .and(Condition::new("count", Comparator::GreaterThan, 50_i64, Confidence::NONE)),
            Consequent::new().with(Assignment::new(
                "mood",
                "happy".to_string(),
                Confidence::CERTAIN,
            )),
        );
        assert!(rule.validate(&facts()).is_empty());
    }

    #[test]
    fn every_problem_is_reported_with_its_site() {
        let mut unset = Condition::new("flag", Comparator::EqualTo, true, Confidence::NONE);
        unset.comparator = None;
        let rule = Rule::new(
            Antecedent::new(unset)
                .or(Condition::new("", Comparator::EqualTo, true, Confidence::NONE))
                .or(Condition::new("ghost", Comparator::EqualTo, true, Confidence::NONE))
                .or(Condition::new("count", Comparator::EqualTo, 1.0, Confidence::NONE)),
            Consequent::new()
                .with(Assignment::new("mood", "angry".to_string(), Confidence::CERTAIN))
                .with(Assignment::new("count", 11_i64, Confidence::CERTAIN)),
        );

        let issues = rule.validate(&facts());

        assert_eq!(
            issues,
            vec![
                RuleIssue::MissingComparator { site: Site::Condition(0) },
                RuleIssue::MissingFact { site: Site::Condition(1) },
                RuleIssue::UnknownFact { site: Site::Condition(2), fact: "ghost".into() },
                RuleIssue::KindMismatch {
                    site: Site::Condition(3),
                    fact: "count".into(),
                    expected: ValueKind::Float,
                    actual: ValueKind::Int,
                },
                RuleIssue::UnknownEnumName {
                    site: Site::Assignment(0),
                    fact: "mood".into(),
                    name: "angry".into(),
                },
                RuleIssue::OutOfRange { site: Site::Assignment(1), fact: "count".into() },
            ]
        );
        assert!(issues[0].blocks_trigger());
        assert!(!issues[5].blocks_trigger());
        assert_eq!(
            issues[2].to_string(),
            "condition #2: fact 'ghost' does not exist"
        );
    }

    #[test]
    fn database_validation_omits_clean_rules() {
        let mut rules = RuleDatabase::new();
        rules
            .insert(
                "ok",
                Rule::new(
                    Antecedent::new(Condition::new(
                        "flag",
                        Comparator::EqualTo,
                        true,
                        Confidence::NONE,
                    )),
                    Consequent::new(),
                ),
            )
            .unwrap();
        rules
            .insert(
                "bad",
                Rule::new(
                    Antecedent::new(Condition::new(
                        "nope",
                        Comparator::EqualTo,
                        true,
                        Confidence::NONE,
                    )),
                    Consequent::new(),
                ),
            )
            .unwrap();
        let report = rules.validate(&facts());
        assert_eq!(report.keys().collect::<Vec<_>>(), ["bad"]);
    }
}
