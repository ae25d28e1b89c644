//! Inferent knowledge base
//!
//! The typed fact model and production rules that the forward-chaining engine
//! runs over:
//!
//! ```text
//!   FactDatabase ──read──► Condition ──► Antecedent ─┐
//!        ▲                                           ├─► Rule ──► RuleDatabase
//!        └────write──── Assignment ◄── Consequent ◄──┘
//! ```
//!
//! - Facts carry one of four value kinds (`Boolean`, `Integer`, `Float`,
//!   `Enumeration`), an optional validity range and an optional session value.
//! - Conditions and assignments refer to facts by name and resolve them at
//!   evaluation time; a missing fact is an evaluation outcome, not a panic.
//! - Confidence factors propagate multiplicatively from fact values through
//!   antecedents into the values a rule assigns.

pub mod antecedent;
pub mod assignment;
pub mod condition;
pub mod confidence;
pub mod consequent;
pub mod dynamic_enum;
pub mod error;
pub mod fact;
pub mod fact_db;
pub mod rule;
pub mod rule_db;
pub mod validate;
pub mod value;

pub use antecedent::{Antecedent, Connector};
pub use assignment::{AnyAssignment, Assignment};
pub use condition::{AnyCondition, Comparator, Condition, Evaluation, TestOutcome};
pub use confidence::Confidence;
pub use consequent::{AssignmentOutcome, Consequent};
pub use dynamic_enum::DynamicEnum;
pub use error::{KbError, KbResult};
pub use fact::{EnumFact, Fact, Operand, TypedFact};
pub use fact_db::{FactDatabase, FactFilter};
pub use rule::{Rule, RuleRun};
pub use rule_db::{RuleDatabase, RuleFilter, TriggerFacts};
pub use validate::{RuleIssue, Site};
pub use value::{FactValue, Literal, Range, Value, ValueKind};

// ============================================================================
// Session
// ============================================================================

/// Both databases of one expert system. Passed by reference to editors and
/// to the consultation, which owns it exclusively while running.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KnowledgeBase {
    pub facts: FactDatabase,
    pub rules: RuleDatabase,
}

impl KnowledgeBase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear all session values and fired flags; definitions are kept.
    pub fn reset(&mut self) {
        self.facts.reset();
        self.rules.reset_rules();
    }

    /// Rule issues per rule name.
    pub fn validate(&self) -> std::collections::BTreeMap<String, Vec<RuleIssue>> {
        self.rules.validate(&self.facts)
    }
}
