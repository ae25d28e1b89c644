//! Typed writers that set a fact's session value by name.

use crate::confidence::Confidence;
use crate::error::KbResult;
use crate::fact::Operand;
use crate::fact_db::FactDatabase;
use crate::value::{Literal, ValueKind};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment<T> {
    pub fact: String,
    pub target_value: T,
    pub confidence: Confidence,
}

impl<T: Operand> Assignment<T> {
    pub fn new(fact: impl Into<String>, target_value: T, confidence: Confidence) -> Self {
        Self {
            fact: fact.into(),
            target_value,
            confidence,
        }
    }

    /// Set the target fact to `target_value` at `combine(self.confidence, confidence)`.
    ///
    /// Nothing is written when the fact is missing, of another kind, the enum
    /// name is unknown, or the value falls outside the fact's range.
    pub fn try_assign(&self, facts: &mut FactDatabase, confidence: Confidence) -> KbResult<()> {
        facts.set_operand(
            &self.fact,
            &self.target_value,
            self.confidence.combine(confidence),
        )
    }

    pub fn assign(&self, facts: &mut FactDatabase, confidence: Confidence) -> bool {
        self.try_assign(facts, confidence).is_ok()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum AnyAssignment {
    #[serde(rename = "Boolean")]
    Bool(Assignment<bool>),
    #[serde(rename = "Integer")]
    Int(Assignment<i64>),
    #[serde(rename = "Float")]
    Float(Assignment<f64>),
    #[serde(rename = "Enumeration")]
    Enum(Assignment<String>),
}

macro_rules! any_assignment_from {
    ($ty:ty, $variant:ident) => {
        impl From<Assignment<$ty>> for AnyAssignment {
            fn from(assignment: Assignment<$ty>) -> Self {
                Self::$variant(assignment)
            }
        }
    };
}

any_assignment_from!(bool, Bool);
any_assignment_from!(i64, Int);
any_assignment_from!(f64, Float);
any_assignment_from!(String, Enum);

impl AnyAssignment {
    /// Build from a literal; the kind follows the literal.
    pub fn from_literal(fact: impl Into<String>, value: Literal, confidence: Confidence) -> Self {
        match value {
            Literal::Bool(v) => Assignment::new(fact, v, confidence).into(),
            Literal::Int(v) => Assignment::new(fact, v, confidence).into(),
            Literal::Float(v) => Assignment::new(fact, v, confidence).into(),
            Literal::Enum(v) => Assignment::new(fact, v, confidence).into(),
        }
    }

    pub fn kind(&self) -> ValueKind {
        match self {
            Self::Bool(_) => ValueKind::Bool,
            Self::Int(_) => ValueKind::Int,
            Self::Float(_) => ValueKind::Float,
            Self::Enum(_) => ValueKind::Enum,
        }
    }

    pub fn fact(&self) -> &str {
        match self {
            Self::Bool(a) => &a.fact,
            Self::Int(a) => &a.fact,
            Self::Float(a) => &a.fact,
            Self::Enum(a) => &a.fact,
        }
    }

    pub fn confidence(&self) -> Confidence {
        match self {
            Self::Bool(a) => a.confidence,
            Self::Int(a) => a.confidence,
            Self::Float(a) => a.confidence,
            Self::Enum(a) => a.confidence,
        }
    }

    pub fn target(&self) -> Literal {
        match self {
            Self::Bool(a) => Literal::Bool(a.target_value),
            Self::Int(a) => Literal::Int(a.target_value),
            Self::Float(a) => Literal::Float(a.target_value),
            Self::Enum(a) => Literal::Enum(a.target_value.clone()),
        }
    }

    pub fn try_assign(&self, facts: &mut FactDatabase, confidence: Confidence) -> KbResult<()> {
        match self {
            Self::Bool(a) => a.try_assign(facts, confidence),
            Self::Int(a) => a.try_assign(facts, confidence),
            Self::Float(a) => a.try_assign(facts, confidence),
            Self::Enum(a) => a.try_assign(facts, confidence),
        }
    }

    pub fn assign(&self, facts: &mut FactDatabase, confidence: Confidence) -> bool {
        self.try_assign(facts, confidence).is_ok()
    }
}

impl fmt::Display for AnyAssignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} := {} [cf {}]",
            self.fact(),
            self.target(),
            self.confidence()
        )
    }
}
