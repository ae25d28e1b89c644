//! Typed predicates over a single fact.
//!
//! A [`Condition`] references its fact by name and resolves it at evaluation
//! time. Every failure to evaluate is reported as a [`TestOutcome`], never as
//! an error or a panic.

use crate::confidence::Confidence;
use crate::fact::Operand;
use crate::fact_db::FactDatabase;
use crate::value::{Literal, ValueKind};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Comparator {
    EqualTo,
    LessThan,
    GreaterThan,
}

impl Comparator {
    pub fn symbol(self) -> &'static str {
        match self {
            Self::EqualTo => "==",
            Self::LessThan => "<",
            Self::GreaterThan => ">",
        }
    }
}

/// Result of testing a condition or an antecedent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TestOutcome {
    /// The comparator is not set.
    InvalidCondition,
    /// No fact with the referenced name.
    InvalidFactIdentifier,
    /// The fact holds a different kind.
    InvalidFactType,
    /// The fact has no session value.
    UnknownFactValue,
    /// The fact's recorded confidence is below the threshold.
    InsufficientConfidence,
    Success,
    Failure,
}

impl TestOutcome {
    /// Anything other than `Success` or `Failure`.
    pub fn is_error(self) -> bool {
        !matches!(self, Self::Success | Self::Failure)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Evaluation {
    pub outcome: TestOutcome,
    pub confidence: Confidence,
}

impl Evaluation {
    pub fn error(outcome: TestOutcome) -> Self {
        Self {
            outcome,
            confidence: Confidence::NONE,
        }
    }

    pub fn is_success(&self) -> bool {
        self.outcome == TestOutcome::Success
    }
}

/// `fact <comparator> target_value`, optionally inverted, gated by a minimum confidence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition<T> {
    pub fact: String,
    #[serde(rename = "condition")]
    pub comparator: Option<Comparator>,
    pub target_value: T,
    #[serde(default)]
    pub invert: bool,
    /// Minimum confidence the fact must carry; also weighs the propagated confidence.
    pub confidence: Confidence,
}

impl<T: Operand> Condition<T> {
    pub fn new(
        fact: impl Into<String>,
        comparator: Comparator,
        target_value: T,
        confidence: Confidence,
    ) -> Self {
        Self {
            fact: fact.into(),
            comparator: Some(comparator),
            target_value,
            invert: false,
            confidence,
        }
    }

    #[must_use]
    pub fn inverted(mut self) -> Self {
        self.invert = !self.invert;
        self
    }

    /// Evaluate against the current session values. Read-only.
    pub fn test(&self, facts: &FactDatabase) -> Evaluation {
        let Some(comparator) = self.comparator else {
            return Evaluation::error(TestOutcome::InvalidCondition);
        };
        let Ok(fact) = facts.find(&self.fact) else {
            return Evaluation::error(TestOutcome::InvalidFactIdentifier);
        };
        let Some(cell) = T::cell(fact) else {
            return Evaluation::error(TestOutcome::InvalidFactType);
        };
        let Some(value) = cell.value() else {
            return Evaluation::error(TestOutcome::UnknownFactValue);
        };
        if value.confidence() < self.confidence {
            return Evaluation::error(TestOutcome::InsufficientConfidence);
        }
        // An enum target that is not in the fact's table cannot be compared.
        let Ok(target) = self.target_value.resolve(fact) else {
            return Evaluation::error(TestOutcome::InvalidCondition);
        };

        let holds = match comparator {
            Comparator::EqualTo => *value.value() == target,
            Comparator::LessThan => *value.value() < target,
            Comparator::GreaterThan => *value.value() > target,
        };
        let outcome = if holds != self.invert {
            TestOutcome::Success
        } else {
            TestOutcome::Failure
        };
        Evaluation {
            outcome,
            confidence: self.confidence.combine(value.confidence()),
        }
    }
}

/// A condition over any of the four value kinds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum AnyCondition {
    #[serde(rename = "Boolean")]
    Bool(Condition<bool>),
    #[serde(rename = "Integer")]
    Int(Condition<i64>),
    #[serde(rename = "Float")]
    Float(Condition<f64>),
    #[serde(rename = "Enumeration")]
    Enum(Condition<String>),
}

macro_rules! any_condition_from {
    ($ty:ty, $variant:ident) => {
        impl From<Condition<$ty>> for AnyCondition {
            fn from(condition: Condition<$ty>) -> Self {
                Self::$variant(condition)
            }
        }
    };
}

any_condition_from!(bool, Bool);
any_condition_from!(i64, Int);
any_condition_from!(f64, Float);
any_condition_from!(String, Enum);

impl AnyCondition {
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
            Self::Bool(c) => &c.fact,
            Self::Int(c) => &c.fact,
            Self::Float(c) => &c.fact,
            Self::Enum(c) => &c.fact,
        }
    }

    pub fn comparator(&self) -> Option<Comparator> {
        match self {
            Self::Bool(c) => c.comparator,
            Self::Int(c) => c.comparator,
            Self::Float(c) => c.comparator,
            Self::Enum(c) => c.comparator,
        }
    }

    pub fn invert(&self) -> bool {
        match self {
            Self::Bool(c) => c.invert,
            Self::Int(c) => c.invert,
            Self::Float(c) => c.invert,
            Self::Enum(c) => c.invert,
        }
    }

    pub fn threshold(&self) -> Confidence {
        match self {
            Self::Bool(c) => c.confidence,
            Self::Int(c) => c.confidence,
            Self::Float(c) => c.confidence,
            Self::Enum(c) => c.confidence,
        }
    }

    pub fn target(&self) -> Literal {
        match self {
            Self::Bool(c) => Literal::Bool(c.target_value),
            Self::Int(c) => Literal::Int(c.target_value),
            Self::Float(c) => Literal::Float(c.target_value),
            Self::Enum(c) => Literal::Enum(c.target_value.clone()),
        }
    }

    pub fn test(&self, facts: &FactDatabase) -> Evaluation {
        match self {
            Self::Bool(c) => c.test(facts),
            Self::Int(c) => c.test(facts),
            Self::Float(c) => c.test(facts),
            Self::Enum(c) => c.test(facts),
        }
    }
}

impl fmt::Display for AnyCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.invert() {
            f.write_str("not ")?;
        }
        let op = self.comparator().map_or("?", Comparator::symbol);
        write!(
            f,
            "{} {} {} [min {}]",
            self.fact(),
            op,
            self.target(),
            self.threshold()
        )
    }
}
