use crate::value::ValueKind;

/// Structural failures in the knowledge base.
///
/// These are returned as values; evaluation outcomes of conditions are
/// reported separately through [`crate::TestOutcome`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum KbError {
    #[error("name '{0}' is already used")]
    NameTaken(String),

    #[error("fact '{0}' does not exist")]
    FactNotFound(String),

    #[error("rule '{0}' does not exist")]
    RuleNotFound(String),

    #[error("fact '{fact}' holds {actual} values, not {expected}")]
    KindMismatch {
        fact: String,
        expected: ValueKind,
        actual: ValueKind,
    },

    #[error("value is outside the fact's range")]
    OutOfRange,

    #[error("the range cannot change while the fact holds a session value")]
    RangeLocked,

    #[error("value is not a finite number")]
    NotFinite,

    #[error("range maximum is below its minimum")]
    InvertedRange,

    #[error("'{0}' is not a member of the fact's enumeration")]
    UnknownEnumName(String),

    /// Condition `0` (the root is 0) names no fact.
    #[error("antecedent condition {0} has no target fact")]
    InvalidAntecedent(usize),

    #[error("cannot parse '{text}' as {kind}")]
    Parse { kind: ValueKind, text: String },
}

pub type KbResult<T> = Result<T, KbError>;
