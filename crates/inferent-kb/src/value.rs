//! Kind tags, validity ranges and session values.

use crate::confidence::Confidence;
use crate::error::{KbError, KbResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The four value kinds a fact, condition or assignment can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ValueKind {
    #[serde(rename = "Boolean")]
    Bool,
    #[serde(rename = "Integer")]
    Int,
    #[serde(rename = "Float")]
    Float,
    #[serde(rename = "Enumeration")]
    Enum,
}

impl ValueKind {
    pub const ALL: [ValueKind; 4] = [
        ValueKind::Bool,
        ValueKind::Int,
        ValueKind::Float,
        ValueKind::Enum,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Bool => "Boolean",
            Self::Int => "Integer",
            Self::Float => "Float",
            Self::Enum => "Enumeration",
        }
    }

    /// Accepts the document spelling as well as the short forms `bool`, `int`, `float`, `enum`.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "boolean" | "bool" => Some(Self::Bool),
            "integer" | "int" => Some(Self::Int),
            "float" => Some(Self::Float),
            "enumeration" | "enum" => Some(Self::Enum),
            _ => None,
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Set of valid values for a fact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Range<T> {
    pub min: T,
    pub max: T,
    pub inclusive: bool,
}

/// `false` only for values that do not compare equal to themselves (NaN).
pub(crate) fn is_ordered<T: PartialOrd>(value: &T) -> bool {
    value.partial_cmp(value).is_some()
}

impl<T: PartialOrd> Range<T> {
    /// Fails with [`KbError::InvertedRange`] when `max < min`, and with
    /// [`KbError::NotFinite`] when a bound is NaN.
    pub fn new(min: T, max: T, inclusive: bool) -> KbResult<Self> {
        if !is_ordered(&min) || !is_ordered(&max) {
            return Err(KbError::NotFinite);
        }
        if max < min {
            return Err(KbError::InvertedRange);
        }
        Ok(Self { min, max, inclusive })
    }

    pub fn contains(&self, value: &T) -> bool {
        if self.inclusive {
            self.min <= *value && *value <= self.max
        } else {
            self.min < *value && *value < self.max
        }
    }
}

/// A fact's session value. Immutable once built; a new assignment replaces it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Value<T> {
    value: T,
    confidence: Confidence,
    timestamp: DateTime<Utc>,
    source_event: Option<u64>,
}

impl<T> Value<T> {
    pub fn new(value: T, confidence: Confidence) -> Self {
        Self {
            value,
            confidence,
            timestamp: Utc::now(),
            source_event: None,
        }
    }

    #[must_use]
    pub fn with_source_event(mut self, event: u64) -> Self {
        self.source_event = Some(event);
        self
    }

    pub fn value(&self) -> &T {
        &self.value
    }

    pub fn confidence(&self) -> Confidence {
        self.confidence
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn source_event(&self) -> Option<u64> {
        self.source_event
    }
}

/// A raw, kind-tagged value as typed by a user or stored in an assignment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Literal {
    Bool(bool),
    Int(i64),
    Float(f64),
    Enum(String),
}

impl Literal {
    pub fn kind(&self) -> ValueKind {
        match self {
            Self::Bool(_) => ValueKind::Bool,
            Self::Int(_) => ValueKind::Int,
            Self::Float(_) => ValueKind::Float,
            Self::Enum(_) => ValueKind::Enum,
        }
    }

    /// Parse `text` as a literal of `kind`.
    ///
    /// Booleans accept `true/false`, `yes/no` and `1/0` in any case. Enum
    /// literals are taken verbatim (trimmed); membership is checked when assigned.
    pub fn parse(kind: ValueKind, text: &str) -> KbResult<Self> {
        let trimmed = text.trim();
        let parse_error = || KbError::Parse {
            kind,
            text: text.to_string(),
        };
        match kind {
            ValueKind::Bool => match trimmed.to_ascii_lowercase().as_str() {
                "true" | "yes" | "1" => Ok(Self::Bool(true)),
                "false" | "no" | "0" => Ok(Self::Bool(false)),
                _ => Err(parse_error()),
            },
            ValueKind::Int => trimmed.parse().map(Self::Int).map_err(|_| parse_error()),
            ValueKind::Float => trimmed
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .map(Self::Float)
                .ok_or_else(parse_error),
            ValueKind::Enum if trimmed.is_empty() => Err(parse_error()),
            ValueKind::Enum => Ok(Self::Enum(trimmed.to_string())),
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Enum(v) => f.write_str(v),
        }
    }
}

/// Snapshot of a fact's session value, as recorded in explanation logs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum FactValue {
    #[serde(rename = "Boolean")]
    Bool(Value<bool>),
    #[serde(rename = "Integer")]
    Int(Value<i64>),
    #[serde(rename = "Float")]
    Float(Value<f64>),
    /// Enumeration snapshots keep the ordinal and the name it resolved to.
    #[serde(rename = "Enumeration")]
    Enum { value: Value<usize>, name: String },
}

impl FactValue {
    pub fn kind(&self) -> ValueKind {
        match self {
            Self::Bool(_) => ValueKind::Bool,
            Self::Int(_) => ValueKind::Int,
            Self::Float(_) => ValueKind::Float,
            Self::Enum { .. } => ValueKind::Enum,
        }
    }

    pub fn confidence(&self) -> Confidence {
        match self {
            Self::Bool(v) => v.confidence(),
            Self::Int(v) => v.confidence(),
            Self::Float(v) => v.confidence(),
            Self::Enum { value, .. } => value.confidence(),
        }
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            Self::Bool(v) => v.timestamp(),
            Self::Int(v) => v.timestamp(),
            Self::Float(v) => v.timestamp(),
            Self::Enum { value, .. } => value.timestamp(),
        }
    }

    /// Round of the consultation that wrote the value, if it was stamped.
    pub fn source_event(&self) -> Option<u64> {
        match self {
            Self::Bool(v) => v.source_event(),
            Self::Int(v) => v.source_event(),
            Self::Float(v) => v.source_event(),
            Self::Enum { value, .. } => value.source_event(),
        }
    }

    /// The raw value, with enums expressed by name.
    pub fn literal(&self) -> Literal {
        match self {
            Self::Bool(v) => Literal::Bool(*v.value()),
            Self::Int(v) => Literal::Int(*v.value()),
            Self::Float(v) => Literal::Float(*v.value()),
            Self::Enum { name, .. } => Literal::Enum(name.clone()),
        }
    }
}

impl fmt::Display for FactValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (confidence {})", self.literal(), self.confidence())
    }
}
