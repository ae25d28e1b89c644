//! Typed fact cells.
//!
//! [`Fact<T>`] holds an optional validity range, a description and an
//! optional session value. [`EnumFact`] is a proxy over a `Fact<usize>` that
//! stores ordinals and converts names through its [`DynamicEnum`].
//! [`TypedFact`] is the kind-tagged cell stored in the fact database.

use crate::confidence::Confidence;
use crate::dynamic_enum::DynamicEnum;
use crate::error::{KbError, KbResult};
use crate::value::{is_ordered, FactValue, Range, Value, ValueKind};

#[derive(Debug, Clone, PartialEq)]
pub struct Fact<T> {
    range: Option<Range<T>>,
    description: String,
    value: Option<Value<T>>,
}

impl<T> Default for Fact<T> {
    fn default() -> Self {
        Self {
            range: None,
            description: String::new(),
            value: None,
        }
    }
}

impl<T: PartialOrd> Fact<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a validity range.
    ///
    /// Rejected while a session value exists, and when `max < min`.
    pub fn set_range(&mut self, min: T, max: T, inclusive: bool) -> KbResult<()> {
        if self.value.is_some() {
            return Err(KbError::RangeLocked);
        }
        self.range = Some(Range::new(min, max, inclusive)?);
        Ok(())
    }

    pub fn range(&self) -> Option<&Range<T>> {
        self.range.as_ref()
    }

    pub fn clear_range(&mut self) -> KbResult<()> {
        if self.value.is_some() {
            return Err(KbError::RangeLocked);
        }
        self.range = None;
        Ok(())
    }

    pub fn set_description(&mut self, description: impl AsRef<str>) {
        self.description = description.as_ref().trim().to_string();
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Whether `value` would be accepted by this fact's range.
    pub fn accepts(&self, value: &T) -> bool {
        self.range.as_ref().map_or(true, |range| range.contains(value))
    }

    /// Replace the session value. Fails with [`KbError::OutOfRange`] if a range rejects it.
    pub fn set_value(&mut self, value: T, confidence: Confidence) -> KbResult<()> {
        self.store(Value::new(value, confidence))
    }

    /// Like [`Fact::set_value`], for a value that was built elsewhere (e.g. with a source event).
    pub fn store(&mut self, value: Value<T>) -> KbResult<()> {
        if !is_ordered(value.value()) {
            return Err(KbError::NotFinite);
        }
        if !self.accepts(value.value()) {
            return Err(KbError::OutOfRange);
        }
        self.value = Some(value);
        Ok(())
    }

    pub fn value(&self) -> Option<&Value<T>> {
        self.value.as_ref()
    }

    pub fn clear_value(&mut self) {
        self.value = None;
    }

    pub fn is_known(&self) -> bool {
        self.value.is_some()
    }
}

/// An enumeration fact: ordinals in an inner `Fact<usize>`, names in a [`DynamicEnum`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnumFact {
    fact: Fact<usize>,
    variants: DynamicEnum,
}

impl EnumFact {
    pub fn new(variants: DynamicEnum) -> Self {
        Self {
            fact: Fact::new(),
            variants,
        }
    }

    pub fn variants(&self) -> &DynamicEnum {
        &self.variants
    }

    /// Swap the enumeration table. Any range is dropped since its ordinals may no longer apply.
    pub fn set_variants(&mut self, variants: DynamicEnum) -> KbResult<()> {
        if self.fact.is_known() {
            return Err(KbError::RangeLocked);
        }
        self.fact.clear_range()?;
        self.variants = variants;
        Ok(())
    }

    /// The underlying ordinal cell.
    pub fn fact(&self) -> &Fact<usize> {
        &self.fact
    }

    pub fn ordinal(&self, name: &str) -> KbResult<usize> {
        self.variants
            .position(name)
            .ok_or_else(|| KbError::UnknownEnumName(name.to_string()))
    }

    pub fn set_range_named(&mut self, min: &str, max: &str, inclusive: bool) -> KbResult<()> {
        let (min, max) = (self.ordinal(min)?, self.ordinal(max)?);
        self.fact.set_range(min, max, inclusive)
    }

    /// Range bounds expressed as names.
    pub fn range_names(&self) -> Option<(&str, &str, bool)> {
        let range = self.fact.range()?;
        Some((
            self.variants.name(range.min)?,
            self.variants.name(range.max)?,
            range.inclusive,
        ))
    }

    pub fn set_value_named(&mut self, name: &str, confidence: Confidence) -> KbResult<()> {
        let ordinal = self.ordinal(name)?;
        self.fact.set_value(ordinal, confidence)
    }

    pub fn value_name(&self) -> Option<&str> {
        self.fact
            .value()
            .and_then(|value| self.variants.name(*value.value()))
    }
}

/// A kind-tagged fact. The variant always agrees with [`TypedFact::kind`].
#[derive(Debug, Clone, PartialEq)]
pub enum TypedFact {
    Bool(Fact<bool>),
    Int(Fact<i64>),
    Float(Fact<f64>),
    Enum(EnumFact),
}

impl TypedFact {
    /// An empty fact of `kind`. Enumeration facts start with an empty table.
    pub fn new(kind: ValueKind) -> Self {
        match kind {
            ValueKind::Bool => Self::Bool(Fact::new()),
            ValueKind::Int => Self::Int(Fact::new()),
            ValueKind::Float => Self::Float(Fact::new()),
            ValueKind::Enum => Self::Enum(EnumFact::default()),
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

    pub fn is_known(&self) -> bool {
        match self {
            Self::Bool(f) => f.is_known(),
            Self::Int(f) => f.is_known(),
            Self::Float(f) => f.is_known(),
            Self::Enum(f) => f.fact.is_known(),
        }
    }

    pub fn clear_value(&mut self) {
        match self {
            Self::Bool(f) => f.clear_value(),
            Self::Int(f) => f.clear_value(),
            Self::Float(f) => f.clear_value(),
            Self::Enum(f) => f.fact.clear_value(),
        }
    }

    pub fn description(&self) -> &str {
        match self {
            Self::Bool(f) => f.description(),
            Self::Int(f) => f.description(),
            Self::Float(f) => f.description(),
            Self::Enum(f) => f.fact.description(),
        }
    }

    pub fn set_description(&mut self, description: impl AsRef<str>) {
        match self {
            Self::Bool(f) => f.set_description(description),
            Self::Int(f) => f.set_description(description),
            Self::Float(f) => f.set_description(description),
            Self::Enum(f) => f.fact.set_description(description),
        }
    }

    /// Recorded confidence of the session value, if any.
    pub fn confidence(&self) -> Option<Confidence> {
        match self {
            Self::Bool(f) => f.value().map(Value::confidence),
            Self::Int(f) => f.value().map(Value::confidence),
            Self::Float(f) => f.value().map(Value::confidence),
            Self::Enum(f) => f.fact.value().map(Value::confidence),
        }
    }

    /// Copy of the session value, with enum ordinals resolved to names.
    pub fn snapshot(&self) -> Option<FactValue> {
        match self {
            Self::Bool(f) => f.value().cloned().map(FactValue::Bool),
            Self::Int(f) => f.value().cloned().map(FactValue::Int),
            Self::Float(f) => f.value().cloned().map(FactValue::Float),
            Self::Enum(f) => {
                let value = f.fact.value()?.clone();
                let name = f
                    .variants
                    .name(*value.value())
                    .map_or_else(|| format!("#{}", value.value()), str::to_string);
                Some(FactValue::Enum { value, name })
            }
        }
    }
}

/// A value type that conditions compare against and assignments write.
///
/// `Stored` is what the matching [`TypedFact`] variant keeps in its cell;
/// enumeration operands are names and resolve to ordinals through the fact's table.
pub trait Operand: Clone + std::fmt::Debug {
    const KIND: ValueKind;
    type Stored: PartialOrd + Clone;

    fn cell(fact: &TypedFact) -> Option<&Fact<Self::Stored>>;
    fn cell_mut(fact: &mut TypedFact) -> Option<&mut Fact<Self::Stored>>;

    /// Translate into the stored representation of `fact`.
    fn resolve(&self, fact: &TypedFact) -> KbResult<Self::Stored>;

    /// `false` for NaN and infinite floats.
    fn is_finite(&self) -> bool {
        true
    }
}

macro_rules! scalar_operand {
    ($ty:ty, $kind:ident) => {
        scalar_operand!($ty, $kind, |_| true);
    };
    ($ty:ty, $kind:ident, $finite:expr) => {
        impl Operand for $ty {
            const KIND: ValueKind = ValueKind::$kind;
            type Stored = $ty;

            fn cell(fact: &TypedFact) -> Option<&Fact<$ty>> {
                match fact {
                    TypedFact::$kind(f) => Some(f),
                    _ => None,
                }
            }

            fn cell_mut(fact: &mut TypedFact) -> Option<&mut Fact<$ty>> {
                match fact {
                    TypedFact::$kind(f) => Some(f),
                    _ => None,
                }
            }

            fn resolve(&self, _fact: &TypedFact) -> KbResult<$ty> {
                Ok(*self)
            }

            fn is_finite(&self) -> bool {
                let check: fn(&$ty) -> bool = $finite;
                check(self)
            }
        }
    };
}

scalar_operand!(bool, Bool);
scalar_operand!(i64, Int);
scalar_operand!(f64, Float, |v| f64::is_finite(*v));

impl Operand for String {
    const KIND: ValueKind = ValueKind::Enum;
    type Stored = usize;

    fn cell(fact: &TypedFact) -> Option<&Fact<usize>> {
        match fact {
            TypedFact::Enum(f) => Some(&f.fact),
            _ => None,
        }
    }

    fn cell_mut(fact: &mut TypedFact) -> Option<&mut Fact<usize>> {
        match fact {
            TypedFact::Enum(f) => Some(&mut f.fact),
            _ => None,
        }
    }

    fn resolve(&self, fact: &TypedFact) -> KbResult<usize> {
        match fact {
            TypedFact::Enum(f) => f.ordinal(self),
            other => Err(KbError::KindMismatch {
                fact: String::new(),
                expected: ValueKind::Enum,
                actual: other.kind(),
            }),
        }
    }
}
