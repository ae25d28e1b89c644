//! Named registry of typed facts.

use crate::confidence::Confidence;
use crate::error::{KbError, KbResult};
use crate::fact::{Operand, TypedFact};
use crate::value::{FactValue, Literal, Value, ValueKind};
use std::collections::{BTreeMap, BTreeSet};

/// Filter for [`FactDatabase::list`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FactFilter {
    #[default]
    All,
    HasValue,
    HasNoValue,
}

/// Facts keyed by unique name.
///
/// Definitions (kind, range, description) outlive consultations; only session
/// values are cleared by [`FactDatabase::reset`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FactDatabase {
    facts: BTreeMap<String, TypedFact>,
    /// Source event stamped on every value written through [`FactDatabase::set_operand`].
    event: Option<u64>,
}

impl FactDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty fact of `kind`. Fails with [`KbError::NameTaken`] if `name` exists.
    pub fn create(
        &mut self,
        name: impl Into<String>,
        kind: ValueKind,
    ) -> KbResult<&mut TypedFact> {
        self.insert(name, TypedFact::new(kind))
    }

    /// Insert a prepared fact under a new name.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        fact: TypedFact,
    ) -> KbResult<&mut TypedFact> {
        use std::collections::btree_map::Entry;
        match self.facts.entry(name.into()) {
            Entry::Occupied(entry) => Err(KbError::NameTaken(entry.key().clone())),
            Entry::Vacant(entry) => Ok(entry.insert(fact)),
        }
    }

    pub fn find(&self, name: &str) -> KbResult<&TypedFact> {
        self.facts
            .get(name)
            .ok_or_else(|| KbError::FactNotFound(name.to_string()))
    }

    pub fn find_mut(&mut self, name: &str) -> KbResult<&mut TypedFact> {
        self.facts
            .get_mut(name)
            .ok_or_else(|| KbError::FactNotFound(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.facts.contains_key(name)
    }

    /// Whether the fact currently holds a session value. Unknown names report `false`.
    pub fn known(&self, name: &str) -> bool {
        self.facts.get(name).is_some_and(TypedFact::is_known)
    }

    pub fn list(&self, filter: FactFilter) -> BTreeSet<String> {
        self.facts
            .iter()
            .filter(|(_, fact)| match filter {
                FactFilter::All => true,
                FactFilter::HasValue => fact.is_known(),
                FactFilter::HasNoValue => !fact.is_known(),
            })
            .map(|(name, _)| name.clone())
            .collect()
    }

    pub fn count(&self) -> usize {
        self.facts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.facts.is_empty()
    }

    pub fn remove(&mut self, name: &str) -> KbResult<TypedFact> {
        self.facts
            .remove(name)
            .ok_or_else(|| KbError::FactNotFound(name.to_string()))
    }

    /// Drop every fact definition.
    pub fn clear(&mut self) {
        self.facts.clear();
    }

    /// Clear every session value and the event stamp, keeping definitions.
    pub fn reset(&mut self) {
        for fact in self.facts.values_mut() {
            fact.clear_value();
        }
        self.event = None;
    }

    /// Tag the values written from now on with `event`. `None` stops tagging.
    pub fn stamp_events(&mut self, event: Option<u64>) {
        self.event = event;
    }

    pub fn event(&self) -> Option<u64> {
        self.event
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &TypedFact)> {
        self.facts.iter().map(|(name, fact)| (name.as_str(), fact))
    }

    /// Snapshot of the session value of `name`.
    pub fn value(&self, name: &str) -> Option<FactValue> {
        self.facts.get(name).and_then(TypedFact::snapshot)
    }

    /// Write `value` into the fact `name`, checking kind, enum membership and range.
    pub fn set_operand<T: Operand>(
        &mut self,
        name: &str,
        value: &T,
        confidence: Confidence,
    ) -> KbResult<()> {
        if !value.is_finite() {
            return Err(KbError::NotFinite);
        }
        let event = self.event;
        let fact = self.find_mut(name)?;
        let mismatch = |actual| KbError::KindMismatch {
            fact: name.to_string(),
            expected: T::KIND,
            actual,
        };
        let actual = fact.kind();
        if actual != T::KIND {
            return Err(mismatch(actual));
        }
        let stored = value.resolve(fact)?;
        let cell = T::cell_mut(fact).ok_or_else(|| mismatch(actual))?;
        let value = Value::new(stored, confidence);
        cell.store(match event {
            Some(event) => value.with_source_event(event),
            None => value,
        })
    }

    /// Set a session value from a kind-tagged literal.
    pub fn assign(
        &mut self,
        name: &str,
        literal: &Literal,
        confidence: Confidence,
    ) -> KbResult<()> {
        let result = match literal {
            Literal::Bool(v) => self.set_operand(name, v, confidence),
            Literal::Int(v) => self.set_operand(name, v, confidence),
            Literal::Float(v) => self.set_operand(name, v, confidence),
            Literal::Enum(v) => self.set_operand(name, v, confidence),
        };
        if let Err(err) = &result {
            tracing::debug!(fact = %name, value = %literal, error = %err, "assignment rejected");
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dynamic_enum::DynamicEnum;
    use crate::fact::EnumFact;

    fn sample() -> FactDatabase {
        let mut db = FactDatabase::new();
        db.create("raining", ValueKind::Bool).unwrap();
        if let TypedFact::Int(f) = db.create("temperature", ValueKind::Int).unwrap() {
            f.set_range(-40, 50, true).unwrap();
            f.set_description("outside, in celsius");
        }
        db.insert(
            "wind",
            TypedFact::Enum(EnumFact::new(DynamicEnum::from_names(["calm", "breezy", "gale"]))),
        )
        .unwrap();
        db
    }

    #[test]
    fn create_rejects_taken_names() {
        let mut db = sample();
        assert_eq!(
            db.create("raining", ValueKind::Float).map(|_| ()),
            Err(KbError::NameTaken("raining".to_string()))
        );
        assert_eq!(db.find("raining").map(TypedFact::kind), Ok(ValueKind::Bool));
    }

    #[test]
    fn find_reports_missing_facts() {
        let db = sample();
        assert_eq!(
            db.find("snow").map(|_| ()),
            Err(KbError::FactNotFound("snow".to_string()))
        );
        assert!(!db.known("snow"));
    }

    #[test]
    fn assign_checks_kind_range_and_enum() {
        let mut db = sample();
        assert_eq!(
            db.assign("raining", &Literal::Int(1), Confidence::CERTAIN),
            Err(KbError::KindMismatch {
                fact: "raining".to_string(),
                expected: ValueKind::Int,
                actual: ValueKind::Bool,
            })
        );
        assert_eq!(
            db.assign("temperature", &Literal::Int(80), Confidence::CERTAIN),
            Err(KbError::OutOfRange)
        );
        assert_eq!(
            db.assign("wind", &Literal::Enum("hurricane".into()), Confidence::CERTAIN),
            Err(KbError::UnknownEnumName("hurricane".to_string()))
        );
        assert!(db.list(FactFilter::HasValue).is_empty());

        db.assign("wind", &Literal::Enum("gale".into()), Confidence::new(0.6))
            .unwrap();
        let snapshot = db.value("wind").unwrap();
        assert_eq!(snapshot.literal(), Literal::Enum("gale".into()));
        assert_eq!(snapshot.confidence(), Confidence::new(0.6));
    }

    #[test]
    fn list_filters_by_known_state() {
        let mut db = sample();
        db.assign("raining", &Literal::Bool(true), Confidence::CERTAIN)
            .unwrap();
        assert_eq!(db.list(FactFilter::All).len(), 3);
        assert_eq!(
            db.list(FactFilter::HasValue),
            BTreeSet::from(["raining".to_string()])
        );
        assert_eq!(
            db.list(FactFilter::HasNoValue),
            BTreeSet::from(["temperature".to_string(), "wind".to_string()])
        );
    }

    #[test]
    fn reset_clears_values_but_keeps_definitions() {
        let mut db = sample();
        db.assign("temperature", &Literal::Int(12), Confidence::CERTAIN)
            .unwrap();
        db.assign("raining", &Literal::Bool(false), Confidence::CERTAIN)
            .unwrap();
        let before = db.find("temperature").unwrap().description().to_string();

        db.reset();

        assert!(db.list(FactFilter::HasValue).is_empty());
        assert_eq!(db.count(), 3);
        let TypedFact::Int(temperature) = db.find("temperature").unwrap() else {
            panic!("temperature changed kind");
        };
        assert_eq!(temperature.description(), before);
        assert_eq!(temperature.range().map(|r| (r.min, r.max)), Some((-40, 50)));
    }

    #[test]
    fn non_finite_floats_are_rejected() {
        let mut db = FactDatabase::new();
        db.create("humidity", ValueKind::Float).unwrap();
        for bad in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            assert_eq!(
                db.assign("humidity", &Literal::Float(bad), Confidence::CERTAIN),
                Err(KbError::NotFinite)
            );
        }
        assert!(!db.known("humidity"));
        db.assign("humidity", &Literal::Float(0.4), Confidence::CERTAIN)
            .unwrap();
        assert!(db.known("humidity"));
    }

    #[test]
    fn writes_carry_the_current_event_until_reset() {
        let mut db = sample();
        db.assign("raining", &Literal::Bool(true), Confidence::CERTAIN)
            .unwrap();
        db.stamp_events(Some(3));
        db.assign("temperature", &Literal::Int(7), Confidence::CERTAIN)
            .unwrap();

        let TypedFact::Bool(raining) = db.find("raining").unwrap() else {
            panic!("raining changed kind");
        };
        assert_eq!(raining.value().and_then(|v| v.source_event()), None);
        assert_eq!(db.value("temperature").and_then(|v| v.source_event()), Some(3));

        db.reset();
        assert_eq!(db.event(), None);
        assert_eq!(db, sample());
    }

    #[test]
    fn remove_and_clear() {
        let mut db = sample();
        assert!(db.remove("wind").is_ok());
        assert!(db.remove("wind").is_err());
        db.clear();
        assert!(db.is_empty());
    }
}
