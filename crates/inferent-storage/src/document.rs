//! The on-disk document shape.
//!
//! Facts are written as definitions only (kind, description, range, enum
//! names); rules are written as their antecedent and consequent. Session
//! values and fired flags never reach the document.

use crate::StorageError;
use inferent_kb::{
    DynamicEnum, EnumFact, Fact, KnowledgeBase, Range, RuleDatabase, TypedFact, ValueKind,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RangeRecord {
    pub min: serde_json::Value,
    pub max: serde_json::Value,
    pub inclusive: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactRecord {
    #[serde(rename = "type")]
    pub kind: ValueKind,
    #[serde(default)]
    pub description: String,
    /// `null` when the fact has no range. Enumeration bounds are names.
    #[serde(default)]
    pub range: Option<RangeRecord>,
    #[serde(rename = "enum", default, skip_serializing_if = "Option::is_none")]
    pub variants: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(default)]
    pub database_facts: BTreeMap<String, FactRecord>,
    #[serde(default)]
    pub database_rules: RuleDatabase,
}

fn range_record<T>(range: Option<&Range<T>>) -> Option<RangeRecord>
where
    T: Clone + Into<serde_json::Value>,
{
    range.map(|range| RangeRecord {
        min: range.min.clone().into(),
        max: range.max.clone().into(),
        inclusive: range.inclusive,
    })
}

impl FactRecord {
    /// Describe the fact `name`. Fails rather than drop an enumeration range
    /// whose bounds have no names in the fact's table.
    pub fn from_fact(name: &str, fact: &TypedFact) -> Result<Self, StorageError> {
        let (range, variants) = match fact {
            TypedFact::Bool(f) => (range_record(f.range()), None),
            TypedFact::Int(f) => (range_record(f.range()), None),
            TypedFact::Float(f) => (range_record(f.range()), None),
            TypedFact::Enum(f) => {
                let range = match (f.fact().range(), f.range_names()) {
                    (None, _) => None,
                    (Some(_), Some((min, max, inclusive))) => Some(RangeRecord {
                        min: min.into(),
                        max: max.into(),
                        inclusive,
                    }),
                    (Some(range), None) => {
                        return Err(StorageError::UnnamedEnumRange {
                            fact: name.to_string(),
                            min: range.min,
                            max: range.max,
                        });
                    }
                };
                (range, Some(f.variants().names().to_vec()))
            }
        };
        Ok(Self {
            kind: fact.kind(),
            description: fact.description().to_string(),
            range,
            variants,
        })
    }

    /// Build the fact definition named `name`.
    pub fn into_fact(self, name: &str) -> Result<TypedFact, StorageError> {
        if self.kind != ValueKind::Enum && self.variants.is_some() {
            tracing::warn!(
                fact = %name,
                kind = %self.kind,
                "ignoring enum list on a non-enumeration fact"
            );
        }
        let mut fact = match self.kind {
            ValueKind::Bool => TypedFact::Bool(scalar_fact(name, self.kind, self.range)?),
            ValueKind::Int => TypedFact::Int(scalar_fact(name, self.kind, self.range)?),
            ValueKind::Float => TypedFact::Float(scalar_fact(name, self.kind, self.range)?),
            ValueKind::Enum => {
                let variants = DynamicEnum::from_names(self.variants.unwrap_or_default());
                let mut fact = EnumFact::new(variants);
                if let Some(range) = self.range {
                    let min: String = bound(name, self.kind, &range.min)?;
                    let max: String = bound(name, self.kind, &range.max)?;
                    fact.set_range_named(&min, &max, range.inclusive)
                        .map_err(|source| StorageError::InvalidFact {
                            fact: name.to_string(),
                            source,
                        })?;
                }
                TypedFact::Enum(fact)
            }
        };
        fact.set_description(&self.description);
        Ok(fact)
    }
}

fn bound<T: DeserializeOwned>(
    fact: &str,
    kind: ValueKind,
    value: &serde_json::Value,
) -> Result<T, StorageError> {
    serde_json::from_value(value.clone()).map_err(|_| StorageError::BadValue {
        fact: fact.to_string(),
        kind,
        value: value.to_string(),
    })
}

fn scalar_fact<T: PartialOrd + DeserializeOwned>(
    name: &str,
    kind: ValueKind,
    range: Option<RangeRecord>,
) -> Result<Fact<T>, StorageError> {
    let mut fact = Fact::new();
    if let Some(range) = range {
        let min = bound(name, kind, &range.min)?;
        let max = bound(name, kind, &range.max)?;
        fact.set_range(min, max, range.inclusive)
            .map_err(|source| StorageError::InvalidFact {
                fact: name.to_string(),
                source,
            })?;
    }
    Ok(fact)
}

impl Document {
    pub fn from_knowledge_base(kb: &KnowledgeBase) -> Result<Self, StorageError> {
        let database_facts: BTreeMap<String, FactRecord> = kb
            .facts
            .iter()
            .map(|(name, fact)| {
                FactRecord::from_fact(name, fact).map(|record| (name.to_string(), record))
            })
            .collect::<Result<_, _>>()?;
        Ok(Self {
            database_facts,
            database_rules: kb.rules.clone(),
        })
    }

    pub fn into_knowledge_base(self) -> Result<KnowledgeBase, StorageError> {
        let mut kb = KnowledgeBase::new();
        for (name, record) in self.database_facts {
            let fact = record.into_fact(&name)?;
            kb.facts
                .insert(name.clone(), fact)
                .map_err(|source| StorageError::InvalidFact { fact: name, source })?;
        }
        kb.rules = self.database_rules;
        Ok(kb)
    }
}
