//! Runtime-configurable enumerations.
//!
//! A [`DynamicEnum`] is an ordered list of unique names. A name's position
//! (its ordinal) is what Enumeration facts actually store, so "less than" and
//! "greater than" on enum facts compare declaration order, not text.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Bidirectional name ↔ ordinal table. Ordinals start at 0.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct DynamicEnum {
    names: Vec<String>,
    positions: HashMap<String, usize>,
}

impl DynamicEnum {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from names in ascending order. Duplicates after the first are dropped.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut table = Self::default();
        for name in names {
            table.push_back(name);
        }
        table
    }

    /// Append `name` at the end. Returns `false` if the name is already used.
    pub fn push_back(&mut self, name: impl Into<String>) -> bool {
        let name = name.into();
        if self.has(&name) {
            return false;
        }
        self.positions.insert(name.clone(), self.names.len());
        self.names.push(name);
        true
    }

    /// Insert `name` at `position`, shifting that position and everything after it up by one.
    ///
    /// A position at or past the end behaves like [`DynamicEnum::push_back`].
    /// Returns `false` if the name is already used.
    pub fn insert(&mut self, name: impl Into<String>, position: usize) -> bool {
        if position >= self.names.len() {
            return self.push_back(name);
        }
        let name = name.into();
        if self.has(&name) {
            return false;
        }
        self.names.insert(position, name);
        self.reindex_from(position);
        true
    }

    pub fn has(&self, name: &str) -> bool {
        self.positions.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Name stored at `position`.
    pub fn name(&self, position: usize) -> Option<&str> {
        self.names.get(position).map(String::as_str)
    }

    /// Ordinal of `name`.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.positions.get(name).copied()
    }

    /// Names in ascending order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn remove_name(&mut self, name: &str) -> bool {
        match self.position(name) {
            Some(position) => self.remove(position),
            None => false,
        }
    }

    /// Remove the entry at `position`; every later entry moves down by one.
    pub fn remove(&mut self, position: usize) -> bool {
        if position >= self.names.len() {
            return false;
        }
        let removed = self.names.remove(position);
        self.positions.remove(&removed);
        self.reindex_from(position);
        true
    }

    pub fn clear(&mut self) {
        self.names.clear();
        self.positions.clear();
    }

    fn reindex_from(&mut self, start: usize) {
        for (offset, name) in self.names[start..].iter().enumerate() {
            self.positions.insert(name.clone(), start + offset);
        }
    }
}

impl From<Vec<String>> for DynamicEnum {
    fn from(names: Vec<String>) -> Self {
        Self::from_names(names)
    }
}

impl From<DynamicEnum> for Vec<String> {
    fn from(table: DynamicEnum) -> Self {
        table.names
    }
}
