//! Named business fields of an entity.

use std::fmt;
use std::sync::Arc;

use crate::collections::LtMap;
use crate::path::FieldPath;
use crate::value::Value;

/// The application-defined fields of an entity, keyed by field name.
///
/// The entity's `id` is not part of the record; it is carried alongside.
/// Cloning is O(1).
#[derive(Clone, Default, PartialEq)]
pub struct Record(LtMap<Arc<str>, Value>);

impl Record {
    /// Creates an empty record.
    #[must_use]
    pub fn new() -> Self {
        Self(LtMap::new())
    }

    /// Builder method to add a field.
    #[must_use]
    pub fn with(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.set(name, value);
        self
    }

    /// Sets a field, replacing any previous value.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) {
        self.0 = self.0.insert(name.into(), value.into());
    }

    /// Removes a field.
    pub fn remove(&mut self, name: &str) {
        self.0 = self.0.remove(name);
    }

    /// Gets a field by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// Resolves a path through nested fields.
    #[must_use]
    pub fn get_path(&self, path: &FieldPath) -> Option<&Value> {
        let (first, rest) = path.segments().split_first()?;
        let head = match first {
            crate::PathSegment::Key(key) => self.0.get(key)?,
            crate::PathSegment::Index(_) => return None,
        };
        rest.iter().try_fold(head, |value, segment| value.child(segment))
    }

    /// Returns true if the record has no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterates over fields in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&Arc<str>, &Value)> {
        self.0.iter()
    }

    /// Returns a record with the same fields, every value zeroed.
    #[must_use]
    pub fn zero_like(&self) -> Self {
        Self(self.0.iter().map(|(k, v)| (k.clone(), v.zero_like())).collect())
    }

    /// Directional comparison against an earlier version of this record.
    ///
    /// See [`Value::covers`]; fields present only on `original` are ignored.
    #[must_use]
    pub fn covers(&self, original: &Self) -> bool {
        self.0
            .iter()
            .all(|(k, v)| original.0.get(k).is_some_and(|o| v.covers(o)))
    }

    /// Views the record as a map value.
    #[must_use]
    pub fn to_value(&self) -> Value {
        Value::Map(self.0.clone())
    }

    /// Builds a record from a map value. Returns `None` for any other kind.
    #[must_use]
    pub fn from_value(value: &Value) -> Option<Self> {
        value.as_map().map(|m| Self(m.clone()))
    }
}

impl fmt::Debug for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl<K: Into<Arc<str>>, V: Into<Value>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}
