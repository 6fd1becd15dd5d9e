//! Core types for declarative resource management

use serde::de::Deserializer;
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// JSON object as exchanged with the remote store.
///
/// Key order is preserved, so payloads and filters follow insertion order.
pub type Object = serde_json::Map<String, Value>;

static UNSET: Field = Field::Unset;

/// A single desired field.
///
/// `Unset` and `Null` both mean "no opinion": neither is sent on create or
/// update, and neither takes part in change detection.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Field {
    /// The caller did not mention the field
    #[default]
    Unset,
    /// The caller mentioned the field with an explicit null
    Null,
    /// The caller wants this value
    Value(Value),
}

impl Field {
    /// Get the concrete value, if any
    pub fn value(&self) -> Option<&Value> {
        match self {
            Self::Value(value) => Some(value),
            Self::Unset | Self::Null => None,
        }
    }

    /// Check if the field carries a concrete value
    pub fn is_set(&self) -> bool {
        matches!(self, Self::Value(_))
    }
}

impl From<Value> for Field {
    fn from(value: Value) -> Self {
        if value.is_null() {
            Self::Null
        } else {
            Self::Value(value)
        }
    }
}

impl From<&str> for Field {
    fn from(value: &str) -> Self {
        Self::Value(Value::from(value))
    }
}

impl From<String> for Field {
    fn from(value: String) -> Self {
        Self::Value(Value::from(value))
    }
}

impl From<i64> for Field {
    fn from(value: i64) -> Self {
        Self::Value(Value::from(value))
    }
}

impl From<bool> for Field {
    fn from(value: bool) -> Self {
        Self::Value(Value::from(value))
    }
}

/// The caller's partial description of an object.
///
/// Keeps insertion order. Setting a name twice replaces the earlier field in
/// place.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DesiredState {
    fields: Vec<(String, Field)>,
}

impl DesiredState {
    /// Create an empty desired state
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a JSON object; JSON nulls become [`Field::Null`]
    pub fn from_object(object: Object) -> Self {
        object
            .into_iter()
            .map(|(name, value)| (name, Field::from(value)))
            .collect()
    }

    /// Builder-style field setter
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, field: impl Into<Field>) -> Self {
        self.set(name, field);
        self
    }

    /// Set a field, replacing any earlier value under the same name
    pub fn set(&mut self, name: impl Into<String>, field: impl Into<Field>) {
        let name = name.into();
        let field = field.into();
        match self.fields.iter_mut().find(|(existing, _)| *existing == name) {
            Some(slot) => slot.1 = field,
            None => self.fields.push((name, field)),
        }
    }

    /// Get a field; unknown names are [`Field::Unset`]
    pub fn get(&self, name: &str) -> &Field {
        self.fields
            .iter()
            .find(|(existing, _)| existing == name)
            .map_or(&UNSET, |(_, field)| field)
    }

    /// Remove a field, returning what it held
    pub fn remove(&mut self, name: &str) -> Field {
        match self.fields.iter().position(|(existing, _)| existing == name) {
            Some(index) => self.fields.remove(index).1,
            None => Field::Unset,
        }
    }

    /// Iterate over every mentioned field, including nulls
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Field)> {
        self.fields.iter().map(|(name, field)| (name.as_str(), field))
    }

    /// Iterate over fields that carry a concrete value
    pub fn values(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields
            .iter()
            .filter_map(|(name, field)| field.value().map(|value| (name.as_str(), value)))
    }

    /// Check if no field carries a concrete value
    pub fn is_empty(&self) -> bool {
        self.values().next().is_none()
    }

    /// Wire payload: every concrete field, nulls and unset fields omitted
    pub fn payload(&self) -> Object {
        self.values()
            .map(|(name, value)| (name.to_string(), value.clone()))
            .collect()
    }
}

impl FromIterator<(String, Field)> for DesiredState {
    fn from_iter<I: IntoIterator<Item = (String, Field)>>(iter: I) -> Self {
        let mut state = Self::new();
        for (name, field) in iter {
            state.set(name, field);
        }
        state
    }
}

impl Serialize for DesiredState {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mentioned: Vec<_> = self
            .fields
            .iter()
            .filter(|(_, field)| !matches!(field, Field::Unset))
            .collect();
        let mut map = serializer.serialize_map(Some(mentioned.len()))?;
        for (name, field) in mentioned {
            map.serialize_entry(name, &field.value().unwrap_or(&Value::Null))?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for DesiredState {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Object::deserialize(deserializer).map(Self::from_object)
    }
}
