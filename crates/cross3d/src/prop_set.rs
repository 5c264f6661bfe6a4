//! Object property sets
//!
//! A property set is a named bundle of object properties (render visibility, shadow casting, ...)
//! that can be pushed onto every object of a group as an override. Only the *active* entries of a
//! set are meant to be applied, a set without any active entry is inactive as a whole.

use crate::state::StateNode;
use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    fmt::{self, Display},
};

const PROPERTY_NODE: &str = "property";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl PropValue {
    fn kind(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Text(_) => "text",
        }
    }

    fn parse(kind: &str, value: &str) -> Option<Self> {
        Some(match kind {
            "bool" => Self::Bool(value.parse().ok()?),
            "int" => Self::Int(value.parse().ok()?),
            "float" => Self::Float(value.parse().ok()?),
            "text" => Self::Text(value.to_string()),
            _ => return None,
        })
    }
}

impl Display for PropValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Text(v) => write!(f, "{v}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropEntry {
    pub value: PropValue,
    pub active: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PropSet {
    pub name: String,
    entries: BTreeMap<String, PropEntry>,
}

impl PropSet {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: BTreeMap::new(),
        }
    }

    /// Builder-style shorthand for inserting an active property.
    pub fn with(mut self, key: impl Into<String>, value: PropValue) -> Self {
        self.set(key, value, true);
        self
    }

    /// Inserts or replaces a property.
    pub fn set(&mut self, key: impl Into<String>, value: PropValue, active: bool) {
        self.entries.insert(key.into(), PropEntry { value, active });
    }

    pub fn value(&self, key: &str) -> Option<&PropValue> {
        self.entries.get(key).map(|entry| &entry.value)
    }

    /// Marks a property as (in)active. Returns `false` if there's no such property.
    pub fn set_active(&mut self, key: &str, active: bool) -> bool {
        match self.entries.get_mut(key) {
            Some(entry) => {
                entry.active = active;
                true
            }
            None => false,
        }
    }

    pub fn is_entry_active(&self, key: &str) -> bool {
        self.entries.get(key).map_or(false, |entry| entry.active)
    }

    /// Whether any of this set's properties is active.
    pub fn is_active(&self) -> bool {
        self.entries.values().any(|entry| entry.active)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropEntry)> {
        self.entries.iter().map(|(key, entry)| (key.as_str(), entry))
    }

    /// Only the active properties, which is what an override actually applies.
    pub fn active_entries(&self) -> impl Iterator<Item = (&str, &PropValue)> {
        self.iter()
            .filter(|(_, entry)| entry.active)
            .map(|(key, entry)| (key, &entry.value))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Writes this set into `node`, one `property` child per entry.
    pub fn record_state(&self, node: &mut StateNode) {
        node.set_attribute("name", &self.name);
        for (key, entry) in &self.entries {
            let property = node.add_node(PROPERTY_NODE);
            property.set_attribute("name", key);
            property.set_attribute("kind", entry.value.kind());
            property.set_attribute("value", &entry.value);
            property.set_attribute("active", entry.active);
        }
    }

    /// Rebuilds a set written by [`PropSet::record_state`]. Malformed properties are skipped.
    pub fn from_state(node: &StateNode) -> Option<Self> {
        let mut set = PropSet::new(node.attribute("name")?);
        for property in node.children_named(PROPERTY_NODE) {
            let parsed = property.attribute("name").zip(
                property
                    .attribute("kind")
                    .zip(property.attribute("value"))
                    .and_then(|(kind, value)| PropValue::parse(kind, value)),
            );
            let Some((key, value)) = parsed else {
                log::warn!("Skipping malformed property in set `{}`", set.name);
                continue;
            };
            let active = property.parse_attribute("active").unwrap_or(false);
            set.set(key, value, active);
        }
        Some(set)
    }
}
