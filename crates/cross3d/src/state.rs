//! Structured state documents
//!
//! Layer states are recorded into a small tree of named nodes, each carrying string attributes
//! and child nodes. A recorded layer looks like this (shown as TOML, which is what
//! [`StateNode::to_toml_string`] produces):
//!
//! ```toml
//! name = "layerStates"
//!
//! [[children]]
//! name = "layer"
//! attributes = { name = "Hero", id = "12" }
//!
//! [[children.children]]
//! name = "materialOverride"
//! attributes = { name = "Chrome", id = "3" }
//! ```
//!
//! The tree itself is format agnostic and derives serde traits, so hosts can persist it using
//! whatever they already use for scene metadata.

use crate::error::StateError;
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, str::FromStr};

/// Node name of a recorded layer.
pub const LAYER_NODE: &str = "layer";
/// Node name of a recorded atmospheric.
pub const ATMOSPHERIC_NODE: &str = "atmospheric";
pub const PROP_SET_OVERRIDE_NODE: &str = "propSetOverride";
pub const MATERIAL_OVERRIDE_NODE: &str = "materialOverride";
pub const ENVIRONMENT_MAP_OVERRIDE_NODE: &str = "environmentMapOverride";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateNode {
    pub name: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<StateNode>,
}

impl StateNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Appends a new, empty child node and returns it.
    pub fn add_node(&mut self, name: impl Into<String>) -> &mut StateNode {
        self.children.push(StateNode::new(name));
        let last = self.children.len() - 1;
        &mut self.children[last]
    }

    pub fn set_attribute(&mut self, key: impl Into<String>, value: impl ToString) {
        self.attributes.insert(key.into(), value.to_string());
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    /// Reads and parses an attribute. Returns [`None`] if it's missing or malformed.
    pub fn parse_attribute<T: FromStr>(&self, key: &str) -> Option<T> {
        self.attribute(key)?.parse().ok()
    }

    /// Returns the first child with the given name.
    pub fn find_child(&self, name: &str) -> Option<&StateNode> {
        self.children.iter().find(|child| child.name == name)
    }

    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a StateNode> + 'a {
        self.children.iter().filter(move |child| child.name == name)
    }

    pub fn to_toml_string(&self) -> Result<String, StateError> {
        Ok(toml::to_string(self)?)
    }

    pub fn from_toml_str(s: &str) -> Result<Self, StateError> {
        Ok(toml::from_str(s)?)
    }
}
