//! Materials and maps
//!
//! Both get persisted by reference: a recorded material is just its name and unique id, and
//! restoring it means finding the same material in the live scene again. Nothing gets created.

use crate::state::StateNode;

scene_wrapper! {
    /// A native material.
    SceneMaterial
}

named_wrapper!(SceneMaterial);

scene_wrapper! {
    /// A native texture map, used for environment overrides.
    SceneMap
}

named_wrapper!(SceneMap);

fn record_reference(node: &mut StateNode, name: String, unique_id: u64) {
    node.set_attribute("name", name);
    node.set_attribute("id", unique_id);
}

fn reference_of(node: &StateNode) -> (&str, u64) {
    (
        node.attribute("name").unwrap_or_default(),
        node.parse_attribute("id").unwrap_or(0),
    )
}

impl<'s> SceneMaterial<'s> {
    pub fn record_state(&self, node: &mut StateNode) {
        record_reference(node, self.name(), self.unique_id());
    }

    /// Finds the material a node written by [`SceneMaterial::record_state`] refers to.
    pub fn from_state(scene: &'s crate::Scene, node: &StateNode) -> Option<Self> {
        let (name, unique_id) = reference_of(node);
        scene.find_material(name, unique_id)
    }
}

impl<'s> SceneMap<'s> {
    pub fn record_state(&self, node: &mut StateNode) {
        record_reference(node, self.name(), self.unique_id());
    }

    /// Finds the map a node written by [`SceneMap::record_state`] refers to.
    pub fn from_state(scene: &'s crate::Scene, node: &StateNode) -> Option<Self> {
        let (name, unique_id) = reference_of(node);
        scene.find_map(name, unique_id)
    }
}
