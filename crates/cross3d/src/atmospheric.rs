//! Atmospherics
//!
//! Environment effects (fog, volume lights, ...) that can be switched on and off, and belong to
//! at most one layer.

use crate::{
    layer::Layer,
    state::{StateNode, ATMOSPHERIC_NODE},
    Scene,
};

scene_wrapper! {
    /// A native atmospheric effect.
    Atmospheric
}

named_wrapper!(Atmospheric);

impl<'s> Atmospheric<'s> {
    /// Finds the live atmospheric a node written by [`Atmospheric::record_state`] refers to.
    /// Atmospherics are never created by this, only found.
    pub fn from_state(scene: &'s Scene, node: &StateNode) -> Option<Self> {
        let name = node.attribute("name").unwrap_or_default();
        let unique_id = node.parse_attribute("id").unwrap_or(0);
        scene.find_atmospheric(name, unique_id)
    }

    pub fn is_enabled(&self) -> bool {
        let native = self.native;
        self.scene
            .query(false, |host| host.is_atmospheric_enabled(native))
    }

    pub fn set_enabled(&self, state: bool) -> bool {
        let native = self.native;
        self.scene
            .command(|host| host.set_atmospheric_enabled(native, state))
    }

    pub fn enable(&self) -> bool {
        self.set_enabled(true)
    }

    pub fn disable(&self) -> bool {
        self.set_enabled(false)
    }

    /// The layer this atmospheric belongs to, looked up every time.
    pub fn layer(&self) -> Option<Layer<'s>> {
        let native = self.native;
        self.scene
            .query(None, |host| host.native_atmospheric_layer(native))
            .map(|handle| Layer::new(self.scene, handle))
    }

    /// Appends an `atmospheric` node to `doc`.
    pub fn record_state(&self, doc: &mut StateNode) {
        let node = doc.add_node(ATMOSPHERIC_NODE);
        node.set_attribute("name", self.name());
        node.set_attribute("id", self.unique_id());
    }
}
