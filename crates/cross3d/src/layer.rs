//! Layers
//!
//! A layer is an object group with extra state: visibility of its own, an active/world role, and
//! palettes of alternate materials and property sets that can be swapped in as overrides.
//!
//! Layers can record their overrides into a [`StateNode`] document and restore them later, which
//! is how "layer states" are persisted between sessions.

use crate::{
    flags::{AdvancedMaterialState, MaterialOverrideOptions},
    group::{Group, ObjectGroup, OverrideState},
    layer_group::LayerGroup,
    material::{SceneMap, SceneMaterial},
    prop_set::PropSet,
    state::{
        StateNode, ENVIRONMENT_MAP_OVERRIDE_NODE, LAYER_NODE, MATERIAL_OVERRIDE_NODE,
        PROP_SET_OVERRIDE_NODE,
    },
    NativeHandle, Scene,
};
use cross3d_utils::color::RGBA8;
use log::*;
use std::fmt::{self, Debug};

/// Outcome of switching the current alternate slot of a layer.
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexChange {
    /// The requested slot already was the current one, nothing happened.
    Unchanged,
    /// The slot got applied and is now current.
    Applied,
    /// The slot is out of range or couldn't be applied. The current index is left alone.
    Failed,
}

impl IndexChange {
    pub fn is_applied(self) -> bool {
        self == Self::Applied
    }

    pub fn is_failed(self) -> bool {
        self == Self::Failed
    }
}

#[derive(Clone)]
pub struct Layer<'s> {
    group: ObjectGroup<'s>,
    current_alt_material: Option<usize>,
    current_alt_prop_set: Option<usize>,
}

impl<'s> Layer<'s> {
    pub fn new(scene: &'s Scene, native: NativeHandle) -> Self {
        Self {
            group: ObjectGroup::new(scene, native),
            current_alt_material: None,
            current_alt_prop_set: None,
        }
    }

    /// Finds the live layer a node written by [`Layer::record_layer_state`] refers to.
    pub fn from_state(scene: &'s Scene, node: &StateNode) -> Option<Self> {
        let name = node.attribute("name").unwrap_or_default();
        let unique_id = node.parse_attribute("id").unwrap_or(0);
        scene.find_layer(name, unique_id)
    }

    /// Picks the current alternate slots up from the live overrides. New wrappers start without
    /// current slots, since they're only tracked per wrapper.
    pub fn sync_current_indices(&mut self) {
        self.current_alt_material = self
            .material_override()
            .and_then(|material| self.index_of_alt_material(&material));
        self.current_alt_prop_set = self
            .prop_set_override()
            .and_then(|prop_set| self.index_of_alt_prop_set(&prop_set));
    }

    pub fn name(&self) -> String {
        self.scene().native_name(self.native_handle())
    }

    pub fn unique_id(&self) -> u64 {
        self.scene().native_unique_id(self.native_handle())
    }

    pub fn is_world_layer(&self) -> bool {
        let layer = self.native_handle();
        self.scene().query(false, |host| host.is_world_layer(layer))
    }

    pub fn is_active(&self) -> bool {
        let layer = self.native_handle();
        self.scene().query(false, |host| host.is_active_layer(layer))
    }

    pub fn set_active(&self, state: bool) -> bool {
        let layer = self.native_handle();
        self.scene()
            .command(|host| host.set_active_layer(layer, state))
    }

    pub fn is_visible(&self) -> bool {
        let layer = self.native_handle();
        self.scene().query(false, |host| host.is_layer_visible(layer))
    }

    pub fn set_visible(&self, state: bool) -> bool {
        let layer = self.native_handle();
        self.scene()
            .command(|host| host.set_layer_visible(layer, state))
    }

    // Alternate materials

    fn native_alt_materials(&self) -> Vec<Option<NativeHandle>> {
        let layer = self.native_handle();
        self.scene()
            .query(vec![], |host| host.native_alt_materials(layer))
    }

    /// Every slot of the alternate material palette. Empty slots are [`None`].
    pub fn alt_materials(&self) -> Vec<Option<SceneMaterial<'s>>> {
        let scene = self.scene();
        self.native_alt_materials()
            .into_iter()
            .map(|slot| slot.map(|handle| SceneMaterial::new(scene, handle)))
            .collect()
    }

    /// Material in slot `index`, or [`None`] if the slot is empty or out of range.
    pub fn alt_material_at(&self, index: usize) -> Option<SceneMaterial<'s>> {
        self.native_alt_materials()
            .get(index)
            .copied()
            .flatten()
            .map(|handle| SceneMaterial::new(self.scene(), handle))
    }

    pub fn alt_material_count(&self) -> usize {
        self.native_alt_materials().len()
    }

    /// Sets slot `index`, growing the palette if needed. [`None`] empties the slot.
    pub fn set_alt_material_at(&self, index: usize, material: Option<&SceneMaterial<'_>>) -> bool {
        let layer = self.native_handle();
        let native = material.map(SceneMaterial::native_handle);
        self.scene()
            .command(|host| host.set_native_alt_material_at(layer, index, native))
    }

    pub fn set_alt_materials(&self, materials: &[Option<SceneMaterial<'_>>]) -> bool {
        let layer = self.native_handle();
        let natives: Vec<_> = materials
            .iter()
            .map(|slot| slot.as_ref().map(SceneMaterial::native_handle))
            .collect();
        self.scene()
            .command(|host| host.set_native_alt_materials(layer, &natives))
    }

    /// Appends a slot to the palette.
    pub fn add_alt_material(&self, material: &SceneMaterial<'_>) -> bool {
        self.set_alt_material_at(self.alt_material_count(), Some(material))
    }

    /// Sets slot `index` only if it holds no material yet.
    pub fn define_alt_material_at(&self, index: usize, material: &SceneMaterial<'_>) -> bool {
        if self.alt_material_at(index).is_some() {
            return false;
        }
        self.set_alt_material_at(index, Some(material))
    }

    pub fn index_of_alt_material(&self, material: &SceneMaterial<'_>) -> Option<usize> {
        let target = material.native_handle();
        self.native_alt_materials()
            .iter()
            .position(|slot| *slot == Some(target))
    }

    /// Removes slot `index` along with its flags and advanced state. Later slots move down.
    ///
    /// Removing the current slot clears the material override first. If any part of the palette
    /// can't be updated, the parts already changed are put back the way they were. Hosts without
    /// flags or advanced state just don't get those updated.
    pub fn remove_alt_material_at(&mut self, index: usize) -> bool {
        let scene = self.scene();
        let layer = self.native_handle();

        let original = self.native_alt_materials();
        if index >= original.len() {
            return false;
        }

        if self.current_alt_material == Some(index) {
            if !self.group.clear_material_override() {
                return false;
            }
            self.current_alt_material = None;
        }

        let mut materials = original.clone();
        materials.remove(index);
        if !scene.command(|host| host.set_native_alt_materials(layer, &materials)) {
            return false;
        }

        let original_flags = scene.optional_query(vec![], |host| host.alt_material_flags(layer));
        if index < original_flags.len() {
            let mut flags = original_flags.clone();
            flags.remove(index);
            if !scene.optional_command(|host| host.set_alt_material_flags(layer, &flags)) {
                warn!(
                    "Couldn't update the alternate material flags of layer {layer}, keeping slot \
                     {index}"
                );
                scene.command(|host| host.set_native_alt_materials(layer, &original));
                return false;
            }
        }

        let removed = scene.optional_command(|host| {
            host.remove_advanced_alt_material_state_at(layer, index)
        });
        if !removed {
            warn!(
                "Couldn't remove the advanced state of slot {index} of layer {layer}, keeping the \
                 slot"
            );
            scene.command(|host| host.set_native_alt_materials(layer, &original));
            if index < original_flags.len() {
                scene.command(|host| host.set_alt_material_flags(layer, &original_flags));
            }
            return false;
        }

        if let Some(current) = self.current_alt_material.filter(|&current| current > index) {
            self.current_alt_material = Some(current - 1);
        }
        true
    }

    pub fn current_alt_material_index(&self) -> Option<usize> {
        self.current_alt_material
    }

    pub fn current_alt_material(&self) -> Option<SceneMaterial<'s>> {
        self.current_alt_material
            .and_then(|index| self.alt_material_at(index))
    }

    /// Switches the current alternate material slot, applying its material (with the slot's
    /// flags and advanced state) as the layer's material override. [`None`] clears the override.
    ///
    /// An empty slot clears the override as well.
    pub fn set_current_alt_material_index(&mut self, index: Option<usize>) -> IndexChange {
        if index == self.current_alt_material {
            return IndexChange::Unchanged;
        }

        let applied = match index {
            None => self.group.clear_material_override(),
            Some(index) => {
                let materials = self.native_alt_materials();
                let Some(&slot) = materials.get(index) else {
                    debug!(
                        "Alternate material index {index} is out of range ({} slots)",
                        materials.len()
                    );
                    return IndexChange::Failed;
                };

                match slot {
                    Some(material) => {
                        let options = self.alt_material_flags_at(index);
                        let advanced = self.slot_advanced_state(index);
                        self.group
                            .apply_material_override(material, options, advanced)
                    }
                    None => self.group.clear_material_override(),
                }
            }
        };

        if !applied {
            return IndexChange::Failed;
        }
        self.current_alt_material = index;
        IndexChange::Applied
    }

    // Alternate material flags

    /// Flags of every slot. Slots past the end of the list have no flags.
    pub fn alt_material_flags(&self) -> Vec<MaterialOverrideOptions> {
        let layer = self.native_handle();
        self.scene()
            .query(vec![], |host| host.alt_material_flags(layer))
    }

    pub fn alt_material_flags_at(&self, index: usize) -> MaterialOverrideOptions {
        self.alt_material_flags()
            .get(index)
            .copied()
            .unwrap_or_default()
    }

    pub fn has_alt_material_flag_at(&self, index: usize, flag: MaterialOverrideOptions) -> bool {
        self.alt_material_flags_at(index).intersects(flag)
    }

    pub fn set_alt_material_flag_at(
        &self,
        index: usize,
        flag: MaterialOverrideOptions,
        state: bool,
    ) -> bool {
        let mut flags = self.alt_material_flags_at(index);
        flags.set(flag, state);
        self.set_alt_material_flags_at(index, flags)
    }

    pub fn set_alt_material_flags_at(&self, index: usize, flags: MaterialOverrideOptions) -> bool {
        let mut all = self.alt_material_flags();
        if all.len() <= index {
            all.resize(index + 1, MaterialOverrideOptions::empty());
        }
        all[index] = flags;
        self.set_alt_material_flags(&all)
    }

    pub fn set_alt_material_flags(&self, flags: &[MaterialOverrideOptions]) -> bool {
        let layer = self.native_handle();
        self.scene()
            .command(|host| host.set_alt_material_flags(layer, flags))
    }

    // Advanced alternate material state

    pub fn advanced_alt_material_state_at(&self, index: usize) -> Option<AdvancedMaterialState> {
        if !self.has_advanced_alt_material_state_at(index) {
            return None;
        }
        let layer = self.native_handle();
        self.scene().query(None, |host| {
            host.advanced_alt_material_state_at(layer, index).map(Some)
        })
    }

    pub fn has_advanced_alt_material_state_at(&self, index: usize) -> bool {
        let layer = self.native_handle();
        self.scene()
            .query(false, |host| host.has_advanced_alt_material_state_at(layer, index))
    }

    pub fn set_advanced_alt_material_state_at(
        &self,
        index: usize,
        state: &AdvancedMaterialState,
    ) -> bool {
        let layer = self.native_handle();
        self.scene()
            .command(|host| host.set_advanced_alt_material_state_at(layer, index, state))
    }

    /// Advanced state to apply along with slot `index`. Hosts without advanced state support
    /// simply have none.
    fn slot_advanced_state(&self, index: usize) -> Option<AdvancedMaterialState> {
        let layer = self.native_handle();
        let scene = self.scene();
        let present = scene.optional_query(false, |host| {
            host.has_advanced_alt_material_state_at(layer, index)
        });
        if !present {
            return None;
        }
        scene.optional_query(None, |host| {
            host.advanced_alt_material_state_at(layer, index).map(Some)
        })
    }

    /// Removes the advanced state of slot `index`, shifting the states of later slots down.
    /// Meant to accompany the removal of the slot itself.
    pub fn remove_advanced_alt_material_state_at(&self, index: usize) -> bool {
        let layer = self.native_handle();
        self.scene()
            .command(|host| host.remove_advanced_alt_material_state_at(layer, index))
    }

    // Alternate property sets

    pub fn alt_prop_sets(&self) -> Vec<PropSet> {
        let layer = self.native_handle();
        self.scene().query(vec![], |host| host.alt_prop_sets(layer))
    }

    pub fn alt_prop_set_at(&self, index: usize) -> Option<PropSet> {
        let mut prop_sets = self.alt_prop_sets();
        (index < prop_sets.len()).then(|| prop_sets.swap_remove(index))
    }

    pub fn alt_prop_set_count(&self) -> usize {
        self.alt_prop_sets().len()
    }

    /// Sets slot `index`, growing the palette with empty sets if needed.
    pub fn set_alt_prop_set_at(&self, index: usize, prop_set: &PropSet) -> bool {
        let layer = self.native_handle();
        self.scene()
            .command(|host| host.set_alt_prop_set_at(layer, index, prop_set))
    }

    pub fn set_alt_prop_sets(&self, prop_sets: &[PropSet]) -> bool {
        let layer = self.native_handle();
        self.scene()
            .command(|host| host.set_alt_prop_sets(layer, prop_sets))
    }

    pub fn add_alt_prop_set(&self, prop_set: &PropSet) -> bool {
        self.set_alt_prop_set_at(self.alt_prop_set_count(), prop_set)
    }

    /// Sets slot `index` unless it already holds an active property set.
    pub fn define_alt_prop_set_at(&self, index: usize, prop_set: &PropSet) -> bool {
        if self
            .alt_prop_set_at(index)
            .map_or(false, |existing| existing.is_active())
        {
            return false;
        }
        self.set_alt_prop_set_at(index, prop_set)
    }

    pub fn index_of_alt_prop_set(&self, prop_set: &PropSet) -> Option<usize> {
        self.alt_prop_sets().iter().position(|p| p == prop_set)
    }

    /// Removes slot `index`, later slots move down. Removing the current slot clears the
    /// property set override first.
    pub fn remove_alt_prop_set_at(&mut self, index: usize) -> bool {
        let mut prop_sets = self.alt_prop_sets();
        if index >= prop_sets.len() {
            return false;
        }

        if self.current_alt_prop_set == Some(index) {
            if !self.group.clear_prop_set_override() {
                return false;
            }
            self.current_alt_prop_set = None;
        }

        prop_sets.remove(index);
        if !self.set_alt_prop_sets(&prop_sets) {
            return false;
        }

        if let Some(current) = self.current_alt_prop_set.filter(|&current| current > index) {
            self.current_alt_prop_set = Some(current - 1);
        }
        true
    }

    pub fn current_alt_prop_set_index(&self) -> Option<usize> {
        self.current_alt_prop_set
    }

    pub fn current_alt_prop_set(&self) -> Option<PropSet> {
        self.current_alt_prop_set
            .and_then(|index| self.alt_prop_set_at(index))
    }

    /// Switches the current alternate property set, applying it as the layer's property set
    /// override. Inactive sets can't be selected. [`None`] clears the override.
    pub fn set_current_alt_prop_set_index(&mut self, index: Option<usize>) -> IndexChange {
        if index == self.current_alt_prop_set {
            return IndexChange::Unchanged;
        }

        let applied = match index {
            None => self.group.clear_prop_set_override(),
            Some(index) => match self.alt_prop_set_at(index) {
                Some(prop_set) if prop_set.is_active() => {
                    self.group.set_prop_set_override(Some(&prop_set))
                }
                Some(_) => {
                    debug!("Alternate property set {index} is inactive, not selecting it");
                    false
                }
                None => false,
            },
        };

        if !applied {
            return IndexChange::Failed;
        }
        self.current_alt_prop_set = index;
        IndexChange::Applied
    }

    // Layer groups

    pub fn layer_group(&self) -> Option<LayerGroup<'s>> {
        let layer = self.native_handle();
        let scene = self.scene();
        scene
            .query(None, |host| host.native_layer_group(layer))
            .map(|handle| LayerGroup::new(scene, handle))
    }

    /// Moves the layer into a layer group. [`None`] takes it out of its current one.
    pub fn set_layer_group(&self, group: Option<&LayerGroup<'_>>) -> bool {
        let layer = self.native_handle();
        let native = group.map(LayerGroup::native_handle);
        self.scene()
            .command(|host| host.set_native_layer_group(layer, native))
    }

    /// Sort key of the layer within its layer group, -1 if unknown.
    pub fn layer_group_order(&self) -> i32 {
        let layer = self.native_handle();
        self.scene().query(-1, |host| host.layer_group_order(layer))
    }

    pub fn set_layer_group_order(&self, order: i32) -> bool {
        let layer = self.native_handle();
        self.scene()
            .command(|host| host.set_layer_group_order(layer, order))
    }

    pub fn wire_color(&self) -> Option<RGBA8> {
        let layer = self.native_handle();
        let native = self
            .scene()
            .query(None, |host| host.native_wire_color(layer))?;
        self.scene().from_native_color(native)
    }

    pub fn set_wire_color(&self, color: RGBA8) -> bool {
        let Some(native) = self.scene().to_native_color(color) else {
            return false;
        };
        let layer = self.native_handle();
        self.scene()
            .command(|host| host.set_native_wire_color(layer, native))
    }

    // Layer states

    /// Appends a `layer` node describing this layer's overrides to `doc`.
    ///
    /// Hidden layers aren't recorded at all, in which case `false` is returned and `doc` is left
    /// as it was.
    pub fn record_layer_state(&self, doc: &mut StateNode) -> bool {
        if !self.is_visible() {
            trace!("Skipping hidden layer {}", self.native_handle());
            return false;
        }

        let prop_set = self.prop_set_override();
        let material = self.material_override();
        let environment_map = if self.is_world_layer() {
            self.scene().environment_map_override()
        } else {
            None
        };

        let node = doc.add_node(LAYER_NODE);
        node.set_attribute("name", self.name());
        node.set_attribute("id", self.unique_id());

        if let Some(prop_set) = prop_set {
            prop_set.record_state(node.add_node(PROP_SET_OVERRIDE_NODE));
        }
        if let Some(material) = material {
            material.record_state(node.add_node(MATERIAL_OVERRIDE_NODE));
        }
        if let Some(map) = environment_map {
            map.record_state(node.add_node(ENVIRONMENT_MAP_OVERRIDE_NODE));
        }

        true
    }

    /// Finds this layer's node in a recorded document, by unique id first and by name second.
    pub fn find_state_node<'d>(&self, doc: &'d StateNode) -> Option<&'d StateNode> {
        let unique_id = self.unique_id();
        let by_id = doc
            .children_named(LAYER_NODE)
            .find(|node| node.parse_attribute::<u64>("id") == Some(unique_id));

        by_id.or_else(|| {
            let name = self.name();
            doc.children_named(LAYER_NODE)
                .find(|node| node.attribute("name") == Some(name.as_str()))
        })
    }

    /// Restores this layer from its recorded node. The layer is always made visible, and every
    /// override missing from the node (or all of them, without a node) gets cleared.
    ///
    /// Returns whether a node was given.
    pub fn restore_layer_state(&mut self, node: Option<&StateNode>) -> bool {
        let scene = self.scene();
        self.set_visible(true);

        let prop_set = node
            .and_then(|node| node.find_child(PROP_SET_OVERRIDE_NODE))
            .and_then(PropSet::from_state);
        self.set_prop_set_override(prop_set.as_ref());

        let material = node
            .and_then(|node| node.find_child(MATERIAL_OVERRIDE_NODE))
            .and_then(|node| SceneMaterial::from_state(scene, node));
        self.set_material_override(material.as_ref(), None);

        if self.is_world_layer() {
            let map = node
                .and_then(|node| node.find_child(ENVIRONMENT_MAP_OVERRIDE_NODE))
                .and_then(|node| SceneMap::from_state(scene, node));
            scene.set_environment_map_override(map.as_ref());
        }

        node.is_some()
    }
}

impl<'s> Group<'s> for Layer<'s> {
    fn scene(&self) -> &'s Scene {
        self.group.scene()
    }

    fn native_handle(&self) -> NativeHandle {
        self.group.native_handle()
    }

    fn override_state(&self) -> &OverrideState {
        self.group.override_state()
    }

    fn override_state_mut(&mut self) -> &mut OverrideState {
        self.group.override_state_mut()
    }

    /// Hides every other layer and shows this one, then notifies the scene.
    fn isolate(&self) -> bool {
        let scene = self.scene();
        let mut success = true;
        for layer in scene.layers() {
            success &= layer.set_visible(layer == *self);
        }
        scene.emit_layer_state_changed();
        success
    }

    /// Name of the layer group this layer belongs to, empty if it's not in any.
    fn group_name(&self) -> String {
        self.layer_group()
            .map(|group| group.group_name())
            .unwrap_or_default()
    }

    /// Moves the layer into the existing layer group called `name`.
    fn set_group_name(&self, name: &str) -> bool {
        match self.scene().find_layer_group(name) {
            Some(group) => self.set_layer_group(Some(&group)),
            None => false,
        }
    }

    /// The world layer can't be removed.
    fn remove(&self, remove_objects: bool) -> bool {
        if self.is_world_layer() {
            debug!("Refusing to remove the world layer");
            return false;
        }
        self.group.remove(remove_objects)
    }

    /// Applies a material override. If the material is in the alternate palette, the slot's
    /// flags and advanced state are used and the slot becomes current.
    fn set_material_override(
        &mut self,
        material: Option<&SceneMaterial<'_>>,
        options: Option<MaterialOverrideOptions>,
    ) -> bool {
        let Some(material) = material else {
            return self.clear_material_override();
        };

        let slot = self.index_of_alt_material(material);
        let (options, advanced) = match slot {
            Some(index) => (
                options.unwrap_or_else(|| self.alt_material_flags_at(index)),
                self.slot_advanced_state(index),
            ),
            None => (
                options.unwrap_or_else(|| self.material_override_flags()),
                None,
            ),
        };

        let applied = self
            .group
            .apply_material_override(material.native_handle(), options, advanced);
        if applied {
            self.current_alt_material = slot;
        }
        applied
    }

    fn clear_material_override(&mut self) -> bool {
        let cleared = self.group.clear_material_override();
        if cleared {
            self.current_alt_material = None;
        }
        cleared
    }

    fn set_prop_set_override(&mut self, prop_set: Option<&PropSet>) -> bool {
        let Some(prop_set) = prop_set else {
            return self.clear_prop_set_override();
        };

        let applied = self.group.set_prop_set_override(Some(prop_set));
        if applied {
            self.current_alt_prop_set = self.index_of_alt_prop_set(prop_set);
        }
        applied
    }

    fn clear_prop_set_override(&mut self) -> bool {
        let cleared = self.group.clear_prop_set_override();
        if cleared {
            self.current_alt_prop_set = None;
        }
        cleared
    }
}

impl PartialEq for Layer<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.native_handle() == other.native_handle()
    }
}

impl Eq for Layer<'_> {}

impl Debug for Layer<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Layer")
            .field("native", &self.native_handle())
            .field("current_alt_material", &self.current_alt_material)
            .field("current_alt_prop_set", &self.current_alt_prop_set)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        flags::MaterialSubstitution,
        host::LayerHooks,
        memory::MemoryHost,
        prop_set::PropValue,
        test_support::{lenient_scene, strict_scene},
    };
    use std::{cell::Cell, rc::Rc};

    struct Fixture {
        host: MemoryHost,
        layer: NativeHandle,
        chrome: NativeHandle,
        clay: NativeHandle,
        glass: NativeHandle,
    }

    /// A layer with two objects and three materials in the scene (but not in the palette).
    fn fixture() -> Fixture {
        let mut host = MemoryHost::new();
        let layer = host.add_layer("Props");
        for name in ["crate", "barrel"] {
            let object = host.add_object(name);
            host.assign(layer, object);
        }
        Fixture {
            layer,
            chrome: host.add_material("Chrome"),
            clay: host.add_material("Clay"),
            glass: host.add_material("Glass"),
            host,
        }
    }

    fn active_set(name: &str) -> PropSet {
        PropSet::new(name).with("castShadows", PropValue::Bool(false))
    }

    fn inactive_set(name: &str) -> PropSet {
        let mut prop_set = PropSet::new(name);
        prop_set.set("castShadows", PropValue::Bool(true), false);
        prop_set
    }

    #[test]
    pub fn selecting_alt_materials() {
        let f = fixture();
        let scene = strict_scene(f.host);
        let mut layer = scene.layer(f.layer);
        assert!(layer.add_alt_material(&scene.material(f.chrome)));
        assert!(layer.add_alt_material(&scene.material(f.clay)));
        assert!(layer.set_alt_material_flags_at(1, MaterialOverrideOptions::KEEP_OPACITY));

        assert_eq!(layer.set_current_alt_material_index(Some(1)), IndexChange::Applied);
        assert_eq!(layer.current_alt_material_index(), Some(1));
        assert_eq!(layer.current_alt_material(), layer.alt_material_at(1));
        assert_eq!(layer.material_override(), Some(scene.material(f.clay)));
        assert_eq!(
            layer.override_state().material.as_ref().unwrap().options,
            MaterialOverrideOptions::KEEP_OPACITY
        );

        // Same index again is a no-op, distinct from a failure
        assert_eq!(layer.set_current_alt_material_index(Some(1)), IndexChange::Unchanged);
        assert_eq!(layer.current_alt_material_index(), Some(1));

        assert_eq!(layer.set_current_alt_material_index(Some(7)), IndexChange::Failed);
        assert_eq!(layer.current_alt_material_index(), Some(1));

        assert_eq!(layer.set_current_alt_material_index(None), IndexChange::Applied);
        assert_eq!(layer.material_override(), None);
        assert_eq!(layer.current_alt_material(), None);
    }

    #[test]
    pub fn new_wrappers_can_pick_up_current_slots() {
        let f = fixture();
        let scene = strict_scene(f.host);
        let mut layer = scene.layer(f.layer);
        layer.add_alt_material(&scene.material(f.chrome));
        layer.add_alt_material(&scene.material(f.clay));
        layer.add_alt_prop_set(&active_set("P0"));
        assert!(layer.set_current_alt_material_index(Some(1)).is_applied());
        assert!(layer.set_current_alt_prop_set_index(Some(0)).is_applied());

        let mut fresh = scene.layer(f.layer);
        assert_eq!(fresh.current_alt_material_index(), None);
        fresh.sync_current_indices();
        assert_eq!(fresh.current_alt_material_index(), Some(1));
        assert_eq!(fresh.current_alt_prop_set_index(), Some(0));
        assert_eq!(fresh.set_current_alt_material_index(Some(1)), IndexChange::Unchanged);
    }

    #[test]
    pub fn alt_slot_advanced_state_is_applied() {
        let f = fixture();
        let scene = strict_scene(f.host);
        let mut layer = scene.layer(f.layer);
        layer.add_alt_material(&scene.material(f.chrome));

        let advanced: AdvancedMaterialState = [(
            f.glass,
            MaterialSubstitution {
                replacement: None,
                ignored: true,
            },
        )]
        .into_iter()
        .collect();
        assert!(layer.set_advanced_alt_material_state_at(0, &advanced));
        assert!(layer.has_advanced_alt_material_state_at(0));
        assert!(!layer.has_advanced_alt_material_state_at(1));
        assert_eq!(layer.advanced_alt_material_state_at(1), None);

        assert!(layer.set_current_alt_material_index(Some(0)).is_applied());
        assert_eq!(
            layer.override_state().material.as_ref().unwrap().advanced,
            Some(advanced)
        );
    }

    #[test]
    pub fn out_of_range_reads() {
        let f = fixture();
        let scene = strict_scene(f.host);
        let layer = scene.layer(f.layer);

        assert_eq!(layer.alt_material_count(), 0);
        assert_eq!(layer.alt_material_at(3), None);
        assert_eq!(layer.alt_prop_set_at(3), None);
        assert!(layer.alt_material_flags_at(3).is_empty());
        assert!(!layer.has_alt_material_flag_at(3, MaterialOverrideOptions::KEEP_BUMP));
    }

    #[test]
    pub fn define_is_first_writer_wins() {
        let f = fixture();
        let scene = strict_scene(f.host);
        let layer = scene.layer(f.layer);
        let chrome = scene.material(f.chrome);
        let clay = scene.material(f.clay);

        assert!(layer.define_alt_material_at(2, &chrome));
        assert_eq!(layer.alt_material_count(), 3);
        assert_eq!(layer.alt_material_at(2), Some(chrome));
        assert_eq!(layer.alt_material_at(0), None);

        assert!(!layer.define_alt_material_at(2, &clay));
        assert_eq!(layer.alt_material_at(2), Some(chrome));

        // Emptied slots can be defined again
        assert!(layer.set_alt_material_at(2, None));
        assert!(layer.define_alt_material_at(2, &clay));
        assert_eq!(layer.index_of_alt_material(&clay), Some(2));
        assert_eq!(layer.index_of_alt_material(&chrome), None);
    }

    #[test]
    pub fn removing_slots_keeps_the_palette_consistent() {
        let f = fixture();
        let scene = strict_scene(f.host);
        let mut layer = scene.layer(f.layer);
        for material in [f.chrome, f.clay, f.glass] {
            layer.add_alt_material(&scene.material(material));
        }
        layer.set_alt_material_flags(&[
            MaterialOverrideOptions::KEEP_OPACITY,
            MaterialOverrideOptions::KEEP_DISPLACEMENT,
            MaterialOverrideOptions::KEEP_BUMP,
        ]);
        layer.set_advanced_alt_material_state_at(0, &AdvancedMaterialState::new());
        layer.set_advanced_alt_material_state_at(2, &AdvancedMaterialState::new());
        assert!(layer.set_current_alt_material_index(Some(2)).is_applied());

        assert!(layer.remove_alt_material_at(0));
        assert_eq!(layer.alt_material_count(), 2);
        assert!(!layer.has_advanced_alt_material_state_at(0));
        assert!(layer.has_advanced_alt_material_state_at(1));
        assert_eq!(
            layer.alt_material_flags(),
            vec![
                MaterialOverrideOptions::KEEP_DISPLACEMENT,
                MaterialOverrideOptions::KEEP_BUMP
            ]
        );

        // The current slot followed its material
        assert_eq!(layer.current_alt_material_index(), Some(1));
        assert_eq!(layer.current_alt_material(), Some(scene.material(f.glass)));

        // Removing the current slot clears the override
        assert!(layer.remove_alt_material_at(1));
        assert_eq!(layer.current_alt_material_index(), None);
        assert_eq!(layer.material_override(), None);

        assert!(!layer.remove_alt_material_at(5));
        assert_eq!(layer.alt_material_count(), 1);
    }

    #[test]
    pub fn removing_slots_without_advanced_state_support() {
        let f = fixture();
        let scene = strict_scene(f.host.without_advanced_states());
        let mut layer = scene.layer(f.layer);
        layer.add_alt_material(&scene.material(f.chrome));
        layer.add_alt_material(&scene.material(f.clay));

        assert!(layer.set_current_alt_material_index(Some(1)).is_applied());
        assert_eq!(layer.override_state().material.as_ref().unwrap().advanced, None);

        assert!(layer.remove_alt_material_at(0));
        assert_eq!(layer.alt_material_count(), 1);
        assert_eq!(layer.current_alt_material_index(), Some(0));
        assert_eq!(layer.current_alt_material(), Some(scene.material(f.clay)));
    }

    #[test]
    pub fn failed_advanced_state_removal_keeps_the_slot() {
        let f = fixture();
        let scene = strict_scene(f.host.failing_hook("remove_advanced_alt_material_state_at"));
        let mut layer = scene.layer(f.layer);
        layer.add_alt_material(&scene.material(f.chrome));
        layer.add_alt_material(&scene.material(f.clay));
        let flags = vec![
            MaterialOverrideOptions::KEEP_OPACITY,
            MaterialOverrideOptions::KEEP_BUMP,
        ];
        layer.set_alt_material_flags(&flags);

        assert!(!layer.remove_alt_material_at(0));
        assert_eq!(layer.alt_material_count(), 2);
        assert_eq!(layer.alt_material_at(0), Some(scene.material(f.chrome)));
        assert_eq!(layer.alt_material_flags(), flags);
    }

    #[test]
    pub fn failed_flag_update_keeps_the_slot() {
        let mut f = fixture();
        let flags = [
            MaterialOverrideOptions::KEEP_OPACITY,
            MaterialOverrideOptions::KEEP_BUMP,
        ];
        f.host
            .set_native_alt_materials(f.layer, &[Some(f.chrome), Some(f.clay)])
            .unwrap();
        f.host.set_alt_material_flags(f.layer, &flags).unwrap();
        let scene = strict_scene(f.host.failing_hook("set_alt_material_flags"));
        let mut layer = scene.layer(f.layer);

        assert!(!layer.remove_alt_material_at(1));
        assert_eq!(layer.alt_material_count(), 2);
        assert_eq!(layer.alt_material_flags(), flags.to_vec());
    }

    #[test]
    pub fn current_slots_stay_while_their_override_does() {
        let f = fixture();
        let host = f
            .host
            .failing_hook("clear_native_material_override")
            .failing_hook("clear_native_prop_set_override");
        let scene = strict_scene(host);
        let mut layer = scene.layer(f.layer);
        layer.add_alt_material(&scene.material(f.chrome));
        layer.add_alt_prop_set(&active_set("P0"));
        assert!(layer.set_current_alt_material_index(Some(0)).is_applied());
        assert!(layer.set_current_alt_prop_set_index(Some(0)).is_applied());

        assert!(!layer.remove_alt_material_at(0));
        assert_eq!(layer.current_alt_material_index(), Some(0));
        assert_eq!(layer.alt_material_count(), 1);
        assert_eq!(layer.material_override(), Some(scene.material(f.chrome)));

        assert!(!layer.remove_alt_prop_set_at(0));
        assert_eq!(layer.current_alt_prop_set_index(), Some(0));
        assert_eq!(layer.alt_prop_set_count(), 1);
        assert_eq!(layer.prop_set_override(), Some(active_set("P0")));
    }

    #[test]
    pub fn empty_layers_keep_their_overrides() {
        let mut f = fixture();
        let lights = f.host.add_layer("Lights");
        let scene = strict_scene(f.host);
        let mut layer = scene.layer(lights);
        let chrome = scene.material(f.chrome);
        assert!(layer.is_empty());

        assert!(layer.set_material_override(Some(&chrome), None));
        assert_eq!(layer.material_override(), Some(chrome));

        let mut doc = StateNode::new("layerState");
        assert!(layer.record_layer_state(&mut doc));
        let node = layer.find_state_node(&doc);
        assert!(node.unwrap().find_child(MATERIAL_OVERRIDE_NODE).is_some());

        assert!(layer.clear_material_override());
        assert_eq!(layer.material_override(), None);
        assert!(layer.restore_layer_state(node));
        assert_eq!(layer.material_override(), Some(chrome));
    }

    #[test]
    pub fn alt_material_flag_bits() {
        let f = fixture();
        let scene = strict_scene(f.host);
        let layer = scene.layer(f.layer);

        assert!(layer.set_alt_material_flag_at(1, MaterialOverrideOptions::KEEP_BUMP, true));
        assert!(layer.has_alt_material_flag_at(1, MaterialOverrideOptions::KEEP_BUMP));
        assert!(layer.alt_material_flags_at(0).is_empty());

        assert!(layer.set_alt_material_flag_at(1, MaterialOverrideOptions::KEEP_OPACITY, false));
        assert_eq!(layer.alt_material_flags_at(1), MaterialOverrideOptions::KEEP_BUMP);
        assert!(layer.set_alt_material_flag_at(1, MaterialOverrideOptions::KEEP_BUMP, false));
        assert!(layer.alt_material_flags_at(1).is_empty());
    }

    #[test]
    pub fn palette_material_override_uses_slot_flags() {
        let f = fixture();
        let scene = strict_scene(f.host);
        let mut layer = scene.layer(f.layer);
        let clay = scene.material(f.clay);
        layer.add_alt_material(&scene.material(f.chrome));
        layer.add_alt_material(&clay);
        layer.set_alt_material_flags_at(1, MaterialOverrideOptions::KEEP_DISPLACEMENT);

        assert!(layer.set_material_override(Some(&clay), None));
        assert_eq!(layer.current_alt_material_index(), Some(1));
        assert_eq!(
            layer.override_state().material.as_ref().unwrap().options,
            MaterialOverrideOptions::KEEP_DISPLACEMENT
        );

        let glass = scene.material(f.glass);
        assert!(layer.set_material_override(Some(&glass), None));
        assert_eq!(layer.current_alt_material_index(), None);
        assert_eq!(layer.material_override(), Some(glass));
    }

    #[test]
    pub fn selecting_alt_prop_sets_requires_active_sets() {
        let f = fixture();
        let scene = strict_scene(f.host);
        let mut layer = scene.layer(f.layer);
        assert!(layer.set_alt_prop_sets(&[active_set("P0"), inactive_set("P1")]));

        assert!(layer.set_current_alt_prop_set_index(Some(1)).is_failed());
        assert_eq!(layer.current_alt_prop_set_index(), None);
        assert_eq!(layer.prop_set_override(), None);

        assert_eq!(layer.set_current_alt_prop_set_index(Some(0)), IndexChange::Applied);
        assert_eq!(layer.current_alt_prop_set_index(), Some(0));
        assert_eq!(layer.current_alt_prop_set(), Some(active_set("P0")));
        assert_eq!(layer.prop_set_override(), Some(active_set("P0")));

        assert_eq!(layer.set_current_alt_prop_set_index(Some(0)), IndexChange::Unchanged);
        assert_eq!(layer.set_current_alt_prop_set_index(Some(9)), IndexChange::Failed);
        assert_eq!(layer.current_alt_prop_set_index(), Some(0));
    }

    #[test]
    pub fn prop_set_palette() {
        let f = fixture();
        let scene = strict_scene(f.host);
        let mut layer = scene.layer(f.layer);

        assert!(layer.add_alt_prop_set(&inactive_set("P0")));
        assert!(layer.add_alt_prop_set(&active_set("P1")));
        assert_eq!(layer.alt_prop_set_count(), 2);
        assert_eq!(layer.index_of_alt_prop_set(&active_set("P1")), Some(1));

        // Inactive sets can be replaced, active ones can't
        assert!(layer.define_alt_prop_set_at(0, &active_set("P0")));
        assert!(!layer.define_alt_prop_set_at(1, &active_set("Other")));
        assert_eq!(layer.alt_prop_set_at(1), Some(active_set("P1")));

        assert!(layer.set_current_alt_prop_set_index(Some(1)).is_applied());
        assert!(layer.remove_alt_prop_set_at(0));
        assert_eq!(layer.current_alt_prop_set_index(), Some(0));
        assert!(layer.remove_alt_prop_set_at(0));
        assert_eq!(layer.current_alt_prop_set_index(), None);
        assert_eq!(layer.prop_set_override(), None);
        assert!(!layer.remove_alt_prop_set_at(0));
    }

    #[test]
    pub fn isolate_hides_other_layers() {
        let mut f = fixture();
        let other = f.host.add_layer("Background");
        let scene = strict_scene(f.host);
        let notified = Rc::new(Cell::new(false));
        let flag = notified.clone();
        scene.on_layer_state_changed(move || flag.set(true));

        scene.layer(other).set_visible(false);
        assert!(scene.layer(other).isolate());

        assert!(scene.layer(other).is_visible());
        assert!(!scene.layer(f.layer).is_visible());
        assert!(!scene.world_layer().unwrap().is_visible());
        assert!(notified.get());
    }

    #[test]
    pub fn world_layer_cannot_be_removed() {
        let f = fixture();
        let scene = strict_scene(f.host);

        let world = scene.world_layer().unwrap();
        assert!(!world.remove(false));
        assert_eq!(scene.layers().len(), 2);

        assert!(scene.layer(f.layer).remove(false));
        assert_eq!(scene.layers().len(), 1);
    }

    #[test]
    pub fn active_layer_is_exclusive() {
        let f = fixture();
        let scene = strict_scene(f.host);

        assert!(scene.layer(f.layer).set_active(true));
        assert!(scene.layer(f.layer).is_active());
        assert!(!scene.world_layer().unwrap().is_active());
        assert_eq!(scene.active_layer(), Some(scene.layer(f.layer)));
    }

    #[test]
    pub fn layer_groups() {
        let mut f = fixture();
        let characters = f.host.add_layer_group("Characters");
        let second = f.host.add_layer("Hero");
        let scene = strict_scene(f.host);
        let props = scene.layer(f.layer);
        let hero = scene.layer(second);

        assert_eq!(props.group_name(), "");
        assert!(props.set_group_name("Characters"));
        assert!(!props.set_group_name("Vehicles"));
        assert_eq!(props.group_name(), "Characters");

        let group = LayerGroup::new(&scene, characters);
        assert!(hero.set_layer_group(Some(&group)));
        assert!(hero.set_layer_group_order(0));
        assert!(props.set_layer_group_order(1));
        assert_eq!(group.layers(), vec![hero.clone(), props.clone()]);

        assert!(props.set_layer_group(None));
        assert_eq!(props.layer_group(), None);
        assert_eq!(group.layers(), vec![hero]);
    }

    #[test]
    pub fn wire_color() {
        let f = fixture();
        let scene = strict_scene(f.host);
        let layer = scene.layer(f.layer);
        let red = RGBA8::new(255, 0, 0, 255);

        assert!(layer.set_wire_color(red));
        assert_eq!(layer.wire_color(), Some(red));
    }

    #[test]
    pub fn record_and_restore_round_trip() {
        let f = fixture();
        let scene = strict_scene(f.host);
        let mut layer = scene.layer(f.layer);
        let matte = active_set("matte");
        layer.set_material_override(Some(&scene.material(f.chrome)), None);
        layer.set_prop_set_override(Some(&matte));

        let mut doc = StateNode::new("layerState");
        assert!(layer.record_layer_state(&mut doc));
        assert_eq!(doc.children_named(LAYER_NODE).count(), 1);

        layer.set_material_override(Some(&scene.material(f.clay)), None);
        layer.clear_prop_set_override();

        let mut fresh = scene.layer(f.layer);
        let node = fresh.find_state_node(&doc);
        assert!(fresh.restore_layer_state(node));
        assert_eq!(fresh.material_override(), Some(scene.material(f.chrome)));
        assert_eq!(fresh.prop_set_override(), Some(matte));
        assert_eq!(Layer::from_state(&scene, node.unwrap()), Some(fresh));
    }

    #[test]
    pub fn hidden_layers_are_reset_on_restore() {
        let f = fixture();
        let scene = strict_scene(f.host);
        let mut layer = scene.layer(f.layer);
        layer.set_material_override(Some(&scene.material(f.chrome)), None);
        layer.set_prop_set_override(Some(&active_set("matte")));
        layer.set_visible(false);

        let mut doc = StateNode::new("layerState");
        assert!(!layer.record_layer_state(&mut doc));
        assert!(layer.find_state_node(&doc).is_none());

        assert_eq!(scene.restore_layer_states(&doc), 0);
        assert!(layer.is_visible());
        assert_eq!(layer.material_override(), None);
        assert_eq!(layer.prop_set_override(), None);
    }

    #[test]
    pub fn world_layer_records_environment_map() {
        let mut f = fixture();
        let sky = f.host.add_map("Sky");
        let scene = strict_scene(f.host);
        assert!(scene.set_environment_map_override(Some(&scene.map(sky))));

        let mut doc = StateNode::new("layerState");
        assert_eq!(scene.record_layer_states(&mut doc), 2);

        scene.set_environment_map_override(None);
        assert_eq!(scene.restore_layer_states(&doc), 2);
        assert_eq!(scene.environment_map_override(), Some(scene.map(sky)));

        let props = doc
            .children_named(LAYER_NODE)
            .find(|node| node.attribute("name") == Some("Props"))
            .unwrap();
        assert!(props.find_child(ENVIRONMENT_MAP_OVERRIDE_NODE).is_none());
    }

    #[test]
    pub fn state_nodes_match_by_name_as_fallback() {
        let f = fixture();
        let scene = strict_scene(f.host);
        let layer = scene.layer(f.layer);

        let mut doc = StateNode::new("layerState");
        let node = doc.add_node(LAYER_NODE);
        node.set_attribute("name", "Props");
        node.set_attribute("id", 987654);

        assert!(layer.find_state_node(&doc).is_some());
    }

    #[test]
    pub fn missing_palette_hooks_degrade() {
        let f = fixture();
        let scene = lenient_scene(f.host.without_alt_palettes());
        let mut layer = scene.layer(f.layer);

        assert!(layer.alt_materials().is_empty());
        assert!(!layer.add_alt_material(&scene.material(f.chrome)));
        assert!(layer.set_current_alt_material_index(Some(0)).is_failed());
        assert!(layer.alt_prop_sets().is_empty());
    }
}
