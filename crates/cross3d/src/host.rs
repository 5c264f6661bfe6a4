//! Host hooks
//!
//! A host integration (one per DCC application) implements these traits to give the core access
//! to its native scene. Everything is keyed by [`NativeHandle`]s, the host is free to decide what
//! a handle actually points at.
//!
//! Hooks without a default body must be provided by every host. Hooks with a default body cover
//! capabilities a host may legitimately lack; their default returns
//! [`HookError::NotImplemented`], which the scene then handles according to its
//! [`HookPolicy`](crate::HookPolicy).
//!
//! Hooks are only ever called one at a time and never re-entrantly, so implementations don't
//! need to call back into the [`Scene`](crate::Scene).

use crate::{
    error::{HookError, HookResult},
    flags::{AdvancedMaterialState, MaterialOverrideOptions},
    prop_set::PropSet,
    NativeColor, NativeHandle,
};
use cross3d_utils::color::RGBA8;
use std::any::Any;

macro_rules! not_implemented {
    ($hook:literal) => {
        Err(HookError::NotImplemented($hook))
    };
}

/// Scene-wide operations the core calls outward.
pub trait SceneHooks {
    /// Returns the objects currently selected in the application.
    fn native_selection(&self) -> HookResult<Vec<NativeHandle>>;

    /// Adds the objects to (or removes them from) the selection.
    fn set_native_selection(&mut self, objects: &[NativeHandle], state: bool) -> HookResult;

    fn hide_native_objects(&mut self, objects: &[NativeHandle], state: bool) -> HookResult;

    fn freeze_native_objects(&mut self, objects: &[NativeHandle], state: bool) -> HookResult;

    /// Hides everything except the given objects.
    fn isolate_native_objects(&mut self, objects: &[NativeHandle]) -> HookResult;

    /// Replaces the material of every object of `group` with `material`. `objects` are the
    /// group's current members. Must be idempotent, applying the same material with the same
    /// options twice leaves the scene as if it was applied once.
    ///
    /// Groups without members still hold on to the override, it's reported back by
    /// [`GroupHooks::native_material_override`].
    fn set_native_material_override(
        &mut self,
        group: NativeHandle,
        objects: &[NativeHandle],
        material: NativeHandle,
        options: MaterialOverrideOptions,
        advanced: Option<&AdvancedMaterialState>,
    ) -> HookResult;

    /// Restores the original materials of every object of `group`.
    fn clear_native_material_override(
        &mut self,
        group: NativeHandle,
        objects: &[NativeHandle],
    ) -> HookResult;

    fn set_native_prop_set_override(
        &mut self,
        group: NativeHandle,
        objects: &[NativeHandle],
        prop_set: &PropSet,
    ) -> HookResult;

    fn clear_native_prop_set_override(
        &mut self,
        group: NativeHandle,
        objects: &[NativeHandle],
    ) -> HookResult;

    /// Returns every layer of the scene, world layer included.
    fn native_layers(&self) -> HookResult<Vec<NativeHandle>>;

    fn native_atmospherics(&self) -> HookResult<Vec<NativeHandle>> {
        not_implemented!("native_atmospherics")
    }

    /// Display name of any native entity.
    fn native_name(&self, handle: NativeHandle) -> HookResult<String>;

    /// Persistent unique id of any native entity.
    fn native_unique_id(&self, handle: NativeHandle) -> HookResult<u64>;

    /// Looks up a layer by name or unique id.
    fn find_native_layer(&self, name: &str, unique_id: u64) -> HookResult<Option<NativeHandle>>;

    fn find_native_atmospheric(
        &self,
        name: &str,
        unique_id: u64,
    ) -> HookResult<Option<NativeHandle>> {
        let _ = (name, unique_id);
        not_implemented!("find_native_atmospheric")
    }

    fn find_native_layer_group(&self, name: &str) -> HookResult<Option<NativeHandle>> {
        let _ = name;
        not_implemented!("find_native_layer_group")
    }

    fn find_native_material(&self, name: &str, unique_id: u64) -> HookResult<Option<NativeHandle>>;

    fn find_native_map(&self, name: &str, unique_id: u64) -> HookResult<Option<NativeHandle>> {
        let _ = (name, unique_id);
        not_implemented!("find_native_map")
    }

    fn to_native_color(&self, color: RGBA8) -> HookResult<NativeColor>;

    fn from_native_color(&self, color: NativeColor) -> HookResult<RGBA8>;

    /// Called whenever layer visibility/overrides change in bulk, so the host can refresh its UI.
    fn layer_state_changed(&mut self) -> HookResult {
        Ok(())
    }

    fn native_environment_map_override(&self) -> HookResult<Option<NativeHandle>> {
        not_implemented!("native_environment_map_override")
    }

    fn set_native_environment_map_override(&mut self, map: Option<NativeHandle>) -> HookResult {
        let _ = map;
        not_implemented!("set_native_environment_map_override")
    }
}

/// Hooks of native object groupings. Layers are groupings as well, so these get called with layer
/// handles too.
pub trait GroupHooks {
    /// Returns the objects currently in the group. Called on demand, never cached by the core.
    fn native_objects(&self, group: NativeHandle) -> HookResult<Vec<NativeHandle>>;

    fn add_native_objects(&mut self, group: NativeHandle, objects: &[NativeHandle]) -> HookResult {
        let _ = (group, objects);
        not_implemented!("add_native_objects")
    }

    fn clear_native_objects(&mut self, group: NativeHandle) -> HookResult {
        let _ = group;
        not_implemented!("clear_native_objects")
    }

    /// Returns the material override last applied to the group.
    fn native_material_override(&self, group: NativeHandle) -> HookResult<Option<NativeHandle>>;

    /// Returns the property set override last applied to the group.
    fn native_prop_set_override(&self, group: NativeHandle) -> HookResult<Option<PropSet>>;

    fn is_hidden(&self, group: NativeHandle) -> HookResult<bool>;

    fn is_frozen(&self, group: NativeHandle) -> HookResult<bool>;

    fn group_name(&self, group: NativeHandle) -> HookResult<String> {
        let _ = group;
        not_implemented!("group_name")
    }

    fn set_group_name(&mut self, group: NativeHandle, name: &str) -> HookResult {
        let _ = (group, name);
        not_implemented!("set_group_name")
    }

    /// Removes the grouping from the scene, along with its objects if `remove_objects` is set.
    fn remove_group(&mut self, group: NativeHandle, remove_objects: bool) -> HookResult {
        let _ = (group, remove_objects);
        not_implemented!("remove_group")
    }
}

/// Layer specific hooks.
pub trait LayerHooks {
    fn is_world_layer(&self, layer: NativeHandle) -> HookResult<bool>;

    fn is_layer_visible(&self, layer: NativeHandle) -> HookResult<bool>;

    fn set_layer_visible(&mut self, layer: NativeHandle, state: bool) -> HookResult;

    /// The host must guarantee that at most one layer is active at a time.
    fn is_active_layer(&self, layer: NativeHandle) -> HookResult<bool> {
        let _ = layer;
        not_implemented!("is_active_layer")
    }

    fn set_active_layer(&mut self, layer: NativeHandle, state: bool) -> HookResult {
        let _ = (layer, state);
        not_implemented!("set_active_layer")
    }

    fn native_alt_materials(&self, layer: NativeHandle) -> HookResult<Vec<Option<NativeHandle>>> {
        let _ = layer;
        not_implemented!("native_alt_materials")
    }

    /// Sets a single alternate material slot, growing the palette if `index` is past its end.
    fn set_native_alt_material_at(
        &mut self,
        layer: NativeHandle,
        index: usize,
        material: Option<NativeHandle>,
    ) -> HookResult {
        let _ = (layer, index, material);
        not_implemented!("set_native_alt_material_at")
    }

    fn set_native_alt_materials(
        &mut self,
        layer: NativeHandle,
        materials: &[Option<NativeHandle>],
    ) -> HookResult {
        let _ = (layer, materials);
        not_implemented!("set_native_alt_materials")
    }

    fn alt_material_flags(&self, layer: NativeHandle) -> HookResult<Vec<MaterialOverrideOptions>> {
        let _ = layer;
        not_implemented!("alt_material_flags")
    }

    fn set_alt_material_flags(
        &mut self,
        layer: NativeHandle,
        flags: &[MaterialOverrideOptions],
    ) -> HookResult {
        let _ = (layer, flags);
        not_implemented!("set_alt_material_flags")
    }

    fn advanced_alt_material_state_at(
        &self,
        layer: NativeHandle,
        index: usize,
    ) -> HookResult<AdvancedMaterialState> {
        let _ = (layer, index);
        not_implemented!("advanced_alt_material_state_at")
    }

    fn has_advanced_alt_material_state_at(
        &self,
        layer: NativeHandle,
        index: usize,
    ) -> HookResult<bool> {
        let _ = (layer, index);
        not_implemented!("has_advanced_alt_material_state_at")
    }

    fn set_advanced_alt_material_state_at(
        &mut self,
        layer: NativeHandle,
        index: usize,
        state: &AdvancedMaterialState,
    ) -> HookResult {
        let _ = (layer, index, state);
        not_implemented!("set_advanced_alt_material_state_at")
    }

    /// Removes the advanced state of a slot that is being removed. States of later slots move
    /// down by one, following their slots.
    fn remove_advanced_alt_material_state_at(
        &mut self,
        layer: NativeHandle,
        index: usize,
    ) -> HookResult {
        let _ = (layer, index);
        not_implemented!("remove_advanced_alt_material_state_at")
    }

    fn alt_prop_sets(&self, layer: NativeHandle) -> HookResult<Vec<PropSet>> {
        let _ = layer;
        not_implemented!("alt_prop_sets")
    }

    fn set_alt_prop_set_at(
        &mut self,
        layer: NativeHandle,
        index: usize,
        prop_set: &PropSet,
    ) -> HookResult {
        let _ = (layer, index, prop_set);
        not_implemented!("set_alt_prop_set_at")
    }

    fn set_alt_prop_sets(&mut self, layer: NativeHandle, prop_sets: &[PropSet]) -> HookResult {
        let _ = (layer, prop_sets);
        not_implemented!("set_alt_prop_sets")
    }

    fn native_layer_group(&self, layer: NativeHandle) -> HookResult<Option<NativeHandle>> {
        let _ = layer;
        not_implemented!("native_layer_group")
    }

    fn set_native_layer_group(
        &mut self,
        layer: NativeHandle,
        group: Option<NativeHandle>,
    ) -> HookResult {
        let _ = (layer, group);
        not_implemented!("set_native_layer_group")
    }

    fn layer_group_order(&self, layer: NativeHandle) -> HookResult<i32> {
        let _ = layer;
        not_implemented!("layer_group_order")
    }

    fn set_layer_group_order(&mut self, layer: NativeHandle, order: i32) -> HookResult {
        let _ = (layer, order);
        not_implemented!("set_layer_group_order")
    }

    fn native_wire_color(&self, layer: NativeHandle) -> HookResult<Option<NativeColor>> {
        let _ = layer;
        not_implemented!("native_wire_color")
    }

    fn set_native_wire_color(&mut self, layer: NativeHandle, color: NativeColor) -> HookResult {
        let _ = (layer, color);
        not_implemented!("set_native_wire_color")
    }
}

/// Atmospheric specific hooks.
pub trait AtmosphericHooks {
    fn is_atmospheric_enabled(&self, atmospheric: NativeHandle) -> HookResult<bool>;

    fn set_atmospheric_enabled(&mut self, atmospheric: NativeHandle, state: bool) -> HookResult;

    /// Returns the layer the atmospheric belongs to, if any.
    fn native_atmospheric_layer(
        &self,
        atmospheric: NativeHandle,
    ) -> HookResult<Option<NativeHandle>>;
}

/// A complete host integration. Implemented automatically for anything implementing all of the
/// hook traits.
pub trait Host: SceneHooks + GroupHooks + LayerHooks + AtmosphericHooks + Any {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T> Host for T
where
    T: SceneHooks + GroupHooks + LayerHooks + AtmosphericHooks + Any,
{
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
