use super::{sorted, MemoryHost, MemoryLayer, MemoryObject, MemoryOverrides};
use crate::{
    error::{HookError, HookResult},
    flags::{AdvancedMaterialState, MaterialOverrideOptions},
    group::AppliedOverride,
    host::{AtmosphericHooks, GroupHooks, LayerHooks, SceneHooks},
    prop_set::PropSet,
    NativeColor, NativeHandle,
};
use cross3d_utils::color::RGBA8;

fn unknown(hook: &'static str, handle: NativeHandle) -> HookError {
    HookError::failed(hook, format!("unknown handle {handle}"))
}

impl MemoryHost {
    fn objects_mut(
        &mut self,
        hook: &'static str,
        handles: &[NativeHandle],
        mut f: impl FnMut(&mut MemoryObject),
    ) -> HookResult {
        if let Some(&missing) = handles.iter().find(|h| !self.objects.contains_key(h)) {
            return Err(unknown(hook, missing));
        }
        for handle in handles {
            if let Some(object) = self.objects.get_mut(handle) {
                f(object);
            }
        }
        Ok(())
    }

    fn members_of(&self, hook: &'static str, group: NativeHandle) -> HookResult<Vec<NativeHandle>> {
        self.members(group).ok_or_else(|| unknown(hook, group))
    }

    fn layer_ref(&self, hook: &'static str, layer: NativeHandle) -> HookResult<&MemoryLayer> {
        self.layers.get(&layer).ok_or_else(|| unknown(hook, layer))
    }

    fn layer_mut(
        &mut self,
        hook: &'static str,
        layer: NativeHandle,
    ) -> HookResult<&mut MemoryLayer> {
        self.layers.get_mut(&layer).ok_or_else(|| unknown(hook, layer))
    }

    /// Palette hooks are the same set of checks every time.
    fn palette(&self, hook: &'static str, layer: NativeHandle) -> HookResult<&MemoryLayer> {
        if !self.capabilities.alt_palettes {
            return Err(HookError::NotImplemented(hook));
        }
        self.layer_ref(hook, layer)
    }

    fn palette_mut(
        &mut self,
        hook: &'static str,
        layer: NativeHandle,
    ) -> HookResult<&mut MemoryLayer> {
        if !self.capabilities.alt_palettes {
            return Err(HookError::NotImplemented(hook));
        }
        self.layer_mut(hook, layer)
    }

    fn advanced(&self, hook: &'static str, layer: NativeHandle) -> HookResult<&MemoryLayer> {
        if !self.capabilities.advanced_states {
            return Err(HookError::NotImplemented(hook));
        }
        self.palette(hook, layer)
    }

    fn advanced_mut(
        &mut self,
        hook: &'static str,
        layer: NativeHandle,
    ) -> HookResult<&mut MemoryLayer> {
        if !self.capabilities.advanced_states {
            return Err(HookError::NotImplemented(hook));
        }
        self.palette_mut(hook, layer)
    }

    fn overrides(&self, hook: &'static str, group: NativeHandle) -> HookResult<&MemoryOverrides> {
        if let Some(layer) = self.layers.get(&group) {
            Ok(&layer.overrides)
        } else if let Some(group) = self.groups.get(&group) {
            Ok(&group.overrides)
        } else {
            Err(unknown(hook, group))
        }
    }

    /// Validates the objects first, then applies `f` to them and `record` to the container's
    /// overrides.
    fn apply_overrides(
        &mut self,
        hook: &'static str,
        group: NativeHandle,
        objects: &[NativeHandle],
        f: impl FnMut(&mut MemoryObject),
        record: impl FnOnce(&mut MemoryOverrides),
    ) -> HookResult {
        self.overrides(hook, group)?;
        self.objects_mut(hook, objects, f)?;

        let overrides = match self.layers.get_mut(&group) {
            Some(layer) => &mut layer.overrides,
            None => match self.groups.get_mut(&group) {
                Some(group) => &mut group.overrides,
                None => return Err(unknown(hook, group)),
            },
        };
        record(overrides);
        Ok(())
    }

    fn check_failure(&self, hook: &'static str) -> HookResult {
        if self.failing_hooks.contains(&hook) {
            Err(HookError::failed(hook, "failure requested by the test setup"))
        } else {
            Ok(())
        }
    }

    fn check_layer_groups(&self, hook: &'static str) -> HookResult {
        if self.capabilities.layer_groups {
            Ok(())
        } else {
            Err(HookError::NotImplemented(hook))
        }
    }

    fn check_membership(&self, hook: &'static str) -> HookResult {
        if self.capabilities.membership_changes {
            Ok(())
        } else {
            Err(HookError::NotImplemented(hook))
        }
    }

    fn check_material(&self, hook: &'static str, material: NativeHandle) -> HookResult {
        if self.materials.contains(&material) {
            Ok(())
        } else {
            Err(unknown(hook, material))
        }
    }
}

impl SceneHooks for MemoryHost {
    fn native_selection(&self) -> HookResult<Vec<NativeHandle>> {
        Ok(sorted(
            self.objects
                .iter()
                .filter(|(_, object)| object.selected)
                .map(|(&handle, _)| handle),
        ))
    }

    fn set_native_selection(&mut self, objects: &[NativeHandle], state: bool) -> HookResult {
        self.check_failure("set_native_selection")?;
        self.objects_mut("set_native_selection", objects, |o| o.selected = state)
    }

    fn hide_native_objects(&mut self, objects: &[NativeHandle], state: bool) -> HookResult {
        self.check_failure("hide_native_objects")?;
        self.objects_mut("hide_native_objects", objects, |o| o.hidden = state)
    }

    fn freeze_native_objects(&mut self, objects: &[NativeHandle], state: bool) -> HookResult {
        self.check_failure("freeze_native_objects")?;
        self.objects_mut("freeze_native_objects", objects, |o| o.frozen = state)
    }

    fn isolate_native_objects(&mut self, objects: &[NativeHandle]) -> HookResult {
        self.check_failure("isolate_native_objects")?;
        if let Some(&missing) = objects.iter().find(|h| !self.objects.contains_key(h)) {
            return Err(unknown("isolate_native_objects", missing));
        }
        for (handle, object) in self.objects.iter_mut() {
            object.hidden = !objects.contains(handle);
        }
        Ok(())
    }

    fn set_native_material_override(
        &mut self,
        group: NativeHandle,
        objects: &[NativeHandle],
        material: NativeHandle,
        options: MaterialOverrideOptions,
        advanced: Option<&AdvancedMaterialState>,
    ) -> HookResult {
        const HOOK: &str = "set_native_material_override";
        self.check_failure(HOOK)?;
        self.check_material(HOOK, material)?;

        let applied = AppliedOverride {
            material,
            options,
            advanced: advanced.cloned(),
        };
        let recorded = applied.clone();
        self.apply_overrides(
            HOOK,
            group,
            objects,
            |o| o.material_override = Some(applied.clone()),
            |overrides| overrides.material = Some(recorded),
        )
    }

    fn clear_native_material_override(
        &mut self,
        group: NativeHandle,
        objects: &[NativeHandle],
    ) -> HookResult {
        self.check_failure("clear_native_material_override")?;
        self.apply_overrides(
            "clear_native_material_override",
            group,
            objects,
            |o| o.material_override = None,
            |overrides| overrides.material = None,
        )
    }

    fn set_native_prop_set_override(
        &mut self,
        group: NativeHandle,
        objects: &[NativeHandle],
        prop_set: &PropSet,
    ) -> HookResult {
        self.check_failure("set_native_prop_set_override")?;
        self.apply_overrides(
            "set_native_prop_set_override",
            group,
            objects,
            |o| o.prop_set_override = Some(prop_set.clone()),
            |overrides| overrides.prop_set = Some(prop_set.clone()),
        )
    }

    fn clear_native_prop_set_override(
        &mut self,
        group: NativeHandle,
        objects: &[NativeHandle],
    ) -> HookResult {
        self.check_failure("clear_native_prop_set_override")?;
        self.apply_overrides(
            "clear_native_prop_set_override",
            group,
            objects,
            |o| o.prop_set_override = None,
            |overrides| overrides.prop_set = None,
        )
    }

    fn native_layers(&self) -> HookResult<Vec<NativeHandle>> {
        Ok(sorted(self.layers.keys().copied()))
    }

    fn native_atmospherics(&self) -> HookResult<Vec<NativeHandle>> {
        Ok(sorted(self.atmospherics.keys().copied()))
    }

    fn native_name(&self, handle: NativeHandle) -> HookResult<String> {
        self.names
            .get(&handle)
            .map(|named| named.name.clone())
            .ok_or_else(|| unknown("native_name", handle))
    }

    fn native_unique_id(&self, handle: NativeHandle) -> HookResult<u64> {
        self.names
            .get(&handle)
            .map(|named| named.unique_id)
            .ok_or_else(|| unknown("native_unique_id", handle))
    }

    fn find_native_layer(&self, name: &str, unique_id: u64) -> HookResult<Option<NativeHandle>> {
        Ok(self.find_named(sorted(self.layers.keys().copied()), name, unique_id))
    }

    fn find_native_atmospheric(
        &self,
        name: &str,
        unique_id: u64,
    ) -> HookResult<Option<NativeHandle>> {
        Ok(self.find_named(sorted(self.atmospherics.keys().copied()), name, unique_id))
    }

    fn find_native_layer_group(&self, name: &str) -> HookResult<Option<NativeHandle>> {
        self.check_layer_groups("find_native_layer_group")?;
        Ok(self.find_named(self.layer_groups.iter().copied(), name, 0))
    }

    fn find_native_material(&self, name: &str, unique_id: u64) -> HookResult<Option<NativeHandle>> {
        Ok(self.find_named(self.materials.iter().copied(), name, unique_id))
    }

    fn find_native_map(&self, name: &str, unique_id: u64) -> HookResult<Option<NativeHandle>> {
        Ok(self.find_named(self.maps.iter().copied(), name, unique_id))
    }

    fn to_native_color(&self, color: RGBA8) -> HookResult<NativeColor> {
        Ok(NativeColor(color.to_argb()))
    }

    fn from_native_color(&self, color: NativeColor) -> HookResult<RGBA8> {
        Ok(RGBA8::from_argb(color.0))
    }

    fn layer_state_changed(&mut self) -> HookResult {
        self.check_failure("layer_state_changed")?;
        self.layer_state_changes += 1;
        Ok(())
    }

    fn native_environment_map_override(&self) -> HookResult<Option<NativeHandle>> {
        Ok(self.environment_map)
    }

    fn set_native_environment_map_override(&mut self, map: Option<NativeHandle>) -> HookResult {
        self.check_failure("set_native_environment_map_override")?;
        if let Some(map) = map.filter(|map| !self.maps.contains(map)) {
            return Err(unknown("set_native_environment_map_override", map));
        }
        self.environment_map = map;
        Ok(())
    }
}

impl GroupHooks for MemoryHost {
    fn native_objects(&self, group: NativeHandle) -> HookResult<Vec<NativeHandle>> {
        self.members_of("native_objects", group)
    }

    fn add_native_objects(&mut self, group: NativeHandle, objects: &[NativeHandle]) -> HookResult {
        const HOOK: &str = "add_native_objects";
        self.check_failure(HOOK)?;
        self.check_membership(HOOK)?;
        self.members_of(HOOK, group)?;
        if let Some(&missing) = objects.iter().find(|h| !self.objects.contains_key(h)) {
            return Err(unknown(HOOK, missing));
        }

        for &object in objects {
            self.assign(group, object);
        }
        Ok(())
    }

    fn clear_native_objects(&mut self, group: NativeHandle) -> HookResult {
        const HOOK: &str = "clear_native_objects";
        self.check_failure(HOOK)?;
        self.check_membership(HOOK)?;
        let members = self.members_of(HOOK, group)?;

        if let Some(group) = self.groups.get_mut(&group) {
            group.objects.clear();
        } else {
            // Objects always live on some layer, cleared layers hand theirs to the world layer
            let world = self.world_layer;
            self.objects_mut(HOOK, &members, |o| o.layer = world)?;
        }
        Ok(())
    }

    fn native_material_override(&self, group: NativeHandle) -> HookResult<Option<NativeHandle>> {
        let overrides = self.overrides("native_material_override", group)?;
        Ok(overrides.material.as_ref().map(|applied| applied.material))
    }

    fn native_prop_set_override(&self, group: NativeHandle) -> HookResult<Option<PropSet>> {
        let overrides = self.overrides("native_prop_set_override", group)?;
        Ok(overrides.prop_set.clone())
    }

    fn is_hidden(&self, group: NativeHandle) -> HookResult<bool> {
        let members = self.members_of("is_hidden", group)?;
        if let Some(layer) = self.layers.get(&group) {
            if !layer.visible {
                return Ok(true);
            }
        }
        Ok(!members.is_empty()
            && members
                .iter()
                .all(|h| self.objects.get(h).map_or(false, |o| o.hidden)))
    }

    fn is_frozen(&self, group: NativeHandle) -> HookResult<bool> {
        let members = self.members_of("is_frozen", group)?;
        Ok(!members.is_empty()
            && members
                .iter()
                .all(|h| self.objects.get(h).map_or(false, |o| o.frozen)))
    }

    fn group_name(&self, group: NativeHandle) -> HookResult<String> {
        self.members_of("group_name", group)?;
        self.native_name(group)
    }

    fn set_group_name(&mut self, group: NativeHandle, name: &str) -> HookResult {
        self.check_failure("set_group_name")?;
        self.members_of("set_group_name", group)?;
        match self.names.get_mut(&group) {
            Some(named) => {
                named.name = name.to_string();
                Ok(())
            }
            None => Err(unknown("set_group_name", group)),
        }
    }

    fn remove_group(&mut self, group: NativeHandle, remove_objects: bool) -> HookResult {
        const HOOK: &str = "remove_group";
        self.check_failure(HOOK)?;
        let members = self.members_of(HOOK, group)?;
        if group == self.world_layer {
            return Err(HookError::failed(HOOK, "the world layer can't be removed"));
        }

        if remove_objects {
            self.remove_objects(&members);
        } else if self.layers.contains_key(&group) {
            let world = self.world_layer;
            self.objects_mut(HOOK, &members, |o| o.layer = world)?;
        }

        if self.layers.remove(&group).is_some() {
            if self.active_layer == group {
                self.active_layer = self.world_layer;
            }
            for atmospheric in self.atmospherics.values_mut() {
                if atmospheric.layer == Some(group) {
                    atmospheric.layer = None;
                }
            }
        }
        self.groups.remove(&group);
        self.names.remove(&group);
        Ok(())
    }
}

impl LayerHooks for MemoryHost {
    fn is_world_layer(&self, layer: NativeHandle) -> HookResult<bool> {
        Ok(self.layer_ref("is_world_layer", layer)?.world)
    }

    fn is_layer_visible(&self, layer: NativeHandle) -> HookResult<bool> {
        Ok(self.layer_ref("is_layer_visible", layer)?.visible)
    }

    fn set_layer_visible(&mut self, layer: NativeHandle, state: bool) -> HookResult {
        self.check_failure("set_layer_visible")?;
        self.layer_mut("set_layer_visible", layer)?.visible = state;
        Ok(())
    }

    fn is_active_layer(&self, layer: NativeHandle) -> HookResult<bool> {
        self.layer_ref("is_active_layer", layer)?;
        Ok(self.active_layer == layer)
    }

    fn set_active_layer(&mut self, layer: NativeHandle, state: bool) -> HookResult {
        self.check_failure("set_active_layer")?;
        self.layer_ref("set_active_layer", layer)?;
        if state {
            self.active_layer = layer;
        } else if self.active_layer == layer {
            self.active_layer = self.world_layer;
        }
        Ok(())
    }

    fn native_alt_materials(&self, layer: NativeHandle) -> HookResult<Vec<Option<NativeHandle>>> {
        Ok(self.palette("native_alt_materials", layer)?.alt_materials.clone())
    }

    fn set_native_alt_material_at(
        &mut self,
        layer: NativeHandle,
        index: usize,
        material: Option<NativeHandle>,
    ) -> HookResult {
        const HOOK: &str = "set_native_alt_material_at";
        self.check_failure(HOOK)?;
        if let Some(material) = material {
            self.check_material(HOOK, material)?;
        }

        let materials = &mut self.palette_mut(HOOK, layer)?.alt_materials;
        if materials.len() <= index {
            materials.resize(index + 1, None);
        }
        materials[index] = material;
        Ok(())
    }

    fn set_native_alt_materials(
        &mut self,
        layer: NativeHandle,
        materials: &[Option<NativeHandle>],
    ) -> HookResult {
        const HOOK: &str = "set_native_alt_materials";
        self.check_failure(HOOK)?;
        for material in materials.iter().flatten() {
            self.check_material(HOOK, *material)?;
        }
        self.palette_mut(HOOK, layer)?.alt_materials = materials.to_vec();
        Ok(())
    }

    fn alt_material_flags(&self, layer: NativeHandle) -> HookResult<Vec<MaterialOverrideOptions>> {
        Ok(self
            .palette("alt_material_flags", layer)?
            .alt_material_flags
            .clone())
    }

    fn set_alt_material_flags(
        &mut self,
        layer: NativeHandle,
        flags: &[MaterialOverrideOptions],
    ) -> HookResult {
        self.check_failure("set_alt_material_flags")?;
        self.palette_mut("set_alt_material_flags", layer)?
            .alt_material_flags = flags.to_vec();
        Ok(())
    }

    fn advanced_alt_material_state_at(
        &self,
        layer: NativeHandle,
        index: usize,
    ) -> HookResult<AdvancedMaterialState> {
        Ok(self
            .advanced("advanced_alt_material_state_at", layer)?
            .advanced_states
            .get(&index)
            .cloned()
            .unwrap_or_default())
    }

    fn has_advanced_alt_material_state_at(
        &self,
        layer: NativeHandle,
        index: usize,
    ) -> HookResult<bool> {
        Ok(self
            .advanced("has_advanced_alt_material_state_at", layer)?
            .advanced_states
            .contains_key(&index))
    }

    fn set_advanced_alt_material_state_at(
        &mut self,
        layer: NativeHandle,
        index: usize,
        state: &AdvancedMaterialState,
    ) -> HookResult {
        self.check_failure("set_advanced_alt_material_state_at")?;
        self.advanced_mut("set_advanced_alt_material_state_at", layer)?
            .advanced_states
            .insert(index, state.clone());
        Ok(())
    }

    fn remove_advanced_alt_material_state_at(
        &mut self,
        layer: NativeHandle,
        index: usize,
    ) -> HookResult {
        self.check_failure("remove_advanced_alt_material_state_at")?;
        let states = &mut self
            .advanced_mut("remove_advanced_alt_material_state_at", layer)?
            .advanced_states;

        let later = states.split_off(&(index + 1));
        states.remove(&index);
        states.extend(later.into_iter().map(|(slot, state)| (slot - 1, state)));
        Ok(())
    }

    fn alt_prop_sets(&self, layer: NativeHandle) -> HookResult<Vec<PropSet>> {
        Ok(self.palette("alt_prop_sets", layer)?.alt_prop_sets.clone())
    }

    fn set_alt_prop_set_at(
        &mut self,
        layer: NativeHandle,
        index: usize,
        prop_set: &PropSet,
    ) -> HookResult {
        self.check_failure("set_alt_prop_set_at")?;
        let prop_sets = &mut self.palette_mut("set_alt_prop_set_at", layer)?.alt_prop_sets;
        if prop_sets.len() <= index {
            prop_sets.resize_with(index + 1, PropSet::default);
        }
        prop_sets[index] = prop_set.clone();
        Ok(())
    }

    fn set_alt_prop_sets(&mut self, layer: NativeHandle, prop_sets: &[PropSet]) -> HookResult {
        self.check_failure("set_alt_prop_sets")?;
        self.palette_mut("set_alt_prop_sets", layer)?.alt_prop_sets = prop_sets.to_vec();
        Ok(())
    }

    fn native_layer_group(&self, layer: NativeHandle) -> HookResult<Option<NativeHandle>> {
        const HOOK: &str = "native_layer_group";
        self.check_layer_groups(HOOK)?;
        Ok(self.layer_ref(HOOK, layer)?.layer_group)
    }

    fn set_native_layer_group(
        &mut self,
        layer: NativeHandle,
        group: Option<NativeHandle>,
    ) -> HookResult {
        const HOOK: &str = "set_native_layer_group";
        self.check_failure(HOOK)?;
        self.check_layer_groups(HOOK)?;
        if let Some(group) = group.filter(|group| !self.layer_groups.contains(group)) {
            return Err(unknown(HOOK, group));
        }
        self.layer_mut(HOOK, layer)?.layer_group = group;
        Ok(())
    }

    fn layer_group_order(&self, layer: NativeHandle) -> HookResult<i32> {
        const HOOK: &str = "layer_group_order";
        self.check_layer_groups(HOOK)?;
        Ok(self.layer_ref(HOOK, layer)?.group_order)
    }

    fn set_layer_group_order(&mut self, layer: NativeHandle, order: i32) -> HookResult {
        const HOOK: &str = "set_layer_group_order";
        self.check_failure(HOOK)?;
        self.check_layer_groups(HOOK)?;
        self.layer_mut(HOOK, layer)?.group_order = order;
        Ok(())
    }

    fn native_wire_color(&self, layer: NativeHandle) -> HookResult<Option<NativeColor>> {
        Ok(self.layer_ref("native_wire_color", layer)?.wire_color)
    }

    fn set_native_wire_color(&mut self, layer: NativeHandle, color: NativeColor) -> HookResult {
        self.check_failure("set_native_wire_color")?;
        self.layer_mut("set_native_wire_color", layer)?.wire_color = Some(color);
        Ok(())
    }
}

impl AtmosphericHooks for MemoryHost {
    fn is_atmospheric_enabled(&self, atmospheric: NativeHandle) -> HookResult<bool> {
        self.atmospherics
            .get(&atmospheric)
            .map(|a| a.enabled)
            .ok_or_else(|| unknown("is_atmospheric_enabled", atmospheric))
    }

    fn set_atmospheric_enabled(&mut self, atmospheric: NativeHandle, state: bool) -> HookResult {
        self.check_failure("set_atmospheric_enabled")?;
        match self.atmospherics.get_mut(&atmospheric) {
            Some(a) => {
                a.enabled = state;
                Ok(())
            }
            None => Err(unknown("set_atmospheric_enabled", atmospheric)),
        }
    }

    fn native_atmospheric_layer(
        &self,
        atmospheric: NativeHandle,
    ) -> HookResult<Option<NativeHandle>> {
        self.atmospherics
            .get(&atmospheric)
            .map(|a| a.layer)
            .ok_or_else(|| unknown("native_atmospheric_layer", atmospheric))
    }
}
