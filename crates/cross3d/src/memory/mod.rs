//! In-memory host
//!
//! [`MemoryHost`] implements every host hook over plain collections. It has no application
//! behind it, which makes it useful for tests, tooling and trying out the API. Scenes are
//! populated through the builder methods, and the native state can be inspected afterwards
//! through [`Scene::host`](crate::Scene::host).
//!
//! ```
//! use cross3d::{memory::MemoryHost, Group, Scene, SceneConfig};
//!
//! let mut host = MemoryHost::new();
//! let props = host.add_layer("Props");
//! let chair = host.add_object("chair");
//! host.assign(props, chair);
//!
//! let scene = Scene::new(host, SceneConfig::default());
//! assert!(scene.layer(props).hide());
//! assert!(scene.host::<MemoryHost>().unwrap().object(chair).unwrap().hidden);
//! ```

use crate::{
    flags::{AdvancedMaterialState, MaterialOverrideOptions},
    group::AppliedOverride,
    prop_set::PropSet,
    NativeColor, NativeHandle,
};
use ahash::AHashMap;
use log::*;
use std::collections::BTreeMap;

mod hooks;

/// Name of the world layer every memory scene starts with.
pub const WORLD_LAYER_NAME: &str = "0";

const UNIQUE_ID_BASE: u64 = 0x1000;

#[derive(Debug, Clone, PartialEq)]
pub struct MemoryObject {
    pub layer: NativeHandle,
    pub hidden: bool,
    pub frozen: bool,
    pub selected: bool,
    pub material_override: Option<AppliedOverride>,
    pub prop_set_override: Option<PropSet>,
}

/// Overrides last applied to a layer or group as a whole.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoryOverrides {
    pub material: Option<AppliedOverride>,
    pub prop_set: Option<PropSet>,
}

#[derive(Debug, Clone, Default)]
pub struct MemoryLayer {
    pub world: bool,
    pub visible: bool,
    pub alt_materials: Vec<Option<NativeHandle>>,
    pub alt_material_flags: Vec<MaterialOverrideOptions>,
    pub advanced_states: BTreeMap<usize, AdvancedMaterialState>,
    pub alt_prop_sets: Vec<PropSet>,
    pub layer_group: Option<NativeHandle>,
    pub group_order: i32,
    pub wire_color: Option<NativeColor>,
    pub overrides: MemoryOverrides,
}

#[derive(Debug, Clone, Default)]
pub struct MemoryGroup {
    pub objects: Vec<NativeHandle>,
    pub overrides: MemoryOverrides,
}

#[derive(Debug, Clone)]
pub struct MemoryAtmospheric {
    pub enabled: bool,
    pub layer: Option<NativeHandle>,
}

#[derive(Debug, Clone)]
struct Named {
    name: String,
    unique_id: u64,
}

/// Which optional hooks the host claims to support.
#[derive(Debug, Clone, Copy)]
struct Capabilities {
    layer_groups: bool,
    membership_changes: bool,
    alt_palettes: bool,
    advanced_states: bool,
}

#[derive(Debug)]
pub struct MemoryHost {
    next_handle: u64,
    names: AHashMap<NativeHandle, Named>,

    objects: AHashMap<NativeHandle, MemoryObject>,
    layers: AHashMap<NativeHandle, MemoryLayer>,
    groups: AHashMap<NativeHandle, MemoryGroup>,
    atmospherics: AHashMap<NativeHandle, MemoryAtmospheric>,
    materials: Vec<NativeHandle>,
    maps: Vec<NativeHandle>,
    layer_groups: Vec<NativeHandle>,

    world_layer: NativeHandle,
    active_layer: NativeHandle,
    environment_map: Option<NativeHandle>,
    layer_state_changes: usize,
    capabilities: Capabilities,
    failing_hooks: Vec<&'static str>,
}

impl MemoryHost {
    /// Creates an empty scene with only the world layer, which is also the active one.
    pub fn new() -> Self {
        let mut host = Self {
            next_handle: 1,
            names: AHashMap::new(),
            objects: AHashMap::new(),
            layers: AHashMap::new(),
            groups: AHashMap::new(),
            atmospherics: AHashMap::new(),
            materials: Vec::new(),
            maps: Vec::new(),
            layer_groups: Vec::new(),
            world_layer: NativeHandle(0),
            active_layer: NativeHandle(0),
            environment_map: None,
            layer_state_changes: 0,
            capabilities: Capabilities {
                layer_groups: true,
                membership_changes: true,
                alt_palettes: true,
                advanced_states: true,
            },
            failing_hooks: Vec::new(),
        };

        let world = host.allocate(WORLD_LAYER_NAME);
        host.layers.insert(
            world,
            MemoryLayer {
                world: true,
                visible: true,
                group_order: -1,
                ..Default::default()
            },
        );
        host.world_layer = world;
        host.active_layer = world;
        host
    }

    fn allocate(&mut self, name: impl Into<String>) -> NativeHandle {
        let handle = NativeHandle(self.next_handle);
        self.next_handle += 1;
        self.names.insert(
            handle,
            Named {
                name: name.into(),
                unique_id: UNIQUE_ID_BASE + handle.0,
            },
        );
        handle
    }

    /// Adds an object to the active layer.
    pub fn add_object(&mut self, name: impl Into<String>) -> NativeHandle {
        let handle = self.allocate(name);
        self.objects.insert(
            handle,
            MemoryObject {
                layer: self.active_layer,
                hidden: false,
                frozen: false,
                selected: false,
                material_override: None,
                prop_set_override: None,
            },
        );
        handle
    }

    pub fn add_layer(&mut self, name: impl Into<String>) -> NativeHandle {
        let handle = self.allocate(name);
        self.layers.insert(
            handle,
            MemoryLayer {
                visible: true,
                group_order: -1,
                ..Default::default()
            },
        );
        handle
    }

    /// Adds a plain object group.
    pub fn add_group(&mut self, name: impl Into<String>) -> NativeHandle {
        let handle = self.allocate(name);
        self.groups.insert(handle, MemoryGroup::default());
        handle
    }

    pub fn add_material(&mut self, name: impl Into<String>) -> NativeHandle {
        let handle = self.allocate(name);
        self.materials.push(handle);
        handle
    }

    pub fn add_map(&mut self, name: impl Into<String>) -> NativeHandle {
        let handle = self.allocate(name);
        self.maps.push(handle);
        handle
    }

    pub fn add_layer_group(&mut self, name: impl Into<String>) -> NativeHandle {
        let handle = self.allocate(name);
        self.layer_groups.push(handle);
        handle
    }

    /// Adds an enabled atmospheric, optionally bound to a layer.
    pub fn add_atmospheric(
        &mut self,
        name: impl Into<String>,
        layer: Option<NativeHandle>,
    ) -> NativeHandle {
        let handle = self.allocate(name);
        self.atmospherics.insert(
            handle,
            MemoryAtmospheric {
                enabled: true,
                layer,
            },
        );
        handle
    }

    /// Puts an object into a layer (moving it out of its current one) or into a group.
    pub fn assign(&mut self, container: NativeHandle, object: NativeHandle) -> bool {
        if !self.objects.contains_key(&object) {
            warn!("Can't assign unknown object {object}");
            return false;
        }

        if self.layers.contains_key(&container) {
            if let Some(object) = self.objects.get_mut(&object) {
                object.layer = container;
            }
            true
        } else if let Some(group) = self.groups.get_mut(&container) {
            if !group.objects.contains(&object) {
                group.objects.push(object);
            }
            true
        } else {
            warn!("Can't assign {object} into unknown container {container}");
            false
        }
    }

    /// Marks objects as selected, as if the user clicked on them.
    pub fn select(&mut self, objects: &[NativeHandle]) {
        for handle in objects {
            if let Some(object) = self.objects.get_mut(handle) {
                object.selected = true;
            }
        }
    }

    /// Makes the layer group hooks report themselves as not implemented.
    pub fn without_layer_groups(mut self) -> Self {
        self.capabilities.layer_groups = false;
        self
    }

    /// Makes the group membership hooks report themselves as not implemented.
    pub fn without_membership_changes(mut self) -> Self {
        self.capabilities.membership_changes = false;
        self
    }

    /// Makes the alternate material and property set hooks report themselves as not implemented.
    pub fn without_alt_palettes(mut self) -> Self {
        self.capabilities.alt_palettes = false;
        self
    }

    /// Makes the advanced alternate material state hooks report themselves as not implemented,
    /// while keeping the palettes themselves.
    pub fn without_advanced_states(mut self) -> Self {
        self.capabilities.advanced_states = false;
        self
    }

    /// Makes a mutating hook fail with [`HookError::Failed`](crate::HookError::Failed) every
    /// time it's called, leaving the scene untouched.
    pub fn failing_hook(mut self, hook: &'static str) -> Self {
        self.failing_hooks.push(hook);
        self
    }

    pub fn group(&self, handle: NativeHandle) -> Option<&MemoryGroup> {
        self.groups.get(&handle)
    }

    pub fn object(&self, handle: NativeHandle) -> Option<&MemoryObject> {
        self.objects.get(&handle)
    }

    pub fn layer(&self, handle: NativeHandle) -> Option<&MemoryLayer> {
        self.layers.get(&handle)
    }

    pub fn world_layer(&self) -> NativeHandle {
        self.world_layer
    }

    /// How many times the host got notified about layer state changes.
    pub fn layer_state_changes(&self) -> usize {
        self.layer_state_changes
    }

    /// Objects of a layer or group, in creation order.
    fn members(&self, container: NativeHandle) -> Option<Vec<NativeHandle>> {
        if self.layers.contains_key(&container) {
            let mut members: Vec<_> = self
                .objects
                .iter()
                .filter(|(_, object)| object.layer == container)
                .map(|(&handle, _)| handle)
                .collect();
            members.sort();
            Some(members)
        } else {
            self.groups
                .get(&container)
                .map(|group| group.objects.clone())
        }
    }

    /// Looks up a handle among `candidates`. A nonzero unique id takes precedence over the name.
    fn find_named(
        &self,
        candidates: impl IntoIterator<Item = NativeHandle>,
        name: &str,
        unique_id: u64,
    ) -> Option<NativeHandle> {
        let candidates: Vec<_> = candidates.into_iter().collect();
        let by_id = (unique_id != 0)
            .then(|| {
                candidates.iter().copied().find(|handle| {
                    self.names
                        .get(handle)
                        .map_or(false, |named| named.unique_id == unique_id)
                })
            })
            .flatten();

        by_id.or_else(|| {
            (!name.is_empty())
                .then(|| {
                    candidates.iter().copied().find(|handle| {
                        self.names
                            .get(handle)
                            .map_or(false, |named| named.name == name)
                    })
                })
                .flatten()
        })
    }

    fn remove_objects(&mut self, objects: &[NativeHandle]) {
        for handle in objects {
            self.objects.remove(handle);
            self.names.remove(handle);
        }
        for group in self.groups.values_mut() {
            group.objects.retain(|handle| !objects.contains(handle));
        }
    }
}

impl Default for MemoryHost {
    fn default() -> Self {
        Self::new()
    }
}

fn sorted(handles: impl Iterator<Item = NativeHandle>) -> Vec<NativeHandle> {
    let mut handles: Vec<_> = handles.collect();
    handles.sort();
    handles
}
