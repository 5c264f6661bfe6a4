//! TOML scene descriptions
//!
//! The tool has no application to talk to, so scenes are described in a TOML file and loaded into
//! a [`MemoryHost`]. See `scenes/studio.toml` for an example.

use ahash::AHashMap;
use cross3d::{
    memory::{MemoryHost, WORLD_LAYER_NAME},
    MaterialOverrideOptions, NativeHandle, PropSet, PropValue, Scene, SceneConfig,
};
use cross3d_utils::{color::RGB8, ok, AnyResult, AnyhowResultExt};
use log::*;
use serde::Deserialize;
use std::{collections::BTreeMap, fs, path::Path};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SceneDescription {
    pub config: SceneConfig,
    pub materials: Vec<String>,
    pub maps: Vec<String>,
    pub layer_groups: Vec<String>,
    pub environment_map: Option<String>,
    pub layers: Vec<LayerDescription>,
    pub groups: Vec<GroupDescription>,
    pub atmospherics: Vec<AtmosphericDescription>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LayerDescription {
    /// A layer named `"0"` describes the world layer.
    pub name: String,
    pub objects: Vec<String>,
    pub hidden: bool,
    pub active: bool,
    pub group: Option<String>,
    pub group_order: Option<i32>,
    pub wire_color: Option<[u8; 3]>,
    /// Empty names leave their slot empty.
    pub alt_materials: Vec<String>,
    pub alt_material_flags: Vec<u32>,
    pub alt_prop_sets: Vec<PropSetDescription>,
    pub current_alt_material: Option<usize>,
    pub current_alt_prop_set: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct PropSetDescription {
    pub name: String,
    #[serde(default = "active_by_default")]
    pub active: bool,
    #[serde(default)]
    pub properties: BTreeMap<String, PropValue>,
}

#[derive(Debug, Deserialize)]
pub struct GroupDescription {
    pub name: String,
    #[serde(default)]
    pub objects: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct AtmosphericDescription {
    pub name: String,
    pub layer: Option<String>,
    #[serde(default = "active_by_default")]
    pub enabled: bool,
}

fn active_by_default() -> bool {
    true
}

impl PropSetDescription {
    pub fn to_prop_set(&self) -> PropSet {
        let mut prop_set = PropSet::new(&self.name);
        for (key, value) in &self.properties {
            prop_set.set(key, value.clone(), self.active);
        }
        prop_set
    }
}

/// Native handles of everything created so far, by name.
#[derive(Default)]
struct Handles {
    objects: AHashMap<String, NativeHandle>,
    materials: AHashMap<String, NativeHandle>,
    maps: AHashMap<String, NativeHandle>,
    layers: AHashMap<String, NativeHandle>,
}

fn lookup(map: &AHashMap<String, NativeHandle>, kind: &str, name: &str) -> AnyResult<NativeHandle> {
    map.get(name)
        .copied()
        .otherwise_with(|| format!("unknown {kind} `{name}`"))
}

impl SceneDescription {
    pub fn from_toml_str(s: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(s)
    }

    pub fn load(path: &Path) -> AnyResult<Self> {
        let text = fs::read_to_string(path)
            .otherwise(format!("couldn't read the scene description {}", path.display()))?;
        Self::from_toml_str(&text)
            .otherwise(format!("couldn't parse the scene description {}", path.display()))
    }

    /// Creates the described scene.
    pub fn build(&self) -> AnyResult<Scene> {
        let mut host = MemoryHost::new();
        let handles = self.populate(&mut host)?;
        let scene = Scene::new(host, self.config.clone());

        for description in &self.layers {
            let handle = lookup(&handles.layers, "layer", &description.name)?;
            configure_layer(&scene, handle, description, &handles)?;
        }

        for description in &self.atmospherics {
            if !description.enabled {
                let atmospheric = scene
                    .find_atmospheric(&description.name, 0)
                    .otherwise(format!("unknown atmospheric `{}`", description.name))?;
                atmospheric.disable().otherwise_with(|| {
                    format!("couldn't disable atmospheric `{}`", description.name)
                })?;
            }
        }

        if let Some(name) = &self.environment_map {
            let map = scene.map(lookup(&handles.maps, "map", name)?);
            scene
                .set_environment_map_override(Some(&map))
                .otherwise("couldn't set the environment map")?;
        }

        debug!(
            "Built a scene with {} layer(s) and {} object(s)",
            handles.layers.len(),
            handles.objects.len()
        );
        Ok(scene)
    }

    /// Creates every native entity of the description.
    fn populate(&self, host: &mut MemoryHost) -> AnyResult<Handles> {
        let mut handles = Handles::default();

        for name in &self.materials {
            handles.materials.insert(name.clone(), host.add_material(name));
        }
        for name in &self.maps {
            handles.maps.insert(name.clone(), host.add_map(name));
        }
        for name in &self.layer_groups {
            host.add_layer_group(name);
        }

        for layer in &self.layers {
            (!layer.name.is_empty()).otherwise("layers must have a name")?;
            let handle = if layer.name == WORLD_LAYER_NAME {
                host.world_layer()
            } else {
                host.add_layer(&layer.name)
            };
            handles.layers.insert(layer.name.clone(), handle);

            for name in &layer.objects {
                let object = host.add_object(name);
                host.assign(handle, object);
                handles.objects.insert(name.clone(), object);
            }
        }

        for group in &self.groups {
            let handle = host.add_group(&group.name);
            for name in &group.objects {
                host.assign(handle, lookup(&handles.objects, "object", name)?);
            }
        }

        for atmospheric in &self.atmospherics {
            let layer = match &atmospheric.layer {
                Some(name) => Some(lookup(&handles.layers, "layer", name)?),
                None => None,
            };
            host.add_atmospheric(&atmospheric.name, layer);
        }

        Ok(handles)
    }
}

fn configure_layer(
    scene: &Scene,
    handle: NativeHandle,
    description: &LayerDescription,
    handles: &Handles,
) -> AnyResult {
    let name = &description.name;
    let mut layer = scene.layer(handle);

    for (index, material) in description.alt_materials.iter().enumerate() {
        let material = match material.as_str() {
            "" => None,
            material => Some(scene.material(lookup(&handles.materials, "material", material)?)),
        };
        layer
            .set_alt_material_at(index, material.as_ref())
            .otherwise_with(|| {
                format!("couldn't set alternate material {index} of layer `{name}`")
            })?;
    }

    if !description.alt_material_flags.is_empty() {
        let flags: Vec<_> = description
            .alt_material_flags
            .iter()
            .map(|&bits| MaterialOverrideOptions::from(bits))
            .collect();
        layer.set_alt_material_flags(&flags).otherwise_with(|| {
            format!("couldn't set the alternate material flags of layer `{name}`")
        })?;
    }

    if !description.alt_prop_sets.is_empty() {
        let prop_sets: Vec<_> = description
            .alt_prop_sets
            .iter()
            .map(PropSetDescription::to_prop_set)
            .collect();
        layer.set_alt_prop_sets(&prop_sets).otherwise_with(|| {
            format!("couldn't set the alternate property sets of layer `{name}`")
        })?;
    }

    if let Some(group_name) = &description.group {
        let group = scene
            .find_layer_group(group_name)
            .otherwise(format!("unknown layer group `{group_name}`"))?;
        layer
            .set_layer_group(Some(&group))
            .otherwise_with(|| format!("couldn't move layer `{name}` into `{group_name}`"))?;
    }

    if let Some(order) = description.group_order {
        layer
            .set_layer_group_order(order)
            .otherwise_with(|| format!("couldn't set the group order of layer `{name}`"))?;
    }

    if let Some([r, g, b]) = description.wire_color {
        layer
            .set_wire_color(RGB8::new(r, g, b).into())
            .otherwise_with(|| format!("couldn't set the wire color of layer `{name}`"))?;
    }

    if description.active {
        layer
            .set_active(true)
            .otherwise_with(|| format!("couldn't activate layer `{name}`"))?;
    }

    if let Some(index) = description.current_alt_material {
        let change = layer.set_current_alt_material_index(Some(index));
        (!change.is_failed()).otherwise_with(|| {
            format!("couldn't select alternate material {index} of layer `{name}`")
        })?;
    }

    if let Some(index) = description.current_alt_prop_set {
        let change = layer.set_current_alt_prop_set_index(Some(index));
        (!change.is_failed()).otherwise_with(|| {
            format!("couldn't select alternate property set {index} of layer `{name}`")
        })?;
    }

    if description.hidden {
        layer
            .set_visible(false)
            .otherwise_with(|| format!("couldn't hide layer `{name}`"))?;
    }

    ok()
}
