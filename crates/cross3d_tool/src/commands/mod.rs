use crate::description::SceneDescription;
use cross3d::{Group, Scene};
use cross3d_utils::{ok, AnyResult};
use itertools::Itertools;
use std::{io::Write, path::Path};

pub mod alt_material;
pub mod isolate;
pub mod layers;
pub mod record;
pub mod restore;

/// Name of the root node of state files.
pub const STATE_ROOT: &str = "layerStates";

pub fn load_scene(path: &Path) -> AnyResult<Scene> {
    SceneDescription::load(path)?.build()
}

/// Writes a line per layer and atmospheric of the scene.
pub fn write_layers(scene: &Scene, out: &mut impl Write) -> AnyResult {
    for mut layer in scene.layers() {
        layer.sync_current_indices();

        let marker = if layer.is_active() { '*' } else { ' ' };
        let visibility = if layer.is_visible() { "visible" } else { "hidden" };
        write!(
            out,
            "{marker} {:<12} {visibility:<8} {} object(s)",
            layer.name(),
            layer.objects().len()
        )?;

        if let Some(group) = layer.layer_group() {
            write!(
                out,
                "  group={}:{}",
                group.group_name(),
                layer.layer_group_order()
            )?;
        }

        if let Some(material) = layer.material_override() {
            write!(out, "  material={}", material.name())?;
            if let Some(slot) = layer.current_alt_material_index() {
                write!(out, " (slot {slot})")?;
            }
        }

        if let Some(prop_set) = layer.prop_set_override() {
            write!(out, "  props={}", prop_set.name)?;
        }

        let alt_materials = layer.alt_materials();
        if !alt_materials.is_empty() {
            let names = alt_materials
                .iter()
                .map(|slot| match slot {
                    Some(material) => material.name(),
                    None => String::from("-"),
                })
                .join(", ");
            write!(out, "  alt=[{names}]")?;
        }

        writeln!(out)?;
    }

    for atmospheric in scene.atmospherics() {
        let state = if atmospheric.is_enabled() {
            "enabled"
        } else {
            "disabled"
        };
        write!(out, "~ {:<12} {state:<8}", atmospheric.name())?;
        if let Some(layer) = atmospheric.layer() {
            write!(out, " on {}", layer.name())?;
        }
        writeln!(out)?;
    }

    ok()
}
