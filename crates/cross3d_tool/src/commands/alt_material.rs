use super::{load_scene, write_layers};
use anyhow::bail;
use clap::Args;
use cross3d::{IndexChange, Scene};
use cross3d_utils::{ok, AnyResult, AnyhowResultExt};
use std::{
    io::{self, Write},
    path::PathBuf,
};

#[derive(Args)]
pub struct AltMaterialCommand {
    /// Scene description to use
    pub scene: PathBuf,
    /// Name of the layer
    pub layer: String,
    /// Alternate material slot to switch to. Clears the override if left out.
    pub slot: Option<usize>,
}

impl crate::Command for AltMaterialCommand {
    fn run(self) -> AnyResult {
        let scene = load_scene(&self.scene)?;
        self.execute(&scene, &mut io::stdout().lock())
    }
}

impl AltMaterialCommand {
    pub fn execute(&self, scene: &Scene, out: &mut impl Write) -> AnyResult {
        let mut layer = scene
            .find_layer(&self.layer, 0)
            .otherwise_with(|| format!("no layer called `{}`", self.layer))?;
        layer.sync_current_indices();

        let outcome = match layer.set_current_alt_material_index(self.slot) {
            IndexChange::Applied => "applied",
            IndexChange::Unchanged => "unchanged",
            IndexChange::Failed => bail!(
                "couldn't switch layer `{}` to slot {:?} ({} slot(s) available)",
                self.layer,
                self.slot,
                layer.alt_material_count()
            ),
        };

        writeln!(out, "{}: {outcome}", self.layer)?;
        write_layers(scene, out)?;
        ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{captured, studio_scene};
    use cross3d::Group;

    fn command(slot: Option<usize>) -> AltMaterialCommand {
        AltMaterialCommand {
            scene: PathBuf::new(),
            layer: String::from("Hero"),
            slot,
        }
    }

    #[test]
    pub fn switching_slots() {
        let scene = studio_scene();
        let hero = || scene.find_layer("Hero", 0).unwrap();

        let report = captured(|out| command(Some(2)).execute(&scene, out));
        assert!(report.starts_with("Hero: applied"));
        assert!(report.contains("material=Clay (slot 2)"));
        assert_eq!(hero().material_override(), scene.find_material("Clay", 0));

        let report = captured(|out| command(Some(2)).execute(&scene, out));
        assert!(report.starts_with("Hero: unchanged"));

        let report = captured(|out| command(None).execute(&scene, out));
        assert!(report.starts_with("Hero: applied"));
        assert_eq!(hero().material_override(), None);
    }

    #[test]
    pub fn out_of_range_slot() {
        let scene = studio_scene();
        assert!(command(Some(9)).execute(&scene, &mut Vec::new()).is_err());
        assert_eq!(
            scene.find_layer("Hero", 0).unwrap().material_override(),
            scene.find_material("Chrome", 0)
        );
    }
}
