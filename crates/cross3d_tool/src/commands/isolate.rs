use super::{load_scene, write_layers};
use clap::Args;
use cross3d::{Group, Scene};
use cross3d_utils::{ok, AnyResult, AnyhowResultExt};
use std::{
    io::{self, Write},
    path::PathBuf,
};

#[derive(Args)]
pub struct IsolateCommand {
    /// Scene description to use
    pub scene: PathBuf,
    /// Name of the layer to isolate
    pub layer: String,
}

impl crate::Command for IsolateCommand {
    fn run(self) -> AnyResult {
        let scene = load_scene(&self.scene)?;
        self.execute(&scene, &mut io::stdout().lock())
    }
}

impl IsolateCommand {
    pub fn execute(&self, scene: &Scene, out: &mut impl Write) -> AnyResult {
        let layer = scene
            .find_layer(&self.layer, 0)
            .otherwise_with(|| format!("no layer called `{}`", self.layer))?;
        layer
            .isolate()
            .otherwise_with(|| format!("couldn't isolate layer `{}`", self.layer))?;

        writeln!(out, "Isolated {}", self.layer)?;
        write_layers(scene, out)?;
        ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{captured, studio_scene};

    #[test]
    pub fn isolating_a_layer() {
        let scene = studio_scene();
        let command = IsolateCommand {
            scene: PathBuf::new(),
            layer: String::from("Backdrop"),
        };

        let report = captured(|out| command.execute(&scene, out));
        assert!(report.starts_with("Isolated Backdrop"));

        let visible: Vec<_> = scene
            .layers()
            .iter()
            .filter(|layer| layer.is_visible())
            .map(|layer| layer.name())
            .collect();
        assert_eq!(visible, vec!["Backdrop"]);
    }

    #[test]
    pub fn unknown_layer() {
        let scene = studio_scene();
        let command = IsolateCommand {
            scene: PathBuf::new(),
            layer: String::from("Villain"),
        };
        assert!(command.execute(&scene, &mut Vec::new()).is_err());
    }
}
