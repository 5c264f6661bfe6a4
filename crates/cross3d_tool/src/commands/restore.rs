use super::{load_scene, write_layers};
use clap::Args;
use cross3d::{Scene, StateNode};
use cross3d_utils::{ok, AnyResult, AnyhowResultExt};
use std::{
    fs,
    io::{self, Write},
    path::PathBuf,
};

#[derive(Args)]
pub struct RestoreCommand {
    /// Scene description to use
    pub scene: PathBuf,
    /// State file written by `record`
    pub state: PathBuf,
}

impl crate::Command for RestoreCommand {
    fn run(self) -> AnyResult {
        let scene = load_scene(&self.scene)?;
        let text = fs::read_to_string(&self.state)
            .otherwise(format!("couldn't read {}", self.state.display()))?;
        let doc = StateNode::from_toml_str(&text)
            .otherwise(format!("couldn't parse {}", self.state.display()))?;

        restore_states(&scene, &doc, &mut io::stdout().lock())
    }
}

/// Restores the scene from a state document and lists the resulting layers.
pub fn restore_states(scene: &Scene, doc: &StateNode, out: &mut impl Write) -> AnyResult {
    let restored = scene.restore_layer_states(doc);
    writeln!(
        out,
        "Restored {restored} of {} layer(s)",
        scene.layers().len()
    )?;
    write_layers(scene, out)?;
    ok()
}
