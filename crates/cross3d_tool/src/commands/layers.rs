use super::{load_scene, write_layers};
use clap::Args;
use cross3d_utils::AnyResult;
use std::{io, path::PathBuf};

#[derive(Args)]
pub struct LayersCommand {
    /// Scene description to use
    pub scene: PathBuf,
}

impl crate::Command for LayersCommand {
    fn run(self) -> AnyResult {
        let scene = load_scene(&self.scene)?;
        write_layers(&scene, &mut io::stdout().lock())
    }
}
