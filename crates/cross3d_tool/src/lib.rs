//! The cross3d command line tool
//!
//! Loads a scene description into the in-memory host and runs layer operations on it: listing
//! layers, recording and restoring layer states, isolating layers and switching alternate
//! materials.

use clap::{ArgAction, Parser, Subcommand};
use commands::{
    alt_material::AltMaterialCommand, isolate::IsolateCommand, layers::LayersCommand,
    record::RecordCommand, restore::RestoreCommand,
};
use cross3d_utils::{ok, AnyResult};
use log::LevelFilter;

pub mod commands;
pub mod description;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Makes logging more verbose, can be repeated
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,
    #[command(subcommand)]
    pub command: CliCommand,
}

impl Cli {
    pub fn log_level(&self) -> LevelFilter {
        match self.verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }
}

#[derive(Subcommand)]
pub enum CliCommand {
    /// Lists the layers of a scene
    Layers(LayersCommand),
    /// Records the layer states of a scene into a state file
    Record(RecordCommand),
    /// Restores layer states from a state file
    Restore(RestoreCommand),
    /// Hides every layer except one
    Isolate(IsolateCommand),
    /// Switches the current alternate material of a layer
    AltMaterial(AltMaterialCommand),
}

pub trait Command {
    fn run(self) -> AnyResult;
}

/// Runs the tool as if it was ran from the command line.
pub fn run(cli: Cli) -> AnyResult {
    match cli.command {
        CliCommand::Layers(c) => c.run()?,
        CliCommand::Record(c) => c.run()?,
        CliCommand::Restore(c) => c.run()?,
        CliCommand::Isolate(c) => c.run()?,
        CliCommand::AltMaterial(c) => c.run()?,
    }
    ok()
}

#[cfg(test)]
mod test_support {
    use crate::description::SceneDescription;
    use cross3d::Scene;

    pub const STUDIO_SCENE: &str = include_str!("../scenes/studio.toml");

    pub fn studio_scene() -> Scene {
        SceneDescription::from_toml_str(STUDIO_SCENE)
            .unwrap()
            .build()
            .unwrap()
    }

    /// Runs `f` against an in-memory output and returns what it wrote.
    pub fn captured(f: impl FnOnce(&mut Vec<u8>) -> cross3d_utils::AnyResult) -> String {
        let mut out = Vec::new();
        f(&mut out).unwrap();
        String::from_utf8(out).unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    pub fn parse_command_line() {
        let cli = Cli::parse_from(["cross3d", "-vv", "alt-material", "scene.toml", "Hero", "2"]);
        assert_eq!(cli.log_level(), LevelFilter::Debug);
        match cli.command {
            CliCommand::AltMaterial(c) => {
                assert_eq!(c.layer, "Hero");
                assert_eq!(c.slot, Some(2));
            }
            _ => panic!("parsed the wrong command"),
        }
    }
}
