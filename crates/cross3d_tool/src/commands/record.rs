use super::{load_scene, STATE_ROOT};
use clap::Args;
use cross3d::{Scene, StateNode};
use cross3d_utils::{ok, AnyResult, AnyhowResultExt};
use log::*;
use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};

#[derive(Args)]
pub struct RecordCommand {
    /// Output state file
    #[arg(long, short = 'o')]
    pub output: PathBuf,
    /// Scene description to use
    pub scene: PathBuf,
}

impl crate::Command for RecordCommand {
    fn run(self) -> AnyResult {
        let scene = load_scene(&self.scene)?;
        save_states(&scene, &self.output, &mut io::stdout().lock())
    }
}

/// Records every visible layer of the scene into a new state document.
pub fn record_states(scene: &Scene) -> (StateNode, usize) {
    let mut doc = StateNode::new(STATE_ROOT);
    let recorded = scene.record_layer_states(&mut doc);
    info!("Recorded {recorded} of {} layer(s)", scene.layers().len());
    (doc, recorded)
}

/// Records the scene into a state file at `path` and reports what was written.
pub fn save_states(scene: &Scene, path: &Path, out: &mut impl Write) -> AnyResult {
    let (doc, recorded) = record_states(scene);
    let text = doc.to_toml_string()?;

    fs::write(path, text).otherwise(format!("couldn't write {}", path.display()))?;
    writeln!(out, "Recorded {recorded} layer(s) into {}", path.display())?;

    ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{captured, studio_scene};
    use cross3d::state::LAYER_NODE;
    use std::env;

    #[test]
    pub fn hidden_layers_are_left_out() {
        let scene = studio_scene();
        let (doc, recorded) = record_states(&scene);

        assert_eq!(recorded, 3);
        let names: Vec<_> = doc
            .children_named(LAYER_NODE)
            .filter_map(|node| node.attribute("name"))
            .collect();
        assert_eq!(names, vec!["0", "Hero", "Sidekick"]);
    }

    #[test]
    pub fn saves_a_state_file() {
        let scene = studio_scene();
        let path = env::temp_dir().join(format!("cross3d-record-{}.toml", std::process::id()));

        let output = captured(|out| save_states(&scene, &path, out));
        let text = fs::read_to_string(&path).unwrap();
        fs::remove_file(&path).unwrap();

        assert_eq!(output, format!("Recorded 3 layer(s) into {}\n", path.display()));
        let doc = StateNode::from_toml_str(&text).unwrap();
        assert_eq!(doc, record_states(&scene).0);
    }

    #[test]
    pub fn unwritable_paths_are_errors() {
        let scene = studio_scene();
        let path = env::temp_dir()
            .join("cross3d-missing-directory")
            .join("states.toml");

        let mut out = Vec::new();
        let err = save_states(&scene, &path, &mut out).unwrap_err();
        assert!(err.to_string().contains("couldn't write"));
        assert!(out.is_empty());
    }
}
