//! Cross-application interface for DCC scenes
//!
//! ## Introduction
//! Every 3D application has some notion of layers, object groups and atmospheric effects, and
//! every one of them exposes those through a different API. This crate provides a single
//! interface over all of them: tools are written against [`Scene`], [`Layer`], [`ObjectGroup`]
//! and [`Atmospheric`], and each application gets a host integration implementing the hook traits
//! of the [`host`] module.
//!
//! The core never talks to an application directly. It only decides *what* to do (which objects
//! to hide, which override to apply, what to write into a layer state document), the host decides
//! *how*.
//!
//! ## Missing hooks
//! Some hooks describe capabilities an application may not have at all (layer groups, alternate
//! material palettes, ...). Hosts can leave those out, and what happens when one of them gets
//! called anyway is decided by the scene's [`HookPolicy`].
//!
//! ```
//! use cross3d::{memory::MemoryHost, Group, IndexChange, Scene, SceneConfig};
//!
//! let mut host = MemoryHost::new();
//! let props = host.add_layer("Props");
//! let crate_object = host.add_object("crate");
//! host.assign(props, crate_object);
//! let chrome = host.add_material("Chrome");
//!
//! let scene = Scene::new(host, SceneConfig::default());
//! let mut layer = scene.layer(props);
//! layer.add_alt_material(&scene.material(chrome));
//!
//! assert_eq!(layer.set_current_alt_material_index(Some(0)), IndexChange::Applied);
//! assert_eq!(layer.material_override(), Some(scene.material(chrome)));
//! ```

#[macro_use]
mod macros;

pub mod atmospheric;
pub mod config;
pub mod error;
pub mod flags;
pub mod group;
pub mod handle;
pub mod host;
pub mod layer;
pub mod layer_group;
pub mod material;
pub mod memory;
pub mod object;
pub mod prop_set;
pub mod scene;
pub mod state;

#[cfg(test)]
mod test_support;

pub use atmospheric::Atmospheric;
pub use config::{HookPolicy, SceneConfig};
pub use error::{ConfigError, HookError, HookResult, StateError};
pub use flags::{AdvancedMaterialState, MaterialOverrideOptions, MaterialSubstitution};
pub use group::{Group, ObjectGroup};
pub use handle::{NativeColor, NativeHandle};
pub use host::{AtmosphericHooks, GroupHooks, Host, LayerHooks, SceneHooks};
pub use layer::{IndexChange, Layer};
pub use layer_group::LayerGroup;
pub use material::{SceneMap, SceneMaterial};
pub use object::SceneObject;
pub use prop_set::{PropSet, PropValue};
pub use scene::Scene;
pub use state::StateNode;
