use std::fmt::{self, Display};

/// Opaque identifier of a native scene entity (object, group, layer, material, ...).
///
/// The value is entirely host-defined, the core only ever compares and passes it around. Two
/// wrappers around equal handles refer to the same native entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NativeHandle(pub u64);

impl Display for NativeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "native#{}", self.0)
    }
}

impl From<u64> for NativeHandle {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

/// A host's native representation of a color. Conversion from and into [`RGBA8`] is done by the
/// scene, see [`Scene::to_native_color`].
///
/// [`RGBA8`]: cross3d_utils::color::RGBA8
/// [`Scene::to_native_color`]: crate::Scene::to_native_color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NativeColor(pub u32);
