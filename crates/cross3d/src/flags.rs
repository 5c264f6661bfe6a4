use crate::NativeHandle;
use bitflags::bitflags;
use std::collections::BTreeMap;

bitflags! {
    /// Controls how an override material gets applied to the objects of a group.
    ///
    /// The exact meaning is up to the host, the core only stores and forwards these.
    #[derive(Default)]
    pub struct MaterialOverrideOptions: u32 {
        const KEEP_OPACITY = 1 << 0;
        const KEEP_DISPLACEMENT = 1 << 1;
        const KEEP_BUMP = 1 << 2;
    }
}

impl From<u32> for MaterialOverrideOptions {
    fn from(value: u32) -> Self {
        Self::from_bits_truncate(value)
    }
}

/// How a single base material of a composite (multi-sub) material is treated by an alternate
/// material slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaterialSubstitution {
    /// Material used in place of the base material. [`None`] uses the slot's material.
    pub replacement: Option<NativeHandle>,
    /// Leaves the base material untouched.
    pub ignored: bool,
}

/// Fine-grained substitution rules of an alternate material slot, keyed by base material.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdvancedMaterialState {
    entries: BTreeMap<NativeHandle, MaterialSubstitution>,
}

impl AdvancedMaterialState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(
        &mut self,
        base: NativeHandle,
        substitution: MaterialSubstitution,
    ) -> Option<MaterialSubstitution> {
        self.entries.insert(base, substitution)
    }

    pub fn get(&self, base: NativeHandle) -> Option<&MaterialSubstitution> {
        self.entries.get(&base)
    }

    pub fn remove(&mut self, base: NativeHandle) -> Option<MaterialSubstitution> {
        self.entries.remove(&base)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NativeHandle, &MaterialSubstitution)> {
        self.entries.iter().map(|(&base, sub)| (base, sub))
    }
}

impl FromIterator<(NativeHandle, MaterialSubstitution)> for AdvancedMaterialState {
    fn from_iter<T: IntoIterator<Item = (NativeHandle, MaterialSubstitution)>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}
