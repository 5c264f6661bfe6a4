//! Object groups
//!
//! An object group wraps a native grouping of scene objects and applies operations (visibility,
//! freezing, selection, overrides) to all of its members at once. Membership is never cached,
//! every operation asks the host for the current members.
//!
//! The shared behavior lives in the [`Group`] trait, so that [`Layer`](crate::Layer) can
//! reimplement parts of it.

use crate::{
    flags::{AdvancedMaterialState, MaterialOverrideOptions},
    material::SceneMaterial,
    object::SceneObject,
    prop_set::PropSet,
    NativeHandle, Scene,
};
use std::fmt::{self, Debug};

/// A material override that was successfully pushed to the host through a wrapper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedOverride {
    pub material: NativeHandle,
    pub options: MaterialOverrideOptions,
    pub advanced: Option<AdvancedMaterialState>,
}

/// Override intent cached by a group wrapper.
///
/// This is only what the wrapper asked for. The native state can differ (failed hooks, other
/// wrappers of the same group), the live values come from [`Group::material_override`] and
/// [`Group::prop_set_override`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OverrideState {
    /// Options used by material overrides that don't specify their own.
    pub flags: MaterialOverrideOptions,
    pub material: Option<AppliedOverride>,
    pub prop_set: Option<PropSet>,
}

impl OverrideState {
    pub fn with_flags(flags: MaterialOverrideOptions) -> Self {
        Self {
            flags,
            ..Default::default()
        }
    }
}

/// Operations shared by every kind of object grouping.
///
/// Implementors only provide access to the scene, the native handle and the cached override
/// state, everything else has a default implementation built on top of the host hooks. Batch
/// operations report a single success flag for the whole group.
pub trait Group<'s> {
    fn scene(&self) -> &'s Scene;

    fn native_handle(&self) -> NativeHandle;

    fn override_state(&self) -> &OverrideState;

    fn override_state_mut(&mut self) -> &mut OverrideState;

    /// Current native members of the group.
    fn native_objects(&self) -> Vec<NativeHandle> {
        let group = self.native_handle();
        self.scene().query(vec![], |host| host.native_objects(group))
    }

    fn objects(&self) -> Vec<SceneObject<'s>> {
        let scene = self.scene();
        self.native_objects()
            .into_iter()
            .map(|handle| SceneObject::new(scene, handle))
            .collect()
    }

    fn is_empty(&self) -> bool {
        self.native_objects().is_empty()
    }

    /// Adds the objects to the group. Fails if the host can't change group membership.
    fn add_objects(&self, objects: &[SceneObject<'_>]) -> bool {
        let group = self.native_handle();
        let natives: Vec<_> = objects.iter().map(SceneObject::native_handle).collect();
        self.scene()
            .command(|host| host.add_native_objects(group, &natives))
    }

    /// Adds the current selection to the group.
    fn add_selection(&self) -> bool {
        let group = self.native_handle();
        let selection = self.scene().native_selection();
        self.scene()
            .command(|host| host.add_native_objects(group, &selection))
    }

    fn clear_objects(&self) -> bool {
        let group = self.native_handle();
        self.scene().command(|host| host.clear_native_objects(group))
    }

    fn is_hidden(&self) -> bool {
        let group = self.native_handle();
        self.scene().query(false, |host| host.is_hidden(group))
    }

    fn set_hidden(&self, state: bool) -> bool {
        let objects = self.native_objects();
        self.scene()
            .command(|host| host.hide_native_objects(&objects, state))
    }

    fn hide(&self) -> bool {
        self.set_hidden(true)
    }

    fn unhide(&self) -> bool {
        self.set_hidden(false)
    }

    fn is_frozen(&self) -> bool {
        let group = self.native_handle();
        self.scene().query(false, |host| host.is_frozen(group))
    }

    fn set_frozen(&self, state: bool) -> bool {
        let objects = self.native_objects();
        self.scene()
            .command(|host| host.freeze_native_objects(&objects, state))
    }

    fn freeze(&self) -> bool {
        self.set_frozen(true)
    }

    fn unfreeze(&self) -> bool {
        self.set_frozen(false)
    }

    fn set_selected(&self, state: bool) -> bool {
        let objects = self.native_objects();
        self.scene()
            .command(|host| host.set_native_selection(&objects, state))
    }

    fn select(&self) -> bool {
        self.set_selected(true)
    }

    fn deselect(&self) -> bool {
        self.set_selected(false)
    }

    /// Hides everything in the scene except this group's objects.
    fn isolate(&self) -> bool {
        let objects = self.native_objects();
        self.scene()
            .command(|host| host.isolate_native_objects(&objects))
    }

    fn group_name(&self) -> String {
        let group = self.native_handle();
        self.scene().query(String::new(), |host| host.group_name(group))
    }

    fn set_group_name(&self, name: &str) -> bool {
        let group = self.native_handle();
        self.scene().command(|host| host.set_group_name(group, name))
    }

    /// Removes the grouping from the scene, and its objects too if `remove_objects` is set.
    fn remove(&self, remove_objects: bool) -> bool {
        let group = self.native_handle();
        self.scene()
            .command(|host| host.remove_group(group, remove_objects))
    }

    /// The material currently overriding this group, as reported by the host.
    fn material_override(&self) -> Option<SceneMaterial<'s>> {
        let group = self.native_handle();
        let scene = self.scene();
        scene
            .query(None, |host| host.native_material_override(group))
            .map(|handle| SceneMaterial::new(scene, handle))
    }

    /// Overrides the material of every object in the group. Without explicit `options`, the
    /// group's [`material_override_flags`](Group::material_override_flags) are used. [`None`]
    /// clears the override.
    fn set_material_override(
        &mut self,
        material: Option<&SceneMaterial<'_>>,
        options: Option<MaterialOverrideOptions>,
    ) -> bool {
        let Some(material) = material else {
            return self.clear_material_override();
        };
        let options = options.unwrap_or_else(|| self.material_override_flags());
        self.apply_material_override(material.native_handle(), options, None)
    }

    /// Pushes a material override to the host and remembers it on success.
    fn apply_material_override(
        &mut self,
        material: NativeHandle,
        options: MaterialOverrideOptions,
        advanced: Option<AdvancedMaterialState>,
    ) -> bool {
        let group = self.native_handle();
        let objects = self.native_objects();
        let applied = self.scene().command(|host| {
            host.set_native_material_override(
                group,
                &objects,
                material,
                options,
                advanced.as_ref(),
            )
        });

        if applied {
            self.override_state_mut().material = Some(AppliedOverride {
                material,
                options,
                advanced,
            });
        }
        applied
    }

    /// Restores the original materials of the group's objects.
    fn clear_material_override(&mut self) -> bool {
        let group = self.native_handle();
        let objects = self.native_objects();
        let cleared = self
            .scene()
            .command(|host| host.clear_native_material_override(group, &objects));

        if cleared {
            self.override_state_mut().material = None;
        }
        cleared
    }

    fn material_override_flags(&self) -> MaterialOverrideOptions {
        self.override_state().flags
    }

    fn has_material_override_flag(&self, flag: MaterialOverrideOptions) -> bool {
        self.override_state().flags.intersects(flag)
    }

    /// Sets or clears flag bits. Only the cached flags change, the next
    /// [`set_material_override`](Group::set_material_override) applies them.
    fn set_material_override_flag(&mut self, flag: MaterialOverrideOptions, state: bool) {
        self.override_state_mut().flags.set(flag, state);
    }

    fn set_material_override_flags(&mut self, flags: MaterialOverrideOptions) {
        self.override_state_mut().flags = flags;
    }

    fn clear_material_override_flags(&mut self) {
        self.override_state_mut().flags = MaterialOverrideOptions::empty();
    }

    /// The property set currently overriding this group, as reported by the host.
    fn prop_set_override(&self) -> Option<PropSet> {
        let group = self.native_handle();
        self.scene()
            .query(None, |host| host.native_prop_set_override(group))
    }

    /// Overrides the properties of every object in the group. [`None`] clears the override.
    fn set_prop_set_override(&mut self, prop_set: Option<&PropSet>) -> bool {
        let Some(prop_set) = prop_set else {
            return self.clear_prop_set_override();
        };

        let group = self.native_handle();
        let objects = self.native_objects();
        let applied = self
            .scene()
            .command(|host| host.set_native_prop_set_override(group, &objects, prop_set));

        if applied {
            self.override_state_mut().prop_set = Some(prop_set.clone());
        }
        applied
    }

    fn clear_prop_set_override(&mut self) -> bool {
        let group = self.native_handle();
        let objects = self.native_objects();
        let cleared = self
            .scene()
            .command(|host| host.clear_native_prop_set_override(group, &objects));

        if cleared {
            self.override_state_mut().prop_set = None;
        }
        cleared
    }
}

/// A generic grouping of native objects (selection sets, groups, ...).
#[derive(Clone)]
pub struct ObjectGroup<'s> {
    scene: &'s Scene,
    native: NativeHandle,
    overrides: OverrideState,
}

impl<'s> ObjectGroup<'s> {
    pub fn new(scene: &'s Scene, native: NativeHandle) -> Self {
        Self {
            scene,
            native,
            overrides: OverrideState::with_flags(scene.config().default_override_flags),
        }
    }
}

impl<'s> Group<'s> for ObjectGroup<'s> {
    fn scene(&self) -> &'s Scene {
        self.scene
    }

    fn native_handle(&self) -> NativeHandle {
        self.native
    }

    fn override_state(&self) -> &OverrideState {
        &self.overrides
    }

    fn override_state_mut(&mut self) -> &mut OverrideState {
        &mut self.overrides
    }
}

/// Groups are the same entity when they wrap the same native handle, regardless of what they
/// have cached.
impl PartialEq for ObjectGroup<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.native == other.native
    }
}

impl Eq for ObjectGroup<'_> {}

impl Debug for ObjectGroup<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectGroup")
            .field("native", &self.native)
            .field("overrides", &self.overrides)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        memory::MemoryHost,
        prop_set::PropValue,
        test_support::{lenient_scene, strict_scene},
    };

    /// A group with three objects, plus one object outside of it.
    fn three_member_host() -> (MemoryHost, NativeHandle, Vec<NativeHandle>, NativeHandle) {
        let mut host = MemoryHost::new();
        let group = host.add_group("Crowd");
        let members: Vec<_> = (0..3)
            .map(|i| {
                let object = host.add_object(format!("extra_{i}"));
                host.assign(group, object);
                object
            })
            .collect();
        let outsider = host.add_object("camera_rig");
        (host, group, members, outsider)
    }

    #[test]
    pub fn emptiness_matches_members() {
        let (mut host, group, _, _) = three_member_host();
        let empty = host.add_group("Nobody");
        let scene = strict_scene(host);

        let crowd = scene.object_group(group);
        assert!(!crowd.is_empty());
        assert_eq!(crowd.objects().len(), 3);

        let nobody = scene.object_group(empty);
        assert!(nobody.is_empty());
        assert!(nobody.objects().is_empty());
    }

    #[test]
    pub fn bulk_visibility_and_freezing() {
        let (host, group, members, outsider) = three_member_host();
        let scene = strict_scene(host);
        let crowd = scene.object_group(group);

        assert!(crowd.hide());
        assert!(crowd.is_hidden());
        assert!(crowd.freeze());
        assert!(crowd.is_frozen());

        {
            let host = scene.host::<MemoryHost>().unwrap();
            assert!(members.iter().all(|&m| host.object(m).unwrap().hidden));
            assert!(!host.object(outsider).unwrap().hidden);
        }

        assert!(crowd.unhide());
        assert!(crowd.unfreeze());
        assert!(!crowd.is_hidden());
        assert!(!crowd.is_frozen());
    }

    #[test]
    pub fn selection() {
        let (mut host, group, members, outsider) = three_member_host();
        let other = host.add_group("Others");
        let scene = strict_scene(host);

        assert!(scene.object_group(group).select());
        assert_eq!(scene.selection().len(), 3);
        assert!(scene.object_group(group).deselect());
        assert!(scene.selection().is_empty());

        scene.host_mut::<MemoryHost>().unwrap().select(&[outsider]);
        assert!(scene.object_group(other).add_selection());
        assert_eq!(scene.object_group(other).objects(), vec![scene.object(outsider)]);

        let first = scene.object(members[0]);
        assert!(scene.object_group(other).add_objects(&[first]));
        assert_eq!(scene.object_group(other).objects().len(), 2);
        assert!(scene.object_group(other).clear_objects());
        assert!(scene.object_group(other).is_empty());
    }

    #[test]
    pub fn isolate_hides_everything_else() {
        let (host, group, members, outsider) = three_member_host();
        let scene = strict_scene(host);

        assert!(scene.object_group(group).isolate());
        let host = scene.host::<MemoryHost>().unwrap();
        assert!(host.object(outsider).unwrap().hidden);
        assert!(members.iter().all(|&m| !host.object(m).unwrap().hidden));
    }

    #[test]
    pub fn override_flags_are_local() {
        let (host, group, _, _) = three_member_host();
        let scene = strict_scene(host);
        let mut crowd = scene.object_group(group);

        crowd.set_material_override_flags(MaterialOverrideOptions::empty());
        crowd.set_material_override_flag(MaterialOverrideOptions::KEEP_OPACITY, true);
        assert!(crowd.has_material_override_flag(MaterialOverrideOptions::KEEP_OPACITY));
        assert_eq!(
            crowd.material_override_flags(),
            MaterialOverrideOptions::KEEP_OPACITY
        );

        // Clearing an already clear flag must not flip it on
        crowd.set_material_override_flag(MaterialOverrideOptions::KEEP_BUMP, false);
        assert!(!crowd.has_material_override_flag(MaterialOverrideOptions::KEEP_BUMP));

        crowd.set_material_override_flag(MaterialOverrideOptions::KEEP_OPACITY, false);
        assert!(crowd.material_override_flags().is_empty());

        crowd.set_material_override_flags(MaterialOverrideOptions::all());
        crowd.clear_material_override_flags();
        assert!(crowd.material_override_flags().is_empty());

        // Nothing was pushed to the host
        assert!(crowd.override_state().material.is_none());
    }

    #[test]
    pub fn material_override_is_idempotent() {
        let (mut host, group, members, _) = three_member_host();
        let chrome = host.add_material("Chrome");
        let scene = strict_scene(host);
        let mut crowd = scene.object_group(group);
        crowd.set_material_override_flag(MaterialOverrideOptions::KEEP_BUMP, true);

        let material = scene.material(chrome);
        assert!(crowd.set_material_override(Some(&material), None));
        let once = scene.host::<MemoryHost>().unwrap().object(members[0]).cloned();
        assert!(crowd.set_material_override(Some(&material), None));
        let twice = scene.host::<MemoryHost>().unwrap().object(members[0]).cloned();

        assert_eq!(once, twice);
        assert_eq!(crowd.material_override(), Some(material));
        assert_eq!(
            crowd.override_state().material.as_ref().unwrap().options,
            MaterialOverrideOptions::KEEP_BUMP
        );

        assert!(crowd.clear_material_override());
        assert_eq!(crowd.material_override(), None);
        assert!(crowd.override_state().material.is_none());
    }

    #[test]
    pub fn prop_set_override() {
        let (host, group, _, _) = three_member_host();
        let scene = strict_scene(host);
        let mut crowd = scene.object_group(group);
        let matte = PropSet::new("matte").with("primaryVisibility", PropValue::Bool(false));

        assert!(crowd.set_prop_set_override(Some(&matte)));
        assert_eq!(crowd.prop_set_override(), Some(matte.clone()));
        assert_eq!(crowd.override_state().prop_set, Some(matte));

        assert!(crowd.set_prop_set_override(None));
        assert_eq!(crowd.prop_set_override(), None);
        assert_eq!(crowd.override_state().prop_set, None);
    }

    #[test]
    pub fn equality_ignores_cached_state() {
        let (host, group, _, _) = three_member_host();
        let scene = strict_scene(host);

        let a = scene.object_group(group);
        let mut b = scene.object_group(group);
        b.set_material_override_flags(MaterialOverrideOptions::all());

        assert_eq!(a, b);
        assert_ne!(a, scene.object_group(NativeHandle(12345)));
    }

    #[test]
    pub fn unsupported_membership_fails_quietly() {
        let (host, group, members, _) = three_member_host();
        let scene = lenient_scene(host.without_membership_changes());
        let crowd = scene.object_group(group);

        assert!(!crowd.add_objects(&[scene.object(members[0])]));
        assert!(!crowd.add_selection());
        assert!(!crowd.clear_objects());
        assert_eq!(crowd.objects().len(), 3);
    }

    #[test]
    pub fn group_names_and_removal() {
        let (host, group, members, _) = three_member_host();
        let scene = strict_scene(host);
        let crowd = scene.object_group(group);

        assert_eq!(crowd.group_name(), "Crowd");
        assert!(crowd.set_group_name("Extras"));
        assert_eq!(crowd.group_name(), "Extras");

        assert!(crowd.remove(true));
        let host = scene.host::<MemoryHost>().unwrap();
        assert!(members.iter().all(|&m| host.object(m).is_none()));
    }
}
