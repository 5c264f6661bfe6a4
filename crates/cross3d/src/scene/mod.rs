//! # The scene context
//! A [`Scene`] owns the host integration and hands out wrappers (layers, groups, atmospherics,
//! ...) around the host's native entities. Wrappers borrow the scene, so they can't outlive it.
//!
//! Every hook call goes through the scene, which is where missing or failing hooks are turned
//! into typed defaults (or a panic, see [`HookPolicy`]).

use crate::{
    atmospheric::Atmospheric,
    config::{HookPolicy, SceneConfig},
    error::{HookError, HookResult},
    group::ObjectGroup,
    host::Host,
    layer::Layer,
    layer_group::LayerGroup,
    material::{SceneMap, SceneMaterial},
    object::SceneObject,
    state::StateNode,
    NativeColor, NativeHandle,
};
use cross3d_utils::color::RGBA8;
use log::*;
use std::{
    cell::{Ref, RefCell, RefMut},
    mem,
};

mod signal;
pub use signal::Signal;

pub struct Scene {
    host: RefCell<Box<dyn Host>>,
    config: SceneConfig,
    layer_state_changed: RefCell<Signal>,
}

impl Scene {
    /// Creates a scene context around a host integration.
    pub fn new(host: impl Host, config: SceneConfig) -> Self {
        Self {
            host: RefCell::new(Box::new(host)),
            config,
            layer_state_changed: RefCell::new(Signal::new()),
        }
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    /// Borrows the host as its concrete type. Returns [`None`] if the host is of another type.
    ///
    /// ## Panics
    /// Panics if the host is currently borrowed mutably.
    pub fn host<H: Host>(&self) -> Option<Ref<'_, H>> {
        Ref::filter_map(self.host.borrow(), |host| host.as_any().downcast_ref::<H>()).ok()
    }

    /// Mutably borrows the host as its concrete type. Returns [`None`] if the host is of another
    /// type.
    ///
    /// ## Panics
    /// Panics if the host is already borrowed.
    pub fn host_mut<H: Host>(&self) -> Option<RefMut<'_, H>> {
        RefMut::filter_map(self.host.borrow_mut(), |host| {
            host.as_any_mut().downcast_mut::<H>()
        })
        .ok()
    }

    /// Runs a read-only hook, degrading to `fallback` if it fails.
    pub(crate) fn query<T>(&self, fallback: T, f: impl FnOnce(&dyn Host) -> HookResult<T>) -> T {
        let result = {
            let host = self.host.borrow();
            f(host.as_ref())
        };
        self.settle(result, fallback)
    }

    /// Runs a mutating hook, returning whether it succeeded.
    pub(crate) fn command(&self, f: impl FnOnce(&mut dyn Host) -> HookResult) -> bool {
        let result = {
            let mut host = self.host.borrow_mut();
            f(host.as_mut())
        };
        self.settle(result.map(|_| true), false)
    }

    /// Like [`Scene::query`], for hooks that are only needed when the host has the capability
    /// anyway. A missing hook yields `fallback` regardless of the hook policy.
    pub(crate) fn optional_query<T>(
        &self,
        fallback: T,
        f: impl FnOnce(&dyn Host) -> HookResult<T>,
    ) -> T {
        let result = {
            let host = self.host.borrow();
            f(host.as_ref())
        };
        match result {
            Err(HookError::NotImplemented(hook)) => {
                trace!("Host hook `{hook}` is not implemented, skipping");
                fallback
            }
            result => self.settle(result, fallback),
        }
    }

    /// Like [`Scene::command`], for bookkeeping hooks. A missing hook counts as success
    /// regardless of the hook policy, only actual failures return `false`.
    pub(crate) fn optional_command(&self, f: impl FnOnce(&mut dyn Host) -> HookResult) -> bool {
        let result = {
            let mut host = self.host.borrow_mut();
            f(host.as_mut())
        };
        match result {
            Err(HookError::NotImplemented(hook)) => {
                trace!("Host hook `{hook}` is not implemented, skipping");
                true
            }
            result => self.settle(result.map(|_| true), false),
        }
    }

    fn settle<T>(&self, result: HookResult<T>, fallback: T) -> T {
        match result {
            Ok(value) => value,
            Err(HookError::NotImplemented(hook)) => match self.config.hook_policy {
                HookPolicy::Strict => panic!("host hook `{hook}` is not implemented"),
                HookPolicy::Lenient => {
                    debug!("Host hook `{hook}` is not implemented, using a default");
                    fallback
                }
            },
            Err(err) => {
                warn!("{err}");
                fallback
            }
        }
    }

    pub(crate) fn native_name(&self, handle: NativeHandle) -> String {
        self.query(String::new(), |host| host.native_name(handle))
    }

    pub(crate) fn native_unique_id(&self, handle: NativeHandle) -> u64 {
        self.query(0, |host| host.native_unique_id(handle))
    }

    /// Wraps a native layer.
    pub fn layer(&self, handle: NativeHandle) -> Layer<'_> {
        Layer::new(self, handle)
    }

    /// Wraps a native object grouping.
    pub fn object_group(&self, handle: NativeHandle) -> ObjectGroup<'_> {
        ObjectGroup::new(self, handle)
    }

    pub fn object(&self, handle: NativeHandle) -> SceneObject<'_> {
        SceneObject::new(self, handle)
    }

    pub fn material(&self, handle: NativeHandle) -> SceneMaterial<'_> {
        SceneMaterial::new(self, handle)
    }

    pub fn map(&self, handle: NativeHandle) -> SceneMap<'_> {
        SceneMap::new(self, handle)
    }

    pub fn atmospheric(&self, handle: NativeHandle) -> Atmospheric<'_> {
        Atmospheric::new(self, handle)
    }

    /// Returns every layer of the scene.
    pub fn layers(&self) -> Vec<Layer<'_>> {
        self.query(vec![], |host| host.native_layers())
            .into_iter()
            .map(|handle| Layer::new(self, handle))
            .collect()
    }

    /// Returns the root layer every scene has.
    pub fn world_layer(&self) -> Option<Layer<'_>> {
        self.layers().into_iter().find(|layer| layer.is_world_layer())
    }

    pub fn active_layer(&self) -> Option<Layer<'_>> {
        self.layers().into_iter().find(|layer| layer.is_active())
    }

    pub fn find_layer(&self, name: &str, unique_id: u64) -> Option<Layer<'_>> {
        self.query(None, |host| host.find_native_layer(name, unique_id))
            .map(|handle| Layer::new(self, handle))
    }

    pub fn atmospherics(&self) -> Vec<Atmospheric<'_>> {
        self.query(vec![], |host| host.native_atmospherics())
            .into_iter()
            .map(|handle| Atmospheric::new(self, handle))
            .collect()
    }

    pub fn find_atmospheric(&self, name: &str, unique_id: u64) -> Option<Atmospheric<'_>> {
        self.query(None, |host| host.find_native_atmospheric(name, unique_id))
            .map(|handle| Atmospheric::new(self, handle))
    }

    pub fn find_layer_group(&self, name: &str) -> Option<LayerGroup<'_>> {
        self.query(None, |host| host.find_native_layer_group(name))
            .map(|handle| LayerGroup::new(self, handle))
    }

    pub fn find_material(&self, name: &str, unique_id: u64) -> Option<SceneMaterial<'_>> {
        self.query(None, |host| host.find_native_material(name, unique_id))
            .map(|handle| SceneMaterial::new(self, handle))
    }

    pub fn find_map(&self, name: &str, unique_id: u64) -> Option<SceneMap<'_>> {
        self.query(None, |host| host.find_native_map(name, unique_id))
            .map(|handle| SceneMap::new(self, handle))
    }

    /// Returns the currently selected objects.
    pub fn selection(&self) -> Vec<SceneObject<'_>> {
        self.native_selection()
            .into_iter()
            .map(|handle| SceneObject::new(self, handle))
            .collect()
    }

    pub(crate) fn native_selection(&self) -> Vec<NativeHandle> {
        self.query(vec![], |host| host.native_selection())
    }

    pub fn environment_map_override(&self) -> Option<SceneMap<'_>> {
        self.query(None, |host| host.native_environment_map_override())
            .map(|handle| SceneMap::new(self, handle))
    }

    /// Sets the global environment map override. [`None`] clears it.
    pub fn set_environment_map_override(&self, map: Option<&SceneMap<'_>>) -> bool {
        let native = map.map(SceneMap::native_handle);
        self.command(|host| host.set_native_environment_map_override(native))
    }

    pub fn to_native_color(&self, color: RGBA8) -> Option<NativeColor> {
        self.query(None, |host| host.to_native_color(color).map(Some))
    }

    pub fn from_native_color(&self, color: NativeColor) -> Option<RGBA8> {
        self.query(None, |host| host.from_native_color(color).map(Some))
    }

    /// Registers a listener called whenever the layer state of the scene changes in bulk.
    pub fn on_layer_state_changed(&self, mut listener: impl FnMut() + 'static) {
        self.layer_state_changed
            .borrow_mut()
            .connect(move |_| listener());
    }

    /// Notifies the host and every listener that layer states have changed.
    ///
    /// Listeners may use the scene, but emitting from inside a listener doesn't notify listeners
    /// again.
    pub fn emit_layer_state_changed(&self) {
        self.command(|host| host.layer_state_changed());

        let mut listeners = mem::take(&mut *self.layer_state_changed.borrow_mut());
        listeners.emit(());

        // Listeners connected during emission were put into the (now empty) scene signal
        let mut current = self.layer_state_changed.borrow_mut();
        listeners.append(&mut current);
        *current = listeners;
    }

    /// Records the state of every visible layer as children of `doc`. Returns how many layers
    /// were recorded.
    pub fn record_layer_states(&self, doc: &mut StateNode) -> usize {
        let recorded = self
            .layers()
            .iter()
            .filter(|layer| layer.record_layer_state(doc))
            .count();
        debug!("Recorded the state of {recorded} layer(s)");
        recorded
    }

    /// Restores every layer of the scene from `doc`. Layers without a node in the document are
    /// made visible and have their overrides cleared. Returns how many layers were found in the
    /// document.
    pub fn restore_layer_states(&self, doc: &StateNode) -> usize {
        let mut restored = 0;
        for mut layer in self.layers() {
            let node = layer.find_state_node(doc);
            if layer.restore_layer_state(node) {
                restored += 1;
            }
        }
        debug!("Restored the state of {restored} layer(s)");
        self.emit_layer_state_changed();
        restored
    }
}
