use crate::{memory::MemoryHost, HookPolicy, Scene, SceneConfig};

/// A scene where missing hooks degrade to defaults.
pub fn lenient_scene(host: MemoryHost) -> Scene {
    Scene::new(host, SceneConfig::new().hook_policy(HookPolicy::Lenient))
}

/// A scene where missing hooks panic.
pub fn strict_scene(host: MemoryHost) -> Scene {
    Scene::new(host, SceneConfig::new().hook_policy(HookPolicy::Strict))
}
