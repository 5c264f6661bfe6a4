scene_wrapper! {
    /// A single native scene object.
    SceneObject
}

named_wrapper!(SceneObject);
