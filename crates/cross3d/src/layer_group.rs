use crate::layer::Layer;

scene_wrapper! {
    /// Organizational grouping of layers.
    LayerGroup
}

named_wrapper!(LayerGroup);

impl<'s> LayerGroup<'s> {
    /// Name of the group, as shown by the host.
    pub fn group_name(&self) -> String {
        self.name()
    }

    /// Layers of the scene that belong to this group, in their group order.
    pub fn layers(&self) -> Vec<Layer<'s>> {
        let mut layers: Vec<_> = self
            .scene
            .layers()
            .into_iter()
            .filter(|layer| layer.layer_group().as_ref() == Some(self))
            .collect();
        layers.sort_by_key(|layer| layer.layer_group_order());
        layers
    }
}
