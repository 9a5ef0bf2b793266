//! Ordered, named layers and the scene nodes each of them owns.

use crate::scene::NodeId;

/// A layer, identified by its position in the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layer {
    pub name: String,
    pub visible: bool,
    /// Strokes of this layer were skipped by a redraw while it was hidden.
    pub(crate) pending_replay: bool,
}

/// Layers, their object lists and the current layer.
#[derive(Debug, Clone, Default)]
pub struct LayerRegistry {
    layers: Vec<Layer>,
    /// Node handles owned by each layer, in insertion order.
    objects: Vec<Vec<NodeId>>,
    current: Option<usize>,
}

impl LayerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn layer(&self, index: usize) -> Option<&Layer> {
        self.layers.get(index)
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn current(&self) -> Option<usize> {
        self.current
    }

    /// Append a visible layer and make it current. Returns its index.
    pub fn add_layer(&mut self) -> usize {
        let index = self.layers.len();
        self.layers.push(Layer {
            name: format!("Layer {}", index + 1),
            visible: true,
            pending_replay: false,
        });
        self.objects.push(Vec::new());
        self.current = Some(index);
        log::info!("Added layer {}", index + 1);
        index
    }

    /// Remove a layer and return the nodes it owned.
    ///
    /// The current layer keeps pointing at the same layer when a lower one
    /// is removed; removing the current layer selects the new last layer.
    pub fn delete_layer(&mut self, index: usize) -> Option<Vec<NodeId>> {
        if index >= self.layers.len() {
            log::debug!("No layer {index} to delete");
            return None;
        }
        self.layers.remove(index);
        let owned = self.objects.remove(index);
        self.current = match self.current {
            Some(current) if current == index => self.layers.len().checked_sub(1),
            Some(current) if current > index => Some(current - 1),
            other => other,
        };
        log::info!("Deleted layer {}", index + 1);
        Some(owned)
    }

    /// Remove the last layer, if any.
    pub fn remove_last_layer(&mut self) -> Option<Vec<NodeId>> {
        let last = self.layers.len().checked_sub(1)?;
        self.delete_layer(last)
    }

    /// Flip a layer's visibility. Returns the new state.
    pub fn toggle_visibility(&mut self, index: usize) -> Option<bool> {
        let layer = self.layers.get_mut(index)?;
        layer.visible = !layer.visible;
        Some(layer.visible)
    }

    pub fn set_current(&mut self, index: usize) -> bool {
        if index < self.layers.len() {
            self.current = Some(index);
            true
        } else {
            false
        }
    }

    /// Nodes owned by a layer.
    pub fn objects(&self, index: usize) -> &[NodeId] {
        self.objects.get(index).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Assign a node to a layer.
    pub fn register(&mut self, index: usize, node: NodeId) -> bool {
        match self.objects.get_mut(index) {
            Some(objects) => {
                objects.push(node);
                true
            }
            None => false,
        }
    }

    /// Drop a node from whichever layer owns it.
    pub fn unregister(&mut self, node: NodeId) -> Option<usize> {
        let index = self.layer_of(node)?;
        self.objects[index].retain(|&id| id != node);
        Some(index)
    }

    /// Index of the layer owning a node.
    pub fn layer_of(&self, node: NodeId) -> Option<usize> {
        self.objects
            .iter()
            .position(|objects| objects.contains(&node))
    }

    /// Keep only the nodes matching `keep`, in every layer.
    pub fn retain_objects(&mut self, mut keep: impl FnMut(NodeId) -> bool) {
        for objects in &mut self.objects {
            objects.retain(|&id| keep(id));
        }
    }

    pub(crate) fn mark_pending_replay(&mut self, index: usize) {
        if let Some(layer) = self.layers.get_mut(index) {
            layer.pending_replay = true;
        }
    }

    /// Clear and return the pending-replay flag of a layer.
    pub(crate) fn take_pending_replay(&mut self, index: usize) -> bool {
        self.layers
            .get_mut(index)
            .map(|layer| std::mem::take(&mut layer.pending_replay))
            .unwrap_or(false)
    }
}
