//! Layer records and the ordered layer stack.
//!
//! A composition is a fixed-size stack of layers painted bottom-to-top.
//! Each layer owns two rasters: the live buffer that tools mutate and a
//! `committed` backup captured at the end of the previous stroke, which the
//! whole-stroke-redraw path rolls back to between pointer moves.

use crate::draw::{DirtyRect, PixelBuffer};
use serde::{Deserialize, Serialize};

/// Stable identity for a layer, independent of its stack position.
///
/// History entries reference layers by id so undo can find (or resurrect)
/// them after reorders and deletions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LayerId(u64);

/// How a layer combines with the content below it during flattening.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlendMode {
    #[default]
    Normal,
    Multiply,
    Screen,
    Darken,
    Lighten,
}

/// One paint surface in the composition.
#[derive(Clone, Debug)]
pub struct Layer {
    id: LayerId,
    /// Live raster that tools mutate during a stroke.
    pub buffer: PixelBuffer,
    /// Backup of the buffer as of the last committed stroke.
    pub committed: PixelBuffer,
    /// Hidden layers are skipped during flattening but stay in the stack
    /// and in history.
    pub visible: bool,
    pub blend_mode: BlendMode,
    /// Layer opacity in percent, 0-100.
    pub opacity: u8,
    pub name: String,
}

impl Layer {
    fn new(id: LayerId, width: u32, height: u32, name: String) -> Self {
        let buffer = PixelBuffer::new(width, height);
        let committed = buffer.snapshot();
        Self {
            id,
            buffer,
            committed,
            visible: true,
            blend_mode: BlendMode::Normal,
            opacity: 100,
            name,
        }
    }

    /// The layer's stable identity.
    pub fn id(&self) -> LayerId {
        self.id
    }

    /// Captures the live buffer as the new committed state.
    pub fn commit(&mut self) {
        self.committed = self.buffer.snapshot();
    }

    /// Rolls a region of the live buffer back to the committed state.
    pub fn roll_back_region(&mut self, rect: DirtyRect) {
        self.buffer.restore_region(&self.committed, rect);
    }
}

/// Ordered collection of layers sharing the composition's dimensions.
///
/// Index 0 paints first (bottom). At most one layer is active; tools only
/// ever touch the active layer.
#[derive(Clone, Debug)]
pub struct LayerStack {
    width: u32,
    height: u32,
    layers: Vec<Layer>,
    active: Option<LayerId>,
    next_id: u64,
}

impl LayerStack {
    /// Creates an empty stack for a `width` x `height` composition.
    ///
    /// Dimensions are fixed for the lifetime of the composition.
    pub fn new(width: u32, height: u32) -> Self {
        assert!(width > 0 && height > 0, "composition must be non-empty");
        Self {
            width,
            height,
            layers: Vec::new(),
            active: None,
            next_id: 0,
        }
    }

    /// Composition width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Composition height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Number of layers in the stack.
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// Returns true when the stack holds no layers.
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Iterates the layers bottom-to-top.
    pub fn iter(&self) -> impl Iterator<Item = &Layer> {
        self.layers.iter()
    }

    fn allocate_id(&mut self) -> LayerId {
        let id = LayerId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Inserts a new fully transparent layer at `index` and returns its id.
    ///
    /// Subsequent layers shift up. The new layer is immediately part of the
    /// composite order but is not made active.
    pub fn add_layer(&mut self, index: usize) -> LayerId {
        let id = self.allocate_id();
        let name = format!("Layer {}", self.next_id);
        let layer = Layer::new(id, self.width, self.height, name);
        self.layers.insert(index, layer);
        id
    }

    /// Re-inserts a previously removed layer on top of the stack.
    ///
    /// Undo uses this to resurrect layers referenced by a history entry.
    /// The layer's buffers are reallocated at composition size; the caller
    /// restores pixel content from the snapshot afterwards.
    pub fn resurrect_layer(&mut self, id: LayerId, meta: LayerSettings) -> &mut Layer {
        debug_assert!(self.index_of(id).is_none(), "layer already present");
        let mut layer = Layer::new(id, self.width, self.height, meta.name);
        layer.visible = meta.visible;
        layer.blend_mode = meta.blend_mode;
        layer.opacity = meta.opacity;
        self.layers.push(layer);
        self.layers.last_mut().unwrap()
    }

    /// Detaches and returns the layer at `index`.
    ///
    /// If the removed layer was active, no other layer is auto-selected;
    /// the caller re-selects as needed.
    pub fn remove_layer(&mut self, index: usize) -> Layer {
        let layer = self.layers.remove(index);
        if self.active == Some(layer.id) {
            self.active = None;
        }
        layer
    }

    /// Moves the layer at `from` to position `to` without touching pixels.
    pub fn move_layer(&mut self, from: usize, to: usize) {
        let layer = self.layers.remove(from);
        self.layers.insert(to, layer);
    }

    /// Toggles the active layer.
    ///
    /// Activating the already-active layer clears the selection.
    pub fn toggle_active(&mut self, id: LayerId) {
        if self.active == Some(id) {
            self.active = None;
        } else {
            self.active = Some(id);
        }
    }

    /// Id of the active layer, if one is selected.
    pub fn active_id(&self) -> Option<LayerId> {
        self.active
    }

    /// The active layer, if one is selected.
    pub fn active_layer(&self) -> Option<&Layer> {
        self.active.and_then(|id| self.layer(id))
    }

    /// Mutable access to the active layer.
    pub fn active_layer_mut(&mut self) -> Option<&mut Layer> {
        let id = self.active?;
        self.layer_mut(id)
    }

    /// Stack position of the layer with the given id.
    pub fn index_of(&self, id: LayerId) -> Option<usize> {
        self.layers.iter().position(|l| l.id == id)
    }

    /// Looks a layer up by id.
    pub fn layer(&self, id: LayerId) -> Option<&Layer> {
        self.layers.iter().find(|l| l.id == id)
    }

    /// Looks a layer up by id, mutably.
    pub fn layer_mut(&mut self, id: LayerId) -> Option<&mut Layer> {
        self.layers.iter_mut().find(|l| l.id == id)
    }

    /// The layer at a stack position.
    pub fn layer_at(&self, index: usize) -> &Layer {
        &self.layers[index]
    }

    /// The layer at a stack position, mutably.
    pub fn layer_at_mut(&mut self, index: usize) -> &mut Layer {
        &mut self.layers[index]
    }

    /// Marks a layer visible.
    pub fn show_layer(&mut self, id: LayerId) {
        if let Some(layer) = self.layer_mut(id) {
            layer.visible = true;
        }
    }

    /// Marks a layer hidden. It stays in the stack and in history.
    pub fn hide_layer(&mut self, id: LayerId) {
        if let Some(layer) = self.layer_mut(id) {
            layer.visible = false;
        }
    }
}

/// Non-pixel layer attributes, as carried by history snapshots and the
/// save-file metadata block.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerSettings {
    pub visible: bool,
    pub blend_mode: BlendMode,
    pub opacity: u8,
    pub name: String,
}

impl LayerSettings {
    /// Captures the non-pixel attributes of a layer.
    pub fn of(layer: &Layer) -> Self {
        Self {
            visible: layer.visible,
            blend_mode: layer.blend_mode,
            opacity: layer.opacity,
            name: layer.name.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_remove_and_move_keep_order() {
        let mut stack = LayerStack::new(4, 4);
        let bottom = stack.add_layer(0);
        let top = stack.add_layer(1);
        let middle = stack.add_layer(1);
        assert_eq!(stack.index_of(bottom), Some(0));
        assert_eq!(stack.index_of(middle), Some(1));
        assert_eq!(stack.index_of(top), Some(2));

        stack.move_layer(0, 2);
        assert_eq!(stack.index_of(bottom), Some(2));

        let removed = stack.remove_layer(0);
        assert_eq!(removed.id(), middle);
        assert_eq!(stack.len(), 2);
    }

    #[test]
    fn toggle_active_clears_on_second_toggle() {
        let mut stack = LayerStack::new(4, 4);
        let id = stack.add_layer(0);
        stack.toggle_active(id);
        assert_eq!(stack.active_id(), Some(id));
        stack.toggle_active(id);
        assert_eq!(stack.active_id(), None);
    }

    #[test]
    fn removing_the_active_layer_clears_selection() {
        let mut stack = LayerStack::new(4, 4);
        let a = stack.add_layer(0);
        let b = stack.add_layer(1);
        stack.toggle_active(a);
        stack.remove_layer(0);
        assert_eq!(stack.active_id(), None);
        assert_eq!(stack.index_of(b), Some(0));
    }

    #[test]
    fn new_layers_match_composition_dimensions() {
        let mut stack = LayerStack::new(7, 5);
        let id = stack.add_layer(0);
        let layer = stack.layer(id).unwrap();
        assert_eq!(layer.buffer.width(), 7);
        assert_eq!(layer.buffer.height(), 5);
        assert_eq!(layer.committed.width(), 7);
    }

    #[test]
    fn hide_and_show_only_touch_the_flag() {
        let mut stack = LayerStack::new(4, 4);
        let id = stack.add_layer(0);
        stack.hide_layer(id);
        assert!(!stack.layer(id).unwrap().visible);
        stack.show_layer(id);
        assert!(stack.layer(id).unwrap().visible);
    }
}
