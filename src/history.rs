//! Linear undo log of layer snapshots.
//!
//! Every committed stroke appends an entry holding deep copies of the
//! layers it touched. The log keeps a cursor at the "current" entry;
//! undo restores the entry before the cursor, redo re-applies the entry
//! after it, and recording while the cursor sits before the tail discards
//! the abandoned future (linear timeline, no branches).

use crate::draw::PixelBuffer;
use crate::layers::{LayerId, LayerSettings, LayerStack};
use log::debug;

/// Deep-copied state of one layer at a point in time.
///
/// The image may be smaller than the composition (the initial entry uses a
/// 1x1 transparent placeholder); restoration scales with nearest-neighbor
/// sampling, which floods the layer for the placeholder case.
#[derive(Clone, Debug)]
pub struct LayerSnapshot {
    pub layer_id: LayerId,
    pub image: PixelBuffer,
    pub settings: LayerSettings,
}

impl LayerSnapshot {
    /// Captures a layer's pixel content and attributes.
    pub fn capture(layer: &crate::layers::Layer) -> Self {
        Self {
            layer_id: layer.id(),
            image: layer.buffer.snapshot(),
            settings: LayerSettings::of(layer),
        }
    }
}

/// The set of layer snapshots recorded for one action.
#[derive(Clone, Debug, Default)]
pub struct HistoryEntry {
    pub snapshots: Vec<LayerSnapshot>,
}

impl HistoryEntry {
    /// Entry holding a single layer snapshot.
    pub fn single(snapshot: LayerSnapshot) -> Self {
        Self {
            snapshots: vec![snapshot],
        }
    }
}

/// Append-mostly undo log with a cursor.
#[derive(Debug, Default)]
pub struct HistoryLog {
    entries: Vec<HistoryEntry>,
    cursor: usize,
}

impl HistoryLog {
    /// Creates an empty log. Callers prime it with an initial entry so the
    /// pre-edit state is always restorable.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries currently in the log.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when the log holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Index of the current entry.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Whether an undo step is available.
    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    /// Whether a redo step is available.
    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.entries.len()
    }

    /// Appends an entry at the cursor.
    ///
    /// Entries beyond the cursor (skipped by undo) are discarded first;
    /// once a new edit lands, the abandoned future is unreachable.
    pub fn record(&mut self, entry: HistoryEntry) {
        if !self.entries.is_empty() {
            let tail = self.entries.len() - 1 - self.cursor;
            if tail > 0 {
                debug!("Discarding {tail} redoable history entries");
            }
            self.entries.truncate(self.cursor + 1);
        }
        self.entries.push(entry);
        self.cursor = self.entries.len() - 1;
    }

    /// Steps the cursor back and restores the previous entry's snapshots.
    ///
    /// Layers referenced by the entry but missing from the stack (deleted
    /// since the snapshot) are re-inserted on top before restoring. A
    /// no-op returning `false` when already at the first entry.
    pub fn undo(&mut self, stack: &mut LayerStack) -> bool {
        if !self.can_undo() {
            return false;
        }
        self.cursor -= 1;
        apply_entry(stack, &self.entries[self.cursor]);
        true
    }

    /// Steps the cursor forward and restores that entry's snapshots.
    ///
    /// A no-op returning `false` when already at the last entry.
    pub fn redo(&mut self, stack: &mut LayerStack) -> bool {
        if !self.can_redo() {
            return false;
        }
        self.cursor += 1;
        apply_entry(stack, &self.entries[self.cursor]);
        true
    }
}

fn apply_entry(stack: &mut LayerStack, entry: &HistoryEntry) {
    for snapshot in &entry.snapshots {
        if stack.index_of(snapshot.layer_id).is_none() {
            debug!("Resurrecting deleted layer for history restore");
            stack.resurrect_layer(snapshot.layer_id, snapshot.settings.clone());
        }
        let layer = stack
            .layer_mut(snapshot.layer_id)
            .expect("layer present after resurrection");
        layer.buffer.restore_scaled(&snapshot.image);
        // Whole-stroke redraws roll back to `committed`; keep it in sync
        // with the restored content so the next stroke starts from here.
        layer.commit();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draw::Color;

    fn stack_with_layer() -> (LayerStack, LayerId) {
        let mut stack = LayerStack::new(4, 4);
        let id = stack.add_layer(0);
        (stack, id)
    }

    fn primed_log(stack: &LayerStack, id: LayerId) -> HistoryLog {
        let mut log = HistoryLog::new();
        log.record(HistoryEntry::single(LayerSnapshot::capture(
            stack.layer(id).unwrap(),
        )));
        log
    }

    fn paint(stack: &mut LayerStack, id: LayerId, x: i32, value: u8) {
        stack
            .layer_mut(id)
            .unwrap()
            .buffer
            .set(x, 0, Color::rgb(value, 0, 0).pack());
    }

    fn record_state(log: &mut HistoryLog, stack: &LayerStack, id: LayerId) {
        log.record(HistoryEntry::single(LayerSnapshot::capture(
            stack.layer(id).unwrap(),
        )));
    }

    #[test]
    fn undo_restores_each_prior_snapshot() {
        let (mut stack, id) = stack_with_layer();
        let mut log = primed_log(&stack, id);

        for i in 0..3 {
            paint(&mut stack, id, i, 100 + i as u8);
            record_state(&mut log, &stack, id);
        }

        assert!(log.undo(&mut stack));
        assert!(log.undo(&mut stack));
        // Back to the state after the first stroke only.
        let buf = &stack.layer(id).unwrap().buffer;
        assert_eq!(buf.color_at(0, 0), Color::rgb(100, 0, 0));
        assert_eq!(buf.get(1, 0), 0);
    }

    #[test]
    fn recording_after_undo_truncates_the_future() {
        let (mut stack, id) = stack_with_layer();
        let mut log = primed_log(&stack, id);

        for i in 0..3 {
            paint(&mut stack, id, i, 10);
            record_state(&mut log, &stack, id);
        }
        assert_eq!(log.len(), 4);

        log.undo(&mut stack);
        log.undo(&mut stack);
        paint(&mut stack, id, 3, 99);
        record_state(&mut log, &stack, id);

        assert_eq!(log.len(), 3);
        assert!(!log.can_redo());
    }

    #[test]
    fn redo_reapplies_an_undone_entry() {
        let (mut stack, id) = stack_with_layer();
        let mut log = primed_log(&stack, id);

        paint(&mut stack, id, 0, 42);
        record_state(&mut log, &stack, id);

        assert!(log.undo(&mut stack));
        assert_eq!(stack.layer(id).unwrap().buffer.get(0, 0), 0);

        assert!(log.redo(&mut stack));
        assert_eq!(
            stack.layer(id).unwrap().buffer.color_at(0, 0),
            Color::rgb(42, 0, 0)
        );
        assert!(!log.redo(&mut stack));
    }

    #[test]
    fn undo_at_the_first_entry_is_a_no_op() {
        let (mut stack, id) = stack_with_layer();
        let mut log = primed_log(&stack, id);
        assert!(!log.undo(&mut stack));
    }

    #[test]
    fn snapshots_are_isolated_from_later_edits() {
        let (mut stack, id) = stack_with_layer();
        let mut log = primed_log(&stack, id);

        paint(&mut stack, id, 0, 1);
        record_state(&mut log, &stack, id);
        // Mutate after recording; the snapshot must not see it.
        paint(&mut stack, id, 0, 2);

        log.record(HistoryEntry::single(LayerSnapshot::capture(
            stack.layer(id).unwrap(),
        )));
        log.undo(&mut stack);
        assert_eq!(
            stack.layer(id).unwrap().buffer.color_at(0, 0),
            Color::rgb(1, 0, 0)
        );
    }

    #[test]
    fn undo_resurrects_a_deleted_layer() {
        let (mut stack, id) = stack_with_layer();
        let mut log = primed_log(&stack, id);

        paint(&mut stack, id, 0, 7);
        record_state(&mut log, &stack, id);

        let index = stack.index_of(id).unwrap();
        stack.remove_layer(index);
        assert!(stack.is_empty());

        assert!(log.undo(&mut stack));
        let layer = stack.layer(id).expect("layer resurrected");
        // Restored to the initial (blank) snapshot.
        assert_eq!(layer.buffer.get(0, 0), 0);
        assert_eq!(layer.buffer.width(), 4);
    }
}
