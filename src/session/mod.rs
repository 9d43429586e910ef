//! Stroke session coordination.
//!
//! [`Canvas`] ties the layer stack, tool dispatch, and history log together
//! behind three pointer callbacks (`touch_start`, `touch_move`, `touch_end`).
//! Each contact is tracked independently by its touch id, so multi-touch
//! drawing accumulates several point runs at once; all of them write to the
//! single active layer and their dirty regions merge into one bounding
//! rectangle per frame.

use std::collections::HashMap;

use log::{debug, warn};

use crate::config::StyleConfig;
use crate::draw::{BLACK, Color, DirtyRect, DirtyTracker, PixelBuffer, composite};
use crate::history::{HistoryEntry, HistoryLog, LayerSnapshot};
use crate::io::{self, FormatError, SaveError};
use crate::layers::{LayerSettings, LayerStack};
use crate::tools::{StrokePoint, ToolKind};


/// Composition dimensions for a new canvas.
#[derive(Clone, Copy, Debug)]
pub struct CanvasOptions {
    /// Logical width in pixels.
    pub width: u32,
    /// Logical height in pixels.
    pub height: u32,
}

impl Default for CanvasOptions {
    /// A4 portrait at 300 dpi.
    fn default() -> Self {
        Self {
            width: 2480,
            height: 3508,
        }
    }
}

/// One tracked contact and the points it has delivered so far.
#[derive(Debug, Default)]
struct Contact {
    points: Vec<StrokePoint>,
    active: bool,
}

/// A drawing session over a layered composition.
pub struct Canvas {
    /// Layer stack holding all pixel content.
    pub layers: LayerStack,
    /// Undo log of committed strokes.
    pub history: HistoryLog,
    foreground: Color,
    tool: ToolKind,
    styles: StyleConfig,
    contacts: HashMap<i32, Contact>,
    active_contacts: usize,
    dirty: DirtyTracker,
    needs_redraw: bool,
    display_width: u32,
    display_height: u32,
}

impl Canvas {
    /// Creates a canvas with one transparent active layer.
    ///
    /// The history log is primed with a 1x1 placeholder snapshot of that
    /// layer, so undoing all strokes restores a blank composition instead
    /// of hitting an empty log.
    pub fn new(options: CanvasOptions, styles: StyleConfig) -> Self {
        let mut layers = LayerStack::new(options.width, options.height);
        let id = layers.add_layer(0);
        layers.toggle_active(id);

        let mut history = HistoryLog::new();
        let placeholder = LayerSnapshot {
            layer_id: id,
            image: PixelBuffer::new(1, 1),
            settings: LayerSettings::of(layers.layer(id).unwrap()),
        };
        history.record(HistoryEntry::single(placeholder));

        Self {
            layers,
            history,
            foreground: BLACK,
            tool: ToolKind::default(),
            styles,
            contacts: HashMap::new(),
            active_contacts: 0,
            dirty: DirtyTracker::new(),
            needs_redraw: false,
            display_width: options.width,
            display_height: options.height,
        }
    }

    /// Rebuilds a canvas from a saved blob produced by [`Canvas::save`].
    ///
    /// No layer is active after loading; the host re-selects one. The
    /// history log is primed with full snapshots of the loaded layers, so
    /// undoing the first new stroke returns to the loaded state.
    pub fn from_saved(bytes: &[u8], styles: StyleConfig) -> Result<Self, FormatError> {
        let layers = io::format::decode(bytes)?;
        let (width, height) = (layers.width(), layers.height());
        let mut history = HistoryLog::new();
        if !layers.is_empty() {
            let snapshots = layers.iter().map(LayerSnapshot::capture).collect();
            history.record(HistoryEntry { snapshots });
        }
        Ok(Self {
            layers,
            history,
            foreground: BLACK,
            tool: ToolKind::default(),
            styles,
            contacts: HashMap::new(),
            active_contacts: 0,
            dirty: DirtyTracker::new(),
            needs_redraw: false,
            display_width: width,
            display_height: height,
        })
    }

    /// Currently selected tool.
    pub fn tool(&self) -> ToolKind {
        self.tool
    }

    /// Selects the tool used by subsequent strokes.
    pub fn set_tool(&mut self, tool: ToolKind) {
        self.tool = tool;
    }

    /// Current foreground color.
    pub fn foreground(&self) -> Color {
        self.foreground
    }

    /// Sets the foreground color used by subsequent strokes.
    pub fn set_foreground(&mut self, color: Color) {
        self.foreground = color;
    }

    /// Tool style table in use.
    pub fn styles(&self) -> &StyleConfig {
        &self.styles
    }

    /// Number of contacts currently down.
    pub fn active_contacts(&self) -> usize {
        self.active_contacts
    }

    /// Whether a whole-stroke redraw pass is pending; the host's refresh
    /// scheduler calls [`Canvas::draw`] when this is set.
    pub fn needs_redraw(&self) -> bool {
        self.needs_redraw
    }

    /// Tells the session how large the composition is displayed, so raw
    /// input positions can be rescaled to composition pixels.
    pub fn set_display_size(&mut self, width: u32, height: u32) {
        assert!(width > 0 && height > 0, "display size must be non-empty");
        self.display_width = width;
        self.display_height = height;
    }

    fn transform_x(&self, raw: f64) -> i32 {
        scale_coord(raw, self.layers.width(), self.display_width)
    }

    fn transform_y(&self, raw: f64) -> i32 {
        scale_coord(raw, self.layers.height(), self.display_height)
    }

    /// Begins a stroke for `touch_id` at the raw display position.
    ///
    /// A zero force reading means the device has no pressure sensor and is
    /// treated as full pressure. Start positions that land outside the
    /// composition after rescaling are dropped; no stroke begins for that
    /// contact. The polyline tools clip during rasterization, so a start
    /// exactly on the far edge is admitted for them; the fill tool reads
    /// its seed pixel directly and requires the start to be a valid pixel.
    pub fn touch_start(&mut self, x: f64, y: f64, touch_id: i32, force: f32) {
        let force = coerce_force(force);
        let (tx, ty) = (self.transform_x(x), self.transform_y(y));
        let (width, height) = (self.layers.width() as i32, self.layers.height() as i32);
        let out_of_bounds = if self.tool == ToolKind::Bucket {
            tx < 0 || ty < 0 || tx >= width || ty >= height
        } else {
            tx > width || ty > height
        };
        if out_of_bounds {
            debug!("Dropping stroke start at ({tx}, {ty}): outside composition");
            return;
        }
        if self.layers.active_layer().is_none() {
            warn!("Ignoring stroke start: no active layer");
            return;
        }

        let contact = self.contacts.entry(touch_id).or_default();
        if !contact.active {
            contact.active = true;
            contact.points.clear();
            self.active_contacts += 1;
        }
        contact.points.push(StrokePoint {
            x: tx,
            y: ty,
            force,
            touch_id,
        });

        let contact = &self.contacts[&touch_id];
        let layer = self.layers.active_layer_mut().unwrap();
        let rect = self
            .tool
            .draw(&mut layer.buffer, &self.styles, self.foreground, &contact.points, 0);
        self.dirty.mark_optional_rect(rect);
    }

    /// Appends a point to an active stroke and rasterizes the new segment.
    ///
    /// Moves for untracked contacts are ignored, as are all moves while the
    /// fill tool is selected (a fill is a discrete action, not a stroke).
    pub fn touch_move(&mut self, x: f64, y: f64, touch_id: i32, force: f32) {
        if self.tool == ToolKind::Bucket {
            return;
        }
        if !self.contacts.get(&touch_id).is_some_and(|c| c.active) {
            return;
        }
        if self.layers.active_layer().is_none() {
            return;
        }

        let force = coerce_force(force);
        let (tx, ty) = (self.transform_x(x), self.transform_y(y));
        let contact = self.contacts.get_mut(&touch_id).unwrap();
        contact.points.push(StrokePoint {
            x: tx,
            y: ty,
            force,
            touch_id,
        });

        if self.tool.redraws_whole_stroke() {
            // Re-rasterized from scratch on the next draw() pass.
            self.needs_redraw = true;
            return;
        }

        let from = contact.points.len().saturating_sub(2);
        let contact = &self.contacts[&touch_id];
        let layer = self.layers.active_layer_mut().unwrap();
        let rect = self.tool.draw(
            &mut layer.buffer,
            &self.styles,
            self.foreground,
            &contact.points,
            from,
        );
        self.dirty.mark_optional_rect(rect);
    }

    /// Whole-stroke redraw pass for tools whose shape depends on every
    /// point delivered so far.
    ///
    /// Rolls the affected region of the active layer back to its committed
    /// state, then re-rasterizes every active contact's full point run.
    /// All contacts' extents merge into a single dirty rectangle.
    pub fn draw(&mut self) {
        self.needs_redraw = false;
        if self.layers.active_layer().is_none() {
            return;
        }

        let mut region = None;
        for contact in self.contacts.values() {
            if let Some(rect) = self.tool.determine_dirty(&self.styles, &contact.points, 0) {
                region = Some(match region {
                    Some(acc) => rect.union(acc),
                    None => rect,
                });
            }
        }
        let Some(region) = region else {
            return;
        };
        let Some(clipped) = region.clamped(self.layers.width(), self.layers.height()) else {
            return;
        };

        let layer = self.layers.active_layer_mut().unwrap();
        layer.roll_back_region(clipped);
        for contact in self.contacts.values() {
            self.tool.draw(
                &mut layer.buffer,
                &self.styles,
                self.foreground,
                &contact.points,
                0,
            );
        }
        self.dirty.mark_rect(clipped);
    }

    /// Ends the stroke for `touch_id`.
    ///
    /// When the last contact lifts, the active layer is committed and a
    /// history entry records its new state. Ends for untracked contacts are
    /// no-ops; duplicate end events arrive from some input sources.
    pub fn touch_end(&mut self, touch_id: i32) {
        let Some(contact) = self.contacts.get_mut(&touch_id) else {
            return;
        };
        if !contact.active {
            return;
        }
        contact.active = false;
        self.active_contacts -= 1;
        if self.active_contacts > 0 {
            return;
        }

        if self.needs_redraw {
            self.draw();
        }
        if let Some(layer) = self.layers.active_layer_mut() {
            layer.commit();
            let snapshot = LayerSnapshot::capture(layer);
            self.history.record(HistoryEntry::single(snapshot));
        }
        self.contacts.clear();
    }

    /// Steps the composition back one history entry.
    pub fn undo(&mut self) -> bool {
        let changed = self.history.undo(&mut self.layers);
        if changed {
            self.dirty.mark_full();
        }
        changed
    }

    /// Re-applies the most recently undone history entry.
    pub fn redo(&mut self) -> bool {
        let changed = self.history.redo(&mut self.layers);
        if changed {
            self.dirty.mark_full();
        }
        changed
    }

    /// Takes the region mutated since the last call, clamped to the
    /// composition, for the host to re-composite.
    pub fn take_dirty_region(&mut self) -> Option<DirtyRect> {
        self.dirty
            .take_region(self.layers.width(), self.layers.height())
    }

    /// Recomposites only `rect` of the stack into the host's presentation
    /// buffer, which must match the composition dimensions.
    ///
    /// Hosts pair this with [`Canvas::take_dirty_region`] to re-blit only
    /// what changed.
    pub fn composite_region(&self, target: &mut PixelBuffer, rect: DirtyRect) {
        composite::flatten_region(&self.layers, target, rect);
    }

    /// Serializes the composition to the layered save format.
    pub fn save(&self) -> Result<Vec<u8>, SaveError> {
        io::format::encode(&self.layers)
    }

    /// Flattens all visible layers and encodes the result as a PNG.
    pub fn flatten_png(&self) -> Result<Vec<u8>, SaveError> {
        io::flatten::flatten_png(&self.layers)
    }

    /// Flattens all visible layers into a fresh pixel buffer.
    pub fn flatten(&self) -> PixelBuffer {
        composite::flatten(&self.layers)
    }
}

/// Rescales a raw display coordinate to composition pixels.
fn scale_coord(raw: f64, composition: u32, displayed: u32) -> i32 {
    (raw * f64::from(composition) / f64::from(displayed)).round() as i32
}

fn coerce_force(force: f32) -> f32 {
    if force == 0.0 { 1.0 } else { force }
}
