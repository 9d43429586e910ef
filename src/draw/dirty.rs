//! Dirty region tracking for incremental recompositing.
//!
//! Tools report the rectangle of pixels they touched; the session merges
//! those into a single bounding region per frame so the host only re-blits
//! what actually changed.

/// Axis-aligned rectangle with inclusive bounds, in composition pixels.
///
/// Bounds may extend outside the composition (stroke padding near an edge);
/// callers clip with [`DirtyRect::clamped`] before touching pixel buffers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DirtyRect {
    pub min_x: i32,
    pub min_y: i32,
    pub max_x: i32,
    pub max_y: i32,
}

impl DirtyRect {
    /// Creates a rectangle from inclusive bounds.
    pub fn new(min_x: i32, min_y: i32, max_x: i32, max_y: i32) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Creates a degenerate rectangle covering a single pixel.
    pub fn from_point(x: i32, y: i32) -> Self {
        Self::new(x, y, x, y)
    }

    /// Bounding box of a point slice, or `None` when the slice is empty.
    pub fn from_points(points: impl IntoIterator<Item = (i32, i32)>) -> Option<Self> {
        let mut iter = points.into_iter();
        let (x, y) = iter.next()?;
        let mut rect = Self::from_point(x, y);
        for (x, y) in iter {
            rect.include(x, y);
        }
        Some(rect)
    }

    /// Number of columns covered.
    pub fn width(&self) -> i32 {
        self.max_x - self.min_x + 1
    }

    /// Number of rows covered.
    pub fn height(&self) -> i32 {
        self.max_y - self.min_y + 1
    }

    /// Grows the bounds to cover the given pixel.
    pub fn include(&mut self, x: i32, y: i32) {
        self.min_x = self.min_x.min(x);
        self.min_y = self.min_y.min(y);
        self.max_x = self.max_x.max(x);
        self.max_y = self.max_y.max(y);
    }

    /// Returns the bounds expanded by `padding` pixels in every direction.
    pub fn expanded(self, padding: i32) -> Self {
        Self::new(
            self.min_x - padding,
            self.min_y - padding,
            self.max_x + padding,
            self.max_y + padding,
        )
    }

    /// Returns the smallest rectangle covering both inputs.
    pub fn union(self, other: Self) -> Self {
        Self::new(
            self.min_x.min(other.min_x),
            self.min_y.min(other.min_y),
            self.max_x.max(other.max_x),
            self.max_y.max(other.max_y),
        )
    }

    /// Clips the bounds to a `width` x `height` surface.
    ///
    /// Returns `None` when nothing remains inside the surface.
    pub fn clamped(self, width: u32, height: u32) -> Option<Self> {
        let min_x = self.min_x.max(0);
        let min_y = self.min_y.max(0);
        let max_x = self.max_x.min(width as i32 - 1);
        let max_y = self.max_y.min(height as i32 - 1);
        if min_x > max_x || min_y > max_y {
            None
        } else {
            Some(Self::new(min_x, min_y, max_x, max_y))
        }
    }

    /// Returns true if the pixel lies within the bounds.
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }
}

/// Accumulates the dirty region between host redraws.
#[derive(Debug, Default)]
pub struct DirtyTracker {
    region: Option<DirtyRect>,
    force_full: bool,
}

impl DirtyTracker {
    /// Creates a new, empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks the entire surface as dirty. Drops the accumulated region.
    pub fn mark_full(&mut self) {
        self.force_full = true;
        self.region = None;
    }

    /// Merges a dirty rectangle into the accumulated region.
    pub fn mark_rect(&mut self, rect: DirtyRect) {
        if self.force_full {
            return;
        }
        self.region = Some(match self.region {
            Some(current) => current.union(rect),
            None => rect,
        });
    }

    /// Merges a dirty rectangle when present.
    pub fn mark_optional_rect(&mut self, rect: Option<DirtyRect>) {
        if let Some(rect) = rect {
            self.mark_rect(rect);
        }
    }

    /// Drains the region gathered so far, clipped to the surface.
    ///
    /// When the full surface is marked, returns one rectangle covering it.
    pub fn take_region(&mut self, width: u32, height: u32) -> Option<DirtyRect> {
        if self.force_full {
            self.force_full = false;
            self.region = None;
            if width == 0 || height == 0 {
                return None;
            }
            return Some(DirtyRect::new(0, 0, width as i32 - 1, height as i32 - 1));
        }
        self.region.take().and_then(|r| r.clamped(width, height))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn union_covers_both_rects() {
        let a = DirtyRect::new(0, 0, 10, 10);
        let b = DirtyRect::new(5, -3, 20, 8);
        assert_eq!(a.union(b), DirtyRect::new(0, -3, 20, 10));
    }

    #[test]
    fn clamping_drops_rects_outside_the_surface() {
        let rect = DirtyRect::new(-5, -5, 4, 4);
        assert_eq!(rect.clamped(100, 100), Some(DirtyRect::new(0, 0, 4, 4)));
        assert_eq!(DirtyRect::new(100, 0, 120, 10).clamped(100, 100), None);
    }

    #[test]
    fn tracker_merges_into_single_region() {
        let mut tracker = DirtyTracker::new();
        tracker.mark_rect(DirtyRect::new(0, 0, 5, 5));
        tracker.mark_rect(DirtyRect::new(20, 10, 30, 15));
        assert_eq!(
            tracker.take_region(100, 100),
            Some(DirtyRect::new(0, 0, 30, 15))
        );
        assert_eq!(tracker.take_region(100, 100), None);
    }

    #[test]
    fn mark_full_takes_precedence() {
        let mut tracker = DirtyTracker::new();
        tracker.mark_rect(DirtyRect::new(2, 2, 3, 3));
        tracker.mark_full();
        tracker.mark_rect(DirtyRect::new(50, 50, 60, 60));
        assert_eq!(
            tracker.take_region(200, 100),
            Some(DirtyRect::new(0, 0, 199, 99))
        );
    }
}
