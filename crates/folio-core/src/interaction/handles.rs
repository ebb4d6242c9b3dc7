//! Resize handles around a selected block.

use crate::geometry::ResizeHandle;
use kurbo::{Point, Rect};

/// Handle size in display pixels.
pub const HANDLE_SIZE: f64 = 8.0;
/// Handle hit tolerance in display pixels.
pub const HANDLE_HIT_TOLERANCE: f64 = 10.0;

/// A resize handle with its position.
#[derive(Debug, Clone, Copy)]
pub struct Handle {
    /// Position in page display pixels.
    pub position: Point,
    pub kind: ResizeHandle,
}

impl Handle {
    pub fn new(position: Point, kind: ResizeHandle) -> Self {
        Self { position, kind }
    }

    /// Check if a point hits this handle. `tolerance` should be divided by
    /// the viewport scale by the caller.
    pub fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        let dx = point.x - self.position.x;
        let dy = point.y - self.position.y;
        dx * dx + dy * dy <= tolerance * tolerance
    }

    /// Square drawn for the handle.
    pub fn rect(&self) -> Rect {
        Rect::from_center_size(self.position, (HANDLE_SIZE, HANDLE_SIZE))
    }
}

/// The eight handles of a block rectangle.
pub fn handles_for(rect: Rect) -> Vec<Handle> {
    ResizeHandle::ALL.iter().map(|&kind| Handle::new(kind.anchor(rect), kind)).collect()
}

/// Handle under `point`, if any. The nearest handle wins when several are
/// in reach (small blocks).
pub fn hit_test_handles(rect: Rect, point: Point, tolerance: f64) -> Option<ResizeHandle> {
    handles_for(rect)
        .into_iter()
        .filter(|h| h.hit_test(point, tolerance))
        .min_by(|a, b| a.position.distance(point).total_cmp(&b.position.distance(point)))
        .map(|h| h.kind)
}
