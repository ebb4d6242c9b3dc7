//! Moving a block with the pointer.

use crate::block::BlockId;
use crate::document::PageId;
use crate::geometry::{Position, clamp_to_page, to_stored};
use kurbo::{Point, Rect, Size, Vec2};

/// An in-progress block move. All points are in page display pixels.
#[derive(Debug, Clone)]
pub struct DragState {
    pub page_id: PageId,
    pub block_id: BlockId,
    /// Pointer offset from the block origin, captured on pointer-down.
    grab_offset: Vec2,
    start_rect: Rect,
    current_rect: Rect,
}

impl DragState {
    pub fn begin(page_id: PageId, block_id: BlockId, block_rect: Rect, pointer: Point) -> Self {
        Self {
            page_id,
            block_id,
            grab_offset: pointer - block_rect.origin(),
            start_rect: block_rect,
            current_rect: block_rect,
        }
    }

    /// Follow the pointer, keeping the block fully on the page.
    pub fn update(&mut self, pointer: Point, page_size: Size) -> Rect {
        let candidate = self.start_rect.with_origin(pointer - self.grab_offset);
        self.current_rect = clamp_to_page(candidate, page_size);
        self.current_rect
    }

    pub fn current_rect(&self) -> Rect {
        self.current_rect
    }

    /// Net movement since pointer-down.
    pub fn displacement(&self) -> Vec2 {
        self.current_rect.origin() - self.start_rect.origin()
    }

    pub fn has_moved(&self) -> bool {
        self.displacement().hypot() > f64::EPSILON
    }

    /// Stored position to commit, or `None` for a click without movement.
    ///
    /// Only the origin is converted; width and height keep their stored
    /// values exactly.
    pub fn finish(&self, original: &Position, page_size: Size) -> Option<Position> {
        if !self.has_moved() {
            return None;
        }
        let stored = to_stored(self.current_rect, original.unit, page_size);
        Some(Position { x: stored.x, y: stored.y, ..*original })
    }
}
