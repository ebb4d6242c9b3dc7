//! Resizing a block by one of its handles.

use crate::block::BlockId;
use crate::document::PageId;
use crate::geometry::{Position, ResizeHandle, resize, resize_origin, to_stored};
use kurbo::{Point, Rect, Size};

/// An in-progress resize. All points are in page display pixels.
#[derive(Debug, Clone)]
pub struct ResizeState {
    pub page_id: PageId,
    pub block_id: BlockId,
    pub handle: ResizeHandle,
    start_rect: Rect,
    start_pointer: Point,
    current_rect: Rect,
}

impl ResizeState {
    pub fn begin(page_id: PageId, block_id: BlockId, handle: ResizeHandle, block_rect: Rect, pointer: Point) -> Self {
        Self {
            page_id,
            block_id,
            handle,
            start_rect: block_rect,
            start_pointer: pointer,
            current_rect: block_rect,
        }
    }

    /// Width over height at pointer-down.
    pub fn aspect_ratio(&self) -> f64 {
        let h = self.start_rect.height();
        if h > 0.0 { self.start_rect.width() / h } else { 1.0 }
    }

    /// Follow the pointer. `aspect_locked` is the Shift key state.
    pub fn update(&mut self, pointer: Point, aspect_locked: bool) -> Rect {
        let delta = pointer - self.start_pointer;
        let size = resize(self.start_rect, self.handle, delta, aspect_locked);
        let origin = resize_origin(self.start_rect, self.handle, size);
        self.current_rect = Rect::from_origin_size(origin, size);
        self.current_rect
    }

    pub fn current_rect(&self) -> Rect {
        self.current_rect
    }

    /// Stored position to commit, or `None` if the rectangle is unchanged.
    pub fn finish(&self, original: &Position, page_size: Size) -> Option<Position> {
        if self.current_rect == self.start_rect {
            return None;
        }
        Some(to_stored(self.current_rect, original.unit, page_size))
    }
}
