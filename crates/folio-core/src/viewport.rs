//! Page viewport: where the page sits in the editor container and at what
//! zoom.

use crate::geometry::{Orientation, PageFormat, compute_auto_scale, page_display_size};
use kurbo::{Affine, Point, Rect, Size, Vec2};

/// Lowest zoom a viewport accepts.
pub const MIN_SCALE: f64 = 0.1;
/// Highest zoom a viewport accepts.
pub const MAX_SCALE: f64 = 4.0;

/// Maps page display pixels to container (screen) pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct PageViewport {
    /// Page size in display pixels at 100%.
    pub page_size: Size,
    /// Top-left of the page in container pixels.
    pub offset: Vec2,
    pub scale: f64,
}

impl PageViewport {
    /// Viewport at 100% with the page at the container origin.
    pub fn new(page_size: Size) -> Self {
        Self { page_size, offset: Vec2::ZERO, scale: 1.0 }
    }

    pub fn for_format(format: PageFormat, orientation: Orientation) -> Self {
        Self::new(page_display_size(format, orientation))
    }

    /// Auto-scale the page into `container` and center it.
    pub fn fit(&mut self, container: Size) {
        self.scale = compute_auto_scale(container, self.page_size);
        self.center_in(container);
    }

    /// Set the zoom explicitly, keeping the page centered in `container`.
    pub fn set_scale(&mut self, scale: f64, container: Size) {
        self.scale = scale.clamp(MIN_SCALE, MAX_SCALE);
        self.center_in(container);
    }

    fn center_in(&mut self, container: Size) {
        self.offset = Vec2::new(
            (container.width - self.page_size.width * self.scale) / 2.0,
            (container.height - self.page_size.height * self.scale) / 2.0,
        );
    }

    /// Page-to-screen transform.
    pub fn transform(&self) -> Affine {
        Affine::translate(self.offset) * Affine::scale(self.scale)
    }

    pub fn screen_to_page(&self, screen_point: Point) -> Point {
        self.transform().inverse() * screen_point
    }

    pub fn page_to_screen(&self, page_point: Point) -> Point {
        self.transform() * page_point
    }

    /// The page rectangle in screen pixels.
    pub fn page_rect(&self) -> Rect {
        self.transform().transform_rect_bbox(self.page_size.to_rect())
    }

    /// Convert a screen-space hit tolerance to page display pixels.
    pub fn page_tolerance(&self, screen_tolerance: f64) -> f64 {
        screen_tolerance / self.scale
    }
}
