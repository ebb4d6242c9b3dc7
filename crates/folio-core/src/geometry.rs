//! Page geometry: physical formats, stored positions and display pixels.
//!
//! Block positions are stored either in millimetres or as a percentage of
//! the page. The editor works in display pixels (96 DPI, before zoom). All
//! functions here are pure; callers validate their inputs (no NaN, no
//! negative sizes) before calling in.

use kurbo::{Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};

/// Display pixels per millimetre at 96 DPI.
pub const PX_PER_MM: f64 = 3.779527559;

/// Millimetres per inch.
pub const MM_PER_INCH: f64 = 25.4;

/// Smallest width or height a resize gesture may produce, in display pixels.
pub const MIN_BLOCK_SIZE_PX: f64 = 20.0;

/// Fraction of the container the page may fill after auto-scaling.
pub const AUTO_SCALE_FILL: f64 = 0.9;

/// Physical page format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PageFormat {
    #[default]
    A4,
    A5,
    A6,
    Letter,
}

impl PageFormat {
    /// All supported formats.
    pub const ALL: [PageFormat; 4] = [PageFormat::A4, PageFormat::A5, PageFormat::A6, PageFormat::Letter];

    /// Portrait dimensions in millimetres (width, height).
    pub fn dimensions_mm(self) -> (f64, f64) {
        match self {
            PageFormat::A4 => (210.0, 297.0),
            PageFormat::A5 => (148.0, 210.0),
            PageFormat::A6 => (105.0, 148.0),
            PageFormat::Letter => (215.9, 279.4),
        }
    }

    /// Dimensions in millimetres with orientation applied.
    pub fn dimensions_with_orientation(self, orientation: Orientation) -> (f64, f64) {
        let (w, h) = self.dimensions_mm();
        match orientation {
            Orientation::Portrait => (w, h),
            Orientation::Landscape => (h, w),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            PageFormat::A4 => "A4",
            PageFormat::A5 => "A5",
            PageFormat::A6 => "A6",
            PageFormat::Letter => "Letter",
        }
    }
}

/// Page orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    #[default]
    Portrait,
    Landscape,
}

/// Unit of a stored block position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    #[default]
    Mm,
    Percent,
}

/// Stored placement of a block on its page. All four fields share `unit`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub unit: Unit,
}

impl Position {
    pub fn new(x: f64, y: f64, width: f64, height: f64, unit: Unit) -> Self {
        Self { x, y, width, height, unit }
    }

    /// Position in millimetres.
    pub fn mm(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self::new(x, y, width, height, Unit::Mm)
    }

    /// Position as a percentage of the page.
    pub fn percent(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self::new(x, y, width, height, Unit::Percent)
    }

    /// Same position moved by `dx`, `dy` (in the position's own unit).
    pub fn offset(&self, dx: f64, dy: f64) -> Self {
        Self { x: self.x + dx, y: self.y + dy, ..*self }
    }
}

#[inline]
pub fn mm_to_px(mm: f64) -> f64 {
    mm * PX_PER_MM
}

#[inline]
pub fn px_to_mm(px: f64) -> f64 {
    px / PX_PER_MM
}

/// Page size in display pixels for a format and orientation.
pub fn page_display_size(format: PageFormat, orientation: Orientation) -> Size {
    let (w, h) = format.dimensions_with_orientation(orientation);
    Size::new(mm_to_px(w), mm_to_px(h))
}

/// Page size in device pixels at `dpi`, rounded to whole pixels.
pub fn page_pixel_size(format: PageFormat, orientation: Orientation, dpi: u32) -> (u32, u32) {
    let (w, h) = format.dimensions_with_orientation(orientation);
    let px_per_mm = dpi as f64 / MM_PER_INCH;
    ((w * px_per_mm).round() as u32, (h * px_per_mm).round() as u32)
}

/// Convert a stored position to a display-pixel rectangle.
pub fn to_display(position: &Position, page: Size) -> Rect {
    let (x, y, w, h) = match position.unit {
        Unit::Percent => (
            position.x / 100.0 * page.width,
            position.y / 100.0 * page.height,
            position.width / 100.0 * page.width,
            position.height / 100.0 * page.height,
        ),
        Unit::Mm => (
            mm_to_px(position.x),
            mm_to_px(position.y),
            mm_to_px(position.width),
            mm_to_px(position.height),
        ),
    };
    Rect::from_origin_size(Point::new(x, y), Size::new(w, h))
}

/// Convert a display-pixel rectangle back to a stored position in `unit`.
pub fn to_stored(rect: Rect, unit: Unit, page: Size) -> Position {
    match unit {
        Unit::Percent => Position::percent(
            rect.x0 / page.width * 100.0,
            rect.y0 / page.height * 100.0,
            rect.width() / page.width * 100.0,
            rect.height() / page.height * 100.0,
        ),
        Unit::Mm => Position::mm(
            px_to_mm(rect.x0),
            px_to_mm(rect.y0),
            px_to_mm(rect.width()),
            px_to_mm(rect.height()),
        ),
    }
}

/// Zoom that fits the page into the container.
///
/// Never zooms past 100% and leaves a 10% margin.
pub fn compute_auto_scale(container: Size, page: Size) -> f64 {
    let scale_x = container.width / page.width;
    let scale_y = container.height / page.height;
    scale_x.min(scale_y).min(1.0) * AUTO_SCALE_FILL
}

/// Move `rect` so it lies fully on the page. The size is never changed.
pub fn clamp_to_page(rect: Rect, page: Size) -> Rect {
    let max_x = page.width - rect.width();
    let max_y = page.height - rect.height();
    let x = rect.x0.min(max_x).max(0.0);
    let y = rect.y0.min(max_y).max(0.0);
    rect.with_origin(Point::new(x, y))
}

/// One of the eight resize handles around a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResizeHandle {
    N,
    NE,
    E,
    SE,
    S,
    SW,
    W,
    NW,
}

impl ResizeHandle {
    pub const ALL: [ResizeHandle; 8] = [
        ResizeHandle::N,
        ResizeHandle::NE,
        ResizeHandle::E,
        ResizeHandle::SE,
        ResizeHandle::S,
        ResizeHandle::SW,
        ResizeHandle::W,
        ResizeHandle::NW,
    ];

    /// Horizontal and vertical sign of the edge this handle drags:
    /// -1 for the left/top edge, 1 for the right/bottom edge, 0 if the axis
    /// is untouched.
    pub fn direction(self) -> (f64, f64) {
        match self {
            ResizeHandle::N => (0.0, -1.0),
            ResizeHandle::NE => (1.0, -1.0),
            ResizeHandle::E => (1.0, 0.0),
            ResizeHandle::SE => (1.0, 1.0),
            ResizeHandle::S => (0.0, 1.0),
            ResizeHandle::SW => (-1.0, 1.0),
            ResizeHandle::W => (-1.0, 0.0),
            ResizeHandle::NW => (-1.0, -1.0),
        }
    }

    pub fn is_corner(self) -> bool {
        matches!(self, ResizeHandle::NE | ResizeHandle::SE | ResizeHandle::SW | ResizeHandle::NW)
    }

    /// Anchor of this handle on `rect`.
    pub fn anchor(self, rect: Rect) -> Point {
        let (sx, sy) = self.direction();
        let center = rect.center();
        Point::new(
            center.x + sx * rect.width() / 2.0,
            center.y + sy * rect.height() / 2.0,
        )
    }
}

/// New block size for a resize gesture.
///
/// `delta` is the pointer movement since the gesture started. With
/// `aspect_locked`, the ratio `start.width() / start.height()` is kept
/// exactly; corners follow the dominant axis of movement, edges follow
/// their own axis. Both sides are floored at [`MIN_BLOCK_SIZE_PX`].
pub fn resize(start: Rect, handle: ResizeHandle, delta: Vec2, aspect_locked: bool) -> Size {
    let (sx, sy) = handle.direction();
    let start_w = start.width();
    let start_h = start.height();
    let dragged_w = start_w + sx * delta.x;
    let dragged_h = start_h + sy * delta.y;

    if !aspect_locked {
        let width = if sx != 0.0 { dragged_w } else { start_w };
        let height = if sy != 0.0 { dragged_h } else { start_h };
        return Size::new(width.max(MIN_BLOCK_SIZE_PX), height.max(MIN_BLOCK_SIZE_PX));
    }

    let aspect = if start_h > 0.0 { start_w / start_h } else { 1.0 };
    let drive_width = if handle.is_corner() {
        delta.x.abs() > delta.y.abs()
    } else {
        sx != 0.0
    };
    let width = if drive_width { dragged_w } else { dragged_h * aspect };

    // Floor the driving side so the derived one also stays above the floor.
    let min_width = MIN_BLOCK_SIZE_PX.max(MIN_BLOCK_SIZE_PX * aspect);
    let width = width.max(min_width);
    Size::new(width, width / aspect)
}

/// Origin of the resized rectangle: the edges opposite the dragged handle
/// stay where they were.
pub fn resize_origin(start: Rect, handle: ResizeHandle, size: Size) -> Point {
    let (sx, sy) = handle.direction();
    let x = if sx < 0.0 { start.x1 - size.width } else { start.x0 };
    let y = if sy < 0.0 { start.y1 - size.height } else { start.y0 };
    Point::new(x, y)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn rect(x: f64, y: f64, w: f64, h: f64) -> Rect {
        Rect::from_origin_size(Point::new(x, y), Size::new(w, h))
    }

    #[test]
    fn test_a4_display_size() {
        let size = page_display_size(PageFormat::A4, Orientation::Portrait);
        assert!((size.width - 210.0 * PX_PER_MM).abs() < EPS);
        assert!((size.height - 297.0 * PX_PER_MM).abs() < EPS);
    }

    #[test]
    fn test_landscape_swaps_dimensions() {
        let portrait = page_display_size(PageFormat::Letter, Orientation::Portrait);
        let landscape = page_display_size(PageFormat::Letter, Orientation::Landscape);
        assert!((portrait.width - landscape.height).abs() < EPS);
        assert!((portrait.height - landscape.width).abs() < EPS);
    }

    #[test]
    fn test_page_pixel_size_at_300_dpi() {
        assert_eq!(page_pixel_size(PageFormat::A4, Orientation::Portrait, 300), (2480, 3508));
    }

    #[test]
    fn test_mm_to_display() {
        let page = page_display_size(PageFormat::A4, Orientation::Portrait);
        let r = to_display(&Position::mm(10.0, 20.0, 30.0, 40.0), page);
        assert!((r.x0 - 10.0 * PX_PER_MM).abs() < EPS);
        assert!((r.y0 - 20.0 * PX_PER_MM).abs() < EPS);
        assert!((r.width() - 30.0 * PX_PER_MM).abs() < EPS);
        assert!((r.height() - 40.0 * PX_PER_MM).abs() < EPS);
    }

    #[test]
    fn test_percent_to_display() {
        let page = Size::new(800.0, 1000.0);
        let r = to_display(&Position::percent(10.0, 50.0, 50.0, 25.0), page);
        assert!((r.x0 - 80.0).abs() < EPS);
        assert!((r.y0 - 500.0).abs() < EPS);
        assert!((r.width() - 400.0).abs() < EPS);
        assert!((r.height() - 250.0).abs() < EPS);
    }

    #[test]
    fn test_mm_roundtrip_all_formats() {
        let p = Position::mm(12.5, 48.0, 170.0, 30.25);
        for format in PageFormat::ALL {
            for orientation in [Orientation::Portrait, Orientation::Landscape] {
                let page = page_display_size(format, orientation);
                let back = to_stored(to_display(&p, page), Unit::Mm, page);
                assert_eq!(back.unit, Unit::Mm);
                assert!((back.x - p.x).abs() < 1e-9);
                assert!((back.y - p.y).abs() < 1e-9);
                assert!((back.width - p.width).abs() < 1e-9);
                assert!((back.height - p.height).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn test_percent_roundtrip() {
        let page = page_display_size(PageFormat::A5, Orientation::Landscape);
        let p = Position::percent(5.0, 10.0, 90.0, 33.3);
        let back = to_stored(to_display(&p, page), Unit::Percent, page);
        assert!((back.x - p.x).abs() < 1e-9);
        assert!((back.height - p.height).abs() < 1e-9);
    }

    #[test]
    fn test_auto_scale_caps_at_full_size() {
        let page = Size::new(500.0, 700.0);
        let scale = compute_auto_scale(Size::new(5000.0, 5000.0), page);
        assert!((scale - 0.9).abs() < EPS);
    }

    #[test]
    fn test_auto_scale_fits_smaller_axis() {
        let page = Size::new(1000.0, 2000.0);
        let scale = compute_auto_scale(Size::new(800.0, 1000.0), page);
        assert!((scale - 0.5 * 0.9).abs() < EPS);
    }

    #[test]
    fn test_clamp_to_page() {
        let page = Size::new(100.0, 100.0);
        let clamped = clamp_to_page(rect(-10.0, 95.0, 20.0, 20.0), page);
        assert!((clamped.x0 - 0.0).abs() < EPS);
        assert!((clamped.y0 - 80.0).abs() < EPS);
        assert!((clamped.width() - 20.0).abs() < EPS);
        assert!((clamped.height() - 20.0).abs() < EPS);
    }

    #[test]
    fn test_clamp_oversized_block_pins_to_origin() {
        let clamped = clamp_to_page(rect(30.0, 30.0, 200.0, 50.0), Size::new(100.0, 100.0));
        assert!((clamped.x0).abs() < EPS);
        assert!((clamped.y0 - 30.0).abs() < EPS);
    }

    #[test]
    fn test_resize_unlocked_edges() {
        let start = rect(0.0, 0.0, 100.0, 50.0);
        let d = Vec2::new(10.0, 20.0);
        let e = resize(start, ResizeHandle::E, d, false);
        assert_eq!((e.width, e.height), (110.0, 50.0));
        let w = resize(start, ResizeHandle::W, d, false);
        assert_eq!((w.width, w.height), (90.0, 50.0));
        let s = resize(start, ResizeHandle::S, d, false);
        assert_eq!((s.width, s.height), (100.0, 70.0));
        let n = resize(start, ResizeHandle::N, d, false);
        assert_eq!((n.width, n.height), (100.0, 30.0));
    }

    #[test]
    fn test_resize_unlocked_corners() {
        let start = rect(0.0, 0.0, 100.0, 100.0);
        let d = Vec2::new(10.0, 20.0);
        let nw = resize(start, ResizeHandle::NW, d, false);
        assert_eq!((nw.width, nw.height), (90.0, 80.0));
        let se = resize(start, ResizeHandle::SE, d, false);
        assert_eq!((se.width, se.height), (110.0, 120.0));
        let ne = resize(start, ResizeHandle::NE, d, false);
        assert_eq!((ne.width, ne.height), (110.0, 80.0));
        let sw = resize(start, ResizeHandle::SW, d, false);
        assert_eq!((sw.width, sw.height), (90.0, 120.0));
    }

    #[test]
    fn test_resize_floor() {
        let start = rect(0.0, 0.0, 25.0, 25.0);
        let size = resize(start, ResizeHandle::SE, Vec2::new(-100.0, -100.0), false);
        assert_eq!(size.width, MIN_BLOCK_SIZE_PX);
        assert_eq!(size.height, MIN_BLOCK_SIZE_PX);
    }

    #[test]
    fn test_resize_locked_corner_keeps_ratio() {
        let start = rect(0.0, 0.0, 160.0, 40.0);
        let deltas = [
            (30.0, 5.0),
            (5.0, 30.0),
            (-50.0, 10.0),
            (-500.0, -400.0),
            (250.0, -3.0),
            (0.0, 0.0),
        ];
        for handle in [ResizeHandle::NE, ResizeHandle::SE, ResizeHandle::SW, ResizeHandle::NW] {
            for (dx, dy) in deltas {
                let size = resize(start, handle, Vec2::new(dx, dy), true);
                assert!((size.width / size.height - 4.0).abs() < 1e-9, "{handle:?} {dx} {dy}");
                assert!(size.width >= MIN_BLOCK_SIZE_PX);
                assert!(size.height >= MIN_BLOCK_SIZE_PX);
            }
        }
    }

    #[test]
    fn test_resize_locked_dominant_axis() {
        let start = rect(0.0, 0.0, 200.0, 100.0);
        // Horizontal movement dominates: width drives.
        let size = resize(start, ResizeHandle::SE, Vec2::new(40.0, 10.0), true);
        assert!((size.width - 240.0).abs() < EPS);
        assert!((size.height - 120.0).abs() < EPS);
        // Vertical movement dominates: height drives.
        let size = resize(start, ResizeHandle::SE, Vec2::new(10.0, 40.0), true);
        assert!((size.height - 140.0).abs() < EPS);
        assert!((size.width - 280.0).abs() < EPS);
    }

    #[test]
    fn test_resize_locked_edges() {
        let start = rect(0.0, 0.0, 200.0, 100.0);
        let size = resize(start, ResizeHandle::N, Vec2::new(500.0, -50.0), true);
        assert!((size.height - 150.0).abs() < EPS);
        assert!((size.width - 300.0).abs() < EPS);
        let size = resize(start, ResizeHandle::W, Vec2::new(-20.0, 500.0), true);
        assert!((size.width - 220.0).abs() < EPS);
        assert!((size.height - 110.0).abs() < EPS);
    }

    #[test]
    fn test_resize_origin_anchors_opposite_edges() {
        let start = rect(10.0, 10.0, 100.0, 100.0);
        let size = Size::new(80.0, 60.0);
        let nw = resize_origin(start, ResizeHandle::NW, size);
        assert_eq!((nw.x, nw.y), (30.0, 50.0));
        let se = resize_origin(start, ResizeHandle::SE, size);
        assert_eq!((se.x, se.y), (10.0, 10.0));
    }

    #[test]
    fn test_handle_anchor() {
        let r = rect(0.0, 0.0, 100.0, 50.0);
        let p = ResizeHandle::NE.anchor(r);
        assert_eq!((p.x, p.y), (100.0, 0.0));
        let p = ResizeHandle::S.anchor(r);
        assert_eq!((p.x, p.y), (50.0, 50.0));
    }
}
