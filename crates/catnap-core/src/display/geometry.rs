//! Placement arithmetic for the break notification.
//!
//! Content is measured either in character cells (text) or pixels (image)
//! and placed centered inside a viewing rectangle. Every pixel-to-cell
//! conversion rounds up so the surface is never smaller than its content,
//! and computed positions are clamped to stay on-screen.

/// Character cell size in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellSize {
    pub width: u32,
    pub height: u32,
}

impl CellSize {
    pub fn new(width: u32, height: u32) -> Self {
        // A zero cell would poison every division below.
        Self {
            width: width.max(1),
            height: height.max(1),
        }
    }
}

/// Target viewing rectangle in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewRect {
    pub left: u32,
    pub top: u32,
    pub width: u32,
    pub height: u32,
}

/// Where and how large the notification surface should be: position in
/// pixels, size in character cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub left: u32,
    pub top: u32,
    pub columns: u32,
    pub rows: u32,
}

/// Margin around text content, one cell on each side.
pub const TEXT_PAD_CELLS: u32 = 2;

/// Rows reserved under an image for the countdown line.
pub const COUNTDOWN_ROWS: u32 = 2;

/// Pixel border added to the frame before centering.
pub const FRAME_BORDER_PX: u32 = 16;

/// Center a measured text block, padded by one cell on each side.
pub fn center_text(
    measured_cols: u32,
    measured_rows: u32,
    cell: CellSize,
    view: ViewRect,
) -> Placement {
    let columns = measured_cols.saturating_add(TEXT_PAD_CELLS);
    let rows = measured_rows.saturating_add(TEXT_PAD_CELLS);
    Placement {
        left: centered(view.left, view.width, columns.saturating_mul(cell.width)),
        top: centered(view.top, view.height, rows.saturating_mul(cell.height)),
        columns,
        rows,
    }
}

/// Center an image with a countdown line underneath.
///
/// The cell grid is the ceiling of the image in cells, two extra rows for
/// the countdown, widened to at least the countdown's own width. The frame
/// used for centering is measured in pixels with a fixed border.
pub fn center_image(
    image_px_w: u32,
    image_px_h: u32,
    countdown_cols: u32,
    cell: CellSize,
    view: ViewRect,
) -> Placement {
    let columns = image_px_w.div_ceil(cell.width).max(countdown_cols);
    let rows = image_px_h.div_ceil(cell.height).saturating_add(COUNTDOWN_ROWS);

    let countdown_px_w = countdown_cols.saturating_mul(cell.width);
    let frame_w = image_px_w.max(countdown_px_w).saturating_add(FRAME_BORDER_PX);
    let frame_h = image_px_h
        .saturating_add(COUNTDOWN_ROWS.saturating_mul(cell.height))
        .saturating_add(FRAME_BORDER_PX);

    Placement {
        left: centered(view.left, view.width, frame_w),
        top: centered(view.top, view.height, frame_h),
        columns,
        rows,
    }
}

/// Origin plus half the leftover space, floored, never negative.
fn centered(origin: u32, span: u32, frame: u32) -> u32 {
    let leftover = i64::from(span) - i64::from(frame);
    let pos = i64::from(origin) + leftover.div_euclid(2);
    pos.max(0) as u32
}
