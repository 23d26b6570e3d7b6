//! Display surfaces and break-notification coordination.
//!
//! A [`DisplaySurface`] is a thin rendering backend behind a capability
//! flag pair: `graphical` surfaces can show images, `refreshable` surfaces
//! can repaint the countdown in place. The coordinator picks one surface
//! per show-cycle based on those capabilities, never on backend identity.

pub mod coordinator;
pub mod geometry;
pub mod picture;
pub mod terminal;

use std::path::{Path, PathBuf};

use crate::config::Settings;
use crate::error::DisplayError;

pub use coordinator::DisplayCoordinator;
pub use geometry::{CellSize, Placement, ViewRect};
pub use terminal::{StaticSurface, TerminalSurface};

/// What a surface declares it can do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    /// Can render image content.
    pub graphical: bool,
    /// Can repaint content in place for a live countdown.
    pub refreshable: bool,
}

/// Content handed to a surface together with its placement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Content {
    /// A text block (notification body plus countdown line).
    Text(String),
    /// An image with a countdown line underneath.
    Image { path: PathBuf, countdown: String },
}

impl Content {
    /// The text portion of the content, used by non-graphical rendering.
    pub fn text(&self) -> &str {
        match self {
            Content::Text(text) => text,
            Content::Image { countdown, .. } => countdown,
        }
    }
}

/// A rendering backend.
///
/// Implementations are intentionally thin: measuring and painting only.
/// All sizing decisions live in [`geometry`], all sequencing in the
/// coordinator.
pub trait DisplaySurface {
    fn capabilities(&self) -> Capabilities;

    /// Character cell size in pixels.
    fn cell_size(&self) -> CellSize;

    /// The rectangle content may be placed in, in pixels.
    fn viewport(&self) -> ViewRect;

    /// Measured size of a text block in character cells.
    fn measure_text(&self, text: &str) -> (u32, u32) {
        text_block_size(text)
    }

    /// Pixel dimensions of an image file.
    fn measure_image(&self, path: &Path) -> Result<(u32, u32), DisplayError> {
        picture::probe_dimensions(path)
    }

    fn show(&mut self, content: &Content, placement: Placement) -> Result<(), DisplayError>;

    /// Repaint content in place. Only called on refreshable surfaces.
    fn refresh(&mut self, content: &Content) -> Result<(), DisplayError>;

    fn clear(&mut self) -> Result<(), DisplayError>;
}

/// Widest line by character count, and line count.
pub(crate) fn text_block_size(text: &str) -> (u32, u32) {
    let mut cols = 0u32;
    let mut rows = 0u32;
    for line in text.lines() {
        cols = cols.max(line.chars().count() as u32);
        rows += 1;
    }
    (cols, rows)
}

/// Pick a surface for this show-cycle.
///
/// The dedicated floating window backend lives outside this crate; when it
/// is requested but unavailable the choice falls back to the next simpler
/// surface, reported and non-fatal.
pub fn select_surface(settings: &Settings) -> Box<dyn DisplaySurface> {
    use std::io::IsTerminal;

    if settings.use_dedicated_surface {
        log::warn!("display: no dedicated surface backend available, falling back to terminal");
    }
    if std::io::stdout().is_terminal() {
        Box::new(TerminalSurface::new())
    } else {
        Box::new(StaticSurface::new())
    }
}
