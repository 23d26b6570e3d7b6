//! Terminal rendering backends.
//!
//! [`TerminalSurface`] paints the notification as an in-place overlay with
//! cursor addressing, so the countdown can be refreshed every second.
//! [`StaticSurface`] is the fallback for non-interactive output: it prints
//! the notification once and cannot refresh.

use std::io::{self, Write};

use crossterm::{
    cursor::MoveTo,
    style::Print,
    QueueableCommand,
};

use super::geometry::{CellSize, Placement, ViewRect};
use super::{Capabilities, Content, DisplaySurface};
use crate::error::DisplayError;

/// Nominal cell size used when the terminal does not report pixel sizes.
const FALLBACK_CELL: CellSize = CellSize {
    width: 8,
    height: 16,
};

/// Grid used when the terminal size cannot be queried at all.
const FALLBACK_GRID: (u16, u16) = (80, 24);

fn to_u16(v: u32) -> u16 {
    v.try_into().unwrap_or(u16::MAX)
}

/// Cursor-addressed overlay on the controlling terminal.
pub struct TerminalSurface {
    out: io::Stdout,
    drawn: Option<(Placement, Content)>,
}

impl TerminalSurface {
    pub fn new() -> Self {
        Self {
            out: io::stdout(),
            drawn: None,
        }
    }

    fn grid(&self) -> (u16, u16) {
        crossterm::terminal::size().unwrap_or(FALLBACK_GRID)
    }

    fn paint(&mut self, content: &Content, placement: Placement) -> Result<(), DisplayError> {
        let cell = self.cell_size();
        let col = to_u16(placement.left / cell.width);
        let row = to_u16(placement.top / cell.height);
        // One-cell inner margin; the placement already accounts for it.
        for (i, line) in content.text().lines().enumerate() {
            self.out
                .queue(MoveTo(col.saturating_add(1), row.saturating_add(1 + i as u16)))?
                .queue(Print(line))?;
        }
        self.out.flush()?;
        Ok(())
    }

    fn blank_region(&mut self, placement: Placement) -> Result<(), DisplayError> {
        let cell = self.cell_size();
        let col = to_u16(placement.left / cell.width);
        let row = to_u16(placement.top / cell.height);
        let blank = " ".repeat(placement.columns as usize);
        for r in 0..to_u16(placement.rows) {
            self.out
                .queue(MoveTo(col, row.saturating_add(r)))?
                .queue(Print(blank.as_str()))?;
        }
        self.out.flush()?;
        Ok(())
    }
}

impl Default for TerminalSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl DisplaySurface for TerminalSurface {
    fn capabilities(&self) -> Capabilities {
        Capabilities {
            graphical: false,
            refreshable: true,
        }
    }

    fn cell_size(&self) -> CellSize {
        match crossterm::terminal::window_size() {
            Ok(ws) if ws.width > 0 && ws.height > 0 && ws.columns > 0 && ws.rows > 0 => {
                CellSize::new(
                    u32::from(ws.width) / u32::from(ws.columns),
                    u32::from(ws.height) / u32::from(ws.rows),
                )
            }
            _ => FALLBACK_CELL,
        }
    }

    fn viewport(&self) -> ViewRect {
        let (cols, rows) = self.grid();
        let cell = self.cell_size();
        ViewRect {
            left: 0,
            top: 0,
            width: u32::from(cols) * cell.width,
            height: u32::from(rows) * cell.height,
        }
    }

    fn show(&mut self, content: &Content, placement: Placement) -> Result<(), DisplayError> {
        self.paint(content, placement)?;
        self.drawn = Some((placement, content.clone()));
        Ok(())
    }

    fn refresh(&mut self, content: &Content) -> Result<(), DisplayError> {
        match self.drawn.as_ref() {
            Some((placement, _)) => {
                let placement = *placement;
                self.paint(content, placement)?;
                self.drawn = Some((placement, content.clone()));
                Ok(())
            }
            None => Err(DisplayError::Unsupported {
                operation: "refresh before show",
            }),
        }
    }

    fn clear(&mut self) -> Result<(), DisplayError> {
        if let Some((placement, _)) = self.drawn.take() {
            self.blank_region(placement)?;
        }
        Ok(())
    }
}

/// One-shot plain output, used when stdout is not a terminal.
pub struct StaticSurface {
    out: io::Stdout,
}

impl StaticSurface {
    pub fn new() -> Self {
        Self { out: io::stdout() }
    }
}

impl Default for StaticSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl DisplaySurface for StaticSurface {
    fn capabilities(&self) -> Capabilities {
        Capabilities {
            graphical: false,
            refreshable: false,
        }
    }

    fn cell_size(&self) -> CellSize {
        FALLBACK_CELL
    }

    fn viewport(&self) -> ViewRect {
        ViewRect {
            left: 0,
            top: 0,
            width: u32::from(FALLBACK_GRID.0) * FALLBACK_CELL.width,
            height: u32::from(FALLBACK_GRID.1) * FALLBACK_CELL.height,
        }
    }

    fn show(&mut self, content: &Content, _placement: Placement) -> Result<(), DisplayError> {
        writeln!(self.out, "{}", content.text())?;
        Ok(())
    }

    fn refresh(&mut self, _content: &Content) -> Result<(), DisplayError> {
        Err(DisplayError::Unsupported {
            operation: "in-place refresh",
        })
    }

    fn clear(&mut self) -> Result<(), DisplayError> {
        Ok(())
    }
}
