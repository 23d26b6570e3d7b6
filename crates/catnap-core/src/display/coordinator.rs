//! Sequencing between the session and the active display surface.
//!
//! The coordinator owns the surface handle for the duration of one
//! show-cycle: it opens a surface when a break starts, refreshes the
//! countdown while the break runs, and releases the surface on clear.
//! Every surface call crosses an error boundary here; a failing backend is
//! reported and skipped, never propagated into timer logic.

use std::path::PathBuf;

use super::{geometry, select_surface, Content, DisplaySurface};
use crate::config::Settings;
use crate::error::DisplayError;
use crate::timer::BreakType;

/// Opens a surface for a show-cycle. Swappable for tests.
pub type SurfaceFactory = Box<dyn Fn(&Settings) -> Box<dyn DisplaySurface>>;

pub struct DisplayCoordinator {
    factory: SurfaceFactory,
    active: Option<Box<dyn DisplaySurface>>,
    /// Image chosen for the current show-cycle; `None` means text mode.
    /// Decided once per cycle so a vanished file cannot flip the mode
    /// mid-break.
    image: Option<PathBuf>,
}

impl DisplayCoordinator {
    pub fn new() -> Self {
        Self::with_factory(Box::new(|settings| select_surface(settings)))
    }

    pub fn with_factory(factory: SurfaceFactory) -> Self {
        Self {
            factory,
            active: None,
            image: None,
        }
    }

    /// True while a surface is holding content.
    pub fn is_showing(&self) -> bool {
        self.active.is_some()
    }

    /// Open a surface (if needed) and show the break notification.
    ///
    /// Returns true when the active surface supports in-place refresh, so
    /// the caller knows whether a countdown ticker is worth arming.
    pub fn show_break(
        &mut self,
        settings: &Settings,
        break_type: BreakType,
        remaining_secs: u64,
    ) -> bool {
        if self.active.is_none() {
            self.active = Some((self.factory)(settings));
        }
        let Some(surface) = self.active.as_mut() else {
            return false;
        };

        let caps = surface.capabilities();
        let countdown = countdown_line(break_type, remaining_secs);
        let cell = surface.cell_size();
        let view = surface.viewport();

        self.image = None;
        let mut shown = false;
        if caps.graphical {
            if let Some(path) = settings.cat_image_path.as_deref() {
                match surface.measure_image(path) {
                    Ok((width, height)) => {
                        let (countdown_cols, _) = surface.measure_text(&countdown);
                        let placement =
                            geometry::center_image(width, height, countdown_cols, cell, view);
                        let content = Content::Image {
                            path: path.to_path_buf(),
                            countdown: countdown.clone(),
                        };
                        if guard("show", surface.show(&content, placement)).is_some() {
                            self.image = Some(path.to_path_buf());
                            shown = true;
                        }
                    }
                    Err(e) => {
                        log::warn!(
                            "display: cannot measure {}: {e}, using text mode",
                            path.display()
                        );
                    }
                }
            }
        }
        if !shown {
            let body = format!("{}\n\n{}", settings.ascii_art, countdown);
            let (cols, rows) = surface.measure_text(&body);
            let placement = geometry::center_text(cols, rows, cell, view);
            guard("show", surface.show(&Content::Text(body), placement));
        }
        caps.refreshable
    }

    /// Repaint the countdown on the active surface, keeping the mode chosen
    /// at show time.
    pub fn refresh_countdown(
        &mut self,
        settings: &Settings,
        break_type: BreakType,
        remaining_secs: u64,
    ) {
        let image = self.image.clone();
        let Some(surface) = self.active.as_mut() else {
            return;
        };
        let countdown = countdown_line(break_type, remaining_secs);
        let content = match image {
            Some(path) => Content::Image { path, countdown },
            None => Content::Text(format!("{}\n\n{}", settings.ascii_art, countdown)),
        };
        guard("refresh", surface.refresh(&content));
    }

    /// Clear the surface and release the handle.
    pub fn clear(&mut self) {
        if let Some(mut surface) = self.active.take() {
            guard("clear", surface.clear());
        }
        self.image = None;
    }
}

impl Default for DisplayCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

/// Error boundary around a surface call: report and swallow.
fn guard<T>(what: &str, result: Result<T, DisplayError>) -> Option<T> {
    match result {
        Ok(v) => Some(v),
        Err(e) => {
            log::warn!("display: {what} failed: {e}");
            None
        }
    }
}

pub fn countdown_line(break_type: BreakType, remaining_secs: u64) -> String {
    let name = match break_type {
        BreakType::Short => "Short",
        BreakType::Long => "Long",
    };
    format!("{name} break ends in {}", format_mmss(remaining_secs))
}

fn format_mmss(secs: u64) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::{Capabilities, CellSize, Placement, ViewRect};
    use std::cell::RefCell;
    use std::path::Path;
    use std::rc::Rc;

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Show(Content, Placement),
        Refresh(Content),
        Clear,
    }

    struct Probe {
        caps: Capabilities,
        fail_show: bool,
        log: Rc<RefCell<Vec<Call>>>,
    }

    impl DisplaySurface for Probe {
        fn capabilities(&self) -> Capabilities {
            self.caps
        }

        fn cell_size(&self) -> CellSize {
            CellSize::new(8, 16)
        }

        fn viewport(&self) -> ViewRect {
            ViewRect {
                left: 0,
                top: 0,
                width: 1920,
                height: 1080,
            }
        }

        fn measure_image(&self, _path: &Path) -> Result<(u32, u32), DisplayError> {
            Ok((300, 200))
        }

        fn show(&mut self, content: &Content, placement: Placement) -> Result<(), DisplayError> {
            if self.fail_show {
                return Err(DisplayError::Backend("boom".into()));
            }
            self.log.borrow_mut().push(Call::Show(content.clone(), placement));
            Ok(())
        }

        fn refresh(&mut self, content: &Content) -> Result<(), DisplayError> {
            self.log.borrow_mut().push(Call::Refresh(content.clone()));
            Ok(())
        }

        fn clear(&mut self) -> Result<(), DisplayError> {
            self.log.borrow_mut().push(Call::Clear);
            Ok(())
        }
    }

    fn coordinator(
        caps: Capabilities,
        fail_show: bool,
    ) -> (DisplayCoordinator, Rc<RefCell<Vec<Call>>>) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let log2 = Rc::clone(&log);
        let coord = DisplayCoordinator::with_factory(Box::new(move |_| {
            Box::new(Probe {
                caps,
                fail_show,
                log: Rc::clone(&log2),
            })
        }));
        (coord, log)
    }

    const TERM: Capabilities = Capabilities {
        graphical: false,
        refreshable: true,
    };
    const GUI: Capabilities = Capabilities {
        graphical: true,
        refreshable: true,
    };
    const STATIC: Capabilities = Capabilities {
        graphical: false,
        refreshable: false,
    };

    #[test]
    fn text_mode_shows_art_with_countdown() {
        let (mut coord, log) = coordinator(TERM, false);
        let settings = Settings::default();
        let refreshable = coord.show_break(&settings, BreakType::Short, 300);
        assert!(refreshable);
        assert!(coord.is_showing());
        let calls = log.borrow();
        match &calls[0] {
            Call::Show(Content::Text(body), _) => {
                assert!(body.contains("Short break ends in 05:00"));
                assert!(body.contains(settings.ascii_art.lines().next().unwrap()));
            }
            other => panic!("expected text show, got {other:?}"),
        }
    }

    #[test]
    fn image_mode_used_on_graphical_surface() {
        let (mut coord, log) = coordinator(GUI, false);
        let settings = Settings {
            cat_image_path: Some(PathBuf::from("/tmp/cat.png")),
            ..Settings::default()
        };
        coord.show_break(&settings, BreakType::Long, 1200);
        let calls = log.borrow();
        match &calls[0] {
            Call::Show(Content::Image { path, countdown }, placement) => {
                assert_eq!(path, &PathBuf::from("/tmp/cat.png"));
                assert!(countdown.starts_with("Long break ends in 20:00"));
                // 300x200 image at 8x16 cells plus countdown rows.
                assert_eq!(placement.columns, 38);
                assert_eq!(placement.rows, 15);
            }
            other => panic!("expected image show, got {other:?}"),
        }
    }

    #[test]
    fn image_ignored_on_non_graphical_surface() {
        let (mut coord, log) = coordinator(TERM, false);
        let settings = Settings {
            cat_image_path: Some(PathBuf::from("/tmp/cat.png")),
            ..Settings::default()
        };
        coord.show_break(&settings, BreakType::Short, 300);
        assert!(matches!(&log.borrow()[0], Call::Show(Content::Text(_), _)));
    }

    #[test]
    fn refresh_keeps_show_time_mode() {
        let (mut coord, log) = coordinator(GUI, false);
        let settings = Settings {
            cat_image_path: Some(PathBuf::from("/tmp/cat.png")),
            ..Settings::default()
        };
        coord.show_break(&settings, BreakType::Short, 300);
        coord.refresh_countdown(&settings, BreakType::Short, 299);
        let calls = log.borrow();
        match &calls[1] {
            Call::Refresh(Content::Image { countdown, .. }) => {
                assert!(countdown.contains("04:59"));
            }
            other => panic!("expected image refresh, got {other:?}"),
        }
    }

    #[test]
    fn static_surface_reports_not_refreshable() {
        let (mut coord, _log) = coordinator(STATIC, false);
        assert!(!coord.show_break(&Settings::default(), BreakType::Short, 300));
    }

    #[test]
    fn clear_releases_the_surface() {
        let (mut coord, log) = coordinator(TERM, false);
        coord.show_break(&Settings::default(), BreakType::Short, 300);
        coord.clear();
        assert!(!coord.is_showing());
        assert_eq!(log.borrow().last(), Some(&Call::Clear));
        // Clearing again is a no-op.
        coord.clear();
        assert_eq!(log.borrow().len(), 2);
    }

    #[test]
    fn show_failure_is_swallowed() {
        let (mut coord, log) = coordinator(TERM, true);
        let refreshable = coord.show_break(&Settings::default(), BreakType::Short, 300);
        assert!(refreshable);
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn countdown_formats_minutes_and_seconds() {
        assert_eq!(
            countdown_line(BreakType::Short, 65),
            "Short break ends in 01:05"
        );
        assert_eq!(
            countdown_line(BreakType::Long, 0),
            "Long break ends in 00:00"
        );
    }
}
