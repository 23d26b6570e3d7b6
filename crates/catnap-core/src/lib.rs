//! # catnap core library
//!
//! Business logic for the catnap work/break interval timer. The CLI binary
//! is a thin loop over this library; nothing here spawns threads or blocks.
//!
//! ## Architecture
//!
//! - **Session**: a wall-clock-based state machine that requires the caller
//!   to periodically invoke `poll()` for due transitions
//! - **Scheduler**: one one-shot phase timer and one repeating countdown
//!   ticker, with cancel-before-schedule discipline
//! - **Display**: capability-based rendering surfaces, placement geometry
//!   and the coordinator that sequences show/refresh/clear
//! - **Config**: TOML-based configuration with non-fatal value resolution
//!
//! ## Key components
//!
//! - [`Session`]: session state machine
//! - [`DisplayCoordinator`]: break-notification sequencing
//! - [`Settings`]: resolved application configuration
//! - [`Event`]: state-change notifications consumed by the CLI

pub mod config;
pub mod display;
pub mod error;
pub mod events;
pub mod timer;

pub use config::{RawConfig, Settings};
pub use display::{DisplayCoordinator, DisplaySurface};
pub use error::{CommandError, ConfigError, CoreError, DisplayError};
pub use events::Event;
pub use timer::{BreakType, Scheduler, Session, StatusReport};
