//! Session state machine.
//!
//! The session is a wall-clock-based state machine. It does not use
//! internal threads; the caller invokes `poll()` periodically and the
//! scheduler decides which transitions are due.
//!
//! ## State transitions
//!
//! ```text
//! Idle -> Working -> OnBreak -> Working
//!                       |
//!                  DelayWindow -> OnBreak
//! ```
//!
//! The work timer re-enters `Working` when it fires; a break begins only
//! through an explicit `request_break` trigger. Break expiry (or
//! `stop_break`) returns to `Working` without touching the cycle count;
//! only the work timer's own expiry advances it.

use std::fmt;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::scheduler::{PhaseAction, Scheduler};
use crate::config::{resolve_delay_secs, Settings};
use crate::display::DisplayCoordinator;
use crate::error::{CommandError, CoreError};
use crate::events::Event;

/// Countdown refresh period while a break is showing.
const TICK_PERIOD_SECS: u64 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BreakType {
    Short,
    Long,
}

impl BreakType {
    pub fn label(self) -> &'static str {
        match self {
            BreakType::Short => "short",
            BreakType::Long => "long",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Working,
    OnBreak(BreakType),
    /// Between breaks after `delay_break`: not working, not on break, one
    /// phase timer counting toward re-entering the break.
    DelayWindow,
}

/// Read-only view of the session, for `status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusReport {
    pub running: bool,
    pub cycle: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub on_break: Option<BreakType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remaining_secs: Option<u64>,
}

impl fmt::Display for StatusReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.running {
            return write!(f, "Not running");
        }
        match self.on_break {
            Some(bt) => write!(f, "Cycle #{}, in {} break", self.cycle, bt.label()),
            None => write!(f, "Cycle #{}, working", self.cycle),
        }
    }
}

/// The one process-wide timer session.
///
/// Construction is the only way to get one and `start`/`stop` are the only
/// resets; all mutation goes through the transition methods below.
pub struct Session {
    settings: Settings,
    scheduler: Scheduler,
    phase: Phase,
    cycle: u32,
    /// End of the break countdown, epoch ms. `Some` exactly while on
    /// break, and always equal to the pending phase timer's deadline.
    phase_end_ms: Option<u64>,
    display: DisplayCoordinator,
}

impl Session {
    pub fn new(settings: Settings, display: DisplayCoordinator) -> Self {
        Self {
            settings,
            scheduler: Scheduler::new(),
            phase: Phase::Idle,
            cycle: 0,
            phase_end_ms: None,
            display,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn is_running(&self) -> bool {
        self.phase != Phase::Idle
    }

    pub fn in_break(&self) -> bool {
        matches!(self.phase, Phase::OnBreak(_))
    }

    pub fn cycle(&self) -> u32 {
        self.cycle
    }

    pub fn status(&self) -> StatusReport {
        self.status_at(now_ms())
    }

    pub fn status_at(&self, now_ms: u64) -> StatusReport {
        let on_break = match self.phase {
            Phase::OnBreak(bt) => Some(bt),
            _ => None,
        };
        StatusReport {
            running: self.is_running(),
            cycle: self.cycle,
            on_break,
            remaining_secs: self.remaining_secs_at(now_ms),
        }
    }

    /// Whole seconds left on the break countdown, rounded up.
    pub fn remaining_secs_at(&self, now_ms: u64) -> Option<u64> {
        self.phase_end_ms
            .map(|end| end.saturating_sub(now_ms).div_ceil(1000))
    }

    /// Earliest pending timer deadline, for the event loop's sleep.
    pub fn next_deadline_ms(&self) -> Option<u64> {
        self.scheduler.next_deadline_ms()
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Reset everything and begin work cycle #1.
    pub fn start(&mut self) -> Event {
        self.start_at(now_ms())
    }

    pub fn start_at(&mut self, now_ms: u64) -> Event {
        self.reset();
        self.cycle = 1;
        self.enter_work(now_ms)
    }

    /// Clear the display, cancel all timers, return to idle.
    pub fn stop(&mut self) -> Event {
        self.reset();
        Event::Stopped { at: Utc::now() }
    }

    /// Begin a break. Long every `cycles_before_long_break`th cycle,
    /// short otherwise.
    pub fn request_break(&mut self) -> Result<Event, CoreError> {
        self.request_break_at(now_ms())
    }

    pub fn request_break_at(&mut self, now_ms: u64) -> Result<Event, CoreError> {
        if self.phase == Phase::Idle {
            return Err(CommandError::NotRunning.into());
        }
        let every = self.settings.cycles_before_long_break.max(1);
        let break_type = if self.cycle % every == 0 {
            BreakType::Long
        } else {
            BreakType::Short
        };
        let duration_secs = match break_type {
            BreakType::Short => self.settings.short_break_secs,
            BreakType::Long => self.settings.long_break_secs,
        };

        self.phase = Phase::OnBreak(break_type);
        self.phase_end_ms = Some(now_ms.saturating_add(duration_secs.saturating_mul(1000)));
        self.scheduler
            .schedule_once(now_ms, duration_secs, PhaseAction::BreakElapsed);

        let refreshable = self
            .display
            .show_break(&self.settings, break_type, duration_secs);
        if refreshable {
            self.scheduler.schedule_repeating(now_ms, TICK_PERIOD_SECS);
        } else {
            self.scheduler.cancel_repeating();
        }

        Ok(Event::BreakStarted {
            cycle: self.cycle,
            break_type,
            duration_secs,
            at: Utc::now(),
        })
    }

    /// Postpone the current break. Only valid while on break.
    pub fn delay_break(&mut self, secs: Option<f64>) -> Result<Event, CoreError> {
        self.delay_break_at(now_ms(), secs)
    }

    pub fn delay_break_at(&mut self, now_ms: u64, secs: Option<f64>) -> Result<Event, CoreError> {
        if !self.in_break() {
            return Err(CommandError::NotOnBreak.into());
        }
        let delay_secs = resolve_delay_secs(secs, self.settings.delay_break_secs);
        self.display.clear();
        self.scheduler.cancel_repeating();
        self.phase = Phase::DelayWindow;
        self.phase_end_ms = None;
        self.scheduler
            .schedule_once(now_ms, delay_secs, PhaseAction::DelayElapsed);
        Ok(Event::BreakDelayed {
            delay_secs,
            at: Utc::now(),
        })
    }

    /// End the break now, exactly as if its timer had fired.
    pub fn stop_break(&mut self) -> Result<Event, CoreError> {
        self.stop_break_at(now_ms())
    }

    pub fn stop_break_at(&mut self, now_ms: u64) -> Result<Event, CoreError> {
        if !self.in_break() {
            return Err(CommandError::NotOnBreak.into());
        }
        self.scheduler.cancel_once();
        Ok(self.end_break(now_ms))
    }

    // ── Timer-driven transitions ─────────────────────────────────────

    /// Run any due transitions. Call periodically from the event loop.
    pub fn poll(&mut self) -> Vec<Event> {
        self.poll_at(now_ms())
    }

    pub fn poll_at(&mut self, now_ms: u64) -> Vec<Event> {
        let mut events = Vec::new();
        if let Some(action) = self.scheduler.take_due_phase(now_ms) {
            match action {
                PhaseAction::WorkElapsed => {
                    if self.phase == Phase::Working {
                        self.display.clear();
                        self.cycle += 1;
                        events.push(self.enter_work(now_ms));
                    }
                }
                PhaseAction::BreakElapsed => {
                    if self.in_break() {
                        events.push(self.end_break(now_ms));
                    }
                }
                PhaseAction::DelayElapsed => {
                    if self.phase == Phase::DelayWindow {
                        if let Ok(event) = self.request_break_at(now_ms) {
                            events.push(event);
                        }
                    }
                }
            }
        }
        if self.scheduler.take_due_tick(now_ms) {
            if let Phase::OnBreak(break_type) = self.phase {
                if let Some(remaining) = self.remaining_secs_at(now_ms) {
                    self.display
                        .refresh_countdown(&self.settings, break_type, remaining);
                }
            }
        }
        events
    }

    // ── Internal ─────────────────────────────────────────────────────

    /// Work-entry transition shared by start, work expiry and break end.
    fn enter_work(&mut self, now_ms: u64) -> Event {
        let duration_secs = self.settings.work_secs;
        self.phase = Phase::Working;
        self.phase_end_ms = None;
        self.scheduler
            .schedule_once(now_ms, duration_secs, PhaseAction::WorkElapsed);
        Event::WorkStarted {
            cycle: self.cycle,
            duration_secs,
            at: Utc::now(),
        }
    }

    /// Break end shared by natural expiry and `stop_break`. The cycle
    /// count is untouched.
    fn end_break(&mut self, now_ms: u64) -> Event {
        self.display.clear();
        self.scheduler.cancel_repeating();
        self.phase_end_ms = None;
        self.enter_work(now_ms)
    }

    fn reset(&mut self) {
        self.display.clear();
        self.scheduler.clear();
        self.phase = Phase::Idle;
        self.cycle = 0;
        self.phase_end_ms = None;
    }
}

fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
