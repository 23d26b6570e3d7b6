use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timer::BreakType;

/// Every state change in the session produces an Event.
/// The CLI renders them as user-facing messages or JSON lines.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    /// A work phase began (fresh start, work timer expiry, or break end).
    WorkStarted {
        cycle: u32,
        duration_secs: u64,
        at: DateTime<Utc>,
    },
    /// A break began; the notification is showing.
    BreakStarted {
        cycle: u32,
        break_type: BreakType,
        duration_secs: u64,
        at: DateTime<Utc>,
    },
    /// The current break was postponed.
    BreakDelayed {
        delay_secs: u64,
        at: DateTime<Utc>,
    },
    /// The session was stopped and reset.
    Stopped {
        at: DateTime<Utc>,
    },
}
