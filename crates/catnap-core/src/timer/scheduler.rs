//! Deadline scheduler for the session's phase timer and countdown ticker.
//!
//! The scheduler owns at most one one-shot slot (the phase timer) and one
//! repeating slot (the ticker). It does not use internal threads; the event
//! loop calls the `take_due_*` methods periodically, which is the same
//! discipline the rest of the engine follows. Scheduling always cancels the
//! previous occupant of the slot, so two live phase timers can never
//! coexist.

/// What to do when the phase timer fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseAction {
    /// The work phase ran its course.
    WorkElapsed,
    /// The break ran its course.
    BreakElapsed,
    /// A delayed break is due again.
    DelayElapsed,
}

#[derive(Debug, Clone, Copy)]
struct PhaseTimer {
    due_ms: u64,
    action: PhaseAction,
}

#[derive(Debug, Clone, Copy)]
struct Ticker {
    period_ms: u64,
    due_ms: u64,
}

/// One one-shot slot, one repeating slot.
#[derive(Debug, Default)]
pub struct Scheduler {
    phase: Option<PhaseTimer>,
    ticker: Option<Ticker>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm the phase timer. Any pending phase timer is canceled first; the
    /// second call always wins.
    pub fn schedule_once(&mut self, now_ms: u64, delay_secs: u64, action: PhaseAction) {
        self.cancel_once();
        self.phase = Some(PhaseTimer {
            due_ms: now_ms.saturating_add(delay_secs.saturating_mul(1000)),
            action,
        });
    }

    /// Cancel the phase timer if present. Idempotent.
    pub fn cancel_once(&mut self) {
        self.phase = None;
    }

    /// Arm the ticker with the given period, replacing any existing one.
    pub fn schedule_repeating(&mut self, now_ms: u64, period_secs: u64) {
        self.cancel_repeating();
        let period_ms = period_secs.saturating_mul(1000);
        self.ticker = Some(Ticker {
            period_ms,
            due_ms: now_ms.saturating_add(period_ms),
        });
    }

    /// Cancel the ticker if present. Idempotent.
    pub fn cancel_repeating(&mut self) {
        self.ticker = None;
    }

    /// Cancel both slots.
    pub fn clear(&mut self) {
        self.cancel_once();
        self.cancel_repeating();
    }

    /// Pop the phase action once its deadline has passed.
    pub fn take_due_phase(&mut self, now_ms: u64) -> Option<PhaseAction> {
        match self.phase {
            Some(timer) if now_ms >= timer.due_ms => {
                self.phase = None;
                Some(timer.action)
            }
            _ => None,
        }
    }

    /// True when the ticker is due; re-arms it at `now + period`.
    ///
    /// Re-arming relative to `now` (not the missed deadline) means a stalled
    /// loop produces one refresh, not a burst of catch-up refreshes.
    pub fn take_due_tick(&mut self, now_ms: u64) -> bool {
        match self.ticker {
            Some(ref mut ticker) if now_ms >= ticker.due_ms => {
                ticker.due_ms = now_ms.saturating_add(ticker.period_ms);
                true
            }
            _ => false,
        }
    }

    pub fn phase_due_ms(&self) -> Option<u64> {
        self.phase.map(|t| t.due_ms)
    }

    pub fn phase_pending(&self) -> bool {
        self.phase.is_some()
    }

    pub fn ticker_pending(&self) -> bool {
        self.ticker.is_some()
    }

    /// Earliest pending deadline, for the event loop's sleep.
    pub fn next_deadline_ms(&self) -> Option<u64> {
        let phase = self.phase.map(|t| t.due_ms);
        let tick = self.ticker.map(|t| t.due_ms);
        match (phase, tick) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_schedule_always_wins() {
        let mut s = Scheduler::new();
        s.schedule_once(0, 10, PhaseAction::WorkElapsed);
        s.schedule_once(0, 5, PhaseAction::BreakElapsed);
        // The first timer is gone: nothing fires at its deadline with the
        // first action.
        assert_eq!(s.take_due_phase(5_000), Some(PhaseAction::BreakElapsed));
        assert_eq!(s.take_due_phase(20_000), None);
    }

    #[test]
    fn phase_fires_only_after_deadline() {
        let mut s = Scheduler::new();
        s.schedule_once(1_000, 10, PhaseAction::WorkElapsed);
        assert_eq!(s.take_due_phase(10_999), None);
        assert_eq!(s.take_due_phase(11_000), Some(PhaseAction::WorkElapsed));
        assert!(!s.phase_pending());
    }

    #[test]
    fn cancel_is_idempotent() {
        let mut s = Scheduler::new();
        s.schedule_once(0, 10, PhaseAction::WorkElapsed);
        s.cancel_once();
        s.cancel_once();
        assert_eq!(s.take_due_phase(u64::MAX), None);
        s.cancel_repeating();
        assert!(!s.ticker_pending());
    }

    #[test]
    fn ticker_rearms_after_firing() {
        let mut s = Scheduler::new();
        s.schedule_repeating(0, 1);
        assert!(!s.take_due_tick(999));
        assert!(s.take_due_tick(1_000));
        assert!(!s.take_due_tick(1_500));
        assert!(s.take_due_tick(2_000));
    }

    #[test]
    fn stalled_loop_produces_single_tick() {
        let mut s = Scheduler::new();
        s.schedule_repeating(0, 1);
        assert!(s.take_due_tick(10_000));
        assert!(!s.take_due_tick(10_500));
        assert!(s.take_due_tick(11_000));
    }

    #[test]
    fn next_deadline_is_earliest_slot() {
        let mut s = Scheduler::new();
        assert_eq!(s.next_deadline_ms(), None);
        s.schedule_once(0, 10, PhaseAction::WorkElapsed);
        s.schedule_repeating(0, 1);
        assert_eq!(s.next_deadline_ms(), Some(1_000));
        s.cancel_repeating();
        assert_eq!(s.next_deadline_ms(), Some(10_000));
    }

    #[test]
    fn clear_empties_both_slots() {
        let mut s = Scheduler::new();
        s.schedule_once(0, 10, PhaseAction::WorkElapsed);
        s.schedule_repeating(0, 1);
        s.clear();
        assert!(!s.phase_pending());
        assert!(!s.ticker_pending());
        assert_eq!(s.next_deadline_ms(), None);
    }
}
