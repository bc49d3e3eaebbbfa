//! The reminder evaluation pass.
//!
//! Wall-clock based and caller-driven, like the rest of this crate: no
//! internal threads or timers. The caller invokes [`Evaluator::pass`]
//! periodically -- and once immediately on startup or after the event set
//! changes -- with an injected `now`, which keeps every decision
//! deterministic under test.
//!
//! ## Trigger window
//!
//! For an event starting at `S` with lead time `M` minutes, the reminder
//! instant is `R = S - M`. The event is due while `now` is inside
//! `[R, S)`: the lower bound is inclusive, the upper exclusive, so a
//! reminder never fires after the event has started. `M = 0` would make
//! that window empty, so it is widened to `[S, S + tick)` -- the reminder
//! fires within one tick period after the start is reached.

use chrono::{DateTime, Duration, Utc};
use tracing::warn;

use crate::event::CalendarEvent;

/// Default tick cadence in milliseconds.
///
/// Five seconds keeps the chance of skipping an entire trigger window
/// negligible for the supported lead-time granularity of one minute; the
/// zero-lead-time window is widened by one tick period to compensate for
/// cadence at all.
pub const DEFAULT_TICK_MS: i64 = 5_000;

/// Pure scan-and-decide pass over the event set.
#[derive(Debug, Clone)]
pub struct Evaluator {
    tick: Duration,
}

impl Default for Evaluator {
    fn default() -> Self {
        Self {
            tick: Duration::milliseconds(DEFAULT_TICK_MS),
        }
    }
}

impl Evaluator {
    /// An evaluator expecting to be driven roughly every `tick`.
    pub fn new(tick: Duration) -> Self {
        Self { tick }
    }

    pub fn tick(&self) -> Duration {
        self.tick
    }

    /// Scan all events and decide firing. Returns the events that became
    /// due on this pass, already marked `notified` (the mark commits the
    /// decision before any delivery is attempted).
    ///
    /// Per event, independently (cross-event ordering carries no meaning):
    /// - disabled reminders are invisible and left untouched;
    /// - malformed events are skipped with a warning, never marked;
    /// - inside the trigger window and not yet notified: mark and emit;
    /// - past the window with `notified` still set: the occurrence has
    ///   elapsed, so the flag resets -- re-arming, not re-firing; an event
    ///   whose start is later moved to the future fires again;
    /// - before the window with `notified` set (clock skew, or a lead-time
    ///   change that pushed the window later): reset as well.
    pub fn pass(
        &self,
        events: &mut [CalendarEvent],
        now: DateTime<Utc>,
    ) -> Vec<CalendarEvent> {
        let mut due = Vec::new();
        for event in events.iter_mut() {
            if !event.reminder_enabled {
                continue;
            }
            if !event.is_well_formed() {
                warn!(event_id = %event.id, "skipping malformed event");
                continue;
            }

            let reminder_at = event.reminder_instant();
            let upper = if event.reminder_minutes == 0 {
                event.start + self.tick
            } else {
                event.start
            };

            if now >= reminder_at && now < upper {
                if !event.notified {
                    event.notified = true;
                    due.push(event.clone());
                }
            } else if event.notified {
                event.notified = false;
            }
        }
        due
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use proptest::prelude::*;

    fn t(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    fn event_at(start_secs: i64, lead_minutes: u32) -> CalendarEvent {
        let mut event =
            CalendarEvent::new("Standup", t(start_secs), t(start_secs + 3600)).unwrap();
        event.reminder_minutes = lead_minutes;
        event
    }

    #[test]
    fn fires_inside_window() {
        let evaluator = Evaluator::default();
        // Start at +900s, 15 minute lead: window is [0, 900).
        let mut events = vec![event_at(900, 15)];

        let due = evaluator.pass(&mut events, t(100));
        assert_eq!(due.len(), 1);
        assert!(due[0].notified);
        assert!(events[0].notified);
    }

    #[test]
    fn lower_bound_is_inclusive() {
        let evaluator = Evaluator::default();
        let mut events = vec![event_at(900, 15)];
        let due = evaluator.pass(&mut events, t(0));
        assert_eq!(due.len(), 1);
    }

    #[test]
    fn upper_bound_is_exclusive() {
        let evaluator = Evaluator::default();
        let mut events = vec![event_at(900, 15)];
        // Exactly at start: the event has begun, no reminder.
        let due = evaluator.pass(&mut events, t(900));
        assert!(due.is_empty());
        assert!(!events[0].notified);
    }

    #[test]
    fn not_due_before_window() {
        let evaluator = Evaluator::default();
        let mut events = vec![event_at(900, 10)];
        // Window opens at 300s.
        let due = evaluator.pass(&mut events, t(200));
        assert!(due.is_empty());
    }

    #[test]
    fn disabled_events_are_invisible() {
        let evaluator = Evaluator::default();
        let mut events = vec![event_at(900, 15)];
        events[0].reminder_enabled = false;
        let due = evaluator.pass(&mut events, t(100));
        assert!(due.is_empty());
        assert!(!events[0].notified);
    }

    #[test]
    fn second_pass_is_a_no_op() {
        let evaluator = Evaluator::default();
        let mut events = vec![event_at(900, 15)];
        assert_eq!(evaluator.pass(&mut events, t(100)).len(), 1);
        // Same instant, no mutation in between: nothing new fires.
        assert!(evaluator.pass(&mut events, t(100)).is_empty());
        assert!(evaluator.pass(&mut events, t(200)).is_empty());
    }

    #[test]
    fn elapsed_event_rearms() {
        let evaluator = Evaluator::default();
        let mut events = vec![event_at(900, 15)];
        evaluator.pass(&mut events, t(100));
        assert!(events[0].notified);

        // Past start: suppression clears, but nothing re-fires.
        let due = evaluator.pass(&mut events, t(960));
        assert!(due.is_empty());
        assert!(!events[0].notified);
    }

    #[test]
    fn rearmed_event_fires_after_start_moves_forward() {
        let evaluator = Evaluator::default();
        let mut events = vec![event_at(900, 15)];
        evaluator.pass(&mut events, t(100));
        evaluator.pass(&mut events, t(960));
        assert!(!events[0].notified);

        // Reschedule to the future; the next pass inside the new window fires.
        events[0].start = t(3000);
        events[0].end = t(6600);
        let due = evaluator.pass(&mut events, t(2400));
        assert_eq!(due.len(), 1);
    }

    #[test]
    fn notified_before_window_resets() {
        let evaluator = Evaluator::default();
        let mut events = vec![event_at(900, 15)];
        // A recorded firing that predates the window, e.g. after the lead
        // time shrank from 15 to 2 minutes.
        events[0].notified = true;
        events[0].reminder_minutes = 2;

        let due = evaluator.pass(&mut events, t(100));
        assert!(due.is_empty());
        assert!(!events[0].notified);
    }

    #[test]
    fn zero_lead_time_fires_within_one_tick_of_start() {
        let evaluator = Evaluator::default();
        let mut events = vec![event_at(900, 0)];

        assert!(evaluator.pass(&mut events, t(899)).is_empty());
        // At start: due despite the nominally empty [S, S) window.
        let due = evaluator.pass(&mut events, t(900));
        assert_eq!(due.len(), 1);
        // One tick later the widened window has closed and the flag resets;
        // the window never re-admits the event.
        assert!(evaluator.pass(&mut events, t(905)).is_empty());
        assert!(!events[0].notified);
        assert!(evaluator.pass(&mut events, t(906)).is_empty());
        assert!(!events[0].notified);
    }

    #[test]
    fn malformed_event_is_skipped_without_marking() {
        let evaluator = Evaluator::default();
        let mut good = event_at(900, 15);
        good.title = "ok".to_string();
        let mut bad = event_at(900, 15);
        bad.title = "  ".to_string();
        let mut events = vec![bad, good];

        let due = evaluator.pass(&mut events, t(100));
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].title, "ok");
        assert!(!events[0].notified);
    }

    proptest! {
        /// For any single un-edited event, simulated default-cadence ticks
        /// across its whole window fire it at most once, and the pass
        /// leaves it re-armed once the occurrence has elapsed.
        #[test]
        fn fires_at_most_once_per_occurrence(
            lead_minutes in 0u32..180,
            start_offset_secs in 0i64..7_200,
        ) {
            let evaluator = Evaluator::default();
            let mut events = vec![event_at(start_offset_secs, lead_minutes)];

            let mut fired = 0usize;
            let horizon = start_offset_secs + 600;
            let mut now_secs = 0i64;
            while now_secs <= horizon {
                fired += evaluator.pass(&mut events, t(now_secs)).len();
                now_secs += DEFAULT_TICK_MS / 1000;
            }

            prop_assert!(fired <= 1);
            // The window overlaps the simulation unless the event starts
            // immediately with a nonzero lead (window entirely in the past).
            let expected = if lead_minutes > 0 && start_offset_secs == 0 { 0 } else { 1 };
            prop_assert_eq!(fired, expected);
            prop_assert!(!events[0].notified);
        }
    }
}
