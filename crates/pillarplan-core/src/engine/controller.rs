//! Debounce/coalesce state machine for recomputation.
//!
//! A wall-clock-based state machine: the caller supplies `now` to every
//! transition and polls for the deadline — no internal threads or
//! timers, which keeps every sequence of mutations and completions
//! deterministic to test. The async service drives this with real time;
//! tests drive it with fabricated clocks.
//!
//! The contract: a burst of mutations inside one debounce window costs
//! one pass; mutations landing while a pass runs cost exactly one
//! follow-up pass, never a queue.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;

/// Where the recompute machinery currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecomputeState {
    /// Nothing pending.
    Idle,
    /// A pass is booked for the debounce deadline.
    Scheduled,
    /// A pass is executing over a snapshot.
    Running,
    /// Inputs changed under a running pass; rerun when it finishes.
    Stale,
}

/// Debounced single-flight scheduler for planning passes.
#[derive(Debug, Clone)]
pub struct RecomputeController {
    state: RecomputeState,
    debounce: Duration,
    deadline: Option<DateTime<Utc>>,
}

impl RecomputeController {
    /// Controller with the given debounce window. Negative windows are
    /// treated as zero.
    pub fn new(debounce: Duration) -> Self {
        RecomputeController {
            state: RecomputeState::Idle,
            debounce: debounce.max(Duration::zero()),
            deadline: None,
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.debounce())
    }

    // ── Transitions ──

    /// Record that an input changed at `now`.
    ///
    /// Idle and Scheduled collapse into Scheduled with a fresh deadline
    /// (every mutation restarts the debounce window). Running and Stale
    /// collapse into Stale — the in-flight pass is never cancelled, it
    /// just earns a follow-up.
    pub fn note_mutation(&mut self, now: DateTime<Utc>) {
        match self.state {
            RecomputeState::Idle | RecomputeState::Scheduled => {
                self.state = RecomputeState::Scheduled;
                self.deadline = Some(now + self.debounce);
            }
            RecomputeState::Running | RecomputeState::Stale => {
                self.state = RecomputeState::Stale;
            }
        }
    }

    /// Whether a pass should begin at `now`. On `true` the controller
    /// has moved to Running and the caller must eventually call
    /// [`RecomputeController::finish`].
    pub fn poll_start(&mut self, now: DateTime<Utc>) -> bool {
        if self.state == RecomputeState::Scheduled {
            if let Some(deadline) = self.deadline {
                if now >= deadline {
                    self.state = RecomputeState::Running;
                    self.deadline = None;
                    return true;
                }
            }
        }
        false
    }

    /// Record that the in-flight pass finished (and published) at `now`.
    ///
    /// Returns `true` when a follow-up pass is already booked: a Stale
    /// finish reschedules immediately, with a zero-length wait, so the
    /// follow-up runs over the fresh inputs.
    pub fn finish(&mut self, now: DateTime<Utc>) -> bool {
        match self.state {
            RecomputeState::Running => {
                self.state = RecomputeState::Idle;
                self.deadline = None;
                false
            }
            RecomputeState::Stale => {
                self.state = RecomputeState::Scheduled;
                self.deadline = Some(now);
                true
            }
            RecomputeState::Idle | RecomputeState::Scheduled => {
                tracing::debug!(state = ?self.state, "finish without a running pass, ignoring");
                false
            }
        }
    }

    // ── Queries ──

    pub fn state(&self) -> RecomputeState {
        self.state
    }

    /// When the next pass is due, if one is booked.
    pub fn deadline(&self) -> Option<DateTime<Utc>> {
        self.deadline
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, RecomputeState::Running | RecomputeState::Stale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t(ms: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 10, 9, 0, 0).unwrap() + Duration::milliseconds(ms)
    }

    fn make_controller() -> RecomputeController {
        RecomputeController::new(Duration::milliseconds(400))
    }

    #[test]
    fn burst_of_mutations_costs_one_pass() {
        let mut c = make_controller();
        for i in 0..5 {
            c.note_mutation(t(i * 20));
            assert_eq!(c.state(), RecomputeState::Scheduled);
        }
        // Last mutation at t+80ms; deadline at t+480ms.
        assert!(!c.poll_start(t(400)));
        assert!(c.poll_start(t(480)));
        assert_eq!(c.state(), RecomputeState::Running);
        // Only one start per window.
        assert!(!c.poll_start(t(500)));
        assert!(!c.finish(t(600)));
        assert_eq!(c.state(), RecomputeState::Idle);
    }

    #[test]
    fn every_mutation_restarts_the_debounce_window() {
        let mut c = make_controller();
        c.note_mutation(t(0));
        assert_eq!(c.deadline(), Some(t(400)));
        c.note_mutation(t(300));
        assert_eq!(c.deadline(), Some(t(700)));
        assert!(!c.poll_start(t(500)));
        assert!(c.poll_start(t(700)));
    }

    #[test]
    fn mutation_during_running_earns_exactly_one_follow_up() {
        let mut c = make_controller();
        c.note_mutation(t(0));
        assert!(c.poll_start(t(400)));

        // Several edits land while the pass runs; they coalesce.
        c.note_mutation(t(450));
        c.note_mutation(t(470));
        c.note_mutation(t(490));
        assert_eq!(c.state(), RecomputeState::Stale);

        // The pass still completes and publishes; finish books the
        // follow-up with zero delay.
        assert!(c.finish(t(600)));
        assert_eq!(c.state(), RecomputeState::Scheduled);
        assert_eq!(c.deadline(), Some(t(600)));
        assert!(c.poll_start(t(600)));

        // Clean second finish: back to Idle, no third pass.
        assert!(!c.finish(t(700)));
        assert_eq!(c.state(), RecomputeState::Idle);
        assert!(!c.poll_start(t(800)));
    }

    #[test]
    fn clean_pass_returns_to_idle() {
        let mut c = make_controller();
        c.note_mutation(t(0));
        assert!(c.poll_start(t(400)));
        assert!(c.is_running());
        assert!(!c.finish(t(500)));
        assert_eq!(c.state(), RecomputeState::Idle);
        assert_eq!(c.deadline(), None);
    }

    #[test]
    fn poll_before_deadline_is_a_no_op() {
        let mut c = make_controller();
        c.note_mutation(t(0));
        assert!(!c.poll_start(t(399)));
        assert_eq!(c.state(), RecomputeState::Scheduled);
    }

    #[test]
    fn poll_in_idle_never_starts() {
        let mut c = make_controller();
        assert!(!c.poll_start(t(1000)));
        assert_eq!(c.state(), RecomputeState::Idle);
    }

    #[test]
    fn finish_in_idle_is_tolerated() {
        let mut c = make_controller();
        assert!(!c.finish(t(0)));
        assert_eq!(c.state(), RecomputeState::Idle);
    }

    #[test]
    fn zero_debounce_starts_immediately() {
        let mut c = RecomputeController::new(Duration::zero());
        c.note_mutation(t(0));
        assert!(c.poll_start(t(0)));
    }

    #[test]
    fn negative_debounce_degrades_to_zero() {
        let mut c = RecomputeController::new(Duration::milliseconds(-50));
        c.note_mutation(t(0));
        assert_eq!(c.deadline(), Some(t(0)));
    }

    #[test]
    fn state_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&RecomputeState::Stale).unwrap(),
            "\"stale\""
        );
    }
}
