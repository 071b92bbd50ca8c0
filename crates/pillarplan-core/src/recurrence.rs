//! Recurrence evaluation: which pillars are overdue, and how urgently.
//!
//! Elapsed time is measured in whole calendar days (`date_naive`
//! difference), so a pillar's overdue state flips at midnight rather
//! than flapping at whatever hour it was last satisfied.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::pillar::{Pillar, Recurrence};

/// Urgency assigned to never-satisfied pillars. Large enough to sort
/// above any elapsed/expected ratio, finite so it serializes cleanly.
pub const MAX_URGENCY: f64 = 1_000_000.0;

/// Default surfacing interval for as-needed pillars, in days.
pub const DEFAULT_AS_NEEDED_FLOOR_DAYS: f64 = 7.0;

/// Evaluates recurrence rules against the clock.
#[derive(Debug, Clone)]
pub struct RecurrenceEvaluator {
    as_needed_floor_days: f64,
}

impl Default for RecurrenceEvaluator {
    fn default() -> Self {
        RecurrenceEvaluator {
            as_needed_floor_days: DEFAULT_AS_NEEDED_FLOOR_DAYS,
        }
    }
}

impl RecurrenceEvaluator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Evaluator with a custom as-needed floor. Non-finite or
    /// non-positive floors fall back to the default.
    pub fn with_floor(days: f64) -> Self {
        let floor = if days.is_finite() && days > 0.0 {
            days
        } else {
            DEFAULT_AS_NEEDED_FLOOR_DAYS
        };
        RecurrenceEvaluator {
            as_needed_floor_days: floor,
        }
    }

    /// Whole calendar days between `last` and `now`, never negative.
    pub fn elapsed_days(last: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
        (now.date_naive() - last.date_naive()).num_days().max(0)
    }

    /// Expected days between satisfactions for `rule`.
    pub fn expected_interval_days(&self, rule: Recurrence) -> f64 {
        rule.expected_interval_days(self.as_needed_floor_days)
    }

    /// Whether the pillar is overdue at `now`.
    ///
    /// Daily pillars get a one-day grace (done yesterday means due, not
    /// overdue); every other rule is overdue once the elapsed days reach
    /// the expected interval. Never-satisfied pillars are always overdue.
    pub fn is_overdue(&self, pillar: &Pillar, now: DateTime<Utc>) -> bool {
        let Some(last) = pillar.last_satisfied_at else {
            return true;
        };
        let elapsed = Self::elapsed_days(last, now);
        match pillar.recurrence {
            Recurrence::Daily => elapsed > 1,
            rule => elapsed as f64 >= rule.expected_interval_days(self.as_needed_floor_days),
        }
    }

    /// Elapsed/expected ratio, capped at [`MAX_URGENCY`]. Never-satisfied
    /// pillars report the cap itself.
    pub fn urgency(&self, pillar: &Pillar, now: DateTime<Utc>) -> f64 {
        let Some(last) = pillar.last_satisfied_at else {
            return MAX_URGENCY;
        };
        let elapsed = Self::elapsed_days(last, now) as f64;
        let expected = self.expected_interval_days(pillar.recurrence);
        (elapsed / expected).min(MAX_URGENCY)
    }

    /// Full status bundle for one pillar (badge rendering input).
    pub fn status(&self, pillar: &Pillar, now: DateTime<Utc>) -> PillarStatus {
        PillarStatus {
            pillar_id: pillar.id.clone(),
            name: pillar.name.clone(),
            overdue: self.is_overdue(pillar, now),
            urgency: self.urgency(pillar, now),
            elapsed_days: pillar
                .last_satisfied_at
                .map(|last| Self::elapsed_days(last, now)),
            expected_interval_days: self.expected_interval_days(pillar.recurrence),
        }
    }
}

/// Per-pillar overdue status, published with every plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PillarStatus {
    pub pillar_id: String,
    pub name: String,
    pub overdue: bool,
    pub urgency: f64,
    /// Whole days since last satisfaction; `None` when never satisfied
    pub elapsed_days: Option<i64>,
    pub expected_interval_days: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn noon(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, day, 12, 0, 0).unwrap()
    }

    fn make_pillar(recurrence: Recurrence, last_days_ago: Option<i64>) -> Pillar {
        let mut p = Pillar::new("p1", "Exercise", recurrence);
        p.last_satisfied_at = last_days_ago.map(|d| noon(20) - Duration::days(d));
        p
    }

    #[test]
    fn weekly_three_times_is_overdue_after_four_days() {
        let eval = RecurrenceEvaluator::new();
        let now = noon(20);
        // 7/3 ≈ 2.33 expected days
        assert!(eval.is_overdue(&make_pillar(Recurrence::Weekly { times: 3 }, Some(4)), now));
        assert!(!eval.is_overdue(&make_pillar(Recurrence::Weekly { times: 3 }, Some(1)), now));
    }

    #[test]
    fn zero_count_weekly_degrades_to_as_needed() {
        let eval = RecurrenceEvaluator::new();
        let now = noon(20);
        let p6 = make_pillar(Recurrence::Weekly { times: 0 }, Some(6));
        let p7 = make_pillar(Recurrence::Weekly { times: 0 }, Some(7));
        assert!(!eval.is_overdue(&p6, now));
        assert!(eval.is_overdue(&p7, now));
        // No division by zero anywhere
        assert!(eval.urgency(&p7, now).is_finite());
        assert_eq!(eval.expected_interval_days(Recurrence::Weekly { times: 0 }), 7.0);
    }

    #[test]
    fn daily_gets_one_day_grace() {
        let eval = RecurrenceEvaluator::new();
        let now = noon(20);
        assert!(!eval.is_overdue(&make_pillar(Recurrence::Daily, Some(0)), now));
        assert!(!eval.is_overdue(&make_pillar(Recurrence::Daily, Some(1)), now));
        assert!(eval.is_overdue(&make_pillar(Recurrence::Daily, Some(2)), now));
    }

    #[test]
    fn never_satisfied_is_always_overdue_with_max_urgency() {
        let eval = RecurrenceEvaluator::new();
        let now = noon(20);
        let p = make_pillar(Recurrence::Monthly { times: 1 }, None);
        assert!(eval.is_overdue(&p, now));
        assert_eq!(eval.urgency(&p, now), MAX_URGENCY);
    }

    #[test]
    fn monthly_twice_expected_every_fifteen_days() {
        let eval = RecurrenceEvaluator::new();
        let now = noon(20);
        assert!(!eval.is_overdue(&make_pillar(Recurrence::Monthly { times: 2 }, Some(14)), now));
        assert!(eval.is_overdue(&make_pillar(Recurrence::Monthly { times: 2 }, Some(15)), now));
    }

    #[test]
    fn urgency_grows_with_elapsed_time() {
        let eval = RecurrenceEvaluator::new();
        let now = noon(20);
        let fresh = make_pillar(Recurrence::Weekly { times: 2 }, Some(1));
        let stale = make_pillar(Recurrence::Weekly { times: 2 }, Some(9));
        assert!(eval.urgency(&stale, now) > eval.urgency(&fresh, now));
    }

    #[test]
    fn elapsed_uses_calendar_days_not_hours() {
        // Satisfied 23:50 the previous day, asked at 00:10: one calendar
        // day has elapsed even though only 20 minutes passed.
        let last = Utc.with_ymd_and_hms(2025, 3, 19, 23, 50, 0).unwrap();
        let now = Utc.with_ymd_and_hms(2025, 3, 20, 0, 10, 0).unwrap();
        assert_eq!(RecurrenceEvaluator::elapsed_days(last, now), 1);
    }

    #[test]
    fn future_satisfaction_clamps_to_zero_elapsed() {
        let eval = RecurrenceEvaluator::new();
        let now = noon(20);
        let p = make_pillar(Recurrence::Daily, Some(-3));
        assert!(!eval.is_overdue(&p, now));
        assert_eq!(eval.urgency(&p, now), 0.0);
    }

    #[test]
    fn custom_floor_shifts_as_needed_threshold() {
        let eval = RecurrenceEvaluator::with_floor(3.0);
        let now = noon(20);
        assert!(eval.is_overdue(&make_pillar(Recurrence::AsNeeded, Some(3)), now));
        assert!(!eval.is_overdue(&make_pillar(Recurrence::AsNeeded, Some(2)), now));
    }

    #[test]
    fn degenerate_floor_falls_back_to_default() {
        let eval = RecurrenceEvaluator::with_floor(-1.0);
        assert_eq!(
            eval.expected_interval_days(Recurrence::AsNeeded),
            DEFAULT_AS_NEEDED_FLOOR_DAYS
        );
    }

    #[test]
    fn status_carries_badge_fields() {
        let eval = RecurrenceEvaluator::new();
        let now = noon(20);
        let status = eval.status(&make_pillar(Recurrence::Weekly { times: 3 }, Some(4)), now);
        assert_eq!(status.pillar_id, "p1");
        assert!(status.overdue);
        assert_eq!(status.elapsed_days, Some(4));
        assert!(status.urgency > 1.0);
    }
}
