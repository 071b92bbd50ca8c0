//! Greedy first-fit slot search for a single pillar.
//!
//! Preferred windows are tried in the order the user declared them; only
//! when none fits does the search fall back to a forward scan from "now,
//! rounded up" to the end-of-day horizon. Both paths demand that the
//! whole block finishes by the horizon and that it stays clear of the
//! pillar's quiet hours.

use chrono::{DateTime, Duration, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::day::DayIndex;
use crate::pillar::Pillar;

/// Default forward-scan step for the fallback search.
pub const DEFAULT_STEP_MINUTES: u32 = 30;

/// Default rounding applied to "now" before the fallback scan.
pub const DEFAULT_ROUND_MINUTES: u32 = 15;

/// A placement the search settled on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedSlot {
    pub start_time: DateTime<Utc>,
    pub duration_minutes: u32,
}

impl PlannedSlot {
    pub fn end_time(&self) -> DateTime<Utc> {
        self.start_time + Duration::minutes(i64::from(self.duration_minutes))
    }
}

/// First-fit searcher over one day's index.
#[derive(Debug, Clone)]
pub struct SlotFinder<'a> {
    index: &'a DayIndex,
    now: DateTime<Utc>,
    horizon: DateTime<Utc>,
    step_minutes: u32,
    round_minutes: u32,
}

impl<'a> SlotFinder<'a> {
    pub fn new(index: &'a DayIndex, now: DateTime<Utc>, horizon: DateTime<Utc>) -> Self {
        SlotFinder {
            index,
            now,
            horizon,
            step_minutes: DEFAULT_STEP_MINUTES,
            round_minutes: DEFAULT_ROUND_MINUTES,
        }
    }

    /// Override scan granularity. Zero values degrade to one minute.
    pub fn with_steps(mut self, step_minutes: u32, round_minutes: u32) -> Self {
        self.step_minutes = step_minutes.max(1);
        self.round_minutes = round_minutes.max(1);
        self
    }

    /// Find a slot for the pillar's minimum duration, or `None` when the
    /// day has no room. An empty result is an ordinary outcome, not an
    /// error.
    pub fn find_slot(&self, pillar: &Pillar) -> Option<PlannedSlot> {
        let duration = pillar.planning_minutes();
        if duration == 0 {
            return None;
        }
        self.preferred_slot(pillar, duration)
            .or_else(|| self.fallback_slot(pillar, duration))
            .map(|start_time| PlannedSlot {
                start_time,
                duration_minutes: duration,
            })
    }

    /// First feasible preferred window, in declared order.
    fn preferred_slot(&self, pillar: &Pillar, duration: u32) -> Option<DateTime<Utc>> {
        let day = self.now.date_naive();
        let span = Duration::minutes(i64::from(duration));
        for window in &pillar.preferred_windows {
            let start = window.on_day(day);
            if start < self.now {
                continue;
            }
            if start + span > self.horizon {
                continue;
            }
            if self.violates_quiet(pillar, start, duration) {
                continue;
            }
            if !self.index.overlaps(start, duration) {
                return Some(start);
            }
        }
        None
    }

    /// Forward scan from now (rounded up) to the horizon.
    fn fallback_slot(&self, pillar: &Pillar, duration: u32) -> Option<DateTime<Utc>> {
        let step = Duration::minutes(i64::from(self.step_minutes));
        let mut from = round_up(self.now, self.round_minutes);
        loop {
            let candidate =
                self.index
                    .next_free_slot(from, duration, self.horizon, self.step_minutes)?;
            if !self.violates_quiet(pillar, candidate, duration) {
                return Some(candidate);
            }
            from = candidate + step;
        }
    }

    fn violates_quiet(&self, pillar: &Pillar, start: DateTime<Utc>, duration: u32) -> bool {
        if pillar.quiet_windows.is_empty() {
            return false;
        }
        let midnight = Utc.from_utc_datetime(&start.date_naive().and_time(NaiveTime::MIN));
        let start_min = (start - midnight).num_minutes().clamp(0, 24 * 60) as u32;
        // Slots are searched within a single day; clamp keeps a block
        // nudged past midnight from wrapping the window math.
        let end_min = (start_min + duration).min(24 * 60);
        pillar
            .quiet_windows
            .iter()
            .any(|w| w.intersects(start_min, end_min))
    }
}

/// Round `at` up to the next multiple of `minutes` past midnight.
pub fn round_up(at: DateTime<Utc>, minutes: u32) -> DateTime<Utc> {
    let step_secs = i64::from(minutes.max(1)) * 60;
    let midnight = Utc.from_utc_datetime(&at.date_naive().and_time(NaiveTime::MIN));
    let elapsed_secs = (at - midnight).num_seconds().max(0);
    let rounded = (elapsed_secs + step_secs - 1).div_euclid(step_secs) * step_secs;
    midnight + Duration::seconds(rounded)
}
