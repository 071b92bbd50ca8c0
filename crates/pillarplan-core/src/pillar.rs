//! Pillars: the recurring commitments the planner keeps alive.
//!
//! A pillar describes *what* the user wants to uphold (name, duration
//! bounds, preferred start windows, quiet hours) and *how often*
//! (the [`Recurrence`] rule). Whether a pillar is currently overdue is
//! decided elsewhere, by the recurrence evaluator; this module only
//! models the data and its defensive normalizations.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// A wall-clock time of day (no date, no zone).
///
/// Used for preferred start windows and quiet-hour boundaries. Serialized
/// as `{ hour, minute }`; the `HH:mm` string form only appears at the
/// config and CLI boundaries, parsed via [`ClockTime::parse`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ClockTime {
    pub hour: u32,
    pub minute: u32,
}

impl ClockTime {
    /// Create a clock time, clamping to the valid range (23:59 max).
    pub fn new(hour: u32, minute: u32) -> Self {
        ClockTime {
            hour: hour.min(23),
            minute: minute.min(59),
        }
    }

    /// Parse an `HH:mm` string.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidClockTime`] when the string is not
    /// two colon-separated numbers within 00:00..=23:59.
    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        let invalid = || ValidationError::InvalidClockTime(s.to_string());
        let (h, m) = s.split_once(':').ok_or_else(invalid)?;
        let hour: u32 = h.trim().parse().map_err(|_| invalid())?;
        let minute: u32 = m.trim().parse().map_err(|_| invalid())?;
        if hour > 23 || minute > 59 {
            return Err(invalid());
        }
        Ok(ClockTime { hour, minute })
    }

    /// Minutes since midnight.
    pub fn minutes_from_midnight(&self) -> u32 {
        self.hour * 60 + self.minute
    }

    /// Concrete timestamp for this clock time on the given day.
    pub fn on_day(&self, day: NaiveDate) -> DateTime<Utc> {
        // Fields are public; clamp so hand-built out-of-range values
        // resolve instead of panicking.
        let naive = day
            .and_hms_opt(self.hour.min(23), self.minute.min(59), 0)
            .unwrap_or_else(|| day.and_time(chrono::NaiveTime::MIN));
        Utc.from_utc_datetime(&naive)
    }
}

impl std::fmt::Display for ClockTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

/// A quiet-hour exclusion window.
///
/// Placements whose half-open interval intersects the window are rejected
/// by slot search. Windows where `end <= start` wrap past midnight
/// (22:00–07:00 excludes late evening *and* early morning).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuietWindow {
    pub start: ClockTime,
    pub end: ClockTime,
}

impl QuietWindow {
    pub fn new(start: ClockTime, end: ClockTime) -> Self {
        QuietWindow { start, end }
    }

    /// Whether the window wraps past midnight.
    pub fn wraps(&self) -> bool {
        self.end.minutes_from_midnight() <= self.start.minutes_from_midnight()
    }

    /// True if the half-open minute-of-day range `[start_min, end_min)`
    /// intersects this window. The range must lie within a single day.
    pub fn intersects(&self, start_min: u32, end_min: u32) -> bool {
        if start_min >= end_min {
            return false;
        }
        let ws = self.start.minutes_from_midnight();
        let we = self.end.minutes_from_midnight();
        if self.wraps() {
            // [ws, 24h) ∪ [0, we)
            start_min < we || end_min > ws
        } else {
            start_min < we && ws < end_min
        }
    }
}

/// How often a pillar wants to be satisfied.
///
/// Counts are signed on purpose: zero or negative counts arriving from
/// stored or hand-edited data degrade to [`Recurrence::AsNeeded`] at
/// evaluation time instead of failing or dividing by zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Recurrence {
    /// Every day.
    Daily,
    /// `times` per week.
    Weekly { times: i32 },
    /// `times` per month.
    Monthly { times: i32 },
    /// No fixed cadence; surfaces after a configurable floor.
    AsNeeded,
}

impl Recurrence {
    /// Expected days between satisfactions under this rule.
    ///
    /// `floor_days` is the as-needed interval; rules with non-positive
    /// counts use it too.
    pub fn expected_interval_days(&self, floor_days: f64) -> f64 {
        match *self {
            Recurrence::Daily => 1.0,
            Recurrence::Weekly { times } if times > 0 => 7.0 / f64::from(times),
            Recurrence::Monthly { times } if times > 0 => 30.0 / f64::from(times),
            _ => floor_days,
        }
    }

    /// Whether the count field (if any) is degenerate and the rule acts
    /// as as-needed.
    pub fn acts_as_needed(&self) -> bool {
        matches!(
            *self,
            Recurrence::AsNeeded
                | Recurrence::Weekly { times: i32::MIN..=0 }
                | Recurrence::Monthly { times: i32::MIN..=0 }
        )
    }
}

impl Default for Recurrence {
    fn default() -> Self {
        Recurrence::AsNeeded
    }
}

/// A recurring commitment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pillar {
    /// Unique identifier
    pub id: String,
    /// Display name
    pub name: String,
    /// Recurrence rule
    pub recurrence: Recurrence,
    /// Minimum session duration in minutes
    pub min_minutes: u32,
    /// Maximum session duration in minutes
    pub max_minutes: u32,
    /// Preferred start times, in priority order
    #[serde(default)]
    pub preferred_windows: Vec<ClockTime>,
    /// Quiet-hour exclusion windows
    #[serde(default)]
    pub quiet_windows: Vec<QuietWindow>,
    /// When the pillar was last satisfied (None = never)
    pub last_satisfied_at: Option<DateTime<Utc>>,
    /// Whether the planner may generate candidate blocks for it
    #[serde(default = "default_true")]
    pub actionable: bool,
    /// Whether suggestions linked to it receive the pillar boost
    #[serde(default)]
    pub emphasized: bool,
    /// Display emoji
    pub emoji: Option<String>,
    /// Display color (hex or token, renderer-defined)
    pub color: Option<String>,
}

fn default_true() -> bool {
    true
}

impl Pillar {
    /// Create a pillar with default duration bounds (25–50 minutes).
    pub fn new(id: impl Into<String>, name: impl Into<String>, recurrence: Recurrence) -> Self {
        Pillar {
            id: id.into(),
            name: name.into(),
            recurrence,
            min_minutes: 25,
            max_minutes: 50,
            preferred_windows: Vec::new(),
            quiet_windows: Vec::new(),
            last_satisfied_at: None,
            actionable: true,
            emphasized: false,
            emoji: None,
            color: None,
        }
    }

    pub fn with_duration(mut self, min_minutes: u32, max_minutes: u32) -> Self {
        self.min_minutes = min_minutes;
        self.max_minutes = max_minutes;
        self
    }

    pub fn with_windows(mut self, windows: Vec<ClockTime>) -> Self {
        self.preferred_windows = windows;
        self
    }

    pub fn with_quiet(mut self, quiet: Vec<QuietWindow>) -> Self {
        self.quiet_windows = quiet;
        self
    }

    pub fn with_last_satisfied(mut self, at: DateTime<Utc>) -> Self {
        self.last_satisfied_at = Some(at);
        self
    }

    /// Duration bounds with min/max swapped if stored reversed.
    pub fn duration_bounds(&self) -> (u32, u32) {
        if self.min_minutes <= self.max_minutes {
            (self.min_minutes, self.max_minutes)
        } else {
            (self.max_minutes, self.min_minutes)
        }
    }

    /// The session length candidate generation plans for.
    pub fn planning_minutes(&self) -> u32 {
        self.duration_bounds().0
    }

    /// Mark the pillar satisfied at `at`.
    pub fn satisfy(&mut self, at: DateTime<Utc>) {
        self.last_satisfied_at = Some(at);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_valid_clock_times() {
        assert_eq!(ClockTime::parse("07:00").unwrap(), ClockTime::new(7, 0));
        assert_eq!(ClockTime::parse("23:59").unwrap(), ClockTime::new(23, 59));
        assert_eq!(ClockTime::parse("0:5").unwrap(), ClockTime::new(0, 5));
    }

    #[test]
    fn parse_rejects_out_of_range_and_garbage() {
        assert!(ClockTime::parse("24:00").is_err());
        assert!(ClockTime::parse("12:60").is_err());
        assert!(ClockTime::parse("noon").is_err());
        assert!(ClockTime::parse("12").is_err());
    }

    #[test]
    fn clock_time_displays_zero_padded() {
        assert_eq!(ClockTime::new(7, 5).to_string(), "07:05");
    }

    #[test]
    fn quiet_window_simple_intersection() {
        // 13:00-14:00
        let w = QuietWindow::new(ClockTime::new(13, 0), ClockTime::new(14, 0));
        assert!(w.intersects(13 * 60 + 30, 14 * 60 + 30));
        assert!(w.intersects(12 * 60 + 30, 13 * 60 + 30));
        // Half-open: touching the edges is fine
        assert!(!w.intersects(12 * 60, 13 * 60));
        assert!(!w.intersects(14 * 60, 15 * 60));
    }

    #[test]
    fn quiet_window_wraps_past_midnight() {
        // 22:00-07:00
        let w = QuietWindow::new(ClockTime::new(22, 0), ClockTime::new(7, 0));
        assert!(w.wraps());
        assert!(w.intersects(22 * 60 + 30, 23 * 60));
        assert!(w.intersects(6 * 60, 6 * 60 + 30));
        assert!(!w.intersects(10 * 60, 11 * 60));
        // Straddling the evening edge
        assert!(w.intersects(21 * 60 + 45, 22 * 60 + 15));
    }

    #[test]
    fn zero_count_rules_act_as_needed() {
        assert!(Recurrence::Weekly { times: 0 }.acts_as_needed());
        assert!(Recurrence::Monthly { times: -2 }.acts_as_needed());
        assert!(!Recurrence::Weekly { times: 3 }.acts_as_needed());
        assert_eq!(
            Recurrence::Weekly { times: 0 }.expected_interval_days(7.0),
            7.0
        );
    }

    #[test]
    fn expected_interval_divides_by_count() {
        let weekly3 = Recurrence::Weekly { times: 3 };
        assert!((weekly3.expected_interval_days(7.0) - 7.0 / 3.0).abs() < 1e-9);
        let monthly2 = Recurrence::Monthly { times: 2 };
        assert!((monthly2.expected_interval_days(7.0) - 15.0).abs() < 1e-9);
    }

    #[test]
    fn duration_bounds_swap_when_reversed() {
        let p = Pillar::new("p1", "Deep work", Recurrence::Daily).with_duration(90, 45);
        assert_eq!(p.duration_bounds(), (45, 90));
        assert_eq!(p.planning_minutes(), 45);
    }

    #[test]
    fn recurrence_serde_uses_kind_tag() {
        let json = serde_json::to_string(&Recurrence::Weekly { times: 3 }).unwrap();
        assert!(json.contains("\"kind\":\"weekly\""));
        let back: Recurrence = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Recurrence::Weekly { times: 3 });
    }
}
