//! Candidate generation: overdue pillars turned into concrete proposals.
//!
//! Candidates are plain [`TimeBlock`]s with a `pillar_id` backlink and a
//! deterministic id, so generating twice over identical inputs yields an
//! identical set. They do not reserve their slots — two overdue pillars
//! may be offered the same free gap; whichever the user accepts first
//! wins, and the next pass re-plans the other.

use chrono::{DateTime, Utc};

use crate::block::{Energy, TimeBlock};
use crate::config::EngineConfig;
use crate::day::DayIndex;
use crate::pillar::{ClockTime, Pillar};
use crate::recurrence::{PillarStatus, RecurrenceEvaluator};
use crate::slots::SlotFinder;

/// Generates candidate blocks for overdue pillars.
#[derive(Debug, Clone)]
pub struct CandidateGenerator {
    evaluator: RecurrenceEvaluator,
    step_minutes: u32,
    round_minutes: u32,
    day_end: ClockTime,
}

impl Default for CandidateGenerator {
    fn default() -> Self {
        CandidateGenerator {
            evaluator: RecurrenceEvaluator::new(),
            step_minutes: crate::slots::DEFAULT_STEP_MINUTES,
            round_minutes: crate::slots::DEFAULT_ROUND_MINUTES,
            day_end: ClockTime::new(22, 0),
        }
    }
}

impl CandidateGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Generator wired to the engine configuration.
    pub fn from_config(config: &EngineConfig) -> Self {
        CandidateGenerator {
            evaluator: RecurrenceEvaluator::with_floor(config.as_needed_floor_days),
            step_minutes: config.step_minutes.max(1),
            round_minutes: config.round_minutes.max(1),
            day_end: config.day_end_time(),
        }
    }

    pub fn evaluator(&self) -> &RecurrenceEvaluator {
        &self.evaluator
    }

    /// Status bundle for every pillar, actionable or not (badge input).
    pub fn statuses(&self, pillars: &[Pillar], now: DateTime<Utc>) -> Vec<PillarStatus> {
        pillars.iter().map(|p| self.evaluator.status(p, now)).collect()
    }

    /// One candidate per actionable overdue pillar that still fits in the
    /// day, most urgent first. Pillars without room are omitted — an
    /// empty result is an ordinary outcome.
    pub fn generate(&self, pillars: &[Pillar], index: &DayIndex, now: DateTime<Utc>) -> Vec<TimeBlock> {
        let horizon = self.day_end.on_day(now.date_naive());
        let finder = SlotFinder::new(index, now, horizon)
            .with_steps(self.step_minutes, self.round_minutes);

        let mut overdue: Vec<(f64, &Pillar)> = pillars
            .iter()
            .filter(|p| p.actionable && self.evaluator.is_overdue(p, now))
            .map(|p| (self.evaluator.urgency(p, now), p))
            .collect();
        // Most urgent first; pillar id keeps equal urgencies stable.
        overdue.sort_by(|(ua, pa), (ub, pb)| {
            ub.total_cmp(ua).then_with(|| pa.id.cmp(&pb.id))
        });

        let mut candidates = Vec::new();
        for (_, pillar) in overdue {
            if let Some(slot) = finder.find_slot(pillar) {
                candidates.push(TimeBlock {
                    id: format!(
                        "cand-{}-{}",
                        pillar.id,
                        slot.start_time.format("%H%M")
                    ),
                    title: pillar.name.clone(),
                    start_time: slot.start_time,
                    duration_minutes: slot.duration_minutes,
                    energy: Energy::Medium,
                    emoji: pillar.emoji.clone(),
                    pillar_id: Some(pillar.id.clone()),
                });
            } else {
                tracing::debug!(pillar = %pillar.id, "no free slot for overdue pillar this pass");
            }
        }
        candidates
    }
}
