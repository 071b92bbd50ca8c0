//! The planner engine: one debounced pass from inputs to published plan.
//!
//! [`EngineState`] is the full input snapshot (pillars, blocks, goals,
//! external suggestions, weighting, feedback log), mutated only through
//! [`MutationEvent`]s. [`PlannerEngine::recompute`] is the synchronous
//! pass: index the day, generate candidates for overdue pillars, merge
//! them with external suggestions, score and rank everything, and stamp
//! the result with a monotonically increasing revision.
//!
//! The engine itself never touches the clock or a thread; the service
//! module wraps it for async use.

pub mod controller;
pub mod service;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::block::TimeBlock;
use crate::candidates::CandidateGenerator;
use crate::config::EngineConfig;
use crate::day::DayIndex;
use crate::events::MutationEvent;
use crate::pillar::Pillar;
use crate::recurrence::PillarStatus;
use crate::scoring::{RankedSuggestion, ScoreContext, SuggestionScorer, SuggestionSnapshot};
use crate::suggestion::{FeedbackEntry, Goal, Suggestion, SuggestionWeighting};

pub use controller::{RecomputeController, RecomputeState};
pub use service::{PlannerHandle, PlannerService};

/// Everything a pass reads. Cloned (copy-on-read) when a pass starts,
/// so mutations landing mid-pass never tear the snapshot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineState {
    #[serde(default)]
    pub pillars: Vec<Pillar>,
    /// Today's committed blocks.
    #[serde(default)]
    pub blocks: Vec<TimeBlock>,
    #[serde(default)]
    pub goals: Vec<Goal>,
    /// Externally-supplied suggestions (scored alongside candidates).
    #[serde(default)]
    pub suggestions: Vec<Suggestion>,
    #[serde(default)]
    pub weighting: SuggestionWeighting,
    #[serde(default)]
    pub feedback: Vec<FeedbackEntry>,
}

impl EngineState {
    /// Apply one mutation. Dangling ids are tolerated: removing an
    /// absent block or satisfying an unknown pillar is a logged no-op,
    /// never an error.
    pub fn apply(&mut self, event: MutationEvent) {
        match event {
            MutationEvent::BlockAdded { block, .. } => {
                self.blocks.retain(|b| b.id != block.id);
                self.blocks.push(block);
            }
            MutationEvent::BlockRemoved { block_id, .. } => {
                self.blocks.retain(|b| b.id != block_id);
            }
            MutationEvent::PillarsReplaced { pillars, .. } => {
                self.pillars = pillars;
            }
            MutationEvent::PillarSatisfied { pillar_id, at } => {
                match self.pillars.iter_mut().find(|p| p.id == pillar_id) {
                    Some(pillar) => pillar.satisfy(at),
                    None => {
                        tracing::debug!(pillar = %pillar_id, "satisfy for unknown pillar, ignoring")
                    }
                }
            }
            MutationEvent::GoalsReplaced { goals, .. } => {
                self.goals = goals;
            }
            MutationEvent::WeightingChanged { weighting, .. } => {
                self.weighting = weighting;
            }
            MutationEvent::FeedbackRecorded { entry, .. } => {
                self.feedback.push(entry);
            }
            MutationEvent::SuggestionsReplaced { suggestions, .. } => {
                self.suggestions = suggestions;
            }
        }
    }
}

/// Output of one pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanResult {
    /// Ranked suggestions, best first.
    pub suggestions: Vec<RankedSuggestion>,
    /// Candidate blocks for overdue pillars, most urgent first.
    pub candidates: Vec<TimeBlock>,
    /// Per-pillar badge input, one entry per pillar.
    pub pillar_status: Vec<PillarStatus>,
    pub computed_at: DateTime<Utc>,
    /// Monotonically increasing pass counter.
    pub revision: u64,
}

/// The synchronous planning engine.
#[derive(Debug, Clone)]
pub struct PlannerEngine {
    config: EngineConfig,
    generator: CandidateGenerator,
    scorer: SuggestionScorer,
    revision: u64,
}

impl PlannerEngine {
    pub fn new(config: EngineConfig) -> Self {
        PlannerEngine {
            generator: CandidateGenerator::from_config(&config),
            scorer: SuggestionScorer::from_config(&config),
            config,
            revision: 0,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Recent scoring snapshots, oldest first. Survives across passes
    /// until the ring evicts them.
    pub fn snapshots(&self) -> Vec<SuggestionSnapshot> {
        self.scorer.history().iter().cloned().collect()
    }

    /// Run one pass over `state` as of `now`.
    pub fn recompute(&mut self, state: &EngineState, now: DateTime<Utc>) -> PlanResult {
        let index = DayIndex::new(&state.blocks);
        let candidates = self.generator.generate(&state.pillars, &index, now);
        let pillar_status = self.generator.statuses(&state.pillars, now);

        let mut pool: Vec<Suggestion> = state.suggestions.clone();
        pool.extend(
            candidates
                .iter()
                .map(|c| self.candidate_suggestion(c, &state.pillars, now)),
        );

        let ctx = ScoreContext::new(
            &state.goals,
            &state.pillars,
            &state.feedback,
            state.weighting,
            self.config.weight_cap,
        );
        let suggestions = self.scorer.rank(pool, &ctx, now);

        self.revision += 1;
        tracing::debug!(
            revision = self.revision,
            suggestions = suggestions.len(),
            candidates = candidates.len(),
            "planning pass complete"
        );
        PlanResult {
            suggestions,
            candidates,
            pillar_status,
            computed_at: now,
            revision: self.revision,
        }
    }

    /// Wrap a generated candidate as a scorable suggestion. Confidence
    /// squashes the pillar's urgency into [0, 1): barely overdue sits
    /// near 0.5, never-satisfied approaches 1.
    fn candidate_suggestion(
        &self,
        candidate: &TimeBlock,
        pillars: &[Pillar],
        now: DateTime<Utc>,
    ) -> Suggestion {
        let pillar = candidate
            .pillar_id
            .as_deref()
            .and_then(|id| pillars.iter().find(|p| p.id == id));

        let (confidence, explanation) = match pillar {
            Some(p) => {
                let urgency = self.generator.evaluator().urgency(p, now);
                let confidence = (urgency / (urgency + 1.0)).clamp(0.0, 1.0);
                let explanation = match p.last_satisfied_at {
                    Some(last) => {
                        let days = crate::recurrence::RecurrenceEvaluator::elapsed_days(last, now);
                        format!(
                            "{} is overdue: last done {} day{} ago (aims for every {:.1} days)",
                            p.name,
                            days,
                            if days == 1 { "" } else { "s" },
                            self.generator.evaluator().expected_interval_days(p.recurrence),
                        )
                    }
                    None => format!("{} has never been done yet", p.name),
                };
                (confidence, explanation)
            }
            None => (0.5, candidate.title.clone()),
        };

        Suggestion {
            id: candidate.id.clone(),
            title: candidate.title.clone(),
            explanation: Some(explanation),
            confidence,
            duration_minutes: candidate.duration_minutes,
            suggested_time: Some(candidate.start_time),
            energy: candidate.energy,
            emoji: candidate.emoji.clone(),
            tags: Vec::new(),
            goal_id: None,
            pillar_id: candidate.pillar_id.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pillar::{ClockTime, Recurrence};
    use crate::suggestion::{FeedbackSignal, FeedbackTarget};
    use chrono::{Duration, TimeZone};

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 10, h, m, 0).unwrap()
    }

    fn make_pillar(id: &str, last_days_ago: Option<i64>) -> Pillar {
        let mut p = Pillar::new(id, format!("Pillar {id}"), Recurrence::Weekly { times: 3 })
            .with_duration(30, 60)
            .with_windows(vec![ClockTime::new(7, 0)]);
        p.last_satisfied_at = last_days_ago.map(|d| at(12, 0) - Duration::days(d));
        p
    }

    fn make_state() -> EngineState {
        EngineState {
            pillars: vec![make_pillar("health", Some(5))],
            ..EngineState::default()
        }
    }

    #[test]
    fn apply_upserts_blocks_by_id() {
        let mut state = EngineState::default();
        let mut block = TimeBlock::new("Standup", at(9, 0), 30);
        block.id = "b1".into();
        state.apply(MutationEvent::BlockAdded {
            block: block.clone(),
            at: at(8, 0),
        });
        assert_eq!(state.blocks.len(), 1);

        block.duration_minutes = 45;
        state.apply(MutationEvent::BlockAdded {
            block,
            at: at(8, 1),
        });
        assert_eq!(state.blocks.len(), 1);
        assert_eq!(state.blocks[0].duration_minutes, 45);

        state.apply(MutationEvent::BlockRemoved {
            block_id: "b1".into(),
            at: at(8, 2),
        });
        assert!(state.blocks.is_empty());
        // Removing again is a no-op, not an error.
        state.apply(MutationEvent::BlockRemoved {
            block_id: "b1".into(),
            at: at(8, 3),
        });
    }

    #[test]
    fn apply_satisfy_updates_the_pillar_clock() {
        let mut state = make_state();
        state.apply(MutationEvent::PillarSatisfied {
            pillar_id: "health".into(),
            at: at(10, 0),
        });
        assert_eq!(state.pillars[0].last_satisfied_at, Some(at(10, 0)));
        // Unknown pillar id is tolerated.
        state.apply(MutationEvent::PillarSatisfied {
            pillar_id: "ghost".into(),
            at: at(10, 1),
        });
    }

    #[test]
    fn apply_appends_feedback_and_replaces_batches() {
        let mut state = EngineState::default();
        let entry = FeedbackEntry::new(
            FeedbackTarget::Pillar("health".into()),
            FeedbackSignal::Positive,
            at(9, 0),
        );
        state.apply(MutationEvent::FeedbackRecorded {
            entry: entry.clone(),
            at: at(9, 0),
        });
        state.apply(MutationEvent::FeedbackRecorded {
            entry,
            at: at(9, 5),
        });
        assert_eq!(state.feedback.len(), 2);

        state.apply(MutationEvent::SuggestionsReplaced {
            suggestions: vec![Suggestion::new("s1", "Read", 0.4)],
            at: at(9, 10),
        });
        assert_eq!(state.suggestions.len(), 1);
        state.apply(MutationEvent::SuggestionsReplaced {
            suggestions: Vec::new(),
            at: at(9, 11),
        });
        assert!(state.suggestions.is_empty());
    }

    #[test]
    fn recompute_plans_overdue_pillars_end_to_end() {
        let mut engine = PlannerEngine::new(EngineConfig::default());
        let state = make_state();

        let result = engine.recompute(&state, at(6, 0));
        assert_eq!(result.revision, 1);
        assert_eq!(result.candidates.len(), 1);
        assert_eq!(result.candidates[0].start_time, at(7, 0));
        assert_eq!(result.pillar_status.len(), 1);
        assert!(result.pillar_status[0].overdue);

        // The candidate was scored as a suggestion too.
        assert_eq!(result.suggestions.len(), 1);
        let top = &result.suggestions[0];
        assert_eq!(top.suggestion.pillar_id.as_deref(), Some("health"));
        assert!(top.suggestion.explanation.as_deref().unwrap().contains("overdue"));
        assert_eq!(top.suggestion.suggested_time, Some(at(7, 0)));
    }

    #[test]
    fn revision_increases_with_every_pass() {
        let mut engine = PlannerEngine::new(EngineConfig::default());
        let state = make_state();
        assert_eq!(engine.recompute(&state, at(6, 0)).revision, 1);
        assert_eq!(engine.recompute(&state, at(6, 1)).revision, 2);
        assert_eq!(engine.recompute(&state, at(6, 2)).revision, 3);
    }

    #[test]
    fn empty_state_yields_an_empty_plan_not_an_error() {
        let mut engine = PlannerEngine::new(EngineConfig::default());
        let result = engine.recompute(&EngineState::default(), at(6, 0));
        assert!(result.suggestions.is_empty());
        assert!(result.candidates.is_empty());
        assert!(result.pillar_status.is_empty());
        assert_eq!(result.revision, 1);
    }

    #[test]
    fn never_satisfied_candidate_carries_near_certain_confidence() {
        let mut engine = PlannerEngine::new(EngineConfig::default());
        let state = EngineState {
            pillars: vec![make_pillar("new", None)],
            ..EngineState::default()
        };
        let result = engine.recompute(&state, at(6, 0));
        let top = &result.suggestions[0];
        assert!(top.components.base > 0.99);
        assert!(top
            .suggestion
            .explanation
            .as_deref()
            .unwrap()
            .contains("never been done"));
    }

    #[test]
    fn external_suggestions_are_scored_alongside_candidates() {
        let mut engine = PlannerEngine::new(EngineConfig::default());
        let mut state = make_state();
        state.goals = vec![Goal::new("g1", "Ship it").pinned()];
        state.suggestions = vec![Suggestion::new("ext", "Review draft", 0.9).with_goal("g1")];

        let result = engine.recompute(&state, at(6, 0));
        assert_eq!(result.suggestions.len(), 2);
        // base 0.9 + pin 0.25 beats the derived candidate.
        assert_eq!(result.suggestions[0].suggestion.id, "ext");
        assert!((result.suggestions[0].score - 1.15).abs() < 1e-9);
    }

    #[test]
    fn snapshots_accumulate_across_passes() {
        let mut engine = PlannerEngine::new(EngineConfig::default());
        let state = make_state();
        engine.recompute(&state, at(6, 0));
        engine.recompute(&state, at(6, 1));
        // One scored suggestion per pass.
        assert_eq!(engine.snapshots().len(), 2);
    }
}
