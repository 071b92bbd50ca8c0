//! # Pillarplan Core Library
//!
//! Core scheduling and recommendation engine for Pillarplan, a personal
//! day-planning application built around "pillars": recurring
//! commitments like exercise, deep work, or reading that the planner
//! keeps alive by finding room for them in the day.
//!
//! ## Architecture
//!
//! - **Recurrence Evaluator**: decides which pillars are overdue, on
//!   whole-calendar-day granularity
//! - **Day Index + Slot Search**: half-open interval index over today's
//!   blocks, with preferred-window-first greedy placement
//! - **Candidate Generator**: overdue pillars become concrete candidate
//!   blocks, deterministically
//! - **Suggestion Scorer**: additive explainable scoring
//!   (`base + pin + pillar + feedback`) with a bounded snapshot ring
//! - **Recompute Controller**: a wall-clock debounce/coalesce state
//!   machine the caller polls — no internal threads
//! - **Planner Service**: the tokio task that owns the state, applies
//!   mutation events, and publishes [`PlanResult`] snapshots
//!
//! The library is persistence-free and network-free: collaborators hand
//! it data and subscribe to results.
//!
//! ## Key Components
//!
//! - [`PlannerEngine`]: one synchronous pass from inputs to plan
//! - [`PlannerService`]: async wrapper with debounced recomputation
//! - [`EngineConfig`]: TOML-backed tuning knobs
//! - [`MutationEvent`]: the single write path into the service

pub mod block;
pub mod candidates;
pub mod config;
pub mod day;
pub mod engine;
pub mod error;
pub mod events;
pub mod pillar;
pub mod recurrence;
pub mod scoring;
pub mod slots;
pub mod suggestion;

pub use block::{Energy, TimeBlock};
pub use candidates::CandidateGenerator;
pub use config::EngineConfig;
pub use day::DayIndex;
pub use engine::{
    EngineState, PlanResult, PlannerEngine, PlannerHandle, PlannerService, RecomputeController,
    RecomputeState,
};
pub use error::{ConfigError, CoreError, Result, ServiceError, ValidationError};
pub use events::MutationEvent;
pub use pillar::{ClockTime, Pillar, QuietWindow, Recurrence};
pub use recurrence::{PillarStatus, RecurrenceEvaluator, MAX_URGENCY};
pub use scoring::{
    RankedSuggestion, ScoreComponents, ScoreContext, SnapshotHistory, SuggestionScorer,
    SuggestionSnapshot,
};
pub use slots::{PlannedSlot, SlotFinder};
pub use suggestion::{
    FeedbackEntry, FeedbackSignal, FeedbackTarget, Goal, Suggestion, SuggestionWeighting,
};
