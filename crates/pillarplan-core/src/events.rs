//! Mutation events: the single write path into the planner.
//!
//! Collaborators never touch engine state directly; they describe the
//! change as an event and the service applies it and wakes the debounce
//! machinery. Events carry the new data, so replaying a log of them
//! rebuilds the state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::block::TimeBlock;
use crate::pillar::Pillar;
use crate::suggestion::{FeedbackEntry, Goal, Suggestion, SuggestionWeighting};

/// A change to the planner's inputs. Every variant is timestamped.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum MutationEvent {
    BlockAdded {
        block: TimeBlock,
        at: DateTime<Utc>,
    },
    BlockRemoved {
        block_id: String,
        at: DateTime<Utc>,
    },
    /// Full pillar snapshot replacement (edits arrive wholesale).
    PillarsReplaced {
        pillars: Vec<Pillar>,
        at: DateTime<Utc>,
    },
    /// The user did the thing; resets the pillar's overdue clock.
    PillarSatisfied {
        pillar_id: String,
        at: DateTime<Utc>,
    },
    GoalsReplaced {
        goals: Vec<Goal>,
        at: DateTime<Utc>,
    },
    WeightingChanged {
        weighting: SuggestionWeighting,
        at: DateTime<Utc>,
    },
    FeedbackRecorded {
        entry: FeedbackEntry,
        at: DateTime<Utc>,
    },
    /// New batch from the external suggestion source.
    SuggestionsReplaced {
        suggestions: Vec<Suggestion>,
        at: DateTime<Utc>,
    },
}

impl MutationEvent {
    /// When the mutation happened.
    pub fn at(&self) -> DateTime<Utc> {
        match self {
            MutationEvent::BlockAdded { at, .. }
            | MutationEvent::BlockRemoved { at, .. }
            | MutationEvent::PillarsReplaced { at, .. }
            | MutationEvent::PillarSatisfied { at, .. }
            | MutationEvent::GoalsReplaced { at, .. }
            | MutationEvent::WeightingChanged { at, .. }
            | MutationEvent::FeedbackRecorded { at, .. }
            | MutationEvent::SuggestionsReplaced { at, .. } => *at,
        }
    }

    /// Short label for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            MutationEvent::BlockAdded { .. } => "block_added",
            MutationEvent::BlockRemoved { .. } => "block_removed",
            MutationEvent::PillarsReplaced { .. } => "pillars_replaced",
            MutationEvent::PillarSatisfied { .. } => "pillar_satisfied",
            MutationEvent::GoalsReplaced { .. } => "goals_replaced",
            MutationEvent::WeightingChanged { .. } => "weighting_changed",
            MutationEvent::FeedbackRecorded { .. } => "feedback_recorded",
            MutationEvent::SuggestionsReplaced { .. } => "suggestions_replaced",
        }
    }
}
