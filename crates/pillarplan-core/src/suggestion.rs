//! Suggestions, goals, weighting preferences, and the feedback log.
//!
//! Suggestions come from two places: an external collaborator (an AI
//! layer, a rules layer — the engine does not care) and the engine's own
//! candidate generator. Both are scored identically. `goal_id` and
//! `pillar_id` are weak references: they may dangle, and a dangling
//! reference simply contributes no boost.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::block::Energy;

/// A user goal suggestions can attach to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Goal {
    /// Unique identifier
    pub id: String,
    /// Display title
    pub title: String,
    /// Pinned goals grant the pin boost to linked suggestions
    #[serde(default)]
    pub pinned: bool,
}

impl Goal {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Goal {
            id: id.into(),
            title: title.into(),
            pinned: false,
        }
    }

    pub fn pinned(mut self) -> Self {
        self.pinned = true;
        self
    }
}

/// A proposed activity, not yet committed to the calendar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    /// Unique identifier
    pub id: String,
    /// Display title
    pub title: String,
    /// Human-readable rationale shown alongside the suggestion
    pub explanation: Option<String>,
    /// Source confidence in [0, 1]; clamped at scoring time
    pub confidence: f64,
    /// Proposed duration in minutes
    pub duration_minutes: u32,
    /// Proposed start, when the source has an opinion
    pub suggested_time: Option<DateTime<Utc>>,
    /// Energy demand
    #[serde(default)]
    pub energy: Energy,
    /// Display emoji
    pub emoji: Option<String>,
    /// Topic tags, matched against feedback entries
    #[serde(default)]
    pub tags: Vec<String>,
    /// Weak reference to a goal
    pub goal_id: Option<String>,
    /// Weak reference to a pillar
    pub pillar_id: Option<String>,
}

impl Suggestion {
    pub fn new(id: impl Into<String>, title: impl Into<String>, confidence: f64) -> Self {
        Suggestion {
            id: id.into(),
            title: title.into(),
            explanation: None,
            confidence,
            duration_minutes: 25,
            suggested_time: None,
            energy: Energy::Medium,
            emoji: None,
            tags: Vec::new(),
            goal_id: None,
            pillar_id: None,
        }
    }

    pub fn with_goal(mut self, goal_id: impl Into<String>) -> Self {
        self.goal_id = Some(goal_id.into());
        self
    }

    pub fn with_pillar(mut self, pillar_id: impl Into<String>) -> Self {
        self.pillar_id = Some(pillar_id.into());
        self
    }

    pub fn with_time(mut self, at: DateTime<Utc>) -> Self {
        self.suggested_time = Some(at);
        self
    }

    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }
}

/// User-tunable boost magnitudes for the additive scoring model.
///
/// Raw values are whatever the user stored; [`SuggestionWeighting::clamped`]
/// is applied wherever the scorer reads them, so out-of-range preferences
/// degrade instead of erroring.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SuggestionWeighting {
    /// Added when the linked goal is pinned
    #[serde(default = "default_pin_boost")]
    pub pin_boost: f64,
    /// Added when the linked pillar is emphasized
    #[serde(default = "default_pillar_boost")]
    pub pillar_boost: f64,
    /// Ceiling for the adaptive feedback term
    #[serde(default = "default_feedback_boost")]
    pub feedback_boost: f64,
}

fn default_pin_boost() -> f64 {
    0.25
}

fn default_pillar_boost() -> f64 {
    0.15
}

fn default_feedback_boost() -> f64 {
    0.10
}

impl SuggestionWeighting {
    /// Copy with every term clamped to `[0, cap]`.
    pub fn clamped(&self, cap: f64) -> Self {
        let cap = if cap.is_finite() && cap > 0.0 { cap } else { 0.0 };
        SuggestionWeighting {
            pin_boost: clamp_unit(self.pin_boost, cap),
            pillar_boost: clamp_unit(self.pillar_boost, cap),
            feedback_boost: clamp_unit(self.feedback_boost, cap),
        }
    }
}

fn clamp_unit(value: f64, cap: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, cap)
    } else {
        0.0
    }
}

impl Default for SuggestionWeighting {
    fn default() -> Self {
        SuggestionWeighting {
            pin_boost: default_pin_boost(),
            pillar_boost: default_pillar_boost(),
            feedback_boost: default_feedback_boost(),
        }
    }
}

/// What a feedback entry talks about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum FeedbackTarget {
    Block(String),
    Suggestion(String),
    Pillar(String),
}

/// Direction of a feedback entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackSignal {
    Positive,
    Negative,
}

/// One recorded piece of user feedback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackEntry {
    /// When the feedback was given
    pub recorded_at: DateTime<Utc>,
    /// What it targets
    pub target: FeedbackTarget,
    /// Thumbs up or down
    pub signal: FeedbackSignal,
    /// Tag summary ("too-early", "wrong-energy", ...)
    #[serde(default)]
    pub tags: Vec<String>,
    /// Optional free text
    pub note: Option<String>,
}

impl FeedbackEntry {
    pub fn new(target: FeedbackTarget, signal: FeedbackSignal, recorded_at: DateTime<Utc>) -> Self {
        FeedbackEntry {
            recorded_at,
            target,
            signal,
            tags: Vec::new(),
            note: None,
        }
    }

    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }
}
