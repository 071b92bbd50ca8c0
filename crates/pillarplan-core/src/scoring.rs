//! Additive, explainable suggestion scoring.
//!
//! Every suggestion gets `score = base + pin + pillar + feedback`, where
//! each term is visible in the published breakdown: the user can always
//! see *why* something ranked where it did. The score is deliberately not
//! clamped back into [0, 1] — boosts are meant to push linked work above
//! unaffiliated work — while the displayed confidence stays the raw base,
//! so boosts never masquerade as model certainty.
//!
//! Each scoring call freezes one [`SuggestionSnapshot`] into a bounded
//! ring buffer for diagnostics.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::pillar::Pillar;
use crate::suggestion::{
    FeedbackEntry, FeedbackSignal, FeedbackTarget, Goal, Suggestion, SuggestionWeighting,
};

/// Default smoothing step for the adaptive feedback term.
pub const DEFAULT_FEEDBACK_STEP: f64 = 0.5;

/// Default snapshot ring capacity.
pub const DEFAULT_HISTORY_CAPACITY: usize = 100;

/// Per-term breakdown of one score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreComponents {
    /// Source confidence clamped to [0, 1]
    pub base: f64,
    /// Pinned-goal boost (0 when unlinked, dangling, or unpinned)
    pub pin_boost: f64,
    /// Emphasized-pillar boost (0 when unlinked, dangling, or plain)
    pub pillar_boost: f64,
    /// Adaptive feedback boost in [0, weighting.feedback_boost]
    pub feedback_boost: f64,
}

impl ScoreComponents {
    pub fn total(&self) -> f64 {
        self.base + self.pin_boost + self.pillar_boost + self.feedback_boost
    }

    /// Named terms for display, in additive order.
    pub fn terms(&self) -> [(&'static str, f64); 4] {
        [
            ("base", self.base),
            ("pin", self.pin_boost),
            ("pillar", self.pillar_boost),
            ("feedback", self.feedback_boost),
        ]
    }
}

/// Frozen record of one scoring call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestionSnapshot {
    pub suggestion_id: String,
    pub title: String,
    /// Final additive score
    pub score: f64,
    /// Displayed confidence (the base term, never boosted)
    pub confidence: f64,
    pub components: ScoreComponents,
    /// Title of the linked goal, when the reference resolved
    pub goal_title: Option<String>,
    /// Title of the linked pillar, when the reference resolved
    pub pillar_title: Option<String>,
    pub explanation: Option<String>,
    pub scored_at: DateTime<Utc>,
}

/// Bounded ring of recent snapshots, oldest evicted first.
#[derive(Debug, Clone)]
pub struct SnapshotHistory {
    entries: VecDeque<SuggestionSnapshot>,
    capacity: usize,
}

impl SnapshotHistory {
    pub fn new(capacity: usize) -> Self {
        SnapshotHistory {
            entries: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    pub fn push(&mut self, snapshot: SuggestionSnapshot) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(snapshot);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &SuggestionSnapshot> {
        self.entries.iter()
    }
}

/// Borrowed inputs for one scoring pass. The weighting is clamped at
/// construction, so scorers never see out-of-range boost magnitudes.
#[derive(Debug, Clone)]
pub struct ScoreContext<'a> {
    pub goals: &'a [Goal],
    pub pillars: &'a [Pillar],
    pub feedback: &'a [FeedbackEntry],
    pub weighting: SuggestionWeighting,
}

impl<'a> ScoreContext<'a> {
    pub fn new(
        goals: &'a [Goal],
        pillars: &'a [Pillar],
        feedback: &'a [FeedbackEntry],
        weighting: SuggestionWeighting,
        weight_cap: f64,
    ) -> Self {
        ScoreContext {
            goals,
            pillars,
            feedback,
            weighting: weighting.clamped(weight_cap),
        }
    }

    fn resolve_goal(&self, suggestion: &Suggestion) -> Option<&'a Goal> {
        let id = suggestion.goal_id.as_deref()?;
        self.goals.iter().find(|g| g.id == id)
    }

    fn resolve_pillar(&self, suggestion: &Suggestion) -> Option<&'a Pillar> {
        let id = suggestion.pillar_id.as_deref()?;
        self.pillars.iter().find(|p| p.id == id)
    }
}

/// A suggestion with its score attached, ready for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedSuggestion {
    pub suggestion: Suggestion,
    pub score: f64,
    pub components: ScoreComponents,
}

/// Stateful scorer: pure arithmetic plus the snapshot ring.
#[derive(Debug, Clone)]
pub struct SuggestionScorer {
    feedback_step: f64,
    history: SnapshotHistory,
}

impl Default for SuggestionScorer {
    fn default() -> Self {
        SuggestionScorer {
            feedback_step: DEFAULT_FEEDBACK_STEP,
            history: SnapshotHistory::new(DEFAULT_HISTORY_CAPACITY),
        }
    }
}

impl SuggestionScorer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        SuggestionScorer {
            feedback_step: DEFAULT_FEEDBACK_STEP,
            history: SnapshotHistory::new(capacity),
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        let step = if config.feedback_step.is_finite() {
            config.feedback_step.clamp(0.0, 1.0)
        } else {
            DEFAULT_FEEDBACK_STEP
        };
        SuggestionScorer {
            feedback_step: step,
            history: SnapshotHistory::new(config.history_capacity),
        }
    }

    pub fn history(&self) -> &SnapshotHistory {
        &self.history
    }

    /// Score one suggestion, appending exactly one snapshot.
    pub fn score(
        &mut self,
        suggestion: &Suggestion,
        ctx: &ScoreContext<'_>,
        now: DateTime<Utc>,
    ) -> ScoreComponents {
        let base = if suggestion.confidence.is_finite() {
            suggestion.confidence.clamp(0.0, 1.0)
        } else {
            0.0
        };

        let goal = ctx.resolve_goal(suggestion);
        let pin_boost = match goal {
            Some(g) if g.pinned => ctx.weighting.pin_boost,
            _ => 0.0,
        };

        let pillar = ctx.resolve_pillar(suggestion);
        let pillar_boost = match pillar {
            Some(p) if p.emphasized => ctx.weighting.pillar_boost,
            _ => 0.0,
        };

        let feedback_boost = self.feedback_boost(suggestion, ctx);

        let components = ScoreComponents {
            base,
            pin_boost,
            pillar_boost,
            feedback_boost,
        };
        self.history.push(SuggestionSnapshot {
            suggestion_id: suggestion.id.clone(),
            title: suggestion.title.clone(),
            score: components.total(),
            confidence: base,
            components,
            goal_title: goal.map(|g| g.title.clone()),
            pillar_title: pillar.map(|p| p.name.clone()),
            explanation: suggestion.explanation.clone(),
            scored_at: now,
        });
        components
    }

    /// Score and sort a batch. The order is total: score desc, then
    /// confidence desc, then earliest suggested time (timeless last),
    /// then id.
    pub fn rank(
        &mut self,
        suggestions: Vec<Suggestion>,
        ctx: &ScoreContext<'_>,
        now: DateTime<Utc>,
    ) -> Vec<RankedSuggestion> {
        let mut ranked: Vec<RankedSuggestion> = suggestions
            .into_iter()
            .map(|suggestion| {
                let components = self.score(&suggestion, ctx, now);
                RankedSuggestion {
                    score: components.total(),
                    components,
                    suggestion,
                }
            })
            .collect();
        ranked.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then_with(|| b.components.base.total_cmp(&a.components.base))
                .then_with(|| cmp_suggested_time(&a.suggestion, &b.suggestion))
                .then_with(|| a.suggestion.id.cmp(&b.suggestion.id))
        });
        ranked
    }

    /// Adaptive feedback term: walk matching entries oldest-first,
    /// nudging toward the cap on positive signals and back toward zero
    /// on negative ones.
    fn feedback_boost(&self, suggestion: &Suggestion, ctx: &ScoreContext<'_>) -> f64 {
        let cap = ctx.weighting.feedback_boost;
        if cap <= 0.0 {
            return 0.0;
        }
        let mut matching: Vec<&FeedbackEntry> = ctx
            .feedback
            .iter()
            .filter(|entry| feedback_matches(suggestion, entry))
            .collect();
        matching.sort_by_key(|entry| entry.recorded_at);

        let mut boost = 0.0_f64;
        for entry in matching {
            match entry.signal {
                FeedbackSignal::Positive => boost += (cap - boost) * self.feedback_step,
                FeedbackSignal::Negative => boost -= boost * self.feedback_step,
            }
        }
        boost.clamp(0.0, cap)
    }
}

/// Whether a feedback entry speaks about this suggestion: a direct
/// pillar/suggestion target, or a shared tag.
fn feedback_matches(suggestion: &Suggestion, entry: &FeedbackEntry) -> bool {
    let direct = match &entry.target {
        FeedbackTarget::Pillar(id) => suggestion.pillar_id.as_deref() == Some(id.as_str()),
        FeedbackTarget::Suggestion(id) => suggestion.id == *id,
        FeedbackTarget::Block(_) => false,
    };
    direct
        || (!entry.tags.is_empty()
            && entry.tags.iter().any(|tag| suggestion.tags.contains(tag)))
}

fn cmp_suggested_time(a: &Suggestion, b: &Suggestion) -> std::cmp::Ordering {
    use std::cmp::Ordering;
    match (a.suggested_time, b.suggested_time) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
