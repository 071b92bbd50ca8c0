//! Feedback log commands for CLI.

use chrono::Utc;
use clap::Subcommand;

use pillarplan_core::{FeedbackEntry, FeedbackSignal, FeedbackTarget};

use crate::store;

#[derive(Subcommand)]
pub enum FeedbackAction {
    /// Record a feedback entry
    Record {
        /// Target kind: block, suggestion or pillar
        kind: String,
        /// Target ID
        id: String,
        /// Signal: positive or negative
        #[arg(long, default_value = "positive")]
        signal: String,
        /// Comma-separated tags
        #[arg(long)]
        tags: Option<String>,
        /// Free-text note
        #[arg(long)]
        note: Option<String>,
    },
    /// List recorded feedback, oldest first
    List,
}

pub fn run(action: FeedbackAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        FeedbackAction::Record {
            kind,
            id,
            signal,
            tags,
            note,
        } => {
            let target = match kind.as_str() {
                "block" => FeedbackTarget::Block(id),
                "suggestion" => FeedbackTarget::Suggestion(id),
                "pillar" => FeedbackTarget::Pillar(id),
                other => return Err(format!("unknown target kind: {other}").into()),
            };
            let signal = match signal.as_str() {
                "positive" | "up" => FeedbackSignal::Positive,
                "negative" | "down" => FeedbackSignal::Negative,
                other => return Err(format!("unknown signal: {other}").into()),
            };
            let mut state = store::load()?;
            let mut entry = FeedbackEntry::new(target, signal, Utc::now());
            if let Some(t) = tags {
                entry = entry.with_tags(t.split(',').map(|s| s.trim().to_string()).collect());
            }
            entry.note = note;
            state.feedback.push(entry.clone());
            store::save(&state)?;
            println!("Feedback recorded");
            println!("{}", serde_json::to_string_pretty(&entry)?);
        }
        FeedbackAction::List => {
            let state = store::load()?;
            println!("{}", serde_json::to_string_pretty(&state.feedback)?);
        }
    }
    Ok(())
}
