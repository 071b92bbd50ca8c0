//! Planning passes over the day-store.

use chrono::Utc;
use clap::Subcommand;

use pillarplan_core::{EngineConfig, PlannerEngine};

use crate::store;

#[derive(Subcommand)]
pub enum PlanAction {
    /// Rank suggestions for right now
    Suggest {
        /// Emit raw JSON instead of lines
        #[arg(long)]
        json: bool,
        /// Include rationale and score breakdowns
        #[arg(long)]
        explain: bool,
    },
    /// Show generated pillar candidates
    Candidates {
        /// Emit raw JSON instead of lines
        #[arg(long)]
        json: bool,
    },
    /// Show per-pillar overdue badges
    Status,
}

pub fn run(action: PlanAction) -> Result<(), Box<dyn std::error::Error>> {
    let state = store::load()?;
    let mut engine = PlannerEngine::new(EngineConfig::load_or_default());
    let plan = engine.recompute(&state, Utc::now());

    match action {
        PlanAction::Suggest { json, explain } => {
            if json {
                println!("{}", serde_json::to_string_pretty(&plan.suggestions)?);
            } else if plan.suggestions.is_empty() {
                println!("no suggestions for now");
            } else {
                for ranked in &plan.suggestions {
                    let time = ranked
                        .suggestion
                        .suggested_time
                        .map(|t| t.format("%H:%M").to_string())
                        .unwrap_or_else(|| "--:--".to_string());
                    println!(
                        "{:.2}  {}  {} ({} min)",
                        ranked.score,
                        time,
                        ranked.suggestion.title,
                        ranked.suggestion.duration_minutes
                    );
                    if explain {
                        if let Some(why) = &ranked.suggestion.explanation {
                            println!("      {why}");
                        }
                        let c = &ranked.components;
                        println!(
                            "      base {:.2} + pin {:.2} + pillar {:.2} + feedback {:.2}",
                            c.base, c.pin_boost, c.pillar_boost, c.feedback_boost
                        );
                    }
                }
            }
        }
        PlanAction::Candidates { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(&plan.candidates)?);
            } else if plan.candidates.is_empty() {
                println!("no candidates: nothing overdue or no free slot");
            } else {
                for block in &plan.candidates {
                    println!(
                        "{}  {} ({} min)",
                        block.start_time.format("%H:%M"),
                        block.title,
                        block.duration_minutes
                    );
                }
            }
        }
        PlanAction::Status => {
            for status in &plan.pillar_status {
                let badge = if status.overdue { "OVERDUE" } else { "ok" };
                let last = match status.elapsed_days {
                    Some(d) => format!("{d} day(s) ago"),
                    None => "never".to_string(),
                };
                println!(
                    "{:<8} {}  last done {} (aims for every {:.1} days)",
                    badge, status.name, last, status.expected_interval_days
                );
            }
        }
    }
    Ok(())
}
