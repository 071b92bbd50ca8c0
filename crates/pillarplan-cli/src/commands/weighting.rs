//! Suggestion weighting commands for CLI.

use clap::Subcommand;

use crate::store;

#[derive(Subcommand)]
pub enum WeightingAction {
    /// Show current boost magnitudes
    Show,
    /// Update boost magnitudes
    Set {
        /// Pinned-goal boost
        #[arg(long)]
        pin: Option<f64>,
        /// Emphasized-pillar boost
        #[arg(long)]
        pillar: Option<f64>,
        /// Feedback boost cap
        #[arg(long)]
        feedback: Option<f64>,
    },
}

pub fn run(action: WeightingAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        WeightingAction::Show => {
            let state = store::load()?;
            println!("{}", serde_json::to_string_pretty(&state.weighting)?);
        }
        WeightingAction::Set {
            pin,
            pillar,
            feedback,
        } => {
            let mut state = store::load()?;
            if let Some(v) = pin {
                state.weighting.pin_boost = v;
            }
            if let Some(v) = pillar {
                state.weighting.pillar_boost = v;
            }
            if let Some(v) = feedback {
                state.weighting.feedback_boost = v;
            }
            store::save(&state)?;
            println!("{}", serde_json::to_string_pretty(&state.weighting)?);
        }
    }
    Ok(())
}
