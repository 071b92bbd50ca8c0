//! Committed time block commands for CLI.

use chrono::Utc;
use clap::Subcommand;

use pillarplan_core::{ClockTime, Energy, TimeBlock};

use crate::store;

#[derive(Subcommand)]
pub enum BlockAction {
    /// Commit a block on today's timeline
    Add {
        /// Block title
        title: String,
        /// Start time today, UTC (HH:mm)
        start: String,
        /// Duration in minutes
        #[arg(long, default_value = "30")]
        minutes: u32,
        /// Energy level: low, medium or high
        #[arg(long, default_value = "medium")]
        energy: String,
        /// Pillar this block satisfies
        #[arg(long)]
        pillar_id: Option<String>,
        /// Emoji label
        #[arg(long)]
        emoji: Option<String>,
    },
    /// List committed blocks
    List,
    /// Remove a block
    Remove {
        /// Block ID
        id: String,
    },
}

pub fn run(action: BlockAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        BlockAction::Add {
            title,
            start,
            minutes,
            energy,
            pillar_id,
            emoji,
        } => {
            let mut state = store::load()?;
            let start_time = ClockTime::parse(&start)?.on_day(Utc::now().date_naive());
            let mut block =
                TimeBlock::new(title, start_time, minutes).with_energy(parse_energy(&energy)?);
            if let Some(p) = pillar_id {
                block = block.with_pillar(p);
            }
            block.emoji = emoji;
            state.blocks.push(block.clone());
            store::save(&state)?;
            println!("Block created: {}", block.id);
            println!("{}", serde_json::to_string_pretty(&block)?);
        }
        BlockAction::List => {
            let state = store::load()?;
            println!("{}", serde_json::to_string_pretty(&state.blocks)?);
        }
        BlockAction::Remove { id } => {
            let mut state = store::load()?;
            let before = state.blocks.len();
            state.blocks.retain(|b| b.id != id);
            if state.blocks.len() == before {
                return Err(format!("Block not found: {id}").into());
            }
            store::save(&state)?;
            println!("Block removed: {id}");
        }
    }
    Ok(())
}

fn parse_energy(s: &str) -> Result<Energy, Box<dyn std::error::Error>> {
    match s {
        "low" => Ok(Energy::Low),
        "medium" => Ok(Energy::Medium),
        "high" => Ok(Energy::High),
        other => Err(format!("unknown energy level: {other}").into()),
    }
}
