//! Pillar management commands for CLI.

use chrono::Utc;
use clap::Subcommand;
use uuid::Uuid;

use pillarplan_core::{ClockTime, Pillar, QuietWindow, Recurrence};

use crate::store;

#[derive(Subcommand)]
pub enum PillarAction {
    /// Create a new pillar
    Add {
        /// Pillar name
        name: String,
        /// Stable id (default: random)
        #[arg(long)]
        id: Option<String>,
        /// Recurrence: daily, weekly:N, monthly:N or as-needed
        #[arg(long, default_value = "daily")]
        recurrence: String,
        /// Minimum session length in minutes
        #[arg(long, default_value = "25")]
        min_minutes: u32,
        /// Maximum session length in minutes
        #[arg(long, default_value = "50")]
        max_minutes: u32,
        /// Comma-separated preferred start times, UTC (HH:mm)
        #[arg(long)]
        windows: Option<String>,
        /// Comma-separated quiet windows, UTC (HH:mm-HH:mm)
        #[arg(long)]
        quiet: Option<String>,
        /// Exclude from candidate generation
        #[arg(long)]
        not_actionable: bool,
        /// Emoji label
        #[arg(long)]
        emoji: Option<String>,
        /// Display color
        #[arg(long)]
        color: Option<String>,
    },
    /// List pillars
    List,
    /// Toggle the emphasized flag
    Emphasize {
        /// Pillar ID
        id: String,
        /// Turn emphasis off instead of on
        #[arg(long)]
        off: bool,
    },
    /// Mark a pillar satisfied now
    Satisfy {
        /// Pillar ID
        id: String,
    },
    /// Replace a pillar's quiet windows
    Quiet {
        /// Pillar ID
        id: String,
        /// Comma-separated quiet windows, UTC (HH:mm-HH:mm); omit to clear
        windows: Option<String>,
    },
}

pub fn run(action: PillarAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        PillarAction::Add {
            name,
            id,
            recurrence,
            min_minutes,
            max_minutes,
            windows,
            quiet,
            not_actionable,
            emoji,
            color,
        } => {
            let mut state = store::load()?;
            let id = id.unwrap_or_else(|| Uuid::new_v4().to_string());
            let mut pillar = Pillar::new(id, name, parse_recurrence(&recurrence)?)
                .with_duration(min_minutes, max_minutes);
            if let Some(w) = windows {
                pillar = pillar.with_windows(parse_windows(&w)?);
            }
            if let Some(q) = quiet {
                pillar = pillar.with_quiet(parse_quiet(&q)?);
            }
            pillar.actionable = !not_actionable;
            pillar.emoji = emoji;
            pillar.color = color;
            state.pillars.push(pillar.clone());
            store::save(&state)?;
            println!("Pillar created: {}", pillar.id);
            println!("{}", serde_json::to_string_pretty(&pillar)?);
        }
        PillarAction::List => {
            let state = store::load()?;
            println!("{}", serde_json::to_string_pretty(&state.pillars)?);
        }
        PillarAction::Emphasize { id, off } => {
            let mut state = store::load()?;
            let pillar = state
                .pillars
                .iter_mut()
                .find(|p| p.id == id)
                .ok_or(format!("Pillar not found: {id}"))?;
            pillar.emphasized = !off;
            store::save(&state)?;
            println!("Pillar {id}: emphasized = {}", !off);
        }
        PillarAction::Satisfy { id } => {
            let mut state = store::load()?;
            let pillar = state
                .pillars
                .iter_mut()
                .find(|p| p.id == id)
                .ok_or(format!("Pillar not found: {id}"))?;
            pillar.satisfy(Utc::now());
            store::save(&state)?;
            println!("Pillar satisfied: {id}");
        }
        PillarAction::Quiet { id, windows } => {
            let mut state = store::load()?;
            let pillar = state
                .pillars
                .iter_mut()
                .find(|p| p.id == id)
                .ok_or(format!("Pillar not found: {id}"))?;
            pillar.quiet_windows = match windows {
                Some(w) => parse_quiet(&w)?,
                None => Vec::new(),
            };
            let count = pillar.quiet_windows.len();
            store::save(&state)?;
            println!("Pillar {id}: {count} quiet window(s)");
        }
    }
    Ok(())
}

fn parse_recurrence(s: &str) -> Result<Recurrence, Box<dyn std::error::Error>> {
    let (kind, count) = match s.split_once(':') {
        Some((k, n)) => (k, Some(n.parse::<i32>()?)),
        None => (s, None),
    };
    match kind {
        "daily" => Ok(Recurrence::Daily),
        "weekly" => Ok(Recurrence::Weekly {
            times: count.unwrap_or(1),
        }),
        "monthly" => Ok(Recurrence::Monthly {
            times: count.unwrap_or(1),
        }),
        "as-needed" | "asneeded" => Ok(Recurrence::AsNeeded),
        other => Err(format!("unknown recurrence: {other}").into()),
    }
}

fn parse_windows(s: &str) -> Result<Vec<ClockTime>, Box<dyn std::error::Error>> {
    s.split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(|p| Ok(ClockTime::parse(p)?))
        .collect()
}

fn parse_quiet(s: &str) -> Result<Vec<QuietWindow>, Box<dyn std::error::Error>> {
    s.split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(|p| {
            let (start, end) = p
                .split_once('-')
                .ok_or(format!("expected HH:mm-HH:mm, got: {p}"))?;
            Ok(QuietWindow::new(
                ClockTime::parse(start.trim())?,
                ClockTime::parse(end.trim())?,
            ))
        })
        .collect()
}
