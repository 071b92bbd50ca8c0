//! Goal management commands for CLI.

use clap::Subcommand;
use uuid::Uuid;

use pillarplan_core::Goal;

use crate::store;

#[derive(Subcommand)]
pub enum GoalAction {
    /// Create a new goal
    Add {
        /// Goal title
        title: String,
        /// Stable id (default: random)
        #[arg(long)]
        id: Option<String>,
        /// Pin the goal immediately
        #[arg(long)]
        pinned: bool,
    },
    /// List goals
    List,
    /// Pin a goal
    Pin {
        /// Goal ID
        id: String,
    },
    /// Unpin a goal
    Unpin {
        /// Goal ID
        id: String,
    },
}

pub fn run(action: GoalAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        GoalAction::Add { title, id, pinned } => {
            let mut state = store::load()?;
            let id = id.unwrap_or_else(|| Uuid::new_v4().to_string());
            let mut goal = Goal::new(id, title);
            if pinned {
                goal = goal.pinned();
            }
            state.goals.push(goal.clone());
            store::save(&state)?;
            println!("Goal created: {}", goal.id);
            println!("{}", serde_json::to_string_pretty(&goal)?);
        }
        GoalAction::List => {
            let state = store::load()?;
            println!("{}", serde_json::to_string_pretty(&state.goals)?);
        }
        GoalAction::Pin { id } => {
            set_pinned(&id, true)?;
            println!("Goal pinned: {id}");
        }
        GoalAction::Unpin { id } => {
            set_pinned(&id, false)?;
            println!("Goal unpinned: {id}");
        }
    }
    Ok(())
}

fn set_pinned(id: &str, pinned: bool) -> Result<(), Box<dyn std::error::Error>> {
    let mut state = store::load()?;
    let goal = state
        .goals
        .iter_mut()
        .find(|g| g.id == id)
        .ok_or(format!("Goal not found: {id}"))?;
    goal.pinned = pinned;
    store::save(&state)?;
    Ok(())
}
