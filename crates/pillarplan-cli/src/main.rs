use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod store;

#[derive(Parser)]
#[command(name = "pillarplan-cli", version, about = "Pillarplan CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Pillar management
    Pillar {
        #[command(subcommand)]
        action: commands::pillar::PillarAction,
    },
    /// Committed time blocks on today's timeline
    Block {
        #[command(subcommand)]
        action: commands::block::BlockAction,
    },
    /// Goal management
    Goal {
        #[command(subcommand)]
        action: commands::goal::GoalAction,
    },
    /// Feedback log
    Feedback {
        #[command(subcommand)]
        action: commands::feedback::FeedbackAction,
    },
    /// Suggestion boost magnitudes
    Weighting {
        #[command(subcommand)]
        action: commands::weighting::WeightingAction,
    },
    /// Run a planning pass
    Plan {
        #[command(subcommand)]
        action: commands::plan::PlanAction,
    },
    /// Dump the scoring snapshot history
    Diagnostics,
    /// Engine configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Pillar { action } => commands::pillar::run(action),
        Commands::Block { action } => commands::block::run(action),
        Commands::Goal { action } => commands::goal::run(action),
        Commands::Feedback { action } => commands::feedback::run(action),
        Commands::Weighting { action } => commands::weighting::run(action),
        Commands::Plan { action } => commands::plan::run(action),
        Commands::Diagnostics => commands::diagnostics::run(),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
