//! Engine configuration commands for CLI.

use clap::Subcommand;

use pillarplan_core::EngineConfig;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show the engine configuration
    Show,
    /// Reset configuration to defaults
    Reset,
}

pub fn run(action: ConfigAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ConfigAction::Show => {
            let config = EngineConfig::load_or_default();
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        ConfigAction::Reset => {
            let config = EngineConfig::default();
            config.save()?;
            println!("config reset to defaults");
        }
    }
    Ok(())
}
