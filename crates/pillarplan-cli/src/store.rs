//! JSON day-store for the CLI.
//!
//! The core library is persistence-free; the CLI keeps today's planning
//! state in a single JSON file under the platform data directory.

use std::path::PathBuf;

use pillarplan_core::EngineState;

/// Returns the CLI data directory, honoring `PILLARPLAN_DATA_DIR`.
///
/// # Errors
/// Returns an error if the directory cannot be created.
pub fn data_dir() -> Result<PathBuf, Box<dyn std::error::Error>> {
    let dir = match std::env::var("PILLARPLAN_DATA_DIR") {
        Ok(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("pillarplan"),
    };
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

fn store_path() -> Result<PathBuf, Box<dyn std::error::Error>> {
    Ok(data_dir()?.join("day.json"))
}

/// Loads the day-store; a missing file yields an empty state.
///
/// # Errors
/// Returns an error if an existing file cannot be read or parsed.
pub fn load() -> Result<EngineState, Box<dyn std::error::Error>> {
    let path = store_path()?;
    if !path.exists() {
        return Ok(EngineState::default());
    }
    let content = std::fs::read_to_string(&path)?;
    Ok(serde_json::from_str(&content)?)
}

/// Persists the day-store.
///
/// # Errors
/// Returns an error if serialization or the write fails.
pub fn save(state: &EngineState) -> Result<(), Box<dyn std::error::Error>> {
    let path = store_path()?;
    std::fs::write(&path, serde_json::to_string_pretty(state)?)?;
    Ok(())
}
