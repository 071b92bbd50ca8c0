//! Scoring snapshot dump for debugging.

use chrono::Utc;

use pillarplan_core::{EngineConfig, PlannerEngine};

use crate::store;

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let state = store::load()?;
    let mut engine = PlannerEngine::new(EngineConfig::load_or_default());
    let _ = engine.recompute(&state, Utc::now());
    println!("{}", serde_json::to_string_pretty(&engine.snapshots())?);
    Ok(())
}
