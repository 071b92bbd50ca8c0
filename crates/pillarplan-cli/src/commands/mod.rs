pub mod block;
pub mod config;
pub mod diagnostics;
pub mod feedback;
pub mod goal;
pub mod pillar;
pub mod plan;
pub mod weighting;
