//! `bomsync-engine` — Master-BOM batch reconciliation engine.
//!
//! Pure engine crate: receives pre-loaded records and a master snapshot,
//! returns classified results. No CLI or IO dependencies.

pub mod classify;
pub mod config;
pub mod engine;
pub mod error;
pub mod index;
pub mod model;
pub mod normalize;
pub mod summary;

pub use config::ReconcileConfig;
pub use engine::run;
pub use error::EngineError;
pub use model::{ExclusionRecord, MasterEntry, Outcome, Record, RunResult, RunSummary, Scalar};
