//! New-episode detection.
//!
//! - **Engine**: checks shows one at a time, probe first, page scan second
//! - **Policy**: decides whether a scanned episode number is trusted
//! - **Scheduler**: runs the engine periodically and sends notifications

mod config;
mod engine;
mod policy;
mod scheduler;
mod types;

pub use config::CheckerConfig;
pub use engine::ReconcileEngine;
pub use policy::{AcceptancePolicy, Rejection};
pub use scheduler::{run_check, UpdateScheduler};
pub use types::{BatchOutcome, BatchReport, ReconcileError, UpdateResult};
