//! Session resilience managers.
//!
//! Covers the intervention pause/resume state machine, checkpoint
//! creation/invalidation, and checkpoint recovery. Each manager owns its
//! repositories and routes every durable-store call through the retry
//! executor.

pub mod checkpoint_manager;
pub mod intervention;
pub mod recovery_manager;

pub use checkpoint_manager::CheckpointManager;
pub use intervention::{InterventionManager, PauseOutcome, PauseRequest};
pub use recovery_manager::{RecoveryManager, RecoveryOutcome, RecoveryStart};
