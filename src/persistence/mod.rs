//! Persistence layer modules.

pub mod checkpoint_repo;
pub mod db;
pub mod pause_repo;
pub mod preference_repo;
pub mod recovery_repo;
pub mod schema;

pub use checkpoint_repo::CheckpointRepo;
pub use pause_repo::PauseRepo;
pub use preference_repo::PreferenceRepo;
pub use recovery_repo::RecoveryRepo;

/// Re-export the database pool type for convenience.
pub use sqlx::SqlitePool;
