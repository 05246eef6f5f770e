#![forbid(unsafe_code)]

//! Resilience control layer for long-running agent sessions.
//!
//! Three tightly coupled subsystems guard the session lifecycle: a retry
//! executor absorbing transient store failures, an intervention manager
//! driving the pause/resume state machine, and a checkpoint/recovery
//! subsystem that lets a crashed or paused session resume from its most
//! recent consistent point.

pub mod config;
pub mod errors;
pub mod models;
pub mod orchestrator;
pub mod persistence;
pub mod policy;
pub mod retry;

pub use config::GlobalConfig;
pub use errors::{AppError, Result};
