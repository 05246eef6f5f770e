//! Blocking-policy evaluation for risky session actions.

pub mod evaluator;

pub use evaluator::{evaluate, ActionDescriptor, PolicyDecision};
