//! Domain model module declarations.

pub mod checkpoint;
pub mod pause;
pub mod preference;
pub mod recovery;
