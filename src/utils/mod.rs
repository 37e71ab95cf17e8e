//! Small helpers shared across the crate.

pub mod glob;
pub mod plural;
