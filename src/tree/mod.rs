//! Style nodes and the per-screen provider registry.

pub mod node;
pub mod screen;
