//! Error types for stylebox
//!
//! Two families of problems exist in this engine and only one of them is an
//! `Error`. Parse-time problems (bad syntax, unknown properties, values out
//! of range, deprecations, dangling color references) are *diagnostics*:
//! they carry a source range, go to the provider's diagnostic sink and never
//! abort parsing — see [`crate::css::diagnostics`]. Runtime problems
//! (negative allocations, under-sized for_size, minimum > natural) are
//! logged via `log::warn!` and answered with a defined fallback.
//!
//! The `Error` enum below covers the genuinely fatal cases: I/O failures
//! while loading a rule source, and API misuse.

use thiserror::Error;

/// Result type alias for stylebox operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
  /// Reading a rule source from disk failed.
  #[error("failed to load style resource {path}: {source}")]
  Resource {
    path: String,
    #[source]
    source: std::io::Error,
  },

  /// I/O error outside of resource loading.
  #[error("I/O error: {0}")]
  Io(#[from] std::io::Error),

  /// A node operation that requires a tree position was called on a node
  /// without one (e.g. `insert_before` with a sibling under another parent).
  #[error("invalid node relation: {0}")]
  InvalidRelation(&'static str),
}
