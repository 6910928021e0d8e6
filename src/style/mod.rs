//! Computed styles, the cascade, and change masks.

pub mod cascade;
pub mod change;
pub mod computed;
