//! Rule sources: parsing, selectors, properties, values, diagnostics.

pub mod diagnostics;
pub mod parser;
pub mod properties;
pub mod provider;
pub mod selector;
pub mod value;
