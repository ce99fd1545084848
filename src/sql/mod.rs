//! SQL utilities
//!
//! Provides sanitization, bindable values and select statement building.

pub mod builder;
pub mod sanitize;
pub mod value;

pub use builder::{Predicate, SelectBuilder, Statement, Target};
pub use sanitize::{SQL_METACHARACTERS, quote_identifier, sanitize};
pub use value::Value;
