//! CLI command implementations

pub mod analyze;
pub mod completions;
pub mod config;
pub mod evaluate;
pub mod price;
pub mod quote;
