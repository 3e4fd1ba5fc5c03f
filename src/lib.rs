//! pquote: automated quoting for machined parts
//!
//! Reads a B-rep solid summary, extracts holes and pockets, flags
//! manufacturability issues and prices the part with a trained linear model.

pub mod cli;
pub mod core;
pub mod dfm;
pub mod features;
pub mod geometry;
pub mod pipeline;
pub mod pricing;
pub mod schema;
