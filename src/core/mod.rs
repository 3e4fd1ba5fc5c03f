//! Core module - domain records, errors, limits and settings

pub mod config;
pub mod diagnostics;
pub mod domain;
pub mod error;
pub mod limits;
pub mod loader;

pub use config::Settings;
pub use diagnostics::{DocumentError, SyntaxError};
pub use domain::{DfmIssue, FeatureConfidence, PartFeatures, PriceBreakdown, QuoteResult, Severity};
pub use error::{QuantityLimit, QuoteError};
