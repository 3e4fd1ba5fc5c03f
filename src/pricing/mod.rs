//! Pricing: trained artifact, quote engine and model evaluation

pub mod config;
pub mod engine;
pub mod evaluate;

pub use config::{PricingConfig, PricingConfigError, PRICING_FEATURES};
pub use engine::{calculate_quote, normalize, pricing_features};
pub use evaluate::{evaluate_samples, read_samples, Evaluation, EvaluationError, PriceSample};
