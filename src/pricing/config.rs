//! Trained pricing artifact: loading and validation
//!
//! The artifact is checked against the embedded JSON schema first, then
//! deserialized and checked for numeric sanity. Nothing is ever defaulted: a
//! config that fails either pass is a deployment defect.

use chrono::{DateTime, NaiveDateTime, Utc};
use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

use crate::core::loader::is_json;
use crate::core::SyntaxError;
use crate::schema::{SchemaUnavailable, ValidationError, Validator, PRICING_CONFIG_SCHEMA};

/// The ten pricing features, in model order
pub const PRICING_FEATURES: [&str; 10] = [
    "volume",
    "through_hole_count",
    "blind_hole_count",
    "blind_hole_avg_depth_to_diameter",
    "blind_hole_max_depth_to_diameter",
    "pocket_count",
    "pocket_total_volume",
    "pocket_avg_depth",
    "pocket_max_depth",
    "non_standard_hole_count",
];

/// Problems with the pricing artifact
#[derive(Debug, Error, Diagnostic)]
pub enum PricingConfigError {
    #[error("Pricing config file not found or unreadable: {path}")]
    #[diagnostic(
        code(pquote::pricing::config_io),
        help("Train the model first, or point --pricing-config / PQUOTE_PRICING_CONFIG at the artifact")
    )]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Syntax(#[from] SyntaxError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Schema(#[from] ValidationError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    SchemaUnavailable(#[from] SchemaUnavailable),

    #[error("Missing '{feature}' in {map}")]
    #[diagnostic(code(pquote::pricing::missing_feature))]
    MissingFeature { map: &'static str, feature: String },

    #[error("Invalid pricing config: {0}")]
    #[diagnostic(code(pquote::pricing::invalid_config))]
    Invalid(String),
}

/// Immutable snapshot of the trained linear model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingConfig {
    /// Model intercept, EUR per unit
    pub base_price: f64,
    /// Order floor, EUR
    pub minimum_order_price: f64,
    /// Training fit. 0 (or less) means the model is not trained.
    pub r_squared: f64,
    pub coefficients: BTreeMap<String, f64>,
    pub scaler_mean: BTreeMap<String, f64>,
    pub scaler_std: BTreeMap<String, f64>,
    pub last_updated: String,
}

impl PricingConfig {
    /// Load and validate an artifact from disk (JSON or YAML by extension)
    pub fn load(path: &Path) -> Result<Self, PricingConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| PricingConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::from_str_named(&content, &path.display().to_string())?;
        tracing::info!(
            "loaded pricing config {} (r² = {:.3}, updated {})",
            path.display(),
            config.r_squared,
            config.last_updated
        );
        Ok(config)
    }

    /// Parse and validate artifact text. `filename` picks the format.
    pub fn from_str_named(content: &str, filename: &str) -> Result<Self, PricingConfigError> {
        let value: JsonValue = if is_json(Path::new(filename)) {
            serde_json::from_str(content)
                .map_err(|e| SyntaxError::from_json(&e, content, filename))?
        } else {
            serde_yml::from_str(content)
                .map_err(|e| SyntaxError::from_yaml(&e, content, filename))?
        };

        Validator::for_schema(PRICING_CONFIG_SCHEMA)?.validate(&value, content, filename)?;

        let config: PricingConfig = serde_json::from_value(value)
            .map_err(|e| PricingConfigError::Invalid(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Semantic checks the schema cannot express
    pub fn validate(&self) -> Result<(), PricingConfigError> {
        for (name, value) in [
            ("base_price", self.base_price),
            ("minimum_order_price", self.minimum_order_price),
            ("r_squared", self.r_squared),
        ] {
            if !value.is_finite() {
                return Err(PricingConfigError::Invalid(format!(
                    "{} must be a finite number",
                    name
                )));
            }
        }

        for feature in PRICING_FEATURES {
            let coefficient = lookup("coefficients", &self.coefficients, feature)?;
            let mean = lookup("scaler_mean", &self.scaler_mean, feature)?;
            let std = lookup("scaler_std", &self.scaler_std, feature)?;

            if !coefficient.is_finite() || !mean.is_finite() {
                return Err(PricingConfigError::Invalid(format!(
                    "coefficient and mean for '{}' must be finite",
                    feature
                )));
            }
            if !std.is_finite() || std == 0.0 {
                return Err(PricingConfigError::Invalid(format!(
                    "scaler_std for '{}' must be finite and non-zero (got {})",
                    feature, std
                )));
            }
        }

        Ok(())
    }

    /// Whether quoting is allowed with this model
    pub fn is_trained(&self) -> bool {
        self.r_squared > 0.0
    }

    /// Parsed `last_updated`, if it is RFC 3339 or a naive ISO timestamp
    pub fn last_updated_at(&self) -> Option<DateTime<Utc>> {
        let raw = self.last_updated.trim();
        DateTime::parse_from_rfc3339(raw)
            .map(|dt| dt.with_timezone(&Utc))
            .ok()
            .or_else(|| {
                NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
                    .ok()
                    .map(|naive| naive.and_utc())
            })
    }

    pub fn coefficient(&self, feature: &str) -> Result<f64, PricingConfigError> {
        lookup("coefficients", &self.coefficients, feature)
    }

    pub fn mean(&self, feature: &str) -> Result<f64, PricingConfigError> {
        lookup("scaler_mean", &self.scaler_mean, feature)
    }

    pub fn std(&self, feature: &str) -> Result<f64, PricingConfigError> {
        lookup("scaler_std", &self.scaler_std, feature)
    }
}

fn lookup(
    map: &'static str,
    values: &BTreeMap<String, f64>,
    feature: &str,
) -> Result<f64, PricingConfigError> {
    values
        .get(feature)
        .copied()
        .ok_or_else(|| PricingConfigError::MissingFeature {
            map,
            feature: feature.to_string(),
        })
}
