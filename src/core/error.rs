//! Error taxonomy of the quoting core

use miette::Diagnostic;
use thiserror::Error;

use crate::geometry::GeometryError;
use crate::pricing::PricingConfigError;

/// Which end of the accepted quantity range was violated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantityLimit {
    Minimum(u32),
    Maximum(u32),
}

impl std::fmt::Display for QuantityLimit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QuantityLimit::Minimum(v) => write!(f, "below the minimum of {}", v),
            QuantityLimit::Maximum(v) => write!(f, "above the maximum of {}", v),
        }
    }
}

/// Failure of a quoting stage. None of these are retried.
#[derive(Debug, Error, Diagnostic)]
pub enum QuoteError {
    #[error("Geometry analysis failed: {0}")]
    #[diagnostic(
        code(pquote::geometry::analysis),
        help("The part needs manual review; the geometry is static so retrying will not help")
    )]
    GeometryAnalysis(#[from] GeometryError),

    #[error(
        "Part exceeds maximum size: {x:.1} × {y:.1} × {z:.1} mm (limit {max_x:.0} × {max_y:.0} × {max_z:.0} mm)"
    )]
    #[diagnostic(code(pquote::geometry::bounding_box_limit))]
    BoundingBoxLimit {
        x: f64,
        y: f64,
        z: f64,
        max_x: f64,
        max_y: f64,
        max_z: f64,
    },

    #[error("System not ready - training required")]
    #[diagnostic(
        code(pquote::pricing::model_not_ready),
        help("The pricing model has r_squared = 0; train it before quoting")
    )]
    ModelNotReady,

    #[error("Quantity must be between 1 and 50 (got {quantity}, {limit})")]
    #[diagnostic(
        code(pquote::pricing::invalid_quantity),
        help("Orders above 50 pieces need a manual quotation")
    )]
    InvalidQuantity { quantity: i64, limit: QuantityLimit },

    #[error(transparent)]
    #[diagnostic(transparent)]
    PricingConfig(#[from] PricingConfigError),
}
