//! Plain data records exchanged between the stages and with consumers

use serde::{Deserialize, Serialize};

/// Canonical feature vector of a part. Lengths in mm, volumes in mm³.
///
/// Any ratio, depth or volume whose driving count is zero is zero as well.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PartFeatures {
    pub bounding_box_x: f64,
    pub bounding_box_y: f64,
    pub bounding_box_z: f64,

    pub volume: f64,

    pub through_hole_count: u32,

    pub blind_hole_count: u32,
    pub blind_hole_avg_depth_to_diameter: f64,
    pub blind_hole_max_depth_to_diameter: f64,

    pub pocket_count: u32,
    pub pocket_total_volume: f64,
    pub pocket_avg_depth: f64,
    pub pocket_max_depth: f64,

    pub non_standard_hole_count: u32,

    /// Smallest detected hole diameter, 0 when the part has no holes
    pub min_hole_diameter: f64,
}

impl PartFeatures {
    pub fn hole_count(&self) -> u32 {
        self.through_hole_count + self.blind_hole_count
    }
}

/// Detection certainty per feature family, each in [0, 1]
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureConfidence {
    pub bounding_box: f64,
    pub volume: f64,
    pub through_holes: f64,
    pub blind_holes: f64,
    pub pockets: f64,
}

impl FeatureConfidence {
    /// Families in display order
    pub fn entries(&self) -> [(&'static str, f64); 5] {
        [
            ("bounding_box", self.bounding_box),
            ("volume", self.volume),
            ("through_holes", self.through_holes),
            ("blind_holes", self.blind_holes),
            ("pockets", self.pockets),
        ]
    }
}

/// DFM issue severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    Warning,
    Info,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Critical => write!(f, "critical"),
            Severity::Warning => write!(f, "warning"),
            Severity::Info => write!(f, "info"),
        }
    }
}

/// A manufacturability finding. The message wording is stable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DfmIssue {
    pub severity: Severity,
    pub message: String,
}

impl DfmIssue {
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
        }
    }
}

/// Named contributions behind a quote. The key set never changes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceBreakdown {
    pub base_price: f64,
    /// Sum of all coefficient × normalized feature terms
    pub feature_contribution: f64,
    /// Per-unit price after the non-negative clamp, before the order floor
    pub predicted_price_per_unit: f64,
    pub calculated_total: f64,
    /// Amount added by the minimum order floor, 0 when unused
    pub minimum_order_price: f64,
    pub final_total: f64,
}

impl PriceBreakdown {
    pub fn entries(&self) -> [(&'static str, f64); 6] {
        [
            ("base_price", self.base_price),
            ("feature_contribution", self.feature_contribution),
            ("predicted_price_per_unit", self.predicted_price_per_unit),
            ("calculated_total", self.calculated_total),
            ("minimum_order_price", self.minimum_order_price),
            ("final_total", self.final_total),
        ]
    }
}

/// Priced quote for one (features, quantity, config) triple. Prices in EUR.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteResult {
    pub price_per_unit: f64,
    pub total_price: f64,
    pub quantity: u32,
    pub breakdown: PriceBreakdown,
    pub minimum_applied: bool,
}
