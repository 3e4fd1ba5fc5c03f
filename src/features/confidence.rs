//! Per-family confidence aggregation and presentation bands

use serde::{Deserialize, Serialize};

use super::holes::HoleSummary;
use super::pockets::PocketSummary;
use crate::core::FeatureConfidence;

/// Lower bound of the green band
pub const GREEN_THRESHOLD: f64 = 0.70;

/// Lower bound of the yellow band; anything below is red
pub const YELLOW_THRESHOLD: f64 = 0.50;

/// Presentation band every consumer renders a confidence with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceBand {
    Green,
    Yellow,
    Red,
}

impl ConfidenceBand {
    pub fn of(confidence: f64) -> Self {
        if confidence >= GREEN_THRESHOLD {
            ConfidenceBand::Green
        } else if confidence >= YELLOW_THRESHOLD {
            ConfidenceBand::Yellow
        } else {
            ConfidenceBand::Red
        }
    }
}

impl std::fmt::Display for ConfidenceBand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfidenceBand::Green => write!(f, "green"),
            ConfidenceBand::Yellow => write!(f, "yellow"),
            ConfidenceBand::Red => write!(f, "red"),
        }
    }
}

/// Build the confidence record. Bounding box and volume are exact solid
/// queries and always score 1.0.
pub fn score(holes: &HoleSummary, pockets: &PocketSummary) -> FeatureConfidence {
    let family = |count: u32| if count > 0 { holes.confidence } else { 0.0 };

    FeatureConfidence {
        bounding_box: 1.0,
        volume: 1.0,
        through_holes: family(holes.through_count),
        blind_holes: family(holes.blind_count),
        pockets: pockets.confidence,
    }
}
