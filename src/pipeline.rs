//! End-to-end processing of one part
//!
//! [`analyze_part`] and [`crate::pricing::calculate_quote`] are the fallible
//! stages. [`process_part`] runs them in order and never fails: every stage
//! error is logged and recorded in [`ProcessingResult::errors`] so a caller
//! always gets something to show.

use serde::Serialize;
use ulid::Ulid;

use crate::core::{DfmIssue, FeatureConfidence, PartFeatures, QuoteError, QuoteResult};
use crate::dfm;
use crate::features::{extract_features, Hole, Pocket, ReviewFlags};
use crate::geometry::Solid;
use crate::pricing::{calculate_quote, PricingConfig};

/// Shown with every quote
pub const QUOTE_DISCLAIMER: &str = "This quote is automatically generated from 3D model analysis \
and is non-binding. Final pricing is subject to manual engineering review. All prices are in EUR \
and exclude VAT and shipping.";

/// A quote as handed to a customer: always with the disclaimer
#[derive(Debug, Clone, Serialize)]
pub struct DisclaimedQuote {
    #[serde(flatten)]
    pub quote: QuoteResult,
    pub disclaimer: &'static str,
}

impl From<QuoteResult> for DisclaimedQuote {
    fn from(quote: QuoteResult) -> Self {
        Self {
            quote,
            disclaimer: QUOTE_DISCLAIMER,
        }
    }
}

/// Geometry-derived results for a part, without pricing
#[derive(Debug, Clone, Serialize)]
pub struct PartAnalysis {
    pub features: PartFeatures,
    pub confidence: FeatureConfidence,
    pub dfm_issues: Vec<DfmIssue>,
    pub review: ReviewFlags,
    pub holes: Vec<Hole>,
    pub pockets: Vec<Pocket>,
}

/// Extract features and evaluate DFM rules
pub fn analyze_part(solid: &dyn Solid) -> Result<PartAnalysis, QuoteError> {
    let extraction = extract_features(solid)?;
    let dfm_issues = dfm::evaluate(&extraction.features);

    Ok(PartAnalysis {
        features: extraction.features,
        confidence: extraction.confidence,
        dfm_issues,
        review: extraction.review,
        holes: extraction.holes,
        pockets: extraction.pockets,
    })
}

/// Everything known about one processed part
#[derive(Debug, Clone, Serialize)]
pub struct ProcessingResult {
    pub part_id: String,
    /// Where the solid came from, for display
    pub source: String,
    pub features: PartFeatures,
    pub confidence: FeatureConfidence,
    pub dfm_issues: Vec<DfmIssue>,
    pub quote: Option<QuoteResult>,
    pub errors: Vec<String>,
    pub review: ReviewFlags,
    pub disclaimer: &'static str,
}

impl ProcessingResult {
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Analyze and price a part. Never fails; see [`ProcessingResult::errors`].
pub fn process_part(
    solid: &dyn Solid,
    source: &str,
    quantity: i64,
    config: &PricingConfig,
) -> ProcessingResult {
    let part_id = Ulid::new().to_string();
    tracing::info!("processing part {} from {} (quantity {})", part_id, source, quantity);

    let mut result = ProcessingResult {
        part_id,
        source: source.to_string(),
        features: PartFeatures::default(),
        confidence: FeatureConfidence::default(),
        dfm_issues: Vec::new(),
        quote: None,
        errors: Vec::new(),
        review: ReviewFlags::default(),
        disclaimer: QUOTE_DISCLAIMER,
    };

    match analyze_part(solid) {
        Ok(analysis) => {
            result.features = analysis.features;
            result.confidence = analysis.confidence;
            result.dfm_issues = analysis.dfm_issues;
            result.review = analysis.review;
        }
        Err(e) => {
            tracing::error!("analysis of {} failed: {}", source, e);
            result.errors.push(e.to_string());
            return result;
        }
    }

    match calculate_quote(&result.features, quantity, config) {
        Ok(quote) => result.quote = Some(quote),
        Err(e) => {
            tracing::error!("quote calculation failed: {}", e);
            result.errors.push(e.to_string());
        }
    }

    if result.is_success() {
        tracing::info!("processing of {} completed", result.part_id);
    } else {
        tracing::error!(
            "processing of {} completed with {} error(s)",
            result.part_id,
            result.errors.len()
        );
    }
    result
}
