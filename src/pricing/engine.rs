//! Linear pricing model with order guardrails

use super::config::{PricingConfig, PRICING_FEATURES};
use crate::core::limits::check_quantity;
use crate::core::{PartFeatures, PriceBreakdown, QuoteError, QuoteResult};

/// The ten pricing features of a part, in [`PRICING_FEATURES`] order
pub fn pricing_features(features: &PartFeatures) -> [(&'static str, f64); 10] {
    let values = [
        features.volume,
        features.through_hole_count as f64,
        features.blind_hole_count as f64,
        features.blind_hole_avg_depth_to_diameter,
        features.blind_hole_max_depth_to_diameter,
        features.pocket_count as f64,
        features.pocket_total_volume,
        features.pocket_avg_depth,
        features.pocket_max_depth,
        features.non_standard_hole_count as f64,
    ];

    std::array::from_fn(|i| (PRICING_FEATURES[i], values[i]))
}

/// Standard-scaler normalization: `(value - mean) / std`
pub fn normalize(value: f64, mean: f64, std: f64) -> f64 {
    (value - mean) / std
}

/// Raw model output per unit: intercept plus the summed feature terms.
/// Returns `(feature_contribution, unclamped price per unit)`.
pub fn predict_unit_price(
    features: &PartFeatures,
    config: &PricingConfig,
) -> Result<(f64, f64), QuoteError> {
    let mut contribution = 0.0;
    for (name, value) in pricing_features(features) {
        let normalized = normalize(value, config.mean(name)?, config.std(name)?);
        contribution += config.coefficient(name)? * normalized;
    }
    Ok((contribution, config.base_price + contribution))
}

/// Price a feature vector for a quantity.
///
/// Fails when the model is untrained or the quantity is outside 1..=50. The
/// per-unit prediction is clamped at zero and the order is lifted to the
/// configured minimum order price when it falls short.
pub fn calculate_quote(
    features: &PartFeatures,
    quantity: i64,
    config: &PricingConfig,
) -> Result<QuoteResult, QuoteError> {
    if !config.is_trained() {
        return Err(QuoteError::ModelNotReady);
    }
    let quantity = check_quantity(quantity)?;

    let (feature_contribution, raw_unit_price) = predict_unit_price(features, config)?;
    let predicted_price_per_unit = raw_unit_price.max(0.0);
    let calculated_total = predicted_price_per_unit * quantity as f64;

    let minimum_applied = calculated_total < config.minimum_order_price;
    let (final_total, price_per_unit) = if minimum_applied {
        tracing::warn!(
            "order total €{:.2} below minimum, raised to €{:.2}",
            calculated_total,
            config.minimum_order_price
        );
        (
            config.minimum_order_price,
            config.minimum_order_price / quantity as f64,
        )
    } else {
        (calculated_total, predicted_price_per_unit)
    };

    let breakdown = PriceBreakdown {
        base_price: config.base_price,
        feature_contribution,
        predicted_price_per_unit,
        calculated_total,
        minimum_order_price: if minimum_applied {
            final_total - calculated_total
        } else {
            0.0
        },
        final_total,
    };

    tracing::info!(
        "quote: {} x €{:.2} = €{:.2}{}",
        quantity,
        price_per_unit,
        final_total,
        if minimum_applied { " (minimum applied)" } else { "" }
    );

    Ok(QuoteResult {
        price_per_unit,
        total_price: final_total,
        quantity,
        breakdown,
        minimum_applied,
    })
}
