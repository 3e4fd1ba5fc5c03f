//! Hard limits of the quoting service. Not overridable by configuration.

use crate::core::error::{QuantityLimit, QuoteError};
use crate::geometry::BoundingBox;

/// Largest part envelope accepted, in mm (x, y, z)
pub const MAX_BOUNDING_BOX: [f64; 3] = [600.0, 400.0, 500.0];

pub const MIN_QUANTITY: u32 = 1;
pub const MAX_QUANTITY: u32 = 50;

/// Published minimum order value in EUR. Pricing uses the artifact's value.
pub const MINIMUM_ORDER_PRICE: f64 = 30.0;

/// Reject parts larger than the machine envelope before any feature detection
pub fn check_bounding_box(bbox: &BoundingBox) -> Result<(), QuoteError> {
    let [x, y, z] = bbox.extents();
    let [max_x, max_y, max_z] = MAX_BOUNDING_BOX;

    if x > max_x || y > max_y || z > max_z {
        return Err(QuoteError::BoundingBoxLimit {
            x,
            y,
            z,
            max_x,
            max_y,
            max_z,
        });
    }
    Ok(())
}

/// Validate an order quantity, returning it as an unsigned count
pub fn check_quantity(quantity: i64) -> Result<u32, QuoteError> {
    if quantity < MIN_QUANTITY as i64 {
        return Err(QuoteError::InvalidQuantity {
            quantity,
            limit: QuantityLimit::Minimum(MIN_QUANTITY),
        });
    }
    if quantity > MAX_QUANTITY as i64 {
        return Err(QuoteError::InvalidQuantity {
            quantity,
            limit: QuantityLimit::Maximum(MAX_QUANTITY),
        });
    }
    Ok(quantity as u32)
}
