//! Pocket detection
//!
//! Only prismatic pockets with a planar floor facing +z are recognized.
//! Floors are planar faces inset from the envelope; depth is measured from the
//! top of the envelope. Flat hole bottoms and counterbore shoulders are part of
//! their hole, so pocket detection runs after hole detection and skips them.

use serde::{Deserialize, Serialize};

use super::face::{classify_all, PlanarFace};
use super::group_connected;
use super::holes::{detect_holes_in, Hole};
use crate::core::QuoteError;
use crate::geometry::{Axis, BoundingBox, Solid};

/// Required inset of a floor from the envelope faces along its normal (mm)
pub const MIN_FLOOR_INSET: f64 = 0.5;

/// Required distance of a floor below the top surface (mm)
pub const MIN_TOP_CLEARANCE: f64 = 1.0;

/// Shallowest depth counted as a pocket (mm)
pub const MIN_POCKET_DEPTH: f64 = 0.5;

pub const POCKET_CONFIDENCE: f64 = 0.75;

/// Floors closer than this along z are coplanar
const COPLANAR_TOLERANCE: f64 = 0.01;

/// Reporting band of a pocket depth
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DepthBand {
    /// Under 10 mm
    Shallow,
    /// 10 to 25 mm
    Deep,
    /// Over 25 mm
    VeryDeep,
}

impl DepthBand {
    pub fn of(depth: f64) -> Self {
        if depth < 10.0 {
            DepthBand::Shallow
        } else if depth <= 25.0 {
            DepthBand::Deep
        } else {
            DepthBand::VeryDeep
        }
    }
}

impl std::fmt::Display for DepthBand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DepthBand::Shallow => write!(f, "shallow"),
            DepthBand::Deep => write!(f, "deep"),
            DepthBand::VeryDeep => write!(f, "very deep"),
        }
    }
}

/// One detected pocket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pocket {
    /// Height of the floor
    pub floor_z: f64,
    pub depth: f64,
    /// Planar extent of the floor faces
    pub footprint_area: f64,
    /// Approximate cavity volume, see [`approximate_pocket_volume`]
    pub volume: f64,
    pub band: DepthBand,
}

/// Aggregated pocket metrics
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PocketSummary {
    pub count: u32,
    pub avg_depth: f64,
    pub max_depth: f64,
    pub total_volume: f64,
    pub confidence: f64,
    pub pockets: Vec<Pocket>,
}

/// Cavity volume estimate from floor footprints.
///
/// This is footprint area × depth, not an exact Boolean volume: draft, fillets
/// and islands standing above the floor are ignored. Replace this function to
/// change the approximation.
pub fn approximate_pocket_volume(floors: &[&PlanarFace], depth: f64) -> f64 {
    floors.iter().map(|f| f.footprint_area()).sum::<f64>() * depth
}

/// Detect pockets on a solid
pub fn detect_pockets(solid: &dyn Solid) -> Result<PocketSummary, QuoteError> {
    let envelope = solid.bounding_box()?;
    let classified = classify_all(&solid.faces()?);
    let holes = detect_holes_in(classified.cylindrical, &envelope, classified.out_of_range);
    Ok(detect_pockets_in(&classified.planar, &envelope, &holes.holes))
}

/// Detect pockets from already classified planar faces. Faces that cap one of
/// `holes` are never floors.
pub fn detect_pockets_in(
    faces: &[PlanarFace],
    envelope: &BoundingBox,
    holes: &[Hole],
) -> PocketSummary {
    let top = envelope.max_along(Axis::Z);
    let bottom = envelope.min_along(Axis::Z);

    let floors: Vec<&PlanarFace> = faces
        .iter()
        .filter(|f| f.faces_up() && is_floor(f.position, bottom, top))
        .filter(|f| {
            let capped = holes.iter().any(|h| h.caps(f));
            if capped {
                tracing::debug!("planar face at z={:.2} is a hole end, not a floor", f.position);
            }
            !capped
        })
        .collect();

    let groups = group_connected(&floors, |a, b| {
        (a.position - b.position).abs() <= COPLANAR_TOLERANCE
            && footprints_touch(&a.bounds, &b.bounds)
    });

    let pockets: Vec<Pocket> = groups
        .iter()
        .map(|members| {
            let group: Vec<&PlanarFace> = members.iter().map(|&i| floors[i]).collect();
            let floor_z = group.iter().map(|f| f.position).fold(f64::INFINITY, f64::min);
            let depth = top - floor_z;
            let pocket = Pocket {
                floor_z,
                depth,
                footprint_area: group.iter().map(|f| f.footprint_area()).sum(),
                volume: approximate_pocket_volume(&group, depth),
                band: DepthBand::of(depth),
            };
            tracing::debug!(
                "pocket floor at z={:.2}: depth {:.2} mm ({}), ~{:.1} mm³",
                pocket.floor_z,
                pocket.depth,
                pocket.band,
                pocket.volume
            );
            pocket
        })
        .collect();

    summarize(pockets)
}

fn is_floor(z: f64, bottom: f64, top: f64) -> bool {
    z - bottom >= MIN_FLOOR_INSET && top - z >= MIN_TOP_CLEARANCE.max(MIN_POCKET_DEPTH)
}

fn footprints_touch(a: &BoundingBox, b: &BoundingBox) -> bool {
    [Axis::X, Axis::Y].iter().all(|&axis| {
        a.min_along(axis) <= b.max_along(axis) + COPLANAR_TOLERANCE
            && b.min_along(axis) <= a.max_along(axis) + COPLANAR_TOLERANCE
    })
}

fn summarize(pockets: Vec<Pocket>) -> PocketSummary {
    if pockets.is_empty() {
        return PocketSummary::default();
    }

    let count = pockets.len();
    let depth_sum: f64 = pockets.iter().map(|p| p.depth).sum();

    PocketSummary {
        count: count as u32,
        avg_depth: depth_sum / count as f64,
        max_depth: pockets.iter().map(|p| p.depth).fold(0.0, f64::max),
        total_volume: pockets.iter().map(|p| p.volume).sum(),
        confidence: POCKET_CONFIDENCE,
        pockets,
    }
}
