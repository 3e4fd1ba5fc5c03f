//! Geometry Provider boundary
//!
//! The quoting core never parses CAD files. An external provider hands over a
//! solid that exposes its envelope, its volume and an enumerable list of faces,
//! each carrying a geometry-type tag and raw extents. Everything downstream of
//! this module works on those values only.

mod solid;

pub use solid::{RawFace, Solid, SolidDescription};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Cosine above which a direction counts as aligned with a principal axis
pub const ALIGNMENT_COS: f64 = 0.999;

/// Errors raised by a solid-level query
#[derive(Debug, Clone, Error)]
pub enum GeometryError {
    #[error("solid bounding box is invalid: min {min:?}, max {max:?}")]
    InvalidBoundingBox { min: [f64; 3], max: [f64; 3] },

    #[error("solid volume must be positive and finite (got {0})")]
    InvalidVolume(f64),

    #[error("faces could not be enumerated: {0}")]
    FaceQuery(String),

    #[error("none of the {0} face(s) could be analysed")]
    NoAnalysableFaces(usize),
}

/// Principal axis of the part coordinate system
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }

    /// The two axes perpendicular to this one
    pub fn others(self) -> [Axis; 2] {
        match self {
            Axis::X => [Axis::Y, Axis::Z],
            Axis::Y => [Axis::X, Axis::Z],
            Axis::Z => [Axis::X, Axis::Y],
        }
    }

    /// Principal axis a direction vector is aligned with, ignoring sign.
    ///
    /// Returns `None` for zero-length, non-finite or oblique directions.
    pub fn from_direction(dir: [f64; 3]) -> Option<Axis> {
        if dir.iter().any(|c| !c.is_finite()) {
            return None;
        }
        let len = (dir[0] * dir[0] + dir[1] * dir[1] + dir[2] * dir[2]).sqrt();
        if len <= f64::EPSILON {
            return None;
        }

        Axis::ALL
            .into_iter()
            .find(|axis| (dir[axis.index()] / len).abs() >= ALIGNMENT_COS)
    }
}

impl std::fmt::Display for Axis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Axis::X => write!(f, "x"),
            Axis::Y => write!(f, "y"),
            Axis::Z => write!(f, "z"),
        }
    }
}

/// Axis-aligned box in millimetres
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min: [f64; 3],
    pub max: [f64; 3],
}

impl BoundingBox {
    pub fn new(min: [f64; 3], max: [f64; 3]) -> Self {
        Self { min, max }
    }

    /// Box of the given size with its minimum corner at the origin
    pub fn from_size(x: f64, y: f64, z: f64) -> Self {
        Self::new([0.0; 3], [x, y, z])
    }

    pub fn span(&self, axis: Axis) -> f64 {
        self.max[axis.index()] - self.min[axis.index()]
    }

    pub fn min_along(&self, axis: Axis) -> f64 {
        self.min[axis.index()]
    }

    pub fn max_along(&self, axis: Axis) -> f64 {
        self.max[axis.index()]
    }

    /// Extents along x, y and z
    pub fn extents(&self) -> [f64; 3] {
        [self.span(Axis::X), self.span(Axis::Y), self.span(Axis::Z)]
    }

    /// All coordinates finite and max >= min on every axis
    pub fn is_valid(&self) -> bool {
        self.min.iter().chain(self.max.iter()).all(|c| c.is_finite())
            && Axis::ALL.iter().all(|&a| self.span(a) >= 0.0)
    }

    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        let mut out = *self;
        for i in 0..3 {
            out.min[i] = out.min[i].min(other.min[i]);
            out.max[i] = out.max[i].max(other.max[i]);
        }
        out
    }

    /// Whether the boxes overlap or touch on every axis, within `tol`
    pub fn overlaps(&self, other: &BoundingBox, tol: f64) -> bool {
        (0..3).all(|i| self.min[i] <= other.max[i] + tol && other.min[i] <= self.max[i] + tol)
    }
}
