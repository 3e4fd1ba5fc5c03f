//! Solid and face handles handed over by the geometry provider

use serde::{Deserialize, Serialize};

use super::{Axis, BoundingBox, GeometryError};

/// A B-rep solid as exposed by the geometry provider
///
/// Implementations must be deterministic: the same solid yields the same
/// faces in the same order on every call.
pub trait Solid {
    /// Axis-aligned envelope of the solid
    fn bounding_box(&self) -> Result<BoundingBox, GeometryError>;

    /// Exact solid volume in mm³
    fn volume(&self) -> Result<f64, GeometryError>;

    /// Every face of the solid
    fn faces(&self) -> Result<Vec<RawFace>, GeometryError>;
}

/// Opaque face handle: a geometry-type tag plus raw parametric data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawFace {
    /// Geometry-type tag as reported by the provider (e.g. "PLANE", "CYLINDER")
    #[serde(rename = "type")]
    pub geom_type: String,

    /// Axis-aligned extents of the face
    pub bounds: BoundingBox,

    /// Cylinder axis or plane normal, when the provider reports one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<[f64; 3]>,
}

impl RawFace {
    pub fn new(geom_type: impl Into<String>, bounds: BoundingBox) -> Self {
        Self {
            geom_type: geom_type.into(),
            bounds,
            direction: None,
        }
    }

    pub fn with_direction(mut self, direction: [f64; 3]) -> Self {
        self.direction = Some(direction);
        self
    }

    /// Planar face with the given extents and principal normal
    pub fn plane(bounds: BoundingBox, normal: Axis) -> Self {
        let mut dir = [0.0; 3];
        dir[normal.index()] = 1.0;
        Self::new("PLANE", bounds).with_direction(dir)
    }

    /// Full cylindrical face along `axis`, centred on `center` in the two
    /// perpendicular coordinates, spanning `from..to` along the axis
    pub fn cylinder(axis: Axis, center: [f64; 2], diameter: f64, from: f64, to: f64) -> Self {
        let r = diameter / 2.0;
        let [a, b] = axis.others();
        let mut min = [0.0; 3];
        let mut max = [0.0; 3];
        min[axis.index()] = from.min(to);
        max[axis.index()] = from.max(to);
        min[a.index()] = center[0] - r;
        max[a.index()] = center[0] + r;
        min[b.index()] = center[1] - r;
        max[b.index()] = center[1] + r;

        let mut dir = [0.0; 3];
        dir[axis.index()] = 1.0;
        Self::new("CYLINDER", BoundingBox::new(min, max)).with_direction(dir)
    }
}

/// Serialized summary of a solid, as exported by a geometry provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolidDescription {
    /// Optional display name of the part
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    pub bounding_box: BoundingBox,

    /// Volume in mm³
    pub volume: f64,

    #[serde(default)]
    pub faces: Vec<RawFace>,
}

impl SolidDescription {
    pub fn new(bounding_box: BoundingBox, volume: f64) -> Self {
        Self {
            name: None,
            bounding_box,
            volume,
            faces: Vec::new(),
        }
    }

    /// Rectangular block of the given size with its six envelope faces
    pub fn block(x: f64, y: f64, z: f64) -> Self {
        let bbox = BoundingBox::from_size(x, y, z);
        let mut solid = Self::new(bbox, x * y * z);

        for axis in Axis::ALL {
            for at in [0.0, bbox.max_along(axis)] {
                let mut bounds = bbox;
                bounds.min[axis.index()] = at;
                bounds.max[axis.index()] = at;
                solid.faces.push(RawFace::plane(bounds, axis));
            }
        }
        solid
    }

    pub fn with_face(mut self, face: RawFace) -> Self {
        self.faces.push(face);
        self
    }
}

impl Solid for SolidDescription {
    fn bounding_box(&self) -> Result<BoundingBox, GeometryError> {
        if !self.bounding_box.is_valid() {
            return Err(GeometryError::InvalidBoundingBox {
                min: self.bounding_box.min,
                max: self.bounding_box.max,
            });
        }
        Ok(self.bounding_box)
    }

    fn volume(&self) -> Result<f64, GeometryError> {
        if !self.volume.is_finite() || self.volume <= 0.0 {
            return Err(GeometryError::InvalidVolume(self.volume));
        }
        Ok(self.volume)
    }

    fn faces(&self) -> Result<Vec<RawFace>, GeometryError> {
        Ok(self.faces.clone())
    }
}
