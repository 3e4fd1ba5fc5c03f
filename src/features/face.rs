//! Face classification
//!
//! The single boundary where raw provider data becomes a typed descriptor.
//! Everything downstream switches on [`FaceDescriptor`], never on tags.

use thiserror::Error;

use crate::geometry::{Axis, BoundingBox, RawFace};

/// Smallest cylinder diameter treated as a hole, in mm
pub const MIN_HOLE_DIAMETER: f64 = 0.5;

/// Largest cylinder diameter treated as a hole, in mm
pub const MAX_HOLE_DIAMETER: f64 = 50.0;

/// Thickness below which a face's extent counts as flat, in mm
const FLAT_TOLERANCE: f64 = 1e-3;

/// Geometric kind of a face
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FaceGeometryType {
    Planar,
    Cylindrical,
    Other,
}

impl FaceGeometryType {
    /// Map a provider tag to a kind. Unknown tags are `Other`.
    pub fn from_tag(tag: &str) -> Self {
        match tag.trim().to_ascii_uppercase().as_str() {
            "PLANE" | "PLANAR" => FaceGeometryType::Planar,
            "CYLINDER" | "CYLINDRICAL" => FaceGeometryType::Cylindrical,
            _ => FaceGeometryType::Other,
        }
    }
}

/// Why a face ended up as `Other`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OtherReason {
    /// Curved, freeform or unknown surface type
    UnsupportedType,
    /// Cylinder outside the hole diameter range (fillet, chamfer, stock face)
    DiameterOutOfRange,
    /// Plane or cylinder not aligned with a principal axis
    NotAxisAligned,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlanarFace {
    pub normal: Axis,
    /// Coordinate of the plane along its normal
    pub position: f64,
    pub bounds: BoundingBox,
    /// The provider's normal points towards the negative axis. Always false
    /// when the normal was taken from the extents.
    pub reversed: bool,
}

impl PlanarFace {
    /// Whether the face looks up the z axis, as a pocket floor does
    pub fn faces_up(&self) -> bool {
        self.normal == Axis::Z && !self.reversed
    }

    /// Rectangular footprint area of the face's extents
    pub fn footprint_area(&self) -> f64 {
        let [a, b] = self.normal.others();
        self.bounds.span(a) * self.bounds.span(b)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CylindricalFace {
    pub axis: Axis,
    pub diameter: f64,
    /// Extent along the axis
    pub span: f64,
    pub bounds: BoundingBox,
    /// The provider gave no direction and the axis was taken from the extents
    pub axis_inferred: bool,
}

/// Typed result of classifying one face
#[derive(Debug, Clone, PartialEq)]
pub enum FaceDescriptor {
    Planar(PlanarFace),
    Cylindrical(CylindricalFace),
    Other(OtherReason),
}

impl FaceDescriptor {
    pub fn kind(&self) -> FaceGeometryType {
        match self {
            FaceDescriptor::Planar(_) => FaceGeometryType::Planar,
            FaceDescriptor::Cylindrical(_) => FaceGeometryType::Cylindrical,
            FaceDescriptor::Other(_) => FaceGeometryType::Other,
        }
    }
}

/// A face whose raw data is unusable; detectors skip it
#[derive(Debug, Clone, Error, PartialEq)]
pub enum FaceError {
    #[error("face bounds are not finite or inverted")]
    MalformedBounds,
}

/// Classify one raw face.
///
/// Unknown types never fail; only malformed numeric data does.
pub fn classify(face: &RawFace) -> Result<FaceDescriptor, FaceError> {
    if !face.bounds.is_valid() {
        return Err(FaceError::MalformedBounds);
    }

    let descriptor = match FaceGeometryType::from_tag(&face.geom_type) {
        FaceGeometryType::Planar => classify_planar(face),
        FaceGeometryType::Cylindrical => classify_cylindrical(face),
        FaceGeometryType::Other => FaceDescriptor::Other(OtherReason::UnsupportedType),
    };
    Ok(descriptor)
}

fn classify_planar(face: &RawFace) -> FaceDescriptor {
    let normal = match face.direction {
        Some(dir) => Axis::from_direction(dir),
        None => Axis::ALL
            .into_iter()
            .find(|&a| face.bounds.span(a) <= FLAT_TOLERANCE),
    };

    match normal {
        Some(normal) => FaceDescriptor::Planar(PlanarFace {
            normal,
            position: (face.bounds.min_along(normal) + face.bounds.max_along(normal)) / 2.0,
            bounds: face.bounds,
            reversed: face.direction.map_or(false, |dir| dir[normal.index()] < 0.0),
        }),
        None => FaceDescriptor::Other(OtherReason::NotAxisAligned),
    }
}

fn classify_cylindrical(face: &RawFace) -> FaceDescriptor {
    let (axis, axis_inferred) = match face.direction {
        Some(dir) => match Axis::from_direction(dir) {
            Some(axis) => (axis, false),
            None => return FaceDescriptor::Other(OtherReason::NotAxisAligned),
        },
        None => (longest_axis(&face.bounds), true),
    };

    let diameter = diameter_across(&face.bounds, axis);
    if !(MIN_HOLE_DIAMETER..=MAX_HOLE_DIAMETER).contains(&diameter) {
        tracing::debug!(
            "cylindrical face rejected: diameter {:.3} mm outside hole range",
            diameter
        );
        return FaceDescriptor::Other(OtherReason::DiameterOutOfRange);
    }

    FaceDescriptor::Cylindrical(CylindricalFace {
        axis,
        diameter,
        span: face.bounds.span(axis),
        bounds: face.bounds,
        axis_inferred,
    })
}

/// Mean of the two spans across the axis. With an inferred axis these are the
/// two smallest spans of the face; with a provider axis they are the spans
/// across it even when the face is shorter than it is wide.
pub(crate) fn diameter_across(bounds: &BoundingBox, axis: Axis) -> f64 {
    let [a, b] = axis.others();
    (bounds.span(a) + bounds.span(b)) / 2.0
}

/// Axis of the largest span; ties resolve to the later axis (z before y before x)
fn longest_axis(bounds: &BoundingBox) -> Axis {
    Axis::ALL
        .into_iter()
        .fold(Axis::X, |best, a| {
            if bounds.span(a) >= bounds.span(best) {
                a
            } else {
                best
            }
        })
}

/// Faces of a solid sorted by kind, with counts of what was left out
#[derive(Debug, Clone, Default)]
pub struct ClassifiedFaces {
    pub planar: Vec<PlanarFace>,
    pub cylindrical: Vec<CylindricalFace>,
    /// Curved, freeform, unknown or oblique faces
    pub unrecognized: usize,
    /// Cylinders rejected by the diameter range
    pub out_of_range: usize,
    /// Faces skipped because their data was malformed
    pub malformed: usize,
}

impl ClassifiedFaces {
    pub fn total(&self) -> usize {
        self.planar.len() + self.cylindrical.len() + self.unrecognized + self.out_of_range + self.malformed
    }
}

/// Classify every face, skipping malformed ones with a warning
pub fn classify_all(faces: &[RawFace]) -> ClassifiedFaces {
    let mut out = ClassifiedFaces::default();

    for (index, face) in faces.iter().enumerate() {
        match classify(face) {
            Ok(FaceDescriptor::Planar(p)) => out.planar.push(p),
            Ok(FaceDescriptor::Cylindrical(c)) => out.cylindrical.push(c),
            Ok(FaceDescriptor::Other(OtherReason::DiameterOutOfRange)) => out.out_of_range += 1,
            Ok(FaceDescriptor::Other(_)) => out.unrecognized += 1,
            Err(e) => {
                tracing::warn!("skipping face {} ({}): {}", index, face.geom_type, e);
                out.malformed += 1;
            }
        }
    }

    out
}
