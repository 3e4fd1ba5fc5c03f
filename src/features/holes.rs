//! Hole detection
//!
//! Cylindrical faces are grouped into holes, each hole is classified through
//! or blind against the part envelope, and diameters are matched against the
//! standard drill/clearance table.
//!
//! Known approximation: a hole whose span is ambiguous is counted as a through
//! hole. This under-reports blind holes (which carry DFM risk) and is paired
//! with a confidence penalty. The policy lives in [`classify_span`] so it can
//! be tuned without touching callers.

use serde::{Deserialize, Serialize};

use super::face::{classify_all, diameter_across, CylindricalFace, PlanarFace};
use super::group_connected;
use crate::core::QuoteError;
use crate::geometry::{Axis, BoundingBox, Solid};

/// Span as a fraction of the envelope at or above which a hole goes through
pub const THROUGH_SPAN_RATIO: f64 = 0.9;

/// Band below the through threshold, as a fraction of the envelope, that is
/// still resolved to through
pub const THROUGH_TIE_BAND: f64 = 0.01;

/// Standard sizes match within this many mm
pub const STANDARD_SIZE_TOLERANCE: f64 = 0.1;

/// Common drill and clearance diameters in mm
pub const STANDARD_HOLE_SIZES: [f64; 33] = [
    1.0, 1.5, 2.0, 2.5, 3.0, 3.5, 4.0, 4.5, 5.0, 5.5, 6.0, 6.5, 7.0, 8.0, 9.0, 10.0, 11.0, 12.0,
    14.0, 16.0, 18.0, 20.0, 2.2, 3.3, 4.5, 5.5, 6.6, 9.0, 10.5, 13.0, 14.5, 17.0, 21.0,
];

pub const HOLE_CONFIDENCE: f64 = 0.85;

/// Confidence when a tie-break default or a diameter rejection was involved
pub const PENALIZED_HOLE_CONFIDENCE: f64 = 0.75;

/// Inferred axes on faces within this fraction of being as long as wide are ambiguous
const AMBIGUOUS_AXIS_FRACTION: f64 = 0.05;

/// Positional tolerance (mm) for faces of one bore and for hole end caps
const GROUP_TOLERANCE: f64 = 0.01;

const EPS: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HoleKind {
    Through,
    Blind,
}

impl std::fmt::Display for HoleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HoleKind::Through => write!(f, "through"),
            HoleKind::Blind => write!(f, "blind"),
        }
    }
}

/// One detected hole
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hole {
    pub axis: Axis,
    pub diameter: f64,
    /// Axial span of the hole's faces
    pub depth: f64,
    pub kind: HoleKind,
    pub standard: bool,
    /// Classified through by the ambiguity default rather than by span
    pub tie_break: bool,
    /// Combined extents of the hole's faces
    pub bounds: BoundingBox,
}

impl Hole {
    /// Whether a planar face is the flat bottom or shoulder at one end of
    /// this hole: same axis, level with an end, and inside the bore.
    pub fn caps(&self, face: &PlanarFace) -> bool {
        if face.normal != self.axis {
            return false;
        }
        let at_end = [self.bounds.min_along(self.axis), self.bounds.max_along(self.axis)]
            .iter()
            .any(|end| (face.position - end).abs() <= GROUP_TOLERANCE);

        at_end
            && self.axis.others().iter().all(|&a| {
                face.bounds.min_along(a) >= self.bounds.min_along(a) - GROUP_TOLERANCE
                    && face.bounds.max_along(a) <= self.bounds.max_along(a) + GROUP_TOLERANCE
            })
    }

    pub fn depth_to_diameter(&self) -> f64 {
        if self.diameter > 0.0 {
            self.depth / self.diameter
        } else {
            0.0
        }
    }
}

/// Aggregated hole metrics
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HoleSummary {
    pub through_count: u32,
    pub blind_count: u32,
    pub avg_depth_to_diameter: f64,
    pub max_depth_to_diameter: f64,
    pub confidence: f64,
    pub non_standard_count: u32,
    /// Smallest diameter over all holes, 0 when none
    pub min_diameter: f64,
    pub tie_breaks: u32,
    pub holes: Vec<Hole>,
}

/// Whether a diameter matches an entry of the standard size table
pub fn is_standard_size(diameter: f64) -> bool {
    STANDARD_HOLE_SIZES
        .iter()
        .any(|s| (diameter - s).abs() <= STANDARD_SIZE_TOLERANCE + EPS)
}

/// Detect holes on a solid
pub fn detect_holes(solid: &dyn Solid) -> Result<HoleSummary, QuoteError> {
    let envelope = solid.bounding_box()?;
    let classified = classify_all(&solid.faces()?);
    Ok(detect_holes_in(classified.cylindrical, &envelope, classified.out_of_range))
}

/// Detect holes from already classified cylindrical faces.
///
/// `rejected_cylinders` is the number of cylinders dropped by the diameter
/// range; any rejection lowers the confidence.
pub fn detect_holes_in(
    faces: Vec<CylindricalFace>,
    envelope: &BoundingBox,
    rejected_cylinders: usize,
) -> HoleSummary {
    let groups = group_connected(&faces, |a, b| {
        a.axis == b.axis
            && (a.diameter - b.diameter).abs() <= STANDARD_SIZE_TOLERANCE
            && a.bounds.overlaps(&b.bounds, GROUP_TOLERANCE)
            && same_bore(a, b)
    });

    let holes: Vec<Hole> = groups
        .iter()
        .map(|members| build_hole(members.iter().map(|&i| &faces[i]).collect(), envelope))
        .collect();

    summarize(holes, rejected_cylinders)
}

/// Two faces belong to one bore when their combined cross-section is still a
/// single round profile no wider than the widest face. Split half-cylinders
/// pass; parallel holes whose extents merely overlap do not.
fn same_bore(a: &CylindricalFace, b: &CylindricalFace) -> bool {
    let union = a.bounds.union(&b.bounds);
    let [u, v] = a.axis.others();
    let widest = [a, b]
        .iter()
        .flat_map(|f| [f.bounds.span(u), f.bounds.span(v)])
        .fold(0.0, f64::max);

    (union.span(u) - union.span(v)).abs() <= STANDARD_SIZE_TOLERANCE
        && union.span(u).max(union.span(v)) <= widest + GROUP_TOLERANCE
}

fn build_hole(members: Vec<&CylindricalFace>, envelope: &BoundingBox) -> Hole {
    let first = members[0];
    let axis = first.axis;
    let bounds = members
        .iter()
        .skip(1)
        .fold(first.bounds, |acc, f| acc.union(&f.bounds));

    let diameter = if members.len() == 1 {
        first.diameter
    } else {
        diameter_across(&bounds, axis)
    };
    let depth = bounds.span(axis);
    let axis_inferred = members.iter().all(|f| f.axis_inferred);

    let (kind, tie_break) = classify_span(depth, diameter, envelope.span(axis), axis_inferred);
    let standard = is_standard_size(diameter);

    tracing::debug!(
        "hole along {}: diameter {:.2} mm, span {:.2} mm, {}{}{}",
        axis,
        diameter,
        depth,
        kind,
        if standard { "" } else { ", non-standard" },
        if tie_break { ", tie-break" } else { "" }
    );

    Hole {
        axis,
        diameter,
        depth,
        kind,
        standard,
        tie_break,
        bounds,
    }
}

/// Through/blind decision. Returns the kind and whether the ambiguity default
/// was applied.
///
/// Span at or above 90% of the envelope is through. Spans just under the
/// threshold, and faces whose axis had to be inferred from near-equal extents,
/// default to through.
pub fn classify_span(
    span: f64,
    diameter: f64,
    envelope_span: f64,
    axis_inferred: bool,
) -> (HoleKind, bool) {
    if envelope_span <= 0.0 {
        return (HoleKind::Through, true);
    }

    let threshold = THROUGH_SPAN_RATIO * envelope_span;
    if span + EPS >= threshold {
        return (HoleKind::Through, false);
    }

    let near_threshold = span + EPS >= threshold - THROUGH_TIE_BAND * envelope_span;
    let ambiguous_axis =
        axis_inferred && (span - diameter).abs() <= AMBIGUOUS_AXIS_FRACTION * diameter;

    if near_threshold || ambiguous_axis {
        (HoleKind::Through, true)
    } else {
        (HoleKind::Blind, false)
    }
}

fn summarize(holes: Vec<Hole>, rejected_cylinders: usize) -> HoleSummary {
    if holes.is_empty() {
        return HoleSummary::default();
    }

    let mut summary = HoleSummary::default();
    let mut ratio_sum = 0.0;

    for hole in &holes {
        match hole.kind {
            HoleKind::Through => summary.through_count += 1,
            HoleKind::Blind => {
                summary.blind_count += 1;
                let ratio = hole.depth_to_diameter();
                ratio_sum += ratio;
                summary.max_depth_to_diameter = summary.max_depth_to_diameter.max(ratio);
            }
        }
        if !hole.standard {
            summary.non_standard_count += 1;
        }
        if hole.tie_break {
            summary.tie_breaks += 1;
        }
    }

    if summary.blind_count > 0 {
        summary.avg_depth_to_diameter = ratio_sum / summary.blind_count as f64;
    }

    summary.min_diameter = holes
        .iter()
        .map(|h| h.diameter)
        .fold(f64::INFINITY, f64::min);

    summary.confidence = if summary.tie_breaks > 0 || rejected_cylinders > 0 {
        PENALIZED_HOLE_CONFIDENCE
    } else {
        HOLE_CONFIDENCE
    };

    summary.holes = holes;
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::face::{classify, FaceDescriptor};
    use crate::geometry::{RawFace, SolidDescription};
    use approx::assert_relative_eq;

    fn cyl(face: RawFace) -> CylindricalFace {
        match classify(&face).unwrap() {
            FaceDescriptor::Cylindrical(c) => c,
            other => panic!("expected cylindrical, got {:?}", other),
        }
    }

    fn envelope() -> BoundingBox {
        BoundingBox::from_size(100.0, 60.0, 40.0)
    }

    #[test]
    fn test_standard_sizes() {
        assert!(is_standard_size(6.0));
        assert!(is_standard_size(6.09));
        assert!(is_standard_size(6.6));
        assert!(is_standard_size(10.5));
        assert!(!is_standard_size(7.3));
        assert!(!is_standard_size(23.0));
    }

    #[test]
    fn test_two_through_holes() {
        let faces = vec![
            cyl(RawFace::cylinder(Axis::Z, [20.0, 20.0], 6.0, 0.0, 40.0)),
            cyl(RawFace::cylinder(Axis::Z, [60.0, 20.0], 6.0, 0.0, 40.0)),
        ];
        let summary = detect_holes_in(faces, &envelope(), 0);

        assert_eq!(summary.through_count, 2);
        assert_eq!(summary.blind_count, 0);
        assert_eq!(summary.non_standard_count, 0);
        assert_eq!(summary.avg_depth_to_diameter, 0.0);
        assert_eq!(summary.max_depth_to_diameter, 0.0);
        assert_eq!(summary.confidence, HOLE_CONFIDENCE);
        assert_relative_eq!(summary.min_diameter, 6.0);
    }

    #[test]
    fn test_blind_hole_ratio() {
        let faces = vec![cyl(RawFace::cylinder(Axis::Z, [20.0, 20.0], 5.0, 10.0, 40.0))];
        let summary = detect_holes_in(faces, &BoundingBox::from_size(100.0, 60.0, 80.0), 0);

        assert_eq!(summary.blind_count, 1);
        assert_eq!(summary.through_count, 0);
        assert_relative_eq!(summary.max_depth_to_diameter, 6.0);
        assert_relative_eq!(summary.avg_depth_to_diameter, 6.0);
    }

    #[test]
    fn test_avg_and_max_over_blind_only() {
        let faces = vec![
            cyl(RawFace::cylinder(Axis::Z, [10.0, 10.0], 4.0, 30.0, 40.0)),
            cyl(RawFace::cylinder(Axis::Z, [30.0, 10.0], 4.0, 20.0, 40.0)),
            cyl(RawFace::cylinder(Axis::Z, [50.0, 10.0], 4.0, 0.0, 40.0)),
        ];
        let summary = detect_holes_in(faces, &envelope(), 0);

        assert_eq!(summary.blind_count, 2);
        assert_eq!(summary.through_count, 1);
        assert_relative_eq!(summary.avg_depth_to_diameter, 3.75);
        assert_relative_eq!(summary.max_depth_to_diameter, 5.0);
    }

    #[test]
    fn test_non_standard_counted_for_any_kind() {
        let faces = vec![
            cyl(RawFace::cylinder(Axis::Z, [10.0, 10.0], 7.3, 0.0, 40.0)),
            cyl(RawFace::cylinder(Axis::X, [30.0, 20.0], 23.0, 0.0, 20.0)),
        ];
        let summary = detect_holes_in(faces, &envelope(), 0);
        assert_eq!(summary.non_standard_count, 2);
        assert!(summary.non_standard_count <= summary.through_count + summary.blind_count);
    }

    #[test]
    fn test_split_half_faces_grouped_into_one_hole() {
        let full = RawFace::cylinder(Axis::Z, [20.0, 20.0], 8.0, 0.0, 40.0);
        let mut upper = full.clone();
        upper.bounds.min[1] = 20.0;
        let mut lower = full;
        lower.bounds.max[1] = 20.0;

        let summary = detect_holes_in(vec![cyl(upper), cyl(lower)], &envelope(), 0);
        assert_eq!(summary.through_count, 1);
        assert_relative_eq!(summary.holes[0].diameter, 8.0);
        assert_eq!(summary.non_standard_count, 0);
    }

    #[test]
    fn test_counterbore_not_merged() {
        let faces = vec![
            cyl(RawFace::cylinder(Axis::Z, [20.0, 20.0], 11.0, 34.0, 40.0)),
            cyl(RawFace::cylinder(Axis::Z, [20.0, 20.0], 6.6, 0.0, 34.0)),
        ];
        let summary = detect_holes_in(faces, &envelope(), 0);
        assert_eq!(summary.holes.len(), 2);
    }

    #[test]
    fn test_parallel_overlapping_holes_not_merged() {
        let faces = vec![
            cyl(RawFace::cylinder(Axis::Z, [20.0, 20.0], 6.0, 0.0, 40.0)),
            cyl(RawFace::cylinder(Axis::Z, [25.0, 20.0], 6.0, 0.0, 40.0)),
            cyl(RawFace::cylinder(Axis::Z, [50.0, 20.0], 6.0, 0.0, 40.0)),
            cyl(RawFace::cylinder(Axis::Z, [51.0, 21.0], 6.0, 0.0, 40.0)),
        ];
        let summary = detect_holes_in(faces, &envelope(), 0);
        assert_eq!(summary.through_count, 4);
        assert!(summary.holes.iter().all(|h| (h.diameter - 6.0).abs() < 1e-9));
    }

    #[test]
    fn test_stacked_segments_form_one_hole() {
        let faces = vec![
            cyl(RawFace::cylinder(Axis::Z, [20.0, 20.0], 6.0, 0.0, 20.0)),
            cyl(RawFace::cylinder(Axis::Z, [20.0, 20.0], 6.0, 20.0, 40.0)),
        ];
        let summary = detect_holes_in(faces, &envelope(), 0);
        assert_eq!(summary.through_count, 1);
    }

    #[test]
    fn test_hole_caps_its_bottom_face() {
        let faces = vec![cyl(RawFace::cylinder(Axis::Z, [20.0, 20.0], 8.0, 30.0, 40.0))];
        let hole = detect_holes_in(faces, &envelope(), 0).holes.remove(0);

        let bottom = |bounds: BoundingBox| PlanarFace {
            normal: Axis::Z,
            position: bounds.min_along(Axis::Z),
            bounds,
            reversed: false,
        };
        assert!(hole.caps(&bottom(BoundingBox::new([16.0, 16.0, 30.0], [24.0, 24.0, 30.0]))));
        // Wider than the bore
        assert!(!hole.caps(&bottom(BoundingBox::new([10.0, 10.0, 30.0], [30.0, 30.0, 30.0]))));
        // Inside the bore but not at an end
        assert!(!hole.caps(&bottom(BoundingBox::new([16.0, 16.0, 35.0], [24.0, 24.0, 35.0]))));
    }

    #[test]
    fn test_span_just_below_threshold_defaults_to_through() {
        // Envelope 40, threshold 36, tie band down to 35.6
        let (kind, tie) = classify_span(35.8, 5.0, 40.0, false);
        assert_eq!(kind, HoleKind::Through);
        assert!(tie);

        let (kind, tie) = classify_span(36.0, 5.0, 40.0, false);
        assert_eq!(kind, HoleKind::Through);
        assert!(!tie);

        let (kind, _) = classify_span(20.0, 5.0, 40.0, false);
        assert_eq!(kind, HoleKind::Blind);
    }

    #[test]
    fn test_ambiguous_inferred_axis_defaults_to_through() {
        let (kind, tie) = classify_span(6.1, 6.0, 40.0, true);
        assert_eq!(kind, HoleKind::Through);
        assert!(tie);

        let (kind, tie) = classify_span(6.1, 6.0, 40.0, false);
        assert_eq!(kind, HoleKind::Blind);
        assert!(!tie);
    }

    #[test]
    fn test_tie_break_penalizes_confidence() {
        let faces = vec![cyl(RawFace::cylinder(Axis::Z, [20.0, 20.0], 6.0, 4.2, 40.0))];
        let summary = detect_holes_in(faces, &envelope(), 0);
        assert_eq!(summary.through_count, 1);
        assert_eq!(summary.tie_breaks, 1);
        assert_eq!(summary.confidence, PENALIZED_HOLE_CONFIDENCE);
    }

    #[test]
    fn test_rejected_cylinders_penalize_confidence() {
        let faces = vec![cyl(RawFace::cylinder(Axis::Z, [20.0, 20.0], 6.0, 0.0, 40.0))];
        let summary = detect_holes_in(faces, &envelope(), 3);
        assert_eq!(summary.confidence, PENALIZED_HOLE_CONFIDENCE);
    }

    #[test]
    fn test_no_holes_zero_confidence() {
        let summary = detect_holes_in(Vec::new(), &envelope(), 2);
        assert_eq!(summary, HoleSummary::default());
    }

    #[test]
    fn test_detect_holes_on_solid_skips_bad_faces() {
        let solid = SolidDescription::block(100.0, 60.0, 40.0)
            .with_face(RawFace::cylinder(Axis::Z, [20.0, 20.0], 6.0, 0.0, 40.0))
            .with_face(RawFace::new(
                "CYLINDER",
                BoundingBox::new([0.0; 3], [f64::NAN, 1.0, 1.0]),
            ));

        let summary = detect_holes(&solid).unwrap();
        assert_eq!(summary.through_count, 1);
    }
}
