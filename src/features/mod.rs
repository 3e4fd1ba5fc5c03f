//! Feature extraction: face classification, hole and pocket detection and
//! confidence scoring, folded into one [`PartFeatures`] vector.

pub mod confidence;
pub mod face;
pub mod holes;
pub mod pockets;

pub use confidence::{score, ConfidenceBand};
pub use face::{classify, classify_all, ClassifiedFaces, FaceDescriptor, FaceGeometryType};
pub use holes::{detect_holes, Hole, HoleKind, HoleSummary};
pub use pockets::{detect_pockets, DepthBand, Pocket, PocketSummary};

use serde::Serialize;

use crate::core::limits::check_bounding_box;
use crate::core::{FeatureConfidence, PartFeatures, QuoteError};
use crate::geometry::{GeometryError, Solid};

/// Signals that the part needs an engineer to look at it
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReviewFlags {
    /// Faces outside detection scope (freeform, oblique, fillets, stock curves)
    pub unrecognized_faces: usize,
    /// Faces skipped because their data was malformed
    pub skipped_faces: usize,
    /// A through/blind decision fell back to the through default
    pub tie_break_applied: bool,
}

impl ReviewFlags {
    pub fn needs_review(&self) -> bool {
        self.unrecognized_faces > 0 || self.skipped_faces > 0 || self.tie_break_applied
    }

    /// Human readable review notes, empty when nothing needs attention
    pub fn notes(&self) -> Vec<String> {
        let mut notes = Vec::new();
        if self.unrecognized_faces > 0 {
            notes.push(format!(
                "{} face(s) outside detection scope (curved, freeform, fillet or chamfer) - needs manual review",
                self.unrecognized_faces
            ));
        }
        if self.skipped_faces > 0 {
            notes.push(format!(
                "{} face(s) could not be analysed and were skipped",
                self.skipped_faces
            ));
        }
        if self.tie_break_applied {
            notes.push(
                "Ambiguous hole depth counted as through hole - blind holes may be under-reported"
                    .to_string(),
            );
        }
        notes
    }
}

/// Everything feature extraction knows about a part
#[derive(Debug, Clone, Serialize)]
pub struct FeatureExtraction {
    pub features: PartFeatures,
    pub confidence: FeatureConfidence,
    pub review: ReviewFlags,
    pub holes: Vec<Hole>,
    pub pockets: Vec<Pocket>,
}

/// Run the detectors over a solid.
///
/// The envelope limit is checked before any face is looked at. Individually
/// malformed faces are skipped; a solid where no face at all can be analysed
/// is a geometry analysis failure.
pub fn extract_features(solid: &dyn Solid) -> Result<FeatureExtraction, QuoteError> {
    let bbox = solid.bounding_box()?;
    check_bounding_box(&bbox)?;

    let volume = solid.volume()?;
    let classified = classify_all(&solid.faces()?);

    let total = classified.total();
    if total > 0 && classified.malformed == total {
        return Err(GeometryError::NoAnalysableFaces(total).into());
    }

    let holes = holes::detect_holes_in(classified.cylindrical, &bbox, classified.out_of_range);
    let pockets = pockets::detect_pockets_in(&classified.planar, &bbox, &holes.holes);

    let [x, y, z] = bbox.extents();
    let features = PartFeatures {
        bounding_box_x: x,
        bounding_box_y: y,
        bounding_box_z: z,
        volume,
        through_hole_count: holes.through_count,
        blind_hole_count: holes.blind_count,
        blind_hole_avg_depth_to_diameter: holes.avg_depth_to_diameter,
        blind_hole_max_depth_to_diameter: holes.max_depth_to_diameter,
        pocket_count: pockets.count,
        pocket_total_volume: pockets.total_volume,
        pocket_avg_depth: pockets.avg_depth,
        pocket_max_depth: pockets.max_depth,
        non_standard_hole_count: holes.non_standard_count,
        min_hole_diameter: holes.min_diameter,
    };

    let confidence = score(&holes, &pockets);
    let review = ReviewFlags {
        unrecognized_faces: classified.unrecognized + classified.out_of_range,
        skipped_faces: classified.malformed,
        tie_break_applied: holes.tie_breaks > 0,
    };

    tracing::info!(
        "features: {} through, {} blind, {} non-standard, {} pocket(s) from {} face(s)",
        features.through_hole_count,
        features.blind_hole_count,
        features.non_standard_hole_count,
        features.pocket_count,
        total
    );

    Ok(FeatureExtraction {
        features,
        confidence,
        review,
        holes: holes.holes,
        pockets: pockets.pockets,
    })
}

/// Partition `items` into connected groups under `linked`.
///
/// Groups are ordered by their first member and members keep input order.
pub(crate) fn group_connected<T>(items: &[T], linked: impl Fn(&T, &T) -> bool) -> Vec<Vec<usize>> {
    let mut parent: Vec<usize> = (0..items.len()).collect();

    fn root(parent: &mut [usize], mut i: usize) -> usize {
        while parent[i] != i {
            parent[i] = parent[parent[i]];
            i = parent[i];
        }
        i
    }

    for i in 0..items.len() {
        for j in (i + 1)..items.len() {
            if linked(&items[i], &items[j]) {
                let (a, b) = (root(&mut parent, i), root(&mut parent, j));
                if a != b {
                    parent[a.max(b)] = a.min(b);
                }
            }
        }
    }

    let mut groups: Vec<Vec<usize>> = Vec::new();
    let mut slot_of_root = vec![usize::MAX; items.len()];
    for i in 0..items.len() {
        let r = root(&mut parent, i);
        if slot_of_root[r] == usize::MAX {
            slot_of_root[r] = groups.len();
            groups.push(Vec::new());
        }
        groups[slot_of_root[r]].push(i);
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Axis, BoundingBox, RawFace, SolidDescription};
    use approx::assert_relative_eq;

    struct FailingFaces(BoundingBox);

    impl Solid for FailingFaces {
        fn bounding_box(&self) -> Result<BoundingBox, GeometryError> {
            Ok(self.0)
        }
        fn volume(&self) -> Result<f64, GeometryError> {
            Ok(1.0)
        }
        fn faces(&self) -> Result<Vec<RawFace>, GeometryError> {
            Err(GeometryError::FaceQuery("topology explorer failed".into()))
        }
    }

    #[test]
    fn test_group_connected_transitive() {
        let items = [1, 2, 10, 3, 11];
        let groups = group_connected(&items, |a: &i32, b: &i32| (a - b).abs() == 1);
        assert_eq!(groups, vec![vec![0, 1, 3], vec![2, 4]]);
    }

    #[test]
    fn test_featureless_block() {
        let solid = SolidDescription::block(10.0, 20.0, 30.0);
        let extraction = extract_features(&solid).unwrap();
        let f = &extraction.features;

        assert_relative_eq!(f.volume, 6000.0, epsilon = 1.0);
        assert_eq!(
            (f.bounding_box_x, f.bounding_box_y, f.bounding_box_z),
            (10.0, 20.0, 30.0)
        );
        assert_eq!(f.hole_count(), 0);
        assert_eq!(f.pocket_count, 0);
        assert_eq!(f.pocket_total_volume, 0.0);
        assert_eq!(f.blind_hole_max_depth_to_diameter, 0.0);
        assert_eq!(f.non_standard_hole_count, 0);
        assert_eq!(extraction.confidence.bounding_box, 1.0);
        assert_eq!(extraction.confidence.volume, 1.0);
        assert!(!extraction.review.needs_review());
    }

    #[test]
    fn test_two_standard_through_holes() {
        let solid = SolidDescription::block(80.0, 40.0, 20.0)
            .with_face(RawFace::cylinder(Axis::Z, [20.0, 20.0], 6.0, 0.0, 20.0))
            .with_face(RawFace::cylinder(Axis::Z, [60.0, 20.0], 6.0, 0.0, 20.0));

        let extraction = extract_features(&solid).unwrap();
        assert_eq!(extraction.features.through_hole_count, 2);
        assert_eq!(extraction.features.non_standard_hole_count, 0);
        assert_relative_eq!(extraction.features.min_hole_diameter, 6.0);
        assert_eq!(extraction.confidence.through_holes, holes::HOLE_CONFIDENCE);
        assert_eq!(extraction.holes.len(), 2);
    }

    #[test]
    fn test_blind_hole_with_flat_bottom() {
        let bottom = RawFace::plane(
            BoundingBox::new([16.0, 16.0, 30.0], [24.0, 24.0, 30.0]),
            Axis::Z,
        );
        let solid = SolidDescription::block(100.0, 60.0, 40.0)
            .with_face(RawFace::cylinder(Axis::Z, [20.0, 20.0], 8.0, 30.0, 40.0))
            .with_face(bottom);

        let extraction = extract_features(&solid).unwrap();
        assert_eq!(extraction.features.blind_hole_count, 1);
        assert_eq!(extraction.features.pocket_count, 0);
        assert_eq!(extraction.features.pocket_total_volume, 0.0);
        assert_eq!(extraction.confidence.pockets, 0.0);
    }

    #[test]
    fn test_oversize_part_rejected_before_faces() {
        let solid = FailingFaces(BoundingBox::from_size(700.0, 100.0, 100.0));
        assert!(matches!(
            extract_features(&solid),
            Err(QuoteError::BoundingBoxLimit { .. })
        ));
    }

    #[test]
    fn test_face_query_failure_is_geometry_error() {
        let solid = FailingFaces(BoundingBox::from_size(10.0, 10.0, 10.0));
        assert!(matches!(
            extract_features(&solid),
            Err(QuoteError::GeometryAnalysis(GeometryError::FaceQuery(_)))
        ));
    }

    #[test]
    fn test_all_faces_malformed() {
        let bad = RawFace::new("PLANE", BoundingBox::new([0.0; 3], [f64::INFINITY, 1.0, 1.0]));
        let mut solid = SolidDescription::new(BoundingBox::from_size(10.0, 10.0, 10.0), 1000.0);
        solid.faces = vec![bad.clone(), bad];

        assert!(matches!(
            extract_features(&solid),
            Err(QuoteError::GeometryAnalysis(GeometryError::NoAnalysableFaces(2)))
        ));
    }

    #[test]
    fn test_review_flags_for_out_of_scope_faces() {
        let fillet = RawFace::cylinder(Axis::X, [0.2, 0.2], 0.4, 0.0, 50.0);
        let sphere = RawFace::new("SPHERE", BoundingBox::new([1.0; 3], [3.0; 3]));
        let solid = SolidDescription::block(50.0, 20.0, 20.0)
            .with_face(fillet)
            .with_face(sphere);

        let extraction = extract_features(&solid).unwrap();
        assert_eq!(extraction.review.unrecognized_faces, 2);
        assert!(extraction.review.needs_review());
        assert_eq!(extraction.review.notes().len(), 1);
        assert_eq!(extraction.features.hole_count(), 0);
    }

    #[test]
    fn test_extraction_is_idempotent() {
        let solid = SolidDescription::block(100.0, 60.0, 40.0)
            .with_face(RawFace::cylinder(Axis::Z, [20.0, 20.0], 5.0, 10.0, 40.0))
            .with_face(RawFace::plane(
                BoundingBox::new([50.0, 10.0, 30.0], [80.0, 30.0, 30.0]),
                Axis::Z,
            ));

        let first = extract_features(&solid).unwrap();
        let second = extract_features(&solid).unwrap();
        assert_eq!(
            serde_json::to_string(&first.features).unwrap(),
            serde_json::to_string(&second.features).unwrap()
        );
        assert_eq!(first.confidence, second.confidence);
    }

    #[test]
    fn test_blind_ratio_zero_iff_no_blind_holes() {
        let solid = SolidDescription::block(100.0, 60.0, 40.0)
            .with_face(RawFace::cylinder(Axis::Z, [20.0, 20.0], 6.0, 0.0, 40.0));
        let f = extract_features(&solid).unwrap().features;
        assert_eq!(f.blind_hole_count, 0);
        assert_eq!(f.blind_hole_avg_depth_to_diameter, 0.0);

        let solid = SolidDescription::block(100.0, 60.0, 40.0)
            .with_face(RawFace::cylinder(Axis::Z, [20.0, 20.0], 6.0, 28.0, 40.0));
        let f = extract_features(&solid).unwrap().features;
        assert_eq!(f.blind_hole_count, 1);
        assert!(f.blind_hole_avg_depth_to_diameter > 0.0);
    }
}
