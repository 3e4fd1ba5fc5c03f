//! Design-for-manufacturing rules
//!
//! A pure function over the feature vector. Rules are evaluated in a fixed
//! order (deep hole, small feature, non-standard holes, pocket corners) and
//! every triggered rule emits its issue; none suppresses another.

use crate::core::{DfmIssue, PartFeatures, Severity};

/// Blind hole depth:diameter at or above which drilling is critical
pub const DEEP_HOLE_CRITICAL_RATIO: f64 = 6.0;

/// Blind hole depth:diameter at or above which drilling is a warning
pub const DEEP_HOLE_WARNING_RATIO: f64 = 5.0;

/// Smallest hole diameter (mm) machinable in metal with standard tooling
pub const MIN_FEATURE_SIZE: f64 = 0.9;

/// Evaluate every rule against a feature vector
pub fn evaluate(features: &PartFeatures) -> Vec<DfmIssue> {
    let mut issues = Vec::new();

    issues.extend(check_deep_holes(features));
    issues.extend(check_small_features(features));
    issues.extend(check_non_standard_holes(features));
    issues.extend(check_pocket_corners(features));

    for issue in &issues {
        tracing::warn!("DFM {}: {}", issue.severity, issue.message);
    }
    issues
}

fn check_deep_holes(features: &PartFeatures) -> Option<DfmIssue> {
    if features.blind_hole_count == 0 {
        return None;
    }
    let ratio = features.blind_hole_max_depth_to_diameter;

    if ratio >= DEEP_HOLE_CRITICAL_RATIO {
        Some(DfmIssue::new(
            Severity::Critical,
            format!(
                "Very deep blind hole detected (depth/diameter ratio: {:.1}). \
                 Ratios of 6 and above require special tooling and may not be manufacturable.",
                ratio
            ),
        ))
    } else if ratio >= DEEP_HOLE_WARNING_RATIO {
        Some(DfmIssue::new(
            Severity::Warning,
            format!(
                "Deep blind hole detected (depth/diameter ratio: {:.1}). \
                 Ratios between 5 and 6 are challenging to drill and may increase cost.",
                ratio
            ),
        ))
    } else {
        None
    }
}

fn check_small_features(features: &PartFeatures) -> Option<DfmIssue> {
    let smallest = features.min_hole_diameter;
    if features.hole_count() == 0 || smallest <= 0.0 || smallest >= MIN_FEATURE_SIZE {
        return None;
    }

    Some(DfmIssue::new(
        Severity::Critical,
        format!(
            "Small feature detected (smallest hole diameter: {:.2} mm). \
             Features below 0.9 mm cannot be machined reliably in metal.",
            smallest
        ),
    ))
}

fn check_non_standard_holes(features: &PartFeatures) -> Option<DfmIssue> {
    if features.non_standard_hole_count == 0 {
        return None;
    }

    Some(DfmIssue::new(
        Severity::Info,
        format!(
            "Part contains {} non-standard hole(s). Non-standard sizes may require custom tooling.",
            features.non_standard_hole_count
        ),
    ))
}

/// Corner radii are not detected, so any pocket is flagged for review
fn check_pocket_corners(features: &PartFeatures) -> Option<DfmIssue> {
    if features.pocket_count == 0 {
        return None;
    }

    Some(DfmIssue::new(
        Severity::Warning,
        format!(
            "Part contains {} pocket(s). Internal corner radii are unknown - needs manual review.",
            features.pocket_count
        ),
    ))
}
