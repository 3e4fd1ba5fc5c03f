//! Markdown report sections shared by the commands

use console::style;
use tabled::{builder::Builder, settings::Style};

use crate::core::{DfmIssue, FeatureConfidence, PartFeatures, QuoteResult};
use crate::features::{ConfidenceBand, Hole, Pocket};
use crate::pricing::evaluate::{Evaluation, EvaluationSummary};

fn table(header: &[&str], rows: Vec<Vec<String>>) -> String {
    let mut builder = Builder::default();
    builder.push_record(header.iter().map(|h| h.to_string()));
    for row in rows {
        builder.push_record(row);
    }
    builder.build().with(Style::markdown()).to_string()
}

/// Section heading: bold on a styled terminal, a markdown heading otherwise
pub fn heading(title: &str, styled: bool) -> String {
    if styled {
        style(title).bold().underlined().to_string()
    } else {
        format!("## {}", title)
    }
}

/// Review notes as a markdown list
pub fn notes_list(notes: &[String]) -> String {
    notes.iter().map(|n| format!("- {}\n", n)).collect()
}

pub fn features_table(features: &PartFeatures) -> String {
    let rows = vec![
        vec![
            "Bounding box".to_string(),
            format!(
                "{:.1} × {:.1} × {:.1} mm",
                features.bounding_box_x, features.bounding_box_y, features.bounding_box_z
            ),
        ],
        vec!["Volume".to_string(), format!("{:.1} mm³", features.volume)],
        vec![
            "Through holes".to_string(),
            features.through_hole_count.to_string(),
        ],
        vec!["Blind holes".to_string(), features.blind_hole_count.to_string()],
        vec![
            "Blind depth:diameter (avg / max)".to_string(),
            format!(
                "{:.2} / {:.2}",
                features.blind_hole_avg_depth_to_diameter, features.blind_hole_max_depth_to_diameter
            ),
        ],
        vec![
            "Non-standard holes".to_string(),
            features.non_standard_hole_count.to_string(),
        ],
        vec!["Pockets".to_string(), features.pocket_count.to_string()],
        vec![
            "Pocket depth (avg / max)".to_string(),
            format!(
                "{:.1} / {:.1} mm",
                features.pocket_avg_depth, features.pocket_max_depth
            ),
        ],
        vec![
            "Pocket volume (approx.)".to_string(),
            format!("{:.1} mm³", features.pocket_total_volume),
        ],
    ];
    table(&["Feature", "Value"], rows)
}

pub fn confidence_table(confidence: &FeatureConfidence) -> String {
    let rows = confidence
        .entries()
        .iter()
        .map(|(name, value)| {
            vec![
                name.replace('_', " "),
                format!("{:.0}%", value * 100.0),
                ConfidenceBand::of(*value).to_string(),
            ]
        })
        .collect();
    table(&["Family", "Confidence", "Band"], rows)
}

pub fn holes_table(holes: &[Hole]) -> String {
    let rows = holes
        .iter()
        .map(|h| {
            vec![
                h.axis.to_string(),
                format!("{:.2}", h.diameter),
                format!("{:.2}", h.depth),
                h.kind.to_string(),
                if h.standard { "yes" } else { "no" }.to_string(),
            ]
        })
        .collect();
    table(&["Axis", "Diameter (mm)", "Depth (mm)", "Kind", "Standard"], rows)
}

pub fn pockets_table(pockets: &[Pocket]) -> String {
    let rows = pockets
        .iter()
        .map(|p| {
            vec![
                format!("{:.2}", p.floor_z),
                format!("{:.2}", p.depth),
                p.band.to_string(),
                format!("{:.1}", p.volume),
            ]
        })
        .collect();
    table(&["Floor z (mm)", "Depth (mm)", "Band", "Volume (mm³)"], rows)
}

pub fn dfm_table(issues: &[DfmIssue]) -> String {
    let rows = issues
        .iter()
        .map(|i| vec![i.severity.to_string(), i.message.clone()])
        .collect();
    table(&["Severity", "Issue"], rows)
}

pub fn quote_table(quote: &QuoteResult) -> String {
    let mut rows: Vec<Vec<String>> = quote
        .breakdown
        .entries()
        .iter()
        .map(|(name, value)| vec![name.replace('_', " "), format!("€{:.2}", value)])
        .collect();
    rows.push(vec!["quantity".to_string(), quote.quantity.to_string()]);
    rows.push(vec![
        "price per unit".to_string(),
        format!("€{:.2}", quote.price_per_unit),
    ]);
    rows.push(vec![
        "total price".to_string(),
        format!("€{:.2}", quote.total_price),
    ]);
    table(&["Item", "Amount"], rows)
}

pub fn evaluation_table(evaluation: &Evaluation) -> String {
    let rows = evaluation
        .samples
        .iter()
        .map(|s| {
            let flag = match s.error_percent.abs() {
                e if e > 20.0 => " HIGH",
                e if e > 10.0 => " !",
                _ => "",
            };
            vec![
                s.name.clone(),
                s.quantity.to_string(),
                format!("€{:.2}", s.actual_price_per_unit),
                format!("€{:.2}", s.predicted_price_per_unit),
                format!("€{:.2}", s.error),
                format!("{:.1}%{}", s.error_percent, flag),
            ]
        })
        .collect();
    table(
        &["Part", "Qty", "Actual", "Predicted", "Error", "Error %"],
        rows,
    )
}

pub fn evaluation_summary(summary: &EvaluationSummary) -> String {
    let mut out = String::new();
    out.push_str(&format!("- **Parts tested:** {}\n", summary.tested));
    if summary.skipped > 0 {
        out.push_str(&format!("- **Parts skipped:** {}\n", summary.skipped));
    }
    out.push_str(&format!(
        "- **Mean absolute error:** €{:.2}\n",
        summary.mean_absolute_error
    ));
    out.push_str(&format!(
        "- **Mean absolute percentage error:** {:.1}%\n",
        summary.mean_absolute_percent_error
    ));
    out.push_str(&format!(
        "- **Error range:** {:.1}% to {:.1}%\n",
        summary.min_absolute_percent_error, summary.max_absolute_percent_error
    ));
    out.push_str(&format!(
        "- **Above 10% / 20%:** {} / {}\n",
        summary.over_10_percent, summary.over_20_percent
    ));
    out.push_str(&format!("- **Verdict:** {}\n", summary.accuracy.advice()));
    out
}
