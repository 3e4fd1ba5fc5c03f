//! Model evaluation against known prices
//!
//! Samples come from a CSV with `name`, `quantity`, `actual_price_per_unit`
//! and one column per pricing feature. Each sample is quoted with the
//! production engine and compared with the price actually charged.

use csv::{ReaderBuilder, StringRecord};
use miette::Diagnostic;
use serde::Serialize;
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;
use thiserror::Error;

use super::config::{PricingConfig, PRICING_FEATURES};
use super::engine::calculate_quote;
use crate::core::{PartFeatures, QuoteError};

const REQUIRED_COLUMNS: [&str; 3] = ["name", "quantity", "actual_price_per_unit"];

#[derive(Debug, Error, Diagnostic)]
pub enum EvaluationError {
    #[error("Cannot read samples from {path}: {message}")]
    #[diagnostic(code(pquote::evaluate::io))]
    Io { path: String, message: String },

    #[error("Sample file is missing column(s): {}", .0.join(", "))]
    #[diagnostic(
        code(pquote::evaluate::missing_column),
        help("Expected name, quantity, actual_price_per_unit and the ten pricing feature columns")
    )]
    MissingColumns(Vec<String>),

    #[error("Row {row}: {message}")]
    #[diagnostic(code(pquote::evaluate::row))]
    Row { row: usize, message: String },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Quote(#[from] QuoteError),
}

/// A part with the price it was actually sold for
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSample {
    pub name: String,
    pub quantity: i64,
    pub actual_price_per_unit: f64,
    pub features: PartFeatures,
}

/// Prediction vs actual for one sample
#[derive(Debug, Clone, Serialize)]
pub struct SampleEvaluation {
    pub name: String,
    pub quantity: u32,
    pub actual_price_per_unit: f64,
    pub predicted_price_per_unit: f64,
    /// predicted - actual
    pub error: f64,
    /// Signed error relative to the actual price, 0 when the actual price is 0
    pub error_percent: f64,
}

/// Coarse rating of a model by its mean absolute percentage error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Accuracy {
    Excellent,
    Good,
    Acceptable,
    Poor,
    VeryPoor,
}

impl Accuracy {
    pub fn from_mape(mape: f64) -> Self {
        match mape {
            m if m < 5.0 => Accuracy::Excellent,
            m if m < 10.0 => Accuracy::Good,
            m if m < 15.0 => Accuracy::Acceptable,
            m if m < 25.0 => Accuracy::Poor,
            _ => Accuracy::VeryPoor,
        }
    }

    pub fn advice(&self) -> &'static str {
        match self {
            Accuracy::Excellent => "Excellent accuracy, model is production-ready",
            Accuracy::Good => "Good accuracy, suitable for production use",
            Accuracy::Acceptable => "Acceptable accuracy, consider adding more training data",
            Accuracy::Poor => "Poor accuracy, add more diverse training data",
            Accuracy::VeryPoor => "Very poor accuracy, check training data quality",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct EvaluationSummary {
    pub tested: usize,
    pub skipped: usize,
    /// Mean absolute error in EUR per unit
    pub mean_absolute_error: f64,
    /// Mean absolute percentage error
    pub mean_absolute_percent_error: f64,
    pub max_absolute_percent_error: f64,
    pub min_absolute_percent_error: f64,
    pub over_10_percent: usize,
    pub over_20_percent: usize,
    pub accuracy: Accuracy,
}

#[derive(Debug, Clone, Serialize)]
pub struct Evaluation {
    pub samples: Vec<SampleEvaluation>,
    /// Samples that could not be quoted, with the reason
    pub skipped: Vec<(String, String)>,
    /// `None` when no sample could be quoted
    pub summary: Option<EvaluationSummary>,
}

/// Read samples from a CSV file
pub fn read_samples(path: &Path) -> Result<Vec<PriceSample>, EvaluationError> {
    let file = std::fs::File::open(path).map_err(|e| EvaluationError::Io {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    read_samples_from(std::io::BufReader::new(file))
}

/// Read samples from any CSV source
pub fn read_samples_from<R: Read>(reader: R) -> Result<Vec<PriceSample>, EvaluationError> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr
        .headers()
        .map_err(|e| EvaluationError::Row {
            row: 1,
            message: e.to_string(),
        })?
        .clone();
    let header_map = build_header_map(&headers);

    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .chain(PRICING_FEATURES.iter())
        .filter(|c| !header_map.contains_key(**c))
        .map(|c| c.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(EvaluationError::MissingColumns(missing));
    }

    let mut samples = Vec::new();
    for (row_idx, result) in rdr.records().enumerate() {
        let row = row_idx + 2; // 1-indexed, after the header
        let record = result.map_err(|e| EvaluationError::Row {
            row,
            message: e.to_string(),
        })?;
        samples.push(parse_sample(&record, &header_map, row)?);
    }

    tracing::debug!("read {} price sample(s)", samples.len());
    Ok(samples)
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(i, h)| (h.to_lowercase(), i))
        .collect()
}

fn field<'a>(record: &'a StringRecord, header_map: &HashMap<String, usize>, name: &str) -> &'a str {
    header_map
        .get(name)
        .and_then(|&i| record.get(i))
        .unwrap_or("")
}

fn parse_sample(
    record: &StringRecord,
    header_map: &HashMap<String, usize>,
    row: usize,
) -> Result<PriceSample, EvaluationError> {
    let number = |name: &str| -> Result<f64, EvaluationError> {
        let raw = field(record, header_map, name);
        raw.parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| EvaluationError::Row {
                row,
                message: format!("'{}' is not a number: '{}'", name, raw),
            })
    };
    let count = |name: &str| -> Result<u32, EvaluationError> {
        let value = number(name)?;
        if value < 0.0 || value.fract() != 0.0 || value > u32::MAX as f64 {
            return Err(EvaluationError::Row {
                row,
                message: format!("'{}' must be a whole non-negative count", name),
            });
        }
        Ok(value as u32)
    };

    let quantity_raw = field(record, header_map, "quantity");
    let quantity = quantity_raw.parse::<i64>().map_err(|_| EvaluationError::Row {
        row,
        message: format!("'quantity' is not an integer: '{}'", quantity_raw),
    })?;

    let features = PartFeatures {
        volume: number("volume")?,
        through_hole_count: count("through_hole_count")?,
        blind_hole_count: count("blind_hole_count")?,
        blind_hole_avg_depth_to_diameter: number("blind_hole_avg_depth_to_diameter")?,
        blind_hole_max_depth_to_diameter: number("blind_hole_max_depth_to_diameter")?,
        pocket_count: count("pocket_count")?,
        pocket_total_volume: number("pocket_total_volume")?,
        pocket_avg_depth: number("pocket_avg_depth")?,
        pocket_max_depth: number("pocket_max_depth")?,
        non_standard_hole_count: count("non_standard_hole_count")?,
        ..Default::default()
    };

    Ok(PriceSample {
        name: field(record, header_map, "name").to_string(),
        quantity,
        actual_price_per_unit: number("actual_price_per_unit")?,
        features,
    })
}

/// Quote every sample and compare with the actual price.
///
/// An untrained model aborts the evaluation; any other quoting error skips
/// just that sample.
pub fn evaluate_samples(
    samples: &[PriceSample],
    config: &PricingConfig,
) -> Result<Evaluation, EvaluationError> {
    let mut evaluated = Vec::new();
    let mut skipped = Vec::new();

    for sample in samples {
        match calculate_quote(&sample.features, sample.quantity, config) {
            Ok(quote) => {
                let actual = sample.actual_price_per_unit;
                let error = quote.price_per_unit - actual;
                let error_percent = if actual > 0.0 {
                    error / actual * 100.0
                } else {
                    0.0
                };
                evaluated.push(SampleEvaluation {
                    name: sample.name.clone(),
                    quantity: quote.quantity,
                    actual_price_per_unit: actual,
                    predicted_price_per_unit: quote.price_per_unit,
                    error,
                    error_percent,
                });
            }
            Err(QuoteError::ModelNotReady) => return Err(QuoteError::ModelNotReady.into()),
            Err(e) => {
                tracing::warn!("skipping sample {}: {}", sample.name, e);
                skipped.push((sample.name.clone(), e.to_string()));
            }
        }
    }

    let summary = summarize(&evaluated, skipped.len());
    Ok(Evaluation {
        samples: evaluated,
        skipped,
        summary,
    })
}

fn summarize(evaluated: &[SampleEvaluation], skipped: usize) -> Option<EvaluationSummary> {
    if evaluated.is_empty() {
        return None;
    }

    let n = evaluated.len() as f64;
    let abs_pct: Vec<f64> = evaluated.iter().map(|s| s.error_percent.abs()).collect();
    let mape = abs_pct.iter().sum::<f64>() / n;

    Some(EvaluationSummary {
        tested: evaluated.len(),
        skipped,
        mean_absolute_error: evaluated.iter().map(|s| s.error.abs()).sum::<f64>() / n,
        mean_absolute_percent_error: mape,
        max_absolute_percent_error: abs_pct.iter().copied().fold(0.0, f64::max),
        min_absolute_percent_error: abs_pct.iter().copied().fold(f64::INFINITY, f64::min),
        over_10_percent: abs_pct.iter().filter(|&&e| e > 10.0).count(),
        over_20_percent: abs_pct.iter().filter(|&&e| e > 20.0).count(),
        accuracy: Accuracy::from_mape(mape),
    })
}
