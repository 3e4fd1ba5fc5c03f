//! Schema validation with source-located error reporting

use jsonschema::error::ValidationErrorKind;
use jsonschema::{validator_for, ValidationError as JsonSchemaError, Validator as JsonValidator};
use miette::{Diagnostic, NamedSource, SourceSpan};
use serde_json::Value as JsonValue;
use thiserror::Error;

/// Validation error with source location information
#[derive(Debug, Error, Diagnostic)]
#[error("Schema validation failed: {summary}")]
#[diagnostic(code(pquote::schema::validation_error))]
pub struct ValidationError {
    summary: String,

    #[source_code]
    src: NamedSource<String>,

    #[related]
    violations: Vec<SchemaViolation>,
}

/// A single schema violation
#[derive(Debug, Error, Diagnostic)]
#[error("{message}")]
pub struct SchemaViolation {
    #[label("{}", self.hint)]
    span: SourceSpan,

    message: String,
    hint: String,

    #[help]
    help: Option<String>,
}

impl SchemaViolation {
    pub fn new(message: String, hint: String, span: SourceSpan, help: Option<String>) -> Self {
        Self {
            span,
            message,
            hint,
            help,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl ValidationError {
    pub fn new(filename: &str, source: &str, violations: Vec<SchemaViolation>) -> Self {
        let count = violations.len();
        let summary = if count == 1 {
            "1 error".to_string()
        } else {
            format!("{} errors", count)
        };
        Self {
            summary,
            src: NamedSource::new(filename, source.to_string()),
            violations,
        }
    }

    pub fn violation_count(&self) -> usize {
        self.violations.len()
    }

    pub fn violations(&self) -> &[SchemaViolation] {
        &self.violations
    }
}

/// The embedded schema could not be found or compiled
#[derive(Debug, Error, Diagnostic)]
#[error("Schema '{name}' is unavailable: {reason}")]
#[diagnostic(code(pquote::schema::unavailable))]
pub struct SchemaUnavailable {
    pub name: String,
    pub reason: String,
}

/// A compiled schema
pub struct Validator {
    compiled: JsonValidator,
}

impl Validator {
    /// Compile an embedded schema by file name
    pub fn for_schema(name: &str) -> Result<Self, SchemaUnavailable> {
        let unavailable = |reason: String| SchemaUnavailable {
            name: name.to_string(),
            reason,
        };

        let text = super::schema_source(name)
            .ok_or_else(|| unavailable("not embedded in this build".to_string()))?;
        let schema: JsonValue =
            serde_json::from_str(&text).map_err(|e| unavailable(e.to_string()))?;
        let compiled = validator_for(&schema).map_err(|e| unavailable(e.to_string()))?;

        Ok(Self { compiled })
    }

    /// Validate a parsed document. `content` is the text it was parsed from
    /// and is only used to locate violations.
    pub fn validate(
        &self,
        value: &JsonValue,
        content: &str,
        filename: &str,
    ) -> Result<(), ValidationError> {
        let violations: Vec<SchemaViolation> = self
            .compiled
            .iter_errors(value)
            .map(|e| error_to_violation(content, &e))
            .collect();

        if violations.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::new(filename, content, violations))
        }
    }
}

/// Convert a JSON Schema validation error to our violation format
fn error_to_violation(content: &str, error: &JsonSchemaError) -> SchemaViolation {
    let path = error.instance_path.to_string();
    let message = format_schema_error(error);
    let hint = format_error_hint(error);
    let help = generate_help_message(error);

    SchemaViolation::new(message, hint, find_path_span(content, &path), help)
}

fn property_name(property: &JsonValue) -> String {
    property
        .as_str()
        .map(|s| s.to_string())
        .unwrap_or_else(|| property.to_string())
}

fn format_schema_error(error: &JsonSchemaError) -> String {
    let path = if error.instance_path.as_str().is_empty() {
        "document root".to_string()
    } else {
        format!("'{}'", error.instance_path)
    };

    match &error.kind {
        ValidationErrorKind::Required { property } => {
            format!("Missing required field: {} at {}", property_name(property), path)
        }
        ValidationErrorKind::Type { kind } => {
            format!("Wrong type at {}: expected {:?}", path, kind)
        }
        ValidationErrorKind::Minimum { limit } => {
            format!("Value at {} is too small: minimum {}", path, limit)
        }
        ValidationErrorKind::Maximum { limit } => {
            format!("Value at {} is too large: maximum {}", path, limit)
        }
        ValidationErrorKind::MinLength { limit } => {
            format!("Value at {} is too short: minimum {} characters", path, limit)
        }
        ValidationErrorKind::AdditionalProperties { unexpected } => {
            format!("Unknown field(s) at {}: {}", path, unexpected.join(", "))
        }
        _ => format!("Validation error at {}: {}", path, error),
    }
}

fn format_error_hint(error: &JsonSchemaError) -> String {
    match &error.kind {
        ValidationErrorKind::Required { .. } => "required field missing",
        ValidationErrorKind::Type { .. } => "wrong type",
        ValidationErrorKind::Minimum { .. } | ValidationErrorKind::Maximum { .. } => "out of range",
        ValidationErrorKind::MinLength { .. } => "too short",
        ValidationErrorKind::AdditionalProperties { .. } => "unknown field",
        _ => "validation error",
    }
    .to_string()
}

fn generate_help_message(error: &JsonSchemaError) -> Option<String> {
    match &error.kind {
        ValidationErrorKind::Required { property } => Some(format!(
            "Add the '{}' field; pricing artifacts must be complete and are never defaulted",
            property_name(property)
        )),
        ValidationErrorKind::Type { kind } => Some(format!("Expected value of type: {:?}", kind)),
        ValidationErrorKind::AdditionalProperties { unexpected } => {
            if unexpected.len() == 1 {
                Some(format!(
                    "Remove the '{}' field or check spelling against the ten pricing features",
                    unexpected[0]
                ))
            } else {
                Some("Remove unknown fields or check spelling".to_string())
            }
        }
        _ => None,
    }
}

/// Find the span for a JSON pointer in YAML or JSON content
fn find_path_span(content: &str, json_path: &str) -> SourceSpan {
    let parts: Vec<&str> = json_path.split('/').filter(|s| !s.is_empty()).collect();

    if let Some(key) = parts.last() {
        if let Some(span) = find_key_span(content, key) {
            return span;
        }
    }

    let len = content.find('\n').unwrap_or(content.len()).max(1);
    (0, len).into()
}

/// Find the span of a key, written either as `key:` or `"key":`
fn find_key_span(content: &str, key: &str) -> Option<SourceSpan> {
    let yaml_pattern = format!("{}:", key);
    let json_pattern = format!("\"{}\"", key);

    let mut offset = 0;
    for line in content.lines() {
        let trimmed = line.trim_start();
        if trimmed.starts_with(&yaml_pattern) || trimmed.starts_with(&json_pattern) {
            let key_start = offset + (line.len() - trimmed.len());
            return Some((key_start, trimmed.len().max(1)).into());
        }
        offset += line.len() + 1;
    }

    // Single-line JSON
    content
        .find(&json_pattern)
        .map(|start| (start, json_pattern.len()).into())
}
