//! Source-located diagnostics for YAML and JSON input documents

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Syntax or shape error in an input document, pointing at the offending spot
#[derive(Debug, Error, Diagnostic)]
#[error("{message}")]
#[diagnostic(code(pquote::document::syntax))]
pub struct SyntaxError {
    #[source_code]
    src: NamedSource<String>,

    #[label("error here")]
    span: SourceSpan,

    #[help]
    help: Option<String>,

    message: String,
}

impl SyntaxError {
    /// Create an error from a serde_yml failure
    pub fn from_yaml(err: &serde_yml::Error, source: &str, filename: &str) -> Self {
        let (line, column) = err
            .location()
            .map(|loc| (loc.line(), loc.column()))
            .unwrap_or((1, 1));
        Self::at_location(err.to_string(), source, filename, line, column)
    }

    /// Create an error from a serde_json failure
    pub fn from_json(err: &serde_json::Error, source: &str, filename: &str) -> Self {
        let line = err.line().max(1);
        let column = err.column().max(1);
        Self::at_location(err.to_string(), source, filename, line, column)
    }

    pub fn at_location(
        message: impl Into<String>,
        source: &str,
        filename: &str,
        line: usize,
        column: usize,
    ) -> Self {
        let message = message.into();
        let offset = line_col_to_offset(source, line, column);

        Self {
            src: NamedSource::new(filename, source.to_string()),
            span: SourceSpan::from(offset..offset.saturating_add(1)),
            help: generate_help(&message),
            message,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Failure to load an input document
#[derive(Debug, Error, Diagnostic)]
pub enum DocumentError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Syntax(#[from] SyntaxError),

    #[error("cannot read {path}: {source}")]
    #[diagnostic(code(pquote::document::io))]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Convert 1-based line/column to a byte offset, clamped to the source
fn line_col_to_offset(source: &str, line: usize, column: usize) -> usize {
    let mut line_start = 0;
    for (i, l) in source.split_inclusive('\n').enumerate() {
        if i + 1 == line {
            let col_offset = l
                .char_indices()
                .nth(column.saturating_sub(1))
                .map(|(j, _)| j)
                .unwrap_or(l.len());
            return (line_start + col_offset).min(source.len());
        }
        line_start += l.len();
    }
    source.len()
}

/// Suggestions for the mistakes people make when hand-editing part files
fn generate_help(message: &str) -> Option<String> {
    let msg_lower = message.to_lowercase();

    if msg_lower.contains("missing field `bounding_box`") {
        return Some("A solid needs a bounding_box with min and max corners".to_string());
    }

    if msg_lower.contains("missing field `volume`") {
        return Some("A solid needs its exact volume in mm³".to_string());
    }

    if msg_lower.contains("missing field `type`") {
        return Some("Every face needs a geometry tag, e.g. type: PLANE or type: CYLINDER".to_string());
    }

    if msg_lower.contains("invalid length") {
        return Some("Points and directions are written as three numbers: [x, y, z]".to_string());
    }

    if msg_lower.contains("tab") {
        return Some(
            "YAML requires spaces for indentation, not tabs. Replace tabs with spaces.".to_string(),
        );
    }

    if msg_lower.contains("duplicate key") || msg_lower.contains("duplicate field") {
        return Some("Each key can only appear once. Remove or rename the duplicate key.".to_string());
    }

    if msg_lower.contains("trailing comma") {
        return Some("JSON does not allow a comma after the last item".to_string());
    }

    None
}
