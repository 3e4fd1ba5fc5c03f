//! Input document loading
//!
//! Solids, feature vectors and pricing artifacts are all read through here.
//! `.json` files are parsed as JSON, everything else as YAML.

use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;

use crate::core::diagnostics::{DocumentError, SyntaxError};

/// Whether a path should be parsed as JSON
pub fn is_json(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map_or(false, |e| e.eq_ignore_ascii_case("json"))
}

/// Parse document content; `filename` picks the format and labels diagnostics
pub fn parse_document<T: DeserializeOwned + 'static>(content: &str, filename: &str) -> Result<T, SyntaxError> {
    if is_json(Path::new(filename)) {
        serde_json::from_str(content).map_err(|e| SyntaxError::from_json(&e, content, filename))
    } else {
        serde_yml::from_str(content).map_err(|e| SyntaxError::from_yaml(&e, content, filename))
    }
}

/// Read and parse a document from disk
pub fn load_document<T: DeserializeOwned + 'static>(path: &Path) -> Result<T, DocumentError> {
    let content = fs::read_to_string(path).map_err(|source| DocumentError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let filename = path.display().to_string();
    Ok(parse_document(&content, &filename)?)
}
