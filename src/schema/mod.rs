//! Embedded JSON schemas and validation

pub mod validator;

pub use validator::{SchemaUnavailable, SchemaViolation, ValidationError, Validator};

use rust_embed::Embed;

#[derive(Embed)]
#[folder = "schemas/"]
struct EmbeddedSchemas;

/// Schema of the trained pricing artifact
pub const PRICING_CONFIG_SCHEMA: &str = "pricing_config.schema.json";

/// Source text of an embedded schema
pub fn schema_source(name: &str) -> Option<String> {
    EmbeddedSchemas::get(name).map(|file| String::from_utf8_lossy(&file.data).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pricing_schema_embedded() {
        let source = schema_source(PRICING_CONFIG_SCHEMA).unwrap();
        let schema: serde_json::Value = serde_json::from_str(&source).unwrap();
        assert_eq!(schema["required"].as_array().unwrap().len(), 7);
    }
}
