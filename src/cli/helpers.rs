//! Shared helper functions for CLI commands

use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::loader::load_document;
use crate::core::Settings;
use crate::geometry::SolidDescription;
use crate::pricing::PricingConfig;

/// Read a solid summary exported by a geometry provider
pub fn load_solid(path: &Path) -> Result<SolidDescription> {
    Ok(load_document(path)?)
}

/// Label shown for a solid: its name if present, else the file name
pub fn solid_label(solid: &SolidDescription, path: &Path) -> String {
    solid.name.clone().unwrap_or_else(|| {
        path.file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string())
    })
}

/// Pricing artifact path: the command-line flag wins over settings
pub fn pricing_config_path(flag: Option<&PathBuf>, settings: &Settings) -> PathBuf {
    flag.cloned()
        .unwrap_or_else(|| settings.pricing_config_path())
}

/// Load the pricing artifact a command should use
pub fn load_pricing_config(flag: Option<&PathBuf>, settings: &Settings) -> Result<PricingConfig> {
    let path = pricing_config_path(flag, settings);
    Ok(PricingConfig::load(&path)?)
}

/// Effective output format after applying the configured default
pub fn output_format(global: &GlobalOpts, settings: &Settings) -> OutputFormat {
    global.format.or_default(settings.default_format.as_deref())
}

/// Print a value as YAML or JSON. Returns false for report formats.
pub fn print_serialized<T: Serialize>(value: &T, format: OutputFormat) -> Result<bool> {
    match format {
        OutputFormat::Yaml => {
            print!("{}", serde_yml::to_string(value).into_diagnostic()?);
            Ok(true)
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(value).into_diagnostic()?);
            Ok(true)
        }
        OutputFormat::Auto | OutputFormat::Md => Ok(false),
    }
}
