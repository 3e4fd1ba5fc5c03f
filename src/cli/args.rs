//! CLI argument definitions using clap derive

use clap::{Parser, Subcommand, ValueEnum};

use crate::cli::commands::{
    analyze::AnalyzeArgs, completions::CompletionsArgs, config::ConfigCommands,
    evaluate::EvaluateArgs, price::PriceArgs, quote::QuoteArgs,
};

#[derive(Parser)]
#[command(name = "pquote")]
#[command(author, version, about = "Automated quoting for machined parts")]
#[command(long_about = "Extracts holes and pockets from a B-rep solid summary, flags manufacturability \
issues and prices the part with a trained linear model.")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOpts,
}

#[derive(clap::Args, Clone, Debug)]
pub struct GlobalOpts {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "auto")]
    pub format: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Enable verbose output (debug logging)
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Extract features and check manufacturability (no pricing)
    Analyze(AnalyzeArgs),

    /// Analyze and price a part
    Quote(QuoteArgs),

    /// Price an already extracted feature vector
    Price(PriceArgs),

    /// Compare model predictions with known prices
    Evaluate(EvaluateArgs),

    /// Settings and pricing artifact checks
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Styled report on a terminal, plain markdown otherwise
    #[default]
    Auto,
    /// YAML format (full fidelity)
    Yaml,
    /// JSON format (for programming)
    Json,
    /// Markdown tables
    Md,
}

impl OutputFormat {
    /// Resolve `Auto` against a configured default format name
    pub fn or_default(self, configured: Option<&str>) -> OutputFormat {
        match self {
            OutputFormat::Auto => configured
                .and_then(|name| OutputFormat::from_str(name, true).ok())
                .unwrap_or(OutputFormat::Auto),
            f => f,
        }
    }
}
