//! `pquote price` command - price an already extracted feature vector

use console::style;
use miette::Result;
use std::path::PathBuf;

use crate::cli::helpers::{load_pricing_config, output_format, print_serialized};
use crate::cli::render;
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::loader::load_document;
use crate::core::{PartFeatures, Settings};
use crate::pipeline::DisclaimedQuote;
use crate::pricing::calculate_quote;

#[derive(clap::Args, Debug)]
pub struct PriceArgs {
    /// Feature vector file (YAML or JSON)
    pub features: PathBuf,

    /// Number of pieces (1-50)
    #[arg(long, short = 'n', default_value_t = 1, allow_negative_numbers = true)]
    pub quantity: i64,

    /// Trained pricing artifact (overrides settings)
    #[arg(long)]
    pub pricing_config: Option<PathBuf>,
}

pub fn run(args: PriceArgs, global: &GlobalOpts) -> Result<()> {
    let settings = Settings::load();
    let config = load_pricing_config(args.pricing_config.as_ref(), &settings)?;
    let features: PartFeatures = load_document(&args.features)?;

    let priced = DisclaimedQuote::from(calculate_quote(&features, args.quantity, &config)?);

    let format = output_format(global, &settings);
    if print_serialized(&priced, format)? {
        return Ok(());
    }

    let styled = format == OutputFormat::Auto && console::user_attended();
    println!(
        "{}",
        render::heading(&format!("Price: {}", args.features.display()), styled)
    );
    println!();
    println!("{}", render::quote_table(&priced.quote));
    if priced.quote.minimum_applied {
        println!();
        println!("{} Minimum order price applied", style("!").yellow());
    }
    println!();
    println!("{}", style(priced.disclaimer).dim());
    Ok(())
}
