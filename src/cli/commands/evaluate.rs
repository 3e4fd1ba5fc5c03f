//! `pquote evaluate` command - compare predictions with known prices

use console::style;
use miette::Result;
use std::path::PathBuf;

use crate::cli::helpers::{load_pricing_config, output_format, print_serialized};
use crate::cli::render;
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::Settings;
use crate::pricing::{evaluate_samples, read_samples};

#[derive(clap::Args, Debug)]
pub struct EvaluateArgs {
    /// CSV with name, quantity, actual_price_per_unit and one column per pricing feature
    pub samples: PathBuf,

    /// Trained pricing artifact (overrides settings)
    #[arg(long)]
    pub pricing_config: Option<PathBuf>,
}

pub fn run(args: EvaluateArgs, global: &GlobalOpts) -> Result<()> {
    let settings = Settings::load();
    let config = load_pricing_config(args.pricing_config.as_ref(), &settings)?;
    let samples = read_samples(&args.samples)?;
    let evaluation = evaluate_samples(&samples, &config)?;

    let format = output_format(global, &settings);
    if print_serialized(&evaluation, format)? {
        return Ok(());
    }

    let styled = format == OutputFormat::Auto && console::user_attended();
    println!("{}", render::heading("Model evaluation", styled));
    println!();
    if !config.is_trained() || config.r_squared < 0.5 {
        println!(
            "{} Model R² is {:.3}; predictions are unreliable",
            style("!").yellow(),
            config.r_squared
        );
        println!();
    }

    if !global.quiet && !evaluation.samples.is_empty() {
        println!("{}", render::evaluation_table(&evaluation));
        println!();
    }

    for (name, reason) in &evaluation.skipped {
        eprintln!("{} skipped {}: {}", style("✗").red(), name, reason);
    }

    match &evaluation.summary {
        Some(summary) => {
            println!("{}", render::heading("Summary", styled));
            println!();
            print!("{}", render::evaluation_summary(summary));
            Ok(())
        }
        None => Err(miette::miette!(
            "No sample in {} could be evaluated",
            args.samples.display()
        )),
    }
}
