//! `pquote quote` command - analyze and price a part

use console::style;
use miette::Result;
use std::path::PathBuf;

use crate::cli::helpers::{
    load_pricing_config, load_solid, output_format, print_serialized, solid_label,
};
use crate::cli::render;
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::Settings;
use crate::pipeline::{process_part, ProcessingResult};

#[derive(clap::Args, Debug)]
pub struct QuoteArgs {
    /// Solid summary exported by the geometry provider (YAML or JSON)
    pub solid: PathBuf,

    /// Number of pieces (1-50)
    #[arg(long, short = 'n', default_value_t = 1, allow_negative_numbers = true)]
    pub quantity: i64,

    /// Trained pricing artifact (overrides settings)
    #[arg(long)]
    pub pricing_config: Option<PathBuf>,
}

pub fn run(args: QuoteArgs, global: &GlobalOpts) -> Result<()> {
    let settings = Settings::load();
    let config = load_pricing_config(args.pricing_config.as_ref(), &settings)?;
    let solid = load_solid(&args.solid)?;
    let label = solid_label(&solid, &args.solid);

    let result = process_part(&solid, &label, args.quantity, &config);

    let format = output_format(global, &settings);
    if !print_serialized(&result, format)? {
        let styled = format == OutputFormat::Auto && console::user_attended();
        print_report(&result, styled, global.quiet);
    }

    if result.is_success() {
        Ok(())
    } else {
        Err(miette::miette!(
            "Quote for {} failed with {} error(s)",
            result.source,
            result.errors.len()
        ))
    }
}

fn print_report(result: &ProcessingResult, styled: bool, quiet: bool) {
    println!("{}", render::heading(&format!("Quote: {}", result.source), styled));
    println!();
    if !quiet {
        println!("{} {}", style("Part ID:").dim(), result.part_id);
        println!();
        println!("{}", render::features_table(&result.features));
        println!();
        println!("{}", render::heading("Confidence", styled));
        println!();
        println!("{}", render::confidence_table(&result.confidence));
        println!();
    }

    if !result.dfm_issues.is_empty() {
        println!("{}", render::heading("Manufacturability", styled));
        println!();
        println!("{}", render::dfm_table(&result.dfm_issues));
        println!();
    }

    if result.review.needs_review() {
        println!("{}", render::heading("Needs manual review", styled));
        println!();
        println!("{}", render::notes_list(&result.review.notes()));
    }

    if let Some(quote) = &result.quote {
        println!("{}", render::heading("Price", styled));
        println!();
        println!("{}", render::quote_table(quote));
        if quote.minimum_applied {
            println!();
            println!(
                "{} Minimum order price applied",
                style("!").yellow()
            );
        }
        println!();
    }

    for error in &result.errors {
        eprintln!("{} {}", style("✗").red(), error);
    }

    println!("{}", style(result.disclaimer).dim());
}
