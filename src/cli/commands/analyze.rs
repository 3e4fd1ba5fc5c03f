//! `pquote analyze` command - feature extraction and DFM checks without pricing

use console::style;
use miette::Result;
use std::path::PathBuf;

use crate::cli::helpers::{load_solid, output_format, print_serialized, solid_label};
use crate::cli::render;
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::Settings;
use crate::pipeline::{analyze_part, PartAnalysis};

#[derive(clap::Args, Debug)]
pub struct AnalyzeArgs {
    /// Solid summary exported by the geometry provider (YAML or JSON)
    pub solid: PathBuf,
}

pub fn run(args: AnalyzeArgs, global: &GlobalOpts) -> Result<()> {
    let settings = Settings::load();
    let solid = load_solid(&args.solid)?;
    let label = solid_label(&solid, &args.solid);

    let analysis = analyze_part(&solid)?;

    let format = output_format(global, &settings);
    if print_serialized(&analysis, format)? {
        return Ok(());
    }

    let styled = format == OutputFormat::Auto && console::user_attended();
    print_report(&label, &analysis, styled, global.quiet);
    Ok(())
}

fn print_report(label: &str, analysis: &PartAnalysis, styled: bool, quiet: bool) {
    println!("{}", render::heading(&format!("Analysis: {}", label), styled));
    println!();
    println!("{}", render::features_table(&analysis.features));
    println!();

    if !quiet {
        println!("{}", render::heading("Confidence", styled));
        println!();
        println!("{}", render::confidence_table(&analysis.confidence));
        println!();

        if !analysis.holes.is_empty() {
            println!("{}", render::heading("Holes", styled));
            println!();
            println!("{}", render::holes_table(&analysis.holes));
            println!();
        }
        if !analysis.pockets.is_empty() {
            println!("{}", render::heading("Pockets", styled));
            println!();
            println!("{}", render::pockets_table(&analysis.pockets));
            println!();
        }
    }

    println!("{}", render::heading("Manufacturability", styled));
    println!();
    if analysis.dfm_issues.is_empty() {
        println!("{} No manufacturability issues found", style("✓").green());
    } else {
        println!("{}", render::dfm_table(&analysis.dfm_issues));
    }

    if analysis.review.needs_review() {
        println!();
        println!("{}", render::heading("Needs manual review", styled));
        println!();
        print!("{}", render::notes_list(&analysis.review.notes()));
    }
}
