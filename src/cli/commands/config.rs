//! `pquote config` command - settings and pricing artifact checks

use clap::Subcommand;
use console::style;
use miette::Result;
use std::path::PathBuf;

use crate::cli::helpers::pricing_config_path;
use crate::cli::GlobalOpts;
use crate::core::config::LOCAL_CONFIG_FILE;
use crate::core::Settings;
use crate::pricing::PricingConfig;

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show effective settings
    Show,

    /// Validate a pricing artifact (defaults to the configured one)
    Check(CheckArgs),

    /// Show paths to settings files
    Path,
}

#[derive(clap::Args, Debug)]
pub struct CheckArgs {
    /// Pricing artifact to check
    pub path: Option<PathBuf>,
}

/// Run a config subcommand
pub fn run(cmd: ConfigCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        ConfigCommands::Show => run_show(),
        ConfigCommands::Check(args) => run_check(args, global),
        ConfigCommands::Path => run_path(),
    }
}

fn run_show() -> Result<()> {
    let settings = Settings::load();

    println!("{}", style("Effective Settings").bold().underlined());
    println!();
    println!(
        "  {:<16} {}",
        style("pricing_config").cyan(),
        settings.pricing_config_path().display()
    );
    match &settings.default_format {
        Some(format) => println!("  {:<16} {}", style("default_format").cyan(), format),
        None => println!(
            "  {:<16} {}",
            style("default_format").cyan(),
            style("(not set)").dim()
        ),
    }

    println!();
    println!("{}", style("Settings sources (in priority order):").dim());
    println!("  1. Environment variables (PQUOTE_PRICING_CONFIG, PQUOTE_FORMAT)");
    println!("  2. Local settings ({})", LOCAL_CONFIG_FILE);
    println!("  3. Global settings (~/.config/pquote/config.yaml)");
    Ok(())
}

fn run_check(args: CheckArgs, global: &GlobalOpts) -> Result<()> {
    let settings = Settings::load();
    let path = pricing_config_path(args.path.as_ref(), &settings);
    let config = PricingConfig::load(&path)?;

    println!(
        "{} {} is a valid pricing artifact",
        style("✓").green(),
        style(path.display()).cyan()
    );
    if global.quiet {
        return Ok(());
    }

    println!("  {:<20} €{:.2}", "base price", config.base_price);
    println!(
        "  {:<20} €{:.2}",
        "minimum order price", config.minimum_order_price
    );
    println!("  {:<20} {:.3}", "R²", config.r_squared);
    match config.last_updated_at() {
        Some(at) => println!("  {:<20} {}", "last updated", at.format("%Y-%m-%d %H:%M UTC")),
        None => println!("  {:<20} {}", "last updated", config.last_updated),
    }

    if !config.is_trained() {
        println!();
        println!(
            "{} Model is not trained (R² = 0); quoting will be refused",
            style("!").yellow()
        );
    }
    Ok(())
}

fn run_path() -> Result<()> {
    println!("{}", style("Settings file paths:").bold());
    println!();

    match Settings::global_config_path() {
        Some(path) => {
            println!("  {} {}", style("Global:").cyan(), path.display());
            print_exists(path.exists());
        }
        None => println!(
            "  {} {}",
            style("Global:").cyan(),
            style("(no home directory)").dim()
        ),
    }

    let local = std::env::current_dir()
        .map(|dir| dir.join(LOCAL_CONFIG_FILE))
        .unwrap_or_else(|_| PathBuf::from(LOCAL_CONFIG_FILE));
    println!();
    println!("  {} {}", style("Local:").cyan(), local.display());
    print_exists(local.exists());
    Ok(())
}

fn print_exists(exists: bool) {
    if exists {
        println!("         {}", style("(exists)").green());
    } else {
        println!("         {}", style("(not created)").dim());
    }
}
