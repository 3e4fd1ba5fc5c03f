use clap::Parser;
use miette::Result;
use pquote::cli::{Cli, Commands, GlobalOpts};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn init_logging(global: &GlobalOpts) {
    let fallback = if global.verbose {
        "debug"
    } else if global.quiet {
        "error"
    } else {
        "warn"
    };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_env("PQUOTE_LOG").unwrap_or_else(|_| fallback.into()))
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> Result<()> {
    // Reset SIGPIPE so piping into `head` terminates quietly instead of panicking
    #[cfg(unix)]
    {
        unsafe {
            libc::signal(libc::SIGPIPE, libc::SIG_DFL);
        }
    }
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .tab_width(4)
                .build(),
        )
    }))?;

    let cli = Cli::parse();
    let global = cli.global;
    init_logging(&global);

    match cli.command {
        Commands::Analyze(args) => pquote::cli::commands::analyze::run(args, &global),
        Commands::Quote(args) => pquote::cli::commands::quote::run(args, &global),
        Commands::Price(args) => pquote::cli::commands::price::run(args, &global),
        Commands::Evaluate(args) => pquote::cli::commands::evaluate::run(args, &global),
        Commands::Config(cmd) => pquote::cli::commands::config::run(cmd, &global),
        Commands::Completions(args) => pquote::cli::commands::completions::run(args),
    }
}
