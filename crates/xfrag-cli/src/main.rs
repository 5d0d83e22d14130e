//! xfrag CLI entry point.
//!
//! Provides command-line tools around a fragment configuration:
//! - `xfrag check` - Validate a configuration file
//! - `xfrag render` - Render fragments for input lines
//! - `xfrag resolve` - Show where each fragment would be injected
//! - `xfrag inject` - Insert rendered fragments into a document

mod commands;
mod output;

use std::io::stderr;
use std::process::exit;

use clap::{Parser, Subcommand, ValueEnum};
use commands::{
    run_check, run_inject, run_render, run_resolve, CheckArgs, InjectArgs, RenderArgs,
    ResolveArgs,
};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, registry, EnvFilter};

/// Fragment rendering and XML injection tools.
#[derive(Debug, Parser)]
#[command(name = "xfrag")]
#[command(about = "Render XML fragments from input lines and inject them into documents", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Color output control
    #[arg(long, value_enum, default_value_t = ColorWhen::Auto, global = true)]
    pub color: ColorWhen,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// When to use colored output.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ColorWhen {
    Auto,
    Always,
    Never,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Validate a configuration file
    Check(CheckArgs),
    /// Render fragments for a selection of input lines
    Render(RenderArgs),
    /// Resolve injection targets for one input line
    Resolve(ResolveArgs),
    /// Render one input line and insert its fragments into a document
    Inject(InjectArgs),
}

/// Set up color output based on user preference.
fn setup_colors(color_when: ColorWhen) {
    match color_when {
        ColorWhen::Auto => {
            // owo-colors automatically checks TTY, NO_COLOR, FORCE_COLOR
        }
        ColorWhen::Always => {
            owo_colors::set_override(true);
        }
        ColorWhen::Never => {
            owo_colors::set_override(false);
        }
    }
}

/// Log to stderr. `RUST_LOG` wins over `--verbose`.
fn init_tracing(verbose: bool) {
    let default = if verbose { "xfrag=debug" } else { "xfrag=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(stderr)
                .with_target(false)
                .without_time(),
        )
        .init();
}

fn main() -> miette::Result<()> {
    let cli = Cli::parse();
    setup_colors(cli.color);
    init_tracing(cli.verbose);

    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .build(),
        )
    }))?;

    let result = match cli.command {
        Commands::Check(args) => run_check(args),
        Commands::Render(args) => run_render(args),
        Commands::Resolve(args) => run_resolve(args),
        Commands::Inject(args) => run_inject(args),
    };

    match result {
        Ok(code) => exit(code),
        Err(e) => {
            eprintln!("{e:?}");
            exit(exitcode::DATAERR);
        }
    }
}
