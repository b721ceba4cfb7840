//! apidiff CLI - breaking-change catalogue for versioned PHP codebases.
//!
//! Takes two snapshot files produced by the upstream parsing stage (one per
//! tagged version of a codebase recipe), runs the comparison engine and
//! reports every API-breaking change plus the maintenance actions they imply.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;
mod output;

use commands::compare::CompareArgs;
use output::OutputFormat;

/// Breaking-change catalogue for versioned PHP codebases.
#[derive(Parser)]
#[command(name = "apidiff")]
#[command(author, version)]
#[command(about = "Catalogue API-breaking changes between two codebase versions")]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output (debug logging)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare two snapshots and emit the breaking-change catalogue
    Compare {
        /// Path to the `from` snapshot JSON
        #[arg(long)]
        from: PathBuf,

        /// Path to the `to` snapshot JSON
        #[arg(long)]
        to: PathBuf,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Report)]
        format: OutputFormat,

        /// Write output to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Exit with status 2 when any breaking change is found
        #[arg(long)]
        fail_on_breaking: bool,
    },
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    let code = match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err:#}");
            1
        }
    };
    std::process::exit(code);
}

fn run(cli: Cli) -> anyhow::Result<i32> {
    match cli.command {
        Commands::Compare {
            from,
            to,
            format,
            output,
            fail_on_breaking,
        } => commands::compare::run(CompareArgs {
            from,
            to,
            format,
            output,
            fail_on_breaking,
        }),
    }
}

fn init_tracing(verbose: bool, quiet: bool) {
    let default_level = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "info"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}
