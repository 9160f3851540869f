// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Au-Zone Technologies

mod check;
mod error;
mod inspect;
mod parse;
mod utils;

use clap::{Parser, Subcommand};
use error::result_to_exit_code;
use std::process::ExitCode;

/// linkcheck CLI - Native binary linkage verification
#[derive(Parser)]
#[command(name = "linkcheck")]
#[command(version)]
#[command(about = "linkcheck CLI - Native binary linkage verification")]
#[command(long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose logging (use RUST_LOG=debug for more)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Output results in JSON format
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a release binary and verify its linked libraries
    Check(check::Args),

    /// List the dynamic libraries linked by an existing binary
    Inspect(inspect::Args),

    /// Parse saved inspection output and optionally verify it
    Parse(parse::Args),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbose, cli.quiet);

    let result = match cli.command {
        Commands::Check(args) => check::execute(args, cli.json),
        Commands::Inspect(args) => inspect::execute(args, cli.json),
        Commands::Parse(args) => parse::execute(args, cli.json),
    };

    result_to_exit_code(result)
}

/// Initialize env_logger based on verbosity flags
fn init_logging(verbose: bool, quiet: bool) {
    // RUST_LOG wins over the flags when set
    let env = env_logger::Env::default();

    let env = if quiet {
        // Errors only, the report still goes to stdout
        env.default_filter_or("error")
    } else if verbose {
        // Command lines and parse details
        env.default_filter_or("debug")
    } else {
        // Pipeline milestones
        env.default_filter_or("info")
    };

    env_logger::Builder::from_env(env)
        .format_timestamp(None) // keep CI logs diffable
        .format_target(false) // module paths add nothing for a single binary
        .init();

    log::debug!("Logging initialized");
}
