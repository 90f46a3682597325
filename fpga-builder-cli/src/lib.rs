//! # fpga-builder command line front end
//!
//! Exposes the [`fpga_builder`] helpers to shell scripts and CI jobs that are
//! not written in Rust: run a vendor tool with the usual banner, capture a
//! command's output, gate a release on a clean working tree, ask the operator
//! for confirmation, or tell which software flow a Xilinx release uses.
//!
//! ## Usage as a Library
//!
//! ```rust,no_run
//! use clap::Parser;
//! use fpga_builder_cli::{Cli, Result};
//!
//! fn main() -> Result<()> {
//!     let cli = Cli::parse_from(["fpga-builder", "toolchain", "2019.2"]);
//!     fpga_builder_cli::run(cli)?;
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Module Structure
//!
//! - [`cli`] - Argument definitions
//! - [`commands`] - One function per subcommand
//! - [`config`] - `fpga-builder.toml` loading

pub mod cli;
pub mod commands;
pub mod config;

// Re-export commonly used types and functions
pub use anyhow::{Context, Result};
pub use cli::{Cli, ColorArg, Commands};
pub use config::Config;

use fpga_builder::console::{self, ColorMode};
use log::LevelFilter;
use simple_logger::SimpleLogger;
use std::process::ExitCode;

/// Installs the `log` backend, `Debug` with `verbose` and `Warn` otherwise
pub fn init_logging(verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };

    if let Err(err) = SimpleLogger::new().with_level(level).init() {
        console::warning(format_args!("Logging unavailable: {err}"));
    }
}

/// Color mode in effect: the command line flag, then the configuration, then
/// [`ColorMode::Auto`]
#[must_use]
pub fn color_mode(flag: Option<ColorArg>, configured: Option<ColorMode>) -> ColorMode {
    flag.map(ColorMode::from).or(configured).unwrap_or_default()
}

/// Loads the configuration, sets up the console and the `log` backend, and
/// executes the subcommand.
///
/// The console is configured before anything else can print through it.
///
/// # Errors
///
/// Returns an error if the configuration is invalid or the subcommand fails.
pub fn run(cli: Cli) -> Result<ExitCode> {
    let config = Config::load(cli.config.as_deref())?;

    let configured = console::init(color_mode(cli.color, config.color));
    init_logging(cli.verbose);
    if !configured {
        log::warn!("Console was already in use, color setting ignored");
    }

    let passed = match cli.command {
        Commands::Run {
            command,
            cwd,
            silent,
            no_wait,
            lines,
        } => {
            let cwd = cwd.or_else(|| config.cwd.clone());
            commands::run_command(
                &command,
                cwd.as_deref(),
                silent || config.silent,
                no_wait,
                lines,
            )?;
            true
        }
        Commands::Output { command, cwd } => {
            let cwd = cwd.or_else(|| config.cwd.clone());
            commands::print_output(&command, cwd.as_deref())?;
            true
        }
        Commands::RepoClean { dir } => commands::check_repo_clean(&dir)?,
        Commands::Toolchain { version } => {
            commands::classify_toolchain(version.as_deref(), config.toolchain_version.as_deref())?;
            true
        }
        Commands::Confirm { question, default } => {
            commands::confirm(&question, default.as_deref())?
        }
    };

    Ok(if passed {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Process exit code for a failed run: the exit code of the failed child
/// command when there is one, `1` otherwise
#[must_use]
pub fn exit_code(err: &anyhow::Error) -> u8 {
    err.downcast_ref::<fpga_builder::Error>()
        .and_then(fpga_builder::Error::exit_code)
        .and_then(|code| u8::try_from(code).ok())
        .filter(|code| *code != 0)
        .unwrap_or(1)
}
