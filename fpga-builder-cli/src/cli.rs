//! Command line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use fpga_builder::console::ColorMode;

#[derive(Debug, Parser)]
#[command(name = "fpga-builder")]
#[command(version, about = "Helpers for FPGA build and deploy scripts")]
pub struct Cli {
    /// Configuration file, `fpga-builder.toml` in the current directory by default
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    /// When to color console output
    #[arg(long, value_enum, global = true)]
    pub color: Option<ColorArg>,
    /// Print debug records for every launched process
    #[arg(short, long, global = true)]
    pub verbose: bool,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run a command, streaming its output
    Run {
        /// Command line to execute
        command: String,
        /// Directory to execute from
        #[arg(long)]
        cwd: Option<PathBuf>,
        /// Do not print the banner around the command
        #[arg(long)]
        silent: bool,
        /// Start the command and return without waiting for it
        #[arg(long, conflicts_with = "lines")]
        no_wait: bool,
        /// Capture output and print it line by line with line numbers
        #[arg(long)]
        lines: bool,
    },
    /// Run a command and print its trimmed standard output
    Output {
        /// Command line to execute
        command: String,
        /// Directory to execute from
        #[arg(long)]
        cwd: Option<PathBuf>,
    },
    /// Check that the git working tree has no pending changes
    RepoClean {
        /// Repository directory
        #[arg(long, default_value = ".")]
        dir: PathBuf,
    },
    /// Tell whether a Xilinx release uses the SDK or Vitis flow
    Toolchain {
        /// Release version such as `2019.2`, taken from the configuration when omitted
        version: Option<String>,
    },
    /// Ask a yes/no question, exit code 0 for yes and 1 for no
    Confirm {
        /// Question to ask
        question: String,
        /// Answer assumed on an empty response, `yes` or `no`
        #[arg(long)]
        default: Option<String>,
    },
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum ColorArg {
    Auto,
    Always,
    Never,
}

impl From<ColorArg> for ColorMode {
    fn from(arg: ColorArg) -> Self {
        match arg {
            ColorArg::Auto => ColorMode::Auto,
            ColorArg::Always => ColorMode::Always,
            ColorArg::Never => ColorMode::Never,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_run_with_options() {
        let cli = Cli::try_parse_from([
            "fpga-builder",
            "run",
            "vivado -mode batch",
            "--cwd",
            "hw",
            "--lines",
            "--silent",
        ])
        .unwrap();

        match cli.command {
            Commands::Run {
                command,
                cwd,
                silent,
                no_wait,
                lines,
            } => {
                assert_eq!("vivado -mode batch", command);
                assert_eq!(Some(PathBuf::from("hw")), cwd);
                assert!(silent);
                assert!(!no_wait);
                assert!(lines);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_rejects_no_wait_with_lines() {
        let result = Cli::try_parse_from(["fpga-builder", "run", "make", "--no-wait", "--lines"]);

        assert!(result.is_err());
    }

    #[test]
    fn test_parses_global_flags_after_subcommand() {
        let args = ["fpga-builder", "toolchain", "2019.2", "--color", "never", "-v"];
        let cli = Cli::try_parse_from(args).unwrap();

        assert_eq!(Some(ColorArg::Never), cli.color);
        assert!(cli.verbose);
        assert!(matches!(cli.command, Commands::Toolchain { version: Some(v) } if v == "2019.2"));
    }

    #[test]
    fn test_repo_clean_defaults_to_current_dir() {
        let cli = Cli::try_parse_from(["fpga-builder", "repo-clean"]).unwrap();

        assert!(matches!(cli.command, Commands::RepoClean { dir } if dir == PathBuf::from(".")));
    }

    #[test]
    fn test_has_no_dirty_override() {
        let result = Cli::try_parse_from(["fpga-builder", "repo-clean", "--allow-dirty"]);

        assert!(result.is_err());
    }

    #[test]
    fn test_rejects_unknown_subcommand() {
        assert!(Cli::try_parse_from(["fpga-builder", "deploy"]).is_err());
    }
}
