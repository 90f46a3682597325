//! Helpers for FPGA build and deploy scripts
//!
//! # Overview
//!
//! This crate collects the glue a build script needs around vendor FPGA
//! toolchains and version control:
//! - [`runner`]: run external tools, streaming their output or handing it to
//!   a callback line by line, blocking or fire-and-forget
//! - [`console`]: leveled, colored messages that are flushed immediately so
//!   they interleave correctly with tool output
//! - [`git`]: check that the working tree is clean before a release build
//! - [`prompt`]: ask the operator a yes/no question
//! - [`toolchain`]: tell an SDK-era Xilinx release from a Vitis-era one
//! - [`paths`]: resolve files next to the script that asked for them
//!
//! # Usage
//!
//! Put this in your `Cargo.toml`:
//! ```cargo
//! [dependencies]
//! fpga-builder = "0.1"
//! ```
//!
//! ## Features
//!
//! - `log`: emits debug records through the [`log`](https://docs.rs/log) facade
//!   for every launched process and its exit status
//!
//! # Example
//!
//! ```no_run
//! use fpga_builder::git::{repo_clean, CleanCheck};
//! use fpga_builder::runner::Invocation;
//! use fpga_builder::{console, prompt, toolchain};
//! use std::path::Path;
//!
//! fn main() -> fpga_builder::Result<()> {
//!     console::init(console::ColorMode::Auto);
//!
//!     let status = repo_clean(Path::new("."), CleanCheck::default())?;
//!     if !status.clean {
//!         console::critical_warning(&status.detail);
//!         if !prompt::query_yes_no("Build from a dirty tree?", Some("no"))? {
//!             return Ok(());
//!         }
//!     }
//!
//!     let flavor = toolchain::classify("2020.2")?;
//!     console::info(format_args!("Using {flavor} flow"));
//!
//!     let vivado = toolchain::tool_binary("vivado");
//!     Invocation::new(format!("{vivado} -mode batch -source build.tcl"))
//!         .cwd("hw")
//!         .run()?;
//!
//!     console::success("Bitstream ready");
//!     Ok(())
//! }
//! ```

pub mod console;
pub mod git;
pub mod paths;
pub mod prompt;
pub mod runner;
pub mod toolchain;

mod log;
mod types;

pub use crate::runner::{Invocation, check_output, run_cmd};
pub use crate::types::*;
