use crate::{Context, Result};
use fpga_builder::{check_output, console};
use std::path::Path;

/// Prints the trimmed standard output of `command`.
///
/// # Errors
///
/// Returns an error if the command can not be started or exits with a
/// non-zero code.
pub fn print_output(command: &str, cwd: Option<&Path>) -> Result<()> {
    let output =
        check_output(command, cwd).with_context(|| format!("Failed to run `{command}`"))?;

    console::print(output);
    Ok(())
}
