use crate::{Context, Result};
use fpga_builder::console;
use fpga_builder::runner::Invocation;
use std::path::Path;

/// Runs `command` from `cwd` with the console banner unless `silent`.
///
/// With `no_wait` the command is started and left running. With `lines` its
/// merged output is captured and echoed with line numbers.
///
/// # Errors
///
/// Returns an error if the command can not be started or, when waited for,
/// exits with a non-zero code.
pub fn run_command(
    command: &str,
    cwd: Option<&Path>,
    silent: bool,
    no_wait: bool,
    lines: bool,
) -> Result<()> {
    let mut invocation = Invocation::new(command).silent(silent).blocking(!no_wait);
    if let Some(dir) = cwd {
        invocation = invocation.cwd(dir);
    }

    let mut count = 0usize;
    if lines {
        invocation = invocation.on_line(|line| {
            count += 1;
            console::info(format_args!("{count:>5} | {line}"));
        });
    }

    invocation
        .run()
        .with_context(|| format!("Failed to run `{command}`"))?;

    if lines && !silent {
        console::success(format_args!("✓ {count} lines of output"));
    }

    Ok(())
}
