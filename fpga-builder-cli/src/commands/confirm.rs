use crate::{Context, Result};
use fpga_builder::prompt;

/// Asks `question` on the terminal and returns the answer.
///
/// # Errors
///
/// Returns an error if `default` is not `yes` or `no`, or if the terminal
/// closes before an answer is given.
pub fn confirm(question: &str, default: Option<&str>) -> Result<bool> {
    prompt::query_yes_no(question, default).context("Failed to get an answer")
}
