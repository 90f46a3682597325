//! Interactive yes/no questions on the terminal.

use core::str::FromStr;
use std::io::{self, BufRead, Write};

use crate::{Error, Result};

const RETRY_HINT: &str = "Please respond with 'yes' or 'no' (or 'y' or 'n').";

/// Answer assumed when the user just hits enter
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Answer {
    Yes,
    No,
}

impl Answer {
    /// `true` for [`Answer::Yes`]
    #[must_use]
    pub fn as_bool(self) -> bool {
        matches!(self, Answer::Yes)
    }
}

impl FromStr for Answer {
    type Err = Error;

    /// Accepts exactly `yes` or `no`
    fn from_str(value: &str) -> Result<Self> {
        match value {
            "yes" => Ok(Answer::Yes),
            "no" => Ok(Answer::No),
            _ => Err(Error::InvalidDefault(value.to_string())),
        }
    }
}

fn suffix(default: Option<Answer>) -> &'static str {
    match default {
        None => " [y/n] ",
        Some(Answer::Yes) => " [Y/n] ",
        Some(Answer::No) => " [y/N] ",
    }
}

fn parse_choice(choice: &str) -> Option<bool> {
    match choice {
        "yes" | "ye" | "y" => Some(true),
        "no" | "n" => Some(false),
        _ => None,
    }
}

/// Asks `question` on the terminal until a yes or no answer is given.
///
/// `default` must be `Some("yes")`, `Some("no")` or `None`; with `None` an
/// explicit answer is required.
///
/// # Errors
///
/// Returns [`Error::InvalidDefault`] before prompting if `default` is not
/// recognized, and [`Error::Io`] if the terminal is closed or unreadable.
pub fn query_yes_no(question: &str, default: Option<&str>) -> Result<bool> {
    let default = default.map(str::parse::<Answer>).transpose()?;
    let stdin = io::stdin();

    ask(&mut stdin.lock(), &mut io::stdout(), question, default)
}

/// Asks `question` on `output` and reads answers from `input`.
///
/// Answers are case-insensitive and may be `yes`, `ye`, `y`, `no` or `n`.
/// An empty answer selects `default` when there is one. Anything else prints
/// a hint and asks again.
///
/// # Errors
///
/// Returns [`Error::Io`] when reading or writing fails, including when
/// `input` ends before an answer is given.
pub fn ask<R, W>(
    input: &mut R,
    output: &mut W,
    question: &str,
    default: Option<Answer>,
) -> Result<bool>
where
    R: BufRead + ?Sized,
    W: Write + ?Sized,
{
    let prompt = suffix(default);
    let mut line = String::new();

    loop {
        write!(output, "{question} {prompt}")?;
        output.flush()?;

        line.clear();
        if input.read_line(&mut line)? == 0 {
            return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "no answer given").into());
        }

        let choice = line.trim().to_lowercase();
        if choice.is_empty() {
            if let Some(answer) = default {
                return Ok(answer.as_bool());
            }
        } else if let Some(answer) = parse_choice(&choice) {
            return Ok(answer);
        }

        writeln!(output, "{RETRY_HINT}")?;
    }
}
