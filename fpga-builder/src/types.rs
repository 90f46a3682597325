use core::fmt::{Display, Formatter};
use std::io;

/// The error type for `fpga-builder` helpers
/// Errors originate while launching child processes, from their exit status,
/// or from malformed caller input
#[derive(Debug)]
#[non_exhaustive]
pub enum Error {
    /// Command line contains unbalanced quotes or a dangling escape
    Split {
        /// Command as supplied by the caller
        command: String,
    },
    /// Command line contains no tokens to execute
    EmptyCommand,
    /// The executable could not be found or the OS refused to start it
    Launch {
        /// Command as supplied by the caller
        command: String,
        /// Tokens the command was split into
        split: Vec<String>,
        /// Underlying OS error
        source: io::Error,
    },
    /// A blocking command exited unsuccessfully
    CommandFailed {
        /// Command as supplied by the caller
        command: String,
        /// Exit code, `None` when the child was terminated by a signal
        code: Option<i32>,
    },
    /// Version string does not start with two integer components
    InvalidVersion(String),
    /// Prompt default is not one of `yes` or `no`
    InvalidDefault(String),
    /// Source location has no parent directory
    NoParent(String),
    /// Calling source file was not found below the current directory
    SourceNotFound(String),
    /// I/O error while talking to a child process or the terminal
    Io(io::Error),
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::Split { command } => {
                write!(f, "unable to split command line: {command}")
            }
            Error::EmptyCommand => write!(f, "command line is empty"),
            Error::Launch {
                command, source, ..
            } => write!(f, "failed to launch `{command}`: {source}"),
            Error::CommandFailed {
                command,
                code: Some(code),
            } => write!(
                f,
                "command `{command}` returned non-zero exit status {code}"
            ),
            Error::CommandFailed { command, code: None } => {
                write!(f, "command `{command}` was terminated by a signal")
            }
            Error::InvalidVersion(version) => {
                write!(f, "invalid toolchain version: '{version}'")
            }
            Error::InvalidDefault(answer) => {
                write!(f, "invalid default answer: '{answer}'")
            }
            Error::NoParent(path) => {
                write!(f, "no parent directory for '{path}'")
            }
            Error::SourceNotFound(file) => {
                write!(f, "source file '{file}' not found from the current directory")
            }
            Error::Io(err) => write!(f, "I/O error: {err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Launch { source, .. } => Some(source),
            Error::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::Io(err)
    }
}

impl Error {
    /// Exit code of a failed command, if the error carries one
    #[must_use]
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            Error::CommandFailed { code, .. } => *code,
            _ => None,
        }
    }
}

/// Alias for `fpga-builder` helper results
pub type Result<T> = core::result::Result<T, Error>;
