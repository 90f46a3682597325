//! Leveled console output that interleaves cleanly with child process output.
//!
//! Every message is written and flushed immediately, so text printed by these
//! helpers lands in order with whatever a streamed child process prints to the
//! same terminal. Color is best-effort: when ANSI sequences can not be enabled
//! the console prints plain text and reports the fallback once.
//!
//! The process-wide console is configured once with [`init`]; the free
//! functions ([`err`], [`critical_warning`], [`warning`], [`info`],
//! [`success`], [`print`]) route through it and fall back to an auto-colored
//! stdout console when [`init`] was never called.

use colored::{ColoredString, Colorize};
use core::fmt::Display;
use std::io::{self, Write};
#[cfg(windows)]
use std::sync::Once;
use std::sync::{Mutex, OnceLock, PoisonError};

static CONSOLE: OnceLock<Console> = OnceLock::new();
#[cfg(windows)]
static FALLBACK_NOTICE: Once = Once::new();

/// When the console should emit ANSI color sequences
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub enum ColorMode {
    /// Colorize when the output is a terminal and `NO_COLOR` is not set
    #[default]
    Auto,
    /// Always colorize, if the terminal can be switched to ANSI mode
    Always,
    /// Never colorize
    Never,
}

impl ColorMode {
    /// Parses `auto`, `always` or `never` (case-insensitive)
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "auto" => Some(ColorMode::Auto),
            "always" => Some(ColorMode::Always),
            "never" => Some(ColorMode::Never),
            _ => None,
        }
    }
}

/// Severity of a console message, selects its color
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Level {
    Error,
    CriticalWarning,
    Warning,
    Info,
    Success,
}

impl Level {
    fn paint(self, text: &str) -> ColoredString {
        match self {
            Level::Error => text.bright_red().bold(),
            Level::CriticalWarning => text.magenta().bold(),
            Level::Warning => text.yellow(),
            Level::Info => text.normal(),
            Level::Success => text.green(),
        }
    }
}

/// A writer that prints leveled messages and flushes after each one
pub struct Console {
    out: Mutex<Box<dyn Write + Send>>,
    color: bool,
}

impl Console {
    /// Creates a console printing to the process standard output.
    ///
    /// `mode` is resolved against the terminal right away; see [`ColorMode`].
    #[must_use]
    pub fn stdout(mode: ColorMode) -> Self {
        let color = resolve_color(mode);

        Self::with_writer(io::stdout(), color)
    }

    /// Creates a console on top of an arbitrary writer
    pub fn with_writer<W: Write + Send + 'static>(writer: W, color: bool) -> Self {
        Self {
            out: Mutex::new(Box::new(writer)),
            color,
        }
    }

    /// Whether messages are colorized
    #[must_use]
    pub fn is_colored(&self) -> bool {
        self.color
    }

    /// Writes `message` followed by a newline in the color of `level`.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to or flushing the underlying writer fails.
    pub fn emit(&self, level: Level, message: impl Display) -> io::Result<()> {
        let text = message.to_string();
        let mut out = self.out.lock().unwrap_or_else(PoisonError::into_inner);

        if self.color {
            writeln!(out, "{}", level.paint(&text))?;
        } else {
            writeln!(out, "{text}")?;
        }

        out.flush()
    }

    /// Writes `message` without a trailing newline and flushes.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to or flushing the underlying writer fails.
    pub fn emit_inline(&self, message: impl Display) -> io::Result<()> {
        let mut out = self.out.lock().unwrap_or_else(PoisonError::into_inner);

        write!(out, "{message}")?;
        out.flush()
    }
}

fn resolve_color(mode: ColorMode) -> bool {
    match mode {
        ColorMode::Never => {
            colored::control::set_override(false);
            false
        }
        ColorMode::Always => {
            let enabled = enable_ansi();
            colored::control::set_override(enabled);
            enabled
        }
        ColorMode::Auto => colored::control::SHOULD_COLORIZE.should_colorize() && enable_ansi(),
    }
}

#[cfg(windows)]
fn enable_ansi() -> bool {
    if colored::control::set_virtual_terminal(true).is_ok() {
        return true;
    }

    FALLBACK_NOTICE.call_once(|| {
        let mut out = io::stdout();
        let _ = writeln!(out, "Color support unavailable, falling back to no color");
        let _ = out.flush();
    });
    false
}

#[cfg(not(windows))]
fn enable_ansi() -> bool {
    true
}

/// Configures the process-wide console.
///
/// Returns `false` if the console was already configured, either by an
/// earlier call or implicitly by a helper printing before `init`.
pub fn init(mode: ColorMode) -> bool {
    install(Console::stdout(mode))
}

/// Installs `console` as the process-wide console, see [`init`]
pub fn install(console: Console) -> bool {
    CONSOLE.set(console).is_ok()
}

/// The process-wide console
pub fn global() -> &'static Console {
    CONSOLE.get_or_init(|| Console::stdout(ColorMode::Auto))
}

// Console output is best-effort, a closed stdout must not abort the build.
fn emit(level: Level, message: impl Display) {
    let _ = global().emit(level, message);
}

/// Prints an error in bright red
pub fn err(message: impl Display) {
    emit(Level::Error, message);
}

/// Prints a critical warning in bold magenta
pub fn critical_warning(message: impl Display) {
    emit(Level::CriticalWarning, message);
}

/// Prints a warning in yellow
pub fn warning(message: impl Display) {
    emit(Level::Warning, message);
}

/// Prints an informational message in the default color
pub fn info(message: impl Display) {
    emit(Level::Info, message);
}

/// Prints a success message in green
pub fn success(message: impl Display) {
    emit(Level::Success, message);
}

/// Prints a plain line
pub fn print(message: impl Display) {
    emit(Level::Info, message);
}
