//! Child process execution for build scripts.
//!
//! Commands are given as a single command line, the way they would be typed
//! in a terminal, and split with POSIX shell-word rules before execution. No
//! shell is involved, so pipes and redirections are not interpreted.
//!
//! Literal backslashes are doubled before splitting, which keeps Windows
//! paths such as `C:\Xilinx\Vivado` intact.

use std::env;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};

use crate::console;
#[cfg(feature = "log")]
use crate::log::{debug, error};
use crate::{Error, Result};

const RULE: &str = "=============================================================";

/// A single command invocation.
///
/// Built with [`Invocation::new`] and consumed by [`Invocation::run`] or
/// [`Invocation::spawn`]. By default the command blocks, runs from the
/// current directory, announces itself on the console and lets its output
/// pass through to the parent's standard streams.
///
/// # Example
///
/// ```no_run
/// use fpga_builder::runner::Invocation;
///
/// # fn main() -> fpga_builder::Result<()> {
/// let mut warnings = 0;
/// Invocation::new("vivado -mode batch -source build.tcl")
///     .cwd("hw")
///     .on_line(|line| {
///         if line.starts_with("WARNING") {
///             warnings += 1;
///         }
///         println!("{line}");
///     })
///     .run()?;
/// # Ok(())
/// # }
/// ```
pub struct Invocation<'a> {
    command: String,
    cwd: Option<PathBuf>,
    silent: bool,
    blocking: bool,
    line_handler: Option<Box<dyn FnMut(&str) + 'a>>,
}

impl<'a> Invocation<'a> {
    /// Creates a blocking invocation of `command`
    #[must_use]
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            cwd: None,
            silent: false,
            blocking: true,
            line_handler: None,
        }
    }

    /// Directory to execute from, the current directory when not set
    #[must_use]
    pub fn cwd(mut self, dir: impl AsRef<Path>) -> Self {
        self.cwd = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Suppresses the header and footer printed around the command
    #[must_use]
    pub fn silent(mut self, silent: bool) -> Self {
        self.silent = silent;
        self
    }

    /// When `false`, [`Invocation::run`] starts the command and returns
    /// immediately without waiting for it
    #[must_use]
    pub fn blocking(mut self, blocking: bool) -> Self {
        self.blocking = blocking;
        self
    }

    /// Captures standard output and error merged into one stream and hands
    /// every line to `handler`, decoded and right-trimmed.
    ///
    /// Only used for blocking invocations.
    #[must_use]
    pub fn on_line<F>(mut self, handler: F) -> Self
    where
        F: FnMut(&str) + 'a,
    {
        self.line_handler = Some(Box::new(handler));
        self
    }

    /// The command line as supplied
    #[must_use]
    pub fn command(&self) -> &str {
        &self.command
    }

    /// Runs the command.
    ///
    /// Blocking invocations wait for the child and return its exit code,
    /// which is always `0` since any other code is reported as an error.
    /// Non-blocking invocations start the child detached from the parent's
    /// standard streams and return `0` right away; the child's fate is not
    /// observed. Use [`Invocation::spawn`] to keep a handle instead.
    ///
    /// # Errors
    ///
    /// Returns an `Err` in any of the following cases:
    /// * The command line can not be split or is empty.
    /// * The executable is missing or the OS refuses to start it
    ///   ([`Error::Launch`]). The original and split command are printed
    ///   before returning.
    /// * A blocking command exits with a non-zero code
    ///   ([`Error::CommandFailed`]).
    /// * Reading the child's output fails.
    pub fn run(self) -> Result<i32> {
        let cwd = resolve_cwd(self.cwd)?;
        let split = split_command(&self.command)?;

        print_header(&self.command, &cwd, self.silent, self.blocking);

        let result = if self.blocking {
            match self.line_handler {
                Some(handler) => run_with_handler(&self.command, &split, &cwd, handler),
                None => run_passthrough(&self.command, &split, &cwd),
            }
        } else {
            launch_detached(&self.command, &split, &cwd).map(|_| 0)
        };

        if let Err(err @ Error::Launch { .. }) = &result {
            report_launch_failure(err);
        }

        let code = result?;
        print_footer(self.silent);

        Ok(code)
    }

    /// Starts the command without waiting and hands back the child process.
    ///
    /// The child's standard streams are detached from the parent. Dropping
    /// the returned [`Child`] does not terminate it.
    ///
    /// # Errors
    ///
    /// Returns an `Err` if the command line can not be split or the process
    /// can not be started.
    pub fn spawn(self) -> Result<Child> {
        let cwd = resolve_cwd(self.cwd)?;
        let split = split_command(&self.command)?;

        print_header(&self.command, &cwd, self.silent, false);

        let result = launch_detached(&self.command, &split, &cwd);

        if let Err(err @ Error::Launch { .. }) = &result {
            report_launch_failure(err);
        }

        let child = result?;
        print_footer(self.silent);

        Ok(child)
    }
}

/// Runs `command` to completion, letting its output pass through.
///
/// Shorthand for `Invocation::new(command).cwd(dir).run()`.
///
/// # Errors
///
/// See [`Invocation::run`].
pub fn run_cmd(command: &str, cwd: Option<&Path>) -> Result<i32> {
    let mut invocation = Invocation::new(command);
    if let Some(dir) = cwd {
        invocation = invocation.cwd(dir);
    }

    invocation.run()
}

/// Runs `command` and returns its standard output, trimmed.
///
/// Standard error passes through to the parent. Nothing is printed around
/// the command.
///
/// # Errors
///
/// Returns an `Err` if the command can not be split or started, or if it
/// exits with a non-zero code.
pub fn check_output(command: &str, cwd: Option<&Path>) -> Result<String> {
    let split = split_command(command)?;
    let mut cmd = build_command(&split);
    if let Some(dir) = cwd {
        cmd.current_dir(dir);
    }

    let output = cmd
        .stdin(Stdio::inherit())
        .stderr(Stdio::inherit())
        .output()
        .map_err(|source| launch_error(command, &split, source))?;
    check_status(command, output.status)?;

    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

/// Splits a command line into program and arguments.
///
/// Backslashes are doubled first so they survive as literal characters.
///
/// # Errors
///
/// Returns [`Error::Split`] on unbalanced quotes and [`Error::EmptyCommand`]
/// if no tokens remain.
pub fn split_command(command: &str) -> Result<Vec<String>> {
    let escaped = command.replace('\\', "\\\\");
    let split = shlex::split(&escaped).ok_or_else(|| Error::Split {
        command: command.to_string(),
    })?;

    if split.is_empty() {
        return Err(Error::EmptyCommand);
    }

    Ok(split)
}

fn resolve_cwd(cwd: Option<PathBuf>) -> Result<PathBuf> {
    match cwd {
        Some(dir) => Ok(dir),
        None => Ok(env::current_dir()?),
    }
}

fn build_command(split: &[String]) -> Command {
    let mut command = Command::new(&split[0]);
    command.args(&split[1..]);
    command
}

fn run_passthrough(original: &str, split: &[String], cwd: &Path) -> Result<i32> {
    #[cfg(feature = "log")]
    debug!("run {split:?} in {}", cwd.display());

    let status = build_command(split)
        .current_dir(cwd)
        .status()
        .map_err(|source| launch_error(original, split, source))?;

    check_status(original, status)
}

fn run_with_handler(
    original: &str,
    split: &[String],
    cwd: &Path,
    mut handler: Box<dyn FnMut(&str) + '_>,
) -> Result<i32> {
    #[cfg(feature = "log")]
    debug!("run {split:?} in {} with line capture", cwd.display());

    let (reader, writer) = io::pipe()?;
    let mut command = build_command(split);
    command
        .current_dir(cwd)
        .stdout(writer.try_clone()?)
        .stderr(writer);

    let child = command
        .spawn()
        .map_err(|source| launch_error(original, split, source))?;
    // The command still owns the write ends; the reader only sees EOF once
    // they are closed.
    drop(command);

    let mut child = Reaped(child);
    let forwarded = forward_lines(BufReader::new(reader), &mut *handler);
    if forwarded.is_err() {
        let _ = child.0.kill();
    }

    let status = child.0.wait()?;
    forwarded?;
    check_status(original, status)
}

/// Kills and waits for the child when dropped, including while unwinding
/// from a panicking line handler
struct Reaped(Child);

impl Drop for Reaped {
    fn drop(&mut self) {
        if let Ok(None) = self.0.try_wait() {
            let _ = self.0.kill();
            let _ = self.0.wait();
        }
    }
}

fn forward_lines<R, F>(mut reader: R, handler: &mut F) -> io::Result<()>
where
    R: BufRead,
    F: FnMut(&str) + ?Sized,
{
    let mut line = Vec::new();

    loop {
        line.clear();
        if reader.read_until(b'\n', &mut line)? == 0 {
            return Ok(());
        }
        handler(String::from_utf8_lossy(&line).trim_end());
    }
}

fn launch_detached(original: &str, split: &[String], cwd: &Path) -> Result<Child> {
    let child = build_command(split)
        .current_dir(cwd)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|source| launch_error(original, split, source))?;

    #[cfg(feature = "log")]
    debug!("started {split:?} as pid {}", child.id());

    Ok(child)
}

fn check_status(original: &str, status: ExitStatus) -> Result<i32> {
    #[cfg(feature = "log")]
    debug!("`{original}` finished with {status}");

    if status.success() {
        return Ok(status.code().unwrap_or(0));
    }

    Err(Error::CommandFailed {
        command: original.to_string(),
        code: status.code(),
    })
}

fn launch_error(original: &str, split: &[String], source: io::Error) -> Error {
    Error::Launch {
        command: original.to_string(),
        split: split.to_vec(),
        source,
    }
}

fn report_launch_failure(err: &Error) {
    if let Error::Launch { command, split, .. } = err {
        #[cfg(feature = "log")]
        error!("{err}");

        console::err(format_args!("Command was {command}"));
        console::err(format_args!("Split command was {split:?}"));
    }
}

fn print_header(command: &str, cwd: &Path, silent: bool, blocking: bool) {
    if silent {
        return;
    }

    let mode = if blocking { "" } else { " (non-blocking)" };
    console::print("");
    console::print(RULE);
    console::print(format_args!("Running command{mode}:"));
    console::print(command);
    console::print(format_args!("From directory {}", cwd.display()));
}

fn print_footer(silent: bool) {
    if !silent {
        console::print(RULE);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_plain() {
        let split = split_command("vivado -mode batch -source build.tcl").unwrap();

        assert_eq!(vec!["vivado", "-mode", "batch", "-source", "build.tcl"], split);
    }

    #[test]
    fn test_split_keeps_backslashes() {
        let split = split_command(r#"xsct C:\Xilinx\build.tcl "D:\out dir\hw""#).unwrap();

        assert_eq!(
            vec!["xsct", r"C:\Xilinx\build.tcl", r"D:\out dir\hw"],
            split
        );
    }

    #[test]
    fn test_split_quotes() {
        let split = split_command(r#"make "TARGET=a b" 'x y'"#).unwrap();

        assert_eq!(vec!["make", "TARGET=a b", "x y"], split);
    }

    #[test]
    fn test_split_errors() {
        assert!(matches!(
            split_command("echo \"unterminated"),
            Err(Error::Split { .. })
        ));
        assert!(matches!(split_command("   "), Err(Error::EmptyCommand)));
    }

    #[test]
    fn test_missing_executable() {
        let result = Invocation::new("definitely-not-a-real-tool-4821 --version")
            .silent(true)
            .run();

        match result {
            Err(Error::Launch { command, split, .. }) => {
                assert_eq!("definitely-not-a-real-tool-4821 --version", command);
                assert_eq!(vec!["definitely-not-a-real-tool-4821", "--version"], split);
            }
            other => panic!("expected launch error, got {other:?}"),
        }
    }

    /// Reader that yields one line and then fails
    struct FailingReader {
        sent: bool,
    }

    impl io::Read for FailingReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.sent {
                return Err(io::Error::other("pipe broke"));
            }
            self.sent = true;
            let data = b"first\n";
            buf[..data.len()].copy_from_slice(data);
            Ok(data.len())
        }
    }

    #[test]
    fn test_forward_lines_stops_on_read_error() {
        let mut lines = Vec::new();
        let reader = BufReader::new(FailingReader { sent: false });

        let result = forward_lines(reader, &mut |line: &str| lines.push(line.to_string()));

        assert_eq!(vec!["first"], lines);
        assert_eq!("pipe broke", result.unwrap_err().to_string());
    }

    #[cfg(unix)]
    mod unix {
        use super::*;

        #[test]
        fn test_blocking_success() {
            let code = Invocation::new("true").silent(true).run().unwrap();

            assert_eq!(0, code);
        }

        #[test]
        fn test_blocking_with_header() {
            assert_eq!(0, run_cmd("true", None).unwrap());
        }

        #[test]
        fn test_blocking_failure_carries_code() {
            let err = Invocation::new(r#"sh -c "exit 3""#)
                .silent(true)
                .run()
                .unwrap_err();

            match err {
                Error::CommandFailed { command, code } => {
                    assert_eq!(r#"sh -c "exit 3""#, command);
                    assert_eq!(Some(3), code);
                }
                other => panic!("expected command failure, got {other:?}"),
            }
        }

        #[test]
        fn test_line_handler_receives_merged_output_in_order() {
            let mut lines = Vec::new();
            let command = r#"sh -c "echo one; echo 'two   '; echo three 1>&2; echo; echo four""#;
            let code = Invocation::new(command)
                .silent(true)
                .on_line(|line| lines.push(line.to_string()))
                .run()
                .unwrap();

            assert_eq!(0, code);
            assert_eq!(vec!["one", "two", "three", "", "four"], lines);
        }

        #[test]
        fn test_line_handler_then_failure() {
            let mut lines = Vec::new();
            let result = Invocation::new(r#"sh -c "echo partial; exit 7""#)
                .silent(true)
                .on_line(|line| lines.push(line.to_string()))
                .run();

            assert_eq!(vec!["partial"], lines);
            assert_eq!(Some(7), result.unwrap_err().exit_code());
        }

        #[test]
        fn test_line_handler_invalid_utf8() {
            let mut lines = Vec::new();
            Invocation::new(r#"sh -c "printf 'ok\377\n'""#)
                .silent(true)
                .on_line(|line| lines.push(line.to_string()))
                .run()
                .unwrap();

            assert_eq!(1, lines.len());
            assert!(lines[0].starts_with("ok"));
        }

        #[test]
        fn test_panicking_handler_kills_child() {
            use std::panic::{self, AssertUnwindSafe};
            use std::time::{Duration, Instant};

            let started = Instant::now();
            let result = panic::catch_unwind(AssertUnwindSafe(|| {
                Invocation::new(r#"sh -c "echo go; exec sleep 30""#)
                    .silent(true)
                    .on_line(|_| panic!("handler gave up"))
                    .run()
            }));

            assert!(result.is_err());
            assert!(started.elapsed() < Duration::from_secs(20));
        }

        #[test]
        fn test_runs_from_cwd() {
            let dir = env::temp_dir();
            let mut lines = Vec::new();
            Invocation::new("pwd")
                .cwd(&dir)
                .silent(true)
                .on_line(|line| lines.push(line.to_string()))
                .run()
                .unwrap();

            assert_eq!(
                dir.canonicalize().unwrap(),
                Path::new(&lines[0]).canonicalize().unwrap()
            );
        }

        #[test]
        fn test_non_blocking_returns_immediately() {
            let code = Invocation::new("sleep 5")
                .blocking(false)
                .silent(true)
                .run()
                .unwrap();

            assert_eq!(0, code);
        }

        #[test]
        fn test_non_blocking_ignores_exit_code() {
            let code = Invocation::new("false").blocking(false).run().unwrap();

            assert_eq!(0, code);
        }

        #[test]
        fn test_spawn_hands_back_child() {
            let mut child = Invocation::new(r#"sh -c "exit 4""#)
                .silent(true)
                .spawn()
                .unwrap();

            assert_eq!(Some(4), child.wait().unwrap().code());
        }

        #[test]
        fn test_check_output_trims() {
            let output = check_output("echo '  2019.2  '", None).unwrap();

            assert_eq!("2019.2", output);
        }

        #[test]
        fn test_check_output_failure() {
            let err = check_output("false", None).unwrap_err();

            assert_eq!(Some(1), err.exit_code());
        }
    }
}
