//! Running resolved invocations.
//!
//! [`run`] executes the terminal command's handler exactly once inside the
//! fault boundary, handing it a [`State`] with the positional arguments,
//! parsed flags and I/O streams. [`parse_and_run`] combines resolution and
//! execution and prints help when it was requested.

use std::any::Any;
use std::io::{self, Read, Write};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::debug;

use crate::command::{Command, command_path};
use crate::error::{Error, Result};
use crate::fault::{self, Fault, SourceRoot};
use crate::merge::MergedFlags;
use crate::resolve::{Resolution, Resolved, Resolver};

/// Opaque context passed to every handler.
///
/// Carries a cancellation flag shared by all clones. The core never reads it;
/// handlers and the embedding application decide what cancellation means.
#[derive(Debug, Clone, Default)]
pub struct RunContext {
    cancelled: Arc<AtomicBool>,
}

impl RunContext {
    /// Creates a context that is not cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks this context and all of its clones as cancelled.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Returns `true` once [`RunContext::cancel`] was called on any clone.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Streams handed to the handler. Unset streams default to the process's
/// standard streams.
#[derive(Default)]
pub struct RunOptions {
    pub stdin: Option<Box<dyn Read>>,
    pub stdout: Option<Box<dyn Write>>,
    pub stderr: Option<Box<dyn Write>>,
}

impl RunOptions {
    /// Replaces standard input.
    pub fn with_stdin(mut self, stdin: impl Read + 'static) -> Self {
        self.stdin = Some(Box::new(stdin));
        self
    }

    /// Replaces standard output.
    pub fn with_stdout(mut self, stdout: impl Write + 'static) -> Self {
        self.stdout = Some(Box::new(stdout));
        self
    }

    /// Replaces standard error.
    pub fn with_stderr(mut self, stderr: impl Write + 'static) -> Self {
        self.stderr = Some(Box::new(stderr));
        self
    }
}

/// Per-invocation state handed to a handler.
pub struct State<'a> {
    /// Positional arguments.
    pub args: Vec<String>,
    /// Input stream.
    pub stdin: Box<dyn Read>,
    /// Output stream.
    pub stdout: Box<dyn Write>,
    /// Error stream.
    pub stderr: Box<dyn Write>,
    path: Vec<&'a Command>,
    flags: MergedFlags,
}

impl<'a> State<'a> {
    fn new(resolved: Resolved<'a>, options: RunOptions) -> Self {
        Self {
            args: resolved.args,
            stdin: options.stdin.unwrap_or_else(|| Box::new(io::stdin())),
            stdout: options.stdout.unwrap_or_else(|| Box::new(io::stdout())),
            stderr: options.stderr.unwrap_or_else(|| Box::new(io::stderr())),
            path: resolved.path,
            flags: resolved.flags,
        }
    }

    /// Reads a flag's value by long name or short alias.
    ///
    /// # Errors
    ///
    /// Returns [`Error::FlagAccess`] if no flag has that name or if its value
    /// is not a `T`.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::io::Write;
    ///
    /// use cmdtree_core::*;
    ///
    /// let root = Command::new("count")
    ///     .with_flags(|f| {
    ///         f.int("step", 1, "increment");
    ///     })
    ///     .with_handler(|_, state| {
    ///         let step: i64 = state.flag("step")?;
    ///         writeln!(state.stdout, "{}", step * 2)?;
    ///         assert!(state.flag::<String>("step").is_err());
    ///         Ok(())
    ///     });
    ///
    /// parse_and_run(&RunContext::new(), &root, &["--step", "21"], RunOptions::default()).unwrap();
    /// ```
    pub fn flag<T: Any>(&self, name: &str) -> Result<T> {
        let flag = self.flags.lookup(name).ok_or_else(|| Error::FlagAccess {
            name: name.to_string(),
            reason: "flag not defined".to_string(),
        })?;
        flag.value
            .get()
            .downcast::<T>()
            .map(|value| *value)
            .map_err(|_| Error::FlagAccess {
                name: name.to_string(),
                reason: format!(
                    "type mismatch: flag holds {} but {} was requested",
                    flag.value.type_name(),
                    std::any::type_name::<T>()
                ),
            })
    }

    /// Like [`State::flag`], but panics with the [`Error`] as payload.
    ///
    /// Inside [`run`] the panic is reported as that error, without a panic
    /// location.
    pub fn get_flag<T: Any>(&self, name: &str) -> T {
        match self.flag(name) {
            Ok(value) => value,
            Err(err) => std::panic::panic_any(err),
        }
    }

    /// Returns `true` if the flag was set on the command line.
    pub fn is_set(&self, name: &str) -> bool {
        self.flags.is_set(name)
    }

    /// Commands from the root to the terminal command.
    pub fn path(&self) -> &[&'a Command] {
        &self.path
    }

    /// The command being run.
    pub fn terminal(&self) -> &'a Command {
        self.path[self.path.len() - 1]
    }

    /// Space-joined command names.
    pub fn command_path(&self) -> String {
        command_path(&self.path)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.stdout.flush()?;
        self.stderr.flush()
    }
}

/// Runs the terminal command of `resolved`.
///
/// Handler errors that are already an [`Error`] are returned as they are;
/// other handler errors become [`Error::Handler`]. A panic becomes
/// [`Error::Panic`] with the panic location, unless its payload is an
/// [`Error`], which is returned unchanged.
pub fn run(ctx: &RunContext, resolved: Resolved<'_>, options: RunOptions) -> Result<()> {
    let terminal = resolved.terminal();
    let Some(handler) = terminal.handler.clone() else {
        return Err(Error::NoHandler {
            path: resolved.command_path(),
        });
    };

    let mut state = State::new(resolved, options);
    debug!(command = %state.command_path(), args = state.args.len(), "Running handler");

    let outcome = match fault::catch(|| handler(ctx, &mut state)) {
        Ok(Ok(())) => Ok(()),
        Ok(Err(err)) => Err(match err.downcast::<Error>() {
            Ok(err) => *err,
            Err(other) => Error::Handler(other),
        }),
        Err(fault) => Err(fault_error(fault, SourceRoot::detect())),
    };

    let flushed = state.flush();
    outcome?;
    flushed?;
    Ok(())
}

fn fault_error(fault: Fault, root: &SourceRoot) -> Error {
    let location = fault
        .location
        .as_ref()
        .map(|location| location.display_relative(root));
    let message = fault.message().map(str::to_string);

    match fault.payload.downcast::<Error>() {
        Ok(err) => {
            debug!(error = %err, "Handler raised a library error");
            *err
        }
        Err(_) => {
            let message = message.unwrap_or_else(|| "Box<dyn Any>".to_string());
            debug!(message = %message, location = ?location, "Converted handler panic");
            Error::Panic { message, location }
        }
    }
}

/// Resolves `args` against `root` and runs the result with the default
/// configuration.
///
/// When help is requested, the help text and a newline are written to the
/// configured standard output and `Ok(())` is returned.
pub fn parse_and_run<S: AsRef<str>>(
    ctx: &RunContext,
    root: &Command,
    args: &[S],
    options: RunOptions,
) -> Result<()> {
    Resolver::default().parse_and_run(ctx, root, args, options)
}

impl Resolver {
    /// Resolves `args` and runs the result. See [`parse_and_run`].
    pub fn parse_and_run<S: AsRef<str>>(
        &self,
        ctx: &RunContext,
        root: &Command,
        args: &[S],
        options: RunOptions,
    ) -> Result<()> {
        match self.resolve(root, args)? {
            Resolution::Help(resolved) => {
                let mut stdout = options.stdout.unwrap_or_else(|| Box::new(io::stdout()));
                writeln!(stdout, "{}", resolved.usage())?;
                stdout.flush()?;
                Ok(())
            }
            Resolution::Ready(resolved) => run(ctx, resolved, options),
        }
    }
}
