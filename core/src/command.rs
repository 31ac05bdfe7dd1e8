//! The command tree.

use std::fmt;
use std::sync::Arc;

use crate::flags::{Flag, FlagOption, FlagSet};
use crate::run::{RunContext, State};

/// Result returned by a command handler.
pub type HandlerResult = std::result::Result<(), Box<dyn std::error::Error + Send + Sync>>;

/// Function run when a command is the terminal command of an invocation.
pub type Handler = Arc<dyn Fn(&RunContext, &mut State<'_>) -> HandlerResult + Send + Sync>;

/// Custom help renderer for a command.
pub type UsageFn = Arc<dyn Fn(&Command) -> String + Send + Sync>;

/// A node in the command tree.
///
/// Commands are plain data built once by the embedding application. Resolving
/// arguments against a tree never mutates it; see [`resolve`](crate::resolve).
///
/// # Examples
///
/// ```
/// use cmdtree_core::{Command, FlagOption};
///
/// let root = Command::new("todo")
///     .with_flags(|f| {
///         f.bool("verbose", false, "enable verbose output");
///     })
///     .with_option(FlagOption::new("verbose").short('v'))
///     .with_subcommand(Command::new("list").with_short_help("List tasks"));
///
/// assert!(root.find_subcommand("LIST").is_some());
/// assert_eq!(root.lookup_flag("v").unwrap().name, "verbose");
/// ```
#[derive(Clone, Default)]
pub struct Command {
    /// Name matched case-insensitively against argument tokens.
    pub name: String,
    /// Usage line shown after `Usage:` in help text.
    pub usage: Option<String>,
    /// One-line description.
    pub short_help: Option<String>,
    /// Replaces the default help renderer for this command.
    pub usage_fn: Option<UsageFn>,
    /// Flags declared on this command.
    pub flags: FlagSet,
    /// Metadata for flags in [`Command::flags`].
    pub options: Vec<FlagOption>,
    /// Child commands in declaration order.
    pub subcommands: Vec<Command>,
    /// Handler run when this command is terminal.
    pub handler: Option<Handler>,
}

impl Command {
    /// Creates a command with no flags, children or handler.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    /// Sets the usage line.
    pub fn with_usage(mut self, usage: &str) -> Self {
        self.usage = Some(usage.to_string());
        self
    }

    /// Sets the one-line description.
    pub fn with_short_help(mut self, short_help: &str) -> Self {
        self.short_help = Some(short_help.to_string());
        self
    }

    /// Installs a custom help renderer.
    pub fn with_usage_fn<F>(mut self, usage_fn: F) -> Self
    where
        F: Fn(&Command) -> String + Send + Sync + 'static,
    {
        self.usage_fn = Some(Arc::new(usage_fn));
        self
    }

    /// Declares flags through a closure over this command's [`FlagSet`].
    pub fn with_flags<F>(mut self, declare: F) -> Self
    where
        F: FnOnce(&mut FlagSet),
    {
        declare(&mut self.flags);
        self
    }

    /// Adds metadata for one of this command's flags.
    pub fn with_option(mut self, option: FlagOption) -> Self {
        self.options.push(option);
        self
    }

    /// Appends a child command.
    pub fn with_subcommand(mut self, subcommand: Command) -> Self {
        self.subcommands.push(subcommand);
        self
    }

    /// Sets the handler.
    pub fn with_handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(&RunContext, &mut State<'_>) -> HandlerResult + Send + Sync + 'static,
    {
        self.handler = Some(Arc::new(handler));
        self
    }

    /// Finds a direct child by name, ignoring ASCII case.
    pub fn find_subcommand(&self, name: &str) -> Option<&Command> {
        self.subcommands
            .iter()
            .find(|sub| sub.name.eq_ignore_ascii_case(name))
    }

    /// Child names in declaration order.
    pub fn subcommand_names(&self) -> Vec<&str> {
        self.subcommands.iter().map(|sub| sub.name.as_str()).collect()
    }

    /// Returns the option declared for flag `name`, if any.
    pub fn option(&self, name: &str) -> Option<&FlagOption> {
        self.options.iter().find(|option| option.name == name)
    }

    /// Looks up one of this command's own flags by long name or short alias.
    pub fn lookup_flag(&self, name: &str) -> Option<&Flag> {
        if let Some(flag) = self.flags.lookup(name) {
            return Some(flag);
        }
        let mut chars = name.chars();
        let (Some(short), None) = (chars.next(), chars.next()) else {
            return None;
        };
        self.options
            .iter()
            .find(|option| option.short == Some(short))
            .and_then(|option| self.flags.lookup(&option.name))
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("name", &self.name)
            .field("usage", &self.usage)
            .field("short_help", &self.short_help)
            .field("usage_fn", &self.usage_fn.is_some())
            .field("flags", &self.flags)
            .field("options", &self.options)
            .field("subcommands", &self.subcommands)
            .field("handler", &self.handler.is_some())
            .finish()
    }
}

/// Joins command names with spaces, e.g. `todo task add`.
pub fn command_path(path: &[&Command]) -> String {
    path.iter()
        .map(|command| command.name.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}
