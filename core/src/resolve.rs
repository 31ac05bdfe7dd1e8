//! Argument resolution.
//!
//! [`Resolver::resolve`] walks raw argument tokens against a command tree in
//! one pass and produces a [`Resolved`] invocation: the command path from the
//! root to the terminal command, the merged flag namespace with parsed values,
//! and the positional arguments.
//!
//! Resolution never mutates the tree. Each call builds its own path and its
//! own copies of the flag values, so resolving the same tree repeatedly cannot
//! leak state between calls.
//!
//! # Example
//!
//! ```
//! use cmdtree_core::*;
//!
//! let root = Command::new("todo")
//!     .with_flags(|f| {
//!         f.bool("verbose", false, "");
//!     })
//!     .with_subcommand(
//!         Command::new("add")
//!             .with_flags(|f| {
//!                 f.bool("dry-run", false, "");
//!             })
//!             .with_handler(|_, _| Ok(())),
//!     );
//!
//! let Resolution::Ready(resolved) =
//!     resolve(&root, &["add", "--dry-run", "item1", "--verbose"]).unwrap()
//! else {
//!     panic!("help was not requested");
//! };
//! assert_eq!(resolved.terminal().name, "add");
//! assert_eq!(resolved.args(), ["item1"]);
//! assert!(resolved.is_set("dry-run"));
//! assert!(resolved.is_set("verbose"));
//! ```

use std::collections::HashSet;

use tracing::debug;

use crate::command::{Command, command_path};
use crate::config::{Config, HelpConfig};
use crate::error::{Error, Result};
use crate::merge::{MergedFlags, merge_flags};
use crate::parse::{ParseError, parse_to_end};
use crate::suggest::find_similar;
use crate::validate::validate_tree;

/// A fully resolved invocation.
#[derive(Debug, Clone)]
pub struct Resolved<'a> {
    pub(crate) path: Vec<&'a Command>,
    pub(crate) flags: MergedFlags,
    pub(crate) args: Vec<String>,
    pub(crate) help: HelpConfig,
}

impl<'a> Resolved<'a> {
    /// Commands from the root to the terminal command.
    pub fn path(&self) -> &[&'a Command] {
        &self.path
    }

    /// The deepest command reached; the one whose handler runs.
    pub fn terminal(&self) -> &'a Command {
        self.path[self.path.len() - 1]
    }

    /// Positional arguments, with `--` remainder appended verbatim.
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Merged flag namespace with parsed values.
    pub fn flags(&self) -> &MergedFlags {
        &self.flags
    }

    /// Space-joined command names, e.g. `todo task add`.
    pub fn command_path(&self) -> String {
        command_path(&self.path)
    }

    /// Help settings used to render this invocation's help text.
    pub fn help(&self) -> &HelpConfig {
        &self.help
    }

    /// Returns `true` if the flag (long name or short alias) was set on the
    /// command line.
    pub fn is_set(&self, name: &str) -> bool {
        self.flags.is_set(name)
    }

    /// Renders help text for the terminal command.
    pub fn usage(&self) -> String {
        crate::help::usage(&self.path, &self.help)
    }
}

/// Outcome of a successful resolution.
#[derive(Debug, Clone)]
pub enum Resolution<'a> {
    /// Arguments were parsed and the terminal command has a handler.
    Ready(Resolved<'a>),
    /// A help token was given. Flags are merged but not parsed; render
    /// [`Resolved::usage`] and exit successfully.
    Help(Resolved<'a>),
}

impl<'a> Resolution<'a> {
    /// Returns `true` for [`Resolution::Help`].
    pub fn is_help(&self) -> bool {
        matches!(self, Resolution::Help(_))
    }

    /// The resolved invocation, whichever variant this is.
    pub fn resolved(&self) -> &Resolved<'a> {
        match self {
            Resolution::Ready(resolved) | Resolution::Help(resolved) => resolved,
        }
    }

    /// Consumes the resolution, returning the resolved invocation.
    pub fn into_resolved(self) -> Resolved<'a> {
        match self {
            Resolution::Ready(resolved) | Resolution::Help(resolved) => resolved,
        }
    }
}

/// Resolves argument lists against command trees using a [`Config`].
#[derive(Debug, Clone, Default)]
pub struct Resolver {
    config: Config,
}

impl Resolver {
    /// Creates a resolver with the given configuration.
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Resolves `args` (the argument vector without the program name) against
    /// the tree rooted at `root`.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::Invalid`] for a malformed tree,
    /// [`Error::UnknownCommand`] when a token matches no subcommand,
    /// [`Error::Flag`] when flag parsing fails, [`Error::MissingRequired`]
    /// when required flags were not given, and [`Error::NoHandler`] when the
    /// terminal command cannot run.
    pub fn resolve<'a, S: AsRef<str>>(
        &self,
        root: &'a Command,
        args: &[S],
    ) -> Result<Resolution<'a>> {
        validate_tree(root)?;

        let args: Vec<String> = args.iter().map(|arg| arg.as_ref().to_string()).collect();
        let (parseable, remainder) = match args.iter().position(|arg| arg == "--") {
            Some(at) => (&args[..at], &args[at + 1..]),
            None => (&args[..], &args[args.len()..]),
        };

        let path = self.traverse(root, parseable)?;
        let path_text = command_path(&path);

        let mut flags = merge_flags(&path);

        if parseable.iter().any(|arg| self.config.help.is_help_token(arg)) {
            debug!(command = %path_text, "Help requested");
            return Ok(Resolution::Help(self.resolved(path, flags, Vec::new())));
        }

        let positional = match parse_to_end(&mut flags, parseable) {
            Ok(positional) => positional,
            Err(ParseError::Help) => {
                debug!(command = %path_text, "Help requested through undeclared help flag");
                return Ok(Resolution::Help(self.resolved(path, flags, Vec::new())));
            }
            Err(source) => {
                return Err(Error::Flag {
                    path: path_text,
                    source,
                });
            }
        };

        check_required(&path, &flags, &path_text)?;

        let mut final_args = strip_command_names(&path, positional);
        final_args.extend(remainder.iter().cloned());

        if path[path.len() - 1].handler.is_none() {
            return Err(Error::NoHandler { path: path_text });
        }

        debug!(command = %path_text, args = final_args.len(), "Resolved invocation");
        Ok(Resolution::Ready(self.resolved(path, flags, final_args)))
    }

    fn resolved<'a>(
        &self,
        path: Vec<&'a Command>,
        flags: MergedFlags,
        args: Vec<String>,
    ) -> Resolved<'a> {
        Resolved {
            path,
            flags,
            args,
            help: self.config.help.clone(),
        }
    }

    /// Descends the tree over the tokens before `--`, skipping flags and the
    /// values of flags already known to take one.
    fn traverse<'a>(&self, root: &'a Command, tokens: &[String]) -> Result<Vec<&'a Command>> {
        let mut path = vec![root];
        let mut current = root;
        let mut known = merge_flags(&path);
        let mut i = 0;

        while i < tokens.len() {
            let token = &tokens[i];

            if token.starts_with('-') {
                i += flag_stride(&known, token);
                continue;
            }

            if current.subcommands.is_empty() {
                break;
            }

            match current.find_subcommand(token) {
                Some(sub) => {
                    debug!(command = %sub.name, "Descended into subcommand");
                    path.push(sub);
                    known = merge_flags(&path);
                    current = sub;
                    i += 1;
                }
                None => {
                    let suggestions =
                        find_similar(token, &current.subcommand_names(), &self.config.suggest);
                    return Err(Error::UnknownCommand {
                        path: command_path(&path),
                        name: token.clone(),
                        suggestions,
                    });
                }
            }
        }

        Ok(path)
    }
}

/// Resolves `args` against `root` with the default configuration.
///
/// See [`Resolver::resolve`].
pub fn resolve<'a, S: AsRef<str>>(root: &'a Command, args: &[S]) -> Result<Resolution<'a>> {
    Resolver::default().resolve(root, args)
}

/// Number of tokens a flag occupies during traversal.
///
/// `known` is the merged namespace of the path so far, so arity follows the
/// same name and alias precedence as the authoritative parse. Flags not
/// declared anywhere on the path yet are assumed to take no separate value.
fn flag_stride(known: &MergedFlags, token: &str) -> usize {
    if token.contains('=') {
        return 1;
    }
    let name = token.trim_start_matches('-');
    match known.lookup(name) {
        Some(flag) if !flag.is_bool() => {
            debug!(flag = %flag.name, "Skipping flag value during traversal");
            2
        }
        _ => 1,
    }
}

fn check_required(path: &[&Command], flags: &MergedFlags, path_text: &str) -> Result<()> {
    let mut missing = Vec::new();
    let mut seen = HashSet::new();

    for command in path {
        for option in command.options.iter().filter(|option| option.required) {
            if flags.lookup(&option.name).is_none() {
                return Err(Error::Internal {
                    path: path_text.to_string(),
                    message: format!("required flag -{} not found in flag set", option.name),
                });
            }
            if !flags.is_set(&option.name) && seen.insert(option.name.as_str()) {
                missing.push(format!("-{}", option.name));
            }
        }
    }

    if missing.is_empty() {
        Ok(())
    } else {
        Err(Error::MissingRequired {
            path: path_text.to_string(),
            flags: missing,
        })
    }
}

/// Drops the leading positionals that echo the traversed subcommand names.
fn strip_command_names(path: &[&Command], positional: Vec<String>) -> Vec<String> {
    let mut names = path.iter().skip(1).map(|command| command.name.as_str());
    let mut positional = positional.into_iter().peekable();

    while let (Some(arg), Some(name)) = (positional.peek(), names.next()) {
        if !arg.eq_ignore_ascii_case(name) {
            break;
        }
        positional.next();
    }

    positional.collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FlagOption;

    fn noop() -> Command {
        Command::new("noop").with_handler(|_, _| Ok(()))
    }

    fn tree() -> Command {
        Command::new("todo")
            .with_flags(|f| {
                f.string("output", "", "").bool("verbose", false, "");
            })
            .with_option(FlagOption::new("output").short('o'))
            .with_subcommand(
                Command::new("parent").with_subcommand(
                    Command::new("child")
                        .with_flags(|f| {
                            f.string("file", "", "");
                        })
                        .with_option(FlagOption::new("file").required())
                        .with_handler(|_, _| Ok(())),
                ),
            )
            .with_subcommand(Command::new("list").with_handler(|_, _| Ok(())))
    }

    fn ready<'a>(root: &'a Command, args: &[&str]) -> Resolved<'a> {
        match resolve(root, args).unwrap() {
            Resolution::Ready(resolved) => resolved,
            Resolution::Help(_) => panic!("unexpected help for {args:?}"),
        }
    }

    #[test]
    fn test_ancestor_flag_value_is_not_a_command() {
        let root = tree();
        let resolved = ready(&root, &["parent", "--output", "foo", "child", "--file", "x"]);
        assert_eq!(resolved.command_path(), "todo parent child");
        assert_eq!(resolved.flags().lookup("output").unwrap().value.current(), "foo");
        assert!(resolved.args().is_empty());
    }

    #[test]
    fn test_short_alias_value_is_skipped_during_traversal() {
        let root = tree();
        let resolved = ready(&root, &["-o", "parent", "parent", "child", "-file=x"]);
        assert_eq!(resolved.terminal().name, "child");
        assert_eq!(resolved.flags().lookup("output").unwrap().value.current(), "parent");
    }

    #[test]
    fn test_long_name_beats_deeper_alias_during_traversal() {
        let root = Command::new("root")
            .with_flags(|f| {
                f.string("v", "", "value flag");
            })
            .with_subcommand(
                Command::new("child")
                    .with_flags(|f| {
                        f.bool("verbose", false, "");
                    })
                    .with_option(FlagOption::new("verbose").short('v'))
                    .with_subcommand(Command::new("grand").with_handler(|_, _| Ok(()))),
            );

        let resolved = ready(&root, &["child", "-v", "val", "grand"]);
        assert_eq!(resolved.command_path(), "root child grand");
        assert_eq!(resolved.flags().lookup("v").unwrap().value.current(), "val");
        assert!(!resolved.is_set("verbose"));
        assert!(resolved.args().is_empty());
    }

    #[test]
    fn test_unknown_command_without_suggestions() {
        let root = tree();
        let err = resolve(&root, &["zzzzzz"]).unwrap_err();
        assert_eq!(err.to_string(), r#"command "todo": unknown command "zzzzzz""#);
    }

    #[test]
    fn test_router_without_handler() {
        let root = tree();
        let err = resolve(&root, &["parent"]).unwrap_err();
        assert_eq!(
            err.to_string(),
            r#"command "todo parent": no exec function defined"#
        );
    }

    #[test]
    fn test_parse_errors_come_before_missing_handler() {
        let root = tree();
        let err = resolve(&root, &["parent", "--bogus"]).unwrap_err();
        assert_eq!(
            err.to_string(),
            r#"command "todo parent": flag provided but not defined: -bogus"#
        );
    }

    #[test]
    fn test_help_on_router_command() {
        let root = tree();
        let resolution = resolve(&root, &["parent", "--help"]).unwrap();
        assert!(resolution.is_help());
        assert_eq!(resolution.resolved().command_path(), "todo parent");
    }

    #[test]
    fn test_help_after_delimiter_is_positional() {
        let root = tree();
        let resolved = ready(&root, &["list", "--", "--help"]);
        assert_eq!(resolved.args(), ["--help"]);
    }

    #[test]
    fn test_configured_help_tokens() {
        let root = tree();
        let mut config = Config::default();
        config.help.help_tokens = vec!["-?".to_string()];
        let resolver = Resolver::new(config);
        assert!(resolver.resolve(&root, &["list", "-?"]).unwrap().is_help());
        // -h remains a help request through the parser.
        assert!(resolver.resolve(&root, &["list", "-h"]).unwrap().is_help());

        let mut config = Config::default();
        config.help.help_tokens.clear();
        let resolver = Resolver::new(config);
        assert!(resolver.resolve(&root, &["list", "--help"]).unwrap().is_help());
        assert!(resolver.resolve(&root, &["list", "--help=false"]).unwrap().is_help());

        // A declared help flag is an ordinary flag.
        let declared = Command::new("todo")
            .with_flags(|f| {
                f.bool("help", false, "");
            })
            .with_handler(|_, _| Ok(()));
        let resolution = resolver.resolve(&declared, &["--help"]).unwrap();
        assert!(!resolution.is_help());
        assert!(resolution.resolved().is_set("help"));
    }

    #[test]
    fn test_command_names_after_terminal_stay_positional() {
        let root = tree();
        let resolved = ready(&root, &["LIST", "list", "parent"]);
        assert_eq!(resolved.terminal().name, "list");
        assert_eq!(resolved.args(), ["list", "parent"]);
    }

    #[test]
    fn test_leaf_root_takes_all_tokens_as_args() {
        let root = noop();
        let resolved = ready(&root, &["a", "b"]);
        assert_eq!(resolved.path().len(), 1);
        assert_eq!(resolved.args(), ["a", "b"]);
    }

    #[test]
    fn test_invalid_tree_is_reported_before_tokens() {
        let root = Command::new("todo").with_subcommand(Command::new("bad name"));
        let err = resolve(&root, &["anything"]).unwrap_err();
        assert!(matches!(err, Error::Invalid(_)));
        assert!(err.to_string().starts_with("failed to parse: command [\"todo\", \"bad name\"]"));
    }

    #[test]
    fn test_strip_command_names_stops_at_first_mismatch() {
        let root = tree();
        let parent = root.find_subcommand("parent").unwrap();
        let child = parent.find_subcommand("child").unwrap();
        let path = vec![&root, parent, child];
        let positional = vec!["parent".to_string(), "x".to_string(), "child".to_string()];
        assert_eq!(strip_command_names(&path, positional), vec!["x", "child"]);
    }
}
