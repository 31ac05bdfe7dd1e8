//! Command trees, flags-anywhere parsing and help rendering for CLI
//! front-ends.
//!
//! This crate turns an argument vector into a resolved invocation of a command
//! in a tree of named commands:
//!
//! - [`Command`]: a node in the tree, owning a [`FlagSet`], a list of
//!   [`FlagOption`]s (required, short alias, local) and its subcommands.
//! - [`resolve`] / [`Resolver`]: walks the tokens, descends into
//!   subcommands, merges flags from every command on the path (deepest
//!   declaration wins) and parses flags wherever they appear.
//! - [`usage`]: renders help text for a resolved path.
//! - [`run`] / [`parse_and_run`]: calls the terminal command's handler and
//!   converts panics into [`Error`]s.
//!
//! Resolution never mutates the tree: every call returns its own
//! [`Resolved`] value holding the path, the parsed flags and the positional
//! arguments.
//!
//! # Example
//!
//! ```
//! use cmdtree_core::*;
//!
//! let root = Command::new("todo")
//!     .with_flags(|f| {
//!         f.bool("verbose", false, "enable verbose output");
//!     })
//!     .with_option(FlagOption::new("verbose").short('v'))
//!     .with_subcommand(
//!         Command::new("task")
//!             .with_flags(|f| {
//!                 f.string("file", "", "task file");
//!             })
//!             .with_option(FlagOption::new("file").required())
//!             .with_subcommand(
//!                 Command::new("add")
//!                     .with_short_help("Add a task")
//!                     .with_handler(|_, state| {
//!                         let file: String = state.flag("file")?;
//!                         assert_eq!(file, "tasks.json");
//!                         assert_eq!(state.args, ["buy", "milk"]);
//!                         Ok(())
//!                     }),
//!             ),
//!     );
//!
//! // Flags may appear anywhere, including before the subcommand that declares them.
//! let args = ["task", "add", "buy", "-v", "--file", "tasks.json", "milk"];
//! parse_and_run(&RunContext::new(), &root, &args, RunOptions::default()).unwrap();
//!
//! // Missing required flags are reported together.
//! let err = resolve(&root, &["task", "add"]).unwrap_err();
//! assert_eq!(err.to_string(), r#"command "todo task add": required flag "-file" not set"#);
//! ```

mod command;
mod config;
mod error;
mod fault;
mod flags;
mod help;
mod merge;
mod parse;
mod resolve;
mod run;
mod suggest;
mod validate;
mod value;

pub use command::{Command, Handler, HandlerResult, UsageFn, command_path};
pub use config::{Config, HelpConfig, SuggestConfig};
pub use error::{Error, Result};
pub use fault::{Fault, PanicLocation, SourceRoot, catch};
pub use flags::{Flag, FlagOption, FlagSet};
pub use help::{default_usage, usage, wrap};
pub use merge::{MergedFlags, merge_flags};
pub use parse::{ParseError, parse_to_end};
pub use resolve::{Resolution, Resolved, Resolver, resolve};
pub use run::{RunContext, RunOptions, State, parse_and_run, run};
pub use suggest::find_similar;
pub use validate::{ValidationError, validate_tree};
pub use value::{Choice, FlagValue, Scalar, ScalarValue, StringList, parse_bool};
