//! Command tree validation.
//!
//! Checks the structural invariants of a command tree: command names and
//! their uniqueness among siblings, flag names, and flag option metadata.
//! Resolution runs this on every call, before any argument token is
//! examined, since commands are plain data and may be changed between calls.
//!
//! # Examples
//!
//! ```
//! use cmdtree_core::*;
//!
//! let root = Command::new("todo").with_subcommand(Command::new("list"));
//! assert!(validate_tree(&root).is_ok());
//!
//! // Invalid: names must start with a letter
//! let bad = Command::new("todo").with_subcommand(Command::new("1list"));
//! let err = validate_tree(&bad).unwrap_err();
//! assert!(err.to_string().starts_with(r#"command ["todo", "1list"]: name must start"#));
//! ```

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

use crate::Command;

static NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z][a-zA-Z0-9_-]*$").expect("static regex must compile"));

/// Command tree validation errors.
///
/// Every variant except [`ValidationError::EmptyRootName`] carries the path of
/// command names leading to the offending command.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The root command has an empty name.
    #[error("root command has no name")]
    EmptyRootName,
    /// A subcommand has an empty name; `parent` is the path above it.
    #[error("subcommand in path [{}] has no name", .parent.join(", "))]
    EmptySubcommandName { parent: Vec<String> },
    /// Command name does not match `^[a-zA-Z][a-zA-Z0-9_-]*$`.
    #[error(
        "command {path:?}: name must start with a letter and contain only letters, numbers, dashes (-) or underscores (_)"
    )]
    InvalidName { path: Vec<String> },
    /// Flag name is empty, starts with a dash or contains `=`.
    #[error("command {path:?}: invalid flag name {name:?}")]
    InvalidFlagName { path: Vec<String>, name: String },
    /// Two flags on the same command share a name.
    #[error("command {path:?}: flag {name:?} declared more than once")]
    DuplicateFlag { path: Vec<String>, name: String },
    /// A flag option names a flag the command does not declare itself.
    #[error("command {path:?}: flag option references unknown flag {name:?}")]
    UnknownFlagOption { path: Vec<String>, name: String },
    /// Two flag options on the same command describe the same flag.
    #[error("command {path:?}: duplicate flag option for {name:?}")]
    DuplicateFlagOption { path: Vec<String>, name: String },
    /// Two children of the same command share a name, ignoring ASCII case.
    #[error("command {path:?}: duplicate subcommand {name:?}")]
    DuplicateSubcommand { path: Vec<String>, name: String },
    /// Short alias is not an ASCII letter.
    #[error("command {path:?}: flag {name:?}: short alias must be a single ASCII letter")]
    InvalidShortAlias { path: Vec<String>, name: String },
    /// Two flag options on the same command share a short alias.
    #[error("command {path:?}: duplicate short flag {short:?}: used by {first:?} and {second:?}")]
    DuplicateShortAlias {
        path: Vec<String>,
        short: String,
        first: String,
        second: String,
    },
}

/// Validates a command tree, stopping at the first problem found.
///
/// Checks run depth-first in declaration order: a command's name, then its
/// flags, then its flag options, then its children.
pub fn validate_tree(root: &Command) -> Result<(), ValidationError> {
    if root.name.is_empty() {
        return Err(ValidationError::EmptyRootName);
    }
    let mut path = Vec::new();
    validate_command(root, &mut path)
}

fn validate_command(command: &Command, path: &mut Vec<String>) -> Result<(), ValidationError> {
    if command.name.is_empty() {
        return Err(ValidationError::EmptySubcommandName {
            parent: path.clone(),
        });
    }

    path.push(command.name.clone());
    if !NAME_RE.is_match(&command.name) {
        return Err(ValidationError::InvalidName { path: path.clone() });
    }

    validate_flags(command, path)?;
    validate_options(command, path)?;
    validate_siblings(command, path)?;

    for sub in &command.subcommands {
        validate_command(sub, path)?;
    }
    path.pop();
    Ok(())
}

/// Children are matched case-insensitively, so their names must differ in
/// more than case. Empty names are left to the per-command check.
fn validate_siblings(command: &Command, path: &[String]) -> Result<(), ValidationError> {
    let names: Vec<&str> = command
        .subcommands
        .iter()
        .map(|sub| sub.name.as_str())
        .filter(|name| !name.is_empty())
        .collect();

    for (i, name) in names.iter().enumerate() {
        if names[..i].iter().any(|earlier| earlier.eq_ignore_ascii_case(name)) {
            return Err(ValidationError::DuplicateSubcommand {
                path: path.to_vec(),
                name: name.to_string(),
            });
        }
    }

    Ok(())
}

fn validate_flags(command: &Command, path: &[String]) -> Result<(), ValidationError> {
    let mut seen = HashSet::new();

    for flag in command.flags.iter() {
        let name = flag.name.as_str();
        if name.is_empty() || name.starts_with('-') || name.contains('=') {
            return Err(ValidationError::InvalidFlagName {
                path: path.to_vec(),
                name: name.to_string(),
            });
        }
        if !seen.insert(name) {
            return Err(ValidationError::DuplicateFlag {
                path: path.to_vec(),
                name: name.to_string(),
            });
        }
    }

    Ok(())
}

fn validate_options(command: &Command, path: &[String]) -> Result<(), ValidationError> {
    let mut seen = HashSet::new();
    let mut shorts: Vec<(char, &str)> = Vec::new();

    for option in &command.options {
        let name = option.name.as_str();
        if command.flags.lookup(name).is_none() {
            return Err(ValidationError::UnknownFlagOption {
                path: path.to_vec(),
                name: name.to_string(),
            });
        }
        if !seen.insert(name) {
            return Err(ValidationError::DuplicateFlagOption {
                path: path.to_vec(),
                name: name.to_string(),
            });
        }

        let Some(short) = option.short else {
            continue;
        };
        if !short.is_ascii_alphabetic() {
            return Err(ValidationError::InvalidShortAlias {
                path: path.to_vec(),
                name: name.to_string(),
            });
        }
        if let Some((_, first)) = shorts.iter().find(|(c, _)| *c == short) {
            return Err(ValidationError::DuplicateShortAlias {
                path: path.to_vec(),
                short: short.to_string(),
                first: first.to_string(),
                second: name.to_string(),
            });
        }
        shorts.push((short, name));
    }

    Ok(())
}
