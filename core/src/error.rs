//! Error types for command resolution and execution.
//!
//! Every failure the core reports is a variant of [`Error`]. Tree validation
//! and flag parsing have their own narrower enums
//! ([`ValidationError`](crate::ValidationError),
//! [`ParseError`](crate::ParseError)) which are wrapped together with the
//! command path they were raised for.

use thiserror::Error;

use crate::parse::ParseError;
use crate::validate::ValidationError;

/// Errors that can occur while resolving or running a command tree.
#[derive(Debug, Error)]
pub enum Error {
    /// The command tree failed structural validation before any token was read.
    #[error("failed to parse: {0}")]
    Invalid(#[from] ValidationError),

    /// A token did not match any subcommand of the current command.
    #[error(
        "command {path:?}: unknown command {name:?}{}",
        suggestion_suffix(.suggestions)
    )]
    UnknownCommand {
        /// Space-joined path of the command whose children were searched.
        path: String,
        /// The unmatched token.
        name: String,
        /// Similar child names, best match first.
        suggestions: Vec<String>,
    },

    /// The flags-anywhere parse rejected a token.
    #[error("command {path:?}: {source}")]
    Flag {
        /// Space-joined path of the terminal command.
        path: String,
        /// The underlying parse failure.
        source: ParseError,
    },

    /// One or more required flags were not explicitly set.
    #[error("command {path:?}: {}", missing_flags_message(.flags))]
    MissingRequired {
        /// Space-joined path of the terminal command.
        path: String,
        /// Missing flags, each rendered with its leading dash.
        flags: Vec<String>,
    },

    /// An invariant that validation should have guaranteed did not hold.
    #[error("command {path:?}: internal error: {message}")]
    Internal {
        /// Space-joined path of the terminal command.
        path: String,
        /// Description of the broken invariant.
        message: String,
    },

    /// The terminal command has no handler to run.
    #[error("command {path:?}: no exec function defined")]
    NoHandler {
        /// Space-joined path of the terminal command.
        path: String,
    },

    /// Typed flag access failed (unknown name or wrong value type).
    #[error("flag {name:?}: {reason}")]
    FlagAccess {
        /// Name used for the lookup.
        name: String,
        /// Why the lookup failed.
        reason: String,
    },

    /// Configuration could not be parsed.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Reading configuration or writing help output failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The handler returned a failure that is not one of ours.
    #[error("{0}")]
    Handler(Box<dyn std::error::Error + Send + Sync>),

    /// The handler panicked.
    #[error("panic: {message}{}", location_suffix(.location))]
    Panic {
        /// Panic payload rendered as text.
        message: String,
        /// `file:line` where the panic was raised, when it could be captured.
        location: Option<String>,
    },
}

/// Convenience alias for results with [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

fn suggestion_suffix(suggestions: &[String]) -> String {
    if suggestions.is_empty() {
        return String::new();
    }
    format!(
        ". Did you mean one of these?\n\t{}",
        suggestions.join("\n\t")
    )
}

fn missing_flags_message(flags: &[String]) -> String {
    let noun = if flags.len() > 1 { "flags" } else { "flag" };
    format!("required {noun} {:?} not set", flags.join(", "))
}

fn location_suffix(location: &Option<String>) -> String {
    match location {
        Some(location) => format!("\n\n{location}"),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_required_pluralizes() {
        let single = Error::MissingRequired {
            path: "todo".to_string(),
            flags: vec!["-file".to_string()],
        };
        assert_eq!(
            single.to_string(),
            r#"command "todo": required flag "-file" not set"#
        );

        let many = Error::MissingRequired {
            path: "todo nested hello".to_string(),
            flags: vec!["-a".to_string(), "-b".to_string()],
        };
        assert_eq!(
            many.to_string(),
            r#"command "todo nested hello": required flags "-a, -b" not set"#
        );
    }

    #[test]
    fn test_unknown_command_lists_suggestions() {
        let err = Error::UnknownCommand {
            path: "count".to_string(),
            name: "verzion".to_string(),
            suggestions: vec!["version".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "command \"count\": unknown command \"verzion\". Did you mean one of these?\n\tversion"
        );

        let plain = Error::UnknownCommand {
            path: "count".to_string(),
            name: "zzz".to_string(),
            suggestions: Vec::new(),
        };
        assert_eq!(plain.to_string(), r#"command "count": unknown command "zzz""#);
    }

    #[test]
    fn test_panic_with_and_without_location() {
        let with = Error::Panic {
            message: "boom".to_string(),
            location: Some("src/main.rs:10".to_string()),
        };
        assert_eq!(with.to_string(), "panic: boom\n\nsrc/main.rs:10");

        let without = Error::Panic {
            message: "boom".to_string(),
            location: None,
        };
        assert_eq!(without.to_string(), "panic: boom");
    }
}
