//! Flags-anywhere parsing.
//!
//! A conventional flag parser stops at the first positional argument. The
//! parser here resumes after every positional token, so flags may appear
//! before, between or after positional arguments. A literal `--` ends flag
//! interpretation; everything after it is positional.
//!
//! # Examples
//!
//! ```
//! use cmdtree_core::*;
//!
//! let mut flags = FlagSet::new();
//! flags.bool("debug", false, "").string("name", "", "");
//! let mut merged = MergedFlags::from_set(&flags);
//!
//! let args: Vec<String> = ["one", "--debug", "two", "--name", "x", "--", "--name"]
//!     .iter()
//!     .map(|s| s.to_string())
//!     .collect();
//! let positional = parse_to_end(&mut merged, &args).unwrap();
//!
//! assert_eq!(positional, vec!["one", "two", "--name"]);
//! assert!(merged.is_set("debug"));
//! assert_eq!(merged.lookup("name").unwrap().value.current(), "x");
//! ```

use thiserror::Error;

use crate::merge::MergedFlags;

/// Errors from the flags-anywhere parser.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// A flag token names no flag in the namespace.
    #[error("flag provided but not defined: -{0}")]
    Undefined(String),
    /// A non-boolean flag was the last token, with no value after it.
    #[error("flag needs an argument: -{0}")]
    MissingValue(String),
    /// A boolean flag was given text that is not a boolean.
    #[error("invalid boolean value {value:?} for -{name}: {reason}")]
    InvalidBool {
        name: String,
        value: String,
        reason: String,
    },
    /// The flag value rejected the text.
    #[error("invalid value {value:?} for flag -{name}: {reason}")]
    InvalidValue {
        name: String,
        value: String,
        reason: String,
    },
    /// Malformed flag token such as `---x` or `-=x`.
    #[error("bad flag syntax: {0}")]
    BadSyntax(String),
    /// `-h` or `-help` was given and no such flag is declared.
    #[error("help requested")]
    Help,
}

/// Where a single flag-parsing pass stopped.
enum Stop<'a> {
    /// Every token was consumed as a flag or flag value.
    Exhausted,
    /// A positional token was found; the slice holds the tokens after it.
    Positional(&'a String, &'a [String]),
    /// A `--` was found; the slice holds the tokens after it.
    Terminated(&'a [String]),
}

/// Parses `args` against `flags`, allowing flags anywhere, and returns the
/// positional tokens in order.
pub fn parse_to_end(flags: &mut MergedFlags, args: &[String]) -> Result<Vec<String>, ParseError> {
    let mut positional = Vec::new();
    let mut rest = args;

    loop {
        match parse_until_positional(flags, rest)? {
            Stop::Exhausted => return Ok(positional),
            Stop::Positional(token, remaining) => {
                positional.push(token.clone());
                rest = remaining;
            }
            Stop::Terminated(remaining) => {
                positional.extend(remaining.iter().cloned());
                return Ok(positional);
            }
        }
    }
}

/// Consumes flag tokens from the front of `args` until a positional token,
/// a `--`, or the end of input.
fn parse_until_positional<'a>(
    flags: &mut MergedFlags,
    args: &'a [String],
) -> Result<Stop<'a>, ParseError> {
    let mut i = 0;
    while i < args.len() {
        let token = &args[i];
        if token.len() < 2 || !token.starts_with('-') {
            return Ok(Stop::Positional(token, &args[i + 1..]));
        }
        if token == "--" {
            return Ok(Stop::Terminated(&args[i + 1..]));
        }

        let body = token.strip_prefix("--").unwrap_or(&token[1..]);
        if body.is_empty() || body.starts_with('-') || body.starts_with('=') {
            return Err(ParseError::BadSyntax(token.clone()));
        }

        let (name, inline) = match body.split_once('=') {
            Some((name, value)) => (name, Some(value)),
            None => (body, None),
        };

        let Some(flag) = flags.lookup(name) else {
            // Independent of the configured help tokens.
            if name == "help" || name == "h" {
                return Err(ParseError::Help);
            }
            return Err(ParseError::Undefined(name.to_string()));
        };

        i += 1;
        let is_bool = flag.is_bool();
        let value = match inline {
            Some(value) => value,
            None if is_bool => "true",
            None => {
                let Some(next) = args.get(i) else {
                    return Err(ParseError::MissingValue(name.to_string()));
                };
                i += 1;
                next.as_str()
            }
        };

        flags.set(name, value).map_err(|reason| {
            if is_bool {
                ParseError::InvalidBool {
                    name: name.to_string(),
                    value: value.to_string(),
                    reason,
                }
            } else {
                ParseError::InvalidValue {
                    name: name.to_string(),
                    value: value.to_string(),
                    reason,
                }
            }
        })?;
    }

    Ok(Stop::Exhausted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FlagSet, StringList};

    fn namespace() -> MergedFlags {
        let mut flags = FlagSet::new();
        flags
            .string("flag1", "", "")
            .string("flag2", "", "")
            .bool("flag3", false, "")
            .bool("flag4", false, "")
            .int("count", 0, "");
        MergedFlags::from_set(&flags)
    }

    fn args(tokens: &[&str]) -> Vec<String> {
        tokens.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn test_parse_to_end_empty() {
        let mut flags = namespace();
        assert_eq!(parse_to_end(&mut flags, &[]).unwrap(), Vec::<String>::new());
        assert!(!flags.is_set("flag3"));
    }

    #[test]
    fn test_parse_to_end_flags_before_and_after_args() {
        let mut flags = namespace();
        let positional = parse_to_end(
            &mut flags,
            &args(&[
                "--flag1=value1",
                "--flag3=true",
                "arg1",
                "arg2",
                "--flag2=value2",
                "--flag4=false",
                "arg3",
            ]),
        )
        .unwrap();

        assert_eq!(positional, vec!["arg1", "arg2", "arg3"]);
        assert_eq!(flags.lookup("flag1").unwrap().value.current(), "value1");
        assert_eq!(flags.lookup("flag2").unwrap().value.current(), "value2");
        assert!(flags.is_set("flag4"));
        assert_eq!(flags.lookup("flag4").unwrap().value.current(), "false");
    }

    #[test]
    fn test_parse_to_end_stops_at_delimiter() {
        let mut flags = namespace();
        let positional = parse_to_end(
            &mut flags,
            &args(&["--flag3", "arg1", "--", "arg2", "--flag4=true"]),
        )
        .unwrap();

        assert_eq!(positional, vec!["arg1", "arg2", "--flag4=true"]);
        assert!(flags.is_set("flag3"));
        assert!(!flags.is_set("flag4"));
    }

    #[test]
    fn test_parse_to_end_bool_does_not_consume_next_token() {
        let mut flags = namespace();
        let positional = parse_to_end(&mut flags, &args(&["--flag3", "true"])).unwrap();
        assert_eq!(positional, vec!["true"]);
        assert!(flags.is_set("flag3"));
    }

    #[test]
    fn test_parse_to_end_single_dash_and_separate_value() {
        let mut flags = namespace();
        let positional = parse_to_end(&mut flags, &args(&["-count", "3", "-", ""])).unwrap();
        assert_eq!(positional, vec!["-", ""]);
        assert_eq!(flags.lookup("count").unwrap().value.current(), "3");
    }

    #[test]
    fn test_parse_to_end_errors() {
        let cases: Vec<(&[&str], ParseError)> = vec![
            (
                &["arg1", "--some-unknown-flag=foo"],
                ParseError::Undefined("some-unknown-flag".to_string()),
            ),
            (&["--flag1"], ParseError::MissingValue("flag1".to_string())),
            (&["---flag1"], ParseError::BadSyntax("---flag1".to_string())),
            (&["-=x"], ParseError::BadSyntax("-=x".to_string())),
            (&["--help=true"], ParseError::Help),
            (&["-h"], ParseError::Help),
        ];
        for (tokens, expected) in cases {
            let mut flags = namespace();
            assert_eq!(parse_to_end(&mut flags, &args(tokens)), Err(expected));
        }
    }

    #[test]
    fn test_parse_to_end_reports_bad_values() {
        let mut flags = namespace();
        let err = parse_to_end(&mut flags, &args(&["--flag3=not-a-bool"])).unwrap_err();
        assert_eq!(
            err.to_string(),
            r#"invalid boolean value "not-a-bool" for -flag3: parse error"#
        );

        let err = parse_to_end(&mut flags, &args(&["--count", "many"])).unwrap_err();
        assert_eq!(
            err.to_string(),
            r#"invalid value "many" for flag -count: invalid digit found in string"#
        );
    }

    #[test]
    fn test_parse_to_end_repeated_list_flag() {
        let mut set = FlagSet::new();
        set.var("tag", StringList::new(), "");
        let mut flags = MergedFlags::from_set(&set);
        parse_to_end(&mut flags, &args(&["--tag", "a", "x", "--tag=b"])).unwrap();
        assert_eq!(flags.lookup("tag").unwrap().value.current(), "a,b");
    }
}
