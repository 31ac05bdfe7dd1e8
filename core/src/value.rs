//! Settable flag values.
//!
//! The core never looks at concrete flag types. Every flag holds a boxed
//! [`FlagValue`], which knows how to parse itself from a command-line string,
//! render its current value, and report whether it may appear without a value
//! token.
//!
//! Scalar adapters for `bool`, `String`, `i64`, `u64` and `f64` are provided
//! through [`ScalarValue`]; [`StringList`] and [`Choice`] show how richer
//! adapters plug into the same capability.

use std::any::Any;
use std::fmt;

/// A value that can be set from command-line text.
///
/// # Examples
///
/// ```
/// use cmdtree_core::{FlagValue, ScalarValue};
///
/// let mut count = ScalarValue(0_i64);
/// count.set("42").unwrap();
/// assert_eq!(count.current(), "42");
/// assert_eq!(count.type_name(), "int");
/// assert!(count.set("many").is_err());
/// ```
pub trait FlagValue: fmt::Debug + Send + Sync {
    /// Parses `raw` and stores it, or explains why it was rejected.
    fn set(&mut self, raw: &str) -> Result<(), String>;

    /// Renders the current value as text.
    fn current(&self) -> String;

    /// Boolean-like values may appear without a value token.
    fn is_bool(&self) -> bool {
        false
    }

    /// Short human-readable type tag shown in help text (e.g. `string`).
    fn type_name(&self) -> &'static str;

    /// Returns a copy of the current value for typed retrieval.
    fn get(&self) -> Box<dyn Any>;

    /// Clones the value behind the trait object.
    fn clone_box(&self) -> Box<dyn FlagValue>;
}

impl Clone for Box<dyn FlagValue> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

/// Plain values usable with [`ScalarValue`].
pub trait Scalar: Clone + fmt::Debug + Send + Sync + 'static {
    /// Type tag reported by [`FlagValue::type_name`].
    const TYPE_NAME: &'static str;
    /// Whether the flag may be given without a value.
    const IS_BOOL: bool = false;

    /// Parses command-line text.
    fn parse_text(raw: &str) -> Result<Self, String>;

    /// Renders the value back to text.
    fn render(&self) -> String;
}

impl Scalar for bool {
    const TYPE_NAME: &'static str = "bool";
    const IS_BOOL: bool = true;

    fn parse_text(raw: &str) -> Result<Self, String> {
        parse_bool(raw)
    }

    fn render(&self) -> String {
        self.to_string()
    }
}

impl Scalar for String {
    const TYPE_NAME: &'static str = "string";

    fn parse_text(raw: &str) -> Result<Self, String> {
        Ok(raw.to_string())
    }

    fn render(&self) -> String {
        self.clone()
    }
}

impl Scalar for i64 {
    const TYPE_NAME: &'static str = "int";

    fn parse_text(raw: &str) -> Result<Self, String> {
        raw.parse().map_err(|err: std::num::ParseIntError| err.to_string())
    }

    fn render(&self) -> String {
        self.to_string()
    }
}

impl Scalar for u64 {
    const TYPE_NAME: &'static str = "uint";

    fn parse_text(raw: &str) -> Result<Self, String> {
        raw.parse().map_err(|err: std::num::ParseIntError| err.to_string())
    }

    fn render(&self) -> String {
        self.to_string()
    }
}

impl Scalar for f64 {
    const TYPE_NAME: &'static str = "float";

    fn parse_text(raw: &str) -> Result<Self, String> {
        raw.parse()
            .map_err(|err: std::num::ParseFloatError| err.to_string())
    }

    fn render(&self) -> String {
        self.to_string()
    }
}

/// A [`FlagValue`] holding a single [`Scalar`].
#[derive(Debug, Clone, PartialEq)]
pub struct ScalarValue<T>(pub T);

impl<T: Scalar> FlagValue for ScalarValue<T> {
    fn set(&mut self, raw: &str) -> Result<(), String> {
        self.0 = T::parse_text(raw)?;
        Ok(())
    }

    fn current(&self) -> String {
        self.0.render()
    }

    fn is_bool(&self) -> bool {
        T::IS_BOOL
    }

    fn type_name(&self) -> &'static str {
        T::TYPE_NAME
    }

    fn get(&self) -> Box<dyn Any> {
        Box::new(self.0.clone())
    }

    fn clone_box(&self) -> Box<dyn FlagValue> {
        Box::new(self.clone())
    }
}

/// Parses the boolean spellings accepted on the command line.
///
/// Accepts `1 t T TRUE true True` and `0 f F FALSE false False`.
pub fn parse_bool(raw: &str) -> Result<bool, String> {
    match raw {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Ok(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Ok(false),
        _ => Err("parse error".to_string()),
    }
}

/// Repeatable flag collecting every occurrence, e.g. `--tag a --tag b`.
///
/// Retrieve with `Vec<String>`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StringList {
    values: Vec<String>,
}

impl StringList {
    /// Creates an empty list.
    pub fn new() -> Self {
        Self::default()
    }
}

impl FlagValue for StringList {
    fn set(&mut self, raw: &str) -> Result<(), String> {
        self.values.push(raw.to_string());
        Ok(())
    }

    fn current(&self) -> String {
        self.values.join(",")
    }

    fn type_name(&self) -> &'static str {
        "strings"
    }

    fn get(&self) -> Box<dyn Any> {
        Box::new(self.values.clone())
    }

    fn clone_box(&self) -> Box<dyn FlagValue> {
        Box::new(self.clone())
    }
}

/// Flag restricted to one of a fixed set of values.
///
/// Retrieve with `String`.
///
/// # Examples
///
/// ```
/// use cmdtree_core::{Choice, FlagValue};
///
/// let mut format = Choice::new(["json", "yaml"]);
/// assert!(format.set("toml").is_err());
/// format.set("yaml").unwrap();
/// assert_eq!(format.current(), "yaml");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice {
    value: String,
    allowed: Vec<String>,
}

impl Choice {
    /// Creates a choice with no initial value.
    pub fn new<I, S>(allowed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            value: String::new(),
            allowed: allowed.into_iter().map(Into::into).collect(),
        }
    }

    /// Creates a choice preset to `default`, which must be one of `allowed`.
    pub fn with_default<I, S>(default: &str, allowed: I) -> Result<Self, String>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut choice = Self::new(allowed);
        choice.set(default)?;
        Ok(choice)
    }

    /// Returns the permitted values.
    pub fn allowed(&self) -> &[String] {
        &self.allowed
    }
}

impl FlagValue for Choice {
    fn set(&mut self, raw: &str) -> Result<(), String> {
        if !self.allowed.iter().any(|allowed| allowed == raw) {
            return Err(format!("must be one of: {}", self.allowed.join(", ")));
        }
        self.value = raw.to_string();
        Ok(())
    }

    fn current(&self) -> String {
        self.value.clone()
    }

    fn type_name(&self) -> &'static str {
        "string"
    }

    fn get(&self) -> Box<dyn Any> {
        Box::new(self.value.clone())
    }

    fn clone_box(&self) -> Box<dyn FlagValue> {
        Box::new(self.clone())
    }
}
