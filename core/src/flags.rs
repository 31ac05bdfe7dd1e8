//! Per-command flag declarations.
//!
//! A [`FlagSet`] is the flag namespace owned by one [`Command`](crate::Command):
//! an ordered list of [`Flag`] records, each pairing a name with a settable
//! [`FlagValue`] and the text of its declared default.

use crate::value::{FlagValue, ScalarValue};

/// One declared flag.
#[derive(Debug, Clone)]
pub struct Flag {
    /// Flag name without leading dashes.
    pub name: String,
    /// Description shown in help text.
    pub usage: String,
    /// Value rendered at declaration time.
    pub default_text: String,
    /// The settable value.
    pub value: Box<dyn FlagValue>,
}

impl Flag {
    /// Creates a flag whose default text is taken from `value`.
    pub fn new(name: &str, value: Box<dyn FlagValue>, usage: &str) -> Self {
        Self {
            name: name.to_string(),
            usage: usage.to_string(),
            default_text: value.current(),
            value,
        }
    }

    /// Returns `true` if the flag never consumes a following value token.
    pub fn is_bool(&self) -> bool {
        self.value.is_bool()
    }

    /// Returns `true` when the declared default is a zero value (`""`, `0`,
    /// `false`) that help text should not display.
    pub fn has_zero_default(&self) -> bool {
        matches!(self.default_text.as_str(), "" | "0" | "false")
    }
}

/// Ordered flag namespace for a single command.
///
/// Declaration methods return `&mut Self` so a set can be filled in one
/// chain. Redeclaring a name is not rejected here; tree validation reports it.
///
/// # Examples
///
/// ```
/// use cmdtree_core::FlagSet;
///
/// let mut flags = FlagSet::new();
/// flags
///     .bool("verbose", false, "enable verbose output")
///     .string("output", "", "output file")
///     .int("count", 1, "number of items");
///
/// assert_eq!(flags.len(), 3);
/// assert!(flags.lookup("verbose").unwrap().is_bool());
/// assert_eq!(flags.lookup("count").unwrap().default_text, "1");
/// ```
#[derive(Debug, Clone, Default)]
pub struct FlagSet {
    flags: Vec<Flag>,
}

impl FlagSet {
    /// Creates an empty flag set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a flag backed by any [`FlagValue`].
    pub fn var(&mut self, name: &str, value: impl FlagValue + 'static, usage: &str) -> &mut Self {
        self.flags.push(Flag::new(name, Box::new(value), usage));
        self
    }

    /// Declares a boolean flag.
    pub fn bool(&mut self, name: &str, default: bool, usage: &str) -> &mut Self {
        self.var(name, ScalarValue(default), usage)
    }

    /// Declares a string flag.
    pub fn string(&mut self, name: &str, default: &str, usage: &str) -> &mut Self {
        self.var(name, ScalarValue(default.to_string()), usage)
    }

    /// Declares a signed integer flag.
    pub fn int(&mut self, name: &str, default: i64, usage: &str) -> &mut Self {
        self.var(name, ScalarValue(default), usage)
    }

    /// Declares an unsigned integer flag.
    pub fn uint(&mut self, name: &str, default: u64, usage: &str) -> &mut Self {
        self.var(name, ScalarValue(default), usage)
    }

    /// Declares a floating point flag.
    pub fn float(&mut self, name: &str, default: f64, usage: &str) -> &mut Self {
        self.var(name, ScalarValue(default), usage)
    }

    /// Finds a flag by exact name.
    pub fn lookup(&self, name: &str) -> Option<&Flag> {
        self.flags.iter().find(|flag| flag.name == name)
    }

    /// Iterates flags in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &Flag> {
        self.flags.iter()
    }

    /// Number of declared flags.
    pub fn len(&self) -> usize {
        self.flags.len()
    }

    /// Returns `true` if no flags are declared.
    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }
}

/// Metadata overlay for a flag declared on the same command.
///
/// # Examples
///
/// ```
/// use cmdtree_core::FlagOption;
///
/// let file = FlagOption::new("file").required().short('f');
/// assert!(file.required);
/// assert_eq!(file.short, Some('f'));
/// assert!(!file.local);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlagOption {
    /// Name of the flag this option describes.
    pub name: String,
    /// The flag must be explicitly set on the command line.
    pub required: bool,
    /// Single-letter alias, e.g. `v` for `-v`.
    pub short: Option<char>,
    /// Hidden from descendants' help listings. Descendants still accept it.
    pub local: bool,
}

impl FlagOption {
    /// Creates an option with no special behavior for flag `name`.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    /// Marks the flag as required.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Sets the short alias.
    pub fn short(mut self, short: char) -> Self {
        self.short = Some(short);
        self
    }

    /// Marks the flag as local to the declaring command.
    pub fn local(mut self) -> Self {
        self.local = true;
        self
    }
}
