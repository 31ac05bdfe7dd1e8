//! Merged flag namespace for a resolved command path.
//!
//! Each command along a path declares its own flags. [`merge_flags`] combines
//! them into a single [`MergedFlags`] namespace that the flags-anywhere parser
//! works against:
//!
//! - the declaration closest to the terminal command wins when a name is
//!   declared at several levels;
//! - short aliases become extra lookup keys for the same cell, so `-v` and
//!   `--verbose` set one value.
//!
//! Values are cloned from the declarations, so every merge starts from the
//! declared defaults.
//!
//! # Example
//!
//! ```
//! use cmdtree_core::*;
//!
//! let root = Command::new("todo")
//!     .with_flags(|f| {
//!         f.bool("verbose", false, "").string("file", "tasks.json", "");
//!     })
//!     .with_option(FlagOption::new("verbose").short('v'));
//! let list = Command::new("list").with_flags(|f| {
//!     f.string("file", "", "");
//! });
//!
//! let mut merged = merge_flags(&[&root, &list]);
//! assert_eq!(merged.len(), 2);
//! // The deeper declaration of --file shadows the root's.
//! assert_eq!(merged.lookup("file").unwrap().default_text, "");
//!
//! merged.set("v", "true").unwrap();
//! assert_eq!(merged.lookup("verbose").unwrap().value.current(), "true");
//! assert!(merged.is_set("verbose"));
//! ```

use std::collections::{HashMap, HashSet};

use tracing::{debug, trace};

use crate::Command;
use crate::flags::{Flag, FlagSet};

/// Flag namespace assembled from every command on a resolved path.
#[derive(Debug, Clone, Default)]
pub struct MergedFlags {
    cells: Vec<Flag>,
    index: HashMap<String, usize>,
    touched: HashSet<usize>,
}

impl MergedFlags {
    /// Builds a namespace from a single flag set, without aliases.
    pub fn from_set(flags: &FlagSet) -> Self {
        let mut merged = Self::default();
        for flag in flags.iter() {
            merged.insert(flag);
        }
        merged
    }

    fn insert(&mut self, flag: &Flag) -> bool {
        if self.index.contains_key(&flag.name) {
            return false;
        }
        self.index.insert(flag.name.clone(), self.cells.len());
        self.cells.push(flag.clone());
        true
    }

    fn alias(&mut self, short: char, target: &str) -> bool {
        let key = short.to_string();
        if self.index.contains_key(&key) {
            return false;
        }
        match self.index.get(target).copied() {
            Some(cell) => {
                self.index.insert(key, cell);
                true
            }
            None => false,
        }
    }

    /// Finds a flag by long name or short alias.
    pub fn lookup(&self, key: &str) -> Option<&Flag> {
        self.index.get(key).map(|&cell| &self.cells[cell])
    }

    /// Sets a flag from command-line text and marks it as explicitly set.
    ///
    /// On failure the error is the value's own rejection reason.
    pub fn set(&mut self, key: &str, raw: &str) -> Result<(), String> {
        let Some(&cell) = self.index.get(key) else {
            return Err(format!("flag provided but not defined: -{key}"));
        };
        let flag = &mut self.cells[cell];
        flag.value.set(raw)?;
        trace!(flag = %flag.name, value = %raw, "Set flag");
        self.touched.insert(cell);
        Ok(())
    }

    /// Returns `true` if the flag was set on the command line, through either
    /// its long name or its short alias.
    pub fn is_set(&self, key: &str) -> bool {
        self.index
            .get(key)
            .is_some_and(|cell| self.touched.contains(cell))
    }

    /// Iterates the distinct flags, deepest declarations first.
    pub fn iter(&self) -> impl Iterator<Item = &Flag> {
        self.cells.iter()
    }

    /// Number of distinct flags (aliases are not counted).
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Returns `true` if no command on the path declares a flag.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// Merges the flags of every command on `path`.
///
/// Long names are registered first, walking from the terminal command up to
/// the root, so the deepest declaration of a name wins. Short aliases are
/// registered afterwards in the same order; an alias whose key is already
/// taken is skipped.
pub fn merge_flags(path: &[&Command]) -> MergedFlags {
    let mut merged = MergedFlags::default();

    for command in path.iter().rev() {
        for flag in command.flags.iter() {
            if !merged.insert(flag) {
                trace!(
                    command = %command.name,
                    flag = %flag.name,
                    "Flag shadowed by deeper declaration"
                );
            }
        }
    }

    for command in path.iter().rev() {
        for option in &command.options {
            let Some(short) = option.short else {
                continue;
            };
            // A shadowed declaration does not lend its alias to the deeper flag.
            if !is_owner(path, command, &option.name) || !merged.alias(short, &option.name) {
                trace!(command = %command.name, short = %short, "Short alias skipped");
            }
        }
    }

    debug!(flags = merged.len(), keys = merged.index.len(), "Merged flag namespace");
    merged
}

/// Returns `true` if `command` is the deepest command on `path` declaring `name`.
fn is_owner(path: &[&Command], command: &Command, name: &str) -> bool {
    path.iter()
        .rev()
        .find(|candidate| candidate.flags.lookup(name).is_some())
        .is_some_and(|owner| std::ptr::eq(*owner, command))
}
