//! Help text rendering.
//!
//! [`usage`] is the entry point: it defers to a command's custom renderer when
//! one is installed and otherwise calls [`default_usage`]. The default renderer
//! never looks at the override, so a custom renderer may call it to decorate
//! the standard output.
//!
//! # Example
//!
//! ```
//! use cmdtree_core::*;
//!
//! let root = Command::new("todo")
//!     .with_short_help("Manage a task list")
//!     .with_flags(|f| {
//!         f.bool("verbose", false, "enable verbose output");
//!     })
//!     .with_option(FlagOption::new("verbose").short('v'))
//!     .with_subcommand(Command::new("list").with_short_help("List tasks"));
//!
//! let text = usage(&[&root], &HelpConfig::default());
//! assert!(text.starts_with("Manage a task list\n\nUsage:\n  todo [flags] <command>"));
//! assert!(text.contains("  list    List tasks"));
//! assert!(text.contains("  -v, --verbose    enable verbose output"));
//! assert!(text.ends_with(r#"Use "todo [command] --help" for more information about a command."#));
//! ```

use std::collections::HashSet;
use std::fmt::Write as _;

use crate::command::{Command, command_path};
use crate::config::HelpConfig;
use crate::flags::Flag;

/// Narrowest wrap width used for description columns.
const MIN_WRAP_WIDTH: usize = 20;

/// Renders help for the last command of `path`, honoring its custom renderer.
pub fn usage(path: &[&Command], config: &HelpConfig) -> String {
    let Some(terminal) = path.last().copied() else {
        return String::new();
    };
    match &terminal.usage_fn {
        Some(render) => render(terminal),
        None => default_usage(path, config),
    }
}

/// Renders the standard help layout for the last command of `path`.
pub fn default_usage(path: &[&Command], config: &HelpConfig) -> String {
    let Some(terminal) = path.last().copied() else {
        return String::new();
    };
    let mut out = String::new();

    if let Some(short_help) = terminal.short_help.as_deref().filter(|s| !s.is_empty()) {
        out.push_str(short_help);
        out.push_str("\n\n");
    }

    out.push_str("Usage:\n");
    let usage_line = match terminal.usage.as_deref().filter(|s| !s.is_empty()) {
        Some(usage) => usage.to_string(),
        None => {
            let mut line = command_path(path);
            if path.iter().any(|command| !command.flags.is_empty()) {
                line.push_str(" [flags]");
            }
            if !terminal.subcommands.is_empty() {
                line.push_str(" <command>");
            }
            line
        }
    };
    let _ = writeln!(out, "  {usage_line}\n");

    if !terminal.subcommands.is_empty() {
        out.push_str("Available Commands:\n");
        let mut subcommands: Vec<&Command> = terminal.subcommands.iter().collect();
        subcommands.sort_by(|a, b| a.name.cmp(&b.name));

        let rows: Vec<(String, String)> = subcommands
            .iter()
            .map(|sub| (sub.name.clone(), sub.short_help.clone().unwrap_or_default()))
            .collect();
        write_rows(&mut out, &rows, config.wrap_width);
        out.push('\n');
    }

    let (local, inherited) = collect_flags(path);
    let any_short = local.iter().chain(&inherited).any(|row| row.short.is_some());
    let local_rows: Vec<(String, String)> = local.iter().map(|row| row.render(any_short)).collect();
    let inherited_rows: Vec<(String, String)> =
        inherited.iter().map(|row| row.render(any_short)).collect();
    let label_width = local_rows
        .iter()
        .chain(&inherited_rows)
        .map(|(label, _)| label.len())
        .max()
        .unwrap_or(0);

    if !local_rows.is_empty() {
        out.push_str("Flags:\n");
        write_rows_aligned(&mut out, &local_rows, label_width, config.wrap_width);
        out.push('\n');
    }
    if !inherited_rows.is_empty() {
        out.push_str("Inherited Flags:\n");
        write_rows_aligned(&mut out, &inherited_rows, label_width, config.wrap_width);
        out.push('\n');
    }

    if !terminal.subcommands.is_empty() {
        let _ = writeln!(
            out,
            "Use \"{} [command] --help\" for more information about a command.",
            command_path(path)
        );
    }

    out.trim_end_matches('\n').to_string()
}

/// A flag as listed in help text.
struct FlagRow<'a> {
    flag: &'a Flag,
    short: Option<char>,
    required: bool,
}

impl FlagRow<'_> {
    fn render(&self, any_short: bool) -> (String, String) {
        let mut label = match self.short {
            Some(short) => format!("-{short}, --{}", self.flag.name),
            None if any_short => format!("    --{}", self.flag.name),
            None => format!("--{}", self.flag.name),
        };
        if !self.flag.is_bool() {
            label.push(' ');
            label.push_str(self.flag.value.type_name());
        }

        let mut description = self.flag.usage.clone();
        if self.required {
            description.push_str(" (required)");
        } else if !self.flag.has_zero_default() {
            let _ = write!(description, " (default: {})", self.flag.default_text);
        }

        (label, description.trim_start().to_string())
    }
}

/// Splits the path's flags into the terminal command's own flags and the
/// visible ancestor flags, each sorted by name.
///
/// An ancestor flag is hidden when a deeper command redeclares its name or
/// when it is marked local.
fn collect_flags<'a>(path: &[&'a Command]) -> (Vec<FlagRow<'a>>, Vec<FlagRow<'a>>) {
    let Some((&terminal, ancestors)) = path.split_last() else {
        return (Vec::new(), Vec::new());
    };

    let row = |command: &'a Command, flag: &'a Flag| {
        let option = command.option(&flag.name);
        FlagRow {
            flag,
            short: option.and_then(|option| option.short),
            required: option.is_some_and(|option| option.required),
        }
    };

    let mut seen: HashSet<&str> = HashSet::new();
    let mut local: Vec<FlagRow<'a>> = Vec::new();
    for flag in terminal.flags.iter() {
        if seen.insert(flag.name.as_str()) {
            local.push(row(terminal, flag));
        }
    }

    let mut inherited: Vec<FlagRow<'a>> = Vec::new();
    for &command in ancestors.iter().rev() {
        for flag in command.flags.iter() {
            if !seen.insert(flag.name.as_str()) {
                continue;
            }
            if command.option(&flag.name).is_some_and(|option| option.local) {
                continue;
            }
            inherited.push(row(command, flag));
        }
    }

    local.sort_by(|a, b| a.flag.name.cmp(&b.flag.name));
    inherited.sort_by(|a, b| a.flag.name.cmp(&b.flag.name));
    (local, inherited)
}

fn write_rows(out: &mut String, rows: &[(String, String)], wrap_width: usize) {
    let label_width = rows.iter().map(|(label, _)| label.len()).max().unwrap_or(0);
    write_rows_aligned(out, rows, label_width, wrap_width);
}

/// Writes `label    description` rows, wrapping descriptions so the whole row
/// fits in `wrap_width` columns where possible.
fn write_rows_aligned(
    out: &mut String,
    rows: &[(String, String)],
    label_width: usize,
    wrap_width: usize,
) {
    let name_width = label_width + 4;
    let text_width = wrap_width.saturating_sub(name_width + 2).max(MIN_WRAP_WIDTH);
    let indent = " ".repeat(name_width + 2);

    for (label, description) in rows {
        let lines = wrap(description, text_width);
        let padding = " ".repeat(name_width - label.len());
        let first = format!("  {label}{padding}{}", lines[0]);
        let _ = writeln!(out, "{}", first.trim_end());
        for line in &lines[1..] {
            let _ = writeln!(out, "{indent}{line}");
        }
    }
}

/// Greedy word wrap. Always returns at least one line; words longer than
/// `width` get a line of their own.
pub fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut line = String::new();

    for word in text.split_whitespace() {
        if !line.is_empty() && line.len() + 1 + word.len() > width {
            lines.push(std::mem::take(&mut line));
        }
        if !line.is_empty() {
            line.push(' ');
        }
        line.push_str(word);
    }

    if !line.is_empty() || lines.is_empty() {
        lines.push(line);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FlagOption;

    fn render(path: &[&Command]) -> String {
        usage(path, &HelpConfig::default())
    }

    #[test]
    fn test_minimal_command() {
        let cmd = Command::new("simple");
        assert_eq!(render(&[&cmd]), "Usage:\n  simple");
    }

    #[test]
    fn test_type_hints_and_defaults() {
        let cmd = Command::new("test").with_flags(|f| {
            f.bool("verbose", false, "enable verbose output")
                .string("config", "/etc/config", "configuration file path")
                .int("workers", 4, "number of worker threads")
                .float("rate", 0.0, "rate limit")
                .string("output", "", "output file");
        });

        let output = render(&[&cmd]);
        assert!(output.contains("Usage:\n  test [flags]\n"));
        assert!(output.contains("Flags:\n"));
        assert!(output.contains("--config string"));
        assert!(output.contains("--workers int"));
        assert!(output.contains("--rate float"));
        assert!(!output.contains("--verbose bool"));
        assert!(output.contains("(default: /etc/config)"));
        assert!(output.contains("(default: 4)"));
        assert!(!output.contains("(default: false)"));
        assert!(!output.contains("(default: 0)"));
        assert!(!output.contains("(default: )"));
    }

    #[test]
    fn test_required_replaces_default() {
        let cmd = Command::new("test")
            .with_flags(|f| {
                f.string("file", "tasks.json", "path to file")
                    .string("output", "stdout", "output destination");
            })
            .with_option(FlagOption::new("file").required());

        let output = render(&[&cmd]);
        assert!(output.contains("path to file (required)"));
        assert!(!output.contains("(default: tasks.json)"));
        assert!(output.contains("(default: stdout)"));
    }

    #[test]
    fn test_short_aliases_align_long_names() {
        let cmd = Command::new("test")
            .with_flags(|f| {
                f.bool("verbose", false, "enable verbose output")
                    .string("output", "", "output file")
                    .string("config", "", "config file path");
            })
            .with_option(FlagOption::new("verbose").short('v'))
            .with_option(FlagOption::new("output").short('o'));

        let output = render(&[&cmd]);
        assert!(output.contains("  -v, --verbose"));
        assert!(output.contains("  -o, --output string"));
        assert!(output.contains("      --config string"));
    }

    #[test]
    fn test_no_short_aliases_means_no_padding() {
        let cmd = Command::new("test").with_flags(|f| {
            f.bool("verbose", false, "enable verbose output")
                .string("config", "", "config file path");
        });

        let output = render(&[&cmd]);
        assert!(output.contains("\n  --config string    config file path"));
        assert!(output.contains("\n  --verbose          enable verbose output"));
        assert!(!output.contains("     --verbose"));
    }

    #[test]
    fn test_inherited_flags_respect_shadowing_and_local() {
        let root = Command::new("todo")
            .with_flags(|f| {
                f.bool("verbose", false, "root verbose")
                    .string("file", "", "root file")
                    .bool("debug", false, "root only");
            })
            .with_option(FlagOption::new("debug").local());
        let child = Command::new("list").with_flags(|f| {
            f.string("file", "", "child file");
        });

        let output = render(&[&root, &child]);
        let inherited = output.split("Inherited Flags:\n").nth(1).unwrap();
        assert!(inherited.contains("--verbose"));
        assert!(!inherited.contains("--file"));
        assert!(!inherited.contains("--debug"));
        assert!(output.contains("child file"));
        assert!(!output.contains("root file"));
        assert!(output.contains("Usage:\n  todo list [flags]\n"));
    }

    #[test]
    fn test_subcommands_sorted_and_wrapped() {
        let long = "This is a very long description that should be wrapped properly when displayed in the usage output";
        let root = Command::new("parent")
            .with_subcommand(Command::new("zeta").with_short_help("last"))
            .with_subcommand(Command::new("alpha").with_short_help(long))
            .with_subcommand(Command::new("mid"));

        let output = render(&[&root]);
        let alpha = output.find("  alpha").unwrap();
        let mid = output.find("  mid\n").unwrap();
        let zeta = output.find("  zeta").unwrap();
        assert!(alpha < mid && mid < zeta);
        assert!(output.contains("\n           "));
        assert!(output.lines().all(|line| line.len() <= 80));
        assert!(output.ends_with(
            "Use \"parent [command] --help\" for more information about a command."
        ));
    }

    #[test]
    fn test_custom_usage_and_override() {
        let cmd = Command::new("custom")
            .with_usage("custom [options] <file>")
            .with_usage_fn(|cmd| format!("custom help for {}", cmd.name));

        assert_eq!(render(&[&cmd]), "custom help for custom");
        let standard = default_usage(&[&cmd], &HelpConfig::default());
        assert!(standard.contains("Usage:\n  custom [options] <file>"));
    }

    #[test]
    fn test_override_may_wrap_default_renderer() {
        let root = Command::new("todo").with_usage_fn(|cmd| {
            let path = [cmd];
            format!("{}\n\nSee the manual.", default_usage(&path, &HelpConfig::default()))
        });
        let output = render(&[&root]);
        assert_eq!(output, "Usage:\n  todo\n\nSee the manual.");
    }

    #[test]
    fn test_wrap() {
        assert_eq!(wrap("", 10), vec![""]);
        assert_eq!(wrap("one two three", 7), vec!["one two", "three"]);
        assert_eq!(wrap("unbreakableword x", 5), vec!["unbreakableword", "x"]);
    }
}
