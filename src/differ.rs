//! Line diffs for failure messages.
//!
//! Colour is cosmetic only: it never touches the compared content, and it is
//! switched off when stdout is not a terminal.

use difference::{Changeset, Difference};
use std::io::Write;
use termcolor::{Buffer, Color, ColorSpec, WriteColor};

pub trait Differ: Send + Sync {
    fn diff(&self, expected: &str, actual: &str) -> String;
}

/// Unified line diff headed by `- Snapshot` / `+ Received`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineDiffer {
    pub color: bool,
}

impl LineDiffer {
    pub fn plain() -> Self {
        Self { color: false }
    }

    pub fn colored() -> Self {
        Self { color: true }
    }

    /// Colour when stdout is an interactive terminal.
    pub fn auto() -> Self {
        Self {
            color: atty::is(atty::Stream::Stdout),
        }
    }
}

impl Default for LineDiffer {
    fn default() -> Self {
        Self::auto()
    }
}

impl Differ for LineDiffer {
    fn diff(&self, expected: &str, actual: &str) -> String {
        let mut lines = vec![
            "- Snapshot".to_string(),
            "+ Received".to_string(),
            String::new(),
        ];
        lines.extend(diff_lines(expected, actual));

        if self.color {
            render_colored(&lines)
        } else {
            lines.join("\n")
        }
    }
}

/// Line-level diff with `-`, `+` and ` ` prefixes.
pub fn diff_lines(expected: &str, actual: &str) -> Vec<String> {
    let changeset = Changeset::new(expected, actual, "\n");
    let mut lines = Vec::new();
    for diff in &changeset.diffs {
        let (prefix, chunk) = match diff {
            Difference::Same(x) => (' ', x),
            Difference::Add(x) => ('+', x),
            Difference::Rem(x) => ('-', x),
        };
        for line in chunk.split('\n') {
            lines.push(format!("{prefix}{line}"));
        }
    }
    lines
}

fn render_colored(lines: &[String]) -> String {
    let mut buf = Buffer::ansi();
    for (i, line) in lines.iter().enumerate() {
        if i > 0 {
            let _ = buf.write_all(b"\n");
        }
        if line.is_empty() {
            continue;
        }
        let color = match line.as_bytes()[0] {
            b'+' => Color::Green,
            b'-' => Color::Red,
            _ => Color::Black,
        };
        let _ = buf.set_color(ColorSpec::new().set_fg(Some(color)).set_intense(true));
        let _ = buf.write_all(line.as_bytes());
        let _ = buf.reset();
    }
    String::from_utf8_lossy(buf.as_slice()).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_precedes_the_diff() {
        let out = LineDiffer::plain().diff("a\n", "a\n");
        assert!(out.starts_with("- Snapshot\n+ Received\n\n"));
    }

    #[test]
    fn marks_removed_and_added_lines() {
        let expected = "{\n  \"c\": 3.14\n}\n";
        let actual = "{\n  \"c\": 3.15\n}\n";
        let out = LineDiffer::plain().diff(expected, actual);
        let lines: Vec<&str> = out.lines().collect();
        assert!(lines.contains(&"-  \"c\": 3.14"), "{out}");
        assert!(lines.contains(&"+  \"c\": 3.15"), "{out}");
        assert!(lines.contains(&" {"), "{out}");
    }

    #[test]
    fn plain_output_has_no_escape_codes() {
        let out = LineDiffer::plain().diff("old", "new");
        assert!(!out.contains('\x1b'));
    }

    #[test]
    fn colored_output_styles_each_line_kind() {
        let out = LineDiffer::colored().diff("same\nold", "same\nnew");
        assert!(out.contains('\x1b'));
        // Stripping the escapes gives back the plain rendering.
        let plain = LineDiffer::plain().diff("same\nold", "same\nnew");
        assert_eq!(strip_ansi(&out), plain);
    }

    fn strip_ansi(s: &str) -> String {
        let mut out = String::new();
        let mut chars = s.chars();
        while let Some(c) = chars.next() {
            if c == '\x1b' {
                for c in chars.by_ref() {
                    if c == 'm' {
                        break;
                    }
                }
            } else {
                out.push(c);
            }
        }
        out
    }
}
