//! Positional line diff.
//!
//! Both inputs are walked line by line in lockstep. Lines at the same
//! position that differ are reported as changed; once one side runs out, the
//! rest of the other side is reported as added or removed. This is not a
//! minimal edit script: an inserted line shifts every following line and
//! shows up as a run of changes.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineChange {
    Changed { line: usize, old: String, new: String },
    Added { line: usize, content: String },
    Removed { line: usize, content: String },
}

impl LineChange {
    /// 1-based line number the change refers to.
    pub fn line(&self) -> usize {
        match self {
            LineChange::Changed { line, .. }
            | LineChange::Added { line, .. }
            | LineChange::Removed { line, .. } => *line,
        }
    }
}

impl fmt::Display for LineChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LineChange::Changed { line, old, new } => {
                writeln!(f, "Line {line} changed:")?;
                writeln!(f, "- {}", old.trim_end_matches('\n'))?;
                write!(f, "+ {}", new.trim_end_matches('\n'))
            }
            LineChange::Added { line, content } => {
                writeln!(f, "Line {line} added:")?;
                write!(f, "+ {}", content.trim_end_matches('\n'))
            }
            LineChange::Removed { line, content } => {
                writeln!(f, "Line {line} removed:")?;
                write!(f, "- {}", content.trim_end_matches('\n'))
            }
        }
    }
}

/// Splits on `\n`, keeping each line's terminator so that a missing final
/// newline counts as a difference.
fn split_lines(content: &[u8]) -> impl Iterator<Item = &[u8]> {
    content.split_inclusive(|&b| b == b'\n')
}

fn text(line: &[u8]) -> String {
    String::from_utf8_lossy(line).into_owned()
}

/// Compares `old` against `new`.
pub fn diff(old: &[u8], new: &[u8]) -> Vec<LineChange> {
    let mut old_lines = split_lines(old);
    let mut new_lines = split_lines(new);
    let mut changes = Vec::new();

    for line in 1.. {
        let change = match (old_lines.next(), new_lines.next()) {
            (None, None) => break,
            (Some(a), Some(b)) if a == b => continue,
            (Some(a), Some(b)) => LineChange::Changed {
                line,
                old: text(a),
                new: text(b),
            },
            (Some(a), None) => LineChange::Removed {
                line,
                content: text(a),
            },
            (None, Some(b)) => LineChange::Added {
                line,
                content: text(b),
            },
        };
        changes.push(change);
    }

    changes
}
