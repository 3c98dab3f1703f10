//! Text rendering for command output.
//!
//! Everything here returns strings so the CLI decides where they go. Colour
//! is applied only when the palette is enabled.

use std::fmt::Write as _;

use owo_colors::OwoColorize;

use crate::storage::{ChangeKind, CommitDiff, CommitRecord, DiffSegment, Digest, SegmentTag};

const SEPARATOR: &str = "__________________________________________________________________________";

/// Whether to emit ANSI colours.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub enabled: bool,
}

impl Palette {
    pub fn plain() -> Self {
        Self { enabled: false }
    }

    pub fn colored() -> Self {
        Self { enabled: true }
    }

    fn added(&self, text: &str) -> String {
        if self.enabled {
            text.green().to_string()
        } else {
            text.to_string()
        }
    }

    fn removed(&self, text: &str) -> String {
        if self.enabled {
            text.red().to_string()
        } else {
            text.to_string()
        }
    }

    fn unchanged(&self, text: &str) -> String {
        if self.enabled {
            text.bright_black().to_string()
        } else {
            text.to_string()
        }
    }

    fn heading(&self, text: &str) -> String {
        if self.enabled {
            text.bold().to_string()
        } else {
            text.to_string()
        }
    }

    fn digest(&self, text: &str) -> String {
        if self.enabled {
            text.yellow().to_string()
        } else {
            text.to_string()
        }
    }
}

/// Render diff segments, prefixing added lines with `++` and removed ones
/// with `--`. Unchanged lines are copied as they are.
pub fn render_segments(segments: &[DiffSegment], palette: Palette) -> String {
    let mut out = String::new();
    for segment in segments {
        for line in segment.value.split_inclusive('\n') {
            let rendered = match segment.tag {
                SegmentTag::Added => palette.added(&format!("++{}", line)),
                SegmentTag::Removed => palette.removed(&format!("--{}", line)),
                SegmentTag::Unchanged => palette.unchanged(line),
            };
            out.push_str(&rendered);
        }
    }
    out
}

/// One `log` entry.
pub fn render_log_entry(digest: &Digest, commit: &CommitRecord, palette: Palette) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", SEPARATOR);
    let _ = writeln!(out, "Commit: {}", palette.digest(digest.as_str()));
    let _ = writeln!(out, "Date: {}", commit.timestamp);
    let _ = writeln!(out);
    let _ = writeln!(out, "{}", commit.message);
    let _ = writeln!(out);
    out
}

/// The full `show` output for a commit.
pub fn render_commit_diff(diff: &CommitDiff, palette: Palette) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", palette.heading("Changes in the commit are:"));

    for file in &diff.files {
        let _ = writeln!(out, "File: {}", palette.heading(&file.path));
        out.push_str(&file.content);
        if !file.content.ends_with('\n') {
            out.push('\n');
        }

        match &file.kind {
            ChangeKind::Modified { segments } => {
                let _ = writeln!(out, "\ndiff:");
                let body = render_segments(segments, palette);
                out.push_str(&body);
                if !body.ends_with('\n') {
                    out.push('\n');
                }
            }
            ChangeKind::NewFile => {
                let _ = writeln!(out, "New file in this commit");
            }
            ChangeKind::FirstCommit => {
                let _ = writeln!(out, "First Commit");
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{diff_lines, CommitBuilder, FileChange, ObjectStore};

    #[test]
    fn test_render_segments_plain() {
        let segments = diff_lines("a\nb\n", "a\nc\n");
        assert_eq!(render_segments(&segments, Palette::plain()), "a\n--b\n++c\n");
    }

    #[test]
    fn test_render_segments_prefixes_every_line() {
        let segments = diff_lines("", "x\ny\n");
        assert_eq!(render_segments(&segments, Palette::plain()), "++x\n++y\n");
    }

    #[test]
    fn test_render_segments_colored() {
        let segments = diff_lines("a\n", "b\n");
        let out = render_segments(&segments, Palette::colored());

        assert!(out.contains("\u{1b}["));
        assert!(out.contains("--a"));
        assert!(out.contains("++b"));
    }

    #[test]
    fn test_render_log_entry() {
        let digest = ObjectStore::hash("c");
        let commit = CommitBuilder::new().message("first").build();
        let out = render_log_entry(&digest, &commit, Palette::plain());

        assert!(out.starts_with(SEPARATOR));
        assert!(out.contains(&format!("Commit: {}\n", digest)));
        assert!(out.contains(&format!("Date: {}\n", commit.timestamp)));
        assert!(out.contains("\nfirst\n"));
    }

    #[test]
    fn test_render_commit_diff() {
        let commit = CommitBuilder::new().message("second").build();
        let diff = CommitDiff {
            digest: ObjectStore::hash("c2"),
            commit,
            files: vec![
                FileChange {
                    path: "notes.txt".to_string(),
                    hash: ObjectStore::hash("a\nc\n"),
                    content: "a\nc\n".to_string(),
                    kind: ChangeKind::Modified {
                        segments: diff_lines("a\nb\n", "a\nc\n"),
                    },
                },
                FileChange {
                    path: "extra.txt".to_string(),
                    hash: ObjectStore::hash("new"),
                    content: "new".to_string(),
                    kind: ChangeKind::NewFile,
                },
            ],
        };

        let out = render_commit_diff(&diff, Palette::plain());
        let expected = "Changes in the commit are:\n\
                        File: notes.txt\na\nc\n\ndiff:\na\n--b\n++c\n\
                        File: extra.txt\nnew\nNew file in this commit\n";
        assert_eq!(out, expected);
    }
}
