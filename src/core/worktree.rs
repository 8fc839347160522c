//! Worktree paths
//!
//! Lexical view of a filesystem path as a list of segments. Nothing here
//! touches the filesystem: session directories may refer to machines or
//! mounts that no longer exist.
//!
//! # Key Points
//! - `.` segments are dropped, `..` pops the previous segment
//! - Both `/` and `\` separate segments
//! - Prefix tests compare whole segments, so `/foo/bar` is not a prefix of
//!   `/foo/barista`

use std::fmt;

/// A normalized worktree path
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WorktreePath {
    /// Path segments (e.g., ["Users", "alice", "work"])
    segments: Vec<String>,

    absolute: bool,
}

impl WorktreePath {
    /// Parse and normalize a path string. Returns `None` for blank input.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        if s.is_empty() {
            return None;
        }

        let absolute = s.starts_with('/') || s.starts_with('\\');
        let mut segments: Vec<String> = Vec::new();

        for segment in s.split(['/', '\\']) {
            match segment {
                "" | "." => {}
                ".." => {
                    // `..` at the root of an absolute path stays at the root
                    if segments.last().is_some_and(|last| last != "..") {
                        segments.pop();
                    } else if !absolute {
                        segments.push("..".to_string());
                    }
                }
                other => segments.push(other.to_string()),
            }
        }

        Some(Self { segments, absolute })
    }

    /// Check if this path equals `prefix` or lies beneath it
    pub fn starts_with(&self, prefix: &WorktreePath) -> bool {
        if self.absolute != prefix.absolute || prefix.segments.len() > self.segments.len() {
            return false;
        }

        self.segments
            .iter()
            .zip(prefix.segments.iter())
            .all(|(a, b)| a == b)
    }
}

impl fmt::Display for WorktreePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.absolute, self.segments.is_empty()) {
            (true, true) => write!(f, "/"),
            (false, true) => write!(f, "."),
            (true, false) => write!(f, "/{}", self.segments.join("/")),
            (false, false) => write!(f, "{}", self.segments.join("/")),
        }
    }
}

/// Whether session directory `dir` is `prefix` itself or nested under it.
///
/// Blank inputs never match.
pub fn dir_within_prefix(dir: &str, prefix: &str) -> bool {
    match (WorktreePath::parse(dir), WorktreePath::parse(prefix)) {
        (Some(dir), Some(prefix)) => dir.starts_with(&prefix),
        _ => false,
    }
}
