// subsync: Git Submodule Sync Runner
//
// SPDX-FileCopyrightText: 2026 subsync contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Typed parser for `git status --porcelain` output.
//!
//! ```text
//! " M classlib"          -> StatusEntry { index: ' ', worktree: 'M', path }
//! "?? notes.txt"         -> StatusEntry { index: '?', worktree: '?', path }
//! "R  old.rs -> new.rs"  -> StatusEntry for the new path
//! ```
//!
//! The snapshot is only used for clean/dirty decisions and reporting; it is
//! never persisted.

/// One `(status-code, path)` record from the porcelain status output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusEntry {
    /// Index (staged) status character.
    pub index: char,
    /// Worktree (unstaged) status character.
    pub worktree: char,
    /// Path relative to the repository root.
    pub path: String,
}

impl StatusEntry {
    /// True when this entry lies at or under the given repository-relative path.
    #[must_use]
    pub fn is_within(&self, path: &str) -> bool {
        self.path == path || self.path.strip_prefix(path).is_some_and(|r| r.starts_with('/'))
    }
}

impl std::fmt::Display for StatusEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{} {}", self.index, self.worktree, self.path)
    }
}

/// Parse `git status --porcelain` (v1) output into typed entries.
///
/// Lines shorter than the `XY path` shape are skipped. Rename/copy lines
/// (`old -> new`) record the new path. Quoted paths keep their quotes
/// stripped; escape sequences inside are left as-is, which is fine for the
/// clean/dirty decisions this snapshot feeds.
#[must_use]
pub fn parse_porcelain(output: &str) -> Vec<StatusEntry> {
    output
        .lines()
        .filter_map(|line| {
            let mut chars = line.chars();
            let index = chars.next()?;
            let worktree = chars.next()?;
            if chars.next() != Some(' ') {
                return None;
            }
            let rest = line.get(3..)?;
            let path = rest.rsplit_once(" -> ").map_or(rest, |(_, new)| new);
            let path = path.trim_matches('"');
            if path.is_empty() {
                return None;
            }
            Some(StatusEntry {
                index,
                worktree,
                path: path.to_string(),
            })
        })
        .collect()
}
