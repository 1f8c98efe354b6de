// subsync: Git Submodule Sync Runner
//
// SPDX-FileCopyrightText: 2026 subsync contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Error handling module.
//!
//! ```text
//!            SyncError (~24 bytes)
//!                   |
//!   +------+-------+-------+-------+------+
//!   |      |       |       |       |      |
//!   v      v       v       v       v      v
//! Usage  Precond Blocked  Git    Config   Io
//!
//! Sub-errors (unboxed internally):
//!   Git     Gix, GitNotFound, CommandFailed
//!   Config  ReadError, ParseError, MissingKey, InvalidValue
//!   Blocked dirty list + submodule-only flag + re-run command
//!
//! All variants boxed => SyncError stays small on the stack.
//! ```
//!
//! Every failure maps to exit code 1; the taxonomy exists so callers can
//! attach the right user-facing text (usage hint, remediation commands,
//! propagated git stderr) before the process exits.

use thiserror::Error;

/// Convenience alias for `anyhow::Result`.
pub type Result<T> = anyhow::Result<T>;

/// Result type using [`SyncError`].
pub type SyncResult<T> = std::result::Result<T, SyncError>;

/// Top-level application error type.
///
/// All sub-errors are boxed to keep this enum small on the stack.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Invalid command-line argument. No side effects have occurred.
    #[error("{0}")]
    Usage(Box<str>),

    /// Not invoked from a repository root. No side effects have occurred.
    #[error("not a repository root: {0}")]
    Precondition(Box<str>),

    /// Dirty working tree detected before any mutation.
    #[error(transparent)]
    Blocked(Box<BlockedWorktree>),

    /// Git operation failed.
    #[error("git error: {0}")]
    Git(#[from] Box<GitError>),

    /// Configuration error.
    #[error("config error: {0}")]
    Config(#[from] Box<ConfigError>),

    /// I/O error.
    #[error("io error: {0}")]
    Io(Box<std::io::Error>),
}

// --- From implementations for boxing ---

/// Macro to generate `From` implementations that box the source error.
macro_rules! impl_from_boxed {
    ($($error:ty => $variant:ident),+ $(,)?) => {
        $(
            impl From<$error> for SyncError {
                fn from(err: $error) -> Self {
                    SyncError::$variant(Box::new(err))
                }
            }
        )+
    };
}

impl_from_boxed! {
    BlockedWorktree => Blocked,
    GitError => Git,
    ConfigError => Config,
    std::io::Error => Io,
}

// --- Blocked worktree ---

/// Dirty working tree found by the pre-run check.
///
/// Carries everything the operator needs to recover: the dirty
/// (status-code, path) lines, whether every dirty path is one of the
/// configured submodule paths (the "stale pointer" case left behind by an
/// earlier run), and the exact command to re-run once the tree is clean.
#[derive(Debug, Error)]
#[error("working tree is not clean ({} dirty path(s))", .dirty.len())]
pub struct BlockedWorktree {
    /// Dirty entries as `XY path` lines, in porcelain order.
    pub dirty: Vec<String>,
    /// The configured submodule paths, in declaration order.
    pub submodule_paths: Vec<String>,
    /// True when every dirty path is a configured submodule path.
    pub only_submodules: bool,
    /// The exact invocation to repeat once the tree is clean.
    pub rerun: String,
    /// The commit message a manual commit of the pointers should use.
    pub commit_message: String,
}

impl BlockedWorktree {
    /// Copy-pasteable remediation text, tailored to the stale-pointer case.
    #[must_use]
    pub fn remediation(&self) -> String {
        use std::fmt::Write as _;

        let mut out = String::new();
        out.push_str("The working tree is not clean:\n");
        for line in &self.dirty {
            let _ = writeln!(out, "  {line}");
        }
        if self.only_submodules {
            let paths = self.submodule_paths.join(" ");
            out.push_str("Only submodule pointers are dirty (likely left by an earlier run).\n");
            out.push_str("To keep the pending pointer updates, commit them:\n");
            let _ = writeln!(out, "  git add -- {paths}");
            let _ = writeln!(out, "  git commit -m \"{}\"", self.commit_message);
            out.push_str("To discard them instead:\n");
            let _ = writeln!(out, "  git submodule update --checkout -- {paths}");
        } else {
            out.push_str("Commit, stash or discard these changes first.\n");
        }
        out.push_str("Then re-run:\n");
        let _ = writeln!(out, "  {}", self.rerun);
        out
    }
}

// --- Gix Errors ---

/// Wrapper for gix-specific errors.
///
/// gix has multiple error types that are converted through this enum.
/// Large error types are boxed to keep enum size manageable.
#[derive(Debug, Error)]
pub enum GixError {
    /// Failed to open repository at the given path.
    #[error("failed to open repository: {0}")]
    Open(#[from] Box<gix::open::Error>),

    /// Failed to get HEAD reference.
    #[error("failed to get head reference: {0}")]
    Head(#[from] Box<gix::reference::find::existing::Error>),

    /// Repository has no worktree (bare repository).
    #[error("repository has no worktree (bare repository)")]
    BareRepository,
}

// --- Git Errors ---

/// Git operation errors.
#[derive(Debug, Error)]
pub enum GitError {
    /// The git executable is not on PATH.
    #[error("git executable not found in PATH")]
    GitNotFound,

    /// Git command execution failed (non-zero exit, stderr attached).
    #[error("git command failed: {command} - {message}")]
    CommandFailed { command: String, message: String },

    /// Error from gix library.
    #[error("gix error: {0}")]
    Gix(#[from] GixError),
}

// --- Config Errors ---

/// Configuration-related errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse configuration file.
    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: String, message: String },

    /// Missing required configuration key.
    #[error("missing required config key '{key}' in section '[{section}]'")]
    MissingKey { section: String, key: String },

    /// Invalid configuration value.
    #[error("invalid value for '{key}' in section '[{section}]': {message}")]
    InvalidValue {
        section: String,
        key: String,
        message: String,
    },
}
