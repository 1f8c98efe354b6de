// subsync: Git Submodule Sync Runner
//
// SPDX-FileCopyrightText: 2026 subsync contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Git client abstraction layer.
//!
//! ```text
//! GitClient (trait) --> ShellClient (production)
//!                         gix   : open / current branch (no subprocess)
//!                         git   : status, submodules, fetch, checkout,
//!                                 ff-pull, add, commit, push
//! ```
//!
//! The trait is the seam that lets the sync runner be driven by an
//! in-memory fake in tests; the production client serializes every
//! operation through blocking subprocess calls.

use std::path::{Path, PathBuf};

use crate::error::{GitError, GixError, SyncError, SyncResult};

use super::status::{StatusEntry, parse_porcelain};

/// Version-control operations the sync runner needs.
///
/// All paths are relative to the repository root the client was opened at.
/// Implementations must not retry: the first non-zero exit propagates.
pub trait GitClient {
    /// Snapshot the working-tree status as typed `(status-code, path)` records.
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if the status query fails.
    fn worktree_status(&self) -> SyncResult<Vec<StatusEntry>>;

    /// Current branch name of the parent repository (None if HEAD is detached).
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if head resolution fails.
    fn current_branch(&self) -> SyncResult<Option<String>>;

    /// Submodule paths declared in `.gitmodules` (`path = <name>` lines).
    ///
    /// A missing `.gitmodules` yields an empty list, not an error.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file exists but cannot be read.
    fn declared_submodules(&self) -> SyncResult<Vec<String>>;

    /// Initialize if needed and move the submodule to its remote-tracking tip.
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if the submodule update fails.
    fn update_to_remote_tip(&self, path: &str) -> SyncResult<()>;

    /// Initialize the submodule at its recorded pointer if needed.
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if the submodule init fails.
    fn init_submodule(&self, path: &str) -> SyncResult<()>;

    /// Fetch a named branch from a remote, inside the submodule's own tree.
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if the fetch fails.
    fn fetch_branch(&self, path: &str, remote: &str, branch: &str) -> SyncResult<()>;

    /// Check out a branch inside the submodule's own tree.
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if the checkout fails.
    fn checkout_branch(&self, path: &str, branch: &str) -> SyncResult<()>;

    /// Fast-forward-only pull inside the submodule's own tree.
    ///
    /// Diverged history must fail with the underlying non-zero exit, never
    /// merge or rewrite.
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if the pull fails or cannot fast-forward.
    fn pull_fast_forward(&self, path: &str, remote: &str, branch: &str) -> SyncResult<()>;

    /// Human-readable short diff of pending submodule pointer movements.
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if the diff query fails.
    fn submodule_diff(&self) -> SyncResult<String>;

    /// Stage exactly the given paths in the parent repository.
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if staging fails.
    fn stage(&self, paths: &[String]) -> SyncResult<()>;

    /// Commit the staged changes with the given message.
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if the commit fails.
    fn commit(&self, message: &str) -> SyncResult<()>;

    /// Push the current branch to its configured upstream.
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if the push is rejected or fails.
    fn push(&self) -> SyncResult<()>;
}

/// Extract declared submodule paths from `.gitmodules` content.
///
/// Trimmed line matching on `path = <name>`, as the file format needs
/// nothing more here.
#[must_use]
pub(crate) fn submodule_paths_from_config(content: &str) -> Vec<String> {
    content
        .lines()
        .filter_map(|line| {
            let rest = line.trim().strip_prefix("path")?;
            let value = rest.trim_start().strip_prefix('=')?.trim();
            (!value.is_empty()).then(|| value.to_string())
        })
        .collect()
}

/// Production git client.
///
/// Read-only queries go through gix where that avoids a subprocess; status
/// and every mutation shell out to the git CLI with prompts disabled, so a
/// credential helper can never hang an unattended run.
#[derive(Debug)]
pub struct ShellClient {
    root: PathBuf,
    repo: gix::Repository,
}

impl ShellClient {
    /// Open the repository at exactly `root`.
    ///
    /// `root` must itself hold the repository metadata (`gix::open` does not
    /// search upwards), which is what makes this the "run from the
    /// repository root" precondition check.
    ///
    /// # Errors
    ///
    /// Returns `SyncError::Precondition` when `root` is not a repository
    /// root or the repository is bare, and `GitError::GitNotFound` when no
    /// git executable is on PATH.
    pub fn open(root: &Path) -> SyncResult<Self> {
        which::which("git").map_err(|_| GitError::GitNotFound)?;

        let repo = gix::open(root).map_err(|e| {
            let cause = GixError::Open(Box::new(e));
            SyncError::Precondition(format!("{} ({cause})", root.display()).into_boxed_str())
        })?;
        if repo.workdir().is_none() {
            return Err(SyncError::Precondition(
                format!("{} ({})", root.display(), GixError::BareRepository).into_boxed_str(),
            ));
        }

        Ok(Self {
            root: root.to_path_buf(),
            repo,
        })
    }

    /// Repository root this client operates on.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Execute a git command with standard environment variables.
    /// ALWAYS sets `GCM_INTERACTIVE=never` and `GIT_TERMINAL_PROMPT=0`.
    ///
    /// Returns stdout unmodified; porcelain status lines are significant
    /// down to their leading spaces.
    fn git_command_raw(&self, args: &[&str], cwd: &Path) -> SyncResult<String> {
        use std::process::Command;

        let output = Command::new("git")
            .args(args)
            .current_dir(cwd)
            .env("GCM_INTERACTIVE", "never")
            .env("GIT_TERMINAL_PROMPT", "0")
            .output()
            .map_err(|e| std::io::Error::new(e.kind(), format!("failed to execute git: {e}")))?;

        if !output.status.success() {
            return Err(GitError::CommandFailed {
                command: format!("git {}", args.join(" ")),
                message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            }
            .into());
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    /// [`Self::git_command_raw`] with the output trimmed, for scalar results.
    fn git_command(&self, args: &[&str], cwd: &Path) -> SyncResult<String> {
        self.git_command_raw(args, cwd)
            .map(|out| out.trim().to_string())
    }

    fn submodule_dir(&self, path: &str) -> PathBuf {
        self.root.join(path)
    }
}

impl GitClient for ShellClient {
    fn worktree_status(&self) -> SyncResult<Vec<StatusEntry>> {
        let output = self.git_command_raw(&["status", "--porcelain"], &self.root)?;
        Ok(parse_porcelain(&output))
    }

    fn current_branch(&self) -> SyncResult<Option<String>> {
        let head = self
            .repo
            .head_name()
            .map_err(|e| GitError::Gix(GixError::Head(Box::new(e))))?;
        Ok(head.map(|name| name.shorten().to_string()))
    }

    fn declared_submodules(&self) -> SyncResult<Vec<String>> {
        let modules_file = self.root.join(".gitmodules");
        if !modules_file.exists() {
            return Ok(Vec::new());
        }
        let content = std::fs::read_to_string(&modules_file)?;
        Ok(submodule_paths_from_config(&content))
    }

    fn update_to_remote_tip(&self, path: &str) -> SyncResult<()> {
        self.git_command(
            &["submodule", "update", "--init", "--remote", "--", path],
            &self.root,
        )?;
        Ok(())
    }

    fn init_submodule(&self, path: &str) -> SyncResult<()> {
        self.git_command(&["submodule", "update", "--init", "--", path], &self.root)?;
        Ok(())
    }

    fn fetch_branch(&self, path: &str, remote: &str, branch: &str) -> SyncResult<()> {
        self.git_command(&["fetch", remote, branch], &self.submodule_dir(path))?;
        Ok(())
    }

    fn checkout_branch(&self, path: &str, branch: &str) -> SyncResult<()> {
        self.git_command(
            &["-c", "advice.detachedHead=false", "checkout", "-q", branch],
            &self.submodule_dir(path),
        )?;
        Ok(())
    }

    fn pull_fast_forward(&self, path: &str, remote: &str, branch: &str) -> SyncResult<()> {
        self.git_command(
            &["pull", "--ff-only", remote, branch],
            &self.submodule_dir(path),
        )?;
        Ok(())
    }

    fn submodule_diff(&self) -> SyncResult<String> {
        self.git_command_raw(&["--no-pager", "diff", "--submodule=log"], &self.root)
    }

    fn stage(&self, paths: &[String]) -> SyncResult<()> {
        let mut args = vec!["add", "--"];
        args.extend(paths.iter().map(String::as_str));
        self.git_command(&args, &self.root)?;
        Ok(())
    }

    fn commit(&self, message: &str) -> SyncResult<()> {
        self.git_command(&["commit", "-m", message], &self.root)?;
        Ok(())
    }

    fn push(&self) -> SyncResult<()> {
        self.git_command(&["push"], &self.root)?;
        Ok(())
    }
}
