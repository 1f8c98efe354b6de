// subsync: Git Submodule Sync Runner
//
// SPDX-FileCopyrightText: 2026 subsync contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! The sync runner.
//!
//! ```text
//! Start -> ValidatingTree -> {Blocked | Clean}
//!       -> UpdatingSubmodules (declaration order, first failure aborts)
//!       -> Reporting -> {Committing -> {Pushing -> Done | Done}} -> Done
//! ```
//!
//! A single run, no persistence across runs. Early-return `Result`
//! propagation carries the fail-on-first-error contract; nothing here
//! retries, aggregates, or rolls back. Re-running after a partial failure is
//! always safe because the clean-tree check explains any leftover pointer
//! changes before anything mutates.

use tracing::{debug, info};

use crate::config::{Config, PolicyKind, SubmoduleConfig};
use crate::error::{BlockedWorktree, ConfigError, SyncResult};
use crate::git::GitClient;

#[cfg(test)]
mod tests;

/// Invocation mode, set once at start and immutable thereafter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Update only; leave pointer changes uncommitted.
    #[default]
    Plain,
    /// Update, then stage and commit the pointer changes.
    Commit,
    /// Update, commit, and push the current branch to its upstream.
    Push,
}

impl Mode {
    /// Derive the mode from CLI flags; `--push` implies `--commit`.
    #[must_use]
    pub const fn from_flags(commit: bool, push: bool) -> Self {
        if push {
            Self::Push
        } else if commit {
            Self::Commit
        } else {
            Self::Plain
        }
    }

    #[must_use]
    pub const fn requires_commit(self) -> bool {
        matches!(self, Self::Commit | Self::Push)
    }

    #[must_use]
    pub const fn requires_push(self) -> bool {
        matches!(self, Self::Push)
    }

    /// The exact invocation to repeat this run, for remediation text.
    #[must_use]
    pub const fn rerun_command(self) -> &'static str {
        match self {
            Self::Plain => "subsync",
            Self::Commit => "subsync --commit",
            Self::Push => "subsync --push",
        }
    }
}

/// How a submodule is brought up to date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdatePolicy {
    /// Move to the latest commit on the submodule's configured remote branch.
    TrackRemote,
    /// Fetch a fixed branch, check it out, fast-forward-only pull.
    FixedBranch { remote: String, branch: String },
}

/// One submodule to sync: a path plus its update policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmoduleSpec {
    /// Path relative to the repository root.
    pub path: String,
    /// Update policy.
    pub policy: UpdatePolicy,
}

impl SubmoduleSpec {
    /// Build the descriptor from its validated configuration entry.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if a fixed-branch entry has no branch (which
    /// `Config::resolve_and_validate` normally rejects earlier).
    pub fn from_config(config: &SubmoduleConfig) -> SyncResult<Self> {
        let policy = match config.policy {
            PolicyKind::TrackRemote => UpdatePolicy::TrackRemote,
            PolicyKind::FixedBranch => {
                let branch = config.branch.clone().ok_or_else(|| ConfigError::MissingKey {
                    section: "submodules".to_string(),
                    key: "branch".to_string(),
                })?;
                UpdatePolicy::FixedBranch {
                    remote: config.remote.clone(),
                    branch,
                }
            }
        };
        Ok(Self {
            path: config.path.clone(),
            policy,
        })
    }
}

/// Build the descriptor list from the merged configuration, in declaration order.
///
/// # Errors
///
/// Returns a `ConfigError` for inconsistent entries.
pub fn specs_from_config(config: &Config) -> SyncResult<Vec<SubmoduleSpec>> {
    config.submodules.iter().map(SubmoduleSpec::from_config).collect()
}

/// The fixed commit message for pointer updates, built from the configured
/// paths in declaration order.
#[must_use]
pub fn commit_message(specs: &[SubmoduleSpec]) -> String {
    let names: Vec<&str> = specs.iter().map(|s| s.path.as_str()).collect();
    format!("Update submodules ({})", names.join(" + "))
}

/// What a completed run did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Both submodules were already at their latest permitted commits.
    UpToDate,
    /// Pointers moved; `committed`/`pushed` record what happened to them.
    Updated { committed: bool, pushed: bool },
}

/// Drives one sync run over an injectable git client.
pub struct SyncRunner<'a, C: GitClient> {
    client: &'a C,
    specs: &'a [SubmoduleSpec],
    mode: Mode,
    dry_run: bool,
}

impl<'a, C: GitClient> SyncRunner<'a, C> {
    #[must_use]
    pub const fn new(client: &'a C, specs: &'a [SubmoduleSpec], mode: Mode, dry_run: bool) -> Self {
        Self {
            client,
            specs,
            mode,
            dry_run,
        }
    }

    /// Run the whole state machine: validate, update, report.
    ///
    /// # Errors
    ///
    /// Returns `SyncError::Blocked` for a dirty tree (before any mutation)
    /// and propagates the first git failure otherwise.
    pub fn run(&self) -> SyncResult<SyncOutcome> {
        self.ensure_clean_worktree()?;
        self.update_all()?;
        self.report_and_finish()
    }

    /// The pre-run safety check. Runs once, before any submodule mutation.
    fn ensure_clean_worktree(&self) -> SyncResult<()> {
        let entries = self.client.worktree_status()?;
        if entries.is_empty() {
            debug!("working tree is clean");
            return Ok(());
        }

        let only_submodules = entries
            .iter()
            .all(|entry| self.specs.iter().any(|spec| entry.is_within(&spec.path)));
        info!(
            dirty = entries.len(),
            only_submodules, "working tree is not clean, refusing to run"
        );

        Err(BlockedWorktree {
            dirty: entries.iter().map(ToString::to_string).collect(),
            submodule_paths: self.specs.iter().map(|s| s.path.clone()).collect(),
            only_submodules,
            rerun: self.mode.rerun_command().to_string(),
            commit_message: commit_message(self.specs),
        }
        .into())
    }

    /// Update every configured submodule in declaration order.
    fn update_all(&self) -> SyncResult<()> {
        let declared = self.client.declared_submodules()?;
        for spec in self.specs {
            if !declared.iter().any(|d| d == &spec.path) {
                info!(submodule = %spec.path, "not declared in .gitmodules, skipping");
                continue;
            }
            self.update_submodule(spec)?;
        }
        Ok(())
    }

    fn update_submodule(&self, spec: &SubmoduleSpec) -> SyncResult<()> {
        match &spec.policy {
            UpdatePolicy::TrackRemote => {
                if self.dry_run {
                    info!(
                        submodule = %spec.path,
                        "[dry-run] would update to remote-tracking tip"
                    );
                    return Ok(());
                }
                info!(submodule = %spec.path, "updating to remote-tracking tip");
                self.client.update_to_remote_tip(&spec.path)
            }
            UpdatePolicy::FixedBranch { remote, branch } => {
                if self.dry_run {
                    info!(
                        submodule = %spec.path,
                        %remote,
                        %branch,
                        "[dry-run] would fetch, checkout and fast-forward"
                    );
                    return Ok(());
                }
                info!(submodule = %spec.path, %remote, %branch, "syncing fixed branch");
                self.client.init_submodule(&spec.path)?;
                self.client.fetch_branch(&spec.path, remote, branch)?;
                self.client.checkout_branch(&spec.path, branch)?;
                self.client.pull_fast_forward(&spec.path, remote, branch)
            }
        }
    }

    /// Re-inspect the tree and commit/push or remind, per mode.
    fn report_and_finish(&self) -> SyncResult<SyncOutcome> {
        let entries = self.client.worktree_status()?;
        if entries.is_empty() {
            info!("submodules up to date");
            return Ok(SyncOutcome::UpToDate);
        }

        let diff = self.client.submodule_diff()?;
        if !diff.trim().is_empty() {
            println!("{diff}");
        }

        let paths: Vec<String> = self.specs.iter().map(|s| s.path.clone()).collect();
        let message = commit_message(self.specs);

        if self.mode.requires_commit() {
            if self.dry_run {
                info!(%message, "[dry-run] would stage and commit pointer updates");
                return Ok(SyncOutcome::Updated {
                    committed: false,
                    pushed: false,
                });
            }
            self.client.stage(&paths)?;
            self.client.commit(&message)?;
            info!(%message, "created commit");

            if self.mode.requires_push() {
                let branch = self
                    .client
                    .current_branch()?
                    .unwrap_or_else(|| "HEAD".to_string());
                info!(%branch, "pushing to configured upstream");
                self.client.push()?;
                info!("push complete");
                return Ok(SyncOutcome::Updated {
                    committed: true,
                    pushed: true,
                });
            }
            return Ok(SyncOutcome::Updated {
                committed: true,
                pushed: false,
            });
        }

        info!("pointer updates left uncommitted");
        println!("To commit the pointer updates:");
        println!("  git add -- {}", paths.join(" "));
        println!("  git commit -m \"{message}\"");
        Ok(SyncOutcome::Updated {
            committed: false,
            pushed: false,
        })
    }
}
