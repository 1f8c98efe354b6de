// subsync: Git Submodule Sync Runner
//
// SPDX-FileCopyrightText: 2026 subsync contributors
// SPDX-License-Identifier: GPL-3.0-or-later

use std::cell::RefCell;
use std::collections::VecDeque;

use super::{Mode, SubmoduleSpec, SyncOutcome, SyncRunner, UpdatePolicy, commit_message};
use crate::config::Config;
use crate::error::{GitError, SyncError, SyncResult};
use crate::git::backend::GitClient;
use crate::git::status::StatusEntry;

/// In-memory fake for the git client seam.
///
/// Records every call in order; `worktree_status` plays back scripted
/// snapshots (first call = pre-run check, second call = report phase).
struct FakeClient {
    calls: RefCell<Vec<String>>,
    statuses: RefCell<VecDeque<Vec<StatusEntry>>>,
    declared: Vec<String>,
    branch: Option<String>,
    diff: String,
    fail_on: Option<&'static str>,
}

impl FakeClient {
    fn new(statuses: Vec<Vec<StatusEntry>>, declared: &[&str]) -> Self {
        Self {
            calls: RefCell::new(Vec::new()),
            statuses: RefCell::new(statuses.into()),
            declared: declared.iter().map(ToString::to_string).collect(),
            branch: Some("master".to_string()),
            diff: "Submodule classlib 1111111..2222222".to_string(),
            fail_on: None,
        }
    }

    fn failing_at(mut self, call: &'static str) -> Self {
        self.fail_on = Some(call);
        self
    }

    fn record(&self, call: String) -> SyncResult<()> {
        let failed = self
            .fail_on
            .is_some_and(|needle| call.starts_with(needle));
        self.calls.borrow_mut().push(call.clone());
        if failed {
            return Err(GitError::CommandFailed {
                command: call,
                message: "scripted failure".to_string(),
            }
            .into());
        }
        Ok(())
    }

    fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }
}

impl GitClient for FakeClient {
    fn worktree_status(&self) -> SyncResult<Vec<StatusEntry>> {
        self.record("worktree_status".to_string())?;
        Ok(self.statuses.borrow_mut().pop_front().unwrap_or_default())
    }

    fn current_branch(&self) -> SyncResult<Option<String>> {
        self.record("current_branch".to_string())?;
        Ok(self.branch.clone())
    }

    fn declared_submodules(&self) -> SyncResult<Vec<String>> {
        self.record("declared_submodules".to_string())?;
        Ok(self.declared.clone())
    }

    fn update_to_remote_tip(&self, path: &str) -> SyncResult<()> {
        self.record(format!("update_to_remote_tip {path}"))
    }

    fn init_submodule(&self, path: &str) -> SyncResult<()> {
        self.record(format!("init_submodule {path}"))
    }

    fn fetch_branch(&self, path: &str, remote: &str, branch: &str) -> SyncResult<()> {
        self.record(format!("fetch_branch {path} {remote} {branch}"))
    }

    fn checkout_branch(&self, path: &str, branch: &str) -> SyncResult<()> {
        self.record(format!("checkout_branch {path} {branch}"))
    }

    fn pull_fast_forward(&self, path: &str, remote: &str, branch: &str) -> SyncResult<()> {
        self.record(format!("pull_fast_forward {path} {remote} {branch}"))
    }

    fn submodule_diff(&self) -> SyncResult<String> {
        self.record("submodule_diff".to_string())?;
        Ok(self.diff.clone())
    }

    fn stage(&self, paths: &[String]) -> SyncResult<()> {
        self.record(format!("stage {}", paths.join(" ")))
    }

    fn commit(&self, message: &str) -> SyncResult<()> {
        self.record(format!("commit {message}"))
    }

    fn push(&self) -> SyncResult<()> {
        self.record("push".to_string())
    }
}

fn default_specs() -> Vec<SubmoduleSpec> {
    super::specs_from_config(&Config::parse("").unwrap()).unwrap()
}

fn entry(index: char, worktree: char, path: &str) -> StatusEntry {
    StatusEntry {
        index,
        worktree,
        path: path.to_string(),
    }
}

fn pointer_moves() -> Vec<StatusEntry> {
    vec![
        entry(' ', 'M', "classlib"),
        entry(' ', 'M', "qmcsoftware"),
    ]
}

// =============================================================================
// Mode
// =============================================================================

#[test]
fn test_mode_from_flags() {
    assert_eq!(Mode::from_flags(false, false), Mode::Plain);
    assert_eq!(Mode::from_flags(true, false), Mode::Commit);
    assert_eq!(Mode::from_flags(false, true), Mode::Push);
    // push implies commit
    assert_eq!(Mode::from_flags(true, true), Mode::Push);
    assert!(Mode::Push.requires_commit());
    assert!(!Mode::Plain.requires_commit());
    assert!(!Mode::Commit.requires_push());
}

#[test]
fn test_mode_rerun_command() {
    assert_eq!(Mode::Plain.rerun_command(), "subsync");
    assert_eq!(Mode::Commit.rerun_command(), "subsync --commit");
    assert_eq!(Mode::Push.rerun_command(), "subsync --push");
}

// =============================================================================
// Specs and commit message
// =============================================================================

#[test]
fn test_default_specs_carry_both_policies() {
    let specs = default_specs();
    assert_eq!(specs.len(), 2);
    assert_eq!(specs[0].path, "classlib");
    assert_eq!(specs[0].policy, UpdatePolicy::TrackRemote);
    assert_eq!(specs[1].path, "qmcsoftware");
    assert_eq!(
        specs[1].policy,
        UpdatePolicy::FixedBranch {
            remote: "origin".to_string(),
            branch: "develop".to_string(),
        }
    );
}

#[test]
fn test_commit_message_is_fixed_for_default_specs() {
    assert_eq!(
        commit_message(&default_specs()),
        "Update submodules (classlib + qmcsoftware)"
    );
}

// =============================================================================
// Clean tree, up to date
// =============================================================================

#[test]
fn test_up_to_date_run_performs_no_commit() {
    let specs = default_specs();
    let client = FakeClient::new(vec![vec![], vec![]], &["classlib", "qmcsoftware"]);
    let runner = SyncRunner::new(&client, &specs, Mode::Push, false);

    assert_eq!(runner.run().unwrap(), SyncOutcome::UpToDate);

    let calls = client.calls();
    assert!(!calls.iter().any(|c| c.starts_with("stage")));
    assert!(!calls.iter().any(|c| c.starts_with("commit")));
    assert!(!calls.iter().any(|c| c == "push"));
}

#[test]
fn test_updates_run_in_declaration_order() {
    let specs = default_specs();
    let client = FakeClient::new(vec![vec![], vec![]], &["classlib", "qmcsoftware"]);
    let runner = SyncRunner::new(&client, &specs, Mode::Plain, false);
    runner.run().unwrap();

    let calls = client.calls();
    let classlib = calls
        .iter()
        .position(|c| c == "update_to_remote_tip classlib")
        .expect("classlib update missing");
    let qmc = calls
        .iter()
        .position(|c| c == "init_submodule qmcsoftware")
        .expect("qmcsoftware init missing");
    assert!(classlib < qmc, "expected declaration order, got {calls:?}");

    // fixed-branch policy: init, fetch, checkout, ff-pull in that order
    let tail: Vec<_> = calls
        .iter()
        .filter(|c| c.contains("qmcsoftware"))
        .cloned()
        .collect();
    assert_eq!(
        tail,
        vec![
            "init_submodule qmcsoftware",
            "fetch_branch qmcsoftware origin develop",
            "checkout_branch qmcsoftware develop",
            "pull_fast_forward qmcsoftware origin develop",
        ]
    );
}

#[test]
fn test_undeclared_submodule_is_skipped_not_an_error() {
    let specs = default_specs();
    let client = FakeClient::new(vec![vec![], vec![]], &["classlib"]);
    let runner = SyncRunner::new(&client, &specs, Mode::Plain, false);
    runner.run().unwrap();

    let calls = client.calls();
    assert!(calls.iter().any(|c| c == "update_to_remote_tip classlib"));
    assert!(!calls.iter().any(|c| c.contains("qmcsoftware")));
}

// =============================================================================
// Blocked worktree
// =============================================================================

#[test]
fn test_dirty_unrelated_file_blocks_before_any_update() {
    let specs = default_specs();
    let client = FakeClient::new(
        vec![vec![entry('?', '?', "scratch.txt")]],
        &["classlib", "qmcsoftware"],
    );
    let runner = SyncRunner::new(&client, &specs, Mode::Plain, false);

    let err = runner.run().unwrap_err();
    let SyncError::Blocked(blocked) = err else {
        panic!("expected Blocked, got {err:?}");
    };
    assert!(!blocked.only_submodules);
    assert_eq!(blocked.dirty, vec!["?? scratch.txt".to_string()]);

    // The status query is the only thing that ran.
    assert_eq!(client.calls(), vec!["worktree_status".to_string()]);
}

#[test]
fn test_dirty_submodule_pointers_block_with_stale_pointer_guidance() {
    let specs = default_specs();
    let client = FakeClient::new(vec![pointer_moves()], &["classlib", "qmcsoftware"]);
    let runner = SyncRunner::new(&client, &specs, Mode::Commit, false);

    let err = runner.run().unwrap_err();
    let SyncError::Blocked(blocked) = err else {
        panic!("expected Blocked, got {err:?}");
    };
    assert!(blocked.only_submodules);
    assert_eq!(blocked.rerun, "subsync --commit");

    let text = blocked.remediation();
    assert!(text.contains("git add -- classlib qmcsoftware"));
    assert!(text.contains("Update submodules (classlib + qmcsoftware)"));
    assert_eq!(client.calls(), vec!["worktree_status".to_string()]);
}

#[test]
fn test_blocked_run_is_idempotent() {
    let specs = default_specs();
    let run = || {
        let client = FakeClient::new(vec![pointer_moves()], &["classlib", "qmcsoftware"]);
        let runner = SyncRunner::new(&client, &specs, Mode::Plain, false);
        match runner.run().unwrap_err() {
            SyncError::Blocked(blocked) => blocked.remediation(),
            other => panic!("expected Blocked, got {other:?}"),
        }
    };
    assert_eq!(run(), run());
}

#[test]
fn test_mixed_dirty_paths_are_not_stale_pointers() {
    let specs = default_specs();
    let mut dirty = pointer_moves();
    dirty.push(entry('M', ' ', "README.md"));
    let client = FakeClient::new(vec![dirty], &["classlib", "qmcsoftware"]);
    let runner = SyncRunner::new(&client, &specs, Mode::Plain, false);

    match runner.run().unwrap_err() {
        SyncError::Blocked(blocked) => assert!(!blocked.only_submodules),
        other => panic!("expected Blocked, got {other:?}"),
    }
}

// =============================================================================
// Reporting, commit, push
// =============================================================================

#[test]
fn test_plain_mode_prints_diff_but_does_not_commit() {
    let specs = default_specs();
    let client = FakeClient::new(
        vec![vec![], pointer_moves()],
        &["classlib", "qmcsoftware"],
    );
    let runner = SyncRunner::new(&client, &specs, Mode::Plain, false);

    assert_eq!(
        runner.run().unwrap(),
        SyncOutcome::Updated {
            committed: false,
            pushed: false
        }
    );
    let calls = client.calls();
    assert!(calls.iter().any(|c| c == "submodule_diff"));
    assert!(!calls.iter().any(|c| c.starts_with("stage")));
    assert!(!calls.iter().any(|c| c.starts_with("commit")));
}

#[test]
fn test_commit_mode_stages_exactly_the_configured_paths() {
    let specs = default_specs();
    let client = FakeClient::new(
        vec![vec![], pointer_moves()],
        &["classlib", "qmcsoftware"],
    );
    let runner = SyncRunner::new(&client, &specs, Mode::Commit, false);

    assert_eq!(
        runner.run().unwrap(),
        SyncOutcome::Updated {
            committed: true,
            pushed: false
        }
    );
    let calls = client.calls();
    assert!(calls.iter().any(|c| c == "stage classlib qmcsoftware"));
    assert!(
        calls
            .iter()
            .any(|c| c == "commit Update submodules (classlib + qmcsoftware)")
    );
    assert!(!calls.iter().any(|c| c == "push"));
}

#[test]
fn test_push_mode_pushes_after_commit() {
    let specs = default_specs();
    let client = FakeClient::new(
        vec![vec![], pointer_moves()],
        &["classlib", "qmcsoftware"],
    );
    let runner = SyncRunner::new(&client, &specs, Mode::Push, false);

    assert_eq!(
        runner.run().unwrap(),
        SyncOutcome::Updated {
            committed: true,
            pushed: true
        }
    );
    let calls = client.calls();
    let commit = calls
        .iter()
        .position(|c| c.starts_with("commit"))
        .expect("commit missing");
    let push = calls.iter().position(|c| c == "push").expect("push missing");
    assert!(commit < push);
}

// =============================================================================
// Failure propagation
// =============================================================================

#[test]
fn test_first_failure_aborts_without_retry() {
    let specs = default_specs();
    let client = FakeClient::new(vec![vec![], vec![]], &["classlib", "qmcsoftware"])
        .failing_at("fetch_branch");
    let runner = SyncRunner::new(&client, &specs, Mode::Push, false);

    let err = runner.run().unwrap_err();
    assert!(matches!(err, SyncError::Git(_)), "got {err:?}");

    let calls = client.calls();
    // one attempt, nothing after the failing step
    assert_eq!(
        calls.iter().filter(|c| c.starts_with("fetch_branch")).count(),
        1
    );
    assert!(!calls.iter().any(|c| c.starts_with("checkout_branch")));
    assert!(!calls.iter().any(|c| c.starts_with("pull_fast_forward")));
    assert!(!calls.iter().any(|c| c.starts_with("stage")));
}

#[test]
fn test_non_fast_forward_failure_propagates_before_commit() {
    let specs = default_specs();
    let client = FakeClient::new(vec![vec![], vec![]], &["classlib", "qmcsoftware"])
        .failing_at("pull_fast_forward");
    let runner = SyncRunner::new(&client, &specs, Mode::Commit, false);

    assert!(runner.run().is_err());
    let calls = client.calls();
    assert!(!calls.iter().any(|c| c.starts_with("stage")));
    assert!(!calls.iter().any(|c| c.starts_with("commit")));
}

#[test]
fn test_push_failure_is_fatal() {
    let specs = default_specs();
    let client = FakeClient::new(
        vec![vec![], pointer_moves()],
        &["classlib", "qmcsoftware"],
    )
    .failing_at("push");
    let runner = SyncRunner::new(&client, &specs, Mode::Push, false);

    let err = runner.run().unwrap_err();
    assert!(matches!(err, SyncError::Git(_)), "got {err:?}");
    // the commit exists; only the push failed
    assert!(client.calls().iter().any(|c| c.starts_with("commit")));
}

// =============================================================================
// Dry run
// =============================================================================

#[test]
fn test_dry_run_performs_no_mutation() {
    let specs = default_specs();
    let client = FakeClient::new(vec![vec![], vec![]], &["classlib", "qmcsoftware"]);
    let runner = SyncRunner::new(&client, &specs, Mode::Push, true);

    assert_eq!(runner.run().unwrap(), SyncOutcome::UpToDate);

    let mutations = [
        "update_to_remote_tip",
        "init_submodule",
        "fetch_branch",
        "checkout_branch",
        "pull_fast_forward",
        "stage",
        "commit",
        "push",
    ];
    for call in client.calls() {
        assert!(
            !mutations.iter().any(|m| call.starts_with(m)),
            "dry run must not mutate, saw {call}"
        );
    }
}
