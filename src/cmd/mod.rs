// subsync: Git Submodule Sync Runner
//
// SPDX-FileCopyrightText: 2026 subsync contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Command handler: one sync run from the current directory.

use crate::config::Config;
use crate::error::{Result, SyncError};
use crate::git::ShellClient;
use crate::sync::{Mode, SyncRunner, specs_from_config};

/// Main handler for a sync invocation.
///
/// Opens the repository at the current directory (the precondition check),
/// builds the submodule specs from configuration and drives the runner. A
/// blocked working tree additionally prints its copy-pasteable remediation
/// commands to stderr before the error propagates.
///
/// # Errors
///
/// Returns an error if the current directory is not a repository root, the
/// working tree is dirty, or any git operation fails.
pub fn run_sync_command(mode: Mode, config: &Config) -> Result<()> {
    let cwd = std::env::current_dir()?;
    let client = ShellClient::open(&cwd)?;
    let specs = specs_from_config(config)?;

    let runner = SyncRunner::new(&client, &specs, mode, config.global.dry);
    match runner.run() {
        Ok(_outcome) => Ok(()),
        Err(SyncError::Blocked(blocked)) => {
            eprintln!("{}", blocked.remediation());
            Err(SyncError::Blocked(blocked).into())
        }
        Err(e) => Err(e.into()),
    }
}
