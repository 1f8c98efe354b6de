// subsync: Git Submodule Sync Runner
//
// SPDX-FileCopyrightText: 2026 subsync contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! CLI module for subsync using clap derive.
//!
//! # Command Structure
//!
//! ```text
//! subsync [global options]            update only
//! subsync [global options] --commit   update + commit pointer changes
//! subsync [global options] --push     update + commit + push
//! ```
//!
//! Anything else is a usage error; the entry point maps it to exit code 1.

pub mod global;


use clap::Parser;

use crate::cli::global::GlobalOptions;
use crate::sync::Mode;

/// Keeps pinned git submodules in sync with their upstream remotes.
#[derive(Debug, Parser)]
#[command(
    name = "subsync",
    version,
    about = "Keeps pinned git submodules in sync with their upstream remotes",
    long_about = "Updates the classlib submodule to its remote-tracking tip and the\n\
                  qmcsoftware submodule to a fixed branch (fast-forward only), then\n\
                  optionally commits and pushes the pointer updates.\n\n\
                  Run from the repository root. The working tree must be clean; if a\n\
                  previous run left pointer updates behind, subsync prints the exact\n\
                  commands to commit or discard them and refuses to continue.",
    after_help = "CONFIG FILES:\n\n\
                  By default, subsync loads an optional `subsync.toml` from the current\n\
                  directory. Additional files can be layered with --config; later files\n\
                  override earlier ones, SUBSYNC_* environment variables and command\n\
                  line flags override both. Use --no-default-configs to disable the\n\
                  auto-loaded file and only use --config."
)]
pub struct Cli {
    /// Global options.
    #[command(flatten)]
    pub global: GlobalOptions,

    /// Stage and commit the submodule pointer updates.
    #[arg(long)]
    pub commit: bool,

    /// Commit and push the pointer updates (implies --commit).
    #[arg(long)]
    pub push: bool,
}

impl Cli {
    /// The invocation mode encoded by the flags.
    #[must_use]
    pub const fn mode(&self) -> Mode {
        Mode::from_flags(self.commit, self.push)
    }
}

/// Parses command-line arguments.
#[must_use]
pub fn parse() -> Cli {
    Cli::parse()
}

/// Parses command-line arguments from an iterator.
pub fn parse_from<I, T>(iter: I) -> Cli
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    Cli::parse_from(iter)
}

/// Tries to parse command-line arguments, returning an error on failure.
///
/// # Errors
///
/// Returns a `clap::Error` if the arguments are invalid or if help/version
/// information was requested.
pub fn try_parse() -> Result<Cli, clap::Error> {
    Cli::try_parse()
}
