// subsync: Git Submodule Sync Runner
//
// SPDX-FileCopyrightText: 2026 subsync contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Configuration types for subsync.
//!
//! # Config Structure
//!
//! ```text
//! Config: GlobalConfig, [[submodules]]
//! Policy: track-remote | fixed-branch (default: track-remote)
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::ConfigError;
use crate::logging::LogLevel;

/// Update policy wire format for a `[[submodules]]` entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PolicyKind {
    /// Move the submodule to the latest commit on its configured remote branch.
    #[default]
    TrackRemote,
    /// Fetch/checkout a fixed branch inside the submodule, fast-forward only.
    FixedBranch,
}

impl std::fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TrackRemote => write!(f, "track-remote"),
            Self::FixedBranch => write!(f, "fixed-branch"),
        }
    }
}

impl std::str::FromStr for PolicyKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "track-remote" => Ok(Self::TrackRemote),
            "fixed-branch" => Ok(Self::FixedBranch),
            _ => Err(ConfigError::InvalidValue {
                section: "submodules".to_string(),
                key: "policy".to_string(),
                message: format!("expected 'track-remote' or 'fixed-branch', got '{s}'"),
            }),
        }
    }
}

/// Global configuration options.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobalConfig {
    /// Log what would be done without touching the repository.
    pub dry: bool,
    /// Log level for stdout output (0-5).
    pub output_log_level: LogLevel,
    /// Log level for file output (0-5).
    pub file_log_level: LogLevel,
    /// Path to log file (none = console only).
    pub log_file: Option<PathBuf>,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            dry: false,
            output_log_level: LogLevel::INFO,
            file_log_level: LogLevel::TRACE,
            log_file: None,
        }
    }
}

/// One synced submodule: a path in the parent repository plus its policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmoduleConfig {
    /// Submodule path relative to the repository root.
    pub path: String,
    /// Update policy.
    #[serde(default)]
    pub policy: PolicyKind,
    /// Remote to fetch from (fixed-branch policy only).
    #[serde(default = "default_remote")]
    pub remote: String,
    /// Branch to track (required for fixed-branch).
    #[serde(default)]
    pub branch: Option<String>,
}

fn default_remote() -> String {
    "origin".to_string()
}

impl SubmoduleConfig {
    /// The class-library dependency, updated to its remote-tracking tip.
    #[must_use]
    pub fn classlib() -> Self {
        Self {
            path: "classlib".to_string(),
            policy: PolicyKind::TrackRemote,
            remote: default_remote(),
            branch: None,
        }
    }

    /// The software-project dependency, pinned to a branch, fast-forward only.
    #[must_use]
    pub fn qmcsoftware() -> Self {
        Self {
            path: "qmcsoftware".to_string(),
            policy: PolicyKind::FixedBranch,
            remote: default_remote(),
            branch: Some("develop".to_string()),
        }
    }

    /// Validate one entry against its declared policy.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` when the path is empty or a fixed-branch entry
    /// has no branch.
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if self.path.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                section: "submodules".to_string(),
                key: "path".to_string(),
                message: "path must not be empty".to_string(),
            });
        }
        if self.policy == PolicyKind::FixedBranch
            && self.branch.as_deref().is_none_or(|b| b.trim().is_empty())
        {
            return Err(ConfigError::MissingKey {
                section: "submodules".to_string(),
                key: "branch".to_string(),
            });
        }
        Ok(())
    }
}
