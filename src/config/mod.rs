// subsync: Git Submodule Sync Runner
//
// SPDX-FileCopyrightText: 2026 subsync contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Configuration management for subsync.
//!
//! # Configuration Hierarchy
//!
//! ```text
//! Priority (low → high)
//! 1. built-in defaults (classlib + qmcsoftware)
//! 2. local subsync.toml (cwd)
//! 3. --config FILE (repeatable)
//! 4. SUBSYNC_* env vars
//! 5. CLI overrides
//! ```
//!
//! # Example
//!
//! ```toml
//! [global]
//! output_log_level = 4
//!
//! [[submodules]]
//! path = "classlib"
//! policy = "track-remote"
//!
//! [[submodules]]
//! path = "qmcsoftware"
//! policy = "fixed-branch"
//! remote = "origin"
//! branch = "develop"
//! ```

pub mod loader;
pub mod types;


use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

use loader::ConfigLoader;
pub use types::{GlobalConfig, PolicyKind, SubmoduleConfig};

/// Merged configuration for a single run.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Global options.
    pub global: GlobalConfig,
    /// Submodules to sync, in declaration order.
    pub submodules: Vec<SubmoduleConfig>,
}

impl Config {
    /// Create a new configuration builder.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use subsync::config::Config;
    ///
    /// let config = Config::builder()
    ///     .add_toml_file_optional("subsync.toml")
    ///     .with_env_prefix("SUBSYNC")
    ///     .build()?;
    /// # Ok::<(), anyhow::Error>(())
    /// ```
    #[must_use]
    pub fn builder() -> ConfigLoader {
        ConfigLoader::new()
    }

    /// Load configuration from a TOML string (simple API).
    ///
    /// # Errors
    ///
    /// Returns an error if the content contains invalid TOML or does not
    /// match the `Config` structure.
    pub fn parse(content: &str) -> Result<Self> {
        Self::builder().add_toml_str(content).build()
    }

    /// Fill defaults and reject inconsistent entries.
    ///
    /// An empty `[[submodules]]` list resolves to the two fixed descriptors
    /// this tool exists for. Duplicate paths and fixed-branch entries without
    /// a branch are rejected.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` describing the first inconsistent entry.
    pub fn resolve_and_validate(&mut self) -> Result<()> {
        if self.submodules.is_empty() {
            self.submodules = vec![SubmoduleConfig::classlib(), SubmoduleConfig::qmcsoftware()];
        }
        for submodule in &self.submodules {
            submodule.validate()?;
        }
        for (i, submodule) in self.submodules.iter().enumerate() {
            if self.submodules[..i].iter().any(|s| s.path == submodule.path) {
                return Err(ConfigError::InvalidValue {
                    section: "submodules".to_string(),
                    key: "path".to_string(),
                    message: format!("duplicate submodule path '{}'", submodule.path),
                }
                .into());
            }
        }
        Ok(())
    }

    /// Submodule paths in declaration order.
    #[must_use]
    pub fn submodule_paths(&self) -> Vec<String> {
        self.submodules.iter().map(|s| s.path.clone()).collect()
    }
}
