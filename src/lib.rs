// subsync: Git Submodule Sync Runner
//
// SPDX-FileCopyrightText: 2026 subsync contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Library root.
//!
//! # Crate Architecture
//!
//! ```text
//!                  main.rs
//!                     |
//!          +----------+----------+
//!          v                     v
//!       cli (clap)          cmd (handler)
//!          |                     |
//!          +----------+----------+
//!                     v
//!        ,---------------------------,
//!        |          config           |
//!        |   TOML, layered settings  |
//!        '------------+--------------'
//!                     v
//!                   sync
//!          clean-tree check, policies,
//!          report / commit / push
//!                     |
//!                     v
//!                    git
//!          GitClient seam: gix (read)
//!                + git CLI (write)
//!
//!   +------------------------------------+
//!   |  foundation   error, logging       |
//!   +------------------------------------+
//! ```

pub mod cli;
pub mod cmd;
pub mod config;
pub mod error;
pub mod git;
pub mod logging;
pub mod sync;
