// subsync: Git Submodule Sync Runner
//
// SPDX-FileCopyrightText: 2026 subsync contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Entry point.
//!
//! ```text
//! cli::try_parse() --> Config (layered) --> Logging --> run_sync_command
//!      exit 1 on usage errors, 0 on --help/--version
//! ```

use std::process::ExitCode;

use subsync::cli::{self, Cli};
use subsync::cli::global::GlobalOptions;
use subsync::cmd::run_sync_command;
use subsync::config::Config;
use subsync::config::loader::ConfigLoader;
use subsync::error::SyncError;
use subsync::logging::{LogConfig, init_logging};

use mimalloc::MiMalloc;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

fn main() -> ExitCode {
    let cli = match cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => return handle_parse_error(&e),
    };

    let config = match load_config(&cli.global) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config: {e:#}");
            return ExitCode::FAILURE;
        }
    };

    let log_config = build_log_config(&config);
    let _log_guard = match init_logging(&log_config) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            return ExitCode::FAILURE;
        }
    };

    dispatch_command(&cli, &config)
}

/// Map argument errors to the exit-code contract: usage errors are exit 1
/// (not clap's native 2), help/version output is exit 0.
fn handle_parse_error(err: &clap::Error) -> ExitCode {
    use clap::error::ErrorKind;

    match err.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
            print!("{err}");
            ExitCode::SUCCESS
        }
        _ => {
            let usage = SyncError::Usage(err.to_string().into_boxed_str());
            eprint!("{usage}");
            ExitCode::FAILURE
        }
    }
}

fn dispatch_command(cli: &Cli, config: &Config) -> ExitCode {
    match run_sync_command(cli.mode(), config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn build_log_config(config: &Config) -> LogConfig {
    LogConfig::builder()
        .with_console_level(config.global.output_log_level)
        .with_file_level(config.global.file_log_level)
        .maybe_with_log_file(
            config
                .global
                .log_file
                .as_ref()
                .map(|p| p.display().to_string()),
        )
        .build()
}

fn load_config(global: &GlobalOptions) -> subsync::error::Result<Config> {
    let mut loader = ConfigLoader::new();
    if !global.no_default_configs {
        loader = loader.add_toml_file_optional("subsync.toml");
    }
    for path in &global.configs {
        loader = loader.add_toml_file(path);
    }
    loader = loader.with_env_prefix("SUBSYNC");

    // CLI flags override every file/env source
    if global.dry {
        loader = loader.set("global.dry", true)?;
    }
    if let Some(level) = global.log_level {
        loader = loader.set("global.output_log_level", i64::from(level))?;
    }
    if let Some(level) = global.file_log_level.or(global.log_level) {
        loader = loader.set("global.file_log_level", i64::from(level))?;
    }
    if let Some(path) = &global.log_file {
        loader = loader.set("global.log_file", path.display().to_string())?;
    }

    loader.build()
}
