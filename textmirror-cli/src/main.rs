// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! TextMirror CLI
//!
//! Drives the sync core against the HTTP API: full download and upload of
//! an account, applying push notifications, and inspecting the local store.

mod commands;
mod config;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};

use config::CliConfig;

#[derive(Parser)]
#[command(name = "textmirror")]
#[command(version, about = "Encrypted multi-device message sync")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    config: CliConfig,
}

#[derive(Subcommand)]
enum Commands {
    /// Replace the local store with the server copy
    Download,

    /// Push the local store to the server
    Upload,

    /// Apply push notifications from a file (or stdin)
    Apply {
        /// JSON file with one notification or an array; "-" reads stdin
        input: Option<PathBuf>,

        /// Seconds to wait for attachment downloads
        #[arg(long, default_value_t = 30)]
        wait: u64,
    },

    /// Show local store and account state
    Status,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("textmirror_core=info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Download => commands::download::run(&cli.config)?,
        Commands::Upload => commands::upload::run(&cli.config)?,
        Commands::Apply { input, wait } => {
            commands::apply::run(&cli.config, input.as_deref(), Duration::from_secs(wait))?
        }
        Commands::Status => commands::status::run(&cli.config)?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parses_apply_with_global_flags() {
        let cli = Cli::try_parse_from([
            "textmirror",
            "apply",
            "changes.json",
            "--wait",
            "5",
            "--account-id",
            "acct",
            "--device-id",
            "2",
            "--primary",
        ])
        .unwrap();

        assert!(cli.config.primary);
        assert_eq!(cli.config.account_id, "acct");
        assert_eq!(cli.config.device_id, 2);
        match cli.command {
            Commands::Apply { input, wait } => {
                assert_eq!(input, Some(PathBuf::from("changes.json")));
                assert_eq!(wait, 5);
            }
            _ => panic!("expected apply"),
        }
    }
}
