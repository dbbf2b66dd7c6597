// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Apply Command
//!
//! Applies push notifications read from a file or stdin. The input is one
//! notification object or an array of them:
//! `{"operation": "added_message", "data": "<json payload>"}`.

use std::fs;
use std::io::{self, Read};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use textmirror_core::{ApplyOutcome, CallbackHandler, EventDispatcher, Notification};

use super::open_engine;
use crate::config::CliConfig;

/// Parses a single notification or a JSON array of notifications.
pub fn parse_notifications(input: &str) -> Result<Vec<Notification>> {
    let value: serde_json::Value = serde_json::from_str(input).context("input is not JSON")?;
    let notifications = if value.is_array() {
        serde_json::from_value(value)?
    } else {
        vec![serde_json::from_value(value)?]
    };
    Ok(notifications)
}

fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) if path != Path::new("-") => {
            fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
        }
        _ => {
            let mut input = String::new();
            io::stdin().read_to_string(&mut input)?;
            Ok(input)
        }
    }
}

pub fn run(config: &CliConfig, input: Option<&Path>, wait: Duration) -> Result<()> {
    let notifications = parse_notifications(&read_input(input)?)?;

    let storage = config.open_storage()?;
    let ctx = config.account_context(&storage)?;

    let mut events = EventDispatcher::new();
    events.add_handler(Arc::new(CallbackHandler::new(|event| {
        tracing::info!(?event, "sync event");
    })));
    let applier = open_engine(config, storage)?.with_events(events).applier();

    let mut failures = 0;
    for notification in &notifications {
        match applier.apply_notification(&ctx, notification) {
            Ok(ApplyOutcome::PendingMedia(pending)) => match pending.wait(wait) {
                Some(Ok(file)) => println!(
                    "{}: applied, attachment saved to {}",
                    notification.operation,
                    file.path.display()
                ),
                Some(Err(e)) => println!(
                    "{}: applied, attachment failed: {}",
                    notification.operation, e
                ),
                None => println!(
                    "{}: applied, attachment still downloading",
                    notification.operation
                ),
            },
            Ok(ApplyOutcome::NoOp(reason)) => {
                println!("{}: no-op ({:?})", notification.operation, reason)
            }
            Ok(ApplyOutcome::Ignored) => println!("{}: ignored", notification.operation),
            Ok(ApplyOutcome::Applied) => println!("{}: applied", notification.operation),
            Err(e) => {
                failures += 1;
                eprintln!("{}: failed: {}", notification.operation, e);
            }
        }
    }

    if failures > 0 {
        anyhow::bail!("{} of {} notifications failed", failures, notifications.len());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_single_notification() {
        let parsed =
            parse_notifications(r#"{"operation":"removed_message","data":"{\"id\":4}"}"#).unwrap();
        assert_eq!(parsed, vec![Notification::new("removed_message", r#"{"id":4}"#)]);
    }

    #[test]
    fn test_parse_notification_array() {
        let parsed = parse_notifications(
            r#"[{"operation":"dismissed_notification","data":"{}"},
                {"operation":"read_conversation","data":"{\"id\":1}"}]"#,
        )
        .unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[1].operation, "read_conversation");
    }

    #[test]
    fn test_parse_rejects_non_notification() {
        assert!(parse_notifications("[1, 2]").is_err());
        assert!(parse_notifications("not json").is_err());
    }
}
