// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! CLI Configuration
//!
//! Every setting can come from a flag or a `TEXTMIRROR_*` environment variable.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use textmirror_core::{AccountContext, ApiConfig, Storage, SyncConfig};

/// Connection and account settings shared by all commands.
#[derive(Args, Debug, Clone)]
pub struct CliConfig {
    /// Base URL of the sync API
    #[arg(
        long,
        global = true,
        env = "TEXTMIRROR_BASE_URL",
        default_value = "https://api.textmirror.app/api/v1"
    )]
    pub base_url: String,

    /// Account identifier
    #[arg(long, global = true, env = "TEXTMIRROR_ACCOUNT_ID", default_value = "")]
    pub account_id: String,

    /// Identifier of this device within the account
    #[arg(long, global = true, env = "TEXTMIRROR_DEVICE_ID", default_value_t = 0)]
    pub device_id: i64,

    /// Passphrase the account key is derived from
    #[arg(long, global = true, env = "TEXTMIRROR_PASSPHRASE", hide_env_values = true)]
    pub passphrase: Option<String>,

    /// Server-provided salt for key derivation
    #[arg(long, global = true, env = "TEXTMIRROR_SALT", default_value = "")]
    pub salt: String,

    /// Local database file
    #[arg(long, global = true, env = "TEXTMIRROR_DB", default_value = "textmirror.db")]
    pub db_path: PathBuf,

    /// Directory for downloaded attachments
    #[arg(long, global = true, env = "TEXTMIRROR_MEDIA_DIR", default_value = "media")]
    pub media_dir: PathBuf,

    /// Act as the primary device (performs real sends)
    #[arg(long, global = true, env = "TEXTMIRROR_PRIMARY")]
    pub primary: bool,

    /// Proxy URL for all HTTP requests
    #[arg(long, global = true, env = "TEXTMIRROR_PROXY")]
    pub proxy: Option<String>,
}

impl CliConfig {
    /// Opens (and migrates) the local database.
    pub fn open_storage(&self) -> Result<Arc<Storage>> {
        let storage = Storage::open(&self.db_path)
            .with_context(|| format!("opening database {}", self.db_path.display()))?;
        Ok(Arc::new(storage))
    }

    pub fn api_config(&self) -> ApiConfig {
        let config = ApiConfig::default().with_base_url(self.base_url.as_str());
        match &self.proxy {
            Some(proxy) => config.with_proxy(proxy.clone()),
            None => config,
        }
    }

    pub fn sync_config(&self) -> SyncConfig {
        SyncConfig::default().with_media_dir(&self.media_dir)
    }

    /// Derives the account context.
    ///
    /// The primary flag is taken from the command line when set, otherwise
    /// from the account state stored on this device.
    pub fn account_context(&self, storage: &Storage) -> Result<AccountContext> {
        let is_primary = self.primary || storage.read(|s| s.load_account_state())?.is_primary;
        let ctx = AccountContext::derive(
            self.account_id.as_str(),
            self.device_id,
            is_primary,
            self.passphrase.as_deref(),
            &self.salt,
        )
        .context("deriving account key (check account id, passphrase and salt)")?;
        Ok(ctx)
    }
}

// INLINE_TEST_REQUIRED: Binary crate without lib.rs - tests cannot be external
#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn config(dir: &std::path::Path) -> CliConfig {
        CliConfig {
            base_url: "http://localhost:8080/api/v1/".to_string(),
            account_id: "acct".to_string(),
            device_id: 3,
            passphrase: Some("correct horse".to_string()),
            salt: "salt".to_string(),
            db_path: dir.join("data.db"),
            media_dir: dir.join("media"),
            primary: false,
            proxy: None,
        }
    }

    #[test]
    fn test_account_context_uses_stored_primary_flag() {
        let dir = tempdir().unwrap();
        let config = config(dir.path());
        let storage = config.open_storage().unwrap();

        assert!(!config.account_context(&storage).unwrap().is_primary());

        storage.transaction(|s| s.set_primary(true)).unwrap();
        let ctx = config.account_context(&storage).unwrap();
        assert!(ctx.is_primary());
        assert_eq!(ctx.device_id(), 3);
    }

    #[test]
    fn test_missing_passphrase_is_an_error() {
        let dir = tempdir().unwrap();
        let mut config = config(dir.path());
        config.passphrase = None;
        let storage = config.open_storage().unwrap();

        assert!(config.account_context(&storage).is_err());
    }

    #[test]
    fn test_api_config_trims_trailing_slash() {
        let dir = tempdir().unwrap();
        let api = config(dir.path()).api_config();
        assert_eq!(api.base_url, "http://localhost:8080/api/v1");
        assert!(api.proxy_url.is_none());
    }
}
