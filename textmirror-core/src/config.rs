// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Configuration for bulk sync and attachment transfer

use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::time::Duration;

/// Records per message page, for both upload and download.
pub const MESSAGE_PAGE_SIZE: usize = 300;
/// Maximum attachment downloads per full resync.
pub const MAX_MEDIA_DOWNLOADS: usize = 75;
/// Maximum attachment uploads per full resync.
pub const MAX_MEDIA_UPLOADS: usize = 20;
/// Wall-clock cap for an attachment download batch.
pub const MEDIA_DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(5 * 60);
/// Wall-clock cap for an attachment upload batch.
pub const MEDIA_UPLOAD_TIMEOUT: Duration = Duration::from_secs(2 * 60);
/// Consecutive failed message pages after which a download stops paging.
pub const MAX_FAILED_PAGES: usize = 5;

/// Configuration for the sync engine
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Page size for message upload and download
    pub message_page_size: NonZeroUsize,

    /// Consecutive failed pages tolerated while downloading messages
    pub max_failed_pages: usize,

    /// Extra attempts for whole-batch conversation transfers
    pub conversation_retries: usize,

    /// Attachment downloads per resync
    pub max_media_downloads: usize,

    /// Attachment uploads per resync
    pub max_media_uploads: usize,

    /// Safety timeout for a download batch
    pub media_download_timeout: Duration,

    /// Safety timeout for an upload batch
    pub media_upload_timeout: Duration,

    /// Worker threads used for attachment transfer
    pub transfer_workers: usize,

    /// Directory where downloaded attachments are written
    pub media_dir: PathBuf,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            message_page_size: NonZeroUsize::new(MESSAGE_PAGE_SIZE).unwrap_or(NonZeroUsize::MIN),
            max_failed_pages: MAX_FAILED_PAGES,
            conversation_retries: 1,
            max_media_downloads: MAX_MEDIA_DOWNLOADS,
            max_media_uploads: MAX_MEDIA_UPLOADS,
            media_download_timeout: MEDIA_DOWNLOAD_TIMEOUT,
            media_upload_timeout: MEDIA_UPLOAD_TIMEOUT,
            transfer_workers: 4,
            media_dir: PathBuf::from("media"),
        }
    }
}

impl SyncConfig {
    /// Store downloaded attachments under `dir`
    pub fn with_media_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.media_dir = dir.into();
        self
    }

    /// Override the message page size
    pub fn with_page_size(mut self, page_size: NonZeroUsize) -> Self {
        self.message_page_size = page_size;
        self
    }

    /// Override both attachment safety timeouts
    pub fn with_media_timeouts(mut self, download: Duration, upload: Duration) -> Self {
        self.media_download_timeout = download;
        self.media_upload_timeout = upload;
        self
    }

    /// Override the attachment worker count (at least one worker is used)
    pub fn with_transfer_workers(mut self, workers: usize) -> Self {
        self.transfer_workers = workers.max(1);
        self
    }
}

/// Configuration for the HTTP remote API
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL of the API, e.g. "https://api.textmirror.app/api/v1"
    pub base_url: String,

    /// HTTP timeout per request
    pub timeout: Duration,

    /// User-Agent header sent with every request
    pub user_agent: String,

    /// Proxy URL (for Tor support)
    pub proxy_url: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.textmirror.app/api/v1".to_string(),
            timeout: Duration::from_secs(30),
            user_agent: format!("textmirror/{}", env!("CARGO_PKG_VERSION")),
            proxy_url: None,
        }
    }
}

impl ApiConfig {
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Configure with custom proxy
    pub fn with_proxy(mut self, proxy_url: String) -> Self {
        self.proxy_url = Some(proxy_url);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_transfer_constants() {
        let config = SyncConfig::default();
        assert_eq!(config.message_page_size.get(), 300);
        assert_eq!(config.max_media_downloads, 75);
        assert_eq!(config.max_media_uploads, 20);
        assert_eq!(config.media_download_timeout, Duration::from_secs(300));
        assert_eq!(config.media_upload_timeout, Duration::from_secs(120));
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let api = ApiConfig::default().with_base_url("http://localhost:8080/api/");
        assert_eq!(api.base_url, "http://localhost:8080/api");
    }
}
