//! Configuration for the WAFS download service.

use std::path::PathBuf;
use std::time::Duration;

/// Default NOAA GFS production tree.
pub const DEFAULT_BASE_URL: &str = "http://www.ftp.ncep.noaa.gov/data/nccf/com/gfs/prod";

/// Default HTTP timeout for forecast downloads.
const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Configuration for [`WafsService`](super::WafsService).
#[derive(Debug, Clone)]
pub struct WafsConfig {
    /// Base URL of the forecast file tree.
    pub base_url: String,

    /// Root directory for cached forecast files.
    pub cache_root: PathBuf,

    /// Whether background downloads are performed at all.
    pub download_enabled: bool,

    /// Keep superseded forecast files instead of deleting them.
    pub keep_old_files: bool,

    /// Cache-relative path of the last successful download, restored from
    /// persisted state. Accepted at startup only if the file still exists.
    pub last_cache_file: Option<String>,

    /// HTTP request timeout.
    pub timeout: Duration,
}

impl Default for WafsConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            cache_root: dirs::cache_dir()
                .unwrap_or_else(std::env::temp_dir)
                .join("xweatherlayer"),
            download_enabled: true,
            keep_old_files: false,
            last_cache_file: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl WafsConfig {
    /// Create a configuration with the given cache root.
    pub fn new(cache_root: PathBuf) -> Self {
        Self {
            cache_root,
            ..Default::default()
        }
    }

    /// Set the base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Enable or disable background downloads.
    pub fn with_download_enabled(mut self, enabled: bool) -> Self {
        self.download_enabled = enabled;
        self
    }

    /// Keep or delete superseded forecast files.
    pub fn with_keep_old_files(mut self, keep: bool) -> Self {
        self.keep_old_files = keep;
        self
    }

    /// Seed the service with a persisted cache reference.
    pub fn with_last_cache_file(mut self, rel_path: impl Into<String>) -> Self {
        self.last_cache_file = Some(rel_path.into());
        self
    }

    /// Set the HTTP timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}
