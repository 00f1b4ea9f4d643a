//! Background forecast fetching.
//!
//! The transport boundary of the download coordinator. [`Fetcher`] abstracts
//! the actual network transfer; [`FetchTask`] wraps one in-flight transfer
//! as a handle whose result is observed by non-blocking polling, so the
//! simulator tick never waits on the network.

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use reqwest::blocking::Client;
use thiserror::Error;

/// Errors from a forecast fetch attempt.
///
/// These never propagate to the tick loop; they are logged and converted
/// into a cooldown before the next attempt.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The HTTP request could not be completed.
    #[error("request for {url} failed: {reason}")]
    Request { url: String, reason: String },

    /// The server answered with a non-success status.
    #[error("server returned status {status} for {url}")]
    Status { url: String, status: u16 },

    /// The destination file could not be written.
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The background worker ended without reporting a result.
    #[error("fetch task ended without a result")]
    TaskAborted,
}

/// Transfers one remote file to a local destination.
///
/// Implementations are free to block: they run on a background thread, never
/// on the tick thread.
pub trait Fetcher: Send + Sync {
    /// Fetch `url` into `dest`, replacing any existing file.
    fn fetch(&self, url: &str, dest: &Path) -> Result<(), FetchError>;
}

/// HTTP fetcher backed by a blocking reqwest client.
#[derive(Debug)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Create a fetcher with the given request timeout.
    pub fn new(timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to create HTTP client");
        Self { client }
    }
}

impl Fetcher for HttpFetcher {
    fn fetch(&self, url: &str, dest: &Path) -> Result<(), FetchError> {
        let mut response = self
            .client
            .get(url)
            .send()
            .map_err(|e| FetchError::Request {
                url: url.to_string(),
                reason: e.to_string(),
            })?;

        if !response.status().is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }

        let mut file = File::create(dest).map_err(|e| FetchError::Write {
            path: dest.to_path_buf(),
            source: e,
        })?;

        if let Err(e) = response.copy_to(&mut file) {
            // Do not leave a truncated forecast behind
            drop(file);
            let _ = fs::remove_file(dest);
            return Err(FetchError::Request {
                url: url.to_string(),
                reason: e.to_string(),
            });
        }

        Ok(())
    }
}

/// Handle to one in-flight background fetch.
///
/// There is no cancellation: once spawned, the transfer runs to completion
/// or failure. The owner polls [`try_take`](Self::try_take) once per tick.
pub struct FetchTask {
    rx: Receiver<Result<String, FetchError>>,
}

impl FetchTask {
    /// Spawn a background transfer of `url` into `cache_root/rel_path`.
    ///
    /// On success the task yields `rel_path` back.
    pub fn spawn(
        fetcher: Arc<dyn Fetcher>,
        url: String,
        cache_root: PathBuf,
        rel_path: String,
    ) -> Self {
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let dest = cache_root.join(&rel_path);
            let result = fetcher.fetch(&url, &dest).map(|()| rel_path);
            // The receiver may already be gone on shutdown
            let _ = tx.send(result);
        });
        Self { rx }
    }

    /// Non-blocking poll of the task's outcome.
    ///
    /// Returns `None` while the transfer is still running. A worker that
    /// died without reporting yields `Err(FetchError::TaskAborted)`.
    pub fn try_take(&mut self) -> Option<Result<String, FetchError>> {
        match self.rx.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Err(FetchError::TaskAborted)),
        }
    }
}

impl std::fmt::Debug for FetchTask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FetchTask").finish_non_exhaustive()
    }
}
