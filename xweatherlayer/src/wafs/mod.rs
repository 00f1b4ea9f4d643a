//! WAFS forecast download coordination.
//!
//! The World Area Forecast System publishes upper-air forecasts in cycles;
//! [`WafsService`] keeps a local cache tracking the currently authoritative
//! cycle without ever blocking the caller. One `tick` per host update drives
//! a small state machine:
//!
//! ```text
//! Idle --[desired cycle != active]--> Downloading
//! Downloading --[fetch succeeded]--> Idle (dataset replaced)
//! Downloading --[fetch failed]--> Cooldown
//! Cooldown --[cooldown elapsed]--> Idle
//! ```
//!
//! At most one fetch is ever in flight; failures only lengthen the interval
//! before the next attempt and are never surfaced to the tick loop.

pub mod config;
mod extract;
mod fetch;

pub use config::WafsConfig;
pub use extract::{
    parse_turbulence_records, TurbulenceExtractor, TurbulenceSample, WgribExtractor,
};
pub use fetch::{FetchError, FetchTask, Fetcher, HttpFetcher};

use std::fs;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::cycle::{self, CycleDescriptor};

/// Ticks of cooldown imposed after a failed fetch.
pub const FAILURE_COOLDOWN: f64 = 60.0;

/// Cache subdirectory holding forecast files.
const CACHE_SUBDIR: &str = "wafs";

/// Download coordinator state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchState {
    /// No fetch in flight; a new one may start.
    Idle,
    /// A background fetch is running.
    Downloading,
    /// The last fetch failed; waiting before retrying.
    Cooldown,
}

/// The last successfully fetched forecast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveDataset {
    /// Cache-relative path of the forecast file.
    pub cache_file: String,
    /// Datecycle identifier (`YYYYMMDDHH`) the file belongs to.
    pub datecycle: String,
}

/// Compose the filename of a forecast file.
pub fn forecast_filename(cycle: &CycleDescriptor) -> String {
    format!(
        "WAFS_blended_{}f{:02}.grib2",
        cycle.datecycle, cycle.forecast_hour
    )
}

/// Compose the download URL for a forecast file.
pub fn forecast_url(base_url: &str, cycle: &CycleDescriptor) -> String {
    format!(
        "{}/gfs.{}/{}",
        base_url,
        cycle.datecycle,
        forecast_filename(cycle)
    )
}

/// Compose the cache-relative path for a forecast file.
pub fn cache_rel_path(cycle: &CycleDescriptor) -> String {
    format!(
        "{}/{}_{}",
        CACHE_SUBDIR,
        cycle.datecycle,
        forecast_filename(cycle)
    )
}

/// Recover the datecycle identifier from a cache-relative path.
///
/// Cache filenames are prefixed with their 10-digit datecycle; anything else
/// yields `None`.
fn datecycle_from_cache_path(rel_path: &str) -> Option<String> {
    let name = rel_path.rsplit('/').next().unwrap_or(rel_path);
    let id: String = name.chars().take(10).collect();
    (id.len() == 10 && id.chars().all(|c| c.is_ascii_digit())).then_some(id)
}

/// The download coordinator.
///
/// Owns the single-flight fetch task and the active dataset reference. All
/// methods are non-blocking; the background transfer runs on its own thread
/// and is observed by polling.
pub struct WafsService {
    config: WafsConfig,
    fetcher: Arc<dyn Fetcher>,
    state: FetchState,
    task: Option<FetchTask>,
    cooldown_remaining: f64,
    active: Option<ActiveDataset>,
}

impl WafsService {
    /// Create a service, seeding the active dataset from the configured
    /// persisted reference if its file still exists under the cache root.
    pub fn new(config: WafsConfig, fetcher: Arc<dyn Fetcher>) -> Self {
        let active = config.last_cache_file.as_ref().and_then(|rel_path| {
            if !config.cache_root.join(rel_path).exists() {
                tracing::debug!(file = %rel_path, "persisted forecast reference is stale, ignoring");
                return None;
            }
            datecycle_from_cache_path(rel_path).map(|datecycle| {
                tracing::info!(datecycle = %datecycle, file = %rel_path, "restored cached forecast");
                ActiveDataset {
                    cache_file: rel_path.clone(),
                    datecycle,
                }
            })
        });

        Self {
            config,
            fetcher,
            state: FetchState::Idle,
            task: None,
            cooldown_remaining: 0.0,
            active,
        }
    }

    /// Create a service with the standard HTTP fetcher.
    pub fn with_http_fetcher(config: WafsConfig) -> Self {
        let timeout = config.timeout;
        Self::new(config, Arc::new(HttpFetcher::new(timeout)))
    }

    /// Advance the coordinator by one tick.
    ///
    /// Polls any running fetch, counts down an active cooldown, and starts a
    /// new fetch when the authoritative cycle for `now` differs from the
    /// active dataset. Never blocks.
    pub fn tick(&mut self, now: DateTime<Utc>, elapsed: f64) {
        let desired = cycle::current_cycle(now);

        if let Some(task) = self.task.as_mut() {
            match task.try_take() {
                None => {}
                Some(Ok(rel_path)) => {
                    self.task = None;
                    self.state = FetchState::Idle;
                    self.activate(rel_path);
                }
                Some(Err(err)) => {
                    self.task = None;
                    self.state = FetchState::Cooldown;
                    self.cooldown_remaining = FAILURE_COOLDOWN;
                    tracing::warn!(error = %err, "forecast fetch failed, backing off");
                }
            }
        }

        if self.state == FetchState::Cooldown {
            self.cooldown_remaining -= elapsed;
            if self.cooldown_remaining <= 0.0 {
                self.cooldown_remaining = 0.0;
                self.state = FetchState::Idle;
            }
        }

        let active_datecycle = self.active.as_ref().map(|a| a.datecycle.as_str());
        if self.state == FetchState::Idle
            && self.config.download_enabled
            && active_datecycle != Some(desired.datecycle.as_str())
        {
            self.start_fetch(&desired);
        }
    }

    /// Current coordinator state.
    pub fn state(&self) -> FetchState {
        self.state
    }

    /// The active dataset, if any forecast has been fetched or restored.
    pub fn active(&self) -> Option<&ActiveDataset> {
        self.active.as_ref()
    }

    /// Cache-relative path of the active forecast file, for persistence.
    pub fn active_cache_file(&self) -> Option<&str> {
        self.active.as_ref().map(|a| a.cache_file.as_str())
    }

    /// Remaining cooldown after a failed fetch, in tick units.
    pub fn cooldown_remaining(&self) -> f64 {
        self.cooldown_remaining
    }

    fn start_fetch(&mut self, cycle: &CycleDescriptor) {
        let subdir = self.config.cache_root.join(CACHE_SUBDIR);
        if let Err(err) = fs::create_dir_all(&subdir) {
            tracing::warn!(
                path = %subdir.display(),
                error = %err,
                "cannot create forecast cache directory, skipping fetch"
            );
            return;
        }

        let url = forecast_url(&self.config.base_url, cycle);
        let rel_path = cache_rel_path(cycle);
        tracing::info!(
            datecycle = %cycle.datecycle,
            forecast_hour = cycle.forecast_hour,
            url = %url,
            "starting forecast fetch"
        );

        self.task = Some(FetchTask::spawn(
            Arc::clone(&self.fetcher),
            url,
            self.config.cache_root.clone(),
            rel_path,
        ));
        self.state = FetchState::Downloading;
    }

    fn activate(&mut self, rel_path: String) {
        let Some(datecycle) = datecycle_from_cache_path(&rel_path) else {
            tracing::warn!(file = %rel_path, "fetched file has no parsable datecycle, ignoring");
            return;
        };

        if !self.config.keep_old_files {
            if let Some(previous) = &self.active {
                let previous_abs = self.config.cache_root.join(&previous.cache_file);
                if let Err(err) = fs::remove_file(&previous_abs) {
                    tracing::debug!(
                        path = %previous_abs.display(),
                        error = %err,
                        "could not remove superseded forecast file"
                    );
                }
            }
        }

        tracing::info!(datecycle = %datecycle, file = %rel_path, "forecast dataset activated");
        self.active = Some(ActiveDataset {
            cache_file: rel_path,
            datecycle,
        });
    }
}

impl std::fmt::Debug for WafsService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WafsService")
            .field("config", &self.config)
            .field("state", &self.state)
            .field("cooldown_remaining", &self.cooldown_remaining)
            .field("active", &self.active)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::path::Path;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::mpsc::{self, Receiver, Sender};
    use std::sync::Mutex;
    use std::thread;
    use std::time::Duration;

    fn test_now() -> DateTime<Utc> {
        // Authoritative cycle: 2023061500, forecast hour 12
        Utc.with_ymd_and_hms(2023, 6, 15, 10, 0, 0).unwrap()
    }

    fn test_cycle() -> CycleDescriptor {
        cycle::current_cycle(test_now())
    }

    /// Fetcher whose outcome the test controls through a channel. Each call
    /// blocks until the test sends `Ok(())` (write the file) or `Err(())`.
    struct ControlledFetcher {
        calls: AtomicUsize,
        gate: Mutex<Receiver<Result<(), ()>>>,
    }

    impl ControlledFetcher {
        fn new() -> (Arc<Self>, Sender<Result<(), ()>>) {
            let (tx, rx) = mpsc::channel();
            (
                Arc::new(Self {
                    calls: AtomicUsize::new(0),
                    gate: Mutex::new(rx),
                }),
                tx,
            )
        }
    }

    impl Fetcher for ControlledFetcher {
        fn fetch(&self, url: &str, dest: &Path) -> Result<(), FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let outcome = self.gate.lock().unwrap().recv();
            match outcome {
                Ok(Ok(())) => {
                    fs::write(dest, b"grib data").map_err(|e| FetchError::Write {
                        path: dest.to_path_buf(),
                        source: e,
                    })
                }
                _ => Err(FetchError::Request {
                    url: url.to_string(),
                    reason: "forced failure".to_string(),
                }),
            }
        }
    }

    fn tick_until<F>(service: &mut WafsService, predicate: F)
    where
        F: Fn(&WafsService) -> bool,
    {
        for _ in 0..200 {
            service.tick(test_now(), 0.0);
            if predicate(service) {
                return;
            }
            thread::sleep(Duration::from_millis(5));
        }
        panic!("service never reached the expected state: {:?}", service);
    }

    #[test]
    fn test_first_tick_starts_a_fetch() {
        let dir = tempfile::tempdir().unwrap();
        let (fetcher, _gate) = ControlledFetcher::new();
        let mut service = WafsService::new(WafsConfig::new(dir.path().to_path_buf()), fetcher);

        assert_eq!(service.state(), FetchState::Idle);
        service.tick(test_now(), 1.0);
        assert_eq!(service.state(), FetchState::Downloading);
        assert!(dir.path().join("wafs").is_dir());
    }

    #[test]
    fn test_single_flight_invariant() {
        let dir = tempfile::tempdir().unwrap();
        let (fetcher, gate) = ControlledFetcher::new();
        let mut service =
            WafsService::new(WafsConfig::new(dir.path().to_path_buf()), Arc::clone(&fetcher) as Arc<dyn Fetcher>);

        for _ in 0..10 {
            service.tick(test_now(), 1.0);
            assert_eq!(service.state(), FetchState::Downloading);
        }
        // Give the worker thread time to enter fetch()
        thread::sleep(Duration::from_millis(50));
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);

        gate.send(Ok(())).unwrap();
        tick_until(&mut service, |s| s.state() != FetchState::Downloading);
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_successful_fetch_activates_dataset() {
        let dir = tempfile::tempdir().unwrap();
        let (fetcher, gate) = ControlledFetcher::new();
        let mut service = WafsService::new(WafsConfig::new(dir.path().to_path_buf()), fetcher);

        service.tick(test_now(), 1.0);
        gate.send(Ok(())).unwrap();
        tick_until(&mut service, |s| s.active().is_some());

        let active = service.active().unwrap();
        assert_eq!(active.datecycle, "2023061500");
        assert_eq!(active.cache_file, cache_rel_path(&test_cycle()));
        assert!(dir.path().join(&active.cache_file).exists());
        assert_eq!(service.state(), FetchState::Idle);

        // Dataset matches the desired cycle: no further fetch starts
        service.tick(test_now(), 1.0);
        assert_eq!(service.state(), FetchState::Idle);
    }

    #[test]
    fn test_failed_fetch_enters_cooldown() {
        let dir = tempfile::tempdir().unwrap();
        let (fetcher, gate) = ControlledFetcher::new();
        let mut service = WafsService::new(WafsConfig::new(dir.path().to_path_buf()), fetcher);

        service.tick(test_now(), 1.0);
        gate.send(Err(())).unwrap();
        tick_until(&mut service, |s| s.state() == FetchState::Cooldown);

        assert!(service.active().is_none());
        assert!(service.cooldown_remaining() > 0.0);
    }

    #[test]
    fn test_cooldown_blocks_retry_until_expired() {
        let dir = tempfile::tempdir().unwrap();
        let (fetcher, gate) = ControlledFetcher::new();
        let mut service =
            WafsService::new(WafsConfig::new(dir.path().to_path_buf()), Arc::clone(&fetcher) as Arc<dyn Fetcher>);

        service.tick(test_now(), 1.0);
        gate.send(Err(())).unwrap();
        tick_until(&mut service, |s| s.state() == FetchState::Cooldown);

        // 30 units in: still cooling down, no new fetch
        service.tick(test_now(), 30.0);
        assert_eq!(service.state(), FetchState::Cooldown);
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);

        // Past 60 units: cooldown expires and a retry starts on the same tick
        service.tick(test_now(), 31.0);
        assert_eq!(service.state(), FetchState::Downloading);

        // Unblock the retry so its thread exits
        gate.send(Err(())).unwrap();
    }

    #[test]
    fn test_downloads_disabled_stays_idle() {
        let dir = tempfile::tempdir().unwrap();
        let (fetcher, _gate) = ControlledFetcher::new();
        let config =
            WafsConfig::new(dir.path().to_path_buf()).with_download_enabled(false);
        let mut service = WafsService::new(config, Arc::clone(&fetcher) as Arc<dyn Fetcher>);

        for _ in 0..5 {
            service.tick(test_now(), 1.0);
        }
        assert_eq!(service.state(), FetchState::Idle);
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_persisted_reference_restored_when_file_exists() {
        let dir = tempfile::tempdir().unwrap();
        let rel_path = cache_rel_path(&test_cycle());
        fs::create_dir_all(dir.path().join("wafs")).unwrap();
        fs::write(dir.path().join(&rel_path), b"grib data").unwrap();

        let (fetcher, _gate) = ControlledFetcher::new();
        let config =
            WafsConfig::new(dir.path().to_path_buf()).with_last_cache_file(rel_path.clone());
        let mut service = WafsService::new(config, Arc::clone(&fetcher) as Arc<dyn Fetcher>);

        let active = service.active().unwrap();
        assert_eq!(active.datecycle, "2023061500");
        assert_eq!(service.active_cache_file(), Some(rel_path.as_str()));

        // Active dataset already matches the authoritative cycle
        service.tick(test_now(), 1.0);
        assert_eq!(service.state(), FetchState::Idle);
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_stale_persisted_reference_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let config = WafsConfig::new(dir.path().to_path_buf())
            .with_last_cache_file("wafs/2023061500_WAFS_blended_2023061500f12.grib2");
        let (fetcher, _gate) = ControlledFetcher::new();
        let service = WafsService::new(config, fetcher);

        assert!(service.active().is_none());
    }

    #[test]
    fn test_superseded_file_is_deleted() {
        let dir = tempfile::tempdir().unwrap();
        // Seed with an older cycle's file
        let old_rel = "wafs/2023061412_WAFS_blended_2023061412f12.grib2";
        fs::create_dir_all(dir.path().join("wafs")).unwrap();
        fs::write(dir.path().join(old_rel), b"old").unwrap();

        let (fetcher, gate) = ControlledFetcher::new();
        let config = WafsConfig::new(dir.path().to_path_buf()).with_last_cache_file(old_rel);
        let mut service = WafsService::new(config, fetcher);
        assert_eq!(service.active().unwrap().datecycle, "2023061412");

        // Old cycle differs from the authoritative one: fetch the new file
        service.tick(test_now(), 1.0);
        assert_eq!(service.state(), FetchState::Downloading);
        gate.send(Ok(())).unwrap();
        tick_until(&mut service, |s| s.state() == FetchState::Idle);

        assert_eq!(service.active().unwrap().datecycle, "2023061500");
        assert!(!dir.path().join(old_rel).exists());
        assert!(dir.path().join(&service.active().unwrap().cache_file).exists());
    }

    #[test]
    fn test_keep_old_files_preserves_superseded_file() {
        let dir = tempfile::tempdir().unwrap();
        let old_rel = "wafs/2023061412_WAFS_blended_2023061412f12.grib2";
        fs::create_dir_all(dir.path().join("wafs")).unwrap();
        fs::write(dir.path().join(old_rel), b"old").unwrap();

        let (fetcher, gate) = ControlledFetcher::new();
        let config = WafsConfig::new(dir.path().to_path_buf())
            .with_last_cache_file(old_rel)
            .with_keep_old_files(true);
        let mut service = WafsService::new(config, fetcher);

        service.tick(test_now(), 1.0);
        gate.send(Ok(())).unwrap();
        tick_until(&mut service, |s| s.state() == FetchState::Idle);

        assert!(dir.path().join(old_rel).exists());
    }

    #[test]
    fn test_url_and_cache_path_composition() {
        let cycle = CycleDescriptor {
            datecycle: "2023061500".to_string(),
            cycle_hour: 0,
            forecast_hour: 9,
        };

        assert_eq!(
            forecast_url("http://example.com/prod", &cycle),
            "http://example.com/prod/gfs.2023061500/WAFS_blended_2023061500f09.grib2"
        );
        assert_eq!(
            cache_rel_path(&cycle),
            "wafs/2023061500_WAFS_blended_2023061500f09.grib2"
        );
    }

    #[test]
    fn test_datecycle_from_cache_path() {
        assert_eq!(
            datecycle_from_cache_path("wafs/2023061500_WAFS_blended_2023061500f12.grib2"),
            Some("2023061500".to_string())
        );
        assert_eq!(datecycle_from_cache_path("wafs/garbage.grib2"), None);
        assert_eq!(datecycle_from_cache_path(""), None);
    }
}
