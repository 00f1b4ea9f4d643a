//! Watch command - run the download coordinator until interrupted.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use chrono::Utc;
use clap::Args;

use xweatherlayer::wafs::{FetchState, WafsConfig, WafsService};

use crate::error::CliError;

/// Arguments for the watch command.
#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Cache directory for forecast files (defaults to the user cache dir).
    #[arg(long)]
    pub cache_dir: Option<PathBuf>,

    /// Seconds between coordinator ticks.
    #[arg(long, default_value_t = 10.0)]
    pub interval: f64,

    /// Base URL of the forecast file tree.
    #[arg(long)]
    pub base_url: Option<String>,

    /// Observe cycle changes without downloading anything.
    #[arg(long)]
    pub no_download: bool,

    /// Keep superseded forecast files instead of deleting them.
    #[arg(long)]
    pub keep_old: bool,
}

/// Run the watch command.
pub fn run(args: WatchArgs) -> Result<(), CliError> {
    if !args.interval.is_finite() || args.interval <= 0.0 {
        return Err(CliError::InvalidArgument(
            "interval must be positive".to_string(),
        ));
    }

    let mut config = WafsConfig::default()
        .with_download_enabled(!args.no_download)
        .with_keep_old_files(args.keep_old);
    if let Some(cache_dir) = args.cache_dir {
        config.cache_root = cache_dir;
    }
    if let Some(base_url) = args.base_url {
        config = config.with_base_url(base_url);
    }

    println!("cache: {}", config.cache_root.display());
    tracing::info!(interval = args.interval, "starting coordinator loop");
    let mut service = WafsService::with_http_fetcher(config);

    let running = Arc::new(AtomicBool::new(true));
    {
        let running = Arc::clone(&running);
        ctrlc::set_handler(move || running.store(false, Ordering::SeqCst))
            .map_err(|e| CliError::Setup(format!("cannot install signal handler: {}", e)))?;
    }

    let mut last_state = service.state();
    let mut last_file = service.active_cache_file().map(str::to_string);
    report(&service);

    while running.load(Ordering::SeqCst) {
        service.tick(Utc::now(), args.interval);

        let state = service.state();
        let file = service.active_cache_file().map(str::to_string);
        if state != last_state || file != last_file {
            report(&service);
            last_state = state;
            last_file = file;
        }

        thread::sleep(Duration::from_secs_f64(args.interval));
    }

    println!("stopped");
    Ok(())
}

fn report(service: &WafsService) {
    let state = match service.state() {
        FetchState::Idle => "idle",
        FetchState::Downloading => "downloading",
        FetchState::Cooldown => "cooldown",
    };
    match service.active() {
        Some(active) => println!(
            "state: {:<11}  active cycle: {}  file: {}",
            state, active.datecycle, active.cache_file
        ),
        None => println!("state: {:<11}  no forecast yet", state),
    }
}
