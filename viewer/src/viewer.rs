use crate::bootstrap::fetch::fetch_fleet;
use crate::filesystem::config::read_config;
use crate::filesystem::error::FileSystemError;
use crate::socket::connect::DashboardChannel;
use crate::store::fleet::FleetStore;
use common::config::ViewerConfig;
use log::{error, info, warn, LevelFilter};
use simplelog::{Config, WriteLogger};
use std::fs::{create_dir_all, File};
use std::sync::Arc;
use std::time::Duration;
use tokio::signal::ctrl_c;
use tokio::sync::RwLock;
use tokio::time::interval;

/// Run one view session: bootstrap the fleet, attach the live feed, then
/// report a summary until interrupted
#[tokio::main]
pub(crate) async fn start(path: &str) {
    let config_result = read_config(path).await;
    let config = match config_result {
        Ok(result) => result,
        Err(err) => {
            eprintln!("[viewer] Could not read config at {path}. Cannot start without a config file: {err:?}");
            return;
        }
    };

    if let Ok((log_file, level)) = setup_logging(&config) {
        let _ = WriteLogger::init(level, Config::default(), log_file);
    }

    let store = Arc::new(RwLock::new(FleetStore::new()));

    // One-shot bootstrap. The feed resends a full snapshot on every
    // connect, so a failure here only delays the first complete view
    match fetch_fleet(&config).await {
        Ok(records) => {
            info!("[viewer] Bootstrapped fleet with {} agents", records.len());
            store.write().await.replace_all(records);
        }
        Err(err) => warn!("[viewer] Bootstrap fetch failed: {err}"),
    }

    let channel = DashboardChannel::connect(&config, store.clone());

    let mut summary = interval(Duration::from_secs(config.viewer.summary_interval.max(1)));
    loop {
        tokio::select! {
            _ = summary.tick() => {
                let fleet = store.read().await;
                info!(
                    "[viewer] Fleet status: {} agents, {} online",
                    fleet.len(),
                    fleet.online_count()
                );
            }
            signal = ctrl_c() => {
                if let Err(err) = signal {
                    error!("[viewer] Could not listen for shutdown signal: {err:?}");
                }
                break;
            }
        }
    }

    channel.disconnect().await;
    info!("[viewer] Dashboard feed disconnected");
}

/// Create the log output file and level from the viewer config
fn setup_logging(config: &ViewerConfig) -> Result<(File, LevelFilter), FileSystemError> {
    if let Err(err) = create_dir_all(&config.viewer.log_path) {
        eprintln!("[viewer] Could not create log directory: {err:?}");
        return Err(FileSystemError::CreateDirectory);
    }

    let file_result = File::create(format!("{}/viewer.log", config.viewer.log_path));
    let log_file = match file_result {
        Ok(result) => result,
        Err(err) => {
            eprintln!("[viewer] Could not create log file: {err:?}");
            return Err(FileSystemError::LogFile);
        }
    };

    let level = match config.viewer.log_level.as_str() {
        "error" => LevelFilter::Error,
        "info" => LevelFilter::Info,
        "debug" => LevelFilter::Debug,
        _ => LevelFilter::Warn,
    };

    Ok((log_file, level))
}
