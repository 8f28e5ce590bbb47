use super::error::FileSystemError;
use common::config::ViewerConfig;
use log::error;
use std::str::from_utf8;
use tokio::fs::read;

/// Read the viewer TOML config file
pub(crate) async fn read_config(path: &str) -> Result<ViewerConfig, FileSystemError> {
    let buffer_result = read(path).await;
    let buffer = match buffer_result {
        Ok(result) => result,
        Err(err) => {
            error!("[viewer] Could not read config file at {path}: {err:?}");
            return Err(FileSystemError::ReadFile);
        }
    };

    let config_result = toml::from_str(from_utf8(&buffer).unwrap_or_default());
    let config = match config_result {
        Ok(result) => result,
        Err(err) => {
            error!("[viewer] Failed to parse viewer config at {path}: {err:?}");
            return Err(FileSystemError::BadToml);
        }
    };

    Ok(config)
}
