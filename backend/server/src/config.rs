use std::{env, fmt::Display, path::PathBuf, str::FromStr};

use tracing::{info, warn};

use crate::error::ConfigError;

pub struct Config {
    pub port: u16,
    pub raffles_file: PathBuf,
    pub buyers_file: PathBuf,
    pub upload_dir: PathBuf,
    pub static_dir: PathBuf,
    pub max_upload_bytes: usize,
    pub browser_path: Option<PathBuf>,
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        Ok(Self {
            port: try_load("RUST_PORT", "5000")?,
            raffles_file: try_load("RAFFLES_FILE", "raffle_data.json")?,
            buyers_file: try_load("BUYERS_FILE", "buyers.json")?,
            upload_dir: try_load("UPLOAD_DIR", "uploads")?,
            static_dir: try_load("STATIC_DIR", "public")?,
            max_upload_bytes: try_load("MAX_UPLOAD_BYTES", "16777216")?,
            browser_path: var("BROWSER_PATH").map(PathBuf::from),
        })
    }
}

fn var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn try_load<T: FromStr>(key: &'static str, default: &str) -> Result<T, ConfigError>
where
    T::Err: Display,
{
    var(key)
        .unwrap_or_else(|| {
            info!("{key} not set, using default: {default}");
            default.to_string()
        })
        .parse::<T>()
        .map_err(|e| {
            warn!("Invalid {key} value: {e}");

            ConfigError::Invalid {
                key,
                reason: e.to_string(),
            }
        })
}
