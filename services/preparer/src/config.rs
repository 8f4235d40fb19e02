use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub raw_dir: PathBuf,
    pub processed_dir: PathBuf,
    pub data_dir: PathBuf,

    pub fetch_timeout: Option<Duration>,
    pub fetch_retries: u32,
    pub fetch_backoff: Duration,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(get: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let dir = |key: &str, default: &str| {
            PathBuf::from(get(key).unwrap_or_else(|| default.to_string()))
        };
        let raw_dir = dir("EEG_RAW_DIR", "data/raw");
        let processed_dir = dir("EEG_PROCESSED_DIR", "data/processed");
        let data_dir = dir("EEG_DATA_DIR", "data");

        let fetch_timeout = parse::<u64>(&get, "EEG_FETCH_TIMEOUT_SECS")?;
        let fetch_retries = parse::<u32>(&get, "EEG_FETCH_RETRIES")?.unwrap_or(3);
        let fetch_backoff_ms = parse::<u64>(&get, "EEG_FETCH_BACKOFF_MS")?.unwrap_or(500);

        if fetch_timeout == Some(0) {
            bail!("EEG_FETCH_TIMEOUT_SECS must be greater than zero");
        }
        if fetch_retries == 0 {
            bail!("EEG_FETCH_RETRIES must be at least 1");
        }

        Ok(Self {
            raw_dir,
            processed_dir,
            data_dir,
            fetch_timeout: fetch_timeout.map(Duration::from_secs),
            fetch_retries,
            fetch_backoff: Duration::from_millis(fetch_backoff_ms),
        })
    }
}

fn parse<T>(get: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    get(key)
        .map(|v| {
            v.trim()
                .parse::<T>()
                .with_context(|| format!("Invalid value for {key}: {v:?}"))
        })
        .transpose()
}
