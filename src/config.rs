use std::env;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

use crate::standings::ScoringWeights;

const DATA_DIR: &str = "prediction_pool";
const DB_FILE: &str = "pool.sqlite";
const DEFAULT_CACHE_TTL_SECS: u64 = 300;
const MAX_CACHE_TTL_SECS: u64 = 3600;
const DEFAULT_LOG_FILTER: &str = "info";

#[derive(Debug, Clone)]
pub struct PoolConfig {
    pub db_path: PathBuf,
    pub cache_ttl: Duration,
    pub log_filter: String,
    pub weights: ScoringWeights,
}

impl PoolConfig {
    /// Read settings from the environment. `.env.local` and `.env` are loaded first
    /// when present; variables already set win.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::from_filename(".env.local");
        let _ = dotenvy::from_filename(".env");

        let db_path = env::var("POOL_DB_PATH")
            .ok()
            .filter(|raw| !raw.trim().is_empty())
            .map(PathBuf::from)
            .or_else(default_db_path)
            .context("unable to resolve sqlite path; set POOL_DB_PATH")?;
        let cache_ttl_secs = env::var("POOL_CACHE_TTL_SECS")
            .ok()
            .and_then(|val| val.trim().parse::<u64>().ok())
            .unwrap_or(DEFAULT_CACHE_TTL_SECS)
            .min(MAX_CACHE_TTL_SECS);
        let log_filter = env::var("POOL_LOG")
            .ok()
            .filter(|raw| !raw.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());

        Ok(Self {
            db_path,
            cache_ttl: Duration::from_secs(cache_ttl_secs),
            log_filter,
            weights: ScoringWeights::default(),
        })
    }
}

pub fn default_db_path() -> Option<PathBuf> {
    if let Ok(base) = env::var("XDG_DATA_HOME")
        && !base.trim().is_empty()
    {
        return Some(PathBuf::from(base).join(DATA_DIR).join(DB_FILE));
    }
    let home = env::var("HOME").ok()?;
    if home.trim().is_empty() {
        return None;
    }
    Some(
        PathBuf::from(home)
            .join(".local")
            .join("share")
            .join(DATA_DIR)
            .join(DB_FILE),
    )
}

/// Install the global tracing subscriber. Safe to call more than once.
pub fn init_logging(filter: &str) {
    let filter = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
