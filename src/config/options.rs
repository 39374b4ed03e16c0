// src/config/options.rs
use std::path::PathBuf;
use std::time::Duration;

use crate::signal::SignalKind;
use super::consts::*;

/// Network mechanics shared by every fetcher. All knobs surface on the CLI;
/// nothing in the fetch path reads a hidden literal.
#[derive(Clone, Debug)]
pub struct FetchPolicy {
    pub timeout: Duration,
    /// Transient failures are retried this many times (default: once).
    pub retries: u32,
    pub backoff: Duration,
    pub listings_pause: Duration,
    pub geo_pause: Duration,
    pub user_agent: String,
    pub nominatim_url: String,
    pub overpass_url: String,
}

impl Default for FetchPolicy {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(REQUEST_TIMEOUT_MS),
            retries: RETRIES,
            backoff: Duration::from_millis(RETRY_BACKOFF_MS),
            listings_pause: Duration::from_millis(LISTINGS_PAUSE_MS),
            geo_pause: Duration::from_millis(GEO_PAUSE_MS),
            user_agent: USER_AGENT.to_string(),
            nominatim_url: NOMINATIM_URL.to_string(),
            overpass_url: OVERPASS_URL.to_string(),
        }
    }
}

impl FetchPolicy {
    /// Inter-district pause owed to the signal's remote source.
    pub fn pause_for(&self, kind: SignalKind) -> Duration {
        match kind {
            SignalKind::Transport => Duration::ZERO, // local file or RNG
            SignalKind::Rent => self.listings_pause,
            SignalKind::Jobs | SignalKind::Poi => self.geo_pause,
        }
    }
}

#[derive(Clone, Debug)]
pub struct RunOptions {
    /// Raw signal tables live here, one CSV per signal.
    pub cache_dir: PathBuf,
    /// Cleaned and ranked artifacts are written here.
    pub out_dir: PathBuf,
    /// Forbid network access; whatever the cache has is all there is.
    pub offline: bool,
    /// Ignore existing raw tables and re-acquire everything.
    pub refresh: bool,
    /// Fixed RNG seed for synthetic transport scores.
    pub seed: Option<u64>,
    pub policy: FetchPolicy,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            cache_dir: PathBuf::from(DEFAULT_CACHE_DIR),
            out_dir: PathBuf::from(DEFAULT_OUT_DIR),
            offline: false,
            refresh: false,
            seed: None,
            policy: FetchPolicy::default(),
        }
    }
}

impl RunOptions {
    /// Same options pinned to the cache: no network, no refresh. Stages
    /// that rework already-acquired data run under these.
    pub fn cache_only(&self) -> Self {
        Self { offline: true, refresh: false, ..self.clone() }
    }

    pub fn cleaned_path(&self) -> PathBuf {
        self.out_dir.join(CLEANED_FILE)
    }

    pub fn rankings_path(&self) -> PathBuf {
        self.out_dir.join(RANKINGS_FILE)
    }
}
