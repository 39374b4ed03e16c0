// src/config/consts.rs

// Remote endpoints
pub const NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org/search";
pub const OVERPASS_URL: &str = "https://overpass-api.de/api/interpreter";

/// Sent on every request. The OSM services reject anonymous default agents.
pub const USER_AGENT: &str = "tash_rank/0.4 (district livability survey)";

// Local artifacts
pub const DEFAULT_CACHE_DIR: &str = "data/raw";
pub const DEFAULT_OUT_DIR: &str = "data/processed";
pub const CLEANED_FILE: &str = "cleaned_district_data.csv";
pub const RANKINGS_FILE: &str = "final_rankings.csv";

// Network policy
pub const REQUEST_TIMEOUT_MS: u64 = 10_000;
pub const RETRIES: u32 = 1; // one bounded retry, then the fetcher falls back
pub const RETRY_BACKOFF_MS: u64 = 1_500;

// Inter-request pauses, per remote source. Correctness, not tuning:
// both the listings site and the OSM services throttle pushy clients.
pub const LISTINGS_PAUSE_MS: u64 = 2_000;
pub const GEO_PAUSE_MS: u64 = 1_000;

// Price extraction
pub const UZS_PER_USD: f64 = 12_800.0;
pub const PRICE_BAND_MIN: f64 = 100.0;
pub const PRICE_BAND_MAX: f64 = 5_000.0;

// Synthetic transport scores when no transit-count table is supplied
pub const MOCK_TRANSPORT_MIN: u32 = 2;
pub const MOCK_TRANSPORT_MAX: u32 = 10;
