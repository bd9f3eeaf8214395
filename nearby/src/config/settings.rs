//! Service settings read from the environment.

use std::env;
use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;
use tracing::warn;

use nearby_repository::CacheSource;

use crate::NearbyError;

/// Default Redis URL.
const DEFAULT_REDIS_URL: &str = "redis://127.0.0.1:6379";

/// Default search radius in meters.
const DEFAULT_SEARCH_RADIUS_M: f64 = 5_000.0;

/// Default search result TTL in seconds.
const DEFAULT_SEARCH_CACHE_TTL_SECS: u64 = 60;

/// Default trending aggregate TTL in seconds.
const DEFAULT_TRENDING_CACHE_TTL_SECS: u64 = 300;

/// Default reservation lifetime in seconds (2 days).
const DEFAULT_RESERVE_EXPIRY_SECS: u64 = 2 * 24 * 60 * 60;

/// Longest accepted reservation lifetime in seconds (one year).
const MAX_RESERVE_EXPIRY_SECS: u64 = 365 * 24 * 60 * 60;

/// Default budget for a single cache round-trip, in milliseconds.
const DEFAULT_CACHE_TIMEOUT_MS: u64 = 250;

/// Default budget for the spatial and text queries of a search, in milliseconds.
const DEFAULT_SEARCH_TIMEOUT_MS: u64 = 5_000;

/// Default radius for store detail alternatives in meters.
const DEFAULT_ALTERNATIVES_RADIUS_M: f64 = 5_000.0;

/// Default maximum number of alternative stores.
const DEFAULT_ALTERNATIVES_LIMIT: usize = 5;

/// Default buffer size of the evaluation queue.
const DEFAULT_EVALUATION_QUEUE_SIZE: usize = 1024;

/// Default currency symbol used in notification texts.
const DEFAULT_CURRENCY_SYMBOL: &str = "₹";

/// Which cache backend to connect when the cache is enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheBackendKind {
    Redis,
    Memory,
}

/// How product changes reach the intent evaluator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvaluationMode {
    /// Evaluate within the mutation call.
    Inline,
    /// Publish a change event consumed by the evaluation worker.
    Queued,
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

/// All runtime settings of the service.
#[derive(Debug, Clone)]
pub struct Settings {
    pub use_cache: bool,
    pub cache_backend: CacheBackendKind,
    pub redis_url: String,
    pub cache_timeout: Duration,
    pub default_search_radius_m: f64,
    pub search_cache_ttl: Duration,
    pub trending_cache_ttl: Duration,
    pub reserve_expiry: Duration,
    pub search_timeout: Duration,
    pub alternatives_radius_m: f64,
    pub alternatives_limit: usize,
    pub evaluation_mode: EvaluationMode,
    pub evaluation_queue_size: usize,
    pub currency_symbol: String,
    pub log_format: LogFormat,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            use_cache: false,
            cache_backend: CacheBackendKind::Redis,
            redis_url: DEFAULT_REDIS_URL.to_string(),
            cache_timeout: Duration::from_millis(DEFAULT_CACHE_TIMEOUT_MS),
            default_search_radius_m: DEFAULT_SEARCH_RADIUS_M,
            search_cache_ttl: Duration::from_secs(DEFAULT_SEARCH_CACHE_TTL_SECS),
            trending_cache_ttl: Duration::from_secs(DEFAULT_TRENDING_CACHE_TTL_SECS),
            reserve_expiry: Duration::from_secs(DEFAULT_RESERVE_EXPIRY_SECS),
            search_timeout: Duration::from_millis(DEFAULT_SEARCH_TIMEOUT_MS),
            alternatives_radius_m: DEFAULT_ALTERNATIVES_RADIUS_M,
            alternatives_limit: DEFAULT_ALTERNATIVES_LIMIT,
            evaluation_mode: EvaluationMode::Queued,
            evaluation_queue_size: DEFAULT_EVALUATION_QUEUE_SIZE,
            currency_symbol: DEFAULT_CURRENCY_SYMBOL.to_string(),
            log_format: LogFormat::Pretty,
        }
    }
}

impl Settings {
    /// Read settings from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `USE_CACHE`: Enable the result cache (default: false)
    /// - `CACHE_BACKEND`: "redis" or "memory" (default: redis)
    /// - `REDIS_URL`: Redis URL (default: redis://127.0.0.1:6379)
    /// - `CACHE_TIMEOUT_MS`: Budget for one cache round-trip (default: 250)
    /// - `DEFAULT_SEARCH_RADIUS_M`: Radius when a search omits it (default: 5000)
    /// - `SEARCH_CACHE_TTL_SECS`: Search result TTL (default: 60)
    /// - `TRENDING_CACHE_TTL_SECS`: Trending aggregate TTL (default: 300)
    /// - `RESERVE_EXPIRY_SECS`: Reservation lifetime, at most one year (default: 172800)
    /// - `SEARCH_TIMEOUT_MS`: Budget for the search queries (default: 5000)
    /// - `ALTERNATIVES_RADIUS_M`: Radius for store detail alternatives (default: 5000)
    /// - `ALTERNATIVES_LIMIT`: Maximum alternative stores (default: 5)
    /// - `EVALUATION_MODE`: "queued" or "inline" (default: queued)
    /// - `EVALUATION_QUEUE_SIZE`: Evaluation queue buffer (default: 1024)
    /// - `CURRENCY_SYMBOL`: Symbol used in price notifications (default: ₹)
    /// - `LOG_FORMAT`: "pretty" or "json" (default: pretty)
    ///
    /// Malformed numeric values fall back to their default with a warning.
    ///
    /// # Returns
    ///
    /// * `Ok(Settings)` - The parsed settings
    /// * `Err(NearbyError)` - If an enumerated setting has an unknown value
    pub fn from_env() -> Result<Self, NearbyError> {
        let defaults = Self::default();

        let cache_backend = match env_string("CACHE_BACKEND").as_deref() {
            None | Some("redis") => CacheBackendKind::Redis,
            Some("memory") => CacheBackendKind::Memory,
            Some(other) => {
                return Err(NearbyError::config(format!(
                    "Invalid CACHE_BACKEND '{}', expected 'redis' or 'memory'",
                    other
                )))
            }
        };

        let evaluation_mode = match env_string("EVALUATION_MODE").as_deref() {
            None | Some("queued") => EvaluationMode::Queued,
            Some("inline") => EvaluationMode::Inline,
            Some(other) => {
                return Err(NearbyError::config(format!(
                    "Invalid EVALUATION_MODE '{}', expected 'queued' or 'inline'",
                    other
                )))
            }
        };

        let log_format = match env_string("LOG_FORMAT").as_deref() {
            Some("json") => LogFormat::Json,
            None | Some("pretty") => LogFormat::Pretty,
            Some(other) => {
                warn!(value = %other, "Invalid LOG_FORMAT, defaulting to 'pretty'");
                LogFormat::Pretty
            }
        };

        Ok(Self {
            use_cache: env_parse("USE_CACHE", defaults.use_cache),
            cache_backend,
            redis_url: env::var("REDIS_URL").unwrap_or(defaults.redis_url),
            cache_timeout: Duration::from_millis(
                env_parse("CACHE_TIMEOUT_MS", DEFAULT_CACHE_TIMEOUT_MS).max(1),
            ),
            default_search_radius_m: env_parse(
                "DEFAULT_SEARCH_RADIUS_M",
                defaults.default_search_radius_m,
            ),
            search_cache_ttl: Duration::from_secs(env_parse(
                "SEARCH_CACHE_TTL_SECS",
                DEFAULT_SEARCH_CACHE_TTL_SECS,
            )),
            trending_cache_ttl: Duration::from_secs(env_parse(
                "TRENDING_CACHE_TTL_SECS",
                DEFAULT_TRENDING_CACHE_TTL_SECS,
            )),
            reserve_expiry: reserve_expiry(env_parse(
                "RESERVE_EXPIRY_SECS",
                DEFAULT_RESERVE_EXPIRY_SECS,
            )),
            search_timeout: Duration::from_millis(env_parse(
                "SEARCH_TIMEOUT_MS",
                DEFAULT_SEARCH_TIMEOUT_MS,
            )),
            alternatives_radius_m: env_parse("ALTERNATIVES_RADIUS_M", defaults.alternatives_radius_m),
            alternatives_limit: env_parse("ALTERNATIVES_LIMIT", defaults.alternatives_limit),
            evaluation_mode,
            evaluation_queue_size: env_parse("EVALUATION_QUEUE_SIZE", defaults.evaluation_queue_size)
                .max(1),
            currency_symbol: env::var("CURRENCY_SYMBOL").unwrap_or(defaults.currency_symbol),
            log_format,
        })
    }

    /// The cache backend selected by these settings.
    pub fn cache_source(&self) -> CacheSource {
        if !self.use_cache {
            return CacheSource::disabled();
        }
        match self.cache_backend {
            CacheBackendKind::Redis => CacheSource::redis(self.redis_url.clone()),
            CacheBackendKind::Memory => CacheSource::memory(),
        }
    }
}

/// Reservation lifetime from a number of seconds, capped at one year.
fn reserve_expiry(secs: u64) -> Duration {
    if secs > MAX_RESERVE_EXPIRY_SECS {
        warn!(
            value = secs,
            max = MAX_RESERVE_EXPIRY_SECS,
            "RESERVE_EXPIRY_SECS too large, capping"
        );
    }
    Duration::from_secs(secs.min(MAX_RESERVE_EXPIRY_SECS))
}

fn env_string(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_lowercase())
        .filter(|value| !value.is_empty())
}

/// Parse an environment variable, falling back to `default` when unset or malformed.
fn env_parse<T>(name: &str, default: T) -> T
where
    T: FromStr + Display,
    T::Err: Display,
{
    match env::var(name) {
        Ok(raw) => match raw.trim().parse::<T>() {
            Ok(value) => value,
            Err(e) => {
                warn!(
                    variable = name,
                    value = %raw,
                    error = %e,
                    default = %default,
                    "Invalid value, using default"
                );
                default
            }
        },
        Err(_) => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert!(!settings.use_cache);
        assert_eq!(settings.default_search_radius_m, 5_000.0);
        assert_eq!(settings.search_cache_ttl, Duration::from_secs(60));
        assert_eq!(settings.trending_cache_ttl, Duration::from_secs(300));
        assert_eq!(settings.reserve_expiry, Duration::from_secs(172_800));
        assert_eq!(settings.alternatives_limit, 5);
        assert_eq!(settings.evaluation_mode, EvaluationMode::Queued);
        assert_eq!(settings.cache_timeout, Duration::from_millis(250));
    }

    #[test]
    fn test_reserve_expiry_is_capped() {
        assert_eq!(reserve_expiry(172_800), Duration::from_secs(172_800));
        assert_eq!(reserve_expiry(0), Duration::ZERO);
        assert_eq!(
            reserve_expiry(9_000_000_000_000),
            Duration::from_secs(MAX_RESERVE_EXPIRY_SECS)
        );
        assert_eq!(
            reserve_expiry(u64::MAX),
            Duration::from_secs(365 * 24 * 60 * 60)
        );
    }

    #[test]
    fn test_cache_source_selection() {
        let mut settings = Settings::default();
        assert_eq!(settings.cache_source(), CacheSource::Disabled);

        settings.use_cache = true;
        assert_eq!(
            settings.cache_source(),
            CacheSource::redis("redis://127.0.0.1:6379")
        );

        settings.cache_backend = CacheBackendKind::Memory;
        assert_eq!(settings.cache_source(), CacheSource::Memory);
    }

    #[test]
    fn test_env_parse_falls_back_on_garbage() {
        env::set_var("NEARBY_TEST_ENV_PARSE", "not-a-number");
        assert_eq!(env_parse("NEARBY_TEST_ENV_PARSE", 7u64), 7);

        env::set_var("NEARBY_TEST_ENV_PARSE", " 42 ");
        assert_eq!(env_parse("NEARBY_TEST_ENV_PARSE", 7u64), 42);

        env::remove_var("NEARBY_TEST_ENV_PARSE");
        assert_eq!(env_parse("NEARBY_TEST_ENV_PARSE", 7u64), 7);
    }
}
