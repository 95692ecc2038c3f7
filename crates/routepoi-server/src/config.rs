//! Server configuration from environment.

use routepoi_client::google::DEFAULT_GOOGLE_PLACES_URL;
use routepoi_client::overpass::DEFAULT_OVERPASS_URL;
use routepoi_core::SamplerConfig;
use std::env;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub server_port: u16,
    /// Route store base URL. Unset means an empty in-memory store.
    pub route_store_url: Option<String>,
    pub route_store_token: Option<String>,
    pub route_store_timeout_s: u64,
    pub google_api_key: Option<String>,
    pub google_places_url: String,
    pub google_timeout_s: u64,
    pub overpass_url: String,
    pub overpass_timeout_s: u64,
    pub sampler_min_points: usize,
    pub sampler_ratio: f64,
    pub sampler_min_samples: usize,
    pub session_ttl_s: u64,
    pub session_max: usize,
    /// Whether the mock provider is registered at all. Once registered it is
    /// always enabled.
    pub mock_provider_enabled: bool,
}

fn parsed<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}

fn non_empty(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

impl Default for Config {
    fn default() -> Self {
        let sampler = SamplerConfig::default();
        Self {
            server_port: 3000,
            route_store_url: None,
            route_store_token: None,
            route_store_timeout_s: 10,
            google_api_key: None,
            google_places_url: DEFAULT_GOOGLE_PLACES_URL.to_string(),
            google_timeout_s: 15,
            overpass_url: DEFAULT_OVERPASS_URL.to_string(),
            overpass_timeout_s: 30,
            sampler_min_points: sampler.min_points_for_sampling,
            sampler_ratio: sampler.sample_ratio,
            sampler_min_samples: sampler.min_samples,
            session_ttl_s: 3600,
            session_max: 256,
            mock_provider_enabled: true,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            server_port: parsed("ROUTEPOI_PORT", defaults.server_port),
            route_store_url: non_empty("ROUTE_STORE_URL"),
            route_store_token: non_empty("ROUTE_STORE_TOKEN"),
            route_store_timeout_s: parsed("ROUTE_STORE_TIMEOUT_S", defaults.route_store_timeout_s),
            google_api_key: non_empty("GOOGLE_PLACES_API_KEY"),
            google_places_url: non_empty("GOOGLE_PLACES_URL")
                .unwrap_or(defaults.google_places_url),
            google_timeout_s: parsed("GOOGLE_TIMEOUT_S", defaults.google_timeout_s),
            overpass_url: non_empty("OVERPASS_URL").unwrap_or(defaults.overpass_url),
            overpass_timeout_s: parsed("OVERPASS_TIMEOUT_S", defaults.overpass_timeout_s),
            sampler_min_points: parsed("SAMPLER_MIN_POINTS", defaults.sampler_min_points),
            sampler_ratio: parsed("SAMPLER_RATIO", defaults.sampler_ratio),
            sampler_min_samples: parsed("SAMPLER_MIN_SAMPLES", defaults.sampler_min_samples),
            session_ttl_s: parsed("SESSION_TTL_S", defaults.session_ttl_s),
            session_max: parsed("SESSION_MAX", defaults.session_max),
            mock_provider_enabled: parsed("MOCK_PROVIDER_ENABLED", defaults.mock_provider_enabled),
        }
    }

    /// Sampler thresholds; an invalid ratio falls back to the default.
    pub fn sampler(&self) -> SamplerConfig {
        let config = SamplerConfig {
            min_points_for_sampling: self.sampler_min_points,
            sample_ratio: self.sampler_ratio,
            min_samples: self.sampler_min_samples,
        };
        if config.validate().is_ok() {
            config
        } else {
            tracing::warn!(
                "Ignoring invalid SAMPLER_RATIO {}, using default",
                self.sampler_ratio
            );
            SamplerConfig::default()
        }
    }

    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl_s.max(1))
    }

    pub fn google_api_key_configured(&self) -> bool {
        self.google_api_key.is_some()
    }
}
