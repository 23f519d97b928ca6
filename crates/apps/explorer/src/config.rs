//! Environment-driven configuration.
//!
//! | Variable | Default |
//! |---|---|
//! | `HISTORY_API_URL` | `http://localhost:5000/api` |
//! | `HISTORY_BORDERS_URL` | `custom.geo.json` on the API host |
//! | `HISTORY_VIEWPORT_THRESHOLD_DEG` | `5.0` |
//! | `HISTORY_DEBOUNCE_MS` | `300` |
//! | `HISTORY_CACHE_ENTRIES` | `256` |
//! | `HISTORY_MIN_CAMERA_DISTANCE` | `1.5` |
//! | `HISTORY_REQUEST_TIMEOUT_MS` | `10000` |

use std::env;
use std::time::Duration;

use catalog::TimelineConfig;
use runtime::GateConfig;
use scene::{DEFAULT_MAX_DISTANCE, MarkerStyle};
use streaming::{CacheConfig, ClientConfig, DEFAULT_RADIUS_SCALE};

pub const DEFAULT_API_URL: &str = "http://localhost:5000/api";
pub const BORDERS_ASSET: &str = "custom.geo.json";

#[derive(Debug, Clone, PartialEq)]
pub struct ExplorerConfig {
    pub api_url: String,
    pub borders_url: String,
    pub viewport_threshold_deg: f64,
    pub debounce_ms: u64,
    pub cache_entries: usize,
    pub min_camera_distance: f64,
    pub request_timeout_ms: u64,
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

impl ExplorerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup; unparseable values fall back to defaults.
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Self {
        let api_url = get("HISTORY_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string());
        Self {
            borders_url: get("HISTORY_BORDERS_URL").unwrap_or_else(|| borders_url_for(&api_url)),
            api_url,
            viewport_threshold_deg: env_var_f64(&get, "HISTORY_VIEWPORT_THRESHOLD_DEG", 5.0),
            debounce_ms: env_var_u64(&get, "HISTORY_DEBOUNCE_MS", 300),
            cache_entries: env_var_usize(&get, "HISTORY_CACHE_ENTRIES", 256),
            min_camera_distance: env_var_f64(&get, "HISTORY_MIN_CAMERA_DISTANCE", 1.5),
            request_timeout_ms: env_var_u64(&get, "HISTORY_REQUEST_TIMEOUT_MS", 10_000),
        }
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            base_url: self.api_url.clone(),
            timeout: Duration::from_millis(self.request_timeout_ms),
            radius_scale: DEFAULT_RADIUS_SCALE,
        }
    }

    pub fn controller_config(&self) -> ControllerConfig {
        ControllerConfig {
            gate: GateConfig {
                threshold_deg: self.viewport_threshold_deg,
                debounce: Duration::from_millis(self.debounce_ms),
            },
            cache: CacheConfig {
                max_entries: self.cache_entries,
            },
            min_camera_distance: self.min_camera_distance,
            ..ControllerConfig::default()
        }
    }
}

/// Everything the interaction controller needs, with library defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct ControllerConfig {
    pub gate: GateConfig,
    pub cache: CacheConfig,
    pub marker: MarkerStyle,
    pub timeline: TimelineConfig,
    pub min_camera_distance: f64,
    pub max_camera_distance: f64,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            gate: GateConfig::default(),
            cache: CacheConfig::default(),
            marker: MarkerStyle::default(),
            timeline: TimelineConfig::default(),
            min_camera_distance: 1.5,
            max_camera_distance: DEFAULT_MAX_DISTANCE,
        }
    }
}

/// The border asset sits at the root of the host serving the API.
pub fn borders_url_for(api_url: &str) -> String {
    let root = api_url.trim_end_matches('/');
    let root = root.strip_suffix("/api").unwrap_or(root);
    format!("{root}/{BORDERS_ASSET}")
}

fn env_var_u64(get: &impl Fn(&str) -> Option<String>, key: &str, default: u64) -> u64 {
    get(key).and_then(|v| v.parse().ok()).unwrap_or(default)
}

fn env_var_usize(get: &impl Fn(&str) -> Option<String>, key: &str, default: usize) -> usize {
    get(key).and_then(|v| v.parse().ok()).unwrap_or(default)
}

fn env_var_f64(get: &impl Fn(&str) -> Option<String>, key: &str, default: f64) -> f64 {
    get(key)
        .and_then(|v| v.parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::{DEFAULT_API_URL, ExplorerConfig, borders_url_for};
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;
    use std::time::Duration;

    #[test]
    fn defaults_without_variables() {
        let c = ExplorerConfig::default();
        assert_eq!(c.api_url, DEFAULT_API_URL);
        assert_eq!(c.borders_url, "http://localhost:5000/custom.geo.json");
        assert_eq!(c.viewport_threshold_deg, 5.0);
        assert_eq!(c.debounce_ms, 300);
        assert_eq!(c.cache_entries, 256);
        assert_eq!(c.min_camera_distance, 1.5);
        assert_eq!(c.client_config().timeout, Duration::from_secs(10));
    }

    #[test]
    fn overrides_and_bad_values() {
        let vars: HashMap<&str, &str> = [
            ("HISTORY_API_URL", "http://history.test/api"),
            ("HISTORY_DEBOUNCE_MS", "50"),
            ("HISTORY_VIEWPORT_THRESHOLD_DEG", "not-a-number"),
            ("HISTORY_CACHE_ENTRIES", "8"),
        ]
        .into_iter()
        .collect();
        let c = ExplorerConfig::from_lookup(|k| vars.get(k).map(|v| v.to_string()));
        assert_eq!(c.api_url, "http://history.test/api");
        assert_eq!(c.viewport_threshold_deg, 5.0);

        let cc = c.controller_config();
        assert_eq!(cc.gate.debounce, Duration::from_millis(50));
        assert_eq!(cc.cache.max_entries, 8);
        assert_eq!(c.client_config().base_url, "http://history.test/api");
        assert_eq!(c.borders_url, "http://history.test/custom.geo.json");
    }

    #[test]
    fn borders_url_without_api_suffix() {
        assert_eq!(
            borders_url_for("https://maps.test/"),
            "https://maps.test/custom.geo.json"
        );
    }
}
