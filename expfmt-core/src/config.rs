use crate::error::ExpfmtError;
use figment::{Figment, providers::{Env, Format, Yaml}};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Route of the liveness endpoint, served next to the scrape endpoint.
pub const HEALTH_PATH: &str = "/health";

/// Top-level exporter configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExporterConfig {
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub metrics: SelfMetricsConfig,
    #[serde(default)]
    pub log: LogConfig,
}

/// Scrape endpoint settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_http_addr")]
    pub addr: String,
    #[serde(default = "default_metrics_path")]
    pub metrics_path: String,
}

/// Self-instrumentation of the exporter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelfMetricsConfig {
    /// When false, no counters are registered or updated.
    #[serde(default = "default_true")]
    pub enabled: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// `tracing_subscriber::EnvFilter` directive, used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub json: bool,
}

// ── Defaults ──────────────────────────────────────────────────

fn default_http_addr() -> String { "0.0.0.0:9464".into() }
fn default_metrics_path() -> String { "/metrics".into() }
fn default_true() -> bool { true }
fn default_log_level() -> String { "info".into() }

// ── Impls ─────────────────────────────────────────────────────

impl Default for ExporterConfig {
    fn default() -> Self {
        Self {
            http: HttpConfig::default(),
            metrics: SelfMetricsConfig::default(),
            log: LogConfig::default(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            addr: default_http_addr(),
            metrics_path: default_metrics_path(),
        }
    }
}

impl Default for SelfMetricsConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

impl HttpConfig {
    /// `metrics_path` as a router path. See [`metrics_route`].
    pub fn metrics_route(&self) -> Result<String, ExpfmtError> {
        metrics_route(&self.metrics_path)
    }
}

/// Normalizes a configured scrape path to a literal router path.
///
/// A missing leading `/` is added. Paths that would clash with the health
/// endpoint or be read as route captures (`{..}`, `*`, `:name`) are rejected.
pub fn metrics_route(path: &str) -> Result<String, ExpfmtError> {
    let route = format!("/{}", path.trim_start_matches('/'));
    let invalid = |reason| ExpfmtError::InvalidMetricsPath {
        path: path.to_string(),
        reason,
    };

    if route == HEALTH_PATH {
        return Err(invalid("reserved for the health check"));
    }
    if route.contains(['{', '}', '*']) {
        return Err(invalid("must not contain '{', '}' or '*'"));
    }
    if route.split('/').any(|segment| segment.starts_with(':')) {
        return Err(invalid("segments must not start with ':'"));
    }
    Ok(route)
}

impl ExporterConfig {
    /// Load configuration from YAML file + env overrides.
    ///
    /// Env vars use the `EXPFMT_` prefix and `__` between sections,
    /// e.g. `EXPFMT_HTTP__METRICS_PATH=/prom`.
    pub fn load(path: &Path) -> Result<Self, ExpfmtError> {
        let config: Self = Self::figment(path).extract()?;
        config.http.metrics_route()?;
        Ok(config)
    }

    fn figment(path: &Path) -> Figment {
        Figment::new()
            .merge(Yaml::file(path))
            .merge(Env::prefixed("EXPFMT_").split("__"))
    }
}
