use std::env;
use std::path::{Path, PathBuf};

use dataset::{DisplayNames, YearRange};
use layers::{FitOptions, ViewportSize, ZoomLimits};
use serde::Deserialize;

pub const DEFAULT_RECORDS: &str = "data.csv";
pub const DEFAULT_TOPOLOGY: &str = "https://unpkg.com/world-atlas@2.0.2/countries-110m.json";

/// Where a startup payload comes from.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum Source {
    File(PathBuf),
    Url(String),
}

impl Source {
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.starts_with("http://") || raw.starts_with("https://") {
            Source::Url(raw.to_string())
        } else {
            Source::File(PathBuf::from(raw))
        }
    }
}

impl From<String> for Source {
    fn from(raw: String) -> Self {
        Source::parse(&raw)
    }
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Source::File(path) => write!(f, "{}", path.display()),
            Source::Url(url) => f.write_str(url),
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Json(serde_json::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "failed to read dashboard config: {e}"),
            ConfigError::Json(e) => write!(f, "invalid dashboard config: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            ConfigError::Json(e) => Some(e),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub records: Source,
    pub topology: Source,
    /// Slider extent, also the year range restored by a full reset.
    pub year_bounds: [i32; 2],
    pub map_height: f64,
    pub zoom_limits: [f64; 2],
    pub focus_scale: [f64; 2],
    pub fit_padding: f64,
    /// Factor applied by the zoom buttons.
    pub zoom_step: f64,
    pub wheel_step: f64,
    /// Horizontal and vertical pan distance in pixels.
    pub pan_step: [f64; 2],
    pub transform_ms: u64,
    pub reset_ms: u64,
    pub global_ms: u64,
    pub resize_debounce_ms: u64,
    pub top_n: usize,
    pub scatter_limit: usize,
    pub display_names: DisplayNames,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            records: Source::parse(DEFAULT_RECORDS),
            topology: Source::parse(DEFAULT_TOPOLOGY),
            year_bounds: [2018, 2024],
            map_height: 400.0,
            zoom_limits: [0.5, 16.0],
            focus_scale: [1.0, 8.0],
            fit_padding: 0.9,
            zoom_step: 1.5,
            wheel_step: 1.12,
            pan_step: [80.0, 60.0],
            transform_ms: 400,
            reset_ms: 600,
            global_ms: 750,
            resize_debounce_ms: 300,
            top_n: 5,
            scatter_limit: 2000,
            display_names: DisplayNames::builtin(),
        }
    }
}

impl DashboardConfig {
    /// Defaults, overridden by `DISASTER_*` environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            records: env::var("DISASTER_RECORDS")
                .map(|v| Source::parse(&v))
                .unwrap_or(defaults.records.clone()),
            topology: env::var("DISASTER_TOPOLOGY")
                .map(|v| Source::parse(&v))
                .unwrap_or(defaults.topology.clone()),
            map_height: env_var_f64("DISASTER_MAP_HEIGHT", defaults.map_height),
            resize_debounce_ms: env_var_u64(
                "DISASTER_RESIZE_DEBOUNCE_MS",
                defaults.resize_debounce_ms,
            ),
            top_n: env_var_usize("DISASTER_TOP_N", defaults.top_n),
            scatter_limit: env_var_usize("DISASTER_SCATTER_LIMIT", defaults.scatter_limit),
            ..defaults
        }
    }

    pub fn from_json_str(payload: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(payload).map_err(ConfigError::Json)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let payload = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
        Self::from_json_str(&payload)
    }

    pub fn year_range(&self) -> YearRange {
        YearRange::new(self.year_bounds[0], self.year_bounds[1])
    }

    pub fn zoom_limits(&self) -> ZoomLimits {
        let [a, b] = self.zoom_limits;
        ZoomLimits {
            min: a.min(b),
            max: a.max(b),
        }
    }

    pub fn fit_options(&self) -> FitOptions {
        let [a, b] = self.focus_scale;
        FitOptions {
            padding: self.fit_padding,
            min_scale: a.min(b),
            max_scale: a.max(b),
        }
    }

    pub fn map_size(&self, width: f64) -> ViewportSize {
        ViewportSize::new(width, self.map_height)
    }
}

fn env_var_u64(key: &str, default: u64) -> u64 {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_var_usize(key: &str, default: usize) -> usize {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_var_f64(key: &str, default: f64) -> f64 {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::{DashboardConfig, Source};
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;

    #[test]
    fn sources_distinguish_urls_from_paths() {
        assert_eq!(
            Source::parse("https://example.org/world.json"),
            Source::Url("https://example.org/world.json".to_string())
        );
        assert_eq!(Source::parse(" data.csv "), Source::File(PathBuf::from("data.csv")));
    }

    #[test]
    fn json_overrides_keep_other_defaults() {
        let cfg = DashboardConfig::from_json_str(
            r#"{"records":"fixtures/events.csv","top_n":3,"year_bounds":[2024,2019],
                "display_names":{"USA":"United States of America"}}"#,
        )
        .unwrap();
        assert_eq!(cfg.records, Source::File(PathBuf::from("fixtures/events.csv")));
        assert_eq!(cfg.top_n, 3);
        assert_eq!(cfg.year_range().lo(), 2019);
        assert_eq!(cfg.display_names.display_name("USA"), "United States of America");
        assert_eq!(cfg.scatter_limit, 2000);
        assert_eq!(cfg.zoom_limits().max, 16.0);
    }

    #[test]
    fn invalid_json_is_reported() {
        assert!(DashboardConfig::from_json_str("{").is_err());
        assert!(DashboardConfig::from_file("/definitely/not/here.json").is_err());
    }
}
