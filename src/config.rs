//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use crate::aggregate::JoinAliases;
use crate::render::RenderConfig;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub dashboard: DashboardConfig,

    #[serde(default)]
    pub join: JoinConfig,

    #[serde(default)]
    pub render: RenderConfig,

    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Input files and how to read them
#[derive(Debug, Clone, Deserialize)]
pub struct DataConfig {
    /// Per-country-per-day case table
    #[serde(default = "default_cases_path")]
    pub cases_path: PathBuf,

    /// TopoJSON world map
    #[serde(default = "default_world_path")]
    pub world_path: PathBuf,

    /// Topology object holding the countries
    #[serde(default = "default_geo_object")]
    pub geo_object: String,

    /// Feature property carrying the country name
    #[serde(default = "default_name_property")]
    pub name_property: String,

    #[serde(default = "default_location_column")]
    pub location_column: String,

    #[serde(default = "default_date_column")]
    pub date_column: String,

    #[serde(default = "default_date_format")]
    pub date_format: String,

    /// Metric columns to keep; empty keeps every column
    #[serde(default)]
    pub metrics: Vec<String>,

    /// Locations dropped at load time (e.g. "World", continents)
    #[serde(default)]
    pub exclude_locations: Vec<String>,
}

fn default_cases_path() -> PathBuf {
    PathBuf::from("data/owid-covid-data.csv")
}

fn default_world_path() -> PathBuf {
    PathBuf::from("data/countries-110m.json")
}

fn default_geo_object() -> String {
    "countries".to_string()
}

fn default_name_property() -> String {
    "name".to_string()
}

fn default_location_column() -> String {
    "location".to_string()
}

fn default_date_column() -> String {
    "date".to_string()
}

fn default_date_format() -> String {
    "%Y-%m-%d".to_string()
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            cases_path: default_cases_path(),
            world_path: default_world_path(),
            geo_object: default_geo_object(),
            name_property: default_name_property(),
            location_column: default_location_column(),
            date_column: default_date_column(),
            date_format: default_date_format(),
            metrics: Vec::new(),
            exclude_locations: Vec::new(),
        }
    }
}

/// What the dashboard shows before any selection is made
#[derive(Debug, Clone, Deserialize)]
pub struct DashboardConfig {
    #[serde(default = "default_title")]
    pub title: String,

    /// Metric summarized for the map and the ranking
    #[serde(default = "default_summary_metric")]
    pub summary_metric: String,

    #[serde(default = "default_top_n")]
    pub top_n: usize,

    #[serde(default = "default_countries")]
    pub default_countries: Vec<String>,

    /// Initial metric of the line chart
    #[serde(default = "default_summary_metric")]
    pub default_metric: String,
}

fn default_title() -> String {
    "COVID-19 Dashboard".to_string()
}

fn default_summary_metric() -> String {
    "total_cases".to_string()
}

fn default_top_n() -> usize {
    10
}

fn default_countries() -> Vec<String> {
    vec![
        "United States".to_string(),
        "India".to_string(),
        "Brazil".to_string(),
    ]
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            summary_metric: default_summary_metric(),
            top_n: default_top_n(),
            default_countries: default_countries(),
            default_metric: default_summary_metric(),
        }
    }
}

/// Feature name → case table location mapping
#[derive(Debug, Clone, Deserialize)]
pub struct JoinConfig {
    /// Start from the built-in world atlas aliases
    #[serde(default = "default_true")]
    pub world_atlas_aliases: bool,

    /// Extra aliases, feature name = location
    #[serde(default)]
    pub aliases: HashMap<String, String>,
}

fn default_true() -> bool {
    true
}

impl Default for JoinConfig {
    fn default() -> Self {
        Self {
            world_atlas_aliases: true,
            aliases: HashMap::new(),
        }
    }
}

impl JoinConfig {
    pub fn join_aliases(&self) -> JoinAliases {
        if self.world_atlas_aliases {
            return JoinAliases::with_overrides(&self.aliases);
        }
        let mut aliases = JoinAliases::empty();
        for (feature_name, location) in &self.aliases {
            aliases.insert(feature_name, location);
        }
        aliases
    }
}

/// API server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Allowed CORS origins; empty allows any origin
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8086
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: Vec::new(),
        }
    }
}

impl ApiConfig {
    /// Get the socket address string
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,

    pub file: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            file: None,
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Self::parse(&content).map_err(|e| match e {
            ConfigError::Parse { error, .. } => ConfigError::Parse {
                path: path.to_path_buf(),
                error,
            },
            other => other,
        })
    }

    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse {
            path: PathBuf::new(),
            error: e.to_string(),
        })
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let config_paths: Vec<PathBuf> = [
            dirs::config_dir().map(|p| p.join("covid-atlas").join("config.toml")),
            Some(PathBuf::from("/etc/covid-atlas/config.toml")),
            Some(PathBuf::from("./config.toml")),
        ]
        .into_iter()
        .flatten()
        .collect();

        Self::load_first(&config_paths)
    }

    /// Load the first existing file among `paths`
    ///
    /// A file that exists but fails to load is reported as a warning and
    /// skipped; with nothing loadable the defaults plus environment are used.
    pub fn load_first(paths: &[PathBuf]) -> Self {
        for path in paths {
            if path.exists() {
                match Self::load_with_env(path) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path, e);
                    }
                }
            }
        }

        tracing::info!("Using default config with environment overrides");
        Self::from_env()
    }

    /// Apply environment variable overrides to an existing config
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        // Data overrides
        if let Some(path) = var("COVID_ATLAS_CASES_PATH") {
            self.data.cases_path = PathBuf::from(path);
        }
        if let Some(path) = var("COVID_ATLAS_WORLD_PATH") {
            self.data.world_path = PathBuf::from(path);
        }

        // API overrides
        if let Some(host) = var("COVID_ATLAS_API_HOST") {
            self.api.host = host;
        }
        if let Some(port) = var("COVID_ATLAS_API_PORT") {
            match port.parse() {
                Ok(p) => self.api.port = p,
                Err(_) => tracing::warn!("Ignoring invalid COVID_ATLAS_API_PORT {:?}", port),
            }
        }

        // Logging overrides
        if let Some(level) = var("COVID_ATLAS_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = var("COVID_ATLAS_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r##"# covid-atlas configuration
#
# Environment variables override these settings:
# - COVID_ATLAS_CASES_PATH
# - COVID_ATLAS_WORLD_PATH
# - COVID_ATLAS_API_HOST
# - COVID_ATLAS_API_PORT
# - COVID_ATLAS_LOG_LEVEL
# - COVID_ATLAS_LOG_FORMAT

[data]
# Case table, one row per country per day
cases_path = "data/owid-covid-data.csv"

# TopoJSON world map
world_path = "data/countries-110m.json"

# Topology object and name property of the country shapes
geo_object = "countries"
name_property = "name"

# Case table columns
location_column = "location"
date_column = "date"
date_format = "%Y-%m-%d"

# Metric columns to load (empty loads all)
metrics = []

# Aggregate rows to drop at load time
exclude_locations = []

[dashboard]
title = "COVID-19 Dashboard"

# Metric shown on the map and in the ranking
summary_metric = "total_cases"
top_n = 10

# Initial line chart selection
default_countries = ["United States", "India", "Brazil"]
default_metric = "total_cases"

[join]
# Map world atlas names ("United States of America") to case table names
world_atlas_aliases = true

[join.aliases]
# "Feature name" = "Location"

[render.map]
width = 960
height = 600
scale = 130
color_max = 40000000
auto_domain = false
stroke = "#999"
highlight = "orange"
legend = true

[render.bars]
width = 640
height = 400
bar_color = "#cb181d"
padding = 0.1

[render.lines]
width = 800
height = 400
stroke_width = 2.0

[api]
# API server host
host = "127.0.0.1"

# API server port
port = 8086

# Allowed CORS origins (empty allows any)
cors_origins = []

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"

# Optional log file path
# file = "/var/log/covid-atlas/covid-atlas.log"
"##
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.data.geo_object, "countries");
        assert_eq!(config.dashboard.summary_metric, "total_cases");
        assert_eq!(config.dashboard.top_n, 10);
        assert_eq!(config.render.map.color_max, 40_000_000.0);
        assert_eq!(config.api.addr(), "127.0.0.1:8086");
        assert_eq!(config.logging.format, "pretty");
    }

    #[test]
    fn test_generated_config_parses() {
        let config = Config::parse(&generate_default_config()).unwrap();
        assert_eq!(config.data.cases_path, PathBuf::from("data/owid-covid-data.csv"));
        assert_eq!(config.dashboard.default_countries.len(), 3);
        assert_eq!(config.render.map.scale, 130.0);
        assert_eq!(config.render.bars.padding, 0.1);
        assert!(config.join.world_atlas_aliases);
        assert!(config.join.aliases.is_empty());
    }

    #[test]
    fn test_partial_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
            [dashboard]
            top_n = 5

            [join.aliases]
            "Fr." = "France"
            "#
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.dashboard.top_n, 5);
        assert_eq!(config.dashboard.title, "COVID-19 Dashboard");
        assert_eq!(config.data.location_column, "location");

        let aliases = config.join.join_aliases();
        assert_eq!(aliases.resolve("Fr."), "France");
        assert_eq!(aliases.resolve("United States of America"), "United States");
    }

    #[test]
    fn test_aliases_without_world_atlas() {
        let mut join = JoinConfig {
            world_atlas_aliases: false,
            ..JoinConfig::default()
        };
        join.aliases.insert("Fr.".to_string(), "France".to_string());

        let aliases = join.join_aliases();
        assert_eq!(aliases.len(), 1);
        assert_eq!(aliases.resolve("United States of America"), "United States of America");
    }

    #[test]
    fn test_missing_file() {
        let err = Config::load(Path::new("/nonexistent/covid-atlas.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_parse_error_names_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[dashboard]\ntop_n = \"ten\"").unwrap();

        match Config::load(file.path()) {
            Err(ConfigError::Parse { path, .. }) => assert_eq!(path, file.path()),
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_load_first_reports_broken_file() {
        use std::sync::{Arc, Mutex};

        struct Captured(Arc<Mutex<Vec<u8>>>);

        impl std::io::Write for Captured {
            fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
                self.0.lock().unwrap().extend_from_slice(buf);
                Ok(buf.len())
            }

            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }

        let mut broken = NamedTempFile::new().unwrap();
        writeln!(broken, "[dashboard]\ntop_n = \"ten\"").unwrap();
        let mut valid = NamedTempFile::new().unwrap();
        writeln!(valid, "[dashboard]\ntop_n = 3").unwrap();

        let logs = Arc::new(Mutex::new(Vec::new()));
        let sink = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || Captured(sink.clone()))
            .with_ansi(false)
            .finish();

        let paths = vec![broken.path().to_path_buf(), valid.path().to_path_buf()];
        let config = tracing::subscriber::with_default(subscriber, || Config::load_first(&paths));

        assert_eq!(config.dashboard.top_n, 3);
        let logs = String::from_utf8(logs.lock().unwrap().clone()).unwrap();
        assert!(logs.contains("WARN"), "{logs}");
        assert!(logs.contains("Failed to load config"), "{logs}");
    }

    #[test]
    fn test_load_first_without_files() {
        let config = Config::load_first(&[PathBuf::from("/nonexistent/covid-atlas.toml")]);
        assert_eq!(config.dashboard.top_n, Config::default().dashboard.top_n);
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = [
            ("COVID_ATLAS_CASES_PATH", "/data/cases.csv"),
            ("COVID_ATLAS_API_PORT", "9000"),
            ("COVID_ATLAS_LOG_FORMAT", "json"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_overrides(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.data.cases_path, PathBuf::from("/data/cases.csv"));
        assert_eq!(config.api.port, 9000);
        assert_eq!(config.logging.format, "json");
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_invalid_port_override_ignored() {
        let mut config = Config::default();
        config.apply_overrides(|key| (key == "COVID_ATLAS_API_PORT").then(|| "not-a-port".to_string()));
        assert_eq!(config.api.port, 8086);
    }
}
