use crate::error::{AlongTrackError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

/// Environment variable prefix for all settings
pub const ENV_PREFIX: &str = "ALONGTRACK_";

/// Default Overpass interpreters, tried in this order
pub const DEFAULT_ENDPOINTS: &[&str] = &[
    "https://overpass.private.coffee/api/interpreter",
    "https://overpass-api.de/api/interpreter",
    "https://lz4.overpass-api.de/api/interpreter",
];

pub const DEFAULT_PALETTE: &[&str] = &[
    "orange", "purple", "green", "blue", "darkred", "darkblue", "darkgreen", "cadetblue", "pink",
];

/// Step distance as a fraction of the radius when no step is configured
pub const DEFAULT_STEP_RATIO: f64 = 0.6;

/// Configuration source for tracking where values come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Default value
    Default,
    /// Loaded from config file
    File,
    /// Loaded from environment variable
    Environment,
    /// Provided via CLI argument
    Cli,
}

impl ConfigSource {
    /// Returns the precedence level (higher = higher priority)
    pub fn precedence(&self) -> u8 {
        match self {
            ConfigSource::Default => 0,
            ConfigSource::File => 1,
            ConfigSource::Environment => 2,
            ConfigSource::Cli => 3,
        }
    }
}

/// A configuration value with its source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigValue<T> {
    pub value: T,
    pub source: ConfigSource,
}

impl<T> ConfigValue<T> {
    pub fn new(value: T, source: ConfigSource) -> Self {
        Self { value, source }
    }

    fn default_value(value: T) -> Self {
        Self::new(value, ConfigSource::Default)
    }

    /// Update the value if the new source has equal or higher precedence
    pub fn update(&mut self, value: T, source: ConfigSource) {
        if source.precedence() >= self.source.precedence() {
            self.value = value;
            self.source = source;
        }
    }

    fn update_opt(&mut self, value: Option<T>, source: ConfigSource) {
        if let Some(value) = value {
            self.update(value, source);
        }
    }
}

/// Layered configuration for AlongTrack
///
/// Precedence (highest first): CLI arguments, environment variables, config
/// file, defaults.
#[derive(Debug, Clone)]
pub struct LayeredConfig {
    pub project_name: ConfigValue<String>,
    pub output_path: ConfigValue<PathBuf>,
    pub upload_dir: ConfigValue<PathBuf>,
    pub presets_file: ConfigValue<PathBuf>,

    pub radius_km: ConfigValue<f64>,
    pub step_km: ConfigValue<Option<f64>>,
    pub presets: ConfigValue<Vec<String>>,
    pub include: ConfigValue<Vec<String>>,
    pub exclude: ConfigValue<Vec<String>>,

    pub endpoints: ConfigValue<Vec<String>>,
    pub retries: ConfigValue<u32>,
    pub batch_km: ConfigValue<f64>,
    pub backoff_secs: ConfigValue<f64>,
    pub request_timeout_secs: ConfigValue<u64>,

    pub cleanup_interval_secs: ConfigValue<u64>,
    pub job_ttl_secs: ConfigValue<u64>,
    pub temp_file_max_age_secs: ConfigValue<u64>,
    pub output_retention_days: ConfigValue<u64>,

    pub track_color: ConfigValue<String>,
    pub default_marker_color: ConfigValue<String>,
    pub marker_palette: ConfigValue<Vec<String>>,
}

impl LayeredConfig {
    /// Create a new configuration with default values
    pub fn with_defaults() -> Self {
        Self {
            project_name: ConfigValue::default_value("AlongTrack".to_string()),
            output_path: ConfigValue::default_value(PathBuf::from("./data/output")),
            upload_dir: ConfigValue::default_value(env::temp_dir()),
            presets_file: ConfigValue::default_value(PathBuf::from("data/presets.toml")),

            radius_km: ConfigValue::default_value(5.0),
            step_km: ConfigValue::default_value(None),
            presets: ConfigValue::default_value(Vec::new()),
            include: ConfigValue::default_value(Vec::new()),
            exclude: ConfigValue::default_value(Vec::new()),

            endpoints: ConfigValue::default_value(
                DEFAULT_ENDPOINTS.iter().map(|s| s.to_string()).collect(),
            ),
            retries: ConfigValue::default_value(5),
            batch_km: ConfigValue::default_value(50.0),
            backoff_secs: ConfigValue::default_value(2.0),
            request_timeout_secs: ConfigValue::default_value(60),

            cleanup_interval_secs: ConfigValue::default_value(600),
            job_ttl_secs: ConfigValue::default_value(6 * 3600),
            temp_file_max_age_secs: ConfigValue::default_value(3600),
            output_retention_days: ConfigValue::default_value(10),

            track_color: ConfigValue::default_value("blue".to_string()),
            default_marker_color: ConfigValue::default_value("gray".to_string()),
            marker_palette: ConfigValue::default_value(
                DEFAULT_PALETTE.iter().map(|s| s.to_string()).collect(),
            ),
        }
    }

    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(self, path: P) -> Result<Self> {
        let content =
            fs::read_to_string(path.as_ref()).map_err(|e| AlongTrackError::ConfigInvalid {
                key: "file".to_string(),
                reason: format!("Failed to read config file: {}", e),
            })?;

        self.load_from_toml_str(&content)
    }

    /// Apply values from TOML content
    pub fn load_from_toml_str(mut self, content: &str) -> Result<Self> {
        let file: FileConfig = toml::from_str(content).map_err(|e| AlongTrackError::ConfigInvalid {
            key: "file".to_string(),
            reason: format!("Failed to parse TOML: {}", e),
        })?;

        let src = ConfigSource::File;

        if let Some(project) = file.project {
            self.project_name.update_opt(project.name, src);
            self.output_path.update_opt(project.output_path, src);
            self.upload_dir.update_opt(project.upload_dir, src);
            self.presets_file.update_opt(project.presets_file, src);
        }

        if let Some(search) = file.search {
            self.radius_km.update_opt(search.radius_km, src);
            self.step_km.update_opt(search.step_km.map(Some), src);
            self.presets.update_opt(search.presets, src);
            self.include.update_opt(search.include, src);
            self.exclude.update_opt(search.exclude, src);
        }

        if let Some(overpass) = file.overpass {
            self.endpoints.update_opt(overpass.servers, src);
            self.retries.update_opt(overpass.retries, src);
            self.batch_km.update_opt(overpass.batch_km, src);
            self.backoff_secs.update_opt(overpass.backoff_secs, src);
            self.request_timeout_secs.update_opt(overpass.timeout_secs, src);
        }

        if let Some(cleanup) = file.cleanup {
            self.cleanup_interval_secs.update_opt(cleanup.interval_seconds, src);
            self.job_ttl_secs.update_opt(cleanup.job_ttl_seconds, src);
            self.temp_file_max_age_secs.update_opt(cleanup.temp_file_max_age_seconds, src);
            self.output_retention_days.update_opt(cleanup.output_retention_days, src);
        }

        if let Some(map) = file.map {
            self.track_color.update_opt(map.track_color, src);
            self.default_marker_color.update_opt(map.default_marker_color, src);
            self.marker_palette.update_opt(map.marker_color_palette, src);
        }

        Ok(self)
    }

    /// Load configuration from environment variables
    ///
    /// Unparseable values are logged and ignored. Lists are semicolon separated.
    pub fn load_from_env(mut self) -> Self {
        let src = ConfigSource::Environment;

        self.project_name.update_opt(env_string("PROJECT_NAME"), src);
        self.output_path.update_opt(env_string("OUTPUT_PATH").map(PathBuf::from), src);
        self.upload_dir.update_opt(env_string("UPLOAD_DIR").map(PathBuf::from), src);
        self.presets_file.update_opt(env_string("PRESETS_FILE").map(PathBuf::from), src);

        self.radius_km.update_opt(env_parse("RADIUS_KM"), src);
        self.step_km.update_opt(env_parse("STEP_KM").map(Some), src);
        self.presets.update_opt(env_list("PRESETS"), src);
        self.include.update_opt(env_list("SEARCH_INCLUDE"), src);
        self.exclude.update_opt(env_list("SEARCH_EXCLUDE"), src);

        self.endpoints.update_opt(env_list("OVERPASS_SERVERS"), src);
        self.retries.update_opt(env_parse("OVERPASS_RETRIES"), src);
        self.batch_km.update_opt(env_parse("BATCH_KM"), src);
        self.backoff_secs.update_opt(env_parse("OVERPASS_BACKOFF_SECONDS"), src);
        self.request_timeout_secs.update_opt(env_parse("OVERPASS_TIMEOUT_SECONDS"), src);

        self.cleanup_interval_secs.update_opt(env_parse("CLEANUP_INTERVAL_SECONDS"), src);
        self.job_ttl_secs.update_opt(env_parse("JOB_TTL_SECONDS"), src);
        self.temp_file_max_age_secs.update_opt(env_parse("TEMP_FILE_MAX_AGE_SECONDS"), src);
        self.output_retention_days.update_opt(env_parse("OUTPUT_RETENTION_DAYS"), src);

        self.track_color.update_opt(env_string("TRACK_COLOR"), src);
        self.default_marker_color.update_opt(env_string("DEFAULT_MARKER_COLOR"), src);
        self.marker_palette.update_opt(env_list("MARKER_COLOR_PALETTE"), src);

        self
    }

    /// Update configuration from CLI arguments
    pub fn update_from_cli(&mut self, overrides: CliConfigOverrides) {
        let src = ConfigSource::Cli;
        self.project_name.update_opt(overrides.project_name, src);
        self.output_path.update_opt(overrides.output_path, src);
        self.presets_file.update_opt(overrides.presets_file, src);
        self.radius_km.update_opt(overrides.radius_km, src);
        self.step_km.update_opt(overrides.step_km.map(Some), src);
        self.batch_km.update_opt(overrides.batch_km, src);
        self.retries.update_opt(overrides.retries, src);
    }

    /// Validate the layered values and produce immutable settings
    pub fn resolve(&self) -> Result<Settings> {
        let radius_km = self.radius_km.value;
        if !(radius_km.is_finite() && radius_km > 0.0) {
            return Err(AlongTrackError::invalid_parameter(
                "radius_km",
                format!("must be positive, got {}", radius_km),
            ));
        }

        let step_km = self.step_km.value.unwrap_or(radius_km * DEFAULT_STEP_RATIO);
        if !(step_km.is_finite() && step_km > 0.0) {
            return Err(AlongTrackError::invalid_parameter(
                "step_km",
                format!("must be positive, got {}", step_km),
            ));
        }

        if !(self.batch_km.value.is_finite() && self.batch_km.value > 0.0) {
            return Err(AlongTrackError::invalid_parameter(
                "batch_km",
                format!("must be positive, got {}", self.batch_km.value),
            ));
        }

        if self.retries.value == 0 {
            return Err(AlongTrackError::ConfigInvalid {
                key: "overpass.retries".to_string(),
                reason: "at least one attempt is required".to_string(),
            });
        }

        if self.endpoints.value.is_empty() {
            return Err(AlongTrackError::ConfigMissing {
                key: "overpass.servers".to_string(),
            });
        }

        if !(self.backoff_secs.value.is_finite() && self.backoff_secs.value >= 0.0) {
            return Err(AlongTrackError::ConfigInvalid {
                key: "overpass.backoff_secs".to_string(),
                reason: format!("must not be negative, got {}", self.backoff_secs.value),
            });
        }

        Ok(Settings {
            project_name: self.project_name.value.clone(),
            output_path: self.output_path.value.clone(),
            upload_dir: self.upload_dir.value.clone(),
            presets_file: self.presets_file.value.clone(),
            search: SearchSettings {
                radius_km,
                step_km,
                presets: self.presets.value.clone(),
                include: self.include.value.clone(),
                exclude: self.exclude.value.clone(),
            },
            overpass: OverpassSettings {
                endpoints: self.endpoints.value.clone(),
                retries: self.retries.value,
                batch_km: self.batch_km.value,
                backoff: Duration::from_secs_f64(self.backoff_secs.value),
                request_timeout: Duration::from_secs(self.request_timeout_secs.value),
            },
            cleanup: CleanupSettings {
                interval: Duration::from_secs(self.cleanup_interval_secs.value),
                job_ttl: Duration::from_secs(self.job_ttl_secs.value),
                temp_file_max_age: Duration::from_secs(self.temp_file_max_age_secs.value),
                output_retention: Duration::from_secs(self.output_retention_days.value * 86_400),
            },
            map: MapSettings {
                track_color: self.track_color.value.clone(),
                default_marker_color: self.default_marker_color.value.clone(),
                marker_palette: self.marker_palette.value.clone(),
            },
        })
    }

    /// Get all configuration values as a map for inspection
    pub fn to_inspection_map(&self) -> BTreeMap<String, (String, ConfigSource)> {
        let mut map = BTreeMap::new();

        let mut put = |key: &str, value: String, source: ConfigSource| {
            map.insert(key.to_string(), (value, source));
        };

        put("project.name", self.project_name.value.clone(), self.project_name.source);
        put(
            "project.output_path",
            self.output_path.value.display().to_string(),
            self.output_path.source,
        );
        put(
            "project.upload_dir",
            self.upload_dir.value.display().to_string(),
            self.upload_dir.source,
        );
        put(
            "project.presets_file",
            self.presets_file.value.display().to_string(),
            self.presets_file.source,
        );
        put("search.radius_km", self.radius_km.value.to_string(), self.radius_km.source);
        put(
            "search.step_km",
            self.step_km
                .value
                .map(|s| s.to_string())
                .unwrap_or_else(|| format!("auto ({} x radius)", DEFAULT_STEP_RATIO)),
            self.step_km.source,
        );
        put("search.presets", self.presets.value.join(";"), self.presets.source);
        put("search.include", self.include.value.join(";"), self.include.source);
        put("search.exclude", self.exclude.value.join(";"), self.exclude.source);
        put("overpass.servers", self.endpoints.value.join(";"), self.endpoints.source);
        put("overpass.retries", self.retries.value.to_string(), self.retries.source);
        put("overpass.batch_km", self.batch_km.value.to_string(), self.batch_km.source);
        put(
            "overpass.backoff_secs",
            self.backoff_secs.value.to_string(),
            self.backoff_secs.source,
        );
        put(
            "overpass.timeout_secs",
            self.request_timeout_secs.value.to_string(),
            self.request_timeout_secs.source,
        );
        put(
            "cleanup.interval_seconds",
            self.cleanup_interval_secs.value.to_string(),
            self.cleanup_interval_secs.source,
        );
        put(
            "cleanup.job_ttl_seconds",
            self.job_ttl_secs.value.to_string(),
            self.job_ttl_secs.source,
        );
        put(
            "cleanup.temp_file_max_age_seconds",
            self.temp_file_max_age_secs.value.to_string(),
            self.temp_file_max_age_secs.source,
        );
        put(
            "cleanup.output_retention_days",
            self.output_retention_days.value.to_string(),
            self.output_retention_days.source,
        );
        put("map.track_color", self.track_color.value.clone(), self.track_color.source);
        put(
            "map.default_marker_color",
            self.default_marker_color.value.clone(),
            self.default_marker_color.source,
        );
        put(
            "map.marker_color_palette",
            self.marker_palette.value.join(";"),
            self.marker_palette.source,
        );

        map
    }
}

/// Resolved, validated settings
#[derive(Debug, Clone)]
pub struct Settings {
    pub project_name: String,
    pub output_path: PathBuf,
    pub upload_dir: PathBuf,
    pub presets_file: PathBuf,
    pub search: SearchSettings,
    pub overpass: OverpassSettings,
    pub cleanup: CleanupSettings,
    pub map: MapSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchSettings {
    pub radius_km: f64,
    pub step_km: f64,
    pub presets: Vec<String>,
    pub include: Vec<String>,
    pub exclude: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OverpassSettings {
    pub endpoints: Vec<String>,
    pub retries: u32,
    pub batch_km: f64,
    /// Base backoff; attempt `n` (1-based) sleeps `n x backoff`
    pub backoff: Duration,
    pub request_timeout: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CleanupSettings {
    pub interval: Duration,
    pub job_ttl: Duration,
    pub temp_file_max_age: Duration,
    pub output_retention: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MapSettings {
    pub track_color: String,
    pub default_marker_color: String,
    pub marker_palette: Vec<String>,
}

/// Configuration loaded from TOML file
#[derive(Debug, Default, Deserialize, Serialize)]
struct FileConfig {
    project: Option<ProjectSection>,
    search: Option<SearchSection>,
    overpass: Option<OverpassSection>,
    cleanup: Option<CleanupSection>,
    map: Option<MapSection>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
struct ProjectSection {
    name: Option<String>,
    output_path: Option<PathBuf>,
    upload_dir: Option<PathBuf>,
    presets_file: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
struct SearchSection {
    radius_km: Option<f64>,
    step_km: Option<f64>,
    presets: Option<Vec<String>>,
    include: Option<Vec<String>>,
    exclude: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
struct OverpassSection {
    servers: Option<Vec<String>>,
    retries: Option<u32>,
    batch_km: Option<f64>,
    backoff_secs: Option<f64>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
struct CleanupSection {
    interval_seconds: Option<u64>,
    job_ttl_seconds: Option<u64>,
    temp_file_max_age_seconds: Option<u64>,
    output_retention_days: Option<u64>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
struct MapSection {
    track_color: Option<String>,
    default_marker_color: Option<String>,
    marker_color_palette: Option<Vec<String>>,
}

/// CLI configuration overrides
#[derive(Debug, Default)]
pub struct CliConfigOverrides {
    pub project_name: Option<String>,
    pub output_path: Option<PathBuf>,
    pub presets_file: Option<PathBuf>,
    pub radius_km: Option<f64>,
    pub step_km: Option<f64>,
    pub batch_km: Option<f64>,
    pub retries: Option<u32>,
}

/// Split a semicolon-delimited string into trimmed, non-empty items
pub fn parse_semicolon_list(value: &str) -> Vec<String> {
    value
        .split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn env_string(name: &str) -> Option<String> {
    env::var(format!("{}{}", ENV_PREFIX, name)).ok().filter(|v| !v.trim().is_empty())
}

fn env_list(name: &str) -> Option<Vec<String>> {
    env_string(name).map(|v| parse_semicolon_list(&v))
}

fn env_parse<T: FromStr>(name: &str) -> Option<T> {
    let raw = env_string(name)?;
    match raw.trim().parse::<T>() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!("Invalid {}{} value '{}': ignoring", ENV_PREFIX, name, raw);
            None
        }
    }
}
