//! Integration tests for layered configuration
//!
//! These tests verify that configuration loading follows the correct precedence:
//! CLI arguments > Environment variables > Config file > Defaults

use alongtrack_core::config::{CliConfigOverrides, ConfigSource, LayeredConfig};
use serial_test::serial;
use std::env;
use std::io::Write;
use std::time::Duration;
use tempfile::NamedTempFile;

const ENV_VARS: &[&str] = &[
    "ALONGTRACK_RADIUS_KM",
    "ALONGTRACK_STEP_KM",
    "ALONGTRACK_OVERPASS_SERVERS",
    "ALONGTRACK_OVERPASS_RETRIES",
    "ALONGTRACK_SEARCH_INCLUDE",
    "ALONGTRACK_JOB_TTL_SECONDS",
];

fn clear_env() {
    for var in ENV_VARS {
        env::remove_var(var);
    }
}

fn config_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "{}", content).unwrap();
    file
}

#[test]
#[serial]
fn test_default_configuration() {
    clear_env();
    let settings = LayeredConfig::with_defaults().load_from_env().resolve().unwrap();

    assert_eq!(settings.search.radius_km, 5.0);
    assert!((settings.search.step_km - 3.0).abs() < 1e-9);
    assert_eq!(settings.overpass.batch_km, 50.0);
    assert_eq!(settings.overpass.retries, 5);
    assert_eq!(settings.overpass.request_timeout, Duration::from_secs(60));
    assert_eq!(settings.cleanup.interval, Duration::from_secs(600));
    assert_eq!(settings.cleanup.job_ttl, Duration::from_secs(21_600));
    assert_eq!(settings.cleanup.temp_file_max_age, Duration::from_secs(3600));
    assert_eq!(settings.map.track_color, "blue");
    assert_eq!(settings.map.marker_palette.len(), 9);
}

#[test]
#[serial]
fn test_file_overrides_defaults() {
    clear_env();
    let file = config_file(
        r#"
[project]
name = "Alps Crossing"

[search]
radius_km = 2.0
step_km = 1.5

[cleanup]
output_retention_days = 3
"#,
    );

    let config = LayeredConfig::with_defaults().load_from_file(file.path()).unwrap();

    assert_eq!(config.project_name.value, "Alps Crossing");
    assert_eq!(config.radius_km.source, ConfigSource::File);
    assert_eq!(config.step_km.value, Some(1.5));

    let settings = config.resolve().unwrap();
    assert_eq!(settings.cleanup.output_retention, Duration::from_secs(3 * 86_400));
}

#[test]
#[serial]
fn test_env_overrides_file() {
    clear_env();
    let file = config_file("[search]\nradius_km = 2.0\n");
    env::set_var("ALONGTRACK_RADIUS_KM", "7.5");
    env::set_var("ALONGTRACK_OVERPASS_SERVERS", "http://a/api; http://b/api");

    let config = LayeredConfig::with_defaults()
        .load_from_file(file.path())
        .unwrap()
        .load_from_env();

    assert_eq!(config.radius_km.value, 7.5);
    assert_eq!(config.radius_km.source, ConfigSource::Environment);
    assert_eq!(
        config.endpoints.value,
        vec!["http://a/api".to_string(), "http://b/api".to_string()]
    );

    clear_env();
}

#[test]
#[serial]
fn test_cli_overrides_env() {
    clear_env();
    env::set_var("ALONGTRACK_RADIUS_KM", "7.5");
    env::set_var("ALONGTRACK_OVERPASS_RETRIES", "9");

    let mut config = LayeredConfig::with_defaults().load_from_env();
    config.update_from_cli(CliConfigOverrides {
        radius_km: Some(1.0),
        ..Default::default()
    });

    assert_eq!(config.radius_km.value, 1.0);
    assert_eq!(config.radius_km.source, ConfigSource::Cli);
    assert_eq!(config.retries.value, 9);
    assert_eq!(config.retries.source, ConfigSource::Environment);

    clear_env();
}

#[test]
#[serial]
fn test_invalid_env_value_is_ignored() {
    clear_env();
    env::set_var("ALONGTRACK_JOB_TTL_SECONDS", "six hours");

    let config = LayeredConfig::with_defaults().load_from_env();
    assert_eq!(config.job_ttl_secs.value, 21_600);
    assert_eq!(config.job_ttl_secs.source, ConfigSource::Default);

    clear_env();
}

#[test]
#[serial]
fn test_env_include_list() {
    clear_env();
    env::set_var("ALONGTRACK_SEARCH_INCLUDE", "tourism=camp_site;amenity=shelter");

    let settings = LayeredConfig::with_defaults().load_from_env().resolve().unwrap();
    assert_eq!(settings.search.include, vec!["tourism=camp_site", "amenity=shelter"]);

    clear_env();
}

#[test]
fn test_malformed_file_is_config_error() {
    let file = config_file("[search\nradius_km = ");
    assert!(LayeredConfig::with_defaults().load_from_file(file.path()).is_err());
}
