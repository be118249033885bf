// Config loading tests: required keys, numeric fallbacks, optional settings

use hostlogger::config::{ConfigError, LoggerConfig};
use hostlogger::sensor::SensorBackend;
use std::collections::HashMap;
use std::path::PathBuf;

fn base_env() -> HashMap<&'static str, String> {
    HashMap::from([
        ("MONGO_URI", "mongodb://user:secret@db:27017".to_string()),
        ("MONGO_DATABASE", "metrics".to_string()),
        ("MONGO_LOGGER_COLLECTION", "host_logger".to_string()),
    ])
}

fn load(env: &HashMap<&'static str, String>) -> Result<LoggerConfig, ConfigError> {
    LoggerConfig::from_lookup(|key| env.get(key).cloned())
}

#[test]
fn test_config_loads_required_and_defaults() {
    let config = load(&base_env()).expect("load");
    assert_eq!(config.store.uri, "mongodb://user:secret@db:27017");
    assert_eq!(config.store.database, "metrics");
    assert_eq!(config.store.collection, "host_logger");
    assert_eq!(config.sampling.sleep_duration_secs, 60);
    assert_eq!(config.sampling.num_samples, 3);
    assert_eq!(config.sampling.sample_interval_secs, 20);
    assert_eq!(config.health.status_path, PathBuf::from("/tmp/health_status"));
    assert_eq!(config.health.http_addr, None);
    assert_eq!(config.sensors.backend, SensorBackend::Shell);
    assert_eq!(
        config.sensors.thermal_path,
        PathBuf::from("/sys/class/thermal/thermal_zone0/temp")
    );
}

#[test]
fn test_config_missing_uri_is_rejected() {
    let mut env = base_env();
    env.remove("MONGO_URI");
    assert_eq!(load(&env).unwrap_err(), ConfigError::Missing("MONGO_URI"));
}

#[test]
fn test_config_missing_database_is_rejected() {
    let mut env = base_env();
    env.remove("MONGO_DATABASE");
    assert_eq!(load(&env).unwrap_err(), ConfigError::Missing("MONGO_DATABASE"));
}

#[test]
fn test_config_missing_collection_is_rejected() {
    let mut env = base_env();
    env.remove("MONGO_LOGGER_COLLECTION");
    let err = load(&env).unwrap_err();
    assert_eq!(err, ConfigError::Missing("MONGO_LOGGER_COLLECTION"));
    assert!(err.to_string().contains("MONGO_LOGGER_COLLECTION"));
}

#[test]
fn test_config_empty_required_value_counts_as_missing() {
    let mut env = base_env();
    env.insert("MONGO_URI", "  ".to_string());
    assert_eq!(load(&env).unwrap_err(), ConfigError::Missing("MONGO_URI"));
}

#[test]
fn test_config_reads_numeric_overrides() {
    let mut env = base_env();
    env.insert("SLEEP_DURATION_SECS", "300".to_string());
    env.insert("NUM_SAMPLES", "5".to_string());
    env.insert("SAMPLE_INTERVAL_SECS", "0".to_string());
    let config = load(&env).unwrap();
    assert_eq!(config.sampling.sleep_duration_secs, 300);
    assert_eq!(config.sampling.num_samples, 5);
    assert_eq!(config.sampling.sample_interval_secs, 0);
    assert_eq!(config.sampling.sleep_duration().as_secs(), 300);
}

#[test]
fn test_config_non_integer_values_fall_back_to_defaults() {
    let mut env = base_env();
    env.insert("SLEEP_DURATION_SECS", "one minute".to_string());
    env.insert("NUM_SAMPLES", "3.5".to_string());
    env.insert("SAMPLE_INTERVAL_SECS", "-20".to_string());
    let config = load(&env).unwrap();
    assert_eq!(config.sampling.sleep_duration_secs, 60);
    assert_eq!(config.sampling.num_samples, 3);
    assert_eq!(config.sampling.sample_interval_secs, 20);
}

#[test]
fn test_config_zero_samples_falls_back_to_default() {
    let mut env = base_env();
    env.insert("NUM_SAMPLES", "0".to_string());
    assert_eq!(load(&env).unwrap().sampling.num_samples, 3);
}

#[test]
fn test_config_optional_settings() {
    let mut env = base_env();
    env.insert("HEALTH_STATUS_PATH", "/run/hostlogger/health".to_string());
    env.insert("HEALTH_HTTP_ADDR", "127.0.0.1:8080".to_string());
    env.insert("SENSOR_BACKEND", "Native".to_string());
    env.insert("THERMAL_ZONE_PATH", "/sys/class/thermal/thermal_zone1/temp".to_string());
    let config = load(&env).unwrap();
    assert_eq!(
        config.health.status_path,
        PathBuf::from("/run/hostlogger/health")
    );
    assert_eq!(config.health.http_addr.as_deref(), Some("127.0.0.1:8080"));
    assert_eq!(config.sensors.backend, SensorBackend::Native);
    assert_eq!(
        config.sensors.thermal_path,
        PathBuf::from("/sys/class/thermal/thermal_zone1/temp")
    );
}

#[test]
fn test_config_unknown_backend_falls_back_to_shell() {
    let mut env = base_env();
    env.insert("SENSOR_BACKEND", "wmi".to_string());
    assert_eq!(load(&env).unwrap().sensors.backend, SensorBackend::Shell);
}

#[test]
fn test_config_debug_output_redacts_uri() {
    let config = load(&base_env()).unwrap();
    let debug = format!("{:?}", config);
    assert!(!debug.contains("secret"));
    assert!(debug.contains("host_logger"));
}
