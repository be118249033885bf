// Sensor tests: output parsing, thermal zone file reads, shell probes

use hostlogger::sensor::{
    CommandProbe, SensorBackend, SensorError, SensorReader, ThermalZone, parse_first_float,
    parse_millidegrees,
};
use tempfile::TempDir;

#[test]
fn parse_first_float_skips_non_numeric_lines() {
    assert_eq!(parse_first_float("12.75"), Some(12.75));
    assert_eq!(parse_first_float("Linux 6.1\n\n  87.5  \n3"), Some(87.5));
    assert_eq!(parse_first_float("42"), Some(42.0));
    assert_eq!(parse_first_float(""), None);
    assert_eq!(parse_first_float("Device tps\nsda 1.0"), None);
}

#[test]
fn parse_first_float_ignores_non_finite_tokens() {
    assert_eq!(parse_first_float("nan\ninf\n5.5"), Some(5.5));
    assert_eq!(parse_first_float("NaN"), None);
}

#[test]
fn parse_millidegrees_scales_to_celsius() {
    assert_eq!(parse_millidegrees("48312\n"), Some(48.312));
    assert_eq!(parse_millidegrees("-5000"), Some(-5.0));
    assert_eq!(parse_millidegrees("48.3"), None);
    assert_eq!(parse_millidegrees(""), None);
}

#[tokio::test]
async fn thermal_zone_reads_millidegrees_file() {
    let dir = TempDir::new().unwrap();
    let zone = dir.path().join("thermal_zone0");
    std::fs::create_dir(&zone).unwrap();
    let path = zone.join("temp");
    std::fs::write(&path, "51250\n").unwrap();

    let reader = ThermalZone::new(&path);
    assert_eq!(reader.name(), "thermal_zone0");
    assert_eq!(reader.read().await.unwrap(), 51.25);
}

#[tokio::test]
async fn thermal_zone_missing_file_is_read_error() {
    let dir = TempDir::new().unwrap();
    let reader = ThermalZone::new(dir.path().join("nope").join("temp"));
    let err = reader.read().await.unwrap_err();
    assert!(matches!(err, SensorError::Read { .. }));
}

#[tokio::test]
async fn thermal_zone_garbage_is_parse_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("temp");
    std::fs::write(&path, "hot").unwrap();
    let err = ThermalZone::new(&path).read().await.unwrap_err();
    assert!(matches!(err, SensorError::Parse { ref raw, .. } if raw == "hot"));
}

#[cfg(unix)]
#[tokio::test]
async fn command_probe_takes_first_numeric_line() {
    let probe = CommandProbe::new("printf", "printf 'header\\n42.5\\n7\\n'");
    assert_eq!(probe.read().await.unwrap(), 42.5);
}

#[cfg(unix)]
#[tokio::test]
async fn command_probe_non_zero_exit_is_error() {
    let probe = CommandProbe::new("fails", "echo boom >&2; exit 3");
    let err = probe.read().await.unwrap_err();
    match err {
        SensorError::ExitStatus { stderr, status, .. } => {
            assert_eq!(stderr, "boom");
            assert_eq!(status.code(), Some(3));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[cfg(unix)]
#[tokio::test]
async fn command_probe_without_number_is_no_value() {
    let probe = CommandProbe::new("words", "echo not a number");
    let err = probe.read().await.unwrap_err();
    assert!(matches!(err, SensorError::NoValue { .. }));
}

#[test]
fn builtin_probes_use_expected_utilities() {
    assert!(CommandProbe::cpu().command().starts_with("mpstat"));
    assert!(CommandProbe::ram().command().starts_with("free"));
    assert!(CommandProbe::io().command().starts_with("iostat"));
}

#[test]
fn sensor_backend_parse() {
    assert_eq!(SensorBackend::parse("shell"), Some(SensorBackend::Shell));
    assert_eq!(SensorBackend::parse(" NATIVE "), Some(SensorBackend::Native));
    assert_eq!(SensorBackend::parse("proc"), None);
    assert_eq!(SensorBackend::default(), SensorBackend::Shell);
}
