//! Configuration files on disk.

use std::io::Write;

use rtsim_core::{ConfigError, Simulation, SimulationConfig, SimulationError};
use tempfile::{NamedTempFile, TempDir};

fn write_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn test_file_round_trip_runs_the_same() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("reference.json");
    std::fs::write(&path, SimulationConfig::reference().to_json_pretty().unwrap()).unwrap();

    let loaded = SimulationConfig::from_file(&path).unwrap();
    assert_eq!(loaded, SimulationConfig::reference());

    let report = Simulation::new(loaded).unwrap().run_to_completion().unwrap();
    assert_eq!(report.total_missed_deadlines(), 8);
}

#[test]
fn test_defaults_fill_missing_fields() {
    let file = write_config(
        r#"{"tasks": [{"priority": 2, "period": 4, "execution_time": 1}]}"#,
    );

    let config = SimulationConfig::from_file(file.path()).unwrap();

    assert_eq!(config.horizon, 20);
    assert_eq!(config.display_window, 20);
    assert!(!config.tasks[0].needs_resource);
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = TempDir::new().unwrap();

    let result = SimulationConfig::from_file(&dir.path().join("absent.json"));

    assert!(matches!(result, Err(ConfigError::Io(_))));
}

#[test]
fn test_malformed_file_is_parse_error() {
    let file = write_config(r#"{"tasks": [{"priority": "high"}]}"#);

    let result = SimulationConfig::from_file(file.path());

    assert!(matches!(result, Err(ConfigError::Parse(_))));
}

#[test]
fn test_invalid_task_rejected_before_running() {
    let file = write_config(
        r#"{"tasks": [
            {"priority": 1, "period": 5, "execution_time": 2},
            {"priority": 1, "period": 0, "execution_time": 1}
        ]}"#,
    );
    let config = SimulationConfig::from_file(file.path()).unwrap();

    let result = Simulation::new(config);

    assert!(matches!(
        result,
        Err(SimulationError::InvalidConfig(ConfigError::NonPositivePeriod {
            task: 1,
            period: 0
        }))
    ));
}
