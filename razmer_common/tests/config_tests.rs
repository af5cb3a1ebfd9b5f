//! `emulator.toml` loading tests.
//!
//! Full file round trip through `ConfigLoader::load_validated`, missing
//! sections, unknown fields and every validation rule.

use razmer_common::config::{ConfigError, ConfigLoader, LogLevel, Validate};
use razmer_common::emulator::EmulatorConfig;
use razmer_common::format::Layout;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const FULL_CONFIG: &str = r#"
[shared]
log_level = "debug"
service_name = "bench-rig-02"

[scan]
strobe_interval_us = 250
invert_b_signals = false

[mode]
change_interval_ms = 100
data_phase_ms = 2000
error_phase_ms = 3000
pause_phase_ms = 500

[buffer]
sign_slots = 2

[axes]
count = 3
digits = 7
dot_position = 4
frame_rate_hz = 25
algorithm_period_s = 2
"#;

fn write_config(dir: &Path, content: &str) -> PathBuf {
    let path = dir.join("emulator.toml");
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn full_config_loads() {
    let dir = TempDir::new().unwrap();
    let path = write_config(dir.path(), FULL_CONFIG);

    let config = EmulatorConfig::load_validated(&path).unwrap();
    assert_eq!(config.shared.log_level, LogLevel::Debug);
    assert_eq!(config.shared.service_name, "bench-rig-02");
    assert_eq!(config.scan.strobe_interval_us, 250);
    assert!(!config.scan.invert_b_signals);
    assert_eq!(config.mode.change_interval_ms, 100);
    assert_eq!(config.mode.round_ms(), 5500);
    assert_eq!(config.buffer.sign_slots, 2);
    assert_eq!(config.axes.layout().unwrap(), Layout::new(3, 7, 4).unwrap());
    assert_eq!(config.axes.frames_per_algorithm(), 50);
}

#[test]
fn sections_are_optional() {
    let dir = TempDir::new().unwrap();
    let path = write_config(dir.path(), "[scan]\nstrobe_interval_us = 1000\n");

    let config = EmulatorConfig::load_validated(&path).unwrap();
    assert_eq!(config.scan.strobe_interval_us, 1000);
    assert!(config.scan.invert_b_signals);
    assert_eq!(config.mode, Default::default());
    assert_eq!(config.axes, Default::default());
}

#[test]
fn missing_file_is_file_not_found() {
    let dir = TempDir::new().unwrap();
    let result = EmulatorConfig::load(&dir.path().join("absent.toml"));
    assert!(matches!(result, Err(ConfigError::FileNotFound)));
}

#[test]
fn unknown_section_rejected() {
    let dir = TempDir::new().unwrap();
    let path = write_config(dir.path(), "[display]\nsegments = 7\n");
    assert!(matches!(
        EmulatorConfig::load(&path),
        Err(ConfigError::ParseError(_))
    ));
}

#[test]
fn wrong_type_rejected() {
    let dir = TempDir::new().unwrap();
    let path = write_config(dir.path(), "[buffer]\nsign_slots = \"four\"\n");
    assert!(matches!(
        EmulatorConfig::load(&path),
        Err(ConfigError::ParseError(_))
    ));
}

#[test]
fn invalid_values_fail_validation() {
    let cases = [
        "[scan]\nstrobe_interval_us = 0\n",
        "[mode]\nchange_interval_ms = 0\n",
        "[mode]\npause_phase_ms = 0\n",
        "[buffer]\nsign_slots = 29\n",
        "[axes]\ncount = 6\n",
        "[axes]\ncount = 0\n",
        "[axes]\ndigits = 8\n",
        "[axes]\ndigits = 3\ndot_position = 4\n",
        "[axes]\nframe_rate_hz = 0\n",
        "[axes]\nalgorithm_period_s = 0\n",
        "[shared]\nservice_name = \"\"\n",
    ];

    let dir = TempDir::new().unwrap();
    for case in cases {
        let path = write_config(dir.path(), case);
        let config = EmulatorConfig::load(&path).unwrap();
        assert!(
            matches!(config.validate(), Err(ConfigError::ValidationError(_))),
            "accepted: {case:?}"
        );
        assert!(EmulatorConfig::load_validated(&path).is_err());
    }
}

#[test]
fn round_trips_through_toml() {
    let config = EmulatorConfig::from_toml(FULL_CONFIG).unwrap();
    let text = toml::to_string(&config).unwrap();
    assert_eq!(EmulatorConfig::from_toml(&text).unwrap(), config);
}
