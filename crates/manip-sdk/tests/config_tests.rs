//! 配置文件读写测试

use manip_sdk::{ConfigError, Manipulator, ManipulatorConfig, TimerCleanupPolicy};
use std::fs;
use tempfile::TempDir;

#[test]
fn test_save_and_load_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("manipulator.toml");

    let config = ManipulatorConfig::builder("vx300s")
        .robot_name("right_arm")
        .moving_time(3.0)
        .accel_time(0.5)
        .gripper_pressure(0.8)
        .init_node(false)
        .timer_cleanup(TimerCleanupPolicy::AllGroups)
        .build()
        .unwrap();

    config.save_to_file(&path).unwrap();
    let loaded = ManipulatorConfig::load_from_file(&path).unwrap();

    assert_eq!(loaded, config);
}

#[test]
fn test_load_minimal_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("minimal.toml");
    fs::write(&path, "robot_model = \"px100\"\ninit_node = false\n").unwrap();

    let config = ManipulatorConfig::load_from_file(&path).unwrap();
    assert_eq!(config.resolved_robot_name(), "px100");
    assert_eq!(config.group_name(), "arm");
    assert_eq!(config.timer_cleanup(), TimerCleanupPolicy::GripperGated);

    let bot = Manipulator::new(config).unwrap();
    assert!(bot.has_gripper());
    assert_eq!(bot.core().profile().dof(), 4);
}

#[test]
fn test_missing_file_reports_path() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("absent.toml");

    let err = ManipulatorConfig::load_from_file(&path).unwrap_err();
    assert!(matches!(err, ConfigError::Io { .. }));
    assert!(err.to_string().contains("absent.toml"));
}

#[test]
fn test_invalid_values_in_file_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bad.toml");
    fs::write(&path, "robot_model = \"wx200\"\nmoving_time = 0.0\n").unwrap();

    let err = ManipulatorConfig::load_from_file(&path).unwrap_err();
    assert!(matches!(
        err,
        ConfigError::InvalidValue {
            field: "moving_time",
            ..
        }
    ));
}

#[test]
fn test_misspelled_field_in_file_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("typo.toml");
    fs::write(&path, "robot_model = \"wx200\"\ngriper_name = \"hand\"\n").unwrap();

    let err = ManipulatorConfig::load_from_file(&path).unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));
}
