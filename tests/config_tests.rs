//! Loading engine configuration from files and the environment.

use std::fs;
use std::sync::Arc;

use tempfile::TempDir;
use voxel_world::{
    config::CONFIG_ENV_VAR, error::ConfigError, ChannelMeshBuilder, EngineConfig, EngineState,
};

#[test]
fn config_file_drives_the_engine() {
    let temp_dir = TempDir::new().expect("failed to create temp dir");
    let path = temp_dir.path().join("world.json");
    fs::write(
        &path,
        r#"{
            "seed": 4242,
            "spawn_x": 100,
            "spawn_z": -37,
            "shown_chunk_radius": 1,
            "player": { "drag_sensitivity": 0.5 }
        }"#,
    )
    .unwrap();

    let config = EngineConfig::load(&path).unwrap();
    assert_eq!(config.seed, Some(4242));
    assert_eq!(config.player.drag_sensitivity, 0.5);

    let (builder, _events) = ChannelMeshBuilder::channel();
    let mut engine = EngineState::new(config, Arc::new(builder)).unwrap();
    assert_eq!(engine.seed(), 4242);

    let eye = engine.player().eye();
    assert_eq!((eye.x, eye.z), (100.0, -37.0));

    engine.on_drag(2.0, 0.0);
    assert!((engine.player().yaw() + 1.0).abs() < 1e-5);
}

#[test]
fn broken_files_are_reported() {
    let temp_dir = TempDir::new().expect("failed to create temp dir");

    let truncated = temp_dir.path().join("truncated.json");
    fs::write(&truncated, r#"{ "seed": 1"#).unwrap();
    assert!(matches!(
        EngineConfig::load(&truncated),
        Err(ConfigError::Json(_))
    ));

    let invalid = temp_dir.path().join("invalid.json");
    fs::write(
        &invalid,
        r#"{ "terrain": { "min_elevation": 90, "max_elevation": 40 } }"#,
    )
    .unwrap();
    assert!(matches!(
        EngineConfig::load(&invalid),
        Err(ConfigError::EmptyRange { .. })
    ));
}

#[test]
fn environment_names_the_config_file() {
    let temp_dir = TempDir::new().expect("failed to create temp dir");
    let path = temp_dir.path().join("env.json");
    fs::write(&path, r#"{ "stats_interval_secs": 1.5 }"#).unwrap();

    // the only test in this binary touching the variable
    std::env::set_var(CONFIG_ENV_VAR, &path);
    let loaded = EngineConfig::from_env();
    std::env::remove_var(CONFIG_ENV_VAR);

    assert_eq!(loaded.unwrap().stats_interval_secs, 1.5);
    assert_eq!(EngineConfig::from_env().unwrap(), EngineConfig::default());
}
