use std::io::Write;

use retriever_agent::{ConfigError, DropPolicy, FetchConfig, ReturnTo};

#[test]
fn loads_overrides_from_a_yaml_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        "arena:\n  half_x: 15.0\n  half_z: 10.0\n\
         agent:\n  return_to: player\n  run_speed: 5.0\n\
         drop:\n  policy: keep_simulated\n\
         physics:\n  gravity: -3.7"
    )
    .unwrap();

    let config = FetchConfig::load(file.path()).unwrap();
    assert_eq!(config.arena.half_x, 15.0);
    assert_eq!(config.arena.half_z, 10.0);
    assert_eq!(config.arena.edge_margin, 1.2);
    assert_eq!(config.agent.return_to, ReturnTo::Player);
    assert_eq!(config.agent.run_speed, 5.0);
    assert_eq!(config.agent.walk_speed, 1.8);
    assert_eq!(config.drop.policy, DropPolicy::KeepSimulated);
    assert_eq!(config.physics.gravity, -3.7);
}

#[test]
fn empty_file_yields_defaults() {
    let file = tempfile::NamedTempFile::new().unwrap();
    let config = FetchConfig::load(file.path()).unwrap();
    assert_eq!(config, FetchConfig::default());
}

#[test]
fn reports_missing_files_and_bad_values() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope.yaml");
    assert!(matches!(
        FetchConfig::load(&missing),
        Err(ConfigError::Io { .. })
    ));

    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "arena: [1, 2").unwrap();
    assert!(matches!(
        FetchConfig::load(file.path()),
        Err(ConfigError::Parse(_))
    ));

    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "throw:\n  min_speed: 10.0\n  max_speed: 5.0").unwrap();
    let err = FetchConfig::load(file.path()).unwrap_err();
    assert!(err.to_string().contains("throw.max_speed"));
}

#[test]
fn default_config_round_trips_through_yaml() {
    let yaml = serde_yaml::to_string(&FetchConfig::default()).unwrap();
    assert_eq!(FetchConfig::from_yaml(&yaml).unwrap(), FetchConfig::default());
}
