use odm_query::config::LoggingConfig;
use odm_query::logger;

#[test]
fn configure_logging_creates_files_in_dir() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = LoggingConfig {
        dir: Some(dir.path().join("logs")),
        level: "debug".into(),
        retention: 2,
        dev_log: true,
    };
    logger::configure_logging(&cfg).unwrap();
    log::info!("logger smoke test");
    assert!(dir.path().join("logs/query.log").exists());
    assert!(dir.path().join("logs/dev.log").exists());
    // A second configuration is accepted even though the global logger is already set.
    logger::configure_logging(&cfg).unwrap();
}

#[test]
fn config_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("logging.toml");
    std::fs::write(&path, "level = \"trace\"\nretention = 4\n").unwrap();
    let cfg = LoggingConfig::from_toml_file(&path).unwrap();
    assert_eq!(cfg.level_filter(), log::LevelFilter::Trace);
    assert_eq!(cfg.retention, 4);
    assert!(!cfg.dev_log);
    assert!(LoggingConfig::from_toml_file(&dir.path().join("missing.toml")).is_err());
}
