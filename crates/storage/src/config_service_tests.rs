use super::*;
use tempfile::tempdir;

#[test]
fn load_without_config_file_uses_defaults() {
    let tmp = tempdir().unwrap();
    let paths = ProjectPaths::init(tmp.path()).unwrap();
    let service = ConfigService::new(&paths);
    let config = service.load().unwrap();
    assert_eq!(config.default_status, "backlog");
}

#[test]
fn save_then_load_round_trips() {
    let tmp = tempdir().unwrap();
    let paths = ProjectPaths::init(tmp.path()).unwrap();
    let service = ConfigService::new(&paths);

    let mut config = Config::default();
    config.project_code = Some("PROJ".to_string());
    service.save(&config).unwrap();

    let loaded = service.load().unwrap();
    assert_eq!(loaded.project_code, Some("PROJ".to_string()));
}
