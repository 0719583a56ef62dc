use super::*;

#[test]
fn default_config_validates() {
    let config = Config::default();
    assert!(config.validate().is_ok());
}

#[test]
fn default_config_has_no_terminal_outgoing_edges() {
    let config = Config::default();
    assert!(!config.transitions.contains_key("done"));
    assert!(!config.transitions.contains_key("cancelled"));
}

#[test]
fn rejects_unknown_default_status() {
    let mut config = Config::default();
    config.default_status = "nonexistent".to_string();
    assert!(config.validate().is_err());
}

#[test]
fn rejects_transition_to_unknown_status() {
    let mut config = Config::default();
    config
        .transitions
        .get_mut("backlog")
        .unwrap()
        .insert("warp_speed".to_string());
    assert!(config.validate().is_err());
}

#[test]
fn role_vocabulary_includes_policy_roles() {
    let config = Config::default();
    let roles = config.role_vocabulary();
    assert!(roles.contains("review"));
}
