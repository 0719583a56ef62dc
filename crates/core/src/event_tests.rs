use super::*;

#[test]
fn lifecycle_types_are_recognized() {
    assert!(LIFECYCLE_EVENT_TYPES.contains(&"task_created"));
    assert!(!LIFECYCLE_EVENT_TYPES.contains(&"comment_added"));
}

#[test]
fn extension_types_require_x_prefix() {
    assert!(Event::is_extension_type("x_deploy_started"));
    assert!(!Event::is_extension_type("deploy_started"));
}

#[test]
fn reserved_types_cannot_be_used_as_custom() {
    assert!(Event::is_reserved_type("status_changed"));
    assert!(!Event::is_reserved_type("x_custom"));
}

#[test]
fn protected_fields_block_top_level_path_only() {
    assert!(is_protected_field(&["status".to_string()]));
    assert!(!is_protected_field(&["custom_fields".to_string(), "estimate".to_string()]));
}
