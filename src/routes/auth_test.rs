use super::*;

// =============================================================================
// env_bool — uses unique env var names to avoid races with parallel tests.
// =============================================================================

#[test]
fn env_bool_true_variants() {
    for (i, val) in ["1", "true", "yes", "on"].iter().enumerate() {
        let key = format!("__TEST_EB_TRUE_{i}__");
        unsafe { std::env::set_var(&key, val) };
        assert_eq!(env_bool(&key), Some(true), "expected true for {val:?}");
        unsafe { std::env::remove_var(&key) };
    }
}

#[test]
fn env_bool_false_variants() {
    for (i, val) in ["0", "false", "no", "off"].iter().enumerate() {
        let key = format!("__TEST_EB_FALSE_{i}__");
        unsafe { std::env::set_var(&key, val) };
        assert_eq!(env_bool(&key), Some(false), "expected false for {val:?}");
        unsafe { std::env::remove_var(&key) };
    }
}

#[test]
fn env_bool_case_insensitive_and_trimmed() {
    let key = "__TEST_EB_CI_77__";
    unsafe { std::env::set_var(key, "  TRUE  ") };
    assert_eq!(env_bool(key), Some(true));
    unsafe { std::env::remove_var(key) };
}

#[test]
fn env_bool_invalid_returns_none() {
    let key = "__TEST_EB_INVALID_314__";
    unsafe { std::env::set_var(key, "maybe") };
    assert_eq!(env_bool(key), None);
    unsafe { std::env::remove_var(key) };
}

#[test]
fn env_bool_unset_returns_none() {
    assert_eq!(env_bool("__TEST_EB_SURELY_UNSET_XYZ_9__"), None);
}

// =============================================================================
// credential_field_errors — the inline messages the login form renders.
// =============================================================================

#[test]
fn valid_credentials_produce_no_errors() {
    let errors = credential_field_errors("vendor@example.com", "secret1");
    assert!(errors.is_empty());
}

#[test]
fn malformed_email_flags_email_field_only() {
    let errors = credential_field_errors("not-an-email", "secret1");
    assert!(errors.contains_key("email"));
    assert!(!errors.contains_key("password"));
}

#[test]
fn short_password_flags_password_field_only() {
    let errors = credential_field_errors("vendor@example.com", "nope");
    assert!(!errors.contains_key("email"));
    assert_eq!(
        errors.get("password").and_then(|v| v.as_str()),
        Some("password must be at least 6 characters")
    );
}

#[test]
fn both_fields_can_fail_at_once() {
    let errors = credential_field_errors("", "");
    assert_eq!(errors.len(), 2);
}

// =============================================================================
// Cookie construction
// =============================================================================

#[test]
fn session_cookie_is_http_only_lax() {
    let cookie = session_cookie("abc123".into());
    assert_eq!(cookie.name(), "session_token");
    assert_eq!(cookie.value(), "abc123");
    assert_eq!(cookie.http_only(), Some(true));
    assert_eq!(cookie.path(), Some("/"));
}

#[test]
fn clear_cookie_expires_immediately() {
    let cookie = clear_session_cookie();
    assert_eq!(cookie.value(), "");
    assert_eq!(cookie.max_age(), Some(Duration::ZERO));
}
