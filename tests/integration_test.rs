use nexus::config::{Config, DEFAULT_API_URL, DEFAULT_RENDER_DEBOUNCE};
use nexus::types::{ContentKind, InstructionProfile};

#[test]
fn test_config_validation_requires_api_key_for_remote_service() {
    let config = Config {
        api_key: None,
        ..Config::default()
    };

    let error = config.validate().expect_err("remote endpoint without key");
    assert!(error.to_string().contains("GEMINI_API_KEY"));
}

#[test]
fn test_config_validation_allows_local_endpoint_without_api_key() {
    let config = Config {
        api_key: None,
        api_url: "http://localhost:8080/v1beta".to_string(),
        ..Config::default()
    };

    assert!(config.is_local_endpoint());
    assert!(config.validate().is_ok());
}

#[test]
fn test_config_validation_rejects_out_of_range_temperature() {
    let config = Config {
        api_key: Some("test-key".to_string()),
        temperature: 3.5,
        ..Config::default()
    };

    assert!(config.validate().is_err());
}

#[test]
fn test_default_config_targets_gemini_with_structured_ui() {
    let config = Config::default();

    assert_eq!(config.api_url, DEFAULT_API_URL);
    assert_eq!(config.render_debounce, DEFAULT_RENDER_DEBOUNCE);
    assert_eq!(config.profile, InstructionProfile::ReactTs);
    assert_eq!(config.profile.content_kind(), ContentKind::StructuredUi);
}
