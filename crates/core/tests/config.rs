use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use decomprove_core::config::{
    ConfigError, ImproveConfig, DEFAULT_ENDPOINT_URL, DEFAULT_MODEL_ID, ENV_API_KEY,
    ENV_ENDPOINT_URL, ENV_MODEL, ENV_OUTPUT_DIR,
};
use tempfile::tempdir;

#[test]
fn defaults_point_at_deepseek() {
    let config = ImproveConfig::default();
    assert_eq!(config.endpoint_url, DEFAULT_ENDPOINT_URL);
    assert_eq!(config.model_id, DEFAULT_MODEL_ID);
    assert!(config.api_key.is_empty());
    assert!(config.default_output_folder.ends_with("GhidraDeepSeek"));
    assert!(config.request_timeout_secs.is_none());
}

#[test]
fn loads_partial_json_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("decomprove.json");
    fs::write(&path, r#"{"api_key":"sk-json","model_id":"custom-coder"}"#).unwrap();

    let config = ImproveConfig::from_file(&path).unwrap();
    assert_eq!(config.api_key, "sk-json");
    assert_eq!(config.model_id, "custom-coder");
    assert_eq!(config.endpoint_url, DEFAULT_ENDPOINT_URL);
}

#[test]
fn loads_yaml_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("decomprove.yaml");
    fs::write(
        &path,
        "endpoint_url: http://localhost:8080/v1/chat/completions\ndefault_output_folder: /tmp/out\nrequest_timeout_secs: 90\n",
    )
    .unwrap();

    let config = ImproveConfig::from_file(&path).unwrap();
    assert_eq!(config.endpoint_url, "http://localhost:8080/v1/chat/completions");
    assert_eq!(config.default_output_folder, PathBuf::from("/tmp/out"));
    assert_eq!(config.request_timeout_secs, Some(90));
}

#[test]
fn rejects_unknown_extension_and_bad_content() {
    let dir = tempdir().unwrap();
    let toml = dir.path().join("decomprove.toml");
    fs::write(&toml, "api_key = 'x'").unwrap();
    assert!(matches!(ImproveConfig::from_file(&toml), Err(ConfigError::UnsupportedFormat(_))));

    let bad = dir.path().join("bad.json");
    fs::write(&bad, "not-json").unwrap();
    assert!(matches!(ImproveConfig::from_file(&bad), Err(ConfigError::Parse { .. })));

    let missing = dir.path().join("missing.json");
    assert!(matches!(ImproveConfig::from_file(&missing), Err(ConfigError::Read { .. })));
}

#[test]
fn overrides_replace_non_empty_values_only() {
    let vars: HashMap<&str, &str> = [
        (ENV_API_KEY, "sk-env"),
        (ENV_ENDPOINT_URL, "http://127.0.0.1:9/v1"),
        (ENV_MODEL, "  "),
        (ENV_OUTPUT_DIR, "/srv/improved"),
    ]
    .into_iter()
    .collect();

    let mut config = ImproveConfig::default();
    config.apply_overrides(|key| vars.get(key).map(|v| v.to_string()));
    assert_eq!(config.api_key, "sk-env");
    assert_eq!(config.endpoint_url, "http://127.0.0.1:9/v1");
    assert_eq!(config.model_id, DEFAULT_MODEL_ID);
    assert_eq!(config.default_output_folder, PathBuf::from("/srv/improved"));
}

#[test]
fn redacted_masks_api_key() {
    let config = ImproveConfig { api_key: "sk-1234567890abcd".into(), ..Default::default() };
    assert_eq!(config.redacted().api_key, "****abcd");

    let short = ImproveConfig { api_key: "abc".into(), ..Default::default() };
    assert_eq!(short.redacted().api_key, "****");

    assert_eq!(ImproveConfig::default().redacted().api_key, "");
}
