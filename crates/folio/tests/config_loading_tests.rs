//! Table-driven tests for configuration loading and validation, plus secret
//! resolution when the pipeline is assembled from a config.

use std::io::Write;

use serial_test::serial;
use tempfile::NamedTempFile;

use folio::config::{
    load_config, load_config_from_str, load_config_or_default, ContentProvider,
    DeploymentProvider, LogFormat, StorageProvider,
};
use folio::{ConfigError, FolioError, GenerationService, Pipeline, PipelineComponents};

/// Represents a single config loading test case.
struct ConfigTestCase {
    /// Test case name for identification.
    name: &'static str,
    /// The config JSON content to test.
    config_json: &'static str,
    /// Whether loading should succeed.
    should_succeed: bool,
    /// Expected error substring (if should_succeed is false).
    expected_error: Option<&'static str>,
}

const JSON_CONFIG_TESTS: &[ConfigTestCase] = &[
    ConfigTestCase {
        name: "valid_minimal",
        config_json: r#"{ "version": "1.0" }"#,
        should_succeed: true,
        expected_error: None,
    },
    ConfigTestCase {
        name: "valid_full",
        config_json: r#"{
            "version": "1.0",
            "content": {
                "provider": "openai",
                "base_url": "https://api.openai.com/v1",
                "model": "gpt-4o-mini",
                "api_key": { "env": "OPENAI_API_KEY" },
                "max_tokens": 300,
                "temperature": 0.2
            },
            "storage": {
                "provider": "s3",
                "bucket": "portfolios",
                "region": "eu-central-1",
                "endpoint": "http://localhost:9000",
                "public_base_url": "https://cdn.example.com",
                "access_key_id": { "value": "minio" },
                "secret_access_key": { "file": "/run/secrets/minio" }
            },
            "deployment": {
                "provider": "vercel",
                "base_url": "https://api.vercel.com",
                "token": { "env": "VERCEL_TOKEN" },
                "team_id": "team_123",
                "poll_interval_ms": 2000,
                "timeout_ms": 120000,
                "regions": ["fra1", "iad1"]
            },
            "pipeline": {
                "default_template": "developer-starter",
                "estimated_time_secs": 90,
                "status_base_url": "https://folio.example.com/status",
                "broadcast_capacity": 16,
                "recommendations": 5
            },
            "http": { "connect_timeout_secs": 5, "request_timeout_secs": 60 },
            "logging": { "level": "folio=debug", "format": "json" }
        }"#,
        should_succeed: true,
        expected_error: None,
    },
    ConfigTestCase {
        name: "valid_offline_ignores_vendor_urls",
        config_json: r#"{
            "version": "1.0",
            "content": { "provider": "offline", "base_url": "" },
            "storage": { "provider": "memory", "bucket": "" },
            "deployment": { "provider": "simulated", "base_url": "nope" }
        }"#,
        should_succeed: true,
        expected_error: None,
    },
    ConfigTestCase {
        name: "valid_custom_default_template",
        config_json: r#"{
            "version": "1.0",
            "pipeline": { "default_template": "house-style" },
            "templates": [{
                "id": "house-style", "name": "House Style", "category": "business",
                "complexity": "intermediate", "features": ["grid"], "performance_score": 88
            }]
        }"#,
        should_succeed: true,
        expected_error: None,
    },
    ConfigTestCase {
        name: "invalid_version",
        config_json: r#"{ "version": "0.9" }"#,
        should_succeed: false,
        expected_error: Some("Unsupported config version: 0.9"),
    },
    ConfigTestCase {
        name: "invalid_missing_version",
        config_json: r#"{ "content": { "provider": "offline" } }"#,
        should_succeed: false,
        expected_error: Some("version"),
    },
    ConfigTestCase {
        name: "invalid_json",
        config_json: r#"{ "version": "1.0", "#,
        should_succeed: false,
        expected_error: Some("Failed to parse config JSON"),
    },
    ConfigTestCase {
        name: "invalid_provider",
        config_json: r#"{ "version": "1.0", "content": { "provider": "anthropic" } }"#,
        should_succeed: false,
        expected_error: Some("unknown variant"),
    },
    ConfigTestCase {
        name: "invalid_openai_url",
        config_json: r#"{ "version": "1.0", "content": { "base_url": "not a url" } }"#,
        should_succeed: false,
        expected_error: Some("content.base_url"),
    },
    ConfigTestCase {
        name: "invalid_empty_model",
        config_json: r#"{ "version": "1.0", "content": { "model": "  " } }"#,
        should_succeed: false,
        expected_error: Some("content.model must not be empty"),
    },
    ConfigTestCase {
        name: "invalid_zero_max_tokens",
        config_json: r#"{ "version": "1.0", "content": { "max_tokens": 0 } }"#,
        should_succeed: false,
        expected_error: Some("max_tokens"),
    },
    ConfigTestCase {
        name: "invalid_empty_bucket",
        config_json: r#"{ "version": "1.0", "storage": { "bucket": "" } }"#,
        should_succeed: false,
        expected_error: Some("storage.bucket must not be empty"),
    },
    ConfigTestCase {
        name: "invalid_storage_endpoint_scheme",
        config_json: r#"{ "version": "1.0", "storage": { "endpoint": "s3://minio" } }"#,
        should_succeed: false,
        expected_error: Some("http or https"),
    },
    ConfigTestCase {
        name: "invalid_public_base_url_even_in_memory",
        config_json: r#"{
            "version": "1.0",
            "storage": { "provider": "memory", "public_base_url": "cdn" }
        }"#,
        should_succeed: false,
        expected_error: Some("storage.public_base_url"),
    },
    ConfigTestCase {
        name: "invalid_timeout_below_interval",
        config_json: r#"{
            "version": "1.0",
            "deployment": { "poll_interval_ms": 10000, "timeout_ms": 5000 }
        }"#,
        should_succeed: false,
        expected_error: Some("must be at least poll_interval_ms"),
    },
    ConfigTestCase {
        name: "invalid_zero_http_timeout",
        config_json: r#"{ "version": "1.0", "http": { "request_timeout_secs": 0 } }"#,
        should_succeed: false,
        expected_error: Some("http timeouts"),
    },
    ConfigTestCase {
        name: "invalid_zero_broadcast_capacity",
        config_json: r#"{ "version": "1.0", "pipeline": { "broadcast_capacity": 0 } }"#,
        should_succeed: false,
        expected_error: Some("broadcast_capacity"),
    },
    ConfigTestCase {
        name: "invalid_template_empty_id",
        config_json: r#"{
            "version": "1.0",
            "templates": [{
                "id": " ", "name": "Blank", "category": "general",
                "complexity": "beginner", "performance_score": 80
            }]
        }"#,
        should_succeed: false,
        expected_error: Some("Template ID must not be empty"),
    },
    ConfigTestCase {
        name: "invalid_template_score",
        config_json: r#"{
            "version": "1.0",
            "templates": [{
                "id": "fast", "name": "Fast", "category": "general",
                "complexity": "beginner", "performance_score": 101
            }]
        }"#,
        should_succeed: false,
        expected_error: Some("performance_score must be 0-100"),
    },
    ConfigTestCase {
        name: "invalid_unknown_default_template",
        config_json: r#"{ "version": "1.0", "pipeline": { "default_template": "ghost" } }"#,
        should_succeed: false,
        expected_error: Some("Invalid template 'ghost'"),
    },
];

#[test]
fn test_json_config_loading() {
    for test_case in JSON_CONFIG_TESTS {
        let result = load_config_from_str(test_case.config_json);

        if test_case.should_succeed {
            assert!(
                result.is_ok(),
                "Test '{}': Expected success but got error: {:?}",
                test_case.name,
                result.err()
            );
        } else {
            assert!(
                result.is_err(),
                "Test '{}': Expected error but got success",
                test_case.name
            );

            if let Some(expected_error) = test_case.expected_error {
                let error_msg = result.err().unwrap().to_string();
                assert!(
                    error_msg.contains(expected_error),
                    "Test '{}': Expected error containing '{}', got '{}'",
                    test_case.name,
                    expected_error,
                    error_msg
                );
            }
        }
    }
}

#[test]
fn test_valid_config_field_values() {
    let config = load_config_from_str(JSON_CONFIG_TESTS[1].config_json).unwrap();

    assert_eq!(config.content.provider, ContentProvider::Openai);
    assert_eq!(config.content.model, "gpt-4o-mini");
    assert_eq!(config.content.max_tokens, 300);
    assert_eq!(config.storage.provider, StorageProvider::S3);
    assert_eq!(config.storage.public_base_url(), "https://cdn.example.com");
    assert_eq!(config.deployment.provider, DeploymentProvider::Vercel);
    assert_eq!(config.deployment.team_id.as_deref(), Some("team_123"));
    assert_eq!(config.deployment.regions, vec!["fra1", "iad1"]);
    assert_eq!(config.pipeline.recommendations, 5);
    assert_eq!(config.http.request_timeout_secs, 60);
    assert_eq!(config.logging.level, "folio=debug");
    assert_eq!(config.logging.format, LogFormat::Json);
}

#[test]
fn test_config_defaults_applied() {
    let config = load_config_from_str(r#"{ "version": "1.0" }"#).unwrap();

    assert_eq!(config.content.base_url, "https://api.openai.com/v1");
    assert_eq!(config.content.api_key.env.as_deref(), Some("OPENAI_API_KEY"));
    assert_eq!(config.storage.bucket, "folio-portfolios");
    assert_eq!(
        config.storage.public_base_url(),
        "https://folio-portfolios.s3.us-east-1.amazonaws.com"
    );
    assert_eq!(config.deployment.base_url, "https://api.vercel.com");
    assert_eq!(config.deployment.token.env.as_deref(), Some("VERCEL_TOKEN"));
    assert_eq!(config.deployment.regions, vec!["iad1"]);
    assert_eq!(config.pipeline.estimated_time_secs, 120);
    assert_eq!(config.pipeline.broadcast_capacity, 100);
    assert!(config.templates.is_empty());
}

#[test]
fn test_load_config_from_file() {
    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{ "version": "1.0", "content": {{ "provider": "offline" }} }}"#
    )
    .unwrap();

    let config = load_config(file.path()).unwrap();
    assert_eq!(config.content.provider, ContentProvider::Offline);

    let explicit = load_config_or_default(Some(file.path())).unwrap();
    assert_eq!(explicit.content.provider, ContentProvider::Offline);
}

#[test]
fn test_missing_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("absent.json");

    let err = load_config(&missing).unwrap_err();
    assert!(matches!(err, ConfigError::ReadFile { .. }));
    assert!(err.to_string().starts_with("Failed to read config file"));

    // An explicit path is never silently replaced by defaults.
    assert!(load_config_or_default(Some(missing.as_path())).is_err());
}

#[test]
fn test_template_override_replaces_builtin() {
    let config = load_config_from_str(
        r#"{
            "version": "1.0",
            "content": { "provider": "offline" },
            "storage": { "provider": "memory" },
            "deployment": { "provider": "simulated" },
            "templates": [{
                "id": "developer-pro", "name": "In-house Pro", "category": "developer",
                "complexity": "advanced", "features": ["grid"], "performance_score": 99
            }]
        }"#,
    )
    .unwrap();

    let pipeline = Pipeline::from_config(&config).unwrap();
    let template = pipeline.catalog().get("developer-pro").unwrap();
    assert_eq!(template.name, "In-house Pro");
    assert_eq!(template.performance_score, 99);
}

fn online_content_config(env_var: &str) -> folio::Config {
    let mut config = folio::Config::default().into_offline();
    config.content.provider = ContentProvider::Openai;
    config.content.api_key = folio::SecretSource::from_env(env_var);
    config
}

#[test]
#[serial]
fn test_api_key_resolved_from_env() {
    std::env::set_var("FOLIO_IT_OPENAI_KEY", "sk-test");

    let config = online_content_config("FOLIO_IT_OPENAI_KEY");
    assert!(PipelineComponents::from_config(&config).is_ok());
    assert!(GenerationService::from_config(&config).is_ok());

    std::env::remove_var("FOLIO_IT_OPENAI_KEY");
}

#[test]
#[serial]
fn test_missing_api_key_fails_before_any_job() {
    std::env::remove_var("FOLIO_IT_MISSING_KEY");

    let config = online_content_config("FOLIO_IT_MISSING_KEY");
    let err = match PipelineComponents::from_config(&config) {
        Ok(_) => panic!("expected a secret error"),
        Err(e) => e,
    };

    assert!(matches!(
        err,
        FolioError::Config(ConfigError::Secret { ref label, .. }) if label == "content.api_key"
    ));
    assert!(err
        .to_string()
        .contains("Environment variable 'FOLIO_IT_MISSING_KEY' not set"));
}

#[test]
#[serial]
fn test_deployment_token_read_from_file() {
    let mut token_file = NamedTempFile::new().unwrap();
    writeln!(token_file, "vercel-token").unwrap();

    let mut config = folio::Config::default().into_offline();
    config.deployment.provider = DeploymentProvider::Vercel;
    config.deployment.token = folio::SecretSource {
        file: Some(token_file.path().to_string_lossy().into_owned()),
        ..Default::default()
    };

    assert!(PipelineComponents::from_config(&config).is_ok());
}

#[test]
#[serial]
fn test_s3_credentials_required() {
    std::env::remove_var("FOLIO_IT_AWS_KEY");

    let mut config = folio::Config::default().into_offline();
    config.storage.provider = StorageProvider::S3;
    config.storage.access_key_id = folio::SecretSource::from_env("FOLIO_IT_AWS_KEY");
    config.storage.secret_access_key = folio::SecretSource::from_value("secret");

    let err = match PipelineComponents::from_config(&config) {
        Ok(_) => panic!("expected a secret error"),
        Err(e) => e,
    };
    assert!(err.to_string().contains("storage.access_key_id"));
}
