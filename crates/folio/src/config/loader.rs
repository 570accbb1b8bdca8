use std::collections::HashSet;
use std::path::{Path, PathBuf};

use reqwest::Url;

use crate::config::schema::{
    Config, ContentProvider, DeploymentProvider, StorageProvider, CONFIG_VERSION,
};
use crate::error::ConfigError;
use crate::template::TemplateCatalog;

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source: e,
    })?;

    load_config_from_str(&content)
}

pub fn load_config_from_str(content: &str) -> Result<Config, ConfigError> {
    let config: Config = serde_json::from_str(content)?;

    validate_config(&config)?;

    Ok(config)
}

/// `<config_dir>/folio/config.json`, e.g. `~/.config/folio/config.json`.
pub fn default_config_path() -> Result<PathBuf, ConfigError> {
    dirs::config_dir()
        .map(|dir| dir.join("folio").join("config.json"))
        .ok_or(ConfigError::NoConfigDirectory)
}

/// Loads `path` if given, else the default location if it exists, else the
/// built-in defaults.
pub fn load_config_or_default(path: Option<&Path>) -> Result<Config, ConfigError> {
    if let Some(path) = path {
        return load_config(path);
    }
    match default_config_path() {
        Ok(default) if default.exists() => load_config(default),
        _ => Ok(Config::default()),
    }
}

fn invalid(message: impl Into<String>) -> ConfigError {
    ConfigError::Validation {
        message: message.into(),
    }
}

fn validate_url(field: &str, value: &str) -> Result<(), ConfigError> {
    let url = Url::parse(value).map_err(|e| invalid(format!("{} '{}': {}", field, value, e)))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!(
            "{} must use http or https, got '{}'",
            field,
            url.scheme()
        )));
    }
    Ok(())
}

pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.version != CONFIG_VERSION {
        return Err(invalid(format!(
            "Unsupported config version: {}",
            config.version
        )));
    }

    let content = &config.content;
    if content.provider == ContentProvider::Openai {
        validate_url("content.base_url", &content.base_url)?;
        if content.model.trim().is_empty() {
            return Err(invalid("content.model must not be empty"));
        }
    }
    if content.max_tokens == 0 {
        return Err(invalid("content.max_tokens must be greater than 0"));
    }
    if !(0.0..=2.0).contains(&content.temperature) {
        return Err(invalid(format!(
            "content.temperature must be between 0 and 2, got {}",
            content.temperature
        )));
    }

    let storage = &config.storage;
    if storage.provider == StorageProvider::S3 {
        if storage.bucket.trim().is_empty() {
            return Err(invalid("storage.bucket must not be empty"));
        }
        if let Some(endpoint) = &storage.endpoint {
            validate_url("storage.endpoint", endpoint)?;
        }
    }
    if let Some(base) = &storage.public_base_url {
        validate_url("storage.public_base_url", base)?;
    }

    let deployment = &config.deployment;
    if deployment.provider == DeploymentProvider::Vercel {
        validate_url("deployment.base_url", &deployment.base_url)?;
    }
    if deployment.poll_interval_ms == 0 {
        return Err(invalid("deployment.poll_interval_ms must be greater than 0"));
    }
    if deployment.timeout_ms < deployment.poll_interval_ms {
        return Err(invalid(format!(
            "deployment.timeout_ms ({}) must be at least poll_interval_ms ({})",
            deployment.timeout_ms, deployment.poll_interval_ms
        )));
    }

    if config.http.connect_timeout_secs == 0 || config.http.request_timeout_secs == 0 {
        return Err(invalid("http timeouts must be greater than 0"));
    }
    if config.pipeline.broadcast_capacity == 0 {
        return Err(invalid("pipeline.broadcast_capacity must be greater than 0"));
    }

    let mut ids = HashSet::new();
    for template in &config.templates {
        if template.id.trim().is_empty() {
            return Err(ConfigError::InvalidTemplate {
                id: template.id.clone(),
                reason: "Template ID must not be empty".to_string(),
            });
        }
        if !ids.insert(&template.id) {
            return Err(ConfigError::InvalidTemplate {
                id: template.id.clone(),
                reason: "Duplicate template ID".to_string(),
            });
        }
        if template.performance_score > 100 {
            return Err(ConfigError::InvalidTemplate {
                id: template.id.clone(),
                reason: format!(
                    "performance_score must be 0-100, got {}",
                    template.performance_score
                ),
            });
        }
    }

    let catalog = TemplateCatalog::with_overrides(config.templates.clone());
    if catalog.get(&config.pipeline.default_template).is_none() {
        return Err(ConfigError::InvalidTemplate {
            id: config.pipeline.default_template.clone(),
            reason: "pipeline.default_template is not in the catalog".to_string(),
        });
    }

    Ok(())
}
