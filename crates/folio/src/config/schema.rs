use serde::{Deserialize, Serialize};

use crate::secrets::SecretSource;
use crate::template::{Template, FALLBACK_TEMPLATE_ID};

pub const CONFIG_VERSION: &str = "1.0";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub version: String,
    #[serde(default)]
    pub content: ContentConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub deployment: DeploymentConfig,
    #[serde(default)]
    pub pipeline: PipelineSettings,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Extra templates; an entry with a builtin id replaces the builtin.
    #[serde(default)]
    pub templates: Vec<Template>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION.to_string(),
            content: ContentConfig::default(),
            storage: StorageConfig::default(),
            deployment: DeploymentConfig::default(),
            pipeline: PipelineSettings::default(),
            http: HttpConfig::default(),
            logging: LoggingConfig::default(),
            templates: vec![],
        }
    }
}

impl Config {
    /// Switches every vendor to its offline counterpart.
    pub fn into_offline(mut self) -> Self {
        self.content.provider = ContentProvider::Offline;
        self.storage.provider = StorageProvider::Memory;
        self.deployment.provider = DeploymentProvider::Simulated;
        self
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ContentProvider {
    #[default]
    Openai,
    Offline,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentConfig {
    #[serde(default)]
    pub provider: ContentProvider,
    #[serde(default = "default_openai_base_url")]
    pub base_url: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_openai_key")]
    pub api_key: SecretSource,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

fn default_openai_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_model() -> String {
    "gpt-4".to_string()
}

fn default_openai_key() -> SecretSource {
    SecretSource::from_env("OPENAI_API_KEY")
}

fn default_max_tokens() -> u32 {
    500
}

fn default_temperature() -> f32 {
    0.7
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            provider: ContentProvider::default(),
            base_url: default_openai_base_url(),
            model: default_model(),
            api_key: default_openai_key(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageProvider {
    #[default]
    S3,
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub provider: StorageProvider,
    #[serde(default = "default_bucket")]
    pub bucket: String,
    #[serde(default = "default_region")]
    pub region: String,
    /// Custom endpoint for S3-compatible stores.
    #[serde(default)]
    pub endpoint: Option<String>,
    /// Base of public object URLs. Defaults to the virtual-hosted S3 URL.
    #[serde(default)]
    pub public_base_url: Option<String>,
    #[serde(default = "default_access_key_id")]
    pub access_key_id: SecretSource,
    #[serde(default = "default_secret_access_key")]
    pub secret_access_key: SecretSource,
}

fn default_bucket() -> String {
    "folio-portfolios".to_string()
}

fn default_region() -> String {
    "us-east-1".to_string()
}

fn default_access_key_id() -> SecretSource {
    SecretSource::from_env("AWS_ACCESS_KEY_ID")
}

fn default_secret_access_key() -> SecretSource {
    SecretSource::from_env("AWS_SECRET_ACCESS_KEY")
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            provider: StorageProvider::default(),
            bucket: default_bucket(),
            region: default_region(),
            endpoint: None,
            public_base_url: None,
            access_key_id: default_access_key_id(),
            secret_access_key: default_secret_access_key(),
        }
    }
}

impl StorageConfig {
    pub fn public_base_url(&self) -> String {
        match &self.public_base_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => format!("https://{}.s3.{}.amazonaws.com", self.bucket, self.region),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum DeploymentProvider {
    #[default]
    Vercel,
    Simulated,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeploymentConfig {
    #[serde(default)]
    pub provider: DeploymentProvider,
    #[serde(default = "default_vercel_base_url")]
    pub base_url: String,
    #[serde(default = "default_vercel_token")]
    pub token: SecretSource,
    #[serde(default)]
    pub team_id: Option<String>,
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    #[serde(default = "default_deploy_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default = "default_regions")]
    pub regions: Vec<String>,
    /// Polls the simulated target reports BUILDING before READY.
    #[serde(default = "default_simulated_polls")]
    pub simulated_polls: u32,
}

fn default_vercel_base_url() -> String {
    "https://api.vercel.com".to_string()
}

fn default_vercel_token() -> SecretSource {
    SecretSource::from_env("VERCEL_TOKEN")
}

fn default_poll_interval_ms() -> u64 {
    5_000
}

fn default_deploy_timeout_ms() -> u64 {
    300_000
}

fn default_regions() -> Vec<String> {
    vec!["iad1".to_string()]
}

fn default_simulated_polls() -> u32 {
    2
}

impl Default for DeploymentConfig {
    fn default() -> Self {
        Self {
            provider: DeploymentProvider::default(),
            base_url: default_vercel_base_url(),
            token: default_vercel_token(),
            team_id: None,
            poll_interval_ms: default_poll_interval_ms(),
            timeout_ms: default_deploy_timeout_ms(),
            regions: default_regions(),
            simulated_polls: default_simulated_polls(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineSettings {
    /// Template used when an explicit id is unknown and scoring yields nothing.
    #[serde(default = "default_template")]
    pub default_template: String,
    #[serde(default = "default_estimated_time_secs")]
    pub estimated_time_secs: u64,
    /// Prefix of the status URL handed back to callers.
    #[serde(default = "default_status_base_url")]
    pub status_base_url: String,
    #[serde(default = "default_broadcast_capacity")]
    pub broadcast_capacity: usize,
    #[serde(default = "default_recommendations")]
    pub recommendations: usize,
}

fn default_template() -> String {
    FALLBACK_TEMPLATE_ID.to_string()
}

fn default_estimated_time_secs() -> u64 {
    120
}

fn default_status_base_url() -> String {
    "/api/portfolio/status".to_string()
}

fn default_broadcast_capacity() -> usize {
    100
}

fn default_recommendations() -> usize {
    crate::template::DEFAULT_RECOMMENDATIONS
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            default_template: default_template(),
            estimated_time_secs: default_estimated_time_secs(),
            status_base_url: default_status_base_url(),
            broadcast_capacity: default_broadcast_capacity(),
            recommendations: default_recommendations(),
        }
    }
}

/// Timeouts applied to every vendor HTTP call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_request_timeout_secs() -> u64 {
    30
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: default_connect_timeout_secs(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}
