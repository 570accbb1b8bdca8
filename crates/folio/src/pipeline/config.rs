use crate::config::Config;
use crate::content::PromptSettings;
use crate::deploy::DeployerSettings;

pub struct PipelineConfig {
    pub prompt: PromptSettings,
    pub deployer: DeployerSettings,
    /// Template used when neither an explicit id nor scoring picks one.
    pub default_template: String,
    pub recommendations: usize,
}

impl PipelineConfig {
    pub fn from_config(config: &Config) -> Self {
        Self {
            prompt: PromptSettings {
                max_tokens: config.content.max_tokens,
                temperature: config.content.temperature,
            },
            deployer: DeployerSettings::from(&config.deployment),
            default_template: config.pipeline.default_template.clone(),
            recommendations: config.pipeline.recommendations,
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}
