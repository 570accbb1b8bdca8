use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::FolioError;

static RE_DOMAIN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:[a-z0-9](?:[a-z0-9-]{0,61}[a-z0-9])?\.)+[a-z]{2,63}$").unwrap()
});

/// Input of a single generation job. Built once per call and never mutated
/// after the job is created.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    pub user_id: String,
    /// Explicit template choice; when absent the template is scored.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_id: Option<String>,
    pub profile: ProfileData,
    #[serde(default)]
    pub preferences: DeploymentPreferences,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileData {
    pub name: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default)]
    pub skills: Vec<Skill>,
    #[serde(default)]
    pub projects: Vec<Project>,
    #[serde(default)]
    pub experience: Vec<Experience>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Skill {
    pub name: String,
    /// Self-assessed proficiency, 0-100.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<u8>,
}

impl Skill {
    pub fn new(name: &str, level: u8) -> Self {
        Self {
            name: name.to_string(),
            level: Some(level),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub technologies: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Experience {
    pub company: String,
    pub role: String,
    #[serde(default)]
    pub period: String,
    #[serde(default)]
    pub summary: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentPreferences {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_domain: Option<String>,
    #[serde(default = "default_cdn_provider")]
    pub cdn_provider: String,
    #[serde(default)]
    pub analytics: bool,
}

fn default_cdn_provider() -> String {
    "vercel".to_string()
}

impl Default for DeploymentPreferences {
    fn default() -> Self {
        Self {
            custom_domain: None,
            cdn_provider: default_cdn_provider(),
            analytics: false,
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Invalid request: user id is required")]
    MissingUserId,

    #[error("Invalid request: profile name is required")]
    MissingName,

    #[error("Invalid request: skill '{name}' has level {level}, expected 0-100")]
    SkillLevelOutOfRange { name: String, level: u8 },

    #[error("Invalid request: '{0}' is not a valid domain name")]
    InvalidDomain(String),
}

impl GenerationRequest {
    /// Reads a camelCase JSON request from disk. Does not validate.
    pub fn from_file<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| FolioError::ReadRequest {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> crate::Result<Self> {
        serde_json::from_str(content).map_err(FolioError::ParseRequest)
    }

    pub fn new(user_id: &str, profile: ProfileData) -> Self {
        Self {
            user_id: user_id.to_string(),
            template_id: None,
            profile,
            preferences: DeploymentPreferences::default(),
        }
    }

    /// Checks the fields the pipeline relies on. Runs before any vendor call.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.user_id.trim().is_empty() {
            return Err(ValidationError::MissingUserId);
        }
        if self.profile.name.trim().is_empty() {
            return Err(ValidationError::MissingName);
        }
        for skill in &self.profile.skills {
            if let Some(level) = skill.level {
                if level > 100 {
                    return Err(ValidationError::SkillLevelOutOfRange {
                        name: skill.name.clone(),
                        level,
                    });
                }
            }
        }
        if let Some(domain) = &self.preferences.custom_domain {
            if !RE_DOMAIN.is_match(&domain.to_lowercase()) {
                return Err(ValidationError::InvalidDomain(domain.clone()));
            }
        }
        Ok(())
    }
}

impl ProfileData {
    /// Mean of the declared skill levels. Skills without a level are ignored;
    /// a profile with no levelled skills averages 0.
    pub fn average_skill_level(&self) -> f64 {
        let levels: Vec<f64> = self
            .skills
            .iter()
            .filter_map(|s| s.level.map(f64::from))
            .collect();
        if levels.is_empty() {
            return 0.0;
        }
        levels.iter().sum::<f64>() / levels.len() as f64
    }

    pub fn skill_names(&self) -> Vec<String> {
        self.skills.iter().map(|s| s.name.clone()).collect()
    }

    /// Initials used for placeholder avatars ("Ada Lovelace" -> "AL").
    pub fn initials(&self) -> String {
        let initials: String = self
            .name
            .split_whitespace()
            .filter_map(|part| part.chars().next())
            .take(2)
            .flat_map(|c| c.to_uppercase())
            .collect();
        if initials.is_empty() {
            "?".to_string()
        } else {
            initials
        }
    }
}
