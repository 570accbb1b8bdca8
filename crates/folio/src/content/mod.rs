//! AI-assisted content enhancement.
//!
//! A [`ContentGenerator`] turns one [`Prompt`] into text. The
//! [`ContentEnhancer`] builds the prompts for a profile, runs them
//! concurrently and assembles the answers into [`EnhancedContent`].

pub mod enhancer;
pub mod offline;
pub mod openai;
pub mod prompt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::template::ColorPalette;

pub use enhancer::ContentEnhancer;
pub use offline::OfflineContentGenerator;
pub use openai::OpenAiContentGenerator;
pub use prompt::{Prompt, PromptContext, PromptKind, PromptSettings};

#[derive(Debug, Error)]
pub enum ContentError {
    #[error("OpenAI API error: {message}")]
    Api {
        status: Option<u16>,
        message: String,
    },

    #[error("OpenAI API error: rate limited: {message}")]
    RateLimited { message: String },

    #[error("OpenAI API error: malformed response: {0}")]
    MalformedResponse(String),

    #[error("Failed to build HTTP client: {0}")]
    ClientSetup(String),

    #[error("Content generation failed: {0}")]
    Generation(String),
}

impl From<reqwest::Error> for ContentError {
    fn from(e: reqwest::Error) -> Self {
        ContentError::Api {
            status: e.status().map(|s| s.as_u16()),
            message: e.without_url().to_string(),
        }
    }
}

/// Produces a completion for a single prompt.
#[async_trait]
pub trait ContentGenerator: Send + Sync {
    async fn complete(&self, prompt: &Prompt) -> Result<String, ContentError>;
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SeoMetadata {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CallToAction {
    pub headline: String,
    pub button_label: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProjectCopy {
    pub title: String,
    pub description: String,
}

/// Everything the content step hands to the asset builder.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EnhancedContent {
    pub bio: String,
    pub seo: SeoMetadata,
    /// Suggested palette; `None` keeps the template's own.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub palette: Option<ColorPalette>,
    pub call_to_action: CallToAction,
    #[serde(default)]
    pub projects: Vec<ProjectCopy>,
}
