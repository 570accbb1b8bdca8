use std::sync::{Arc, LazyLock};

use futures_util::future::try_join_all;
use regex::Regex;
use serde::Deserialize;
use tracing::{debug, warn};

use super::{
    CallToAction, ContentError, ContentGenerator, EnhancedContent, ProjectCopy, Prompt,
    PromptSettings, SeoMetadata,
};
use crate::job::ProfileData;
use crate::template::ColorPalette;

static RE_HEX_COLOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#(?:[0-9a-fA-F]{3}|[0-9a-fA-F]{6})$").unwrap());

/// Runs all content prompts for a profile against one generator.
#[derive(Clone)]
pub struct ContentEnhancer {
    generator: Arc<dyn ContentGenerator>,
    settings: PromptSettings,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CtaReply {
    headline: String,
    #[serde(alias = "button", alias = "button_label")]
    button_label: String,
}

impl ContentEnhancer {
    pub fn new(generator: Arc<dyn ContentGenerator>, settings: PromptSettings) -> Self {
        Self {
            generator,
            settings,
        }
    }

    /// Generates bio, SEO metadata, palette, call to action and one
    /// description per project concurrently. The first failure aborts the
    /// batch.
    pub async fn enhance(&self, profile: &ProfileData) -> Result<EnhancedContent, ContentError> {
        let settings = self.settings;
        let bio_prompt = Prompt::bio(profile, settings);
        let seo_prompt = Prompt::seo_metadata(profile, settings);
        let palette_prompt = Prompt::color_palette(profile, settings);
        let cta_prompt = Prompt::call_to_action(profile, settings);
        let project_prompts: Vec<Prompt> = profile
            .projects
            .iter()
            .enumerate()
            .map(|(i, p)| Prompt::project_description(profile, i, p, settings))
            .collect();

        debug!(
            prompts = 4 + project_prompts.len(),
            "Running content generation batch"
        );

        let (bio, seo, palette, cta, descriptions) = tokio::try_join!(
            self.generator.complete(&bio_prompt),
            self.generator.complete(&seo_prompt),
            self.generator.complete(&palette_prompt),
            self.generator.complete(&cta_prompt),
            try_join_all(project_prompts.iter().map(|p| self.generator.complete(p))),
        )?;

        Ok(EnhancedContent {
            bio: parse_bio(&bio, profile),
            seo: parse_seo(&seo, profile),
            palette: parse_palette(&palette),
            call_to_action: parse_call_to_action(&cta),
            projects: profile
                .projects
                .iter()
                .zip(descriptions)
                .map(|(project, description)| ProjectCopy {
                    title: project.title.clone(),
                    description: if description.trim().is_empty() {
                        project.description.clone()
                    } else {
                        description.trim().to_string()
                    },
                })
                .collect(),
        })
    }
}

/// Slice from the first `{` to the last `}`; models like to wrap JSON in prose
/// or code fences.
fn extract_json(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    (end > start).then(|| &raw[start..=end])
}

fn parse_bio(raw: &str, profile: &ProfileData) -> String {
    let trimmed = raw.trim().trim_matches('"').trim();
    if !trimmed.is_empty() {
        return trimmed.to_string();
    }
    if !profile.bio.trim().is_empty() {
        return profile.bio.trim().to_string();
    }
    format!("{} - {}", profile.name, profile.title)
}

fn default_seo(profile: &ProfileData) -> SeoMetadata {
    let title = if profile.title.trim().is_empty() {
        format!("{} | Portfolio", profile.name)
    } else {
        format!("{} | {}", profile.name, profile.title.trim())
    };
    let description = if profile.bio.trim().is_empty() {
        format!("Portfolio of {}", profile.name)
    } else {
        profile.bio.trim().to_string()
    };
    SeoMetadata {
        title,
        description,
        keywords: profile.skill_names(),
    }
}

fn parse_seo(raw: &str, profile: &ProfileData) -> SeoMetadata {
    match extract_json(raw).map(serde_json::from_str::<SeoMetadata>) {
        Some(Ok(seo)) if !seo.title.trim().is_empty() => seo,
        Some(Err(e)) => {
            warn!(error = %e, "Unparsable SEO metadata, using defaults");
            default_seo(profile)
        }
        _ => default_seo(profile),
    }
}

fn parse_palette(raw: &str) -> Option<ColorPalette> {
    let palette: ColorPalette = serde_json::from_str(extract_json(raw)?).ok()?;
    if palette.colors().iter().all(|c| RE_HEX_COLOR.is_match(c)) {
        Some(palette)
    } else {
        warn!("Palette suggestion contains invalid colors, keeping template palette");
        None
    }
}

fn parse_call_to_action(raw: &str) -> CallToAction {
    extract_json(raw)
        .and_then(|json| serde_json::from_str::<CtaReply>(json).ok())
        .map(|reply| CallToAction {
            headline: reply.headline,
            button_label: reply.button_label,
        })
        .unwrap_or_else(|| CallToAction {
            headline: "Let's work together".to_string(),
            button_label: "Get in touch".to_string(),
        })
}
