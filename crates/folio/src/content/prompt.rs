use crate::job::{ProfileData, Project};

/// Which piece of content a prompt asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    Bio,
    SeoMetadata,
    ColorPalette,
    CallToAction,
    /// Description for the project at this index.
    ProjectDescription(usize),
}

/// Token budget and sampling temperature applied to every prompt.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PromptSettings {
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for PromptSettings {
    fn default() -> Self {
        Self {
            max_tokens: 500,
            temperature: 0.7,
        }
    }
}

/// Structured inputs behind a prompt, for generators that do not read
/// natural language.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PromptContext {
    pub name: String,
    pub title: String,
    pub bio: String,
    pub skills: Vec<String>,
    pub project: Option<Project>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Prompt {
    pub kind: PromptKind,
    pub system: String,
    pub user: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub context: PromptContext,
}

const SYSTEM_PROMPT: &str =
    "You are a professional copywriter who writes concise, engaging portfolio content.";

fn context_of(profile: &ProfileData) -> PromptContext {
    PromptContext {
        name: profile.name.clone(),
        title: profile.title.clone(),
        bio: profile.bio.clone(),
        skills: profile.skill_names(),
        project: None,
    }
}

impl Prompt {
    fn new(kind: PromptKind, user: String, context: PromptContext, settings: PromptSettings) -> Self {
        Self {
            kind,
            system: SYSTEM_PROMPT.to_string(),
            user,
            max_tokens: settings.max_tokens,
            temperature: settings.temperature,
            context,
        }
    }

    pub fn bio(profile: &ProfileData, settings: PromptSettings) -> Self {
        let user = format!(
            "Rewrite this bio for a professional portfolio in at most three sentences.\n\
             Name: {}\nTitle: {}\nSkills: {}\nCurrent bio: {}\n\
             Reply with the bio text only.",
            profile.name,
            profile.title,
            profile.skill_names().join(", "),
            profile.bio
        );
        Self::new(PromptKind::Bio, user, context_of(profile), settings)
    }

    pub fn seo_metadata(profile: &ProfileData, settings: PromptSettings) -> Self {
        let user = format!(
            "Write SEO metadata for the portfolio of {} ({}), skilled in {}.\n\
             Reply with JSON only: {{\"title\": string, \"description\": string, \"keywords\": [string]}}",
            profile.name,
            profile.title,
            profile.skill_names().join(", ")
        );
        Self::new(PromptKind::SeoMetadata, user, context_of(profile), settings)
    }

    pub fn color_palette(profile: &ProfileData, settings: PromptSettings) -> Self {
        let user = format!(
            "Suggest a color palette for the portfolio of a {} skilled in {}.\n\
             Reply with JSON only, hex colors: {{\"primary\", \"secondary\", \"accent\", \"background\", \"text\"}}",
            profile.title,
            profile.skill_names().join(", ")
        );
        Self::new(PromptKind::ColorPalette, user, context_of(profile), settings)
    }

    pub fn call_to_action(profile: &ProfileData, settings: PromptSettings) -> Self {
        let user = format!(
            "Write a call to action inviting visitors to contact {} ({}).\n\
             Reply with JSON only: {{\"headline\": string, \"buttonLabel\": string}}",
            profile.name, profile.title
        );
        Self::new(PromptKind::CallToAction, user, context_of(profile), settings)
    }

    pub fn project_description(
        profile: &ProfileData,
        index: usize,
        project: &Project,
        settings: PromptSettings,
    ) -> Self {
        let user = format!(
            "Improve this project description in two sentences.\n\
             Project: {}\nTechnologies: {}\nDescription: {}\n\
             Reply with the description text only.",
            project.title,
            project.technologies.join(", "),
            project.description
        );
        let mut context = context_of(profile);
        context.project = Some(project.clone());
        Self::new(PromptKind::ProjectDescription(index), user, context, settings)
    }
}
