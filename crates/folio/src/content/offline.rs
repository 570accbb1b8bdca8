//! Keyword-based content generator that never leaves the process.
//!
//! Used for dry runs and tests. Output depends only on the prompt, so the
//! same profile always produces the same content.

use async_trait::async_trait;
use serde_json::json;

use super::{ContentError, ContentGenerator, Prompt, PromptContext, PromptKind};

struct PalettePattern {
    keywords: &'static [&'static str],
    colors: [&'static str; 5],
}

/// First pattern with a keyword found in any skill wins.
const PALETTES: &[PalettePattern] = &[
    PalettePattern {
        keywords: &["rust", "go", "c++", "systems", "kubernetes"],
        colors: ["#1c1917", "#44403c", "#f97316", "#fafaf9", "#1c1917"],
    },
    PalettePattern {
        keywords: &["react", "vue", "angular", "javascript", "typescript", "node"],
        colors: ["#0f172a", "#334155", "#38bdf8", "#f8fafc", "#0f172a"],
    },
    PalettePattern {
        keywords: &["python", "data", "machine learning", "sql"],
        colors: ["#14532d", "#166534", "#facc15", "#f7fee7", "#052e16"],
    },
    PalettePattern {
        keywords: &["figma", "design", "ux", "ui", "illustrator"],
        colors: ["#18181b", "#71717a", "#ec4899", "#fdf2f8", "#18181b"],
    },
];

#[derive(Debug, Clone, Default)]
pub struct OfflineContentGenerator;

impl OfflineContentGenerator {
    pub fn new() -> Self {
        Self
    }

    fn bio(ctx: &PromptContext) -> String {
        if !ctx.bio.trim().is_empty() {
            return ctx.bio.trim().to_string();
        }
        let role = if ctx.title.trim().is_empty() {
            "professional"
        } else {
            ctx.title.trim()
        };
        match ctx.skills.as_slice() {
            [] => format!("{} ({}).", ctx.name, role),
            skills => format!(
                "{} ({}) works with {}.",
                ctx.name,
                role,
                skills.iter().take(3).cloned().collect::<Vec<_>>().join(", ")
            ),
        }
    }

    fn seo(ctx: &PromptContext) -> String {
        let title = if ctx.title.trim().is_empty() {
            format!("{} | Portfolio", ctx.name)
        } else {
            format!("{} | {}", ctx.name, ctx.title.trim())
        };
        json!({
            "title": title,
            "description": Self::bio(ctx),
            "keywords": ctx.skills.iter().map(|s| s.to_lowercase()).collect::<Vec<_>>(),
        })
        .to_string()
    }

    fn palette(ctx: &PromptContext) -> String {
        let skills: Vec<String> = ctx.skills.iter().map(|s| s.to_lowercase()).collect();
        let matched = PALETTES.iter().find(|p| {
            p.keywords
                .iter()
                .any(|k| skills.iter().any(|s| s == k || (k.len() >= 4 && s.contains(k))))
        });
        match matched {
            Some(pattern) => {
                let [primary, secondary, accent, background, text] = pattern.colors;
                json!({
                    "primary": primary,
                    "secondary": secondary,
                    "accent": accent,
                    "background": background,
                    "text": text,
                })
                .to_string()
            }
            // No opinion: the template palette stays.
            None => "{}".to_string(),
        }
    }

    fn call_to_action(ctx: &PromptContext) -> String {
        let first_name = ctx.name.split_whitespace().next().unwrap_or("me");
        json!({
            "headline": format!("Let's build something together with {}", first_name),
            "buttonLabel": "Get in touch",
        })
        .to_string()
    }

    fn project_description(ctx: &PromptContext) -> String {
        let Some(project) = &ctx.project else {
            return String::new();
        };
        let description = project.description.trim();
        match (description.is_empty(), project.technologies.is_empty()) {
            (false, true) => description.to_string(),
            (false, false) => format!(
                "{}. Built with {}.",
                description.trim_end_matches('.'),
                project.technologies.join(", ")
            ),
            (true, false) => format!(
                "{} is built with {}.",
                project.title,
                project.technologies.join(", ")
            ),
            (true, true) => project.title.clone(),
        }
    }
}

#[async_trait]
impl ContentGenerator for OfflineContentGenerator {
    async fn complete(&self, prompt: &Prompt) -> Result<String, ContentError> {
        let ctx = &prompt.context;
        Ok(match prompt.kind {
            PromptKind::Bio => Self::bio(ctx),
            PromptKind::SeoMetadata => Self::seo(ctx),
            PromptKind::ColorPalette => Self::palette(ctx),
            PromptKind::CallToAction => Self::call_to_action(ctx),
            PromptKind::ProjectDescription(_) => Self::project_description(ctx),
        })
    }
}
