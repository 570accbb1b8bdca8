//! Portfolio templates: the catalog and the scoring used to pick one.

pub mod catalog;
pub mod selector;

use serde::{Deserialize, Serialize};

pub use catalog::{TemplateCatalog, FALLBACK_TEMPLATE_ID};
pub use selector::{
    infer_category, infer_complexity, preferred_feature, rank_templates, recommend_templates,
    score_template, select_optimal_template, ScoredTemplate, DEFAULT_RECOMMENDATIONS,
};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TemplateCategory {
    Developer,
    Designer,
    Business,
    General,
}

impl TemplateCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            TemplateCategory::Developer => "developer",
            TemplateCategory::Designer => "designer",
            TemplateCategory::Business => "business",
            TemplateCategory::General => "general",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Complexity {
    Beginner,
    Intermediate,
    Advanced,
}

impl Complexity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Complexity::Beginner => "beginner",
            Complexity::Intermediate => "intermediate",
            Complexity::Advanced => "advanced",
        }
    }
}

/// How projects are laid out on the page.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    #[default]
    Grid,
    Carousel,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ColorPalette {
    pub primary: String,
    pub secondary: String,
    pub accent: String,
    pub background: String,
    pub text: String,
}

impl Default for ColorPalette {
    fn default() -> Self {
        Self {
            primary: "#1f2937".to_string(),
            secondary: "#4b5563".to_string(),
            accent: "#2563eb".to_string(),
            background: "#ffffff".to_string(),
            text: "#111827".to_string(),
        }
    }
}

impl ColorPalette {
    pub fn colors(&self) -> [&str; 5] {
        [
            &self.primary,
            &self.secondary,
            &self.accent,
            &self.background,
            &self.text,
        ]
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Template {
    pub id: String,
    pub name: String,
    pub category: TemplateCategory,
    pub complexity: Complexity,
    /// Feature tags, e.g. `grid`, `carousel`, `dark-mode`.
    #[serde(default)]
    pub features: Vec<String>,
    /// Expected page-speed score of the bare template, 0-100.
    pub performance_score: u8,
    #[serde(default)]
    pub palette: ColorPalette,
    #[serde(default)]
    pub layout: Layout,
    #[serde(default = "default_font_family")]
    pub font_family: String,
}

fn default_font_family() -> String {
    "Inter".to_string()
}

impl Template {
    pub fn has_feature(&self, feature: &str) -> bool {
        self.features.iter().any(|f| f.eq_ignore_ascii_case(feature))
    }
}
