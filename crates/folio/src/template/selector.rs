//! Profile-driven template scoring.
//!
//! A template scores up to 100 points: 40 for matching the category inferred
//! from the skills, 25 for matching the complexity inferred from the average
//! skill level, 20 for carrying the preferred layout feature and 15 for a
//! performance score of at least 90.

use serde::Serialize;

use super::{Complexity, Template, TemplateCategory};
use crate::job::ProfileData;

pub const CATEGORY_WEIGHT: u32 = 40;
pub const COMPLEXITY_WEIGHT: u32 = 25;
pub const FEATURE_WEIGHT: u32 = 20;
pub const PERFORMANCE_WEIGHT: u32 = 15;
pub const PERFORMANCE_THRESHOLD: u8 = 90;

pub const DEFAULT_RECOMMENDATIONS: usize = 3;

/// Projects above this count prefer a carousel layout.
const CAROUSEL_PROJECT_THRESHOLD: usize = 5;

struct CategoryKeywords {
    category: TemplateCategory,
    keywords: &'static [&'static str],
}

/// Checked in order; the first category with the most hits wins.
const CATEGORY_KEYWORDS: &[CategoryKeywords] = &[
    CategoryKeywords {
        category: TemplateCategory::Developer,
        keywords: &[
            "react",
            "node",
            "javascript",
            "typescript",
            "python",
            "rust",
            "java",
            "go",
            "golang",
            "sql",
            "docker",
            "kubernetes",
            "aws",
            "vue",
            "angular",
            "django",
            "rails",
            "c++",
            "c#",
            "swift",
            "kotlin",
        ],
    },
    CategoryKeywords {
        category: TemplateCategory::Designer,
        keywords: &[
            "figma",
            "photoshop",
            "illustrator",
            "sketch",
            "ui",
            "ux",
            "design",
            "typography",
            "branding",
            "animation",
        ],
    },
    CategoryKeywords {
        category: TemplateCategory::Business,
        keywords: &[
            "marketing",
            "sales",
            "management",
            "strategy",
            "finance",
            "leadership",
            "consulting",
            "accounting",
            "negotiation",
        ],
    },
];

/// Short keywords must match the whole skill name; longer ones may appear
/// anywhere in it ("Node.js" contains "node").
fn keyword_matches(skill: &str, keyword: &str) -> bool {
    if keyword.len() >= 4 {
        skill.contains(keyword)
    } else {
        skill == keyword
    }
}

pub fn infer_category(profile: &ProfileData) -> TemplateCategory {
    let skills: Vec<String> = profile
        .skills
        .iter()
        .map(|s| s.name.trim().to_lowercase())
        .collect();

    let mut best = TemplateCategory::General;
    let mut best_hits = 0;
    for entry in CATEGORY_KEYWORDS {
        let hits = skills
            .iter()
            .filter(|skill| entry.keywords.iter().any(|k| keyword_matches(skill, k)))
            .count();
        if hits > best_hits {
            best = entry.category;
            best_hits = hits;
        }
    }
    best
}

pub fn infer_complexity(profile: &ProfileData) -> Complexity {
    let average = profile.average_skill_level();
    if average > 80.0 {
        Complexity::Advanced
    } else if average > 50.0 {
        Complexity::Intermediate
    } else {
        Complexity::Beginner
    }
}

pub fn preferred_feature(profile: &ProfileData) -> &'static str {
    if profile.projects.len() > CAROUSEL_PROJECT_THRESHOLD {
        "carousel"
    } else {
        "grid"
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ScoredTemplate {
    pub template: Template,
    pub score: u32,
}

/// Profile-derived inputs to scoring, computed once per ranking.
struct ProfileTraits {
    category: TemplateCategory,
    complexity: Complexity,
    feature: &'static str,
}

impl ProfileTraits {
    fn of(profile: &ProfileData) -> Self {
        Self {
            category: infer_category(profile),
            complexity: infer_complexity(profile),
            feature: preferred_feature(profile),
        }
    }

    fn score(&self, template: &Template) -> u32 {
        let mut score = 0;
        if template.category == self.category {
            score += CATEGORY_WEIGHT;
        }
        if template.complexity == self.complexity {
            score += COMPLEXITY_WEIGHT;
        }
        if template.has_feature(self.feature) {
            score += FEATURE_WEIGHT;
        }
        if template.performance_score >= PERFORMANCE_THRESHOLD {
            score += PERFORMANCE_WEIGHT;
        }
        score
    }
}

pub fn score_template(profile: &ProfileData, template: &Template) -> u32 {
    ProfileTraits::of(profile).score(template)
}

/// All templates, best first. Ties keep catalog order.
pub fn rank_templates(profile: &ProfileData, templates: &[Template]) -> Vec<ScoredTemplate> {
    let traits = ProfileTraits::of(profile);
    let mut ranked: Vec<ScoredTemplate> = templates
        .iter()
        .map(|t| ScoredTemplate {
            template: t.clone(),
            score: traits.score(t),
        })
        .collect();
    // sort_by is stable
    ranked.sort_by(|a, b| b.score.cmp(&a.score));
    ranked
}

pub fn select_optimal_template(profile: &ProfileData, templates: &[Template]) -> Option<Template> {
    rank_templates(profile, templates)
        .into_iter()
        .next()
        .map(|s| s.template)
}

pub fn recommend_templates(
    profile: &ProfileData,
    templates: &[Template],
    count: usize,
) -> Vec<ScoredTemplate> {
    let mut ranked = rank_templates(profile, templates);
    ranked.truncate(count);
    ranked
}
