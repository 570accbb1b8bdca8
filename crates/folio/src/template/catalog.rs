use super::{ColorPalette, Complexity, Layout, Template, TemplateCategory};

/// Template used when nothing else can be chosen.
pub const FALLBACK_TEMPLATE_ID: &str = "modern-minimal";

/// Ordered list of templates. Order breaks scoring ties.
#[derive(Debug, Clone, Default)]
pub struct TemplateCatalog {
    templates: Vec<Template>,
}

struct BuiltinTemplate {
    id: &'static str,
    name: &'static str,
    category: TemplateCategory,
    complexity: Complexity,
    features: &'static [&'static str],
    performance_score: u8,
    layout: Layout,
    font_family: &'static str,
    palette: [&'static str; 5],
}

const BUILTIN: &[BuiltinTemplate] = &[
    BuiltinTemplate {
        id: "developer-pro",
        name: "Developer Pro",
        category: TemplateCategory::Developer,
        complexity: Complexity::Advanced,
        features: &["grid", "code-snippets", "dark-mode", "github-stats"],
        performance_score: 95,
        layout: Layout::Grid,
        font_family: "JetBrains Mono",
        palette: ["#0f172a", "#334155", "#22d3ee", "#020617", "#e2e8f0"],
    },
    BuiltinTemplate {
        id: "developer-starter",
        name: "Developer Starter",
        category: TemplateCategory::Developer,
        complexity: Complexity::Beginner,
        features: &["grid", "code-snippets"],
        performance_score: 92,
        layout: Layout::Grid,
        font_family: "Inter",
        palette: ["#1e293b", "#475569", "#3b82f6", "#ffffff", "#0f172a"],
    },
    BuiltinTemplate {
        id: "designer-showcase",
        name: "Designer Showcase",
        category: TemplateCategory::Designer,
        complexity: Complexity::Intermediate,
        features: &["carousel", "full-bleed-images", "animations"],
        performance_score: 85,
        layout: Layout::Carousel,
        font_family: "Playfair Display",
        palette: ["#111111", "#6b7280", "#f43f5e", "#fafafa", "#111111"],
    },
    BuiltinTemplate {
        id: "creative-portfolio",
        name: "Creative Portfolio",
        category: TemplateCategory::General,
        complexity: Complexity::Advanced,
        features: &["carousel", "animations", "parallax"],
        performance_score: 78,
        layout: Layout::Carousel,
        font_family: "Poppins",
        palette: ["#4c1d95", "#7c3aed", "#f59e0b", "#fdf4ff", "#1f1235"],
    },
    BuiltinTemplate {
        id: "business-classic",
        name: "Business Classic",
        category: TemplateCategory::Business,
        complexity: Complexity::Intermediate,
        features: &["grid", "testimonials", "contact-form"],
        performance_score: 90,
        layout: Layout::Grid,
        font_family: "Source Sans Pro",
        palette: ["#1e3a8a", "#475569", "#0ea5e9", "#f8fafc", "#0f172a"],
    },
    BuiltinTemplate {
        id: FALLBACK_TEMPLATE_ID,
        name: "Modern Minimal",
        category: TemplateCategory::General,
        complexity: Complexity::Beginner,
        features: &["grid", "minimal"],
        performance_score: 98,
        layout: Layout::Grid,
        font_family: "Inter",
        palette: ["#1f2937", "#4b5563", "#2563eb", "#ffffff", "#111827"],
    },
];

impl BuiltinTemplate {
    fn to_template(&self) -> Template {
        let [primary, secondary, accent, background, text] = self.palette;
        Template {
            id: self.id.to_string(),
            name: self.name.to_string(),
            category: self.category,
            complexity: self.complexity,
            features: self.features.iter().map(|f| f.to_string()).collect(),
            performance_score: self.performance_score,
            palette: ColorPalette {
                primary: primary.to_string(),
                secondary: secondary.to_string(),
                accent: accent.to_string(),
                background: background.to_string(),
                text: text.to_string(),
            },
            layout: self.layout,
            font_family: self.font_family.to_string(),
        }
    }
}

impl TemplateCatalog {
    pub fn new(templates: Vec<Template>) -> Self {
        Self { templates }
    }

    /// The six templates shipped with the crate.
    pub fn builtin() -> Self {
        Self::new(BUILTIN.iter().map(BuiltinTemplate::to_template).collect())
    }

    /// Builtin templates followed by `extra`. An extra template with a builtin
    /// id replaces the builtin in place.
    pub fn with_overrides(extra: Vec<Template>) -> Self {
        let mut catalog = Self::builtin();
        for template in extra {
            match catalog.templates.iter_mut().find(|t| t.id == template.id) {
                Some(existing) => *existing = template,
                None => catalog.templates.push(template),
            }
        }
        catalog
    }

    pub fn get(&self, id: &str) -> Option<&Template> {
        self.templates.iter().find(|t| t.id == id)
    }

    pub fn templates(&self) -> &[Template] {
        &self.templates
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    /// The hard-coded fallback, independent of the catalog contents.
    pub fn fallback() -> Template {
        BUILTIN
            .iter()
            .find(|t| t.id == FALLBACK_TEMPLATE_ID)
            .map(BuiltinTemplate::to_template)
            .unwrap_or_else(|| BUILTIN[0].to_template())
    }
}
