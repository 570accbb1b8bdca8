//! Builder patterns for creating test data programmatically.

#![allow(dead_code)]

use folio::job::{GenerationRequest, ProfileData, Project, Skill};
use folio::template::{Complexity, Template, TemplateCategory};

/// Builder for creating `ProfileData` instances.
pub struct ProfileBuilder {
    profile: ProfileData,
}

impl ProfileBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            profile: ProfileData {
                name: name.to_string(),
                ..Default::default()
            },
        }
    }

    pub fn title(mut self, title: &str) -> Self {
        self.profile.title = title.to_string();
        self
    }

    pub fn bio(mut self, bio: &str) -> Self {
        self.profile.bio = bio.to_string();
        self
    }

    pub fn skill(mut self, name: &str, level: u8) -> Self {
        self.profile.skills.push(Skill::new(name, level));
        self
    }

    pub fn project(mut self, title: &str, technologies: &[&str]) -> Self {
        self.profile.projects.push(Project {
            title: title.to_string(),
            description: format!("{} description", title),
            technologies: technologies.iter().map(|t| t.to_string()).collect(),
            url: None,
        });
        self
    }

    pub fn build(self) -> ProfileData {
        self.profile
    }
}

/// Builder for creating `GenerationRequest` instances.
pub struct RequestBuilder {
    request: GenerationRequest,
}

impl RequestBuilder {
    pub fn new(profile: ProfileData) -> Self {
        Self {
            request: GenerationRequest::new("user-1", profile),
        }
    }

    pub fn user_id(mut self, user_id: &str) -> Self {
        self.request.user_id = user_id.to_string();
        self
    }

    pub fn template(mut self, id: &str) -> Self {
        self.request.template_id = Some(id.to_string());
        self
    }

    pub fn custom_domain(mut self, domain: &str) -> Self {
        self.request.preferences.custom_domain = Some(domain.to_string());
        self
    }

    pub fn cdn_provider(mut self, provider: &str) -> Self {
        self.request.preferences.cdn_provider = provider.to_string();
        self
    }

    pub fn analytics(mut self, enabled: bool) -> Self {
        self.request.preferences.analytics = enabled;
        self
    }

    pub fn build(self) -> GenerationRequest {
        self.request
    }
}

/// Builder for creating `Template` instances.
pub struct TemplateBuilder {
    template: Template,
}

impl TemplateBuilder {
    pub fn new(id: &str) -> Self {
        Self {
            template: Template {
                id: id.to_string(),
                name: id.to_string(),
                category: TemplateCategory::General,
                complexity: Complexity::Beginner,
                features: vec![],
                performance_score: 50,
                palette: Default::default(),
                layout: Default::default(),
                font_family: "Inter".to_string(),
            },
        }
    }

    pub fn category(mut self, category: TemplateCategory) -> Self {
        self.template.category = category;
        self
    }

    pub fn complexity(mut self, complexity: Complexity) -> Self {
        self.template.complexity = complexity;
        self
    }

    pub fn feature(mut self, feature: &str) -> Self {
        self.template.features.push(feature.to_string());
        self
    }

    pub fn performance(mut self, score: u8) -> Self {
        self.template.performance_score = score;
        self
    }

    pub fn build(self) -> Template {
        self.template
    }
}

/// A developer profile that scores `developer-pro` highest.
pub fn developer_profile() -> ProfileData {
    ProfileBuilder::new("Ada Lovelace")
        .title("Full-stack Engineer")
        .skill("React", 90)
        .skill("Node.js", 80)
        .project("Analytical Engine", &["Rust", "WebAssembly"])
        .build()
}

pub fn developer_request() -> GenerationRequest {
    RequestBuilder::new(developer_profile()).build()
}
