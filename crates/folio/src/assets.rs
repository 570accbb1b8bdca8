//! Static site assembly.
//!
//! [`build_assets`] is pure: the same profile, content, template and options
//! always produce byte-identical files.

use std::fmt::Write;

use reqwest::Url;

use crate::content::EnhancedContent;
use crate::job::{AnalyticsDescriptor, ProfileData};
use crate::template::{ColorPalette, Layout, Template};

pub const HTML_PATH: &str = "index.html";
pub const CSS_PATH: &str = "css/styles.css";
pub const JS_PATH: &str = "js/main.js";
pub const AVATAR_PATH: &str = "images/avatar.svg";
pub const OG_IMAGE_PATH: &str = "images/og-image.svg";
pub const FONTS_PATH: &str = "fonts/fonts.css";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetFile {
    /// Path relative to the site root.
    pub path: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl AssetFile {
    fn text(path: &str, content_type: &str, body: String) -> Self {
        Self {
            path: path.to_string(),
            content_type: content_type.to_string(),
            bytes: body.into_bytes(),
        }
    }

    pub fn is_text(&self) -> bool {
        self.content_type.starts_with("text/")
            || self.content_type.starts_with("application/javascript")
            || self.content_type.starts_with("image/svg+xml")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetBundle {
    pub html: AssetFile,
    pub css: AssetFile,
    pub js: AssetFile,
    pub images: Vec<AssetFile>,
    pub fonts: Vec<AssetFile>,
}

impl AssetBundle {
    /// Every file, html first.
    pub fn files(&self) -> impl Iterator<Item = &AssetFile> {
        [&self.html, &self.css, &self.js]
            .into_iter()
            .chain(self.images.iter())
            .chain(self.fonts.iter())
    }

    pub fn total_size(&self) -> u64 {
        self.files().map(|f| f.bytes.len() as u64).sum()
    }
}

#[derive(Debug, Clone)]
pub struct BuildOptions {
    pub portfolio_id: String,
    pub analytics: AnalyticsDescriptor,
}

pub fn html_escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Project links are only rendered for absolute http(s) URLs.
fn safe_link(url: &str) -> Option<Url> {
    Url::parse(url.trim())
        .ok()
        .filter(|u| matches!(u.scheme(), "http" | "https"))
}

pub fn build_assets(
    profile: &ProfileData,
    content: &EnhancedContent,
    template: &Template,
    options: &BuildOptions,
) -> AssetBundle {
    let palette = content.palette.as_ref().unwrap_or(&template.palette);

    AssetBundle {
        html: AssetFile::text(
            HTML_PATH,
            "text/html; charset=utf-8",
            render_html(profile, content, template, options),
        ),
        css: AssetFile::text(
            CSS_PATH,
            "text/css; charset=utf-8",
            render_css(palette, template),
        ),
        js: AssetFile::text(
            JS_PATH,
            "application/javascript; charset=utf-8",
            render_js(template, &options.analytics),
        ),
        images: vec![
            AssetFile::text(AVATAR_PATH, "image/svg+xml", render_avatar(profile, palette)),
            AssetFile::text(
                OG_IMAGE_PATH,
                "image/svg+xml",
                render_og_image(profile, palette),
            ),
        ],
        fonts: vec![AssetFile::text(
            FONTS_PATH,
            "text/css; charset=utf-8",
            render_fonts(&template.font_family),
        )],
    }
}

// Writing into a String cannot fail, so fmt results are ignored below.

fn render_html(
    profile: &ProfileData,
    content: &EnhancedContent,
    template: &Template,
    options: &BuildOptions,
) -> String {
    let mut html = String::new();
    let _ = writeln!(html, "<!DOCTYPE html>");
    let _ = writeln!(html, "<html lang=\"en\">");
    let _ = writeln!(html, "<head>");
    let _ = writeln!(html, "  <meta charset=\"utf-8\">");
    let _ = writeln!(
        html,
        "  <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">"
    );
    let _ = writeln!(html, "  <title>{}</title>", html_escape(&content.seo.title));
    let _ = writeln!(
        html,
        "  <meta name=\"description\" content=\"{}\">",
        html_escape(&content.seo.description)
    );
    if !content.seo.keywords.is_empty() {
        let _ = writeln!(
            html,
            "  <meta name=\"keywords\" content=\"{}\">",
            html_escape(&content.seo.keywords.join(", "))
        );
    }
    let _ = writeln!(
        html,
        "  <meta property=\"og:title\" content=\"{}\">",
        html_escape(&content.seo.title)
    );
    let _ = writeln!(
        html,
        "  <meta property=\"og:image\" content=\"{}\">",
        OG_IMAGE_PATH
    );
    let _ = writeln!(
        html,
        "  <meta name=\"generator\" content=\"folio/{}\">",
        html_escape(&template.id)
    );
    let _ = writeln!(html, "  <link rel=\"stylesheet\" href=\"{}\">", FONTS_PATH);
    let _ = writeln!(html, "  <link rel=\"stylesheet\" href=\"{}\">", CSS_PATH);
    let _ = writeln!(html, "</head>");
    let _ = writeln!(
        html,
        "<body data-portfolio=\"{}\">",
        html_escape(&options.portfolio_id)
    );

    let _ = writeln!(html, "  <header class=\"hero\">");
    let _ = writeln!(
        html,
        "    <img class=\"avatar\" src=\"{}\" alt=\"{}\">",
        AVATAR_PATH,
        html_escape(&profile.name)
    );
    let _ = writeln!(html, "    <h1>{}</h1>", html_escape(&profile.name));
    if !profile.title.is_empty() {
        let _ = writeln!(html, "    <p class=\"title\">{}</p>", html_escape(&profile.title));
    }
    if let Some(location) = &profile.location {
        let _ = writeln!(html, "    <p class=\"location\">{}</p>", html_escape(location));
    }
    let _ = writeln!(html, "    <p class=\"bio\">{}</p>", html_escape(&content.bio));
    let _ = writeln!(html, "  </header>");

    if !profile.skills.is_empty() {
        let _ = writeln!(html, "  <section class=\"skills\">");
        let _ = writeln!(html, "    <h2>Skills</h2>");
        let _ = writeln!(html, "    <ul>");
        for skill in &profile.skills {
            match skill.level {
                Some(level) => {
                    let _ = writeln!(
                        html,
                        "      <li data-level=\"{}\">{}</li>",
                        level,
                        html_escape(&skill.name)
                    );
                }
                None => {
                    let _ = writeln!(html, "      <li>{}</li>", html_escape(&skill.name));
                }
            }
        }
        let _ = writeln!(html, "    </ul>");
        let _ = writeln!(html, "  </section>");
    }

    if !content.projects.is_empty() {
        let layout = match template.layout {
            Layout::Grid => "grid",
            Layout::Carousel => "carousel",
        };
        let _ = writeln!(html, "  <section class=\"projects {}\">", layout);
        let _ = writeln!(html, "    <h2>Projects</h2>");
        for (copy, project) in content.projects.iter().zip(&profile.projects) {
            let _ = writeln!(html, "    <article class=\"project\">");
            let _ = writeln!(html, "      <h3>{}</h3>", html_escape(&copy.title));
            let _ = writeln!(html, "      <p>{}</p>", html_escape(&copy.description));
            if !project.technologies.is_empty() {
                let _ = writeln!(
                    html,
                    "      <p class=\"tech\">{}</p>",
                    html_escape(&project.technologies.join(" · "))
                );
            }
            if let Some(url) = project.url.as_deref().and_then(safe_link) {
                let _ = writeln!(
                    html,
                    "      <a href=\"{}\" rel=\"noopener\">View project</a>",
                    html_escape(url.as_str())
                );
            }
            let _ = writeln!(html, "    </article>");
        }
        let _ = writeln!(html, "  </section>");
    }

    if !profile.experience.is_empty() {
        let _ = writeln!(html, "  <section class=\"experience\">");
        let _ = writeln!(html, "    <h2>Experience</h2>");
        for entry in &profile.experience {
            let _ = writeln!(
                html,
                "    <div class=\"role\"><h3>{} at {}</h3><span>{}</span><p>{}</p></div>",
                html_escape(&entry.role),
                html_escape(&entry.company),
                html_escape(&entry.period),
                html_escape(&entry.summary)
            );
        }
        let _ = writeln!(html, "  </section>");
    }

    let _ = writeln!(html, "  <section class=\"cta\">");
    let _ = writeln!(
        html,
        "    <h2>{}</h2>",
        html_escape(&content.call_to_action.headline)
    );
    let href = match &profile.email {
        Some(email) => format!("mailto:{}", email),
        None => "#".to_string(),
    };
    let _ = writeln!(
        html,
        "    <a class=\"button\" href=\"{}\" data-event=\"contact_click\">{}</a>",
        html_escape(&href),
        html_escape(&content.call_to_action.button_label)
    );
    let _ = writeln!(html, "  </section>");

    if options.analytics.enabled {
        let tracking_id = options.analytics.tracking_id.as_deref().unwrap_or_default();
        let _ = writeln!(
            html,
            "  <script>window.folioAnalytics = {{ trackingId: \"{}\", events: [{}] }};</script>",
            html_escape(tracking_id),
            options
                .analytics
                .custom_events
                .iter()
                .map(|e| format!("\"{}\"", html_escape(e)))
                .collect::<Vec<_>>()
                .join(", ")
        );
    }
    let _ = writeln!(html, "  <script src=\"{}\" defer></script>", JS_PATH);
    let _ = writeln!(html, "</body>");
    let _ = writeln!(html, "</html>");
    html
}

fn render_css(palette: &ColorPalette, template: &Template) -> String {
    let mut css = String::new();
    let _ = writeln!(css, ":root {{");
    let _ = writeln!(css, "  --color-primary: {};", palette.primary);
    let _ = writeln!(css, "  --color-secondary: {};", palette.secondary);
    let _ = writeln!(css, "  --color-accent: {};", palette.accent);
    let _ = writeln!(css, "  --color-background: {};", palette.background);
    let _ = writeln!(css, "  --color-text: {};", palette.text);
    let _ = writeln!(css, "  --font-family: '{}', system-ui, sans-serif;", template.font_family);
    let _ = writeln!(css, "}}");
    let _ = writeln!(
        css,
        "body {{ margin: 0; font-family: var(--font-family); color: var(--color-text); background: var(--color-background); }}"
    );
    let _ = writeln!(
        css,
        ".hero {{ padding: 4rem 1.5rem; text-align: center; background: var(--color-primary); color: var(--color-background); }}"
    );
    let _ = writeln!(css, ".avatar {{ width: 96px; height: 96px; border-radius: 50%; }}");
    let _ = writeln!(css, "section {{ max-width: 960px; margin: 0 auto; padding: 2rem 1.5rem; }}");
    let _ = writeln!(css, "h2 {{ color: var(--color-primary); }}");
    let _ = writeln!(css, ".tech {{ color: var(--color-secondary); font-size: 0.875rem; }}");
    let _ = writeln!(
        css,
        ".button {{ display: inline-block; padding: 0.75rem 1.5rem; background: var(--color-accent); color: var(--color-background); border-radius: 6px; text-decoration: none; }}"
    );
    match template.layout {
        Layout::Grid => {
            let _ = writeln!(
                css,
                ".projects.grid {{ display: grid; grid-template-columns: repeat(auto-fill, minmax(260px, 1fr)); gap: 1.5rem; }}"
            );
        }
        Layout::Carousel => {
            let _ = writeln!(
                css,
                ".projects.carousel {{ display: flex; overflow-x: auto; scroll-snap-type: x mandatory; gap: 1.5rem; }}"
            );
            let _ = writeln!(
                css,
                ".projects.carousel .project {{ flex: 0 0 80%; scroll-snap-align: start; }}"
            );
        }
    }
    css
}

fn render_js(template: &Template, analytics: &AnalyticsDescriptor) -> String {
    let mut js = String::new();
    let _ = writeln!(js, "document.addEventListener('DOMContentLoaded', function () {{");
    if template.layout == Layout::Carousel {
        let _ = writeln!(js, "  var track = document.querySelector('.projects.carousel');");
        let _ = writeln!(js, "  if (track) {{");
        let _ = writeln!(js, "    setInterval(function () {{");
        let _ = writeln!(
            js,
            "      var end = track.scrollLeft + track.clientWidth >= track.scrollWidth;"
        );
        let _ = writeln!(
            js,
            "      track.scrollTo({{ left: end ? 0 : track.scrollLeft + track.clientWidth, behavior: 'smooth' }});"
        );
        let _ = writeln!(js, "    }}, 6000);");
        let _ = writeln!(js, "  }}");
    }
    if analytics.enabled {
        let _ = writeln!(js, "  var config = window.folioAnalytics || {{}};");
        let _ = writeln!(
            js,
            "  document.querySelectorAll('[data-event]').forEach(function (el) {{"
        );
        let _ = writeln!(js, "    el.addEventListener('click', function () {{");
        let _ = writeln!(
            js,
            "      navigator.sendBeacon && navigator.sendBeacon('/analytics', JSON.stringify({{ id: config.trackingId, event: el.dataset.event }}));"
        );
        let _ = writeln!(js, "    }});");
        let _ = writeln!(js, "  }});");
    }
    let _ = writeln!(js, "}});");
    js
}

fn render_avatar(profile: &ProfileData, palette: &ColorPalette) -> String {
    format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"192\" height=\"192\" viewBox=\"0 0 192 192\">\
         <rect width=\"192\" height=\"192\" rx=\"96\" fill=\"{}\"/>\
         <text x=\"50%\" y=\"50%\" dy=\".35em\" text-anchor=\"middle\" font-family=\"sans-serif\" font-size=\"72\" fill=\"{}\">{}</text>\
         </svg>\n",
        html_escape(&palette.accent),
        html_escape(&palette.background),
        html_escape(&profile.initials())
    )
}

fn render_og_image(profile: &ProfileData, palette: &ColorPalette) -> String {
    format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"1200\" height=\"630\" viewBox=\"0 0 1200 630\">\
         <rect width=\"1200\" height=\"630\" fill=\"{}\"/>\
         <text x=\"80\" y=\"300\" font-family=\"sans-serif\" font-size=\"72\" fill=\"{}\">{}</text>\
         <text x=\"80\" y=\"390\" font-family=\"sans-serif\" font-size=\"40\" fill=\"{}\">{}</text>\
         </svg>\n",
        html_escape(&palette.primary),
        html_escape(&palette.background),
        html_escape(&profile.name),
        html_escape(&palette.accent),
        html_escape(&profile.title)
    )
}

fn render_fonts(font_family: &str) -> String {
    let family = font_family.trim().replace(' ', "+");
    format!(
        "@import url('https://fonts.googleapis.com/css2?family={}:wght@400;600;700&display=swap');\n",
        family
    )
}
