//! Built-in presentation shell using the Tera template engine
//!
//! All templates are embedded directly in the binary: a layout, the list
//! page with preview cards, the post page with its hydration payload
//! island, and the 404 page.

use anyhow::Result;
use serde::Serialize;
use std::collections::HashMap;
use tera::{Context, Tera};

/// Embedded stylesheet, copied into the public directory at build time
pub const STYLESHEET: &str = include_str!("press/style.css");

/// Template renderer with the embedded presentation shell
pub struct TemplateRenderer {
    tera: Tera,
}

impl TemplateRenderer {
    /// Create a new renderer with all templates loaded
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();

        // Post bodies arrive as pre-rendered HTML; autoescaping would
        // mangle them.
        tera.autoescape_on(vec![]);

        tera.add_raw_templates(vec![
            ("layout.html", include_str!("press/layout.html")),
            ("index.html", include_str!("press/index.html")),
            ("post.html", include_str!("press/post.html")),
            ("not_found.html", include_str!("press/not_found.html")),
            ("partials/nav.html", include_str!("press/partials/nav.html")),
            ("partials/card.html", include_str!("press/partials/card.html")),
        ])?;

        tera.register_filter("strip_html", strip_html_filter);
        tera.register_filter("truncate_chars", truncate_chars_filter);
        tera.register_filter("date_format", date_format_filter);

        Ok(Self { tera })
    }

    /// Render a template with given context
    pub fn render(&self, template_name: &str, context: &Context) -> Result<String> {
        Ok(self.tera.render(template_name, context)?)
    }
}

/// Data structures for template context

/// Site-wide fields available to every template
#[derive(Debug, Clone, Serialize)]
pub struct SiteData {
    pub title: String,
    pub description: String,
    pub author: String,
    pub url: String,
    pub blog_path: String,
}

/// One preview card on the list page
#[derive(Debug, Clone, Serialize)]
pub struct CardData {
    pub title: String,
    pub summary: String,
    pub published_on: Option<String>,
    pub path: String,
}

/// A fully rendered post page
#[derive(Debug, Clone, Serialize)]
pub struct PostPageData {
    pub title: String,
    pub summary: String,
    pub published_on: Option<String>,
    /// Rendered body HTML
    pub content: String,
    /// JSON payload for the client hydration island
    pub payload: String,
}

/// Tera filter: strip HTML tags
fn strip_html_filter(
    value: &tera::Value,
    _args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = tera::try_get_value!("strip_html", "value", String, value);
    let mut result = String::with_capacity(s.len());
    let mut in_tag = false;
    for c in s.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => result.push(c),
            _ => {}
        }
    }
    Ok(tera::Value::String(result))
}

/// Tera filter: truncate by character count
fn truncate_chars_filter(
    value: &tera::Value,
    args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = tera::try_get_value!("truncate_chars", "value", String, value);
    let length = match args.get("length") {
        Some(val) => tera::try_get_value!("truncate_chars", "length", usize, val),
        None => 150,
    };
    let omission = match args.get("omission") {
        Some(val) => tera::try_get_value!("truncate_chars", "omission", String, val),
        None => "…".to_string(),
    };

    if s.chars().count() <= length {
        Ok(tera::Value::String(s))
    } else {
        let truncated: String = s.chars().take(length).collect();
        Ok(tera::Value::String(format!(
            "{}{}",
            truncated.trim_end(),
            omission
        )))
    }
}

/// Tera filter: format a front-matter date string for display
fn date_format_filter(
    value: &tera::Value,
    args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = tera::try_get_value!("date_format", "value", String, value);
    let format = match args.get("format") {
        Some(val) => tera::try_get_value!("date_format", "format", String, val),
        None => "%B %d, %Y".to_string(),
    };

    match crate::content::parse_date_string(&s) {
        Some(date) => Ok(tera::Value::String(date.format(&format).to_string())),
        // Unparseable dates display as written
        None => Ok(tera::Value::String(s)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn site() -> SiteData {
        SiteData {
            title: "Known Blog".to_string(),
            description: "A blog".to_string(),
            author: "Jane".to_string(),
            url: "http://example.com".to_string(),
            blog_path: "/blog/".to_string(),
        }
    }

    #[test]
    fn test_render_index_with_cards() {
        let renderer = TemplateRenderer::new().unwrap();
        let mut context = Context::new();
        context.insert("site", &site());
        context.insert(
            "posts",
            &vec![CardData {
                title: "Hello".to_string(),
                summary: "First post".to_string(),
                published_on: Some("2021-05-12".to_string()),
                path: "/blog/hello/".to_string(),
            }],
        );

        let html = renderer.render("index.html", &context).unwrap();
        assert!(html.contains("Hello"));
        assert!(html.contains("/blog/hello/"));
        assert!(html.contains("First post"));
    }

    #[test]
    fn test_render_post_page_with_payload_island() {
        let renderer = TemplateRenderer::new().unwrap();
        let mut context = Context::new();
        context.insert("site", &site());
        context.insert(
            "page",
            &PostPageData {
                title: "Hello".to_string(),
                summary: "First post".to_string(),
                published_on: None,
                content: "<h1>Hello</h1>".to_string(),
                payload: r#"{"renderedBody":{"html":"<h1>Hello</h1>"}}"#.to_string(),
            },
        );

        let html = renderer.render("post.html", &context).unwrap();
        assert!(html.contains("<h1>Hello</h1>"));
        assert!(html.contains("__MDPRESS_DATA__"));
        assert!(html.contains("Known Blog | Hello"));
    }

    #[test]
    fn test_render_not_found() {
        let renderer = TemplateRenderer::new().unwrap();
        let mut context = Context::new();
        context.insert("site", &site());

        let html = renderer.render("not_found.html", &context).unwrap();
        assert!(html.contains("404"));
    }

    #[test]
    fn test_truncate_chars_filter() {
        let args = HashMap::new();
        let long = "x".repeat(200);
        let out = truncate_chars_filter(&tera::Value::String(long), &args).unwrap();
        assert_eq!(out.as_str().unwrap().chars().count(), 151);
    }

    #[test]
    fn test_date_format_filter() {
        let args = HashMap::new();
        let out =
            date_format_filter(&tera::Value::String("2021-05-12".to_string()), &args).unwrap();
        assert_eq!(out.as_str().unwrap(), "May 12, 2021");
    }
}
