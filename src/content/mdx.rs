//! Body rendering: front-matter bindings plus Markdown-to-HTML
//!
//! A post body may reference its own front-matter fields with `{{ title }}`
//! style bindings. Bindings are expanded first, then the result is compiled
//! to HTML with fenced code blocks highlighted. Given identical (body, front
//! matter) input the output is byte-identical across invocations.

use pulldown_cmark::{html, CodeBlockKind, CowStr, Event, Options, Parser, Tag, TagEnd};
use serde::{Deserialize, Serialize};
use syntect::highlighting::ThemeSet;
use syntect::html::highlighted_html_for_string;
use syntect::parsing::SyntaxSet;

use super::post::PostMeta;

/// Body render failure, propagated as a content error for that document
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("front-matter binding expansion failed: {0}")]
    Scope(#[from] tera::Error),
}

/// Hydratable render product: server-emitted HTML that a client runtime can
/// attach to without re-rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderedBody {
    pub html: String,
}

/// Body renderer with syntax highlighting
pub struct MdxRenderer {
    syntax_set: SyntaxSet,
    theme_set: ThemeSet,
    theme_name: String,
    line_numbers: bool,
}

impl MdxRenderer {
    /// Create a new renderer with default settings
    pub fn new() -> Self {
        Self::with_options("base16-ocean.dark", true)
    }

    /// Create with custom settings
    pub fn with_options(theme: &str, line_numbers: bool) -> Self {
        Self {
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme_set: ThemeSet::load_defaults(),
            theme_name: theme.to_string(),
            line_numbers,
        }
    }

    /// Render a post body with its front-matter fields in scope
    pub fn render(&self, body: &str, meta: &PostMeta) -> Result<RenderedBody, RenderError> {
        let expanded = expand_scope(body, meta)?;
        Ok(RenderedBody {
            html: self.render_markdown(&expanded),
        })
    }

    /// Compile markdown to HTML, routing fenced code blocks through syntect
    fn render_markdown(&self, markdown: &str) -> String {
        let options = Options::ENABLE_TABLES
            | Options::ENABLE_FOOTNOTES
            | Options::ENABLE_STRIKETHROUGH
            | Options::ENABLE_TASKLISTS
            | Options::ENABLE_SMART_PUNCTUATION
            | Options::ENABLE_GFM;
        let parser = Parser::new_ext(markdown, options);

        let mut events: Vec<Event> = Vec::new();
        // (language, accumulated text) while inside a code block
        let mut code_block: Option<(Option<String>, String)> = None;

        for event in parser {
            match event {
                Event::Start(Tag::CodeBlock(kind)) => {
                    let lang = match kind {
                        CodeBlockKind::Fenced(lang) if !lang.is_empty() => Some(lang.to_string()),
                        _ => None,
                    };
                    code_block = Some((lang, String::new()));
                }
                Event::End(TagEnd::CodeBlock) => {
                    if let Some((lang, text)) = code_block.take() {
                        let highlighted = self.highlight_code(&text, lang.as_deref());
                        events.push(Event::Html(CowStr::from(highlighted)));
                    }
                }
                Event::Text(text) => match code_block.as_mut() {
                    Some((_, buf)) => buf.push_str(&text),
                    None => events.push(Event::Text(text)),
                },
                other => {
                    if code_block.is_none() {
                        events.push(other);
                    }
                }
            }
        }

        let mut html_output = String::new();
        html::push_html(&mut html_output, events.into_iter());
        html_output
    }

    /// Highlight a code block
    fn highlight_code(&self, code: &str, lang: Option<&str>) -> String {
        let lang = lang.unwrap_or("text");

        let syntax = self
            .syntax_set
            .find_syntax_by_token(lang)
            .or_else(|| self.syntax_set.find_syntax_by_extension(lang))
            .unwrap_or_else(|| self.syntax_set.find_syntax_plain_text());

        let theme = self
            .theme_set
            .themes
            .get(&self.theme_name)
            .or_else(|| self.theme_set.themes.values().next());

        let highlighted = theme
            .and_then(|t| highlighted_html_for_string(code, &self.syntax_set, syntax, t).ok());

        match highlighted {
            Some(highlighted) if self.line_numbers => self.add_line_numbers(&highlighted, lang),
            Some(highlighted) => format!(
                r#"<pre><code class="language-{}">{}</code></pre>"#,
                lang, highlighted
            ),
            None => {
                let escaped = html_escape(code);
                format!(
                    r#"<pre><code class="language-{}">{}</code></pre>"#,
                    lang, escaped
                )
            }
        }
    }

    /// Add a line-number gutter to highlighted code
    fn add_line_numbers(&self, code: &str, lang: &str) -> String {
        let lines: Vec<&str> = code.lines().collect();

        let gutter = (1..=lines.len())
            .map(|n| format!(r#"<span class="line-number">{}</span>"#, n))
            .collect::<Vec<_>>()
            .join("\n");

        format!(
            r#"<figure class="highlight {}"><table><tr><td class="gutter"><pre>{}</pre></td><td class="code"><pre>{}</pre></td></tr></table></figure>"#,
            lang,
            gutter,
            lines.join("\n")
        )
    }
}

impl Default for MdxRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Expand front-matter bindings in a body. Metadata fields and custom
/// front-matter keys are all in scope; named fields win on collision.
fn expand_scope(body: &str, meta: &PostMeta) -> Result<String, RenderError> {
    // Plain bodies skip the template pass entirely
    if !body.contains("{{") && !body.contains("{%") {
        return Ok(body.to_string());
    }

    let mut context = tera::Context::new();
    for (key, value) in &meta.extra {
        context.insert(key, value);
    }
    context.insert("slug", &meta.slug);
    context.insert("title", &meta.title);
    context.insert("summary", &meta.summary);
    if let Some(published_on) = &meta.published_on {
        context.insert("publishedOn", published_on);
    }

    Ok(tera::Tera::one_off(body, &context, false)?)
}

/// Simple HTML escaping
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::FrontMatter;

    fn meta(slug: &str, title: &str) -> PostMeta {
        PostMeta::from_front_matter(&FrontMatter {
            slug: slug.to_string(),
            title: Some(title.to_string()),
            ..Default::default()
        })
    }

    #[test]
    fn test_render_basic_markdown() {
        let renderer = MdxRenderer::new();
        let rendered = renderer
            .render("# Hello World\n\nThis is a test.", &meta("hello", "Hello"))
            .unwrap();
        assert!(rendered.html.contains("<h1>Hello World</h1>"));
        assert!(rendered.html.contains("<p>This is a test.</p>"));
    }

    #[test]
    fn test_render_code_block() {
        let renderer = MdxRenderer::new();
        let rendered = renderer
            .render("```rust\nfn main() {}\n```", &meta("code", "Code"))
            .unwrap();
        assert!(rendered.html.contains("highlight"));
    }

    #[test]
    fn test_scope_bindings_expand() {
        let renderer = MdxRenderer::new();
        let rendered = renderer
            .render("Welcome to *{{ title }}* ({{ slug }}).", &meta("hi", "Hi There"))
            .unwrap();
        assert!(rendered.html.contains("Hi There"));
        assert!(rendered.html.contains("hi"));
    }

    #[test]
    fn test_extra_fields_in_scope() {
        let (fm, body) = FrontMatter::parse(
            "---\nslug: hero\nhero: /img/hero.png\n---\n\n![banner]({{ hero }})\n",
        )
        .unwrap();
        let meta = PostMeta::from_front_matter(&fm);
        let rendered = MdxRenderer::new().render(body, &meta).unwrap();
        assert!(rendered.html.contains("/img/hero.png"));
    }

    #[test]
    fn test_unknown_binding_is_an_error() {
        let renderer = MdxRenderer::new();
        let result = renderer.render("Hello {{ nope }}", &meta("x", "X"));
        assert!(result.is_err());
    }

    #[test]
    fn test_rendering_is_deterministic() {
        let body = "# {{ title }}\n\nSome *text*.\n\n```rust\nlet x = 1;\n```\n";
        let renderer = MdxRenderer::new();
        let first = renderer.render(body, &meta("det", "Det")).unwrap();
        let second = renderer.render(body, &meta("det", "Det")).unwrap();
        assert_eq!(first, second);

        // A fresh renderer instance produces the same bytes too
        let third = MdxRenderer::new().render(body, &meta("det", "Det")).unwrap();
        assert_eq!(first, third);
    }
}
