//! Generator module - pre-renders the blog into the public directory
//!
//! Build-time output: the list page, one page per enumerated filesystem
//! slug, the 404 page, a root redirect, and the stylesheet. CMS-only slugs
//! are not pre-rendered; they are picked up by the server's on-demand path.

use anyhow::Result;
use std::fs;
use std::path::PathBuf;

use tera::Context;

use crate::content::{ContentStore, PagePayload, PostMeta, Visibility};
use crate::helpers;
use crate::templates::{self, CardData, PostPageData, SiteData, TemplateRenderer};
use crate::Press;

/// Static site generator using the embedded templates
pub struct Generator {
    press: Press,
    store: ContentStore,
    templates: TemplateRenderer,
}

impl Generator {
    /// Create a new generator
    pub fn new(press: &Press) -> Result<Self> {
        Ok(Self {
            press: press.clone(),
            store: press.content_store()?,
            templates: TemplateRenderer::new()?,
        })
    }

    /// The content store backing this generator
    pub fn store(&self) -> &ContentStore {
        &self.store
    }

    /// Generate the entire site
    pub fn generate(&self, preview: bool) -> Result<()> {
        let visibility = Visibility::from_preview(preview);

        fs::create_dir_all(&self.press.public_dir)?;
        fs::write(self.press.public_dir.join("style.css"), templates::STYLESHEET)?;
        fs::write(self.press.public_dir.join("index.html"), self.render_redirect())?;
        fs::write(self.press.public_dir.join("404.html"), self.render_not_found()?)?;

        // List page
        let metas = self.store.list(visibility)?;
        let blog_dir = self.press.public_dir.join(&self.press.config.blog_dir);
        fs::create_dir_all(&blog_dir)?;
        fs::write(blog_dir.join("index.html"), self.render_list(&metas)?)?;

        // Post pages. Each page is its own unit of work: one failed page is
        // reported and skipped, the rest still build.
        let slugs = self.store.enumerate_slugs()?;
        let mut built = 0;
        for slug in &slugs {
            match self.store.resolve_page(slug, visibility) {
                Ok(payload) => {
                    let html = self.render_post(&payload)?;
                    self.write_post_page(slug, &html)?;
                    built += 1;
                }
                Err(e) => {
                    tracing::error!("Failed to build page for slug {:?}: {}", slug, e);
                }
            }
        }

        tracing::info!(
            "Generated {} of {} post pages and the list page ({} entries)",
            built,
            slugs.len(),
            metas.len()
        );

        Ok(())
    }

    /// Render the list page for a set of post metadata
    pub fn render_list(&self, metas: &[PostMeta]) -> Result<String> {
        let cards: Vec<CardData> = metas
            .iter()
            .map(|m| CardData {
                title: m.title.clone(),
                summary: m.summary.clone(),
                published_on: m.published_on.clone(),
                path: helpers::post_path(&self.press.config, &m.slug),
            })
            .collect();

        let mut context = Context::new();
        context.insert("site", &self.site_data());
        context.insert("posts", &cards);
        self.templates.render("index.html", &context)
    }

    /// Render one post page around its payload
    pub fn render_post(&self, payload: &PagePayload) -> Result<String> {
        let page = PostPageData {
            title: payload.front_matter.title.clone(),
            summary: payload.front_matter.summary.clone(),
            published_on: payload.front_matter.published_on.clone(),
            content: payload.rendered_body.html.clone(),
            payload: payload.to_json()?,
        };

        let mut context = Context::new();
        context.insert("site", &self.site_data());
        context.insert("page", &page);
        self.templates.render("post.html", &context)
    }

    /// Render the 404 page
    pub fn render_not_found(&self) -> Result<String> {
        let mut context = Context::new();
        context.insert("site", &self.site_data());
        self.templates.render("not_found.html", &context)
    }

    /// Where a post page lands in the public directory
    pub fn post_output_path(&self, slug: &str) -> PathBuf {
        self.press
            .public_dir
            .join(&self.press.config.blog_dir)
            .join(slug)
            .join("index.html")
    }

    /// Write one rendered post page into the public directory
    pub fn write_post_page(&self, slug: &str, html: &str) -> Result<()> {
        let path = self.post_output_path(slug);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, html)?;
        tracing::debug!("Wrote {:?}", path);
        Ok(())
    }

    /// The root page only redirects to the blog index
    fn render_redirect(&self) -> String {
        let blog = helpers::blog_path(&self.press.config);
        format!(
            "<!DOCTYPE html>\n<html>\n<head>\n<meta http-equiv=\"refresh\" content=\"0; url={0}\">\n<link rel=\"canonical\" href=\"{0}\">\n</head>\n<body></body>\n</html>\n",
            blog
        )
    }

    fn site_data(&self) -> SiteData {
        SiteData {
            title: self.press.config.title.clone(),
            description: self.press.config.description.clone(),
            author: self.press.config.author.clone(),
            url: self.press.config.url.clone(),
            blog_path: helpers::blog_path(&self.press.config),
        }
    }
}
