//! mdpress: a hybrid static/on-demand blog engine
//!
//! Content comes from two sources: a directory of `.mdx` files on disk and a
//! CMS export carrying draft and published document lists. Post pages are
//! rendered statically at build time; slugs unknown at build time are rendered
//! on first request and cached into the public directory.

pub mod commands;
pub mod config;
pub mod content;
pub mod generator;
pub mod helpers;
pub mod server;
pub mod templates;

use anyhow::Result;
use std::path::Path;

/// The main application handle
#[derive(Clone)]
pub struct Press {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Base directory
    pub base_dir: std::path::PathBuf,
    /// Posts directory (one `.mdx` file per post)
    pub posts_dir: std::path::PathBuf,
    /// Public (output) directory
    pub public_dir: std::path::PathBuf,
    /// CMS content export file
    pub content_path: std::path::PathBuf,
}

impl Press {
    /// Create a new Press instance from a directory
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let config_path = base_dir.join("_config.yml");

        let config = if config_path.exists() {
            config::SiteConfig::load(&config_path)?
        } else {
            config::SiteConfig::default()
        };

        let posts_dir = base_dir.join(&config.posts_dir);
        let public_dir = base_dir.join(&config.public_dir);
        let content_path = base_dir.join(&config.content_file);

        Ok(Self {
            config,
            base_dir,
            posts_dir,
            public_dir,
            content_path,
        })
    }

    /// Assemble the content store from the configured sources.
    ///
    /// The CMS export is loaded here, once, and handed to the store as an
    /// explicit object; there is no ambient content state anywhere else.
    pub fn content_store(&self) -> Result<content::ContentStore> {
        let filesystem = content::FilesystemSource::new(&self.posts_dir);

        let cms = if self.content_path.exists() {
            content::CmsSource::load(&self.content_path)?
        } else {
            tracing::info!(
                "No CMS export at {:?}, continuing with filesystem content only",
                self.content_path
            );
            content::CmsSource::default()
        };

        let renderer = content::MdxRenderer::with_options(
            &self.config.highlight.theme,
            self.config.highlight.line_number,
        );

        Ok(content::ContentStore::new(filesystem, cms, renderer))
    }

    /// Build the static site
    pub fn build(&self, preview: bool) -> Result<()> {
        commands::build::run(self, preview)
    }

    /// Clean the public directory
    pub fn clean(&self) -> Result<()> {
        commands::clean::run(self)
    }

    /// Create a new post
    pub fn new_post(&self, title: &str) -> Result<()> {
        commands::new::run(self, title)
    }
}
