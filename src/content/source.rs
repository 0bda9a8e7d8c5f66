//! Content sources: the posts directory on disk and the CMS export
//!
//! Both backends expose the same two capabilities: list the raw documents
//! visible at a given visibility, and fetch one document by slug. Merging
//! and precedence live in [`super::store::ContentStore`].

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use super::error::ContentError;
use super::frontmatter::FrontMatter;

/// Which CMS document set a request sees. Preview mode swaps the published
/// set for the draft set; it is a substitution, not a union.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Published,
    Draft,
}

impl Visibility {
    pub fn from_preview(preview: bool) -> Self {
        if preview {
            Self::Draft
        } else {
            Self::Published
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Published => "published",
            Self::Draft => "draft",
        }
    }
}

/// A raw document plus where it came from, for diagnostics
#[derive(Debug, Clone)]
pub struct RawDoc {
    pub text: String,
    pub origin: String,
}

/// A backend that can enumerate documents and fetch one by slug
pub trait ContentSource {
    fn list(&self, visibility: Visibility) -> Result<Vec<RawDoc>, ContentError>;
    fn fetch(&self, slug: &str, visibility: Visibility) -> Option<RawDoc>;
}

/// The `posts/` directory: one `.mdx` file per post.
///
/// The filename is the lookup key for `fetch`, but it is not authoritative
/// for identity; the front-matter slug is. A mismatch between the two is a
/// content-authoring error this system does not detect.
pub struct FilesystemSource {
    posts_dir: PathBuf,
}

impl FilesystemSource {
    pub fn new<P: AsRef<Path>>(posts_dir: P) -> Self {
        Self {
            posts_dir: posts_dir.as_ref().to_path_buf(),
        }
    }
}

impl ContentSource for FilesystemSource {
    /// List every `.mdx` document in the posts directory, in filename order.
    /// Visibility does not apply to disk content; every file is listed.
    fn list(&self, _visibility: Visibility) -> Result<Vec<RawDoc>, ContentError> {
        if !self.posts_dir.is_dir() {
            return Err(ContentError::MissingPostsDir(self.posts_dir.clone()));
        }

        let mut paths: Vec<PathBuf> = WalkDir::new(&self.posts_dir)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.path().is_file() && is_mdx_file(e.path()))
            .map(|e| e.into_path())
            .collect();
        paths.sort();

        let mut docs = Vec::new();
        for path in paths {
            match fs::read_to_string(&path) {
                Ok(text) => docs.push(RawDoc {
                    text,
                    origin: path.display().to_string(),
                }),
                Err(e) => {
                    tracing::warn!("Failed to read post {:?}: {}", path, e);
                }
            }
        }

        Ok(docs)
    }

    /// Read `<slug>.mdx`. Any failure here means "no match on disk" and the
    /// caller falls through to the CMS source.
    fn fetch(&self, slug: &str, _visibility: Visibility) -> Option<RawDoc> {
        // Slugs are single path segments; anything else cannot name a post
        // file and must not escape the posts directory.
        if slug.is_empty() || slug == ".." || slug.contains(['/', '\\']) {
            return None;
        }

        let path = self.posts_dir.join(format!("{}.mdx", slug));
        match fs::read_to_string(&path) {
            Ok(text) => Some(RawDoc {
                text,
                origin: path.display().to_string(),
            }),
            Err(e) => {
                tracing::debug!("No readable post at {:?}: {}", path, e);
                None
            }
        }
    }
}

/// On-disk shape of the CMS export file
#[derive(Debug, Deserialize)]
struct CmsExport {
    #[serde(default)]
    draft: Vec<String>,
    #[serde(default)]
    published: Vec<String>,
}

/// CMS-exported documents: two lists of raw document strings, loaded
/// explicitly at startup and passed in where needed. How the export is
/// produced is the CMS's business, not ours.
#[derive(Debug, Clone, Default)]
pub struct CmsSource {
    draft: Vec<String>,
    published: Vec<String>,
}

impl CmsSource {
    pub fn new(draft: Vec<String>, published: Vec<String>) -> Self {
        Self { draft, published }
    }

    /// Load from a YAML export file with `draft` and `published` lists.
    /// Calling this again re-reads the export; there is no implicit reload.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ContentError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ContentError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let export: CmsExport =
            serde_yaml::from_str(&text).map_err(|source| ContentError::Export {
                path: path.to_path_buf(),
                source,
            })?;

        tracing::debug!(
            "Loaded CMS export: {} draft, {} published",
            export.draft.len(),
            export.published.len()
        );

        Ok(Self::new(export.draft, export.published))
    }

    fn set(&self, visibility: Visibility) -> &[String] {
        match visibility {
            Visibility::Draft => &self.draft,
            Visibility::Published => &self.published,
        }
    }
}

impl ContentSource for CmsSource {
    fn list(&self, visibility: Visibility) -> Result<Vec<RawDoc>, ContentError> {
        Ok(self
            .set(visibility)
            .iter()
            .enumerate()
            .map(|(i, text)| RawDoc {
                text: text.clone(),
                origin: format!("cms:{}[{}]", visibility.label(), i),
            })
            .collect())
    }

    /// Scan the selected set for a document whose parsed slug matches.
    /// First match wins when duplicates exist; unparseable documents are
    /// skipped so one bad export entry cannot mask the rest.
    fn fetch(&self, slug: &str, visibility: Visibility) -> Option<RawDoc> {
        for (i, text) in self.set(visibility).iter().enumerate() {
            match FrontMatter::parse(text) {
                Ok((fm, _)) if fm.slug == slug => {
                    return Some(RawDoc {
                        text: text.clone(),
                        origin: format!("cms:{}[{}]", visibility.label(), i),
                    });
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!(
                        "Skipping unparseable CMS document {}[{}]: {}",
                        visibility.label(),
                        i,
                        e
                    );
                }
            }
        }
        None
    }
}

/// Check if a file is an `.mdx` document
fn is_mdx_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e == "mdx")
        .unwrap_or(false)
}
