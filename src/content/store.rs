//! The merged content store
//!
//! One object owns both backends and implements the single merge policy:
//! resolution checks the filesystem first and falls back to the CMS; listing
//! puts CMS entries first, then filesystem entries, deduplicated on slug
//! with the filesystem record winning.

use indexmap::IndexMap;

use super::error::{ContentError, ResolveError};
use super::frontmatter::FrontMatter;
use super::mdx::MdxRenderer;
use super::post::{PagePayload, PostMeta, Provenance, ResolvedPost};
use super::source::{CmsSource, ContentSource, FilesystemSource, RawDoc, Visibility};

/// Unified view over the filesystem and CMS sources
pub struct ContentStore {
    filesystem: FilesystemSource,
    cms: CmsSource,
    renderer: MdxRenderer,
}

impl ContentStore {
    pub fn new(filesystem: FilesystemSource, cms: CmsSource, renderer: MdxRenderer) -> Self {
        Self {
            filesystem,
            cms,
            renderer,
        }
    }

    /// Enumerate the slugs to pre-render at build time.
    ///
    /// Only filesystem posts are enumerated; CMS-only posts are reached
    /// through on-demand rendering instead. A document with bad front matter
    /// is skipped with a warning and never blocks the others; a missing
    /// posts directory is fatal.
    pub fn enumerate_slugs(&self) -> Result<Vec<String>, ContentError> {
        let mut slugs = Vec::new();
        for doc in self.filesystem.list(Visibility::Published)? {
            match FrontMatter::parse(&doc.text) {
                Ok((fm, _)) => slugs.push(fm.slug),
                Err(e) => {
                    tracing::warn!("Skipping {} during enumeration: {}", doc.origin, e);
                }
            }
        }
        Ok(slugs)
    }

    /// Locate the post for a slug: filesystem first, CMS fallback.
    ///
    /// A filesystem hit never falls through to the CMS, even when both
    /// sources carry the slug. When neither matches, the result is a typed
    /// not-found, surfaced upstream as a 404 page.
    pub fn resolve(&self, slug: &str, visibility: Visibility) -> Result<ResolvedPost, ResolveError> {
        if let Some(doc) = self.filesystem.fetch(slug, visibility) {
            tracing::debug!("Resolved {:?} from {}", slug, doc.origin);
            return Ok(parse_doc(doc, Provenance::Filesystem)?);
        }

        match self.cms.fetch(slug, visibility) {
            Some(doc) => {
                tracing::debug!("Resolved {:?} from {}", slug, doc.origin);
                Ok(parse_doc(doc, Provenance::Cms)?)
            }
            None => Err(ResolveError::NotFound(slug.to_string())),
        }
    }

    /// Resolve and render: the full per-page product
    pub fn resolve_page(
        &self,
        slug: &str,
        visibility: Visibility,
    ) -> Result<PagePayload, ResolveError> {
        let post = self.resolve(slug, visibility)?;
        let rendered_body = self
            .renderer
            .render(&post.body, &post.meta)
            .map_err(|source| ContentError::Render {
                slug: post.meta.slug.clone(),
                source,
            })?;

        Ok(PagePayload {
            rendered_body,
            front_matter: post.meta,
        })
    }

    /// Metadata for the index view: CMS entries first, then filesystem
    /// entries, in source order. A slug present in both sources appears
    /// once, with the filesystem record replacing the CMS one in place.
    pub fn list(&self, visibility: Visibility) -> Result<Vec<PostMeta>, ContentError> {
        let mut merged: IndexMap<String, PostMeta> = IndexMap::new();

        for doc in self.cms.list(visibility)? {
            if let Some(meta) = parse_meta(&doc) {
                merged.entry(meta.slug.clone()).or_insert(meta);
            }
        }

        for doc in self.filesystem.list(visibility)? {
            if let Some(meta) = parse_meta(&doc) {
                merged.insert(meta.slug.clone(), meta);
            }
        }

        Ok(merged.into_values().collect())
    }
}

fn parse_doc(doc: RawDoc, provenance: Provenance) -> Result<ResolvedPost, ContentError> {
    let (fm, body) = FrontMatter::parse(&doc.text).map_err(|source| ContentError::FrontMatter {
        origin: doc.origin.clone(),
        source,
    })?;

    Ok(ResolvedPost {
        meta: PostMeta::from_front_matter(&fm),
        body: body.to_string(),
        provenance,
    })
}

/// Parse list-page metadata from one document; a bad document is skipped
/// so it cannot take the whole list down.
fn parse_meta(doc: &RawDoc) -> Option<PostMeta> {
    match FrontMatter::parse(&doc.text) {
        Ok((fm, _)) => Some(PostMeta::from_front_matter(&fm)),
        Err(e) => {
            tracing::warn!("Skipping {} in list: {}", doc.origin, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;

    fn doc(slug: &str, title: &str, body: &str) -> String {
        format!("---\ntitle: {}\nslug: {}\n---\n\n{}\n", title, slug, body)
    }

    fn write_post(dir: &Path, name: &str, content: &str) {
        fs::write(dir.join(format!("{}.mdx", name)), content).unwrap();
    }

    fn store(posts_dir: &Path, cms: CmsSource) -> ContentStore {
        ContentStore::new(FilesystemSource::new(posts_dir), cms, MdxRenderer::new())
    }

    #[test]
    fn test_enumerator_contains_every_valid_slug() {
        let dir = tempfile::tempdir().unwrap();
        write_post(dir.path(), "hello", &doc("hello", "Hello", "Hi."));
        write_post(dir.path(), "world", &doc("world", "World", "There."));

        let store = store(dir.path(), CmsSource::default());
        let slugs = store.enumerate_slugs().unwrap();
        assert!(slugs.contains(&"hello".to_string()));
        assert!(slugs.contains(&"world".to_string()));
    }

    #[test]
    fn test_enumerator_skips_bad_documents() {
        let dir = tempfile::tempdir().unwrap();
        write_post(dir.path(), "good", &doc("good", "Good", "Fine."));
        write_post(dir.path(), "bad", "no front matter at all");

        let store = store(dir.path(), CmsSource::default());
        let slugs = store.enumerate_slugs().unwrap();
        assert_eq!(slugs, vec!["good".to_string()]);
    }

    #[test]
    fn test_enumerator_fails_without_posts_dir() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir.path().join("missing"), CmsSource::default());
        assert!(store.enumerate_slugs().is_err());
    }

    #[test]
    fn test_filesystem_precedence_over_cms() {
        let dir = tempfile::tempdir().unwrap();
        write_post(dir.path(), "shared", &doc("shared", "Disk Copy", "From disk."));
        let cms = CmsSource::new(
            Vec::new(),
            vec![doc("shared", "CMS Copy", "From the CMS.")],
        );

        let store = store(dir.path(), cms);
        let post = store.resolve("shared", Visibility::Published).unwrap();
        assert_eq!(post.provenance, Provenance::Filesystem);
        assert_eq!(post.meta.title, "Disk Copy");
    }

    #[test]
    fn test_cms_only_slug_resolves_when_published() {
        let dir = tempfile::tempdir().unwrap();
        let cms = CmsSource::new(
            Vec::new(),
            vec![doc("cms-only", "From CMS", "CMS body.")],
        );

        let store = store(dir.path(), cms);
        let post = store.resolve("cms-only", Visibility::Published).unwrap();
        assert_eq!(post.provenance, Provenance::Cms);
        assert_eq!(post.meta.title, "From CMS");
    }

    #[test]
    fn test_missing_slug_is_typed_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path(), CmsSource::default());
        let err = store.resolve("missing", Visibility::Published).unwrap_err();
        assert!(matches!(err, ResolveError::NotFound(s) if s == "missing"));
    }

    #[test]
    fn test_preview_exposes_drafts_only_in_preview() {
        let dir = tempfile::tempdir().unwrap();
        let cms = CmsSource::new(vec![doc("wip", "Work in Progress", "Soon.")], Vec::new());
        let store = store(dir.path(), cms);

        assert!(store
            .resolve("wip", Visibility::from_preview(true))
            .is_ok());
        let err = store
            .resolve("wip", Visibility::from_preview(false))
            .unwrap_err();
        assert!(matches!(err, ResolveError::NotFound(_)));
    }

    #[test]
    fn test_list_orders_cms_before_filesystem() {
        let dir = tempfile::tempdir().unwrap();
        write_post(dir.path(), "b-disk", &doc("b-disk", "B", "Disk."));
        let cms = CmsSource::new(Vec::new(), vec![doc("a-cms", "A", "CMS.")]);

        let store = store(dir.path(), cms);
        let metas = store.list(Visibility::Published).unwrap();
        let slugs: Vec<_> = metas.iter().map(|m| m.slug.as_str()).collect();
        assert_eq!(slugs, vec!["a-cms", "b-disk"]);
    }

    #[test]
    fn test_list_deduplicates_with_filesystem_precedence() {
        let dir = tempfile::tempdir().unwrap();
        write_post(dir.path(), "shared", &doc("shared", "Disk Copy", "Disk."));
        let cms = CmsSource::new(
            Vec::new(),
            vec![doc("shared", "CMS Copy", "CMS."), doc("other", "Other", "x.")],
        );

        let store = store(dir.path(), cms);
        let metas = store.list(Visibility::Published).unwrap();
        assert_eq!(metas.len(), 2);
        let shared = metas.iter().find(|m| m.slug == "shared").unwrap();
        assert_eq!(shared.title, "Disk Copy");
    }

    #[test]
    fn test_list_survives_one_bad_document() {
        let dir = tempfile::tempdir().unwrap();
        write_post(dir.path(), "good", &doc("good", "Good", "Fine."));
        write_post(dir.path(), "bad", "---\ntitle: broken\n");
        let cms = CmsSource::new(Vec::new(), vec!["also broken".to_string()]);

        let store = store(dir.path(), cms);
        let metas = store.list(Visibility::Published).unwrap();
        assert_eq!(metas.len(), 1);
        assert_eq!(metas[0].slug, "good");
    }

    #[test]
    fn test_resolve_page_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        write_post(
            dir.path(),
            "hello",
            "---\ntitle: Hello\nslug: hello\n---\n\n# Welcome to {{ title }}\n",
        );

        let store = store(dir.path(), CmsSource::default());
        let payload = store.resolve_page("hello", Visibility::Published).unwrap();
        assert_eq!(payload.front_matter.title, "Hello");
        assert!(payload.rendered_body.html.contains("Welcome to Hello"));
    }

    #[test]
    fn test_resolve_page_malformed_document_is_content_error() {
        let dir = tempfile::tempdir().unwrap();
        write_post(dir.path(), "broken", "---\ntitle: [oops\nslug: broken\n---\n\nBody.\n");

        let store = store(dir.path(), CmsSource::default());
        let err = store
            .resolve_page("broken", Visibility::Published)
            .unwrap_err();
        assert!(matches!(err, ResolveError::Content(_)));
    }
}
