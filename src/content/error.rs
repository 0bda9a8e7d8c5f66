//! Error types for content loading and page resolution

use std::path::PathBuf;

use super::frontmatter::FrontMatterError;
use super::mdx::RenderError;

/// Failure to turn raw content into a usable record.
#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    /// The posts directory is a required deployment artifact; its absence
    /// is fatal for enumeration and listing.
    #[error("posts directory {0:?} does not exist")]
    MissingPostsDir(PathBuf),

    #[error("failed to read {path:?}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid CMS export {path:?}")]
    Export {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("malformed front matter in {origin}")]
    FrontMatter {
        origin: String,
        #[source]
        source: FrontMatterError,
    },

    #[error("failed to render body for slug {slug:?}")]
    Render {
        slug: String,
        #[source]
        source: RenderError,
    },
}

/// Outcome of page resolution for a requested slug.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    /// The slug matched neither the filesystem nor the CMS source. This is
    /// an expected outcome, surfaced to the route layer as a 404 page.
    #[error("no post found for slug {0:?}")]
    NotFound(String),

    #[error(transparent)]
    Content(#[from] ContentError),
}
