//! Post models

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::frontmatter::{parse_date_string, FrontMatter};
use super::mdx::RenderedBody;

/// Parsed metadata for one post. Identity is the slug; a collision across
/// the merged corpus resolves by source precedence, not by erroring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostMeta {
    pub slug: String,
    pub title: String,
    pub summary: String,
    #[serde(rename = "publishedOn", skip_serializing_if = "Option::is_none")]
    pub published_on: Option<String>,

    /// Custom front-matter fields
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

impl PostMeta {
    /// Build metadata from parsed front matter, filling display fallbacks.
    pub fn from_front_matter(fm: &FrontMatter) -> Self {
        Self {
            slug: fm.slug.clone(),
            title: fm.title.clone().unwrap_or_else(|| fm.slug.clone()),
            summary: fm.summary.clone().unwrap_or_default(),
            published_on: fm.published_on.clone(),
            extra: fm.extra.clone(),
        }
    }

    /// Parse the publish date, if one was given
    pub fn published_date(&self) -> Option<DateTime<Local>> {
        self.published_on.as_deref().and_then(parse_date_string)
    }
}

/// Which source a resolved post came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provenance {
    Filesystem,
    Cms,
}

/// A located post: parsed metadata plus the raw body, front matter stripped
#[derive(Debug, Clone)]
pub struct ResolvedPost {
    pub meta: PostMeta,
    pub body: String,
    pub provenance: Provenance,
}

/// Everything needed to paint one post page. Produced fresh per build or
/// request and handed to the presentation layer; never cached in memory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PagePayload {
    #[serde(rename = "renderedBody")]
    pub rendered_body: RenderedBody,
    #[serde(rename = "frontMatter")]
    pub front_matter: PostMeta,
}

impl PagePayload {
    /// Serialize for the in-page JSON island consumed by client hydration.
    /// `<` is escaped so a literal `</script>` inside a body cannot
    /// terminate the island early.
    pub fn to_json(&self) -> serde_json::Result<String> {
        Ok(serde_json::to_string(self)?.replace('<', "\\u003c"))
    }
}
