//! Front-matter parsing

use chrono::{DateTime, Local, NaiveDateTime, TimeZone};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Front-matter parse failure. A malformed block is a hard error for that
/// one document; callers on list paths skip the document rather than abort.
#[derive(Debug, thiserror::Error)]
pub enum FrontMatterError {
    #[error("document has no front-matter block")]
    MissingBlock,

    #[error("front-matter block is not terminated")]
    Unterminated,

    #[error("invalid front-matter YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("front matter has no slug")]
    MissingSlug,
}

/// Metadata header parsed from the top of a document.
///
/// `slug` is required and is the post's route identity. All other recognized
/// keys are optional; unrecognized keys land in `extra` and are exposed to
/// the body as render-time bindings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FrontMatter {
    pub title: Option<String>,
    pub summary: Option<String>,
    pub slug: String,
    #[serde(rename = "publishedOn")]
    pub published_on: Option<String>,

    /// Additional custom fields
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

impl FrontMatter {
    /// Parse front-matter from a document.
    /// Returns (front_matter, remaining_body).
    pub fn parse(content: &str) -> Result<(Self, &str), FrontMatterError> {
        let content = content.trim_start();

        let rest = content
            .strip_prefix("---")
            .ok_or(FrontMatterError::MissingBlock)?;
        let rest = rest.trim_start_matches(['\n', '\r']);

        let end_pos = rest.find("\n---").ok_or(FrontMatterError::Unterminated)?;
        let yaml_content = &rest[..end_pos];
        let remaining = &rest[end_pos + 4..];
        let remaining = remaining.trim_start_matches(['\n', '\r']);

        let fm: FrontMatter = serde_yaml::from_str(yaml_content)?;
        if fm.slug.is_empty() {
            return Err(FrontMatterError::MissingSlug);
        }

        Ok((fm, remaining))
    }

    /// Parse the publish date into a DateTime
    pub fn parse_published_on(&self) -> Option<DateTime<Local>> {
        self.published_on.as_ref().and_then(|s| parse_date_string(s))
    }
}

/// Parse a date string in various formats
pub(crate) fn parse_date_string(s: &str) -> Option<DateTime<Local>> {
    let s = s.trim();

    let formats = [
        "%Y-%m-%d %H:%M:%S",
        "%Y/%m/%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y/%m/%d %H:%M",
        "%Y-%m-%d",
        "%Y/%m/%d",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
    ];

    for fmt in formats {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            if let Some(local) = Local.from_local_datetime(&dt).single() {
                return Some(local);
            }
        }
        if let Ok(d) = chrono::NaiveDate::parse_from_str(s, fmt) {
            let dt = d.and_hms_opt(0, 0, 0)?;
            if let Some(local) = Local.from_local_datetime(&dt).single() {
                return Some(local);
            }
        }
    }

    // Try RFC 3339 / ISO 8601
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Local));
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_frontmatter() {
        let content = r#"---
title: Hello World
slug: hello-world
summary: A first post
publishedOn: 2021-05-12
---

This is the content.
"#;

        let (fm, remaining) = FrontMatter::parse(content).unwrap();
        assert_eq!(fm.title, Some("Hello World".to_string()));
        assert_eq!(fm.slug, "hello-world");
        assert_eq!(fm.summary, Some("A first post".to_string()));
        assert_eq!(fm.published_on, Some("2021-05-12".to_string()));
        assert!(remaining.contains("This is the content."));
    }

    #[test]
    fn test_slug_is_required() {
        let content = "---\ntitle: No Slug Here\n---\n\nBody.\n";
        let err = FrontMatter::parse(content).unwrap_err();
        assert!(matches!(err, FrontMatterError::MissingSlug));
    }

    #[test]
    fn test_missing_block_is_an_error() {
        let err = FrontMatter::parse("Just a body, no header.\n").unwrap_err();
        assert!(matches!(err, FrontMatterError::MissingBlock));
    }

    #[test]
    fn test_unterminated_block_is_an_error() {
        let content = "---\ntitle: Oops\nslug: oops\n\nBody without a closing fence.\n";
        let err = FrontMatter::parse(content).unwrap_err();
        assert!(matches!(err, FrontMatterError::Unterminated));
    }

    #[test]
    fn test_invalid_yaml_is_an_error() {
        let content = "---\ntitle: [unclosed\nslug: x\n---\n\nBody.\n";
        let err = FrontMatter::parse(content).unwrap_err();
        assert!(matches!(err, FrontMatterError::Yaml(_)));
    }

    #[test]
    fn test_extra_fields_are_kept() {
        let content = "---\nslug: extras\nhero: /img/hero.png\n---\n\nBody.\n";
        let (fm, _) = FrontMatter::parse(content).unwrap();
        assert_eq!(
            fm.extra.get("hero").and_then(|v| v.as_str()),
            Some("/img/hero.png")
        );
    }

    #[test]
    fn test_parse_published_on() {
        let fm = FrontMatter {
            slug: "dated".to_string(),
            published_on: Some("2021-05-12 10:30:00".to_string()),
            ..Default::default()
        };

        let dt = fm.parse_published_on().unwrap();
        assert_eq!(dt.format("%Y-%m-%d").to_string(), "2021-05-12");
    }

    #[test]
    fn test_parse_date_only() {
        let dt = parse_date_string("2021/05/12").unwrap();
        assert_eq!(dt.format("%Y-%m-%d").to_string(), "2021-05-12");
        assert!(parse_date_string("not a date").is_none());
    }
}
