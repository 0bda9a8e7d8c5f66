//! URL helper functions

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};

use crate::config::SiteConfig;

/// Characters that must be encoded inside a path segment
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'<')
    .add(b'>')
    .add(b'`')
    .add(b'#')
    .add(b'?')
    .add(b'{')
    .add(b'}')
    .add(b'%')
    .add(b'/');

/// Generate a URL with the root path
///
/// # Examples
/// ```ignore
/// url_for(&config, "style.css") // -> "/style.css"
/// ```
pub fn url_for(config: &SiteConfig, path: &str) -> String {
    let root = config.root.trim_end_matches('/');
    let path = path.trim_start_matches('/');

    if path.is_empty() {
        format!("{}/", root)
    } else {
        format!("{}/{}", root, path)
    }
}

/// Generate a full URL including the domain
pub fn full_url_for(config: &SiteConfig, path: &str) -> String {
    format!(
        "{}{}",
        config.url.trim_end_matches('/'),
        url_for(config, path)
    )
}

/// Path of the blog index page
pub fn blog_path(config: &SiteConfig) -> String {
    url_for(config, &format!("{}/", config.blog_dir))
}

/// Path of a single post page, slug percent-encoded
pub fn post_path(config: &SiteConfig, slug: &str) -> String {
    let encoded = utf8_percent_encode(slug, PATH_SEGMENT);
    url_for(config, &format!("{}/{}/", config.blog_dir, encoded))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_for() {
        let config = SiteConfig::default();
        assert_eq!(url_for(&config, "style.css"), "/style.css");
        assert_eq!(url_for(&config, ""), "/");
    }

    #[test]
    fn test_blog_and_post_paths() {
        let config = SiteConfig::default();
        assert_eq!(blog_path(&config), "/blog/");
        assert_eq!(post_path(&config, "hello-world"), "/blog/hello-world/");
    }

    #[test]
    fn test_post_path_encodes_slug() {
        let config = SiteConfig::default();
        assert_eq!(post_path(&config, "a b"), "/blog/a%20b/");
    }

    #[test]
    fn test_full_url_for() {
        let config = SiteConfig::default();
        assert_eq!(
            full_url_for(&config, "blog/"),
            "http://example.com/blog/"
        );
    }
}
