//! Initialize a new blog

use anyhow::Result;
use std::fs;
use std::path::Path;

/// Initialize a new site in the given directory
pub fn init_site(target_dir: &Path) -> Result<()> {
    fs::create_dir_all(target_dir)?;
    fs::create_dir_all(target_dir.join("posts"))?;

    let config_content = r#"# mdpress configuration

# Site
title: My Blog
description: ''
author: John Doe
language: en

# URL
url: http://example.com
root: /
blog_dir: blog

# Directory
posts_dir: posts
public_dir: public
content_file: _content.yml

# Content
render_drafts: false
highlight:
  theme: base16-ocean.dark
  line_number: true
"#;
    write_if_absent(&target_dir.join("_config.yml"), config_content)?;

    let content_export = r#"# CMS content export.
# Each entry is a complete document: front matter plus body.
draft: []
published: []
"#;
    write_if_absent(&target_dir.join("_content.yml"), content_export)?;

    let sample_post = r#"---
title: Hello World
slug: hello-world
summary: The first post on this blog.
publishedOn: 2026-01-01
---

# {{ title }}

Welcome to your new blog. Edit `posts/hello-world.mdx` to change this post,
or create another one:

```sh
mdpress new "My second post"
```
"#;
    write_if_absent(&target_dir.join("posts/hello-world.mdx"), sample_post)?;

    Ok(())
}

fn write_if_absent(path: &Path, content: &str) -> Result<()> {
    if path.exists() {
        tracing::warn!("Keeping existing {:?}", path);
        return Ok(());
    }
    fs::write(path, content)?;
    Ok(())
}
