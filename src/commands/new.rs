//! Create a new post

use anyhow::Result;
use std::fs;

use crate::Press;

/// Create a new `.mdx` post skeleton in the posts directory
pub fn run(press: &Press, title: &str) -> Result<()> {
    let slug = slug::slugify(title);
    let now = chrono::Local::now();

    fs::create_dir_all(&press.posts_dir)?;
    let file_path = press.posts_dir.join(format!("{}.mdx", slug));

    if file_path.exists() {
        anyhow::bail!("File already exists: {:?}", file_path);
    }

    let content = format!(
        r#"---
title: {}
slug: {}
summary:
publishedOn: {}
---

"#,
        title,
        slug,
        now.format("%Y-%m-%d")
    );

    fs::write(&file_path, content)?;
    println!("Created: {:?}", file_path);

    Ok(())
}
