//! List site content

use anyhow::Result;

use crate::content::Visibility;
use crate::Press;

/// Print every post the merged content view currently exposes
pub fn run(press: &Press, preview: bool) -> Result<()> {
    let store = press.content_store()?;
    let metas = store.list(Visibility::from_preview(preview))?;

    println!(
        "Posts ({}){}:",
        metas.len(),
        if preview { " [preview]" } else { "" }
    );
    for meta in metas {
        let date = meta
            .published_date()
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "----------".to_string());
        println!("  {} - {} [{}]", date, meta.title, meta.slug);
    }

    Ok(())
}
