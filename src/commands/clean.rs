//! Clean the public directory

use anyhow::Result;
use std::fs;

use crate::Press;

/// Delete everything the build produced
pub fn run(press: &Press) -> Result<()> {
    if press.public_dir.exists() {
        fs::remove_dir_all(&press.public_dir)?;
        tracing::info!("Deleted: {:?}", press.public_dir);
    }

    Ok(())
}
