//! Build the static site

use anyhow::Result;

use crate::generator::Generator;
use crate::Press;

/// Pre-render the blog into the public directory
pub fn run(press: &Press, preview: bool) -> Result<()> {
    let start = std::time::Instant::now();

    let generator = Generator::new(press)?;
    generator.generate(preview)?;

    let duration = start.elapsed();
    tracing::info!("Built in {:.2}s", duration.as_secs_f64());

    Ok(())
}
