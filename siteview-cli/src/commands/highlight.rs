//! Highlight parts and report the material swap

use super::{load_or_bail, SourceArgs};
use anyhow::{bail, Result};
use colored::*;
use siteview_viewer::scene::NodeId;
use siteview_viewer::Viewport;

/// Highlight by status or ids, draw a frame, then clear and draw again
pub async fn highlight(source: &SourceArgs, status: Option<i64>, ids: Vec<u32>) -> Result<()> {
    let (viewer, log) = source.build_viewer(Viewport::new(1280, 720))?;
    load_or_bail(&viewer).await?;

    let targets: Vec<NodeId> = match status {
        Some(code) => viewer.nodes_with_status(code),
        None if !ids.is_empty() => ids.into_iter().map(NodeId).collect(),
        None => bail!("pass --status or --ids"),
    };

    let swapped = viewer.highlight_objects(&targets)?;
    viewer.tick(0.0)?;
    println!(
        "{} highlighted {} meshes from {} targets ({} translucent in frame)",
        "→".blue().bold(),
        swapped,
        targets.len(),
        log.borrow().translucent
    );

    viewer.clear_highlight()?;
    viewer.tick(0.0)?;
    let remaining = log.borrow().translucent;
    if viewer.highlighted_count() != 0 {
        bail!("{} meshes still highlighted after clear", viewer.highlighted_count());
    }
    println!("{} cleared, {} translucent meshes left", "✓".green(), remaining);

    viewer.dispose();
    Ok(())
}
