//! Run the render loop headlessly

use super::{parse_size, SourceArgs};
use anyhow::Result;
use colored::*;
use siteview_viewer::IntervalClock;
use std::time::Duration;
use tokio::sync::mpsc::unbounded_channel;

/// Mount the viewer, load concurrently with the loop and report what was drawn
pub async fn run(
    source: &SourceArgs,
    duration_ms: u64,
    size: &str,
    resize: Option<&str>,
) -> Result<()> {
    let viewport = parse_size(size)?;
    let resize = resize.map(parse_size).transpose()?;

    let (viewer, log) = source.build_viewer(viewport)?;
    let (resize_tx, resize_rx) = unbounded_channel();
    viewer.mount(IntervalClock::new(viewer.config().frame_rate), resize_rx)?;

    let mut status = viewer.subscribe_status();
    let watcher = tokio::task::spawn_local(async move {
        while status.changed().await.is_ok() {
            let current = *status.borrow_and_update();
            println!("{} status: {}", "→".blue().bold(), current);
        }
    });

    let loading = viewer.clone();
    let load = tokio::task::spawn_local(async move { loading.load().await });

    let half = Duration::from_millis(duration_ms / 2);
    tokio::time::sleep(half).await;
    if let Some(viewport) = resize {
        let _ = resize_tx.send(viewport);
    }
    tokio::time::sleep(Duration::from_millis(duration_ms) - half).await;

    let frames = viewer.frame_count();
    let final_status = viewer.status();
    viewer.dispose();
    load.abort();
    watcher.abort();

    let log = log.borrow();
    println!(
        "{} {} frames drawn, {} meshes in last frame, status {}",
        "✓".green(),
        frames,
        log.meshes,
        final_status
    );
    println!("  surface {}x{}, aspect {:.3}", log.size.0, log.size.1, viewer.camera().aspect_ratio);
    Ok(())
}
