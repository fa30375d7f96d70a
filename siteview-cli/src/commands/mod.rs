//! Command implementations

pub mod highlight;
pub mod inspect;
pub mod run;

use anyhow::{bail, Context, Result};
use siteview_viewer::render::FrameLog;
use siteview_viewer::{
    FileSource, HeadlessRenderer, HttpSource, Viewer, ViewerConfig, ViewerStatus, Viewport,
};
use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;
use std::time::Duration;

/// Where the configuration and the model document come from
pub struct SourceArgs {
    /// Configuration file
    pub config: Option<PathBuf>,
    /// Model URL override
    pub url: Option<String>,
    /// Local model document
    pub file: Option<PathBuf>,
}

impl SourceArgs {
    /// Configuration file if given, defaults otherwise, with the URL override applied
    pub fn load_config(&self) -> Result<ViewerConfig> {
        let mut config = match &self.config {
            Some(path) => ViewerConfig::load(path)
                .with_context(|| format!("loading {}", path.display()))?,
            None => ViewerConfig::default(),
        };
        if let Some(url) = &self.url {
            config.model_url = url.clone();
        }
        Ok(config)
    }

    /// Build a headless viewer over the selected source
    pub fn build_viewer(&self, viewport: Viewport) -> Result<(Viewer, Rc<RefCell<FrameLog>>)> {
        let config = self.load_config()?;
        let renderer = HeadlessRenderer::new();
        let log = renderer.log();

        let viewer = match &self.file {
            Some(path) => Viewer::new(
                config,
                Box::new(FileSource::new(path)),
                Box::new(renderer),
                viewport,
            ),
            None => {
                let timeout = config.load_timeout_secs.map(Duration::from_secs);
                let source = HttpSource::new(config.model_url.clone(), timeout)
                    .context("creating HTTP client")?;
                Viewer::new(config, Box::new(source), Box::new(renderer), viewport)
            }
        };
        Ok((viewer, log))
    }
}

/// Load the model, failing unless the viewer ends up idle
pub async fn load_or_bail(viewer: &Viewer) -> Result<()> {
    let status = viewer.load().await?;
    if status != ViewerStatus::Idle {
        bail!("model could not be loaded (status: {})", status);
    }
    Ok(())
}

/// Parse `WIDTHxHEIGHT`
pub fn parse_size(text: &str) -> Result<Viewport> {
    let (width, height) = text
        .split_once(['x', 'X'])
        .with_context(|| format!("expected WIDTHxHEIGHT, got '{}'", text))?;
    let width: u32 = width.trim().parse().with_context(|| format!("invalid width in '{}'", text))?;
    let height: u32 = height
        .trim()
        .parse()
        .with_context(|| format!("invalid height in '{}'", text))?;
    if width == 0 || height == 0 {
        bail!("viewport size must be non-zero, got '{}'", text);
    }
    Ok(Viewport::new(width, height))
}
