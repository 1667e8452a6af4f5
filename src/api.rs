//! Importable entry points, one per video source kind.
//!
//! ```no_run
//! use livecast::api;
//! use livecast::engine::StreamOptions;
//! use std::path::Path;
//!
//! api::stream_screen(Path::new("livecast.json"), "twitch", &StreamOptions::default())?;
//! # anyhow::Ok(())
//! ```

use std::path::{Path, PathBuf};

use crate::engine::error::Result;
use crate::engine::{SourceKind, StreamOptions};
use crate::live::{Livestream, SaveDisk};

/// Stream a video file (or audio file plus background image) to a site.
pub fn stream_file(
    config: &Path,
    site: &str,
    video_file: PathBuf,
    loop_input: bool,
    opts: &StreamOptions,
) -> Result<()> {
    let opts = StreamOptions {
        input_file: Some(video_file),
        loop_input,
        ..opts.clone()
    };
    Livestream::new(config, site, SourceKind::File, &opts)?.go_live()
}

/// Livestream audio, with an optional still-image background.
pub fn stream_microphone(
    config: &Path,
    site: &str,
    still_image: Option<PathBuf>,
    opts: &StreamOptions,
) -> Result<()> {
    let opts = StreamOptions {
        image: still_image,
        ..opts.clone()
    };
    Livestream::new(config, site, SourceKind::AudioOnly, &opts)?.go_live()
}

pub fn stream_camera(config: &Path, site: &str, opts: &StreamOptions) -> Result<()> {
    Livestream::new(config, site, SourceKind::Camera, opts)?.go_live()
}

pub fn stream_screen(config: &Path, site: &str, opts: &StreamOptions) -> Result<()> {
    Livestream::new(config, site, SourceKind::Screen, opts)?.go_live()
}

/// Record a screen capture with audio to disk.
pub fn capture_screen(config: &Path, out_file: Option<PathBuf>, opts: &StreamOptions) -> Result<()> {
    SaveDisk::new(config, out_file, opts)?.save()
}
