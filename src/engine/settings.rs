//! Merges the config document, site section, platform section and per-source
//! overrides into one immutable settings record for the command builder.

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::config::{ConfigDocument, get_exe};
use crate::engine::bitrate;
use crate::engine::error::{Error, Result};
use crate::engine::platform;
use crate::engine::probe::{FfprobeProbe, MediaProbe};

/// Animated background formats; everything else is treated as a still.
const MOVING_IMAGE_EXTS: &[&str] = &["gif", "avi", "ogv", "mp4"];

/// Which capture path feeds the video input clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Camera,
    Screen,
    File,
    AudioOnly,
}

/// Per-operation overrides supplied by the caller.
#[derive(Debug, Clone, Default)]
pub struct StreamOptions {
    /// Still or moving background image for audio streams.
    pub image: Option<PathBuf>,

    /// Media file for file-based sources.
    pub input_file: Option<PathBuf>,

    /// Loop file input indefinitely.
    pub loop_input: bool,

    pub caption: Option<String>,

    /// Skip confirmation, pass -y to the transcoder.
    pub assume_yes: bool,

    pub verbose: bool,

    /// Stop streaming after this many seconds; site default applies when
    /// unset.
    pub timeout: Option<f64>,

    /// Run the quick device check before going live.
    pub check_first: bool,
}

/// Everything the command builder needs, resolved once and read-only after.
#[derive(Debug, Clone)]
pub struct ResolvedSettings {
    pub source: SourceKind,
    pub site: String,
    pub platform: String,

    pub exe: String,
    pub probe_exe: String,

    pub url: String,
    pub stream_id: String,

    /// (height, width); required for any video output.
    pub resolution: Option<(u32, u32)>,
    pub fps: Option<f64>,

    pub video_codec: String,
    pub audio_codec: Option<String>,

    /// kbps; 0 means adaptive/segmented output instead of a fixed bitrate.
    pub video_kbps: u32,
    pub videomax_kbps: Option<u32>,

    // The four audio identifiers; clauses are emitted only when the unit is
    // complete (or the null sentinel was normalized to a silent generator).
    pub audio_bps: Option<String>,
    pub audio_rate: Option<String>,
    pub audio_chan: Option<String>,
    pub acap: Option<String>,

    pub keyframe_sec: u32,
    pub preset: String,

    pub caption: Option<String>,

    pub image: Option<PathBuf>,
    pub moving_image: bool,
    pub static_image: bool,

    pub input_file: Option<PathBuf>,
    pub loop_input: bool,

    pub time_limit: Option<f64>,

    pub camera_chan: Option<String>,
    pub screen_chan: Option<String>,
    pub origin: (i64, i64),
    pub vcap: Option<String>,
    pub hcam: Option<String>,
    pub video_format: Option<String>,

    pub assume_yes: bool,
    pub verbose: bool,
    pub check_first: bool,
}

impl ResolvedSettings {
    /// Resolve against the running platform, probing with ffprobe.
    pub fn resolve(
        doc: &ConfigDocument,
        doc_path: &Path,
        site: &str,
        source: SourceKind,
        opts: &StreamOptions,
    ) -> Result<Self> {
        let probe = FfprobeProbe::new(get_exe(doc.ffprobe_exe.as_deref(), "ffprobe"));
        Self::resolve_with(doc, doc_path, site, source, opts, platform::current().id(), &probe)
    }

    /// Resolution against an explicit platform id and probe implementation.
    /// The seam tests use to avoid a real ffprobe.
    pub fn resolve_with(
        doc: &ConfigDocument,
        doc_path: &Path,
        site: &str,
        source: SourceKind,
        opts: &StreamOptions,
        platform_id: &str,
        probe: &dyn MediaProbe,
    ) -> Result<Self> {
        let site = site.to_lowercase();

        let syscfg = doc.platform(platform_id, doc_path)?;

        if std::env::var("XDG_SESSION_TYPE").as_deref() == Ok("wayland") {
            warn!("Wayland may only give black output. Try X11");
        }

        let sitecfg = doc.site(&site, doc_path)?;

        let (resolution, fps, origin) = match source {
            SourceKind::Camera => (
                check_resolution(doc.camera_size.as_deref())?,
                doc.camera_fps,
                default_origin(None),
            ),
            SourceKind::Screen => (
                check_resolution(doc.screencap_size.as_deref())?,
                doc.screencap_fps,
                default_origin(doc.screencap_origin.as_deref()),
            ),
            SourceKind::File | SourceKind::AudioOnly => {
                // Background image supplies the resolution for audio+image
                // streams; the media file supplies the frame rate.
                let res = if let Some(image) = &opts.image {
                    probe.resolution(image)
                } else if source == SourceKind::File {
                    opts.input_file.as_deref().and_then(|f| probe.resolution(f))
                } else {
                    None
                };
                let fps = opts.input_file.as_deref().and_then(|f| probe.frame_rate(f));
                (res, fps, default_origin(None))
            }
        };

        // Camera and screen grabs never have a background image.
        let (moving_image, static_image) = match source {
            SourceKind::File | SourceKind::AudioOnly => classify_image(opts.image.as_deref()),
            _ => (false, false),
        };

        // Normalize the "null" audio sentinel into a silent generator so the
        // builder stays pure.
        let mut audio_bps = sitecfg.audio_bps.clone();
        let mut audio_rate = doc.audio_rate.clone();
        let mut audio_chan = syscfg.audio_chan.clone();
        let mut acap = syscfg.acap.clone();
        if audio_chan.as_deref() == Some("null") || acap.as_deref() == Some("null") {
            acap = Some("null".to_string());
            audio_bps = audio_bps.or_else(|| Some("128000".to_string()));
            let rate = audio_rate.get_or_insert_with(|| "48000".to_string()).clone();
            audio_chan = Some(format!(
                "anullsrc=sample_rate={rate}:channel_layout=stereo"
            ));
        }

        let video_codec = doc
            .video_codec
            .clone()
            .unwrap_or_else(|| bitrate::default_video_codec(&site).to_string());

        let video_kbps = match sitecfg.video_kbps {
            Some(kbps) => kbps,
            None => {
                let horiz = match (resolution, source) {
                    (Some((_h, w)), _) => w,
                    (None, SourceKind::File | SourceKind::AudioOnly) => {
                        info!("assuming 480p input");
                        480
                    }
                    (None, _) => return Err(Error::ResolutionUnknown { site }),
                };
                bitrate::recommend(&site, fps, horiz)
            }
        };

        Ok(Self {
            source,
            platform: platform_id.to_string(),
            exe: get_exe(doc.exe.as_deref(), "ffmpeg"),
            probe_exe: get_exe(doc.ffprobe_exe.as_deref(), "ffprobe"),
            url: sitecfg.url.clone().unwrap_or_default(),
            stream_id: sitecfg.streamid.clone().unwrap_or_default(),
            resolution,
            fps,
            video_codec,
            audio_codec: doc.audio_codec.clone(),
            video_kbps,
            videomax_kbps: sitecfg.videomax_kbps,
            audio_bps,
            audio_rate,
            audio_chan,
            acap,
            keyframe_sec: sitecfg.keyframe_sec.unwrap_or(2),
            preset: doc.preset.clone().unwrap_or_else(|| "veryfast".to_string()),
            caption: opts.caption.clone().filter(|c| !c.is_empty()),
            image: opts.image.clone(),
            moving_image,
            static_image,
            input_file: opts.input_file.clone(),
            loop_input: opts.loop_input,
            time_limit: opts.timeout.or(sitecfg.timelimit),
            camera_chan: syscfg.camera_chan.clone(),
            screen_chan: syscfg.screen_chan.clone(),
            origin,
            vcap: syscfg.vcap.clone(),
            hcam: syscfg.hcam.clone(),
            video_format: syscfg.video_format.clone(),
            assume_yes: opts.assume_yes,
            verbose: opts.verbose,
            check_first: opts.check_first,
            site,
        })
    }
}

fn check_resolution(res: Option<&[u64]>) -> Result<Option<(u32, u32)>> {
    match res {
        None => Ok(None),
        Some([h, w]) => Ok(Some((*h as u32, *w as u32))),
        Some(other) => Err(Error::BadResolution { got: other.to_vec() }),
    }
}

fn default_origin(origin: Option<&[i64]>) -> (i64, i64) {
    match origin {
        Some([x, y, ..]) => (*x, *y),
        _ => (1, 1),
    }
}

fn classify_image(image: Option<&Path>) -> (bool, bool) {
    match image {
        Some(p) => {
            // Assumes GIF is animated.
            let moving = p
                .extension()
                .and_then(|e| e.to_str())
                .map(|e| MOVING_IMAGE_EXTS.contains(&e.to_ascii_lowercase().as_str()))
                .unwrap_or(false);
            (moving, !moving)
        }
        None => (false, false),
    }
}
