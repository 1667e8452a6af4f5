// Stream configuration document (JSON)

use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::engine::error::{Error, Result};

/// Top-level configuration document.
///
/// Platform sections are keyed by the runtime platform id ("linux", "win32",
/// "darwin"); everything else is global or per-site. Resolution fields are
/// [height, width] pairs.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigDocument {
    /// Transcoder executable override, default "ffmpeg".
    #[serde(default)]
    pub exe: Option<String>,

    /// Prober executable override, default "ffprobe".
    #[serde(default)]
    pub ffprobe_exe: Option<String>,

    #[serde(default)]
    pub audio_rate: Option<String>,

    /// Encoder speed/quality preset, default "veryfast".
    #[serde(default)]
    pub preset: Option<String>,

    #[serde(default)]
    pub camera_size: Option<Vec<u64>>,

    #[serde(default)]
    pub camera_fps: Option<f64>,

    #[serde(default)]
    pub screencap_size: Option<Vec<u64>>,

    #[serde(default)]
    pub screencap_fps: Option<f64>,

    /// Screen capture origin [x, y], default [1, 1].
    #[serde(default)]
    pub screencap_origin: Option<Vec<i64>>,

    /// Overrides the per-site codec default.
    #[serde(default)]
    pub video_codec: Option<String>,

    #[serde(default)]
    pub audio_codec: Option<String>,

    #[serde(default)]
    pub sites: HashMap<String, SiteSection>,

    /// Remaining top-level keys are platform sections.
    #[serde(flatten)]
    pub platforms: HashMap<String, PlatformSection>,
}

/// Capture-device identifiers for one platform.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlatformSection {
    #[serde(default)]
    pub camera_chan: Option<String>,

    #[serde(default)]
    pub screen_chan: Option<String>,

    #[serde(default)]
    pub audio_chan: Option<String>,

    /// Video capture format tag (x11grab, gdigrab, avfoundation, ...).
    #[serde(default)]
    pub vcap: Option<String>,

    /// Audio capture format tag (pulse, dshow, ...), or "null" for silence.
    #[serde(default)]
    pub acap: Option<String>,

    /// Hardware camera capture format tag (v4l2, dshow, avfoundation).
    #[serde(default)]
    pub hcam: Option<String>,

    #[serde(default)]
    pub video_format: Option<String>,
}

/// Per-destination settings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SiteSection {
    #[serde(default)]
    pub url: Option<String>,

    #[serde(default)]
    pub streamid: Option<String>,

    #[serde(default)]
    pub video_kbps: Option<u32>,

    #[serde(default)]
    pub videomax_kbps: Option<u32>,

    #[serde(default)]
    pub audio_bps: Option<String>,

    #[serde(default)]
    pub keyframe_sec: Option<u32>,

    /// Site-level default stream duration cap, seconds.
    #[serde(default)]
    pub timelimit: Option<f64>,
}

impl ConfigDocument {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| Error::ConfigRead {
            path: path.to_path_buf(),
            source: e,
        })?;

        serde_json::from_str(&contents).map_err(|e| Error::ConfigParse {
            path: path.to_path_buf(),
            source: e,
        })
    }

    pub fn platform(&self, id: &str, path: &Path) -> Result<&PlatformSection> {
        self.platforms.get(id).ok_or_else(|| Error::MissingPlatform {
            platform: id.to_string(),
            path: path.to_path_buf(),
        })
    }

    pub fn site(&self, site: &str, path: &Path) -> Result<&SiteSection> {
        self.sites.get(site).ok_or_else(|| Error::MissingSite {
            site: site.to_string(),
            path: path.to_path_buf(),
        })
    }
}

/// Resolve an executable name from an optional config override.
pub fn get_exe(configured: Option<&str>, default: &str) -> String {
    configured
        .filter(|s| !s.is_empty())
        .unwrap_or(default)
        .to_string()
}
