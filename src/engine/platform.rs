//! Platform capture strategies.
//!
//! Each supported platform wires capture devices into ffmpeg differently: the
//! screen-origin offset is embedded in the channel string on linux but passed
//! as separate flags on windows, macOS wants an explicit capture pixel format
//! before the input, and windows needs the sink quoted for shell safety. Those
//! quirks live here so each platform stays independently testable.

/// Platform id as the config document keys it.
pub fn current_platform() -> &'static str {
    if cfg!(windows) {
        "win32"
    } else if cfg!(target_os = "macos") {
        "darwin"
    } else {
        "linux"
    }
}

pub trait CapturePlatform {
    fn id(&self) -> &'static str;

    /// Screen-grab input clause: capture format, optional explicit size
    /// (full mode only), then the platform's channel/origin syntax.
    fn screen_input(
        &self,
        vcap: &str,
        chan: &str,
        size: Option<(u32, u32)>,
        origin: (i64, i64),
        quick: bool,
    ) -> Vec<String>;

    /// Whether `-pix_fmt <video_format>` must precede the capture input.
    /// Applies to screen and camera grabs, never to file inputs.
    fn capture_pix_fmt(&self) -> bool {
        false
    }

    /// Fallback camera channel when the config leaves it unset.
    fn default_camera_chan(&self) -> Option<&'static str> {
        None
    }

    /// Whether the sink URL needs surrounding double quotes.
    fn quote_sink(&self) -> bool {
        false
    }
}

fn size_clause(size: Option<(u32, u32)>, quick: bool) -> Vec<String> {
    match size {
        Some((h, w)) if !quick => vec!["-s".into(), format!("{h}x{w}")],
        _ => Vec::new(),
    }
}

pub struct Linux;
pub struct Windows;
pub struct MacOs;

impl CapturePlatform for Linux {
    fn id(&self) -> &'static str {
        "linux"
    }

    fn screen_input(
        &self,
        vcap: &str,
        chan: &str,
        size: Option<(u32, u32)>,
        origin: (i64, i64),
        quick: bool,
    ) -> Vec<String> {
        let mut v = vec!["-f".to_string(), vcap.to_string()];
        v.extend(size_clause(size, quick));
        if quick {
            v.extend(["-i".into(), chan.to_string()]);
        } else {
            v.extend(["-i".into(), format!("{chan}+{},{}", origin.0, origin.1)]);
        }
        v
    }
}

impl CapturePlatform for Windows {
    fn id(&self) -> &'static str {
        "win32"
    }

    fn screen_input(
        &self,
        vcap: &str,
        chan: &str,
        size: Option<(u32, u32)>,
        origin: (i64, i64),
        quick: bool,
    ) -> Vec<String> {
        let mut v = vec!["-f".to_string(), vcap.to_string()];
        v.extend(size_clause(size, quick));
        if !quick {
            v.extend([
                "-offset_x".into(),
                origin.0.to_string(),
                "-offset_y".into(),
                origin.1.to_string(),
            ]);
        }
        v.extend(["-i".into(), chan.to_string()]);
        v
    }

    fn quote_sink(&self) -> bool {
        true
    }
}

impl CapturePlatform for MacOs {
    fn id(&self) -> &'static str {
        "darwin"
    }

    fn screen_input(
        &self,
        vcap: &str,
        chan: &str,
        size: Option<(u32, u32)>,
        _origin: (i64, i64),
        quick: bool,
    ) -> Vec<String> {
        let mut v = vec!["-f".to_string(), vcap.to_string()];
        v.extend(size_clause(size, quick));
        v.extend(["-i".into(), chan.to_string()]);
        v
    }

    fn capture_pix_fmt(&self) -> bool {
        // "option pixel_format not found" when applied to file inputs
        true
    }

    fn default_camera_chan(&self) -> Option<&'static str> {
        Some("default")
    }
}

/// Strategy for a config platform key; unknown ids get the linux behavior.
pub fn for_id(id: &str) -> &'static dyn CapturePlatform {
    match id {
        "win32" => &Windows,
        "darwin" => &MacOs,
        _ => &Linux,
    }
}

/// Strategy for the running platform, selected once at startup.
pub fn current() -> &'static dyn CapturePlatform {
    for_id(current_platform())
}
