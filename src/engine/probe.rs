// Media probing via ffprobe

use std::path::Path;
use std::process::Command;

/// Resolution/frame-rate probe for media files.
///
/// Absence is a valid result: an audio-only file has neither a resolution nor
/// a video frame rate, and callers treat `None` as "unconstrained".
pub trait MediaProbe {
    /// (height, width) of the first video stream, if any.
    fn resolution(&self, path: &Path) -> Option<(u32, u32)>;

    /// Frame rate of the first video stream, if any.
    fn frame_rate(&self, path: &Path) -> Option<f64>;
}

/// Probes by shelling out to ffprobe and parsing its JSON output.
pub struct FfprobeProbe {
    pub exe: String,
}

impl FfprobeProbe {
    pub fn new(exe: impl Into<String>) -> Self {
        Self { exe: exe.into() }
    }

    fn first_video_stream(&self, path: &Path) -> Option<serde_json::Value> {
        let output = Command::new(&self.exe)
            .args([
                "-v",
                "quiet",
                "-print_format",
                "json",
                "-show_streams",
                "-select_streams",
                "v:0",
            ])
            .arg(path)
            .output()
            .ok()?;

        if !output.status.success() {
            return None;
        }

        let json: serde_json::Value = serde_json::from_slice(&output.stdout).ok()?;
        json["streams"].as_array()?.first().cloned()
    }
}

impl MediaProbe for FfprobeProbe {
    fn resolution(&self, path: &Path) -> Option<(u32, u32)> {
        let stream = self.first_video_stream(path)?;
        let height = stream["height"].as_u64()? as u32;
        let width = stream["width"].as_u64()? as u32;
        Some((height, width))
    }

    fn frame_rate(&self, path: &Path) -> Option<f64> {
        let stream = self.first_video_stream(path)?;
        let fps_str = stream["avg_frame_rate"]
            .as_str()
            .or_else(|| stream["r_frame_rate"].as_str())?;
        parse_fraction(fps_str)
    }
}

/// Parse a fraction string like "30000/1001" to f64
fn parse_fraction(s: &str) -> Option<f64> {
    let parts: Vec<&str> = s.split('/').collect();
    if parts.len() != 2 {
        return None;
    }

    let numerator: f64 = parts[0].parse().ok()?;
    let denominator: f64 = parts[1].parse().ok()?;

    if denominator == 0.0 {
        return None;
    }

    Some(numerator / denominator)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_fraction() {
        assert_eq!(parse_fraction("30/1"), Some(30.0));

        // Use approximate equality for floating point results
        let result_29_97 = parse_fraction("30000/1001").unwrap();
        assert!(
            (result_29_97 - 29.970029970029973).abs() < 1e-10,
            "Expected ~29.97, got {}",
            result_29_97
        );

        assert_eq!(parse_fraction("60/1"), Some(60.0));
        assert_eq!(parse_fraction("invalid"), None);
        assert_eq!(parse_fraction("30/0"), None);
    }
}
