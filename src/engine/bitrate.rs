//! Per-site bitrate and codec recommendations.
//!
//! Breakpoint tables follow the published encoder guides of the streaming
//! sites; the lookup picks the lowest breakpoint at or above the requested
//! resolution axis and clamps to the top tier beyond the last breakpoint.

/// Default frames/sec when a source does not report one.
pub const DEFAULT_FPS: f64 = 30.0;

// Col0: resolution axis in pixels. Col1: video kbps. Ascending.

// Static images barely move; far lower bitrates look fine on stream.
const BR_STATIC: &[(u32, u32)] = &[
    (240, 200),
    (480, 400),
    (720, 800),
    (1080, 1200),
    (1440, 2000),
    (2160, 4000),
];

const BR_30: &[(u32, u32)] = &[(360, 700), (480, 1250), (720, 2500), (1080, 4500)];

const BR_60: &[(u32, u32)] = &[(720, 4000), (1080, 6000)];

/// Suggested video codec for a given site.
///
/// YouTube: https://support.google.com/youtube/answer/2853702
/// Facebook: https://www.facebook.com/business/help/162540111070395
/// Owncast: https://owncast.online/docs/codecs/
pub fn default_video_codec(site: &str) -> &'static str {
    match site {
        "youtube" => "libx265",
        _ => "libx264",
    }
}

/// Recommended video bitrate in kbps for a site, frame rate and resolution
/// axis. Returns 0 for sites that use HLS adaptive delivery, meaning no fixed
/// bitrate should be set.
pub fn recommend(site: &str, fps: Option<f64>, horiz_res: u32) -> u32 {
    let (br30, br60) = match site {
        // HLS manages segmenting and bitrate itself.
        "youtube" | "owncast" => return 0,
        _ => (BR_30, BR_60),
    };

    let table = match fps {
        None => BR_STATIC,
        Some(f) if f < 20.0 => BR_STATIC,
        Some(f) if f <= 35.0 => br30,
        Some(_) => br60,
    };

    lookup(table, horiz_res)
}

fn lookup(table: &[(u32, u32)], horiz_res: u32) -> u32 {
    let idx = table.partition_point(|&(res, _)| res < horiz_res);
    // Above the top breakpoint, clamp to the top tier.
    let idx = idx.min(table.len() - 1);
    table[idx].1
}
