//! Builds the ffmpeg argument vector from resolved settings.
//!
//! The transcoder is positional: input options precede their `-i`, output
//! options follow all inputs, and the sink comes last. Clause order here is
//! load-bearing and must not be shuffled.
//!
//! Two variants are produced for the same settings: the full stream/save
//! vector, and a quick-check vector that targets a null output for a bounded
//! duration to verify the capture device is reachable.

use std::path::Path;

use crate::engine::bitrate::DEFAULT_FPS;
use crate::engine::platform;
use crate::engine::settings::{ResolvedSettings, SourceKind};

/// Quick-check duration in seconds. 0.1 is enough to open the device;
/// spurious buffer errors on windows were not helped by any bigger value.
pub const CHECK_TIMEOUT: &str = "0.1";

/// Full argument vector for a live stream to the site's sink.
pub fn build_stream_cmd(s: &ResolvedSettings) -> Vec<String> {
    let mut cmd: Vec<String> = vec![s.exe.clone()];

    cmd.extend(log_level(s));
    if s.assume_yes {
        cmd.push("-y".into());
    }
    cmd.extend(queue());

    cmd.extend(video_in(s, false));
    cmd.extend(audio_in(s, false));

    // Captioning a moving image needs a different filter chain; known
    // limitation, the caption is dropped rather than corrupting the graph.
    if !s.moving_image {
        cmd.extend(caption_filter(s));
    }

    cmd.extend(video_out(s));
    cmd.extend(audio_out(s));
    cmd.extend(buffer(s));

    // Terminate output after N seconds, if configured.
    cmd.extend(time_limit(s));

    cmd.push(sink(s));

    cmd
}

/// Bounded-duration probe against a null output; never touches the network.
pub fn build_check_cmd(s: &ResolvedSettings) -> Vec<String> {
    let mut cmd: Vec<String> = vec![s.exe.clone()];

    cmd.extend(log_level(s));
    cmd.extend(["-t".into(), CHECK_TIMEOUT.into()]);

    cmd.extend(video_in(s, true));
    cmd.extend(audio_in(s, true));

    // Cameras need the duration cap on the output side too.
    cmd.extend(["-t".into(), CHECK_TIMEOUT.into(), "-f".into(), "null".into(), "-".into()]);

    cmd
}

/// Disk capture vector; no sink, no buffering clause.
pub fn build_save_cmd(s: &ResolvedSettings, out: &Path) -> Vec<String> {
    let mut cmd: Vec<String> = vec![s.exe.clone()];

    cmd.extend(video_in(s, false));
    cmd.extend(audio_in(s, false));
    cmd.extend(video_out(s));
    cmd.extend(audio_out(s));

    // ffmpeg infers the container from the suffix; this is the fallback.
    if out.extension().is_none() {
        cmd.extend(["-f".into(), "flv".into()]);
    }

    cmd.push(out.display().to_string());

    cmd
}

/// Destination endpoint: URL plus optional stream key, quoted only where the
/// platform shell needs it.
pub fn sink(s: &ResolvedSettings) -> String {
    let sink = format!("{}/{}", s.url, s.stream_id);
    if platform::for_id(&s.platform).quote_sink() {
        format!("\"{sink}\"")
    } else {
        sink
    }
}

fn log_level(s: &ResolvedSettings) -> [String; 2] {
    let level = if s.verbose { "info" } else { "warning" };
    ["-loglevel".into(), level.into()]
}

// Reserved queueing flags, currently none.
fn queue() -> Vec<String> {
    Vec::new()
}

fn video_in(s: &ResolvedSettings, quick: bool) -> Vec<String> {
    let strategy = platform::for_id(&s.platform);

    let v = match s.source {
        SourceKind::Screen => strategy.screen_input(
            s.vcap.as_deref().unwrap_or_default(),
            s.screen_chan.as_deref().unwrap_or_default(),
            s.resolution,
            s.origin,
            quick,
        ),
        SourceKind::Camera => {
            let chan = s
                .camera_chan
                .clone()
                .filter(|c| !c.is_empty())
                .or_else(|| strategy.default_camera_chan().map(String::from))
                .unwrap_or_default();
            vec![
                "-f".into(),
                s.hcam.clone().unwrap_or_default(),
                "-i".into(),
                chan,
            ]
        }
        SourceKind::File | SourceKind::AudioOnly => return file_in(s, quick),
    };

    // Capture devices on macOS want an explicit pixel format before the
    // input; files error with "option pixel_format not found".
    match (&s.video_format, strategy.capture_pix_fmt()) {
        (Some(fmt), true) => {
            let mut prefixed = vec!["-pix_fmt".to_string(), fmt.clone()];
            prefixed.extend(v);
            prefixed
        }
        _ => v,
    }
}

/// Input clause for file streams, audio+image streams and microphone-only.
fn file_in(s: &ResolvedSettings, quick: bool) -> Vec<String> {
    let mut v: Vec<String> = Vec::new();

    // -re paces software-only sources at realtime; never for real capture
    // devices (camera, microphone).
    if s.source == SourceKind::File {
        v.push("-re".into());
    }

    if s.static_image {
        if !quick {
            v.extend(["-loop".into(), "1".into()]);
        }
        if let Some(image) = &s.image {
            v.extend(["-f".into(), "image2".into(), "-i".into(), image.display().to_string()]);
        }
    } else if s.moving_image {
        if let Some(image) = &s.image {
            v.extend(["-i".into(), image.display().to_string()]);
        }
    } else if s.loop_input {
        if !quick {
            v.extend(["-stream_loop".into(), "-1".into()]);
        }
    }

    // Audio (for image+audio) or the video file itself.
    if let Some(infile) = &s.input_file {
        v.extend(["-i".into(), infile.display().to_string()]);
    }

    v
}

fn video_out(s: &ResolvedSettings) -> Vec<String> {
    // Pure audio: no video output clause at all.
    let Some(_) = s.resolution else {
        return Vec::new();
    };

    let mut v = vec!["-codec:v".to_string(), s.video_codec.clone()];

    if let Some(fmt) = &s.video_format {
        v.extend(["-pix_fmt".into(), fmt.clone()]);
    }

    // Don't use -tune stillimage: it pushes keyframes/bitrate far off what
    // streaming sites want.
    v.extend(["-preset".into(), s.preset.clone()]);

    let fps = s.fps.unwrap_or(DEFAULT_FPS);

    if s.video_kbps > 0 {
        v.extend(["-b:v".into(), format!("{}k", s.video_kbps)]);
        v.extend(["-g".into(), format_num(f64::from(s.keyframe_sec) * fps)]);
    } else {
        // Adaptive delivery: let the muxer segment and pick rates.
        v.extend(["-f".into(), "hls".into()]);
    }

    // Pin the output frame rate for image-backed streams so pacing stays
    // stable with no moving input.
    if s.image.is_some() {
        v.extend(["-r".into(), format_num(fps)]);
    }

    v
}

fn audio_active(s: &ResolvedSettings) -> bool {
    s.audio_bps.is_some() && s.acap.is_some() && s.audio_chan.is_some() && s.audio_rate.is_some()
}

fn audio_in(s: &ResolvedSettings, _quick: bool) -> Vec<String> {
    if !audio_active(s) {
        return Vec::new();
    }

    // File sources carry their own audio.
    if s.source == SourceKind::File {
        return Vec::new();
    }

    let chan = s.audio_chan.clone().unwrap_or_default();

    if s.acap.as_deref() == Some("null") {
        // Silent generator normalized in during resolution.
        vec!["-f".into(), "lavfi".into(), "-i".into(), chan]
    } else {
        vec!["-f".into(), s.acap.clone().unwrap_or_default(), "-i".into(), chan]
    }
}

fn audio_out(s: &ResolvedSettings) -> Vec<String> {
    if !audio_active(s) {
        return Vec::new();
    }

    let mut o: Vec<String> = Vec::new();

    if let Some(codec) = &s.audio_codec {
        o.extend(["-codec:a".into(), codec.clone()]);
    }
    if let Some(bps) = &s.audio_bps {
        o.extend(["-b:a".into(), bps.clone()]);
    }
    if let Some(rate) = &s.audio_rate {
        o.extend(["-ar".into(), rate.clone()]);
    }

    o
}

fn caption_filter(s: &ResolvedSettings) -> Vec<String> {
    let Some(caption) = &s.caption else {
        return Vec::new();
    };

    vec![
        "-vf".into(),
        format!(
            "drawtext=text='{caption}':fontcolor=white:fontsize=24:\
box=1:boxcolor=black@0.5:boxborderw=5:x=(w-text_w)/2:y=(h-text_h)*3/4"
        ),
    ]
}

/// Network buffering: latency vs. robustness tradeoff.
fn buffer(s: &ResolvedSettings) -> Vec<String> {
    let mut buf: Vec<String> = Vec::new();

    if let Some(max) = s.videomax_kbps {
        buf.extend(["-maxrate".into(), format!("{max}k")]);
    }

    if s.video_kbps > 0 {
        buf.extend(["-bufsize".into(), format!("{}k", s.video_kbps / 2)]);
    }

    // Static image + audio: end with the audio instead of looping forever.
    if s.static_image {
        buf.push("-shortest".into());
    }

    // Container must be explicit when streaming to the web.
    buf.extend(["-f".into(), "flv".into()]);

    buf
}

fn time_limit(s: &ResolvedSettings) -> Vec<String> {
    match s.time_limit {
        Some(t) => vec!["-t".into(), format_num(t)],
        None => Vec::new(),
    }
}

/// Integral values print without a trailing ".0" so vectors stay stable
/// across float/int config spellings.
fn format_num(x: f64) -> String {
    if x.fract() == 0.0 && x.abs() < 1e15 {
        format!("{}", x as i64)
    } else {
        format!("{x}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn base_settings() -> ResolvedSettings {
        ResolvedSettings {
            source: SourceKind::Camera,
            site: "facebook".into(),
            platform: "linux".into(),
            exe: "ffmpeg".into(),
            probe_exe: "ffprobe".into(),
            url: "rtmps://live-api-s.facebook.com:443/rtmp".into(),
            stream_id: "fbkey".into(),
            resolution: Some((720, 1280)),
            fps: Some(30.0),
            video_codec: "libx264".into(),
            audio_codec: Some("aac".into()),
            video_kbps: 2500,
            videomax_kbps: Some(4000),
            audio_bps: Some("128000".into()),
            audio_rate: Some("44100".into()),
            audio_chan: Some("default".into()),
            acap: Some("pulse".into()),
            keyframe_sec: 2,
            preset: "veryfast".into(),
            caption: None,
            image: None,
            moving_image: false,
            static_image: false,
            input_file: None,
            loop_input: false,
            time_limit: None,
            camera_chan: Some("/dev/video0".into()),
            screen_chan: Some(":0.0".into()),
            origin: (1, 1),
            vcap: Some("x11grab".into()),
            hcam: Some("v4l2".into()),
            video_format: Some("yuv420p".into()),
            assume_yes: false,
            verbose: false,
            check_first: false,
        }
    }

    #[test]
    fn deterministic_for_same_settings() {
        let s = base_settings();
        assert_eq!(build_stream_cmd(&s), build_stream_cmd(&s));
        assert_eq!(build_check_cmd(&s), build_check_cmd(&s));
    }

    #[test]
    fn clause_order_is_stable() {
        let s = base_settings();
        let cmd = build_stream_cmd(&s);
        assert_eq!(cmd[0], "ffmpeg");
        assert_eq!(&cmd[1..3], &["-loglevel", "warning"]);
        assert_eq!(*cmd.last().unwrap(), "rtmps://live-api-s.facebook.com:443/rtmp/fbkey");
    }

    #[test]
    fn gop_is_keyframe_seconds_times_fps() {
        let cmd = build_stream_cmd(&base_settings());
        let g = cmd.iter().position(|a| a == "-g").unwrap();
        assert_eq!(cmd[g + 1], "60");

        let mut s = base_settings();
        s.fps = Some(29.97);
        let cmd = build_stream_cmd(&s);
        let g = cmd.iter().position(|a| a == "-g").unwrap();
        assert_eq!(cmd[g + 1], "59.94");
    }

    #[test]
    fn zero_bitrate_switches_to_hls() {
        let mut s = base_settings();
        s.video_kbps = 0;
        let cmd = build_stream_cmd(&s);
        assert!(!cmd.iter().any(|a| a == "-b:v"));
        assert!(!cmd.iter().any(|a| a == "-bufsize"));
        let f = cmd.iter().position(|a| a == "hls").unwrap();
        assert_eq!(cmd[f - 1], "-f");
    }

    #[test]
    fn audio_clauses_all_or_nothing() {
        let complete = build_stream_cmd(&base_settings());
        assert!(complete.iter().any(|a| a == "-b:a"));
        assert!(complete.windows(2).any(|w| w == ["-f", "pulse"]));

        for strip in 0..4 {
            let mut s = base_settings();
            match strip {
                0 => s.audio_bps = None,
                1 => s.audio_rate = None,
                2 => s.audio_chan = None,
                _ => s.acap = None,
            }
            let cmd = build_stream_cmd(&s);
            assert!(!cmd.iter().any(|a| a == "-b:a"), "strip {strip}");
            assert!(!cmd.iter().any(|a| a == "-ar"), "strip {strip}");
            assert!(!cmd.iter().any(|a| a == "-codec:a"), "strip {strip}");
            assert!(!cmd.windows(2).any(|w| w == ["-f", "pulse"]), "strip {strip}");
        }
    }

    #[test]
    fn file_source_omits_audio_input_but_keeps_output() {
        let mut s = base_settings();
        s.source = SourceKind::File;
        s.input_file = Some(PathBuf::from("movie.avi"));
        let cmd = build_stream_cmd(&s);
        assert!(!cmd.windows(2).any(|w| w == ["-f", "pulse"]));
        assert!(cmd.iter().any(|a| a == "-codec:a"));
        // realtime pacing for file sources
        assert!(cmd.iter().any(|a| a == "-re"));
        assert!(cmd.windows(2).any(|w| w == ["-i", "movie.avi"]));
    }

    #[test]
    fn caption_iff_no_moving_image() {
        let mut s = base_settings();
        s.caption = Some("hello world".into());
        let cmd = build_stream_cmd(&s);
        assert!(cmd.iter().any(|a| a.starts_with("drawtext=text='hello world'")));

        s.moving_image = true;
        let cmd = build_stream_cmd(&s);
        assert!(!cmd.iter().any(|a| a.starts_with("drawtext")));

        s.moving_image = false;
        s.caption = None;
        let cmd = build_stream_cmd(&s);
        assert!(!cmd.iter().any(|a| a == "-vf"));
    }

    #[test]
    fn check_cmd_targets_null_not_the_sink() {
        let s = base_settings();
        let check = build_check_cmd(&s);
        let real_sink = sink(&s);
        assert!(!check.contains(&real_sink));
        assert_eq!(check.last().unwrap(), "-");
        assert!(check.windows(2).any(|w| w == ["-f", "null"]));
        // bounded on both input and output
        assert_eq!(check.iter().filter(|a| *a == "-t").count(), 2);
    }

    #[test]
    fn static_image_gets_loop_shortest_and_pinned_rate() {
        let mut s = base_settings();
        s.source = SourceKind::AudioOnly;
        s.image = Some(PathBuf::from("logo.png"));
        s.static_image = true;
        s.fps = None;
        let cmd = build_stream_cmd(&s);
        assert!(cmd.windows(2).any(|w| w == ["-loop", "1"]));
        assert!(cmd.windows(2).any(|w| w == ["-f", "image2"]));
        assert!(cmd.iter().any(|a| a == "-shortest"));
        // -r only because an image is present; default 30 with no probed fps
        assert!(cmd.windows(2).any(|w| w == ["-r", "30"]));

        // quick check drops the loop refinement
        let check = build_check_cmd(&s);
        assert!(!check.windows(2).any(|w| w == ["-loop", "1"]));
        assert!(check.windows(2).any(|w| w == ["-f", "image2"]));
    }

    #[test]
    fn looped_video_only_in_full_mode() {
        let mut s = base_settings();
        s.source = SourceKind::File;
        s.input_file = Some(PathBuf::from("movie.avi"));
        s.loop_input = true;
        let cmd = build_stream_cmd(&s);
        assert!(cmd.windows(2).any(|w| w == ["-stream_loop", "-1"]));
        let check = build_check_cmd(&s);
        assert!(!check.iter().any(|a| a == "-stream_loop"));
    }

    #[test]
    fn pure_audio_skips_video_output() {
        let mut s = base_settings();
        s.source = SourceKind::AudioOnly;
        s.resolution = None;
        s.fps = None;
        let cmd = build_stream_cmd(&s);
        assert!(!cmd.iter().any(|a| a == "-codec:v"));
        assert!(!cmd.iter().any(|a| a == "-preset"));
        assert!(cmd.iter().any(|a| a == "-codec:a"));
    }

    #[test]
    fn null_sentinel_reads_from_lavfi() {
        let mut s = base_settings();
        s.source = SourceKind::AudioOnly;
        s.acap = Some("null".into());
        s.audio_chan = Some("anullsrc=sample_rate=48000:channel_layout=stereo".into());
        let cmd = build_stream_cmd(&s);
        assert!(cmd.windows(2).any(|w| w == ["-f", "lavfi"]));
        assert!(cmd.iter().any(|a| a.starts_with("anullsrc=")));
    }

    #[test]
    fn windows_sink_is_quoted() {
        let mut s = base_settings();
        s.platform = "win32".into();
        assert_eq!(sink(&s), "\"rtmps://live-api-s.facebook.com:443/rtmp/fbkey\"");
        let s = base_settings();
        assert_eq!(sink(&s), "rtmps://live-api-s.facebook.com:443/rtmp/fbkey");
    }

    #[test]
    fn time_limit_appended_before_sink() {
        let mut s = base_settings();
        s.time_limit = Some(10.0);
        let cmd = build_stream_cmd(&s);
        let n = cmd.len();
        assert_eq!(&cmd[n - 3..], &["-t", "10", sink(&s).as_str()]);
    }

    #[test]
    fn buffer_size_is_half_the_video_bitrate() {
        let cmd = build_stream_cmd(&base_settings());
        let b = cmd.iter().position(|a| a == "-bufsize").unwrap();
        assert_eq!(cmd[b + 1], "1250k");
        let m = cmd.iter().position(|a| a == "-maxrate").unwrap();
        assert_eq!(cmd[m + 1], "4000k");
    }

    #[test]
    fn save_cmd_has_no_sink_and_falls_back_to_flv() {
        let mut s = base_settings();
        s.source = SourceKind::Screen;
        let cmd = build_save_cmd(&s, Path::new("capture"));
        assert_eq!(cmd.last().unwrap(), "capture");
        assert!(cmd.windows(2).any(|w| w == ["-f", "flv"]));

        let cmd = build_save_cmd(&s, Path::new("capture.mkv"));
        assert!(!cmd.windows(2).any(|w| w == ["-f", "flv"]));
        assert!(!cmd.iter().any(|a| a == "-maxrate"));
    }
}
