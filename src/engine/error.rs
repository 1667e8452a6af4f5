// Error taxonomy for the stream engine

use std::path::PathBuf;
use std::process::ExitStatus;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("no platform section \"{platform}\" in {path}")]
    MissingPlatform { platform: String, path: PathBuf },

    #[error("no site \"{site}\" under \"sites\" in {path}")]
    MissingSite { site: String, path: PathBuf },

    #[error("need [height, width] for video resolution, got {got:?}")]
    BadResolution { got: Vec<u64> },

    #[error(
        "cannot pick a video bitrate without a resolution; set video_kbps for site \"{site}\" in the config file"
    )]
    ResolutionUnknown { site: String },

    #[error("device check failed for site \"{site}\"")]
    DeviceUnavailable { site: String },

    #[error("loopback listener stopped prematurely with {status}")]
    ListenerStopped { status: ExitStatus },

    #[error("transcoder exited with {status}")]
    TranscoderFailed { status: ExitStatus },

    #[error("failed to read config {path}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
