use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "livecast")]
#[command(about = "Livestream screen, camera, microphone or file sources with ffmpeg", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbose transcoder and log output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Options shared by every streaming subcommand.
#[derive(Args)]
pub struct StreamArgs {
    /// Site to stream to, e.g. localhost youtube facebook twitch
    pub site: String,

    /// JSON file with stream parameters such as the stream key
    pub config: PathBuf,

    /// No confirmation dialog
    #[arg(short = 'y', long = "yes")]
    pub assume_yes: bool,

    /// Stop streaming after this many seconds
    #[arg(short, long)]
    pub timeout: Option<f64>,

    /// Verify the capture device with a quick null-output run first
    #[arg(long)]
    pub check: bool,

    /// Text overlaid on the video
    #[arg(long)]
    pub caption: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Livestream the webcam
    Camera {
        #[command(flatten)]
        stream: StreamArgs,
    },

    /// Livestream the microphone, with an optional still-image background
    Microphone {
        #[command(flatten)]
        stream: StreamArgs,

        /// Background image (still photo, or gif/avi/ogv/mp4 for motion)
        #[arg(long)]
        image: Option<PathBuf>,
    },

    /// Livestream the desktop
    Screen {
        #[command(flatten)]
        stream: StreamArgs,
    },

    /// Livestream a video file
    File {
        #[command(flatten)]
        stream: StreamArgs,

        /// Media file to stream
        input: PathBuf,

        /// Loop the file indefinitely
        #[arg(long)]
        r#loop: bool,
    },

    /// Record a screen capture with audio to disk
    SaveDisk {
        /// JSON file with stream parameters
        config: PathBuf,

        /// Output file; prints the would-be command when omitted
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// No confirmation dialog
        #[arg(short = 'y', long = "yes")]
        assume_yes: bool,

        /// Stop recording after this many seconds
        #[arg(short, long)]
        timeout: Option<f64>,
    },
}

pub fn parse() -> Cli {
    Cli::parse()
}
