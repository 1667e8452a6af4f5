//! Operation façades: one parameterized livestream entry point plus the
//! disk-capture variant.

use std::path::{Path, PathBuf};

use tracing::warn;

use crate::config::ConfigDocument;
use crate::engine::command::{build_check_cmd, build_save_cmd, build_stream_cmd, sink};
use crate::engine::error::{Error, Result};
use crate::engine::runner::{self, Listener};
use crate::engine::{ResolvedSettings, SourceKind, StreamOptions};

/// A configured live stream: resolved settings plus the full and quick-check
/// argument vectors, built once.
pub struct Livestream {
    pub settings: ResolvedSettings,
    pub cmd: Vec<String>,
    pub check_cmd: Vec<String>,
    pub sink: String,
}

impl Livestream {
    pub fn new(
        config: &Path,
        site: &str,
        source: SourceKind,
        opts: &StreamOptions,
    ) -> Result<Self> {
        let doc = ConfigDocument::load(config)?;
        let settings = ResolvedSettings::resolve(&doc, config, site, source, opts)?;
        Ok(Self::from_settings(settings))
    }

    /// Build the vectors for already-resolved settings. Pure; the seam the
    /// integration tests use.
    pub fn from_settings(settings: ResolvedSettings) -> Self {
        let cmd = build_stream_cmd(&settings);
        let check_cmd = build_check_cmd(&settings);
        let sink = sink(&settings);
        Self {
            settings,
            cmd,
            check_cmd,
            sink,
        }
    }

    /// The full invocation as one printable line.
    pub fn command_line(&self) -> String {
        shlex::try_join(self.cmd.iter().map(String::as_str))
            .unwrap_or_else(|_| self.cmd.join(" "))
    }

    /// Quick test stream to a null output to verify the device is actually
    /// accessible.
    pub fn check_device(&self) -> Result<bool> {
        runner::check_device(&self.check_cmd)
    }

    /// Run the stream in the foreground until the transcoder exits.
    ///
    /// The "localhost" loopback site starts its own RTMP listener first and
    /// fails fast if that listener dies before the stream starts;
    /// "localhost-test" builds the same vectors but runs without a listener.
    pub fn go_live(&self) -> Result<()> {
        if self.settings.check_first && !self.check_device()? {
            return Err(Error::DeviceUnavailable {
                site: self.settings.site.clone(),
            });
        }

        let mut listener = match self.settings.site.as_str() {
            "localhost" => Some(Listener::start()?),
            _ => None,
        };

        if let Some(l) = listener.as_mut() {
            if let Some(status) = l.poll() {
                return Err(Error::ListenerStopped { status });
            }
        }

        let outcome = runner::run(&self.cmd);

        // Stop the listener before the next stream, or upon final close.
        if let Some(l) = listener.as_mut() {
            l.terminate();
        }

        outcome
    }
}

/// Records a screen capture with audio to disk, using the "file" site
/// section for encoder parameters.
pub struct SaveDisk {
    pub settings: ResolvedSettings,
    pub cmd: Vec<String>,
    pub out: Option<PathBuf>,
}

impl SaveDisk {
    pub fn new(config: &Path, out: Option<PathBuf>, opts: &StreamOptions) -> Result<Self> {
        let doc = ConfigDocument::load(config)?;
        let settings =
            ResolvedSettings::resolve(&doc, config, "file", SourceKind::Screen, opts)?;

        let target = out
            .clone()
            .unwrap_or_else(|| PathBuf::from("<output-file>"));
        let cmd = build_save_cmd(&settings, &target);

        Ok(Self { settings, cmd, out })
    }

    pub fn command_line(&self) -> String {
        shlex::try_join(self.cmd.iter().map(String::as_str))
            .unwrap_or_else(|_| self.cmd.join(" "))
    }

    pub fn save(&self) -> Result<()> {
        match &self.out {
            Some(_) => runner::run(&self.cmd),
            None => {
                warn!("specify a filename to save the screen capture to disk");
                println!("{}", self.command_line());
                Ok(())
            }
        }
    }
}
