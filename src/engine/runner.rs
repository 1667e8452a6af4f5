// External process lifecycle: the transcoder, the quick device check, and
// the loopback RTMP listener.

use std::process::{Child, Command, ExitStatus, Stdio};

use tracing::{debug, info};

use crate::engine::error::{Error, Result};

/// Run the transcoder in the foreground and wait for it.
///
/// One stream invocation is one child process lifecycle; the process bounds
/// its own duration via the `-t` argument, so no external supervision is
/// needed.
pub fn run(cmd: &[String]) -> Result<()> {
    info!("{}", self::display(cmd));

    let status = Command::new(&cmd[0]).args(&cmd[1..]).status()?;

    if status.success() {
        Ok(())
    } else {
        Err(Error::TranscoderFailed { status })
    }
}

/// Quick bounded-duration probe to verify the capture device is reachable.
/// Output is captured, not streamed; failure detail lands in the debug log.
pub fn check_device(check_cmd: &[String]) -> Result<bool> {
    debug!("device check: {}", self::display(check_cmd));

    let output = Command::new(&check_cmd[0]).args(&check_cmd[1..]).output()?;

    if !output.status.success() {
        debug!(
            "device check stderr: {}",
            String::from_utf8_lossy(&output.stderr).trim_end()
        );
    }

    Ok(output.status.success())
}

/// Local RTMP listener used by the "localhost" loopback test site.
pub struct Listener {
    child: Child,
}

impl Listener {
    /// Start a local RTMP player listening for our own stream. Errors show
    /// up in the client, so its exit status is only polled, not parsed.
    pub fn start() -> Result<Self> {
        info!("starting localhost RTMP listener; press q in its window to end");

        let child = Command::new("ffplay")
            .args(["-v", "fatal", "-timeout", "5", "-autoexit", "rtmp://localhost"])
            .stdout(Stdio::null())
            .spawn()?;

        Ok(Self { child })
    }

    /// Exit status if the listener has stopped, None while it runs.
    pub fn poll(&mut self) -> Option<ExitStatus> {
        self.child.try_wait().ok().flatten()
    }

    /// Ask the listener to stop; harmless if it already exited.
    pub fn terminate(&mut self) {
        if self.poll().is_some() {
            return;
        }

        #[cfg(unix)]
        unsafe {
            libc::kill(self.child.id() as libc::pid_t, libc::SIGTERM);
        }

        #[cfg(not(unix))]
        {
            let _ = self.child.kill();
        }
    }
}

fn display(cmd: &[String]) -> String {
    shlex::try_join(cmd.iter().map(String::as_str)).unwrap_or_else(|_| cmd.join(" "))
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn run_surfaces_exit_status() {
        let ok = run(&["true".to_string()]);
        assert!(ok.is_ok());

        let err = run(&["false".to_string()]).unwrap_err();
        assert!(matches!(err, Error::TranscoderFailed { .. }));
    }

    #[test]
    fn check_device_reports_boolean() {
        assert!(check_device(&["true".to_string()]).unwrap());
        assert!(!check_device(&["false".to_string()]).unwrap());
    }
}
