use std::io::{self, Read, Write};

use portable_pty::{native_pty_system, Child, CommandBuilder, MasterPty, PtySize};

use crate::target::SshTarget;

/// Seconds the ssh client waits for the TCP connection before giving up.
const CONNECT_TIMEOUT_SECS: u32 = 10;

/// Errors from session transport operations.
#[derive(Debug)]
pub enum SshError {
    BadTarget(String),
    SpawnFailed(String),
    IoError(io::Error),
}

impl std::fmt::Display for SshError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SshError::BadTarget(msg) => write!(f, "bad target: {msg}"),
            SshError::SpawnFailed(msg) => write!(f, "ssh spawn failed: {msg}"),
            SshError::IoError(err) => write!(f, "ssh I/O error: {err}"),
        }
    }
}

impl std::error::Error for SshError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SshError::IoError(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for SshError {
    fn from(err: io::Error) -> Self {
        SshError::IoError(err)
    }
}

/// Owns the ssh client process running under a local PTY, plus the reader
/// and writer halves of its byte channel.
///
/// The PTY gives the client a controlling terminal, and `-tt` forces PTY
/// allocation on the remote side, so the session behaves like an operator
/// typing at the device.
pub struct SshSession {
    // Kept alive so the PTY pair stays open for the lifetime of the child.
    _master: Box<dyn MasterPty + Send>,
    reader: Option<Box<dyn Read + Send>>,
    writer: Option<Box<dyn Write + Send>>,
    child: Box<dyn Child + Send + Sync>,
    closed: bool,
}

impl SshSession {
    /// Spawn `ssh -tt user@host` under a fresh PTY.
    ///
    /// The remote end sees a vt100 terminal; the connect timeout is fixed at
    /// ten seconds.
    pub fn spawn(target: &SshTarget) -> Result<Self, SshError> {
        let mut cmd = CommandBuilder::new("ssh");
        cmd.arg("-tt");
        cmd.arg("-o");
        cmd.arg(format!("ConnectTimeout={CONNECT_TIMEOUT_SECS}"));
        cmd.arg(target.login());
        cmd.env("TERM", "vt100");
        Self::spawn_command(cmd)
    }

    fn spawn_command(cmd: CommandBuilder) -> Result<Self, SshError> {
        let pty_system = native_pty_system();

        let pair = pty_system
            .openpty(PtySize {
                rows: 24,
                cols: 80,
                pixel_width: 0,
                pixel_height: 0,
            })
            .map_err(|e| SshError::SpawnFailed(format!("failed to open PTY: {e}")))?;

        let child = pair
            .slave
            .spawn_command(cmd)
            .map_err(|e| SshError::SpawnFailed(format!("failed to spawn command: {e}")))?;

        let reader = pair
            .master
            .try_clone_reader()
            .map_err(|e| SshError::SpawnFailed(format!("failed to clone reader: {e}")))?;

        let writer = pair
            .master
            .take_writer()
            .map_err(|e| SshError::SpawnFailed(format!("failed to take writer: {e}")))?;

        Ok(Self {
            _master: pair.master,
            reader: Some(reader),
            writer: Some(writer),
            child,
            closed: false,
        })
    }

    /// Split off the read and write halves for dedicated I/O.
    ///
    /// The session keeps the child handle so it can still be closed and
    /// reaped afterwards. Splitting twice is an error.
    pub fn split(&mut self) -> Result<(Box<dyn Read + Send>, Box<dyn Write + Send>), SshError> {
        match (self.reader.take(), self.writer.take()) {
            (Some(reader), Some(writer)) => Ok((reader, writer)),
            _ => Err(SshError::IoError(io::Error::new(
                io::ErrorKind::BrokenPipe,
                "session already split",
            ))),
        }
    }

    /// Check if the ssh client is still running.
    pub fn is_alive(&mut self) -> bool {
        self.try_wait().is_none()
    }

    /// Get the client exit status if it has exited.
    ///
    /// Returns `None` while the process is still running.
    pub fn try_wait(&mut self) -> Option<u32> {
        match self.child.try_wait() {
            Ok(Some(status)) => Some(status.exit_code()),
            _ => None,
        }
    }

    /// Close the session, killing the ssh client if it is still running.
    ///
    /// Closing twice, or closing after the client already exited, is a
    /// no-op.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        self.writer = None;

        if let Ok(None) = self.child.try_wait() {
            if let Err(e) = self.child.kill() {
                log::debug!("ssh child kill: {e}");
            }
        }
        let _ = self.child.wait();
    }
}

impl Drop for SshSession {
    fn drop(&mut self) {
        self.close();
    }
}
