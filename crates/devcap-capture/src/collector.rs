//! Idle-based output collection over the session's data channel.

use std::io::Write;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;

use crate::keys::KeyInput;

/// Tunables for a collection window.
#[derive(Debug, Clone, Copy)]
pub struct CollectorConfig {
    /// Loop granularity. Also the cadence bound for the keyboard poll on
    /// the front-end side.
    pub tick: Duration,
    /// Continuous silence required before output counts as settled. The
    /// single most important tunable; exposed on the CLI.
    pub idle_timeout: Duration,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            tick: Duration::from_millis(100),
            idle_timeout: Duration::from_secs(5),
        }
    }
}

impl CollectorConfig {
    /// Number of consecutive silent ticks that ends a collection window.
    fn max_idle_ticks(&self) -> u64 {
        let ticks = self.idle_timeout.as_millis() / self.tick.as_millis().max(1);
        (ticks as u64).max(1)
    }
}

/// How a collection window ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectOutcome {
    /// The silence window elapsed; the output has settled.
    Idle,
    /// The operator pressed the abort key.
    Aborted,
    /// The transport is gone: the data channel closed, or a write to the
    /// remote or the operator terminal failed.
    Disconnected,
}

/// Consumes remote output and local keystrokes until the output settles.
///
/// The collector cannot know how much output a command produces or how the
/// transport chunks it; it watches a high-water mark on the buffer length
/// and ends the window after [`CollectorConfig::idle_timeout`] of silence.
pub struct Collector {
    data_rx: mpsc::Receiver<Vec<u8>>,
    key_rx: mpsc::Receiver<KeyInput>,
    config: CollectorConfig,
}

impl Collector {
    pub fn new(
        data_rx: mpsc::Receiver<Vec<u8>>,
        key_rx: mpsc::Receiver<KeyInput>,
        config: CollectorConfig,
    ) -> Self {
        Self {
            data_rx,
            key_rx,
            config,
        }
    }

    /// Collect output for one command.
    ///
    /// Returns exactly the bytes received since the call began, plus the
    /// reason the window closed. `remote` receives forwarded keystrokes;
    /// `echo` gets every received chunk verbatim so the operator can follow
    /// along live.
    ///
    /// Forwarded input is not output: it touches neither the idle counter
    /// nor the high-water mark. Only received channel data resets the
    /// timer. A failed write to either side means the transport or the
    /// operator terminal is gone; the window closes as a disconnect, with
    /// the bytes collected so far, instead of raising an error.
    pub async fn collect<RW, EW>(
        &mut self,
        remote: &mut RW,
        echo: &mut EW,
    ) -> (Vec<u8>, CollectOutcome)
    where
        RW: Write + ?Sized,
        EW: Write + ?Sized,
    {
        let mut buffer: Vec<u8> = Vec::new();
        let mut high_water = 0usize;
        let mut idle_ticks = 0u64;
        let max_idle = self.config.max_idle_ticks();
        let mut keys_open = true;

        let mut interval = tokio::time::interval(self.config.tick);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // The first tick completes immediately; swallow it so the first
        // counted tick measures one full interval.
        interval.tick().await;

        loop {
            tokio::select! {
                // Keys are polled before data, so a remote that streams
                // faster than the loop drains cannot starve the abort key.
                biased;

                key = self.key_rx.recv(), if keys_open => match key {
                    Some(KeyInput::Abort) => return (buffer, CollectOutcome::Aborted),
                    Some(KeyInput::Bytes(bytes)) => {
                        if let Err(e) = remote.write_all(&bytes).and_then(|()| remote.flush()) {
                            log::warn!("remote write failed: {e}");
                            return (buffer, CollectOutcome::Disconnected);
                        }
                    }
                    // Keyboard source gone; keep collecting without
                    // passthrough.
                    None => keys_open = false,
                },

                chunk = self.data_rx.recv() => match chunk {
                    Some(bytes) => {
                        buffer.extend_from_slice(&bytes);
                        if let Err(e) = echo.write_all(&bytes).and_then(|()| echo.flush()) {
                            log::warn!("operator echo failed: {e}");
                            return (buffer, CollectOutcome::Disconnected);
                        }
                    }
                    // Reader thread saw EOF or an error. Return promptly
                    // instead of waiting out the idle window on a dead
                    // transport.
                    None => return (buffer, CollectOutcome::Disconnected),
                },

                _ = interval.tick() => {
                    if buffer.len() > high_water {
                        high_water = buffer.len();
                        idle_ticks = 0;
                    } else {
                        idle_ticks += 1;
                        if idle_ticks >= max_idle {
                            return (buffer, CollectOutcome::Idle);
                        }
                    }
                }
            }
        }
    }
}
