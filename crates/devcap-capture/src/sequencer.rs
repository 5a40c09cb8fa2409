//! Drives the ordered command list against the collector.

use std::io::{self, Write};

use devcap_yaml::DocumentWriter;

use crate::collector::{CollectOutcome, Collector};

/// Errors from a capture run.
#[derive(Debug)]
pub enum CaptureError {
    /// The transport closed before any banner or prompt arrived; the
    /// connection never came up.
    ConnectionSetup,
    IoError(io::Error),
}

impl std::fmt::Display for CaptureError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CaptureError::ConnectionSetup => {
                write!(f, "connection closed before the initial prompt arrived")
            }
            CaptureError::IoError(err) => write!(f, "capture I/O error: {err}"),
        }
    }
}

impl std::error::Error for CaptureError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CaptureError::IoError(err) => Some(err),
            CaptureError::ConnectionSetup => None,
        }
    }
}

impl From<io::Error> for CaptureError {
    fn from(err: io::Error) -> Self {
        CaptureError::IoError(err)
    }
}

/// Summary of a finished run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SequenceReport {
    /// Commands actually sent to the remote.
    pub commands_sent: usize,
    /// True when the transport closed before the command list finished.
    pub disconnected: bool,
}

/// Sends each command, collects its settled output, and emits one record
/// per command.
///
/// Send and collect are strictly sequential: the sequencer is the only
/// writer to the remote for the lifetime of the run (the collector borrows
/// the writer for keystroke passthrough inside each window).
pub struct Sequencer<R: Write> {
    collector: Collector,
    remote: R,
}

impl<R: Write> Sequencer<R> {
    pub fn new(collector: Collector, remote: R) -> Self {
        Self { collector, remote }
    }

    /// Run the whole capture: init record, one record per command, trailer.
    ///
    /// A disconnect mid-sequence stops the loop but still finalizes the
    /// document, so the records captured up to that point are preserved.
    /// A record is only written once its collection window ends; a command
    /// never sent leaves no trace in the document.
    pub async fn run<W, EW>(
        &mut self,
        commands: &[String],
        doc: &mut DocumentWriter<W>,
        echo: &mut EW,
    ) -> Result<SequenceReport, CaptureError>
    where
        W: Write,
        EW: Write + ?Sized,
    {
        doc.header()?;

        // Capture the banner and first prompt before anything is sent.
        let (banner, outcome) = self.collector.collect(&mut self.remote, echo).await;
        if outcome == CollectOutcome::Disconnected && banner.is_empty() {
            doc.finish()?;
            return Err(CaptureError::ConnectionSetup);
        }
        doc.init_record(&banner)?;
        doc.begin_commands()?;

        let mut report = SequenceReport {
            commands_sent: 0,
            disconnected: outcome == CollectOutcome::Disconnected,
        };

        if !report.disconnected {
            for command in commands {
                // A broken operator terminal must not abandon the document.
                if let Err(e) = writeln!(echo, "\r\n### Sending {command}...\r")
                    .and_then(|()| echo.flush())
                {
                    log::debug!("operator echo failed: {e}");
                }

                if let Err(e) = self.send_command(command) {
                    log::warn!("connection closed while sending {command}: {e}");
                    report.disconnected = true;
                    break;
                }
                report.commands_sent += 1;

                let (output, outcome) = self.collector.collect(&mut self.remote, echo).await;
                doc.command_record(command, &output)?;

                if outcome == CollectOutcome::Disconnected {
                    log::warn!("connection closed while collecting output for {command}");
                    report.disconnected = true;
                    break;
                }
            }
        }

        doc.finish()?;
        Ok(report)
    }

    fn send_command(&mut self, command: &str) -> io::Result<()> {
        self.remote.write_all(command.as_bytes())?;
        self.remote.write_all(b"\n")?;
        self.remote.flush()
    }

    /// Recover the remote writer, mainly for tests.
    pub fn into_remote(self) -> R {
        self.remote
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::CollectorConfig;
    use crate::keys::KeyInput;
    use std::io;
    use std::time::Duration;
    use tokio::sync::mpsc;

    const TRAILER: &str = "oxidized_output: |\n\
        \x20 !! needs to be written by hand or copy & paste from model output\n";

    struct Harness {
        sequencer: Sequencer<Vec<u8>>,
        data_tx: Option<mpsc::Sender<Vec<u8>>>,
        key_tx: mpsc::Sender<KeyInput>,
    }

    fn harness() -> Harness {
        let (data_tx, data_rx) = mpsc::channel(64);
        let (key_tx, key_rx) = mpsc::channel(16);
        let config = CollectorConfig {
            tick: Duration::from_millis(100),
            idle_timeout: Duration::from_secs(5),
        };
        let collector = Collector::new(data_rx, key_rx, config);
        Harness {
            sequencer: Sequencer::new(collector, Vec::new()),
            data_tx: Some(data_tx),
            key_tx,
        }
    }

    fn commands(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn doc_text(doc: DocumentWriter<Vec<u8>>) -> String {
        String::from_utf8(doc.into_inner().unwrap()).unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_document_has_init_and_commands_in_order() {
        let mut h = harness();
        let data_tx = h.data_tx.take().unwrap();
        data_tx.send(b"Welcome\r\nswitch> ".to_vec()).await.unwrap();

        let mut doc = DocumentWriter::new(Some(Vec::new()));
        let report = h
            .sequencer
            .run(
                &commands(&["show version", "show clock"]),
                &mut doc,
                &mut io::sink(),
            )
            .await
            .unwrap();

        assert_eq!(report.commands_sent, 2);
        assert!(!report.disconnected);

        let text = doc_text(doc);
        assert_eq!(
            text,
            format!(
                "---\n\
                 init_prompt: |-\n\
                 \x20 Welcome\n\
                 \x20 switch>\\x20\n\
                 commands:\n\
                 \x20 show version: |-\n\
                 \x20 show clock: |-\n\
                 {TRAILER}"
            )
        );

        // Both commands were sent to the remote, in order, with a line
        // terminator each.
        assert_eq!(h.sequencer.into_remote(), b"show version\nshow clock\n");
    }

    #[tokio::test(start_paused = true)]
    async fn test_disconnect_preserves_earlier_records() {
        let mut h = harness();
        let data_tx = h.data_tx.take().unwrap();

        let feeder = tokio::spawn(async move {
            data_tx.send(b"switch> ".to_vec()).await.unwrap();
            // Past the init window, during the first command's collection.
            tokio::time::sleep(Duration::from_secs(7)).await;
            data_tx.send(b"IOS 15.2\r\n".to_vec()).await.unwrap();
            // Dropping the sender here closes the channel mid-sequence.
        });

        let mut doc = DocumentWriter::new(Some(Vec::new()));
        let report = h
            .sequencer
            .run(
                &commands(&["show version", "show clock"]),
                &mut doc,
                &mut io::sink(),
            )
            .await
            .unwrap();
        feeder.await.unwrap();

        assert_eq!(report.commands_sent, 1);
        assert!(report.disconnected);

        let text = doc_text(doc);
        // The first command's partial output is preserved...
        assert!(text.contains("  show version: |-\n    IOS 15.2\n"));
        // ...and the second command is absent entirely, not empty.
        assert!(!text.contains("show clock"));
        // The document is still finalized.
        assert!(text.ends_with(TRAILER));
    }

    #[tokio::test(start_paused = true)]
    async fn test_immediate_close_is_a_setup_failure() {
        let mut h = harness();
        drop(h.data_tx.take());

        let mut doc = DocumentWriter::new(Some(Vec::new()));
        let result = h
            .sequencer
            .run(&commands(&["show version"]), &mut doc, &mut io::sink())
            .await;

        assert!(matches!(result, Err(CaptureError::ConnectionSetup)));

        // No command was ever sent.
        assert!(h.sequencer.into_remote().is_empty());
        // The document is still closed out.
        let text = doc_text(doc);
        assert_eq!(text, format!("---\n{TRAILER}"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_abort_skips_ahead_to_the_next_command() {
        let mut h = harness();
        let data_tx = h.data_tx.take().unwrap();
        let key_tx = h.key_tx.clone();

        let feeder = tokio::spawn(async move {
            data_tx.send(b"switch> ".to_vec()).await.unwrap();
            // Abort lands during the init window, after the banner drained.
            tokio::time::sleep(Duration::from_secs(1)).await;
            key_tx.send(KeyInput::Abort).await.unwrap();
            // Keep the data sender alive through the command windows.
            tokio::time::sleep(Duration::from_secs(30)).await;
        });

        let mut doc = DocumentWriter::new(Some(Vec::new()));
        let report = h
            .sequencer
            .run(
                &commands(&["show version", "show clock"]),
                &mut doc,
                &mut io::sink(),
            )
            .await
            .unwrap();

        // The abort only ended the init window; the sequence went on.
        assert_eq!(report.commands_sent, 2);
        assert!(!report.disconnected);

        let text = doc_text(doc);
        assert!(text.contains("init_prompt: |-\n  switch>\\x20\n"));
        assert!(text.contains("  show version: |-\n"));
        assert!(text.contains("  show clock: |-\n"));
        feeder.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn test_keystroke_write_failure_still_finalizes_document() {
        struct FailingWriter;

        impl Write for FailingWriter {
            fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
                Err(io::Error::new(io::ErrorKind::BrokenPipe, "pty writer closed"))
            }

            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }

        let (data_tx, data_rx) = mpsc::channel(64);
        let (key_tx, key_rx) = mpsc::channel(16);
        let config = CollectorConfig {
            tick: Duration::from_millis(100),
            idle_timeout: Duration::from_secs(5),
        };
        let collector = Collector::new(data_rx, key_rx, config);
        let mut sequencer = Sequencer::new(collector, FailingWriter);

        let feeder = tokio::spawn(async move {
            data_tx.send(b"switch> ".to_vec()).await.unwrap();
            // The operator types during the init window, but the remote
            // writer is already dead.
            tokio::time::sleep(Duration::from_secs(1)).await;
            key_tx.send(KeyInput::Bytes(b"q".to_vec())).await.unwrap();
            tokio::time::sleep(Duration::from_secs(10)).await;
        });

        let mut doc = DocumentWriter::new(Some(Vec::new()));
        let report = sequencer
            .run(&commands(&["show version"]), &mut doc, &mut io::sink())
            .await
            .unwrap();
        feeder.abort();

        // The failed write counts as a disconnect, not a fatal error: the
        // banner captured so far is recorded and the document is closed out.
        assert_eq!(report.commands_sent, 0);
        assert!(report.disconnected);

        let text = doc_text(doc);
        assert!(text.contains("init_prompt: |-\n  switch>\\x20\n"));
        assert!(!text.contains("show version"));
        assert!(text.ends_with(TRAILER));
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_command_list_yields_no_command_records() {
        let mut h = harness();
        let data_tx = h.data_tx.take().unwrap();
        data_tx.send(b"switch> ".to_vec()).await.unwrap();

        let mut doc = DocumentWriter::new(Some(Vec::new()));
        let report = h
            .sequencer
            .run(&[], &mut doc, &mut io::sink())
            .await
            .unwrap();

        assert_eq!(report.commands_sent, 0);
        let text = doc_text(doc);
        assert_eq!(
            text,
            format!(
                "---\n\
                 init_prompt: |-\n\
                 \x20 switch>\\x20\n\
                 commands:\n\
                 {TRAILER}"
            )
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_operator_sees_progress_announcements() {
        let mut h = harness();
        let data_tx = h.data_tx.take().unwrap();
        data_tx.send(b"switch> ".to_vec()).await.unwrap();

        let mut doc: DocumentWriter<Vec<u8>> = DocumentWriter::new(None);
        let mut echo = Vec::new();
        h.sequencer
            .run(&commands(&["show clock"]), &mut doc, &mut echo)
            .await
            .unwrap();

        let text = String::from_utf8(echo).unwrap();
        // Live passthrough of received output plus the progress line.
        assert!(text.contains("switch> "));
        assert!(text.contains("### Sending show clock..."));
    }
}
