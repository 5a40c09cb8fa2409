//! Dedicated reader thread that bridges blocking channel reads into the
//! collector's data channel.
//!
//! The session reader blocks, so it gets its own OS thread; the collector
//! only ever sees ready chunks on the mpsc side.

use std::io::Read;

use tokio::sync::mpsc;

/// Start the blocking read loop on a dedicated OS thread.
///
/// The thread ends on EOF, on a read error, or when the receiving side goes
/// away; ending drops the sender, and that closed channel is how the
/// collector observes disconnection.
pub fn start_reader_thread(mut reader: Box<dyn Read + Send>, tx: mpsc::Sender<Vec<u8>>) {
    std::thread::Builder::new()
        .name("session-read".to_string())
        .spawn(move || {
            let mut buf = [0u8; 8192];
            loop {
                let n = match reader.read(&mut buf) {
                    Ok(0) => return, // EOF — remote side closed
                    Ok(n) => n,
                    Err(e) => {
                        log::debug!("session read ended: {e}");
                        return;
                    }
                };
                if tx.blocking_send(buf[..n].to_vec()).is_err() {
                    return; // collector gone
                }
            }
        })
        .expect("failed to spawn reader thread");
}
