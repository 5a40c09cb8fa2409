//! Bridges crossterm keyboard events into the collector's key channel.
//!
//! Keyboard reads block, so they run on a dedicated OS thread; the poll
//! timeout equals the collector tick so the bridge keeps the same cadence
//! with or without input.

use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tokio::sync::mpsc;

use devcap_capture::KeyInput;

/// Start the keyboard poll loop on a dedicated OS thread.
///
/// Esc maps to the abort signal; every other supported key is forwarded as
/// the raw bytes a vt100 terminal would transmit. The thread ends when the
/// receiving side goes away or the event source fails.
pub fn start_key_thread(tick: Duration, tx: mpsc::Sender<KeyInput>) {
    std::thread::Builder::new()
        .name("keyboard".to_string())
        .spawn(move || loop {
            match event::poll(tick) {
                Ok(true) => {}
                Ok(false) => continue, // no key pressed this tick
                Err(e) => {
                    log::debug!("keyboard poll ended: {e}");
                    return;
                }
            }
            let ev = match event::read() {
                Ok(ev) => ev,
                Err(e) => {
                    log::debug!("keyboard read ended: {e}");
                    return;
                }
            };
            let Event::Key(key) = ev else { continue };
            if key.kind == KeyEventKind::Release {
                continue;
            }
            let Some(input) = translate(key) else { continue };
            if tx.blocking_send(input).is_err() {
                return; // collector gone
            }
        })
        .expect("failed to spawn keyboard thread");
}

/// Map a key event to the bytes an interactive terminal would transmit.
fn translate(key: KeyEvent) -> Option<KeyInput> {
    match key.code {
        KeyCode::Esc => Some(KeyInput::Abort),
        KeyCode::Enter => Some(KeyInput::Bytes(b"\r".to_vec())),
        KeyCode::Tab => Some(KeyInput::Bytes(b"\t".to_vec())),
        KeyCode::Backspace => Some(KeyInput::Bytes(vec![0x7f])),
        KeyCode::Up => Some(KeyInput::Bytes(b"\x1b[A".to_vec())),
        KeyCode::Down => Some(KeyInput::Bytes(b"\x1b[B".to_vec())),
        KeyCode::Right => Some(KeyInput::Bytes(b"\x1b[C".to_vec())),
        KeyCode::Left => Some(KeyInput::Bytes(b"\x1b[D".to_vec())),
        KeyCode::Char(c) => {
            if key.modifiers.contains(KeyModifiers::CONTROL) {
                control_byte(c).map(|b| KeyInput::Bytes(vec![b]))
            } else {
                let mut buf = [0u8; 4];
                Some(KeyInput::Bytes(c.encode_utf8(&mut buf).as_bytes().to_vec()))
            }
        }
        _ => None,
    }
}

/// Control-key encoding: Ctrl-A..Ctrl-Z and the punctuation controls.
fn control_byte(c: char) -> Option<u8> {
    let upper = c.to_ascii_uppercase();
    if upper.is_ascii_uppercase() || "@[\\]^_".contains(upper) {
        Some(upper as u8 & 0x1f)
    } else {
        None
    }
}
