//! Raw-mode guard for the operator's terminal.

use std::io;

use crossterm::terminal;

/// Puts the local terminal into raw mode for the lifetime of the guard, so
/// single keystrokes reach the passthrough without local echo or line
/// buffering. Dropping the guard restores the previous mode.
pub struct RawModeGuard;

impl RawModeGuard {
    pub fn enable() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        if let Err(e) = terminal::disable_raw_mode() {
            log::warn!("failed to restore terminal mode: {e}");
        }
    }
}
