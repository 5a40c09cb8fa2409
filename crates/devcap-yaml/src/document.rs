use std::io::{self, Write};

use crate::encode::encode_block;

/// Indent for the `init_prompt` block scalar.
const INIT_INDENT: &str = "  ";
/// Indent for per-command block scalars under `commands:`.
const COMMAND_INDENT: &str = "    ";

/// Streams the fixture document, one record at a time.
///
/// Records are written as they are produced; nothing buffers the whole
/// document. A `None` destination turns every operation into a no-op so a
/// run without an output file still drives the session normally and simply
/// discards the document.
pub struct DocumentWriter<W: Write> {
    out: Option<W>,
}

impl<W: Write> DocumentWriter<W> {
    pub fn new(out: Option<W>) -> Self {
        Self { out }
    }

    /// Opening document marker.
    pub fn header(&mut self) -> io::Result<()> {
        self.write_line("---")
    }

    /// The captured banner and first prompt, as the `init_prompt` block.
    pub fn init_record(&mut self, raw: &[u8]) -> io::Result<()> {
        self.write_line("init_prompt: |-")?;
        for line in encode_block(raw, INIT_INDENT) {
            self.write_line(&line)?;
        }
        Ok(())
    }

    /// Opens the `commands:` mapping.
    pub fn begin_commands(&mut self) -> io::Result<()> {
        self.write_line("commands:")
    }

    /// One captured command, keyed by its literal text.
    pub fn command_record(&mut self, command: &str, raw: &[u8]) -> io::Result<()> {
        self.write_line(&format!("  {command}: |-"))?;
        for line in encode_block(raw, COMMAND_INDENT) {
            self.write_line(&line)?;
        }
        Ok(())
    }

    /// Fixed trailer: the field a human fills in after capture.
    pub fn finish(&mut self) -> io::Result<()> {
        self.write_line("oxidized_output: |")?;
        self.write_line("  !! needs to be written by hand or copy & paste from model output")?;
        if let Some(out) = self.out.as_mut() {
            out.flush()?;
        }
        Ok(())
    }

    /// Recover the destination, mainly so tests can inspect what was
    /// written.
    pub fn into_inner(self) -> Option<W> {
        self.out
    }

    fn write_line(&mut self, line: &str) -> io::Result<()> {
        if let Some(out) = self.out.as_mut() {
            writeln!(out, "{line}")?;
        }
        Ok(())
    }
}
