//! devcap-capture: idle-based output collection for interactive sessions.
//!
//! A remote device streams command output in unpredictable chunk sizes and
//! timings, so completion cannot be known in advance; it is inferred from a
//! sustained silence window. This crate owns that debounce loop, the
//! operator passthrough that runs inside it, and the sequencer that drives
//! a command list through it.
//!
//! # Architecture
//!
//! - [`reader::start_reader_thread`] — blocking channel reads on a
//!   dedicated OS thread, bridged into an mpsc of byte chunks.
//! - [`Collector`] — the idle-debounce tick loop over the data channel and
//!   the local key channel.
//! - [`Sequencer`] — sends each command, collects its output, and emits one
//!   record per command into the fixture document.
//!
//! The crate is transport-agnostic: it consumes a chunk channel and a plain
//! `Write` for the remote, so tests script it without a live session.

pub mod collector;
pub mod keys;
pub mod reader;
pub mod sequencer;

pub use collector::{CollectOutcome, Collector, CollectorConfig};
pub use keys::KeyInput;
pub use reader::start_reader_thread;
pub use sequencer::{CaptureError, SequenceReport, Sequencer};
