//! devcap-ssh: SSH session transport for devcap.
//!
//! Runs the system `ssh` client under a local PTY and exposes it as a
//! byte-oriented duplex channel. devcap never speaks the SSH protocol
//! itself; authentication, encryption, and algorithm negotiation all belong
//! to the client binary.
//!
//! # Architecture
//!
//! - [`SshTarget`] — `[user@]host` endpoint parsing.
//! - [`SshSession`] — spawns the client, splits off the read/write halves,
//!   and owns the child process lifecycle.

pub mod session;
pub mod target;

pub use session::{SshError, SshSession};
pub use target::SshTarget;
