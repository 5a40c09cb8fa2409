/// Local keyboard input observed during a collection window.
///
/// Produced by the front-end's keyboard thread and consumed by the
/// collector's passthrough branch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyInput {
    /// The abort key: end the current collection window immediately.
    Abort,
    /// Raw bytes to forward to the remote channel verbatim.
    Bytes(Vec<u8>),
}
