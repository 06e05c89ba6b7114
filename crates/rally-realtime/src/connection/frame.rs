//! Transport-neutral WebSocket frames.

/// A single WebSocket frame as seen by the connection loops.
///
/// The HTTP layer converts its framework's message type to and from this
/// enum so the loops can be driven by any sink/stream pair, including
/// in-process channels in tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// UTF-8 payload carrying one wire message.
    Text(String),
    /// Keepalive probe.
    Ping(Vec<u8>),
    /// Keepalive answer.
    Pong(Vec<u8>),
    /// Close handshake.
    Close,
}
