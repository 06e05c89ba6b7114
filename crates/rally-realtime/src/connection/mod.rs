//! WebSocket connection layer: the per-connection handle, the transport
//! frame type, and the read/write loops.

pub mod frame;
pub mod handle;
pub mod socket;

pub use frame::Frame;
pub use handle::{ConnectionHandle, Delivery};
