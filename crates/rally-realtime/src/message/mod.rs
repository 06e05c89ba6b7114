//! Wire message types, builders, and inbound validation.

pub mod builder;
pub mod types;
pub mod validator;

pub use types::{InboundMessage, OutboundMessage};
