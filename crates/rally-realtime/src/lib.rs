//! # rally-realtime
//!
//! Real-time engine for Rally sessions. Provides:
//!
//! - One hub actor per live session, owning its connection set
//! - Event routing with permission and phase gates
//! - Poker, retro, and storyboard event handlers
//! - Phase state machine and vote tally
//! - Transport-neutral read/write loops with keepalive

pub mod connection;
pub mod event;
pub mod handler;
pub mod hub;
pub mod message;
pub mod metrics;
pub mod notification;
pub mod permission;
pub mod phase;
pub mod router;
pub mod server;
pub mod tally;

pub use connection::{ConnectionHandle, Frame};
pub use hub::SessionHub;
pub use message::{InboundMessage, OutboundMessage};
pub use router::EventRouter;
pub use server::{EngineStats, RealtimeEngine};
