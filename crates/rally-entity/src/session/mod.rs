//! Session entity, kinds, and phases.

pub mod kind;
pub mod model;
pub mod phase;

pub use kind::SessionKind;
pub use model::{Session, SessionSettings};
pub use phase::Phase;
