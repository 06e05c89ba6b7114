//! # rally-entity
//!
//! Domain entity models for Rally. Every struct in this crate is a
//! value object handed out by the persistence collaborator; the
//! real-time engine broadcasts slices of them verbatim.

pub mod alert;
pub mod participant;
pub mod poker;
pub mod retro;
pub mod session;
pub mod state;
pub mod storyboard;
pub mod user;

pub use alert::Alert;
pub use participant::Participant;
pub use session::{Phase, Session, SessionKind, SessionSettings};
pub use state::{Board, SessionState};
pub use user::UserRole;
