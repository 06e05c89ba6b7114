//! # rally-store
//!
//! The persistence collaborator for Rally. [`traits`] defines the
//! contract the real-time engine consumes: every mutating call returns
//! the authoritative post-mutation slice so handlers never broadcast a
//! locally cached copy. [`memory::MemoryStore`] is the in-process
//! implementation; [`alerts::AlertCache`] and [`mailer::LogMailer`] are
//! the remaining collaborator stand-ins.

pub mod alerts;
pub mod mailer;
pub mod memory;
pub mod traits;

pub use alerts::AlertCache;
pub use mailer::LogMailer;
pub use memory::MemoryStore;
pub use traits::{
    AlertStore, NewAlert, NewSession, PlanDraft, PokerStore, RetroStore, SessionStore, Store,
    StoryDraft, StoryboardStore,
};
