//! Collaborator traits defined in `rally-core` and implemented by other crates.

pub mod mailer;

pub use mailer::Mailer;
