//! # rally-auth
//!
//! Authentication collaborator for Rally: session token encoding and
//! decoding, the [`Authenticator`] contract the WebSocket upgrade uses to
//! resolve a caller, and Argon2 hashing for join and facilitator codes.

pub mod authenticator;
pub mod jwt;
pub mod passcode;

pub use authenticator::{Authenticator, Identity, JwtAuthenticator};
pub use jwt::{Claims, JwtDecoder, JwtEncoder};
pub use passcode::PasscodeHasher;
