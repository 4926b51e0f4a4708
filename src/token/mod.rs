//! # Room Token Module
//!
//! Mints the short-lived credentials that let a verified user join a
//! real-time audio room on the media server.
//!
//! ## Key Components:
//! - **claims**: The structured claim set (issuer, subject, time bounds, room
//!   capability grant) embedded in every token
//! - **signer**: HS256 JWT construction - header and claims encoded as
//!   base64url segments, integrity-protected by an HMAC-SHA256 over them
//!
//! Tokens are never stored server-side: the media server verifies them purely
//! cryptographically with the same shared secret, no database round-trip.

pub mod claims;
pub mod signer;

pub use claims::{RoomClaims, VideoGrant};
pub use signer::TokenSigner;
