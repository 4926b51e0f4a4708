//! # Voice Room Backend
//!
//! Issues short-lived, HMAC-signed access tokens that let verified users
//! join real-time audio rooms, and encodes captured audio for shipment to
//! the remote voice-processing service.
//!
//! ## Module Overview:
//! - **config**: Application configuration (TOML files + environment variables)
//! - **state**: Shared application state and metrics
//! - **health**: System health monitoring endpoints
//! - **middleware**: Custom request processing logic (logging, metrics)
//! - **handlers**: HTTP request handlers (token issuance, config)
//! - **identity**: The identity-provider collaborator that verifies callers
//! - **token**: Room token claims and HS256 signing
//! - **audio**: Sample codec for shipping captured audio to the voice service
//! - **agents**: AI persona roster and the speaker-selection placeholder
//! - **error**: Custom error types and HTTP error responses
//!
//! The `audio` codec and the `agents` selection policy are consumed by
//! clients of this crate rather than by the server binary itself, which is
//! why everything is exported from a library target: `main.rs` is just the
//! HTTP server wiring on top of it.

pub mod agents;      // AI persona roster and selection policy (agents.rs)
pub mod audio;       // Audio sample codec (audio/ directory)
pub mod config;      // Configuration management (config.rs)
pub mod error;       // Error handling types (error.rs)
pub mod handlers;    // HTTP request handlers (handlers/ directory)
pub mod health;      // Health check endpoints (health.rs)
pub mod identity;    // Identity provider integration (identity.rs)
pub mod middleware;  // Custom middleware (middleware/ directory)
pub mod state;       // Application state management (state.rs)
pub mod token;       // Room token claims and signing (token/ directory)
