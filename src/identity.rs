//! # Identity Provider Integration
//!
//! The token issuance flow never verifies credentials itself: it hands the
//! caller's bearer credential to an external identity provider and gets back
//! an authenticated principal. This module defines that collaborator
//! interface and the HTTP implementation used in production.
//!
//! ## Key Rust Concepts Used:
//! - **trait objects**: Handlers depend on `dyn IdentityProvider`, so tests
//!   can swap in a mock without any network
//! - **async_trait**: Makes the async verification method object-safe
//! - **timeouts**: Verification is the flow's only network hop; it is bounded
//!   so a slow provider can never hang token issuance

use crate::config::IdentityConfig;
use crate::error::{AppError, AppResult};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::warn;

/// An authenticated identity resolved from a bearer credential.
///
/// Produced by the identity provider, never constructed from request data.
#[derive(Debug, Clone, Deserialize)]
pub struct Principal {
    /// Opaque stable identifier assigned by the identity provider.
    pub id: String,

    /// Verified email address, when the provider knows one.
    #[serde(default)]
    pub email: Option<String>,

    /// Display name, when the provider knows one.
    #[serde(default)]
    pub name: Option<String>,
}

impl Principal {
    /// The label used as the room participant name and token subject.
    ///
    /// Prefers the email (stable and human-readable), falling back to the
    /// opaque provider id.
    pub fn participant_label(&self) -> &str {
        self.email.as_deref().unwrap_or(&self.id)
    }
}

/// The identity-provider collaborator consumed by the issuance flow.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Verify a bearer credential, yielding the authenticated principal.
    ///
    /// Implementations must map every failure mode (rejected credential,
    /// network error, timeout) to `AppError::Unauthorized`: from the flow's
    /// point of view an unverifiable caller is an unauthenticated caller.
    async fn verify(&self, bearer: &str) -> AppResult<Principal>;
}

/// Production implementation: verification over HTTP.
///
/// Forwards the bearer credential to the provider's verify endpoint and
/// deserializes the principal from the JSON response.
pub struct HttpIdentityProvider {
    client: reqwest::Client,
    verify_url: String,
}

impl HttpIdentityProvider {
    /// Build a provider client from configuration.
    ///
    /// The request timeout is baked into the client here so every
    /// verification call is bounded without callers having to remember it.
    pub fn from_config(config: &IdentityConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            verify_url: config.verify_url.clone(),
        })
    }
}

#[async_trait]
impl IdentityProvider for HttpIdentityProvider {
    async fn verify(&self, bearer: &str) -> AppResult<Principal> {
        let response = self
            .client
            .get(&self.verify_url)
            .bearer_auth(bearer)
            .send()
            .await
            .map_err(|e| {
                // Covers connection failures and the client-level timeout
                warn!(error = %e, "Identity provider unreachable");
                AppError::Unauthorized("credential verification unavailable".to_string())
            })?;

        if !response.status().is_success() {
            warn!(status = %response.status(), "Identity provider rejected credential");
            return Err(AppError::Unauthorized(
                "credential rejected by identity provider".to_string(),
            ));
        }

        let principal: Principal = response.json().await.map_err(|e| {
            warn!(error = %e, "Identity provider returned malformed principal");
            AppError::Unauthorized("malformed identity provider response".to_string())
        })?;

        Ok(principal)
    }
}
