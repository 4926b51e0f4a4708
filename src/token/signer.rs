//! # Credential Signer
//!
//! Builds HS256 JWTs granting access to a room. A token is three dot-joined
//! base64url segments: a fixed header, the claim set, and an HMAC-SHA256
//! signature over `header "." claims` keyed by the shared API secret.
//!
//! The signature is a real keyed MAC: the media server can verify authenticity
//! with nothing but the same secret, and nobody without it can forge or alter
//! a token. The secret itself never appears in the output.

use crate::config::LiveKitConfig;
use crate::error::{AppError, AppResult};
use crate::token::claims::RoomClaims;
use base64::{engine::general_purpose, Engine as _};
use hmac::{Hmac, Mac};
use serde::Serialize;
use sha2::Sha256;
use tracing::debug;

type HmacSha256 = Hmac<Sha256>;

/// The fixed JWT header. `alg` and `typ` never vary for this service.
#[derive(Debug, Serialize)]
struct Header {
    alg: &'static str,
    typ: &'static str,
}

const HEADER: Header = Header {
    alg: "HS256",
    typ: "JWT",
};

/// Compute an HMAC-SHA256 signature over `message` with `key`.
///
/// Kept as a standalone pure function so the MAC computation is independently
/// testable and swappable without touching token assembly.
pub fn sign_hs256(message: &[u8], key: &[u8]) -> AppResult<Vec<u8>> {
    let mut mac = HmacSha256::new_from_slice(key)
        .map_err(|e| AppError::Internal(format!("HMAC key setup failed: {}", e)))?;
    mac.update(message);
    Ok(mac.finalize().into_bytes().to_vec())
}

/// Base64url without padding, the JWT segment encoding.
fn encode_segment(bytes: &[u8]) -> String {
    general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

/// Mints signed room access tokens from a key/secret pair.
///
/// Holds only the immutable signing material; every `issue` call is
/// independent, so one signer can serve concurrent requests freely.
pub struct TokenSigner {
    api_key: String,
    api_secret: String,
}

impl TokenSigner {
    pub fn new(api_key: String, api_secret: String) -> Self {
        Self {
            api_key,
            api_secret,
        }
    }

    pub fn from_config(config: &LiveKitConfig) -> Self {
        Self::new(config.api_key.clone(), config.api_secret.clone())
    }

    /// Issue a signed token granting `identity` full access to `room`.
    ///
    /// ## Parameters:
    /// - **room**: Room name placed in the capability grant. Must be non-empty;
    ///   the issuance flow validates this before calling here.
    /// - **identity**: Participant label placed in the `sub` claim.
    /// - **token_config**: Lifetime and clock-skew settings for the time claims.
    ///
    /// ## Errors:
    /// `ConfigError` when the API key or secret is missing: issuing an
    /// unsigned or mis-attributed token would be worse than failing.
    pub fn issue(
        &self,
        room: &str,
        identity: &str,
        token_config: &crate::config::TokenConfig,
    ) -> AppResult<String> {
        if self.api_key.is_empty() || self.api_secret.is_empty() {
            return Err(AppError::ConfigError(
                "token signing is not configured (missing API key or secret)".to_string(),
            ));
        }

        let claims = RoomClaims::new(room, identity, &self.api_key, token_config);

        let header_segment = encode_segment(
            &serde_json::to_vec(&HEADER)
                .map_err(|e| AppError::Internal(format!("header serialization failed: {}", e)))?,
        );
        let claims_segment = encode_segment(
            &serde_json::to_vec(&claims)
                .map_err(|e| AppError::Internal(format!("claims serialization failed: {}", e)))?,
        );

        // The MAC covers exactly the bytes the verifier will reconstruct:
        // the two encoded segments joined by '.'
        let signing_input = format!("{}.{}", header_segment, claims_segment);
        let signature = sign_hs256(signing_input.as_bytes(), self.api_secret.as_bytes())?;

        debug!(room = %room, identity = %identity, exp = claims.exp, "Issued room token");

        Ok(format!("{}.{}", signing_input, encode_segment(&signature)))
    }
}
