//! Claim structures embedded in room access tokens.

use crate::config::TokenConfig;
use chrono::Utc;
use serde::{Deserialize, Serialize};

/// The room capability grant carried in the `video` claim.
///
/// Field names are camelCase on the wire because that is what the media
/// server's verifier expects.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoGrant {
    /// Name of the room the token is scoped to.
    pub room: String,

    /// Permission to join the room.
    pub room_join: bool,

    /// Permission to publish audio into the room.
    pub can_publish: bool,

    /// Permission to subscribe to other participants' audio.
    pub can_subscribe: bool,
}

impl VideoGrant {
    /// The capability set this service always issues: join, publish and
    /// subscribe. Narrower grants (listen-only participants) would be a
    /// separate constructor if the product ever needs them.
    pub fn full_access(room: &str) -> Self {
        Self {
            room: room.to_string(),
            room_join: true,
            can_publish: true,
            can_subscribe: true,
        }
    }
}

/// The complete claim set granting access to a room.
///
/// ## Time bounds:
/// - `iat`: when the token was issued (now)
/// - `nbf`: `iat` minus the configured clock-skew allowance, so a verifier
///   whose clock runs slightly ahead of ours still accepts a fresh token
/// - `exp`: `iat` plus the configured lifetime
///
/// Invariants: `exp > nbf` and `nbf <= iat`. Both hold by construction for
/// any valid `TokenConfig` (non-zero ttl).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomClaims {
    /// Issuer: the API key identifying which shared secret signed this token.
    pub iss: String,

    /// Subject: the participant label shown in the room.
    pub sub: String,

    /// Not-before timestamp (unix seconds).
    pub nbf: i64,

    /// Issued-at timestamp (unix seconds).
    pub iat: i64,

    /// Expiry timestamp (unix seconds).
    pub exp: i64,

    /// The room capability grant.
    pub video: VideoGrant,
}

impl RoomClaims {
    /// Build the claim set for a token issued right now.
    pub fn new(room: &str, identity: &str, api_key: &str, token_config: &TokenConfig) -> Self {
        let now = Utc::now().timestamp();
        Self {
            iss: api_key.to_string(),
            sub: identity.to_string(),
            nbf: now - token_config.clock_skew_secs as i64,
            iat: now,
            exp: now + token_config.ttl_secs as i64,
            video: VideoGrant::full_access(room),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claim_time_bounds() {
        let config = TokenConfig {
            ttl_secs: 21600,
            clock_skew_secs: 60,
        };
        let before = Utc::now().timestamp();
        let claims = RoomClaims::new("room-42", "alice@example.com", "APIkey", &config);
        let after = Utc::now().timestamp();

        // iat = T (within the test's own execution window)
        assert!(claims.iat >= before && claims.iat <= after);
        // nbf = T - 60s, exp = T + 6h
        assert_eq!(claims.nbf, claims.iat - 60);
        assert_eq!(claims.exp, claims.iat + 21600);
        // Invariants: exp > nbf, nbf <= iat
        assert!(claims.exp > claims.nbf);
        assert!(claims.nbf <= claims.iat);
    }

    #[test]
    fn test_grant_capability_set() {
        let grant = VideoGrant::full_access("room-42");
        assert_eq!(grant.room, "room-42");
        assert!(grant.room_join && grant.can_publish && grant.can_subscribe);
    }

    #[test]
    fn test_grant_serializes_camel_case() {
        let grant = VideoGrant::full_access("demo");
        let json = serde_json::to_string(&grant).unwrap();
        assert!(json.contains("\"roomJoin\":true"));
        assert!(json.contains("\"canPublish\":true"));
        assert!(json.contains("\"canSubscribe\":true"));
    }
}
