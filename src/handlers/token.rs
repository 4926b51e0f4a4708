//! # Token Issuance Flow
//!
//! The POST /api/v1/token handler. The flow is a single linear sequence with
//! no retries:
//!
//! 1. **AuthenticatePrincipal**: pull the bearer credential from the
//!    `authorization` header and verify it with the identity provider
//! 2. **ValidateInput**: require a non-empty `roomId` in the body
//! 3. **MintToken**: sign a room token for the principal's label
//! 4. **RespondSuccess**: return the token, the fixed media-server URL, and
//!    the participant label used
//!
//! Any step can fail into the error response instead; auth and validation
//! failures never reach the signer. Each request is independent and
//! stateless - the only shared data is the read-only signing configuration.

use crate::error::{AppError, AppResult};
use crate::identity::IdentityProvider;
use crate::state::AppState;
use crate::token::TokenSigner;
use actix_web::{web, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Request body for token issuance.
///
/// `roomId` is optional at the serde level so that an absent field reaches
/// our own validation (and its 422 response) instead of dying in the JSON
/// extractor with a generic 400.
#[derive(Debug, Deserialize)]
pub struct TokenRequest {
    #[serde(rename = "roomId", default)]
    pub room_id: Option<String>,
}

/// Successful issuance response.
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    /// The signed room access token.
    pub token: String,

    /// The fixed media-server connection URL. Static configuration, never
    /// derived from request data.
    #[serde(rename = "serverUrl")]
    pub server_url: String,

    /// The participant label embedded in the token's subject claim.
    #[serde(rename = "participantName")]
    pub participant_name: String,
}

/// Extract the bearer credential from the `authorization` header.
fn bearer_credential(req: &HttpRequest) -> AppResult<String> {
    let header = req
        .headers()
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("missing authorization header".to_string()))?;

    let credential = header
        .strip_prefix("Bearer ")
        .or_else(|| header.strip_prefix("bearer "))
        .ok_or_else(|| AppError::Unauthorized("authorization header is not a bearer credential".to_string()))?;

    if credential.is_empty() {
        return Err(AppError::Unauthorized("empty bearer credential".to_string()));
    }

    Ok(credential.to_string())
}

/// POST /api/v1/token - authenticate the caller and mint a room access token.
pub async fn issue_token(
    req: HttpRequest,
    state: web::Data<AppState>,
    identity: web::Data<dyn IdentityProvider>,
    body: web::Json<TokenRequest>,
) -> AppResult<HttpResponse> {
    // 1. AuthenticatePrincipal - delegate credential verification to the
    //    identity provider collaborator
    let credential = bearer_credential(&req)?;
    let principal = identity.verify(&credential).await?;

    // 2. ValidateInput - a token must be scoped to a concrete room
    let room_id = body
        .room_id
        .as_deref()
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .ok_or_else(|| AppError::InvalidRequest("roomId must be a non-empty string".to_string()))?;

    // 3. MintToken - sign with the current configuration snapshot
    let config = state.get_config();
    let participant_name = principal.participant_label().to_string();
    let signer = TokenSigner::from_config(&config.livekit);
    let token = signer.issue(room_id, &participant_name, &config.token)?;

    info!(room = %room_id, participant = %participant_name, "Issued room access token");

    // 4. RespondSuccess
    Ok(HttpResponse::Ok().json(TokenResponse {
        token,
        server_url: config.livekit.server_url,
        participant_name,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::identity::Principal;
    use actix_web::{test, App};
    use async_trait::async_trait;
    use base64::{engine::general_purpose, Engine as _};
    use std::sync::Arc;

    /// Identity provider double: accepts any credential when primed with a
    /// principal, rejects everything otherwise.
    struct MockIdentityProvider {
        principal: Option<Principal>,
    }

    #[async_trait]
    impl IdentityProvider for MockIdentityProvider {
        async fn verify(&self, _bearer: &str) -> AppResult<Principal> {
            self.principal
                .clone()
                .ok_or_else(|| AppError::Unauthorized("credential rejected".to_string()))
        }
    }

    fn alice() -> Principal {
        Principal {
            id: "user_abc123".to_string(),
            email: Some("alice@example.com".to_string()),
            name: Some("Alice".to_string()),
        }
    }

    fn configured() -> AppConfig {
        let mut config = AppConfig::default();
        config.livekit.api_key = "APItest123".to_string();
        config.livekit.api_secret = "test-shared-secret".to_string();
        config.livekit.server_url = "wss://rooms.example.com".to_string();
        config
    }

    async fn call(
        config: AppConfig,
        principal: Option<Principal>,
        bearer: Option<&str>,
        body: serde_json::Value,
    ) -> (u16, serde_json::Value) {
        let identity: Arc<dyn IdentityProvider> = Arc::new(MockIdentityProvider { principal });
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(AppState::new(config)))
                .app_data(web::Data::from(identity))
                .route("/api/v1/token", web::post().to(issue_token)),
        )
        .await;

        let mut req = test::TestRequest::post()
            .uri("/api/v1/token")
            .set_json(&body);
        if let Some(bearer) = bearer {
            req = req.insert_header(("authorization", format!("Bearer {}", bearer)));
        }

        let resp = test::call_service(&app, req.to_request()).await;
        let status = resp.status().as_u16();
        let body: serde_json::Value = test::read_body_json(resp).await;
        (status, body)
    }

    #[actix_web::test]
    async fn test_issues_token_for_valid_request() {
        let (status, body) = call(
            configured(),
            Some(alice()),
            Some("valid-credential"),
            serde_json::json!({"roomId": "room-42"}),
        )
        .await;

        assert_eq!(status, 200);
        assert_eq!(body["participantName"], "alice@example.com");
        assert_eq!(body["serverUrl"], "wss://rooms.example.com");

        // The token's room claim must match the requested room
        let token = body["token"].as_str().unwrap();
        let claims_segment = token.split('.').nth(1).unwrap();
        let claims: serde_json::Value = serde_json::from_slice(
            &general_purpose::URL_SAFE_NO_PAD.decode(claims_segment).unwrap(),
        )
        .unwrap();
        assert_eq!(claims["video"]["room"], "room-42");
        assert_eq!(claims["sub"], "alice@example.com");
    }

    #[actix_web::test]
    async fn test_missing_bearer_is_unauthorized() {
        let (status, body) = call(
            configured(),
            Some(alice()),
            None,
            serde_json::json!({"roomId": "room-42"}),
        )
        .await;

        assert_eq!(status, 401);
        assert_eq!(body["error"]["type"], "unauthorized");
    }

    #[actix_web::test]
    async fn test_rejected_credential_is_unauthorized() {
        let (status, body) = call(
            configured(),
            None,  // provider rejects everything
            Some("bogus-credential"),
            serde_json::json!({"roomId": "room-42"}),
        )
        .await;

        assert_eq!(status, 401);
        assert_eq!(body["error"]["type"], "unauthorized");
    }

    #[actix_web::test]
    async fn test_missing_room_id_is_invalid_request() {
        let (status, body) = call(
            configured(),
            Some(alice()),
            Some("valid-credential"),
            serde_json::json!({}),
        )
        .await;

        assert_eq!(status, 422);
        assert_eq!(body["error"]["type"], "invalid_request");
    }

    #[actix_web::test]
    async fn test_empty_room_id_is_invalid_request() {
        let (status, body) = call(
            configured(),
            Some(alice()),
            Some("valid-credential"),
            serde_json::json!({"roomId": "  "}),
        )
        .await;

        assert_eq!(status, 422);
        assert_eq!(body["error"]["type"], "invalid_request");
    }

    #[actix_web::test]
    async fn test_missing_signing_secret_is_config_error() {
        // Default config ships without credentials
        let (status, body) = call(
            AppConfig::default(),
            Some(alice()),
            Some("valid-credential"),
            serde_json::json!({"roomId": "room-42"}),
        )
        .await;

        assert_eq!(status, 500);
        assert_eq!(body["error"]["type"], "config_error");
        assert!(body.get("token").is_none());
    }

    #[actix_web::test]
    async fn test_participant_name_falls_back_to_principal_id() {
        let principal = Principal {
            id: "user_abc123".to_string(),
            email: None,
            name: None,
        };
        let (status, body) = call(
            configured(),
            Some(principal),
            Some("valid-credential"),
            serde_json::json!({"roomId": "room-42"}),
        )
        .await;

        assert_eq!(status, 200);
        assert_eq!(body["participantName"], "user_abc123");
    }
}
