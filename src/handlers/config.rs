//! Runtime configuration endpoints.
//!
//! GET returns the active configuration for inspection; PUT applies a partial
//! update. The signing secret is redacted on the way out and not updatable on
//! the way in - credential rotation belongs to the deployment environment,
//! not the HTTP API.

use crate::error::{AppError, AppResult};
use crate::state::AppState;
use actix_web::{web, HttpResponse};
use serde_json::json;
use tracing::info;

/// GET /api/v1/config - return the active configuration, secrets redacted.
pub async fn get_config(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let config = state.get_config();

    Ok(HttpResponse::Ok().json(json!({
        "server": config.server,
        "livekit": {
            "api_key": config.livekit.api_key,
            // Present/absent is all a caller needs to know about the secret
            "api_secret": if config.livekit.api_secret.is_empty() { "<unset>" } else { "<redacted>" },
            "server_url": config.livekit.server_url,
        },
        "token": config.token,
        "identity": config.identity,
    })))
}

/// PUT /api/v1/config - apply a partial configuration update.
///
/// Only runtime-effective settings are accepted (see
/// `AppConfig::apply_update`); everything else - malformed JSON, unknown
/// fields, startup-only settings - is the caller's problem and comes back
/// as a 422, matching the token flow's bad-input policy.
pub async fn update_config(state: web::Data<AppState>, body: String) -> AppResult<HttpResponse> {
    // Parse failures map to InvalidRequest through the serde_json conversion
    let update: serde_json::Value = serde_json::from_str(&body)?;

    // Work on a copy: a rejected update must leave the live config untouched
    let mut config = state.get_config();
    config
        .apply_update(&update)
        .map_err(|e| AppError::InvalidRequest(e.to_string()))?;

    state
        .update_config(config.clone())
        .map_err(AppError::ConfigError)?;

    info!("Configuration updated at runtime");

    Ok(HttpResponse::Ok().json(json!({
        "status": "updated",
        "token": config.token,
        "livekit": {
            "server_url": config.livekit.server_url,
        },
    })))
}
