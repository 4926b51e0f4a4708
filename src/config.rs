//! # Configuration Management
//!
//! This module handles loading and managing application configuration from multiple sources:
//! - TOML configuration files (config.toml)
//! - Environment variables (with APP_ prefix, plus deployment-platform variables)
//! - Default values (built into the code)
//!
//! ## Key Rust Concepts Used:
//! - **Serde**: Serialization/deserialization library for converting between Rust structs and data formats
//! - **derive macros**: Automatically generate code for common traits (Debug, Clone, Serialize, Deserialize)
//! - **struct**: Custom data types that group related fields together
//! - **impl blocks**: Add methods to structs
//! - **Result<T, E>**: Error handling that forces you to handle potential failures
//!
//! ## Configuration Priority (highest to lowest):
//! 1. Environment variables (APP_SERVER_HOST, LIVEKIT_API_SECRET, etc.)
//! 2. Configuration file (config.toml)
//! 3. Default values (defined in the Default impl)

use anyhow::Result;              // Better error handling with context
use serde::{Deserialize, Serialize};  // For converting to/from TOML, JSON, etc.
use std::env;                    // For reading environment variables

/// Main application configuration that contains all settings.
///
/// ## Rust Concepts:
/// - **#[derive(...)]**: Automatically implements common traits:
///   - `Debug`: Allows printing with {:?} for debugging
///   - `Clone`: Allows making copies of the struct
///   - `Serialize`: Can convert this struct to JSON, TOML, etc.
///   - `Deserialize`: Can create this struct from JSON, TOML, etc.
/// - **pub struct**: Public struct that other modules can use
/// - **pub fields**: Public fields that can be accessed directly
///
/// ## Why separate config structs:
/// Breaking configuration into logical groups (server, livekit, token, identity)
/// makes it easier to understand and maintain as the application grows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub livekit: LiveKitConfig,
    pub token: TokenConfig,
    pub identity: IdentityConfig,
}

/// Server-specific configuration settings.
///
/// ## Fields:
/// - `host`: IP address or hostname to bind the server to (e.g., "127.0.0.1", "0.0.0.0")
/// - `port`: TCP port number to listen on (1-65535, typically 8080 for development)
///
/// ## Common values:
/// - `host = "127.0.0.1"`: Only accept connections from localhost (development)
/// - `host = "0.0.0.0"`: Accept connections from any IP address (production)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,  // u16 = unsigned 16-bit integer (0-65535), perfect for port numbers
}

/// Media-server (LiveKit) signing configuration.
///
/// ## Fields:
/// - `api_key`: Issuer key identifier placed in the token's `iss` claim
/// - `api_secret`: Shared HMAC signing secret. Never logged, never echoed in responses.
/// - `server_url`: The fixed connection URL handed back to clients alongside the token.
///   It is static configuration, never derived from request data.
///
/// ## Missing credentials:
/// An empty key or secret is tolerated at startup (the server can still answer
/// health checks) but every token mint will fail with a configuration error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiveKitConfig {
    pub api_key: String,
    pub api_secret: String,
    pub server_url: String,
}

/// Room token lifetime configuration.
///
/// ## Fields:
/// - `ttl_secs`: How long an issued token stays valid. Bounds the blast radius
///   of a leaked token; 6 hours covers the longest expected room session.
/// - `clock_skew_secs`: How far the `nbf` (not-before) claim is back-dated to
///   tolerate clock drift between this issuer and the media server verifying
///   the token.
///
/// ## Why configurable:
/// The 6h/60s values are operational defaults, not business rules, so they are
/// settings rather than hard-coded literals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenConfig {
    pub ttl_secs: u64,
    pub clock_skew_secs: u64,
}

/// Identity-provider configuration.
///
/// ## Fields:
/// - `verify_url`: Endpoint that turns a bearer credential into a principal
/// - `timeout_secs`: Upper bound on the verification round-trip. The issuance
///   flow must never hang on a slow provider; a timed-out verification is
///   treated as an authentication failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityConfig {
    pub verify_url: String,
    pub timeout_secs: u64,
}

/// Provides default configuration values.
///
/// ## Rust Concepts:
/// - **impl Default**: Implements the Default trait, which provides a `default()` method
/// - **Self**: Refers to the current type (AppConfig)
/// - **to_string()**: Converts string literals (&str) to owned String objects
///
/// ## Why defaults matter:
/// Default values ensure the application can start even if no configuration file exists.
/// They also serve as documentation of reasonable starting values.
impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),  // Localhost only (safe for development)
                port: 8080,                     // Common development port
            },
            livekit: LiveKitConfig {
                api_key: String::new(),         // Must come from env/config in real deployments
                api_secret: String::new(),
                server_url: "ws://localhost:7880".to_string(),  // Local LiveKit dev server
            },
            token: TokenConfig {
                ttl_secs: 6 * 60 * 60,          // 6 hour token lifetime
                clock_skew_secs: 60,            // 60s of issuer/verifier clock drift tolerance
            },
            identity: IdentityConfig {
                verify_url: "http://localhost:9000/v1/verify".to_string(),
                timeout_secs: 5,                // Never block issuance on a slow provider
            },
        }
    }
}

/// Implementation block for AppConfig - adds methods to the struct.
impl AppConfig {
    /// Load configuration from multiple sources in priority order.
    ///
    /// ## Configuration Loading Process:
    /// 1. Start with built-in defaults
    /// 2. Override with values from config.toml (if it exists)
    /// 3. Override with environment variables prefixed with APP_
    /// 4. Handle special cases for deployment-platform variables
    ///
    /// ## Rust Concepts:
    /// - **Builder pattern**: Chain method calls to configure the config loader
    /// - **?**: Early return on error (if any step fails, return the error)
    /// - **env::var()**: Read environment variables, returns Result<String, VarError>
    /// - **if let Ok(...)**: Only execute if the environment variable exists
    ///
    /// ## Environment Variable Examples:
    /// - `APP_SERVER_HOST=0.0.0.0`: Override server host
    /// - `APP_TOKEN_TTL_SECS=3600`: Override token lifetime
    /// - `HOST=0.0.0.0` / `PORT=3000`: Special cases for deployment platforms
    /// - `LIVEKIT_API_KEY` / `LIVEKIT_API_SECRET` / `LIVEKIT_URL`: The conventional
    ///   LiveKit variable names, honored without the APP_ prefix
    pub fn load() -> Result<Self> {
        let mut settings = config::Config::builder()
            // 1. Start with defaults - converts our Default impl to config format
            .add_source(config::Config::try_from(&AppConfig::default())?)
            // 2. Load from config.toml file (if it exists) - required(false) means "don't error if missing"
            .add_source(config::File::with_name("config").required(false))
            // 3. Load from environment variables with APP_ prefix
            // Example: APP_SERVER_HOST becomes server.host in the config
            .add_source(config::Environment::with_prefix("APP").separator("_"));

        // Handle special environment variables used by deployment platforms
        // These don't follow the APP_ prefix convention but are commonly used
        if let Ok(host) = env::var("HOST") {
            settings = settings.set_override("server.host", host)?;
        }

        if let Ok(port) = env::var("PORT") {
            settings = settings.set_override("server.port", port)?;
        }

        // LiveKit's SDKs read these exact names, so we honor them too
        if let Ok(key) = env::var("LIVEKIT_API_KEY") {
            settings = settings.set_override("livekit.api_key", key)?;
        }

        if let Ok(secret) = env::var("LIVEKIT_API_SECRET") {
            settings = settings.set_override("livekit.api_secret", secret)?;
        }

        if let Ok(url) = env::var("LIVEKIT_URL") {
            settings = settings.set_override("livekit.server_url", url)?;
        }

        // Build the final configuration and convert it back to our AppConfig struct
        let config = settings.build()?.try_deserialize()?;
        Ok(config)
    }

    /// Validate that the configuration values make sense.
    ///
    /// ## What this checks:
    /// - Server port is not 0 (port 0 is reserved and can't be used)
    /// - Token lifetime is non-zero (a zero-lifetime token is born expired)
    /// - Media-server URL is present (clients can't connect without it)
    /// - Identity timeout is non-zero (a zero timeout fails every verification)
    ///
    /// ## What this deliberately does NOT check:
    /// The LiveKit key/secret may be empty. The server still starts so that
    /// health checks pass; token minting reports the missing configuration
    /// per request instead.
    ///
    /// ## Rust Concepts:
    /// - **&self**: Borrowed reference (read-only access to the struct)
    /// - **anyhow::anyhow!**: Creates an error with a custom message
    /// - **Early return**: Return immediately if validation fails
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(anyhow::anyhow!("Server port cannot be 0"));
        }

        if self.token.ttl_secs == 0 {
            return Err(anyhow::anyhow!("Token lifetime must be greater than 0"));
        }

        if self.livekit.server_url.is_empty() {
            return Err(anyhow::anyhow!("Media server URL cannot be empty"));
        }

        if self.identity.timeout_secs == 0 {
            return Err(anyhow::anyhow!("Identity provider timeout must be greater than 0"));
        }

        Ok(())  // All validation passed
    }

    /// Whether token signing is fully configured.
    ///
    /// ## Usage:
    /// Checked by the signer before minting and reported by the health endpoint
    /// so operators can see a missing secret before the first client hits it.
    pub fn signing_configured(&self) -> bool {
        !self.livekit.api_key.is_empty() && !self.livekit.api_secret.is_empty()
    }

    /// Apply a partial configuration update (used for runtime config updates).
    ///
    /// ## What can change at runtime:
    /// Only settings that are re-read on every request can honestly take
    /// effect after startup:
    /// - `token.ttl_secs` / `token.clock_skew_secs` (read at each mint)
    /// - `livekit.server_url` (read at each response)
    ///
    /// ## What cannot, and why it is rejected instead of ignored:
    /// - `server.*`: the listener is already bound to the startup address
    /// - `identity.*`: the provider client is built once at startup with its
    ///   URL and timeout baked in
    /// - `livekit.api_key` / `api_secret`: credential rotation belongs to the
    ///   deployment environment, not the HTTP API
    /// Accepting such fields and answering "updated" would be a silent no-op,
    /// so any attempt to set them fails the whole update.
    ///
    /// ## Rust Concepts:
    /// - **&mut self**: Mutable reference (allows modifying the struct)
    /// - **serde_json::Value**: Generic JSON value that can hold any JSON data
    /// - **match on &str**: Dispatch on each provided section/field name
    /// - **ok_or_else()**: Turn a missing/mistyped value into an error
    pub fn apply_update(&mut self, update: &serde_json::Value) -> Result<()> {
        let sections = update
            .as_object()
            .ok_or_else(|| anyhow::anyhow!("configuration update must be a JSON object"))?;

        for (section, value) in sections {
            match section.as_str() {
                "token" => {
                    let fields = value
                        .as_object()
                        .ok_or_else(|| anyhow::anyhow!("'token' must be a JSON object"))?;
                    for (field, value) in fields {
                        match field.as_str() {
                            "ttl_secs" => {
                                self.token.ttl_secs = value.as_u64().ok_or_else(|| {
                                    anyhow::anyhow!("'token.ttl_secs' must be a non-negative integer")
                                })?;
                            }
                            "clock_skew_secs" => {
                                self.token.clock_skew_secs = value.as_u64().ok_or_else(|| {
                                    anyhow::anyhow!("'token.clock_skew_secs' must be a non-negative integer")
                                })?;
                            }
                            other => {
                                return Err(anyhow::anyhow!("unknown token setting '{}'", other));
                            }
                        }
                    }
                }
                "livekit" => {
                    let fields = value
                        .as_object()
                        .ok_or_else(|| anyhow::anyhow!("'livekit' must be a JSON object"))?;
                    for (field, value) in fields {
                        match field.as_str() {
                            "server_url" => {
                                self.livekit.server_url = value
                                    .as_str()
                                    .ok_or_else(|| {
                                        anyhow::anyhow!("'livekit.server_url' must be a string")
                                    })?
                                    .to_string();
                            }
                            "api_key" | "api_secret" => {
                                return Err(anyhow::anyhow!(
                                    "'livekit.{}' cannot be changed at runtime; rotate credentials through the deployment environment",
                                    field
                                ));
                            }
                            other => {
                                return Err(anyhow::anyhow!("unknown livekit setting '{}'", other));
                            }
                        }
                    }
                }
                "server" | "identity" => {
                    return Err(anyhow::anyhow!(
                        "'{}' settings cannot be changed at runtime; restart with new configuration",
                        section
                    ));
                }
                other => {
                    return Err(anyhow::anyhow!("unknown configuration section '{}'", other));
                }
            }
        }

        // Validate the updated configuration to ensure it's still valid
        self.validate()?;
        Ok(())
    }
}

/// Tests for the configuration module.
///
/// ## Rust Concepts:
/// - **#[cfg(test)]**: Only compile this code when running tests
/// - **mod tests**: A module containing test functions
/// - **#[test]**: Marks a function as a test case
/// - **assert_eq!**: Checks that two values are equal
/// - **assert!**: Checks that a condition is true
#[cfg(test)]
mod tests {
    use super::*;  // Import everything from the parent module

    /// Test that the default configuration is valid and has expected values.
    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.token.ttl_secs, 21600);  // 6 hours
        assert_eq!(config.token.clock_skew_secs, 60);
        // Ensure the default config passes validation
        assert!(config.validate().is_ok());
        // Defaults ship without credentials, so signing is not configured
        assert!(!config.signing_configured());
    }

    /// Test that validation catches invalid configurations.
    #[test]
    fn test_config_validation() {
        let mut config = AppConfig::default();
        config.server.port = 0;  // Invalid port
        // Validation should fail for port 0
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.token.ttl_secs = 0;  // Zero-lifetime tokens are useless
        assert!(config.validate().is_err());
    }

    /// Test that signing_configured requires both the key and the secret.
    #[test]
    fn test_signing_configured() {
        let mut config = AppConfig::default();
        config.livekit.api_key = "APIabc123".to_string();
        assert!(!config.signing_configured());  // Secret still missing

        config.livekit.api_secret = "super-secret".to_string();
        assert!(config.signing_configured());
    }

    /// Test that runtime configuration updates work correctly.
    #[test]
    fn test_config_update() {
        let mut config = AppConfig::default();
        let update = serde_json::json!({"token": {"ttl_secs": 3600}});  // Update only the lifetime
        assert!(config.apply_update(&update).is_ok());
        assert_eq!(config.token.ttl_secs, 3600);  // Lifetime should be updated
        // Other fields should remain unchanged
        assert_eq!(config.token.clock_skew_secs, 60);
        assert_eq!(config.server.host, "127.0.0.1");

        let update = serde_json::json!({"livekit": {"server_url": "wss://rooms.example.com"}});
        assert!(config.apply_update(&update).is_ok());
        assert_eq!(config.livekit.server_url, "wss://rooms.example.com");
    }

    /// Test that the signing credentials cannot be changed through runtime updates.
    #[test]
    fn test_config_update_cannot_touch_credentials() {
        let mut config = AppConfig::default();
        config.livekit.api_secret = "original".to_string();
        config.livekit.api_key = "APIabc123".to_string();

        let update = serde_json::json!({"livekit": {"api_secret": "hijacked"}});
        assert!(config.apply_update(&update).is_err());
        assert_eq!(config.livekit.api_secret, "original");  // Secret untouched

        let update = serde_json::json!({"livekit": {"api_key": "APIevil"}});
        assert!(config.apply_update(&update).is_err());
        assert_eq!(config.livekit.api_key, "APIabc123");
    }

    /// Test that settings fixed at startup are rejected, not silently accepted.
    ///
    /// The listener is already bound and the identity provider client is
    /// already built; answering "updated" for these would be a no-op lie.
    #[test]
    fn test_config_update_rejects_startup_only_sections() {
        let mut config = AppConfig::default();

        let update = serde_json::json!({"server": {"port": 9090}});
        assert!(config.apply_update(&update).is_err());
        assert_eq!(config.server.port, 8080);  // Unchanged

        let update = serde_json::json!({"identity": {"timeout_secs": 30}});
        assert!(config.apply_update(&update).is_err());
        assert_eq!(config.identity.timeout_secs, 5);  // Unchanged

        let update = serde_json::json!({"identity": {"verify_url": "http://evil.example.com"}});
        assert!(config.apply_update(&update).is_err());
        assert_eq!(config.identity.verify_url, "http://localhost:9000/v1/verify");
    }

    /// Test that unknown sections and fields fail the whole update.
    #[test]
    fn test_config_update_rejects_unknown_fields() {
        let mut config = AppConfig::default();

        let update = serde_json::json!({"bogus": {"x": 1}});
        assert!(config.apply_update(&update).is_err());

        let update = serde_json::json!({"token": {"lifetime": 3600}});
        assert!(config.apply_update(&update).is_err());
        assert_eq!(config.token.ttl_secs, 21600);

        // A valid field alongside an invalid one must not be applied either
        let update = serde_json::json!({"token": {"clock_skew_secs": 10}, "server": {"port": 1}});
        assert!(config.apply_update(&update).is_err());
    }
}
