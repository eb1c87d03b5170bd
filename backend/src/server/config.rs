//! Application settings loaded via OrthoConfig.
//!
//! Every value can come from the command line, the environment (prefix
//! `API_`) or a config file; absent values fall back in the accessors so
//! defaults live in one place.

use ortho_config::OrthoConfig;
use serde::Deserialize;
use uuid::Uuid;

/// Bind address used when none is configured.
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
/// Session token lifetime used when none is configured.
pub const DEFAULT_TOKEN_TTL_HOURS: i64 = 24;
/// Mail from-address used when none is configured.
pub const DEFAULT_MAIL_SENDER: &str = "noreply@localhost";

/// Settings controlling the HTTP server and the authentication flow.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "API")]
pub struct AppSettings {
    /// Socket address the server binds to.
    pub bind_addr: Option<String>,
    /// Secret for signing confirmation codes and session tokens.
    pub auth_secret: Option<String>,
    /// Session token lifetime in hours.
    pub token_ttl_hours: Option<i64>,
    /// From-address stamped on confirmation mail.
    pub mail_sender: Option<String>,
    /// Username of a superuser account seeded at startup.
    pub admin_username: Option<String>,
    /// Email of the seeded superuser account.
    pub admin_email: Option<String>,
}

impl AppSettings {
    /// Bind address, falling back to [`DEFAULT_BIND_ADDR`].
    #[must_use]
    pub fn bind_addr(&self) -> &str {
        self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR)
    }

    /// Signing secret.
    ///
    /// Debug builds fall back to an ephemeral random secret with a
    /// warning, which invalidates all codes and tokens on restart.
    /// Release builds refuse to start without one.
    pub fn auth_secret(&self) -> std::io::Result<Vec<u8>> {
        if let Some(secret) = &self.auth_secret {
            return Ok(secret.clone().into_bytes());
        }
        if cfg!(debug_assertions) {
            tracing::warn!("using ephemeral auth secret (dev only)");
            let mut secret = Vec::with_capacity(32);
            secret.extend_from_slice(Uuid::new_v4().as_bytes());
            secret.extend_from_slice(Uuid::new_v4().as_bytes());
            Ok(secret)
        } else {
            Err(std::io::Error::other(
                "API_AUTH_SECRET must be set in release builds",
            ))
        }
    }

    /// Token lifetime, falling back to [`DEFAULT_TOKEN_TTL_HOURS`].
    #[must_use]
    pub fn token_ttl(&self) -> chrono::Duration {
        chrono::Duration::hours(self.token_ttl_hours.unwrap_or(DEFAULT_TOKEN_TTL_HOURS))
    }

    /// Mail from-address, falling back to [`DEFAULT_MAIL_SENDER`].
    #[must_use]
    pub fn mail_sender(&self) -> &str {
        self.mail_sender.as_deref().unwrap_or(DEFAULT_MAIL_SENDER)
    }
}
