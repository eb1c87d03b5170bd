//! Opaque bearer session tokens.
//!
//! A token is `"{user_id}.{expiry_unix}.{mac}"`, signed with the server
//! secret. It carries identity only; role and superuser status are loaded
//! from the store on every request so a role change takes effect without
//! waiting for token expiry.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;

use super::user::{User, UserId};

type HmacSha256 = Hmac<Sha256>;

/// Domain-separation context for session token signatures.
const TOKEN_CONTEXT: &[u8] = b"session-token.v1";

/// Reasons a presented token is rejected.
///
/// Internal only; inbound adapters collapse every variant into a uniform
/// authentication failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    /// The token does not split into its three dot-separated parts.
    #[error("token is malformed")]
    Malformed,
    /// The signature does not match the payload.
    #[error("token signature mismatch")]
    BadSignature,
    /// The token's expiry timestamp is in the past.
    #[error("token expired")]
    Expired,
}

/// Bearer credential minted on successful code exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionToken(String);

impl SessionToken {
    /// Borrow the token as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<SessionToken> for String {
    fn from(value: SessionToken) -> Self {
        value.0
    }
}

impl fmt::Display for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Mints and validates session tokens with the server secret.
#[derive(Clone)]
pub struct TokenSigner {
    secret: Vec<u8>,
    ttl: Duration,
}

impl TokenSigner {
    /// Build a signer around the server secret and a token lifetime.
    pub fn new(secret: impl Into<Vec<u8>>, ttl: Duration) -> Self {
        Self {
            secret: secret.into(),
            ttl,
        }
    }

    fn mac_for(&self, user_id: UserId, expires_at: i64) -> HmacSha256 {
        let mut mac = HmacSha256::new_from_slice(&self.secret)
            .unwrap_or_else(|_| panic!("HMAC accepts keys of any length"));
        mac.update(TOKEN_CONTEXT);
        mac.update(user_id.as_uuid().as_bytes());
        mac.update(&expires_at.to_be_bytes());
        mac
    }

    /// Mint a fresh token bound to the user's identity.
    #[must_use]
    pub fn issue(&self, user: &User) -> SessionToken {
        self.issue_at(user.id(), Utc::now())
    }

    fn issue_at(&self, user_id: UserId, now: DateTime<Utc>) -> SessionToken {
        let expires_at = (now + self.ttl).timestamp();
        let mac = self.mac_for(user_id, expires_at);
        let signature = hex::encode(mac.finalize().into_bytes());
        SessionToken(format!("{user_id}.{expires_at}.{signature}"))
    }

    /// Validate a presented token and return the identity it carries.
    pub fn parse(&self, raw: &str) -> Result<UserId, TokenError> {
        self.parse_at(raw, Utc::now())
    }

    fn parse_at(&self, raw: &str, now: DateTime<Utc>) -> Result<UserId, TokenError> {
        let mut parts = raw.splitn(3, '.');
        let (Some(id_part), Some(expiry_part), Some(signature_part)) =
            (parts.next(), parts.next(), parts.next())
        else {
            return Err(TokenError::Malformed);
        };

        let user_id: UserId = id_part.parse().map_err(|_| TokenError::Malformed)?;
        let expires_at: i64 = expiry_part.parse().map_err(|_| TokenError::Malformed)?;
        let signature = hex::decode(signature_part).map_err(|_| TokenError::Malformed)?;

        // Signature first: expiry is attacker-controlled input until the MAC
        // over it has been checked.
        self.mac_for(user_id, expires_at)
            .verify_slice(&signature)
            .map_err(|_| TokenError::BadSignature)?;

        if expires_at <= now.timestamp() {
            return Err(TokenError::Expired);
        }
        Ok(user_id)
    }
}
