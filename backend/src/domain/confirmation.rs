//! Confirmation codes derived from user state.
//!
//! Codes are never stored. Issuing and checking are the same keyed-hash
//! computation over `(user id, state_version)`, so any mutation of the user
//! record silently invalidates every previously issued code. Codes do not
//! expire by time; only by state change.

use std::fmt;

use hmac::{Hmac, Mac};
use sha2::Sha256;

use super::user::User;

type HmacSha256 = Hmac<Sha256>;

/// Domain-separation context; keeps confirmation codes and session token
/// signatures distinct even though both use the server secret.
const CODE_CONTEXT: &[u8] = b"confirmation-code.v1";

/// One-time code delivered by mail and exchanged for a session token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmationCode(String);

impl ConfirmationCode {
    /// Borrow the code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for ConfirmationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Derives and checks confirmation codes with the server secret.
#[derive(Clone)]
pub struct CodeSigner {
    secret: Vec<u8>,
}

impl CodeSigner {
    /// Build a signer around the server secret.
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    fn mac_for(&self, user: &User) -> HmacSha256 {
        let mut mac = HmacSha256::new_from_slice(&self.secret)
            .unwrap_or_else(|_| panic!("HMAC accepts keys of any length"));
        mac.update(CODE_CONTEXT);
        mac.update(user.id().as_uuid().as_bytes());
        mac.update(&user.state_version().to_be_bytes());
        mac
    }

    /// Derive the code currently valid for `user`.
    #[must_use]
    pub fn code_for(&self, user: &User) -> ConfirmationCode {
        let mac = self.mac_for(user);
        ConfirmationCode(hex::encode(mac.finalize().into_bytes()))
    }

    /// Check a submitted code against the user's current state.
    ///
    /// The comparison happens inside the MAC verification and is constant
    /// time; callers learn only pass/fail.
    #[must_use]
    pub fn verify(&self, user: &User, submitted: &str) -> bool {
        let Ok(bytes) = hex::decode(submitted) else {
            return false;
        };
        self.mac_for(user).verify_slice(&bytes).is_ok()
    }
}
