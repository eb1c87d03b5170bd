//! Driving ports for the authentication flows.

use async_trait::async_trait;

use crate::domain::error::Error;
use crate::domain::session::SessionToken;
use crate::domain::user::{EmailAddress, User, Username};

/// Driving port for the sign-up flow: fetch or create the account and
/// mail its confirmation code.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SignupUseCase: Send + Sync {
    /// Run the flow for an exact (username, email) pair.
    async fn sign_up(&self, username: Username, email: EmailAddress) -> Result<User, Error>;
}

/// Driving port for exchanging a confirmation code for a session token.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TokenExchangeUseCase: Send + Sync {
    /// Verify the code for `username` and mint a bearer token.
    async fn exchange(&self, username: &Username, code: &str) -> Result<SessionToken, Error>;
}
