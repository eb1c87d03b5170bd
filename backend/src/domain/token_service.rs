//! Token exchange domain service.
//!
//! Implements the second step of authentication: verify a submitted
//! confirmation code against the account's current state and mint a
//! signed bearer token. An unknown username is reported as not-found so
//! the first step can be retried; a wrong code is a plain validation
//! failure and deliberately carries no detail about why it failed.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::confirmation::CodeSigner;
use crate::domain::error::Error;
use crate::domain::ports::{TokenExchangeUseCase, UserRepository, UserRepositoryError};
use crate::domain::session::{SessionToken, TokenSigner};
use crate::domain::user::Username;

/// Token exchange service implementing [`TokenExchangeUseCase`].
#[derive(Clone)]
pub struct TokenService<R> {
    users: Arc<R>,
    codes: Arc<CodeSigner>,
    tokens: Arc<TokenSigner>,
}

impl<R> TokenService<R> {
    /// Create a new service over the given repository and signers.
    pub fn new(users: Arc<R>, codes: Arc<CodeSigner>, tokens: Arc<TokenSigner>) -> Self {
        Self {
            users,
            codes,
            tokens,
        }
    }
}

impl<R> TokenService<R>
where
    R: UserRepository,
{
    fn map_user_error(error: UserRepositoryError) -> Error {
        Error::internal(format!("user repository error: {error}"))
    }
}

#[async_trait]
impl<R> TokenExchangeUseCase for TokenService<R>
where
    R: UserRepository,
{
    async fn exchange(&self, username: &Username, code: &str) -> Result<SessionToken, Error> {
        let user = self
            .users
            .find_by_username(username)
            .await
            .map_err(Self::map_user_error)?
            .ok_or_else(|| Error::not_found("user not found"))?;

        if !self.codes.verify(&user, code) {
            return Err(Error::invalid_request("invalid confirmation code"));
        }

        tracing::info!(user_id = %user.id(), "session token issued");
        Ok(self.tokens.issue(&user))
    }
}
