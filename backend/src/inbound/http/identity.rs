//! Bearer-token identity extractor.
//!
//! Resolves the `Authorization` header into a domain [`Actor`] so handlers
//! never touch raw headers. A missing header yields an anonymous actor;
//! read-only endpoints serve those, write paths reject them through the
//! access predicates. The user record is loaded on every request, so a
//! role change takes effect immediately.

use actix_web::http::header;
use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use futures_util::future::LocalBoxFuture;

use crate::domain::access::Actor;
use crate::domain::ports::UserRepositoryError;
use crate::domain::session::TokenError;
use crate::domain::user::User;
use crate::domain::Error;
use crate::inbound::http::state::HttpState;

const BEARER_PREFIX: &str = "Bearer ";

/// Requesting principal, resolved once per request.
#[derive(Debug, Clone)]
pub struct Identity(Actor);

impl Identity {
    /// The resolved actor.
    #[must_use]
    pub const fn actor(&self) -> &Actor {
        &self.0
    }

    /// The authenticated user, or `401` when the request was anonymous.
    pub fn require_user(&self) -> Result<&User, Error> {
        self.0
            .user()
            .ok_or_else(|| Error::unauthorized("authentication required"))
    }
}

/// Turn a denied access predicate into the right status: 401 for
/// anonymous callers, 403 for authenticated ones. The message never says
/// which rule failed.
pub fn ensure(actor: &Actor, allowed: bool) -> Result<(), Error> {
    if allowed {
        Ok(())
    } else if actor.is_authenticated() {
        Err(Error::forbidden("insufficient permissions"))
    } else {
        Err(Error::unauthorized("authentication required"))
    }
}

fn map_token_error(error: TokenError) -> Error {
    // One message for every rejection; the reason is logged, not leaked.
    tracing::debug!(%error, "bearer token rejected");
    Error::unauthorized("invalid or expired token")
}

fn map_repository_error(error: UserRepositoryError) -> Error {
    Error::internal(format!("user repository error: {error}"))
}

async fn resolve(state: web::Data<HttpState>, header: Option<String>) -> Result<Identity, Error> {
    let Some(header) = header else {
        return Ok(Identity(Actor::Anonymous));
    };
    let Some(token) = header.strip_prefix(BEARER_PREFIX) else {
        return Err(Error::unauthorized(
            "authorization header must use the Bearer scheme",
        ));
    };

    let user_id = state.sessions.parse(token.trim()).map_err(map_token_error)?;
    let user = state
        .users
        .find_by_id(user_id)
        .await
        .map_err(map_repository_error)?
        .ok_or_else(|| Error::unauthorized("invalid or expired token"))?;
    Ok(Identity(Actor::Known(user)))
}

impl FromRequest for Identity {
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self, Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let state = req.app_data::<web::Data<HttpState>>().cloned();
        let header = req
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);

        Box::pin(async move {
            let Some(state) = state else {
                return Err(Error::internal("http state not registered"));
            };
            resolve(state, header).await
        })
    }
}
