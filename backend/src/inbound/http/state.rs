//! Shared HTTP adapter state.
//!
//! Handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports and stay testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{
    CatalogueRepository, ReviewRepository, SignupUseCase, TokenExchangeUseCase, UserRepository,
};
use crate::domain::session::TokenSigner;

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    /// Sign-up flow (step one of authentication).
    pub signup: Arc<dyn SignupUseCase>,
    /// Code-for-token exchange (step two of authentication).
    pub token_exchange: Arc<dyn TokenExchangeUseCase>,
    /// User records, shared by the admin endpoints and the identity
    /// extractor.
    pub users: Arc<dyn UserRepository>,
    /// Categories, genres and titles.
    pub catalogue: Arc<dyn CatalogueRepository>,
    /// Reviews and comments.
    pub reviews: Arc<dyn ReviewRepository>,
    /// Validates presented bearer tokens.
    pub sessions: Arc<TokenSigner>,
}
