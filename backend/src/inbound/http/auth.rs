//! Authentication HTTP handlers.
//!
//! ```text
//! POST /api/v1/auth/signup  Request (or re-request) a confirmation code
//! POST /api/v1/auth/token   Exchange a confirmation code for a bearer token
//! ```
//!
//! Both endpoints are open to anonymous callers; together they form the
//! two-step flow that replaces passwords.

use actix_web::{post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::Error;
use crate::domain::user::{EmailAddress, Username};
use crate::inbound::http::ApiResult;
use crate::inbound::http::state::HttpState;

/// Request payload for the sign-up step.
#[derive(Debug, Deserialize, ToSchema)]
pub struct SignupRequest {
    /// Address the confirmation code is mailed to.
    #[schema(value_type = String, example = "alice@example.com")]
    pub email: EmailAddress,
    /// Requested account name.
    #[schema(value_type = String, example = "alice")]
    pub username: Username,
}

/// Echo of the accepted sign-up pair.
#[derive(Debug, Serialize, ToSchema)]
pub struct SignupResponse {
    /// Address the code was sent to.
    #[schema(value_type = String)]
    pub email: EmailAddress,
    /// Account name the code belongs to.
    #[schema(value_type = String)]
    pub username: Username,
}

/// Request payload for the token exchange step.
#[derive(Debug, Deserialize, ToSchema)]
pub struct TokenRequest {
    /// Account name from the sign-up step.
    #[schema(value_type = String, example = "alice")]
    pub username: Username,
    /// Code received by mail.
    pub confirmation_code: String,
}

/// Bearer credential for subsequent requests.
#[derive(Debug, Serialize, ToSchema)]
pub struct TokenResponse {
    /// Opaque token for the `Authorization: Bearer` header.
    pub token: String,
}

/// Request a confirmation code.
///
/// Repeating the request for the same pair re-sends the same code; a
/// pair colliding with an existing account on only one field fails.
#[utoipa::path(
    post,
    path = "/api/v1/auth/signup",
    request_body = SignupRequest,
    responses(
        (status = 200, description = "Confirmation code sent", body = SignupResponse),
        (status = 400, description = "Invalid or conflicting pair", body = Error),
        (status = 503, description = "Mail dispatch failed; retry sign-up", body = Error)
    ),
    tags = ["auth"],
    operation_id = "signup"
)]
#[post("/auth/signup")]
pub async fn signup(
    state: web::Data<HttpState>,
    payload: web::Json<SignupRequest>,
) -> ApiResult<web::Json<SignupResponse>> {
    let SignupRequest { email, username } = payload.into_inner();
    let user = state.signup.sign_up(username, email).await?;
    Ok(web::Json(SignupResponse {
        email: user.email().clone(),
        username: user.username().clone(),
    }))
}

/// Exchange a confirmation code for a bearer token.
#[utoipa::path(
    post,
    path = "/api/v1/auth/token",
    request_body = TokenRequest,
    responses(
        (status = 200, description = "Token issued", body = TokenResponse),
        (status = 400, description = "Invalid confirmation code", body = Error),
        (status = 404, description = "Unknown username", body = Error)
    ),
    tags = ["auth"],
    operation_id = "token"
)]
#[post("/auth/token")]
pub async fn token(
    state: web::Data<HttpState>,
    payload: web::Json<TokenRequest>,
) -> ApiResult<web::Json<TokenResponse>> {
    let TokenRequest {
        username,
        confirmation_code,
    } = payload.into_inner();
    let session = state
        .token_exchange
        .exchange(&username, &confirmation_code)
        .await?;
    Ok(web::Json(TokenResponse {
        token: session.into(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use actix_web::{App, http::StatusCode, test};
    use chrono::Duration;

    use crate::domain::ports::{
        MockCatalogueRepository, MockReviewRepository, MockSignupUseCase,
        MockTokenExchangeUseCase, MockUserRepository,
    };
    use crate::domain::session::TokenSigner;
    use crate::domain::user::User;

    fn state(
        signup_mock: MockSignupUseCase,
        token_exchange: MockTokenExchangeUseCase,
    ) -> web::Data<HttpState> {
        web::Data::new(HttpState {
            signup: Arc::new(signup_mock),
            token_exchange: Arc::new(token_exchange),
            users: Arc::new(MockUserRepository::new()),
            catalogue: Arc::new(MockCatalogueRepository::new()),
            reviews: Arc::new(MockReviewRepository::new()),
            sessions: Arc::new(TokenSigner::new(b"test-secret".to_vec(), Duration::hours(1))),
        })
    }

    #[actix_web::test]
    async fn signup_echoes_the_accepted_pair() {
        let mut use_case = MockSignupUseCase::new();
        use_case.expect_sign_up().times(1).return_once(|username, email| {
            Ok(User::signup(username, email))
        });

        let app = test::init_service(
            App::new()
                .app_data(state(use_case, MockTokenExchangeUseCase::new()))
                .service(signup),
        )
        .await;

        let request = test::TestRequest::post()
            .uri("/auth/signup")
            .set_json(serde_json::json!({
                "username": "alice",
                "email": "alice@example.com"
            }))
            .to_request();
        let response = test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::OK);

        let body: serde_json::Value = test::read_body_json(response).await;
        assert_eq!(body["username"], "alice");
        assert_eq!(body["email"], "alice@example.com");
    }

    #[actix_web::test]
    async fn signup_rejects_a_malformed_email() {
        let mut use_case = MockSignupUseCase::new();
        use_case.expect_sign_up().times(0);

        let app = test::init_service(
            App::new()
                .app_data(state(use_case, MockTokenExchangeUseCase::new()))
                .service(signup),
        )
        .await;

        let request = test::TestRequest::post()
            .uri("/auth/signup")
            .set_json(serde_json::json!({
                "username": "alice",
                "email": "not-an-email"
            }))
            .to_request();
        let response = test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn signup_rejects_the_reserved_username() {
        let mut use_case = MockSignupUseCase::new();
        use_case.expect_sign_up().times(0);

        let app = test::init_service(
            App::new()
                .app_data(state(use_case, MockTokenExchangeUseCase::new()))
                .service(signup),
        )
        .await;

        let request = test::TestRequest::post()
            .uri("/auth/signup")
            .set_json(serde_json::json!({
                "username": "me",
                "email": "me@example.com"
            }))
            .to_request();
        let response = test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn token_returns_the_minted_credential() {
        let signer = TokenSigner::new(b"test-secret".to_vec(), Duration::hours(1));
        let user = User::signup(
            Username::new("alice").expect("valid username"),
            EmailAddress::new("alice@example.com").expect("valid email"),
        );
        let minted = signer.issue(&user);
        let expected = minted.as_str().to_owned();

        let mut exchange = MockTokenExchangeUseCase::new();
        exchange
            .expect_exchange()
            .times(1)
            .return_once(move |_, _| Ok(minted));

        let app = test::init_service(
            App::new()
                .app_data(state(MockSignupUseCase::new(), exchange))
                .service(token),
        )
        .await;

        let request = test::TestRequest::post()
            .uri("/auth/token")
            .set_json(serde_json::json!({
                "username": "alice",
                "confirmation_code": "c0de"
            }))
            .to_request();
        let response = test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::OK);

        let body: serde_json::Value = test::read_body_json(response).await;
        assert_eq!(body["token"], expected);
    }

    #[actix_web::test]
    async fn token_maps_unknown_usernames_to_404() {
        let mut exchange = MockTokenExchangeUseCase::new();
        exchange
            .expect_exchange()
            .times(1)
            .return_once(|_, _| Err(Error::not_found("user not found")));

        let app = test::init_service(
            App::new()
                .app_data(state(MockSignupUseCase::new(), exchange))
                .service(token),
        )
        .await;

        let request = test::TestRequest::post()
            .uri("/auth/token")
            .set_json(serde_json::json!({
                "username": "ghost",
                "confirmation_code": "c0de"
            }))
            .to_request();
        let response = test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
