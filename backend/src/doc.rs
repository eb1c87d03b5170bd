//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] generates the specification for the REST API: every
//! endpoint from the inbound layer, the request/response schemas, and
//! the bearer-token security scheme minted by `POST /api/v1/auth/token`.
//! Swagger UI serves the document in debug builds at `/docs`.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::{Error, ErrorCode};
use crate::inbound::http::auth::{SignupRequest, SignupResponse, TokenRequest, TokenResponse};
use crate::inbound::http::catalogue::{
    CategoryDto, CreateTitleRequest, GenreDto, TitleResponse, UpdateTitleRequest,
};
use crate::inbound::http::reviews::{
    CommentBody, CommentResponse, CreateReviewRequest, ReviewResponse, UpdateReviewRequest,
};
use crate::inbound::http::users::{CreateUserRequest, UpdateUserRequest, UserResponse};

/// Enrich the generated document with the bearer token security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "BearerToken",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .description(Some("Token issued by POST /api/v1/auth/token."))
                    .build(),
            ),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Review catalogue API",
        description = "Titles, genres, categories, reviews and comments with \
                       role-based access and email-code authentication."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("BearerToken" = [])),
    paths(
        crate::inbound::http::auth::signup,
        crate::inbound::http::auth::token,
        crate::inbound::http::users::list,
        crate::inbound::http::users::create,
        crate::inbound::http::users::me_detail,
        crate::inbound::http::users::me_update,
        crate::inbound::http::users::detail,
        crate::inbound::http::users::update,
        crate::inbound::http::users::remove,
        crate::inbound::http::catalogue::category_list,
        crate::inbound::http::catalogue::category_create,
        crate::inbound::http::catalogue::category_delete,
        crate::inbound::http::catalogue::genre_list,
        crate::inbound::http::catalogue::genre_create,
        crate::inbound::http::catalogue::genre_delete,
        crate::inbound::http::catalogue::title_list,
        crate::inbound::http::catalogue::title_create,
        crate::inbound::http::catalogue::title_detail,
        crate::inbound::http::catalogue::title_update,
        crate::inbound::http::catalogue::title_delete,
        crate::inbound::http::reviews::review_list,
        crate::inbound::http::reviews::review_create,
        crate::inbound::http::reviews::review_detail,
        crate::inbound::http::reviews::review_update,
        crate::inbound::http::reviews::review_delete,
        crate::inbound::http::reviews::comment_list,
        crate::inbound::http::reviews::comment_create,
        crate::inbound::http::reviews::comment_detail,
        crate::inbound::http::reviews::comment_update,
        crate::inbound::http::reviews::comment_delete,
    ),
    components(schemas(
        Error,
        ErrorCode,
        SignupRequest,
        SignupResponse,
        TokenRequest,
        TokenResponse,
        UserResponse,
        CreateUserRequest,
        UpdateUserRequest,
        CategoryDto,
        GenreDto,
        TitleResponse,
        CreateTitleRequest,
        UpdateTitleRequest,
        ReviewResponse,
        CommentResponse,
        CreateReviewRequest,
        UpdateReviewRequest,
        CommentBody,
    )),
    tags(
        (name = "auth", description = "Two-step email-code authentication"),
        (name = "users", description = "Account administration and the /users/me profile"),
        (name = "catalogue", description = "Categories, genres and titles"),
        (name = "reviews", description = "Reviews and their comments")
    )
)]
pub struct ApiDoc;
