//! HTTP inbound adapter exposing the REST endpoints under `/api/v1`.

use actix_web::web;

pub mod auth;
pub mod catalogue;
pub mod error;
pub mod identity;
pub mod reviews;
pub mod state;
pub mod users;

pub use crate::domain::ApiResult;

/// Register every handler under the `/api/v1` scope.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .service(auth::signup)
            .service(auth::token)
            .service(users::me_detail)
            .service(users::me_update)
            .service(users::list)
            .service(users::create)
            .service(users::detail)
            .service(users::update)
            .service(users::remove)
            .service(catalogue::category_list)
            .service(catalogue::category_create)
            .service(catalogue::category_delete)
            .service(catalogue::genre_list)
            .service(catalogue::genre_create)
            .service(catalogue::genre_delete)
            .service(catalogue::title_list)
            .service(catalogue::title_create)
            .service(catalogue::title_detail)
            .service(catalogue::title_update)
            .service(catalogue::title_delete)
            .service(reviews::review_list)
            .service(reviews::review_create)
            .service(reviews::review_detail)
            .service(reviews::review_update)
            .service(reviews::review_delete)
            .service(reviews::comment_list)
            .service(reviews::comment_create)
            .service(reviews::comment_detail)
            .service(reviews::comment_update)
            .service(reviews::comment_delete),
    );
}
