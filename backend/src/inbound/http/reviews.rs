//! Review and comment HTTP handlers.
//!
//! ```text
//! GET    /api/v1/titles/{title_id}/reviews                  List reviews
//! POST   /api/v1/titles/{title_id}/reviews                  Create a review
//! GET    /api/v1/titles/{title_id}/reviews/{review_id}      Retrieve a review
//! PATCH  /api/v1/titles/{title_id}/reviews/{review_id}      Update a review
//! DELETE /api/v1/titles/{title_id}/reviews/{review_id}      Delete a review
//! GET    .../reviews/{review_id}/comments                   List comments
//! POST   .../reviews/{review_id}/comments                   Create a comment
//! GET    .../comments/{comment_id}                          Retrieve a comment
//! PATCH  .../comments/{comment_id}                          Update a comment
//! DELETE .../comments/{comment_id}                          Delete a comment
//! ```
//!
//! Every handler resolves the full parent chain first: a review reached
//! through the wrong title, or a comment through the wrong review, is a
//! 404 before any permission decision.

use actix_web::{HttpResponse, delete, get, patch, post, web};
use chrono::{DateTime, Utc};
use pagination::{Page, PageParams};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::Error;
use crate::domain::access::{self, AccessKind};
use crate::domain::catalogue::TitleId;
use crate::domain::ports::ReviewRepositoryError;
use crate::domain::review::{BodyText, Comment, CommentId, Review, ReviewId, Score};
use crate::domain::user::UserId;
use crate::inbound::http::ApiResult;
use crate::inbound::http::identity::{Identity, ensure};
use crate::inbound::http::state::HttpState;

/// Review representation returned by every review endpoint.
#[derive(Debug, Serialize, ToSchema)]
pub struct ReviewResponse {
    /// Stable identifier.
    #[schema(value_type = String)]
    pub id: ReviewId,
    /// Author's username.
    pub author: String,
    /// Review body.
    #[schema(value_type = String)]
    pub text: BodyText,
    /// Score on the 1..=10 scale.
    #[schema(value_type = u8)]
    pub score: Score,
    /// Creation timestamp.
    pub pub_date: DateTime<Utc>,
}

/// Comment representation returned by every comment endpoint.
#[derive(Debug, Serialize, ToSchema)]
pub struct CommentResponse {
    /// Stable identifier.
    #[schema(value_type = String)]
    pub id: CommentId,
    /// Author's username.
    pub author: String,
    /// Comment body.
    #[schema(value_type = String)]
    pub text: BodyText,
    /// Creation timestamp.
    pub pub_date: DateTime<Utc>,
}

/// Payload for creating a review.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateReviewRequest {
    /// Review body.
    #[schema(value_type = String)]
    pub text: BodyText,
    /// Score on the 1..=10 scale.
    #[schema(value_type = u8, minimum = 1, maximum = 10)]
    pub score: Score,
}

/// Partial update payload for a review.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateReviewRequest {
    /// Replacement body.
    #[schema(value_type = Option<String>)]
    pub text: Option<BodyText>,
    /// Replacement score.
    #[schema(value_type = Option<u8>, minimum = 1, maximum = 10)]
    pub score: Option<Score>,
}

/// Payload for creating or updating a comment.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CommentBody {
    /// Comment body.
    #[schema(value_type = String)]
    pub text: BodyText,
}

/// Pagination query shared by both listings.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    /// 1-based page number.
    pub page: Option<u32>,
    /// Page size, capped server-side.
    pub page_size: Option<u32>,
}

fn map_review_error(error: ReviewRepositoryError) -> Error {
    match error {
        ReviewRepositoryError::DuplicateReview => {
            Error::conflict("you have already reviewed this title")
        }
        ReviewRepositoryError::Backend { message } => {
            Error::internal(format!("review repository error: {message}"))
        }
    }
}

fn resolve_window(query: &PageQuery) -> Result<pagination::ResolvedPage, Error> {
    PageParams {
        page: query.page,
        page_size: query.page_size,
    }
    .resolve()
    .map_err(|error| Error::invalid_request(error.to_string()))
}

fn parse_title_id(raw: &str) -> Result<TitleId, Error> {
    raw.parse::<TitleId>()
        .map_err(|_| Error::not_found("title not found"))
}

fn parse_review_id(raw: &str) -> Result<ReviewId, Error> {
    raw.parse::<ReviewId>()
        .map_err(|_| Error::not_found("review not found"))
}

fn parse_comment_id(raw: &str) -> Result<CommentId, Error> {
    raw.parse::<CommentId>()
        .map_err(|_| Error::not_found("comment not found"))
}

async fn require_title(state: &HttpState, raw: &str) -> Result<TitleId, Error> {
    let id = parse_title_id(raw)?;
    state
        .catalogue
        .find_title(id)
        .await
        .map_err(|error| Error::internal(format!("catalogue repository error: {error}")))?
        .ok_or_else(|| Error::not_found("title not found"))?;
    Ok(id)
}

/// Resolve a review and check it hangs off the given title.
async fn require_review(
    state: &HttpState,
    title: TitleId,
    raw: &str,
) -> Result<Review, Error> {
    let id = parse_review_id(raw)?;
    let review = state
        .reviews
        .find_review(id)
        .await
        .map_err(map_review_error)?
        .ok_or_else(|| Error::not_found("review not found"))?;
    if review.title != title {
        return Err(Error::not_found("review not found"));
    }
    Ok(review)
}

/// Resolve a comment and check it hangs off the given review.
async fn require_comment(
    state: &HttpState,
    review: ReviewId,
    raw: &str,
) -> Result<Comment, Error> {
    let id = parse_comment_id(raw)?;
    let comment = state
        .reviews
        .find_comment(id)
        .await
        .map_err(map_review_error)?
        .ok_or_else(|| Error::not_found("comment not found"))?;
    if comment.review != review {
        return Err(Error::not_found("comment not found"));
    }
    Ok(comment)
}

/// Display name for an author; falls back to the raw identifier when the
/// account no longer exists.
async fn author_name(state: &HttpState, author: UserId) -> Result<String, Error> {
    let user = state
        .users
        .find_by_id(author)
        .await
        .map_err(|error| Error::internal(format!("user repository error: {error}")))?;
    Ok(user.map_or_else(|| author.to_string(), |user| user.username().to_string()))
}

async fn render_review(state: &HttpState, review: &Review) -> Result<ReviewResponse, Error> {
    Ok(ReviewResponse {
        id: review.id,
        author: author_name(state, review.author).await?,
        text: review.text.clone(),
        score: review.score,
        pub_date: review.pub_date,
    })
}

async fn render_comment(state: &HttpState, comment: &Comment) -> Result<CommentResponse, Error> {
    Ok(CommentResponse {
        id: comment.id,
        author: author_name(state, comment.author).await?,
        text: comment.text.clone(),
        pub_date: comment.pub_date,
    })
}

/// List reviews for a title.
#[utoipa::path(
    get,
    path = "/api/v1/titles/{title_id}/reviews",
    params(
        ("title_id" = String, Path, description = "Title identifier"),
        ("page" = Option<u32>, Query, description = "1-based page number"),
        ("page_size" = Option<u32>, Query, description = "Page size")
    ),
    responses(
        (status = 200, description = "Paginated reviews"),
        (status = 404, description = "No such title", body = Error)
    ),
    tags = ["reviews"],
    operation_id = "listReviews"
)]
#[get("/titles/{title_id}/reviews")]
pub async fn review_list(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    query: web::Query<PageQuery>,
) -> ApiResult<web::Json<Page<ReviewResponse>>> {
    // Parent lookup first so a missing title answers 404 even when the
    // page parameters are bad.
    let title = require_title(&state, &path).await?;
    let window = resolve_window(&query)?;
    let reviews = state
        .reviews
        .list_reviews(title)
        .await
        .map_err(map_review_error)?;
    let mut results = Vec::with_capacity(reviews.len());
    for review in &reviews {
        results.push(render_review(&state, review).await?);
    }
    Ok(web::Json(Page::paginate(results, window)))
}

/// Create a review; one per author per title.
#[utoipa::path(
    post,
    path = "/api/v1/titles/{title_id}/reviews",
    params(("title_id" = String, Path, description = "Title identifier")),
    request_body = CreateReviewRequest,
    responses(
        (status = 200, description = "Review created", body = ReviewResponse),
        (status = 400, description = "Invalid payload or second review", body = Error),
        (status = 401, description = "Not authenticated", body = Error),
        (status = 404, description = "No such title", body = Error)
    ),
    tags = ["reviews"],
    operation_id = "createReview"
)]
#[post("/titles/{title_id}/reviews")]
pub async fn review_create(
    state: web::Data<HttpState>,
    identity: Identity,
    path: web::Path<String>,
    payload: web::Json<CreateReviewRequest>,
) -> ApiResult<web::Json<ReviewResponse>> {
    ensure(
        identity.actor(),
        access::review_collection(identity.actor(), AccessKind::Write),
    )?;
    let author = identity.require_user()?.id();
    let title = require_title(&state, &path).await?;

    let CreateReviewRequest { text, score } = payload.into_inner();
    let review = Review::new(title, author, text, score);
    state
        .reviews
        .insert_review(&review)
        .await
        .map_err(map_review_error)?;
    Ok(web::Json(render_review(&state, &review).await?))
}

/// Retrieve a review.
#[utoipa::path(
    get,
    path = "/api/v1/titles/{title_id}/reviews/{review_id}",
    params(
        ("title_id" = String, Path, description = "Title identifier"),
        ("review_id" = String, Path, description = "Review identifier")
    ),
    responses(
        (status = 200, description = "Review", body = ReviewResponse),
        (status = 404, description = "No such title or review", body = Error)
    ),
    tags = ["reviews"],
    operation_id = "getReview"
)]
#[get("/titles/{title_id}/reviews/{review_id}")]
pub async fn review_detail(
    state: web::Data<HttpState>,
    path: web::Path<(String, String)>,
) -> ApiResult<web::Json<ReviewResponse>> {
    let (title_raw, review_raw) = path.into_inner();
    let title = require_title(&state, &title_raw).await?;
    let review = require_review(&state, title, &review_raw).await?;
    Ok(web::Json(render_review(&state, &review).await?))
}

/// Update a review; author, moderator or admin only.
#[utoipa::path(
    patch,
    path = "/api/v1/titles/{title_id}/reviews/{review_id}",
    params(
        ("title_id" = String, Path, description = "Title identifier"),
        ("review_id" = String, Path, description = "Review identifier")
    ),
    request_body = UpdateReviewRequest,
    responses(
        (status = 200, description = "Updated review", body = ReviewResponse),
        (status = 401, description = "Not authenticated", body = Error),
        (status = 403, description = "Not the author or a moderator", body = Error),
        (status = 404, description = "No such title or review", body = Error)
    ),
    tags = ["reviews"],
    operation_id = "updateReview"
)]
#[patch("/titles/{title_id}/reviews/{review_id}")]
pub async fn review_update(
    state: web::Data<HttpState>,
    identity: Identity,
    path: web::Path<(String, String)>,
    payload: web::Json<UpdateReviewRequest>,
) -> ApiResult<web::Json<ReviewResponse>> {
    ensure(
        identity.actor(),
        access::review_collection(identity.actor(), AccessKind::Write),
    )?;
    let (title_raw, review_raw) = path.into_inner();
    let title = require_title(&state, &title_raw).await?;
    let mut review = require_review(&state, title, &review_raw).await?;
    ensure(
        identity.actor(),
        access::review_object(identity.actor(), AccessKind::Write, review.author),
    )?;

    let UpdateReviewRequest { text, score } = payload.into_inner();
    if let Some(text) = text {
        review.text = text;
    }
    if let Some(score) = score {
        review.score = score;
    }
    state
        .reviews
        .update_review(&review)
        .await
        .map_err(map_review_error)?;
    Ok(web::Json(render_review(&state, &review).await?))
}

/// Delete a review and its comments; author, moderator or admin only.
#[utoipa::path(
    delete,
    path = "/api/v1/titles/{title_id}/reviews/{review_id}",
    params(
        ("title_id" = String, Path, description = "Title identifier"),
        ("review_id" = String, Path, description = "Review identifier")
    ),
    responses(
        (status = 204, description = "Review deleted"),
        (status = 401, description = "Not authenticated", body = Error),
        (status = 403, description = "Not the author or a moderator", body = Error),
        (status = 404, description = "No such title or review", body = Error)
    ),
    tags = ["reviews"],
    operation_id = "deleteReview"
)]
#[delete("/titles/{title_id}/reviews/{review_id}")]
pub async fn review_delete(
    state: web::Data<HttpState>,
    identity: Identity,
    path: web::Path<(String, String)>,
) -> ApiResult<HttpResponse> {
    ensure(
        identity.actor(),
        access::review_collection(identity.actor(), AccessKind::Write),
    )?;
    let (title_raw, review_raw) = path.into_inner();
    let title = require_title(&state, &title_raw).await?;
    let review = require_review(&state, title, &review_raw).await?;
    ensure(
        identity.actor(),
        access::review_object(identity.actor(), AccessKind::Write, review.author),
    )?;

    state
        .reviews
        .delete_review(review.id)
        .await
        .map_err(map_review_error)?;
    Ok(HttpResponse::NoContent().finish())
}

/// List comments on a review.
#[utoipa::path(
    get,
    path = "/api/v1/titles/{title_id}/reviews/{review_id}/comments",
    params(
        ("title_id" = String, Path, description = "Title identifier"),
        ("review_id" = String, Path, description = "Review identifier"),
        ("page" = Option<u32>, Query, description = "1-based page number"),
        ("page_size" = Option<u32>, Query, description = "Page size")
    ),
    responses(
        (status = 200, description = "Paginated comments"),
        (status = 404, description = "No such title or review", body = Error)
    ),
    tags = ["comments"],
    operation_id = "listComments"
)]
#[get("/titles/{title_id}/reviews/{review_id}/comments")]
pub async fn comment_list(
    state: web::Data<HttpState>,
    path: web::Path<(String, String)>,
    query: web::Query<PageQuery>,
) -> ApiResult<web::Json<Page<CommentResponse>>> {
    let (title_raw, review_raw) = path.into_inner();
    let title = require_title(&state, &title_raw).await?;
    let review = require_review(&state, title, &review_raw).await?;
    let window = resolve_window(&query)?;
    let comments = state
        .reviews
        .list_comments(review.id)
        .await
        .map_err(map_review_error)?;
    let mut results = Vec::with_capacity(comments.len());
    for comment in &comments {
        results.push(render_comment(&state, comment).await?);
    }
    Ok(web::Json(Page::paginate(results, window)))
}

/// Comment on a review.
#[utoipa::path(
    post,
    path = "/api/v1/titles/{title_id}/reviews/{review_id}/comments",
    params(
        ("title_id" = String, Path, description = "Title identifier"),
        ("review_id" = String, Path, description = "Review identifier")
    ),
    request_body = CommentBody,
    responses(
        (status = 200, description = "Comment created", body = CommentResponse),
        (status = 401, description = "Not authenticated", body = Error),
        (status = 404, description = "No such title or review", body = Error)
    ),
    tags = ["comments"],
    operation_id = "createComment"
)]
#[post("/titles/{title_id}/reviews/{review_id}/comments")]
pub async fn comment_create(
    state: web::Data<HttpState>,
    identity: Identity,
    path: web::Path<(String, String)>,
    payload: web::Json<CommentBody>,
) -> ApiResult<web::Json<CommentResponse>> {
    ensure(
        identity.actor(),
        access::review_collection(identity.actor(), AccessKind::Write),
    )?;
    let author = identity.require_user()?.id();
    let (title_raw, review_raw) = path.into_inner();
    let title = require_title(&state, &title_raw).await?;
    let review = require_review(&state, title, &review_raw).await?;

    let comment = Comment::new(review.id, author, payload.into_inner().text);
    state
        .reviews
        .insert_comment(&comment)
        .await
        .map_err(map_review_error)?;
    Ok(web::Json(render_comment(&state, &comment).await?))
}

/// Retrieve a comment.
#[utoipa::path(
    get,
    path = "/api/v1/titles/{title_id}/reviews/{review_id}/comments/{comment_id}",
    params(
        ("title_id" = String, Path, description = "Title identifier"),
        ("review_id" = String, Path, description = "Review identifier"),
        ("comment_id" = String, Path, description = "Comment identifier")
    ),
    responses(
        (status = 200, description = "Comment", body = CommentResponse),
        (status = 404, description = "Broken parent chain", body = Error)
    ),
    tags = ["comments"],
    operation_id = "getComment"
)]
#[get("/titles/{title_id}/reviews/{review_id}/comments/{comment_id}")]
pub async fn comment_detail(
    state: web::Data<HttpState>,
    path: web::Path<(String, String, String)>,
) -> ApiResult<web::Json<CommentResponse>> {
    let (title_raw, review_raw, comment_raw) = path.into_inner();
    let title = require_title(&state, &title_raw).await?;
    let review = require_review(&state, title, &review_raw).await?;
    let comment = require_comment(&state, review.id, &comment_raw).await?;
    Ok(web::Json(render_comment(&state, &comment).await?))
}

/// Update a comment; author, moderator or admin only.
#[utoipa::path(
    patch,
    path = "/api/v1/titles/{title_id}/reviews/{review_id}/comments/{comment_id}",
    params(
        ("title_id" = String, Path, description = "Title identifier"),
        ("review_id" = String, Path, description = "Review identifier"),
        ("comment_id" = String, Path, description = "Comment identifier")
    ),
    request_body = CommentBody,
    responses(
        (status = 200, description = "Updated comment", body = CommentResponse),
        (status = 401, description = "Not authenticated", body = Error),
        (status = 403, description = "Not the author or a moderator", body = Error),
        (status = 404, description = "Broken parent chain", body = Error)
    ),
    tags = ["comments"],
    operation_id = "updateComment"
)]
#[patch("/titles/{title_id}/reviews/{review_id}/comments/{comment_id}")]
pub async fn comment_update(
    state: web::Data<HttpState>,
    identity: Identity,
    path: web::Path<(String, String, String)>,
    payload: web::Json<CommentBody>,
) -> ApiResult<web::Json<CommentResponse>> {
    ensure(
        identity.actor(),
        access::review_collection(identity.actor(), AccessKind::Write),
    )?;
    let (title_raw, review_raw, comment_raw) = path.into_inner();
    let title = require_title(&state, &title_raw).await?;
    let review = require_review(&state, title, &review_raw).await?;
    let mut comment = require_comment(&state, review.id, &comment_raw).await?;
    ensure(
        identity.actor(),
        access::review_object(identity.actor(), AccessKind::Write, comment.author),
    )?;

    comment.text = payload.into_inner().text;
    state
        .reviews
        .update_comment(&comment)
        .await
        .map_err(map_review_error)?;
    Ok(web::Json(render_comment(&state, &comment).await?))
}

/// Delete a comment; author, moderator or admin only.
#[utoipa::path(
    delete,
    path = "/api/v1/titles/{title_id}/reviews/{review_id}/comments/{comment_id}",
    params(
        ("title_id" = String, Path, description = "Title identifier"),
        ("review_id" = String, Path, description = "Review identifier"),
        ("comment_id" = String, Path, description = "Comment identifier")
    ),
    responses(
        (status = 204, description = "Comment deleted"),
        (status = 401, description = "Not authenticated", body = Error),
        (status = 403, description = "Not the author or a moderator", body = Error),
        (status = 404, description = "Broken parent chain", body = Error)
    ),
    tags = ["comments"],
    operation_id = "deleteComment"
)]
#[delete("/titles/{title_id}/reviews/{review_id}/comments/{comment_id}")]
pub async fn comment_delete(
    state: web::Data<HttpState>,
    identity: Identity,
    path: web::Path<(String, String, String)>,
) -> ApiResult<HttpResponse> {
    ensure(
        identity.actor(),
        access::review_collection(identity.actor(), AccessKind::Write),
    )?;
    let (title_raw, review_raw, comment_raw) = path.into_inner();
    let title = require_title(&state, &title_raw).await?;
    let review = require_review(&state, title, &review_raw).await?;
    let comment = require_comment(&state, review.id, &comment_raw).await?;
    ensure(
        identity.actor(),
        access::review_object(identity.actor(), AccessKind::Write, comment.author),
    )?;

    state
        .reviews
        .delete_comment(comment.id)
        .await
        .map_err(map_review_error)?;
    Ok(HttpResponse::NoContent().finish())
}
