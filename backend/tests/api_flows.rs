//! End-to-end flows over the full HTTP surface with in-memory adapters.
//!
//! These tests exercise the real services and repositories behind the
//! handlers; only the mail sink is a log writer, so confirmation codes
//! are re-derived with the signing secret instead of read from a mailbox.

use actix_http::Request;
use actix_web::body::MessageBody;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::{App, test, web};
use serde_json::{Value, json};

use backend::domain::confirmation::CodeSigner;
use backend::domain::user::Username;
use backend::inbound::http;
use backend::inbound::http::state::HttpState;
use backend::server::{AppSettings, build_http_state};

const SECRET: &str = "integration-secret";

fn settings() -> AppSettings {
    AppSettings {
        bind_addr: None,
        auth_secret: Some(SECRET.to_owned()),
        token_ttl_hours: Some(1),
        mail_sender: Some("codes@example.com".to_owned()),
        admin_username: Some("root".to_owned()),
        admin_email: Some("root@example.com".to_owned()),
    }
}

struct Harness {
    state: HttpState,
    signer: CodeSigner,
}

impl Harness {
    fn new() -> Self {
        let state = build_http_state(&settings()).expect("state should build");
        Self {
            state,
            signer: CodeSigner::new(SECRET.as_bytes().to_vec()),
        }
    }

    async fn app(
        &self,
    ) -> impl Service<Request, Response = ServiceResponse<impl MessageBody>, Error = actix_web::Error>
    {
        test::init_service(
            App::new()
                .app_data(web::Data::new(self.state.clone()))
                .configure(http::configure),
        )
        .await
    }

    /// Current confirmation code for a stored user.
    async fn code_for(&self, username: &str) -> String {
        let username = Username::new(username).expect("valid username");
        let user = self
            .state
            .users
            .find_by_username(&username)
            .await
            .expect("repository reachable")
            .expect("user exists");
        self.signer.code_for(&user).to_string()
    }
}

async fn request<S, B>(
    app: &S,
    method: actix_web::http::Method,
    path: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> ServiceResponse<B>
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let mut builder = test::TestRequest::with_uri(path).method(method);
    if let Some(token) = token {
        builder = builder.insert_header(("Authorization", format!("Bearer {token}")));
    }
    if let Some(body) = body {
        builder = builder.set_json(body);
    }
    test::call_service(app, builder.to_request()).await
}

async fn get<S, B>(app: &S, path: &str, token: Option<&str>) -> ServiceResponse<B>
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    request(app, actix_web::http::Method::GET, path, token, None).await
}

async fn post<S, B>(app: &S, path: &str, token: Option<&str>, body: Value) -> ServiceResponse<B>
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    request(app, actix_web::http::Method::POST, path, token, Some(body)).await
}

async fn patch<S, B>(app: &S, path: &str, token: Option<&str>, body: Value) -> ServiceResponse<B>
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    request(app, actix_web::http::Method::PATCH, path, token, Some(body)).await
}

async fn delete<S, B>(app: &S, path: &str, token: Option<&str>) -> ServiceResponse<B>
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    request(app, actix_web::http::Method::DELETE, path, token, None).await
}

async fn json_body<B: MessageBody>(response: ServiceResponse<B>) -> Value {
    test::read_body_json(response).await
}

/// Sign up (when needed) and exchange the derived code for a token.
async fn authenticate<S, B>(harness: &Harness, app: &S, username: &str, email: &str) -> String
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let response = post(
        app,
        "/api/v1/auth/signup",
        None,
        json!({ "username": username, "email": email }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK, "signup should succeed");

    let code = harness.code_for(username).await;
    let response = post(
        app,
        "/api/v1/auth/token",
        None,
        json!({ "username": username, "confirmation_code": code }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK, "exchange should succeed");
    let body = json_body(response).await;
    body["token"].as_str().expect("token string").to_owned()
}

/// Token for the seeded superuser; no signup round trip needed.
async fn admin_token<S, B>(harness: &Harness, app: &S) -> String
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let code = harness.code_for("root").await;
    let response = post(
        app,
        "/api/v1/auth/token",
        None,
        json!({ "username": "root", "confirmation_code": code }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    body["token"].as_str().expect("token string").to_owned()
}

/// Create a category, a genre and a title; returns the title id.
async fn seed_title<S, B>(app: &S, admin: &str) -> String
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let response = post(
        app,
        "/api/v1/categories",
        Some(admin),
        json!({ "name": "Films", "slug": "films" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = post(
        app,
        "/api/v1/genres",
        Some(admin),
        json!({ "name": "Drama", "slug": "drama" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = post(
        app,
        "/api/v1/titles",
        Some(admin),
        json!({
            "name": "The Long Quiet",
            "year": 1999,
            "category": "films",
            "genre": ["drama"]
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    body["id"].as_str().expect("title id").to_owned()
}

#[actix_web::test]
async fn signup_token_and_profile_round_trip() {
    let harness = Harness::new();
    let app = harness.app().await;

    let token = authenticate(&harness, &app, "alice", "alice@example.com").await;

    let response = get(&app, "/api/v1/users/me", Some(&token)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["username"], "alice");
    assert_eq!(body["email"], "alice@example.com");
    assert_eq!(body["role"], "user");
}

#[actix_web::test]
async fn repeated_signup_reissues_for_the_same_pair() {
    let harness = Harness::new();
    let app = harness.app().await;

    for _ in 0..2 {
        let response = post(
            &app,
            "/api/v1/auth/signup",
            None,
            json!({ "username": "alice", "email": "alice@example.com" }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    // Same username with a different email is a validation failure.
    let response = post(
        &app,
        "/api/v1/auth/signup",
        None,
        json!({ "username": "alice", "email": "other@example.com" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn profile_updates_invalidate_outstanding_codes() {
    let harness = Harness::new();
    let app = harness.app().await;

    let token = authenticate(&harness, &app, "alice", "alice@example.com").await;
    let stale = harness.code_for("alice").await;

    let response = patch(
        &app,
        "/api/v1/users/me",
        Some(&token),
        json!({ "bio": "rust and films" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = post(
        &app,
        "/api/v1/auth/token",
        None,
        json!({ "username": "alice", "confirmation_code": stale }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn anonymous_callers_can_read_but_not_write_the_catalogue() {
    let harness = Harness::new();
    let app = harness.app().await;

    let response = get(&app, "/api/v1/titles", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["count"], 0);

    let response = post(
        &app,
        "/api/v1/categories",
        None,
        json!({ "name": "Films", "slug": "films" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn plain_users_cannot_administer_the_catalogue() {
    let harness = Harness::new();
    let app = harness.app().await;

    let token = authenticate(&harness, &app, "alice", "alice@example.com").await;
    let response = post(
        &app,
        "/api/v1/categories",
        Some(&token),
        json!({ "name": "Films", "slug": "films" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn titles_render_category_genres_and_no_rating_when_unreviewed() {
    let harness = Harness::new();
    let app = harness.app().await;

    let admin = admin_token(&harness, &app).await;
    let title_id = seed_title(&app, &admin).await;

    let response = get(&app, &format!("/api/v1/titles/{title_id}"), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["name"], "The Long Quiet");
    assert_eq!(body["year"], 1999);
    assert_eq!(body["rating"], Value::Null);
    assert_eq!(body["category"]["slug"], "films");
    assert_eq!(body["genre"][0]["slug"], "drama");
}

#[actix_web::test]
async fn titles_referencing_unknown_slugs_are_rejected() {
    let harness = Harness::new();
    let app = harness.app().await;

    let admin = admin_token(&harness, &app).await;
    let response = post(
        &app,
        "/api/v1/titles",
        Some(&admin),
        json!({ "name": "Orphan", "year": 2001, "category": "missing" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn duplicate_slugs_read_as_validation_failures() {
    let harness = Harness::new();
    let app = harness.app().await;

    let admin = admin_token(&harness, &app).await;
    for expected in [StatusCode::OK, StatusCode::BAD_REQUEST] {
        let response = post(
            &app,
            "/api/v1/genres",
            Some(&admin),
            json!({ "name": "Drama", "slug": "drama" }),
        )
        .await;
        assert_eq!(response.status(), expected);
    }
}

#[actix_web::test]
async fn ratings_are_the_rounded_mean_of_review_scores() {
    let harness = Harness::new();
    let app = harness.app().await;

    let admin = admin_token(&harness, &app).await;
    let title_id = seed_title(&app, &admin).await;
    let reviews_path = format!("/api/v1/titles/{title_id}/reviews");

    let alice = authenticate(&harness, &app, "alice", "alice@example.com").await;
    let bob = authenticate(&harness, &app, "bob", "bob@example.com").await;

    let response = post(
        &app,
        &reviews_path,
        Some(&alice),
        json!({ "text": "quietly devastating", "score": 5 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = post(
        &app,
        &reviews_path,
        Some(&bob),
        json!({ "text": "slow but rewarding", "score": 4 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    // Mean of 5 and 4 is 4.5, which rounds up.
    let response = get(&app, &format!("/api/v1/titles/{title_id}"), None).await;
    let body = json_body(response).await;
    assert_eq!(body["rating"], 5);
}

#[actix_web::test]
async fn a_second_review_from_the_same_author_is_rejected() {
    let harness = Harness::new();
    let app = harness.app().await;

    let admin = admin_token(&harness, &app).await;
    let title_id = seed_title(&app, &admin).await;
    let reviews_path = format!("/api/v1/titles/{title_id}/reviews");

    let alice = authenticate(&harness, &app, "alice", "alice@example.com").await;
    for expected in [StatusCode::OK, StatusCode::BAD_REQUEST] {
        let response = post(
            &app,
            &reviews_path,
            Some(&alice),
            json!({ "text": "first impressions", "score": 7 }),
        )
        .await;
        assert_eq!(response.status(), expected);
    }
}

#[actix_web::test]
async fn moderators_and_admins_may_edit_other_authors_reviews() {
    let harness = Harness::new();
    let app = harness.app().await;

    let admin = admin_token(&harness, &app).await;
    let title_id = seed_title(&app, &admin).await;
    let reviews_path = format!("/api/v1/titles/{title_id}/reviews");

    let alice = authenticate(&harness, &app, "alice", "alice@example.com").await;
    let bob = authenticate(&harness, &app, "bob", "bob@example.com").await;

    let response = post(
        &app,
        &reviews_path,
        Some(&alice),
        json!({ "text": "mine", "score": 6 }),
    )
    .await;
    let review = json_body(response).await;
    let review_path = format!("{reviews_path}/{}", review["id"].as_str().expect("id"));

    let response = patch(&app, &review_path, Some(&bob), json!({ "score": 1 })).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // Promote bob to moderator, then the same edit passes.
    let response = patch(
        &app,
        "/api/v1/users/bob",
        Some(&admin),
        json!({ "role": "moderator" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    // The identity extractor reloads the account per request, so the
    // promotion takes effect on bob's existing token.
    let response = patch(&app, &review_path, Some(&bob), json!({ "score": 1 })).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["score"], 1);
    assert_eq!(body["author"], "alice");
}

#[actix_web::test]
async fn deleting_a_review_cascades_to_its_comments() {
    let harness = Harness::new();
    let app = harness.app().await;

    let admin = admin_token(&harness, &app).await;
    let title_id = seed_title(&app, &admin).await;
    let reviews_path = format!("/api/v1/titles/{title_id}/reviews");

    let alice = authenticate(&harness, &app, "alice", "alice@example.com").await;
    let response = post(
        &app,
        &reviews_path,
        Some(&alice),
        json!({ "text": "worth discussing", "score": 8 }),
    )
    .await;
    let review = json_body(response).await;
    let review_path = format!("{reviews_path}/{}", review["id"].as_str().expect("id"));
    let comments_path = format!("{review_path}/comments");

    let response = post(
        &app,
        &comments_path,
        Some(&alice),
        json!({ "text": "replying to myself" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let comment = json_body(response).await;
    let comment_path = format!("{comments_path}/{}", comment["id"].as_str().expect("id"));

    let response = delete(&app, &review_path, Some(&alice)).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = get(&app, &comment_path, None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn missing_parents_read_as_not_found_for_authenticated_writers() {
    let harness = Harness::new();
    let app = harness.app().await;

    let alice = authenticate(&harness, &app, "alice", "alice@example.com").await;
    let orphan = format!("/api/v1/titles/{}/reviews", uuid::Uuid::new_v4());

    let response = post(
        &app,
        &orphan,
        Some(&alice),
        json!({ "text": "into the void", "score": 3 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = get(&app, &orphan, None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // The missing parent outranks bad page parameters.
    let unpageable = format!("{orphan}?page=0");
    let response = get(&app, &unpageable, None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn reviews_are_only_reachable_under_their_own_title() {
    let harness = Harness::new();
    let app = harness.app().await;

    let admin = admin_token(&harness, &app).await;
    let first = seed_title(&app, &admin).await;
    let response = post(
        &app,
        "/api/v1/titles",
        Some(&admin),
        json!({ "name": "Second Feature", "year": 2005, "category": "films" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let second = json_body(response).await["id"]
        .as_str()
        .expect("title id")
        .to_owned();

    let alice = authenticate(&harness, &app, "alice", "alice@example.com").await;
    let response = post(
        &app,
        &format!("/api/v1/titles/{first}/reviews"),
        Some(&alice),
        json!({ "text": "on the first", "score": 9 }),
    )
    .await;
    let review_id = json_body(response).await["id"]
        .as_str()
        .expect("review id")
        .to_owned();

    let response = get(
        &app,
        &format!("/api/v1/titles/{second}/reviews/{review_id}"),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn deleting_a_category_leaves_titles_with_a_null_category() {
    let harness = Harness::new();
    let app = harness.app().await;

    let admin = admin_token(&harness, &app).await;
    let title_id = seed_title(&app, &admin).await;

    let response = delete(&app, "/api/v1/categories/films", Some(&admin)).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = get(&app, &format!("/api/v1/titles/{title_id}"), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["category"], Value::Null);
}

#[actix_web::test]
async fn user_administration_is_admin_only() {
    let harness = Harness::new();
    let app = harness.app().await;

    let alice = authenticate(&harness, &app, "alice", "alice@example.com").await;
    let response = get(&app, "/api/v1/users", Some(&alice)).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let admin = admin_token(&harness, &app).await;
    let response = get(&app, "/api/v1/users?search=ali", Some(&admin)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["count"], 1);
    assert_eq!(body["results"][0]["username"], "alice");
}

#[actix_web::test]
async fn self_service_updates_cannot_change_role() {
    let harness = Harness::new();
    let app = harness.app().await;

    let alice = authenticate(&harness, &app, "alice", "alice@example.com").await;
    let response = patch(
        &app,
        "/api/v1/users/me",
        Some(&alice),
        json!({ "role": "admin", "first_name": "Alice" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["role"], "user");
    assert_eq!(body["first_name"], "Alice");
}

#[actix_web::test]
async fn title_listings_paginate_and_filter() {
    let harness = Harness::new();
    let app = harness.app().await;

    let admin = admin_token(&harness, &app).await;
    seed_title(&app, &admin).await;
    let response = post(
        &app,
        "/api/v1/titles",
        Some(&admin),
        json!({ "name": "Second Feature", "year": 2005, "category": "films" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = get(&app, "/api/v1/titles?year=2005", None).await;
    let body = json_body(response).await;
    assert_eq!(body["count"], 1);
    assert_eq!(body["results"][0]["name"], "Second Feature");

    let response = get(&app, "/api/v1/titles?genre=drama", None).await;
    let body = json_body(response).await;
    assert_eq!(body["count"], 1);
    assert_eq!(body["results"][0]["name"], "The Long Quiet");

    let response = get(&app, "/api/v1/titles?page=2&page_size=1", None).await;
    let body = json_body(response).await;
    assert_eq!(body["count"], 2);
    assert_eq!(
        body["results"].as_array().map(Vec::len),
        Some(1),
        "second page should hold the remaining title"
    );
    assert_eq!(body["previous"], 1);
    assert_eq!(body["next"], Value::Null);
}
