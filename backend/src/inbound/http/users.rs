//! User administration HTTP handlers.
//!
//! ```text
//! GET    /api/v1/users             List accounts (admin)
//! POST   /api/v1/users             Create an account (admin)
//! GET    /api/v1/users/{username}  Retrieve an account (admin)
//! PATCH  /api/v1/users/{username}  Update an account (admin)
//! DELETE /api/v1/users/{username}  Delete an account (admin)
//! GET    /api/v1/users/me          Own profile
//! PATCH  /api/v1/users/me          Update own profile (role read-only)
//! ```

use actix_web::{HttpResponse, delete, get, patch, post, web};
use pagination::{Page, PageParams};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::Error;
use crate::domain::access;
use crate::domain::ports::UserRepositoryError;
use crate::domain::user::{
    EmailAddress, PersonName, Role, User, UserUpdate, Username,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::identity::{Identity, ensure};
use crate::inbound::http::state::HttpState;

/// Account representation returned by every user endpoint.
#[derive(Debug, Serialize, ToSchema)]
pub struct UserResponse {
    /// Unique account name.
    #[schema(value_type = String)]
    pub username: Username,
    /// Registered email address.
    #[schema(value_type = String)]
    pub email: EmailAddress,
    /// Optional first name.
    #[schema(value_type = Option<String>)]
    pub first_name: Option<PersonName>,
    /// Optional last name.
    #[schema(value_type = Option<String>)]
    pub last_name: Option<PersonName>,
    /// Optional free-text bio.
    pub bio: Option<String>,
    /// Assigned role.
    #[schema(value_type = String, example = "user")]
    pub role: Role,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            username: user.username().clone(),
            email: user.email().clone(),
            first_name: user.first_name().cloned(),
            last_name: user.last_name().cloned(),
            bio: user.bio().map(str::to_owned),
            role: user.role(),
        }
    }
}

/// Admin payload for creating an account directly.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateUserRequest {
    /// Unique account name.
    #[schema(value_type = String)]
    pub username: Username,
    /// Registered email address.
    #[schema(value_type = String)]
    pub email: EmailAddress,
    /// Optional first name.
    #[schema(value_type = Option<String>)]
    pub first_name: Option<PersonName>,
    /// Optional last name.
    #[schema(value_type = Option<String>)]
    pub last_name: Option<PersonName>,
    /// Optional free-text bio.
    pub bio: Option<String>,
    /// Role; defaults to `user`.
    #[schema(value_type = Option<String>)]
    pub role: Option<Role>,
}

/// Partial update payload; absent fields keep their value.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateUserRequest {
    /// Replacement account name.
    #[schema(value_type = Option<String>)]
    pub username: Option<Username>,
    /// Replacement email address.
    #[schema(value_type = Option<String>)]
    pub email: Option<EmailAddress>,
    /// Replacement first name.
    #[schema(value_type = Option<String>)]
    pub first_name: Option<PersonName>,
    /// Replacement last name.
    #[schema(value_type = Option<String>)]
    pub last_name: Option<PersonName>,
    /// Replacement bio.
    pub bio: Option<String>,
    /// Replacement role; ignored on the `me` endpoint.
    #[schema(value_type = Option<String>)]
    pub role: Option<Role>,
}

impl UpdateUserRequest {
    fn into_update(self, allow_role: bool) -> UserUpdate {
        UserUpdate {
            username: self.username,
            email: self.email,
            first_name: self.first_name,
            last_name: self.last_name,
            bio: self.bio,
            role: if allow_role { self.role } else { None },
        }
    }
}

/// Query parameters for the account listing.
#[derive(Debug, Default, Deserialize)]
pub struct ListUsersQuery {
    /// Username substring filter.
    pub search: Option<String>,
    /// 1-based page number.
    pub page: Option<u32>,
    /// Page size, capped server-side.
    pub page_size: Option<u32>,
}

fn map_repository_error(error: UserRepositoryError) -> Error {
    match error {
        UserRepositoryError::UsernameTaken => Error::conflict("username already in use"),
        UserRepositoryError::EmailTaken => Error::conflict("email already in use"),
        UserRepositoryError::Backend { message } => {
            Error::internal(format!("user repository error: {message}"))
        }
    }
}

fn map_page_error(error: pagination::PageParamsError) -> Error {
    Error::invalid_request(error.to_string())
}

// Unknown and syntactically invalid usernames are indistinguishable to
// the caller.
fn parse_username(raw: &str) -> Result<Username, Error> {
    Username::new(raw).map_err(|_| Error::not_found("user not found"))
}

async fn load_user(state: &HttpState, username: &Username) -> Result<User, Error> {
    state
        .users
        .find_by_username(username)
        .await
        .map_err(map_repository_error)?
        .ok_or_else(|| Error::not_found("user not found"))
}

/// List accounts.
#[utoipa::path(
    get,
    path = "/api/v1/users",
    params(
        ("search" = Option<String>, Query, description = "Username substring filter"),
        ("page" = Option<u32>, Query, description = "1-based page number"),
        ("page_size" = Option<u32>, Query, description = "Page size")
    ),
    responses(
        (status = 200, description = "Paginated accounts"),
        (status = 401, description = "Not authenticated", body = Error),
        (status = 403, description = "Not an admin", body = Error)
    ),
    tags = ["users"],
    operation_id = "listUsers"
)]
#[get("/users")]
pub async fn list(
    state: web::Data<HttpState>,
    identity: Identity,
    query: web::Query<ListUsersQuery>,
) -> ApiResult<web::Json<Page<UserResponse>>> {
    ensure(identity.actor(), access::user_admin(identity.actor()))?;
    let window = PageParams {
        page: query.page,
        page_size: query.page_size,
    }
    .resolve()
    .map_err(map_page_error)?;

    let users = state
        .users
        .list(query.search.as_deref())
        .await
        .map_err(map_repository_error)?;
    let results: Vec<UserResponse> = users.iter().map(UserResponse::from).collect();
    Ok(web::Json(Page::paginate(results, window)))
}

/// Create an account with an explicit role.
#[utoipa::path(
    post,
    path = "/api/v1/users",
    request_body = CreateUserRequest,
    responses(
        (status = 200, description = "Account created", body = UserResponse),
        (status = 400, description = "Invalid or conflicting payload", body = Error),
        (status = 401, description = "Not authenticated", body = Error),
        (status = 403, description = "Not an admin", body = Error)
    ),
    tags = ["users"],
    operation_id = "createUser"
)]
#[post("/users")]
pub async fn create(
    state: web::Data<HttpState>,
    identity: Identity,
    payload: web::Json<CreateUserRequest>,
) -> ApiResult<web::Json<UserResponse>> {
    ensure(identity.actor(), access::user_admin(identity.actor()))?;
    let CreateUserRequest {
        username,
        email,
        first_name,
        last_name,
        bio,
        role,
    } = payload.into_inner();

    let mut user = User::with_role(username, email, role.unwrap_or_default());
    user.apply_update(UserUpdate {
        first_name,
        last_name,
        bio,
        ..UserUpdate::default()
    });
    state.users.insert(&user).await.map_err(map_repository_error)?;
    Ok(web::Json(UserResponse::from(&user)))
}

/// Own profile.
#[utoipa::path(
    get,
    path = "/api/v1/users/me",
    responses(
        (status = 200, description = "Own account", body = UserResponse),
        (status = 401, description = "Not authenticated", body = Error)
    ),
    tags = ["users"],
    operation_id = "getOwnProfile"
)]
#[get("/users/me")]
pub async fn me_detail(identity: Identity) -> ApiResult<web::Json<UserResponse>> {
    let user = identity.require_user()?;
    Ok(web::Json(UserResponse::from(user)))
}

/// Update own profile. A `role` field in the payload is ignored.
#[utoipa::path(
    patch,
    path = "/api/v1/users/me",
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "Updated account", body = UserResponse),
        (status = 400, description = "Invalid or conflicting payload", body = Error),
        (status = 401, description = "Not authenticated", body = Error)
    ),
    tags = ["users"],
    operation_id = "updateOwnProfile"
)]
#[patch("/users/me")]
pub async fn me_update(
    state: web::Data<HttpState>,
    identity: Identity,
    payload: web::Json<UpdateUserRequest>,
) -> ApiResult<web::Json<UserResponse>> {
    let mut user = identity.require_user()?.clone();
    user.apply_update(payload.into_inner().into_update(false));
    state.users.update(&user).await.map_err(map_repository_error)?;
    Ok(web::Json(UserResponse::from(&user)))
}

/// Retrieve an account by username.
#[utoipa::path(
    get,
    path = "/api/v1/users/{username}",
    params(("username" = String, Path, description = "Account name")),
    responses(
        (status = 200, description = "Account", body = UserResponse),
        (status = 401, description = "Not authenticated", body = Error),
        (status = 403, description = "Not an admin", body = Error),
        (status = 404, description = "No such account", body = Error)
    ),
    tags = ["users"],
    operation_id = "getUser"
)]
#[get("/users/{username}")]
pub async fn detail(
    state: web::Data<HttpState>,
    identity: Identity,
    path: web::Path<String>,
) -> ApiResult<web::Json<UserResponse>> {
    ensure(identity.actor(), access::user_admin(identity.actor()))?;
    let username = parse_username(&path)?;
    let user = load_user(&state, &username).await?;
    Ok(web::Json(UserResponse::from(&user)))
}

/// Update an account by username.
#[utoipa::path(
    patch,
    path = "/api/v1/users/{username}",
    params(("username" = String, Path, description = "Account name")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "Updated account", body = UserResponse),
        (status = 400, description = "Invalid or conflicting payload", body = Error),
        (status = 401, description = "Not authenticated", body = Error),
        (status = 403, description = "Not an admin", body = Error),
        (status = 404, description = "No such account", body = Error)
    ),
    tags = ["users"],
    operation_id = "updateUser"
)]
#[patch("/users/{username}")]
pub async fn update(
    state: web::Data<HttpState>,
    identity: Identity,
    path: web::Path<String>,
    payload: web::Json<UpdateUserRequest>,
) -> ApiResult<web::Json<UserResponse>> {
    ensure(identity.actor(), access::user_admin(identity.actor()))?;
    let username = parse_username(&path)?;
    let mut user = load_user(&state, &username).await?;
    user.apply_update(payload.into_inner().into_update(true));
    state.users.update(&user).await.map_err(map_repository_error)?;
    Ok(web::Json(UserResponse::from(&user)))
}

/// Delete an account by username.
#[utoipa::path(
    delete,
    path = "/api/v1/users/{username}",
    params(("username" = String, Path, description = "Account name")),
    responses(
        (status = 204, description = "Account deleted"),
        (status = 401, description = "Not authenticated", body = Error),
        (status = 403, description = "Not an admin", body = Error),
        (status = 404, description = "No such account", body = Error)
    ),
    tags = ["users"],
    operation_id = "deleteUser"
)]
#[delete("/users/{username}")]
pub async fn remove(
    state: web::Data<HttpState>,
    identity: Identity,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    ensure(identity.actor(), access::user_admin(identity.actor()))?;
    let username = parse_username(&path)?;
    let user = load_user(&state, &username).await?;
    state
        .users
        .delete(user.id())
        .await
        .map_err(map_repository_error)?;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn fixture_user() -> User {
        let mut user = User::with_role(
            Username::new("alice").expect("valid username"),
            EmailAddress::new("alice@example.com").expect("valid email"),
            Role::Moderator,
        );
        user.apply_update(UserUpdate {
            bio: Some("reads a lot".to_owned()),
            ..UserUpdate::default()
        });
        user
    }

    #[rstest]
    fn response_serialises_the_public_fields() {
        let value =
            serde_json::to_value(UserResponse::from(&fixture_user())).expect("serialise");
        assert_eq!(value["username"], "alice");
        assert_eq!(value["email"], "alice@example.com");
        assert_eq!(value["bio"], "reads a lot");
        assert_eq!(value["role"], "moderator");
        assert_eq!(value["first_name"], serde_json::Value::Null);
    }

    #[rstest]
    #[case(true, Some(Role::Admin))]
    #[case(false, None)]
    fn role_changes_require_the_admin_path(
        #[case] allow_role: bool,
        #[case] expected: Option<Role>,
    ) {
        let request = UpdateUserRequest {
            role: Some(Role::Admin),
            ..UpdateUserRequest::default()
        };
        assert_eq!(request.into_update(allow_role).role, expected);
    }

    #[rstest]
    fn well_formed_path_usernames_parse() {
        parse_username("ghost").expect("well-formed username parses");
    }

    #[rstest]
    #[case("no spaces allowed")]
    #[case("me")]
    fn bad_path_usernames_read_as_not_found(#[case] raw: &str) {
        let error = parse_username(raw).expect_err("rejected");
        assert_eq!(error.code(), crate::domain::ErrorCode::NotFound);
    }
}
