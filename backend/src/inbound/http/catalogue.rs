//! Catalogue HTTP handlers.
//!
//! ```text
//! GET    /api/v1/categories         List categories
//! POST   /api/v1/categories         Create a category (admin)
//! DELETE /api/v1/categories/{slug}  Delete a category (admin)
//! GET    /api/v1/genres             List genres
//! POST   /api/v1/genres             Create a genre (admin)
//! DELETE /api/v1/genres/{slug}      Delete a genre (admin)
//! GET    /api/v1/titles             List titles with filters
//! POST   /api/v1/titles             Create a title (admin)
//! GET    /api/v1/titles/{id}        Retrieve a title
//! PATCH  /api/v1/titles/{id}        Update a title (admin)
//! DELETE /api/v1/titles/{id}        Delete a title and its reviews (admin)
//! ```

use actix_web::{HttpResponse, delete, get, patch, post, web};
use pagination::{Page, PageParams};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::Error;
use crate::domain::access::{self, AccessKind};
use crate::domain::catalogue::{
    CatalogueName, Category, Genre, Slug, Title, TitleId, TitleYear,
};
use crate::domain::ports::{CatalogueRepositoryError, ReviewRepositoryError, TitleFilter};
use crate::inbound::http::ApiResult;
use crate::inbound::http::identity::{Identity, ensure};
use crate::inbound::http::state::HttpState;

/// Category over the wire; the same shape serves requests and responses.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CategoryDto {
    /// Display name.
    #[schema(value_type = String, example = "Films")]
    pub name: CatalogueName,
    /// Unique lookup key.
    #[schema(value_type = String, example = "films")]
    pub slug: Slug,
}

impl From<&Category> for CategoryDto {
    fn from(category: &Category) -> Self {
        Self {
            name: category.name.clone(),
            slug: category.slug.clone(),
        }
    }
}

impl From<CategoryDto> for Category {
    fn from(dto: CategoryDto) -> Self {
        Self {
            name: dto.name,
            slug: dto.slug,
        }
    }
}

/// Genre over the wire.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct GenreDto {
    /// Display name.
    #[schema(value_type = String, example = "Science fiction")]
    pub name: CatalogueName,
    /// Unique lookup key.
    #[schema(value_type = String, example = "scifi")]
    pub slug: Slug,
}

impl From<&Genre> for GenreDto {
    fn from(genre: &Genre) -> Self {
        Self {
            name: genre.name.clone(),
            slug: genre.slug.clone(),
        }
    }
}

impl From<GenreDto> for Genre {
    fn from(dto: GenreDto) -> Self {
        Self {
            name: dto.name,
            slug: dto.slug,
        }
    }
}

/// Title representation returned by every title endpoint.
#[derive(Debug, Serialize, ToSchema)]
pub struct TitleResponse {
    /// Stable identifier.
    #[schema(value_type = String)]
    pub id: TitleId,
    /// Display name.
    #[schema(value_type = String)]
    pub name: CatalogueName,
    /// Release year.
    #[schema(value_type = i32)]
    pub year: TitleYear,
    /// Rounded mean review score, absent until the first review lands.
    pub rating: Option<u8>,
    /// Optional synopsis.
    pub description: Option<String>,
    /// Owning category; null when the category was since deleted.
    pub category: Option<CategoryDto>,
    /// Genres still present in the catalogue.
    pub genre: Vec<GenreDto>,
}

/// Payload for creating a title.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateTitleRequest {
    /// Display name.
    #[schema(value_type = String)]
    pub name: CatalogueName,
    /// Release year; must not lie in the future.
    #[schema(value_type = i32)]
    pub year: TitleYear,
    /// Optional synopsis.
    pub description: Option<String>,
    /// Slug of an existing category.
    #[schema(value_type = String)]
    pub category: Slug,
    /// Slugs of existing genres.
    #[serde(default)]
    #[schema(value_type = Vec<String>)]
    pub genre: Vec<Slug>,
}

/// Partial update payload for a title; absent fields keep their value.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateTitleRequest {
    /// Replacement display name.
    #[schema(value_type = Option<String>)]
    pub name: Option<CatalogueName>,
    /// Replacement release year.
    #[schema(value_type = Option<i32>)]
    pub year: Option<TitleYear>,
    /// Replacement synopsis.
    pub description: Option<String>,
    /// Replacement category slug.
    #[schema(value_type = Option<String>)]
    pub category: Option<Slug>,
    /// Replacement genre slugs.
    #[schema(value_type = Option<Vec<String>>)]
    pub genre: Option<Vec<Slug>>,
}

/// Query parameters shared by the category and genre listings.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    /// Name substring filter.
    pub search: Option<String>,
    /// 1-based page number.
    pub page: Option<u32>,
    /// Page size, capped server-side.
    pub page_size: Option<u32>,
}

/// Query parameters for the title listing.
#[derive(Debug, Default, Deserialize)]
pub struct TitleListQuery {
    /// Exact category slug.
    pub category: Option<Slug>,
    /// Slug of a genre the title must carry.
    pub genre: Option<Slug>,
    /// Case-insensitive name substring.
    pub name: Option<String>,
    /// Exact release year.
    pub year: Option<i32>,
    /// 1-based page number.
    pub page: Option<u32>,
    /// Page size, capped server-side.
    pub page_size: Option<u32>,
}

fn map_catalogue_error(error: CatalogueRepositoryError) -> Error {
    match error {
        CatalogueRepositoryError::SlugTaken => Error::conflict("slug already in use"),
        CatalogueRepositoryError::Backend { message } => {
            Error::internal(format!("catalogue repository error: {message}"))
        }
    }
}

fn map_review_error(error: ReviewRepositoryError) -> Error {
    Error::internal(format!("review repository error: {error}"))
}

fn map_page_error(error: pagination::PageParamsError) -> Error {
    Error::invalid_request(error.to_string())
}

fn resolve_window(page: Option<u32>, page_size: Option<u32>) -> Result<pagination::ResolvedPage, Error> {
    PageParams { page, page_size }.resolve().map_err(map_page_error)
}

// Unknown and syntactically invalid slugs are indistinguishable to the
// caller.
fn parse_slug(raw: &str, kind: &str) -> Result<Slug, Error> {
    Slug::new(raw).map_err(|_| Error::not_found(format!("{kind} not found")))
}

fn parse_title_id(raw: &str) -> Result<TitleId, Error> {
    raw.parse::<TitleId>()
        .map_err(|_| Error::not_found("title not found"))
}

async fn load_title(state: &HttpState, id: TitleId) -> Result<Title, Error> {
    state
        .catalogue
        .find_title(id)
        .await
        .map_err(map_catalogue_error)?
        .ok_or_else(|| Error::not_found("title not found"))
}

async fn rating_for(state: &HttpState, id: TitleId) -> Result<Option<u8>, Error> {
    let reviews = state.reviews.list_reviews(id).await.map_err(map_review_error)?;
    if reviews.is_empty() {
        return Ok(None);
    }
    let sum: usize = reviews.iter().map(|review| review.score.get() as usize).sum();
    let count = reviews.len();
    // Rounded integer mean; scores cap at 10 so this always fits a u8.
    Ok(Some(((sum + count / 2) / count) as u8))
}

async fn render_title(state: &HttpState, title: &Title) -> Result<TitleResponse, Error> {
    let category = state
        .catalogue
        .find_category(&title.category)
        .await
        .map_err(map_catalogue_error)?
        .as_ref()
        .map(CategoryDto::from);
    let mut genres = Vec::with_capacity(title.genres.len());
    for slug in &title.genres {
        if let Some(genre) = state
            .catalogue
            .find_genre(slug)
            .await
            .map_err(map_catalogue_error)?
        {
            genres.push(GenreDto::from(&genre));
        }
    }
    Ok(TitleResponse {
        id: title.id,
        name: title.name.clone(),
        year: title.year,
        rating: rating_for(state, title.id).await?,
        description: title.description.clone(),
        category,
        genre: genres,
    })
}

async fn check_slugs_exist(
    state: &HttpState,
    category: &Slug,
    genres: &[Slug],
) -> Result<(), Error> {
    if state
        .catalogue
        .find_category(category)
        .await
        .map_err(map_catalogue_error)?
        .is_none()
    {
        return Err(Error::invalid_request(format!(
            "unknown category: {category}"
        )));
    }
    for slug in genres {
        if state
            .catalogue
            .find_genre(slug)
            .await
            .map_err(map_catalogue_error)?
            .is_none()
        {
            return Err(Error::invalid_request(format!("unknown genre: {slug}")));
        }
    }
    Ok(())
}

/// List categories.
#[utoipa::path(
    get,
    path = "/api/v1/categories",
    params(
        ("search" = Option<String>, Query, description = "Name substring filter"),
        ("page" = Option<u32>, Query, description = "1-based page number"),
        ("page_size" = Option<u32>, Query, description = "Page size")
    ),
    responses((status = 200, description = "Paginated categories")),
    tags = ["catalogue"],
    operation_id = "listCategories"
)]
#[get("/categories")]
pub async fn category_list(
    state: web::Data<HttpState>,
    query: web::Query<ListQuery>,
) -> ApiResult<web::Json<Page<CategoryDto>>> {
    let window = resolve_window(query.page, query.page_size)?;
    let categories = state
        .catalogue
        .list_categories(query.search.as_deref())
        .await
        .map_err(map_catalogue_error)?;
    let results: Vec<CategoryDto> = categories.iter().map(CategoryDto::from).collect();
    Ok(web::Json(Page::paginate(results, window)))
}

/// Create a category.
#[utoipa::path(
    post,
    path = "/api/v1/categories",
    request_body = CategoryDto,
    responses(
        (status = 200, description = "Category created", body = CategoryDto),
        (status = 400, description = "Invalid or duplicate slug", body = Error),
        (status = 401, description = "Not authenticated", body = Error),
        (status = 403, description = "Not an admin", body = Error)
    ),
    tags = ["catalogue"],
    operation_id = "createCategory"
)]
#[post("/categories")]
pub async fn category_create(
    state: web::Data<HttpState>,
    identity: Identity,
    payload: web::Json<CategoryDto>,
) -> ApiResult<web::Json<CategoryDto>> {
    ensure(
        identity.actor(),
        access::catalogue_collection(identity.actor(), AccessKind::Write),
    )?;
    let category = Category::from(payload.into_inner());
    state
        .catalogue
        .insert_category(&category)
        .await
        .map_err(map_catalogue_error)?;
    Ok(web::Json(CategoryDto::from(&category)))
}

/// Delete a category. Titles keep running; their category renders null.
#[utoipa::path(
    delete,
    path = "/api/v1/categories/{slug}",
    params(("slug" = String, Path, description = "Category slug")),
    responses(
        (status = 204, description = "Category deleted"),
        (status = 401, description = "Not authenticated", body = Error),
        (status = 403, description = "Not an admin", body = Error),
        (status = 404, description = "No such category", body = Error)
    ),
    tags = ["catalogue"],
    operation_id = "deleteCategory"
)]
#[delete("/categories/{slug}")]
pub async fn category_delete(
    state: web::Data<HttpState>,
    identity: Identity,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    ensure(
        identity.actor(),
        access::catalogue_object(identity.actor(), AccessKind::Write),
    )?;
    let slug = parse_slug(&path, "category")?;
    if !state
        .catalogue
        .delete_category(&slug)
        .await
        .map_err(map_catalogue_error)?
    {
        return Err(Error::not_found("category not found"));
    }
    Ok(HttpResponse::NoContent().finish())
}

/// List genres.
#[utoipa::path(
    get,
    path = "/api/v1/genres",
    params(
        ("search" = Option<String>, Query, description = "Name substring filter"),
        ("page" = Option<u32>, Query, description = "1-based page number"),
        ("page_size" = Option<u32>, Query, description = "Page size")
    ),
    responses((status = 200, description = "Paginated genres")),
    tags = ["catalogue"],
    operation_id = "listGenres"
)]
#[get("/genres")]
pub async fn genre_list(
    state: web::Data<HttpState>,
    query: web::Query<ListQuery>,
) -> ApiResult<web::Json<Page<GenreDto>>> {
    let window = resolve_window(query.page, query.page_size)?;
    let genres = state
        .catalogue
        .list_genres(query.search.as_deref())
        .await
        .map_err(map_catalogue_error)?;
    let results: Vec<GenreDto> = genres.iter().map(GenreDto::from).collect();
    Ok(web::Json(Page::paginate(results, window)))
}

/// Create a genre.
#[utoipa::path(
    post,
    path = "/api/v1/genres",
    request_body = GenreDto,
    responses(
        (status = 200, description = "Genre created", body = GenreDto),
        (status = 400, description = "Invalid or duplicate slug", body = Error),
        (status = 401, description = "Not authenticated", body = Error),
        (status = 403, description = "Not an admin", body = Error)
    ),
    tags = ["catalogue"],
    operation_id = "createGenre"
)]
#[post("/genres")]
pub async fn genre_create(
    state: web::Data<HttpState>,
    identity: Identity,
    payload: web::Json<GenreDto>,
) -> ApiResult<web::Json<GenreDto>> {
    ensure(
        identity.actor(),
        access::catalogue_collection(identity.actor(), AccessKind::Write),
    )?;
    let genre = Genre::from(payload.into_inner());
    state
        .catalogue
        .insert_genre(&genre)
        .await
        .map_err(map_catalogue_error)?;
    Ok(web::Json(GenreDto::from(&genre)))
}

/// Delete a genre. Titles keep the remaining genre tags.
#[utoipa::path(
    delete,
    path = "/api/v1/genres/{slug}",
    params(("slug" = String, Path, description = "Genre slug")),
    responses(
        (status = 204, description = "Genre deleted"),
        (status = 401, description = "Not authenticated", body = Error),
        (status = 403, description = "Not an admin", body = Error),
        (status = 404, description = "No such genre", body = Error)
    ),
    tags = ["catalogue"],
    operation_id = "deleteGenre"
)]
#[delete("/genres/{slug}")]
pub async fn genre_delete(
    state: web::Data<HttpState>,
    identity: Identity,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    ensure(
        identity.actor(),
        access::catalogue_object(identity.actor(), AccessKind::Write),
    )?;
    let slug = parse_slug(&path, "genre")?;
    if !state
        .catalogue
        .delete_genre(&slug)
        .await
        .map_err(map_catalogue_error)?
    {
        return Err(Error::not_found("genre not found"));
    }
    Ok(HttpResponse::NoContent().finish())
}

/// List titles with optional filters.
#[utoipa::path(
    get,
    path = "/api/v1/titles",
    params(
        ("category" = Option<String>, Query, description = "Exact category slug"),
        ("genre" = Option<String>, Query, description = "Genre slug the title must carry"),
        ("name" = Option<String>, Query, description = "Name substring filter"),
        ("year" = Option<i32>, Query, description = "Exact release year"),
        ("page" = Option<u32>, Query, description = "1-based page number"),
        ("page_size" = Option<u32>, Query, description = "Page size")
    ),
    responses((status = 200, description = "Paginated titles")),
    tags = ["catalogue"],
    operation_id = "listTitles"
)]
#[get("/titles")]
pub async fn title_list(
    state: web::Data<HttpState>,
    query: web::Query<TitleListQuery>,
) -> ApiResult<web::Json<Page<TitleResponse>>> {
    let window = resolve_window(query.page, query.page_size)?;
    let filter = TitleFilter {
        category: query.category.clone(),
        genre: query.genre.clone(),
        name: query.name.clone(),
        year: query.year,
    };
    let titles = state
        .catalogue
        .list_titles(&filter)
        .await
        .map_err(map_catalogue_error)?;
    let mut results = Vec::with_capacity(titles.len());
    for title in &titles {
        results.push(render_title(&state, title).await?);
    }
    Ok(web::Json(Page::paginate(results, window)))
}

/// Create a title.
#[utoipa::path(
    post,
    path = "/api/v1/titles",
    request_body = CreateTitleRequest,
    responses(
        (status = 200, description = "Title created", body = TitleResponse),
        (status = 400, description = "Invalid payload or unknown slug", body = Error),
        (status = 401, description = "Not authenticated", body = Error),
        (status = 403, description = "Not an admin", body = Error)
    ),
    tags = ["catalogue"],
    operation_id = "createTitle"
)]
#[post("/titles")]
pub async fn title_create(
    state: web::Data<HttpState>,
    identity: Identity,
    payload: web::Json<CreateTitleRequest>,
) -> ApiResult<web::Json<TitleResponse>> {
    ensure(
        identity.actor(),
        access::catalogue_collection(identity.actor(), AccessKind::Write),
    )?;
    let CreateTitleRequest {
        name,
        year,
        description,
        category,
        genre,
    } = payload.into_inner();
    check_slugs_exist(&state, &category, &genre).await?;

    let title = Title::new(name, year, description, category, genre);
    state
        .catalogue
        .insert_title(&title)
        .await
        .map_err(map_catalogue_error)?;
    Ok(web::Json(render_title(&state, &title).await?))
}

/// Retrieve a title.
#[utoipa::path(
    get,
    path = "/api/v1/titles/{id}",
    params(("id" = String, Path, description = "Title identifier")),
    responses(
        (status = 200, description = "Title", body = TitleResponse),
        (status = 404, description = "No such title", body = Error)
    ),
    tags = ["catalogue"],
    operation_id = "getTitle"
)]
#[get("/titles/{id}")]
pub async fn title_detail(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<TitleResponse>> {
    let id = parse_title_id(&path)?;
    let title = load_title(&state, id).await?;
    Ok(web::Json(render_title(&state, &title).await?))
}

/// Update a title.
#[utoipa::path(
    patch,
    path = "/api/v1/titles/{id}",
    params(("id" = String, Path, description = "Title identifier")),
    request_body = UpdateTitleRequest,
    responses(
        (status = 200, description = "Updated title", body = TitleResponse),
        (status = 400, description = "Invalid payload or unknown slug", body = Error),
        (status = 401, description = "Not authenticated", body = Error),
        (status = 403, description = "Not an admin", body = Error),
        (status = 404, description = "No such title", body = Error)
    ),
    tags = ["catalogue"],
    operation_id = "updateTitle"
)]
#[patch("/titles/{id}")]
pub async fn title_update(
    state: web::Data<HttpState>,
    identity: Identity,
    path: web::Path<String>,
    payload: web::Json<UpdateTitleRequest>,
) -> ApiResult<web::Json<TitleResponse>> {
    ensure(
        identity.actor(),
        access::catalogue_object(identity.actor(), AccessKind::Write),
    )?;
    let id = parse_title_id(&path)?;
    let mut title = load_title(&state, id).await?;

    let UpdateTitleRequest {
        name,
        year,
        description,
        category,
        genre,
    } = payload.into_inner();
    let category_check = category.as_ref().unwrap_or(&title.category);
    let genre_check = genre.as_deref().unwrap_or(&[]);
    check_slugs_exist(&state, category_check, genre_check).await?;

    if let Some(name) = name {
        title.name = name;
    }
    if let Some(year) = year {
        title.year = year;
    }
    if let Some(description) = description {
        title.description = Some(description);
    }
    if let Some(category) = category {
        title.category = category;
    }
    if let Some(genre) = genre {
        title.genres = genre;
    }
    state
        .catalogue
        .update_title(&title)
        .await
        .map_err(map_catalogue_error)?;
    Ok(web::Json(render_title(&state, &title).await?))
}

/// Delete a title along with its reviews and their comments.
#[utoipa::path(
    delete,
    path = "/api/v1/titles/{id}",
    params(("id" = String, Path, description = "Title identifier")),
    responses(
        (status = 204, description = "Title deleted"),
        (status = 401, description = "Not authenticated", body = Error),
        (status = 403, description = "Not an admin", body = Error),
        (status = 404, description = "No such title", body = Error)
    ),
    tags = ["catalogue"],
    operation_id = "deleteTitle"
)]
#[delete("/titles/{id}")]
pub async fn title_delete(
    state: web::Data<HttpState>,
    identity: Identity,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    ensure(
        identity.actor(),
        access::catalogue_object(identity.actor(), AccessKind::Write),
    )?;
    let id = parse_title_id(&path)?;
    if !state
        .catalogue
        .delete_title(id)
        .await
        .map_err(map_catalogue_error)?
    {
        return Err(Error::not_found("title not found"));
    }
    state
        .reviews
        .delete_reviews_for_title(id)
        .await
        .map_err(map_review_error)?;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn title_id_parsing_maps_garbage_to_not_found() {
        parse_title_id("3fa85f64-5717-4562-b3fc-2c963f66afa6").expect("uuid parses");
        let error = parse_title_id("not-a-uuid").expect_err("rejected");
        assert_eq!(error.code(), crate::domain::ErrorCode::NotFound);
    }

    #[rstest]
    fn slug_parsing_maps_garbage_to_not_found() {
        parse_slug("films", "category").expect("slug parses");
        let error = parse_slug("no spaces", "category").expect_err("rejected");
        assert_eq!(error.code(), crate::domain::ErrorCode::NotFound);
    }
}
