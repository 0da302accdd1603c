use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::get,
};
use uuid::Uuid;

use crate::{
    dto::stores::{CreateStoreRequest, StoreCreated, StoreList},
    error::AppResult,
    extract::{ApiPath, ApiQuery, ValidatedJson},
    middleware::auth::AuthUser,
    models::StoreWithRating,
    response::ApiResponse,
    routes::params::StoreListQuery,
    services::store_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_stores).post(create_store))
        .route("/{id}", get(get_store))
}

#[utoipa::path(
    get,
    path = "/api/stores",
    params(
        ("search" = Option<String>, Query, description = "Substring of name, email or address"),
        ("ownerId" = Option<Uuid>, Query, description = "Only stores owned by this user"),
        ("sortBy" = Option<String>, Query, description = "name, email, address, created_at, average_rating, total_ratings"),
        ("sortOrder" = Option<String>, Query, description = "asc or desc, default asc"),
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("limit" = Option<i64>, Query, description = "Items per page, default 10"),
    ),
    responses(
        (status = 200, description = "Stores with rating stats", body = ApiResponse<StoreList>),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Stores"
)]
pub async fn list_stores(
    State(state): State<AppState>,
    user: AuthUser,
    ApiQuery(query): ApiQuery<StoreListQuery>,
) -> AppResult<Json<ApiResponse<StoreList>>> {
    let resp = store_service::list_stores(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/stores/{id}",
    params(
        ("id" = Uuid, Path, description = "Store ID")
    ),
    responses(
        (status = 200, description = "Store with rating stats", body = ApiResponse<StoreWithRating>),
        (status = 404, description = "Store not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Stores"
)]
pub async fn get_store(
    State(state): State<AppState>,
    user: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> AppResult<Json<ApiResponse<StoreWithRating>>> {
    let resp = store_service::get_store(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/stores",
    request_body = CreateStoreRequest,
    responses(
        (status = 201, description = "Create store", body = ApiResponse<StoreCreated>),
        (status = 400, description = "Validation failed or email taken"),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Stores"
)]
pub async fn create_store(
    State(state): State<AppState>,
    user: AuthUser,
    ValidatedJson(payload): ValidatedJson<CreateStoreRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<StoreCreated>>)> {
    let resp = store_service::create_store(&state, &user, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}
