use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};
use uuid::Uuid;

use crate::{
    dto::ratings::{
        RatingOutcome, StoreRatingList, SubmitRatingRequest, SubmitRatingResponse, UserRatingList,
    },
    error::AppResult,
    extract::{ApiPath, ValidatedJson},
    middleware::auth::AuthUser,
    response::ApiResponse,
    services::rating_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(submit_rating))
        .route("/store/{store_id}", get(store_ratings))
        .route("/user", get(user_ratings))
}

#[utoipa::path(
    post,
    path = "/api/ratings",
    request_body = SubmitRatingRequest,
    responses(
        (status = 201, description = "Rating created", body = ApiResponse<SubmitRatingResponse>),
        (status = 200, description = "Existing rating updated", body = ApiResponse<SubmitRatingResponse>),
        (status = 400, description = "Rating outside 1..=5"),
        (status = 403, description = "Only normal users can rate"),
        (status = 404, description = "Store not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Ratings"
)]
pub async fn submit_rating(
    State(state): State<AppState>,
    user: AuthUser,
    ValidatedJson(payload): ValidatedJson<SubmitRatingRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<SubmitRatingResponse>>)> {
    let resp = rating_service::submit_rating(&state, &user, payload).await?;
    let status = match resp.data.as_ref().map(|d| d.outcome) {
        Some(RatingOutcome::Created) => StatusCode::CREATED,
        _ => StatusCode::OK,
    };
    Ok((status, Json(resp)))
}

#[utoipa::path(
    get,
    path = "/api/ratings/store/{store_id}",
    params(
        ("store_id" = Uuid, Path, description = "Store ID")
    ),
    responses(
        (status = 200, description = "Ratings on the store, newest first", body = ApiResponse<StoreRatingList>),
        (status = 404, description = "Store not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Ratings"
)]
pub async fn store_ratings(
    State(state): State<AppState>,
    user: AuthUser,
    ApiPath(store_id): ApiPath<Uuid>,
) -> AppResult<Json<ApiResponse<StoreRatingList>>> {
    let resp = rating_service::store_rating_detail(&state, &user, store_id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/ratings/user",
    responses(
        (status = 200, description = "The caller's ratings, most recently updated first", body = ApiResponse<UserRatingList>),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer_auth" = [])),
    tag = "Ratings"
)]
pub async fn user_ratings(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<UserRatingList>>> {
    let resp = rating_service::user_rating_history(&state, &user).await?;
    Ok(Json(resp))
}
