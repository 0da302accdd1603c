use uuid::Uuid;

use crate::{
    db::DbPool,
    dto::ratings::{
        RatingOutcome, StoreRatingList, SubmitRatingRequest, SubmitRatingResponse, UserRatingList,
    },
    error::{AppError, AppResult, is_foreign_key_violation},
    middleware::auth::{AuthUser, authorize},
    models::{RatingSummary, StoreRatingEntry, UserRatingEntry},
    policy::Operation,
    response::{ApiResponse, Meta, Pagination},
    state::AppState,
};

/// Create the caller's rating for a store, or overwrite the one they already
/// left. One statement does both, so two concurrent first submissions for the
/// same pair end as one insert and one update.
pub async fn submit_rating(
    state: &AppState,
    user: &AuthUser,
    payload: SubmitRatingRequest,
) -> AppResult<ApiResponse<SubmitRatingResponse>> {
    authorize(state, user, Operation::SubmitRating).await?;

    let SubmitRatingRequest { store_id, rating } = payload;
    ensure_store_exists(&state.pool, store_id).await?;

    let (rating_id, inserted): (Uuid, bool) = sqlx::query_as(
        r#"
        INSERT INTO ratings (id, user_id, store_id, rating)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (user_id, store_id)
        DO UPDATE SET rating = EXCLUDED.rating, updated_at = now()
        RETURNING id, (xmax = 0) AS inserted
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user.user_id)
    .bind(store_id)
    .bind(rating)
    .fetch_one(&state.pool)
    .await
    .map_err(|err| {
        // The store was deleted between the existence check and the write.
        if is_foreign_key_violation(&err) {
            AppError::not_found("Store")
        } else {
            AppError::DbError(err)
        }
    })?;

    let outcome = if inserted {
        RatingOutcome::Created
    } else {
        RatingOutcome::Updated
    };
    tracing::info!(user_id = %user.user_id, %store_id, rating, ?outcome, "rating saved");

    let message = match outcome {
        RatingOutcome::Created => "Rating submitted successfully",
        RatingOutcome::Updated => "Rating updated successfully",
    };
    Ok(ApiResponse::success(
        message,
        SubmitRatingResponse {
            outcome,
            rating_id,
            store_id,
            rating,
        },
        Some(Meta::empty()),
    ))
}

pub async fn store_rating_summary(pool: &DbPool, store_id: Uuid) -> AppResult<RatingSummary> {
    let (sum, count): (i64, i64) = sqlx::query_as(
        "SELECT COALESCE(SUM(rating), 0)::BIGINT, COUNT(*) FROM ratings WHERE store_id = $1",
    )
    .bind(store_id)
    .fetch_one(pool)
    .await?;
    Ok(RatingSummary::from_totals(sum, count))
}

/// The store's summary plus the caller's own rating, if any.
pub async fn store_rating_summary_with_caller(
    pool: &DbPool,
    store_id: Uuid,
    caller_id: Uuid,
) -> AppResult<(RatingSummary, Option<i32>)> {
    let (sum, count, user_rating): (i64, i64, Option<i32>) = sqlx::query_as(
        r#"
        SELECT COALESCE(SUM(rating), 0)::BIGINT,
               COUNT(*),
               MAX(rating) FILTER (WHERE user_id = $2)
        FROM ratings
        WHERE store_id = $1
        "#,
    )
    .bind(store_id)
    .bind(caller_id)
    .fetch_one(pool)
    .await?;
    Ok((RatingSummary::from_totals(sum, count), user_rating))
}

pub async fn user_rating_history(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<UserRatingList>> {
    authorize(state, user, Operation::ReadOwnRatings).await?;
    let ratings = sqlx::query_as::<_, UserRatingEntry>(
        r#"
        SELECT r.store_id,
               s.name AS store_name,
               s.address AS store_address,
               r.rating,
               r.created_at,
               r.updated_at
        FROM ratings r
        JOIN stores s ON s.id = r.store_id
        WHERE r.user_id = $1
        ORDER BY r.updated_at DESC, r.id ASC
        "#,
    )
    .bind(user.user_id)
    .fetch_all(&state.pool)
    .await?;

    let pagination = Pagination::single_page(ratings.len() as i64);
    let meta = pagination.meta();
    Ok(ApiResponse::success(
        "Ratings",
        UserRatingList {
            ratings,
            pagination,
        },
        Some(meta),
    ))
}

pub async fn store_rating_detail(
    state: &AppState,
    user: &AuthUser,
    store_id: Uuid,
) -> AppResult<ApiResponse<StoreRatingList>> {
    authorize(state, user, Operation::ReadStoreRatings).await?;
    ensure_store_exists(&state.pool, store_id).await?;

    let ratings = sqlx::query_as::<_, StoreRatingEntry>(
        r#"
        SELECT r.user_id,
               u.name,
               u.email,
               r.rating,
               r.created_at,
               r.updated_at
        FROM ratings r
        JOIN users u ON u.id = r.user_id
        WHERE r.store_id = $1
        ORDER BY r.created_at DESC, r.id ASC
        "#,
    )
    .bind(store_id)
    .fetch_all(&state.pool)
    .await?;

    let pagination = Pagination::single_page(ratings.len() as i64);
    let meta = pagination.meta();
    Ok(ApiResponse::success(
        "Ratings",
        StoreRatingList {
            ratings,
            pagination,
        },
        Some(meta),
    ))
}

async fn ensure_store_exists(pool: &DbPool, store_id: Uuid) -> AppResult<()> {
    let exists: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM stores WHERE id = $1")
        .bind(store_id)
        .fetch_optional(pool)
        .await?;
    if exists.is_none() {
        return Err(AppError::not_found("Store"));
    }
    Ok(())
}
