use uuid::Uuid;

use crate::{
    dto::users::{DashboardStats, DashboardTotals, RecentRating, RoleCount, TopRatedStore},
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, authorize},
    models::{RatingSummary, Role},
    policy::Operation,
    response::{ApiResponse, Meta},
    state::AppState,
};

const RECENT_LIMIT: i64 = 5;
const TOP_LIMIT: i64 = 5;

pub async fn dashboard_stats(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<DashboardStats>> {
    authorize(state, user, Operation::ViewDashboard).await?;
    let pool = &state.pool;

    let (total_users, total_stores, total_ratings): (i64, i64, i64) = sqlx::query_as(
        r#"
        SELECT (SELECT COUNT(*) FROM users),
               (SELECT COUNT(*) FROM stores),
               (SELECT COUNT(*) FROM ratings)
        "#,
    )
    .fetch_one(pool)
    .await?;

    let role_rows: Vec<(String, i64)> = sqlx::query_as(
        "SELECT role, COUNT(*) FROM users GROUP BY role ORDER BY role",
    )
    .fetch_all(pool)
    .await?;
    let role_distribution = role_rows
        .into_iter()
        .map(|(role, count)| {
            let role = role
                .parse::<Role>()
                .map_err(|e| AppError::Internal(anyhow::anyhow!(e)))?;
            Ok(RoleCount { role, count })
        })
        .collect::<AppResult<Vec<_>>>()?;

    let recent_ratings = sqlx::query_as::<_, RecentRating>(
        r#"
        SELECT u.name AS user_name, s.name AS store_name, r.rating, r.created_at
        FROM ratings r
        JOIN users u ON u.id = r.user_id
        JOIN stores s ON s.id = r.store_id
        ORDER BY r.created_at DESC, r.id ASC
        LIMIT $1
        "#,
    )
    .bind(RECENT_LIMIT)
    .fetch_all(pool)
    .await?;

    // Equal averages fall back to insertion order, then id.
    let top_rows: Vec<(Uuid, String, i64, i64)> = sqlx::query_as(
        r#"
        SELECT s.id, s.name, SUM(r.rating)::BIGINT, COUNT(r.id)
        FROM stores s
        JOIN ratings r ON r.store_id = s.id
        GROUP BY s.id
        ORDER BY AVG(r.rating) DESC, s.created_at ASC, s.id ASC
        LIMIT $1
        "#,
    )
    .bind(TOP_LIMIT)
    .fetch_all(pool)
    .await?;
    let top_rated_stores = top_rows
        .into_iter()
        .map(|(id, name, sum, count)| {
            let summary = RatingSummary::from_totals(sum, count);
            TopRatedStore {
                id,
                name,
                average_rating: summary.average_rating,
                total_ratings: summary.total_ratings,
            }
        })
        .collect();

    let data = DashboardStats {
        stats: DashboardTotals {
            total_users,
            total_stores,
            total_ratings,
        },
        role_distribution,
        recent_ratings,
        top_rated_stores,
    };
    Ok(ApiResponse::success("Dashboard stats", data, Some(Meta::empty())))
}
