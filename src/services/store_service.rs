use chrono::{DateTime, Utc};
use sea_orm::{ActiveModelTrait, ActiveValue::Set, ColumnTrait, EntityTrait, QueryFilter};
use uuid::Uuid;

use crate::{
    dto::stores::{CreateStoreRequest, StoreCreated, StoreList},
    entity::{
        stores::{ActiveModel as StoreActive, Column as StoreCol, Entity as Stores, Model as StoreModel},
        users::Entity as Users,
    },
    error::{AppError, AppResult, orm_is_unique_violation},
    middleware::auth::{AuthUser, authorize},
    models::{RatingSummary, Store, StoreWithRating},
    policy::Operation,
    response::{ApiResponse, Meta, Pagination},
    routes::params::{StoreListQuery, like_pattern},
    services::rating_service::store_rating_summary_with_caller,
    state::AppState,
};

const EMAIL_TAKEN: &str = "Store with this email already exists";

#[derive(Debug, sqlx::FromRow)]
struct StoreStatsRow {
    id: Uuid,
    name: String,
    email: String,
    address: Option<String>,
    owner_id: Option<Uuid>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    rating_sum: i64,
    total_ratings: i64,
    user_rating: Option<i32>,
}

impl From<StoreStatsRow> for StoreWithRating {
    fn from(row: StoreStatsRow) -> Self {
        let summary = RatingSummary::from_totals(row.rating_sum, row.total_ratings);
        StoreWithRating {
            id: row.id,
            name: row.name,
            email: row.email,
            address: row.address,
            owner_id: row.owner_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
            average_rating: summary.average_rating,
            total_ratings: summary.total_ratings,
            user_rating: row.user_rating,
        }
    }
}

/// One page of stores with their rating stats and the caller's own rating,
/// computed in a single grouped join for the whole page.
pub async fn list_stores(
    state: &AppState,
    user: &AuthUser,
    query: StoreListQuery,
) -> AppResult<ApiResponse<StoreList>> {
    authorize(state, user, Operation::ReadStores).await?;
    let (page, limit, offset) = query.normalize();

    let search = query
        .search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(like_pattern);
    let sort_by = query.sort_by.unwrap_or_default();
    let sort_order = query.sort_order.unwrap_or_default();

    // Sort column and direction come from closed enums, never from raw input.
    let sql = format!(
        r#"
        SELECT s.id, s.name, s.email, s.address, s.owner_id, s.created_at, s.updated_at,
               COALESCE(SUM(r.rating), 0)::BIGINT AS rating_sum,
               COUNT(r.id) AS total_ratings,
               MAX(r.rating) FILTER (WHERE r.user_id = $1) AS user_rating
        FROM stores s
        LEFT JOIN ratings r ON r.store_id = s.id
        WHERE ($2::TEXT IS NULL OR s.name ILIKE $2 OR s.email ILIKE $2 OR s.address ILIKE $2)
          AND ($3::UUID IS NULL OR s.owner_id = $3)
        GROUP BY s.id
        ORDER BY {} {}, s.id ASC
        LIMIT $4 OFFSET $5
        "#,
        sort_by.as_sql(),
        sort_order.as_sql(),
    );

    let rows = sqlx::query_as::<_, StoreStatsRow>(&sql)
        .bind(user.user_id)
        .bind(search.as_deref())
        .bind(query.owner_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&state.pool)
        .await?;

    let total: (i64,) = sqlx::query_as(
        r#"
        SELECT COUNT(*)
        FROM stores s
        WHERE ($1::TEXT IS NULL OR s.name ILIKE $1 OR s.email ILIKE $1 OR s.address ILIKE $1)
          AND ($2::UUID IS NULL OR s.owner_id = $2)
        "#,
    )
    .bind(search.as_deref())
    .bind(query.owner_id)
    .fetch_one(&state.pool)
    .await?;

    let stores = rows.into_iter().map(StoreWithRating::from).collect();
    let pagination = Pagination::new(page, limit, total.0);
    let meta = Meta::new(page, limit, total.0);
    Ok(ApiResponse::success(
        "Stores",
        StoreList { stores, pagination },
        Some(meta),
    ))
}

pub async fn get_store(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<StoreWithRating>> {
    authorize(state, user, Operation::ReadStores).await?;
    let store = Stores::find_by_id(id).one(&state.orm).await?;
    let store = match store {
        Some(s) => store_from_entity(s),
        None => return Err(AppError::not_found("Store")),
    };

    let (summary, user_rating) =
        store_rating_summary_with_caller(&state.pool, store.id, user.user_id).await?;

    let data = StoreWithRating {
        id: store.id,
        name: store.name,
        email: store.email,
        address: store.address,
        owner_id: store.owner_id,
        created_at: store.created_at,
        updated_at: store.updated_at,
        average_rating: summary.average_rating,
        total_ratings: summary.total_ratings,
        user_rating,
    };
    Ok(ApiResponse::success("Store", data, Some(Meta::empty())))
}

pub async fn create_store(
    state: &AppState,
    user: &AuthUser,
    payload: CreateStoreRequest,
) -> AppResult<ApiResponse<StoreCreated>> {
    authorize(state, user, Operation::CreateStore).await?;

    let existing = Stores::find()
        .filter(StoreCol::Email.eq(payload.email.as_str()))
        .one(&state.orm)
        .await?;
    if existing.is_some() {
        return Err(AppError::BadRequest(EMAIL_TAKEN.into()));
    }

    if let Some(owner_id) = payload.owner_id
        && Users::find_by_id(owner_id).one(&state.orm).await?.is_none()
    {
        return Err(AppError::Validation(vec![
            "\"ownerId\" must reference an existing user".to_string(),
        ]));
    }

    let now = Utc::now();
    let active = StoreActive {
        id: Set(Uuid::new_v4()),
        name: Set(payload.name),
        email: Set(payload.email),
        address: Set(payload.address),
        owner_id: Set(payload.owner_id),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    };
    let model = active.insert(&state.orm).await.map_err(|err| {
        if orm_is_unique_violation(&err) {
            AppError::BadRequest(EMAIL_TAKEN.into())
        } else {
            AppError::OrmError(err)
        }
    })?;

    let store = store_from_entity(model);
    tracing::info!(store_id = %store.id, created_by = %user.user_id, "store created");

    Ok(ApiResponse::success(
        "Store created successfully",
        StoreCreated { store },
        Some(Meta::empty()),
    ))
}

pub(crate) fn store_from_entity(model: StoreModel) -> Store {
    Store {
        id: model.id,
        name: model.name,
        email: model.email,
        address: model.address,
        owner_id: model.owner_id,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}
