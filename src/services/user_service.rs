use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, Condition, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect,
};
use uuid::Uuid;

use crate::{
    dto::users::{CreateUserRequest, UpdateUserRequest, UserList, UserPayload},
    entity::users::{ActiveModel as UserActive, Column as UserCol, Entity as Users, Model as UserModel},
    error::{AppError, AppResult, orm_is_unique_violation},
    middleware::auth::{AuthUser, authorize, ensure_allowed},
    models::{Role, User},
    policy::Operation,
    response::{ApiResponse, Meta, Pagination},
    routes::params::{UserListQuery, like_pattern},
    services::auth_service::hash_password,
    state::AppState,
};

const EMAIL_TAKEN: &str = "User with this email already exists";
const EMAIL_TAKEN_BY_OTHER: &str = "Email is already taken by another user";

pub async fn list_users(
    state: &AppState,
    user: &AuthUser,
    query: UserListQuery,
) -> AppResult<ApiResponse<UserList>> {
    authorize(state, user, Operation::ListUsers).await?;
    let (page, limit, offset) = query.normalize();
    let mut condition = Condition::all();

    // An unknown role filter is ignored rather than rejected.
    if let Some(role) = query.role.as_deref().and_then(|r| r.parse::<Role>().ok()) {
        condition = condition.add(UserCol::Role.eq(role.as_str()));
    }

    if let Some(search) = query.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        let pattern = like_pattern(search);
        condition = condition.add(
            Condition::any()
                .add(Expr::col(UserCol::Name).ilike(pattern.clone()))
                .add(Expr::col(UserCol::Email).ilike(pattern)),
        );
    }

    let finder = Users::find()
        .filter(condition)
        .order_by_desc(UserCol::CreatedAt)
        .order_by_asc(UserCol::Id);

    let total = finder.clone().count(&state.orm).await? as i64;

    let users = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(user_from_entity)
        .collect::<AppResult<Vec<_>>>()?;

    let pagination = Pagination::new(page, limit, total);
    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success(
        "Users",
        UserList { users, pagination },
        Some(meta),
    ))
}

pub async fn create_user(
    state: &AppState,
    user: &AuthUser,
    payload: CreateUserRequest,
) -> AppResult<ApiResponse<UserPayload>> {
    authorize(state, user, Operation::ManageUsers).await?;

    let exist = Users::find()
        .filter(UserCol::Email.eq(payload.email.as_str()))
        .one(&state.orm)
        .await?;
    if exist.is_some() {
        return Err(AppError::BadRequest(EMAIL_TAKEN.into()));
    }

    let password_hash = hash_password(&payload.password)?;
    let now = Utc::now();
    let active = UserActive {
        id: Set(Uuid::new_v4()),
        name: Set(payload.name),
        email: Set(payload.email),
        password_hash: Set(password_hash),
        address: Set(payload.address),
        role: Set(payload.role.as_str().to_string()),
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
    let created = user_from_entity(model)?;
    tracing::info!(user_id = %created.id, role = %created.role, created_by = %user.user_id, "user created");

    Ok(ApiResponse::success(
        "User created successfully",
        UserPayload { user: created },
        Some(Meta::empty()),
    ))
}

pub async fn update_user(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateUserRequest,
) -> AppResult<ApiResponse<UserPayload>> {
    authorize(state, user, Operation::ManageUsers).await?;

    let existing = Users::find_by_id(id).one(&state.orm).await?;
    let existing = match existing {
        Some(u) => u,
        None => return Err(AppError::not_found("User")),
    };

    let email_owner = Users::find()
        .filter(UserCol::Email.eq(payload.email.as_str()))
        .filter(UserCol::Id.ne(id))
        .one(&state.orm)
        .await?;
    if email_owner.is_some() {
        return Err(AppError::BadRequest(EMAIL_TAKEN_BY_OTHER.into()));
    }

    let mut active: UserActive = existing.into();
    active.name = Set(payload.name);
    active.email = Set(payload.email);
    active.address = Set(payload.address);
    active.role = Set(payload.role.as_str().to_string());
    active.updated_at = Set(Utc::now().into());

    let model = active.update(&state.orm).await.map_err(|err| {
        if orm_is_unique_violation(&err) {
            AppError::BadRequest(EMAIL_TAKEN_BY_OTHER.into())
        } else {
            AppError::OrmError(err)
        }
    })?;
    let updated = user_from_entity(model)?;
    tracing::info!(user_id = %updated.id, role = %updated.role, updated_by = %user.user_id, "user updated");

    Ok(ApiResponse::success(
        "User updated successfully",
        UserPayload { user: updated },
        Some(Meta::empty()),
    ))
}

/// Delete a user. Their ratings go with them and stores they owned are left
/// without an owner; both happen in the schema's foreign keys.
pub async fn delete_user(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_allowed(user, Operation::ManageUsers)?;
    if id == user.user_id {
        return Err(AppError::BadRequest("You cannot delete your own account".into()));
    }
    authorize(state, user, Operation::ManageUsers).await?;

    let result = Users::delete_by_id(id).exec(&state.orm).await?;
    if result.rows_affected == 0 {
        return Err(AppError::not_found("User"));
    }
    tracing::info!(user_id = %id, deleted_by = %user.user_id, "user deleted");

    Ok(ApiResponse::success(
        "User deleted successfully",
        serde_json::json!({ "id": id }),
        Some(Meta::empty()),
    ))
}

pub(crate) fn user_from_entity(model: UserModel) -> AppResult<User> {
    let role = model
        .role
        .parse::<Role>()
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e)))?;
    Ok(User {
        id: model.id,
        name: model.name,
        email: model.email,
        address: model.address,
        role,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    })
}
