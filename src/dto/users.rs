use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    models::{Role, User},
    response::Pagination,
    validation::{ADDRESS_MAX, FieldErrors, NAME_MAX, NAME_MIN, PASSWORD_MIN, Validate},
};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateUserRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub address: Option<String>,
    pub role: Role,
}

impl Validate for CreateUserRequest {
    fn validate(&self) -> Result<(), Vec<String>> {
        FieldErrors::new()
            .length("name", &self.name, NAME_MIN, NAME_MAX)
            .email("email", &self.email)
            .min_length("password", &self.password, PASSWORD_MIN)
            .max_length("address", self.address.as_deref(), ADDRESS_MAX)
            .finish()
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateUserRequest {
    pub name: String,
    pub email: String,
    pub address: Option<String>,
    pub role: Role,
}

impl Validate for UpdateUserRequest {
    fn validate(&self) -> Result<(), Vec<String>> {
        FieldErrors::new()
            .length("name", &self.name, NAME_MIN, NAME_MAX)
            .email("email", &self.email)
            .max_length("address", self.address.as_deref(), ADDRESS_MAX)
            .finish()
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserPayload {
    pub user: User,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserList {
    pub users: Vec<User>,
    pub pagination: Pagination,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardTotals {
    pub total_users: i64,
    pub total_stores: i64,
    pub total_ratings: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RoleCount {
    pub role: Role,
    pub count: i64,
}

#[derive(Debug, Serialize, ToSchema, sqlx::FromRow)]
pub struct RecentRating {
    pub user_name: String,
    pub store_name: String,
    pub rating: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TopRatedStore {
    pub id: uuid::Uuid,
    pub name: String,
    pub average_rating: String,
    pub total_ratings: i64,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub stats: DashboardTotals,
    pub role_distribution: Vec<RoleCount>,
    pub recent_ratings: Vec<RecentRating>,
    pub top_rated_stores: Vec<TopRatedStore>,
}
