use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    models::{StoreRatingEntry, UserRatingEntry},
    response::Pagination,
    validation::{FieldErrors, RATING_MAX, RATING_MIN, Validate},
};

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitRatingRequest {
    pub store_id: Uuid,
    pub rating: i32,
}

impl Validate for SubmitRatingRequest {
    fn validate(&self) -> Result<(), Vec<String>> {
        FieldErrors::new()
            .range("rating", self.rating, RATING_MIN, RATING_MAX)
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum RatingOutcome {
    Created,
    Updated,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitRatingResponse {
    pub outcome: RatingOutcome,
    pub rating_id: Uuid,
    pub store_id: Uuid,
    pub rating: i32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StoreRatingList {
    pub ratings: Vec<StoreRatingEntry>,
    pub pagination: Pagination,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserRatingList {
    pub ratings: Vec<UserRatingEntry>,
    pub pagination: Pagination,
}
