use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    models::{Store, StoreWithRating},
    response::Pagination,
    validation::{ADDRESS_MAX, FieldErrors, NAME_MAX, NAME_MIN, Validate},
};

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateStoreRequest {
    pub name: String,
    pub email: String,
    pub address: Option<String>,
    pub owner_id: Option<Uuid>,
}

impl Validate for CreateStoreRequest {
    fn validate(&self) -> Result<(), Vec<String>> {
        FieldErrors::new()
            .length("name", &self.name, NAME_MIN, NAME_MAX)
            .email("email", &self.email)
            .max_length("address", self.address.as_deref(), ADDRESS_MAX)
            .finish()
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StoreCreated {
    pub store: Store,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StoreList {
    pub stores: Vec<StoreWithRating>,
    pub pagination: Pagination,
}
