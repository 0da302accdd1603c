use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    models::{Role, User},
    validation::{ADDRESS_MAX, FieldErrors, NAME_MAX, NAME_MIN, PASSWORD_MIN, Validate},
};

/// Self-service sign-up. There is no role field: a role sent by the client is
/// ignored and the account is always created as `normal`.
#[derive(Deserialize, Debug, ToSchema)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub address: Option<String>,
}

impl Validate for RegisterRequest {
    fn validate(&self) -> Result<(), Vec<String>> {
        FieldErrors::new()
            .length("name", &self.name, NAME_MIN, NAME_MAX)
            .email("email", &self.email)
            .min_length("password", &self.password, PASSWORD_MIN)
            .max_length("address", self.address.as_deref(), ADDRESS_MAX)
            .finish()
    }
}

/// Only presence is checked: a malformed email must fail the same way as an
/// unknown one.
#[derive(Deserialize, Debug, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl Validate for LoginRequest {
    fn validate(&self) -> Result<(), Vec<String>> {
        FieldErrors::new()
            .required("email", &self.email)
            .required("password", &self.password)
            .finish()
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct VerifyResponse {
    pub user: User,
}

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct Claims {
    #[serde(rename = "userId")]
    pub user_id: Uuid,
    pub email: String,
    pub role: Role,
    pub iat: usize,
    pub exp: usize,
}
