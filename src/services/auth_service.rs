use argon2::{
    Argon2, PasswordHasher,
    password_hash::{PasswordHash, PasswordVerifier, SaltString},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use password_hash::rand_core::OsRng;
use sea_orm::{ActiveModelTrait, ActiveValue::Set, ColumnTrait, EntityTrait, QueryFilter};
use secrecy::{ExposeSecret, SecretString};
use uuid::Uuid;

use crate::{
    dto::auth::{AuthResponse, Claims, LoginRequest, RegisterRequest, VerifyResponse},
    entity::users::{ActiveModel as UserActive, Column as UserCol, Entity as Users},
    error::{AppError, AppResult, orm_is_unique_violation},
    middleware::auth::AuthUser,
    models::{Role, User},
    response::{ApiResponse, Meta},
    services::user_service::user_from_entity,
    state::AppState,
};

pub const TOKEN_TTL_HOURS: i64 = 24;

const INVALID_CREDENTIALS: &str = "Invalid email or password";
const EMAIL_TAKEN: &str = "User with this email already exists";

/// HMAC keys for signing and checking bearer tokens.
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl JwtKeys {
    pub fn new(secret: &SecretString) -> Self {
        let bytes = secret.expose_secret().as_bytes();
        Self {
            encoding: EncodingKey::from_secret(bytes),
            decoding: DecodingKey::from_secret(bytes),
        }
    }

    pub fn issue(&self, user_id: Uuid, email: &str, role: Role) -> AppResult<String> {
        let now = Utc::now();
        let expiration = now
            .checked_add_signed(Duration::hours(TOKEN_TTL_HOURS))
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to set expiration")))?;

        let claims = Claims {
            user_id,
            email: email.to_string(),
            role,
            iat: now.timestamp() as usize,
            exp: expiration.timestamp() as usize,
        };
        self.sign(&claims)
    }

    pub fn sign(&self, claims: &Claims) -> AppResult<String> {
        encode(&Header::default(), claims, &self.encoding)
            .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))
    }

    /// Check signature and expiry. Every failure reads the same to the caller.
    pub fn decode(&self, token: &str) -> AppResult<Claims> {
        decode::<Claims>(token, &self.decoding, &Validation::default())
            .map(|data| data.claims)
            .map_err(|err| {
                tracing::debug!(error = %err, "token rejected");
                AppError::Unauthorized("Token is invalid or expired".into())
            })
    }
}

pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))?
        .to_string();
    Ok(hash)
}

pub fn verify_password(password: &str, password_hash: &str) -> AppResult<bool> {
    let parsed_hash = PasswordHash::new(password_hash)
        .map_err(|_| AppError::Internal(anyhow::anyhow!("Invalid password hash")))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

pub async fn register_user(
    state: &AppState,
    payload: RegisterRequest,
) -> AppResult<ApiResponse<AuthResponse>> {
    let RegisterRequest {
        name,
        email,
        password,
        address,
    } = payload;

    let exist = Users::find()
        .filter(UserCol::Email.eq(email.as_str()))
        .one(&state.orm)
        .await?;
    if exist.is_some() {
        return Err(AppError::BadRequest(EMAIL_TAKEN.into()));
    }

    let password_hash = hash_password(&password)?;
    let now = Utc::now();
    let active = UserActive {
        id: Set(Uuid::new_v4()),
        name: Set(name),
        email: Set(email),
        password_hash: Set(password_hash),
        address: Set(address),
        role: Set(Role::Normal.as_str().to_string()),
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
    let user = user_from_entity(model)?;

    let token = state.jwt.issue(user.id, &user.email, user.role)?;
    tracing::info!(user_id = %user.id, email = %user.email, "user registered");

    Ok(ApiResponse::success(
        "Registration successful",
        AuthResponse { token, user },
        Some(Meta::empty()),
    ))
}

pub async fn login_user(
    state: &AppState,
    payload: LoginRequest,
) -> AppResult<ApiResponse<AuthResponse>> {
    let LoginRequest { email, password } = payload;
    let model = Users::find()
        .filter(UserCol::Email.eq(email.as_str()))
        .one(&state.orm)
        .await?;

    let model = match model {
        Some(u) => u,
        None => return Err(AppError::Unauthorized(INVALID_CREDENTIALS.into())),
    };

    if !verify_password(&password, &model.password_hash)? {
        return Err(AppError::Unauthorized(INVALID_CREDENTIALS.into()));
    }

    let user = user_from_entity(model)?;
    let token = state.jwt.issue(user.id, &user.email, user.role)?;
    tracing::info!(user_id = %user.id, role = %user.role, "user logged in");

    Ok(ApiResponse::success(
        "Login successful",
        AuthResponse { token, user },
        Some(Meta::empty()),
    ))
}

/// Resolve a verified token to the user's current record.
pub async fn verify_user(state: &AppState, auth: &AuthUser) -> AppResult<ApiResponse<VerifyResponse>> {
    let model = Users::find_by_id(auth.user_id).one(&state.orm).await?;
    let model = match model {
        Some(u) => u,
        None => return Err(AppError::Unauthorized("User does not exist".into())),
    };
    let user = user_from_entity(model)?;
    Ok(ApiResponse::success(
        "Token is valid",
        VerifyResponse { user },
        Some(Meta::empty()),
    ))
}
