use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        auth::{AuthResponse, LoginRequest, RegisterRequest, VerifyResponse},
        ratings::{RatingOutcome, StoreRatingList, SubmitRatingRequest, SubmitRatingResponse, UserRatingList},
        stores::{CreateStoreRequest, StoreCreated, StoreList},
        users::{
            CreateUserRequest, DashboardStats, DashboardTotals, RecentRating, RoleCount,
            TopRatedStore, UpdateUserRequest, UserList, UserPayload,
        },
    },
    error::ErrorData,
    models::{Role, Store, StoreRatingEntry, StoreWithRating, User, UserRatingEntry},
    response::{ApiResponse, Meta, Pagination},
    routes::{auth, health, params, ratings, stores, users},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::register,
        auth::login,
        auth::verify,
        stores::list_stores,
        stores::get_store,
        stores::create_store,
        ratings::submit_rating,
        ratings::store_ratings,
        ratings::user_ratings,
        users::list_users,
        users::create_user,
        users::update_user,
        users::delete_user,
        users::dashboard_stats
    ),
    components(
        schemas(
            Role,
            User,
            Store,
            StoreWithRating,
            StoreRatingEntry,
            UserRatingEntry,
            RegisterRequest,
            LoginRequest,
            AuthResponse,
            VerifyResponse,
            CreateStoreRequest,
            StoreCreated,
            StoreList,
            SubmitRatingRequest,
            SubmitRatingResponse,
            RatingOutcome,
            StoreRatingList,
            UserRatingList,
            CreateUserRequest,
            UpdateUserRequest,
            UserPayload,
            UserList,
            DashboardStats,
            DashboardTotals,
            RoleCount,
            RecentRating,
            TopRatedStore,
            params::SortOrder,
            params::StoreSortBy,
            ErrorData,
            Pagination,
            Meta,
            ApiResponse<StoreList>,
            ApiResponse<UserList>,
            ApiResponse<AuthResponse>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Login, registration and token verification"),
        (name = "Stores", description = "Store endpoints"),
        (name = "Ratings", description = "Rating endpoints"),
        (name = "Users", description = "User management and dashboard (admin)"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
