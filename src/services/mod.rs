pub mod auth_service;
pub mod dashboard_service;
pub mod rating_service;
pub mod store_service;
pub mod user_service;
