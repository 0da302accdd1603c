use std::sync::Arc;

use secrecy::SecretString;

use crate::{
    config::Environment,
    db::{DbPool, OrmConn, create_orm_conn},
    services::auth_service::JwtKeys,
};

#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub orm: OrmConn,
    pub jwt: Arc<JwtKeys>,
    pub environment: Environment,
}

impl AppState {
    pub fn new(pool: DbPool, jwt_secret: &SecretString, environment: Environment) -> Self {
        let orm = create_orm_conn(&pool);
        Self {
            pool,
            orm,
            jwt: Arc::new(JwtKeys::new(jwt_secret)),
            environment,
        }
    }
}
