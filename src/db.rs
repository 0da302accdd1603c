use anyhow::Result;
use sea_orm::{DatabaseConnection, SqlxPostgresConnector};
use secrecy::ExposeSecret;
use sqlx::{
    PgPool,
    postgres::{PgConnectOptions, PgPoolOptions},
};
use std::str::FromStr;

use crate::config::DbSettings;

pub type DbPool = PgPool;
pub type OrmConn = DatabaseConnection;

/// Build the bounded Postgres pool shared by every request.
///
/// Each connection carries a `statement_timeout` so a stuck query is cancelled
/// by the server instead of holding the connection forever.
pub async fn create_pool(database_url: &secrecy::SecretString, settings: &DbSettings) -> Result<DbPool> {
    let pool = pool_options(settings)
        .connect_with(connect_options(database_url, settings)?)
        .await?;
    Ok(pool)
}

/// Same as [`create_pool`] but does not open a connection until first use.
pub fn create_lazy_pool(database_url: &secrecy::SecretString, settings: &DbSettings) -> Result<DbPool> {
    Ok(pool_options(settings).connect_lazy_with(connect_options(database_url, settings)?))
}

/// Wrap the sqlx pool in a SeaORM connection; both share the same connections.
pub fn create_orm_conn(pool: &DbPool) -> OrmConn {
    SqlxPostgresConnector::from_sqlx_postgres_pool(pool.clone())
}

pub async fn run_migrations(pool: &DbPool) -> Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

fn pool_options(settings: &DbSettings) -> PgPoolOptions {
    PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .acquire_timeout(settings.acquire_timeout)
}

fn connect_options(database_url: &secrecy::SecretString, settings: &DbSettings) -> Result<PgConnectOptions> {
    let statement_timeout = format!("{}ms", settings.statement_timeout.as_millis());
    let options = PgConnectOptions::from_str(database_url.expose_secret())?
        .options([("statement_timeout", statement_timeout.as_str())]);
    Ok(options)
}
