use store_rating_api::{
    config::AppConfig,
    db::{create_pool, run_migrations},
    models::Role,
    services::auth_service::hash_password,
};
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let pool = create_pool(&config.database_url, &config.db).await?;
    run_migrations(&pool).await?;

    let admin_id = ensure_admin(&pool, "admin@platform.com", "admin123").await?;
    seed_stores(&pool).await?;

    println!("Seed completed. Admin ID: {admin_id}");
    Ok(())
}

async fn ensure_admin(pool: &sqlx::PgPool, email: &str, password: &str) -> anyhow::Result<Uuid> {
    let password_hash =
        hash_password(password).map_err(|e| anyhow::anyhow!("hashing failed: {e}"))?;

    // Keeps an existing account's password; only the role is reasserted.
    let (id,): (Uuid,) = sqlx::query_as(
        r#"
        INSERT INTO users (id, name, email, password_hash, address, role)
        VALUES ($1, $2, $3, $4, $5, $6)
        ON CONFLICT (email) DO UPDATE SET role = EXCLUDED.role
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind("System Administrator Account")
    .bind(email)
    .bind(password_hash)
    .bind("Platform Headquarters")
    .bind(Role::Admin.as_str())
    .fetch_one(pool)
    .await?;

    println!("Ensured admin {email}");
    Ok(id)
}

async fn seed_stores(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    let stores = [
        (
            "Tech Store Plus",
            "contact@techstoreplus.com",
            "123 Technology Street, Silicon Valley, CA 94000",
        ),
        (
            "Fashion Hub",
            "info@fashionhub.com",
            "456 Fashion Avenue, New York, NY 10001",
        ),
        (
            "Food Corner",
            "hello@foodcorner.com",
            "789 Culinary Road, Chicago, IL 60601",
        ),
    ];

    for (name, email, address) in stores {
        sqlx::query(
            r#"
            INSERT INTO stores (id, name, email, address)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (email) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(email)
        .bind(address)
        .execute(pool)
        .await?;
    }

    println!("Seeded stores");
    Ok(())
}
