use crate::config::DatabaseConfig;
use crate::database::postgres_repository::PostgresRepository;
use crate::service::category::CategoryRegistry;
use rocket::fairing::AdHoc;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use std::time::Duration;

async fn init_pool(db_config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    let connect = PgPoolOptions::new()
        .max_connections(db_config.max_connections)
        .min_connections(db_config.min_connections)
        .acquire_timeout(Duration::from_secs(db_config.acquire_timeout))
        .idle_timeout(Duration::from_secs(30))
        .max_lifetime(Duration::from_secs(1800))
        .connect(&db_config.url);

    tokio::time::timeout(Duration::from_secs(db_config.connection_timeout), connect)
        .await
        .map_err(|_| sqlx::Error::PoolTimedOut)?
}

/// Connects, applies pending migrations and loads the category registry.
/// Ignition fails if any of these steps fails.
pub fn stage_db(db_config: DatabaseConfig) -> AdHoc {
    AdHoc::try_on_ignite("Postgres (sqlx)", |rocket| async move {
        let pool = match init_pool(&db_config).await {
            Ok(pool) => {
                tracing::info!("Database pool initialized successfully");
                pool
            }
            Err(e) => {
                tracing::error!("Failed to initialize database pool: {}", e);
                return Err(rocket);
            }
        };

        if db_config.run_migrations
            && let Err(e) = sqlx::migrate!("./migrations").run(&pool).await
        {
            tracing::error!("Failed to run database migrations: {}", e);
            return Err(rocket);
        }

        let repo = PostgresRepository { pool: pool.clone() };
        let registry = match CategoryRegistry::load(&repo).await {
            Ok(registry) => registry,
            Err(e) => {
                tracing::error!("Failed to load category registry: {:?}", e);
                return Err(rocket);
            }
        };

        Ok(rocket.manage(pool).manage(Arc::new(registry)))
    })
}
