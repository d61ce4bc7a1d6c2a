use crate::error::app_error::AppError;
use sqlx::PgPool;

/// Storage backend for every repository trait. Each owner-scoped query
/// carries the caller's id in its WHERE clause; there is no unscoped read
/// or write path for expenses.
#[derive(Clone)]
pub struct PostgresRepository {
    pub pool: PgPool,
}

impl PostgresRepository {
    pub async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
