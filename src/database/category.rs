use crate::database::postgres_repository::PostgresRepository;
use crate::error::app_error::AppError;
use crate::models::category::Category;

#[async_trait::async_trait]
pub trait CategoryRepository {
    /// All seeded categories by `sort_order`, ties in insertion order.
    async fn list_categories(&self) -> Result<Vec<Category>, AppError>;
}

#[async_trait::async_trait]
impl CategoryRepository for PostgresRepository {
    async fn list_categories(&self) -> Result<Vec<Category>, AppError> {
        let categories = sqlx::query_as::<_, Category>(
            r#"
            SELECT id, name, slug, icon, color, sort_order
            FROM category
            ORDER BY sort_order ASC, position ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(categories)
    }
}
