use crate::database::postgres_repository::PostgresRepository;
use crate::error::app_error::AppError;

/// Read-only view of the billing system's plan records.
#[async_trait::async_trait]
pub trait SubscriptionRepository {
    /// Raw tier value, if billing has recorded one for the user.
    async fn get_subscription_tier(&self, user_id: &str) -> Result<Option<String>, AppError>;
}

#[async_trait::async_trait]
impl SubscriptionRepository for PostgresRepository {
    async fn get_subscription_tier(&self, user_id: &str) -> Result<Option<String>, AppError> {
        let tier = sqlx::query_scalar::<_, String>("SELECT tier FROM subscription WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(tier)
    }
}
