use crate::database::postgres_repository::PostgresRepository;
use crate::error::app_error::AppError;
use crate::models::user::User;

#[async_trait::async_trait]
pub trait UserRepository {
    /// Creates the user row on first use. Calling it again for the same id,
    /// including concurrently, leaves the existing row untouched.
    async fn ensure_user(&self, user_id: &str, email: &str) -> Result<User, AppError>;
    async fn get_user(&self, user_id: &str) -> Result<Option<User>, AppError>;
}

#[async_trait::async_trait]
impl UserRepository for PostgresRepository {
    async fn ensure_user(&self, user_id: &str, email: &str) -> Result<User, AppError> {
        // Two statements: the SELECT must see a row committed by a racing insert.
        sqlx::query(
            r#"
            INSERT INTO users (id, email, name)
            VALUES ($1, $2, NULL)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(email)
        .execute(&self.pool)
        .await?;

        self.get_user(user_id).await?.ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }

    async fn get_user(&self, user_id: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, name, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }
}
