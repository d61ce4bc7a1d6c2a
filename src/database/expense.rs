use crate::database::postgres_repository::PostgresRepository;
use crate::error::app_error::AppError;
use crate::models::category::Category;
use crate::models::expense::{Expense, ExpenseInput, unknown_category_errors};
use crate::models::pagination::PageWindow;
use crate::models::summary::DateRange;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

// Expense columns plus the joined category
#[derive(Debug, sqlx::FromRow)]
struct ExpenseRow {
    id: Uuid,
    user_id: String,
    amount: Decimal,
    description: Option<String>,
    expense_date: NaiveDate,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    category_id: Uuid,
    category_name: String,
    category_slug: String,
    category_icon: Option<String>,
    category_color: Option<String>,
    category_sort_order: i32,
}

impl From<ExpenseRow> for Expense {
    fn from(row: ExpenseRow) -> Self {
        Expense {
            id: row.id,
            user_id: row.user_id,
            category: Category {
                id: row.category_id,
                name: row.category_name,
                slug: row.category_slug,
                icon: row.category_icon,
                color: row.category_color,
                sort_order: row.category_sort_order,
            },
            amount: row.amount,
            description: row.description,
            expense_date: row.expense_date,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

const EXPENSE_SELECT_FIELDS: &str = r#"
    e.id,
    e.user_id,
    e.amount,
    e.description,
    e.expense_date,
    e.created_at,
    e.updated_at,
    c.id as category_id,
    c.name as category_name,
    c.slug as category_slug,
    c.icon as category_icon,
    c.color as category_color,
    c.sort_order as category_sort_order
"#;

const EXPENSE_ORDER: &str = "e.expense_date DESC, e.created_at DESC, e.id DESC";

/// Builds a SELECT over `from_clause` (a table or CTE aliased as `e`) joined with its category.
fn build_expense_query(from_clause: &str, where_clause: &str, order_by: &str) -> String {
    let mut query = format!("SELECT {} FROM {} JOIN category c ON e.category_id = c.id", EXPENSE_SELECT_FIELDS, from_clause);

    if !where_clause.is_empty() {
        query.push_str(" WHERE ");
        query.push_str(where_clause);
    }

    if !order_by.is_empty() {
        query.push_str(" ORDER BY ");
        query.push_str(order_by);
    }

    query
}

fn map_write_error(err: sqlx::Error) -> AppError {
    match &err {
        sqlx::Error::Database(db) if db.is_foreign_key_violation() && db.constraint() == Some("expense_category_id_fkey") => {
            AppError::ValidationError(unknown_category_errors())
        }
        _ => AppError::from(err),
    }
}

/// Every method takes the authenticated user's id first. A record owned by
/// someone else behaves exactly like one that does not exist.
#[async_trait::async_trait]
pub trait ExpenseRepository {
    async fn create_expense(&self, user_id: &str, input: &ExpenseInput) -> Result<Expense, AppError>;
    async fn get_expense(&self, user_id: &str, id: &Uuid) -> Result<Option<Expense>, AppError>;
    async fn update_expense(&self, user_id: &str, id: &Uuid, input: &ExpenseInput) -> Result<Option<Expense>, AppError>;
    /// Returns false when nothing owned by `user_id` matched.
    async fn delete_expense(&self, user_id: &str, id: &Uuid) -> Result<bool, AppError>;
    /// Newest first, with the total number of the user's expenses.
    async fn list_expenses(&self, user_id: &str, window: PageWindow) -> Result<(Vec<Expense>, i64), AppError>;
    /// All of the user's expenses dated within `range`, or every expense when `range` is None.
    async fn list_expenses_in_range(&self, user_id: &str, range: Option<DateRange>) -> Result<Vec<Expense>, AppError>;
}

#[async_trait::async_trait]
impl ExpenseRepository for PostgresRepository {
    async fn create_expense(&self, user_id: &str, input: &ExpenseInput) -> Result<Expense, AppError> {
        let select_query = build_expense_query("inserted e", "", "");
        let query = format!(
            r#"
            WITH inserted AS (
                INSERT INTO expense (user_id, category_id, amount, description, expense_date)
                VALUES ($1, $2, $3, $4, $5)
                RETURNING id, user_id, category_id, amount, description, expense_date, created_at, updated_at
            )
            {}
            "#,
            select_query
        );

        let row = sqlx::query_as::<_, ExpenseRow>(&query)
            .bind(user_id)
            .bind(input.category_id)
            .bind(input.amount)
            .bind(&input.description)
            .bind(input.expense_date)
            .fetch_one(&self.pool)
            .await
            .map_err(map_write_error)?;

        Ok(Expense::from(row))
    }

    async fn get_expense(&self, user_id: &str, id: &Uuid) -> Result<Option<Expense>, AppError> {
        let query = build_expense_query("expense e", "e.id = $1 AND e.user_id = $2", "");
        let row = sqlx::query_as::<_, ExpenseRow>(&query)
            .bind(id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Expense::from))
    }

    async fn update_expense(&self, user_id: &str, id: &Uuid, input: &ExpenseInput) -> Result<Option<Expense>, AppError> {
        let select_query = build_expense_query("updated e", "", "");
        let query = format!(
            r#"
            WITH updated AS (
                UPDATE expense
                SET category_id = $3,
                    amount = $4,
                    description = $5,
                    expense_date = $6,
                    updated_at = now()
                WHERE id = $1 AND user_id = $2
                RETURNING id, user_id, category_id, amount, description, expense_date, created_at, updated_at
            )
            {}
            "#,
            select_query
        );

        let row = sqlx::query_as::<_, ExpenseRow>(&query)
            .bind(id)
            .bind(user_id)
            .bind(input.category_id)
            .bind(input.amount)
            .bind(&input.description)
            .bind(input.expense_date)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_write_error)?;

        Ok(row.map(Expense::from))
    }

    async fn delete_expense(&self, user_id: &str, id: &Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM expense WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_expenses(&self, user_id: &str, window: PageWindow) -> Result<(Vec<Expense>, i64), AppError> {
        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM expense WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;

        let mut query = build_expense_query("expense e", "e.user_id = $1", EXPENSE_ORDER);
        query.push_str(" LIMIT $2 OFFSET $3");

        let rows = sqlx::query_as::<_, ExpenseRow>(&query)
            .bind(user_id)
            .bind(window.limit)
            .bind(window.offset)
            .fetch_all(&self.pool)
            .await?;

        Ok((rows.into_iter().map(Expense::from).collect(), total))
    }

    async fn list_expenses_in_range(&self, user_id: &str, range: Option<DateRange>) -> Result<Vec<Expense>, AppError> {
        let rows = match range {
            Some(range) => {
                let query = build_expense_query("expense e", "e.user_id = $1 AND e.expense_date >= $2 AND e.expense_date <= $3", EXPENSE_ORDER);
                sqlx::query_as::<_, ExpenseRow>(&query)
                    .bind(user_id)
                    .bind(range.start)
                    .bind(range.end)
                    .fetch_all(&self.pool)
                    .await?
            }
            None => {
                let query = build_expense_query("expense e", "e.user_id = $1", EXPENSE_ORDER);
                sqlx::query_as::<_, ExpenseRow>(&query).bind(user_id).fetch_all(&self.pool).await?
            }
        };

        Ok(rows.into_iter().map(Expense::from).collect())
    }
}
