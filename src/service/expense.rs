use crate::database::expense::ExpenseRepository;
use crate::database::user::UserRepository;
use crate::error::app_error::AppError;
use crate::models::expense::{Expense, ExpenseRequest, ExpenseResponse};
use crate::models::pagination::{OffsetPage, OffsetParams};
use crate::models::user::{User, placeholder_email};
use crate::service::category::CategoryRegistry;
use tracing::{debug, info};
use uuid::Uuid;

/// Record store operations on behalf of one caller.
pub struct ExpenseService<'a, R> {
    repository: &'a R,
    registry: &'a CategoryRegistry,
}

/// Ids that do not parse cannot name an owned record.
fn parse_expense_id(id: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(id).map_err(|_| AppError::expense_not_found())
}

/// Creates the caller's user row if it does not exist yet.
pub async fn provision_user<R>(repository: &R, user_id: &str) -> Result<User, AppError>
where
    R: UserRepository + Sync,
{
    repository.ensure_user(user_id, &placeholder_email(user_id)).await
}

impl<'a, R> ExpenseService<'a, R>
where
    R: ExpenseRepository + UserRepository + Sync,
{
    pub fn new(repository: &'a R, registry: &'a CategoryRegistry) -> Self {
        Self { repository, registry }
    }

    pub async fn create(&self, user_id: &str, request: &ExpenseRequest) -> Result<Expense, AppError> {
        let input = request.to_input(|id| self.registry.contains(id))?;
        provision_user(self.repository, user_id).await?;

        let expense = self.repository.create_expense(user_id, &input).await?;
        info!(expense_id = %expense.id, user_id, "expense created");
        Ok(expense)
    }

    pub async fn get(&self, user_id: &str, id: &str) -> Result<Expense, AppError> {
        let id = parse_expense_id(id)?;
        self.repository
            .get_expense(user_id, &id)
            .await?
            .ok_or_else(AppError::expense_not_found)
    }

    /// Replaces every editable field. Validation runs before ownership is checked.
    pub async fn update(&self, user_id: &str, id: &str, request: &ExpenseRequest) -> Result<Expense, AppError> {
        let id = parse_expense_id(id)?;
        let input = request.to_input(|id| self.registry.contains(id))?;

        let expense = self
            .repository
            .update_expense(user_id, &id, &input)
            .await?
            .ok_or_else(AppError::expense_not_found)?;
        info!(expense_id = %expense.id, user_id, "expense updated");
        Ok(expense)
    }

    pub async fn delete(&self, user_id: &str, id: &str) -> Result<(), AppError> {
        let id = parse_expense_id(id)?;
        if !self.repository.delete_expense(user_id, &id).await? {
            return Err(AppError::expense_not_found());
        }
        info!(expense_id = %id, user_id, "expense deleted");
        Ok(())
    }

    pub async fn list(&self, user_id: &str, params: &OffsetParams) -> Result<OffsetPage<ExpenseResponse>, AppError> {
        let window = params.window()?;
        provision_user(self.repository, user_id).await?;

        let (expenses, total) = self.repository.list_expenses(user_id, window).await?;
        debug!(user_id, returned = expenses.len(), total, "expenses listed");
        Ok(OffsetPage::new(expenses.iter().map(ExpenseResponse::from).collect(), window, total))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::expense::AmountInput;
    use crate::test_utils::{InMemoryRepository, date, expense_request, sample_registry};
    use rust_decimal_macros::dec;

    fn food(registry: &CategoryRegistry) -> crate::models::category::Category {
        registry.by_slug("food").unwrap().clone()
    }

    #[rocket::async_test]
    async fn create_echoes_input_and_provisions_user() {
        let repository = InMemoryRepository::new();
        let registry = sample_registry();
        let service = ExpenseService::new(&repository, &registry);

        let mut request = expense_request("12.50", &food(&registry), "2025-01-06");
        request.description = Some("  lunch ".to_string());
        let expense = service.create("user-1", &request).await.unwrap();

        assert_eq!(expense.user_id, "user-1");
        assert_eq!(expense.amount, dec!(12.50));
        assert_eq!(expense.category.slug, "food");
        assert_eq!(expense.description.as_deref(), Some("lunch"));
        assert_eq!(expense.expense_date, date(2025, 1, 6));

        let user = repository.get_user("user-1").await.unwrap().unwrap();
        assert_eq!(user.email, "user_user-1@example.com");
    }

    #[rocket::async_test]
    async fn provisioning_is_idempotent() {
        let repository = InMemoryRepository::new();
        let registry = sample_registry();
        let service = ExpenseService::new(&repository, &registry);
        let request = expense_request("3", &food(&registry), "2025-01-06");

        service.create("user-1", &request).await.unwrap();
        service.create("user-1", &request).await.unwrap();
        provision_user(&repository, "user-1").await.unwrap();

        assert_eq!(repository.user_count(), 1);
        assert_eq!(repository.expense_count(), 2);
    }

    #[rocket::async_test]
    async fn invalid_input_never_reaches_storage() {
        let repository = InMemoryRepository::new();
        let registry = sample_registry();
        let service = ExpenseService::new(&repository, &registry);

        for amount in ["0", "-5", "abc", "1.234"] {
            let request = expense_request(amount, &food(&registry), "2025-01-06");
            let result = service.create("user-1", &request).await;
            assert!(matches!(result, Err(AppError::ValidationError(_))), "amount {amount} should be rejected");
        }

        let mut request = expense_request("5", &food(&registry), "2025-01-06");
        request.category_id = Uuid::new_v4().to_string();
        assert!(matches!(service.create("user-1", &request).await, Err(AppError::ValidationError(_))));

        assert_eq!(repository.user_count(), 0);
        assert_eq!(repository.expense_count(), 0);
    }

    #[rocket::async_test]
    async fn foreign_and_missing_records_are_indistinguishable() {
        let repository = InMemoryRepository::new();
        let registry = sample_registry();
        let service = ExpenseService::new(&repository, &registry);
        let request = expense_request("10", &food(&registry), "2025-01-06");
        let owned = service.create("owner", &request).await.unwrap();

        let foreign_id = owned.id.to_string();
        let missing_id = Uuid::new_v4().to_string();
        for id in [foreign_id.as_str(), missing_id.as_str(), "not-a-uuid"] {
            assert!(matches!(service.get("intruder", id).await, Err(AppError::NotFound(_))));
            assert!(matches!(service.update("intruder", id, &request).await, Err(AppError::NotFound(_))));
            assert!(matches!(service.delete("intruder", id).await, Err(AppError::NotFound(_))));
        }

        let untouched = service.get("owner", &foreign_id).await.unwrap();
        assert_eq!(untouched, owned);
    }

    #[rocket::async_test]
    async fn update_replaces_fields_and_refreshes_timestamp() {
        let repository = InMemoryRepository::new();
        let registry = sample_registry();
        let service = ExpenseService::new(&repository, &registry);
        let created = service
            .create("user-1", &expense_request("10", &food(&registry), "2025-01-06"))
            .await
            .unwrap();

        let transport = registry.by_slug("transport").unwrap();
        let mut request = expense_request("0", transport, "2025-01-08T23:30:00Z");
        request.amount = AmountInput::Number(serde_json::Number::from_f64(7.25).unwrap());
        let updated = service.update("user-1", &created.id.to_string(), &request).await.unwrap();

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.amount, dec!(7.25));
        assert_eq!(updated.category.slug, "transport");
        assert_eq!(updated.expense_date, date(2025, 1, 8));
        assert!(updated.updated_at > created.updated_at);
    }

    #[rocket::async_test]
    async fn delete_removes_only_once() {
        let repository = InMemoryRepository::new();
        let registry = sample_registry();
        let service = ExpenseService::new(&repository, &registry);
        let created = service
            .create("user-1", &expense_request("10", &food(&registry), "2025-01-06"))
            .await
            .unwrap();
        let id = created.id.to_string();

        service.delete("user-1", &id).await.unwrap();
        assert!(matches!(service.delete("user-1", &id).await, Err(AppError::NotFound(_))));
        assert_eq!(repository.expense_count(), 0);
    }

    #[rocket::async_test]
    async fn list_pages_newest_first() {
        let repository = InMemoryRepository::new();
        let registry = sample_registry();
        let service = ExpenseService::new(&repository, &registry);
        let category = food(&registry);

        let oldest = service.create("user-1", &expense_request("1", &category, "2025-01-01")).await.unwrap();
        let middle = service.create("user-1", &expense_request("2", &category, "2025-01-02")).await.unwrap();
        let newest = service.create("user-1", &expense_request("3", &category, "2025-01-02")).await.unwrap();
        service.create("someone-else", &expense_request("4", &category, "2025-01-03")).await.unwrap();

        let params = OffsetParams {
            limit: Some(1),
            offset: Some(1),
        };
        let page = service.list("user-1", &params).await.unwrap();
        assert_eq!(page.total_items, 3);
        assert_eq!(page.data.len(), 1);
        assert_eq!(page.data[0].id, middle.id);

        let everything = service.list("user-1", &OffsetParams::default()).await.unwrap();
        let ids: Vec<Uuid> = everything.data.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![newest.id, middle.id, oldest.id]);
        assert_eq!(everything.limit, 50);
    }

    #[rocket::async_test]
    async fn list_rejects_bad_windows() {
        let repository = InMemoryRepository::new();
        let registry = sample_registry();
        let service = ExpenseService::new(&repository, &registry);

        let params = OffsetParams {
            limit: Some(0),
            offset: None,
        };
        assert!(matches!(service.list("user-1", &params).await, Err(AppError::BadRequest(_))));
    }
}
