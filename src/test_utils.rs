use crate::database::category::CategoryRepository;
use crate::database::expense::ExpenseRepository;
use crate::database::subscription::SubscriptionRepository;
use crate::database::user::UserRepository;
use crate::error::app_error::AppError;
use crate::models::category::Category;
use crate::models::expense::{AmountInput, Expense, ExpenseInput, ExpenseRequest};
use crate::models::pagination::PageWindow;
use crate::models::summary::DateRange;
use crate::models::user::User;
use crate::service::aggregation::within;
use crate::service::category::CategoryRegistry;
use chrono::{Duration, NaiveDate, Utc};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;

const SEEDED: [(&str, &str, u128); 9] = [
    ("Food", "food", 0x0b5c1c1e_0001_4000_8000_000000000001),
    ("Transport", "transport", 0x0b5c1c1e_0002_4000_8000_000000000002),
    ("Entertainment", "entertainment", 0x0b5c1c1e_0003_4000_8000_000000000003),
    ("Shopping", "shopping", 0x0b5c1c1e_0004_4000_8000_000000000004),
    ("Utilities", "utilities", 0x0b5c1c1e_0005_4000_8000_000000000005),
    ("Health", "health", 0x0b5c1c1e_0006_4000_8000_000000000006),
    ("Education", "education", 0x0b5c1c1e_0007_4000_8000_000000000007),
    ("Housing", "housing", 0x0b5c1c1e_0008_4000_8000_000000000008),
    ("Other", "other", 0x0b5c1c1e_0009_4000_8000_000000000009),
];

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

pub fn sample_category(slug: &str, sort_order: i32) -> Category {
    Category {
        id: Uuid::new_v4(),
        name: slug.to_string(),
        slug: slug.to_string(),
        icon: None,
        color: Some("#888888".to_string()),
        sort_order,
    }
}

/// The nine seeded categories with the ids used by the migrations.
pub fn sample_categories() -> Vec<Category> {
    SEEDED
        .iter()
        .zip(1..)
        .map(|(&(name, slug, id), sort_order)| Category {
            id: Uuid::from_u128(id),
            name: name.to_string(),
            slug: slug.to_string(),
            icon: None,
            color: None,
            sort_order,
        })
        .collect()
}

pub fn sample_registry() -> CategoryRegistry {
    CategoryRegistry::new(sample_categories()).unwrap()
}

pub fn sample_expense(user_id: &str, category: &Category, amount: Decimal, expense_date: NaiveDate) -> Expense {
    let now = Utc::now();
    Expense {
        id: Uuid::new_v4(),
        user_id: user_id.to_string(),
        category: category.clone(),
        amount,
        description: None,
        expense_date,
        created_at: now,
        updated_at: now,
    }
}

pub fn expense_request(amount: &str, category: &Category, expense_date: &str) -> ExpenseRequest {
    ExpenseRequest {
        amount: AmountInput::Text(amount.to_string()),
        category_id: category.id.to_string(),
        description: None,
        expense_date: expense_date.to_string(),
    }
}

#[derive(Default)]
struct Store {
    users: HashMap<String, User>,
    expenses: Vec<Expense>,
    tiers: HashMap<String, String>,
    // Strictly increasing so created_at ordering is deterministic within a test.
    clock: i64,
}

/// Storage double that keeps everything in memory and applies the same
/// owner filter as the SQL queries.
pub struct InMemoryRepository {
    categories: Vec<Category>,
    store: Mutex<Store>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self {
            categories: sample_categories(),
            store: Mutex::new(Store::default()),
        }
    }

    pub fn set_tier(&self, user_id: &str, tier: &str) {
        self.store.lock().unwrap().tiers.insert(user_id.to_string(), tier.to_string());
    }

    pub fn user_count(&self) -> usize {
        self.store.lock().unwrap().users.len()
    }

    pub fn expense_count(&self) -> usize {
        self.store.lock().unwrap().expenses.len()
    }

    fn category(&self, id: &Uuid) -> Result<Category, AppError> {
        self.categories
            .iter()
            .find(|c| c.id == *id)
            .cloned()
            .ok_or_else(|| AppError::ValidationError(crate::models::expense::unknown_category_errors()))
    }
}

fn newest_first(expenses: &mut [Expense]) {
    expenses.sort_by(|a, b| b.expense_date.cmp(&a.expense_date).then(b.created_at.cmp(&a.created_at)));
}

#[async_trait::async_trait]
impl CategoryRepository for InMemoryRepository {
    async fn list_categories(&self) -> Result<Vec<Category>, AppError> {
        Ok(self.categories.clone())
    }
}

#[async_trait::async_trait]
impl UserRepository for InMemoryRepository {
    async fn ensure_user(&self, user_id: &str, email: &str) -> Result<User, AppError> {
        let mut store = self.store.lock().unwrap();
        let user = store.users.entry(user_id.to_string()).or_insert_with(|| {
            let now = Utc::now();
            User {
                id: user_id.to_string(),
                email: email.to_string(),
                name: None,
                created_at: now,
                updated_at: now,
            }
        });
        Ok(user.clone())
    }

    async fn get_user(&self, user_id: &str) -> Result<Option<User>, AppError> {
        Ok(self.store.lock().unwrap().users.get(user_id).cloned())
    }
}

#[async_trait::async_trait]
impl SubscriptionRepository for InMemoryRepository {
    async fn get_subscription_tier(&self, user_id: &str) -> Result<Option<String>, AppError> {
        Ok(self.store.lock().unwrap().tiers.get(user_id).cloned())
    }
}

#[async_trait::async_trait]
impl ExpenseRepository for InMemoryRepository {
    async fn create_expense(&self, user_id: &str, input: &ExpenseInput) -> Result<Expense, AppError> {
        let category = self.category(&input.category_id)?;
        let mut store = self.store.lock().unwrap();
        if !store.users.contains_key(user_id) {
            return Err(AppError::BadRequest(format!("user {user_id} was not provisioned")));
        }
        store.clock += 1;
        let created_at = Utc::now() + Duration::microseconds(store.clock);
        let expense = Expense {
            id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            category,
            amount: input.amount,
            description: input.description.clone(),
            expense_date: input.expense_date,
            created_at,
            updated_at: created_at,
        };
        store.expenses.push(expense.clone());
        Ok(expense)
    }

    async fn get_expense(&self, user_id: &str, id: &Uuid) -> Result<Option<Expense>, AppError> {
        let store = self.store.lock().unwrap();
        Ok(store.expenses.iter().find(|e| e.id == *id && e.user_id == user_id).cloned())
    }

    async fn update_expense(&self, user_id: &str, id: &Uuid, input: &ExpenseInput) -> Result<Option<Expense>, AppError> {
        let category = self.category(&input.category_id)?;
        let mut store = self.store.lock().unwrap();
        store.clock += 1;
        let updated_at = Utc::now() + Duration::microseconds(store.clock);
        let Some(expense) = store.expenses.iter_mut().find(|e| e.id == *id && e.user_id == user_id) else {
            return Ok(None);
        };
        expense.category = category;
        expense.amount = input.amount;
        expense.description = input.description.clone();
        expense.expense_date = input.expense_date;
        expense.updated_at = updated_at;
        Ok(Some(expense.clone()))
    }

    async fn delete_expense(&self, user_id: &str, id: &Uuid) -> Result<bool, AppError> {
        let mut store = self.store.lock().unwrap();
        let before = store.expenses.len();
        store.expenses.retain(|e| !(e.id == *id && e.user_id == user_id));
        Ok(store.expenses.len() < before)
    }

    async fn list_expenses(&self, user_id: &str, window: PageWindow) -> Result<(Vec<Expense>, i64), AppError> {
        let store = self.store.lock().unwrap();
        let mut owned: Vec<Expense> = store.expenses.iter().filter(|e| e.user_id == user_id).cloned().collect();
        newest_first(&mut owned);
        let total = owned.len() as i64;
        let page = owned.into_iter().skip(window.offset as usize).take(window.limit as usize).collect();
        Ok((page, total))
    }

    async fn list_expenses_in_range(&self, user_id: &str, range: Option<DateRange>) -> Result<Vec<Expense>, AppError> {
        let store = self.store.lock().unwrap();
        let mut owned: Vec<Expense> = within(&store.expenses, range).filter(|e| e.user_id == user_id).cloned().collect();
        newest_first(&mut owned);
        Ok(owned)
    }
}
