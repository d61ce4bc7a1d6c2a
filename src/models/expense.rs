use crate::models::category::{Category, CategoryResponse};
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use regex::Regex;
use rocket::serde::{Deserialize, Serialize};
use rust_decimal::Decimal;
use schemars::JsonSchema;
use std::borrow::Cow;
use std::str::FromStr;
use std::sync::LazyLock;
use uuid::Uuid;
use validator::{Validate, ValidationError, ValidationErrors};

/// Amounts are stored as NUMERIC(12, 2).
pub const AMOUNT_SCALE: u32 = 2;

pub const DESCRIPTION_MAX_CHARS: usize = 500;

static CALENDAR_DATE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("date pattern is valid"));

fn max_amount() -> Decimal {
    Decimal::new(999_999_999_999, AMOUNT_SCALE)
}

/// An expense row joined with its category, always read on behalf of `user_id`.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Expense {
    pub id: Uuid,
    pub user_id: String,
    pub category: Category,
    pub amount: Decimal,
    pub description: Option<String>,
    pub expense_date: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Amount as sent by clients: a JSON number or a numeric string.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, JsonSchema)]
#[serde(untagged)]
pub enum AmountInput {
    Number(#[schemars(with = "f64")] serde_json::Number),
    Text(String),
}

fn field_error(code: &'static str, message: &'static str) -> ValidationError {
    ValidationError::new(code).with_message(Cow::Borrowed(message))
}

pub fn parse_amount(input: &AmountInput) -> Result<Decimal, ValidationError> {
    let raw = match input {
        AmountInput::Number(n) => n.to_string(),
        AmountInput::Text(s) => s.trim().to_string(),
    };

    let amount = Decimal::from_str(&raw)
        .or_else(|_| Decimal::from_scientific(&raw))
        .map_err(|_| field_error("amount_not_a_number", "amount must be a number"))?
        .normalize();

    if amount <= Decimal::ZERO {
        return Err(field_error("amount_must_be_positive", "amount must be greater than zero"));
    }
    if amount.scale() > AMOUNT_SCALE {
        return Err(field_error("amount_too_precise", "amount supports at most two decimal places"));
    }
    if amount > max_amount() {
        return Err(field_error("amount_too_large", "amount is too large"));
    }

    Ok(amount)
}

/// Accepts zero-padded `YYYY-MM-DD` or an RFC 3339 timestamp. Timestamps keep
/// only their UTC calendar date. Years outside 1..=9999 are rejected.
pub fn parse_expense_date(raw: &str) -> Result<NaiveDate, ValidationError> {
    let raw = raw.trim();
    let date = if CALENDAR_DATE.is_match(raw) {
        NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
    } else {
        DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.with_timezone(&Utc).date_naive())
    };

    date.filter(|d| (1..=9999).contains(&d.year()))
        .ok_or_else(|| field_error("invalid_date", "expense_date must be a valid date (YYYY-MM-DD)"))
}

fn validate_amount(amount: &AmountInput) -> Result<(), ValidationError> {
    parse_amount(amount).map(|_| ())
}

fn validate_expense_date(raw: &str) -> Result<(), ValidationError> {
    parse_expense_date(raw).map(|_| ())
}

/// The limit applies to the stored value, after trimming.
fn validate_description(description: &str) -> Result<(), ValidationError> {
    if description.trim().chars().count() > DESCRIPTION_MAX_CHARS {
        return Err(field_error("description_too_long", "description must be at most 500 characters"));
    }
    Ok(())
}

/// Body of create and update requests.
#[derive(Deserialize, Serialize, Debug, Clone, Validate, JsonSchema)]
pub struct ExpenseRequest {
    #[validate(custom(function = "validate_amount"))]
    pub amount: AmountInput,
    #[validate(length(min = 1, message = "select a category"))]
    pub category_id: String,
    #[validate(custom(function = "validate_description"))]
    pub description: Option<String>,
    /// `YYYY-MM-DD`; time-of-day is discarded.
    #[validate(custom(function = "validate_expense_date"))]
    pub expense_date: String,
}

/// Fields that passed validation, ready for storage.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpenseInput {
    pub amount: Decimal,
    pub category_id: Uuid,
    pub description: Option<String>,
    pub expense_date: NaiveDate,
}

impl ExpenseRequest {
    /// Validates every field and reports all failures at once.
    /// `category_exists` is consulted only for well-formed category ids.
    pub fn to_input(&self, category_exists: impl Fn(&Uuid) -> bool) -> Result<ExpenseInput, ValidationErrors> {
        let mut errors = self.validate().err().unwrap_or_else(ValidationErrors::new);

        let category_id = Uuid::parse_str(self.category_id.trim()).ok().filter(|id| category_exists(id));
        if category_id.is_none() && !errors.field_errors().contains_key("category_id") {
            errors.add("category_id", field_error("unknown_category", "category does not exist"));
        }

        let amount = parse_amount(&self.amount).ok();
        let expense_date = parse_expense_date(&self.expense_date).ok();

        match (amount, category_id, expense_date) {
            (Some(amount), Some(category_id), Some(expense_date)) if errors.errors().is_empty() => Ok(ExpenseInput {
                amount,
                category_id,
                description: normalize_description(self.description.as_deref()),
                expense_date,
            }),
            _ => Err(errors),
        }
    }
}

/// Error reported when storage rejects a category the registry accepted.
pub fn unknown_category_errors() -> ValidationErrors {
    let mut errors = ValidationErrors::new();
    errors.add("category_id", field_error("unknown_category", "category does not exist"));
    errors
}

fn normalize_description(description: Option<&str>) -> Option<String> {
    description.map(str::trim).filter(|d| !d.is_empty()).map(str::to_string)
}

#[derive(Serialize, Debug, Clone, JsonSchema)]
pub struct ExpenseResponse {
    pub id: Uuid,
    pub category_id: Uuid,
    pub category: CategoryResponse,
    #[serde(with = "rust_decimal::serde::float")]
    #[schemars(with = "f64")]
    pub amount: Decimal,
    pub description: Option<String>,
    pub expense_date: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Expense> for ExpenseResponse {
    fn from(expense: &Expense) -> Self {
        Self {
            id: expense.id,
            category_id: expense.category.id,
            category: CategoryResponse::from(&expense.category),
            amount: expense.amount,
            description: expense.description.clone(),
            expense_date: expense.expense_date,
            created_at: expense.created_at,
            updated_at: expense.updated_at,
        }
    }
}

#[derive(Serialize, Debug, JsonSchema)]
pub struct DeleteExpenseResponse {
    pub message: String,
}
