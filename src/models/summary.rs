use crate::models::category::{Category, CategoryResponse};
use chrono::NaiveDate;
use rocket::serde::Serialize;
use rust_decimal::Decimal;
use schemars::JsonSchema;

/// Closed interval of calendar days; both ends are included.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq, JsonSchema)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum AnalyticsPeriod {
    Week,
    Month,
    All,
}

impl AnalyticsPeriod {
    pub fn parse(value: Option<&str>) -> Option<Self> {
        match value.map(str::trim) {
            None | Some("") | Some("month") => Some(AnalyticsPeriod::Month),
            Some("week") => Some(AnalyticsPeriod::Week),
            Some("all") => Some(AnalyticsPeriod::All),
            Some(_) => None,
        }
    }
}

/// Sum and record count of one category within a period.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryTotal {
    pub category: Category,
    pub total: Decimal,
    pub count: usize,
}

#[derive(Serialize, Debug, JsonSchema)]
pub struct PeriodTotalResponse {
    pub start: NaiveDate,
    pub end: NaiveDate,
    #[serde(with = "rust_decimal::serde::float")]
    #[schemars(with = "f64")]
    pub total: Decimal,
    pub count: usize,
}

#[derive(Serialize, Debug, JsonSchema)]
pub struct AllTimeTotalResponse {
    #[serde(with = "rust_decimal::serde::float")]
    #[schemars(with = "f64")]
    pub total: Decimal,
    pub count: usize,
}

/// Weekly, monthly and all-time totals for the dashboard cards.
#[derive(Serialize, Debug, JsonSchema)]
pub struct SummaryResponse {
    pub today: NaiveDate,
    pub week: PeriodTotalResponse,
    pub month: PeriodTotalResponse,
    pub all_time: AllTimeTotalResponse,
}

#[derive(Serialize, Debug, JsonSchema)]
pub struct CategoryTotalResponse {
    pub category: CategoryResponse,
    #[serde(with = "rust_decimal::serde::float")]
    #[schemars(with = "f64")]
    pub total: Decimal,
    pub count: usize,
    /// Share of the period total in basis points (2534 = 25.34%).
    pub share_basis_points: i64,
}

#[derive(Serialize, Debug, JsonSchema)]
pub struct CategoryBreakdownResponse {
    pub period: AnalyticsPeriod,
    /// Absent for `all`.
    pub range: Option<DateRange>,
    #[serde(with = "rust_decimal::serde::float")]
    #[schemars(with = "f64")]
    pub total: Decimal,
    pub categories: Vec<CategoryTotalResponse>,
}
