use crate::auth::CurrentUser;
use crate::database::postgres_repository::PostgresRepository;
use crate::error::app_error::AppError;
use crate::middleware::rate_limit::RateLimit;
use crate::models::summary::{AnalyticsPeriod, CategoryBreakdownResponse, SummaryResponse};
use crate::service::summary::{ReportingTimezone, SummaryService};
use chrono::Utc;
use rocket::serde::json::Json;
use rocket::{State, get};
use rocket_okapi::openapi;
use sqlx::PgPool;

/// Weekly (Monday to Sunday), monthly and all-time totals for the current user.
#[openapi(tag = "Summary")]
#[get("/")]
pub async fn get_summary(
    pool: &State<PgPool>,
    timezone: &State<ReportingTimezone>,
    _rate_limit: RateLimit,
    current_user: CurrentUser,
) -> Result<Json<SummaryResponse>, AppError> {
    let repo = PostgresRepository { pool: pool.inner().clone() };
    let service = SummaryService::new(&repo, timezone.0);
    Ok(Json(service.summary(&current_user.id, Utc::now()).await?))
}

/// Per-category totals for `period` (`week`, `month` or `all`; default `month`).
/// Shares are in basis points (2534 = 25.34%). Premium only: other tiers get 403.
#[openapi(tag = "Analytics")]
#[get("/categories?<period>")]
pub async fn get_category_breakdown(
    pool: &State<PgPool>,
    timezone: &State<ReportingTimezone>,
    _rate_limit: RateLimit,
    current_user: CurrentUser,
    period: Option<String>,
) -> Result<Json<CategoryBreakdownResponse>, AppError> {
    let period = AnalyticsPeriod::parse(period.as_deref()).ok_or_else(|| AppError::BadRequest("period must be one of: week, month, all".to_string()))?;

    let repo = PostgresRepository { pool: pool.inner().clone() };
    let service = SummaryService::new(&repo, timezone.0);
    Ok(Json(service.category_breakdown(&current_user.id, period, Utc::now()).await?))
}

pub fn routes() -> (Vec<rocket::Route>, okapi::openapi3::OpenApi) {
    rocket_okapi::openapi_get_routes_spec![get_summary]
}

pub fn analytics_routes() -> (Vec<rocket::Route>, okapi::openapi3::OpenApi) {
    rocket_okapi::openapi_get_routes_spec![get_category_breakdown]
}
