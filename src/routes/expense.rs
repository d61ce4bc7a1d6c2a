use crate::auth::CurrentUser;
use crate::database::postgres_repository::PostgresRepository;
use crate::error::app_error::AppError;
use crate::error::json::JsonBody;
use crate::middleware::rate_limit::RateLimit;
use crate::models::expense::{DeleteExpenseResponse, ExpenseRequest, ExpenseResponse};
use crate::models::pagination::{OffsetPage, OffsetParams};
use crate::service::category::CategoryRegistry;
use crate::service::expense::ExpenseService;
use rocket::response::status::Created;
use rocket::serde::json::Json;
use rocket::{State, delete, get, post, put};
use rocket_okapi::openapi;
use sqlx::PgPool;
use std::sync::Arc;

/// Record a new expense for the current user.
/// Field problems are reported together as 400 with per-field codes.
#[openapi(tag = "Expenses")]
#[post("/", data = "<payload>")]
pub async fn create_expense(
    pool: &State<PgPool>,
    registry: &State<Arc<CategoryRegistry>>,
    _rate_limit: RateLimit,
    current_user: CurrentUser,
    payload: JsonBody<ExpenseRequest>,
) -> Result<Created<Json<ExpenseResponse>>, AppError> {
    let repo = PostgresRepository { pool: pool.inner().clone() };
    let expense = ExpenseService::new(&repo, registry).create(&current_user.id, &payload).await?;
    // Relative to the collection URI the request was posted to.
    Ok(Created::new(expense.id.to_string()).body(Json(ExpenseResponse::from(&expense))))
}

/// List the current user's expenses, newest first.
/// `limit` defaults to 50 and is capped at 200; `offset` defaults to 0.
#[openapi(tag = "Expenses")]
#[get("/?<limit>&<offset>")]
pub async fn list_expenses(
    pool: &State<PgPool>,
    registry: &State<Arc<CategoryRegistry>>,
    _rate_limit: RateLimit,
    current_user: CurrentUser,
    limit: Option<i64>,
    offset: Option<i64>,
) -> Result<Json<OffsetPage<ExpenseResponse>>, AppError> {
    let repo = PostgresRepository { pool: pool.inner().clone() };
    let params = OffsetParams { limit, offset };
    Ok(Json(ExpenseService::new(&repo, registry).list(&current_user.id, &params).await?))
}

#[openapi(tag = "Expenses")]
#[get("/<id>")]
pub async fn get_expense(
    pool: &State<PgPool>,
    registry: &State<Arc<CategoryRegistry>>,
    _rate_limit: RateLimit,
    current_user: CurrentUser,
    id: &str,
) -> Result<Json<ExpenseResponse>, AppError> {
    let repo = PostgresRepository { pool: pool.inner().clone() };
    let expense = ExpenseService::new(&repo, registry).get(&current_user.id, id).await?;
    Ok(Json(ExpenseResponse::from(&expense)))
}

/// Replace every field of an expense. Returns 404 when the expense does not
/// exist or belongs to someone else.
#[openapi(tag = "Expenses")]
#[put("/<id>", data = "<payload>")]
pub async fn put_expense(
    pool: &State<PgPool>,
    registry: &State<Arc<CategoryRegistry>>,
    _rate_limit: RateLimit,
    current_user: CurrentUser,
    id: &str,
    payload: JsonBody<ExpenseRequest>,
) -> Result<Json<ExpenseResponse>, AppError> {
    let repo = PostgresRepository { pool: pool.inner().clone() };
    let expense = ExpenseService::new(&repo, registry).update(&current_user.id, id, &payload).await?;
    Ok(Json(ExpenseResponse::from(&expense)))
}

#[openapi(tag = "Expenses")]
#[delete("/<id>")]
pub async fn delete_expense(
    pool: &State<PgPool>,
    registry: &State<Arc<CategoryRegistry>>,
    _rate_limit: RateLimit,
    current_user: CurrentUser,
    id: &str,
) -> Result<Json<DeleteExpenseResponse>, AppError> {
    let repo = PostgresRepository { pool: pool.inner().clone() };
    ExpenseService::new(&repo, registry).delete(&current_user.id, id).await?;
    Ok(Json(DeleteExpenseResponse {
        message: "Expense deleted".to_string(),
    }))
}

pub fn routes() -> (Vec<rocket::Route>, okapi::openapi3::OpenApi) {
    rocket_okapi::openapi_get_routes_spec![create_expense, list_expenses, get_expense, put_expense, delete_expense]
}
