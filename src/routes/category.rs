use crate::error::app_error::AppError;
use crate::models::category::CategoryResponse;
use crate::service::category::CategoryRegistry;
use rocket::serde::json::Json;
use rocket::{State, get};
use rocket_okapi::openapi;
use std::sync::Arc;

/// List every category in display order.
#[openapi(tag = "Categories")]
#[get("/")]
pub async fn list_categories(registry: &State<Arc<CategoryRegistry>>) -> Json<Vec<CategoryResponse>> {
    Json(registry.list().iter().map(CategoryResponse::from).collect())
}

#[openapi(tag = "Categories")]
#[get("/<slug>")]
pub async fn get_category(registry: &State<Arc<CategoryRegistry>>, slug: &str) -> Result<Json<CategoryResponse>, AppError> {
    registry
        .by_slug(slug)
        .map(|category| Json(CategoryResponse::from(category)))
        .ok_or_else(|| AppError::NotFound("Category not found".to_string()))
}

pub fn routes() -> (Vec<rocket::Route>, okapi::openapi3::OpenApi) {
    rocket_okapi::openapi_get_routes_spec![list_categories, get_category]
}
