use rocket::serde::Serialize;
use schemars::JsonSchema;
use uuid::Uuid;

/// Seeded reference data; never written by this service.
#[derive(Serialize, Debug, Clone, PartialEq, Eq, Default, sqlx::FromRow)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub icon: Option<String>,
    pub color: Option<String>,
    pub sort_order: i32,
}

#[derive(Serialize, Debug, Clone, PartialEq, JsonSchema)]
pub struct CategoryResponse {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub icon: Option<String>,
    pub color: Option<String>,
    pub sort_order: i32,
}

impl From<&Category> for CategoryResponse {
    fn from(category: &Category) -> Self {
        Self {
            id: category.id,
            name: category.name.clone(),
            slug: category.slug.clone(),
            icon: category.icon.clone(),
            color: category.color.clone(),
            sort_order: category.sort_order,
        }
    }
}
