use crate::database::category::CategoryRepository;
use crate::error::app_error::AppError;
use crate::models::category::Category;
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;
use tracing::info;
use uuid::Uuid;

static SLUG_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").expect("slug pattern is valid"));

/// Fixed set of expense categories, loaded once at startup and shared
/// read-only between requests.
#[derive(Debug, Clone)]
pub struct CategoryRegistry {
    categories: Vec<Category>,
    ids: HashSet<Uuid>,
}

impl CategoryRegistry {
    /// Rejects duplicate ids, duplicate slugs and slugs that are not lowercase kebab-case.
    /// Categories are kept in `sort_order`; ties keep their input order.
    pub fn new(mut categories: Vec<Category>) -> Result<Self, AppError> {
        categories.sort_by_key(|c| c.sort_order);

        let mut slugs = HashSet::new();
        let mut ids = HashSet::with_capacity(categories.len());
        for category in &categories {
            if !SLUG_PATTERN.is_match(&category.slug) {
                return Err(AppError::ConfigurationError(format!("Invalid category slug: {}", category.slug)));
            }
            if !slugs.insert(category.slug.as_str()) {
                return Err(AppError::ConfigurationError(format!("Duplicate category slug: {}", category.slug)));
            }
            if !ids.insert(category.id) {
                return Err(AppError::ConfigurationError(format!("Duplicate category id: {}", category.id)));
            }
        }

        Ok(Self { categories, ids })
    }

    pub async fn load<R: CategoryRepository + Sync>(repository: &R) -> Result<Self, AppError> {
        let registry = Self::new(repository.list_categories().await?)?;
        info!(categories = registry.count(), "category registry loaded");
        Ok(registry)
    }

    pub fn list(&self) -> &[Category] {
        &self.categories
    }

    pub fn by_slug(&self, slug: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.slug == slug)
    }

    pub fn contains(&self, id: &Uuid) -> bool {
        self.ids.contains(id)
    }

    pub fn count(&self) -> usize {
        self.categories.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{sample_categories, sample_category};

    #[test]
    fn categories_are_ordered_by_sort_order() {
        let mut categories = sample_categories();
        categories.reverse();
        let registry = CategoryRegistry::new(categories).unwrap();

        let slugs: Vec<&str> = registry.list().iter().map(|c| c.slug.as_str()).collect();
        assert_eq!(slugs.first(), Some(&"food"));
        assert_eq!(slugs.last(), Some(&"other"));
        assert_eq!(registry.count(), 9);
    }

    #[test]
    fn equal_sort_order_keeps_input_order() {
        let categories = vec![
            sample_category("zeta", 2),
            sample_category("beta", 1),
            sample_category("alpha", 2),
            sample_category("mid", 2),
        ];
        let registry = CategoryRegistry::new(categories).unwrap();

        let slugs: Vec<&str> = registry.list().iter().map(|c| c.slug.as_str()).collect();
        assert_eq!(slugs, vec!["beta", "zeta", "alpha", "mid"]);
    }

    #[test]
    fn lookup_by_id_and_slug() {
        let registry = CategoryRegistry::new(sample_categories()).unwrap();
        let transport = registry.by_slug("transport").unwrap().clone();

        assert_eq!(transport.sort_order, 2);
        assert!(registry.contains(&transport.id));
        assert!(!registry.contains(&Uuid::new_v4()));
        assert!(registry.by_slug("Transport").is_none());
    }

    #[test]
    fn duplicate_slugs_are_rejected() {
        let categories = vec![sample_category("food", 1), sample_category("food", 2)];
        assert!(matches!(CategoryRegistry::new(categories), Err(AppError::ConfigurationError(_))));
    }

    #[test]
    fn malformed_slugs_are_rejected() {
        for slug in ["", "Food", "fast food", "-food", "food-"] {
            let result = CategoryRegistry::new(vec![sample_category(slug, 1)]);
            assert!(result.is_err(), "slug {slug:?} should be rejected");
        }
        assert!(CategoryRegistry::new(vec![sample_category("eating-out", 1)]).is_ok());
    }
}
