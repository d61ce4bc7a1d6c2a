use crate::models::subscription::{Feature, SubscriptionTier};
use chrono::{DateTime, Utc};
use rocket::serde::Serialize;
use schemars::JsonSchema;

/// A caller known to this service. `id` is the identity provider's subject id.
#[derive(Serialize, Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Address stored for lazily provisioned users until profile sync exists.
pub fn placeholder_email(user_id: &str) -> String {
    format!("user_{}@example.com", user_id)
}

#[derive(Serialize, Debug, JsonSchema)]
pub struct UserResponse {
    pub id: String,
    pub email: String,
    pub name: Option<String>,
    pub tier: SubscriptionTier,
    pub features: Vec<Feature>,
}

impl UserResponse {
    pub fn new(user: &User, tier: SubscriptionTier, features: Vec<Feature>) -> Self {
        Self {
            id: user.id.clone(),
            email: user.email.clone(),
            name: user.name.clone(),
            tier,
            features,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholder_email_embeds_subject() {
        assert_eq!(placeholder_email("user_2xyz"), "user_user_2xyz@example.com");
    }
}
