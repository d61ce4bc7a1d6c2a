use rocket::serde::{Deserialize, Serialize};
use schemars::JsonSchema;

/// Plan as recorded by the billing system.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionTier {
    #[default]
    Free,
    Premium,
}

impl SubscriptionTier {
    /// Absent, blank and unrecognised values all mean `Free`.
    pub fn parse(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
            Some("premium") => SubscriptionTier::Premium,
            _ => SubscriptionTier::Free,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum Feature {
    ExpenseTracking,
    Summary,
    PremiumAnalytics,
}

impl Feature {
    pub const ALL: [Feature; 3] = [Feature::ExpenseTracking, Feature::Summary, Feature::PremiumAnalytics];

    pub fn key(self) -> &'static str {
        match self {
            Feature::ExpenseTracking => "expense-tracking",
            Feature::Summary => "summary",
            Feature::PremiumAnalytics => "premium-analytics",
        }
    }

    /// Whether the feature is restricted to paid tiers.
    pub fn is_gated(self) -> bool {
        matches!(self, Feature::PremiumAnalytics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_is_fail_closed() {
        assert_eq!(SubscriptionTier::parse(None), SubscriptionTier::Free);
        assert_eq!(SubscriptionTier::parse(Some("")), SubscriptionTier::Free);
        assert_eq!(SubscriptionTier::parse(Some("gold")), SubscriptionTier::Free);
        assert_eq!(SubscriptionTier::parse(Some("free")), SubscriptionTier::Free);
    }

    #[test]
    fn parse_accepts_premium_case_insensitively() {
        assert_eq!(SubscriptionTier::parse(Some("premium")), SubscriptionTier::Premium);
        assert_eq!(SubscriptionTier::parse(Some(" Premium ")), SubscriptionTier::Premium);
    }

    #[test]
    fn feature_keys_match_serialized_form() {
        for feature in Feature::ALL {
            let json = serde_json::to_string(&feature).expect("serializable");
            assert_eq!(json, format!("\"{}\"", feature.key()));
        }
    }

    #[test]
    fn only_premium_analytics_is_gated() {
        assert!(Feature::PremiumAnalytics.is_gated());
        assert!(!Feature::Summary.is_gated());
        assert!(!Feature::ExpenseTracking.is_gated());
    }
}
