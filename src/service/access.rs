use crate::models::subscription::{Feature, SubscriptionTier};

/// Free users see only ungated features; premium users see everything.
pub fn can_access(tier: SubscriptionTier, feature: Feature) -> bool {
    match tier {
        SubscriptionTier::Premium => true,
        SubscriptionTier::Free => !feature.is_gated(),
    }
}

pub fn accessible_features(tier: SubscriptionTier) -> Vec<Feature> {
    Feature::ALL.into_iter().filter(|&feature| can_access(tier, feature)).collect()
}
