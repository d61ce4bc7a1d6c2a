use crate::database::expense::ExpenseRepository;
use crate::database::subscription::SubscriptionRepository;
use crate::database::user::UserRepository;
use crate::error::app_error::AppError;
use crate::models::category::CategoryResponse;
use crate::models::subscription::{Feature, SubscriptionTier};
use crate::models::summary::{
    AllTimeTotalResponse, AnalyticsPeriod, CategoryBreakdownResponse, CategoryTotalResponse, DateRange, PeriodTotalResponse, SummaryResponse,
};
use crate::models::user::UserResponse;
use crate::service::access::{accessible_features, can_access};
use crate::service::aggregation::{by_category, count_within, month_containing, share_basis_points, today_in, total_within, week_containing};
use crate::service::expense::provision_user;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use tracing::warn;

/// Timezone whose calendar decides "today" for week and month buckets.
#[derive(Debug, Clone, Copy)]
pub struct ReportingTimezone(pub Tz);

pub async fn subscription_tier<R>(repository: &R, user_id: &str) -> Result<SubscriptionTier, AppError>
where
    R: SubscriptionRepository + Sync,
{
    let raw = repository.get_subscription_tier(user_id).await?;
    Ok(SubscriptionTier::parse(raw.as_deref()))
}

/// Derived views over one caller's expenses. Nothing is cached; each call
/// reads the caller's records again.
pub struct SummaryService<'a, R> {
    repository: &'a R,
    timezone: Tz,
}

impl<'a, R> SummaryService<'a, R>
where
    R: ExpenseRepository + UserRepository + SubscriptionRepository + Sync,
{
    pub fn new(repository: &'a R, timezone: Tz) -> Self {
        Self { repository, timezone }
    }

    pub async fn summary(&self, user_id: &str, now: DateTime<Utc>) -> Result<SummaryResponse, AppError> {
        provision_user(self.repository, user_id).await?;

        let today = today_in(self.timezone, now);
        let records = self.repository.list_expenses_in_range(user_id, None).await?;
        let period = |range: DateRange| PeriodTotalResponse {
            start: range.start,
            end: range.end,
            total: total_within(&records, Some(range)),
            count: count_within(&records, Some(range)),
        };

        Ok(SummaryResponse {
            today,
            week: period(week_containing(today)),
            month: period(month_containing(today)),
            all_time: AllTimeTotalResponse {
                total: total_within(&records, None),
                count: records.len(),
            },
        })
    }

    pub async fn category_breakdown(&self, user_id: &str, period: AnalyticsPeriod, now: DateTime<Utc>) -> Result<CategoryBreakdownResponse, AppError> {
        provision_user(self.repository, user_id).await?;

        let tier = subscription_tier(self.repository, user_id).await?;
        if !can_access(tier, Feature::PremiumAnalytics) {
            warn!(user_id, ?tier, feature = Feature::PremiumAnalytics.key(), "feature denied");
            return Err(AppError::Forbidden("Premium subscription required".to_string()));
        }

        let today = today_in(self.timezone, now);
        let range = match period {
            AnalyticsPeriod::Week => Some(week_containing(today)),
            AnalyticsPeriod::Month => Some(month_containing(today)),
            AnalyticsPeriod::All => None,
        };

        let records = self.repository.list_expenses_in_range(user_id, range).await?;
        let total = total_within(&records, range);
        let categories = by_category(&records, range)
            .into_iter()
            .map(|t| CategoryTotalResponse {
                category: CategoryResponse::from(&t.category),
                share_basis_points: share_basis_points(t.total, total),
                total: t.total,
                count: t.count,
            })
            .collect();

        Ok(CategoryBreakdownResponse {
            period,
            range,
            total,
            categories,
        })
    }

    pub async fn profile(&self, user_id: &str) -> Result<UserResponse, AppError> {
        let user = provision_user(self.repository, user_id).await?;
        let tier = subscription_tier(self.repository, user_id).await?;
        Ok(UserResponse::new(&user, tier, accessible_features(tier)))
    }
}
