//! Totals derived from a user's expense records.
//!
//! Everything here is a pure function of the records and a reference day.
//! Intervals are closed: an expense dated on either boundary day is counted.

use crate::models::expense::Expense;
use crate::models::summary::{CategoryTotal, DateRange};
use chrono::{DateTime, Datelike, Days, Months, NaiveDate, Utc};
use chrono_tz::Tz;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use std::collections::HashMap;

/// Records dated within `range`; `None` selects every record.
pub fn within(records: &[Expense], range: Option<DateRange>) -> impl Iterator<Item = &Expense> {
    records.iter().filter(move |e| range.is_none_or(|r| r.contains(e.expense_date)))
}

pub fn total_within(records: &[Expense], range: Option<DateRange>) -> Decimal {
    within(records, range).map(|e| e.amount).sum()
}

pub fn count_within(records: &[Expense], range: Option<DateRange>) -> usize {
    within(records, range).count()
}

/// Per-category sums, largest first. Equal totals fall back to the
/// category display order, so the result does not depend on record order.
pub fn by_category(records: &[Expense], range: Option<DateRange>) -> Vec<CategoryTotal> {
    let mut groups: HashMap<_, CategoryTotal> = HashMap::new();
    for expense in within(records, range) {
        let entry = groups.entry(expense.category.id).or_insert_with(|| CategoryTotal {
            category: expense.category.clone(),
            total: Decimal::ZERO,
            count: 0,
        });
        entry.total += expense.amount;
        entry.count += 1;
    }

    let mut totals: Vec<CategoryTotal> = groups.into_values().collect();
    totals.sort_by(|a, b| {
        b.total
            .cmp(&a.total)
            .then(a.category.sort_order.cmp(&b.category.sort_order))
            .then(a.category.id.cmp(&b.category.id))
    });
    totals
}

/// Monday through Sunday of the ISO week containing `day`.
pub fn week_containing(day: NaiveDate) -> DateRange {
    let from_monday = u64::from(day.weekday().num_days_from_monday());
    let start = day.checked_sub_days(Days::new(from_monday)).unwrap_or(day);
    let end = start.checked_add_days(Days::new(6)).unwrap_or(day);
    DateRange::new(start, end)
}

/// First through last calendar day of the month containing `day`.
pub fn month_containing(day: NaiveDate) -> DateRange {
    let start = day.with_day(1).unwrap_or(day);
    let end = start
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .unwrap_or(day);
    DateRange::new(start, end)
}

/// Calendar day of `now` as observed in `timezone`.
pub fn today_in(timezone: Tz, now: DateTime<Utc>) -> NaiveDate {
    now.with_timezone(&timezone).date_naive()
}

/// `part / total` in basis points, rounded half away from zero. Zero when `total` is zero.
pub fn share_basis_points(part: Decimal, total: Decimal) -> i64 {
    if total.is_zero() {
        return 0;
    }
    (part * Decimal::from(10_000) / total)
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .unwrap_or(0)
}
