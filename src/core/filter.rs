//! The overview filter: search, attribute filters and date-window quick filters.

use crate::core::calendar::Calendar;
use crate::core::subscription::{BillingFrequency, Category, Subscription, SubscriptionStatus};
use anyhow::anyhow;
use std::fmt::Display;
use std::str::FromStr;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QuickFilter {
    #[default]
    All,
    Today,
    Upcoming,
    ThisWeek,
    ThisMonth,
}

impl QuickFilter {
    pub fn matches(&self, sub: &Subscription, calendar: &Calendar) -> bool {
        let date = sub.next_billing_date;
        match self {
            QuickFilter::All => true,
            QuickFilter::Today => calendar.is_today(date),
            QuickFilter::Upcoming => calendar.is_upcoming(date),
            QuickFilter::ThisWeek => calendar.is_this_week(date),
            QuickFilter::ThisMonth => calendar.is_this_month(date),
        }
    }
}

impl Display for QuickFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                QuickFilter::All => "all",
                QuickFilter::Today => "today",
                QuickFilter::Upcoming => "upcoming",
                QuickFilter::ThisWeek => "this-week",
                QuickFilter::ThisMonth => "this-month",
            }
        )
    }
}

impl FromStr for QuickFilter {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all" => Ok(QuickFilter::All),
            "today" => Ok(QuickFilter::Today),
            "upcoming" => Ok(QuickFilter::Upcoming),
            "this-week" | "week" => Ok(QuickFilter::ThisWeek),
            "this-month" | "month" => Ok(QuickFilter::ThisMonth),
            _ => Err(anyhow!("Invalid quick filter: {}", s)),
        }
    }
}

/// Criteria of the overview filter. `None` on a dimension means "all".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterOptions {
    pub category: Option<Category>,
    pub status: Option<SubscriptionStatus>,
    pub billing_frequency: Option<BillingFrequency>,
    /// Family member id, checked against the legacy single owner only.
    pub family_member: Option<String>,
    pub reimbursable: Option<bool>,
    pub quick_filter: QuickFilter,
    pub search_query: Option<String>,
}

impl FilterOptions {
    fn normalized_query(&self) -> Option<String> {
        self.search_query
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .map(str::to_lowercase)
    }
}

fn matches_query(sub: &Subscription, query: &str) -> bool {
    sub.service_name.to_lowercase().contains(query)
        || sub.category.as_str().contains(query)
        || sub
            .notes
            .as_deref()
            .is_some_and(|notes| notes.to_lowercase().contains(query))
}

fn matches_attributes(sub: &Subscription, filters: &FilterOptions) -> bool {
    filters.category.is_none_or(|c| sub.category == c)
        && filters.status.is_none_or(|s| sub.status == s)
        && filters
            .billing_frequency
            .is_none_or(|f| sub.billing_frequency == f)
        && filters
            .family_member
            .as_deref()
            .is_none_or(|member| sub.family_member.as_deref() == Some(member))
        && filters.reimbursable.is_none_or(|r| sub.reimbursable == r)
}

/// Applies every provided criterion (AND) and returns the matches in input order.
///
/// The quick filter is evaluated against `calendar.today`. The family member
/// criterion only looks at the legacy owner field, so subscriptions owned
/// purely through split allocations never match it.
pub fn filter_subscriptions(
    subscriptions: &[Subscription],
    filters: &FilterOptions,
    calendar: &Calendar,
) -> Vec<Subscription> {
    let query = filters.normalized_query();

    let filtered: Vec<Subscription> = subscriptions
        .iter()
        .filter(|sub| query.as_deref().is_none_or(|q| matches_query(sub, q)))
        .filter(|sub| matches_attributes(sub, filters))
        .filter(|sub| filters.quick_filter.matches(sub, calendar))
        .cloned()
        .collect();

    debug!(
        total = subscriptions.len(),
        matched = filtered.len(),
        "Filtered subscriptions"
    );
    filtered
}

/// Orders subscriptions by next billing date, soonest first.
pub fn sort_by_next_billing(subscriptions: &[Subscription]) -> Vec<Subscription> {
    let mut sorted = subscriptions.to_vec();
    sorted.sort_by_key(|sub| sub.next_billing_date);
    sorted
}
