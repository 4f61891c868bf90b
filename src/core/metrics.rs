//! Provides the dashboard aggregates computed over a subscription snapshot.
use crate::core::calendar::is_upcoming;
use crate::core::frequency::normalize_to_monthly;
use crate::core::subscription::{Category, Subscription};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::HashMap;
use tracing::debug;

/// Derived spending figures. Never stored, recomputed on every read.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardMetrics {
    pub monthly_spend: f64,
    pub monthly_spend_reimbursable: f64,
    pub monthly_spend_out_of_pocket: f64,
    pub lifetime_purchases: f64,
    pub lifetime_purchases_count: usize,
    pub annual_projection: f64,
    pub annual_projection_reimbursable: f64,
    pub active_subscriptions: usize,
    pub upcoming_renewals: usize,
}

/// Monthly spend attributed to one category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategorySpending {
    pub category: Category,
    pub amount: f64,
    pub percentage: f64,
}

/// Calculates all dashboard metrics from a subscription snapshot.
///
/// Active and one-time subscriptions are selected independently: a one-time
/// purchase counts towards lifetime purchases whatever its status, and never
/// towards monthly spend. `today` anchors the upcoming renewal window.
pub fn calculate_metrics(subscriptions: &[Subscription], today: NaiveDate) -> DashboardMetrics {
    let mut metrics = DashboardMetrics::default();

    for sub in subscriptions {
        if sub.is_one_time() {
            metrics.lifetime_purchases += sub.amount;
            metrics.lifetime_purchases_count += 1;
        }

        if !sub.is_active() {
            continue;
        }
        metrics.active_subscriptions += 1;
        if is_upcoming(sub.next_billing_date, today) {
            metrics.upcoming_renewals += 1;
        }
        if sub.is_one_time() {
            continue;
        }

        let monthly_amount = normalize_to_monthly(sub.amount, sub.billing_frequency);
        metrics.monthly_spend += monthly_amount;
        if sub.reimbursable {
            metrics.monthly_spend_reimbursable += monthly_amount;
        }
    }

    metrics.monthly_spend_out_of_pocket =
        metrics.monthly_spend - metrics.monthly_spend_reimbursable;
    // Annual plans are already folded into monthly spend, so no extra term here.
    metrics.annual_projection = metrics.monthly_spend * 12.0;
    metrics.annual_projection_reimbursable = metrics.monthly_spend_reimbursable * 12.0;

    debug!(
        count = subscriptions.len(),
        monthly_spend = metrics.monthly_spend,
        active = metrics.active_subscriptions,
        "Calculated dashboard metrics"
    );
    metrics
}

/// Breaks the monthly spend of active subscriptions down by category.
///
/// Sorted by amount, largest first. Returns nothing when there is no spend to
/// attribute.
pub fn spending_by_category(subscriptions: &[Subscription]) -> Vec<CategorySpending> {
    let mut totals: HashMap<Category, f64> = HashMap::new();
    let mut order: Vec<Category> = Vec::new();

    for sub in subscriptions.iter().filter(|s| s.is_active()) {
        let monthly_amount = normalize_to_monthly(sub.amount, sub.billing_frequency);
        if !totals.contains_key(&sub.category) {
            order.push(sub.category);
        }
        *totals.entry(sub.category).or_default() += monthly_amount;
    }

    let total: f64 = totals.values().sum();
    if total <= 0.0 {
        return Vec::new();
    }

    let mut breakdown: Vec<CategorySpending> = order
        .into_iter()
        .map(|category| {
            let amount = totals[&category];
            CategorySpending {
                category,
                amount,
                percentage: amount / total * 100.0,
            }
        })
        .collect();
    breakdown.sort_by(|a, b| b.amount.total_cmp(&a.amount));
    breakdown
}
