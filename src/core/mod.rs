//! Core business logic: the subscription model and the pure functions that
//! aggregate, filter, evaluate and sort it.

pub mod calendar;
pub mod config;
pub mod custom_view;
pub mod filter;
pub mod frequency;
pub mod log;
pub mod metrics;
pub mod sort;
pub mod subscription;

// Re-export main types for cleaner imports
pub use calendar::{Calendar, WeekStart};
pub use custom_view::{
    CustomView, CustomViewFilters, FamilyMemberFilter, FamilyMemberFilterType,
    apply_custom_view_filters,
};
pub use filter::{FilterOptions, QuickFilter, filter_subscriptions, sort_by_next_billing};
pub use frequency::normalize_to_monthly;
pub use metrics::{CategorySpending, DashboardMetrics, calculate_metrics, spending_by_category};
pub use sort::{SortDirection, SortField, SortState, sort_subscriptions};
pub use subscription::{
    BillingFrequency, Category, FamilyMember, Ownership, SplitAllocation, Subscription,
    SubscriptionStatus,
};
