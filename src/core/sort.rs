//! Presentation ordering with a single active sort column.

use crate::core::subscription::Subscription;
use anyhow::anyhow;
use std::cmp::Ordering;
use std::fmt::Display;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortField {
    ServiceName,
    Category,
    Amount,
    NextBillingDate,
    Status,
}

impl SortField {
    fn compare(&self, a: &Subscription, b: &Subscription) -> Ordering {
        match self {
            SortField::ServiceName => compare_ignore_case(&a.service_name, &b.service_name),
            SortField::Category => compare_ignore_case(a.category.as_str(), b.category.as_str()),
            SortField::Amount => a.amount.total_cmp(&b.amount),
            SortField::NextBillingDate => a.next_billing_date.cmp(&b.next_billing_date),
            SortField::Status => compare_ignore_case(a.status.as_str(), b.status.as_str()),
        }
    }
}

impl Display for SortField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                SortField::ServiceName => "service-name",
                SortField::Category => "category",
                SortField::Amount => "amount",
                SortField::NextBillingDate => "next-billing-date",
                SortField::Status => "status",
            }
        )
    }
}

impl FromStr for SortField {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "service-name" | "service" | "name" => Ok(SortField::ServiceName),
            "category" => Ok(SortField::Category),
            "amount" => Ok(SortField::Amount),
            "next-billing-date" | "next-billing" | "date" => Ok(SortField::NextBillingDate),
            "status" => Ok(SortField::Status),
            _ => Err(anyhow!("Invalid sort field: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

/// The active sort column. Both parts are `None` when unsorted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SortState {
    pub field: Option<SortField>,
    pub direction: Option<SortDirection>,
}

impl SortState {
    pub fn new(field: SortField, direction: SortDirection) -> Self {
        Self {
            field: Some(field),
            direction: Some(direction),
        }
    }

    /// Activates `field`: ascending, then descending, then back to unsorted.
    /// Switching to another field starts it again at ascending.
    pub fn toggle(&mut self, field: SortField) {
        *self = if self.field != Some(field) {
            SortState::new(field, SortDirection::Asc)
        } else {
            match self.direction {
                None => SortState::new(field, SortDirection::Asc),
                Some(SortDirection::Asc) => SortState::new(field, SortDirection::Desc),
                Some(SortDirection::Desc) => SortState::default(),
            }
        };
    }

    pub fn apply(&self, subscriptions: &[Subscription]) -> Vec<Subscription> {
        sort_subscriptions(subscriptions, self.field, self.direction)
    }
}

fn compare_ignore_case(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase())
}

/// Returns a sorted copy. Without a field or direction the input order is kept.
pub fn sort_subscriptions(
    subscriptions: &[Subscription],
    field: Option<SortField>,
    direction: Option<SortDirection>,
) -> Vec<Subscription> {
    let mut sorted = subscriptions.to_vec();
    let (Some(field), Some(direction)) = (field, direction) else {
        return sorted;
    };

    // stable: ties keep their relative input order in both directions
    match direction {
        SortDirection::Asc => sorted.sort_by(|a, b| field.compare(a, b)),
        SortDirection::Desc => sorted.sort_by(|a, b| field.compare(b, a)),
    }
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::subscription::fixtures::subscription;
    use crate::core::subscription::{Category, SubscriptionStatus};
    use chrono::NaiveDate;

    fn names(subs: &[Subscription]) -> Vec<&str> {
        subs.iter().map(|s| s.service_name.as_str()).collect()
    }

    #[test]
    fn test_toggle_cycles_through_three_states() {
        let subs = vec![
            subscription("1", "C", 1.0),
            subscription("2", "A", 1.0),
            subscription("3", "B", 1.0),
        ];
        let mut state = SortState::default();

        state.toggle(SortField::ServiceName);
        assert_eq!(names(&state.apply(&subs)), vec!["A", "B", "C"]);

        state.toggle(SortField::ServiceName);
        assert_eq!(names(&state.apply(&subs)), vec!["C", "B", "A"]);

        state.toggle(SortField::ServiceName);
        assert_eq!(state, SortState::default());
        assert_eq!(names(&state.apply(&subs)), vec!["C", "A", "B"]);
    }

    #[test]
    fn test_switching_field_restarts_at_ascending() {
        let mut state = SortState::default();
        state.toggle(SortField::Amount);
        state.toggle(SortField::Amount);
        assert_eq!(state.direction, Some(SortDirection::Desc));

        state.toggle(SortField::Status);
        assert_eq!(state, SortState::new(SortField::Status, SortDirection::Asc));
    }

    #[test]
    fn test_service_name_is_case_insensitive() {
        let subs = vec![
            subscription("1", "spotify", 1.0),
            subscription("2", "Adobe", 1.0),
            subscription("3", "apple Music", 1.0),
        ];
        let sorted = sort_subscriptions(
            &subs,
            Some(SortField::ServiceName),
            Some(SortDirection::Asc),
        );
        assert_eq!(names(&sorted), vec!["Adobe", "apple Music", "spotify"]);
    }

    #[test]
    fn test_amount_sorts_numerically() {
        let subs = vec![
            subscription("1", "A", 100.0),
            subscription("2", "B", 9.99),
            subscription("3", "C", 25.0),
        ];
        let asc = sort_subscriptions(&subs, Some(SortField::Amount), Some(SortDirection::Asc));
        assert_eq!(names(&asc), vec!["B", "C", "A"]);
        let desc = sort_subscriptions(&subs, Some(SortField::Amount), Some(SortDirection::Desc));
        assert_eq!(names(&desc), vec!["A", "C", "B"]);
    }

    #[test]
    fn test_date_category_and_status_fields() {
        let mut a = subscription("1", "A", 1.0);
        a.next_billing_date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        a.category = Category::Utilities;
        a.status = SubscriptionStatus::Trial;
        let mut b = subscription("2", "B", 1.0);
        b.next_billing_date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        b.category = Category::Education;
        b.status = SubscriptionStatus::Active;
        let subs = vec![a, b];

        let by_date = SortState::new(SortField::NextBillingDate, SortDirection::Asc);
        assert_eq!(names(&by_date.apply(&subs)), vec!["B", "A"]);
        let by_category = SortState::new(SortField::Category, SortDirection::Asc);
        assert_eq!(names(&by_category.apply(&subs)), vec!["B", "A"]);
        let by_status = SortState::new(SortField::Status, SortDirection::Desc);
        assert_eq!(names(&by_status.apply(&subs)), vec!["A", "B"]);
    }

    #[test]
    fn test_ties_keep_input_order() {
        let subs = vec![
            subscription("1", "First", 10.0),
            subscription("2", "Second", 10.0),
            subscription("3", "Cheap", 1.0),
        ];
        let asc = sort_subscriptions(&subs, Some(SortField::Amount), Some(SortDirection::Asc));
        assert_eq!(names(&asc), vec!["Cheap", "First", "Second"]);
        let desc = sort_subscriptions(&subs, Some(SortField::Amount), Some(SortDirection::Desc));
        assert_eq!(names(&desc), vec!["First", "Second", "Cheap"]);
    }

    #[test]
    fn test_missing_direction_keeps_input_order() {
        let subs = vec![subscription("1", "Z", 1.0), subscription("2", "A", 1.0)];
        assert_eq!(sort_subscriptions(&subs, Some(SortField::ServiceName), None), subs);
        assert_eq!(sort_subscriptions(&subs, None, Some(SortDirection::Asc)), subs);
    }

    #[test]
    fn test_field_parsing() {
        assert_eq!("name".parse::<SortField>().unwrap(), SortField::ServiceName);
        assert_eq!(
            "next-billing-date".parse::<SortField>().unwrap(),
            SortField::NextBillingDate
        );
        assert!("price".parse::<SortField>().is_err());
    }
}
