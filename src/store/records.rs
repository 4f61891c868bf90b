//! Input records for store mutations and the validation applied to them.

use crate::core::subscription::{
    BillingFrequency, Category, FamilyMember, SplitAllocation, Subscription, SubscriptionStatus,
};
use anyhow::{Result, bail};
use chrono::{DateTime, NaiveDate, Utc};
use std::collections::HashSet;

const PERCENTAGE_TOLERANCE: f64 = 0.01;

/// A subscription as entered by the user, before an id and timestamps exist.
#[derive(Debug, Clone, PartialEq)]
pub struct NewSubscription {
    pub service_name: String,
    pub amount: f64,
    pub billing_frequency: BillingFrequency,
    pub next_billing_date: NaiveDate,
    pub category: Category,
    pub status: SubscriptionStatus,
    pub family_member: Option<String>,
    pub split_allocations: Option<Vec<SplitAllocation>>,
    pub payment_method: Option<String>,
    pub auto_renew: bool,
    pub reimbursable: bool,
    pub notes: Option<String>,
    pub icon: Option<String>,
}

impl NewSubscription {
    pub fn new(
        service_name: impl Into<String>,
        amount: f64,
        billing_frequency: BillingFrequency,
        next_billing_date: NaiveDate,
    ) -> Self {
        Self {
            service_name: service_name.into(),
            amount,
            billing_frequency,
            next_billing_date,
            category: Category::Other,
            status: SubscriptionStatus::Active,
            family_member: None,
            split_allocations: None,
            payment_method: None,
            auto_renew: true,
            reimbursable: false,
            notes: None,
            icon: None,
        }
    }

    pub(crate) fn into_subscription(self, id: String, now: DateTime<Utc>) -> Subscription {
        Subscription {
            id,
            service_name: self.service_name.trim().to_string(),
            amount: self.amount,
            billing_frequency: self.billing_frequency,
            next_billing_date: self.next_billing_date,
            category: self.category,
            family_member: self.family_member,
            split_allocations: self.split_allocations,
            status: self.status,
            payment_method: self.payment_method,
            auto_renew: self.auto_renew,
            reimbursable: self.reimbursable,
            notes: self.notes,
            icon: self.icon,
            created_at: now,
            updated_at: now,
        }
    }
}

/// A partial update. `None` leaves a field untouched; for optional fields
/// `Some(None)` clears the value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubscriptionPatch {
    pub service_name: Option<String>,
    pub amount: Option<f64>,
    pub billing_frequency: Option<BillingFrequency>,
    pub next_billing_date: Option<NaiveDate>,
    pub category: Option<Category>,
    pub status: Option<SubscriptionStatus>,
    pub family_member: Option<Option<String>>,
    pub split_allocations: Option<Option<Vec<SplitAllocation>>>,
    pub payment_method: Option<Option<String>>,
    pub auto_renew: Option<bool>,
    pub reimbursable: Option<bool>,
    pub notes: Option<Option<String>>,
    pub icon: Option<Option<String>>,
}

impl SubscriptionPatch {
    pub fn is_empty(&self) -> bool {
        *self == SubscriptionPatch::default()
    }

    /// Produces the updated record; `base` is left as is. The id and creation
    /// time are never changed.
    pub fn apply(&self, base: &Subscription, now: DateTime<Utc>) -> Subscription {
        let mut updated = base.clone();
        if let Some(name) = &self.service_name {
            updated.service_name = name.trim().to_string();
        }
        if let Some(amount) = self.amount {
            updated.amount = amount;
        }
        if let Some(frequency) = self.billing_frequency {
            updated.billing_frequency = frequency;
        }
        if let Some(date) = self.next_billing_date {
            updated.next_billing_date = date;
        }
        if let Some(category) = self.category {
            updated.category = category;
        }
        if let Some(status) = self.status {
            updated.status = status;
        }
        if let Some(member) = &self.family_member {
            updated.family_member = member.clone();
        }
        if let Some(allocations) = &self.split_allocations {
            updated.split_allocations = allocations.clone();
        }
        if let Some(method) = &self.payment_method {
            updated.payment_method = method.clone();
        }
        if let Some(auto_renew) = self.auto_renew {
            updated.auto_renew = auto_renew;
        }
        if let Some(reimbursable) = self.reimbursable {
            updated.reimbursable = reimbursable;
        }
        if let Some(notes) = &self.notes {
            updated.notes = notes.clone();
        }
        if let Some(icon) = &self.icon {
            updated.icon = icon.clone();
        }
        updated.updated_at = now;
        updated
    }
}

/// Checks the rules the core relies on but does not enforce itself.
///
/// Member ids already referenced by `previous` are accepted even when the
/// member has since been removed, so records with dangling references stay
/// editable.
pub fn validate_subscription(
    sub: &Subscription,
    members: &[FamilyMember],
    previous: Option<&Subscription>,
) -> Result<()> {
    if sub.service_name.trim().is_empty() {
        bail!("Service name must not be empty");
    }
    if !sub.amount.is_finite() || sub.amount < 0.0 {
        bail!("Amount must be a non-negative number, got {}", sub.amount);
    }

    let already_stored = |id: &str| {
        previous.is_some_and(|p| {
            p.family_member.as_deref() == Some(id)
                || p.allocations().iter().any(|a| a.family_member_id == id)
        })
    };
    let known = |id: &str| members.iter().any(|m| m.id == id) || already_stored(id);
    if let Some(member) = &sub.family_member {
        if !known(member.as_str()) {
            bail!("Unknown family member: {member}");
        }
    }

    let allocations = sub.allocations();
    if allocations.is_empty() {
        return Ok(());
    }
    let mut seen = HashSet::new();
    for allocation in allocations {
        if !known(allocation.family_member_id.as_str()) {
            bail!("Unknown family member: {}", allocation.family_member_id);
        }
        if !seen.insert(allocation.family_member_id.as_str()) {
            bail!(
                "Family member {} appears more than once in the split",
                allocation.family_member_id
            );
        }
        if !(allocation.percentage > 0.0 && allocation.percentage <= 100.0) {
            bail!(
                "Split percentage must be within (0, 100], got {}",
                allocation.percentage
            );
        }
    }
    let total: f64 = allocations.iter().map(|a| a.percentage).sum();
    if (total - 100.0).abs() > PERCENTAGE_TOLERANCE {
        bail!("Split percentages must add up to 100, got {total}");
    }
    Ok(())
}
