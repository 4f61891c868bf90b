//! Saved custom views and their filter predicates.
//!
//! Custom views are evaluated against the full subscription snapshot and do not
//! compose with the overview filter.

use crate::core::subscription::{Category, Ownership, Subscription};
use anyhow::anyhow;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FamilyMemberFilterType {
    Individual,
    Shared,
    None,
}

impl Display for FamilyMemberFilterType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                FamilyMemberFilterType::Individual => "individual",
                FamilyMemberFilterType::Shared => "shared",
                FamilyMemberFilterType::None => "none",
            }
        )
    }
}

impl FromStr for FamilyMemberFilterType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "individual" => Ok(FamilyMemberFilterType::Individual),
            "shared" => Ok(FamilyMemberFilterType::Shared),
            "none" => Ok(FamilyMemberFilterType::None),
            _ => Err(anyhow!("Invalid family member filter type: {}", s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FamilyMemberFilter {
    pub member_id: String,
    #[serde(rename = "type")]
    pub kind: FamilyMemberFilterType,
}

impl FamilyMemberFilter {
    pub fn new(member_id: impl Into<String>, kind: FamilyMemberFilterType) -> Self {
        Self {
            member_id: member_id.into(),
            kind,
        }
    }

    /// Whether `sub` satisfies this ownership constraint. `None` filters
    /// never match; callers drop them before evaluation.
    pub fn matches(&self, sub: &Subscription) -> bool {
        match (self.kind, sub.ownership()) {
            (FamilyMemberFilterType::Individual, Ownership::Individual(owner)) => {
                owner == self.member_id
            }
            (FamilyMemberFilterType::Shared, Ownership::Shared(allocations)) => allocations
                .iter()
                .any(|a| a.family_member_id == self.member_id),
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomViewFilters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<Category>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub family_member_filters: Option<Vec<FamilyMemberFilter>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reimbursable: Option<bool>,
}

impl CustomViewFilters {
    fn matches_category(&self, sub: &Subscription) -> bool {
        match self.categories.as_deref() {
            None | Some([]) => true,
            Some(categories) => categories.contains(&sub.category),
        }
    }

    fn matches_family_members(&self, sub: &Subscription) -> bool {
        let mut actionable = self
            .family_member_filters
            .iter()
            .flatten()
            .filter(|f| f.kind != FamilyMemberFilterType::None)
            .peekable();

        if actionable.peek().is_none() {
            return true;
        }
        actionable.any(|f| f.matches(sub))
    }

    pub fn matches(&self, sub: &Subscription) -> bool {
        self.matches_category(sub)
            && self.matches_family_members(sub)
            && self.reimbursable.is_none_or(|r| sub.reimbursable == r)
    }

    /// True when no dimension constrains anything.
    pub fn is_empty(&self) -> bool {
        self.categories.as_ref().is_none_or(Vec::is_empty)
            && self
                .family_member_filters
                .iter()
                .flatten()
                .all(|f| f.kind == FamilyMemberFilterType::None)
            && self.reimbursable.is_none()
    }
}

/// A named, saved filter set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomView {
    pub id: String,
    pub name: String,
    pub filters: CustomViewFilters,
    pub created_at: DateTime<Utc>,
}

/// Returns the subscriptions matching every provided dimension of `filters`.
///
/// Categories and reimbursable are exact constraints; family member entries
/// are alternatives, a subscription passes if any of them matches.
pub fn apply_custom_view_filters(
    subscriptions: &[Subscription],
    filters: &CustomViewFilters,
) -> Vec<Subscription> {
    let matched: Vec<Subscription> = subscriptions
        .iter()
        .filter(|sub| filters.matches(sub))
        .cloned()
        .collect();
    debug!(
        total = subscriptions.len(),
        matched = matched.len(),
        "Evaluated custom view filters"
    );
    matched
}
