//! Subscription records and the enumerations they are built from.

use anyhow::{Result, anyhow};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BillingFrequency {
    Monthly,
    Annual,
    Quarterly,
    Weekly,
    OneTime,
    /// Any value written by a newer or foreign client.
    #[serde(other)]
    Unknown,
}

impl BillingFrequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            BillingFrequency::Monthly => "monthly",
            BillingFrequency::Annual => "annual",
            BillingFrequency::Quarterly => "quarterly",
            BillingFrequency::Weekly => "weekly",
            BillingFrequency::OneTime => "one-time",
            BillingFrequency::Unknown => "unknown",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            BillingFrequency::Monthly => "Monthly",
            BillingFrequency::Annual => "Annual",
            BillingFrequency::Quarterly => "Quarterly",
            BillingFrequency::Weekly => "Weekly",
            BillingFrequency::OneTime => "One-time",
            BillingFrequency::Unknown => "Unknown",
        }
    }
}

impl Display for BillingFrequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for BillingFrequency {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "monthly" => Ok(BillingFrequency::Monthly),
            "annual" | "yearly" => Ok(BillingFrequency::Annual),
            "quarterly" => Ok(BillingFrequency::Quarterly),
            "weekly" => Ok(BillingFrequency::Weekly),
            "one-time" | "onetime" => Ok(BillingFrequency::OneTime),
            _ => Err(anyhow!("Invalid billing frequency: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    Entertainment,
    Utilities,
    Productivity,
    HealthFitness,
    Education,
    Shopping,
    Finance,
    Other,
    #[serde(other)]
    Unknown,
}

impl Category {
    pub const ALL: [Category; 8] = [
        Category::Entertainment,
        Category::Utilities,
        Category::Productivity,
        Category::HealthFitness,
        Category::Education,
        Category::Shopping,
        Category::Finance,
        Category::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Entertainment => "entertainment",
            Category::Utilities => "utilities",
            Category::Productivity => "productivity",
            Category::HealthFitness => "health-fitness",
            Category::Education => "education",
            Category::Shopping => "shopping",
            Category::Finance => "finance",
            Category::Other => "other",
            Category::Unknown => "unknown",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Category::Entertainment => "Entertainment",
            Category::Utilities => "Utilities",
            Category::Productivity => "Productivity",
            Category::HealthFitness => "Health & Fitness",
            Category::Education => "Education",
            Category::Shopping => "Shopping",
            Category::Finance => "Finance",
            Category::Other => "Other",
            Category::Unknown => "Unknown",
        }
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Category {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == normalized)
            .ok_or_else(|| anyhow!("Invalid category: {}", s))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SubscriptionStatus {
    Active,
    Paused,
    Cancelled,
    Trial,
    #[serde(other)]
    Unknown,
}

impl SubscriptionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionStatus::Active => "active",
            SubscriptionStatus::Paused => "paused",
            SubscriptionStatus::Cancelled => "cancelled",
            SubscriptionStatus::Trial => "trial",
            SubscriptionStatus::Unknown => "unknown",
        }
    }
}

impl Display for SubscriptionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SubscriptionStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "active" => Ok(SubscriptionStatus::Active),
            "paused" => Ok(SubscriptionStatus::Paused),
            "cancelled" | "canceled" => Ok(SubscriptionStatus::Cancelled),
            "trial" => Ok(SubscriptionStatus::Trial),
            _ => Err(anyhow!("Invalid subscription status: {}", s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FamilyMember {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(default)]
    pub is_current_user: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SplitAllocation {
    pub family_member_id: String,
    pub percentage: f64,
}

impl SplitAllocation {
    pub fn new(family_member_id: impl Into<String>, percentage: f64) -> Self {
        Self {
            family_member_id: family_member_id.into(),
            percentage,
        }
    }
}

/// How the cost of a subscription is owned by family members.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Ownership<'a> {
    Unassigned,
    /// A single owner, either through the legacy owner field or a 100% split.
    Individual(&'a str),
    /// A genuine split: several allocations, or one allocation below 100%.
    Shared(&'a [SplitAllocation]),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    pub id: String,
    pub service_name: String,
    pub amount: f64,
    pub billing_frequency: BillingFrequency,
    pub next_billing_date: NaiveDate,
    pub category: Category,
    /// Legacy single owner, by family member id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub family_member: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub split_allocations: Option<Vec<SplitAllocation>>,
    pub status: SubscriptionStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<String>,
    #[serde(default)]
    pub auto_renew: bool,
    #[serde(default)]
    pub reimbursable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Subscription {
    pub fn is_active(&self) -> bool {
        self.status == SubscriptionStatus::Active
    }

    pub fn is_one_time(&self) -> bool {
        self.billing_frequency == BillingFrequency::OneTime
    }

    /// Split allocations, empty when the subscription is not split.
    pub fn allocations(&self) -> &[SplitAllocation] {
        self.split_allocations.as_deref().unwrap_or_default()
    }

    /// Classifies ownership. Split allocations win over the legacy owner
    /// field whenever the list is non-empty.
    pub fn ownership(&self) -> Ownership<'_> {
        match self.allocations() {
            [] => match self.family_member.as_deref() {
                Some(member_id) => Ownership::Individual(member_id),
                None => Ownership::Unassigned,
            },
            [only] if only.percentage == 100.0 => Ownership::Individual(&only.family_member_id),
            allocations => Ownership::Shared(allocations),
        }
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use chrono::TimeZone;

    /// Builds an active monthly subscription with sensible defaults.
    pub fn subscription(id: &str, service_name: &str, amount: f64) -> Subscription {
        let stamp = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        Subscription {
            id: id.to_string(),
            service_name: service_name.to_string(),
            amount,
            billing_frequency: BillingFrequency::Monthly,
            next_billing_date: NaiveDate::from_ymd_opt(2024, 12, 1).unwrap(),
            category: Category::Entertainment,
            family_member: None,
            split_allocations: None,
            status: SubscriptionStatus::Active,
            payment_method: None,
            auto_renew: true,
            reimbursable: false,
            notes: None,
            icon: None,
            created_at: stamp,
            updated_at: stamp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::subscription;
    use super::*;

    #[test]
    fn test_enum_slugs_round_trip_through_serde() {
        let json = serde_json::to_string(&BillingFrequency::OneTime).unwrap();
        assert_eq!(json, "\"one-time\"");
        let json = serde_json::to_string(&Category::HealthFitness).unwrap();
        assert_eq!(json, "\"health-fitness\"");

        let freq: BillingFrequency = serde_json::from_str("\"fortnightly\"").unwrap();
        assert_eq!(freq, BillingFrequency::Unknown);
        let category: Category = serde_json::from_str("\"gardening\"").unwrap();
        assert_eq!(category, Category::Unknown);
        let status: SubscriptionStatus = serde_json::from_str("\"expired\"").unwrap();
        assert_eq!(status, SubscriptionStatus::Unknown);
    }

    #[test]
    fn test_from_str_parsing() {
        assert_eq!(
            "One-Time".parse::<BillingFrequency>().unwrap(),
            BillingFrequency::OneTime
        );
        assert_eq!(
            "health-fitness".parse::<Category>().unwrap(),
            Category::HealthFitness
        );
        assert_eq!(
            "canceled".parse::<SubscriptionStatus>().unwrap(),
            SubscriptionStatus::Cancelled
        );
        assert!("unknown".parse::<Category>().is_err());
        assert!("biweekly".parse::<BillingFrequency>().is_err());
    }

    #[test]
    fn test_labels() {
        assert_eq!(Category::HealthFitness.label(), "Health & Fitness");
        assert_eq!(BillingFrequency::OneTime.label(), "One-time");
    }

    #[test]
    fn test_ownership_classification() {
        let mut sub = subscription("1", "Netflix", 15.99);
        assert_eq!(sub.ownership(), Ownership::Unassigned);

        sub.family_member = Some("a".to_string());
        assert_eq!(sub.ownership(), Ownership::Individual("a"));

        sub.split_allocations = Some(vec![SplitAllocation::new("b", 100.0)]);
        assert_eq!(sub.ownership(), Ownership::Individual("b"));

        sub.split_allocations = Some(vec![SplitAllocation::new("b", 50.0)]);
        assert!(matches!(sub.ownership(), Ownership::Shared(a) if a.len() == 1));

        sub.split_allocations = Some(vec![
            SplitAllocation::new("a", 60.0),
            SplitAllocation::new("b", 40.0),
        ]);
        assert!(matches!(sub.ownership(), Ownership::Shared(a) if a.len() == 2));

        sub.split_allocations = Some(Vec::new());
        assert_eq!(sub.ownership(), Ownership::Individual("a"));
    }

    #[test]
    fn test_subscription_json_uses_camel_case() {
        let sub = subscription("1", "Netflix", 15.99);
        let json = serde_json::to_value(&sub).unwrap();
        assert_eq!(json["serviceName"], "Netflix");
        assert_eq!(json["billingFrequency"], "monthly");
        assert_eq!(json["nextBillingDate"], "2024-12-01");
        assert!(json.get("familyMember").is_none());

        let back: Subscription = serde_json::from_value(json).unwrap();
        assert_eq!(back, sub);
    }
}
