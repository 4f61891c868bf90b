//! The canonical subscription, family member and custom view collections.
//!
//! Every mutation is written through to the backing collection as JSON, one
//! key per collection. Derived views are recomputed from the full snapshot on
//! each call.

use crate::core::{
    Calendar, CustomView, CustomViewFilters, DashboardMetrics, FamilyMember, FilterOptions,
    Subscription, apply_custom_view_filters, calculate_metrics, filter_subscriptions,
};
use crate::store::KeyValueCollection;
use crate::store::records::{NewSubscription, SubscriptionPatch, validate_subscription};
use anyhow::{Context, Result, anyhow, bail};
use chrono::{NaiveDate, Utc};
use serde::{Serialize, de::DeserializeOwned};
use std::sync::Arc;
use tracing::{debug, error, info};
use uuid::Uuid;

const SUBSCRIPTIONS_KEY: &str = "subscriptions";
const FAMILY_MEMBERS_KEY: &str = "familyMembers";
const CUSTOM_VIEWS_KEY: &str = "customViews";
const CURRENT_USER_NAME: &str = "Me";

/// Everything the store owns, by value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub subscriptions: Vec<Subscription>,
    pub family_members: Vec<FamilyMember>,
    pub custom_views: Vec<CustomView>,
}

pub struct SubscriptionStore {
    collection: Arc<dyn KeyValueCollection>,
    snapshot: Snapshot,
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

impl SubscriptionStore {
    /// Loads the snapshot from `collection`. When no family members exist a
    /// current user called "Me" is created.
    pub fn open(collection: Arc<dyn KeyValueCollection>) -> Result<Self> {
        let snapshot = Snapshot {
            subscriptions: load_list(collection.as_ref(), SUBSCRIPTIONS_KEY)?,
            family_members: load_list(collection.as_ref(), FAMILY_MEMBERS_KEY)?,
            custom_views: load_list(collection.as_ref(), CUSTOM_VIEWS_KEY)?,
        };
        debug!(
            subscriptions = snapshot.subscriptions.len(),
            family_members = snapshot.family_members.len(),
            custom_views = snapshot.custom_views.len(),
            "Loaded snapshot"
        );

        let mut store = Self {
            collection,
            snapshot,
        };
        if store.snapshot.family_members.is_empty() {
            let members = vec![FamilyMember {
                id: new_id(),
                name: CURRENT_USER_NAME.to_string(),
                avatar: None,
                is_current_user: true,
            }];
            store.commit_family_members(members)?;
            info!("Created default family member");
        }
        Ok(store)
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn subscriptions(&self) -> &[Subscription] {
        &self.snapshot.subscriptions
    }

    pub fn family_members(&self) -> &[FamilyMember] {
        &self.snapshot.family_members
    }

    pub fn custom_views(&self) -> &[CustomView] {
        &self.snapshot.custom_views
    }

    pub fn current_user(&self) -> Option<&FamilyMember> {
        self.snapshot
            .family_members
            .iter()
            .find(|m| m.is_current_user)
    }

    pub fn get_subscription(&self, id: &str) -> Option<&Subscription> {
        self.snapshot.subscriptions.iter().find(|s| s.id == id)
    }

    fn subscription_index(&self, id: &str) -> Result<usize> {
        self.snapshot
            .subscriptions
            .iter()
            .position(|s| s.id == id)
            .ok_or_else(|| anyhow!("Subscription not found: {id}"))
    }

    pub fn add_subscription(&mut self, new: NewSubscription) -> Result<Subscription> {
        let subscription = new.into_subscription(new_id(), Utc::now());
        validate_subscription(&subscription, &self.snapshot.family_members, None)?;

        let mut subscriptions = self.snapshot.subscriptions.clone();
        subscriptions.push(subscription.clone());
        self.commit_subscriptions(subscriptions)?;
        info!(id = %subscription.id, name = %subscription.service_name, "Added subscription");
        Ok(subscription)
    }

    pub fn update_subscription(&mut self, id: &str, patch: &SubscriptionPatch) -> Result<Subscription> {
        let index = self.subscription_index(id)?;
        let current = &self.snapshot.subscriptions[index];
        let updated = patch.apply(current, Utc::now());
        validate_subscription(&updated, &self.snapshot.family_members, Some(current))?;

        let mut subscriptions = self.snapshot.subscriptions.clone();
        subscriptions[index] = updated.clone();
        self.commit_subscriptions(subscriptions)?;
        info!(id, "Updated subscription");
        Ok(updated)
    }

    pub fn delete_subscription(&mut self, id: &str) -> Result<Subscription> {
        let index = self.subscription_index(id)?;
        let mut subscriptions = self.snapshot.subscriptions.clone();
        let removed = subscriptions.remove(index);
        self.commit_subscriptions(subscriptions)?;
        info!(id, "Deleted subscription");
        Ok(removed)
    }

    pub fn add_family_member(&mut self, name: &str) -> Result<FamilyMember> {
        let name = name.trim();
        if name.is_empty() {
            bail!("Family member name must not be empty");
        }
        let member = FamilyMember {
            id: new_id(),
            name: name.to_string(),
            avatar: None,
            is_current_user: false,
        };
        let mut members = self.snapshot.family_members.clone();
        members.push(member.clone());
        self.commit_family_members(members)?;
        info!(id = %member.id, "Added family member");
        Ok(member)
    }

    pub fn rename_family_member(&mut self, id: &str, name: &str) -> Result<FamilyMember> {
        let name = name.trim();
        if name.is_empty() {
            bail!("Family member name must not be empty");
        }
        let mut members = self.snapshot.family_members.clone();
        let member = members
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or_else(|| anyhow!("Family member not found: {id}"))?;
        member.name = name.to_string();
        let renamed = member.clone();
        self.commit_family_members(members)?;
        info!(id, "Renamed family member");
        Ok(renamed)
    }

    /// Removes the member. Subscriptions that reference it keep the dangling
    /// id; the filters treat it as matching nobody. The current user cannot
    /// be removed.
    pub fn remove_family_member(&mut self, id: &str) -> Result<FamilyMember> {
        let index = self
            .snapshot
            .family_members
            .iter()
            .position(|m| m.id == id)
            .ok_or_else(|| anyhow!("Family member not found: {id}"))?;
        if self.snapshot.family_members[index].is_current_user {
            bail!("The current user cannot be removed");
        }
        let mut members = self.snapshot.family_members.clone();
        let removed = members.remove(index);
        self.commit_family_members(members)?;
        info!(id, "Removed family member");
        Ok(removed)
    }

    /// Finds a member by id, falling back to a case-insensitive name match.
    pub fn resolve_member(&self, id_or_name: &str) -> Option<&FamilyMember> {
        let needle = id_or_name.trim();
        let members = &self.snapshot.family_members;
        members.iter().find(|m| m.id == needle).or_else(|| {
            members
                .iter()
                .find(|m| m.name.to_lowercase() == needle.to_lowercase())
        })
    }

    pub fn add_custom_view(&mut self, name: &str, filters: CustomViewFilters) -> Result<CustomView> {
        let name = name.trim();
        if name.is_empty() {
            bail!("Please enter a name for your custom view");
        }
        let view = CustomView {
            id: new_id(),
            name: name.to_string(),
            filters,
            created_at: Utc::now(),
        };
        let mut views = self.snapshot.custom_views.clone();
        views.push(view.clone());
        self.commit_custom_views(views)?;
        info!(id = %view.id, name = %view.name, "Added custom view");
        Ok(view)
    }

    pub fn remove_custom_view(&mut self, id: &str) -> Result<CustomView> {
        let index = self
            .snapshot
            .custom_views
            .iter()
            .position(|v| v.id == id)
            .ok_or_else(|| anyhow!("Custom view not found: {id}"))?;
        let mut views = self.snapshot.custom_views.clone();
        let removed = views.remove(index);
        self.commit_custom_views(views)?;
        info!(id, "Removed custom view");
        Ok(removed)
    }

    /// Finds a view by id, falling back to a case-insensitive name match.
    pub fn find_custom_view(&self, id_or_name: &str) -> Option<&CustomView> {
        let needle = id_or_name.trim();
        let views = &self.snapshot.custom_views;
        views.iter().find(|v| v.id == needle).or_else(|| {
            views
                .iter()
                .find(|v| v.name.to_lowercase() == needle.to_lowercase())
        })
    }

    pub fn metrics(&self, today: NaiveDate) -> DashboardMetrics {
        calculate_metrics(&self.snapshot.subscriptions, today)
    }

    pub fn filtered(&self, filters: &FilterOptions, calendar: &Calendar) -> Vec<Subscription> {
        filter_subscriptions(&self.snapshot.subscriptions, filters, calendar)
    }

    /// Evaluates a custom view against every subscription, ignoring any
    /// overview filter.
    pub fn view_subscriptions(&self, view: &CustomView) -> Vec<Subscription> {
        apply_custom_view_filters(&self.snapshot.subscriptions, &view.filters)
    }

    // Each commit writes first and only then replaces the in-memory list, so
    // a failed write leaves the snapshot as it was.
    fn commit_subscriptions(&mut self, subscriptions: Vec<Subscription>) -> Result<()> {
        save_list(self.collection.as_ref(), SUBSCRIPTIONS_KEY, &subscriptions)?;
        self.snapshot.subscriptions = subscriptions;
        Ok(())
    }

    fn commit_family_members(&mut self, members: Vec<FamilyMember>) -> Result<()> {
        save_list(self.collection.as_ref(), FAMILY_MEMBERS_KEY, &members)?;
        self.snapshot.family_members = members;
        Ok(())
    }

    fn commit_custom_views(&mut self, views: Vec<CustomView>) -> Result<()> {
        save_list(self.collection.as_ref(), CUSTOM_VIEWS_KEY, &views)?;
        self.snapshot.custom_views = views;
        Ok(())
    }
}

/// Reads a JSON list. Storage errors propagate; undecodable content is logged
/// and treated as an empty list.
fn load_list<T: DeserializeOwned>(collection: &dyn KeyValueCollection, key: &str) -> Result<Vec<T>> {
    let Some(bytes) = collection
        .get(key)
        .with_context(|| format!("Failed to read {key} from the data store"))?
    else {
        return Ok(Vec::new());
    };

    match serde_json::from_slice(&bytes) {
        Ok(items) => Ok(items),
        Err(e) => {
            error!(key, error = %e, "Failed to parse stored data, starting empty");
            Ok(Vec::new())
        }
    }
}

fn save_list<T: Serialize>(collection: &dyn KeyValueCollection, key: &str, items: &[T]) -> Result<()> {
    let bytes = serde_json::to_vec(items).with_context(|| format!("Failed to encode {key}"))?;
    collection
        .put(key, &bytes)
        .with_context(|| format!("Failed to write {key} to the data store"))
}
