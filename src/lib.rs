pub mod cli;
pub mod core;
pub mod store;

use crate::core::config::AppConfig;
use crate::core::{
    Calendar, CustomViewFilters, FilterOptions, SortState, SplitAllocation, spending_by_category,
};
use crate::store::{KeyValueStore, NewSubscription, SubscriptionPatch, SubscriptionStore};
use anyhow::{Result, anyhow, bail};
use tracing::{debug, info};

/// Name of the collection holding all subscription data.
const COLLECTION_NAME: &str = "subtrack";

/// Commands accepted by [`run_command`].
///
/// Family members may be referenced by id or by name anywhere a member id is
/// expected; subscriptions by id or a unique id prefix.
#[derive(Debug, Clone, PartialEq)]
pub enum AppCommand {
    Dashboard,
    List {
        filters: FilterOptions,
        sort: SortState,
    },
    Show {
        id: String,
    },
    Add(NewSubscription),
    Update {
        id: String,
        patch: SubscriptionPatch,
    },
    Remove {
        id: String,
    },
    Member(MemberCommand),
    View(ViewCommand),
}

#[derive(Debug, Clone, PartialEq)]
pub enum MemberCommand {
    Add { name: String },
    List,
    Rename { member: String, name: String },
    Remove { member: String },
}

#[derive(Debug, Clone, PartialEq)]
pub enum ViewCommand {
    Create {
        name: String,
        filters: CustomViewFilters,
    },
    List,
    Show {
        view: String,
    },
    Remove {
        view: String,
    },
}

pub fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("subtrack starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let data_path = config.default_data_path()?;
    let kv = KeyValueStore::open(&data_path)?;
    let mut store = SubscriptionStore::open(kv.collection(COLLECTION_NAME)?)?;
    let calendar = Calendar::local(config.week_start);

    let output = execute(command, &mut store, &calendar, &config.currency)?;
    println!("{output}");
    Ok(())
}

/// Runs `command` against an open store and returns the text to display.
pub fn execute(
    command: AppCommand,
    store: &mut SubscriptionStore,
    calendar: &Calendar,
    currency: &str,
) -> Result<String> {
    let today = calendar.today;
    match command {
        AppCommand::Dashboard => {
            let metrics = store.metrics(today);
            let breakdown = spending_by_category(store.subscriptions());
            Ok(cli::dashboard::render_dashboard(
                &metrics,
                &breakdown,
                store.subscriptions(),
                currency,
                today,
            ))
        }
        AppCommand::List {
            mut filters,
            sort,
        } => {
            if let Some(member) = filters.family_member.take() {
                filters.family_member = Some(member_id(store, &member)?);
            }
            let filtered = store.filtered(&filters, calendar);
            let sorted = sort.apply(&filtered);
            Ok(cli::list::render_subscriptions(
                &sorted,
                store.family_members(),
                currency,
                today,
            ))
        }
        AppCommand::Show { id } => {
            let id = subscription_id(store, &id)?;
            let sub = store
                .get_subscription(&id)
                .ok_or_else(|| anyhow!("Subscription not found: {id}"))?;
            Ok(cli::subscription::render_subscription(
                sub,
                store.family_members(),
                currency,
                today,
            ))
        }
        AppCommand::Add(mut new) => {
            new.family_member = resolve_owner(store, new.family_member)?;
            new.split_allocations = resolve_split(store, new.split_allocations)?;
            let added = store.add_subscription(new)?;
            Ok(format!(
                "Added subscription\n\n{}",
                cli::subscription::render_subscription(
                    &added,
                    store.family_members(),
                    currency,
                    today
                )
            ))
        }
        AppCommand::Update { id, mut patch } => {
            if patch.is_empty() {
                bail!("Nothing to update");
            }
            let id = subscription_id(store, &id)?;
            if let Some(owner) = patch.family_member.take() {
                patch.family_member = Some(resolve_owner(store, owner)?);
            }
            if let Some(split) = patch.split_allocations.take() {
                patch.split_allocations = Some(resolve_split(store, split)?);
            }
            let updated = store.update_subscription(&id, &patch)?;
            Ok(format!(
                "Updated subscription\n\n{}",
                cli::subscription::render_subscription(
                    &updated,
                    store.family_members(),
                    currency,
                    today
                )
            ))
        }
        AppCommand::Remove { id } => {
            let id = subscription_id(store, &id)?;
            let removed = store.delete_subscription(&id)?;
            Ok(format!("Removed subscription {}", removed.service_name))
        }
        AppCommand::Member(command) => execute_member(command, store, currency),
        AppCommand::View(command) => execute_view(command, store, currency, today),
    }
}

fn execute_member(
    command: MemberCommand,
    store: &mut SubscriptionStore,
    currency: &str,
) -> Result<String> {
    match command {
        MemberCommand::Add { name } => {
            let member = store.add_family_member(&name)?;
            Ok(format!("Added family member {} ({})", member.name, member.id))
        }
        MemberCommand::List => Ok(cli::members::render_members(
            store.family_members(),
            store.subscriptions(),
            currency,
        )),
        MemberCommand::Rename { member, name } => {
            let id = member_id(store, &member)?;
            let renamed = store.rename_family_member(&id, &name)?;
            Ok(format!("Renamed family member to {}", renamed.name))
        }
        MemberCommand::Remove { member } => {
            let id = member_id(store, &member)?;
            let removed = store.remove_family_member(&id)?;
            Ok(format!("Removed family member {}", removed.name))
        }
    }
}

fn execute_view(
    command: ViewCommand,
    store: &mut SubscriptionStore,
    currency: &str,
    today: chrono::NaiveDate,
) -> Result<String> {
    match command {
        ViewCommand::Create { name, mut filters } => {
            if let Some(member_filters) = filters.family_member_filters.as_mut() {
                for filter in member_filters.iter_mut() {
                    filter.member_id = member_id(store, &filter.member_id)?;
                }
            }
            let view = store.add_custom_view(&name, filters)?;
            Ok(format!("Created custom view {} ({})", view.name, view.id))
        }
        ViewCommand::List => Ok(cli::views::render_views(
            store.custom_views(),
            store.family_members(),
        )),
        ViewCommand::Show { view } => {
            let view = store
                .find_custom_view(&view)
                .ok_or_else(|| anyhow!("Custom view not found: {view}"))?;
            let matched = store.view_subscriptions(view);
            Ok(format!(
                "{}\n{}\n\n{}",
                cli::ui::style_text(&view.name, cli::ui::StyleType::Title),
                cli::ui::style_text(
                    &cli::views::describe_filters(&view.filters, store.family_members()),
                    cli::ui::StyleType::Subtle
                ),
                cli::list::render_subscriptions(&matched, store.family_members(), currency, today)
            ))
        }
        ViewCommand::Remove { view } => {
            let id = store
                .find_custom_view(&view)
                .map(|v| v.id.clone())
                .ok_or_else(|| anyhow!("Custom view not found: {view}"))?;
            let removed = store.remove_custom_view(&id)?;
            Ok(format!("Removed custom view {}", removed.name))
        }
    }
}

fn member_id(store: &SubscriptionStore, id_or_name: &str) -> Result<String> {
    store
        .resolve_member(id_or_name)
        .map(|m| m.id.clone())
        .ok_or_else(|| anyhow!("Unknown family member: {id_or_name}"))
}

fn resolve_owner(store: &SubscriptionStore, owner: Option<String>) -> Result<Option<String>> {
    owner.map(|o| member_id(store, &o)).transpose()
}

fn resolve_split(
    store: &SubscriptionStore,
    split: Option<Vec<SplitAllocation>>,
) -> Result<Option<Vec<SplitAllocation>>> {
    split
        .map(|allocations| {
            allocations
                .into_iter()
                .map(|a| Ok(SplitAllocation::new(member_id(store, &a.family_member_id)?, a.percentage)))
                .collect::<Result<Vec<_>>>()
        })
        .transpose()
}

/// Resolves an exact id, or a prefix that identifies exactly one subscription.
fn subscription_id(store: &SubscriptionStore, id: &str) -> Result<String> {
    let id = id.trim();
    if store.get_subscription(id).is_some() {
        return Ok(id.to_string());
    }
    let mut candidates = store
        .subscriptions()
        .iter()
        .filter(|s| !id.is_empty() && s.id.starts_with(id));
    match (candidates.next(), candidates.next()) {
        (Some(only), None) => Ok(only.id.clone()),
        (Some(_), Some(_)) => bail!("Subscription id prefix is ambiguous: {id}"),
        (None, _) => bail!("Subscription not found: {id}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{
        BillingFrequency, Category, FamilyMemberFilter, FamilyMemberFilterType, SortDirection,
        SortField,
    };
    use crate::store::memory::MemoryCollection;
    use chrono::NaiveDate;
    use std::sync::Arc;

    fn setup() -> (SubscriptionStore, Calendar) {
        let store = SubscriptionStore::open(Arc::new(MemoryCollection::new())).unwrap();
        let calendar = Calendar::new(NaiveDate::from_ymd_opt(2024, 11, 28).unwrap());
        (store, calendar)
    }

    fn add(store: &mut SubscriptionStore, calendar: &Calendar, new: NewSubscription) -> String {
        execute(AppCommand::Add(new), store, calendar, "USD").unwrap();
        store.subscriptions().last().unwrap().id.clone()
    }

    fn netflix() -> NewSubscription {
        let mut new = NewSubscription::new(
            "Netflix",
            15.99,
            BillingFrequency::Monthly,
            NaiveDate::from_ymd_opt(2024, 12, 1).unwrap(),
        );
        new.category = Category::Entertainment;
        new
    }

    #[test]
    fn test_members_resolve_by_name() {
        let (mut store, calendar) = setup();
        execute(
            AppCommand::Member(MemberCommand::Add {
                name: "Partner".to_string(),
            }),
            &mut store,
            &calendar,
            "USD",
        )
        .unwrap();

        let mut shared = netflix();
        shared.split_allocations = Some(vec![
            SplitAllocation::new("me", 50.0),
            SplitAllocation::new("partner", 50.0),
        ]);
        let id = add(&mut store, &calendar, shared);

        let partner = store.resolve_member("Partner").unwrap().id.clone();
        let stored = store.get_subscription(&id).unwrap();
        assert_eq!(stored.allocations()[1].family_member_id, partner);

        let mut unknown = netflix();
        unknown.family_member = Some("stranger".to_string());
        let err = execute(AppCommand::Add(unknown), &mut store, &calendar, "USD").unwrap_err();
        assert!(err.to_string().contains("Unknown family member"));
    }

    #[test]
    fn test_update_and_remove_by_prefix() {
        let (mut store, calendar) = setup();
        let id = add(&mut store, &calendar, netflix());
        let prefix = &id[..8];

        let output = execute(
            AppCommand::Update {
                id: prefix.to_string(),
                patch: SubscriptionPatch {
                    amount: Some(22.99),
                    ..Default::default()
                },
            },
            &mut store,
            &calendar,
            "USD",
        )
        .unwrap();
        assert!(output.contains("$22.99"));

        let empty = execute(
            AppCommand::Update {
                id: id.clone(),
                patch: SubscriptionPatch::default(),
            },
            &mut store,
            &calendar,
            "USD",
        );
        assert!(empty.is_err());

        execute(
            AppCommand::Remove {
                id: prefix.to_string(),
            },
            &mut store,
            &calendar,
            "USD",
        )
        .unwrap();
        assert!(store.subscriptions().is_empty());
        assert!(
            execute(AppCommand::Remove { id }, &mut store, &calendar, "USD").is_err()
        );
    }

    #[test]
    fn test_list_applies_filters_and_sort() {
        let (mut store, calendar) = setup();
        add(&mut store, &calendar, netflix());
        let mut gym = NewSubscription::new(
            "Gym",
            50.0,
            BillingFrequency::Monthly,
            NaiveDate::from_ymd_opt(2025, 1, 15).unwrap(),
        );
        gym.category = Category::HealthFitness;
        add(&mut store, &calendar, gym);

        let output = execute(
            AppCommand::List {
                filters: FilterOptions {
                    category: Some(Category::HealthFitness),
                    ..Default::default()
                },
                sort: SortState::default(),
            },
            &mut store,
            &calendar,
            "USD",
        )
        .unwrap();
        assert!(output.contains("Gym"));
        assert!(!output.contains("Netflix"));

        let output = execute(
            AppCommand::List {
                filters: FilterOptions::default(),
                sort: SortState::new(SortField::Amount, SortDirection::Desc),
            },
            &mut store,
            &calendar,
            "USD",
        )
        .unwrap();
        let gym_at = output.find("Gym").unwrap();
        let netflix_at = output.find("Netflix").unwrap();
        assert!(gym_at < netflix_at);
    }

    #[test]
    fn test_views_resolve_members_and_show_matches() {
        let (mut store, calendar) = setup();
        let mut owned = netflix();
        owned.family_member = Some("Me".to_string());
        add(&mut store, &calendar, owned);

        execute(
            AppCommand::View(ViewCommand::Create {
                name: "Mine".to_string(),
                filters: CustomViewFilters {
                    family_member_filters: Some(vec![FamilyMemberFilter::new(
                        "me",
                        FamilyMemberFilterType::Individual,
                    )]),
                    ..Default::default()
                },
            }),
            &mut store,
            &calendar,
            "USD",
        )
        .unwrap();
        let me = store.current_user().unwrap().id.clone();
        let view = store.find_custom_view("mine").unwrap();
        assert_eq!(
            view.filters.family_member_filters.as_ref().unwrap()[0].member_id,
            me
        );

        let output = execute(
            AppCommand::View(ViewCommand::Show {
                view: "Mine".to_string(),
            }),
            &mut store,
            &calendar,
            "USD",
        )
        .unwrap();
        assert!(output.contains("Netflix"));

        execute(
            AppCommand::View(ViewCommand::Remove {
                view: "mine".to_string(),
            }),
            &mut store,
            &calendar,
            "USD",
        )
        .unwrap();
        assert!(store.custom_views().is_empty());
    }
}
