use anyhow::Result;
use chrono::NaiveDate;
use clap::{Args, CommandFactory, Parser, Subcommand};
use subtrack::core::log::init_logging;
use subtrack::core::{
    BillingFrequency, Category, CustomViewFilters, FamilyMemberFilter, FamilyMemberFilterType,
    FilterOptions, QuickFilter, SortDirection, SortField, SortState, SplitAllocation,
    SubscriptionStatus,
};
use subtrack::store::{NewSubscription, SubscriptionPatch};
use subtrack::{AppCommand, MemberCommand, ViewCommand};

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Display spending metrics and upcoming renewals
    Dashboard,
    /// List subscriptions
    List(ListArgs),
    /// Show one subscription in detail
    Show {
        /// Subscription id or unique id prefix
        id: String,
    },
    /// Add a subscription
    Add(AddArgs),
    /// Update fields of a subscription
    Update(UpdateArgs),
    /// Remove a subscription
    Remove {
        /// Subscription id or unique id prefix
        id: String,
    },
    /// Manage family members
    #[command(subcommand)]
    Member(MemberCommands),
    /// Manage saved custom views
    #[command(subcommand)]
    View(ViewCommands),
}

#[derive(Args)]
struct ListArgs {
    /// Case-insensitive text matched against name, category and notes
    #[arg(short, long)]
    search: Option<String>,
    #[arg(long)]
    category: Option<Category>,
    #[arg(long)]
    status: Option<SubscriptionStatus>,
    #[arg(long)]
    frequency: Option<BillingFrequency>,
    /// Owner name or id; split allocations are not considered
    #[arg(long)]
    member: Option<String>,
    #[arg(long)]
    reimbursable: Option<bool>,
    /// today, upcoming, this-week or this-month
    #[arg(short, long, default_value = "all")]
    quick: QuickFilter,
    /// service-name, category, amount, next-billing-date or status
    #[arg(long)]
    sort: Option<SortField>,
    /// Sort descending
    #[arg(long, requires = "sort")]
    desc: bool,
}

#[derive(Args)]
struct AddArgs {
    /// Service name
    name: String,
    #[arg(short, long)]
    amount: f64,
    #[arg(short, long, default_value = "monthly")]
    frequency: BillingFrequency,
    /// Next billing date (YYYY-MM-DD)
    #[arg(short, long)]
    next_billing: NaiveDate,
    #[arg(long, default_value = "other")]
    category: Category,
    #[arg(long, default_value = "active")]
    status: SubscriptionStatus,
    /// Single owner, by name or id
    #[arg(long, conflicts_with = "split")]
    owner: Option<String>,
    /// Split share as member=percent, repeatable
    #[arg(long, value_parser = parse_split)]
    split: Vec<SplitAllocation>,
    #[arg(long)]
    payment_method: Option<String>,
    /// Do not renew automatically
    #[arg(long)]
    no_auto_renew: bool,
    #[arg(long)]
    reimbursable: bool,
    #[arg(long)]
    notes: Option<String>,
    #[arg(long)]
    icon: Option<String>,
}

#[derive(Args)]
struct UpdateArgs {
    /// Subscription id or unique id prefix
    id: String,
    #[arg(long)]
    name: Option<String>,
    #[arg(short, long)]
    amount: Option<f64>,
    #[arg(short, long)]
    frequency: Option<BillingFrequency>,
    /// Next billing date (YYYY-MM-DD)
    #[arg(short, long)]
    next_billing: Option<NaiveDate>,
    #[arg(long)]
    category: Option<Category>,
    #[arg(long)]
    status: Option<SubscriptionStatus>,
    #[arg(long, conflicts_with = "clear_owner")]
    owner: Option<String>,
    /// Remove the single owner
    #[arg(long)]
    clear_owner: bool,
    /// Replace the split with member=percent entries, repeatable
    #[arg(long, value_parser = parse_split, conflicts_with = "clear_split")]
    split: Vec<SplitAllocation>,
    /// Remove the split allocations
    #[arg(long)]
    clear_split: bool,
    #[arg(long, conflicts_with = "clear_payment_method")]
    payment_method: Option<String>,
    #[arg(long)]
    clear_payment_method: bool,
    #[arg(long)]
    auto_renew: Option<bool>,
    #[arg(long)]
    reimbursable: Option<bool>,
    #[arg(long, conflicts_with = "clear_notes")]
    notes: Option<String>,
    #[arg(long)]
    clear_notes: bool,
    #[arg(long, conflicts_with = "clear_icon")]
    icon: Option<String>,
    #[arg(long)]
    clear_icon: bool,
}

/// Maps a value and its `--clear-*` flag onto a clearable patch field.
fn clearable(value: Option<String>, clear: bool) -> Option<Option<String>> {
    if clear { Some(None) } else { value.map(Some) }
}

#[derive(Subcommand)]
enum MemberCommands {
    /// Add a family member
    Add { name: String },
    /// List family members and their monthly share
    List,
    /// Rename a family member
    Rename {
        /// Member name or id
        member: String,
        name: String,
    },
    /// Remove a family member
    Remove {
        /// Member name or id
        member: String,
    },
}

#[derive(Subcommand)]
enum ViewCommands {
    /// Save a new custom view
    Create {
        name: String,
        /// Category to include, repeatable
        #[arg(long)]
        category: Vec<Category>,
        /// member:individual|shared|none, repeatable
        #[arg(long, value_parser = parse_member_filter)]
        member: Vec<FamilyMemberFilter>,
        #[arg(long)]
        reimbursable: Option<bool>,
    },
    /// List saved custom views
    List,
    /// Show the subscriptions a view matches
    Show {
        /// View name or id
        view: String,
    },
    /// Remove a custom view
    Remove {
        /// View name or id
        view: String,
    },
}

fn parse_split(s: &str) -> Result<SplitAllocation, String> {
    let (member, percentage) = s
        .rsplit_once('=')
        .ok_or_else(|| format!("Expected member=percent, got '{s}'"))?;
    let percentage: f64 = percentage
        .trim()
        .trim_end_matches('%')
        .parse()
        .map_err(|e| format!("Invalid percentage in '{s}': {e}"))?;
    Ok(SplitAllocation::new(member.trim(), percentage))
}

fn parse_member_filter(s: &str) -> Result<FamilyMemberFilter, String> {
    let (member, kind) = s
        .rsplit_once(':')
        .ok_or_else(|| format!("Expected member:individual|shared|none, got '{s}'"))?;
    let kind: FamilyMemberFilterType = kind.parse().map_err(|e| format!("{e}"))?;
    Ok(FamilyMemberFilter::new(member.trim(), kind))
}

fn non_empty<T>(items: Vec<T>) -> Option<Vec<T>> {
    (!items.is_empty()).then_some(items)
}

impl From<Commands> for AppCommand {
    fn from(cmd: Commands) -> AppCommand {
        match cmd {
            Commands::Dashboard => AppCommand::Dashboard,
            Commands::List(args) => {
                let sort = match args.sort {
                    Some(field) if args.desc => SortState::new(field, SortDirection::Desc),
                    Some(field) => SortState::new(field, SortDirection::Asc),
                    None => SortState::default(),
                };
                AppCommand::List {
                    filters: FilterOptions {
                        category: args.category,
                        status: args.status,
                        billing_frequency: args.frequency,
                        family_member: args.member,
                        reimbursable: args.reimbursable,
                        quick_filter: args.quick,
                        search_query: args.search,
                    },
                    sort,
                }
            }
            Commands::Show { id } => AppCommand::Show { id },
            Commands::Add(args) => {
                let mut new =
                    NewSubscription::new(args.name, args.amount, args.frequency, args.next_billing);
                new.category = args.category;
                new.status = args.status;
                new.family_member = args.owner;
                new.split_allocations = non_empty(args.split);
                new.payment_method = args.payment_method;
                new.auto_renew = !args.no_auto_renew;
                new.reimbursable = args.reimbursable;
                new.notes = args.notes;
                new.icon = args.icon;
                AppCommand::Add(new)
            }
            Commands::Update(args) => {
                let family_member = clearable(args.owner, args.clear_owner);
                let split_allocations = if args.clear_split {
                    Some(None)
                } else {
                    non_empty(args.split).map(Some)
                };
                AppCommand::Update {
                    id: args.id,
                    patch: SubscriptionPatch {
                        service_name: args.name,
                        amount: args.amount,
                        billing_frequency: args.frequency,
                        next_billing_date: args.next_billing,
                        category: args.category,
                        status: args.status,
                        family_member,
                        split_allocations,
                        payment_method: clearable(args.payment_method, args.clear_payment_method),
                        auto_renew: args.auto_renew,
                        reimbursable: args.reimbursable,
                        notes: clearable(args.notes, args.clear_notes),
                        icon: clearable(args.icon, args.clear_icon),
                    },
                }
            }
            Commands::Remove { id } => AppCommand::Remove { id },
            Commands::Member(cmd) => AppCommand::Member(match cmd {
                MemberCommands::Add { name } => MemberCommand::Add { name },
                MemberCommands::List => MemberCommand::List,
                MemberCommands::Rename { member, name } => MemberCommand::Rename { member, name },
                MemberCommands::Remove { member } => MemberCommand::Remove { member },
            }),
            Commands::View(cmd) => AppCommand::View(match cmd {
                ViewCommands::Create {
                    name,
                    category,
                    member,
                    reimbursable,
                } => ViewCommand::Create {
                    name,
                    filters: CustomViewFilters {
                        categories: non_empty(category),
                        family_member_filters: non_empty(member),
                        reimbursable,
                    },
                },
                ViewCommands::List => ViewCommand::List,
                ViewCommands::Show { view } => ViewCommand::Show { view },
                ViewCommands::Remove { view } => ViewCommand::Remove { view },
            }),
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => match cli.config_path.as_deref() {
            Some(path) => subtrack::cli::setup::setup_at_path(path),
            None => subtrack::cli::setup::setup(),
        },
        Some(cmd) => subtrack::run_command(cmd.into(), cli.config_path.as_deref()),
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
