use super::ui;
use crate::core::{FamilyMember, Ownership, Subscription, normalize_to_monthly};
use comfy_table::{Cell, Color};

/// Monthly-equivalent cost of active subscriptions attributed to `member_id`,
/// weighted by split percentage.
pub fn monthly_share(member_id: &str, subscriptions: &[Subscription]) -> f64 {
    subscriptions
        .iter()
        .filter(|s| s.is_active())
        .map(|s| {
            let monthly = normalize_to_monthly(s.amount, s.billing_frequency);
            match s.ownership() {
                Ownership::Individual(id) if id == member_id => monthly,
                Ownership::Shared(allocations) => allocations
                    .iter()
                    .filter(|a| a.family_member_id == member_id)
                    .map(|a| monthly * a.percentage / 100.0)
                    .sum(),
                _ => 0.0,
            }
        })
        .sum()
}

pub fn render_members(
    members: &[FamilyMember],
    subscriptions: &[Subscription],
    currency: &str,
) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("ID"),
        ui::header_cell("Name"),
        ui::header_cell("Monthly Share"),
    ]);

    for member in members {
        let name = if member.is_current_user {
            Cell::new(format!("{} (you)", member.name)).fg(Color::Green)
        } else {
            Cell::new(&member.name)
        };
        table.add_row(vec![
            Cell::new(&member.id).fg(Color::DarkGrey),
            name,
            ui::amount_cell(monthly_share(&member.id, subscriptions), currency),
        ]);
    }
    table.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::subscription::fixtures::subscription;
    use crate::core::{BillingFrequency, SplitAllocation, SubscriptionStatus};

    #[test]
    fn test_monthly_share() {
        let mut own = subscription("1", "Gym", 30.0);
        own.family_member = Some("me".to_string());

        let mut shared = subscription("2", "Streaming", 120.0);
        shared.billing_frequency = BillingFrequency::Annual;
        shared.split_allocations = Some(vec![
            SplitAllocation::new("me", 50.0),
            SplitAllocation::new("partner", 50.0),
        ]);

        let mut paused = subscription("3", "Paused", 99.0);
        paused.family_member = Some("me".to_string());
        paused.status = SubscriptionStatus::Paused;

        let subs = vec![own, shared, paused];
        assert!((monthly_share("me", &subs) - 35.0).abs() < 1e-9);
        assert!((monthly_share("partner", &subs) - 5.0).abs() < 1e-9);
        assert_eq!(monthly_share("nobody", &subs), 0.0);
    }

    #[test]
    fn test_render_members() {
        let members = vec![FamilyMember {
            id: "m1".to_string(),
            name: "Me".to_string(),
            avatar: None,
            is_current_user: true,
        }];
        let output = render_members(&members, &[], "USD");
        assert!(output.contains("Me (you)"));
        assert!(output.contains("$0.00"));
    }
}
