use super::ui;
use crate::core::{FamilyMember, Ownership, Subscription};
use chrono::NaiveDate;
use comfy_table::{Cell, Color};

fn member_name<'a>(members: &'a [FamilyMember], id: &'a str) -> &'a str {
    members
        .iter()
        .find(|m| m.id == id)
        .map_or(id, |m| m.name.as_str())
}

/// Who pays for a subscription, e.g. "Me" or "Me (60%), Partner (40%)".
pub fn owner_label(sub: &Subscription, members: &[FamilyMember]) -> String {
    match sub.ownership() {
        Ownership::Unassigned => "-".to_string(),
        Ownership::Individual(id) => member_name(members, id).to_string(),
        Ownership::Shared(allocations) => allocations
            .iter()
            .map(|a| format!("{} ({}%)", member_name(members, &a.family_member_id), a.percentage))
            .collect::<Vec<_>>()
            .join(", "),
    }
}

/// Renders subscriptions as a table in the order given.
pub fn render_subscriptions(
    subscriptions: &[Subscription],
    members: &[FamilyMember],
    currency: &str,
    today: NaiveDate,
) -> String {
    if subscriptions.is_empty() {
        return ui::style_text("No subscriptions found", ui::StyleType::Subtle);
    }

    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("ID"),
        ui::header_cell("Service"),
        ui::header_cell("Owner"),
        ui::header_cell("Category"),
        ui::header_cell("Amount"),
        ui::header_cell("Frequency"),
        ui::header_cell("Next Billing"),
        ui::header_cell("Status"),
        ui::header_cell("Reimbursable"),
    ]);

    for sub in subscriptions {
        let next_billing = format!(
            "{} ({})",
            sub.next_billing_date.format("%Y-%m-%d"),
            ui::format_relative_date(sub.next_billing_date, today)
        );
        table.add_row(vec![
            Cell::new(short_id(&sub.id)).fg(Color::DarkGrey),
            Cell::new(&sub.service_name),
            Cell::new(owner_label(sub, members)),
            Cell::new(sub.category.label()),
            ui::amount_cell(sub.amount, currency),
            Cell::new(sub.billing_frequency.label()),
            Cell::new(next_billing),
            ui::status_cell(sub.status),
            Cell::new(if sub.reimbursable { "Yes" } else { "No" }),
        ]);
    }

    let total: f64 = subscriptions.iter().map(|s| s.amount).sum();
    format!(
        "{table}\n\n{} {}",
        ui::style_text(
            &format!("{} subscriptions, billed amounts total:", subscriptions.len()),
            ui::StyleType::TotalLabel
        ),
        ui::style_text(
            &ui::format_currency(total, currency),
            ui::StyleType::TotalValue
        )
    )
}

/// First segment of a UUID; enough to tell rows apart on screen.
pub fn short_id(id: &str) -> &str {
    id.split('-').next().unwrap_or(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::SplitAllocation;
    use crate::core::subscription::fixtures::subscription;

    fn members() -> Vec<FamilyMember> {
        vec![
            FamilyMember {
                id: "m1".to_string(),
                name: "Me".to_string(),
                avatar: None,
                is_current_user: true,
            },
            FamilyMember {
                id: "m2".to_string(),
                name: "Partner".to_string(),
                avatar: None,
                is_current_user: false,
            },
        ]
    }

    #[test]
    fn test_owner_label() {
        let mut sub = subscription("1", "Netflix", 15.99);
        assert_eq!(owner_label(&sub, &members()), "-");

        sub.family_member = Some("m2".to_string());
        assert_eq!(owner_label(&sub, &members()), "Partner");

        sub.split_allocations = Some(vec![
            SplitAllocation::new("m1", 60.0),
            SplitAllocation::new("m2", 40.0),
        ]);
        assert_eq!(owner_label(&sub, &members()), "Me (60%), Partner (40%)");

        // dangling ids are shown as is
        sub.split_allocations = Some(vec![SplitAllocation::new("gone", 100.0)]);
        assert_eq!(owner_label(&sub, &members()), "gone");
    }

    #[test]
    fn test_render_subscriptions() {
        let today = NaiveDate::from_ymd_opt(2024, 11, 29).unwrap();
        let subs = vec![
            subscription("aaaa-1", "Netflix", 15.99),
            subscription("bbbb-2", "Spotify", 9.99),
        ];
        let output = render_subscriptions(&subs, &members(), "USD", today);
        assert!(output.contains("Netflix"));
        assert!(output.contains("Spotify"));
        assert!(output.contains("$15.99"));
        assert!(output.contains("in 2 days"));
        assert!(output.contains("aaaa"));
        assert!(output.contains("$25.98"));
    }

    #[test]
    fn test_render_empty_list() {
        let today = NaiveDate::from_ymd_opt(2024, 11, 29).unwrap();
        let output = render_subscriptions(&[], &members(), "USD", today);
        assert!(output.contains("No subscriptions found"));
    }
}
