use super::{list::owner_label, ui};
use crate::core::{FamilyMember, Subscription, normalize_to_monthly};
use chrono::NaiveDate;
use comfy_table::Cell;

/// Renders one subscription as a two-column field/value table.
pub fn render_subscription(
    sub: &Subscription,
    members: &[FamilyMember],
    currency: &str,
    today: NaiveDate,
) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![ui::header_cell("Field"), ui::header_cell("Value")]);

    let monthly = if sub.is_one_time() {
        None
    } else {
        Some(normalize_to_monthly(sub.amount, sub.billing_frequency))
    };
    let next_billing = format!(
        "{} ({})",
        sub.next_billing_date.format("%Y-%m-%d"),
        ui::format_relative_date(sub.next_billing_date, today)
    );

    let rows: Vec<(&str, Cell)> = vec![
        ("ID", Cell::new(&sub.id)),
        ("Service", Cell::new(&sub.service_name)),
        ("Amount", Cell::new(ui::format_currency(sub.amount, currency))),
        (
            "Monthly equivalent",
            ui::format_optional_cell(monthly, |m| ui::format_currency(m, currency)),
        ),
        ("Frequency", Cell::new(sub.billing_frequency.label())),
        ("Next billing", Cell::new(next_billing)),
        ("Category", Cell::new(sub.category.label())),
        ("Status", ui::status_cell(sub.status)),
        ("Owner", Cell::new(owner_label(sub, members))),
        (
            "Payment method",
            ui::format_optional_cell(sub.payment_method.as_deref(), str::to_string),
        ),
        ("Auto renew", Cell::new(if sub.auto_renew { "Yes" } else { "No" })),
        ("Reimbursable", Cell::new(if sub.reimbursable { "Yes" } else { "No" })),
        ("Notes", ui::format_optional_cell(sub.notes.as_deref(), str::to_string)),
        (
            "Updated",
            Cell::new(sub.updated_at.format("%Y-%m-%d %H:%M UTC").to_string()),
        ),
    ];
    for (field, value) in rows {
        table.add_row(vec![Cell::new(field), value]);
    }

    format!(
        "{}\n\n{table}",
        ui::style_text(&sub.service_name, ui::StyleType::Title)
    )
}
