use super::ui;
use crate::core::calendar::{UPCOMING_WINDOW_DAYS, is_upcoming};
use crate::core::{CategorySpending, DashboardMetrics, Subscription, sort_by_next_billing};
use chrono::NaiveDate;
use comfy_table::{Cell, CellAlignment};

impl DashboardMetrics {
    pub fn display_as_table(&self, currency: &str) -> String {
        let mut table = ui::new_styled_table();
        table.set_header(vec![
            ui::header_cell("Metric"),
            ui::header_cell("Value"),
            ui::header_cell("Details"),
        ]);

        let money = |v: f64| ui::format_currency(v, currency);
        let rows = [
            (
                "Monthly Spend",
                money(self.monthly_spend),
                format!(
                    "{} reimbursable, {} out of pocket",
                    money(self.monthly_spend_reimbursable),
                    money(self.monthly_spend_out_of_pocket)
                ),
            ),
            (
                "Lifetime Purchases",
                money(self.lifetime_purchases),
                format!("{} purchases", self.lifetime_purchases_count),
            ),
            (
                "Annual Projection",
                money(self.annual_projection),
                format!("{} reimbursable", money(self.annual_projection_reimbursable)),
            ),
            (
                "Active Subscriptions",
                self.active_subscriptions.to_string(),
                String::new(),
            ),
            (
                "Upcoming Renewals",
                self.upcoming_renewals.to_string(),
                format!("Next {UPCOMING_WINDOW_DAYS} days"),
            ),
        ];
        for (title, value, details) in rows {
            table.add_row(vec![
                Cell::new(title),
                Cell::new(value).set_alignment(CellAlignment::Right),
                Cell::new(details),
            ]);
        }
        table.to_string()
    }
}

fn render_breakdown(breakdown: &[CategorySpending], currency: &str) -> String {
    if breakdown.is_empty() {
        return ui::style_text("No active spending", ui::StyleType::Subtle);
    }
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Category"),
        ui::header_cell("Monthly"),
        ui::header_cell("Share (%)"),
    ]);
    for entry in breakdown {
        table.add_row(vec![
            Cell::new(entry.category.label()),
            ui::amount_cell(entry.amount, currency),
            Cell::new(format!("{:.1}%", entry.percentage)).set_alignment(CellAlignment::Right),
        ]);
    }
    table.to_string()
}

fn render_upcoming(subscriptions: &[Subscription], currency: &str, today: NaiveDate) -> String {
    let upcoming: Vec<Subscription> = sort_by_next_billing(subscriptions)
        .into_iter()
        .filter(|s| s.is_active() && is_upcoming(s.next_billing_date, today))
        .collect();
    if upcoming.is_empty() {
        return ui::style_text("No renewals in the next week", ui::StyleType::Subtle);
    }

    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Service"),
        ui::header_cell("Amount"),
        ui::header_cell("Renews"),
    ]);
    for sub in &upcoming {
        table.add_row(vec![
            Cell::new(&sub.service_name),
            ui::amount_cell(sub.amount, currency),
            Cell::new(ui::format_relative_date(sub.next_billing_date, today)),
        ]);
    }
    table.to_string()
}

/// Renders the metrics grid, the category breakdown and the renewals due soon.
pub fn render_dashboard(
    metrics: &DashboardMetrics,
    breakdown: &[CategorySpending],
    subscriptions: &[Subscription],
    currency: &str,
    today: NaiveDate,
) -> String {
    format!(
        "{}\n\n{}\n\n{}\n\n{}\n\n{}\n\n{}",
        ui::style_text("Dashboard", ui::StyleType::Title),
        metrics.display_as_table(currency),
        ui::style_text("Spending by Category", ui::StyleType::Title),
        render_breakdown(breakdown, currency),
        ui::style_text("Upcoming Renewals", ui::StyleType::Title),
        render_upcoming(subscriptions, currency, today),
    )
}
