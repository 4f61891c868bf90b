use crate::core::SubscriptionStatus;
use chrono::NaiveDate;
use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use console::style;

/// Defines different styles for text elements.
pub enum StyleType {
    Title,
    TotalLabel,
    TotalValue,
    Subtle,
}

/// Applies a consistent style to a string.
pub fn style_text(text: &str, style_type: StyleType) -> String {
    let styled = match style_type {
        StyleType::Title => style(text).bold().underlined(),
        StyleType::TotalLabel => style(text).bold(),
        StyleType::TotalValue => style(text).green().bold(),
        StyleType::Subtle => style(text).dim(),
    };
    styled.to_string()
}

/// Creates a new `comfy_table::Table` with standard styling.
pub fn new_styled_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Creates a styled header cell for a table.
pub fn header_cell(text: &str) -> Cell {
    Cell::new(text)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

/// Formats an `Option<T>` into a `Cell`. `None` is displayed as "-".
pub fn format_optional_cell<T>(value: Option<T>, format_fn: impl Fn(T) -> String) -> Cell {
    value.map_or(Cell::new("-").fg(Color::DarkGrey), |v| {
        Cell::new(format_fn(v))
    })
}

/// A right-aligned money cell.
pub fn amount_cell(amount: f64, currency: &str) -> Cell {
    Cell::new(format_currency(amount, currency)).set_alignment(CellAlignment::Right)
}

pub fn status_color(status: SubscriptionStatus) -> Color {
    match status {
        SubscriptionStatus::Active => Color::Green,
        SubscriptionStatus::Paused => Color::Yellow,
        SubscriptionStatus::Cancelled => Color::Red,
        SubscriptionStatus::Trial => Color::Blue,
        SubscriptionStatus::Unknown => Color::DarkGrey,
    }
}

pub fn status_label(status: SubscriptionStatus) -> &'static str {
    match status {
        SubscriptionStatus::Active => "Active",
        SubscriptionStatus::Paused => "Paused",
        SubscriptionStatus::Cancelled => "Cancelled",
        SubscriptionStatus::Trial => "Trial",
        SubscriptionStatus::Unknown => "Unknown",
    }
}

/// Creates a cell for a subscription status with its colour.
pub fn status_cell(status: SubscriptionStatus) -> Cell {
    Cell::new(status_label(status)).fg(status_color(status))
}

fn currency_symbol(currency: &str) -> Option<&'static str> {
    match currency.to_uppercase().as_str() {
        "USD" => Some("$"),
        "EUR" => Some("€"),
        "GBP" => Some("£"),
        "INR" => Some("₹"),
        "JPY" => Some("¥"),
        _ => None,
    }
}

/// Formats an amount with two decimals, prefixed by the currency symbol when
/// one is known and by the code otherwise.
pub fn format_currency(amount: f64, currency: &str) -> String {
    let sign = if amount < 0.0 { "-" } else { "" };
    let value = amount.abs();
    match currency_symbol(currency) {
        Some(symbol) => format!("{sign}{symbol}{value:.2}"),
        None => format!("{sign}{} {value:.2}", currency.to_uppercase()),
    }
}

/// Describes `date` relative to `today`, e.g. "tomorrow" or "3 days ago".
pub fn format_relative_date(date: NaiveDate, today: NaiveDate) -> String {
    match (date - today).num_days() {
        0 => "today".to_string(),
        1 => "tomorrow".to_string(),
        -1 => "yesterday".to_string(),
        days if days > 1 => format!("in {days} days"),
        days => format!("{} days ago", -days),
    }
}
