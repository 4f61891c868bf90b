use super::ui;
use crate::core::{CustomView, CustomViewFilters, FamilyMember};
use comfy_table::{Cell, Color};

/// A one-line summary of the constraints a view applies.
pub fn describe_filters(filters: &CustomViewFilters, members: &[FamilyMember]) -> String {
    if filters.is_empty() {
        return "All subscriptions".to_string();
    }

    let mut parts = Vec::new();
    if let Some(categories) = filters.categories.as_deref().filter(|c| !c.is_empty()) {
        let labels: Vec<&str> = categories.iter().map(|c| c.label()).collect();
        parts.push(format!("categories: {}", labels.join(", ")));
    }
    if let Some(member_filters) = filters.family_member_filters.as_deref() {
        let described: Vec<String> = member_filters
            .iter()
            .map(|f| {
                let name = members
                    .iter()
                    .find(|m| m.id == f.member_id)
                    .map_or(f.member_id.as_str(), |m| m.name.as_str());
                format!("{name} ({})", f.kind)
            })
            .collect();
        if !described.is_empty() {
            parts.push(format!("members: {}", described.join(" or ")));
        }
    }
    if let Some(reimbursable) = filters.reimbursable {
        parts.push(format!(
            "reimbursable: {}",
            if reimbursable { "yes" } else { "no" }
        ));
    }
    parts.join("; ")
}

pub fn render_views(views: &[CustomView], members: &[FamilyMember]) -> String {
    if views.is_empty() {
        return ui::style_text("No custom views saved", ui::StyleType::Subtle);
    }

    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("ID"),
        ui::header_cell("Name"),
        ui::header_cell("Filters"),
        ui::header_cell("Created"),
    ]);
    for view in views {
        table.add_row(vec![
            Cell::new(&view.id).fg(Color::DarkGrey),
            Cell::new(&view.name),
            Cell::new(describe_filters(&view.filters, members)),
            Cell::new(view.created_at.format("%Y-%m-%d").to_string()),
        ]);
    }
    table.to_string()
}
