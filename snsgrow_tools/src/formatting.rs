use std::fmt::Write;

use anyhow::Result;
use prettytable::{
    format::{LinePosition, LineSeparator, TableFormat},
    row,
    Table,
};
use smmturk_tools::{Balance, OrderCreated, OrderStatus, ProviderService};
use snsgrow_engine::order_objects::TrackingView;

fn markdown_format() -> TableFormat {
    prettytable::format::FormatBuilder::new()
        .column_separator('|')
        .borders('|')
        .separator(LinePosition::Title, LineSeparator::new('-', '|', '|', '|'))
        .padding(1, 1)
        .build()
}

fn markdown_style(table: &mut Table) {
    table.set_format(markdown_format());
}

pub fn format_tracking_view(view: &TrackingView) -> Result<String> {
    let order = &view.order;
    let mut f = String::new();
    writeln!(f, "===============================================================================")?;
    writeln!(f, "Order {id:20} Created {created}", id = order.order_id.to_string(), created = order.created_at)?;
    writeln!(f, "{} x {} ({})", order.quantity, order.service_name, order.target_url)?;
    writeln!(f, "[{:^17}]                 Updated {}", order.status.to_string(), order.updated_at)?;
    writeln!(f, "-------------------------------------------------------------------------------")?;
    writeln!(f, "Progress:  {:>3}%", view.progress)?;
    if let Some(delivered) = view.delivered {
        writeln!(f, "Delivered: {delivered} of {} ({} remaining)", order.quantity, view.remains.unwrap_or_default())?;
    }
    if let Some(notes) = &order.notes {
        writeln!(f, "Notes:     {notes}")?;
    }
    let mut table = Table::new();
    table.set_titles(row!["", "Stage", "Status", "Changed at"]);
    for stage in &view.timeline {
        let marker = match (stage.current, stage.reached) {
            (true, _) => "▶",
            (false, true) => "✔",
            (false, false) => " ",
        };
        let changed_at = stage.changed_at.map(|t| t.to_string()).unwrap_or_default();
        table.add_row(row![marker, stage.label, stage.status, changed_at]);
    }
    markdown_style(&mut table);
    writeln!(f, "{table}")?;
    let footer = match (view.is_terminal, view.can_cancel) {
        (true, _) => "This order is final.",
        (false, true) => "This order can still be cancelled.",
        (false, false) => "This order is being delivered.",
    };
    writeln!(f, "{footer}")?;
    Ok(f)
}

pub fn format_provider_services(services: &[ProviderService]) -> String {
    if services.is_empty() {
        return "No services".to_string();
    }
    let mut table = Table::new();
    table.set_titles(row!["Id", "Name", "Category", "Rate/1000", "Min", "Max", "Refill", "Cancel"]);
    services.iter().for_each(|s| {
        table.add_row(row![
            s.service,
            s.name,
            s.category,
            format!("{:>10}", s.rate),
            s.min,
            s.max,
            if s.refill { "yes" } else { "" },
            if s.cancel { "yes" } else { "" }
        ]);
    });
    markdown_style(&mut table);
    format!("{table}\n{} services", services.len())
}

pub fn format_balance(balance: &Balance) -> String {
    format!("Provider balance: {} {}", balance.balance, balance.currency)
}

pub fn format_provider_status(provider_order_id: &str, status: &OrderStatus) -> String {
    let mut table = Table::new();
    table.set_titles(row!["Provider order", "Status", "Start count", "Remains", "Charge"]);
    let opt = |v: Option<i64>| v.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string());
    let charge = match (&status.charge, &status.currency) {
        (Some(c), Some(cur)) => format!("{c} {cur}"),
        (Some(c), None) => c.to_string(),
        _ => "-".to_string(),
    };
    table.add_row(row![provider_order_id, status.status, opt(status.start_count), opt(status.remains), charge]);
    markdown_style(&mut table);
    table.to_string()
}

pub fn format_order_created(created: &OrderCreated) -> String {
    let charge = created.charge.map(|c| c.to_string()).unwrap_or_else(|| "unknown".to_string());
    format!("Provider order {} created. Charge: {charge} {}", created.order, created.currency.as_deref().unwrap_or(""))
}
