//! Human-readable plan preview.

use crate::models::plan::PlanDocument;

/// Render a compact text summary of a plan document.
///
/// One line per order and per refusal, stable across runs so the output
/// can be diffed.
#[must_use]
pub fn render_plan(doc: &PlanDocument) -> String {
    let mut lines: Vec<String> = Vec::new();

    lines.push(format!(
        "Action: {}",
        match doc.plan.action {
            crate::models::plan::PlanAction::Rebalance => "rebalance",
            crate::models::plan::PlanAction::NoAction => "no_action",
        }
    ));
    lines.push(format!("Orders: {}", doc.plan.orders.len()));

    for (i, order) in doc.plan.orders.iter().enumerate() {
        lines.push(format!(
            "  {}. BUY {} notional={} price={} qty={}",
            i + 1,
            order.symbol,
            order.notional_quote,
            order.price_used,
            order.quantity_base
        ));
    }

    lines.push(format!("Refusals: {}", doc.refusals.len()));
    for refusal in &doc.refusals {
        lines.push(format!("  - {}: {}", refusal.code, refusal.message));
    }

    lines.join("\n")
}
