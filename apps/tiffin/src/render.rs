//! Plain-text output for the terminal.

use shared::{
    domain::{MenuItem, Money, PricingPlan},
    protocol::{OrderEstimate, SubmissionReceipt},
};

pub fn menu(items: &[MenuItem]) -> String {
    let mut lines = Vec::new();
    for item in items {
        let mut header = format!("{} [{}]  {}", item.name, item.id, item.price);
        if item.savings() > Money::ZERO {
            header.push_str(&format!(" (was {})", item.original_price));
        }
        lines.push(header);
        lines.push(format!(
            "  {}  rating {:.1}, ready in {} min",
            item.description, item.rating, item.prep_time_minutes
        ));
        for feature in &item.features {
            lines.push(format!("  - {feature}"));
        }
    }
    lines.join("\n")
}

pub fn plans(plans: &[PricingPlan]) -> String {
    let mut lines = Vec::new();
    for plan in plans {
        let mut header = format!("{}  {} {}", plan.name, plan.price, plan.period);
        if let Some(original) = plan.original_price {
            header.push_str(&format!(" (was {original})"));
        }
        if let Some(label) = &plan.savings_label {
            header.push_str(&format!("  {label}"));
        }
        if plan.is_featured {
            header.push_str("  [most popular]");
        }
        lines.push(header);
        for feature in &plan.features {
            lines.push(format!("  - {feature}"));
        }
    }
    lines.join("\n")
}

pub fn estimate(estimate: &OrderEstimate) -> String {
    let mut lines = Vec::new();
    for line in &estimate.lines {
        lines.push(format!(
            "{} x {} @ {} = {}",
            line.quantity, line.name, line.unit_price, line.subtotal
        ));
    }
    if let Some(plan) = &estimate.plan {
        lines.push(format!("{plan} plan = {}", estimate.plan_price));
    }
    lines.push(format!("Total: {}", estimate.total));
    if estimate.savings > Money::ZERO {
        lines.push(format!("You save {}", estimate.savings));
    }
    lines.join("\n")
}

pub fn receipt(receipt: &SubmissionReceipt) -> String {
    match receipt.received_at {
        Some(at) => format!("Order reference {} (received {})", receipt.order_id, at.to_rfc3339()),
        None => format!("Order reference {}", receipt.order_id),
    }
}

#[cfg(test)]
#[path = "tests/render_tests.rs"]
mod tests;
