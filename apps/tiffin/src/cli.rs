use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use shared::domain::ItemId;

#[derive(Parser, Debug)]
#[command(name = "tiffin", about = "Browse the tiffin menu and place orders")]
pub struct Cli {
    /// Settings file; defaults to ./tiffin.toml when present.
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Catalog TOML file used instead of the built-in menu.
    #[arg(long)]
    pub catalog: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List menu items.
    Menu,
    /// List subscription plans.
    Plans,
    /// Compose and submit an order.
    Order(OrderArgs),
}

#[derive(Args, Debug, Default)]
pub struct OrderArgs {
    /// Cart line as `item-id=quantity`; repeat for more items.
    #[arg(long = "item", value_parser = parse_item)]
    pub items: Vec<(ItemId, i32)>,
    #[arg(long, conflicts_with = "no_plan")]
    pub plan: Option<String>,
    /// Order without a subscription plan.
    #[arg(long)]
    pub no_plan: bool,
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub phone: Option<String>,
    #[arg(long)]
    pub email: Option<String>,
    #[arg(long)]
    pub address: Option<String>,
    #[arg(long)]
    pub meal_type: Option<String>,
    #[arg(long)]
    pub message: Option<String>,
    /// Order intake base URL; orders are only logged when unset.
    #[arg(long)]
    pub endpoint: Option<String>,
    #[arg(long)]
    pub timeout_ms: Option<u64>,
}

pub fn parse_item(raw: &str) -> Result<(ItemId, i32), String> {
    let (id, qty) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected item-id=quantity, got '{raw}'"))?;
    let id = id.trim();
    if id.is_empty() {
        return Err(format!("missing item id in '{raw}'"));
    }
    let qty = qty
        .trim()
        .parse::<i32>()
        .map_err(|_| format!("quantity in '{raw}' is not a whole number"))?;
    Ok((ItemId::new(id), qty))
}

#[cfg(test)]
#[path = "tests/cli_tests.rs"]
mod tests;
