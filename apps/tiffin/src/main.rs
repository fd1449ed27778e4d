use std::sync::Arc;

use anyhow::{Context, Result};
use catalog::CatalogStore;
use clap::Parser;
use order_core::{
    compose, BroadcastNotifier, HttpOrderSubmitter, LoggingSubmitter, OrderSession,
    OrderSubmitter, SessionCommand, SessionHandle, SessionOptions,
};
use shared::{domain::ContactField, error::OrderError};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod cli;
mod config;
mod render;

use cli::{Cli, Command, OrderArgs};
use config::{load_settings, Settings};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut settings = load_settings(cli.config.as_deref());
    if let Some(path) = cli.catalog {
        settings.catalog_path = Some(path);
    }
    if let Command::Order(args) = &cli.command {
        apply_order_overrides(&mut settings, args);
    }
    settings.validate().context("invalid tiffin settings")?;

    let catalog = Arc::new(load_catalog(&settings)?);

    match cli.command {
        Command::Menu => println!("{}", render::menu(catalog.list_menu_items())),
        Command::Plans => println!("{}", render::plans(catalog.list_plans())),
        Command::Order(args) => place_order(catalog, &settings, args).await?,
    }

    Ok(())
}

fn apply_order_overrides(settings: &mut Settings, args: &OrderArgs) {
    if let Some(endpoint) = &args.endpoint {
        settings.submit_endpoint = Some(endpoint.clone());
    }
    if let Some(timeout_ms) = args.timeout_ms {
        settings.submit_timeout_ms = timeout_ms;
    }
}

fn load_catalog(settings: &Settings) -> Result<CatalogStore> {
    match &settings.catalog_path {
        Some(path) => CatalogStore::load(path),
        None => Ok(CatalogStore::tiffin_default()),
    }
}

/// `--no-plan` and `--plan` win over the configured default plan.
fn chosen_plan(settings: &Settings, plan: Option<String>, no_plan: bool) -> Option<String> {
    if no_plan {
        None
    } else {
        plan.or_else(|| settings.default_plan.clone())
    }
}

async fn place_order(catalog: Arc<CatalogStore>, settings: &Settings, args: OrderArgs) -> Result<()> {
    let submitter: Arc<dyn OrderSubmitter> = match &settings.submit_endpoint {
        Some(endpoint) => Arc::new(HttpOrderSubmitter::new(endpoint.clone())),
        None => {
            info!("no submit endpoint configured; orders are logged only");
            Arc::new(LoggingSubmitter)
        }
    };
    let notifier = Arc::new(BroadcastNotifier::new(8));
    let mut notifications = notifier.subscribe();

    let OrderArgs {
        items,
        plan,
        no_plan,
        name,
        phone,
        email,
        address,
        meal_type,
        message,
        ..
    } = args;

    let options = SessionOptions {
        default_plan: chosen_plan(settings, plan, no_plan),
        submit_timeout: settings.submit_timeout(),
        ..SessionOptions::default()
    };
    let session = OrderSession::new(catalog.clone(), submitter, notifier, options)
        .context("failed to start order session")?;
    let (handle, task) = SessionHandle::spawn(session, settings.command_queue_capacity);

    for (item_id, delta) in items {
        handle
            .dispatch(SessionCommand::AdjustCart { item_id, delta })
            .await?;
    }

    let fields = [
        (ContactField::Name, name),
        (ContactField::Phone, phone),
        (ContactField::Email, email),
        (ContactField::Address, address),
        (ContactField::MealType, meal_type),
        (ContactField::Message, message),
    ];
    for (field, value) in fields {
        if let Some(value) = value {
            handle
                .dispatch(SessionCommand::EditField { field, value })
                .await?;
        }
    }

    let view = handle.dispatch(SessionCommand::Snapshot).await?.view;
    match compose(&view.cart, &view.contact, view.selected_plan.as_ref()) {
        Ok(request) => println!("{}", render::estimate(&catalog.estimate(&request)?)),
        // submit reports it
        Err(OrderError::EmptyOrder) => {}
        Err(err) => return Err(err.into()),
    }

    let outcome = handle.dispatch(SessionCommand::Submit).await;
    while let Ok(notification) = notifications.try_recv() {
        println!("{}", notification.message);
    }

    drop(handle);
    task.await.context("order session task failed")?;

    match outcome {
        Ok(update) => {
            if let Some(receipt) = update.receipt {
                println!("{}", render::receipt(&receipt));
            }
            Ok(())
        }
        Err(err) => {
            if let Some(field) = err.field() {
                warn!(%field, "order form needs attention");
            }
            Err(err).context("order was not placed")
        }
    }
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
