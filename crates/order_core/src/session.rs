use std::{sync::Arc, time::Duration};

use catalog::CatalogStore;
use shared::{
    domain::{ContactField, ItemId, PlanName, PricingPlan},
    error::OrderError,
    protocol::{CartSnapshot, ContactFormInput, SubmissionReceipt},
};
use tokio::sync::broadcast;
use tracing::{debug, info};

use crate::{
    cart::CartState,
    events::SessionEvent,
    notify::NotificationSink,
    pipeline::{SubmissionPipeline, SubmissionState, DEFAULT_SUBMIT_TIMEOUT},
    submitter::OrderSubmitter,
};

const DEFAULT_EVENT_CAPACITY: usize = 64;

/// Everything a visitor can do on the order page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    AdjustCart { item_id: ItemId, delta: i32 },
    EditField { field: ContactField, value: String },
    SelectPlan(Option<String>),
    Submit,
    Snapshot,
}

impl SessionCommand {
    pub fn name(&self) -> &'static str {
        match self {
            SessionCommand::AdjustCart { .. } => "adjust_cart",
            SessionCommand::EditField { .. } => "edit_field",
            SessionCommand::SelectPlan(_) => "select_plan",
            SessionCommand::Submit => "submit",
            SessionCommand::Snapshot => "snapshot",
        }
    }
}

/// Read-only copy of session state for rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionView {
    pub cart: CartSnapshot,
    pub total_items: u64,
    pub contact: ContactFormInput,
    pub selected_plan: Option<PlanName>,
    pub state: SubmissionState,
    pub last_error: Option<OrderError>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionUpdate {
    pub view: SessionView,
    /// New quantity after an `AdjustCart`.
    pub quantity: Option<u32>,
    /// Collaborator acknowledgment after a successful `Submit`.
    pub receipt: Option<SubmissionReceipt>,
}

#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub default_plan: Option<String>,
    pub submit_timeout: Duration,
    pub event_capacity: usize,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            default_plan: Some("monthly".into()),
            submit_timeout: DEFAULT_SUBMIT_TIMEOUT,
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }
}

/// One visitor's cart, contact form and plan choice.
///
/// All mutation goes through `&mut self`, so a session is only ever changed by
/// one command at a time.
pub struct OrderSession {
    catalog: Arc<CatalogStore>,
    cart: CartState,
    contact: ContactFormInput,
    selected_plan: Option<PlanName>,
    pipeline: SubmissionPipeline,
    last_error: Option<OrderError>,
    events: broadcast::Sender<SessionEvent>,
}

impl OrderSession {
    pub fn new(
        catalog: Arc<CatalogStore>,
        submitter: Arc<dyn OrderSubmitter>,
        notifier: Arc<dyn NotificationSink>,
        options: SessionOptions,
    ) -> Result<Self, OrderError> {
        let selected_plan = match options.default_plan.as_deref() {
            Some(name) => Some(resolve_plan(&catalog, name)?.name.clone()),
            None => None,
        };
        let (events, _) = broadcast::channel(options.event_capacity.max(1));
        let pipeline =
            SubmissionPipeline::new(submitter, notifier, options.submit_timeout, events.clone());

        Ok(Self {
            cart: CartState::new(catalog.clone()),
            catalog,
            contact: ContactFormInput::default(),
            selected_plan,
            pipeline,
            last_error: None,
            events,
        })
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// Applies one command. Failures are also kept as `last_error` for inline display
    /// until the next command that succeeds.
    pub async fn dispatch(&mut self, command: SessionCommand) -> Result<SessionUpdate, OrderError> {
        let mut quantity = None;
        let mut receipt = None;
        let result = match command {
            SessionCommand::AdjustCart { item_id, delta } => self
                .adjust(&item_id, delta)
                .map(|qty| quantity = Some(qty)),
            SessionCommand::EditField { field, value } => {
                self.edit_field(field, value);
                Ok(())
            }
            SessionCommand::SelectPlan(name) => self.select_plan(name.as_deref()).map(|_| ()),
            SessionCommand::Submit => self.submit().await.map(|ack| receipt = Some(ack)),
            SessionCommand::Snapshot => {
                return Ok(SessionUpdate {
                    view: self.view(),
                    quantity: None,
                    receipt: None,
                })
            }
        };

        match result {
            Ok(()) => {
                self.last_error = None;
                Ok(SessionUpdate {
                    view: self.view(),
                    quantity,
                    receipt,
                })
            }
            Err(err) => {
                self.last_error = Some(err.clone());
                Err(err)
            }
        }
    }

    pub fn adjust(&mut self, item_id: &ItemId, delta: i32) -> Result<u32, OrderError> {
        let quantity = self.cart.adjust(item_id, delta)?;
        let _ = self.events.send(SessionEvent::CartUpdated {
            item_id: item_id.clone(),
            quantity,
            total_items: self.cart.total_items(),
        });
        Ok(quantity)
    }

    pub fn edit_field(&mut self, field: ContactField, value: impl Into<String>) {
        self.contact.set(field, value);
        debug!(field = %field, "contact field edited");
    }

    /// Chooses a plan by name (any case), or clears the choice with `None`.
    pub fn select_plan(&mut self, name: Option<&str>) -> Result<Option<&PricingPlan>, OrderError> {
        let plan = match name {
            Some(name) => Some(resolve_plan(&self.catalog, name)?),
            None => None,
        };
        self.selected_plan = plan.map(|plan| plan.name.clone());
        info!(plan = ?self.selected_plan, "plan selected");
        let _ = self
            .events
            .send(SessionEvent::PlanSelected(self.selected_plan.clone()));
        Ok(plan)
    }

    pub async fn submit(&mut self) -> Result<SubmissionReceipt, OrderError> {
        self.pipeline
            .run(
                &mut self.cart,
                &mut self.contact,
                self.selected_plan.as_ref(),
            )
            .await
    }

    pub fn view(&self) -> SessionView {
        SessionView {
            cart: self.cart.snapshot(),
            total_items: self.cart.total_items(),
            contact: self.contact.clone(),
            selected_plan: self.selected_plan.clone(),
            state: self.pipeline.state(),
            last_error: self.last_error.clone(),
        }
    }

    pub fn catalog(&self) -> &Arc<CatalogStore> {
        &self.catalog
    }

    pub fn cart(&self) -> &CartState {
        &self.cart
    }

    pub fn contact(&self) -> &ContactFormInput {
        &self.contact
    }

    pub fn selected_plan(&self) -> Option<&PlanName> {
        self.selected_plan.as_ref()
    }

    pub fn state(&self) -> SubmissionState {
        self.pipeline.state()
    }

    pub fn last_error(&self) -> Option<&OrderError> {
        self.last_error.as_ref()
    }
}

fn resolve_plan<'a>(catalog: &'a CatalogStore, name: &str) -> Result<&'a PricingPlan, OrderError> {
    catalog.plan(name).ok_or_else(|| OrderError::UnknownPlan {
        plan: PlanName::new(name.trim()),
    })
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
