use std::{sync::Arc, time::Duration};

use serde::Serialize;
use shared::{
    domain::{ContactField, MealPreference, PlanName},
    error::{OrderError, SubmissionError},
    protocol::{ContactFormInput, Notification, OrderRequest, SubmissionReceipt},
};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::{
    cart::CartState, composer::compose, events::SessionEvent, notify::NotificationSink,
    submitter::OrderSubmitter,
};

pub const SUCCESS_MESSAGE: &str = "Thank you! We'll contact you soon to confirm your order.";
pub const DEFAULT_SUBMIT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionState {
    #[default]
    Idle,
    Validating,
    Submitting,
    Succeeded,
    Failed,
}

/// Drives one submit attempt: validate, hand off, then reset on success only.
pub struct SubmissionPipeline {
    submitter: Arc<dyn OrderSubmitter>,
    notifier: Arc<dyn NotificationSink>,
    timeout: Duration,
    state: SubmissionState,
    events: broadcast::Sender<SessionEvent>,
}

impl SubmissionPipeline {
    pub fn new(
        submitter: Arc<dyn OrderSubmitter>,
        notifier: Arc<dyn NotificationSink>,
        timeout: Duration,
        events: broadcast::Sender<SessionEvent>,
    ) -> Self {
        Self {
            submitter,
            notifier,
            timeout,
            state: SubmissionState::Idle,
            events,
        }
    }

    pub fn state(&self) -> SubmissionState {
        self.state
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Runs a full submit cycle and always ends back in `Idle`, including when
    /// the returned future is dropped before it completes.
    ///
    /// Validation failures never reach the submitter. Cart and form are cleared
    /// only once the submitter acknowledges; a rejection or timeout leaves both
    /// as they were so the user can retry.
    pub async fn run(
        &mut self,
        cart: &mut CartState,
        contact: &mut ContactFormInput,
        plan: Option<&PlanName>,
    ) -> Result<SubmissionReceipt, OrderError> {
        let Self {
            submitter,
            notifier,
            timeout,
            state,
            events,
        } = self;
        let mut machine = Transitions { state, events };

        machine.to(SubmissionState::Validating);
        let request = match validate(cart, contact, plan) {
            Ok(request) => request,
            Err(err) => {
                info!(error = %err, "order failed validation");
                machine.to(SubmissionState::Failed);
                machine.to(SubmissionState::Idle);
                return Err(err);
            }
        };

        machine.to(SubmissionState::Submitting);
        let outcome = match tokio::time::timeout(*timeout, submitter.submit(&request)).await {
            Ok(result) => result,
            Err(_) => Err(SubmissionError::Timeout(*timeout)),
        };

        match outcome {
            Ok(receipt) => {
                machine.to(SubmissionState::Succeeded);
                cart.clear();
                contact.reset();
                info!(
                    request_id = %request.request_id,
                    order_id = %receipt.order_id,
                    "order accepted"
                );
                let _ = machine.events.send(SessionEvent::FormReset);
                let _ = machine
                    .events
                    .send(SessionEvent::OrderAccepted(receipt.clone()));
                notifier.notify(Notification::success(SUCCESS_MESSAGE));
                machine.to(SubmissionState::Idle);
                Ok(receipt)
            }
            Err(err) => {
                machine.to(SubmissionState::Failed);
                warn!(request_id = %request.request_id, error = %err, "order submission failed");
                notifier.notify(Notification::failure(failure_message(&err)));
                machine.to(SubmissionState::Idle);
                Err(err.into())
            }
        }
    }
}

/// Publishes state changes for one run. Dropping it before the run reaches
/// `Idle` (a cancelled submit) moves the machine back to `Idle`.
struct Transitions<'a> {
    state: &'a mut SubmissionState,
    events: &'a broadcast::Sender<SessionEvent>,
}

impl Transitions<'_> {
    fn to(&mut self, next: SubmissionState) {
        debug!(from = ?*self.state, to = ?next, "submission state");
        *self.state = next;
        let _ = self.events.send(SessionEvent::StateChanged(next));
    }
}

impl Drop for Transitions<'_> {
    fn drop(&mut self) {
        if *self.state != SubmissionState::Idle {
            warn!(state = ?*self.state, "submission abandoned before completion");
            self.to(SubmissionState::Idle);
        }
    }
}

fn validate(
    cart: &CartState,
    contact: &ContactFormInput,
    plan: Option<&PlanName>,
) -> Result<OrderRequest, OrderError> {
    validate_contact(contact)?;
    let request = compose(&cart.snapshot(), contact, plan)?;
    if let Some(plan) = &request.selected_plan {
        if cart.catalog().plan(plan.as_str()).is_none() {
            return Err(OrderError::UnknownPlan { plan: plan.clone() });
        }
    }
    Ok(request)
}

/// Checks the contact form, reporting the first violated field.
pub fn validate_contact(contact: &ContactFormInput) -> Result<(), OrderError> {
    for field in ContactField::REQUIRED {
        if contact.get(field).trim().is_empty() {
            return Err(OrderError::validation(field, "is required"));
        }
    }

    let email = contact.email.trim();
    if !email.is_empty() && !looks_like_email(email) {
        return Err(OrderError::validation(
            ContactField::Email,
            "must look like name@example.com",
        ));
    }

    let meal_type = contact.meal_type.trim();
    if !meal_type.is_empty() {
        meal_type
            .parse::<MealPreference>()
            .map_err(|reason| OrderError::validation(ContactField::MealType, reason))?;
    }

    Ok(())
}

fn looks_like_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && !email.chars().any(char::is_whitespace)
        && domain
            .split_once('.')
            .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty() && !tld.ends_with('.'))
}

fn failure_message(err: &SubmissionError) -> String {
    match err {
        SubmissionError::Timeout(_) => {
            "We couldn't reach our order desk in time. Your order details are saved, please try again."
                .to_string()
        }
        SubmissionError::Rejected { message, .. } => {
            format!("We couldn't place your order: {message}. Your order details are saved.")
        }
        SubmissionError::Transport(_) => {
            "We couldn't send your order right now. Your order details are saved, please try again."
                .to_string()
        }
    }
}

#[cfg(test)]
#[path = "tests/pipeline_tests.rs"]
mod tests;
