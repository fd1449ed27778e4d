//! Test doubles shared by the pipeline, session and handle tests.

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex as StdMutex,
};

use async_trait::async_trait;
use catalog::CatalogStore;
use shared::{
    domain::{ContactField, ItemId},
    error::{ErrorCode, SubmissionError},
    protocol::{ContactFormInput, Notification, OrderRequest, SubmissionReceipt},
};
use tokio::sync::{broadcast, Mutex, Notify};

use crate::{
    events::SessionEvent,
    notify::NotificationSink,
    pipeline::SubmissionState,
    session::{OrderSession, SessionOptions},
    submitter::OrderSubmitter,
};

pub enum Mode {
    Accept,
    Reject,
    Hang,
    Gate {
        entered: Arc<Notify>,
        release: Arc<Notify>,
    },
}

pub struct RecordingSubmitter {
    mode: Mode,
    reject_first: AtomicUsize,
    pub requests: Mutex<Vec<OrderRequest>>,
}

impl RecordingSubmitter {
    pub fn accepting() -> Arc<Self> {
        Self::with_mode(Mode::Accept)
    }

    pub fn rejecting() -> Arc<Self> {
        Self::with_mode(Mode::Reject)
    }

    pub fn hanging() -> Arc<Self> {
        Self::with_mode(Mode::Hang)
    }

    pub fn gated(entered: Arc<Notify>, release: Arc<Notify>) -> Arc<Self> {
        Self::with_mode(Mode::Gate { entered, release })
    }

    /// Rejects the first `count` submissions, then accepts.
    pub fn flaky(count: usize) -> Arc<Self> {
        Arc::new(Self {
            mode: Mode::Accept,
            reject_first: AtomicUsize::new(count),
            requests: Mutex::new(Vec::new()),
        })
    }

    fn with_mode(mode: Mode) -> Arc<Self> {
        Arc::new(Self {
            mode,
            reject_first: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub async fn calls(&self) -> usize {
        self.requests.lock().await.len()
    }
}

pub fn rejection() -> SubmissionError {
    SubmissionError::Rejected {
        code: ErrorCode::Unavailable,
        message: "order desk offline".into(),
    }
}

#[async_trait]
impl OrderSubmitter for RecordingSubmitter {
    async fn submit(&self, request: &OrderRequest) -> Result<SubmissionReceipt, SubmissionError> {
        self.requests.lock().await.push(request.clone());

        let pending_rejections = self.reject_first.load(Ordering::SeqCst);
        if pending_rejections > 0 {
            self.reject_first.store(pending_rejections - 1, Ordering::SeqCst);
            return Err(rejection());
        }

        match &self.mode {
            Mode::Accept => {}
            Mode::Reject => return Err(rejection()),
            Mode::Hang => std::future::pending::<()>().await,
            Mode::Gate { entered, release } => {
                entered.notify_one();
                release.notified().await;
            }
        }

        Ok(SubmissionReceipt {
            order_id: format!("ORD-{}", request.request_id.simple()),
            received_at: None,
        })
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    pub seen: StdMutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn all(&self) -> Vec<Notification> {
        self.seen.lock().expect("notifier lock").clone()
    }
}

impl NotificationSink for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        self.seen.lock().expect("notifier lock").push(notification);
    }
}

pub fn tiffin_catalog() -> Arc<CatalogStore> {
    Arc::new(CatalogStore::tiffin_default())
}

pub fn item(raw: &str) -> ItemId {
    ItemId::from(raw)
}

pub fn valid_contact() -> ContactFormInput {
    ContactFormInput {
        name: "Asha Verma".into(),
        phone: "+91 98765 43210".into(),
        email: "asha@example.com".into(),
        address: "4 Lake View Road, Pune".into(),
        meal_type: "vegetarian".into(),
        message: "Less spicy please".into(),
    }
}

pub fn session(
    submitter: Arc<RecordingSubmitter>,
    notifier: Arc<RecordingNotifier>,
    options: SessionOptions,
) -> OrderSession {
    OrderSession::new(tiffin_catalog(), submitter, notifier, options).expect("session")
}

pub fn fill_contact(session: &mut OrderSession, contact: &ContactFormInput) {
    for field in [
        ContactField::Name,
        ContactField::Phone,
        ContactField::Email,
        ContactField::Address,
        ContactField::MealType,
        ContactField::Message,
    ] {
        session.edit_field(field, contact.get(field));
    }
}

pub fn drain_states(rx: &mut broadcast::Receiver<SessionEvent>) -> Vec<SubmissionState> {
    let mut states = Vec::new();
    while let Ok(event) = rx.try_recv() {
        if let SessionEvent::StateChanged(state) = event {
            states.push(state);
        }
    }
    states
}
