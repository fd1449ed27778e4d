//! Cart and order composition for the tiffin ordering page.
//!
//! A session owns one visitor's cart, contact form and plan choice. Every
//! interaction is a [`SessionCommand`] applied by [`OrderSession::dispatch`];
//! [`SessionHandle`] puts a command queue in front of a session so callers on
//! other tasks are serialized.

pub mod cart;
pub mod composer;
pub mod events;
pub mod handle;
pub mod notify;
pub mod pipeline;
pub mod session;
pub mod submitter;

pub use cart::CartState;
pub use composer::compose;
pub use events::SessionEvent;
pub use handle::SessionHandle;
pub use notify::{BroadcastNotifier, NotificationSink, TracingNotifier};
pub use pipeline::{validate_contact, SubmissionPipeline, SubmissionState, SUCCESS_MESSAGE};
pub use session::{OrderSession, SessionCommand, SessionOptions, SessionUpdate, SessionView};
pub use submitter::{HttpOrderSubmitter, LoggingSubmitter, OrderSubmitter};

#[cfg(test)]
#[path = "tests/support.rs"]
mod test_support;
