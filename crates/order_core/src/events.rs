//! Events published by an order session for a rendering layer to follow.

use shared::{
    domain::{ItemId, PlanName},
    protocol::SubmissionReceipt,
};

use crate::pipeline::SubmissionState;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    StateChanged(SubmissionState),
    CartUpdated {
        item_id: ItemId,
        quantity: u32,
        total_items: u64,
    },
    PlanSelected(Option<PlanName>),
    FormReset,
    OrderAccepted(SubmissionReceipt),
}
