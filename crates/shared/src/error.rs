use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{ContactField, ItemId, PlanName};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    Unauthorized,
    Validation,
    RateLimited,
    Unavailable,
    Internal,
}

/// Error body returned by an order intake endpoint that refused a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    pub code: ErrorCode,
    pub message: String,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmissionError {
    #[error("order rejected ({code:?}): {message}")]
    Rejected { code: ErrorCode, message: String },
    #[error("order submission transport failure: {0}")]
    Transport(String),
    #[error("order submission timed out after {0:?}")]
    Timeout(Duration),
}

impl From<ApiError> for SubmissionError {
    fn from(value: ApiError) -> Self {
        Self::Rejected {
            code: value.code,
            message: value.message,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderError {
    #[error("unknown menu item '{item_id}'")]
    UnknownItem { item_id: ItemId },
    #[error("unknown pricing plan '{plan}'")]
    UnknownPlan { plan: PlanName },
    #[error("order has no items and no plan selected")]
    EmptyOrder,
    #[error("invalid {field}: {reason}")]
    Validation { field: ContactField, reason: String },
    #[error(transparent)]
    Submission(#[from] SubmissionError),
    #[error("session command queue is full; please retry")]
    QueueFull,
    #[error("order session is closed")]
    SessionClosed,
}

impl OrderError {
    pub fn validation(field: ContactField, reason: impl Into<String>) -> Self {
        Self::Validation {
            field,
            reason: reason.into(),
        }
    }

    /// The form field to highlight inline, if this error is about one.
    pub fn field(&self) -> Option<ContactField> {
        match self {
            OrderError::Validation { field, .. } => Some(*field),
            _ => None,
        }
    }

    /// Errors the user fixes by editing input; these never reach the submission collaborator.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            OrderError::Validation { .. } | OrderError::EmptyOrder | OrderError::UnknownPlan { .. }
        )
    }
}
