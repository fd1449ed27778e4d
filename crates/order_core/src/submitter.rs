use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Client, StatusCode};
use shared::{
    error::{ApiError, ErrorCode, SubmissionError},
    protocol::{OrderRequest, SubmissionReceipt},
};
use tracing::{info, warn};

/// External party that accepts a composed order (CRM, order desk, ...).
#[async_trait]
pub trait OrderSubmitter: Send + Sync {
    async fn submit(&self, request: &OrderRequest) -> Result<SubmissionReceipt, SubmissionError>;
}

/// Posts orders as JSON to `{endpoint}/orders`.
pub struct HttpOrderSubmitter {
    http: Client,
    endpoint: String,
}

impl HttpOrderSubmitter {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self::with_client(Client::new(), endpoint)
    }

    pub fn with_client(http: Client, endpoint: impl Into<String>) -> Self {
        let endpoint = endpoint.into();
        Self {
            http,
            endpoint: endpoint.trim_end_matches('/').to_string(),
        }
    }

    pub fn orders_url(&self) -> String {
        format!("{}/orders", self.endpoint)
    }
}

#[async_trait]
impl OrderSubmitter for HttpOrderSubmitter {
    async fn submit(&self, request: &OrderRequest) -> Result<SubmissionReceipt, SubmissionError> {
        let res = self
            .http
            .post(self.orders_url())
            .json(request)
            .send()
            .await
            .map_err(|err| SubmissionError::Transport(err.to_string()))?;

        let status = res.status();
        if status.is_success() {
            return res.json::<SubmissionReceipt>().await.map_err(|err| {
                SubmissionError::Transport(format!("unreadable order receipt: {err}"))
            });
        }

        let body = res.text().await.unwrap_or_default();
        warn!(%status, request_id = %request.request_id, "order endpoint refused request");
        Err(match serde_json::from_str::<ApiError>(&body) {
            Ok(api_error) => api_error.into(),
            Err(_) => SubmissionError::Rejected {
                code: code_for_status(status),
                message: format!("order endpoint returned {status}"),
            },
        })
    }
}

fn code_for_status(status: StatusCode) -> ErrorCode {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ErrorCode::Unauthorized,
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => ErrorCode::Validation,
        StatusCode::TOO_MANY_REQUESTS => ErrorCode::RateLimited,
        StatusCode::BAD_GATEWAY | StatusCode::SERVICE_UNAVAILABLE | StatusCode::GATEWAY_TIMEOUT => {
            ErrorCode::Unavailable
        }
        _ => ErrorCode::Internal,
    }
}

/// Logs the order and acknowledges it locally. Useful without an order endpoint.
pub struct LoggingSubmitter;

#[async_trait]
impl OrderSubmitter for LoggingSubmitter {
    async fn submit(&self, request: &OrderRequest) -> Result<SubmissionReceipt, SubmissionError> {
        let payload = serde_json::to_string(request)
            .map_err(|err| SubmissionError::Transport(err.to_string()))?;
        info!(
            request_id = %request.request_id,
            total_items = request.cart.total_items(),
            plan = request.selected_plan.as_ref().map(|plan| plan.as_str()),
            %payload,
            "order form submitted"
        );
        Ok(SubmissionReceipt {
            order_id: format!("local-{}", request.request_id.simple()),
            received_at: Some(Utc::now()),
        })
    }
}

#[cfg(test)]
#[path = "tests/submitter_tests.rs"]
mod tests;
