use super::*;

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use shared::{
    domain::{ItemId, PlanName},
    protocol::{CartSnapshot, ContactFormInput},
};
use tokio::{
    net::TcpListener,
    sync::{oneshot, Mutex},
};

use crate::composer::compose;

#[derive(Clone)]
struct IntakeState {
    tx: Arc<Mutex<Option<oneshot::Sender<OrderRequest>>>>,
}

async fn accept_order(
    State(state): State<IntakeState>,
    Json(payload): Json<OrderRequest>,
) -> Json<SubmissionReceipt> {
    let order_id = format!("ORD-{}", payload.request_id.simple());
    if let Some(tx) = state.tx.lock().await.take() {
        let _ = tx.send(payload);
    }
    Json(SubmissionReceipt {
        order_id,
        received_at: None,
    })
}

async fn reject_with_body() -> (StatusCode, Json<ApiError>) {
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(ApiError::new(
            ErrorCode::Validation,
            "we do not deliver to that pincode",
        )),
    )
}

async fn reject_plain() -> StatusCode {
    StatusCode::SERVICE_UNAVAILABLE
}

async fn serve(app: Router) -> String {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    format!("http://{addr}")
}

async fn spawn_intake_server() -> (String, oneshot::Receiver<OrderRequest>) {
    let (tx, rx) = oneshot::channel();
    let state = IntakeState {
        tx: Arc::new(Mutex::new(Some(tx))),
    };
    let app = Router::new()
        .route("/orders", post(accept_order))
        .with_state(state);
    (serve(app).await, rx)
}

fn sample_request() -> OrderRequest {
    let cart: CartSnapshot = [(ItemId::from("north-indian"), 2)].into_iter().collect();
    let contact = ContactFormInput {
        name: "Asha Verma".into(),
        phone: "+91 98765 43210".into(),
        address: "4 Lake View Road, Pune".into(),
        ..ContactFormInput::default()
    };
    compose(&cart, &contact, Some(&PlanName::from("Monthly"))).expect("compose")
}

#[tokio::test]
async fn http_submitter_posts_order_and_reads_receipt() {
    let (server_url, payload_rx) = spawn_intake_server().await;
    let submitter = HttpOrderSubmitter::new(format!("{server_url}/"));
    let request = sample_request();

    let receipt = submitter.submit(&request).await.expect("submit");
    assert_eq!(
        receipt.order_id,
        format!("ORD-{}", request.request_id.simple())
    );

    let received = payload_rx.await.expect("payload");
    assert_eq!(received, request);
    assert_eq!(received.cart.quantity_of(&ItemId::from("north-indian")), 2);
    assert_eq!(received.selected_plan, Some(PlanName::from("Monthly")));
}

#[tokio::test]
async fn http_submitter_surfaces_api_error_body() {
    let server_url = serve(Router::new().route("/orders", post(reject_with_body))).await;
    let submitter = HttpOrderSubmitter::new(server_url);

    let err = submitter
        .submit(&sample_request())
        .await
        .expect_err("rejected");
    assert_eq!(
        err,
        SubmissionError::Rejected {
            code: ErrorCode::Validation,
            message: "we do not deliver to that pincode".into(),
        }
    );
}

#[tokio::test]
async fn http_submitter_maps_bare_status_codes() {
    let server_url = serve(Router::new().route("/orders", post(reject_plain))).await;
    let submitter = HttpOrderSubmitter::new(server_url);

    match submitter.submit(&sample_request()).await {
        Err(SubmissionError::Rejected { code, message }) => {
            assert_eq!(code, ErrorCode::Unavailable);
            assert!(message.contains("503"), "{message}");
        }
        other => panic!("expected rejection, got {other:?}"),
    }
}

#[tokio::test]
async fn http_submitter_reports_unreachable_endpoint_as_transport() {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let submitter = HttpOrderSubmitter::new(format!("http://{addr}"));
    let err = submitter
        .submit(&sample_request())
        .await
        .expect_err("nothing listening");
    assert!(matches!(err, SubmissionError::Transport(_)), "{err:?}");
}

#[test]
fn orders_url_ignores_trailing_slashes() {
    let submitter = HttpOrderSubmitter::new("https://orders.example.in/api//");
    assert_eq!(submitter.orders_url(), "https://orders.example.in/api/orders");
}

#[test]
fn status_codes_map_to_error_codes() {
    assert_eq!(code_for_status(StatusCode::FORBIDDEN), ErrorCode::Unauthorized);
    assert_eq!(code_for_status(StatusCode::BAD_REQUEST), ErrorCode::Validation);
    assert_eq!(
        code_for_status(StatusCode::TOO_MANY_REQUESTS),
        ErrorCode::RateLimited
    );
    assert_eq!(
        code_for_status(StatusCode::GATEWAY_TIMEOUT),
        ErrorCode::Unavailable
    );
    assert_eq!(
        code_for_status(StatusCode::INTERNAL_SERVER_ERROR),
        ErrorCode::Internal
    );
}

#[tokio::test]
async fn logging_submitter_acknowledges_locally() {
    let request = sample_request();
    let receipt = LoggingSubmitter.submit(&request).await.expect("logged");
    assert_eq!(
        receipt.order_id,
        format!("local-{}", request.request_id.simple())
    );
    assert!(receipt.received_at.is_some());
}
