use std::sync::{Arc, Mutex};

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use pricesheet::app::{AppState, router};
use pricesheet::mailer::{MailError, MailSender, OutgoingCsv};

/// Records outgoing mail instead of talking to an SMTP server.
#[derive(Default)]
struct StubMailer {
    sent: Mutex<Vec<OutgoingCsv>>,
    fail: bool,
}

impl MailSender for StubMailer {
    fn send_csv(&self, mail: &OutgoingCsv) -> Result<(), MailError> {
        if self.fail {
            return Err(MailError::Smtp("connection refused".to_string()));
        }
        self.sent.lock().unwrap().push(mail.clone());
        Ok(())
    }
}

fn app(stub: &Arc<StubMailer>) -> Router {
    router(Arc::new(AppState {
        mailer: stub.clone(),
    }))
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn sample_row() -> Value {
    json!({
        "itemNumber": "1234567",
        "country": "NOR",
        "newPrice": "19.90",
        "productLifecycle": "ZA",
        "activationDate": "2024-03-01"
    })
}

#[tokio::test]
async fn health_reports_ok() {
    let stub = Arc::new(StubMailer::default());
    let response = app(&stub)
        .oneshot(
            Request::builder()
                .uri("/api/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!({ "ok": true }));
}

#[tokio::test]
async fn send_csv_encodes_rows_and_hands_them_to_the_mailer() {
    let stub = Arc::new(StubMailer::default());
    let payload = json!({
        "recipientEmail": "buyer@example.com",
        "subject": "March prices",
        "message": "See attachment.",
        "rows": [sample_row()]
    });

    let response = app(&stub)
        .oneshot(post_json("/api/send-csv", payload))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!({ "ok": true }));

    let sent = stub.sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    let mail = &sent[0];
    assert_eq!(mail.recipient, "buyer@example.com");
    assert_eq!(mail.subject, "March prices");
    assert_eq!(mail.message, "See attachment.");
    assert!(mail.filename.starts_with("items-"));
    assert!(mail.filename.ends_with(".csv"));
    assert!(mail.csv.starts_with(
        "ITEM NUMBER;COUNTRY;NEW PRICE;NEW PRODUCT LIFECYCLE;ACTIVATION DATE;KEY\n"
    ));
    assert!(mail.csv.contains("1234567;NOR;19.90;ZA;2024-03-01;NOR1234567"));
}

#[tokio::test]
async fn send_csv_defaults_subject_and_message() {
    let stub = Arc::new(StubMailer::default());
    let payload = json!({
        "recipientEmail": "buyer@example.com",
        "rows": [sample_row()]
    });

    let response = app(&stub)
        .oneshot(post_json("/api/send-csv", payload))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let sent = stub.sent.lock().unwrap();
    assert_eq!(sent[0].subject, "Item price update");
    assert_eq!(sent[0].message, "Attached: 1 item price row(s).");
}

#[tokio::test]
async fn send_csv_requires_a_recipient() {
    let stub = Arc::new(StubMailer::default());
    let payload = json!({
        "recipientEmail": "  ",
        "rows": [sample_row()]
    });

    let response = app(&stub)
        .oneshot(post_json("/api/send-csv", payload))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await,
        json!({ "error": "recipientEmail is required" })
    );
    assert!(stub.sent.lock().unwrap().is_empty());
}

#[tokio::test]
async fn send_csv_requires_at_least_one_row() {
    let stub = Arc::new(StubMailer::default());

    for rows in [json!([]), json!([{ "itemNumber": "", "country": " " }])] {
        let payload = json!({
            "recipientEmail": "buyer@example.com",
            "rows": rows
        });
        let response = app(&stub)
            .oneshot(post_json("/api/send-csv", payload))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await,
            json!({ "error": "at least one row is required" })
        );
    }
    assert!(stub.sent.lock().unwrap().is_empty());
}

#[tokio::test]
async fn send_csv_rejects_invalid_rows() {
    let stub = Arc::new(StubMailer::default());
    let mut row = sample_row();
    row["itemNumber"] = json!("12345");
    let payload = json!({
        "recipientEmail": "buyer@example.com",
        "rows": [row]
    });

    let response = app(&stub)
        .oneshot(post_json("/api/send-csv", payload))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    let message = body["error"].as_str().unwrap();
    assert!(message.contains("7 digits"), "unexpected error: {}", message);
    assert!(stub.sent.lock().unwrap().is_empty());
}

#[tokio::test]
async fn send_csv_maps_transport_failure_to_a_generic_500() {
    let stub = Arc::new(StubMailer {
        fail: true,
        ..StubMailer::default()
    });
    let payload = json!({
        "recipientEmail": "buyer@example.com",
        "rows": [sample_row()]
    });

    let response = app(&stub)
        .oneshot(post_json("/api/send-csv", payload))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    // The SMTP detail stays in the log, not in the response.
    assert_eq!(
        body_json(response).await,
        json!({ "error": "failed to send email" })
    );
}

#[tokio::test]
async fn export_csv_returns_a_download() {
    let stub = Arc::new(StubMailer::default());
    let payload = json!({ "rows": [sample_row()] });

    let response = app(&stub)
        .oneshot(post_json("/api/export-csv", payload))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "text/csv; charset=utf-8"
    );
    let disposition = response.headers()[header::CONTENT_DISPOSITION]
        .to_str()
        .unwrap()
        .to_string();
    assert!(disposition.starts_with("attachment; filename=\"items-"));

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let csv = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(csv.starts_with(
        "ITEM NUMBER;COUNTRY;NEW PRICE;NEW PRODUCT LIFECYCLE;ACTIVATION DATE;KEY\n"
    ));
    assert!(csv.contains(";NOR1234567"));
}

#[tokio::test]
async fn export_csv_rejects_invalid_rows() {
    let stub = Arc::new(StubMailer::default());
    let mut row = sample_row();
    row["country"] = json!("DEN");
    let payload = json!({ "rows": [row] });

    let response = app(&stub)
        .oneshot(post_json("/api/export-csv", payload))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert!(body["error"].as_str().unwrap().contains("unknown country"));
}
