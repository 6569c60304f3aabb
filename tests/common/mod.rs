use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, header},
};
use formrelay::{
    AppState,
    config::EmailConfig,
    email::{DeliveryError, Mailer},
};
use http_body_util::BodyExt;
use lettre::Message;
use serde_json::Value;
use tower::ServiceExt;

pub const BOUNDARY: &str = "formrelay-test-boundary";

/// Records every message instead of opening an SMTP session
#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<Message>>,
}

impl RecordingMailer {
    pub fn sessions(&self) -> usize {
        self.sent.lock().unwrap().len()
    }

    pub fn sent(&self) -> Vec<Vec<u8>> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .map(Message::formatted)
            .collect()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn deliver(&self, message: Message) -> Result<(), DeliveryError> {
        self.sent.lock().unwrap().push(message);
        Ok(())
    }
}

pub fn email_config() -> EmailConfig {
    EmailConfig {
        sender_email: "sender@example.com".to_string(),
        sender_password: "app-password".to_string(),
        receiver_email: "inbox@example.com".to_string(),
        smtp_server: "127.0.0.1".to_string(),
        smtp_port: 1,
    }
}

pub fn create_app_with(mailer: Arc<dyn Mailer>) -> Router {
    let state = AppState::new(&email_config(), mailer).unwrap();
    formrelay::routes::router(state, 1024 * 1024)
}

pub fn create_test_app() -> (Router, Arc<RecordingMailer>) {
    let mailer = Arc::new(RecordingMailer::default());
    (create_app_with(mailer.clone()), mailer)
}

pub async fn send(router: &Router, request: Request<Body>) -> (u16, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status().as_u16();
    let body = response.into_body().collect().await.unwrap().to_bytes();

    (status, serde_json::from_slice(&body).unwrap())
}

pub fn json_request(body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/send-email")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn multipart_request(fields: &[(&str, &str)], file: Option<(&str, &[u8])>) -> Request<Body> {
    let mut body = Vec::new();

    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }

    if let Some((filename, content)) = file {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"cvFile\"; filename=\"{filename}\"\r\nContent-Type: application/pdf\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(content);
        body.extend_from_slice(b"\r\n");
    }

    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri("/send-email")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}
