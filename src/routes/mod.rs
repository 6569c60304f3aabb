use std::sync::Arc;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use lettre::message::Mailbox;
use tower_http::cors::CorsLayer;

use crate::{config::EmailConfig, email::Mailer};

mod health;
mod send_email;

pub use send_email::{JsonSubmission, SubmissionPayload};

#[derive(Clone)]
pub struct AppState {
    pub mailer: Arc<dyn Mailer>,
    pub sender: Mailbox,
    pub receiver: Mailbox,
}

impl AppState {
    pub fn new(config: &EmailConfig, mailer: Arc<dyn Mailer>) -> Result<Self, String> {
        Ok(Self {
            mailer,
            sender: config.sender_mailbox()?,
            receiver: config.receiver_mailbox()?,
        })
    }
}

pub fn router(app_state: AppState, max_body_bytes: usize) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/send-email", post(send_email::action))
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(CorsLayer::permissive())
        .with_state(app_state)
}
