use axum::{
    Json,
    extract::{FromRequest, Multipart, Request, State},
    http::{StatusCode, header},
    response::IntoResponse,
};
use formrelay_submission::{
    ATTACHMENT_FIELD, Attachment, OutboundEmail, SubmissionDraft, consent_from_json,
};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::{
    error::{AppError, MessageBody},
    routes::AppState,
};

/// Body of an `application/json` submission
///
/// Text fields also accept numbers and booleans, which are kept as their JSON
/// text (`"phone": 5551234` becomes `"5551234"`).
#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct JsonSubmission {
    #[serde(deserialize_with = "lenient_text")]
    pub form_type: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub name: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub surname: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub email: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub phone: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub message: Option<String>,
    pub kvkk: Option<Value>,
    #[serde(deserialize_with = "lenient_text")]
    pub subject: Option<String>,
}

fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => None,
        Value::String(text) => Some(text),
        other => Some(other.to_string()),
    })
}

impl From<JsonSubmission> for SubmissionDraft {
    fn from(body: JsonSubmission) -> Self {
        SubmissionDraft {
            form_type: body.form_type,
            name: body.name,
            surname: body.surname,
            email: body.email,
            phone: body.phone,
            message: body.message,
            consent: body.kvkk.as_ref().map(consent_from_json),
            subject: body.subject,
            attachment: None,
        }
    }
}

/// A submission request, told apart by its `Content-Type`.
#[derive(Debug)]
pub enum SubmissionPayload {
    Json(JsonSubmission),
    Multipart(SubmissionDraft),
}

impl SubmissionPayload {
    pub fn into_draft(self) -> SubmissionDraft {
        match self {
            SubmissionPayload::Json(body) => body.into(),
            SubmissionPayload::Multipart(draft) => draft,
        }
    }
}

impl<S> FromRequest<S> for SubmissionPayload
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_owned();

        let essence = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();

        if is_json(&essence) {
            let Json(body) = Json::<JsonSubmission>::from_request(req, state)
                .await
                .map_err(|rejection| body_error(rejection.status(), rejection.body_text()))?;

            return Ok(SubmissionPayload::Json(body));
        }

        if essence == "multipart/form-data" {
            let multipart = Multipart::from_request(req, state)
                .await
                .map_err(|rejection| body_error(rejection.status(), rejection.body_text()))?;

            return Ok(SubmissionPayload::Multipart(read_multipart(multipart).await?));
        }

        Err(AppError::UnsupportedContentType(content_type))
    }
}

/// Requests cut off by the body limit are told apart from broken bodies.
fn body_error(status: StatusCode, reason: String) -> AppError {
    if status == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(reason)
    } else {
        AppError::MalformedBody(reason)
    }
}

fn is_json(essence: &str) -> bool {
    essence == "application/json"
        || (essence.starts_with("application/") && essence.ends_with("+json"))
}

/// Text parts fill the draft by name. File parts are skipped unless they are
/// the CV upload with a non-empty filename.
async fn read_multipart(mut multipart: Multipart) -> Result<SubmissionDraft, AppError> {
    let mut draft = SubmissionDraft::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| body_error(e.status(), e.body_text()))?
    {
        let Some(name) = field.name().map(ToOwned::to_owned) else {
            continue;
        };

        match field.file_name().map(ToOwned::to_owned) {
            Some(filename) => {
                if name != ATTACHMENT_FIELD || filename.is_empty() || draft.attachment.is_some() {
                    continue;
                }

                let content = field
                    .bytes()
                    .await
                    .map_err(|e| body_error(e.status(), e.body_text()))?;

                draft.attachment = Some(Attachment {
                    filename,
                    content: content.to_vec(),
                });
            }
            None => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| body_error(e.status(), e.body_text()))?;

                draft.set_text_field(&name, value);
            }
        }
    }

    Ok(draft)
}

/// POST /send-email
#[tracing::instrument(skip_all)]
pub async fn action(
    State(app): State<AppState>,
    payload: SubmissionPayload,
) -> Result<impl IntoResponse, AppError> {
    let mut draft = payload.into_draft();
    let requested_subject = draft.subject.take();

    let submission = draft.into_submission()?;
    let form_type = submission.form_type.to_string();

    if let Some(attachment) = &submission.attachment {
        tracing::info!(
            filename = %attachment.filename,
            size = attachment.content.len(),
            "Attached file"
        );
    }

    let email = OutboundEmail::compose(submission, app.sender.clone(), app.receiver.clone())?;
    let subject = email.subject.clone();

    if let Some(requested) = overridden_subject(requested_subject, &subject) {
        tracing::debug!(requested = %requested, "Ignoring caller-supplied subject");
    }

    app.mailer.deliver(email.into_message()?).await?;

    tracing::info!(form_type = %form_type, subject = %subject, "Email sent successfully");

    Ok((StatusCode::OK, MessageBody::new("Email sent successfully!")))
}

/// The caller's subject, when it differs from the one that will be sent.
fn overridden_subject(requested: Option<String>, derived: &str) -> Option<String> {
    requested.filter(|requested| requested != derived)
}
