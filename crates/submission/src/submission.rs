use std::str::FromStr;

use serde_json::Value;
use validator::Validate;

use crate::{FormType, Result, SubmissionError};

/// Wire name of the multipart file field carrying the uploaded CV.
pub const ATTACHMENT_FIELD: &str = "cvFile";

/// Required fields in the order they are reported, as `(field, wire name)`.
const REQUIRED_FIELDS: [(&str, &str); 5] = [
    ("form_type", "formType"),
    ("name", "name"),
    ("surname", "surname"),
    ("email", "email"),
    ("message", "message"),
];

/// An uploaded file, fully buffered.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Attachment {
    pub filename: String,
    pub content: Vec<u8>,
}

/// Raw form input as read from the request, before validation.
///
/// JSON and multipart requests both end up here.
#[derive(Validate, Clone, Debug, Default)]
pub struct SubmissionDraft {
    #[validate(required, length(min = 1))]
    pub form_type: Option<String>,
    #[validate(required, length(min = 1))]
    pub name: Option<String>,
    #[validate(required, length(min = 1))]
    pub surname: Option<String>,
    #[validate(required, length(min = 1))]
    pub email: Option<String>,
    pub phone: Option<String>,
    #[validate(required)]
    pub message: Option<String>,
    pub consent: Option<bool>,
    pub subject: Option<String>,
    pub attachment: Option<Attachment>,
}

/// A submission that passed validation.
#[derive(Clone, Debug)]
pub struct Submission {
    pub form_type: FormType,
    pub name: String,
    pub surname: String,
    pub email: String,
    pub phone: Option<String>,
    pub message: String,
    pub consent_approved: bool,
    pub attachment: Option<Attachment>,
}

impl SubmissionDraft {
    /// Assigns a multipart text field by wire name. The first occurrence of a
    /// field wins; unknown names are ignored.
    pub fn set_text_field(&mut self, name: &str, value: String) {
        let slot = match name {
            "formType" => &mut self.form_type,
            "name" => &mut self.name,
            "surname" => &mut self.surname,
            "email" => &mut self.email,
            "phone" => &mut self.phone,
            "message" => &mut self.message,
            "subject" => &mut self.subject,
            "kvkk" => {
                if self.consent.is_none() {
                    self.consent = Some(consent_from_text(&value));
                }
                return;
            }
            _ => return,
        };

        if slot.is_none() {
            *slot = Some(value);
        }
    }

    /// Checks required fields first, then consent.
    pub fn into_submission(self) -> Result<Submission> {
        if let Err(errors) = self.validate() {
            let errors = errors.errors();
            let missing = REQUIRED_FIELDS
                .iter()
                .filter(|(field, _)| errors.contains_key(*field))
                .map(|(_, wire)| *wire)
                .collect();

            return Err(SubmissionError::MissingFields(missing));
        }

        if self.consent != Some(true) {
            return Err(SubmissionError::ConsentRequired);
        }

        // Every required field is present once validate() has passed.
        let form_type = self.form_type.unwrap_or_default();
        let form_type = match FormType::from_str(&form_type) {
            Ok(form_type) => form_type,
            Err(_) => FormType::Other(form_type),
        };

        Ok(Submission {
            form_type,
            name: self.name.unwrap_or_default(),
            surname: self.surname.unwrap_or_default(),
            email: self.email.unwrap_or_default(),
            phone: self.phone.filter(|phone| !phone.is_empty()),
            message: self.message.unwrap_or_default(),
            consent_approved: true,
            attachment: self.attachment,
        })
    }
}

/// Consent sent as form text: approved only for `"true"`, ignoring case.
pub fn consent_from_text(value: &str) -> bool {
    value.eq_ignore_ascii_case("true")
}

/// Consent sent in a JSON body: `true` or a string accepted by
/// [`consent_from_text`].
pub fn consent_from_json(value: &Value) -> bool {
    match value {
        Value::Bool(approved) => *approved,
        Value::String(text) => consent_from_text(text),
        _ => false,
    }
}
