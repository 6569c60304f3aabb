use askama::Template;
use lettre::{
    Message,
    message::{Attachment as AttachmentPart, Mailbox, MultiPart, SinglePart, header::ContentType},
};

use crate::{Attachment, Result, Submission, derive_subject};

#[derive(Template)]
#[template(path = "emails/submission.html")]
struct SubmissionHtmlTemplate<'a> {
    form_type: &'a str,
    name: &'a str,
    surname: &'a str,
    email: &'a str,
    phone: &'a str,
    message: &'a str,
    consent: &'a str,
}

/// The email relayed for one submission.
#[derive(Clone, Debug)]
pub struct OutboundEmail {
    pub from: Mailbox,
    pub to: Mailbox,
    pub subject: String,
    pub html: String,
    pub attachment: Option<Attachment>,
}

impl OutboundEmail {
    /// Renders the submission into an email from `from` to `to`.
    ///
    /// Every submitted value is HTML-escaped by the template.
    pub fn compose(submission: Submission, from: Mailbox, to: Mailbox) -> Result<Self> {
        let subject = derive_subject(
            &submission.form_type,
            &submission.name,
            &submission.surname,
        );

        let html = SubmissionHtmlTemplate {
            form_type: submission.form_type.as_str(),
            name: &submission.name,
            surname: &submission.surname,
            email: &submission.email,
            phone: submission.phone.as_deref().unwrap_or("N/A"),
            message: &submission.message,
            consent: if submission.consent_approved { "Yes" } else { "No" },
        }
        .render()?;

        Ok(Self {
            from,
            to,
            subject,
            html,
            attachment: submission.attachment,
        })
    }

    /// Builds the MIME message: a `multipart/mixed` with the HTML body and,
    /// when present, the attachment as `application/octet-stream`.
    pub fn into_message(self) -> Result<Message> {
        let mut parts = MultiPart::mixed().singlepart(SinglePart::html(self.html));

        if let Some(attachment) = self.attachment {
            let content_type = ContentType::parse("application/octet-stream")?;
            parts = parts.singlepart(
                AttachmentPart::new(attachment.filename).body(attachment.content, content_type),
            );
        }

        Ok(Message::builder()
            .from(self.from)
            .to(self.to)
            .subject(self.subject)
            .multipart(parts)?)
    }
}
