#[derive(Debug, thiserror::Error)]
pub enum SubmissionError {
    #[error("missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    #[error("consent was not approved")]
    ConsentRequired,

    #[error("failed to render email body: {0}")]
    Render(#[from] askama::Error),

    #[error("invalid content type: {0}")]
    ContentType(#[from] lettre::message::header::ContentTypeErr),

    #[error("failed to build email message: {0}")]
    Build(#[from] lettre::error::Error),
}

pub type Result<T> = std::result::Result<T, SubmissionError>;
