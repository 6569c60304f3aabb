mod error;
mod form_type;
mod message;
mod subject;
mod submission;

pub use error::*;
pub use form_type::FormType;
pub use message::OutboundEmail;
pub use subject::derive_subject;
pub use submission::*;
