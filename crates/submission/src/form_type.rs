use std::fmt;

use strum::EnumString;

/// Which form on the site produced the submission.
///
/// Unknown values are kept verbatim so they can still be shown in the
/// email body.
#[derive(EnumString, Clone, Debug, PartialEq, Eq)]
pub enum FormType {
    #[strum(serialize = "contactUs")]
    ContactUs,
    #[strum(serialize = "aboutUsContact")]
    AboutUsContact,
    #[strum(serialize = "becomeMember")]
    BecomeMember,
    #[strum(default)]
    Other(String),
}

impl FormType {
    pub fn as_str(&self) -> &str {
        match self {
            FormType::ContactUs => "contactUs",
            FormType::AboutUsContact => "aboutUsContact",
            FormType::BecomeMember => "becomeMember",
            FormType::Other(value) => value,
        }
    }
}

impl fmt::Display for FormType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
