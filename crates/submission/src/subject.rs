use crate::FormType;

/// Builds the subject line for a submission.
///
/// Control characters in the submitter's name are replaced with spaces so
/// the result is always a single header line.
pub fn derive_subject(form_type: &FormType, name: &str, surname: &str) -> String {
    let prefix = match form_type {
        FormType::ContactUs => "New Contact Us Message",
        FormType::AboutUsContact => "New About Us Contact Message",
        FormType::BecomeMember => "New Member Application",
        FormType::Other(_) => "New General Form Submission",
    };

    format!(
        "{prefix} from {} {}",
        header_safe(name),
        header_safe(surname)
    )
}

fn header_safe(value: &str) -> String {
    value
        .chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect()
}
