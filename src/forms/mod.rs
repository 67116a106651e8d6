//! Form handling: lenient field parsing, submission state and the generic
//! resource form.

use serde::Deserialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use validator::ValidationErrors;

use crate::domain::types::SubmissionId;

pub mod fields;
pub mod login;
pub mod resource;
pub mod submit;

#[derive(Debug, Error)]
/// Errors that can occur when processing form data.
pub enum FormError {
    #[error("validation errors: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("invalid record id")]
    InvalidId,

    #[error("this form was already submitted")]
    DuplicateSubmission,

    #[error("malformed form data: {0}")]
    Malformed(String),
}

#[derive(Deserialize)]
struct SubmissionField {
    submission_id: SubmissionId,
}

/// Parses a URL-encoded add/edit body into the draft and the submission id
/// rendered with the form.
pub fn parse_posted<D: DeserializeOwned>(body: &[u8]) -> Result<(D, SubmissionId), FormError> {
    let draft = serde_html_form::from_bytes::<D>(body)
        .map_err(|err| FormError::Malformed(err.to_string()))?;
    let SubmissionField { submission_id } = serde_html_form::from_bytes(body)
        .map_err(|err| FormError::Malformed(err.to_string()))?;
    Ok((draft, submission_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::customer::CustomerDraft;

    #[test]
    fn posted_body_yields_draft_and_submission_id() {
        let id = SubmissionId::generate();
        let body = format!(
            "submission_id={id}&code=c1&name=Acme&regionId=&creditLimit=1%2C500.50&isActive=on"
        );
        let (draft, parsed): (CustomerDraft, _) = parse_posted(body.as_bytes()).unwrap();
        assert_eq!(parsed, id);
        assert_eq!(draft.name, "Acme");
        assert_eq!(draft.region_id, None);
        assert_eq!(draft.credit_limit, 1500.5);
        assert!(draft.is_active);
    }

    #[test]
    fn missing_submission_id_is_malformed() {
        let result = parse_posted::<CustomerDraft>(b"code=c1&name=Acme");
        assert!(matches!(result, Err(FormError::Malformed(_))));
    }
}
