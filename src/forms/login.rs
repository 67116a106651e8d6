use serde::Deserialize;
use validator::Validate;

use crate::backend::Credentials;
use crate::domain::types::SubmissionId;
use crate::forms::FormError;

#[derive(Deserialize, Validate)]
/// Form data posted by the login page.
pub struct LoginForm {
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

impl TryFrom<LoginForm> for Credentials {
    type Error = FormError;

    fn try_from(form: LoginForm) -> Result<Self, Self::Error> {
        form.validate()?;
        Ok(Credentials {
            username: form.username.trim().to_string(),
            password: form.password,
        })
    }
}

#[derive(Deserialize)]
/// Confirmation posted by the delete button.
pub struct DeleteForm {
    pub submission_id: SubmissionId,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_password_is_rejected() {
        let form: LoginForm = serde_html_form::from_str("username=admin&password=").unwrap();
        assert!(matches!(
            Credentials::try_from(form),
            Err(FormError::Validation(_))
        ));
    }

    #[test]
    fn username_is_trimmed() {
        let form: LoginForm =
            serde_html_form::from_str("username=+admin+&password=secret").unwrap();
        let credentials = Credentials::try_from(form).unwrap();
        assert_eq!(credentials.username, "admin");
        assert_eq!(credentials.password, "secret");
    }

    #[test]
    fn delete_form_requires_a_submission_id() {
        let id = SubmissionId::generate();
        let form: DeleteForm =
            serde_html_form::from_str(&format!("submission_id={id}")).unwrap();
        assert_eq!(form.submission_id, id);
        assert!(serde_html_form::from_str::<DeleteForm>("submission_id=nope").is_err());
    }
}
