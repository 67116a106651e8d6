use crate::backend::{BackendError, Credentials, ResourceGateway};
use crate::forms::login::LoginForm;
use crate::services::{ServiceError, ServiceResult};

pub const INVALID_CREDENTIALS_MESSAGE: &str = "Invalid username or password.";

/// Exchanges the login form for a backend bearer token.
pub async fn login<G>(gateway: &G, form: LoginForm) -> ServiceResult<String>
where
    G: ResourceGateway + ?Sized,
{
    let credentials = Credentials::try_from(form).map_err(|err| {
        log::warn!("Rejected login form: {err}");
        ServiceError::from(err)
    })?;

    match gateway.login(&credentials).await {
        Ok(token) if !token.trim().is_empty() => {
            log::info!("User `{}` logged in", credentials.username);
            Ok(token)
        }
        Ok(_) => {
            log::error!("Backend returned an empty token for `{}`", credentials.username);
            Err(ServiceError::Backend(
                "The server did not return a session token.".to_string(),
            ))
        }
        Err(BackendError::Unauthorized { .. }) => {
            log::warn!("Failed login for `{}`", credentials.username);
            Err(ServiceError::Form(INVALID_CREDENTIALS_MESSAGE.to_string()))
        }
        Err(err) => {
            log::error!("Login request failed: {err}");
            Err(ServiceError::from(err))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::mock::MockGateway;

    fn form(username: &str, password: &str) -> LoginForm {
        LoginForm {
            username: username.into(),
            password: password.into(),
        }
    }

    #[tokio::test]
    async fn valid_credentials_return_the_token() {
        let mut gateway = MockGateway::new();
        gateway
            .expect_login()
            .withf(|c| c.username == "admin" && c.password == "pw")
            .returning(|_| Ok("tok".to_string()));

        assert_eq!(login(&gateway, form(" admin ", "pw")).await, Ok("tok".to_string()));
    }

    #[tokio::test]
    async fn rejected_credentials_are_a_form_error() {
        let mut gateway = MockGateway::new();
        gateway
            .expect_login()
            .returning(|_| Err(BackendError::Unauthorized { status: 401 }));

        assert_eq!(
            login(&gateway, form("admin", "bad")).await,
            Err(ServiceError::Form(INVALID_CREDENTIALS_MESSAGE.to_string()))
        );
    }

    #[tokio::test]
    async fn blank_form_never_reaches_the_backend() {
        let gateway = MockGateway::new();
        assert!(matches!(
            login(&gateway, form("", "")).await,
            Err(ServiceError::Form(_))
        ));
    }
}
