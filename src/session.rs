//! Session token storage and the session-expired flow.

use std::sync::{Arc, Mutex};

use crate::notify::Notifier;

pub const LOGIN_ROUTE: &str = "/login";
pub const SESSION_EXPIRED_MESSAGE: &str = "Your session has expired. Please log in again.";
/// Session key holding the backend bearer token.
pub const TOKEN_KEY: &str = "access_token";

/// Persisted session state read by every data-fetching call.
pub trait SessionStore: Send + Sync {
    fn token(&self) -> Option<String>;
    fn clear(&self);
}

pub trait Navigator: Send + Sync {
    fn navigate(&self, route: &str);
}

/// In-process token store.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    token: Mutex<Option<String>>,
}

impl MemorySessionStore {
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: Mutex::new(Some(token.into())),
        }
    }
}

impl SessionStore for MemorySessionStore {
    fn token(&self) -> Option<String> {
        self.token.lock().ok().and_then(|guard| guard.clone())
    }

    fn clear(&self) {
        if let Ok(mut guard) = self.token.lock() {
            *guard = None;
        }
    }
}

/// Clear session, go to the login route, tell the user. Every 401/403 ends
/// up here.
#[derive(Clone)]
pub struct AuthErrorFlow {
    store: Arc<dyn SessionStore>,
    navigator: Arc<dyn Navigator>,
    notifier: Arc<dyn Notifier>,
}

impl AuthErrorFlow {
    pub fn new(
        store: Arc<dyn SessionStore>,
        navigator: Arc<dyn Navigator>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            store,
            navigator,
            notifier,
        }
    }

    pub fn token(&self) -> Option<String> {
        self.store.token().filter(|token| !token.trim().is_empty())
    }

    pub fn trigger(&self) {
        log::warn!("Session expired, redirecting to {LOGIN_ROUTE}");
        self.store.clear();
        self.navigator.navigate(LOGIN_ROUTE);
        self.notifier.error(SESSION_EXPIRED_MESSAGE);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::MockNotifier;

    #[derive(Default)]
    struct RecordingNavigator(Mutex<Vec<String>>);

    impl Navigator for RecordingNavigator {
        fn navigate(&self, route: &str) {
            self.0.lock().unwrap().push(route.to_string());
        }
    }

    #[test]
    fn trigger_clears_redirects_and_notifies() {
        let store = Arc::new(MemorySessionStore::with_token("abc"));
        let navigator = Arc::new(RecordingNavigator::default());
        let mut notifier = MockNotifier::new();
        notifier
            .expect_error()
            .withf(|message| message == SESSION_EXPIRED_MESSAGE)
            .times(1)
            .return_const(());

        let flow = AuthErrorFlow::new(store.clone(), navigator.clone(), Arc::new(notifier));
        assert_eq!(flow.token().as_deref(), Some("abc"));

        flow.trigger();

        assert_eq!(store.token(), None);
        assert_eq!(*navigator.0.lock().unwrap(), vec!["/login".to_string()]);
    }
}
