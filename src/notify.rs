//! Toast channel.
//!
//! Inside a request the console uses flash messages; anything else (the
//! search session, tests) can plug in its own [`Notifier`].

#[cfg_attr(any(test, feature = "test-mocks"), mockall::automock)]
pub trait Notifier: Send + Sync {
    fn success(&self, message: &str);
    fn error(&self, message: &str);
}

/// Sends toasts as cookie-backed flash messages shown on the next render.
#[cfg(feature = "server")]
#[derive(Clone, Copy, Debug, Default)]
pub struct FlashNotifier;

#[cfg(feature = "server")]
impl Notifier for FlashNotifier {
    fn success(&self, message: &str) {
        actix_web_flash_messages::FlashMessage::success(message.to_string()).send();
    }

    fn error(&self, message: &str) {
        actix_web_flash_messages::FlashMessage::error(message.to_string()).send();
    }
}
