//! One-shot user-facing notifications.
//!
//! The core never presents anything itself; the frontend injects a `Notifier`
//! when it builds the service.

use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub message: String,
}

impl Notification {
    pub fn fetch_failed(id: u32) -> Self {
        Self {
            title: "Pokemon Not Found".to_string(),
            message: format!(
                "Could not load Pokemon #{}. It may not exist or there was a network error.",
                id
            ),
        }
    }
}

pub trait Notifier: Send + Sync {
    fn notify(&self, notification: &Notification);
}

/// Routes notifications to the log. Used when no frontend is attached.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notification: &Notification) {
        warn!(title = %notification.title, "{}", notification.message);
    }
}
