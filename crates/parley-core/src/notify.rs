//! User-visible notifications.
//!
//! Every terminal failure in the pipeline is reported through a [`Notifier`].
//! Loading indicators are wrapped in a [`LoadingGuard`] so they are dismissed
//! exactly once on every exit path.

use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

use tracing::{error, info};

/// Identifies a loading indicator shown by a [`Notifier`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LoadingToken(pub u64);

/// Surface for user-visible notifications.
pub trait Notifier: Send + Sync {
    /// Show an error.
    fn error(&self, message: &str);

    /// Show a success confirmation.
    fn success(&self, message: &str);

    /// Show a loading indicator until [`Notifier::dismiss`] is called.
    fn loading(&self, message: &str) -> LoadingToken;

    /// Dismiss a loading indicator.
    fn dismiss(&self, token: LoadingToken);
}

/// Notifier that reports through the tracing subscriber.
#[derive(Debug, Default)]
pub struct LogNotifier {
    next_token: AtomicU64,
}

impl LogNotifier {
    /// Create a new log notifier.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Notifier for LogNotifier {
    fn error(&self, message: &str) {
        error!(notification = "error", "{}", message);
    }

    fn success(&self, message: &str) {
        info!(notification = "success", "{}", message);
    }

    fn loading(&self, message: &str) -> LoadingToken {
        let token = LoadingToken(self.next_token.fetch_add(1, Ordering::Relaxed));
        info!(notification = "loading", token = token.0, "{}", message);
        token
    }

    fn dismiss(&self, token: LoadingToken) {
        info!(notification = "dismiss", token = token.0, "Loading dismissed");
    }
}

/// RAII guard that guarantees a loading indicator is dismissed exactly once.
///
/// Finishing through [`LoadingGuard::finish_success`] or
/// [`LoadingGuard::finish_error`] dismisses the indicator before showing the
/// outcome; dropping the guard dismisses it silently.
pub struct LoadingGuard {
    notifier: Arc<dyn Notifier>,
    token: Option<LoadingToken>,
}

impl LoadingGuard {
    /// Show a loading indicator.
    pub fn show(notifier: &Arc<dyn Notifier>, message: &str) -> Self {
        let token = notifier.loading(message);

        Self {
            notifier: Arc::clone(notifier),
            token: Some(token),
        }
    }

    /// Dismiss the indicator and show a success message.
    pub fn finish_success(mut self, message: &str) {
        self.dismiss();
        self.notifier.success(message);
    }

    /// Dismiss the indicator and show an error message.
    pub fn finish_error(mut self, message: &str) {
        self.dismiss();
        self.notifier.error(message);
    }

    fn dismiss(&mut self) {
        if let Some(token) = self.token.take() {
            self.notifier.dismiss(token);
        }
    }
}

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        self.dismiss();
    }
}
