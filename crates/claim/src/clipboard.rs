//! "Copied" acknowledgements for copyable fields.
//!
//! A field counts as copied for [`ACK_WINDOW`] after a successful clipboard write. Expiry is
//! evaluated lazily against [`tokio::time::Instant`], so it holds whether or not anyone polls.

use serde::Serialize;
use std::{
    collections::HashMap,
    future::Future,
    sync::{Mutex, MutexGuard, PoisonError},
    time::Duration,
};
use thiserror::Error;
use tokio::time::Instant;
use tracing::{debug, warn};

/// How long a field stays acknowledged after a copy.
pub const ACK_WINDOW: Duration = Duration::from_secs(2);

/// Clipboard capability failures.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
pub enum PlatformError {
    /// No clipboard is reachable from this process
    #[error("clipboard unavailable: {0}")]
    Unavailable(String),

    /// The write was attempted and failed
    #[error("clipboard write failed: {0}")]
    Write(String),
}

/// Platform clipboard.
pub trait Clipboard: Send + Sync {
    /// Put `text` on the clipboard.
    fn write_text(&self, text: &str) -> impl Future<Output = Result<(), PlatformError>> + Send;
}

/// Tracks which fields were copied recently.
pub struct ClipboardFeedback<C> {
    clipboard: C,
    ack_window: Duration,
    entries: Mutex<HashMap<String, Instant>>,
}

impl<C> ClipboardFeedback<C>
where
    C: Clipboard,
{
    pub fn new(clipboard: C) -> Self {
        Self::with_ack_window(clipboard, ACK_WINDOW)
    }

    pub fn with_ack_window(clipboard: C, ack_window: Duration) -> Self {
        Self {
            clipboard,
            ack_window,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Copy `text` and acknowledge `field` on success.
    ///
    /// A failed write leaves every acknowledgement untouched. The error is logged and returned
    /// for the caller to surface; it is never fatal.
    pub async fn copy(&self, field: &str, text: &str) -> Result<(), PlatformError> {
        if let Err(err) = self.clipboard.write_text(text).await {
            warn!(field, error = %err, "Copy to clipboard failed");
            return Err(err);
        }

        let now = Instant::now();
        let mut entries = self.entries();
        entries.retain(|_, copied_at| now.duration_since(*copied_at) < self.ack_window);
        entries.insert(field.to_string(), now);
        debug!(field, "Copied to clipboard");

        Ok(())
    }

    /// Whether `field` was copied less than the ack window ago.
    pub fn is_copied(&self, field: &str) -> bool {
        self.entries()
            .get(field)
            .is_some_and(|copied_at| copied_at.elapsed() < self.ack_window)
    }

    pub const fn ack_window(&self) -> Duration {
        self.ack_window
    }
}

impl<C> ClipboardFeedback<C> {
    fn entries(&self) -> MutexGuard<'_, HashMap<String, Instant>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
