//! One-shot flash messages.
//!
//! Messages are queued in the session and drained by the next page render.

use tower_sessions::Session;
use tracing::warn;

use crate::models::session_keys;

/// Queue a message for the next rendered page.
///
/// Session failures are logged and otherwise ignored.
pub async fn push_flash(session: &Session, message: impl Into<String>) {
    let mut messages = session
        .get::<Vec<String>>(session_keys::FLASH)
        .await
        .ok()
        .flatten()
        .unwrap_or_default();
    messages.push(message.into());

    if let Err(e) = session.insert(session_keys::FLASH, messages).await {
        warn!(error = %e, "Failed to store flash message");
    }
}

/// Remove and return all queued messages.
pub async fn take_flashes(session: &Session) -> Vec<String> {
    match session.remove::<Vec<String>>(session_keys::FLASH).await {
        Ok(messages) => messages.unwrap_or_default(),
        Err(e) => {
            warn!(error = %e, "Failed to read flash messages");
            Vec::new()
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use tower_sessions::MemoryStore;

    use super::*;

    fn session() -> Session {
        Session::new(None, Arc::new(MemoryStore::default()), None)
    }

    #[tokio::test]
    async fn test_flashes_drain_in_order() {
        let session = session();
        push_flash(&session, "first").await;
        push_flash(&session, "second").await;

        assert_eq!(take_flashes(&session).await, vec!["first", "second"]);
        assert!(take_flashes(&session).await.is_empty());
    }
}
