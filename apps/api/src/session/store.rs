//! Process-wide session state, mirrored from identity-change notifications.
//!
//! `Session::init` subscribes to an `IdentityProvider` and returns the session plus the
//! `Subscription` that keeps the mirror running. `Session::current` is the only read path.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::watch;
use tokio::task::AbortHandle;
use tracing::{debug, info};

use crate::session::{Identity, IdentityProvider};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SessionState {
    /// No notification received yet.
    Resolving,
    SignedOut,
    SignedIn { identity: Identity },
}

impl From<Option<Identity>> for SessionState {
    fn from(identity: Option<Identity>) -> Self {
        match identity {
            Some(identity) => SessionState::SignedIn { identity },
            None => SessionState::SignedOut,
        }
    }
}

#[derive(Clone)]
pub struct Session {
    state: Arc<watch::Sender<SessionState>>,
}

impl Session {
    /// Subscribes to `provider` and starts mirroring its notifications.
    /// Must be called from within a tokio runtime.
    pub fn init(provider: &dyn IdentityProvider) -> (Session, Subscription) {
        let (state, _) = watch::channel(SessionState::Resolving);
        let state = Arc::new(state);
        let mut notifications = provider.subscribe();

        let mirror = Arc::clone(&state);
        let task = tokio::spawn(async move {
            loop {
                let next = SessionState::from(notifications.borrow_and_update().clone());
                debug!("Session state: {next:?}");
                mirror.send_replace(next);

                if notifications.changed().await.is_err() {
                    debug!("Identity provider closed; session mirror stopping");
                    break;
                }
            }
        });

        info!("Session subscribed to identity changes");
        (
            Session { state },
            Subscription {
                active: AtomicBool::new(true),
                task: task.abort_handle(),
            },
        )
    }

    pub fn current(&self) -> SessionState {
        self.state.borrow().clone()
    }

    pub fn identity(&self) -> Option<Identity> {
        match self.current() {
            SessionState::SignedIn { identity } => Some(identity),
            _ => None,
        }
    }
}

/// Keeps a session mirror alive. Unsubscribes on drop.
pub struct Subscription {
    active: AtomicBool,
    task: AbortHandle,
}

impl Subscription {
    /// Stops receiving notifications. Safe to call any number of times;
    /// returns `true` only on the call that actually unsubscribed.
    pub fn unsubscribe(&self) -> bool {
        if !self.active.swap(false, Ordering::SeqCst) {
            return false;
        }
        self.task.abort();
        info!("Session unsubscribed from identity changes");
        true
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FakeProvider {
        tx: watch::Sender<Option<Identity>>,
    }

    impl FakeProvider {
        fn new() -> Self {
            let (tx, _) = watch::channel(None);
            Self { tx }
        }
    }

    impl IdentityProvider for FakeProvider {
        fn subscribe(&self) -> watch::Receiver<Option<Identity>> {
            self.tx.subscribe()
        }
    }

    fn identity(uid: &str) -> Identity {
        Identity {
            uid: uid.to_string(),
            display_name: Some("Meera".to_string()),
            email: Some("meera@example.com".to_string()),
            photo_url: None,
        }
    }

    async fn settle(session: &Session, expected: SessionState) {
        let mut rx = session.state.subscribe();
        rx.wait_for(|s| *s == expected).await.unwrap();
    }

    #[tokio::test]
    async fn test_starts_resolving_then_mirrors_signed_out() {
        let provider = FakeProvider::new();
        let (session, _sub) = Session::init(&provider);
        assert_eq!(session.current(), SessionState::Resolving);

        settle(&session, SessionState::SignedOut).await;
        assert!(session.identity().is_none());
    }

    #[tokio::test]
    async fn test_mirrors_sign_in_and_sign_out() {
        let provider = FakeProvider::new();
        let (session, _sub) = Session::init(&provider);

        provider.tx.send_replace(Some(identity("u1")));
        settle(
            &session,
            SessionState::SignedIn {
                identity: identity("u1"),
            },
        )
        .await;
        assert_eq!(session.identity().map(|i| i.uid).as_deref(), Some("u1"));

        provider.tx.send_replace(None);
        settle(&session, SessionState::SignedOut).await;
    }

    #[tokio::test]
    async fn test_unsubscribe_is_idempotent_and_stops_mirroring() {
        let provider = FakeProvider::new();
        let (session, sub) = Session::init(&provider);
        settle(&session, SessionState::SignedOut).await;

        assert!(sub.unsubscribe());
        assert!(!sub.unsubscribe());

        provider.tx.send_replace(Some(identity("u2")));
        for _ in 0..5 {
            tokio::task::yield_now().await;
        }
        assert_eq!(session.current(), SessionState::SignedOut);
    }

    #[tokio::test]
    async fn test_session_state_serializes_with_status_tag() {
        let json = serde_json::to_value(SessionState::SignedIn {
            identity: identity("u3"),
        })
        .unwrap();
        assert_eq!(json["status"], "signed_in");
        assert_eq!(json["identity"]["uid"], "u3");
        assert!(json["identity"]["photoURL"].is_null());
    }
}
