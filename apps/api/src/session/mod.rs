// Authentication and the process-wide session mirror.
// The identity toolkit client publishes identity changes; `Session` mirrors the latest one.

pub mod auth_client;
pub mod handlers;
pub mod store;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

pub use auth_client::{AuthClient, AuthError};
pub use store::{Session, SessionState, Subscription};

/// A signed-in user as reported by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub uid: String,
    pub display_name: Option<String>,
    pub email: Option<String>,
    #[serde(rename = "photoURL")]
    pub photo_url: Option<String>,
}

/// Source of identity-change notifications. `None` means signed out.
pub trait IdentityProvider: Send + Sync {
    fn subscribe(&self) -> watch::Receiver<Option<Identity>>;
}
