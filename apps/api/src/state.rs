use std::sync::Arc;

use crate::functions_client::FunctionsClient;
use crate::guidance::GuidanceStore;
use crate::insights::InsightController;
use crate::reference::DocumentStore;
use crate::session::{AuthClient, Session};

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub auth: AuthClient,
    /// Process-wide mirror of the identity provider. The only read path for "who is signed in".
    pub session: Session,
    /// Pluggable document store. Default: Firestore REST.
    pub documents: Arc<dyn DocumentStore>,
    pub functions: FunctionsClient,
    pub guidance: Arc<GuidanceStore>,
    /// Market insight lifecycle for the current user.
    pub insights: Arc<InsightController>,
}
