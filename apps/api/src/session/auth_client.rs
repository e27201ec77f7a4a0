//! Firebase Identity Toolkit client (email/password accounts).
//!
//! Every successful sign-in, sign-up, or sign-out publishes an identity-change notification
//! to subscribers. Credentials are held in memory only.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::{watch, RwLock};
use tracing::{debug, info, warn};

use crate::session::{Identity, IdentityProvider};

const IDENTITY_TOOLKIT_BASE: &str = "https://identitytoolkit.googleapis.com/v1/accounts";

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{message}")]
    Rejected { code: String, message: String },

    #[error("Identity provider returned no session token")]
    MissingToken,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PasswordRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct UpdateProfileRequest<'a> {
    id_token: &'a str,
    display_name: &'a str,
    return_secure_token: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountResponse {
    local_id: String,
    email: Option<String>,
    display_name: Option<String>,
    photo_url: Option<String>,
    id_token: Option<String>,
    /// Seconds, sent as a string.
    expires_in: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ToolkitError {
    error: ToolkitErrorBody,
}

#[derive(Debug, Deserialize)]
struct ToolkitErrorBody {
    message: String,
}

/// Token for the current session.
#[derive(Debug, Clone)]
struct Credentials {
    id_token: String,
    expires_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct AuthClient {
    client: Client,
    api_key: String,
    auth_state: Arc<watch::Sender<Option<Identity>>>,
    credentials: Arc<RwLock<Option<Credentials>>>,
}

impl AuthClient {
    pub fn new(api_key: String) -> Self {
        let (auth_state, _) = watch::channel(None);
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .build()
                .expect("Failed to build HTTP client"),
            api_key,
            auth_state: Arc::new(auth_state),
            credentials: Arc::new(RwLock::new(None)),
        }
    }

    /// Creates an account, then sets its display name.
    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        display_name: &str,
    ) -> Result<Identity, AuthError> {
        let mut account: AccountResponse = self
            .post(
                "signUp",
                &PasswordRequest {
                    email,
                    password,
                    return_secure_token: true,
                },
            )
            .await?;
        let id_token = account.id_token.clone().ok_or(AuthError::MissingToken)?;

        if !display_name.trim().is_empty() {
            let updated: AccountResponse = self
                .post(
                    "update",
                    &UpdateProfileRequest {
                        id_token: &id_token,
                        display_name: display_name.trim(),
                        return_secure_token: true,
                    },
                )
                .await?;
            account = merge_profile(account, updated);
        }

        info!("Created account {}", account.local_id);
        self.establish(account).await
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
        let account: AccountResponse = self
            .post(
                "signInWithPassword",
                &PasswordRequest {
                    email,
                    password,
                    return_secure_token: true,
                },
            )
            .await?;

        info!("Signed in {}", account.local_id);
        self.establish(account).await
    }

    /// Drops local credentials and notifies subscribers. Returns whether a session existed.
    pub async fn sign_out(&self) -> bool {
        let had_session = self.credentials.write().await.take().is_some();
        self.auth_state.send_replace(None);
        if had_session {
            info!("Signed out");
        }
        had_session
    }

    /// ID token of the current session, if it has not expired.
    pub async fn id_token(&self) -> Option<String> {
        self.credentials
            .read()
            .await
            .as_ref()
            .filter(|c| c.expires_at > Utc::now())
            .map(|c| c.id_token.clone())
    }

    async fn establish(&self, account: AccountResponse) -> Result<Identity, AuthError> {
        let id_token = account.id_token.clone().ok_or(AuthError::MissingToken)?;
        let lifetime = token_lifetime(account.expires_in.as_deref());

        *self.credentials.write().await = Some(Credentials {
            id_token,
            expires_at: Utc::now() + lifetime,
        });

        let identity = identity_from(account);
        self.auth_state.send_replace(Some(identity.clone()));
        Ok(identity)
    }

    async fn post<B: Serialize, T: DeserializeOwned>(
        &self,
        operation: &str,
        body: &B,
    ) -> Result<T, AuthError> {
        debug!("Identity toolkit call: accounts:{operation}");
        let response = self
            .client
            .post(format!("{IDENTITY_TOOLKIT_BASE}:{operation}"))
            .query(&[("key", self.api_key.as_str())])
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let err = rejection(&body);
            warn!("Identity toolkit accounts:{operation} returned {status}: {err:?}");
            return Err(err);
        }

        Ok(response.json().await?)
    }
}

impl IdentityProvider for AuthClient {
    fn subscribe(&self) -> watch::Receiver<Option<Identity>> {
        self.auth_state.subscribe()
    }
}

/// Lifetime of an id token from the `expiresIn` seconds string. Defaults to one hour when the
/// value is missing, unparseable or out of range.
fn token_lifetime(expires_in: Option<&str>) -> Duration {
    expires_in
        .and_then(|s| s.trim().parse::<i64>().ok())
        .filter(|secs| *secs > 0)
        .and_then(Duration::try_seconds)
        .unwrap_or_else(|| Duration::hours(1))
}

fn identity_from(account: AccountResponse) -> Identity {
    Identity {
        uid: account.local_id,
        display_name: account.display_name.filter(|s| !s.is_empty()),
        email: account.email,
        photo_url: account.photo_url.filter(|s| !s.is_empty()),
    }
}

/// Profile updates may rotate tokens; prefer the newer values where present.
fn merge_profile(original: AccountResponse, updated: AccountResponse) -> AccountResponse {
    AccountResponse {
        local_id: original.local_id,
        email: updated.email.or(original.email),
        display_name: updated.display_name.or(original.display_name),
        photo_url: updated.photo_url.or(original.photo_url),
        id_token: updated.id_token.or(original.id_token),
        expires_in: updated.expires_in.or(original.expires_in),
    }
}

/// Builds a `Rejected` error from a toolkit error body such as
/// `{"error": {"message": "WEAK_PASSWORD : Password should be at least 6 characters"}}`.
fn rejection(body: &str) -> AuthError {
    let raw = serde_json::from_str::<ToolkitError>(body)
        .map(|e| e.error.message)
        .unwrap_or_default();
    let code = raw.split(" : ").next().unwrap_or_default().trim().to_string();
    AuthError::Rejected {
        message: describe_auth_code(&code).to_string(),
        code,
    }
}

fn describe_auth_code(code: &str) -> &'static str {
    match code {
        "EMAIL_EXISTS" => "An account with this email already exists.",
        "INVALID_LOGIN_CREDENTIALS" | "INVALID_PASSWORD" | "EMAIL_NOT_FOUND" => {
            "Incorrect email or password."
        }
        "INVALID_EMAIL" => "Please enter a valid email address.",
        "MISSING_PASSWORD" => "Please enter a password.",
        "WEAK_PASSWORD" => "Password should be at least 6 characters.",
        "USER_DISABLED" => "This account has been disabled.",
        "TOO_MANY_ATTEMPTS_TRY_LATER" => "Too many attempts. Please try again later.",
        "OPERATION_NOT_ALLOWED" => "Email sign-in is not enabled for this project.",
        _ => "Authentication failed. Please try again.",
    }
}
