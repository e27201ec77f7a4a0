/// Callable cloud functions client.
///
/// Speaks the HTTPS-callable protocol: the payload is wrapped as `{"data": …}` and the
/// function answers `{"result": …}` or `{"error": {"message", "status"}}`.
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{debug, warn};

use crate::session::AuthClient;

pub mod handlers;

pub const ROADMAP_PDF_FUNCTION: &str = "generatePdfReport";

#[derive(Debug, Error)]
pub enum FunctionsError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Function {function} failed ({status}): {message}")]
    Failed {
        function: String,
        status: String,
        message: String,
    },

    #[error("Function {0} returned no result")]
    MissingResult(String),
}

#[derive(Debug, Deserialize)]
struct CallableResponse {
    result: Option<Value>,
    error: Option<CallableError>,
}

#[derive(Debug, Deserialize)]
struct CallableError {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: String,
}

#[derive(Clone)]
pub struct FunctionsClient {
    client: Client,
    base_url: String,
    auth: AuthClient,
}

impl FunctionsClient {
    pub fn new(region: &str, project_id: &str, auth: AuthClient) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(120))
                .build()
                .expect("Failed to build HTTP client"),
            base_url: format!("https://{region}-{project_id}.cloudfunctions.net"),
            auth,
        }
    }

    /// Invokes a callable function, sending the signed-in user's ID token when there is one.
    pub async fn call(&self, function: &str, data: Value) -> Result<Value, FunctionsError> {
        let mut request = self
            .client
            .post(format!("{}/{function}", self.base_url))
            .json(&json!({ "data": data }));
        if let Some(token) = self.auth.id_token().await {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;
        debug!("Callable {function} returned {status}");

        let outcome = decode_callable(function, &body);
        if let Err(err) = &outcome {
            warn!("Callable {function} failed: {err}");
        }
        outcome
    }

    pub async fn roadmap_pdf(&self, data: Value) -> Result<Value, FunctionsError> {
        self.call(ROADMAP_PDF_FUNCTION, data).await
    }
}

fn decode_callable(function: &str, body: &str) -> Result<Value, FunctionsError> {
    let parsed: CallableResponse =
        serde_json::from_str(body).map_err(|_| FunctionsError::Failed {
            function: function.to_string(),
            status: "INTERNAL".to_string(),
            message: "Response was not valid JSON".to_string(),
        })?;

    if let Some(error) = parsed.error {
        return Err(FunctionsError::Failed {
            function: function.to_string(),
            status: error.status,
            message: error.message,
        });
    }

    parsed
        .result
        .ok_or_else(|| FunctionsError::MissingResult(function.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_result() {
        let value = decode_callable(
            ROADMAP_PDF_FUNCTION,
            r#"{"result": {"url": "https://storage.example/report.pdf"}}"#,
        )
        .unwrap();
        assert_eq!(value["url"], "https://storage.example/report.pdf");
    }

    #[test]
    fn test_decode_null_result_is_missing() {
        let err = decode_callable(ROADMAP_PDF_FUNCTION, r#"{"result": null}"#).unwrap_err();
        assert!(matches!(err, FunctionsError::MissingResult(_)));
    }

    #[test]
    fn test_decode_error_envelope() {
        let err = decode_callable(
            ROADMAP_PDF_FUNCTION,
            r#"{"error": {"message": "User must be signed in", "status": "UNAUTHENTICATED"}}"#,
        )
        .unwrap_err();
        match err {
            FunctionsError::Failed {
                status, message, ..
            } => {
                assert_eq!(status, "UNAUTHENTICATED");
                assert_eq!(message, "User must be signed in");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_decode_non_json_body() {
        let err = decode_callable(ROADMAP_PDF_FUNCTION, "<html>").unwrap_err();
        assert!(err.to_string().contains("not valid JSON"));
    }
}
