//! Document store access — read-only collection listing over the Firestore REST API.
//!
//! Firestore wraps every field in a typed envelope (`{"stringValue": "…"}`); documents are
//! decoded to plain JSON here so callers never see the wire shape.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, warn};

use crate::session::AuthClient;

const FIRESTORE_API_BASE: &str = "https://firestore.googleapis.com/v1";
const PAGE_SIZE: u32 = 300;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Document store error (status {status}): {message}")]
    Api { status: u16, message: String },
}

/// A decoded document: its id (last path segment) and plain-JSON fields.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub fields: Map<String, Value>,
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Lists every document in `collection`. An absent collection is an empty list.
    async fn list_documents(&self, collection: &str) -> Result<Vec<Document>, StoreError>;
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListDocumentsResponse {
    #[serde(default)]
    documents: Vec<RawDocument>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawDocument {
    name: String,
    #[serde(default)]
    fields: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
struct FirestoreError {
    error: FirestoreErrorBody,
}

#[derive(Debug, Deserialize)]
struct FirestoreErrorBody {
    message: String,
}

#[derive(Clone)]
pub struct FirestoreClient {
    client: Client,
    project_id: String,
    api_key: String,
    auth: Option<AuthClient>,
}

impl FirestoreClient {
    pub fn new(project_id: String, api_key: String) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .build()
                .expect("Failed to build HTTP client"),
            project_id,
            api_key,
            auth: None,
        }
    }

    /// Sends the signed-in user's ID token with each request so security rules can see it.
    pub fn with_auth(mut self, auth: AuthClient) -> Self {
        self.auth = Some(auth);
        self
    }

    fn collection_url(&self, collection: &str) -> String {
        format!(
            "{FIRESTORE_API_BASE}/projects/{}/databases/(default)/documents/{collection}",
            self.project_id
        )
    }

    async fn fetch_page(
        &self,
        collection: &str,
        page_token: Option<&str>,
    ) -> Result<ListDocumentsResponse, StoreError> {
        let page_size = PAGE_SIZE.to_string();
        let mut query = vec![("key", self.api_key.as_str()), ("pageSize", page_size.as_str())];
        if let Some(token) = page_token {
            query.push(("pageToken", token));
        }

        let mut request = self.client.get(self.collection_url(collection)).query(&query);
        if let Some(auth) = &self.auth {
            if let Some(token) = auth.id_token().await {
                request = request.bearer_auth(token);
            }
        }

        let response = request.send().await?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            debug!("Collection '{collection}' not found");
            return Ok(ListDocumentsResponse::default());
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<FirestoreError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(StoreError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl DocumentStore for FirestoreClient {
    async fn list_documents(&self, collection: &str) -> Result<Vec<Document>, StoreError> {
        let mut documents = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let page = self.fetch_page(collection, page_token.as_deref()).await?;
            documents.extend(page.documents.into_iter().map(decode_document));

            match page.next_page_token.filter(|t| !t.is_empty()) {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        debug!("Listed {} documents from '{collection}'", documents.len());
        Ok(documents)
    }
}

fn decode_document(raw: RawDocument) -> Document {
    let id = raw
        .name
        .rsplit('/')
        .next()
        .unwrap_or_default()
        .to_string();
    Document {
        id,
        fields: decode_fields(&raw.fields),
    }
}

fn decode_fields(fields: &Map<String, Value>) -> Map<String, Value> {
    fields
        .iter()
        .map(|(k, v)| (k.clone(), decode_value(v)))
        .collect()
}

/// Converts one typed Firestore value to plain JSON.
pub fn decode_value(value: &Value) -> Value {
    let Some((kind, inner)) = value.as_object().and_then(|o| o.iter().next()) else {
        return Value::Null;
    };

    match kind.as_str() {
        "nullValue" => Value::Null,
        "booleanValue" | "doubleValue" => inner.clone(),
        // 64-bit integers travel as strings
        "integerValue" => match inner {
            Value::String(s) => s
                .parse::<i64>()
                .map(Value::from)
                .unwrap_or_else(|_| inner.clone()),
            other => other.clone(),
        },
        "stringValue" | "timestampValue" | "referenceValue" | "bytesValue" => inner.clone(),
        "geoPointValue" => inner.clone(),
        "arrayValue" => Value::Array(
            inner
                .get("values")
                .and_then(Value::as_array)
                .map(|values| values.iter().map(decode_value).collect())
                .unwrap_or_default(),
        ),
        "mapValue" => Value::Object(
            inner
                .get("fields")
                .and_then(Value::as_object)
                .map(decode_fields)
                .unwrap_or_default(),
        ),
        other => {
            warn!("Unknown Firestore value type '{other}'; keeping raw value");
            inner.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_scalar_values() {
        assert_eq!(decode_value(&json!({ "stringValue": "Science" })), json!("Science"));
        assert_eq!(decode_value(&json!({ "integerValue": "650000" })), json!(650000));
        assert_eq!(decode_value(&json!({ "doubleValue": 4.5 })), json!(4.5));
        assert_eq!(decode_value(&json!({ "booleanValue": true })), json!(true));
        assert_eq!(decode_value(&json!({ "nullValue": null })), Value::Null);
        assert_eq!(
            decode_value(&json!({ "timestampValue": "2024-05-01T00:00:00Z" })),
            json!("2024-05-01T00:00:00Z")
        );
    }

    #[test]
    fn test_decode_nested_values() {
        let value = json!({
            "mapValue": { "fields": {
                "name": { "stringValue": "IIT Bombay" },
                "courses": { "arrayValue": { "values": [
                    { "stringValue": "B.Tech" },
                    { "integerValue": "4" }
                ]}}
            }}
        });
        assert_eq!(
            decode_value(&value),
            json!({ "name": "IIT Bombay", "courses": ["B.Tech", 4] })
        );
    }

    #[test]
    fn test_decode_empty_containers() {
        assert_eq!(decode_value(&json!({ "arrayValue": {} })), json!([]));
        assert_eq!(decode_value(&json!({ "mapValue": {} })), json!({}));
        assert_eq!(decode_value(&json!("not an envelope")), Value::Null);
    }

    #[test]
    fn test_decode_document_uses_last_path_segment_as_id() {
        let raw: RawDocument = serde_json::from_value(json!({
            "name": "projects/p/databases/(default)/documents/careers/engineering",
            "fields": { "stream": { "stringValue": "Engineering" } },
            "createTime": "2024-05-01T00:00:00Z"
        }))
        .unwrap();
        let doc = decode_document(raw);
        assert_eq!(doc.id, "engineering");
        assert_eq!(doc.fields["stream"], json!("Engineering"));
    }

    #[test]
    fn test_empty_list_response_has_no_documents() {
        let page: ListDocumentsResponse = serde_json::from_value(json!({})).unwrap();
        assert!(page.documents.is_empty());
        assert!(page.next_page_token.is_none());
    }
}
