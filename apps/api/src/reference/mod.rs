// Reference data (careers, colleges, streams, ventures) read from the document store.
// An empty collection is a data-configuration problem, not a request failure.

pub mod firestore;
pub mod handlers;

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::warn;

pub use firestore::{Document, DocumentStore, FirestoreClient, StoreError};

pub const CAREERS_COLLECTION: &str = "careers";
pub const COLLEGES_COLLECTION: &str = "colleges";
pub const STREAMS_COLLECTION: &str = "streams";
pub const VENTURES_COLLECTION: &str = "entrepreneurship";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CareerStream {
    pub id: String,
    pub name: String,
    pub avg_salary: Option<f64>,
}

impl From<Document> for CareerStream {
    fn from(doc: Document) -> Self {
        let name = doc
            .fields
            .get("stream")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let avg_salary = doc.fields.get("avg_salary").and_then(number_like);
        CareerStream {
            id: doc.id,
            name,
            avg_salary,
        }
    }
}

/// A reference document whose schema is owned by whoever seeds the store.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReferenceRecord {
    pub id: String,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

/// A string `id` field seeded into the document overrides the document name.
impl From<Document> for ReferenceRecord {
    fn from(doc: Document) -> Self {
        let mut fields = doc.fields;
        let id = match fields.remove("id") {
            Some(Value::String(seeded)) => seeded,
            _ => doc.id,
        };
        ReferenceRecord { id, fields }
    }
}

fn number_like(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Lists a collection, logging a warning when it is empty.
async fn fetch_collection(
    store: &dyn DocumentStore,
    collection: &str,
) -> Result<Vec<Document>, StoreError> {
    let documents = store.list_documents(collection).await?;
    if documents.is_empty() {
        warn!("'{collection}' collection is empty in the document store; check data seeding");
    }
    Ok(documents)
}

pub async fn get_careers(store: &dyn DocumentStore) -> Result<Vec<CareerStream>, StoreError> {
    let documents = fetch_collection(store, CAREERS_COLLECTION).await?;
    Ok(documents.into_iter().map(CareerStream::from).collect())
}

/// Colleges, streams, and ventures share the untyped record shape.
pub async fn get_records(
    store: &dyn DocumentStore,
    collection: &str,
) -> Result<Vec<ReferenceRecord>, StoreError> {
    let documents = fetch_collection(store, collection).await?;
    Ok(documents.into_iter().map(ReferenceRecord::from).collect())
}
