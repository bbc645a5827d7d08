pub mod error;
pub mod http;
pub mod memory;

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::model::join::attach_users;
use crate::model::{Collection, Record};

pub use error::GatewayError;
pub use http::HttpGateway;
pub use memory::MemoryGateway;

/// Client for the remote document store. Documents travel as raw JSON and
/// are parsed against the collection schema by the callers below.
#[async_trait]
pub trait Gateway: Send + Sync {
    /// Every document in the collection, in store order
    async fn list(&self, collection: Collection) -> Result<Vec<Value>, GatewayError>;

    async fn get(&self, collection: Collection, id: &str) -> Result<Value, GatewayError>;

    /// Create a document; the store assigns the id and returns the stored document
    async fn create(&self, collection: Collection, fields: Map<String, Value>) -> Result<Value, GatewayError>;

    /// Merge `fields` into an existing document and return the stored document
    async fn update(
        &self,
        collection: Collection,
        id: &str,
        fields: Map<String, Value>,
    ) -> Result<Value, GatewayError>;

    async fn delete(&self, collection: Collection, id: &str) -> Result<(), GatewayError>;
}

/// Fetch a whole collection as typed records. Documents that do not fit the
/// schema are dropped with a warning. Collections with a user reference are
/// joined against `users`, fetched concurrently.
pub async fn fetch_records<G>(gateway: &G, collection: Collection) -> Result<Vec<Record>, GatewayError>
where
    G: Gateway + ?Sized,
{
    let schema = collection.schema();

    let records = match collection.user_ref() {
        Some(foreign_key) => {
            let (docs, user_docs) = futures::try_join!(
                gateway.list(collection),
                gateway.list(Collection::Users)
            )?;
            let mut records = schema.parse_all(collection.store_name(), docs);
            let users = Collection::Users
                .schema()
                .parse_all(Collection::Users.store_name(), user_docs);
            attach_users(&mut records, &users, foreign_key);
            records
        }
        None => schema.parse_all(collection.store_name(), gateway.list(collection).await?),
    };

    tracing::debug!("Fetched {} {} records", records.len(), collection);
    Ok(records)
}

/// Fetch and parse a single record
pub async fn fetch_record<G>(gateway: &G, collection: Collection, id: &str) -> Result<Record, GatewayError>
where
    G: Gateway + ?Sized,
{
    let doc = gateway.get(collection, id).await?;
    collection
        .schema()
        .parse(doc)
        .map_err(|e| GatewayError::MalformedResponse(format!("{} record '{}': {}", collection, id, e)))
}
