use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, RwLock};
use uuid::Uuid;

use super::{Gateway, GatewayError};
use crate::model::Collection;
use crate::types::Operation;

/// In-process document store. Keeps insertion order, assigns v4 ids and can
/// be told to reject upcoming calls.
#[derive(Debug, Default)]
pub struct MemoryGateway {
    collections: RwLock<HashMap<Collection, Vec<Map<String, Value>>>>,
    /// Pending rejections; `None` matches any operation
    failures: Mutex<VecDeque<(Option<Operation>, String)>>,
    calls: Mutex<Vec<(Operation, Collection)>>,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append raw documents; documents without an id get one
    pub fn seed(&self, collection: Collection, docs: Vec<Value>) {
        let mut collections = self.collections.write().unwrap_or_else(|e| e.into_inner());
        let store = collections.entry(collection).or_default();
        for doc in docs {
            let mut map = match doc {
                Value::Object(map) => map,
                other => {
                    // Keep malformed documents around so schema exclusion can be exercised
                    let mut map = Map::new();
                    map.insert("value".to_string(), other);
                    map
                }
            };
            map.entry("id").or_insert_with(|| Value::String(Uuid::new_v4().to_string()));
            store.push(map);
        }
    }

    /// Reject the next call with `message`
    pub fn fail_next(&self, message: impl Into<String>) {
        self.failures
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back((None, message.into()));
    }

    /// Reject the next call of `operation` with `message`
    pub fn fail_on(&self, operation: Operation, message: impl Into<String>) {
        self.failures
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back((Some(operation), message.into()));
    }

    /// Operations issued so far, oldest first
    pub fn calls(&self) -> Vec<(Operation, Collection)> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Raw stored document, as other readers of the store would see it
    pub fn document(&self, collection: Collection, id: &str) -> Option<Value> {
        self.collections
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(&collection)
            .and_then(|docs| docs.iter().find(|doc| has_id(doc, id)))
            .map(|doc| Value::Object(doc.clone()))
    }

    pub fn count(&self, collection: Collection) -> usize {
        self.collections
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(&collection)
            .map_or(0, Vec::len)
    }

    fn begin(&self, operation: Operation, collection: Collection) -> Result<(), GatewayError> {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((operation, collection));

        let mut failures = self.failures.lock().unwrap_or_else(|e| e.into_inner());
        let pending = failures
            .iter()
            .position(|(target, _)| target.is_none() || *target == Some(operation));
        match pending.and_then(|index| failures.remove(index)) {
            Some((_, message)) => Err(GatewayError::Rejected {
                operation,
                status: 500,
                message,
            }),
            None => Ok(()),
        }
    }

    fn not_found(collection: Collection, id: &str) -> GatewayError {
        GatewayError::NotFound {
            collection: collection.store_name().to_string(),
            id: id.to_string(),
        }
    }
}

fn has_id(doc: &Map<String, Value>, id: &str) -> bool {
    doc.get("id").and_then(Value::as_str) == Some(id)
}

#[async_trait]
impl Gateway for MemoryGateway {
    async fn list(&self, collection: Collection) -> Result<Vec<Value>, GatewayError> {
        self.begin(Operation::List, collection)?;
        let collections = self.collections.read().unwrap_or_else(|e| e.into_inner());
        Ok(collections
            .get(&collection)
            .map(|docs| docs.iter().cloned().map(Value::Object).collect())
            .unwrap_or_default())
    }

    async fn get(&self, collection: Collection, id: &str) -> Result<Value, GatewayError> {
        self.begin(Operation::Get, collection)?;
        let collections = self.collections.read().unwrap_or_else(|e| e.into_inner());
        collections
            .get(&collection)
            .and_then(|docs| docs.iter().find(|doc| has_id(doc, id)))
            .map(|doc| Value::Object(doc.clone()))
            .ok_or_else(|| Self::not_found(collection, id))
    }

    async fn create(&self, collection: Collection, mut fields: Map<String, Value>) -> Result<Value, GatewayError> {
        self.begin(Operation::Create, collection)?;
        fields.insert("id".to_string(), Value::String(Uuid::new_v4().to_string()));

        let mut collections = self.collections.write().unwrap_or_else(|e| e.into_inner());
        collections.entry(collection).or_default().push(fields.clone());
        Ok(Value::Object(fields))
    }

    async fn update(
        &self,
        collection: Collection,
        id: &str,
        fields: Map<String, Value>,
    ) -> Result<Value, GatewayError> {
        self.begin(Operation::Update, collection)?;
        let mut collections = self.collections.write().unwrap_or_else(|e| e.into_inner());
        let doc = collections
            .get_mut(&collection)
            .and_then(|docs| docs.iter_mut().find(|doc| has_id(doc, id)))
            .ok_or_else(|| Self::not_found(collection, id))?;

        for (key, value) in fields {
            if key != "id" {
                doc.insert(key, value);
            }
        }
        Ok(Value::Object(doc.clone()))
    }

    async fn delete(&self, collection: Collection, id: &str) -> Result<(), GatewayError> {
        self.begin(Operation::Delete, collection)?;
        let mut collections = self.collections.write().unwrap_or_else(|e| e.into_inner());
        let docs = collections
            .get_mut(&collection)
            .ok_or_else(|| Self::not_found(collection, id))?;
        let index = docs
            .iter()
            .position(|doc| has_id(doc, id))
            .ok_or_else(|| Self::not_found(collection, id))?;
        docs.remove(index);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap_or_default()
    }

    #[tokio::test]
    async fn test_crud_round() {
        let gateway = MemoryGateway::new();
        let created = gateway
            .create(Collection::CrisisContacts, fields(json!({ "name": "Shout", "phone": "85258" })))
            .await
            .unwrap();
        let id = created["id"].as_str().unwrap().to_string();

        let updated = gateway
            .update(Collection::CrisisContacts, &id, fields(json!({ "phone": "85 258", "id": "nope" })))
            .await
            .unwrap();
        assert_eq!(updated["phone"], "85 258");
        assert_eq!(updated["name"], "Shout");
        assert_eq!(updated["id"], id.as_str());

        gateway.delete(Collection::CrisisContacts, &id).await.unwrap();
        assert_eq!(gateway.count(Collection::CrisisContacts), 0);

        let err = gateway.get(Collection::CrisisContacts, &id).await.unwrap_err();
        assert!(matches!(err, GatewayError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_list_keeps_insertion_order() {
        let gateway = MemoryGateway::new();
        gateway.seed(
            Collection::Users,
            vec![json!({ "id": "b" }), json!({ "id": "a" }), json!({ "id": "c" })],
        );
        let ids: Vec<String> = gateway
            .list(Collection::Users)
            .await
            .unwrap()
            .iter()
            .map(|d| d["id"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(ids, vec!["b", "a", "c"]);
    }

    #[tokio::test]
    async fn test_injected_failure_applies_once() {
        let gateway = MemoryGateway::new();
        gateway.fail_next("quota exceeded");

        let err = gateway.list(Collection::Tips).await.unwrap_err();
        assert_eq!(
            err,
            GatewayError::Rejected {
                operation: Operation::List,
                status: 500,
                message: "quota exceeded".to_string()
            }
        );
        assert!(gateway.list(Collection::Tips).await.is_ok());
        assert_eq!(gateway.calls().len(), 2);
    }
}
