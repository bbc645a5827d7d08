use async_trait::async_trait;
use reqwest::{RequestBuilder, StatusCode};
use serde_json::{Map, Value};
use std::time::Duration;
use url::Url;

use super::{Gateway, GatewayError};
use crate::config;
use crate::model::Collection;
use crate::types::Operation;

/// Document store client over its REST surface:
/// `GET|POST {base}/{collection}` and `GET|PATCH|DELETE {base}/{collection}/{id}`
#[derive(Debug, Clone)]
pub struct HttpGateway {
    client: reqwest::Client,
    base_url: Url,
    token: Option<String>,
}

impl HttpGateway {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, GatewayError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| GatewayError::Configuration(format!("invalid base URL '{}': {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(GatewayError::Configuration(format!(
                "base URL '{}' cannot carry collection paths",
                base_url
            )));
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GatewayError::Configuration(e.to_string()))?;

        Ok(Self {
            client,
            base_url,
            token: None,
        })
    }

    /// Gateway for the configured document store
    pub fn from_config() -> Result<Self, GatewayError> {
        let gateway = &config::config().gateway;
        Self::new(&gateway.base_url, Duration::from_secs(gateway.timeout_secs))
    }

    /// Send `Authorization: Bearer <token>` with every call
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn url(&self, collection: Collection, id: Option<&str>) -> Url {
        let mut url = self.base_url.clone();
        // Checked in new(): the base URL always has path segments
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(collection.store_name());
            if let Some(id) = id {
                segments.push(id);
            }
        }
        url
    }

    async fn send(
        &self,
        operation: Operation,
        collection: Collection,
        id: Option<&str>,
        request: RequestBuilder,
    ) -> Result<Option<Value>, GatewayError> {
        let request = match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        };

        if config::config().gateway.debug_logging {
            tracing::debug!("{} {}{}", operation, collection, id.map(|i| format!("/{}", i)).unwrap_or_default());
        }

        let response = request.send().await.map_err(|e| GatewayError::Transport {
            operation,
            message: e.to_string(),
        })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| GatewayError::Transport {
            operation,
            message: e.to_string(),
        })?;

        if status.is_success() {
            if body.trim().is_empty() {
                return Ok(None);
            }
            return serde_json::from_str(&body)
                .map(Some)
                .map_err(|e| GatewayError::MalformedResponse(format!("{} {}: {}", operation, collection, e)));
        }

        let message = error_message(&body).unwrap_or_else(|| {
            status.canonical_reason().unwrap_or("request failed").to_string()
        });
        tracing::debug!("{} {} failed with {}: {}", operation, collection, status, message);

        Err(match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => GatewayError::Unauthorized(message),
            StatusCode::NOT_FOUND if id.is_some() => GatewayError::NotFound {
                collection: collection.store_name().to_string(),
                id: id.unwrap_or_default().to_string(),
            },
            _ => GatewayError::Rejected {
                operation,
                status: status.as_u16(),
                message,
            },
        })
    }

    async fn send_document(
        &self,
        operation: Operation,
        collection: Collection,
        id: Option<&str>,
        request: RequestBuilder,
    ) -> Result<Value, GatewayError> {
        match self.send(operation, collection, id, request).await? {
            Some(body) => unwrap_document(body),
            None => Err(GatewayError::MalformedResponse(format!(
                "{} {} returned an empty body",
                operation, collection
            ))),
        }
    }
}

/// Stores answer either with the bare payload or wrapped as `{ "data": ... }`
fn unwrap_document(body: Value) -> Result<Value, GatewayError> {
    match body {
        Value::Object(mut map) if map.contains_key("data") && !map.contains_key("id") => {
            match map.remove("data") {
                Some(doc @ Value::Object(_)) => Ok(doc),
                _ => Err(GatewayError::MalformedResponse("expected a document".to_string())),
            }
        }
        doc @ Value::Object(_) => Ok(doc),
        _ => Err(GatewayError::MalformedResponse("expected a document".to_string())),
    }
}

fn unwrap_list(body: Value) -> Result<Vec<Value>, GatewayError> {
    match body {
        Value::Array(docs) => Ok(docs),
        Value::Object(mut map) => match map.remove("data") {
            Some(Value::Array(docs)) => Ok(docs),
            _ => Err(GatewayError::MalformedResponse("expected a list of documents".to_string())),
        },
        _ => Err(GatewayError::MalformedResponse("expected a list of documents".to_string())),
    }
}

/// Pull a human message out of an error body (`message`, `error` or plain text)
fn error_message(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }
    match serde_json::from_str::<Value>(trimmed) {
        Ok(json) => ["message", "error"]
            .iter()
            .find_map(|key| json.get(key).and_then(Value::as_str).map(str::to_string))
            .or_else(|| json.get("error").and_then(|e| e.get("message")).and_then(Value::as_str).map(str::to_string)),
        Err(_) => Some(trimmed.to_string()),
    }
}

#[async_trait]
impl Gateway for HttpGateway {
    async fn list(&self, collection: Collection) -> Result<Vec<Value>, GatewayError> {
        let request = self.client.get(self.url(collection, None));
        match self.send(Operation::List, collection, None, request).await? {
            Some(body) => unwrap_list(body),
            None => Ok(Vec::new()),
        }
    }

    async fn get(&self, collection: Collection, id: &str) -> Result<Value, GatewayError> {
        let request = self.client.get(self.url(collection, Some(id)));
        self.send_document(Operation::Get, collection, Some(id), request).await
    }

    async fn create(&self, collection: Collection, fields: Map<String, Value>) -> Result<Value, GatewayError> {
        let request = self.client.post(self.url(collection, None)).json(&fields);
        let doc = self.send_document(Operation::Create, collection, None, request).await?;
        let id = doc.get("id").and_then(Value::as_str).unwrap_or("?");
        tracing::info!("Created {} record {}", collection, id);
        Ok(doc)
    }

    async fn update(
        &self,
        collection: Collection,
        id: &str,
        fields: Map<String, Value>,
    ) -> Result<Value, GatewayError> {
        let request = self.client.patch(self.url(collection, Some(id))).json(&fields);
        let doc = match self.send(Operation::Update, collection, Some(id), request).await? {
            Some(body) => unwrap_document(body)?,
            // Some stores answer 204; read the document back
            None => self.get(collection, id).await?,
        };
        tracing::info!("Updated {} record {}", collection, id);
        Ok(doc)
    }

    async fn delete(&self, collection: Collection, id: &str) -> Result<(), GatewayError> {
        let request = self.client.delete(self.url(collection, Some(id)));
        self.send(Operation::Delete, collection, Some(id), request).await?;
        tracing::info!("Deleted {} record {}", collection, id);
        Ok(())
    }
}
