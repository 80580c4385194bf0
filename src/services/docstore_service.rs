use async_trait::async_trait;
use log::error;
use reqwest::Client;
use serde_json::{json, Map, Value};
use uuid::Uuid;

use crate::config;
use crate::services::{GatewayError, GatewayResult};

/// One stored document: its id (the last path segment) and its fields as
/// plain JSON, already translated out of the wire format.
#[derive(Debug, Clone)]
pub struct Document {
    pub id: String,
    pub fields: Value,
}

/// Per-user hierarchical document store. Paths are slash separated under
/// the project root, e.g. `users/{uid}/chats/{date}/messages/{id}`.
/// Writes that participate in ordering carry a server-assigned
/// `timestamp` field.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DocStoreApi: Send + Sync {
    async fn get_document(&self, id_token: &str, path: &str) -> GatewayResult<Option<Document>>;
    /// Create-or-replace a document and stamp its `timestamp` field with
    /// the server time.
    async fn set_document(&self, id_token: &str, path: &str, fields: Value) -> GatewayResult<()>;
    /// Patch the named fields of an existing document; fails if it does
    /// not exist.
    async fn update_fields(&self, id_token: &str, path: &str, fields: Value) -> GatewayResult<()>;
    /// Append a new auto-id document to a collection, stamped with the
    /// server time. Returns the new document id.
    async fn add_document(&self, id_token: &str, collection: &str, fields: Value)
        -> GatewayResult<String>;
    /// List a collection's documents, optionally ordered by the server
    /// timestamp ascending.
    async fn list_documents(
        &self,
        id_token: &str,
        collection: &str,
        order_by_timestamp: bool,
    ) -> GatewayResult<Vec<Document>>;
}

pub struct DocStoreClient {
    http: Client,
    base_url: String,
    project_id: String,
}

impl DocStoreClient {
    pub fn new(base_url: String, project_id: String) -> Self {
        DocStoreClient {
            http: Client::new(),
            base_url,
            project_id,
        }
    }

    pub fn from_config() -> Self {
        Self::new(config::docstore_base_url(), config::project_id())
    }

    fn document_name(&self, path: &str) -> String {
        format!(
            "projects/{}/databases/(default)/documents/{}",
            self.project_id, path
        )
    }

    fn document_url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, self.document_name(path))
    }

    fn commit_url(&self) -> String {
        format!(
            "{}/projects/{}/databases/(default)/documents:commit",
            self.base_url, self.project_id
        )
    }

    /// Issues a single-write commit that also sets the server timestamp.
    async fn commit_write(&self, id_token: &str, path: &str, fields: Value) -> GatewayResult<()> {
        let body = json!({
            "writes": [{
                "update": {
                    "name": self.document_name(path),
                    "fields": encode_fields(&fields),
                },
                "updateTransforms": [{
                    "fieldPath": "timestamp",
                    "setToServerValue": "REQUEST_TIME",
                }],
            }],
        });
        let response = self
            .http
            .post(self.commit_url())
            .bearer_auth(id_token)
            .json(&body)
            .send()
            .await?;
        check_status("commit", response).await?;
        Ok(())
    }
}

async fn check_status(operation: &str, response: reqwest::Response) -> GatewayResult<Value> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json().await.unwrap_or_default());
    }
    let payload: Value = response.json().await.unwrap_or_default();
    let message = payload["error"]["message"]
        .as_str()
        .unwrap_or("unknown backend error")
        .to_string();
    error!("docstore {} failed: {} {}", operation, status, message);
    Err(GatewayError::Backend {
        status: status.as_u16(),
        message,
    })
}

#[async_trait]
impl DocStoreApi for DocStoreClient {
    async fn get_document(&self, id_token: &str, path: &str) -> GatewayResult<Option<Document>> {
        let response = self
            .http
            .get(self.document_url(path))
            .bearer_auth(id_token)
            .send()
            .await?;
        if response.status().as_u16() == 404 {
            return Ok(None);
        }
        let payload = check_status("get", response).await?;
        Ok(Some(decode_document(&payload)))
    }

    async fn set_document(&self, id_token: &str, path: &str, fields: Value) -> GatewayResult<()> {
        self.commit_write(id_token, path, fields).await
    }

    async fn update_fields(&self, id_token: &str, path: &str, fields: Value) -> GatewayResult<()> {
        let mut url = format!("{}?currentDocument.exists=true", self.document_url(path));
        if let Some(map) = fields.as_object() {
            for key in map.keys() {
                url.push_str(&format!("&updateMask.fieldPaths={}", key));
            }
        }
        let body = json!({ "fields": encode_fields(&fields) });
        let response = self
            .http
            .patch(url)
            .bearer_auth(id_token)
            .json(&body)
            .send()
            .await?;
        check_status("update", response).await?;
        Ok(())
    }

    async fn add_document(
        &self,
        id_token: &str,
        collection: &str,
        fields: Value,
    ) -> GatewayResult<String> {
        // The commit surface needs a full document name, so the id is
        // minted client-side.
        let id = Uuid::new_v4().to_string();
        let path = format!("{}/{}", collection, id);
        self.commit_write(id_token, &path, fields).await?;
        Ok(id)
    }

    async fn list_documents(
        &self,
        id_token: &str,
        collection: &str,
        order_by_timestamp: bool,
    ) -> GatewayResult<Vec<Document>> {
        let mut url = format!("{}?pageSize=300", self.document_url(collection));
        if order_by_timestamp {
            url.push_str("&orderBy=timestamp");
        }
        let response = self.http.get(url).bearer_auth(id_token).send().await?;
        if response.status().as_u16() == 404 {
            return Ok(Vec::new());
        }
        let payload = check_status("list", response).await?;
        let documents = payload["documents"]
            .as_array()
            .map(|docs| docs.iter().map(decode_document).collect())
            .unwrap_or_default();
        Ok(documents)
    }
}

fn decode_document(payload: &Value) -> Document {
    let id = payload["name"]
        .as_str()
        .and_then(|name| name.rsplit('/').next())
        .unwrap_or_default()
        .to_string();
    Document {
        id,
        fields: decode_fields(&payload["fields"]),
    }
}

/// Translates plain JSON object fields into the store's typed-value wire
/// format.
pub fn encode_fields(fields: &Value) -> Value {
    let mut encoded = Map::new();
    if let Some(map) = fields.as_object() {
        for (key, value) in map {
            encoded.insert(key.clone(), encode_value(value));
        }
    }
    Value::Object(encoded)
}

fn encode_value(value: &Value) -> Value {
    match value {
        Value::Null => json!({ "nullValue": null }),
        Value::Bool(b) => json!({ "booleanValue": b }),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                json!({ "integerValue": i.to_string() })
            } else {
                json!({ "doubleValue": n.as_f64() })
            }
        }
        Value::String(s) => json!({ "stringValue": s }),
        Value::Array(items) => {
            let values: Vec<Value> = items.iter().map(encode_value).collect();
            json!({ "arrayValue": { "values": values } })
        }
        Value::Object(_) => json!({ "mapValue": { "fields": encode_fields(value) } }),
    }
}

/// Translates typed-value wire fields back into plain JSON.
pub fn decode_fields(fields: &Value) -> Value {
    let mut decoded = Map::new();
    if let Some(map) = fields.as_object() {
        for (key, value) in map {
            decoded.insert(key.clone(), decode_value(value));
        }
    }
    Value::Object(decoded)
}

fn decode_value(value: &Value) -> Value {
    let Some(map) = value.as_object() else {
        return Value::Null;
    };
    if let Some(s) = map.get("stringValue").and_then(Value::as_str) {
        return Value::String(s.to_string());
    }
    if let Some(b) = map.get("booleanValue").and_then(Value::as_bool) {
        return Value::Bool(b);
    }
    if let Some(i) = map.get("integerValue") {
        // Integers travel as strings on the wire.
        let parsed = i
            .as_str()
            .and_then(|s| s.parse::<i64>().ok())
            .or_else(|| i.as_i64());
        if let Some(n) = parsed {
            return json!(n);
        }
    }
    if let Some(d) = map.get("doubleValue").and_then(Value::as_f64) {
        return json!(d);
    }
    if let Some(ts) = map.get("timestampValue").and_then(Value::as_str) {
        return Value::String(ts.to_string());
    }
    if let Some(array) = map.get("arrayValue") {
        let values = array["values"]
            .as_array()
            .map(|items| items.iter().map(decode_value).collect())
            .unwrap_or_default();
        return Value::Array(values);
    }
    if let Some(object) = map.get("mapValue") {
        return decode_fields(&object["fields"]);
    }
    Value::Null
}
