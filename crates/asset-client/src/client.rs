use std::path::Path;
use std::time::Duration;

use action_core::config::ClientConfig;
use action_core::directory::RemoteResult;
use action_core::{AssetDirectory, AssetVersionRef, ComponentRef, RemoteOperationError};
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::operations;
use crate::response::{decode, refine};

/// Location that records file paths without managing the data.
pub const UNMANAGED_LOCATION: &str = "ftrack.unmanaged";

// ─── AssetClient ──────────────────────────────────────────────────────────

pub struct AssetClient {
    http: Client,
    endpoint: String,
    location_id: String,
    server_version: Option<String>,
}

impl std::fmt::Debug for AssetClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssetClient")
            .field("endpoint", &self.endpoint)
            .field("location_id", &self.location_id)
            .field("server_version", &self.server_version)
            .finish()
    }
}

impl AssetClient {
    /// Build the HTTP client, check the server answers with these
    /// credentials, and resolve the unmanaged location.
    pub fn connect(config: &ClientConfig) -> RemoteResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert("ftrack-user", header_value(&config.api_user, "api user")?);
        headers.insert("ftrack-api-key", header_value(&config.api_key, "api key")?);

        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(headers)
            .build()
            .map_err(|e| RemoteOperationError::Transport(e.to_string()))?;

        let mut client = Self {
            http,
            endpoint: format!("{}/api", config.server_url.trim_end_matches('/')),
            location_id: String::new(),
            server_version: None,
        };

        let info = client.call_one(operations::query_server_information())?;
        client.server_version = info
            .get("version")
            .and_then(Value::as_str)
            .map(str::to_string);

        let location = client.call_one(operations::query(format!(
            "select id from Location where name is \"{UNMANAGED_LOCATION}\""
        )))?;
        client.location_id = location
            .pointer("/data/0/id")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| {
                RemoteOperationError::Decode(format!("location '{UNMANAGED_LOCATION}' not found"))
            })?;

        tracing::info!(
            endpoint = %client.endpoint,
            server_version = client.server_version.as_deref().unwrap_or("unknown"),
            "connected to asset directory"
        );
        Ok(client)
    }

    pub fn server_version(&self) -> Option<&str> {
        self.server_version.as_deref()
    }

    pub fn location_id(&self) -> &str {
        &self.location_id
    }

    fn call(&self, operations: &[Value]) -> RemoteResult<Vec<Value>> {
        tracing::debug!(endpoint = %self.endpoint, count = operations.len(), "api call");
        let response = self
            .http
            .post(&self.endpoint)
            .json(operations)
            .send()
            .map_err(|e| RemoteOperationError::Transport(e.to_string()))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .map_err(|e| RemoteOperationError::Transport(e.to_string()))?;

        let results = decode(status, &body)?;
        if results.len() != operations.len() {
            return Err(RemoteOperationError::Decode(format!(
                "expected {} results, got {}",
                operations.len(),
                results.len()
            )));
        }
        Ok(results)
    }

    fn call_one(&self, operation: Value) -> RemoteResult<Value> {
        let mut results = self.call(&[operation])?;
        Ok(results.remove(0))
    }
}

fn header_value(value: &str, what: &str) -> RemoteResult<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|_| RemoteOperationError::Unauthorized(format!("{what} is not a valid header value")))
}

/// `.abc` for `geo.abc`; empty for directories and extensionless files.
fn file_type(path: &Path) -> String {
    if path.is_dir() {
        return String::new();
    }
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{e}"))
        .unwrap_or_default()
}

// ─── AssetDirectory ───────────────────────────────────────────────────────

impl AssetDirectory for AssetClient {
    fn create_component(
        &self,
        version: &AssetVersionRef,
        name: &str,
        path: &Path,
    ) -> RemoteResult<ComponentRef> {
        let component_id = Uuid::new_v4().to_string();
        let size = std::fs::metadata(path)
            .ok()
            .filter(|m| m.is_file())
            .map_or(0, |m| m.len());

        let ops = [
            operations::create(
                "FileComponent",
                json!({
                    "id": component_id,
                    "name": name,
                    "version_id": version.id(),
                    "file_type": file_type(path),
                    "size": size,
                }),
            ),
            operations::create(
                "ComponentLocation",
                json!({
                    "id": Uuid::new_v4().to_string(),
                    "component_id": component_id,
                    "location_id": self.location_id,
                    "resource_identifier": path.to_string_lossy(),
                }),
            ),
        ];

        let results = self
            .call(&ops)
            .map_err(|e| refine(e, version, Some(name)))?;
        let id = results[0]
            .pointer("/data/id")
            .and_then(Value::as_str)
            .map_or(component_id, str::to_string);

        tracing::debug!(version_id = %version, component_id = %id, "component created");
        Ok(ComponentRef {
            id,
            name: name.to_string(),
        })
    }

    fn publish(&self, version: &AssetVersionRef) -> RemoteResult<()> {
        self.call(&[operations::update(
            "AssetVersion",
            version.id(),
            json!({ "is_published": true }),
        )])
        .map_err(|e| refine(e, version, None))?;
        tracing::debug!(version_id = %version, "version published");
        Ok(())
    }
}
