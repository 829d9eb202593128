use action_core::{AssetVersionRef, RemoteOperationError};
use serde_json::Value;

const SNIPPET_LEN: usize = 200;

/// Turn an `/api` response into per-operation results.
pub(crate) fn decode(status: u16, body: &str) -> Result<Vec<Value>, RemoteOperationError> {
    if status == 401 || status == 403 {
        return Err(RemoteOperationError::Unauthorized(snippet(body)));
    }
    let success = (200..300).contains(&status);

    let value: Value = match serde_json::from_str(body) {
        Ok(v) => v,
        Err(_) if !success => return Err(http_error(status, body)),
        Err(e) => return Err(RemoteOperationError::Decode(e.to_string())),
    };

    if let Some(exception) = value.get("exception").and_then(Value::as_str) {
        let content = value.get("content").and_then(Value::as_str).unwrap_or_default();
        return Err(classify_exception(exception, content));
    }
    if !success {
        return Err(http_error(status, body));
    }

    match value {
        Value::Array(results) => Ok(results),
        other => Err(RemoteOperationError::Decode(format!(
            "expected an array of results, got {}",
            type_name(&other)
        ))),
    }
}

fn classify_exception(exception: &str, content: &str) -> RemoteOperationError {
    let lower = content.to_lowercase();
    if exception.contains("Permission")
        || lower.contains("permission denied")
        || lower.contains("not authenticated")
        || lower.contains("invalid api key")
    {
        return RemoteOperationError::Unauthorized(content.to_string());
    }
    RemoteOperationError::Server {
        exception: exception.to_string(),
        message: content.to_string(),
    }
}

/// Narrow a generic server exception raised while operating on `version`.
pub(crate) fn refine(
    err: RemoteOperationError,
    version: &AssetVersionRef,
    component: Option<&str>,
) -> RemoteOperationError {
    let RemoteOperationError::Server { message, .. } = &err else {
        return err;
    };
    let lower = message.to_lowercase();
    if let Some(name) = component {
        if lower.contains("duplicate") || lower.contains("already exists") {
            return RemoteOperationError::ComponentExists {
                name: name.to_string(),
                version_id: version.id().to_string(),
            };
        }
    }
    if lower.contains("not found") || lower.contains("no result") || lower.contains("does not exist")
    {
        return RemoteOperationError::VersionNotFound(version.id().to_string());
    }
    err
}

fn http_error(status: u16, body: &str) -> RemoteOperationError {
    RemoteOperationError::Server {
        exception: format!("HTTP {status}"),
        message: snippet(body),
    }
}

fn snippet(body: &str) -> String {
    body.chars().take(SNIPPET_LEN).collect()
}

fn type_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
