//! Client-side boundary to the remote asset directory.
//!
//! `AssetDirectory` is the seam the action handler talks through; the HTTP
//! implementation lives in the `asset-client` crate. Every failure crossing
//! this boundary is a `RemoteOperationError`.

use std::fmt;
use std::path::Path;
use thiserror::Error;

/// Handle to one asset version, resolved from a selection's `entityId`.
/// Constructing it does not contact the directory.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AssetVersionRef {
    id: String,
}

impl AssetVersionRef {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

impl fmt::Display for AssetVersionRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id)
    }
}

/// A component created on an asset version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentRef {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemoteOperationError {
    #[error("component '{name}' already exists on version {version_id}")]
    ComponentExists { name: String, version_id: String },

    #[error("asset version not found: {0}")]
    VersionNotFound(String),

    #[error("not authorized: {0}")]
    Unauthorized(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("server raised {exception}: {message}")]
    Server { exception: String, message: String },

    #[error("could not decode server response: {0}")]
    Decode(String),
}

impl RemoteOperationError {
    /// Short stable name used in log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ComponentExists { .. } => "component_exists",
            Self::VersionNotFound(_) => "version_not_found",
            Self::Unauthorized(_) => "unauthorized",
            Self::Transport(_) => "transport",
            Self::Server { .. } => "server",
            Self::Decode(_) => "decode",
        }
    }
}

pub type RemoteResult<T> = std::result::Result<T, RemoteOperationError>;

/// Operations the component-add action needs from the remote directory.
pub trait AssetDirectory: Send + Sync {
    /// Attach a file component named `name` pointing at `path`.
    fn create_component(
        &self,
        version: &AssetVersionRef,
        name: &str,
        path: &Path,
    ) -> RemoteResult<ComponentRef>;

    /// Mark the version as published.
    fn publish(&self, version: &AssetVersionRef) -> RemoteResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_are_distinct() {
        let errors = [
            RemoteOperationError::ComponentExists {
                name: "geo".into(),
                version_id: "v1".into(),
            },
            RemoteOperationError::VersionNotFound("v1".into()),
            RemoteOperationError::Unauthorized("bad key".into()),
            RemoteOperationError::Transport("refused".into()),
            RemoteOperationError::Server {
                exception: "ServerError".into(),
                message: "boom".into(),
            },
            RemoteOperationError::Decode("eof".into()),
        ];
        let mut kinds: Vec<_> = errors.iter().map(|e| e.kind()).collect();
        kinds.sort();
        kinds.dedup();
        assert_eq!(kinds.len(), errors.len());
    }

    #[test]
    fn component_exists_message_names_component() {
        let err = RemoteOperationError::ComponentExists {
            name: "geo".into(),
            version_id: "v1".into(),
        };
        assert_eq!(err.to_string(), "component 'geo' already exists on version v1");
    }
}
