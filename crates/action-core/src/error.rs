use thiserror::Error;

use crate::directory::RemoteOperationError;

#[derive(Debug, Error)]
pub enum ActionError {
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("invalid subscription '{expression}': {reason}")]
    InvalidSubscription { expression: String, reason: String },

    #[error("malformed event payload for topic '{topic}': {source}")]
    MalformedEvent {
        topic: String,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Remote(#[from] RemoteOperationError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, ActionError>;
