pub mod component_add;
pub mod config;
pub mod directory;
pub mod error;
pub mod hub;
pub mod subscription;
pub mod types;

pub use component_add::{register, ComponentAdd};
pub use directory::{AssetDirectory, AssetVersionRef, ComponentRef, RemoteOperationError};
pub use error::{ActionError, Result};
pub use hub::{EventHub, Registry};
