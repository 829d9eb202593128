//! `asset-client`: blocking HTTP client for the remote asset directory.
//!
//! The server exposes a single JSON operations endpoint: every request is a
//! `POST {server}/api` carrying an array of operations, and the response is
//! an array with one result per operation, or an `{exception, content}`
//! object when the batch failed.
//!
//! ```text
//! AssetClient::connect
//!     │  query_server_information   (reachability + credentials)
//!     │  query Location ftrack.unmanaged
//!     ▼
//! AssetDirectory impl
//!     create_component  → create FileComponent + create ComponentLocation
//!     publish           → update AssetVersion {is_published: true}
//! ```

mod client;
pub mod operations;
pub(crate) mod response;

#[cfg(test)]
mod tests;

pub use client::{AssetClient, UNMANAGED_LOCATION};
