//! The `component.add` action: attach a file component to an asset version
//! and publish the version.
//!
//! Discovery offers the action when the first selected entity is an asset
//! version. Launch is two-phase: without `values` it returns the input form;
//! with `values` it validates them and runs the remote mutation.

use crate::directory::{AssetDirectory, AssetVersionRef, RemoteOperationError};
use crate::error::Result;
use crate::hub::{EventHub, Registry};
use crate::subscription::quote_value;
use crate::types::{
    ActionData, ActionDescriptor, ActionOutcome, DiscoverResponse, Event, FormField, FormSpec,
    FormValues, LaunchResponse, DISCOVER_TOPIC, LAUNCH_TOPIC,
};
use serde::Serialize;
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;

pub const ACTION_IDENTIFIER: &str = "component.add";
pub const ACTION_LABEL: &str = "ComponentAdd";
pub const ASSET_VERSION_TYPE: &str = "assetversion";

pub const FIELD_COMPONENT_NAME: &str = "component_name";
pub const FIELD_COMPONENT_PATH: &str = "component_path";

pub const MSG_MISSING_INPUT: &str = "Missing input.";
pub const MSG_PATH_MISSING: &str = "Path doesn't exist.";
pub const MSG_COMPONENT_EXISTS: &str = "Component already exists.";
pub const MSG_COMPONENT_ADDED: &str = "Component Added";
pub const MSG_NO_SELECTION: &str = "No asset version selected.";

pub struct ComponentAdd {
    directory: Arc<dyn AssetDirectory>,
}

impl ComponentAdd {
    pub fn new(directory: Arc<dyn AssetDirectory>) -> Self {
        Self { directory }
    }

    pub fn descriptor() -> ActionDescriptor {
        ActionDescriptor {
            label: ACTION_LABEL.to_string(),
            action_identifier: ACTION_IDENTIFIER.to_string(),
        }
    }

    pub fn form() -> FormSpec {
        FormSpec {
            items: vec![
                FormField::text("Component Name", FIELD_COMPONENT_NAME),
                FormField::text("Component Path", FIELD_COMPONENT_PATH),
            ],
        }
    }

    /// Offer the action when the first selected item is an asset version.
    /// Later items are not inspected.
    pub fn discover(&self, data: &ActionData) -> Option<DiscoverResponse> {
        let first = data.selection.first()?;
        if first.entity_type != ASSET_VERSION_TYPE {
            return None;
        }
        Some(DiscoverResponse {
            items: vec![Self::descriptor()],
        })
    }

    pub fn launch(&self, data: &ActionData) -> LaunchResponse {
        match &data.values {
            None => LaunchResponse::Form(Self::form()),
            Some(values) => LaunchResponse::Outcome(self.execute(data, values)),
        }
    }

    fn execute(&self, data: &ActionData, values: &FormValues) -> ActionOutcome {
        let Some(first) = data.selection.first() else {
            tracing::warn!(action = ACTION_IDENTIFIER, "launch with values but no selection");
            return ActionOutcome::failed(MSG_NO_SELECTION);
        };
        let version = AssetVersionRef::new(&first.entity_id);

        let name = values.text(FIELD_COMPONENT_NAME);
        let path = values.text(FIELD_COMPONENT_PATH);
        if name.is_empty() || path.is_empty() {
            return ActionOutcome::failed(MSG_MISSING_INPUT);
        }

        let path = Path::new(path);
        if !path.exists() {
            tracing::info!(path = %path.display(), "component path does not exist");
            return ActionOutcome::failed(MSG_PATH_MISSING);
        }

        let component = match self.directory.create_component(&version, name, path) {
            Ok(component) => component,
            Err(err) => return remote_failure(&version, name, "create_component", &err),
        };

        // No rollback: a publish failure leaves the new component in place.
        if let Err(err) = self.directory.publish(&version) {
            tracing::error!(
                version_id = %version,
                component_id = %component.id,
                "component created but version publish failed"
            );
            return remote_failure(&version, name, "publish", &err);
        }

        tracing::info!(
            version_id = %version,
            component = name,
            component_id = %component.id,
            path = %path.display(),
            "component added"
        );
        ActionOutcome::succeeded(MSG_COMPONENT_ADDED)
    }

    /// Subscribe discovery and launch callbacks scoped to `username`.
    pub fn subscribe(self: Arc<Self>, hub: &EventHub, username: &str) -> Result<()> {
        let handler = Arc::clone(&self);
        hub.subscribe(
            &format!("topic={DISCOVER_TOPIC} and source.user.username={}", quote_value(username)),
            move |event| handler.on_event(event, |h, data| h.discover(data)),
        )?;

        let handler = self;
        hub.subscribe(
            &format!(
                "topic={LAUNCH_TOPIC} and source.user.username={} \
                 and data.actionIdentifier={ACTION_IDENTIFIER}",
                quote_value(username)
            ),
            move |event| handler.on_event(event, |h, data| Some(h.launch(data))),
        )?;
        Ok(())
    }

    fn on_event<R, F>(&self, event: &Event, respond: F) -> Option<Value>
    where
        R: Serialize,
        F: FnOnce(&Self, &ActionData) -> Option<R>,
    {
        let data = match event.action_data() {
            Ok(data) => data,
            Err(err) => {
                tracing::warn!(event = %event.id, error = %err, "ignoring malformed action event");
                return None;
            }
        };
        let reply = respond(self, &data)?;
        match serde_json::to_value(reply) {
            Ok(value) => Some(value),
            Err(err) => {
                tracing::error!(event = %event.id, error = %err, "failed to encode reply");
                None
            }
        }
    }
}

fn remote_failure(
    version: &AssetVersionRef,
    name: &str,
    operation: &str,
    err: &RemoteOperationError,
) -> ActionOutcome {
    tracing::warn!(
        version_id = %version,
        component = name,
        operation,
        kind = err.kind(),
        error = %err,
        "remote operation failed"
    );
    ActionOutcome::failed(MSG_COMPONENT_EXISTS)
}

/// Plugin entry point. Registers the action on `hub` only when `registry`
/// is the process-wide event-handler registry; returns whether it did.
pub fn register(
    registry: &Registry,
    hub: &EventHub,
    username: &str,
    directory: Arc<dyn AssetDirectory>,
) -> Result<bool> {
    if !registry.is_event_handlers() {
        tracing::debug!(registry = registry.name(), "foreign registry, skipping registration");
        return Ok(false);
    }
    Arc::new(ComponentAdd::new(directory)).subscribe(hub, username)?;
    tracing::info!(action = ACTION_IDENTIFIER, username, "action registered");
    Ok(true)
}
