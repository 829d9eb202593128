use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use uuid::Uuid;

pub const DISCOVER_TOPIC: &str = "ftrack.action.discover";
pub const LAUNCH_TOPIC: &str = "ftrack.action.launch";

// ---------------------------------------------------------------------------
// Event envelope
// ---------------------------------------------------------------------------

/// A message delivered by the hub. `data` stays untyped at this level so
/// subscriptions can address any field by dotted path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    pub topic: String,
    #[serde(default)]
    pub source: EventSource,
    #[serde(default)]
    pub data: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sent: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventSource {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub user: SourceUser,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceUser {
    #[serde(default)]
    pub username: String,
}

impl Event {
    pub fn new(topic: impl Into<String>, username: impl Into<String>, data: Value) -> Self {
        Self {
            id: Uuid::new_v4(),
            topic: topic.into(),
            source: EventSource {
                id: None,
                user: SourceUser {
                    username: username.into(),
                },
            },
            data,
            sent: Some(Utc::now()),
        }
    }

    /// Resolve a dotted path (`topic`, `source.user.username`,
    /// `data.actionIdentifier`) to its scalar value rendered as a string.
    /// Objects, arrays, null and unknown paths resolve to `None`.
    pub fn field(&self, path: &str) -> Option<String> {
        let (head, rest) = match path.split_once('.') {
            Some((head, rest)) => (head, Some(rest)),
            None => (path, None),
        };
        match (head, rest) {
            ("topic", None) => Some(self.topic.clone()),
            ("id", None) => Some(self.id.to_string()),
            ("source", Some(rest)) => {
                let source = serde_json::to_value(&self.source).ok()?;
                scalar(source.pointer(&json_pointer(rest))?)
            }
            ("data", Some(rest)) => scalar(self.data.pointer(&json_pointer(rest))?),
            _ => None,
        }
    }

    /// Decode `data` as an action payload.
    pub fn action_data(&self) -> crate::Result<ActionData> {
        let data = if self.data.is_null() {
            Value::Object(Default::default())
        } else {
            self.data.clone()
        };
        serde_json::from_value(data).map_err(|source| crate::ActionError::MalformedEvent {
            topic: self.topic.clone(),
            source,
        })
    }
}

fn json_pointer(dotted: &str) -> String {
    let mut pointer = String::with_capacity(dotted.len() + 1);
    for segment in dotted.split('.') {
        pointer.push('/');
        pointer.push_str(&segment.replace('~', "~0").replace('/', "~1"));
    }
    pointer
}

fn scalar(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Action payload
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionItem {
    pub entity_type: String,
    pub entity_id: String,
}

impl SelectionItem {
    pub fn new(entity_type: impl Into<String>, entity_id: impl Into<String>) -> Self {
        Self {
            entity_type: entity_type.into(),
            entity_id: entity_id.into(),
        }
    }
}

/// The `data` section of discovery and launch events.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionData {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub selection: Vec<SelectionItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_identifier: Option<String>,
    /// Present only once the user has submitted the form.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values: Option<FormValues>,
}

fn null_as_empty<'de, D>(d: D) -> Result<Vec<SelectionItem>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt: Option<Vec<SelectionItem>> = Option::deserialize(d)?;
    Ok(opt.unwrap_or_default())
}

/// Submitted form values keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormValues(BTreeMap<String, Value>);

impl FormValues {
    /// The submitted text for `name`; missing or non-string values read as empty.
    pub fn text(&self, name: &str) -> &str {
        self.0.get(name).and_then(Value::as_str).unwrap_or("")
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FormValues {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), Value::String(v.into())))
                .collect(),
        )
    }
}

// ---------------------------------------------------------------------------
// Replies
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionDescriptor {
    pub label: String,
    #[serde(rename = "actionIdentifier")]
    pub action_identifier: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoverResponse {
    pub items: Vec<ActionDescriptor>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    Text,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormField {
    pub label: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub name: String,
}

impl FormField {
    pub fn text(label: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            field_type: FieldType::Text,
            name: name.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormSpec {
    pub items: Vec<FormField>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionOutcome {
    pub success: bool,
    pub message: String,
}

impl ActionOutcome {
    pub fn succeeded(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

/// Reply to a launch event: either the form to collect, or the result of
/// running the action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LaunchResponse {
    Form(FormSpec),
    Outcome(ActionOutcome),
}
