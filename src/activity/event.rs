//! Activity event records and their typed payloads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::ToSchema;

/// Free-form event payload keyed by field name.
pub type EventData = BTreeMap<String, EventValue>;

/// JSON-compatible value carried in event payloads and subagent state.
///
/// Serialized untagged, so a payload reads as a plain JSON object on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EventValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    List(Vec<EventValue>),
    Map(BTreeMap<String, EventValue>),
}

impl EventValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            EventValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            EventValue::Int(n) => Some(*n),
            _ => None,
        }
    }
}

impl From<&str> for EventValue {
    fn from(value: &str) -> Self {
        EventValue::Text(value.to_string())
    }
}

impl From<String> for EventValue {
    fn from(value: String) -> Self {
        EventValue::Text(value)
    }
}

impl From<&String> for EventValue {
    fn from(value: &String) -> Self {
        EventValue::Text(value.clone())
    }
}

impl From<bool> for EventValue {
    fn from(value: bool) -> Self {
        EventValue::Bool(value)
    }
}

impl From<i64> for EventValue {
    fn from(value: i64) -> Self {
        EventValue::Int(value)
    }
}

impl From<u32> for EventValue {
    fn from(value: u32) -> Self {
        EventValue::Int(i64::from(value))
    }
}

impl From<u64> for EventValue {
    fn from(value: u64) -> Self {
        EventValue::Int(i64::try_from(value).unwrap_or(i64::MAX))
    }
}

impl From<usize> for EventValue {
    fn from(value: usize) -> Self {
        EventValue::Int(i64::try_from(value).unwrap_or(i64::MAX))
    }
}

impl From<u8> for EventValue {
    fn from(value: u8) -> Self {
        EventValue::Int(i64::from(value))
    }
}

impl From<f64> for EventValue {
    fn from(value: f64) -> Self {
        EventValue::Float(value)
    }
}

impl<T: Into<EventValue>> From<Option<T>> for EventValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(EventValue::Null)
    }
}

impl<T: Into<EventValue>> From<Vec<T>> for EventValue {
    fn from(value: Vec<T>) -> Self {
        EventValue::List(value.into_iter().map(Into::into).collect())
    }
}

/// Builds an [`EventData`] map from `key => value` pairs.
///
/// ```ignore
/// let data = event_data! { "subtask" => 2u32, "has_url" => true };
/// ```
#[macro_export]
macro_rules! event_data {
    () => {
        $crate::activity::EventData::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut data = $crate::activity::EventData::new();
        $(
            data.insert(
                ::std::string::ToString::to_string(&$key),
                $crate::activity::EventValue::from($value),
            );
        )+
        data
    }};
}

/// Category tag of an activity event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Start,
    Info,
    Progress,
    Source,
    Complete,
    Error,
}

/// One immutable entry in a session's activity history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ActivityEvent {
    /// Position in the log's append order; never reused for the log's lifetime
    pub seq: u64,
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "type")]
    pub kind: EventKind,
    pub message: String,
    #[serde(default)]
    #[schema(value_type = Object)]
    pub data: EventData,
}
