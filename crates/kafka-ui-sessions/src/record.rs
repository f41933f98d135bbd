//! Record types exchanged with the REST proxy

use crate::codec::MessageFormat;
use crate::error::Result;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// A record as the proxy returns it
///
/// Fields other than `topic`, `key`, `value`, `partition` and `offset` are
/// kept in `extra` so nothing the proxy sends is dropped. A `null` key or
/// value stays `Some(Value::Null)`; `None` means the field was absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    /// Sent by v2 record sets only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub key: Option<Value>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub partition: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<i64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Present fields deserialize to `Some`, including `null`
fn present<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Option<Value>, D::Error> {
    Value::deserialize(deserializer).map(Some)
}

impl RawRecord {
    /// Record carrying only a string value
    pub fn with_value(value: impl Into<String>) -> Self {
        Self {
            value: Some(Value::String(value.into())),
            ..Default::default()
        }
    }

    /// Decode the value for `topic` and stamp the topic on the result.
    ///
    /// A topic sent by the proxy is replaced by `topic`.
    ///
    /// Only string values are decoded; null, absent and already-structured
    /// values (json/avro sessions) are kept as they are.
    pub fn decode(self, topic: &str, format: &MessageFormat) -> Result<MessageRecord> {
        let value = match self.value {
            Some(Value::String(encoded)) => format.decode(Some(&encoded))?.map(Value::String),
            other => other,
        };

        Ok(MessageRecord {
            topic: topic.to_string(),
            key: self.key,
            value,
            partition: self.partition,
            offset: self.offset,
            extra: self.extra,
        })
    }
}

/// A decoded record held in the message buffer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageRecord {
    pub topic: String,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub key: Option<Value>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub partition: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<i64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl MessageRecord {
    /// Value as text, when it is a string
    pub fn value_str(&self) -> Option<&str> {
        self.value.as_ref().and_then(Value::as_str)
    }
}
