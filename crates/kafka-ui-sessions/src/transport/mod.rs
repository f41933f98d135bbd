//! REST proxy transport
//!
//! [`ProxyTransport`] is the seam between the session manager and the proxy:
//! - [`HttpTransport`] talks to a real proxy over HTTP
//! - [`MockTransport`] records calls in memory for tests and offline runs

mod http;
mod mock;

pub use http::HttpTransport;
pub use mock::{MockTransport, ProxyCall};

use crate::codec::MessageFormat;
use crate::error::Result;
use crate::record::RawRecord;
use async_trait::async_trait;
use serde_json::{Map, Value};

/// Session-oriented operations of the REST proxy
#[async_trait]
pub trait ProxyTransport: Send + Sync {
    /// Base URL consumer instance locators are built from
    fn base_url(&self) -> &str;

    /// Create consumer instance `request.name` in `group`
    async fn create_consumer(&self, group: &str, request: &CreateConsumerRequest) -> Result<()>;

    /// Delete the consumer instance at `instance_url`
    async fn delete_consumer(&self, instance_url: &str) -> Result<()>;

    /// Read the next record set from `records_url`, newest first
    async fn read_records(&self, records_url: &str) -> Result<Vec<RawRecord>>;
}

/// Body of a create-consumer request
#[derive(Debug, Clone, PartialEq)]
pub struct CreateConsumerRequest {
    /// Consumer instance name
    pub name: String,
    /// Record format for the instance
    pub format: MessageFormat,
    /// Additional consumer settings passed to the proxy as-is
    pub config: Map<String, Value>,
}

impl CreateConsumerRequest {
    pub fn new(name: impl Into<String>, format: MessageFormat) -> Self {
        Self {
            name: name.into(),
            format,
            config: Map::new(),
        }
    }

    pub fn with_config(mut self, config: Map<String, Value>) -> Self {
        self.config = config;
        self
    }

    /// JSON body sent to the proxy.
    ///
    /// `format` and `name` take precedence over same-named config keys.
    pub fn to_body(&self) -> Value {
        let mut body = self.config.clone();
        body.insert("format".to_string(), Value::String(self.format.to_string()));
        body.insert("name".to_string(), Value::String(self.name.clone()));
        Value::Object(body)
    }
}
