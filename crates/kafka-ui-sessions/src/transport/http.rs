//! HTTP transport for the REST proxy

use super::{CreateConsumerRequest, ProxyTransport};
use crate::config::ProxyConfig;
use crate::error::{ConsumerError, Result};
use crate::record::RawRecord;
use async_trait::async_trait;
use reqwest::{header, Client};
use std::time::Duration;

/// REST proxy transport over HTTP
///
/// # Example
///
/// ```rust,no_run
/// use kafka_ui_sessions::{HttpTransport, ProxyConfig};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let transport = HttpTransport::new(ProxyConfig::new("http://localhost:8082"))?;
/// # Ok(())
/// # }
/// ```
pub struct HttpTransport {
    config: ProxyConfig,
    base_url: String,
    client: Client,
}

impl HttpTransport {
    /// Create a transport for the proxy described by `config`
    pub fn new(config: ProxyConfig) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder.build()?;

        Ok(Self {
            base_url: config.normalized_base_url().to_string(),
            config,
            client,
        })
    }

    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ConsumerError::Server {
                status,
                message: body,
            });
        }
        Ok(response)
    }
}

#[async_trait]
impl ProxyTransport for HttpTransport {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn create_consumer(&self, group: &str, request: &CreateConsumerRequest) -> Result<()> {
        let url = format!("{}/consumers/{}", self.base_url, urlencoding::encode(group));
        tracing::debug!(%url, name = %request.name, format = %request.format, "Creating consumer instance");

        let response = self
            .client
            .post(&url)
            .header(header::CONTENT_TYPE, "application/json")
            .json(&request.to_body())
            .send()
            .await?;

        Self::check_status(response).await?;
        Ok(())
    }

    async fn delete_consumer(&self, instance_url: &str) -> Result<()> {
        tracing::debug!(url = %instance_url, "Deleting consumer instance");

        let response = self.client.delete(instance_url).send().await?;
        Self::check_status(response).await?;
        Ok(())
    }

    async fn read_records(&self, records_url: &str) -> Result<Vec<RawRecord>> {
        let response = self
            .client
            .get(records_url)
            .header(header::ACCEPT, self.config.record_media_type.as_str())
            .send()
            .await?;

        let response = Self::check_status(response).await?;
        let body = response.bytes().await?;
        let records: Vec<RawRecord> = serde_json::from_slice(&body)?;

        tracing::debug!(url = %records_url, count = records.len(), "Read records");
        Ok(records)
    }
}
