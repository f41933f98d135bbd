//! Consumer session lifecycle
//!
//! [`SessionManager`] makes sure a topic has a consumer instance on the REST
//! proxy in the requested format, reads new records through it, and tears it
//! down again. State shared across the client (registry, buffer, session id)
//! lives in [`ConsumerState`], built once and handed to the manager.
//!
//! Operations on one topic are not serialized internally: callers must let
//! `ensure` finish before fetching, and must not race `ensure`/`revoke` for
//! the same topic. Different topics are independent.

use crate::buffer::MessageBuffer;
use crate::codec::MessageFormat;
use crate::config::{BufferConfig, Config};
use crate::error::{ConsumerError, Result};
use crate::record::MessageRecord;
use crate::registry::{instance_url, SessionDescriptor, SessionRegistry};
use crate::transport::{CreateConsumerRequest, ProxyTransport};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Default consumer group prefix
pub const DEFAULT_GROUP_PREFIX: &str = "kafka-ui";

/// Client-wide consumer state
///
/// One instance per running client. The session id is generated once and
/// names the consumer group every session of this client joins.
#[derive(Debug)]
pub struct ConsumerState {
    session_id: String,
    registry: SessionRegistry,
    buffer: MessageBuffer,
}

impl ConsumerState {
    /// Fresh state with a random session id
    pub fn new(buffer_config: BufferConfig) -> Self {
        Self::with_session_id(uuid::Uuid::new_v4().to_string(), buffer_config)
    }

    /// State with a fixed session id
    pub fn with_session_id(session_id: impl Into<String>, buffer_config: BufferConfig) -> Self {
        Self {
            session_id: session_id.into(),
            registry: SessionRegistry::new(),
            buffer: MessageBuffer::new(buffer_config),
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    pub fn buffer(&self) -> &MessageBuffer {
        &self.buffer
    }
}

impl Default for ConsumerState {
    fn default() -> Self {
        Self::new(BufferConfig::default())
    }
}

/// Parameters of [`SessionManager::ensure`]
#[derive(Debug, Clone)]
pub struct EnsureConsumer {
    /// Consumer instance name
    pub name: String,
    /// Topic the session reads from
    pub topic: String,
    /// Record format, binary unless set
    pub format: MessageFormat,
    /// Extra consumer settings sent with the create request
    pub config: Map<String, Value>,
}

impl EnsureConsumer {
    pub fn new(name: impl Into<String>, topic: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            topic: topic.into(),
            format: MessageFormat::Binary,
            config: Map::new(),
        }
    }

    pub fn with_format(mut self, format: MessageFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_config(mut self, config: Map<String, Value>) -> Self {
        self.config = config;
        self
    }

    /// Add a single consumer setting
    pub fn with_setting(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.config.insert(key.into(), value.into());
        self
    }
}

/// Outcome of [`SessionManager::ensure`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnsureOutcome {
    /// A session in the requested format already existed
    Reused,
    /// A new session was created
    Created,
    /// A session in another format was revoked and a new one created
    Recreated,
}

/// Orchestrates consumer sessions against the REST proxy
///
/// # Example
///
/// ```rust,no_run
/// use kafka_ui_sessions::{ConsumerState, EnsureConsumer, HttpTransport, ProxyConfig, SessionManager};
/// use std::sync::Arc;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let transport = HttpTransport::new(ProxyConfig::default())?;
/// let manager = SessionManager::new(Arc::new(transport), Arc::new(ConsumerState::default()));
///
/// manager.ensure(EnsureConsumer::new("viewer", "orders")).await?;
/// manager.fetch("orders").await?;
///
/// for record in manager.messages("orders").await {
///     println!("{:?}", record.value);
/// }
/// # Ok(())
/// # }
/// ```
pub struct SessionManager {
    transport: Arc<dyn ProxyTransport>,
    state: Arc<ConsumerState>,
    group_prefix: String,
}

impl SessionManager {
    pub fn new(transport: Arc<dyn ProxyTransport>, state: Arc<ConsumerState>) -> Self {
        Self {
            transport,
            state,
            group_prefix: DEFAULT_GROUP_PREFIX.to_string(),
        }
    }

    /// Manager using the group prefix and buffer settings from `config`
    pub fn from_config(transport: Arc<dyn ProxyTransport>, config: &Config) -> Self {
        let state = Arc::new(ConsumerState::new(config.buffer.clone()));
        Self::new(transport, state).with_group_prefix(config.proxy.group_prefix.clone())
    }

    pub fn with_group_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.group_prefix = prefix.into();
        self
    }

    /// Consumer group shared by every session of this client
    pub fn group(&self) -> String {
        format!("{}-{}", self.group_prefix, self.state.session_id())
    }

    pub fn state(&self) -> &Arc<ConsumerState> {
        &self.state
    }

    /// Make sure `request.topic` has a session in `request.format`.
    ///
    /// An existing session in the same format is reused without any remote
    /// call. One in a different format is revoked first, and the new session
    /// is only created once that revocation succeeded.
    pub async fn ensure(&self, request: EnsureConsumer) -> Result<EnsureOutcome> {
        let mut outcome = EnsureOutcome::Created;

        if let Some(existing) = self.state.registry.get(&request.topic).await {
            if existing.format == request.format {
                debug!(topic = %request.topic, format = %request.format, "Reusing consumer session");
                return Ok(EnsureOutcome::Reused);
            }

            info!(
                topic = %request.topic,
                from = %existing.format,
                to = %request.format,
                "Consumer format changed, recreating session"
            );
            self.revoke(&request.topic).await?;
            outcome = EnsureOutcome::Recreated;
        }

        let group = self.group();
        let create = CreateConsumerRequest::new(request.name.clone(), request.format.clone())
            .with_config(request.config);

        self.transport.create_consumer(&group, &create).await?;

        let descriptor = SessionDescriptor {
            resource_locator: instance_url(self.transport.base_url(), &group, &request.name),
            topic: request.topic,
            group,
            instance_name: request.name,
            format: request.format,
        };

        info!(
            topic = %descriptor.topic,
            group = %descriptor.group,
            instance = %descriptor.instance_name,
            format = %descriptor.format,
            "Consumer session created"
        );
        self.state.registry.put(descriptor).await;

        Ok(outcome)
    }

    /// Revoke the session for `topic`.
    ///
    /// The local entry is cleared whether or not the proxy confirmed the
    /// delete. A failed delete is reported as [`ConsumerError::RevokedLocally`];
    /// the remote instance may then linger until the proxy expires it.
    pub async fn revoke(&self, topic: &str) -> Result<SessionDescriptor> {
        let descriptor = self
            .state
            .registry
            .get(topic)
            .await
            .ok_or_else(|| ConsumerError::NoActiveSession(topic.to_string()))?;

        let remote = self
            .transport
            .delete_consumer(&descriptor.resource_locator)
            .await;

        self.state.registry.remove(topic).await;

        match remote {
            Ok(()) => {
                info!(topic, instance = %descriptor.instance_name, "Consumer session revoked");
                Ok(descriptor)
            }
            Err(e) => {
                warn!(topic, instance = %descriptor.instance_name, error = %e, "Remote consumer delete failed, session cleared locally");
                Err(ConsumerError::RevokedLocally {
                    topic: topic.to_string(),
                    source: Box::new(e),
                })
            }
        }
    }

    /// Revoke every registered session.
    ///
    /// All sessions are attempted; the first failure is returned afterwards.
    pub async fn revoke_all(&self) -> Result<usize> {
        let mut revoked = 0;
        let mut first_error = None;

        for topic in self.state.registry.topics().await {
            match self.revoke(&topic).await {
                Ok(_) => revoked += 1,
                // Lost a race with another revoke
                Err(ConsumerError::NoActiveSession(_)) => {}
                Err(e) => {
                    if first_error.is_none() {
                        first_error = Some(e);
                    }
                }
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(revoked),
        }
    }

    /// Read new records for `topic` and append them to its buffer.
    ///
    /// Records are decoded with the session's format and appended oldest
    /// first. Nothing is appended if reading or decoding fails.
    pub async fn fetch(&self, topic: &str) -> Result<usize> {
        let descriptor = self
            .state
            .registry
            .get(topic)
            .await
            .ok_or_else(|| ConsumerError::NoActiveSession(topic.to_string()))?;

        let raw = self.transport.read_records(&descriptor.records_url()).await?;

        let mut records = raw
            .into_iter()
            .map(|record| record.decode(topic, &descriptor.format))
            .collect::<Result<Vec<_>>>()?;

        // Proxy returns newest first
        records.reverse();

        let appended = self.state.buffer.append(topic, records).await;
        debug!(topic, appended, "Fetched records");
        Ok(appended)
    }

    /// Session registered for `topic`
    pub async fn session(&self, topic: &str) -> Option<SessionDescriptor> {
        self.state.registry.get(topic).await
    }

    /// Every registered session, ordered by topic
    pub async fn sessions(&self) -> Vec<SessionDescriptor> {
        self.state.registry.snapshot().await
    }

    /// Buffered records for `topic`, oldest first
    pub async fn messages(&self, topic: &str) -> Vec<Arc<MessageRecord>> {
        self.state.buffer.messages(topic).await
    }

    /// Buffered records for `topic` from absolute position `from` on
    pub async fn messages_since(&self, topic: &str, from: usize) -> Vec<Arc<MessageRecord>> {
        self.state.buffer.messages_since(topic, from).await
    }
}
