//! Topic → consumer session registry

use crate::codec::MessageFormat;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tokio::sync::RwLock;

/// One remote consumer instance bound to a single topic
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionDescriptor {
    /// Topic this session reads from
    pub topic: String,
    /// Consumer group the instance was created in
    pub group: String,
    /// Consumer instance name given at creation
    pub instance_name: String,
    /// Absolute URL of the consumer instance on the proxy
    pub resource_locator: String,
    /// Format negotiated when the instance was created
    pub format: MessageFormat,
}

impl SessionDescriptor {
    /// URL records for this session's topic are read from
    pub fn records_url(&self) -> String {
        format!(
            "{}/topics/{}",
            self.resource_locator,
            urlencoding::encode(&self.topic)
        )
    }
}

/// Absolute URL of consumer instance `instance_name` in `group`
pub fn instance_url(base_url: &str, group: &str, instance_name: &str) -> String {
    format!(
        "{}/consumers/{}/instances/{}",
        base_url.trim_end_matches('/'),
        urlencoding::encode(group),
        urlencoding::encode(instance_name)
    )
}

/// Session registry keyed by topic
///
/// Holds at most one descriptor per topic. Every mutation happens under the
/// write lock, so readers never see a half-written entry.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: RwLock<HashMap<String, SessionDescriptor>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Descriptor for `topic`, if any
    pub async fn get(&self, topic: &str) -> Option<SessionDescriptor> {
        self.sessions.read().await.get(topic).cloned()
    }

    /// Insert or overwrite the descriptor for its topic
    pub async fn put(&self, descriptor: SessionDescriptor) -> Option<SessionDescriptor> {
        let mut sessions = self.sessions.write().await;
        sessions.insert(descriptor.topic.clone(), descriptor)
    }

    /// Remove the descriptor for `topic`; no-op when absent
    pub async fn remove(&self, topic: &str) -> Option<SessionDescriptor> {
        self.sessions.write().await.remove(topic)
    }

    /// Topics with a registered session
    pub async fn topics(&self) -> Vec<String> {
        let mut topics: Vec<String> = self.sessions.read().await.keys().cloned().collect();
        topics.sort();
        topics
    }

    /// Snapshot of every registered descriptor
    pub async fn snapshot(&self) -> Vec<SessionDescriptor> {
        let mut sessions: Vec<SessionDescriptor> =
            self.sessions.read().await.values().cloned().collect();
        sessions.sort_by(|a, b| a.topic.cmp(&b.topic));
        sessions
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}
