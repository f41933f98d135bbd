//! Per-topic buffer of consumed records
//!
//! Records are appended in consumption order (oldest first) and never
//! modified afterwards. The buffer is unbounded unless
//! [`BufferConfig::max_records_per_topic`] is set, in which case the oldest
//! records of a topic are evicted once the bound is exceeded.

use crate::config::BufferConfig;
use crate::record::MessageRecord;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Append-only message buffer keyed by topic
#[derive(Debug, Default)]
pub struct MessageBuffer {
    config: BufferConfig,
    topics: RwLock<HashMap<String, TopicBuffer>>,
}

#[derive(Debug, Default)]
struct TopicBuffer {
    records: VecDeque<Arc<MessageRecord>>,
    /// Records evicted by the size bound since the buffer was created
    evicted: usize,
}

impl MessageBuffer {
    pub fn new(config: BufferConfig) -> Self {
        Self {
            config,
            topics: RwLock::new(HashMap::new()),
        }
    }

    /// Append records for `topic`, creating its buffer on first use
    pub async fn append(&self, topic: &str, records: Vec<MessageRecord>) -> usize {
        let appended = records.len();
        let mut topics = self.topics.write().await;
        let buffer = topics.entry(topic.to_string()).or_default();

        buffer.records.extend(records.into_iter().map(Arc::new));

        if let Some(max) = self.config.max_records_per_topic {
            while buffer.records.len() > max {
                buffer.records.pop_front();
                buffer.evicted += 1;
            }
        }

        appended
    }

    /// All buffered records for `topic`, oldest first
    pub async fn messages(&self, topic: &str) -> Vec<Arc<MessageRecord>> {
        self.messages_since(topic, 0).await
    }

    /// Records at absolute position `from` and later.
    ///
    /// Positions count every record ever appended to the topic, so a caller
    /// holding a position from [`MessageBuffer::total_appended`] still gets
    /// only newer records after evictions.
    pub async fn messages_since(&self, topic: &str, from: usize) -> Vec<Arc<MessageRecord>> {
        let topics = self.topics.read().await;
        let Some(buffer) = topics.get(topic) else {
            return Vec::new();
        };

        let skip = from.saturating_sub(buffer.evicted);
        buffer.records.iter().skip(skip).cloned().collect()
    }

    /// Number of records currently held for `topic`
    pub async fn len(&self, topic: &str) -> usize {
        self.topics
            .read()
            .await
            .get(topic)
            .map_or(0, |b| b.records.len())
    }

    /// Number of records ever appended for `topic`, including evicted ones
    pub async fn total_appended(&self, topic: &str) -> usize {
        self.topics
            .read()
            .await
            .get(topic)
            .map_or(0, |b| b.records.len() + b.evicted)
    }

    /// Whether a buffer exists for `topic`
    pub async fn contains(&self, topic: &str) -> bool {
        self.topics.read().await.contains_key(topic)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::MessageFormat;
    use crate::record::RawRecord;

    fn records(topic: &str, values: &[&str]) -> Vec<MessageRecord> {
        values
            .iter()
            .map(|v| {
                RawRecord::with_value(*v)
                    .decode(topic, &MessageFormat::Json)
                    .unwrap()
            })
            .collect()
    }

    fn values(records: &[Arc<MessageRecord>]) -> Vec<&str> {
        records.iter().filter_map(|r| r.value_str()).collect()
    }

    #[tokio::test]
    async fn test_append_is_cumulative() {
        let buffer = MessageBuffer::default();
        assert!(!buffer.contains("orders").await);

        buffer.append("orders", records("orders", &["a", "b"])).await;
        buffer.append("orders", records("orders", &["b", "c"])).await;

        let messages = buffer.messages("orders").await;
        assert_eq!(values(&messages), vec!["a", "b", "b", "c"]);
        assert_eq!(buffer.len("orders").await, 4);
        assert!(buffer.messages("payments").await.is_empty());
    }

    #[tokio::test]
    async fn test_empty_append_creates_topic() {
        let buffer = MessageBuffer::default();
        buffer.append("orders", Vec::new()).await;
        assert!(buffer.contains("orders").await);
        assert_eq!(buffer.len("orders").await, 0);
    }

    #[tokio::test]
    async fn test_bounded_buffer_evicts_oldest() {
        let buffer = MessageBuffer::new(BufferConfig {
            max_records_per_topic: Some(3),
        });

        buffer.append("orders", records("orders", &["a", "b"])).await;
        buffer.append("orders", records("orders", &["c", "d", "e"])).await;

        assert_eq!(values(&buffer.messages("orders").await), vec!["c", "d", "e"]);
        assert_eq!(buffer.total_appended("orders").await, 5);

        // Position 4 is "e" even though two records were evicted
        assert_eq!(values(&buffer.messages_since("orders", 4).await), vec!["e"]);
        assert_eq!(values(&buffer.messages_since("orders", 0).await), vec!["c", "d", "e"]);
    }
}
