//! In-memory proxy transport for tests.

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

use super::{CreateConsumerRequest, ProxyTransport};
use crate::error::{ConsumerError, Result};
use crate::record::RawRecord;

/// A call received by [`MockTransport`]
#[derive(Debug, Clone, PartialEq)]
pub enum ProxyCall {
    Create {
        group: String,
        request: CreateConsumerRequest,
    },
    Delete {
        instance_url: String,
    },
    Read {
        records_url: String,
    },
}

/// Mock transport for testing.
///
/// Records every call in order, serves queued record sets per URL and can be
/// switched to fail each kind of call.
pub struct MockTransport {
    base_url: String,
    calls: Mutex<Vec<ProxyCall>>,
    record_sets: Mutex<HashMap<String, VecDeque<Vec<RawRecord>>>>,
    fail_create: AtomicBool,
    fail_delete: AtomicBool,
    fail_read: AtomicBool,
}

impl MockTransport {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            calls: Mutex::new(Vec::new()),
            record_sets: Mutex::new(HashMap::new()),
            fail_create: AtomicBool::new(false),
            fail_delete: AtomicBool::new(false),
            fail_read: AtomicBool::new(false),
        }
    }

    /// Queue a record set (newest first) for the next read of `records_url`
    pub fn push_records(&self, records_url: impl Into<String>, records: Vec<RawRecord>) {
        lock(&self.record_sets)
            .entry(records_url.into())
            .or_default()
            .push_back(records);
    }

    pub fn set_fail_create(&self, fail: bool) {
        self.fail_create.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_delete(&self, fail: bool) {
        self.fail_delete.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_read(&self, fail: bool) {
        self.fail_read.store(fail, Ordering::SeqCst);
    }

    /// Every call received so far, in order
    pub fn calls(&self) -> Vec<ProxyCall> {
        lock(&self.calls).clone()
    }

    /// Number of calls received so far
    pub fn call_count(&self) -> usize {
        lock(&self.calls).len()
    }

    pub fn clear_calls(&self) {
        lock(&self.calls).clear();
    }

    fn record(&self, call: ProxyCall) {
        lock(&self.calls).push(call);
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new("http://localhost:8082")
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn unavailable(what: &str) -> ConsumerError {
    ConsumerError::RemoteUnavailable(format!("mock {} disabled", what))
}

#[async_trait]
impl ProxyTransport for MockTransport {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn create_consumer(&self, group: &str, request: &CreateConsumerRequest) -> Result<()> {
        self.record(ProxyCall::Create {
            group: group.to_string(),
            request: request.clone(),
        });

        if self.fail_create.load(Ordering::SeqCst) {
            return Err(unavailable("create"));
        }
        Ok(())
    }

    async fn delete_consumer(&self, instance_url: &str) -> Result<()> {
        self.record(ProxyCall::Delete {
            instance_url: instance_url.to_string(),
        });

        if self.fail_delete.load(Ordering::SeqCst) {
            return Err(unavailable("delete"));
        }
        Ok(())
    }

    async fn read_records(&self, records_url: &str) -> Result<Vec<RawRecord>> {
        self.record(ProxyCall::Read {
            records_url: records_url.to_string(),
        });

        if self.fail_read.load(Ordering::SeqCst) {
            return Err(unavailable("read"));
        }

        Ok(lock(&self.record_sets)
            .get_mut(records_url)
            .and_then(VecDeque::pop_front)
            .unwrap_or_default())
    }
}
