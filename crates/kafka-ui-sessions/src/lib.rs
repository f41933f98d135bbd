//! Consumer sessions for the kafka-ui REST proxy client
//!
//! Manages per-topic consumer instances on a stateful Kafka REST proxy:
//! creates them lazily, reuses them while the requested format is unchanged,
//! tears them down, and buffers the decoded records they return.
//!
//! # Example
//!
//! ```rust,no_run
//! use kafka_ui_sessions::{Config, EnsureConsumer, HttpTransport, MessageFormat, SessionManager};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::default();
//! let transport = Arc::new(HttpTransport::new(config.proxy.clone())?);
//! let manager = SessionManager::from_config(transport, &config);
//!
//! manager
//!     .ensure(EnsureConsumer::new("viewer", "orders").with_format(MessageFormat::Binary))
//!     .await?;
//! let appended = manager.fetch("orders").await?;
//! println!("{} new records", appended);
//!
//! manager.revoke("orders").await?;
//! # Ok(())
//! # }
//! ```

pub mod buffer;
pub mod codec;
pub mod config;
pub mod error;
pub mod record;
pub mod registry;
pub mod session;
pub mod transport;

// Re-export main types
pub use buffer::MessageBuffer;
pub use codec::{decode, MessageFormat};
pub use config::{BufferConfig, Config, ProxyConfig, RECORD_MEDIA_TYPE_V1};
pub use error::{ConsumerError, Result};
pub use record::{MessageRecord, RawRecord};
pub use registry::{SessionDescriptor, SessionRegistry};
pub use session::{ConsumerState, EnsureConsumer, EnsureOutcome, SessionManager};
pub use transport::{CreateConsumerRequest, HttpTransport, MockTransport, ProxyCall, ProxyTransport};
