//! kafka-ui-tail: follow a topic through a Kafka REST proxy consumer session
//!
//! Creates (or reuses) a consumer session for one topic, polls it on an
//! interval and prints every new record as a JSON line on stdout. All
//! sessions are revoked on Ctrl-C.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use kafka_ui_sessions::{Config, EnsureConsumer, HttpTransport, MessageFormat, SessionManager};
use tracing::{error, info, warn};

#[derive(Parser)]
#[command(name = "kafka-ui-tail")]
#[command(about = "Tail a topic through a Kafka REST proxy consumer session")]
struct Cli {
    /// Topic to follow
    topic: String,

    /// Path to configuration file
    #[arg(short, long, default_value = "kafka-ui.toml")]
    config: String,

    /// REST proxy base URL (overrides config file)
    #[arg(long, env = "KAFKA_UI_PROXY_URL")]
    proxy_url: Option<String>,

    /// Consumer instance name
    #[arg(short, long, default_value = "kafka-ui-tail")]
    name: String,

    /// Record format: binary, json, avro
    #[arg(short, long, default_value = "binary")]
    format: MessageFormat,

    /// Consumer setting passed to the proxy, as key=value (repeatable)
    #[arg(short = 's', long = "setting", value_parser = parse_setting)]
    settings: Vec<(String, String)>,

    /// Poll interval in milliseconds
    #[arg(short, long, default_value_t = 1000)]
    interval_ms: u64,

    /// Fetch once and exit
    #[arg(long)]
    once: bool,
}

fn parse_setting(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .filter(|(k, _)| !k.is_empty())
        .ok_or_else(|| format!("expected key=value, got '{}'", raw))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr, records to stdout
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("kafka_ui_tail=info".parse()?)
                .add_directive("kafka_ui_sessions=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    let mut config = if Path::new(&cli.config).exists() {
        Config::load(&cli.config).with_context(|| format!("loading {}", cli.config))?
    } else {
        info!("Config file {} not found, using defaults", cli.config);
        Config::default()
    };

    if let Some(proxy_url) = cli.proxy_url {
        config.proxy.base_url = proxy_url;
    }

    info!("REST proxy: {}", config.proxy.base_url);

    let transport = Arc::new(HttpTransport::new(config.proxy.clone())?);
    let manager = SessionManager::from_config(transport, &config);
    info!("Consumer group: {}", manager.group());

    let mut request = EnsureConsumer::new(&cli.name, &cli.topic).with_format(cli.format.clone());
    for (key, value) in cli.settings {
        request = request.with_setting(key, value);
    }
    manager
        .ensure(request)
        .await
        .with_context(|| format!("creating consumer for {}", cli.topic))?;

    let result = if cli.once {
        poll(&manager, &cli.topic, 0).await.map(|_| ())
    } else {
        tokio::select! {
            result = follow(&manager, &cli.topic, Duration::from_millis(cli.interval_ms)) => result,
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted, shutting down");
                Ok(())
            }
        }
    };

    match manager.revoke_all().await {
        Ok(count) => info!("Revoked {} consumer session(s)", count),
        Err(e) => warn!("Failed to revoke consumer sessions: {}", e),
    }

    result
}

/// Poll until an error occurs
async fn follow(manager: &SessionManager, topic: &str, interval: Duration) -> anyhow::Result<()> {
    let mut ticker = tokio::time::interval(interval);
    let mut position = 0;

    loop {
        ticker.tick().await;
        match poll(manager, topic, position).await {
            Ok(next) => position = next,
            Err(e) => {
                error!("Fetch from {} failed: {}", topic, e);
                return Err(e);
            }
        }
    }
}

/// Fetch once and print records from `position` on; returns the next position
async fn poll(manager: &SessionManager, topic: &str, position: usize) -> anyhow::Result<usize> {
    manager.fetch(topic).await?;

    for record in manager.messages_since(topic, position).await {
        println!("{}", serde_json::to_string(record.as_ref())?);
    }

    Ok(manager.state().buffer().total_appended(topic).await)
}
