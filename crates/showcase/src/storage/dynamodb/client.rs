//! Shared DynamoDB client lifecycle.

use aws_sdk_dynamodb::Client;
use tokio::sync::Mutex;

/// Create-once-reuse factory for the DynamoDB client.
///
/// The SDK client holds a connection pool, so a process wants exactly one
/// instance created on first use and cloned out to every adapter (clones
/// share the pool). The factory is an explicit dependency rather than a
/// module-level global so tests can construct independent instances;
/// `reset` drops the cached client to avoid state leakage between test
/// cases.
#[derive(Debug, Default)]
pub struct ClientFactory {
    cached: Mutex<Option<Client>>,
}

impl ClientFactory {
    pub fn new() -> Self {
        Self {
            cached: Mutex::new(None),
        }
    }

    /// Returns the shared client, creating it on first use from the AWS SDK
    /// default credential chain.
    pub async fn client(&self) -> Client {
        let mut cached = self.cached.lock().await;
        if let Some(client) = cached.as_ref() {
            return client.clone();
        }
        tracing::debug!("initializing shared DynamoDB client");
        let config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        let client = Client::new(&config);
        *cached = Some(client.clone());
        client
    }

    /// Drops the cached client; the next `client` call re-creates it.
    pub async fn reset(&self) {
        *self.cached.lock().await = None;
    }
}
