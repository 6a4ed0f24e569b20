//! Redis client with connection retry and retrying command execution
//!
//! Wraps a multiplexed connection; every command is retried with exponential
//! backoff when the failure is transient (I/O, loading, TRYAGAIN).

use pp_shared::CacheConfig;
use redis::{aio::MultiplexedConnection, AsyncCommands, Client, RedisError, RedisResult, Script};
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use crate::InfrastructureError;

/// Upper bound for the backoff between retries
const MAX_RETRY_DELAY_MS: u64 = 5000;

type RedisFuture<T> = Pin<Box<dyn Future<Output = RedisResult<T>> + Send>>;

/// Redis client shared by the challenge store
#[derive(Clone)]
pub struct RedisClient {
    /// Redis multiplexed connection for async operations
    connection: MultiplexedConnection,
    /// Configuration used to create this client
    config: CacheConfig,
}

impl RedisClient {
    /// Connect using the retry policy from `config`
    ///
    /// # Example
    /// ```no_run
    /// use pp_infra::cache::RedisClient;
    /// use pp_shared::CacheConfig;
    ///
    /// async fn connect() -> Result<RedisClient, Box<dyn std::error::Error>> {
    ///     Ok(RedisClient::new(CacheConfig::new("redis://localhost:6379")).await?)
    /// }
    /// ```
    pub async fn new(config: CacheConfig) -> Result<Self, InfrastructureError> {
        info!(url = %mask_url(&config.url), "Creating Redis client");

        let client = Client::open(config.url.as_str()).map_err(|e| {
            error!(error = %e, "Failed to parse Redis URL");
            InfrastructureError::Config(format!("Invalid Redis URL: {}", e))
        })?;

        let connection =
            Self::create_connection_with_retry(client, config.max_retries, config.retry_delay_ms)
                .await?;

        info!("Redis client created successfully");

        Ok(Self { connection, config })
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Create multiplexed connection with retry logic
    async fn create_connection_with_retry(
        client: Client,
        max_retries: u32,
        retry_delay_ms: u64,
    ) -> Result<MultiplexedConnection, InfrastructureError> {
        let mut attempts = 0;
        let mut delay = retry_delay_ms;

        loop {
            attempts += 1;
            debug!(attempt = attempts, "Attempting to connect to Redis");

            match client.get_multiplexed_async_connection().await {
                Ok(connection) => return Ok(connection),
                Err(e) if attempts < max_retries => {
                    warn!(
                        attempt = attempts,
                        max_retries = max_retries,
                        error = %e,
                        retry_in_ms = delay,
                        "Failed to connect to Redis, retrying"
                    );
                    sleep(Duration::from_millis(delay)).await;
                    delay = next_delay(delay);
                }
                Err(e) => {
                    error!(attempts = attempts, error = %e, "Failed to connect to Redis");
                    return Err(InfrastructureError::Cache(e));
                }
            }
        }
    }

    /// Get a value
    pub async fn get(&self, key: &str) -> Result<Option<String>, InfrastructureError> {
        let key = key.to_string();
        let value = self
            .execute_with_retry(move |mut conn| {
                let key = key.clone();
                Box::pin(async move { conn.get::<_, Option<String>>(key).await })
            })
            .await?;
        Ok(value)
    }

    /// Set a value that Redis expires after `ttl_ms` milliseconds
    pub async fn set_with_expiry_ms(
        &self,
        key: &str,
        value: &str,
        ttl_ms: u64,
    ) -> Result<(), InfrastructureError> {
        let key = key.to_string();
        let value = value.to_string();
        let ttl_ms = ttl_ms.max(1);

        self.execute_with_retry(move |mut conn| {
            let key = key.clone();
            let value = value.clone();
            Box::pin(async move {
                redis::cmd("SET")
                    .arg(key)
                    .arg(value)
                    .arg("PX")
                    .arg(ttl_ms)
                    .query_async::<_, ()>(&mut conn)
                    .await
            })
        })
        .await?;
        Ok(())
    }

    /// Delete a key, returning how many keys were removed
    pub async fn delete(&self, key: &str) -> Result<u64, InfrastructureError> {
        let key = key.to_string();
        let deleted = self
            .execute_with_retry(move |mut conn| {
                let key = key.clone();
                Box::pin(async move { conn.del::<_, u64>(key).await })
            })
            .await?;
        Ok(deleted)
    }

    /// Run a Lua script against one key
    pub async fn eval_script(
        &self,
        script: &Script,
        key: &str,
        args: &[String],
    ) -> Result<i64, InfrastructureError> {
        let script = script.clone();
        let key = key.to_string();
        let args = args.to_vec();

        let result = self
            .execute_with_retry(move |mut conn| {
                let script = script.clone();
                let key = key.clone();
                let args = args.clone();
                Box::pin(async move {
                    let mut invocation = script.key(key);
                    for arg in &args {
                        invocation.arg(arg);
                    }
                    invocation.invoke_async::<_, i64>(&mut conn).await
                })
            })
            .await?;
        Ok(result)
    }

    /// Check if the Redis connection is healthy
    pub async fn health_check(&self) -> Result<bool, InfrastructureError> {
        let response = self
            .execute_with_retry(|mut conn| {
                Box::pin(async move { redis::cmd("PING").query_async::<_, String>(&mut conn).await })
            })
            .await?;

        if response == "PONG" {
            Ok(true)
        } else {
            warn!(response = %response, "Redis health check returned unexpected response");
            Ok(false)
        }
    }

    /// Execute a Redis operation with automatic retry logic
    async fn execute_with_retry<F, T>(&self, operation: F) -> RedisResult<T>
    where
        F: Fn(MultiplexedConnection) -> RedisFuture<T>,
    {
        let mut attempts = 0;
        let mut delay = self.config.retry_delay_ms;

        loop {
            attempts += 1;

            match operation(self.connection.clone()).await {
                Ok(result) => return Ok(result),
                Err(e) if attempts < self.config.max_retries && is_retriable_error(&e) => {
                    warn!(
                        attempt = attempts,
                        max_retries = self.config.max_retries,
                        error = %e,
                        retry_in_ms = delay,
                        "Redis operation failed, retrying"
                    );
                    sleep(Duration::from_millis(delay)).await;
                    delay = next_delay(delay);
                }
                Err(e) => {
                    error!(attempts = attempts, error = %e, "Redis operation failed");
                    return Err(e);
                }
            }
        }
    }
}

/// Exponential backoff capped at five seconds
pub(crate) fn next_delay(delay_ms: u64) -> u64 {
    (delay_ms.max(1) * 2).min(MAX_RETRY_DELAY_MS)
}

pub(crate) fn is_retriable_error(error: &RedisError) -> bool {
    matches!(
        error.kind(),
        redis::ErrorKind::IoError
            | redis::ErrorKind::BusyLoadingError
            | redis::ErrorKind::TryAgain
    )
}

/// Mask credentials in a Redis URL for logging
pub(crate) fn mask_url(url: &str) -> String {
    if let (Some(at_pos), Some(proto_end)) = (url.find('@'), url.find("://")) {
        if at_pos > proto_end {
            return format!("{}****{}", &url[..proto_end + 3], &url[at_pos..]);
        }
    }
    url.to_string()
}
