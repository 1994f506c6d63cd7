use std::{env, time::Duration};

/// Storage configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Backing table name (default: "showcase")
    pub table_name: String,
    /// Attempt budget for transient backend failures (default: 3)
    pub max_attempts: u32,
    /// Base delay for exponential backoff in milliseconds (default: 100)
    pub retry_base_ms: u64,
}

impl StorageConfig {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `DYNAMODB_TABLE_NAME` - Backing table name (default: "showcase")
    /// - `STORAGE_MAX_ATTEMPTS` - Retry attempt budget (default: 3)
    /// - `STORAGE_RETRY_BASE_MS` - Backoff base delay in ms (default: 100)
    pub fn from_env() -> Self {
        Self {
            table_name: env::var("DYNAMODB_TABLE_NAME")
                .unwrap_or_else(|_| "showcase".to_string()),
            max_attempts: env::var("STORAGE_MAX_ATTEMPTS")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|&n| n > 0)
                .unwrap_or(3),
            retry_base_ms: env::var("STORAGE_RETRY_BASE_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(100),
        }
    }

    /// Get the backoff base delay as a Duration.
    pub fn retry_base(&self) -> Duration {
        Duration::from_millis(self.retry_base_ms)
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_base_conversion() {
        let config = StorageConfig {
            table_name: "test".to_string(),
            max_attempts: 3,
            retry_base_ms: 250,
        };

        assert_eq!(config.retry_base(), Duration::from_millis(250));
    }

    #[test]
    fn test_default_values() {
        // Clear environment variables to test defaults
        env::remove_var("DYNAMODB_TABLE_NAME");
        env::remove_var("STORAGE_MAX_ATTEMPTS");
        env::remove_var("STORAGE_RETRY_BASE_MS");

        let config = StorageConfig::from_env();

        assert_eq!(config.table_name, "showcase");
        assert_eq!(config.max_attempts, 3);
        assert_eq!(config.retry_base_ms, 100);
    }
}
