//! Cache configuration.
//!
//! Resolved from the `[cache]` table of `deptportal.toml`,
//! `DEPTPORTAL__CACHE__*` or CLI overrides by the config layer.

use std::time::Duration;

const DEFAULT_KEEP_UNUSED_FOR_SECS: u64 = 60;
const DEFAULT_QUERY_RETRIES: u32 = 0;
const DEFAULT_RETRY_BASE_DELAY_MS: u64 = 250;
const MAX_QUERY_RETRIES: u32 = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// Grace period before an entry without subscribers is evicted.
    pub keep_unused_for_secs: u64,
    /// Extra attempts for GET queries after a network error or 5xx.
    pub query_retries: u32,
    /// Delay before the first retry; doubles on each attempt.
    pub retry_base_delay_ms: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            keep_unused_for_secs: DEFAULT_KEEP_UNUSED_FOR_SECS,
            query_retries: DEFAULT_QUERY_RETRIES,
            retry_base_delay_ms: DEFAULT_RETRY_BASE_DELAY_MS,
        }
    }
}

impl CacheConfig {
    pub fn keep_unused_for(&self) -> Duration {
        Duration::from_secs(self.keep_unused_for_secs)
    }

    /// Retry count clamped to a sane ceiling.
    pub fn effective_retries(&self) -> u32 {
        self.query_retries.min(MAX_QUERY_RETRIES)
    }

    /// Backoff before retry number `attempt` (zero-based).
    pub fn retry_delay(&self, attempt: u32) -> Duration {
        let factor = 1u64 << attempt.min(16);
        Duration::from_millis(self.retry_base_delay_ms.saturating_mul(factor))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_values() {
        let config = CacheConfig::default();
        assert_eq!(config.keep_unused_for(), Duration::from_secs(60));
        assert_eq!(config.query_retries, 0);
        assert_eq!(config.retry_base_delay_ms, 250);
    }

    #[test]
    fn backoff_doubles() {
        let config = CacheConfig {
            retry_base_delay_ms: 100,
            ..Default::default()
        };
        assert_eq!(config.retry_delay(0), Duration::from_millis(100));
        assert_eq!(config.retry_delay(1), Duration::from_millis(200));
        assert_eq!(config.retry_delay(3), Duration::from_millis(800));
    }

    #[test]
    fn retries_are_clamped() {
        let config = CacheConfig {
            query_retries: 1000,
            ..Default::default()
        };
        assert_eq!(config.effective_retries(), MAX_QUERY_RETRIES);
    }
}
