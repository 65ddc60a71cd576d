use std::time::Duration;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct IntrospectionConfig {
    /// Per-attempt timeout of the introspection request, e.g. `10s` or `1m 30s`.
    #[serde(default = "default_timeout", with = "humantime_serde")]
    pub timeout: Duration,

    /// Retries for transient failures, with exponential backoff between attempts.
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,
}

fn default_timeout() -> Duration {
    Duration::from_secs(10)
}

fn default_retry_count() -> u32 {
    3
}

impl Default for IntrospectionConfig {
    fn default() -> Self {
        Self {
            timeout: default_timeout(),
            retry_count: default_retry_count(),
        }
    }
}
