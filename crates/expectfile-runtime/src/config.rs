//! Runtime configuration.

use std::time::Duration;

use serde::{Deserialize, Deserializer};

/// Configuration for the async pipeline stage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RuntimeConfig {
    /// Upper bound on draining one streamed file. `None` waits forever: a
    /// content source that never completes stalls the run.
    #[serde(default, deserialize_with = "deserialize_duration")]
    pub drain_timeout: Option<Duration>,
}

impl RuntimeConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_drain_timeout(mut self, timeout: Duration) -> Self {
        self.drain_timeout = Some(timeout);
        self
    }

    /// Parse a human-readable timeout such as `"30s"` or `"2m 30s"`.
    pub fn with_drain_timeout_str(self, timeout: &str) -> Result<Self, humantime::DurationError> {
        let timeout = humantime::parse_duration(timeout)?;
        Ok(self.with_drain_timeout(timeout))
    }
}

fn deserialize_duration<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    raw.map(|s| humantime::parse_duration(&s).map_err(serde::de::Error::custom))
        .transpose()
}
