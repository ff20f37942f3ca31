use std::time::Duration;

use serde::Deserialize;

use crate::engine::decode::DecodePolicy;

/// URL offered to the user when nothing else has been entered.
pub const DEFAULT_URL: &str = "https://www.gutenberg.org/files/1342/1342-0.txt";

/// Largest piece of the response body handed to the sink at once (1 KB).
pub const DEFAULT_CHUNK_SIZE: usize = 1024;

/// Pause after each forwarded chunk so the display can render.
pub const DEFAULT_PACE_DELAY_MS: u64 = 10;

/// Connect timeout for the HTTP client.
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 15;

/// Per-read timeout for the HTTP client.
pub const DEFAULT_READ_TIMEOUT_SECS: u64 = 30;

/// Inline message appended when a stream runs to the end.
pub const COMPLETE_MESSAGE: &str = "\n\nDownload Complete.";

/// Inline message appended when a range request was answered with the full body.
pub const RESUME_UNSUPPORTED_MESSAGE: &str =
    "\n\nWarning: Server did not support resume, downloading from start again.";

/// Top-level configuration for the viewer engine.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Maximum size of each chunk forwarded to the sink, in bytes.
    pub chunk_size: usize,
    /// Delay after each forwarded chunk, in milliseconds. Zero still yields.
    pub pace_delay_ms: u64,
    pub connect_timeout_secs: u64,
    pub read_timeout_secs: u64,
    /// How bytes that are not valid UTF-8 are rendered.
    pub decode_policy: DecodePolicy,
}

impl ViewerConfig {
    pub fn pace_delay(&self) -> Duration {
        Duration::from_millis(self.pace_delay_ms)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_secs(self.read_timeout_secs)
    }
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            pace_delay_ms: DEFAULT_PACE_DELAY_MS,
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            read_timeout_secs: DEFAULT_READ_TIMEOUT_SECS,
            decode_policy: DecodePolicy::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = ViewerConfig::default();
        assert_eq!(config.chunk_size, 1024);
        assert_eq!(config.pace_delay(), Duration::from_millis(10));
        assert_eq!(config.decode_policy, DecodePolicy::Replace);
    }

    #[test]
    fn test_config_partial_deserialize() {
        let config: ViewerConfig =
            serde_json::from_str(r#"{ "chunk_size": 4096, "decode_policy": "skip" }"#).unwrap();
        assert_eq!(config.chunk_size, 4096);
        assert_eq!(config.decode_policy, DecodePolicy::Skip);
        assert_eq!(config.pace_delay_ms, DEFAULT_PACE_DELAY_MS);
    }
}
