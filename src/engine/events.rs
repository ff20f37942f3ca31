// Typed messages from the download worker to the UI context.

use crate::config::{COMPLETE_MESSAGE, RESUME_UNSUPPORTED_MESSAGE};
use crate::error::DownloadError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadEvent {
    /// Decoded text to append, in transport order.
    Chunk(String),
    /// Everything displayed so far must be discarded.
    Cleared,
    /// The server ignored the range request; the download restarts from zero.
    ResumeUnsupported { offset: u64 },
    /// The stream ran to the end. `total_bytes` counts every byte of the session.
    Complete { total_bytes: u64 },
    /// The attempt ended early; partial content is kept.
    Failed(DownloadError),
}

impl DownloadEvent {
    /// True for events after which the run sends nothing more.
    pub fn is_terminal(&self) -> bool {
        matches!(self, DownloadEvent::Complete { .. } | DownloadEvent::Failed(_))
    }

    /// The user-visible status line for this event, if it has one.
    pub fn message(&self) -> Option<String> {
        match self {
            DownloadEvent::Chunk(_) | DownloadEvent::Cleared => None,
            DownloadEvent::ResumeUnsupported { .. } => Some(RESUME_UNSUPPORTED_MESSAGE.to_string()),
            DownloadEvent::Complete { .. } => Some(COMPLETE_MESSAGE.to_string()),
            DownloadEvent::Failed(e) => Some(format!("\n\nError during download: {}", e)),
        }
    }
}
