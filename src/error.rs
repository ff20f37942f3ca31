// Terminal failures of a download attempt, surfaced to the display as inline messages.

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DownloadError {
    /// DNS failure, refused connection, timeout, or a broken body stream.
    #[error("transport error: {0}")]
    Transport(String),

    /// The server answered with a status of 400 or above.
    #[error("HTTP {code} {reason}")]
    HttpStatus { code: u16, reason: String },
}

impl DownloadError {
    pub fn status_code(&self) -> Option<u16> {
        match self {
            DownloadError::HttpStatus { code, .. } => Some(*code),
            DownloadError::Transport(_) => None,
        }
    }
}

impl From<reqwest::Error> for DownloadError {
    fn from(e: reqwest::Error) -> Self {
        DownloadError::Transport(e.to_string())
    }
}
