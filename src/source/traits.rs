use std::pin::Pin;

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::Stream;

use crate::error::DownloadError;

pub type BodyStream = Pin<Box<dyn Stream<Item = Result<Bytes, DownloadError>> + Send>>;

/// Status line and body of an opened request.
pub struct SourceResponse {
    pub status: u16,
    pub reason: String,
    pub body: BodyStream,
}

impl SourceResponse {
    /// 206: the server honored the range request.
    pub fn is_partial(&self) -> bool {
        self.status == 206
    }
}

#[async_trait]
pub trait TextSource: Send + Sync {
    /// Open a streaming GET for `url`, asking for bytes from `offset` onwards
    /// when `offset > 0`. The status is returned as-is; classifying it is the
    /// caller's job.
    async fn open(&self, url: &str, offset: u64) -> Result<SourceResponse, DownloadError>;
}
