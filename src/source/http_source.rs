use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::header::RANGE;
use reqwest::{Client, RequestBuilder};
use tracing::{debug, warn};

use super::traits::{SourceResponse, TextSource};
use crate::config::ViewerConfig;
use crate::error::DownloadError;

pub struct HttpSource {
    client: Client,
}

impl HttpSource {
    pub fn new(config: &ViewerConfig) -> Result<Self, DownloadError> {
        let client = Client::builder()
            .connect_timeout(config.connect_timeout())
            .read_timeout(config.read_timeout())
            .build()?;
        Ok(Self { client })
    }

    /// Build a GET request with an open-ended Range header when resuming.
    fn build_request(&self, url: &str, offset: u64) -> RequestBuilder {
        let req = self.client.get(url);
        if offset > 0 {
            req.header(RANGE, range_header(offset))
        } else {
            req
        }
    }
}

/// `bytes=<offset>-`: everything from `offset` to the end of the resource.
pub fn range_header(offset: u64) -> String {
    format!("bytes={}-", offset)
}

#[async_trait]
impl TextSource for HttpSource {
    async fn open(&self, url: &str, offset: u64) -> Result<SourceResponse, DownloadError> {
        let resp = self.build_request(url, offset).send().await.map_err(|e| {
            warn!("http open failed url={} offset={}: {}", url, offset, e);
            DownloadError::from(e)
        })?;

        let status = resp.status();
        debug!(
            "http open status={} offset={} content_length={:?}",
            status.as_u16(),
            offset,
            resp.content_length()
        );

        let reason = status.canonical_reason().unwrap_or("").to_string();
        let body = resp.bytes_stream().map(|r| r.map_err(DownloadError::from));

        Ok(SourceResponse {
            status: status.as_u16(),
            reason,
            body: Box::pin(body),
        })
    }
}
