// Download controller: one cancellable, resumable streaming loop per session.

use std::sync::Arc;
use std::time::Duration;

use futures_util::StreamExt;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::events::DownloadEvent;
use super::session::{DownloadSession, RunHandle};
use super::stats::{StatsCollector, StatsSnapshot};
use crate::config::ViewerConfig;
use crate::error::DownloadError;
use crate::source::traits::TextSource;

pub struct DownloadController {
    worker: Worker,
}

/// Everything a spawned run needs, cloned into the task.
#[derive(Clone)]
struct Worker {
    source: Arc<dyn TextSource>,
    session: Arc<DownloadSession>,
    stats: Arc<StatsCollector>,
    events: mpsc::UnboundedSender<DownloadEvent>,
    config: ViewerConfig,
}

impl DownloadController {
    /// Create a controller and the receiving end of its event channel.
    pub fn new(
        source: Arc<dyn TextSource>,
        config: ViewerConfig,
    ) -> (Self, mpsc::UnboundedReceiver<DownloadEvent>) {
        let (events, rx) = mpsc::unbounded_channel();
        let session = Arc::new(DownloadSession::new(config.decode_policy));
        let worker = Worker {
            source,
            session,
            stats: Arc::new(StatsCollector::new()),
            events,
            config,
        };
        (Self { worker }, rx)
    }

    /// Start streaming `url` on a background task, resuming from whatever the
    /// session already holds.
    ///
    /// Returns `None` without doing anything if a download is already active.
    /// Must be called from within a tokio runtime.
    pub fn start(&self, url: &str) -> Option<JoinHandle<()>> {
        let Some(handle) = self.worker.session.try_begin() else {
            debug!("start ignored: download already active");
            return None;
        };
        self.worker.stats.record_run_start(handle.id);

        let worker = self.worker.clone();
        let url = url.to_string();
        Some(tokio::spawn(async move {
            worker.run(handle, url).await;
        }))
    }

    /// Ask the active download to stop at the next chunk boundary.
    ///
    /// Does not wait for the loop to exit. Calling it while nothing is active
    /// is a no-op.
    pub fn stop(&self) {
        if self.worker.session.cancel() {
            info!(
                "download stopped at byte {}",
                self.worker.session.received_bytes()
            );
        }
    }

    pub fn is_active(&self) -> bool {
        self.worker.session.is_active()
    }

    pub fn session(&self) -> &Arc<DownloadSession> {
        &self.worker.session
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        self.worker.stats.snapshot()
    }
}

impl Worker {
    async fn run(self, handle: RunHandle, url: String) {
        let result = self.stream(&handle, &url).await;

        // Hold the content lock so a run started right after release cannot
        // interleave its events ahead of this run's terminal event.
        let mut content = self.session.content();
        self.session.finish(&handle);
        self.stats.record_run_end(handle.id);
        if handle.token.is_cancelled() {
            debug!(
                "run {} ended after stop, {} bytes held",
                handle.id,
                content.resume_offset()
            );
            return;
        }

        match result {
            Ok(()) => {
                let tail = content.decoder.finish();
                if !tail.is_empty() {
                    content.text.push_str(&tail);
                    self.emit(DownloadEvent::Chunk(tail));
                }
                let total_bytes = content.resume_offset();
                info!("download of {} complete: {} bytes", url, total_bytes);
                self.emit(DownloadEvent::Complete { total_bytes });
            }
            Err(e) => {
                warn!(
                    "download of {} failed after {} bytes: {}",
                    url,
                    content.resume_offset(),
                    e
                );
                self.emit(DownloadEvent::Failed(e));
            }
        }
    }

    /// Stream the body into the session. Returns `Ok` on exhaustion or
    /// cancellation; the caller tells the two apart by the token.
    async fn stream(&self, handle: &RunHandle, url: &str) -> Result<(), DownloadError> {
        let offset = {
            let mut content = self.session.content();
            if handle.token.is_cancelled() {
                return Ok(());
            }
            if content.url.as_deref() != Some(url) {
                if content.resume_offset() > 0 || !content.text.is_empty() {
                    info!(
                        "source changed to {}, discarding {} bytes",
                        url,
                        content.resume_offset()
                    );
                    content.reset();
                    self.emit(DownloadEvent::Cleared);
                }
                content.url = Some(url.to_string());
            }
            content.resume_offset()
        };

        if offset > 0 {
            info!("resuming {} from byte {}", url, offset);
        } else {
            info!("starting download of {}", url);
        }

        let response = self.source.open(url, offset).await?;
        if response.status >= 400 {
            return Err(DownloadError::HttpStatus {
                code: response.status,
                reason: response.reason,
            });
        }

        if offset > 0 && !response.is_partial() {
            let mut content = self.session.content();
            if handle.token.is_cancelled() {
                return Ok(());
            }
            warn!(
                "server answered range request from byte {} with status {}, restarting",
                offset, response.status
            );
            content.reset();
            self.stats.record_resume_fallback();
            self.emit(DownloadEvent::Cleared);
            self.emit(DownloadEvent::ResumeUnsupported { offset });
        }

        let chunk_size = self.config.chunk_size.max(1);
        let mut body = response.body;
        while let Some(next) = body.next().await {
            let bytes = next?;
            for piece in bytes.chunks(chunk_size) {
                {
                    let mut content = self.session.content();
                    if handle.token.is_cancelled() {
                        debug!("run {} dropping {} bytes after stop", handle.id, piece.len());
                        return Ok(());
                    }
                    content.bytes.extend_from_slice(piece);
                    let text = content.decoder.decode(piece);
                    content.text.push_str(&text);
                    self.stats.record_bytes(piece.len() as u64);
                    if !text.is_empty() {
                        self.stats.record_chunk_forwarded();
                        self.emit(DownloadEvent::Chunk(text));
                    }
                }
                pace(self.config.pace_delay()).await;
            }
        }

        Ok(())
    }

    fn emit(&self, event: DownloadEvent) {
        if self.events.send(event).is_err() {
            debug!("event receiver dropped");
        }
    }
}

/// Give the display a chance to render between chunks.
async fn pace(delay: Duration) {
    if delay.is_zero() {
        tokio::task::yield_now().await;
    } else {
        tokio::time::sleep(delay).await;
    }
}
