// Download session state: accumulated content, the resume offset, and run ownership.

use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::{Mutex, MutexGuard};
use tokio_util::sync::CancellationToken;

use super::decode::{DecodePolicy, StreamDecoder};

/// Content received so far. Only the run that owns the session writes here.
pub(crate) struct SessionContent {
    /// Raw bytes received; their length is the next resume offset.
    pub(crate) bytes: Vec<u8>,
    /// Decoded text forwarded to the display.
    pub(crate) text: String,
    pub(crate) decoder: StreamDecoder,
    pub(crate) url: Option<String>,
}

impl SessionContent {
    pub(crate) fn resume_offset(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// Drop everything received; the decoder keeps its policy.
    pub(crate) fn reset(&mut self) {
        self.bytes.clear();
        self.text.clear();
        self.decoder.reset();
    }
}

struct ActiveRun {
    id: u64,
    token: CancellationToken,
}

/// Handle held by a running download loop.
#[derive(Clone)]
pub(crate) struct RunHandle {
    pub(crate) id: u64,
    pub(crate) token: CancellationToken,
}

pub struct DownloadSession {
    content: Mutex<SessionContent>,
    run: Mutex<Option<ActiveRun>>,
    next_run_id: AtomicU64,
}

impl DownloadSession {
    pub fn new(policy: DecodePolicy) -> Self {
        Self {
            content: Mutex::new(SessionContent {
                bytes: Vec::new(),
                text: String::new(),
                decoder: StreamDecoder::new(policy),
                url: None,
            }),
            run: Mutex::new(None),
            next_run_id: AtomicU64::new(1),
        }
    }

    /// True while a loop holds the session.
    pub fn is_active(&self) -> bool {
        self.run.lock().is_some()
    }

    /// Decoded text accumulated so far.
    pub fn text(&self) -> String {
        self.content.lock().text.clone()
    }

    /// Number of raw bytes received; the offset the next resume asks for.
    pub fn received_bytes(&self) -> u64 {
        self.content.lock().resume_offset()
    }

    /// URL of the current session, once one has been started.
    pub fn source_url(&self) -> Option<String> {
        self.content.lock().url.clone()
    }

    pub(crate) fn content(&self) -> MutexGuard<'_, SessionContent> {
        self.content.lock()
    }

    /// Claim the session for a new run. Returns `None` if one is already active.
    pub(crate) fn try_begin(&self) -> Option<RunHandle> {
        let mut run = self.run.lock();
        if run.is_some() {
            return None;
        }
        let id = self.next_run_id.fetch_add(1, Ordering::Relaxed);
        let token = CancellationToken::new();
        *run = Some(ActiveRun {
            id,
            token: token.clone(),
        });
        Some(RunHandle { id, token })
    }

    /// Cancel the current run, if any. Calling it again is a no-op.
    pub(crate) fn cancel(&self) -> bool {
        match self.run.lock().take() {
            Some(active) => {
                active.token.cancel();
                true
            }
            None => false,
        }
    }

    /// Release the session at loop exit, unless a newer run already owns it.
    pub(crate) fn finish(&self, handle: &RunHandle) -> bool {
        let mut run = self.run.lock();
        match run.as_ref() {
            Some(active) if active.id == handle.id => {
                *run = None;
                true
            }
            _ => false,
        }
    }
}

impl Default for DownloadSession {
    fn default() -> Self {
        Self::new(DecodePolicy::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_active_run() {
        let session = DownloadSession::default();
        assert!(!session.is_active());

        let first = session.try_begin().unwrap();
        assert!(session.is_active());
        assert!(session.try_begin().is_none());

        assert!(session.finish(&first));
        assert!(!session.is_active());
    }

    #[test]
    fn test_cancel_is_idempotent() {
        let session = DownloadSession::default();
        let run = session.try_begin().unwrap();

        assert!(session.cancel());
        assert!(run.token.is_cancelled());
        assert!(!session.is_active());

        assert!(!session.cancel());
        assert!(!session.is_active());
    }

    #[test]
    fn test_stale_run_does_not_release_newer_run() {
        let session = DownloadSession::default();
        let stale = session.try_begin().unwrap();
        session.cancel();

        let fresh = session.try_begin().unwrap();
        assert_ne!(stale.id, fresh.id);

        assert!(!session.finish(&stale));
        assert!(session.is_active());
        assert!(!fresh.token.is_cancelled());
    }
}
