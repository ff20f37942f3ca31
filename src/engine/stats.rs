// Transfer statistics: bytes received per run and overall, and throughput.

use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::time::{Duration, Instant};

use parking_lot::Mutex;

#[derive(Debug, Clone)]
pub struct StatsSnapshot {
    /// Bytes received by the current or most recent run.
    pub run_bytes: u64,
    /// Bytes received across all runs, including ones later discarded.
    pub total_bytes: u64,
    /// Chunks forwarded to the display across all runs. Pieces that decoded
    /// to no text are not counted.
    pub chunks: u64,
    /// Average rate of the current or most recent run. Frozen once that run ends.
    pub run_bps: u64,
    pub runs_started: u32,
    pub resume_fallbacks: u32,
}

/// Timing of the current or most recent run.
struct RunClock {
    id: u64,
    started_at: Instant,
    ended_at: Option<Instant>,
}

impl RunClock {
    fn elapsed(&self) -> Duration {
        match self.ended_at {
            Some(end) => end.duration_since(self.started_at),
            None => self.started_at.elapsed(),
        }
    }
}

pub struct StatsCollector {
    total_bytes: AtomicU64,
    run_bytes: AtomicU64,
    chunks: AtomicU64,
    runs_started: AtomicU32,
    resume_fallbacks: AtomicU32,
    run_clock: Mutex<Option<RunClock>>,
}

impl StatsCollector {
    pub fn new() -> Self {
        Self {
            total_bytes: AtomicU64::new(0),
            run_bytes: AtomicU64::new(0),
            chunks: AtomicU64::new(0),
            runs_started: AtomicU32::new(0),
            resume_fallbacks: AtomicU32::new(0),
            run_clock: Mutex::new(None),
        }
    }

    pub fn record_run_start(&self, run_id: u64) {
        self.runs_started.fetch_add(1, Ordering::Relaxed);
        self.run_bytes.store(0, Ordering::Relaxed);
        *self.run_clock.lock() = Some(RunClock {
            id: run_id,
            started_at: Instant::now(),
            ended_at: None,
        });
    }

    /// Stop the clock of `run_id`. Ignored if a newer run has started since.
    pub fn record_run_end(&self, run_id: u64) {
        if let Some(clock) = self.run_clock.lock().as_mut() {
            if clock.id == run_id && clock.ended_at.is_none() {
                clock.ended_at = Some(Instant::now());
            }
        }
    }

    pub fn record_bytes(&self, bytes: u64) {
        self.total_bytes.fetch_add(bytes, Ordering::Relaxed);
        self.run_bytes.fetch_add(bytes, Ordering::Relaxed);
    }

    pub fn record_chunk_forwarded(&self) {
        self.chunks.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_resume_fallback(&self) {
        self.resume_fallbacks.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        let run_bytes = self.run_bytes.load(Ordering::Relaxed);
        let run_bps = match self.run_clock.lock().as_ref() {
            Some(clock) => {
                let elapsed = clock.elapsed().as_secs_f64();
                if elapsed > 0.1 {
                    (run_bytes as f64 / elapsed) as u64
                } else {
                    0
                }
            }
            None => 0,
        };

        StatsSnapshot {
            run_bytes,
            total_bytes: self.total_bytes.load(Ordering::Relaxed),
            chunks: self.chunks.load(Ordering::Relaxed),
            run_bps,
            runs_started: self.runs_started.load(Ordering::Relaxed),
            resume_fallbacks: self.resume_fallbacks.load(Ordering::Relaxed),
        }
    }
}

impl Default for StatsCollector {
    fn default() -> Self {
        Self::new()
    }
}
