use std::fmt;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Execution events emitted by the engine.
#[derive(Debug, Clone)]
pub enum ExecutionEvent {
    RunStarted { cuts: usize },
    Progress { records: u64 },
    RunAborted { record: u64, message: String },
    RunFinished {
        elapsed: Duration,
        metrics: ExecutionMetricsSnapshot,
    },
}

/// Observer hook for execution events.
pub trait ExecutionObserver: Send + Sync {
    fn on_event(&self, event: &ExecutionEvent);
}

/// A simple stderr logger for execution events.
#[derive(Default)]
pub struct StdErrExecutionObserver;

impl ExecutionObserver for StdErrExecutionObserver {
    fn on_event(&self, event: &ExecutionEvent) {
        eprintln!("{event:?}");
    }
}

/// Real-time metrics for an event loop.
///
/// The engine updates these counters while it runs; callers can snapshot them at any time.
pub struct ExecutionMetrics {
    run_id: AtomicU64,
    started_at: Mutex<Option<Instant>>,
    elapsed_ns: AtomicU64,

    records_processed: AtomicU64,
    cut_passes: Mutex<Vec<u64>>,
}

impl ExecutionMetrics {
    pub fn new() -> Self {
        Self {
            run_id: AtomicU64::new(0),
            started_at: Mutex::new(None),
            elapsed_ns: AtomicU64::new(0),
            records_processed: AtomicU64::new(0),
            cut_passes: Mutex::new(Vec::new()),
        }
    }

    /// Reset every counter; `cuts` sizes the per-cut pass counters.
    pub fn begin_run(&self, cuts: usize) {
        let _ = self.run_id.fetch_add(1, Ordering::SeqCst);
        *self.started_at.lock().unwrap_or_else(|e| e.into_inner()) = Some(Instant::now());

        self.elapsed_ns.store(0, Ordering::SeqCst);
        self.records_processed.store(0, Ordering::SeqCst);
        *self.cut_passes.lock().unwrap_or_else(|e| e.into_inner()) = vec![0; cuts];
    }

    pub fn end_run(&self, elapsed: Duration) {
        self.elapsed_ns
            .store(elapsed.as_nanos().min(u64::MAX as u128) as u64, Ordering::SeqCst);
    }

    /// Count one processed record and the cuts whose bits are set in `mask`.
    pub fn on_record_processed(&self, mask: u64) {
        let _ = self.records_processed.fetch_add(1, Ordering::SeqCst);
        let mut passes = self.cut_passes.lock().unwrap_or_else(|e| e.into_inner());
        for (i, count) in passes.iter_mut().enumerate() {
            if mask & (1 << i) != 0 {
                *count += 1;
            }
        }
    }

    /// Time since the current run started.
    pub fn running_for(&self) -> Option<Duration> {
        self.started_at
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .map(|t| t.elapsed())
    }

    pub fn snapshot(&self) -> ExecutionMetricsSnapshot {
        let elapsed_ns = self.elapsed_ns.load(Ordering::SeqCst);
        let elapsed = if elapsed_ns > 0 {
            Some(Duration::from_nanos(elapsed_ns))
        } else {
            None
        };

        ExecutionMetricsSnapshot {
            run_id: self.run_id.load(Ordering::SeqCst),
            elapsed,
            records_processed: self.records_processed.load(Ordering::SeqCst),
            cut_passes: self.cut_passes.lock().unwrap_or_else(|e| e.into_inner()).clone(),
        }
    }
}

impl Default for ExecutionMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Immutable snapshot of [`ExecutionMetrics`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionMetricsSnapshot {
    pub run_id: u64,
    pub elapsed: Option<Duration>,
    pub records_processed: u64,
    /// Records that passed each cut, in declaration order.
    pub cut_passes: Vec<u64>,
}

impl fmt::Display for ExecutionMetricsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "run_id={}, records_processed={}, cut_passes={:?}, elapsed={:?}",
            self.run_id, self.records_processed, self.cut_passes, self.elapsed
        )
    }
}
