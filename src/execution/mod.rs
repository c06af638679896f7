//! Event loop driving an [`Analysis`] over a [`RecordSource`].
//!
//! This module sits "above" [`crate::analysis`] and provides:
//!
//! - Record limits and periodic progress reporting
//! - Real-time metrics + observer hooks for monitoring

mod observer;

use std::sync::Arc;
use std::time::Instant;

use crate::analysis::Analysis;
use crate::error::AnalysisResult;
use crate::source::RecordSource;

pub use observer::{
    ExecutionEvent, ExecutionMetrics, ExecutionMetricsSnapshot, ExecutionObserver, StdErrExecutionObserver,
};

/// Configuration for the [`ExecutionEngine`].
#[derive(Debug, Clone)]
pub struct ExecutionOptions {
    /// Stop after this many records. `None` exhausts the source.
    pub max_records: Option<u64>,
    /// Emit [`ExecutionEvent::Progress`] every this many records. `None` disables it.
    pub progress_interval: Option<u64>,
}

impl Default for ExecutionOptions {
    fn default() -> Self {
        Self {
            max_records: None,
            progress_interval: Some(100_000),
        }
    }
}

/// Runs the per-record program one record at a time.
pub struct ExecutionEngine {
    opts: ExecutionOptions,
    observer: Option<Arc<dyn ExecutionObserver>>,
    metrics: Arc<ExecutionMetrics>,
}

impl ExecutionEngine {
    pub fn new(opts: ExecutionOptions) -> Self {
        Self {
            opts,
            observer: None,
            metrics: Arc::new(ExecutionMetrics::new()),
        }
    }

    /// Attach an observer for execution events (metrics/logging).
    pub fn with_observer(mut self, observer: Arc<dyn ExecutionObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Get a handle to real-time execution metrics.
    pub fn metrics(&self) -> Arc<ExecutionMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Bind `source` to the analysis store and process records until it is exhausted or
    /// `max_records` is reached.
    ///
    /// On the first error a [`ExecutionEvent::RunAborted`] is emitted and the error returned;
    /// accumulators keep what was filled by the records before it.
    pub fn run(&self, analysis: &mut Analysis, source: &mut dyn RecordSource) -> AnalysisResult<ExecutionMetricsSnapshot> {
        let start = Instant::now();
        let cuts = analysis.selector().len();
        self.metrics.begin_run(cuts);
        self.emit(ExecutionEvent::RunStarted { cuts });

        if let Err(e) = self.run_impl(analysis, source) {
            self.metrics.end_run(start.elapsed());
            self.emit(ExecutionEvent::RunAborted {
                record: self.metrics.snapshot().records_processed + 1,
                message: e.to_string(),
            });
            return Err(e);
        }

        self.metrics.end_run(start.elapsed());
        let snapshot = self.metrics.snapshot();
        self.emit(ExecutionEvent::RunFinished {
            elapsed: start.elapsed(),
            metrics: snapshot.clone(),
        });
        Ok(snapshot)
    }

    fn run_impl(&self, analysis: &mut Analysis, source: &mut dyn RecordSource) -> AnalysisResult<()> {
        source.bind(analysis.store())?;

        let mut records = 0u64;
        while self.opts.max_records.is_none_or(|max| records < max) {
            if !source.next_record(analysis.store_mut())? {
                break;
            }
            let mask = analysis.process_record()?;
            records += 1;
            self.metrics.on_record_processed(mask.bits());

            if self.opts.progress_interval.is_some_and(|every| every > 0 && records % every == 0) {
                self.emit(ExecutionEvent::Progress { records });
            }
        }
        Ok(())
    }

    fn emit(&self, event: ExecutionEvent) {
        if let Some(obs) = &self.observer {
            obs.on_event(&event);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::{ExecutionEngine, ExecutionOptions};
    use crate::accumulate::Plotter;
    use crate::analysis::Analysis;
    use crate::error::AnalysisError;
    use crate::execution::{ExecutionEvent, ExecutionObserver};
    use crate::processing::{ComputationStep, Pipeline};
    use crate::selection::{Cut, CutTest, EqualityCut, EqualityMode, EqualityOperands, Selector};
    use crate::source::MemorySource;
    use crate::store::ValueStore;
    use crate::types::Value;

    /// `Run == 2` cut over a single raw `Run` field.
    fn analysis() -> Analysis {
        let mut store = ValueStore::new();
        let run = store.insert::<i32>("Run").unwrap();
        let run_f = store.insert::<f64>("RunF").unwrap();
        let two = store.alloc(2);
        let mut pipeline = Pipeline::new();
        pipeline.push(ComputationStep::IntegerToFloat { input: run, out: run_f });
        let mut selector = Selector::new();
        let test = CutTest::Equality(EqualityCut {
            operands: EqualityOperands::Int32(run, two),
            mode: EqualityMode::Equal,
        });
        selector.push(Cut::new(&mut store, "run2", "run two", "R", test)).unwrap();
        Analysis::new(store, pipeline, selector, Plotter::new(), vec!["Run".into()])
    }

    fn runs(values: &[i32]) -> MemorySource {
        MemorySource::new(
            vec!["Run".into()],
            values.iter().map(|&v| vec![Value::Int32(v)]).collect(),
        )
    }

    #[derive(Default)]
    struct Recorder {
        events: Mutex<Vec<ExecutionEvent>>,
    }

    impl ExecutionObserver for Recorder {
        fn on_event(&self, event: &ExecutionEvent) {
            self.events.lock().unwrap().push(event.clone());
        }
    }

    #[test]
    fn counts_records_and_cut_passes() {
        let mut analysis = analysis();
        let engine = ExecutionEngine::new(ExecutionOptions::default());
        let snap = engine.run(&mut analysis, &mut runs(&[1, 2, 2, 3])).unwrap();
        assert_eq!(snap.records_processed, 4);
        assert_eq!(snap.cut_passes, vec![2]);
        assert!(snap.elapsed.is_some());
        assert_eq!(engine.metrics().snapshot(), snap);
    }

    #[test]
    fn max_records_and_progress_events() {
        let recorder = Arc::new(Recorder::default());
        let observer: Arc<dyn ExecutionObserver> = recorder.clone();
        let engine = ExecutionEngine::new(ExecutionOptions {
            max_records: Some(4),
            progress_interval: Some(2),
        })
        .with_observer(observer);

        let mut analysis = analysis();
        let mut source = runs(&[1, 2, 3, 4, 5, 6]);
        let snap = engine.run(&mut analysis, &mut source).unwrap();
        assert_eq!(snap.records_processed, 4);
        assert_eq!(source.remaining(), 2);

        let events = recorder.events.lock().unwrap();
        assert!(matches!(events[0], ExecutionEvent::RunStarted { cuts: 1 }));
        let progress: Vec<u64> = events
            .iter()
            .filter_map(|e| match e {
                ExecutionEvent::Progress { records } => Some(*records),
                _ => None,
            })
            .collect();
        assert_eq!(progress, vec![2, 4]);
        assert!(matches!(events.last(), Some(ExecutionEvent::RunFinished { .. })));
    }

    #[test]
    fn first_error_aborts_the_run() {
        let recorder = Arc::new(Recorder::default());
        let observer: Arc<dyn ExecutionObserver> = recorder.clone();
        let engine = ExecutionEngine::new(ExecutionOptions::default()).with_observer(observer);

        let mut analysis = analysis();
        let mut source = MemorySource::new(
            vec!["Run".into()],
            vec![vec![Value::Int32(2)], vec![Value::Float64(1.0)], vec![Value::Int32(2)]],
        );
        let err = engine.run(&mut analysis, &mut source).unwrap_err();
        assert!(matches!(err, AnalysisError::SchemaMismatch { .. }));
        assert_eq!(engine.metrics().snapshot().records_processed, 1);
        assert_eq!(source.remaining(), 1);

        let events = recorder.events.lock().unwrap();
        assert!(matches!(
            events.last(),
            Some(ExecutionEvent::RunAborted { record: 2, .. })
        ));
    }
}
