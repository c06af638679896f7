//! Running count/sum/min/max of one quantity.

use std::any::Any;

use super::Accumulator;

/// Built-in reductions a [`Summary`] keeps track of.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummaryOp {
    /// Number of filled values (including NaN).
    Count,
    /// Sum of non-NaN values.
    Sum,
    /// Minimum non-NaN value.
    Min,
    /// Maximum non-NaN value.
    Max,
}

/// One-dimensional accumulator that reduces instead of binning.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    name: String,
    title: String,
    count: u64,
    non_nan: u64,
    sum: f64,
    min: Option<f64>,
    max: Option<f64>,
}

impl Summary {
    pub fn new(name: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            title: title.into(),
            count: 0,
            non_nan: 0,
            sum: 0.0,
            min: None,
            max: None,
        }
    }

    /// Current value of `op`.
    ///
    /// - `Count` is always `Some`.
    /// - `Sum`/`Min`/`Max` are `None` until a non-NaN value was filled.
    pub fn get(&self, op: SummaryOp) -> Option<f64> {
        match op {
            SummaryOp::Count => Some(self.count as f64),
            SummaryOp::Sum => self.min.map(|_| self.sum),
            SummaryOp::Min => self.min,
            SummaryOp::Max => self.max,
        }
    }

    /// Mean of the non-NaN values.
    pub fn mean(&self) -> Option<f64> {
        let n = self.non_nan;
        if n == 0 { None } else { Some(self.sum / n as f64) }
    }
}

impl Accumulator for Summary {
    fn name(&self) -> &str {
        &self.name
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn dimensions(&self) -> usize {
        1
    }

    fn fill(&mut self, x: f64) {
        self.count += 1;
        if x.is_nan() {
            return;
        }
        self.non_nan += 1;
        self.sum += x;
        self.min = Some(self.min.map_or(x, |m| m.min(x)));
        self.max = Some(self.max.map_or(x, |m| m.max(x)));
    }

    fn fill2(&mut self, x: f64, _y: f64) {
        self.fill(x);
    }

    fn relabel(&mut self, name: String, title: String) {
        self.name = name;
        self.title = title;
    }

    fn entries(&self) -> u64 {
        self.count
    }

    fn clone_box(&self) -> Box<dyn Accumulator> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
