//! Aggregation targets and their binding to cut masks.
//!
//! Concrete accumulators:
//!
//! - [`Histogram1D`] / [`Histogram2D`]: fixed-width bins with under/overflow
//! - [`Summary`]: count/sum/min/max of one quantity
//!
//! A [`Plot`] binds a template accumulator to its source values and required cut masks; the
//! [`Plotter`] fills every plot once per record.

use std::any::Any;
use std::fmt;

pub mod histogram;
pub mod plot;
pub mod summary;

pub use histogram::{Axis, Histogram1D, Histogram2D};
pub use plot::{Plot, Plotter};
pub use summary::{Summary, SummaryOp};

/// Something values can be accumulated into.
pub trait Accumulator: fmt::Debug {
    fn name(&self) -> &str;

    fn title(&self) -> &str;

    /// Number of values consumed per fill (1 or 2).
    fn dimensions(&self) -> usize;

    fn fill(&mut self, x: f64);

    fn fill2(&mut self, x: f64, y: f64);

    /// Rename a clone.
    fn relabel(&mut self, name: String, title: String);

    /// Number of fills so far.
    fn entries(&self) -> u64;

    /// Independent copy with the same configuration and contents.
    fn clone_box(&self) -> Box<dyn Accumulator>;

    /// Downcast hook for reading back concrete contents.
    fn as_any(&self) -> &dyn Any;
}

impl Clone for Box<dyn Accumulator> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}
