//! `rust-event-selection` evaluates a declarative physics analysis one record at a time:
//! derived quantities are computed from raw fields, named cuts are packed into a bitmask, and
//! histograms or summaries are filled for every cut combination they were declared for.
//!
//! The primary entrypoint is [`config::Initializer`], which turns a JSON
//! [`config::AnalysisConfig`] into a runnable [`analysis::Analysis`]. An
//! [`execution::ExecutionEngine`] then drives it over a [`source::RecordSource`].
//!
//! ## Per-record flow
//!
//! 1. A record source writes raw fields into the [`store::ValueStore`].
//! 2. The [`processing::Pipeline`] evaluates its steps in declaration order.
//! 3. The [`selection::Selector`] evaluates every cut and packs a [`selection::CutMask`].
//! 4. The [`accumulate::Plotter`] fills each accumulator clone whose required mask is satisfied.
//!
//! ## Quick example: select a pion mass window from CSV
//!
//! ```no_run
//! use rust_event_selection::config::Initializer;
//! use rust_event_selection::execution::{ExecutionEngine, ExecutionOptions};
//! use rust_event_selection::source::CsvSource;
//!
//! # fn main() -> Result<(), rust_event_selection::AnalysisError> {
//! let mut analysis = Initializer::from_path("analysis.json")?.build()?;
//! let mut source = CsvSource::from_path("events.csv", analysis.raw_fields().to_vec())?;
//!
//! let engine = ExecutionEngine::new(ExecutionOptions::default());
//! let metrics = engine.run(&mut analysis, &mut source)?;
//! println!("{metrics}");
//!
//! if let Some(hist) = analysis.plotter().find("hMass_1") {
//!     println!("{} entries", hist.entries());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`store`]: named, typed value slots and the handles that address them
//! - [`kinematics`]: three- and four-vectors plus beam and momentum-transfer formulas
//! - [`processing`]: computation steps and the pipeline that runs them
//! - [`selection`]: cuts, the selector and the cut mask
//! - [`accumulate`]: histograms, summaries and their per-mask clones
//! - [`source`]: record sources (CSV, in-memory)
//! - [`config`]: the serde analysis description and its initializer
//! - [`execution`]: the event loop, metrics and observer hooks
//! - [`error`]: error types used across the crate
//!
//! ### Edge cases
//!
//! Data-level edge cases never fail a record: division by zero yields
//! [`processing::DIVISION_SENTINEL`], and a beam with no physical solution is returned at rest.

pub mod accumulate;
pub mod analysis;
pub mod config;
pub mod error;
pub mod execution;
pub mod kinematics;
pub mod processing;
pub mod selection;
pub mod source;
pub mod store;
pub mod types;

pub use error::{AnalysisError, AnalysisResult};
