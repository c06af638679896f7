//! The assembled per-record program: store, computation pipeline, selector and plotter.

use crate::accumulate::Plotter;
use crate::error::AnalysisResult;
use crate::processing::Pipeline;
use crate::selection::{CutMask, Selector};
use crate::store::ValueStore;

/// Everything needed to process one record after the raw fields have been written.
#[derive(Debug)]
pub struct Analysis {
    store: ValueStore,
    pipeline: Pipeline,
    selector: Selector,
    plotter: Plotter,
    raw_fields: Vec<String>,
}

impl Analysis {
    /// `raw_fields` lists the names a record source is expected to fill.
    pub fn new(
        store: ValueStore,
        pipeline: Pipeline,
        selector: Selector,
        plotter: Plotter,
        raw_fields: Vec<String>,
    ) -> Self {
        Self {
            store,
            pipeline,
            selector,
            plotter,
            raw_fields,
        }
    }

    pub fn store(&self) -> &ValueStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut ValueStore {
        &mut self.store
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    pub fn selector(&self) -> &Selector {
        &self.selector
    }

    pub fn plotter(&self) -> &Plotter {
        &self.plotter
    }

    pub fn raw_fields(&self) -> &[String] {
        &self.raw_fields
    }

    /// Run the pipeline, evaluate the cuts and fill the plots for the record currently in the
    /// store. Returns the record's cut mask.
    pub fn process_record(&mut self) -> AnalysisResult<CutMask> {
        self.pipeline.run(&mut self.store)?;
        let mask = self.selector.run(&mut self.store)?;
        self.plotter.fill(&self.store, mask)?;
        Ok(mask)
    }
}
