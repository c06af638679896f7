use std::fs;
use std::path::Path;

use crate::accumulate::Plotter;
use crate::analysis::Analysis;
use crate::error::{AnalysisError, AnalysisResult};
use crate::processing::Pipeline;
use crate::selection::Selector;
use crate::store::ValueStore;

use super::AnalysisConfig;
use super::generators::{generate_cut, generate_plots, generate_steps, register_raw_fields};

/// Builds an [`Analysis`] from an [`AnalysisConfig`] in four explicit phases.
///
/// Phases run in order (`data`, `event`, `cutter`, `plotter`) and each runs at most once.
#[derive(Debug)]
pub struct Initializer {
    config: AnalysisConfig,
    store: ValueStore,
    raw_fields: Option<Vec<String>>,
    pipeline: Option<Pipeline>,
    selector: Option<Selector>,
    plotter: Option<Plotter>,
}

impl Initializer {
    pub fn new(config: AnalysisConfig) -> Self {
        Self {
            config,
            store: ValueStore::new(),
            raw_fields: None,
            pipeline: None,
            selector: None,
            plotter: None,
        }
    }

    pub fn from_json_str(json: &str) -> AnalysisResult<Self> {
        Ok(Self::new(serde_json::from_str(json)?))
    }

    pub fn from_path(path: impl AsRef<Path>) -> AnalysisResult<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Register the raw fields.
    pub fn initialize_data(&mut self) -> AnalysisResult<()> {
        if self.raw_fields.is_some() {
            return Err(AnalysisError::AlreadyInitialized { component: "data" });
        }
        let names = register_raw_fields(
            &mut self.store,
            &self.config.raw_fields,
            self.config.number_of_particles,
        )?;
        self.raw_fields = Some(names);
        Ok(())
    }

    /// Register calculated quantities and build the computation pipeline.
    pub fn initialize_event(&mut self) -> AnalysisResult<()> {
        if self.pipeline.is_some() {
            return Err(AnalysisError::AlreadyInitialized { component: "event" });
        }
        if self.raw_fields.is_none() {
            return Err(AnalysisError::NotInitialized { component: "data" });
        }
        let mut pipeline = Pipeline::new();
        for decl in &self.config.calculated_quantities {
            for step in generate_steps(&mut self.store, &self.config.constants, decl)? {
                pipeline.push(step);
            }
        }
        self.pipeline = Some(pipeline);
        Ok(())
    }

    /// Build the cuts in declaration order.
    pub fn initialize_cutter(&mut self) -> AnalysisResult<()> {
        if self.selector.is_some() {
            return Err(AnalysisError::AlreadyInitialized { component: "cutter" });
        }
        if self.pipeline.is_none() {
            return Err(AnalysisError::NotInitialized { component: "event" });
        }
        let mut selector = Selector::new();
        for decl in &self.config.cuts {
            selector.push(generate_cut(&mut self.store, decl)?)?;
        }
        self.selector = Some(selector);
        Ok(())
    }

    /// Build the plots; their masks may name cuts.
    pub fn initialize_plotter(&mut self) -> AnalysisResult<()> {
        if self.plotter.is_some() {
            return Err(AnalysisError::AlreadyInitialized { component: "plotter" });
        }
        let Some(selector) = self.selector.as_ref() else {
            return Err(AnalysisError::NotInitialized { component: "cutter" });
        };
        let mut plotter = Plotter::new();
        for decl in &self.config.plots {
            for plot in generate_plots(&self.store, selector, decl)? {
                plotter.push(plot);
            }
        }
        self.plotter = Some(plotter);
        Ok(())
    }

    /// Hand over the assembled analysis. Every phase must have run.
    pub fn finish(self) -> AnalysisResult<Analysis> {
        let raw_fields = self.raw_fields.ok_or(AnalysisError::NotInitialized { component: "data" })?;
        let pipeline = self.pipeline.ok_or(AnalysisError::NotInitialized { component: "event" })?;
        let selector = self.selector.ok_or(AnalysisError::NotInitialized { component: "cutter" })?;
        let plotter = self.plotter.ok_or(AnalysisError::NotInitialized { component: "plotter" })?;
        Ok(Analysis::new(self.store, pipeline, selector, plotter, raw_fields))
    }

    /// Run all four phases and [`Self::finish`].
    pub fn build(mut self) -> AnalysisResult<Analysis> {
        self.initialize_data()?;
        self.initialize_event()?;
        self.initialize_cutter()?;
        self.initialize_plotter()?;
        self.finish()
    }
}
