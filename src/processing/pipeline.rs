use crate::error::{AnalysisError, AnalysisResult};
use crate::store::ValueStore;

use super::step::ComputationStep;

/// Ordered list of computation steps, run once per record in declaration order.
///
/// Steps are push-only: there is no reordering or removal, so a step may only read quantities
/// produced by steps pushed before it.
#[derive(Debug, Default)]
pub struct Pipeline {
    steps: Vec<ComputationStep>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, step: ComputationStep) {
        self.steps.push(step);
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn steps(&self) -> &[ComputationStep] {
        &self.steps
    }

    /// Evaluate every step once.
    ///
    /// The first failing step aborts the pass with [`AnalysisError::StepFailed`]; steps after it
    /// are not evaluated.
    pub fn run(&mut self, store: &mut ValueStore) -> AnalysisResult<()> {
        for (index, step) in self.steps.iter_mut().enumerate() {
            step.evaluate(store).map_err(|e| AnalysisError::StepFailed {
                index,
                step: step.kind(),
                message: e.to_string(),
            })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::Pipeline;
    use crate::error::AnalysisError;
    use crate::processing::{ComputationStep, Sum, SumStep};
    use crate::store::ValueStore;

    #[test]
    fn later_steps_see_earlier_outputs() {
        let mut store = ValueStore::new();
        let a = store.insert::<f64>("a").unwrap();
        let b = store.insert::<f64>("b").unwrap();
        let c = store.insert::<f64>("c").unwrap();
        store.write(a, -2.0).unwrap();

        let mut pipeline = Pipeline::new();
        pipeline.push(ComputationStep::AbsoluteValue { input: a, out: b });
        pipeline.push(ComputationStep::Sum(SumStep::Float64(
            Sum::new(vec![a, b], vec![], c).unwrap(),
        )));
        pipeline.run(&mut store).unwrap();

        assert_eq!(store.read(b).unwrap(), 2.0);
        assert_eq!(store.read(c).unwrap(), 0.0);
    }

    #[test]
    fn failing_step_aborts_the_pass() {
        let mut foreign = ValueStore::new();
        for name in ["p", "q", "r"] {
            foreign.insert::<f64>(name).unwrap();
        }
        let bad_input = foreign.address::<f64>("r").unwrap();

        let mut store = ValueStore::new();
        let x = store.insert::<f64>("x").unwrap();
        let y = store.insert::<f64>("y").unwrap();
        store.write(x, -1.0).unwrap();

        let mut pipeline = Pipeline::new();
        pipeline.push(ComputationStep::AbsoluteValue { input: x, out: y });
        pipeline.push(ComputationStep::AbsoluteValue { input: bad_input, out: y });
        pipeline.push(ComputationStep::Difference { minuend: x, subtrahend: x, out: y });

        let err = pipeline.run(&mut store).unwrap_err();
        assert!(matches!(err, AnalysisError::StepFailed { index: 1, step: "abs", .. }));
        // The third step never ran.
        assert_eq!(store.read(y).unwrap(), 1.0);
    }
}
