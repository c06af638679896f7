use crate::error::{AnalysisError, AnalysisResult};
use crate::selection::{CutMask, Selector};
use crate::store::{ScalarHandle, ValueStore};

use super::Accumulator;

/// An accumulator template bound to one or two sources and a set of required cut masks.
///
/// Every mask owns its own clone of the template. On [`Plot::fill`] each clone whose mask is
/// satisfied by the record's mask receives the current source values.
#[derive(Debug)]
pub struct Plot {
    name: String,
    sources: Vec<ScalarHandle>,
    masks: Vec<CutMask>,
    accumulators: Vec<Box<dyn Accumulator>>,
}

impl Plot {
    /// Build the per-mask clones.
    ///
    /// An empty mask list means "no cuts required". The empty mask is always added if missing
    /// and repeated masks are dropped, keeping the first occurrence.
    pub fn new(
        template: Box<dyn Accumulator>,
        sources: Vec<ScalarHandle>,
        masks: Vec<CutMask>,
        selector: &Selector,
    ) -> AnalysisResult<Self> {
        let name = template.name().to_string();
        if sources.len() != template.dimensions() {
            return Err(AnalysisError::invalid(
                name,
                format!(
                    "{} source(s) given for a {}-dimensional accumulator",
                    sources.len(),
                    template.dimensions()
                ),
            ));
        }

        let mut unique: Vec<CutMask> = Vec::with_capacity(masks.len() + 1);
        for mask in masks {
            if mask.width() > selector.len() {
                return Err(AnalysisError::invalid(
                    name,
                    format!("mask {mask} refers to cuts beyond the {} registered", selector.len()),
                ));
            }
            if !unique.contains(&mask) {
                unique.push(mask);
            }
        }
        if !unique.contains(&CutMask::NONE) {
            unique.push(CutMask::NONE);
        }

        let accumulators = unique
            .iter()
            .map(|&mask| {
                let mut clone = template.clone_box();
                clone.relabel(
                    format!("{}_{}", template.name(), selector.render(mask)),
                    format!("{} {}", template.title(), selector.abbreviations(mask)),
                );
                clone
            })
            .collect();

        Ok(Self {
            name,
            sources,
            masks: unique,
            accumulators,
        })
    }

    /// Name of the template the clones were made from.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn masks(&self) -> &[CutMask] {
        &self.masks
    }

    pub fn accumulators(&self) -> impl Iterator<Item = &dyn Accumulator> {
        self.accumulators.iter().map(|a| a.as_ref() as &dyn Accumulator)
    }

    /// The clone bound to `mask`, if the mask is registered.
    pub fn accumulator(&self, mask: CutMask) -> Option<&dyn Accumulator> {
        let i = self.masks.iter().position(|&m| m == mask)?;
        self.accumulators.get(i).map(|a| a.as_ref())
    }

    pub fn fill(&mut self, store: &ValueStore, actual: CutMask) -> AnalysisResult<()> {
        let values = match self.sources.as_slice() {
            [x] => (x.read_f64(store)?, None),
            [x, y] => (x.read_f64(store)?, Some(y.read_f64(store)?)),
            _ => return Ok(()),
        };
        for (mask, acc) in self.masks.iter().zip(self.accumulators.iter_mut()) {
            if !mask.is_satisfied_by(actual) {
                continue;
            }
            match values {
                (x, None) => acc.fill(x),
                (x, Some(y)) => acc.fill2(x, y),
            }
        }
        Ok(())
    }
}

/// All plots of an analysis, filled in declaration order.
#[derive(Debug, Default)]
pub struct Plotter {
    plots: Vec<Plot>,
}

impl Plotter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, plot: Plot) {
        self.plots.push(plot);
    }

    pub fn plots(&self) -> &[Plot] {
        &self.plots
    }

    pub fn len(&self) -> usize {
        self.plots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plots.is_empty()
    }

    /// Look up a clone by its full name (`"{template}_{bits}"`).
    pub fn find(&self, name: &str) -> Option<&dyn Accumulator> {
        self.plots
            .iter()
            .flat_map(Plot::accumulators)
            .find(|a| a.name() == name)
    }

    pub fn fill(&mut self, store: &ValueStore, actual: CutMask) -> AnalysisResult<()> {
        for plot in &mut self.plots {
            plot.fill(store, actual)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{Plot, Plotter};
    use crate::accumulate::{Accumulator, Axis, Histogram1D, Histogram2D};
    use crate::selection::{Cut, CutMask, CutTest, RangeCut, RangeMode, Selector};
    use crate::store::{Handle, ValueStore};

    fn selector_with_two_cuts(store: &mut ValueStore, x: Handle<f64>) -> Selector {
        let mut selector = Selector::new();
        let zero = store.alloc(0.0);
        let five = store.alloc(5.0);
        for (name, abbrev, bound) in [("pos", "P", zero), ("big", "B", five)] {
            let test = RangeCut::new(x, Some(bound), None, RangeMode::OpenHighExclusive).unwrap();
            selector.push(Cut::new(store, name, name, abbrev, CutTest::Range(test))).unwrap();
        }
        selector
    }

    fn template() -> Box<dyn Accumulator> {
        Box::new(Histogram1D::new("hX", "x", Axis::new(10, 0.0, 10.0).unwrap()))
    }

    #[test]
    fn masks_default_to_unconditional() {
        let mut store = ValueStore::new();
        let x = store.insert::<f64>("x").unwrap();
        let selector = selector_with_two_cuts(&mut store, x);

        let plot = Plot::new(template(), vec![x.into()], vec![], &selector).unwrap();
        assert_eq!(plot.masks(), &[CutMask::NONE]);

        let plot = Plot::new(
            template(),
            vec![x.into()],
            vec![CutMask::new(0b11), CutMask::new(0b01), CutMask::new(0b11)],
            &selector,
        )
        .unwrap();
        assert_eq!(plot.masks(), &[CutMask::new(0b11), CutMask::new(0b01), CutMask::NONE]);
        let names: Vec<_> = plot.accumulators().map(|a| a.name().to_string()).collect();
        assert_eq!(names, vec!["hX_11", "hX_01", "hX_00"]);
        assert_eq!(plot.accumulator(CutMask::new(0b11)).unwrap().title(), "x PB");
        assert_eq!(plot.accumulator(CutMask::NONE).unwrap().title(), "x ");
    }

    #[test]
    fn invalid_bindings_are_rejected() {
        let mut store = ValueStore::new();
        let x = store.insert::<f64>("x").unwrap();
        let selector = selector_with_two_cuts(&mut store, x);

        assert!(Plot::new(template(), vec![x.into()], vec![CutMask::new(0b100)], &selector).is_err());
        assert!(Plot::new(template(), vec![x.into(), x.into()], vec![], &selector).is_err());
        let h2 = Box::new(Histogram2D::new(
            "hXY",
            "xy",
            Axis::new(2, 0.0, 1.0).unwrap(),
            Axis::new(2, 0.0, 1.0).unwrap(),
        ));
        assert!(Plot::new(h2, vec![x.into()], vec![], &selector).is_err());
    }

    #[test]
    fn only_satisfied_clones_are_filled() {
        let mut store = ValueStore::new();
        let x = store.insert::<f64>("x").unwrap();
        let selector = selector_with_two_cuts(&mut store, x);
        let mut plotter = Plotter::new();
        plotter.push(
            Plot::new(
                template(),
                vec![x.into()],
                vec![CutMask::new(0b01), CutMask::new(0b11)],
                &selector,
            )
            .unwrap(),
        );

        for value in [-1.0, 2.0, 7.0] {
            store.write(x, value).unwrap();
            let mask = selector.run(&mut store).unwrap();
            plotter.fill(&store, mask).unwrap();
        }

        assert_eq!(plotter.find("hX_00").unwrap().entries(), 3);
        assert_eq!(plotter.find("hX_01").unwrap().entries(), 2);
        assert_eq!(plotter.find("hX_11").unwrap().entries(), 1);
        assert!(plotter.find("hX").is_none());
    }
}
