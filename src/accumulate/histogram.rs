use std::any::Any;

use crate::error::{AnalysisError, AnalysisResult};

use super::Accumulator;

/// Fixed-width binning of `[low, high)` into `bins` bins.
///
/// Bin `0` is the underflow and bin `bins + 1` the overflow; values that do not compare below
/// `high` (including NaN) land in the overflow.
#[derive(Debug, Clone, PartialEq)]
pub struct Axis {
    bins: usize,
    low: f64,
    high: f64,
}

impl Axis {
    pub fn new(bins: usize, low: f64, high: f64) -> AnalysisResult<Self> {
        if bins == 0 {
            return Err(AnalysisError::invalid("axis", "needs at least one bin"));
        }
        if !(low < high) {
            return Err(AnalysisError::invalid("axis", format!("empty range [{low}, {high})")));
        }
        Ok(Self { bins, low, high })
    }

    pub fn bins(&self) -> usize {
        self.bins
    }

    pub fn low(&self) -> f64 {
        self.low
    }

    pub fn high(&self) -> f64 {
        self.high
    }

    pub fn find_bin(&self, x: f64) -> usize {
        if x < self.low {
            0
        } else if !(x < self.high) {
            self.bins + 1
        } else {
            let width = (self.high - self.low) / self.bins as f64;
            // Rounding can push values just below `high` onto the overflow index.
            (((x - self.low) / width) as usize + 1).min(self.bins)
        }
    }
}

/// One-dimensional counting histogram.
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram1D {
    name: String,
    title: String,
    axis: Axis,
    counts: Vec<u64>,
    entries: u64,
}

impl Histogram1D {
    pub fn new(name: impl Into<String>, title: impl Into<String>, axis: Axis) -> Self {
        let counts = vec![0; axis.bins + 2];
        Self {
            name: name.into(),
            title: title.into(),
            axis,
            counts,
            entries: 0,
        }
    }

    pub fn axis(&self) -> &Axis {
        &self.axis
    }

    /// Count in `bin`, using the under/overflow numbering of [`Axis`].
    pub fn bin_content(&self, bin: usize) -> u64 {
        self.counts.get(bin).copied().unwrap_or(0)
    }

    pub fn underflow(&self) -> u64 {
        self.counts[0]
    }

    pub fn overflow(&self) -> u64 {
        self.counts[self.axis.bins + 1]
    }
}

impl Accumulator for Histogram1D {
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
        let bin = self.axis.find_bin(x);
        self.counts[bin] += 1;
        self.entries += 1;
    }

    fn fill2(&mut self, x: f64, _y: f64) {
        self.fill(x);
    }

    fn relabel(&mut self, name: String, title: String) {
        self.name = name;
        self.title = title;
    }

    fn entries(&self) -> u64 {
        self.entries
    }

    fn clone_box(&self) -> Box<dyn Accumulator> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Two-dimensional counting histogram.
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram2D {
    name: String,
    title: String,
    x_axis: Axis,
    y_axis: Axis,
    counts: Vec<u64>,
    entries: u64,
}

impl Histogram2D {
    pub fn new(name: impl Into<String>, title: impl Into<String>, x_axis: Axis, y_axis: Axis) -> Self {
        let counts = vec![0; (x_axis.bins + 2) * (y_axis.bins + 2)];
        Self {
            name: name.into(),
            title: title.into(),
            x_axis,
            y_axis,
            counts,
            entries: 0,
        }
    }

    pub fn x_axis(&self) -> &Axis {
        &self.x_axis
    }

    pub fn y_axis(&self) -> &Axis {
        &self.y_axis
    }

    pub fn bin_content(&self, x_bin: usize, y_bin: usize) -> u64 {
        if x_bin > self.x_axis.bins + 1 || y_bin > self.y_axis.bins + 1 {
            return 0;
        }
        self.counts[self.offset(x_bin, y_bin)]
    }

    fn offset(&self, x_bin: usize, y_bin: usize) -> usize {
        y_bin * (self.x_axis.bins + 2) + x_bin
    }
}

impl Accumulator for Histogram2D {
    fn name(&self) -> &str {
        &self.name
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn dimensions(&self) -> usize {
        2
    }

    /// One value alone cannot be placed in two dimensions; ignored.
    fn fill(&mut self, _x: f64) {}

    fn fill2(&mut self, x: f64, y: f64) {
        let at = self.offset(self.x_axis.find_bin(x), self.y_axis.find_bin(y));
        self.counts[at] += 1;
        self.entries += 1;
    }

    fn relabel(&mut self, name: String, title: String) {
        self.name = name;
        self.title = title;
    }

    fn entries(&self) -> u64 {
        self.entries
    }

    fn clone_box(&self) -> Box<dyn Accumulator> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::{Axis, Histogram1D, Histogram2D};
    use crate::accumulate::Accumulator;

    #[test]
    fn axis_rejects_degenerate_ranges() {
        assert!(Axis::new(0, 0.0, 1.0).is_err());
        assert!(Axis::new(10, 1.0, 1.0).is_err());
        assert!(Axis::new(10, 0.0, f64::NAN).is_err());
    }

    #[test]
    fn values_land_in_bins_and_flows() {
        let mut h = Histogram1D::new("m", "mass", Axis::new(4, 0.0, 2.0).unwrap());
        for x in [-0.1, 0.0, 0.49, 0.5, 1.99, 2.0, f64::NAN] {
            h.fill(x);
        }
        assert_eq!(h.underflow(), 1);
        assert_eq!(h.bin_content(1), 2);
        assert_eq!(h.bin_content(2), 1);
        assert_eq!(h.bin_content(4), 1);
        assert_eq!(h.overflow(), 2);
        assert_eq!(h.entries(), 7);
        assert_eq!(h.bin_content(99), 0);
    }

    #[test]
    fn clones_are_independent() {
        let mut h = Histogram1D::new("m", "mass", Axis::new(2, 0.0, 1.0).unwrap());
        let mut c = h.clone_box();
        c.relabel("m_1".into(), "mass A".into());
        c.fill(0.2);
        h.fill(0.7);
        assert_eq!(c.name(), "m_1");
        assert_eq!(h.name(), "m");
        let c = c.as_any().downcast_ref::<Histogram1D>().unwrap();
        assert_eq!(c.bin_content(1), 1);
        assert_eq!(h.bin_content(1), 0);
    }

    #[test]
    fn two_dimensional_fill() {
        let mut h = Histogram2D::new(
            "xy",
            "x vs y",
            Axis::new(2, 0.0, 2.0).unwrap(),
            Axis::new(3, 0.0, 3.0).unwrap(),
        );
        h.fill2(0.5, 2.5);
        h.fill2(1.5, -1.0);
        h.fill(1.0);
        assert_eq!(h.bin_content(1, 3), 1);
        assert_eq!(h.bin_content(2, 0), 1);
        assert_eq!(h.entries(), 2);
        assert_eq!(h.dimensions(), 2);
    }
}
