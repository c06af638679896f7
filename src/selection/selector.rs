use crate::error::{AnalysisError, AnalysisResult};
use crate::store::ValueStore;

use super::cut::Cut;
use super::mask::{CutMask, MAX_CUTS};

/// Ordered set of cuts evaluated once per record. Cut `i` owns bit `i` of the resulting mask.
#[derive(Debug, Default)]
pub struct Selector {
    cuts: Vec<Cut>,
}

impl Selector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a cut.
    ///
    /// Rejects a repeated short name, a cut structurally equal to one already registered, and any
    /// cut past [`MAX_CUTS`].
    pub fn push(&mut self, cut: Cut) -> AnalysisResult<()> {
        if self
            .cuts
            .iter()
            .any(|c| c.short_name() == cut.short_name() || c.is_equivalent(&cut))
        {
            return Err(AnalysisError::DuplicateCut {
                name: cut.short_name().to_string(),
            });
        }
        if self.cuts.len() >= MAX_CUTS {
            return Err(AnalysisError::TooManyCuts {
                name: cut.short_name().to_string(),
                max: MAX_CUTS,
            });
        }
        self.cuts.push(cut);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.cuts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cuts.is_empty()
    }

    pub fn cuts(&self) -> &[Cut] {
        &self.cuts
    }

    /// Evaluate every cut in declaration order and pack the results.
    pub fn run(&self, store: &mut ValueStore) -> AnalysisResult<CutMask> {
        let mut mask = CutMask::NONE;
        for (index, cut) in self.cuts.iter().enumerate() {
            let passed = cut.evaluate(store).map_err(|e| AnalysisError::CutFailed {
                index,
                cut: cut.short_name().to_string(),
                message: e.to_string(),
            })?;
            mask.set(index, passed);
        }
        Ok(mask)
    }

    /// Concatenated abbreviations of the cuts set in `mask`, in declaration order.
    pub fn abbreviations(&self, mask: CutMask) -> String {
        self.cuts
            .iter()
            .enumerate()
            .filter(|(i, _)| mask.get(*i))
            .map(|(_, c)| c.abbreviation())
            .collect()
    }

    /// `mask` rendered over [`Self::len`] bits, last cut first.
    pub fn render(&self, mask: CutMask) -> String {
        mask.render(self.len())
    }

    /// Mask with the bits of the named cuts set.
    pub fn mask_for<S: AsRef<str>>(&self, short_names: &[S]) -> AnalysisResult<CutMask> {
        let mut mask = CutMask::NONE;
        for name in short_names {
            let name = name.as_ref();
            let index = self
                .cuts
                .iter()
                .position(|c| c.short_name() == name)
                .ok_or_else(|| AnalysisError::UnknownName {
                    name: name.to_string(),
                })?;
            mask.set(index, true);
        }
        Ok(mask)
    }

    /// Index of the cut named `short_name`.
    pub fn index_of(&self, short_name: &str) -> Option<usize> {
        self.cuts.iter().position(|c| c.short_name() == short_name)
    }
}
