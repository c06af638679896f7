use std::fmt;

/// Maximum number of cuts a [`CutMask`] can encode.
pub const MAX_CUTS: usize = u64::BITS as usize;

/// Packed per-record cut results: bit `i` is set iff cut `i` evaluated true.
///
/// The same type doubles as a *required* mask attached to an accumulator clone; see
/// [`CutMask::is_satisfied_by`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct CutMask(u64);

impl CutMask {
    /// The mask with no bits set; satisfied by every record.
    pub const NONE: Self = Self(0);

    pub const fn new(bits: u64) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> u64 {
        self.0
    }

    /// Whether bit `index` is set. Indices past [`MAX_CUTS`] are never set.
    pub fn get(self, index: usize) -> bool {
        index < MAX_CUTS && self.0 & (1 << index) != 0
    }

    /// Set or clear bit `index`. Indices past [`MAX_CUTS`] are ignored.
    pub fn set(&mut self, index: usize, value: bool) {
        if index >= MAX_CUTS {
            return;
        }
        if value {
            self.0 |= 1 << index;
        } else {
            self.0 &= !(1 << index);
        }
    }

    /// `true` iff every bit required by `self` is also set in `actual`.
    pub fn is_satisfied_by(self, actual: CutMask) -> bool {
        self.0 & !actual.0 == 0
    }

    /// Number of significant bits: one past the highest set bit.
    pub fn width(self) -> usize {
        (u64::BITS - self.0.leading_zeros()) as usize
    }

    /// Render the lowest `width` bits, highest index first.
    pub fn render(self, width: usize) -> String {
        (0..width.min(MAX_CUTS))
            .rev()
            .map(|i| if self.get(i) { '1' } else { '0' })
            .collect()
    }

    /// Indices of set bits, ascending.
    pub fn iter_set(self) -> impl Iterator<Item = usize> {
        (0..MAX_CUTS).filter(move |&i| self.get(i))
    }
}

impl From<u64> for CutMask {
    fn from(bits: u64) -> Self {
        Self(bits)
    }
}

impl fmt::Display for CutMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(self.width().max(1)))
    }
}

#[cfg(test)]
mod tests {
    use super::CutMask;

    #[test]
    fn every_mask_satisfies_itself_and_the_empty_mask() {
        for bits in [0u64, 1, 0b1010, u64::MAX] {
            let m = CutMask::new(bits);
            assert!(m.is_satisfied_by(m));
            assert!(CutMask::NONE.is_satisfied_by(m));
        }
    }

    #[test]
    fn satisfaction_is_monotone_in_actual() {
        let required = CutMask::new(0b0101);
        let actual = CutMask::new(0b0111);
        assert!(required.is_satisfied_by(actual));
        assert!(required.is_satisfied_by(CutMask::new(actual.bits() | 0b1000)));
        assert!(!required.is_satisfied_by(CutMask::new(0b0100)));
    }

    #[test]
    fn renders_highest_index_first() {
        let mut m = CutMask::NONE;
        m.set(0, true);
        m.set(2, true);
        assert_eq!(m.render(4), "0101");
        assert_eq!(m.to_string(), "101");
        assert_eq!(CutMask::NONE.to_string(), "0");
        m.set(0, false);
        assert_eq!(m.render(3), "100");
    }

    #[test]
    fn iterates_set_bits_in_order() {
        let m = CutMask::new(0b1001_0010);
        assert_eq!(m.iter_set().collect::<Vec<_>>(), vec![1, 4, 7]);
        assert_eq!(m.width(), 8);
        assert!(!m.get(64));
    }
}
