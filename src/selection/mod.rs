//! Cuts and the bitmask that encodes their per-record results.
//!
//! A [`Selector`] evaluates its [`Cut`]s in declaration order and packs the results into a
//! [`CutMask`]. Accumulator clones carry a required mask and are filled only when it
//! [is satisfied](CutMask::is_satisfied_by) by the record's mask.
//!
//! ```rust
//! use rust_event_selection::selection::{Cut, CutMask, CutTest, RangeCut, RangeMode, Selector};
//! use rust_event_selection::store::ValueStore;
//!
//! let mut store = ValueStore::new();
//! let mass = store.insert::<f64>("mass1").unwrap();
//! let low = store.alloc(0.1);
//! let high = store.alloc(0.2);
//!
//! let mut selector = Selector::new();
//! let window = RangeCut::new(mass, Some(low), Some(high), RangeMode::Inclusive).unwrap();
//! selector
//!     .push(Cut::new(&mut store, "pion", "pion mass window", "pi", CutTest::Range(window)))
//!     .unwrap();
//!
//! store.write(mass, 0.139).unwrap();
//! assert_eq!(selector.run(&mut store).unwrap(), CutMask::new(1));
//! store.write(mass, 0.5).unwrap();
//! assert_eq!(selector.run(&mut store).unwrap(), CutMask::NONE);
//! ```

pub mod cut;
pub mod mask;
pub mod selector;

pub use cut::{
    Cut, CutTest, EllipticCut, EllipticMode, EqualityCut, EqualityMode, EqualityOperands, GroupMode,
    RangeCut, RangeMode, TriggerMaskCut,
};
pub use mask::{CutMask, MAX_CUTS};
pub use selector::Selector;
