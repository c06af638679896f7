//! Per-record derivation of quantities.
//!
//! A [`Pipeline`] is an ordered list of [`ComputationStep`]s. Each step holds [`crate::store::Handle`]s
//! resolved once at construction and is evaluated once per record, reading its inputs from the
//! [`crate::store::ValueStore`] and writing its outputs back.
//!
//! ## Example: build a four-vector and take its mass
//!
//! ```rust
//! use rust_event_selection::kinematics::FourVector;
//! use rust_event_selection::processing::{ComputationStep, FourVectorInputs, Pipeline};
//! use rust_event_selection::store::ValueStore;
//!
//! let mut store = ValueStore::new();
//! let x = store.insert::<f64>("X1").unwrap();
//! let y = store.insert::<f64>("Y1").unwrap();
//! let z = store.insert::<f64>("Z1").unwrap();
//! let mass = store.alloc(0.139);
//! let p = store.insert::<FourVector>("P1").unwrap();
//! let m = store.insert::<f64>("mass1").unwrap();
//!
//! let mut pipeline = Pipeline::new();
//! pipeline.push(ComputationStep::BuildFourVector {
//!     inputs: FourVectorInputs::XyzMass { x, y, z, mass },
//!     out: p,
//! });
//! pipeline.push(ComputationStep::Mass { input: p, out: m });
//!
//! store.write(z, 1.0).unwrap();
//! pipeline.run(&mut store).unwrap();
//! assert!((store.read(m).unwrap() - 0.139).abs() < 1e-12);
//! ```

pub mod pipeline;
pub mod step;
pub mod sum;

pub use pipeline::Pipeline;
pub use step::{BadSpillFlag, ComputationStep, DIVISION_SENTINEL, FourVectorAttributeOutputs, FourVectorInputs};
pub use sum::{Sum, SumStep, Summable};
