//! The closed set of computation steps.

use std::collections::HashSet;

use crate::error::{AnalysisError, AnalysisResult};
use crate::kinematics::{self, FourVector, Vector3};
use crate::store::{Handle, ValueStore};

use super::sum::SumStep;

/// Written by [`ComputationStep::Ratio`] and [`ComputationStep::GradXGradY`] when the denominator
/// is zero.
pub const DIVISION_SENTINEL: f64 = -2_147_483_648.0;

/// How a [`ComputationStep::BuildFourVector`] assembles its output. Fixed at construction.
#[derive(Debug, Clone, PartialEq)]
pub enum FourVectorInputs {
    /// Momentum components and invariant mass.
    XyzMass {
        x: Handle<f64>,
        y: Handle<f64>,
        z: Handle<f64>,
        mass: Handle<f64>,
    },
    /// Momentum components and energy.
    PxPyPzE {
        px: Handle<f64>,
        py: Handle<f64>,
        pz: Handle<f64>,
        energy: Handle<f64>,
    },
    /// Three-momentum and invariant mass.
    Vector3Mass {
        momentum: Handle<Vector3>,
        mass: Handle<f64>,
    },
    /// Three-momentum and energy.
    Vector3Energy {
        momentum: Handle<Vector3>,
        energy: Handle<f64>,
    },
}

/// Outputs of [`ComputationStep::FourVectorAttributes`].
#[derive(Debug, Clone, PartialEq)]
pub struct FourVectorAttributeOutputs {
    pub mass: Handle<f64>,
    pub energy: Handle<f64>,
    pub momentum: Handle<f64>,
    pub theta: Handle<f64>,
    pub phi: Handle<f64>,
}

/// Flags records whose `(run, spill)` pair is listed as bad.
///
/// The lookup is cached and only repeated when the pair changes from one record to the next.
#[derive(Debug, Clone, PartialEq)]
pub struct BadSpillFlag {
    run: Handle<i32>,
    spill: Handle<i32>,
    bad_spills: HashSet<(i32, i32)>,
    out: Handle<i32>,
    previous: Option<(i32, i32)>,
    flagged: bool,
}

impl BadSpillFlag {
    pub fn new(
        run: Handle<i32>,
        spill: Handle<i32>,
        bad_spills: impl IntoIterator<Item = (i32, i32)>,
        out: Handle<i32>,
    ) -> Self {
        Self {
            run,
            spill,
            bad_spills: bad_spills.into_iter().collect(),
            out,
            previous: None,
            flagged: false,
        }
    }

    fn evaluate(&mut self, store: &mut ValueStore) -> AnalysisResult<()> {
        let key = (store.read(self.run)?, store.read(self.spill)?);
        if self.previous != Some(key) {
            self.previous = Some(key);
            self.flagged = self.bad_spills.contains(&key);
        }
        store.write(self.out, i32::from(self.flagged))
    }
}

/// A unit of per-record work: reads input slots and writes output slots.
#[derive(Debug, Clone, PartialEq)]
pub enum ComputationStep {
    /// Algebraic sum of scalars or four-vectors.
    Sum(SumStep),
    /// `sqrt(Σ xᵢ²)`.
    QuadratureSum {
        inputs: Vec<Handle<f64>>,
        out: Handle<f64>,
    },
    Difference {
        minuend: Handle<f64>,
        subtrahend: Handle<f64>,
        out: Handle<f64>,
    },
    AbsoluteValue {
        input: Handle<f64>,
        out: Handle<f64>,
    },
    RadiansToDegrees {
        input: Handle<f64>,
        out: Handle<f64>,
    },
    IntegerToFloat {
        input: Handle<i32>,
        out: Handle<f64>,
    },
    /// `numerator / denominator`, or [`DIVISION_SENTINEL`] for a zero denominator.
    Ratio {
        numerator: Handle<f64>,
        denominator: Handle<f64>,
        out: Handle<f64>,
    },
    Mass {
        input: Handle<FourVector>,
        out: Handle<f64>,
    },
    Energy {
        input: Handle<FourVector>,
        out: Handle<f64>,
    },
    BuildVector3 {
        x: Handle<f64>,
        y: Handle<f64>,
        z: Handle<f64>,
        out: Handle<Vector3>,
    },
    BuildFourVector {
        inputs: FourVectorInputs,
        out: Handle<FourVector>,
    },
    FourVectorAttributes {
        input: Handle<FourVector>,
        outputs: FourVectorAttributeOutputs,
    },
    /// `px/pz` and `py/pz`, or [`DIVISION_SENTINEL`] for both when `pz == 0`.
    GradXGradY {
        input: Handle<FourVector>,
        grad_x: Handle<f64>,
        grad_y: Handle<f64>,
    },
    /// See [`kinematics::beam_four_vector`].
    BeamFourVector {
        grad_x: Handle<f64>,
        grad_y: Handle<f64>,
        final_state: Handle<FourVector>,
        out: Handle<FourVector>,
        beam_mass: f64,
        target_mass: f64,
    },
    /// See [`kinematics::momentum_transfer`].
    MomentumTransfer {
        beam: Handle<FourVector>,
        final_state: Handle<FourVector>,
        t: Handle<f64>,
        t_min: Handle<f64>,
        t_prime: Handle<f64>,
    },
    BadSpillFlag(BadSpillFlag),
}

impl ComputationStep {
    /// Fails if `inputs` is empty.
    pub fn quadrature_sum(inputs: Vec<Handle<f64>>, out: Handle<f64>) -> AnalysisResult<Self> {
        if inputs.is_empty() {
            return Err(AnalysisError::invalid("sum2", "needs at least one summand"));
        }
        Ok(Self::QuadratureSum { inputs, out })
    }

    /// Short identifier used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Sum(_) => "sum",
            Self::QuadratureSum { .. } => "sum2",
            Self::Difference { .. } => "diff",
            Self::AbsoluteValue { .. } => "abs",
            Self::RadiansToDegrees { .. } => "rad_to_degree",
            Self::IntegerToFloat { .. } => "convert_int_to_double",
            Self::Ratio { .. } => "frac",
            Self::Mass { .. } => "mass",
            Self::Energy { .. } => "energy",
            Self::BuildVector3 { .. } => "get_vector3",
            Self::BuildFourVector { .. } => "get_lorentz_vec",
            Self::FourVectorAttributes { .. } => "get_lorentz_vector_attributes",
            Self::GradXGradY { .. } => "get_grad_x_grad_y",
            Self::BeamFourVector { .. } => "get_beam_lorentz_vector",
            Self::MomentumTransfer { .. } => "get_ts",
            Self::BadSpillFlag(_) => "get_bad_spill",
        }
    }

    /// Compute this step's outputs for the current record.
    pub fn evaluate(&mut self, store: &mut ValueStore) -> AnalysisResult<()> {
        match self {
            Self::Sum(sum) => sum.evaluate(store),
            Self::QuadratureSum { inputs, out } => {
                let mut acc = 0.0;
                for &h in inputs.iter() {
                    let v = store.read(h)?;
                    acc += v * v;
                }
                store.write(*out, acc.sqrt())
            }
            Self::Difference {
                minuend,
                subtrahend,
                out,
            } => {
                let v = store.read(*minuend)? - store.read(*subtrahend)?;
                store.write(*out, v)
            }
            Self::AbsoluteValue { input, out } => {
                let v = store.read(*input)?.abs();
                store.write(*out, v)
            }
            Self::RadiansToDegrees { input, out } => {
                let v = kinematics::radians_to_degrees(store.read(*input)?);
                store.write(*out, v)
            }
            Self::IntegerToFloat { input, out } => {
                let v = f64::from(store.read(*input)?);
                store.write(*out, v)
            }
            Self::Ratio {
                numerator,
                denominator,
                out,
            } => {
                let v = ratio(store.read(*numerator)?, store.read(*denominator)?);
                store.write(*out, v)
            }
            Self::Mass { input, out } => {
                let v = store.read(*input)?.m();
                store.write(*out, v)
            }
            Self::Energy { input, out } => {
                let v = store.read(*input)?.e;
                store.write(*out, v)
            }
            Self::BuildVector3 { x, y, z, out } => {
                let v = Vector3::new(store.read(*x)?, store.read(*y)?, store.read(*z)?);
                store.write(*out, v)
            }
            Self::BuildFourVector { inputs, out } => {
                let v = match inputs {
                    FourVectorInputs::XyzMass { x, y, z, mass } => FourVector::from_xyzm(
                        store.read(*x)?,
                        store.read(*y)?,
                        store.read(*z)?,
                        store.read(*mass)?,
                    ),
                    FourVectorInputs::PxPyPzE { px, py, pz, energy } => FourVector::new(
                        store.read(*px)?,
                        store.read(*py)?,
                        store.read(*pz)?,
                        store.read(*energy)?,
                    ),
                    FourVectorInputs::Vector3Mass { momentum, mass } => {
                        FourVector::from_vect_m(store.read(*momentum)?, store.read(*mass)?)
                    }
                    FourVectorInputs::Vector3Energy { momentum, energy } => {
                        FourVector::from_vect_e(store.read(*momentum)?, store.read(*energy)?)
                    }
                };
                store.write(*out, v)
            }
            Self::FourVectorAttributes { input, outputs } => {
                let v = store.read(*input)?;
                store.write(outputs.mass, v.m())?;
                store.write(outputs.energy, v.e)?;
                store.write(outputs.momentum, v.p())?;
                store.write(outputs.theta, v.theta())?;
                store.write(outputs.phi, v.phi())
            }
            Self::GradXGradY {
                input,
                grad_x,
                grad_y,
            } => {
                let v = store.read(*input)?;
                store.write(*grad_x, ratio(v.px, v.pz))?;
                store.write(*grad_y, ratio(v.py, v.pz))
            }
            Self::BeamFourVector {
                grad_x,
                grad_y,
                final_state,
                out,
                beam_mass,
                target_mass,
            } => {
                let beam = kinematics::beam_four_vector(
                    store.read(*grad_x)?,
                    store.read(*grad_y)?,
                    &store.read(*final_state)?,
                    *beam_mass,
                    *target_mass,
                );
                store.write(*out, beam)
            }
            Self::MomentumTransfer {
                beam,
                final_state,
                t,
                t_min,
                t_prime,
            } => {
                let (tv, tmin, tprime) =
                    kinematics::momentum_transfer(&store.read(*beam)?, &store.read(*final_state)?);
                store.write(*t, tv)?;
                store.write(*t_min, tmin)?;
                store.write(*t_prime, tprime)
            }
            Self::BadSpillFlag(flag) => flag.evaluate(store),
        }
    }
}

fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        DIVISION_SENTINEL
    } else {
        numerator / denominator
    }
}
