//! Turn declarations into store registrations, computation steps, cuts and plots.
//!
//! Every generator resolves all of its inputs before registering its outputs, so a declaration
//! can only read quantities declared before it.

use crate::accumulate::{Accumulator, Axis, Histogram1D, Histogram2D, Plot, Summary};
use crate::error::{AnalysisError, AnalysisResult};
use crate::kinematics::{FourVector, Vector3};
use crate::processing::{
    BadSpillFlag, ComputationStep, FourVectorAttributeOutputs, FourVectorInputs, Sum, SumStep,
};
use crate::selection::{
    Cut, CutMask, CutTest, EllipticCut, EqualityCut, EqualityOperands, RangeCut, Selector,
    TriggerMaskCut,
};
use crate::store::{Handle, StoreValue, ValueStore, indexed_name};
use crate::types::ValueType;

use super::{
    AxisDecl, CalculatedQuantity, Constants, CutDecl, CutTestDecl, FunctionDecl, MaskDecl, Operand,
    PlotDecl, PlotKindDecl, RawFields, Summands,
};

/// Register every raw field, expanding per-particle base names over `1..=number_of_particles`.
///
/// Returns the registered names in registration order.
pub fn register_raw_fields(
    store: &mut ValueStore,
    raw: &RawFields,
    number_of_particles: u32,
) -> AnalysisResult<Vec<String>> {
    let mut names = Vec::new();
    for (&value_type, fields) in &raw.one_per_event {
        check_raw_type(value_type, fields)?;
        for name in fields {
            store.insert_typed(name.clone(), value_type)?;
            names.push(name.clone());
        }
    }
    for (&value_type, fields) in &raw.one_per_particle {
        check_raw_type(value_type, fields)?;
        for base in fields {
            for i in 1..=number_of_particles {
                let name = indexed_name(base, i);
                store.insert_typed(name.clone(), value_type)?;
                names.push(name);
            }
        }
    }
    Ok(names)
}

fn check_raw_type(value_type: ValueType, fields: &[String]) -> AnalysisResult<()> {
    if value_type.is_scalar() {
        return Ok(());
    }
    Err(AnalysisError::invalid(
        fields.first().map(String::as_str).unwrap_or("raw_fields"),
        format!("raw fields of type {value_type} are not supported"),
    ))
}

/// Expand `indices` into the per-evaluation suffixes: `None` means "no suffix".
fn expand_indices(quantity: &str, indices: Option<&[u32]>) -> AnalysisResult<Vec<Option<u32>>> {
    match indices {
        None => Ok(vec![None]),
        Some([]) => Err(AnalysisError::invalid(quantity, "empty index list")),
        Some(list) => list
            .iter()
            .map(|&i| {
                if i == 0 {
                    Err(AnalysisError::invalid(quantity, "indices are 1-based"))
                } else {
                    Ok(Some(i))
                }
            })
            .collect(),
    }
}

fn with_index(name: &str, index: Option<u32>) -> String {
    match index {
        Some(i) => indexed_name(name, i),
        None => name.to_string(),
    }
}

fn variable<T: StoreValue>(store: &ValueStore, name: &str, index: Option<u32>) -> AnalysisResult<Handle<T>> {
    store.resolve::<T>(&with_index(name, index))
}

fn double_operand(store: &mut ValueStore, op: &Operand, index: Option<u32>) -> AnalysisResult<Handle<f64>> {
    match op {
        Operand::Int(v) => Ok(store.alloc(*v as f64)),
        Operand::Float(v) => Ok(store.alloc(*v)),
        Operand::Name(name) => variable(store, name, index),
    }
}

fn integer_constant<T: TryFrom<i64>>(op: &Operand) -> Option<T> {
    match *op {
        Operand::Int(v) => T::try_from(v).ok(),
        Operand::Float(v) if v.fract() == 0.0 && v.abs() < 9.0e15 => T::try_from(v as i64).ok(),
        _ => None,
    }
}

fn integer_operand<T>(store: &mut ValueStore, op: &Operand, index: Option<u32>) -> AnalysisResult<Handle<T>>
where
    T: StoreValue + TryFrom<i64>,
{
    match op {
        Operand::Name(name) => variable(store, name, index),
        constant => match integer_constant::<T>(constant) {
            Some(v) => Ok(store.alloc(v)),
            None => Err(AnalysisError::invalid(
                format!("{constant:?}"),
                format!("not a valid {} constant", T::TYPE),
            )),
        },
    }
}

fn expect_outputs<'a>(names: &'a [String], count: usize, function: &str) -> AnalysisResult<&'a [String]> {
    if names.len() == count {
        return Ok(names);
    }
    Err(AnalysisError::invalid(
        names.join(", "),
        format!("function '{function}' needs {count} output name(s), got {}", names.len()),
    ))
}

/// Build the computation steps of one calculated quantity, one per index.
pub fn generate_steps(
    store: &mut ValueStore,
    constants: &Constants,
    decl: &CalculatedQuantity,
) -> AnalysisResult<Vec<ComputationStep>> {
    let base_names = decl.name.to_vec();
    let label = base_names.join(", ");
    if base_names.is_empty() {
        return Err(AnalysisError::invalid("calculated_quantities", "missing output name"));
    }

    let mut steps = Vec::new();
    for index in expand_indices(&label, decl.indices.as_deref())? {
        let outputs: Vec<String> = base_names.iter().map(|n| with_index(n, index)).collect();
        steps.push(generate_step(store, constants, &decl.function, &outputs, index)?);
    }
    Ok(steps)
}

fn generate_step(
    store: &mut ValueStore,
    constants: &Constants,
    function: &FunctionDecl,
    outputs: &[String],
    index: Option<u32>,
) -> AnalysisResult<ComputationStep> {
    let fname = function.name();
    let single = || expect_outputs(outputs, 1, fname).map(|o| o[0].clone());

    Ok(match function {
        FunctionDecl::Sum {
            summands,
            subtrahends,
        } => {
            let out = single()?;
            ComputationStep::Sum(generate_sum(store, &out, summands.as_ref(), subtrahends.as_ref(), index)?)
        }
        FunctionDecl::Sum2 { summands } => {
            let out = single()?;
            let names = summand_names(&out, summands, index)?;
            let inputs = names
                .iter()
                .map(|n| store.resolve::<f64>(n))
                .collect::<AnalysisResult<Vec<_>>>()?;
            ComputationStep::quadrature_sum(inputs, store.insert(out)?)?
        }
        FunctionDecl::Diff {
            minuend,
            subtrahend,
        } => {
            let out = single()?;
            let minuend = double_operand(store, minuend, index)?;
            let subtrahend = double_operand(store, subtrahend, index)?;
            ComputationStep::Difference {
                minuend,
                subtrahend,
                out: store.insert(out)?,
            }
        }
        FunctionDecl::Abs { arg } => {
            let out = single()?;
            let input = double_operand(store, arg, index)?;
            ComputationStep::AbsoluteValue {
                input,
                out: store.insert(out)?,
            }
        }
        FunctionDecl::RadToDegree { angle } => {
            let out = single()?;
            let input = double_operand(store, angle, index)?;
            ComputationStep::RadiansToDegrees {
                input,
                out: store.insert(out)?,
            }
        }
        FunctionDecl::ConvertIntToDouble { int } => {
            let out = single()?;
            let input = variable::<i32>(store, int, index)?;
            ComputationStep::IntegerToFloat {
                input,
                out: store.insert(out)?,
            }
        }
        FunctionDecl::Frac {
            numerator,
            denominator,
        } => {
            let out = single()?;
            let numerator = double_operand(store, numerator, index)?;
            let denominator = double_operand(store, denominator, index)?;
            ComputationStep::Ratio {
                numerator,
                denominator,
                out: store.insert(out)?,
            }
        }
        FunctionDecl::Mass { vector } => {
            let out = single()?;
            let input = variable::<FourVector>(store, vector, index)?;
            ComputationStep::Mass {
                input,
                out: store.insert(out)?,
            }
        }
        FunctionDecl::Energy { vector } => {
            let out = single()?;
            let input = variable::<FourVector>(store, vector, index)?;
            ComputationStep::Energy {
                input,
                out: store.insert(out)?,
            }
        }
        FunctionDecl::GetVector3 { x, y, z } => {
            let out = single()?;
            let x = double_operand(store, x, index)?;
            let y = double_operand(store, y, index)?;
            let z = double_operand(store, z, index)?;
            ComputationStep::BuildVector3 {
                x,
                y,
                z,
                out: store.insert::<Vector3>(out)?,
            }
        }
        FunctionDecl::GetLorentzVec {
            x,
            y,
            z,
            px,
            py,
            pz,
            vec3,
            m,
            e,
        } => {
            let out = single()?;
            let missing = |what: &str| {
                AnalysisError::invalid(out.clone(), format!("'{fname}' with {what} is missing an argument"))
            };
            let inputs = match (x, px, vec3, m, e) {
                (Some(x), _, _, Some(m), _) => FourVectorInputs::XyzMass {
                    x: double_operand(store, x, index)?,
                    y: double_operand(store, y.as_ref().ok_or_else(|| missing("x, y, z, m"))?, index)?,
                    z: double_operand(store, z.as_ref().ok_or_else(|| missing("x, y, z, m"))?, index)?,
                    mass: double_operand(store, m, index)?,
                },
                (_, Some(px), _, _, Some(e)) => FourVectorInputs::PxPyPzE {
                    px: double_operand(store, px, index)?,
                    py: double_operand(store, py.as_ref().ok_or_else(|| missing("px, py, pz, e"))?, index)?,
                    pz: double_operand(store, pz.as_ref().ok_or_else(|| missing("px, py, pz, e"))?, index)?,
                    energy: double_operand(store, e, index)?,
                },
                (_, _, Some(v), Some(m), _) => FourVectorInputs::Vector3Mass {
                    momentum: variable(store, v, index)?,
                    mass: double_operand(store, m, index)?,
                },
                (_, _, Some(v), _, Some(e)) => FourVectorInputs::Vector3Energy {
                    momentum: variable(store, v, index)?,
                    energy: double_operand(store, e, index)?,
                },
                _ => {
                    return Err(AnalysisError::invalid(
                        out,
                        "'get_lorentz_vec' needs one of (x, y, z, m), (px, py, pz, e), (vec3, m) or (vec3, e)",
                    ));
                }
            };
            ComputationStep::BuildFourVector {
                inputs,
                out: store.insert(out)?,
            }
        }
        FunctionDecl::GetLorentzVectorAttributes { vector } => {
            let names = expect_outputs(outputs, 5, fname)?;
            let input = variable::<FourVector>(store, vector, index)?;
            ComputationStep::FourVectorAttributes {
                input,
                outputs: FourVectorAttributeOutputs {
                    mass: store.insert(names[0].clone())?,
                    energy: store.insert(names[1].clone())?,
                    momentum: store.insert(names[2].clone())?,
                    theta: store.insert(names[3].clone())?,
                    phi: store.insert(names[4].clone())?,
                },
            }
        }
        FunctionDecl::GetGradXGradY { vector } => {
            let names = expect_outputs(outputs, 2, fname)?;
            let input = variable::<FourVector>(store, vector, index)?;
            ComputationStep::GradXGradY {
                input,
                grad_x: store.insert(names[0].clone())?,
                grad_y: store.insert(names[1].clone())?,
            }
        }
        FunctionDecl::GetBeamLorentzVector {
            grad_x,
            grad_y,
            final_state,
            beam_mass,
            target_mass,
        } => {
            let out = single()?;
            let grad_x = double_operand(store, grad_x, index)?;
            let grad_y = double_operand(store, grad_y, index)?;
            let final_state = variable::<FourVector>(store, final_state, index)?;
            ComputationStep::BeamFourVector {
                grad_x,
                grad_y,
                final_state,
                out: store.insert(out)?,
                beam_mass: beam_mass.unwrap_or(constants.charged_pion_mass),
                target_mass: target_mass.unwrap_or(constants.proton_mass),
            }
        }
        FunctionDecl::GetTs { beam, final_state } => {
            let names = expect_outputs(outputs, 3, fname)?;
            let beam = variable::<FourVector>(store, beam, index)?;
            let final_state = variable::<FourVector>(store, final_state, index)?;
            ComputationStep::MomentumTransfer {
                beam,
                final_state,
                t: store.insert(names[0].clone())?,
                t_min: store.insert(names[1].clone())?,
                t_prime: store.insert(names[2].clone())?,
            }
        }
        FunctionDecl::GetBadSpill {
            run,
            spill,
            bad_spills,
        } => {
            let out = single()?;
            let run = variable::<i32>(store, run, index)?;
            let spill = variable::<i32>(store, spill, index)?;
            ComputationStep::BadSpillFlag(BadSpillFlag::new(
                run,
                spill,
                bad_spills.iter().copied(),
                store.insert(out)?,
            ))
        }
    })
}

fn summand_names(out: &str, summands: &Summands, index: Option<u32>) -> AnalysisResult<Vec<String>> {
    match summands {
        Summands::Names(names) => Ok(names.iter().map(|n| with_index(n, index)).collect()),
        Summands::Indexed { .. } if index.is_some() => Err(AnalysisError::invalid(
            out,
            "a sum over indices cannot itself be evaluated per particle",
        )),
        Summands::Indexed { name, indices } => {
            if indices.contains(&0) {
                return Err(AnalysisError::invalid(out, "indices are 1-based"));
            }
            Ok(indices.iter().map(|&i| indexed_name(name, i)).collect())
        }
    }
}

fn generate_sum(
    store: &mut ValueStore,
    out: &str,
    summands: Option<&Summands>,
    subtrahends: Option<&Summands>,
    index: Option<u32>,
) -> AnalysisResult<SumStep> {
    let addends = match summands {
        Some(s) => summand_names(out, s, index)?,
        None => Vec::new(),
    };
    let subtrahends = match subtrahends {
        Some(s) => summand_names(out, s, index)?,
        None => Vec::new(),
    };
    let Some(first) = addends.first().or(subtrahends.first()) else {
        return Err(AnalysisError::invalid(out, "needs at least one summand or subtrahend"));
    };
    let value_type = store.value_type(first).ok_or_else(|| AnalysisError::UnknownName {
        name: first.clone(),
    })?;

    fn typed<T: crate::processing::Summable>(
        store: &mut ValueStore,
        out: &str,
        addends: &[String],
        subtrahends: &[String],
    ) -> AnalysisResult<Sum<T>> {
        let resolve = |names: &[String]| -> AnalysisResult<Vec<Handle<T>>> {
            names.iter().map(|n| store.resolve::<T>(n)).collect()
        };
        let a = resolve(addends)?;
        let s = resolve(subtrahends)?;
        Sum::new(a, s, store.insert(out)?)
    }

    Ok(match value_type {
        ValueType::Int32 => SumStep::Int32(typed(store, out, &addends, &subtrahends)?),
        ValueType::Int64 => SumStep::Int64(typed(store, out, &addends, &subtrahends)?),
        ValueType::Float64 => SumStep::Float64(typed(store, out, &addends, &subtrahends)?),
        ValueType::FourVector => SumStep::FourVector(typed(store, out, &addends, &subtrahends)?),
        other => {
            return Err(AnalysisError::invalid(out, format!("'sum' does not support type {other}")));
        }
    })
}

/// Build one cut (and, for groups, its children).
pub fn generate_cut(store: &mut ValueStore, decl: &CutDecl) -> AnalysisResult<Cut> {
    let test = match &decl.test {
        CutTestDecl::Range {
            variable: name,
            lower,
            upper,
            mode,
        } => {
            let value = variable::<f64>(store, name, None)?;
            let lower = lower.as_ref().map(|op| double_operand(store, op, None)).transpose()?;
            let upper = upper.as_ref().map(|op| double_operand(store, op, None)).transpose()?;
            CutTest::Range(RangeCut::new(value, lower, upper, *mode)?)
        }
        CutTestDecl::Equality { left, right, mode } => {
            let operand_type = [left, right]
                .into_iter()
                .find_map(|op| match op {
                    Operand::Name(n) => Some(store.value_type(n).ok_or_else(|| AnalysisError::UnknownName {
                        name: n.clone(),
                    })),
                    _ => None,
                })
                .transpose()?
                .unwrap_or(ValueType::Float64);
            let operands = match operand_type {
                ValueType::Int32 => EqualityOperands::Int32(
                    integer_operand(store, left, None)?,
                    integer_operand(store, right, None)?,
                ),
                ValueType::Int64 => EqualityOperands::Int64(
                    integer_operand(store, left, None)?,
                    integer_operand(store, right, None)?,
                ),
                ValueType::Float64 => EqualityOperands::Float64(
                    double_operand(store, left, None)?,
                    double_operand(store, right, None)?,
                ),
                other => {
                    return Err(AnalysisError::invalid(
                        &decl.short_name,
                        format!("equality cuts do not support type {other}"),
                    ));
                }
            };
            CutTest::Equality(EqualityCut { operands, mode: *mode })
        }
        CutTestDecl::Elliptic {
            x,
            y,
            mean_x,
            mean_y,
            cut_x,
            cut_y,
            phi,
            mode,
        } => CutTest::Elliptic(EllipticCut {
            x: double_operand(store, x, None)?,
            y: double_operand(store, y, None)?,
            mean_x: double_operand(store, mean_x, None)?,
            mean_y: double_operand(store, mean_y, None)?,
            cut_x: double_operand(store, cut_x, None)?,
            cut_y: double_operand(store, cut_y, None)?,
            phi: double_operand(store, phi, None)?,
            mode: *mode,
        }),
        CutTestDecl::TriggerMask { mask, trigger } => CutTest::TriggerMask(TriggerMaskCut {
            mask: variable::<i32>(store, mask, None)?,
            trigger: integer_operand(store, trigger, None)?,
        }),
        CutTestDecl::Group { mode, cuts } => {
            let children = cuts
                .iter()
                .map(|child| generate_cut(store, child))
                .collect::<AnalysisResult<Vec<_>>>()?;
            CutTest::Group {
                mode: *mode,
                children,
            }
        }
        CutTestDecl::NoCut => CutTest::Always,
    };
    Ok(Cut::new(
        store,
        decl.short_name.clone(),
        decl.long_name.clone(),
        decl.abbreviation.clone(),
        test,
    ))
}

fn scalar_source(store: &ValueStore, name: &str) -> AnalysisResult<crate::store::ScalarHandle> {
    let handle = store.any_address(name).ok_or_else(|| AnalysisError::UnknownName {
        name: name.to_string(),
    })?;
    handle.scalar().ok_or_else(|| {
        AnalysisError::invalid(name, format!("cannot plot a {} variable", handle.value_type()))
    })
}

fn axis(decl: &AxisDecl) -> AnalysisResult<Axis> {
    Axis::new(decl.bins, decl.low, decl.high)
}

/// Build the plots of one declaration, one per index.
pub fn generate_plots(store: &ValueStore, selector: &Selector, decl: &PlotDecl) -> AnalysisResult<Vec<Plot>> {
    let masks = decl
        .cuts
        .iter()
        .map(|m| match m {
            MaskDecl::Bits(bits) => Ok(CutMask::new(*bits)),
            MaskDecl::Cuts(names) => selector.mask_for(names.as_slice()),
        })
        .collect::<AnalysisResult<Vec<_>>>()?;

    let mut plots = Vec::new();
    for index in expand_indices(&decl.name, decl.indices.as_deref())? {
        let name = with_index(&decl.name, index);
        let title = decl.title.clone().unwrap_or_else(|| name.clone());
        let (template, sources): (Box<dyn Accumulator>, Vec<_>) = match &decl.kind {
            PlotKindDecl::Histogram1d {
                variable,
                bins,
                low,
                high,
            } => (
                Box::new(Histogram1D::new(&name, &title, Axis::new(*bins, *low, *high)?)) as Box<dyn Accumulator>,
                vec![scalar_source(store, &with_index(variable, index))?],
            ),
            PlotKindDecl::Histogram2d { x, y } => (
                Box::new(Histogram2D::new(&name, &title, axis(x)?, axis(y)?)) as Box<dyn Accumulator>,
                vec![
                    scalar_source(store, &with_index(&x.variable, index))?,
                    scalar_source(store, &with_index(&y.variable, index))?,
                ],
            ),
            PlotKindDecl::Summary { variable } => (
                Box::new(Summary::new(&name, &title)) as Box<dyn Accumulator>,
                vec![scalar_source(store, &with_index(variable, index))?],
            ),
        };
        plots.push(Plot::new(template, sources, masks.clone(), selector)?);
    }
    Ok(plots)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Names;

    fn quantity(json: &str) -> CalculatedQuantity {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn raw_fields_expand_per_particle() {
        let raw: RawFields = serde_json::from_str(
            r#"{"one_per_event": {"int": ["Run"]}, "one_per_particle": {"double": ["X"]}}"#,
        )
        .unwrap();
        let mut store = ValueStore::new();
        let names = register_raw_fields(&mut store, &raw, 3).unwrap();
        assert_eq!(names, vec!["Run", "X1", "X2", "X3"]);
        assert_eq!(store.value_type("X3"), Some(ValueType::Float64));
        assert_eq!(store.value_type("X4"), None);
    }

    #[test]
    fn indices_expand_outputs_and_arguments_in_order() {
        let mut store = ValueStore::new();
        for n in ["X1", "X2", "X3"] {
            store.insert::<f64>(n).unwrap();
        }
        let steps = generate_steps(
            &mut store,
            &Constants::default(),
            &quantity(r#"{"name": "absX", "indices": [3, 1], "function": {"name": "abs", "arg": "X"}}"#),
        )
        .unwrap();
        assert_eq!(steps.len(), 2);
        let order: Vec<_> = store.names().filter(|n| n.starts_with("absX")).collect();
        assert_eq!(order, vec!["absX3", "absX1"]);
        let x3 = store.address::<f64>("X3").unwrap();
        assert!(matches!(steps[0], ComputationStep::AbsoluteValue { input, .. } if input == x3));
    }

    #[test]
    fn sum_type_follows_first_operand() {
        let mut store = ValueStore::new();
        store.insert::<FourVector>("P1").unwrap();
        store.insert::<FourVector>("P2").unwrap();
        let steps = generate_steps(
            &mut store,
            &Constants::default(),
            &quantity(
                r#"{"name": "PSum", "function": {"name": "sum", "summands": {"name": "P", "indices": [1, 2]}}}"#,
            ),
        )
        .unwrap();
        assert!(matches!(steps[0], ComputationStep::Sum(SumStep::FourVector(_))));
        assert_eq!(store.value_type("PSum"), Some(ValueType::FourVector));
    }

    #[test]
    fn indexed_sum_per_particle_is_rejected() {
        let mut store = ValueStore::new();
        store.insert::<f64>("E1").unwrap();
        let decl = quantity(
            r#"{"name": "s", "indices": [1], "function": {"name": "sum", "summands": {"name": "E", "indices": [1]}}}"#,
        );
        let err = generate_steps(&mut store, &Constants::default(), &decl).unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidDeclaration { .. }));
        assert!(!store.contains("s1"));
    }

    #[test]
    fn output_count_is_checked() {
        let mut store = ValueStore::new();
        store.insert::<FourVector>("P").unwrap();
        let decl = CalculatedQuantity {
            name: Names::Many(vec!["t".into(), "tMin".into()]),
            indices: None,
            function: FunctionDecl::GetTs {
                beam: "P".into(),
                final_state: "P".into(),
            },
        };
        assert!(generate_steps(&mut store, &Constants::default(), &decl).is_err());
    }

    #[test]
    fn beam_masses_default_to_constants() {
        let mut store = ValueStore::new();
        store.insert::<f64>("gradX").unwrap();
        store.insert::<f64>("gradY").unwrap();
        store.insert::<FourVector>("PX").unwrap();
        let steps = generate_steps(
            &mut store,
            &Constants::default(),
            &quantity(
                r#"{"name": "Beam", "function": {"name": "get_beam_lorentz_vector",
                    "grad_x": "gradX", "grad_y": "gradY", "final_state": "PX"}}"#,
            ),
        )
        .unwrap();
        match &steps[0] {
            ComputationStep::BeamFourVector {
                beam_mass,
                target_mass,
                ..
            } => {
                assert_eq!(*beam_mass, 0.13957018);
                assert_eq!(*target_mass, 0.938272046);
            }
            other => panic!("unexpected step {other:?}"),
        }
    }

    #[test]
    fn lorentz_vec_needs_a_complete_mode() {
        let mut store = ValueStore::new();
        store.insert::<f64>("X").unwrap();
        let decl = quantity(r#"{"name": "P", "function": {"name": "get_lorentz_vec", "x": "X", "m": 0.1}}"#);
        assert!(generate_steps(&mut store, &Constants::default(), &decl).is_err());
        let decl = quantity(r#"{"name": "P", "function": {"name": "get_lorentz_vec", "x": "X"}}"#);
        assert!(generate_steps(&mut store, &Constants::default(), &decl).is_err());
    }

    #[test]
    fn equality_cut_type_follows_variable() {
        let mut store = ValueStore::new();
        store.insert::<i64>("EvNbr").unwrap();
        let decl: CutDecl = serde_json::from_str(
            r#"{"short_name": "ev", "type": "equality", "left": "EvNbr", "right": 12, "mode": "not_equal"}"#,
        )
        .unwrap();
        let cut = generate_cut(&mut store, &decl).unwrap();
        assert!(matches!(
            cut.test(),
            CutTest::Equality(EqualityCut { operands: EqualityOperands::Int64(..), .. })
        ));

        let decl: CutDecl = serde_json::from_str(
            r#"{"short_name": "ev", "type": "equality", "left": "EvNbr", "right": 1.5}"#,
        )
        .unwrap();
        assert!(generate_cut(&mut store, &decl).is_err());
    }

    #[test]
    fn group_cut_builds_children() {
        let mut store = ValueStore::new();
        store.insert::<f64>("t").unwrap();
        let decl: CutDecl = serde_json::from_str(
            r#"{"short_name": "g", "type": "group", "mode": "or", "cuts": [
                {"short_name": "lo", "type": "range", "variable": "t", "upper": 0.1, "mode": "open_low_exclusive"},
                {"short_name": "hi", "type": "range", "variable": "t", "lower": 1.0, "mode": "open_high_inclusive"}
            ]}"#,
        )
        .unwrap();
        let cut = generate_cut(&mut store, &decl).unwrap();
        match cut.test() {
            CutTest::Group { children, .. } => assert_eq!(children.len(), 2),
            other => panic!("unexpected test {other:?}"),
        }
    }

    #[test]
    fn plots_resolve_masks_by_name() {
        let mut store = ValueStore::new();
        store.insert::<f64>("m1").unwrap();
        store.insert::<f64>("m2").unwrap();
        let mut selector = Selector::new();
        selector.push(Cut::new(&mut store, "all", "all", "A", CutTest::Always)).unwrap();
        let decl: PlotDecl = serde_json::from_str(
            r#"{"name": "hM", "type": "histogram1d", "variable": "m", "bins": 4, "low": 0, "high": 1,
                "indices": [1, 2], "cuts": [["all"]]}"#,
        )
        .unwrap();
        let plots = generate_plots(&store, &selector, &decl).unwrap();
        assert_eq!(plots.len(), 2);
        assert_eq!(plots[1].name(), "hM2");
        assert_eq!(plots[1].masks(), &[CutMask::new(1), CutMask::NONE]);
    }
}
