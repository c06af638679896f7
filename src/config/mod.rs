//! Declarative analysis description.
//!
//! An [`AnalysisConfig`] is usually read from JSON and turned into a runnable
//! [`crate::analysis::Analysis`] by the [`Initializer`]:
//!
//! ```rust
//! use rust_event_selection::config::Initializer;
//!
//! let json = r#"{
//!     "number_of_particles": 1,
//!     "raw_fields": { "one_per_particle": { "double": ["X", "Y", "Z"] } },
//!     "calculated_quantities": [
//!         { "name": "P", "indices": [1],
//!           "function": { "name": "get_lorentz_vec", "x": "X", "y": "Y", "z": "Z", "m": 0.139 } },
//!         { "name": "mass", "indices": [1], "function": { "name": "mass", "vector": "P" } }
//!     ],
//!     "cuts": [
//!         { "short_name": "pion", "long_name": "pion mass", "abbreviation": "pi",
//!           "type": "range", "variable": "mass1", "lower": 0.1, "upper": 0.2, "mode": "inclusive" }
//!     ]
//! }"#;
//!
//! let analysis = Initializer::from_json_str(json).unwrap().build().unwrap();
//! assert_eq!(analysis.selector().len(), 1);
//! assert!(analysis.store().contains("mass1"));
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::selection::{EllipticMode, EqualityMode, GroupMode, RangeMode};
use crate::types::ValueType;

pub mod generators;
pub mod initializer;

pub use initializer::Initializer;

/// Top-level analysis description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Number of sub-objects (particles) per record; per-particle fields are expanded `1..=N`.
    pub number_of_particles: u32,
    #[serde(default)]
    pub constants: Constants,
    pub raw_fields: RawFields,
    #[serde(default)]
    pub calculated_quantities: Vec<CalculatedQuantity>,
    #[serde(default)]
    pub cuts: Vec<CutDecl>,
    #[serde(default)]
    pub plots: Vec<PlotDecl>,
}

/// Physics constants in GeV.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Constants {
    pub charged_pion_mass: f64,
    pub charged_kaon_mass: f64,
    pub proton_mass: f64,
}

impl Default for Constants {
    fn default() -> Self {
        Self {
            charged_pion_mass: 0.13957018,
            charged_kaon_mass: 0.493677,
            proton_mass: 0.938272046,
        }
    }
}

/// Fields a record source provides, grouped by type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawFields {
    pub one_per_event: BTreeMap<ValueType, Vec<String>>,
    /// Base names; `"X"` becomes `"X1"`..`"XN"`.
    pub one_per_particle: BTreeMap<ValueType, Vec<String>>,
}

/// A single name or a list of names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Names {
    One(String),
    Many(Vec<String>),
}

impl Names {
    pub fn to_vec(&self) -> Vec<String> {
        match self {
            Self::One(n) => vec![n.clone()],
            Self::Many(v) => v.clone(),
        }
    }
}

/// A constant or the name of a variable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Operand {
    Int(i64),
    Float(f64),
    Name(String),
}

/// Operands of a sum: explicit names, or one base name expanded over sub-object indices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Summands {
    Names(Vec<String>),
    Indexed { name: String, indices: Vec<u32> },
}

/// One derived quantity (or a group of outputs of one function).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculatedQuantity {
    pub name: Names,
    /// Evaluate once per listed sub-object index, suffixing outputs and variable arguments.
    #[serde(default)]
    pub indices: Option<Vec<u32>>,
    pub function: FunctionDecl,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "name", rename_all = "snake_case")]
pub enum FunctionDecl {
    Sum {
        #[serde(default)]
        summands: Option<Summands>,
        #[serde(default)]
        subtrahends: Option<Summands>,
    },
    Sum2 {
        summands: Summands,
    },
    Diff {
        minuend: Operand,
        subtrahend: Operand,
    },
    Abs {
        arg: Operand,
    },
    RadToDegree {
        angle: Operand,
    },
    ConvertIntToDouble {
        int: String,
    },
    Frac {
        numerator: Operand,
        denominator: Operand,
    },
    Mass {
        vector: String,
    },
    Energy {
        vector: String,
    },
    GetVector3 {
        x: Operand,
        y: Operand,
        z: Operand,
    },
    /// Exactly one of `(x, y, z, m)`, `(px, py, pz, e)`, `(vec3, m)` or `(vec3, e)`.
    GetLorentzVec {
        #[serde(default)]
        x: Option<Operand>,
        #[serde(default)]
        y: Option<Operand>,
        #[serde(default)]
        z: Option<Operand>,
        #[serde(default)]
        px: Option<Operand>,
        #[serde(default)]
        py: Option<Operand>,
        #[serde(default)]
        pz: Option<Operand>,
        #[serde(default)]
        vec3: Option<String>,
        #[serde(default)]
        m: Option<Operand>,
        #[serde(default)]
        e: Option<Operand>,
    },
    GetLorentzVectorAttributes {
        vector: String,
    },
    GetGradXGradY {
        vector: String,
    },
    /// Beam and target masses default to the charged pion and proton masses.
    GetBeamLorentzVector {
        grad_x: Operand,
        grad_y: Operand,
        final_state: String,
        #[serde(default)]
        beam_mass: Option<f64>,
        #[serde(default)]
        target_mass: Option<f64>,
    },
    GetTs {
        beam: String,
        final_state: String,
    },
    GetBadSpill {
        run: String,
        spill: String,
        /// `[run, spill]` pairs.
        bad_spills: Vec<(i32, i32)>,
    },
}

impl FunctionDecl {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Sum { .. } => "sum",
            Self::Sum2 { .. } => "sum2",
            Self::Diff { .. } => "diff",
            Self::Abs { .. } => "abs",
            Self::RadToDegree { .. } => "rad_to_degree",
            Self::ConvertIntToDouble { .. } => "convert_int_to_double",
            Self::Frac { .. } => "frac",
            Self::Mass { .. } => "mass",
            Self::Energy { .. } => "energy",
            Self::GetVector3 { .. } => "get_vector3",
            Self::GetLorentzVec { .. } => "get_lorentz_vec",
            Self::GetLorentzVectorAttributes { .. } => "get_lorentz_vector_attributes",
            Self::GetGradXGradY { .. } => "get_grad_x_grad_y",
            Self::GetBeamLorentzVector { .. } => "get_beam_lorentz_vector",
            Self::GetTs { .. } => "get_ts",
            Self::GetBadSpill { .. } => "get_bad_spill",
        }
    }
}

/// A named cut.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CutDecl {
    pub short_name: String,
    #[serde(default)]
    pub long_name: String,
    #[serde(default)]
    pub abbreviation: String,
    #[serde(flatten)]
    pub test: CutTestDecl,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CutTestDecl {
    Range {
        variable: String,
        #[serde(default)]
        lower: Option<Operand>,
        #[serde(default)]
        upper: Option<Operand>,
        mode: RangeMode,
    },
    /// Operand type follows whichever side names a variable; two constants compare as doubles.
    Equality {
        left: Operand,
        right: Operand,
        #[serde(default)]
        mode: EqualityMode,
    },
    Elliptic {
        x: Operand,
        y: Operand,
        mean_x: Operand,
        mean_y: Operand,
        cut_x: Operand,
        cut_y: Operand,
        #[serde(default = "zero")]
        phi: Operand,
        #[serde(default)]
        mode: EllipticMode,
    },
    TriggerMask {
        mask: String,
        trigger: Operand,
    },
    Group {
        mode: GroupMode,
        cuts: Vec<CutDecl>,
    },
    NoCut,
}

fn zero() -> Operand {
    Operand::Float(0.0)
}

/// Fixed-width axis of a histogram.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisDecl {
    pub variable: String,
    pub bins: usize,
    pub low: f64,
    pub high: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PlotKindDecl {
    Histogram1d {
        variable: String,
        bins: usize,
        low: f64,
        high: f64,
    },
    Histogram2d {
        x: AxisDecl,
        y: AxisDecl,
    },
    Summary {
        variable: String,
    },
}

/// A required cut mask: raw bits or cut short names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MaskDecl {
    Bits(u64),
    Cuts(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlotDecl {
    pub name: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(flatten)]
    pub kind: PlotKindDecl,
    /// One plot per index, with the index appended to its name and variables.
    #[serde(default)]
    pub indices: Option<Vec<u32>>,
    #[serde(default)]
    pub cuts: Vec<MaskDecl>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constants_default_to_pdg_values() {
        let c: Constants = serde_json::from_str("{\"proton_mass\": 0.9}").unwrap();
        assert_eq!(c.proton_mass, 0.9);
        assert_eq!(c.charged_pion_mass, 0.13957018);
        assert_eq!(c.charged_kaon_mass, 0.493677);
    }

    #[test]
    fn operands_and_summands_are_untagged() {
        let ops: Vec<Operand> = serde_json::from_str("[3, 0.5, \"X\"]").unwrap();
        assert_eq!(ops, vec![Operand::Int(3), Operand::Float(0.5), Operand::Name("X".into())]);

        let s: Summands = serde_json::from_str("[\"P1\", \"P2\"]").unwrap();
        assert_eq!(s, Summands::Names(vec!["P1".into(), "P2".into()]));
        let s: Summands = serde_json::from_str("{\"name\": \"P\", \"indices\": [1, 3]}").unwrap();
        assert_eq!(s, Summands::Indexed { name: "P".into(), indices: vec![1, 3] });
    }

    #[test]
    fn functions_and_cuts_are_tagged() {
        let q: CalculatedQuantity = serde_json::from_str(
            r#"{"name": ["t", "tMin", "tPrime"], "function": {"name": "get_ts", "beam": "B", "final_state": "X"}}"#,
        )
        .unwrap();
        assert_eq!(q.name.to_vec().len(), 3);
        assert_eq!(q.function.name(), "get_ts");

        let c: CutDecl = serde_json::from_str(
            r#"{"short_name": "trig", "type": "trigger_mask", "mask": "TrigMask", "trigger": 1}"#,
        )
        .unwrap();
        assert_eq!(c.abbreviation, "");
        assert!(matches!(c.test, CutTestDecl::TriggerMask { .. }));

        let c: CutDecl = serde_json::from_str(r#"{"short_name": "all", "type": "no_cut"}"#).unwrap();
        assert_eq!(c.test, CutTestDecl::NoCut);
    }

    #[test]
    fn raw_field_types_use_description_keywords() {
        let r: RawFields = serde_json::from_str(
            r#"{"one_per_event": {"int": ["Run"], "Long64_t": ["EvNbr"]}, "one_per_particle": {"double": ["X"]}}"#,
        )
        .unwrap();
        assert_eq!(r.one_per_event[&ValueType::Int64], vec!["EvNbr".to_string()]);
        assert_eq!(r.one_per_particle[&ValueType::Float64], vec!["X".to_string()]);
    }

    #[test]
    fn plot_masks_accept_bits_or_names() {
        let p: PlotDecl = serde_json::from_str(
            r#"{"name": "hM", "type": "histogram1d", "variable": "mass1", "bins": 10, "low": 0, "high": 1,
                "cuts": [3, ["pion"]]}"#,
        )
        .unwrap();
        assert_eq!(p.cuts, vec![MaskDecl::Bits(3), MaskDecl::Cuts(vec!["pion".into()])]);
        assert!(matches!(p.kind, PlotKindDecl::Histogram1d { bins: 10, .. }));
    }
}
