//! Boolean predicates over store values.

use serde::{Deserialize, Serialize};

use crate::error::{AnalysisError, AnalysisResult};
use crate::store::{Handle, ValueStore};

/// Which bounds a [`RangeCut`] tests and whether they are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RangeMode {
    /// `lower < x < upper`
    Exclusive,
    /// `lower <= x <= upper`
    Inclusive,
    /// `x < upper`
    OpenLowExclusive,
    /// `x <= upper`
    OpenLowInclusive,
    /// `x > lower`
    OpenHighExclusive,
    /// `x >= lower`
    OpenHighInclusive,
}

impl RangeMode {
    fn needs_lower(self) -> bool {
        matches!(
            self,
            Self::Exclusive | Self::Inclusive | Self::OpenHighExclusive | Self::OpenHighInclusive
        )
    }

    fn needs_upper(self) -> bool {
        matches!(
            self,
            Self::Exclusive | Self::Inclusive | Self::OpenLowExclusive | Self::OpenLowInclusive
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RangeCut {
    value: Handle<f64>,
    lower: Option<Handle<f64>>,
    upper: Option<Handle<f64>>,
    mode: RangeMode,
}

impl RangeCut {
    /// Fails if `mode` needs a bound that is not given.
    pub fn new(
        value: Handle<f64>,
        lower: Option<Handle<f64>>,
        upper: Option<Handle<f64>>,
        mode: RangeMode,
    ) -> AnalysisResult<Self> {
        if mode.needs_lower() && lower.is_none() {
            return Err(AnalysisError::invalid("range", format!("mode {mode:?} needs a lower bound")));
        }
        if mode.needs_upper() && upper.is_none() {
            return Err(AnalysisError::invalid("range", format!("mode {mode:?} needs an upper bound")));
        }
        Ok(Self {
            value,
            lower,
            upper,
            mode,
        })
    }

    fn bound(store: &ValueStore, bound: Option<Handle<f64>>, which: &str) -> AnalysisResult<f64> {
        match bound {
            Some(h) => store.read(h),
            None => Err(AnalysisError::invalid("range", format!("missing {which} bound"))),
        }
    }

    fn test(&self, store: &ValueStore) -> AnalysisResult<bool> {
        let x = store.read(self.value)?;
        let lower = || Self::bound(store, self.lower, "lower");
        let upper = || Self::bound(store, self.upper, "upper");
        Ok(match self.mode {
            RangeMode::Exclusive => x > lower()? && x < upper()?,
            RangeMode::Inclusive => x >= lower()? && x <= upper()?,
            RangeMode::OpenLowExclusive => x < upper()?,
            RangeMode::OpenLowInclusive => x <= upper()?,
            RangeMode::OpenHighExclusive => x > lower()?,
            RangeMode::OpenHighInclusive => x >= lower()?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EqualityMode {
    #[default]
    Equal,
    NotEqual,
}

/// Two operands of the same scalar type.
#[derive(Debug, Clone, PartialEq)]
pub enum EqualityOperands {
    Int32(Handle<i32>, Handle<i32>),
    Int64(Handle<i64>, Handle<i64>),
    Float64(Handle<f64>, Handle<f64>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct EqualityCut {
    pub operands: EqualityOperands,
    pub mode: EqualityMode,
}

impl EqualityCut {
    fn test(&self, store: &ValueStore) -> AnalysisResult<bool> {
        let equal = match self.operands {
            EqualityOperands::Int32(l, r) => store.read(l)? == store.read(r)?,
            EqualityOperands::Int64(l, r) => store.read(l)? == store.read(r)?,
            EqualityOperands::Float64(l, r) => store.read(l)? == store.read(r)?,
        };
        Ok(match self.mode {
            EqualityMode::Equal => equal,
            EqualityMode::NotEqual => !equal,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EllipticMode {
    /// Boundary counts as inside.
    #[default]
    Inclusive,
    Exclusive,
}

/// Rotated-ellipse acceptance region in the `(x, y)` plane.
#[derive(Debug, Clone, PartialEq)]
pub struct EllipticCut {
    pub x: Handle<f64>,
    pub y: Handle<f64>,
    pub mean_x: Handle<f64>,
    pub mean_y: Handle<f64>,
    pub cut_x: Handle<f64>,
    pub cut_y: Handle<f64>,
    pub phi: Handle<f64>,
    pub mode: EllipticMode,
}

impl EllipticCut {
    fn test(&self, store: &ValueStore) -> AnalysisResult<bool> {
        let dx = store.read(self.x)? - store.read(self.mean_x)?;
        let dy = store.read(self.y)? - store.read(self.mean_y)?;
        let (sin, cos) = store.read(self.phi)?.sin_cos();
        let xr = dx * cos - dy * sin;
        let yr = dy * cos + dx * sin;
        let r = (xr / store.read(self.cut_x)?).powi(2) + (yr / store.read(self.cut_y)?).powi(2);
        Ok(match self.mode {
            EllipticMode::Inclusive => r <= 1.0,
            EllipticMode::Exclusive => r < 1.0,
        })
    }
}

/// `(mask & trigger) != 0`.
#[derive(Debug, Clone, PartialEq)]
pub struct TriggerMaskCut {
    pub mask: Handle<i32>,
    pub trigger: Handle<i32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupMode {
    And,
    Or,
    /// Negated AND.
    Nand,
}

/// What a [`Cut`] tests.
#[derive(Debug, Clone)]
pub enum CutTest {
    Range(RangeCut),
    Equality(EqualityCut),
    Elliptic(EllipticCut),
    TriggerMask(TriggerMaskCut),
    /// Every child is evaluated (and its result written) before combining.
    Group { mode: GroupMode, children: Vec<Cut> },
    Always,
}

impl CutTest {
    /// Structural equality: same variant, handles and mode. Names and results are ignored.
    pub fn is_equivalent(&self, other: &CutTest) -> bool {
        match (self, other) {
            (Self::Range(a), Self::Range(b)) => a == b,
            (Self::Equality(a), Self::Equality(b)) => a == b,
            (Self::Elliptic(a), Self::Elliptic(b)) => a == b,
            (Self::TriggerMask(a), Self::TriggerMask(b)) => a == b,
            (
                Self::Group { mode: ma, children: ca },
                Self::Group { mode: mb, children: cb },
            ) => {
                ma == mb
                    && ca.len() == cb.len()
                    && ca.iter().zip(cb).all(|(a, b)| a.test.is_equivalent(&b.test))
            }
            (Self::Always, Self::Always) => true,
            _ => false,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Self::Range(_) => "range",
            Self::Equality(_) => "equality",
            Self::Elliptic(_) => "elliptic",
            Self::TriggerMask(_) => "trigger_mask",
            Self::Group { .. } => "group",
            Self::Always => "no_cut",
        }
    }
}

/// A named predicate with its own result slot.
#[derive(Debug, Clone)]
pub struct Cut {
    short_name: String,
    long_name: String,
    abbreviation: String,
    result: Handle<bool>,
    test: CutTest,
}

impl Cut {
    /// Allocates the result slot in `store`.
    pub fn new(
        store: &mut ValueStore,
        short_name: impl Into<String>,
        long_name: impl Into<String>,
        abbreviation: impl Into<String>,
        test: CutTest,
    ) -> Self {
        Self {
            short_name: short_name.into(),
            long_name: long_name.into(),
            abbreviation: abbreviation.into(),
            result: store.alloc(false),
            test,
        }
    }

    pub fn short_name(&self) -> &str {
        &self.short_name
    }

    pub fn long_name(&self) -> &str {
        &self.long_name
    }

    pub fn abbreviation(&self) -> &str {
        &self.abbreviation
    }

    /// Slot the last evaluation result is written to.
    pub fn result(&self) -> Handle<bool> {
        self.result
    }

    pub fn test(&self) -> &CutTest {
        &self.test
    }

    pub fn kind(&self) -> &'static str {
        self.test.kind()
    }

    pub fn is_equivalent(&self, other: &Cut) -> bool {
        self.test.is_equivalent(&other.test)
    }

    /// Evaluate, store the result in [`Self::result`] and return it.
    pub fn evaluate(&self, store: &mut ValueStore) -> AnalysisResult<bool> {
        let passed = match &self.test {
            CutTest::Range(c) => c.test(store)?,
            CutTest::Equality(c) => c.test(store)?,
            CutTest::Elliptic(c) => c.test(store)?,
            CutTest::TriggerMask(c) => store.read(c.mask)? & store.read(c.trigger)? != 0,
            CutTest::Group { mode, children } => {
                let mut all = true;
                let mut any = false;
                for child in children {
                    let r = child.evaluate(store)?;
                    all &= r;
                    any |= r;
                }
                match mode {
                    GroupMode::And => all,
                    GroupMode::Or => any,
                    GroupMode::Nand => !all,
                }
            }
            CutTest::Always => true,
        };
        store.write(self.result, passed)?;
        Ok(passed)
    }
}
