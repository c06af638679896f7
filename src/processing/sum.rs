//! Algebraic sums over store slots of any additive type.

use crate::error::{AnalysisError, AnalysisResult};
use crate::kinematics::FourVector;
use crate::store::{Handle, StoreValue, ValueStore};

/// Store types that support the addition and subtraction a [`Sum`] needs.
///
/// Integer sums wrap on overflow.
pub trait Summable: StoreValue {
    fn plus(self, rhs: Self) -> Self;
    fn minus(self, rhs: Self) -> Self;
}

impl Summable for i32 {
    fn plus(self, rhs: Self) -> Self {
        self.wrapping_add(rhs)
    }
    fn minus(self, rhs: Self) -> Self {
        self.wrapping_sub(rhs)
    }
}

impl Summable for i64 {
    fn plus(self, rhs: Self) -> Self {
        self.wrapping_add(rhs)
    }
    fn minus(self, rhs: Self) -> Self {
        self.wrapping_sub(rhs)
    }
}

impl Summable for f64 {
    fn plus(self, rhs: Self) -> Self {
        self + rhs
    }
    fn minus(self, rhs: Self) -> Self {
        self - rhs
    }
}

impl Summable for FourVector {
    fn plus(self, rhs: Self) -> Self {
        self + rhs
    }
    fn minus(self, rhs: Self) -> Self {
        self - rhs
    }
}

/// `out = Σ addends − Σ subtrahends`.
#[derive(Debug, Clone, PartialEq)]
pub struct Sum<T: Summable> {
    addends: Vec<Handle<T>>,
    subtrahends: Vec<Handle<T>>,
    out: Handle<T>,
}

impl<T: Summable> Sum<T> {
    /// Fails if both `addends` and `subtrahends` are empty.
    pub fn new(addends: Vec<Handle<T>>, subtrahends: Vec<Handle<T>>, out: Handle<T>) -> AnalysisResult<Self> {
        if addends.is_empty() && subtrahends.is_empty() {
            return Err(AnalysisError::invalid(
                "sum",
                "needs at least one summand or subtrahend",
            ));
        }
        Ok(Self {
            addends,
            subtrahends,
            out,
        })
    }

    pub fn output(&self) -> Handle<T> {
        self.out
    }

    pub fn evaluate(&self, store: &mut ValueStore) -> AnalysisResult<()> {
        let mut acc = match self.addends.first() {
            Some(&first) => store.read(first)?,
            None => T::default(),
        };
        for &h in self.addends.iter().skip(1) {
            acc = acc.plus(store.read(h)?);
        }
        for &h in &self.subtrahends {
            acc = acc.minus(store.read(h)?);
        }
        store.write(self.out, acc)
    }
}

/// A [`Sum`] instantiated for one of the additive store types.
#[derive(Debug, Clone, PartialEq)]
pub enum SumStep {
    Int32(Sum<i32>),
    Int64(Sum<i64>),
    Float64(Sum<f64>),
    FourVector(Sum<FourVector>),
}

impl SumStep {
    pub fn evaluate(&self, store: &mut ValueStore) -> AnalysisResult<()> {
        match self {
            Self::Int32(s) => s.evaluate(store),
            Self::Int64(s) => s.evaluate(store),
            Self::Float64(s) => s.evaluate(store),
            Self::FourVector(s) => s.evaluate(store),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Sum;
    use crate::kinematics::FourVector;
    use crate::store::ValueStore;

    #[test]
    fn addends_minus_subtrahends() {
        let mut store = ValueStore::new();
        let a = store.alloc(2.0);
        let b = store.alloc(3.0);
        let c = store.alloc(1.0);
        let out = store.insert::<f64>("out").unwrap();

        Sum::new(vec![a, b], vec![c], out).unwrap().evaluate(&mut store).unwrap();
        assert_eq!(store.read(out).unwrap(), 4.0);
    }

    #[test]
    fn single_addend_is_identity() {
        let mut store = ValueStore::new();
        let a = store.alloc(0.1 + 0.2);
        let out = store.insert::<f64>("out").unwrap();

        Sum::new(vec![a], vec![], out).unwrap().evaluate(&mut store).unwrap();
        assert_eq!(store.read(out).unwrap(), 0.1 + 0.2);
    }

    #[test]
    fn only_subtrahends_negate() {
        let mut store = ValueStore::new();
        let a = store.alloc(5_i64);
        let out = store.insert::<i64>("out").unwrap();

        Sum::new(vec![], vec![a], out).unwrap().evaluate(&mut store).unwrap();
        assert_eq!(store.read(out).unwrap(), -5);
    }

    #[test]
    fn empty_sum_is_rejected() {
        let mut store = ValueStore::new();
        let out = store.insert::<f64>("out").unwrap();
        assert!(Sum::<f64>::new(vec![], vec![], out).is_err());
    }

    #[test]
    fn integer_sum_wraps() {
        let mut store = ValueStore::new();
        let a = store.alloc(i32::MAX);
        let b = store.alloc(1_i32);
        let out = store.insert::<i32>("out").unwrap();

        Sum::new(vec![a, b], vec![], out).unwrap().evaluate(&mut store).unwrap();
        assert_eq!(store.read(out).unwrap(), i32::MIN);
    }

    #[test]
    fn four_vectors_add_componentwise() {
        let mut store = ValueStore::new();
        let p1 = store.alloc(FourVector::new(1.0, 0.0, 2.0, 3.0));
        let p2 = store.alloc(FourVector::new(-1.0, 1.0, 2.0, 4.0));
        let out = store.insert::<FourVector>("pSum").unwrap();

        Sum::new(vec![p1, p2], vec![], out).unwrap().evaluate(&mut store).unwrap();
        assert_eq!(store.read(out).unwrap(), FourVector::new(0.0, 1.0, 4.0, 7.0));
    }
}
