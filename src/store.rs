//! Type-indexed, handle-stable registry of named values.
//!
//! Each [`ValueType`] has its own column; registering a name appends one default-initialised slot
//! to the matching column and hands out a typed [`Handle`]. Slots are never removed or moved
//! between columns, so a handle stays valid for the lifetime of the store no matter how many
//! names are registered after it.
//!
//! ```rust
//! use rust_event_selection::store::ValueStore;
//!
//! let mut store = ValueStore::new();
//! let e1 = store.insert::<f64>("E1").unwrap();
//! store.write(e1, 2.5).unwrap();
//! assert_eq!(store.address::<f64>("E1"), Some(e1));
//! assert_eq!(store.address::<i32>("E1"), None);
//! assert_eq!(store.read(e1).unwrap(), 2.5);
//! ```

use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

use crate::error::{AnalysisError, AnalysisResult};
use crate::kinematics::{FourVector, Vector3};
use crate::types::{Value, ValueType};

/// Name of the per-sub-object instance `index` (1-based) of `base`.
pub fn indexed_name(base: &str, index: u32) -> String {
    format!("{base}{index}")
}

/// Stable typed address of a slot in a [`ValueStore`].
pub struct Handle<T> {
    index: usize,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Handle<T> {
    fn new(index: usize) -> Self {
        Self {
            index,
            _marker: PhantomData,
        }
    }

    /// Position of the slot inside its type column.
    pub fn index(&self) -> usize {
        self.index
    }
}

impl<T> Clone for Handle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Handle<T> {}

impl<T> PartialEq for Handle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index
    }
}

impl<T> Eq for Handle<T> {}

impl<T> Hash for Handle<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.index.hash(state);
    }
}

impl<T: StoreValue> fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handle<{}>({})", T::TYPE, self.index)
    }
}

mod sealed {
    pub trait Sealed {}
}

/// Per-type storage columns. Opaque outside this module.
#[derive(Debug, Default)]
pub struct Columns {
    int32: Vec<i32>,
    int64: Vec<i64>,
    float64: Vec<f64>,
    vector3: Vec<Vector3>,
    four_vector: Vec<FourVector>,
    boolean: Vec<bool>,
}

/// Types that can live in a [`ValueStore`].
pub trait StoreValue: sealed::Sealed + Copy + Default + fmt::Debug + 'static {
    /// The [`ValueType`] tag of this Rust type.
    const TYPE: ValueType;

    #[doc(hidden)]
    fn column(columns: &Columns) -> &Vec<Self>;

    #[doc(hidden)]
    fn column_mut(columns: &mut Columns) -> &mut Vec<Self>;

    /// Wrap into a dynamically typed [`Value`].
    fn into_value(self) -> Value;

    /// Unwrap from a [`Value`] of exactly this type.
    fn from_value(value: Value) -> Option<Self>;
}

macro_rules! store_value {
    ($ty:ty, $tag:ident, $column:ident) => {
        impl sealed::Sealed for $ty {}

        impl StoreValue for $ty {
            const TYPE: ValueType = ValueType::$tag;

            fn column(columns: &Columns) -> &Vec<Self> {
                &columns.$column
            }

            fn column_mut(columns: &mut Columns) -> &mut Vec<Self> {
                &mut columns.$column
            }

            fn into_value(self) -> Value {
                Value::$tag(self)
            }

            fn from_value(value: Value) -> Option<Self> {
                match value {
                    Value::$tag(v) => Some(v),
                    _ => None,
                }
            }
        }
    };
}

store_value!(i32, Int32, int32);
store_value!(i64, Int64, int64);
store_value!(f64, Float64, float64);
store_value!(Vector3, Vector3, vector3);
store_value!(FourVector, FourVector, four_vector);
store_value!(bool, Bool, boolean);

/// A handle whose type is only known at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnyHandle {
    Int32(Handle<i32>),
    Int64(Handle<i64>),
    Float64(Handle<f64>),
    Vector3(Handle<Vector3>),
    FourVector(Handle<FourVector>),
    Bool(Handle<bool>),
}

impl AnyHandle {
    pub fn value_type(&self) -> ValueType {
        match self {
            Self::Int32(_) => ValueType::Int32,
            Self::Int64(_) => ValueType::Int64,
            Self::Float64(_) => ValueType::Float64,
            Self::Vector3(_) => ValueType::Vector3,
            Self::FourVector(_) => ValueType::FourVector,
            Self::Bool(_) => ValueType::Bool,
        }
    }

    /// Narrow to a numeric scalar handle, if the slot is one.
    pub fn scalar(&self) -> Option<ScalarHandle> {
        match *self {
            Self::Int32(h) => Some(ScalarHandle::Int32(h)),
            Self::Int64(h) => Some(ScalarHandle::Int64(h)),
            Self::Float64(h) => Some(ScalarHandle::Float64(h)),
            _ => None,
        }
    }
}

/// Handle to a numeric scalar slot, read back widened to `f64`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarHandle {
    Int32(Handle<i32>),
    Int64(Handle<i64>),
    Float64(Handle<f64>),
}

impl ScalarHandle {
    pub fn read_f64(&self, store: &ValueStore) -> AnalysisResult<f64> {
        Ok(match *self {
            Self::Int32(h) => f64::from(store.read(h)?),
            Self::Int64(h) => store.read(h)? as f64,
            Self::Float64(h) => store.read(h)?,
        })
    }
}

impl From<Handle<f64>> for ScalarHandle {
    fn from(h: Handle<f64>) -> Self {
        Self::Float64(h)
    }
}

#[derive(Debug, Clone, Copy)]
struct Entry {
    value_type: ValueType,
    handle: AnyHandle,
}

/// Registry of every named value of an analysis.
#[derive(Debug, Default)]
pub struct ValueStore {
    entries: HashMap<String, Entry>,
    order: Vec<String>,
    columns: Columns,
}

impl ValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `name` with type `T`, default-initialised.
    ///
    /// Fails with [`AnalysisError::DuplicateName`] if the name exists; the existing slot is left
    /// untouched.
    pub fn insert<T: StoreValue>(&mut self, name: impl Into<String>) -> AnalysisResult<Handle<T>> {
        let name = name.into();
        if self.entries.contains_key(&name) {
            return Err(AnalysisError::DuplicateName { name });
        }
        let handle = self.alloc(T::default());
        self.entries.insert(
            name.clone(),
            Entry {
                value_type: T::TYPE,
                handle: any_handle(T::TYPE, handle.index),
            },
        );
        self.order.push(name);
        Ok(handle)
    }

    /// Register `name` with a type chosen at runtime.
    pub fn insert_typed(&mut self, name: impl Into<String>, value_type: ValueType) -> AnalysisResult<AnyHandle> {
        Ok(match value_type {
            ValueType::Int32 => AnyHandle::Int32(self.insert(name)?),
            ValueType::Int64 => AnyHandle::Int64(self.insert(name)?),
            ValueType::Float64 => AnyHandle::Float64(self.insert(name)?),
            ValueType::Vector3 => AnyHandle::Vector3(self.insert(name)?),
            ValueType::FourVector => AnyHandle::FourVector(self.insert(name)?),
            ValueType::Bool => AnyHandle::Bool(self.insert(name)?),
        })
    }

    /// Allocate an anonymous slot holding `initial` (constants, cut results).
    pub fn alloc<T: StoreValue>(&mut self, initial: T) -> Handle<T> {
        let column = T::column_mut(&mut self.columns);
        column.push(initial);
        Handle::new(column.len() - 1)
    }

    /// Handle of `name` if it is registered with type `T`.
    pub fn address<T: StoreValue>(&self, name: &str) -> Option<Handle<T>> {
        match self.entries.get(name) {
            Some(entry) if entry.value_type == T::TYPE => Some(Handle::new(handle_index(entry.handle))),
            _ => None,
        }
    }

    /// Like [`Self::address`], but explains why the lookup failed.
    pub fn resolve<T: StoreValue>(&self, name: &str) -> AnalysisResult<Handle<T>> {
        match self.entries.get(name) {
            None => Err(AnalysisError::UnknownName {
                name: name.to_string(),
            }),
            Some(entry) if entry.value_type != T::TYPE => Err(AnalysisError::TypeMismatch {
                name: name.to_string(),
                expected: T::TYPE,
                found: entry.value_type,
            }),
            Some(entry) => Ok(Handle::new(handle_index(entry.handle))),
        }
    }

    /// Handle of `name` regardless of its type.
    pub fn any_address(&self, name: &str) -> Option<AnyHandle> {
        self.entries.get(name).map(|e| e.handle)
    }

    /// Registered type of `name`, `None` if absent.
    pub fn value_type(&self, name: &str) -> Option<ValueType> {
        self.entries.get(name).map(|e| e.value_type)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Registered names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// Number of named values.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn read<T: StoreValue>(&self, handle: Handle<T>) -> AnalysisResult<T> {
        T::column(&self.columns)
            .get(handle.index)
            .copied()
            .ok_or(AnalysisError::UnknownHandle {
                value_type: T::TYPE,
                index: handle.index,
            })
    }

    pub fn write<T: StoreValue>(&mut self, handle: Handle<T>, value: T) -> AnalysisResult<()> {
        match T::column_mut(&mut self.columns).get_mut(handle.index) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(AnalysisError::UnknownHandle {
                value_type: T::TYPE,
                index: handle.index,
            }),
        }
    }

    pub fn read_any(&self, handle: AnyHandle) -> AnalysisResult<Value> {
        Ok(match handle {
            AnyHandle::Int32(h) => self.read(h)?.into_value(),
            AnyHandle::Int64(h) => self.read(h)?.into_value(),
            AnyHandle::Float64(h) => self.read(h)?.into_value(),
            AnyHandle::Vector3(h) => self.read(h)?.into_value(),
            AnyHandle::FourVector(h) => self.read(h)?.into_value(),
            AnyHandle::Bool(h) => self.read(h)?.into_value(),
        })
    }

    /// Write a dynamically typed value; its type must match the slot exactly.
    pub fn write_any(&mut self, handle: AnyHandle, value: Value) -> AnalysisResult<()> {
        fn typed<T: StoreValue>(store: &mut ValueStore, h: Handle<T>, value: Value) -> AnalysisResult<()> {
            match T::from_value(value) {
                Some(v) => store.write(h, v),
                None => Err(AnalysisError::SchemaMismatch {
                    message: format!("cannot store a {} value in a {} slot", value.value_type(), T::TYPE),
                }),
            }
        }
        match handle {
            AnyHandle::Int32(h) => typed(self, h, value),
            AnyHandle::Int64(h) => typed(self, h, value),
            AnyHandle::Float64(h) => typed(self, h, value),
            AnyHandle::Vector3(h) => typed(self, h, value),
            AnyHandle::FourVector(h) => typed(self, h, value),
            AnyHandle::Bool(h) => typed(self, h, value),
        }
    }

    /// Current value of `name`, if registered.
    pub fn value(&self, name: &str) -> Option<Value> {
        let handle = self.any_address(name)?;
        self.read_any(handle).ok()
    }
}

fn any_handle(value_type: ValueType, index: usize) -> AnyHandle {
    match value_type {
        ValueType::Int32 => AnyHandle::Int32(Handle::new(index)),
        ValueType::Int64 => AnyHandle::Int64(Handle::new(index)),
        ValueType::Float64 => AnyHandle::Float64(Handle::new(index)),
        ValueType::Vector3 => AnyHandle::Vector3(Handle::new(index)),
        ValueType::FourVector => AnyHandle::FourVector(Handle::new(index)),
        ValueType::Bool => AnyHandle::Bool(Handle::new(index)),
    }
}

fn handle_index(handle: AnyHandle) -> usize {
    match handle {
        AnyHandle::Int32(h) => h.index,
        AnyHandle::Int64(h) => h.index,
        AnyHandle::Float64(h) => h.index,
        AnyHandle::Vector3(h) => h.index,
        AnyHandle::FourVector(h) => h.index,
        AnyHandle::Bool(h) => h.index,
    }
}

#[cfg(test)]
mod tests {
    use super::{indexed_name, AnyHandle, ValueStore};
    use crate::error::AnalysisError;
    use crate::kinematics::FourVector;
    use crate::types::{Value, ValueType};

    #[test]
    fn duplicate_insert_fails_and_keeps_first_slot() {
        let mut store = ValueStore::new();
        let first = store.insert::<f64>("E1").unwrap();
        store.write(first, 1.5).unwrap();

        let err = store.insert::<f64>("E1").unwrap_err();
        assert!(matches!(err, AnalysisError::DuplicateName { ref name } if name == "E1"));
        let err = store.insert::<i32>("E1").unwrap_err();
        assert!(matches!(err, AnalysisError::DuplicateName { .. }));

        assert_eq!(store.address::<f64>("E1"), Some(first));
        assert_eq!(store.read(first).unwrap(), 1.5);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn address_requires_matching_type() {
        let mut store = ValueStore::new();
        store.insert::<i32>("run").unwrap();
        assert!(store.address::<i32>("run").is_some());
        assert!(store.address::<f64>("run").is_none());
        assert!(store.address::<f64>("missing").is_none());

        let err = store.resolve::<f64>("run").unwrap_err();
        assert_eq!(err.to_string(), "variable 'run' has type int, expected double");
        let err = store.resolve::<f64>("missing").unwrap_err();
        assert!(matches!(err, AnalysisError::UnknownName { .. }));
    }

    #[test]
    fn value_type_reports_none_for_absent_names() {
        let mut store = ValueStore::new();
        store.insert::<FourVector>("P1").unwrap();
        assert_eq!(store.value_type("P1"), Some(ValueType::FourVector));
        assert_eq!(store.value_type("P2"), None);
    }

    #[test]
    fn handles_stay_valid_as_store_grows() {
        let mut store = ValueStore::new();
        let first = store.insert::<f64>("X1").unwrap();
        store.write(first, 42.0).unwrap();
        for i in 0..1_000 {
            store.insert::<f64>(indexed_name("filler", i)).unwrap();
            let _ = store.alloc(f64::from(i));
        }
        assert_eq!(store.read(first).unwrap(), 42.0);
        assert_eq!(store.address::<f64>("X1"), Some(first));
    }

    #[test]
    fn anonymous_slots_are_not_named() {
        let mut store = ValueStore::new();
        let c = store.alloc(0.139);
        assert_eq!(store.read(c).unwrap(), 0.139);
        assert!(store.is_empty());
    }

    #[test]
    fn foreign_handle_is_reported() {
        let mut big = ValueStore::new();
        for i in 0..3 {
            big.insert::<f64>(indexed_name("X", i + 1)).unwrap();
        }
        let foreign = big.address::<f64>("X3").unwrap();
        let small = ValueStore::new();
        let err = small.read(foreign).unwrap_err();
        assert!(matches!(err, AnalysisError::UnknownHandle { value_type: ValueType::Float64, index: 2 }));
    }

    #[test]
    fn dynamic_writes_are_type_checked() {
        let mut store = ValueStore::new();
        let h = store.insert_typed("nTracks", ValueType::Int32).unwrap();
        assert!(matches!(h, AnyHandle::Int32(_)));
        store.write_any(h, Value::Int32(4)).unwrap();
        assert_eq!(store.value("nTracks"), Some(Value::Int32(4)));
        assert!(store.write_any(h, Value::Float64(4.0)).is_err());
    }

    #[test]
    fn indexed_names_append_one_based_index() {
        assert_eq!(indexed_name("X", 1), "X1");
        assert_eq!(indexed_name("Mom_x", 12), "Mom_x12");
    }

    #[test]
    fn names_preserve_registration_order() {
        let mut store = ValueStore::new();
        store.insert::<f64>("b").unwrap();
        store.insert::<i64>("a").unwrap();
        assert_eq!(store.names().collect::<Vec<_>>(), vec!["b", "a"]);
    }
}
