//! Record sources: where raw per-record values come from.
//!
//! A [`RecordSource`] is bound once to the [`ValueStore`] (resolving the slots it will write) and
//! then asked for one record at a time. Each call overwrites the raw slots in place.

use std::collections::VecDeque;

use crate::error::{AnalysisError, AnalysisResult};
use crate::store::{AnyHandle, ValueStore};
use crate::types::Value;

pub mod csv;

pub use self::csv::CsvSource;

/// A stream of records that writes raw fields into a [`ValueStore`].
pub trait RecordSource {
    /// Resolve every field this source provides against `store`.
    ///
    /// Fails if a field is not registered or has a type the source cannot produce.
    fn bind(&mut self, store: &ValueStore) -> AnalysisResult<()>;

    /// Write the next record into `store`. Returns `false` once the source is exhausted.
    fn next_record(&mut self, store: &mut ValueStore) -> AnalysisResult<bool>;
}

/// Resolve `fields` to store slots.
pub(crate) fn bind_fields(store: &ValueStore, fields: &[String]) -> AnalysisResult<Vec<AnyHandle>> {
    fields
        .iter()
        .map(|name| {
            store.any_address(name).ok_or_else(|| AnalysisError::SchemaMismatch {
                message: format!("field '{name}' is not a registered variable"),
            })
        })
        .collect()
}

/// In-memory records with a fixed field list; useful in tests and benchmarks.
#[derive(Debug, Clone)]
pub struct MemorySource {
    fields: Vec<String>,
    records: VecDeque<Vec<Value>>,
    handles: Option<Vec<AnyHandle>>,
}

impl MemorySource {
    /// Every record must have one value per field, of exactly the field's registered type.
    pub fn new(fields: Vec<String>, records: Vec<Vec<Value>>) -> Self {
        Self {
            fields,
            records: records.into(),
            handles: None,
        }
    }

    /// Records not yet handed out.
    pub fn remaining(&self) -> usize {
        self.records.len()
    }
}

impl RecordSource for MemorySource {
    fn bind(&mut self, store: &ValueStore) -> AnalysisResult<()> {
        self.handles = Some(bind_fields(store, &self.fields)?);
        Ok(())
    }

    fn next_record(&mut self, store: &mut ValueStore) -> AnalysisResult<bool> {
        let handles = self.handles.as_ref().ok_or(AnalysisError::NotInitialized {
            component: "record source",
        })?;
        let Some(record) = self.records.pop_front() else {
            return Ok(false);
        };
        if record.len() != handles.len() {
            return Err(AnalysisError::SchemaMismatch {
                message: format!("record has {} values, expected {}", record.len(), handles.len()),
            });
        }
        for (&handle, value) in handles.iter().zip(record) {
            store.write_any(handle, value)?;
        }
        Ok(true)
    }
}
