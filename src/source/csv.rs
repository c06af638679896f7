//! Headed CSV files as a record source.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::{AnalysisError, AnalysisResult};
use crate::store::{AnyHandle, ValueStore};

use super::{RecordSource, bind_fields};

/// Reads one CSV row per record.
///
/// Rules:
///
/// - CSV must have headers.
/// - Headers must contain every listed field (order can differ, extra columns are ignored).
/// - Every listed field must be a registered `int`, `long` or `double` variable.
/// - Each cell is parsed according to the variable's type; empty cells are an error.
#[derive(Debug)]
pub struct CsvSource<R> {
    reader: csv::Reader<R>,
    fields: Vec<String>,
    columns: Option<Vec<(usize, AnyHandle)>>,
    record: csv::StringRecord,
    rows_read: usize,
}

impl CsvSource<File> {
    pub fn from_path(path: impl AsRef<Path>, fields: Vec<String>) -> AnalysisResult<Self> {
        let reader = csv::ReaderBuilder::new().has_headers(true).from_path(path)?;
        Ok(Self::from_csv_reader(reader, fields))
    }
}

impl<R: Read> CsvSource<R> {
    pub fn from_reader(reader: R, fields: Vec<String>) -> Self {
        Self::from_csv_reader(csv::ReaderBuilder::new().has_headers(true).from_reader(reader), fields)
    }

    pub fn from_csv_reader(reader: csv::Reader<R>, fields: Vec<String>) -> Self {
        Self {
            reader,
            fields,
            columns: None,
            record: csv::StringRecord::new(),
            rows_read: 0,
        }
    }

    /// Number of data rows consumed so far.
    pub fn rows_read(&self) -> usize {
        self.rows_read
    }
}

impl<R: Read> RecordSource for CsvSource<R> {
    fn bind(&mut self, store: &ValueStore) -> AnalysisResult<()> {
        let headers = self.reader.headers()?.clone();
        let handles = bind_fields(store, &self.fields)?;

        let mut columns = Vec::with_capacity(self.fields.len());
        for (field, handle) in self.fields.iter().zip(handles) {
            if !handle.value_type().is_scalar() {
                return Err(AnalysisError::SchemaMismatch {
                    message: format!(
                        "field '{field}' has type {}, which cannot be read from CSV",
                        handle.value_type()
                    ),
                });
            }
            match headers.iter().position(|h| h == field) {
                Some(idx) => columns.push((idx, handle)),
                None => {
                    return Err(AnalysisError::SchemaMismatch {
                        message: format!(
                            "missing required column '{field}'. headers={:?}",
                            headers.iter().collect::<Vec<_>>()
                        ),
                    });
                }
            }
        }
        self.columns = Some(columns);
        Ok(())
    }

    fn next_record(&mut self, store: &mut ValueStore) -> AnalysisResult<bool> {
        let columns = self.columns.as_ref().ok_or(AnalysisError::NotInitialized {
            component: "record source",
        })?;
        if !self.reader.read_record(&mut self.record)? {
            return Ok(false);
        }
        self.rows_read += 1;
        // 1-based, counting the header as row 1.
        let row = self.rows_read + 1;

        for ((idx, handle), field) in columns.iter().zip(&self.fields) {
            let raw = self.record.get(*idx).unwrap_or("");
            write_parsed(store, *handle, row, field, raw)?;
        }
        Ok(true)
    }
}

fn write_parsed(store: &mut ValueStore, handle: AnyHandle, row: usize, field: &str, raw: &str) -> AnalysisResult<()> {
    let err = |message: String| AnalysisError::ParseError {
        record: row,
        field: field.to_owned(),
        raw: raw.to_owned(),
        message,
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(err("empty value".to_string()));
    }
    match handle {
        AnyHandle::Int32(h) => {
            let v = trimmed.parse::<i32>().map_err(|e| err(e.to_string()))?;
            store.write(h, v)
        }
        AnyHandle::Int64(h) => {
            let v = trimmed.parse::<i64>().map_err(|e| err(e.to_string()))?;
            store.write(h, v)
        }
        AnyHandle::Float64(h) => {
            let v = trimmed.parse::<f64>().map_err(|e| err(e.to_string()))?;
            store.write(h, v)
        }
        other => Err(err(format!("cannot parse a {} value", other.value_type()))),
    }
}
