//! Record formatters.
//!
//! A formatter turns one record into a self-contained byte payload. The
//! writer appends the newline delimiter after the formatter's output, so
//! implementations must never emit a trailing delimiter themselves.

use std::{fmt, sync::Arc};

use thiserror::Error;

use crate::record::{Field, FieldValue};

mod json;

pub use json::{JsonFormatter, TimestampFormat};

/// Errors raised while formatting a record.
#[derive(Debug, Error)]
pub enum FormatError {
    /// The record does not match the schema supplied at initialisation.
    #[error("record has {actual} values but the schema has {expected} fields")]
    FieldCount { expected: usize, actual: usize },
    /// JSON encoding failed.
    #[error("failed to encode record as JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Trait for formatting records into byte payloads.
///
/// Implementors must be thread-safe (`Send + Sync`) so a formatter can be
/// shared between writers.
pub trait RecordFormatter: Send + Sync {
    /// Append the encoded record to `out`.
    fn describe(
        &self,
        fields: &[Field],
        values: &[FieldValue],
        out: &mut Vec<u8>,
    ) -> Result<(), FormatError>;
}

/// Shared formatter trait object used by writers.
#[derive(Clone)]
pub struct SharedFormatter {
    inner: Arc<dyn RecordFormatter>,
}

impl SharedFormatter {
    /// Create a shared formatter from an owned formatter implementation.
    pub fn new<F>(formatter: F) -> Self
    where
        F: RecordFormatter + 'static,
    {
        Self {
            inner: Arc::new(formatter),
        }
    }

    /// Format a record using the wrapped formatter instance.
    pub fn describe(
        &self,
        fields: &[Field],
        values: &[FieldValue],
        out: &mut Vec<u8>,
    ) -> Result<(), FormatError> {
        self.inner.describe(fields, values, out)
    }
}

impl fmt::Debug for SharedFormatter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SharedFormatter(<dyn RecordFormatter>)")
    }
}

pub(crate) fn check_arity(fields: &[Field], values: &[FieldValue]) -> Result<(), FormatError> {
    if fields.len() == values.len() {
        Ok(())
    } else {
        Err(FormatError::FieldCount {
            expected: fields.len(),
            actual: values.len(),
        })
    }
}
