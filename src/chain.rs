//! Error Chain
//!
//! Immutable error records linked newest-to-oldest. A context node keeps the
//! head of its chain; appending wraps the old head, catching unwinds one level.

use crate::value::{describe, Value};
use serde::{Deserialize, Serialize};
use std::error::Error as StdError;
use std::fmt;
use std::sync::{Arc, OnceLock};

/// Classification of an error record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    #[default]
    Unknown,
    /// A typed read found a value of another type (or none).
    TypeError,
    /// Reserved for deadline support.
    OutOfDeadline,
    /// Reserved for argument validation in the dispatch layer.
    ParamCountError,
    /// Reserved for argument validation in the dispatch layer.
    ParamTypeError,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Unknown => "Unknown",
            ErrorKind::TypeError => "Type error",
            ErrorKind::OutOfDeadline => "Out of dead line",
            ErrorKind::ParamCountError => "Param count error",
            ErrorKind::ParamTypeError => "Param(s) type error",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One record of an error chain.
///
/// Records are never mutated after construction; the rendered line is
/// computed on first use and cached.
#[derive(Debug)]
pub struct ApiError {
    source_name: String,
    message: String,
    payload: Option<Value>,
    kind: ErrorKind,
    previous: Option<Arc<ApiError>>,
    rendered: OnceLock<String>,
}

impl ApiError {
    /// Create a record with no predecessor.
    pub fn new(
        source_name: impl Into<String>,
        message: impl Into<String>,
        payload: Option<Value>,
        kind: ErrorKind,
    ) -> Self {
        Self {
            source_name: source_name.into(),
            message: message.into(),
            payload,
            kind,
            previous: None,
            rendered: OnceLock::new(),
        }
    }

    /// Create a record that wraps `previous`.
    pub fn wrapping(
        previous: Arc<ApiError>,
        source_name: impl Into<String>,
        message: impl Into<String>,
        payload: Option<Value>,
        kind: ErrorKind,
    ) -> Self {
        let mut record = Self::new(source_name, message, payload, kind);
        record.previous = Some(previous);
        record
    }

    /// Failure of a typed read: `value` could not be read as `target`.
    pub(crate) fn type_mismatch(
        source_name: impl Into<String>,
        value: Option<Value>,
        target: &str,
    ) -> Self {
        let message = format!("'{}' can't convert to '{}'", describe(value.as_ref()), target);
        Self::new(source_name, message, value, ErrorKind::TypeError)
    }

    pub fn source_name(&self) -> &str {
        &self.source_name
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn payload(&self) -> Option<&Value> {
        self.payload.as_ref()
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn previous(&self) -> Option<&Arc<ApiError>> {
        self.previous.as_ref()
    }

    /// This record's own line, without its predecessors.
    pub fn rendered(&self) -> &str {
        self.rendered.get_or_init(|| {
            let payload = match &self.payload {
                Some(value) => value.to_string(),
                None => "<nil>".to_string(),
            };
            format!("Api:[{}]:{};Obj: {}", self.source_name, self.message, payload)
        })
    }

    /// Walk the chain from this record towards the oldest one.
    pub fn iter(&self) -> ChainIter<'_> {
        ChainIter { next: Some(self) }
    }

    /// Number of records reachable from this one, itself included.
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    /// A record always belongs to a chain of at least one.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Oldest record of the chain.
    pub fn root_cause(&self) -> &ApiError {
        let mut current = self;
        while let Some(prev) = current.previous.as_deref() {
            current = prev;
        }
        current
    }

    /// Render the chain oldest-first, one record per line.
    pub fn format_chain(&self) -> String {
        let mut lines: Vec<&str> = self.iter().map(ApiError::rendered).collect();
        lines.reverse();
        lines.join("\n")
    }
}

/// Render `record` and everything it wraps, oldest-first.
pub fn format_chain(record: &ApiError) -> String {
    record.format_chain()
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format_chain())
    }
}

// Unlink predecessors one at a time so releasing a long chain does not recurse.
impl Drop for ApiError {
    fn drop(&mut self) {
        let mut next = self.previous.take();
        while let Some(prev) = next {
            next = Arc::into_inner(prev).and_then(|mut record| record.previous.take());
        }
    }
}

impl StdError for ApiError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match &self.payload {
            Some(Value::Error(err)) => Some(err.as_ref() as &(dyn StdError + 'static)),
            _ => None,
        }
    }
}

/// Iterator over a chain, newest first.
pub struct ChainIter<'a> {
    next: Option<&'a ApiError>,
}

impl<'a> Iterator for ChainIter<'a> {
    type Item = &'a ApiError;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = current.previous.as_deref();
        Some(current)
    }
}
