//! Error chain operations on a context node.

use super::ApiContext;
use crate::chain::{ApiError, ErrorKind};
use crate::value::Value;
use std::error::Error as StdError;
use std::sync::Arc;
use tracing::debug;

impl ApiContext {
    /// Push a new record onto this node's chain. The previous head (if any)
    /// becomes the new record's predecessor. Returns the new head.
    pub fn append_error(
        &self,
        source_name: impl Into<String>,
        message: impl Into<String>,
        payload: Option<Value>,
        kind: ErrorKind,
    ) -> Arc<ApiError> {
        let source_name = source_name.into();
        let message = message.into();

        let head = {
            let mut structure = self.node.structure.lock();
            let record = match structure.error.take() {
                Some(previous) => ApiError::wrapping(previous, source_name, message, payload, kind),
                None => ApiError::new(source_name, message, payload, kind),
            };
            let head = Arc::new(record);
            structure.error = Some(Arc::clone(&head));
            head
        };

        debug!(
            source = %head.source_name(),
            kind = %head.kind(),
            depth = self.depth(),
            "error appended"
        );
        head
    }

    /// Append an error attributed to the function running against this node.
    pub fn raise(
        &self,
        message: impl Into<String>,
        payload: Option<Value>,
        kind: ErrorKind,
    ) -> Arc<ApiError> {
        // Resolved before the structural lock is taken.
        let source_name = self.function_name();
        self.append_error(source_name, message, payload, kind)
    }

    /// Append `err` as the payload of an `Unknown` record with no message.
    pub fn append_error_from<E>(&self, err: E) -> Arc<ApiError>
    where
        E: StdError + Send + Sync + 'static,
    {
        self.raise("", Some(Value::error(err)), ErrorKind::Unknown)
    }

    /// Pop the newest record, leaving its predecessor as the head.
    pub fn catch_last_error(&self) -> Option<Arc<ApiError>> {
        let caught = {
            let mut structure = self.node.structure.lock();
            let head = structure.error.take()?;
            structure.error = head.previous().cloned();
            head
        };
        debug!(
            source = %caught.source_name(),
            depth = self.depth(),
            "error caught"
        );
        Some(caught)
    }

    /// Current head of this node's error chain.
    pub fn err(&self) -> Option<Arc<ApiError>> {
        self.node.structure.lock().error.clone()
    }
}
