//! Output Sinks
//!
//! Line-oriented output written by work running against a context. The sink
//! is chosen when the root is created and shared by the whole tree.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

/// Destination for lines written through `ApiContext::output`.
pub trait OutputSink: Send + Sync {
    fn write_line(&self, line: &str);
}

/// Prints each line to stdout.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutSink;

impl OutputSink for StdoutSink {
    fn write_line(&self, line: &str) {
        println!("{}", line);
    }
}

/// Emits each line as an `info` event under the `apictx::output` target.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl OutputSink for TracingSink {
    fn write_line(&self, line: &str) {
        info!(target: "apictx::output", "{}", line);
    }
}

/// Keeps lines in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    lines: Mutex<Vec<String>>,
}

impl MemorySink {
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().clone()
    }
}

impl OutputSink for MemorySink {
    fn write_line(&self, line: &str) {
        self.lines.lock().push(line.to_string());
    }
}

/// Configurable choice of sink.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputKind {
    #[default]
    Stdout,
    Tracing,
}

impl OutputKind {
    pub fn sink(self) -> Arc<dyn OutputSink> {
        match self {
            OutputKind::Stdout => Arc::new(StdoutSink),
            OutputKind::Tracing => Arc::new(TracingSink),
        }
    }
}
