//! Reserved Keys and Labels
//!
//! The store keys, sentinel names and invocation-kind labels shared by the
//! context tree, the typed accessors and the invocation helpers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Name given to work started without an explicit name.
pub const DEFAULT_FUNC_NAME: &str = "AnonymousFunction";

/// Returned by `function_name()` when no usable name is stored.
pub const UNKNOWN_FUNC_NAME: &str = "Unknown function";

/// Store keys owned by the runtime itself.
///
/// String keys spelled `__func_name__` or `__func_type__` convert to these
/// variants, so hosts writing the names directly address the same entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReservedKey {
    /// Name of the function running against the node.
    FuncName,
    /// Invocation kind label of the node (see [`InvocationKind`]).
    FuncKind,
}

impl ReservedKey {
    pub fn as_str(self) -> &'static str {
        match self {
            ReservedKey::FuncName => "__func_name__",
            ReservedKey::FuncKind => "__func_type__",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "__func_name__" => Some(ReservedKey::FuncName),
            "__func_type__" => Some(ReservedKey::FuncKind),
            _ => None,
        }
    }
}

impl fmt::Display for ReservedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the work attached to a node was dispatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InvocationKind {
    /// Ran to completion on the caller's thread.
    Block,
    /// Dispatched to its own thread; the caller did not wait.
    ///
    /// The stored label is `FuncSync` for compatibility with existing plugins,
    /// even though dispatch is fire-and-forget.
    Concurrent,
}

impl InvocationKind {
    /// Label written under [`ReservedKey::FuncKind`].
    pub fn label(self) -> &'static str {
        match self {
            InvocationKind::Block => "FuncBlock",
            InvocationKind::Concurrent => "FuncSync",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "FuncBlock" => Some(InvocationKind::Block),
            "FuncSync" => Some(InvocationKind::Concurrent),
            _ => None,
        }
    }
}

impl fmt::Display for InvocationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
