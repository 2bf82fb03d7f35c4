//! apictx: Invocation Contexts for Plugin Runtimes
//!
//! Each unit of work runs against a node of a context tree. A node carries
//! scoped key-value state that children can see, a one-shot completion signal
//! observers can wait on, and a chain of structured errors for its branch.
//!
//! ```
//! use apictx::{ApiContext, ErrorKind};
//!
//! let root = ApiContext::new_root();
//! let child = root.run_blocking("load", |ctx| {
//!     ctx.set_value("x", 1);
//!     ctx.append_error("load", "bad input", None, ErrorKind::TypeError);
//! });
//! assert_eq!(child.int_value("x").unwrap(), 1);
//! assert!(root.value("x").is_none());
//! assert_eq!(child.err().unwrap().kind(), ErrorKind::TypeError);
//! ```

pub mod chain;
pub mod config;
pub mod context;
pub mod error;
pub mod keys;
pub mod logging;
pub mod output;
pub mod value;

pub use chain::{format_chain, ApiError, ErrorKind};
pub use context::{Abandoned, ApiContext, DoneHandle};
pub use keys::{InvocationKind, ReservedKey};
pub use value::{Key, Value};
