//! Context Tree
//!
//! An [`ApiContext`] is a handle to one node of an invocation tree. Each node
//! carries a value store, an error chain and a completion latch. Children are
//! owned by their parent; a child only holds a weak reference back, so a
//! subtree never keeps its ancestors alive. Concurrent work is the exception:
//! its thread holds the lineage it was started from until the work returns.
//!
//! Two locks guard a node:
//! - the value lock (read/write) covers the store;
//! - the structural lock covers children, the error chain and completion.
//!
//! Neither lock is held while the other is acquired.

mod done;
mod errors;
mod invoke;
mod store;

pub use done::{Abandoned, DoneHandle};

use crate::chain::ApiError;
use crate::config::RuntimeConfig;
use crate::keys::{InvocationKind, ReservedKey, DEFAULT_FUNC_NAME, UNKNOWN_FUNC_NAME};
use crate::output::{OutputSink, StdoutSink};
use crate::value::{Key, Value};
use done::Completion;
use parking_lot::Mutex;
use std::fmt;
use std::sync::{Arc, Weak};
use store::ValueStore;
use tracing::{debug, trace};

/// Settings shared by every node of one tree.
struct TreeSettings {
    sink: Arc<dyn OutputSink>,
    default_func_name: String,
    thread_name_prefix: String,
}

#[derive(Default)]
struct Structure {
    children: Vec<ApiContext>,
    error: Option<Arc<ApiError>>,
    completion: Completion,
}

struct Node {
    parent: Option<Weak<Node>>,
    depth: usize,
    store: ValueStore,
    structure: Mutex<Structure>,
    exclusive: Mutex<()>,
    settings: Arc<TreeSettings>,
}

// Release descendants iteratively so dropping a deep tree does not recurse.
impl Drop for Node {
    fn drop(&mut self) {
        let mut orphans = std::mem::take(&mut self.structure.get_mut().children);
        while let Some(child) = orphans.pop() {
            if let Some(mut node) = Arc::into_inner(child.node) {
                orphans.append(&mut node.structure.get_mut().children);
            }
        }
    }
}

/// Handle to a node of an invocation tree.
///
/// Cloning the handle is cheap and refers to the same node.
#[derive(Clone)]
pub struct ApiContext {
    node: Arc<Node>,
}

impl Default for ApiContext {
    fn default() -> Self {
        Self::new_root()
    }
}

impl ApiContext {
    /// Create a root node that writes output to stdout.
    pub fn new_root() -> Self {
        Self::with_sink(Arc::new(StdoutSink))
    }

    /// Create a root node that writes output to `sink`.
    pub fn with_sink(sink: Arc<dyn OutputSink>) -> Self {
        Self::root(TreeSettings {
            sink,
            default_func_name: DEFAULT_FUNC_NAME.to_string(),
            thread_name_prefix: RuntimeConfig::default().thread_name_prefix,
        })
    }

    /// Create a root node following the runtime configuration.
    pub fn from_config(config: &RuntimeConfig) -> Self {
        Self::root(TreeSettings {
            sink: config.output.sink(),
            default_func_name: config.default_func_name.clone(),
            thread_name_prefix: config.thread_name_prefix.clone(),
        })
    }

    fn root(settings: TreeSettings) -> Self {
        Self {
            node: Arc::new(Node {
                parent: None,
                depth: 0,
                store: ValueStore::new(),
                structure: Mutex::new(Structure::default()),
                exclusive: Mutex::new(()),
                settings: Arc::new(settings),
            }),
        }
    }

    fn attach(&self, store: ValueStore) -> ApiContext {
        let child = ApiContext {
            node: Arc::new(Node {
                parent: Some(Arc::downgrade(&self.node)),
                depth: self.node.depth + 1,
                store,
                structure: Mutex::new(Structure::default()),
                exclusive: Mutex::new(()),
                settings: Arc::clone(&self.node.settings),
            }),
        };
        self.node.structure.lock().children.push(child.clone());
        child
    }

    /// Create a child with an empty store. Lookups that miss in the child
    /// read the parent's store at lookup time.
    pub fn quick_extend(&self) -> ApiContext {
        let child = self.attach(ValueStore::new());
        trace!(depth = child.depth(), "quick-extended context");
        child
    }

    /// Create a child holding a copy of this node's current store. Later
    /// writes on either side are not visible to the other.
    pub fn extend(&self) -> ApiContext {
        let snapshot = self.node.store.snapshot();
        let copied = snapshot.len();
        let child = self.attach(ValueStore::from_entries(snapshot));
        trace!(depth = child.depth(), copied, "extended context");
        child
    }

    // ---- value store ----

    /// Write `value` under `key` in this node's own store.
    pub fn set_value(&self, key: impl Into<Key>, value: impl Into<Value>) {
        self.node.store.set(key.into(), value.into());
    }

    pub fn with_value(self, key: impl Into<Key>, value: impl Into<Value>) -> Self {
        self.set_value(key, value);
        self
    }

    pub fn with_func_name(self, name: impl Into<String>) -> Self {
        let name: String = name.into();
        self.with_value(ReservedKey::FuncName, name)
    }

    pub fn with_func_kind(self, kind: InvocationKind) -> Self {
        self.with_value(ReservedKey::FuncKind, kind.label())
    }

    /// Look up `key` in this node only.
    pub fn current_value(&self, key: impl Into<Key>) -> Option<Value> {
        self.node.store.get(&key.into())
    }

    /// Whether `key` is set on this node itself.
    pub fn contains(&self, key: impl Into<Key>) -> bool {
        self.node.store.contains(&key.into())
    }

    /// Look up `key` locally, then (when `deep`) through the ancestors,
    /// falling back to `default`.
    pub fn value_inherited(
        &self,
        key: impl Into<Key>,
        deep: bool,
        default: Option<Value>,
    ) -> Option<Value> {
        let key = key.into();
        if let Some(value) = self.node.store.get(&key) {
            return Some(value);
        }
        if deep {
            let mut next = self.node.parent.as_ref().and_then(Weak::upgrade);
            while let Some(node) = next {
                if let Some(value) = node.store.get(&key) {
                    return Some(value);
                }
                next = node.parent.as_ref().and_then(Weak::upgrade);
            }
        }
        default
    }

    /// Look up `key` here or in any ancestor.
    pub fn value(&self, key: impl Into<Key>) -> Option<Value> {
        self.value_inherited(key, true, None)
    }

    fn typed<T>(
        &self,
        key: impl Into<Key>,
        target: &str,
        extract: impl FnOnce(&Value) -> Option<T>,
    ) -> Result<T, ApiError> {
        let value = self.value(key);
        match value.as_ref().and_then(extract) {
            Some(typed) => Ok(typed),
            None => Err(ApiError::type_mismatch(self.function_name(), value, target)),
        }
    }

    pub fn string_value(&self, key: impl Into<Key>) -> Result<String, ApiError> {
        self.typed(key, "string", |v| v.as_str().map(str::to_owned))
    }

    pub fn bool_value(&self, key: impl Into<Key>) -> Result<bool, ApiError> {
        self.typed(key, "bool", Value::as_bool)
    }

    pub fn int_value(&self, key: impl Into<Key>) -> Result<i64, ApiError> {
        self.typed(key, "int", Value::as_int)
    }

    pub fn float32_value(&self, key: impl Into<Key>) -> Result<f32, ApiError> {
        self.typed(key, "float32", Value::as_f32)
    }

    /// Name of the function running against this node, or
    /// `"Unknown function"` when none (or a non-string) is stored.
    pub fn function_name(&self) -> String {
        self.value(ReservedKey::FuncName)
            .and_then(|v| v.as_str().map(str::to_owned))
            .unwrap_or_else(|| UNKNOWN_FUNC_NAME.to_string())
    }

    pub fn invocation_kind(&self) -> Option<InvocationKind> {
        self.value(ReservedKey::FuncKind)
            .and_then(|v| v.as_str().and_then(InvocationKind::from_label))
    }

    /// Keys set on this node itself, in no particular order.
    pub fn local_keys(&self) -> Vec<Key> {
        self.node.store.keys()
    }

    pub fn local_len(&self) -> usize {
        self.node.store.len()
    }

    // ---- tree ----

    /// The parent node, if this is not a root and the parent is still alive.
    pub fn parent(&self) -> Option<ApiContext> {
        self.node
            .parent
            .as_ref()
            .and_then(Weak::upgrade)
            .map(|node| ApiContext { node })
    }

    /// Children in creation order.
    pub fn children(&self) -> Vec<ApiContext> {
        self.node.structure.lock().children.clone()
    }

    pub fn is_root(&self) -> bool {
        self.node.parent.is_none()
    }

    pub fn depth(&self) -> usize {
        self.node.depth
    }

    /// Whether both handles refer to the same node.
    pub fn ptr_eq(&self, other: &ApiContext) -> bool {
        Arc::ptr_eq(&self.node, &other.node)
    }

    /// Run `f` while holding this node's exclusive section lock.
    ///
    /// Serializes multi-step sequences against other `exclusive` sections on
    /// the same node. Core operations inside `f` remain usable. Expensive;
    /// use sparingly.
    pub fn exclusive<R>(&self, f: impl FnOnce(&ApiContext) -> R) -> R {
        let _guard = self.node.exclusive.lock();
        f(self)
    }

    /// Write one line to the tree's output sink.
    pub fn output(&self, line: &str) {
        self.node.settings.sink.write_line(line);
    }

    pub(crate) fn default_func_name(&self) -> &str {
        &self.node.settings.default_func_name
    }

    pub(crate) fn thread_name_prefix(&self) -> &str {
        &self.node.settings.thread_name_prefix
    }

    // ---- completion ----

    /// Register for the completion notification of this node.
    pub fn subscribe(&self) -> DoneHandle {
        self.node.structure.lock().completion.subscribe()
    }

    /// Complete every descendant, then this node, notifying each subscriber
    /// exactly once. Later calls do nothing.
    ///
    /// Children attached after this node completed are left pending.
    pub fn complete(&self) {
        // Post-order walk with an explicit stack: (node, children descended into).
        let mut stack: Vec<(ApiContext, usize)> = vec![(self.clone(), 0)];
        while let Some((current, visited)) = stack.last_mut() {
            let mut structure = current.node.structure.lock();
            if let Some(child) = structure.children.get(*visited).cloned() {
                *visited += 1;
                drop(structure);
                stack.push((child, 0));
                continue;
            }
            let waiters = structure.completion.latch();
            drop(structure);

            if let Some((finished, children)) = stack.pop() {
                if let Some(waiters) = waiters {
                    let notified = done::notify(waiters);
                    debug!(
                        function = %finished.function_name(),
                        depth = finished.depth(),
                        children,
                        notified,
                        "context completed"
                    );
                }
            }
        }
    }

    pub fn is_completed(&self) -> bool {
        self.node.structure.lock().completion.is_completed()
    }

    /// Subscriptions still waiting for this node to complete.
    pub fn pending_waiters(&self) -> usize {
        self.node.structure.lock().completion.pending()
    }
}

impl fmt::Debug for ApiContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiContext")
            .field("function", &self.function_name())
            .field("depth", &self.depth())
            .field("completed", &self.is_completed())
            .finish()
    }
}
