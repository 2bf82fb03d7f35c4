//! Invocation helpers: run work against a fresh child node.

use super::ApiContext;
use crate::keys::InvocationKind;
use std::thread;
use tracing::{debug, debug_span, warn};

impl ApiContext {
    fn invocation_child(&self, name: String, kind: InvocationKind) -> ApiContext {
        self.quick_extend()
            .with_func_name(name)
            .with_func_kind(kind)
    }

    /// This node followed by every live ancestor, nearest first.
    fn lineage(&self) -> Vec<ApiContext> {
        let mut lineage = vec![self.clone()];
        while let Some(parent) = lineage.last().and_then(ApiContext::parent) {
            lineage.push(parent);
        }
        lineage
    }

    /// Run `work` on the calling thread against a new child tagged `name`.
    /// Returns the child once `work` has returned.
    pub fn run_blocking<F>(&self, name: impl Into<String>, work: F) -> ApiContext
    where
        F: FnOnce(&ApiContext),
    {
        let name = name.into();
        let child = self.invocation_child(name.clone(), InvocationKind::Block);
        let span = debug_span!("invoke", function = %name, kind = %InvocationKind::Block);
        span.in_scope(|| work(&child));
        child
    }

    /// [`ApiContext::run_blocking`] under the default function name.
    pub fn run<F>(&self, work: F) -> ApiContext
    where
        F: FnOnce(&ApiContext),
    {
        let name = self.default_func_name().to_string();
        self.run_blocking(name, work)
    }

    /// Start `work` on its own thread against a new child tagged `name` and
    /// return the child immediately.
    ///
    /// The work races with the caller: subscribe to the child's completion
    /// before reading its values or errors. If the thread cannot be started
    /// the failure is appended to the child's error chain.
    ///
    /// The worker holds this node and its ancestors until `work` returns, so
    /// inherited values stay readable after the caller drops its handles.
    pub fn run_concurrent<F>(&self, name: impl Into<String>, work: F) -> ApiContext
    where
        F: FnOnce(ApiContext) + Send + 'static,
    {
        let name = name.into();
        let child = self.invocation_child(name.clone(), InvocationKind::Concurrent);
        let worker = child.clone();
        let lineage = self.lineage();
        let span = debug_span!("invoke", function = %name, kind = %InvocationKind::Concurrent);
        let thread_name = format!("{}-{}", self.thread_name_prefix(), name).replace('\0', "");

        let spawned = thread::Builder::new()
            .name(thread_name.clone())
            .spawn(move || {
                span.in_scope(|| work(worker));
                drop(lineage);
            });

        match spawned {
            Ok(_) => debug!(thread = %thread_name, "concurrent work dispatched"),
            Err(err) => {
                warn!(thread = %thread_name, error = %err, "failed to dispatch concurrent work");
                child.append_error_from(err);
            }
        }
        child
    }

    /// [`ApiContext::run_concurrent`] under the default function name.
    pub fn run_concurrent_default<F>(&self, work: F) -> ApiContext
    where
        F: FnOnce(ApiContext) + Send + 'static,
    {
        let name = self.default_func_name().to_string();
        self.run_concurrent(name, work)
    }
}
