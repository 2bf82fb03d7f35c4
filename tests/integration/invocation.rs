//! Integration tests for the invocation helpers

use apictx::config::RuntimeConfig;
use apictx::output::{MemorySink, OutputKind};
use apictx::{ApiContext, ErrorKind, InvocationKind, Value};
use std::sync::mpsc;
use std::sync::Arc;
use std::time::Duration;

#[test]
fn test_run_blocking_runs_on_calling_thread() {
    let root = ApiContext::new_root();
    let caller = std::thread::current().id();
    let mut seen = None;
    let child = root.run_blocking("local", |_| seen = Some(std::thread::current().id()));
    assert_eq!(seen, Some(caller));
    assert_eq!(child.invocation_kind(), Some(InvocationKind::Block));
}

#[test]
fn test_run_concurrent_returns_before_work_finishes() {
    let root = ApiContext::new_root();
    let (release_tx, release_rx) = mpsc::channel::<()>();

    let child = root.run_concurrent("slow", move |ctx| {
        release_rx.recv().unwrap();
        ctx.set_value("finished", true);
        ctx.complete();
    });

    // The work is parked on the channel, so returning proves no waiting happened.
    assert!(!child.is_completed());
    assert!(child.current_value("finished").is_none());

    let done = child.subscribe();
    release_tx.send(()).unwrap();
    done.wait().unwrap();
    assert!(child.bool_value("finished").unwrap());
}

#[test]
fn test_run_concurrent_uses_worker_thread() {
    let root = ApiContext::new_root();
    let (tx, rx) = mpsc::channel();
    root.run_concurrent("named", move |ctx| {
        let name = std::thread::current().name().map(str::to_owned);
        tx.send((name, ctx.function_name())).unwrap();
    });

    let (thread_name, function) = rx.recv_timeout(Duration::from_secs(5)).unwrap();
    assert_eq!(thread_name.as_deref(), Some("apictx-worker-named"));
    assert_eq!(function, "named");
}

#[test]
fn test_concurrent_child_reads_parent_values() {
    let root = ApiContext::new_root().with_value("tenant", "acme");
    let child = root.run_concurrent("reader", |ctx| {
        let tenant = ctx.string_value("tenant").unwrap_or_default();
        ctx.set_value("seen", tenant);
        ctx.complete();
    });
    child.subscribe().wait().unwrap();
    assert_eq!(child.current_value("seen"), Some(Value::from("acme")));
}

#[test]
fn test_nested_invocations_build_a_tree() {
    let root = ApiContext::new_root();
    let outer = root.run_blocking("outer", |ctx| {
        ctx.run_blocking("inner", |inner| {
            inner.raise("inner failed", None, ErrorKind::Unknown);
        });
    });

    let inner = &outer.children()[0];
    assert_eq!(inner.function_name(), "inner");
    assert_eq!(inner.err().unwrap().source_name(), "inner");
    assert!(outer.err().is_none());
    assert_eq!(inner.depth(), 2);
}

#[test]
fn test_configured_root_applies_runtime_settings() {
    let config = RuntimeConfig {
        default_func_name: "plugin-call".to_string(),
        output: OutputKind::Tracing,
        thread_name_prefix: "host".to_string(),
    };
    let root = ApiContext::from_config(&config);

    let blocking = root.run(|_| {});
    assert_eq!(blocking.function_name(), "plugin-call");

    let (tx, rx) = mpsc::channel();
    let concurrent = root.run_concurrent_default(move |ctx| {
        tx.send(std::thread::current().name().map(str::to_owned)).unwrap();
        ctx.complete();
    });
    assert_eq!(
        rx.recv_timeout(Duration::from_secs(5)).unwrap().as_deref(),
        Some("host-plugin-call")
    );
    assert_eq!(concurrent.function_name(), "plugin-call");
}

#[test]
fn test_output_sink_is_shared_by_the_tree() {
    let sink = Arc::new(MemorySink::default());
    let root = ApiContext::with_sink(sink.clone());
    root.output("root");
    let child = root.run_concurrent("worker", |ctx| {
        ctx.output("worker");
        ctx.complete();
    });
    child.subscribe().wait().unwrap();
    assert_eq!(sink.lines(), vec!["root".to_string(), "worker".to_string()]);
}

fn start_detached(
    release: mpsc::Receiver<()>,
    report: mpsc::Sender<(Option<Value>, Option<Value>)>,
) -> ApiContext {
    let root = ApiContext::new_root().with_value("tenant", "acme");
    let request = root.quick_extend().with_value("request_id", "r-7");
    request.run_concurrent("background", move |ctx| {
        release.recv().unwrap();
        report
            .send((ctx.value("tenant"), ctx.value("request_id")))
            .unwrap();
        ctx.complete();
    })
}

#[test]
fn test_detached_worker_reads_values_after_caller_returns() {
    let (release_tx, release_rx) = mpsc::channel();
    let (report_tx, report_rx) = mpsc::channel();

    // Every ancestor handle is gone once this returns.
    let worker = start_detached(release_rx, report_tx);
    release_tx.send(()).unwrap();

    let (tenant, request) = report_rx.recv_timeout(Duration::from_secs(5)).unwrap();
    assert_eq!(tenant, Some(Value::from("acme")));
    assert_eq!(request, Some(Value::from("r-7")));
    worker.subscribe().wait().unwrap();
}
