//! Integration tests for completion signaling
//!
//! Tests cover:
//! - Descendants complete before their ancestor
//! - Each subscription fires exactly once
//! - Subscribing after completion resolves immediately
//! - Racing subscribers against completion

use apictx::{Abandoned, ApiContext};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

#[test]
fn test_complete_reaches_every_child() {
    let root = ApiContext::new_root();
    let a = root.quick_extend();
    let b = root.extend();
    let a1 = a.quick_extend();

    root.complete();

    for node in [&root, &a, &b, &a1] {
        assert!(node.is_completed());
    }
}

#[test]
fn test_children_complete_before_parent_signals() {
    let root = ApiContext::new_root();
    let children: Vec<ApiContext> = (0..3).map(|_| root.quick_extend()).collect();
    let root_done = root.subscribe();

    let observer = {
        let children = children.clone();
        thread::spawn(move || {
            root_done.wait().unwrap();
            children.iter().all(ApiContext::is_completed)
        })
    };

    root.complete();
    assert!(observer.join().unwrap(), "children must be complete when the parent signals");
}

#[test]
fn test_completing_a_child_leaves_parent_pending() {
    let root = ApiContext::new_root();
    let child = root.quick_extend();
    child.complete();
    assert!(child.is_completed());
    assert!(!root.is_completed());
}

#[test]
fn test_every_prior_subscription_fires_once() {
    let ctx = ApiContext::new_root();
    let handles: Vec<_> = (0..8).map(|_| ctx.subscribe()).collect();
    assert_eq!(ctx.pending_waiters(), 8);

    ctx.complete();
    ctx.complete();

    assert_eq!(ctx.pending_waiters(), 0);
    for mut handle in handles {
        assert!(handle.is_done());
        assert_eq!(handle.wait(), Ok(()));
    }
}

#[test]
fn test_subscribe_after_complete_does_not_block() {
    let ctx = ApiContext::new_root();
    ctx.complete();

    let mut late = ctx.subscribe();
    assert!(late.is_done());
    assert_eq!(ctx.pending_waiters(), 0);
    late.wait().unwrap();
}

#[test]
fn test_waiters_block_until_complete() {
    let ctx = ApiContext::new_root();
    let woke = Arc::new(AtomicUsize::new(0));

    let waiters: Vec<_> = (0..4)
        .map(|_| {
            let handle = ctx.subscribe();
            let woke = Arc::clone(&woke);
            thread::spawn(move || {
                handle.wait().unwrap();
                woke.fetch_add(1, Ordering::SeqCst);
            })
        })
        .collect();

    thread::sleep(Duration::from_millis(20));
    assert_eq!(woke.load(Ordering::SeqCst), 0);

    ctx.complete();
    for waiter in waiters {
        waiter.join().unwrap();
    }
    assert_eq!(woke.load(Ordering::SeqCst), 4);
}

#[test]
fn test_subscribe_racing_complete_never_hangs() {
    for _ in 0..50 {
        let ctx = ApiContext::new_root();
        let barrier = Arc::new(Barrier::new(5));

        let subscribers: Vec<_> = (0..4)
            .map(|_| {
                let ctx = ctx.clone();
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    ctx.subscribe().wait()
                })
            })
            .collect();

        barrier.wait();
        ctx.complete();

        for subscriber in subscribers {
            assert_eq!(subscriber.join().unwrap(), Ok(()));
        }
    }
}

#[test]
fn test_dropped_node_abandons_waiters() {
    let root = ApiContext::new_root();
    let handle = root.quick_extend().subscribe();
    // The child is owned by the root; dropping the root releases both.
    drop(root);
    assert_eq!(handle.wait(), Err(Abandoned));
}

#[tokio::test]
async fn test_handle_can_be_awaited() {
    let ctx = ApiContext::new_root();
    let handle = ctx.subscribe();

    let completer = ctx.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(10)).await;
        completer.complete();
    });

    let outcome = tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("completion should arrive");
    assert_eq!(outcome, Ok(()));
}
