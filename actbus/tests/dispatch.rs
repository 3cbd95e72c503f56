//! Dispatch behaviour of the bus.

use actbus::{
    Accumulator, BoxError, Bus, Matcher, Phase, Registration, Registry, Snapshot,
    testing::{CountingHandler, FailingHandler, OrderLog, RecordingHandler, RewriteHandler},
};
use serde_json::{Value, json};
use std::{sync::Arc, time::Duration};

mod common;
use common::{DISCOVERY, TrailHandler, empty, single};

#[tokio::test]
async fn test_discovery_merge() {
    let registry = single(
        Phase::Main,
        "1.0.0",
        |_: Value, acc: Accumulator<Value>| async move {
            acc.merge(json!({"features": [{"name": "Sample Feature", "version": "1.0.0"}]}));
        },
    );
    let bus = Bus::new(registry);

    let (ns, act, ver) = DISCOVERY;
    let result = bus.run_all_matches(ns, act, ver, empty()).await.unwrap();

    assert_eq!(
        result.data_field("features"),
        Some(&json!([{"name": "Sample Feature", "version": "1.0.0"}]))
    );
}

#[tokio::test]
async fn test_wildcard_and_exact_version() {
    let (ns, act, _) = DISCOVERY;

    let wildcard = CountingHandler::new();
    let bus = Bus::new(single(Phase::Main, "*", wildcard.clone()));
    bus.run_all_matches(ns, act, "2.3.1", empty()).await.unwrap();
    assert_eq!(wildcard.count(), 1);

    let exact = CountingHandler::new();
    let bus = Bus::new(single(Phase::Main, "1.0.0", exact.clone()));
    bus.run_all_matches(ns, act, "2.3.1", empty()).await.unwrap();
    assert_eq!(exact.count(), 0);
}

#[tokio::test]
async fn test_payload_threads_within_registration() {
    let recorder = RecordingHandler::<Value>::new();

    let mut registry = Registry::new();
    registry
        .register(
            Phase::Main,
            Registration::builder()
                .namespace("*")
                .activity("*")
                .version("*")
                .handler(RewriteHandler::new(|_: Value| json!({"x": 1})))
                .handler(recorder.clone()),
        )
        .unwrap();
    let bus = Bus::new(registry);

    let result = bus
        .run_all_matches("ns", "act", "1.0.0", json!({"x": 0}))
        .await
        .unwrap();

    assert_eq!(recorder.payloads(), [json!({"x": 1})]);
    assert_eq!(result.updated_payload, Some(json!({"x": 1})));
}

#[tokio::test]
async fn test_payload_threads_across_phases() {
    let recorder = RecordingHandler::<Value>::new();

    let mut registry = Registry::new();
    registry
        .register(Phase::Before, Registration::new("*", "*", "*", TrailHandler { tag: "before" }))
        .unwrap()
        .register(Phase::Main, Registration::new("*", "*", "*", TrailHandler { tag: "main" }))
        .unwrap()
        .register(Phase::After, Registration::new("*", "*", "*", recorder.clone()))
        .unwrap();
    let bus = Bus::new(registry);

    bus.run_all_matches("ns", "act", "1", empty()).await.unwrap();

    assert_eq!(recorder.payloads(), [json!({"trail": ["before", "main"]})]);
}

#[tokio::test]
async fn test_fan_out_runs_in_registration_order() {
    let log = OrderLog::new();
    let (ns, act, ver) = DISCOVERY;

    let mut registry = Registry::<Value>::new();
    registry
        .register(Phase::Main, Registration::new(ns, act, ver, log.handler("exact")))
        .unwrap()
        .register(Phase::Main, Registration::new(ns, act, "*", log.handler("wildcard")))
        .unwrap();
    let bus = Bus::new(registry);

    bus.run_all_matches(ns, act, ver, empty()).await.unwrap();

    assert_eq!(log.entries(), ["exact", "wildcard"]);
}

#[tokio::test]
async fn test_phase_and_sequence_order() {
    let log = OrderLog::new();

    let mut registry = Registry::<()>::new();
    // Registered out of phase order on purpose.
    registry
        .register(Phase::After, Registration::new("*", "*", "*", log.handler("after")))
        .unwrap()
        .register(
            Phase::Main,
            Registration::builder()
                .namespace("*")
                .activity("*")
                .version("*")
                .handler(log.handler("main-1"))
                .handler(log.handler("main-2")),
        )
        .unwrap()
        .register(Phase::Before, Registration::new("*", "*", "*", log.handler("before")))
        .unwrap()
        .register(Phase::Main, Registration::new("*", "*", "*", log.handler("main-3")))
        .unwrap();
    let bus = Bus::new(registry);

    bus.run_all_matches("ns", "act", "1", ()).await.unwrap();

    assert_eq!(
        log.entries(),
        ["before", "main-1", "main-2", "main-3", "after"]
    );
}

#[tokio::test]
async fn test_empty_registry_returns_default() {
    let bus = Bus::<Value>::new(Registry::new());

    let result = bus.run_all_matches("foo", "bar", "1.0.0", empty()).await.unwrap();

    assert_eq!(result, Snapshot::default());
    assert_eq!(serde_json::to_value(&result).unwrap(), json!({"success": false}));
}

#[tokio::test]
async fn test_failure_does_not_short_circuit() {
    let log = OrderLog::new();

    let mut registry = Registry::<()>::new();
    registry
        .register(
            Phase::Main,
            Registration::builder()
                .namespace("*")
                .activity("*")
                .version("*")
                .label("broken")
                .handler(FailingHandler::new("first failure"))
                .handler(log.handler("main-after-failure")),
        )
        .unwrap()
        .register(
            Phase::Main,
            Registration::new("*", "*", "*", |_: (), acc: Accumulator<()>| async move {
                acc.mark_success(json!({"late": true}));
                Err::<(), _>("second failure")
            }),
        )
        .unwrap()
        .register(Phase::After, Registration::new("*", "*", "*", log.handler("after")))
        .unwrap();
    let bus = Bus::new(registry);

    let result = bus.run_all_matches("ns", "act", "1", ()).await.unwrap();

    assert_eq!(log.entries(), ["main-after-failure", "after"]);
    assert!(!result.success);
    assert_eq!(result.data, Some(json!({"late": true})));

    let error = result.error.unwrap();
    assert_eq!(error.message, "first failure");
    assert_eq!(error.phase, Phase::Main);
    assert_eq!(error.registration.as_deref(), Some("broken"));
}

#[tokio::test]
async fn test_rewrite_before_failure_still_threads() {
    let recorder = RecordingHandler::<Value>::new();

    let mut registry = Registry::new();
    registry
        .register(
            Phase::Main,
            Registration::builder()
                .namespace("*")
                .activity("*")
                .version("*")
                .handler(|_: Value, acc: Accumulator<Value>| async move {
                    acc.set_updated_payload(json!({"step": "errored"}));
                    Err::<(), _>("rewrite then fail")
                })
                .handler(recorder.clone())
                .handler(|_: Value, acc: Accumulator<Value>| async move {
                    acc.set_updated_payload(json!({"step": "panicked"}));
                    if true {
                        panic!("rewrite then panic");
                    }
                })
                .handler(recorder.clone()),
        )
        .unwrap();
    let bus = Bus::new(registry);

    let result = bus
        .run_all_matches("ns", "act", "1", json!({"step": "initial"}))
        .await
        .unwrap();

    assert_eq!(
        recorder.payloads(),
        [json!({"step": "errored"}), json!({"step": "panicked"})]
    );
    assert!(!result.success);
    assert_eq!(result.error.unwrap().message, "rewrite then fail");
    assert_eq!(result.updated_payload, Some(json!({"step": "panicked"})));
}

#[tokio::test]
async fn test_panic_is_recorded_as_failure() {
    let after = CountingHandler::new();

    let mut registry = Registry::<()>::new();
    registry
        .register(
            Phase::Main,
            Registration::new("*", "*", "*", |_: (), _: Accumulator<()>| async move {
                if true {
                    panic!("handler exploded");
                }
            }),
        )
        .unwrap()
        .register(Phase::After, Registration::new("*", "*", "*", after.clone()))
        .unwrap();
    let bus = Bus::new(registry);

    let result = bus.run_all_matches("ns", "act", "1", ()).await.unwrap();

    assert_eq!(after.count(), 1);
    assert!(!result.success);
    assert_eq!(result.error.unwrap().message, "handler panicked: handler exploded");
}

#[tokio::test]
async fn test_returned_payload_is_visible_in_result() {
    let recorder = RecordingHandler::<u32>::new();

    let mut registry = Registry::<u32>::new();
    registry
        .register(
            Phase::Main,
            Registration::new("*", "*", "*", |n: u32, _: Accumulator<u32>| async move {
                Ok::<_, BoxError>(Some(n * 2))
            }),
        )
        .unwrap()
        .register(Phase::After, Registration::new("*", "*", "*", recorder.clone()))
        .unwrap();
    let bus = Bus::new(registry);

    let result = bus.run_all_matches("ns", "act", "1", 21).await.unwrap();

    assert_eq!(recorder.payloads(), [42]);
    assert_eq!(result.updated_payload, Some(42));
}

#[tokio::test]
async fn test_context_filters_registrations() {
    let tenant_a = CountingHandler::new();
    let everyone = CountingHandler::new();

    let mut registry = Registry::<()>::new();
    registry
        .register(
            Phase::Main,
            Registration::new("*", "*", "*", tenant_a.clone()).with_context("tenant-a"),
        )
        .unwrap()
        .register(Phase::Main, Registration::new("*", "*", "*", everyone.clone()))
        .unwrap();
    let bus = Bus::new(registry);

    bus.run_all_matches_in("ns", "act", "1", (), "tenant-b").await.unwrap();
    assert_eq!((tenant_a.count(), everyone.count()), (0, 1));

    bus.run_all_matches_in("ns", "act", "1", (), "tenant-a").await.unwrap();
    assert_eq!((tenant_a.count(), everyone.count()), (1, 2));
}

#[tokio::test]
async fn test_pattern_and_predicate_matchers() {
    let counter = CountingHandler::new();

    let mut registry = Registry::<()>::new();
    registry
        .register(
            Phase::Main,
            Registration::new(
                Matcher::predicate(|ns| ns.starts_with("disc")),
                Matcher::pattern("^discover").unwrap(),
                "*",
                counter.clone(),
            ),
        )
        .unwrap();
    let bus = Bus::new(registry);

    bus.run_all_matches("discovery", "discoverOpenUiFeatures", "1", ()).await.unwrap();
    bus.run_all_matches("discovery", "listFeatures", "1", ()).await.unwrap();
    bus.run_all_matches("search", "discoverOpenUiFeatures", "1", ()).await.unwrap();

    assert_eq!(counter.count(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_calls_are_isolated() {
    let registry = single(
        Phase::Main,
        "*",
        |payload: Value, acc: Accumulator<Value>| async move {
            let id = payload["id"].clone();
            tokio::time::sleep(Duration::from_millis(5)).await;
            acc.mark_success(json!({"id": id}));
            acc.set_updated_payload(json!({"id": id, "seen": true}));
        },
    );
    let bus = Arc::new(Bus::new(registry));

    let (ns, act, ver) = DISCOVERY;
    let tasks: Vec<_> = (0..16)
        .map(|id| {
            let bus = Arc::clone(&bus);
            tokio::spawn(async move {
                bus.run_all_matches(ns, act, ver, json!({"id": id}))
                    .await
                    .unwrap()
            })
        })
        .collect();

    for (id, task) in tasks.into_iter().enumerate() {
        let result = task.await.unwrap();
        assert!(result.success);
        assert_eq!(result.data, Some(json!({"id": id})));
        assert_eq!(result.updated_payload, Some(json!({"id": id, "seen": true})));
    }
}
