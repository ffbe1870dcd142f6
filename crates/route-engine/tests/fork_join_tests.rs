//! Pruebas del router fork-join: orden, concurrencia, políticas de error,
//! timeouts y merge de variables.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use route_core::{processor_fn, ErrorCause, ErrorType, Event, EventError, EventTracer, Message, Processor, RouteExecutionError,
                 RoutingError, RoutingPair, Scheduler, TokioScheduler, TypedValue};
use route_engine::{ForkJoinRouter, JoinOnlyAggregator};
use serde_json::{json, Value};

fn scheduler() -> Arc<dyn Scheduler> {
    Arc::new(TokioScheduler::current().unwrap())
}

fn ok_route(payload: Value, delay_ms: u64) -> Arc<dyn Processor> {
    processor_fn("ok", move |event: Event| {
        let payload = payload.clone();
        async move {
            tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            Ok::<_, RouteExecutionError>(event.into_builder().payload(TypedValue::of(payload)).build())
        }
    })
}

/// Como `ok_route`, pero marca `finished` al terminar.
fn flagged_route(payload: Value, delay_ms: u64, finished: Arc<AtomicBool>) -> Arc<dyn Processor> {
    processor_fn("flagged", move |event: Event| {
        let payload = payload.clone();
        let finished = finished.clone();
        async move {
            tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            finished.store(true, Ordering::SeqCst);
            Ok::<_, RouteExecutionError>(event.into_builder().payload(TypedValue::of(payload)).build())
        }
    })
}

fn failing_route(message: &'static str, delay_ms: u64) -> Arc<dyn Processor> {
    processor_fn("failing", move |event: Event| async move {
        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
        Err::<Event, _>(RouteExecutionError::failure(event, ErrorType::new("APP", "ROUTE_FAILED"), "IllegalStateException", message))
    })
}

fn pairs(original: &Event, routes: Vec<Arc<dyn Processor>>) -> Vec<RoutingPair> {
    routes.into_iter().map(|r| RoutingPair::of(original.clone(), r)).collect()
}

fn branch_payload(result: &Event, key: &str) -> Value {
    let message: Message = serde_json::from_value(result.payload().value[key].clone()).unwrap();
    message.payload.value
}

#[tokio::test(start_paused = true)]
async fn results_follow_input_order_under_reversed_completion() {
    let router = ForkJoinRouter::builder(scheduler()).build();
    let original = Event::of(json!("in"));
    let routes = vec![ok_route(json!("a"), 30), ok_route(json!("b"), 20), ok_route(json!("c"), 10)];

    let result = router.route(original.clone(), pairs(&original, routes)).await.unwrap();

    let keys: Vec<&String> = result.payload().value.as_object().unwrap().keys().collect();
    assert_eq!(keys, vec!["1", "2", "3"]);
    assert_eq!(branch_payload(&result, "1"), json!("a"));
    assert_eq!(branch_payload(&result, "3"), json!("c"));
    assert_eq!(result.id(), original.id());
}

#[tokio::test(start_paused = true)]
async fn fail_fast_surfaces_only_the_failing_route() {
    let router = ForkJoinRouter::builder(scheduler()).delay_errors(false).build();
    let original = Event::of(json!("in"));
    let first_done = Arc::new(AtomicBool::new(false));
    let third_done = Arc::new(AtomicBool::new(false));
    let routes = vec![flagged_route(json!(1), 50, first_done.clone()),
                      failing_route("route 2 broke", 1),
                      flagged_route(json!(3), 50, third_done.clone())];

    let err = router.route(original.clone(), pairs(&original, routes)).await.unwrap_err();
    assert!(!first_done.load(Ordering::SeqCst));
    assert!(!third_done.load(Ordering::SeqCst));
    match &err {
        RoutingError::Execution(e) => {
            assert_eq!(e.error.cause.message, "route 2 broke");
            assert_eq!(e.event.group_correlation().map(|g| g.sequence), Some(2));
            assert_eq!(e.component.as_deref(), Some("scatter-gather"));
            assert_eq!(e.event.error(), Some(&e.error));
            assert_eq!(e.event.payload().value, json!("in"));
        }
        other => panic!("unexpected error: {other:?}"),
    }

    // las ramas restantes no se cancelan: siguen hasta terminar
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(first_done.load(Ordering::SeqCst));
    assert!(third_done.load(Ordering::SeqCst));
}

#[tokio::test(start_paused = true)]
async fn delay_errors_aggregates_failures_by_route_key() {
    let router = ForkJoinRouter::builder(scheduler()).delay_errors(true).build();
    let original = Event::of(json!("in"));
    let routes = vec![failing_route("route 1 broke", 20), ok_route(json!(2), 5), failing_route("route 3 broke", 1)];

    let err = router.route(original.clone(), pairs(&original, routes)).await.unwrap_err();
    let RoutingError::Composite(composite) = err else {
        panic!("expected composite error");
    };
    assert_eq!(composite.failed_routes(), vec!["1", "3"]);
    assert_eq!(composite.errors().len(), 2);
    assert_eq!(composite.routing_result().results().keys().collect::<Vec<_>>(), vec!["2"]);
    let message = composite.to_string();
    assert!(message.contains("route 1 broke"));
    assert!(message.contains("route 3 broke"));
    // sin detalle no se conserva el error de ruta causante
    assert!(composite.routing_result().failures()["1"].exception.is_none());
}

#[tokio::test]
async fn detailed_errors_keep_route_exception() {
    let router = ForkJoinRouter::builder(scheduler()).detailed_errors(true).build();
    let original = Event::of(json!("in"));
    let err = router.route(original.clone(), pairs(&original, vec![failing_route("boom", 0)]))
                    .await
                    .unwrap_err();
    let RoutingError::Composite(composite) = err else {
        panic!("expected composite error");
    };
    let failure = &composite.routing_result().failures()["1"];
    assert_eq!(failure.exception.as_ref().map(|e| e.error.cause.message.as_str()), Some("boom"));
}

#[tokio::test]
async fn repeated_variables_merge_into_list() {
    let router = ForkJoinRouter::builder(scheduler()).build();
    let original = Event::of(json!(null));
    let set_x = |value: i64| {
        processor_fn("set-x", move |event: Event| async move {
            Ok::<_, RouteExecutionError>(event.into_builder().add_variable("X", TypedValue::of(value)).build())
        })
    };

    let result = router.route(original.clone(), pairs(&original, vec![set_x(1), set_x(2)])).await.unwrap();
    assert_eq!(result.variable("X").map(|v| v.value.clone()), Some(json!([1, 2])));
}

#[tokio::test(start_paused = true)]
async fn concurrency_bound_is_never_exceeded() {
    let running = Arc::new(AtomicUsize::new(0));
    let peak = Arc::new(AtomicUsize::new(0));
    let tracked = {
        let running = running.clone();
        let peak = peak.clone();
        processor_fn("tracked", move |event: Event| {
            let running = running.clone();
            let peak = peak.clone();
            async move {
                let now = running.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(5)).await;
                running.fetch_sub(1, Ordering::SeqCst);
                Ok::<_, RouteExecutionError>(event)
            }
        })
    };
    let router = ForkJoinRouter::builder(scheduler()).max_concurrency(2).build();
    let original = Event::of(json!("in"));
    let routes = (0..6).map(|_| tracked.clone()).collect();

    let result = router.route(original.clone(), pairs(&original, routes)).await.unwrap();
    assert_eq!(result.payload().value.as_object().unwrap().len(), 6);
    assert_eq!(peak.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn timeout_with_delay_errors_reports_sequence() {
    let router = ForkJoinRouter::builder(scheduler()).timeout(Duration::from_secs(1)).build();
    let original = Event::of(json!("in"));
    let routes = vec![ok_route(json!("slow"), 10_000), ok_route(json!("fast"), 10)];

    let err = router.route(original.clone(), pairs(&original, routes)).await.unwrap_err();
    let RoutingError::Composite(composite) = err else {
        panic!("expected composite error");
    };
    assert_eq!(composite.failed_routes(), vec!["1"]);
    let timeout = &composite.errors()[0];
    assert_eq!(timeout.error_type, ErrorType::timeout());
    assert_eq!(timeout.description, "Route Timeout");
    assert_eq!(timeout.detailed_description, "Timeout while processing route/part: '1'");
    assert_eq!(timeout.cause.kind, "TimeoutException");
    assert!(composite.routing_result().results().contains_key("2"));
}

#[tokio::test(start_paused = true)]
async fn timeout_fail_fast_and_branch_is_cancelled() {
    let finished = Arc::new(AtomicBool::new(false));
    let slow = {
        let finished = finished.clone();
        processor_fn("slow", move |event: Event| {
            let finished = finished.clone();
            async move {
                tokio::time::sleep(Duration::from_secs(10)).await;
                finished.store(true, Ordering::SeqCst);
                Ok::<_, RouteExecutionError>(event)
            }
        })
    };
    let router = ForkJoinRouter::builder(scheduler()).delay_errors(false)
                                                     .timeout(Duration::from_millis(500))
                                                     .build();
    let original = Event::of(json!("in"));

    let err = router.route(original.clone(), pairs(&original, vec![slow])).await.unwrap_err();
    match err {
        RoutingError::Timeout(t) => {
            assert_eq!(t.sequence, 1);
            assert_eq!(t.to_string(), "Timeout while processing route/part: '1'");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    tokio::time::sleep(Duration::from_secs(20)).await;
    assert!(!finished.load(Ordering::SeqCst));
}

#[tokio::test]
async fn original_error_is_excluded_from_aggregate() {
    let upstream = EventError::new(ErrorType::new("APP", "UPSTREAM"), "upstream", ErrorCause::new("E", "upstream"));
    let original = Event::builder(&Event::of(json!("in"))).error(upstream).build();
    let router = ForkJoinRouter::builder(scheduler()).build();
    let pass = processor_fn("pass", |event: Event| async move { Ok::<_, RouteExecutionError>(event) });

    let err = router.route(original.clone(), pairs(&original, vec![pass.clone(), failing_route("new", 0)]))
                    .await
                    .unwrap_err();
    let RoutingError::Composite(composite) = err else {
        panic!("expected composite error");
    };
    assert_eq!(composite.failed_routes(), vec!["2"]);
    assert!(composite.routing_result().results().contains_key("1"));

    // sólo el error heredado: no hay errores nuevos, la operación termina bien
    let ok = router.route(original.clone(), pairs(&original, vec![pass.clone(), pass])).await;
    assert!(ok.is_ok());
}

#[tokio::test]
async fn join_only_keeps_original_message() {
    let router = ForkJoinRouter::builder(scheduler()).aggregator(Arc::new(JoinOnlyAggregator)).build();
    let original = Event::of(json!("keep me"));
    let result = router.route(original.clone(), pairs(&original, vec![ok_route(json!("x"), 0)])).await.unwrap();
    assert_eq!(result.payload().value, json!("keep me"));
}

#[tokio::test]
async fn rejected_submission_fails_the_route() {
    let shut = TokioScheduler::current().unwrap();
    shut.shutdown();
    let router = ForkJoinRouter::builder(Arc::new(shut)).build();
    let original = Event::of(json!("in"));
    let err = router.route(original.clone(), pairs(&original, vec![ok_route(json!(1), 0)])).await.unwrap_err();
    assert!(matches!(err, RoutingError::Scheduler(_)));
}

#[derive(Default)]
struct CountingTracer {
    started: AtomicUsize,
    ended: AtomicUsize,
}

impl EventTracer for CountingTracer {
    fn start_span(&self, _event: &Event, name: &str) {
        assert_eq!(name, "scatter-gather:route");
        self.started.fetch_add(1, Ordering::SeqCst);
    }

    fn end_span(&self, _event: &Event) {
        self.ended.fetch_add(1, Ordering::SeqCst);
    }
}

#[tokio::test]
async fn tracer_sees_every_branch() {
    let tracer = Arc::new(CountingTracer::default());
    let router = ForkJoinRouter::builder(scheduler()).tracer(tracer.clone()).build();
    let original = Event::of(json!("in"));
    let routes = vec![ok_route(json!(1), 0), failing_route("x", 0), ok_route(json!(3), 0)];
    let _ = router.route(original.clone(), pairs(&original, routes)).await;
    assert_eq!(tracer.started.load(Ordering::SeqCst), 3);
    assert_eq!(tracer.ended.load(Ordering::SeqCst), 3);
}
