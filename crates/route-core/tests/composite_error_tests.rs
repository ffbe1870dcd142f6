//! Pruebas de `RoutingResult` / `CompositeRoutingError`: orden por clave de
//! ruta, mensaje de diagnóstico y lista estructurada de errores.

use route_core::errors::RouteExecutionError;
use route_core::model::{ErrorCause, ErrorType, EventError, GroupCorrelation};
use route_core::routing::{CompositeRoutingError, RouteOutcome, RoutingResult};
use route_core::Event;
use serde_json::json;

fn branch(seq: u64, payload: serde_json::Value) -> Event {
    Event::builder(&Event::of(payload)).group_correlation(Some(GroupCorrelation::with_size(seq, 3)))
                                       .build()
}

fn failed(seq: u64, kind: &str, message: &str) -> RouteOutcome {
    let err = RouteExecutionError::failure(branch(seq, json!(null)), ErrorType::new("APP", "ROUTE_FAILED"), kind, message);
    RouteOutcome::Failure { event: (*err.event).clone(),
                            error: Some(err) }
}

#[test]
fn composite_lists_failures_in_route_order() {
    let outcomes = vec![failed(1, "IllegalStateException", "first broke"),
                        RouteOutcome::Success(branch(2, json!("ok"))),
                        failed(3, "IOException", "third broke")];
    let result = RoutingResult::from_outcomes(outcomes, true);
    assert_eq!(result.results().keys().collect::<Vec<_>>(), vec!["2"]);
    assert_eq!(result.failures().keys().collect::<Vec<_>>(), vec!["1", "3"]);

    let composite = CompositeRoutingError::new(result);
    assert_eq!(composite.failed_routes(), vec!["1", "3"]);

    let errors = composite.errors();
    assert_eq!(errors.len(), 2);
    assert_eq!(errors[0].cause.message, "first broke");
    assert_eq!(errors[1].cause.message, "third broke");

    let msg = composite.to_string();
    assert_eq!(msg,
               "Exception(s) were found for route(s): \n\t1: IllegalStateException: first broke\n\t3: IOException: third broke");
}

#[test]
fn detail_flag_controls_retained_exception() {
    let outcomes = || vec![failed(1, "E", "x")];
    let detailed = RoutingResult::from_outcomes(outcomes(), true);
    let plain = RoutingResult::from_outcomes(outcomes(), false);
    assert!(detailed.failures()["1"].exception.is_some());
    assert!(plain.failures()["1"].exception.is_none());
    // el error del evento siempre está presente, con o sin detalle
    assert_eq!(plain.failures()["1"].error.cause.kind, "E");
}

#[test]
fn detailed_message_and_composed_error() {
    let composite = CompositeRoutingError::new(RoutingResult::from_outcomes(vec![failed(2, "E", "nope")], false));
    let detailed = composite.detailed_message();
    assert!(detailed.contains("Route 2: Caught exception in Exception Strategy: nope"));

    let composed: EventError = composite.to_event_error(ErrorType::composite_routing());
    assert_eq!(composed.cause, ErrorCause::new("CompositeRoutingException", composite.to_string()));
    assert_eq!(composed.detailed_description, detailed);
}

#[test]
fn success_outcome_carrying_error_counts_as_failure() {
    let err = EventError::new(ErrorType::new("APP", "X"), "late", ErrorCause::new("E", "late"));
    let ev = Event::builder(&branch(1, json!(1))).error(err).build();
    let result = RoutingResult::from_outcomes(vec![RouteOutcome::Success(ev)], true);
    assert!(!result.is_success());
    assert!(result.failures()["1"].exception.is_none());
}
