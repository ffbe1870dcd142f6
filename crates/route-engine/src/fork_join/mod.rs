//! Router fork-join (scatter-gather).
//!
//! Flujo de `route`:
//! 1. Cada par recibe una secuencia 1-based (`GroupCorrelation`) en orden de
//!    entrada.
//! 2. Las ramas se envían al `Scheduler` con a lo sumo `max_concurrency` en
//!    vuelo; "en vuelo" = despachada y aún no emitida en orden.
//! 3. Los resultados llegan en orden de finalización y se reordenan por
//!    secuencia en un buffer (`BTreeMap`).
//! 4. Errores: fail-fast aborta con el primer error nuevo; delay-errors
//!    espera a todas las ramas y construye un `CompositeRoutingError`.
//! 5. Sin errores nuevos: merge de variables y ensamblado del payload por el
//!    `ResultAggregator`.
mod aggregator;
mod builder;

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use futures::future::BoxFuture;
use futures::stream::{FuturesUnordered, StreamExt};
use log::{debug, warn};
use route_core::constants::{TIMEOUT_CAUSE_KIND, TIMEOUT_DESCRIPTION};
use route_core::errors::timeout_detailed_description;
use route_core::{Clock, CompositeRoutingError, ErrorCause, ErrorType, Event, EventError, EventTracer, GroupCorrelation, Message,
                 RouteExecutionError, RouteOutcome, RouteTimeoutError, RoutingError, RoutingPair, RoutingResult, Scheduler};
use tokio::sync::oneshot;

pub use aggregator::{CollectListAggregator, CollectMapAggregator, JoinOnlyAggregator, ResultAggregator};
pub use builder::ForkJoinRouterBuilder;

use crate::config::ForkJoinConfig;
use crate::merge::merge_variables;

/// Cómo terminó la espera de una rama.
enum Completion {
    Finished(Result<Event, RouteExecutionError>),
    /// Venció el plazo; la tarea ya fue cancelada.
    TimedOut(Event),
    /// La tarea terminó sin entregar resultado (cancelada o con panic).
    Aborted(Event),
}

type BranchFuture = BoxFuture<'static, (u64, Completion)>;

pub struct ForkJoinRouter {
    pub(crate) config: ForkJoinConfig,
    pub(crate) scheduler: Arc<dyn Scheduler>,
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) tracer: Arc<dyn EventTracer>,
    pub(crate) aggregator: Arc<dyn ResultAggregator>,
}

impl ForkJoinRouter {
    pub fn builder(scheduler: Arc<dyn Scheduler>) -> ForkJoinRouterBuilder {
        ForkJoinRouterBuilder::new(scheduler)
    }

    pub fn config(&self) -> &ForkJoinConfig {
        &self.config
    }

    /// Rutea `original` a cada par y une los resultados en un único evento.
    pub async fn route(&self, original: Event, pairs: Vec<RoutingPair>) -> Result<Event, RoutingError> {
        let group_size = pairs.len() as u64;
        let max = self.config.max_concurrency.max(1);
        debug!("fork_join:start component={} event_id={} routes={} max_concurrency={} delay_errors={}",
               self.config.component,
               original.id(),
               group_size,
               max,
               self.config.delay_errors);

        let sequence = AtomicU64::new(0);
        let mut pending = pairs.into_iter().map(|pair| {
                                               let seq = sequence.fetch_add(1, Ordering::Relaxed) + 1;
                                               let event = Event::builder(&pair.event)
                                                   .group_correlation(Some(GroupCorrelation::with_size(seq, group_size)))
                                                   .build();
                                               (seq, RoutingPair::of(event, pair.route))
                                           });

        let mut in_flight: FuturesUnordered<BranchFuture> = FuturesUnordered::new();
        let mut reorder: BTreeMap<u64, RouteOutcome> = BTreeMap::new();
        let mut next_to_emit = 1u64;
        let mut joined: Vec<RouteOutcome> = Vec::with_capacity(group_size as usize);
        let mut has_new_error = false;

        loop {
            while in_flight.len() + reorder.len() < max {
                let Some((seq, pair)) = pending.next() else { break };
                in_flight.push(self.dispatch(seq, pair)?);
            }
            let Some((seq, completion)) = in_flight.next().await else { break };
            let outcome = self.settle(&original, seq, completion, &mut has_new_error)?;
            reorder.insert(seq, outcome);
            while let Some(outcome) = reorder.remove(&next_to_emit) {
                joined.push(outcome);
                next_to_emit += 1;
            }
        }

        let original_error = original.error();
        if has_new_error {
            let outcomes = joined.into_iter().map(|o| clear_original_error(o, original_error));
            let composite = CompositeRoutingError::new(RoutingResult::from_outcomes(outcomes, self.config.detailed_errors));
            warn!("fork_join:failed component={} event_id={} failed_routes={:?}",
                  self.config.component,
                  original.id(),
                  composite.failed_routes());
            return Err(composite.into());
        }

        let events: Vec<Event> = joined.into_iter().map(RouteOutcome::into_event).collect();
        let mut builder = Event::builder(&original);
        if self.config.merge_variables {
            for (key, value) in merge_variables(&original, &events) {
                builder = builder.add_variable(key, value);
            }
        }
        let result = self.aggregator.aggregate(&original, builder, events);
        debug!("fork_join:done component={} event_id={} routes={}", self.config.component, original.id(), group_size);
        Ok(result)
    }

    /// Envía la rama al scheduler y devuelve el futuro que espera su
    /// resultado (o el vencimiento del plazo, medido desde aquí).
    fn dispatch(&self, seq: u64, pair: RoutingPair) -> Result<BranchFuture, RoutingError> {
        let RoutingPair { event, route } = pair;
        let (tx, rx) = oneshot::channel();
        let tracer = Arc::clone(&self.tracer);
        let span = format!("{}:route", self.config.component);
        let branch_event = event.clone();

        let work = async move {
            tracer.start_span(&branch_event, &span);
            let result = route.process(branch_event).await;
            match &result {
                Ok(done) => tracer.end_span(done),
                Err(failed) => tracer.end_span(&failed.event),
            }
            // receptor descartado: el fork ya abortó, el resultado se ignora
            let _ = tx.send(result);
        };
        let handle = self.scheduler.submit(Box::pin(work))?;
        debug!("fork_join:dispatch component={} seq={seq}", self.config.component);

        let deadline = self.config.timeout.map(|t| self.clock.sleep(t));
        Ok(Box::pin(async move {
            let completion = match deadline {
                Some(deadline) => tokio::select! {
                    received = rx => match received {
                        Ok(result) => Completion::Finished(result),
                        Err(_) => Completion::Aborted(event),
                    },
                    _ = deadline => {
                        handle.cancel();
                        Completion::TimedOut(event)
                    }
                },
                None => match rx.await {
                    Ok(result) => Completion::Finished(result),
                    Err(_) => Completion::Aborted(event),
                },
            };
            (seq, completion)
        }))
    }

    /// Convierte la finalización de una rama en su outcome. Devuelve `Err`
    /// cuando la operación completa debe abortar (fail-fast).
    fn settle(&self,
              original: &Event,
              seq: u64,
              completion: Completion,
              has_new_error: &mut bool)
              -> Result<RouteOutcome, RoutingError> {
        let delay = self.config.delay_errors;
        let original_error = original.error();
        match completion {
            Completion::Finished(Ok(event)) => {
                let new_error = event.error().filter(|e| Some(*e) != original_error).cloned();
                if let Some(error) = new_error {
                    if !delay {
                        warn!("fork_join:abort component={} seq={seq} error={}", self.config.component, error.error_type);
                        return Err(self.tag(RouteExecutionError::new(event, error)).into());
                    }
                    *has_new_error = true;
                }
                Ok(RouteOutcome::Success(event))
            }
            Completion::Finished(Err(failure)) => {
                let is_new = Some(&failure.error) != original_error;
                if is_new && !delay {
                    warn!("fork_join:abort component={} seq={seq} error={}",
                          self.config.component,
                          failure.error.error_type);
                    return Err(self.tag(failure).into());
                }
                *has_new_error |= is_new;
                Ok(failure_outcome(failure))
            }
            Completion::TimedOut(event) => {
                warn!("fork_join:timeout component={} seq={seq} timeout={:?}", self.config.component, self.config.timeout);
                if !delay {
                    return Err(RouteTimeoutError::new(seq).into());
                }
                *has_new_error = true;
                let error = EventError::new(self.config.timeout_error_type.clone(),
                                            TIMEOUT_DESCRIPTION,
                                            ErrorCause::new(TIMEOUT_CAUSE_KIND, timeout_detailed_description(seq)))
                    .with_detailed_description(timeout_detailed_description(seq));
                let timed_out = Event::builder(&event).message(Message::null()).build();
                Ok(failure_outcome(self.tag(RouteExecutionError::new(timed_out, error))))
            }
            Completion::Aborted(event) => {
                warn!("fork_join:aborted component={} seq={seq}", self.config.component);
                let failure = self.tag(RouteExecutionError::failure(event,
                                                                    ErrorType::branch_aborted(),
                                                                    "CancellationException",
                                                                    "branch task ended without a result"));
                if !delay {
                    return Err(failure.into());
                }
                *has_new_error = true;
                Ok(failure_outcome(failure))
            }
        }
    }

    fn tag(&self, error: RouteExecutionError) -> RouteExecutionError {
        if error.component.is_some() {
            error
        } else {
            error.with_component(self.config.component.clone())
        }
    }
}

fn failure_outcome(error: RouteExecutionError) -> RouteOutcome {
    RouteOutcome::Failure { event: (*error.event).clone(),
                            error: Some(error) }
}

/// Las ramas que sólo arrastran el error del evento original cuentan como
/// éxitos: ese error no es de ninguna ruta.
fn clear_original_error(outcome: RouteOutcome, original_error: Option<&EventError>) -> RouteOutcome {
    match (outcome.event().error(), original_error) {
        (Some(error), Some(original)) if error == original => {
            RouteOutcome::Success(outcome.into_event().into_builder().clear_error().build())
        }
        _ => outcome,
    }
}
