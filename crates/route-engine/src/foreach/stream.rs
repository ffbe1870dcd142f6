//! Modo stream del foreach.
//!
//! Cada evento fuente que llega por el canal de entrada se divide en su
//! propia tarea del scheduler. Cada llamada a `route_stream` lleva su propia
//! cuenta de eventos en vuelo: cuando su upstream termina con eventos
//! todavía en proceso, difiere el cierre de su canal de salida hasta que
//! termine el último. Una tarea que muere sin entregar resultado (panic o
//! cancelación) se reporta como `ROUTING:BRANCH_ABORTED`.
use std::sync::atomic::Ordering;
use std::sync::Arc;

use futures::future::BoxFuture;
use futures::stream::{FuturesUnordered, StreamExt};
use log::{debug, warn};
use route_core::{ErrorType, Event, RouteExecutionError, RoutingError, Scheduler, TokioScheduler};
use tokio::sync::{mpsc, oneshot};

use super::ForeachRouter;

type SplitFuture = BoxFuture<'static, Result<Event, RoutingError>>;

impl ForeachRouter {
    /// Procesa `upstream` y devuelve el canal con un resultado por evento
    /// fuente, en orden de finalización.
    pub fn route_stream(self: &Arc<Self>,
                        upstream: mpsc::Receiver<Event>)
                        -> Result<mpsc::Receiver<Result<Event, RoutingError>>, RoutingError> {
        let scheduler: Arc<dyn Scheduler> = match &self.scheduler {
            Some(scheduler) => Arc::clone(scheduler),
            None => Arc::new(TokioScheduler::current()?),
        };
        let (downstream, receiver) = mpsc::channel(self.config.stream_buffer.max(1));
        let router = Arc::clone(self);
        let driver_scheduler = Arc::clone(&scheduler);
        let driver = async move { router.drive(upstream, downstream, driver_scheduler).await };
        scheduler.submit(Box::pin(driver))?;
        Ok(receiver)
    }

    async fn drive(self: Arc<Self>,
                   mut upstream: mpsc::Receiver<Event>,
                   downstream: mpsc::Sender<Result<Event, RoutingError>>,
                   scheduler: Arc<dyn Scheduler>) {
        let mut running: FuturesUnordered<SplitFuture> = FuturesUnordered::new();
        let mut upstream_done = false;
        let mut deferred = false;
        debug!("foreach:stream_start component={}", self.config.component);

        loop {
            if upstream_done && running.is_empty() {
                break;
            }
            tokio::select! {
                received = upstream.recv(), if !upstream_done => match received {
                    Some(event) => match self.spawn_split(&scheduler, event) {
                        Ok(split) => {
                            self.inflight.fetch_add(1, Ordering::SeqCst);
                            running.push(split);
                        }
                        Err(rejected) => {
                            if downstream.send(Err(rejected)).await.is_err() {
                                warn!("foreach:stream downstream closed component={}", self.config.component);
                            }
                        }
                    },
                    None => {
                        upstream_done = true;
                        if !running.is_empty() {
                            deferred = true;
                            self.deferred_streams.fetch_add(1, Ordering::SeqCst);
                            debug!("foreach:completion_deferred component={} inflight={}",
                                   self.config.component,
                                   running.len());
                        }
                    }
                },
                Some(result) = running.next(), if !running.is_empty() => {
                    self.inflight.fetch_sub(1, Ordering::SeqCst);
                    if downstream.send(result).await.is_err() {
                        warn!("foreach:stream downstream closed component={}", self.config.component);
                    }
                }
                else => break,
            }
        }

        if deferred {
            self.deferred_streams.fetch_sub(1, Ordering::SeqCst);
        }
        debug!("foreach:stream_done component={}", self.config.component);
    }

    /// Envía el split de `event` al scheduler y devuelve el futuro que espera
    /// su resultado.
    fn spawn_split(self: &Arc<Self>, scheduler: &Arc<dyn Scheduler>, event: Event) -> Result<SplitFuture, RoutingError> {
        let (tx, rx) = oneshot::channel();
        let router = Arc::clone(self);
        let source = event.clone();
        let work = async move {
            let result = router.split(event).await;
            let _ = tx.send(result);
        };
        scheduler.submit(Box::pin(work))?;

        let component = self.config.component.clone();
        Ok(Box::pin(async move {
            match rx.await {
                Ok(result) => result,
                // el emisor se descartó sin enviar: la tarea murió
                Err(_) => {
                    warn!("foreach:aborted component={component} event_id={}", source.id());
                    Err(RouteExecutionError::failure(source,
                                                     ErrorType::branch_aborted(),
                                                     "CancellationException",
                                                     "foreach task ended without a result").with_component(component)
                                                                                           .into())
                }
            }
        }))
    }
}
