//! Router foreach: divide un evento en elementos y ejecuta la cadena
//! anidada una vez por elemento, en secuencia.
//!
//! Máquina de estados por evento fuente:
//! - START: valida, agrega la variable de mensaje raíz, divide; un split
//!   vacío devuelve el evento sin cambios. Si hay elementos guarda los
//!   valores previos (contador, mensaje raíz, clave de split), registra el
//!   contexto bajo una `ContextKey` nueva y emite el elemento 1.
//! - AFTER_CHAIN(i): ejecuta el callback de finalización pendiente; si
//!   quedan elementos construye el i+1 a partir del evento devuelto por la
//!   cadena, si no pasa a FINALIZE.
//! - FINALIZE: restaura variables, clave de split, secuencia de ítem y
//!   mensaje original, elimina el contexto y devuelve.
//!
//! Cualquier error (split, avance del iterador o cadena) elimina el
//! contexto, restaura la secuencia de ítem del evento fallido y se propaga
//! etiquetado con el componente. Si la cadena hace panic o el futuro se
//! descarta a mitad del loop, el contexto también se elimina.
mod builder;
mod splitter;
mod stream;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use log::{debug, warn};
use route_core::constants::MAP_NOT_SUPPORTED_MESSAGE;
use route_core::errors::RegistryError;
use route_core::{ContextKey, ContextRegistry, Event, EventBuilder, EventError, EventTracer, ForeachContext, ItemSequenceInfo,
                 Message, Processor, RouteExecutionError, RoutingError, Scheduler, SplitElement, SplitIter, TypedValue,
                 ValidationError};

pub use builder::ForeachRouterBuilder;
pub use splitter::{batched, split_value, PayloadSplitter, PointerSplitter, SplitExpression};

use crate::config::ForeachConfig;

pub struct ForeachRouter {
    pub(crate) config: ForeachConfig,
    pub(crate) expression: Option<Arc<dyn SplitExpression>>,
    pub(crate) chain: Arc<dyn Processor>,
    pub(crate) registry: Arc<ContextRegistry>,
    pub(crate) tracer: Arc<dyn EventTracer>,
    pub(crate) scheduler: Option<Arc<dyn Scheduler>>,
    pub(crate) inflight: AtomicUsize,
    pub(crate) deferred_streams: AtomicUsize,
}

impl ForeachRouter {
    pub fn builder(chain: Arc<dyn Processor>) -> ForeachRouterBuilder {
        ForeachRouterBuilder::new(chain)
    }

    pub fn config(&self) -> &ForeachConfig {
        &self.config
    }

    pub fn registry(&self) -> &Arc<ContextRegistry> {
        &self.registry
    }

    /// Eventos fuente en proceso, sumando todos los streams abiertos sobre
    /// este router.
    pub fn inflight_events(&self) -> usize {
        self.inflight.load(Ordering::SeqCst)
    }

    /// `true` mientras algún stream tiene el upstream terminado pero eventos
    /// propios todavía en vuelo.
    pub fn completion_deferred(&self) -> bool {
        self.deferred_streams.load(Ordering::SeqCst) > 0
    }

    /// Ejecuta la cadena para cada elemento de `event` y devuelve el evento
    /// resultante con el mensaje original restaurado.
    pub async fn split(&self, event: Event) -> Result<Event, RoutingError> {
        if self.config.reject_map_payloads && self.expression.is_none() && event.payload().is_map() {
            warn!("foreach:rejected component={} event_id={} reason=map_payload", self.config.component, event.id());
            return Err(ValidationError::new(MAP_NOT_SUPPORTED_MESSAGE).into());
        }

        let counter_name = &self.config.counter_variable_name;
        let root_name = &self.config.root_message_variable_name;
        let response = Event::builder(&event).add_variable(root_name.clone(), TypedValue::message(event.message()))
                                             .build();

        let iterator = match self.split_elements(&response) {
            Ok(iterator) => iterator,
            Err(error) => return Err(self.fail(response, event.item_sequence(), error)),
        };
        let mut context =
            ForeachContext::new(iterator, event.message().clone(), event.item_sequence()).with_previous(event.variable(counter_name)
                                                                                                             .cloned(),
                                                                                                        event.variable(root_name)
                                                                                                             .cloned(),
                                                                                                        event.split_key());
        if !context.has_next() {
            debug!("foreach:empty component={} event_id={}", self.config.component, event.id());
            return Ok(event);
        }

        let key = ContextKey::new();
        self.registry.insert(key, context)?;
        let _guard = ContextGuard { registry: self.registry.as_ref(),
                                    key,
                                    component: &self.config.component };
        debug!("foreach:start component={} event_id={} key={key}", self.config.component, event.id());

        let mut current = response;
        loop {
            let part = self.next_part(key, &current)?;
            let Some(part) = part else {
                return self.finalize(key, current);
            };

            self.tracer.start_span(&part, &format!("{}:iteration", self.config.component));
            let processed = self.chain.process(part).await;
            let processed = match processed {
                Ok(processed) => processed,
                Err(failure) => {
                    self.tracer.end_span(&failure.event);
                    return Err(self.abort_chain(key, failure));
                }
            };
            self.tracer.end_span(&processed);

            let callback = self.registry.with_context(key, ForeachContext::take_on_complete)?;
            if let Some(callback) = callback {
                callback();
            }
            if !self.registry.with_context(key, ForeachContext::has_next)? {
                return self.finalize(key, processed);
            }
            current = processed;
        }
    }

    fn split_elements(&self, event: &Event) -> Result<SplitIter, EventError> {
        let elements = match &self.expression {
            Some(expression) => expression.split(event),
            None => PayloadSplitter.split(event),
        };
        elements.map(|iter| batched(iter, self.config.batch_size))
                .map_err(|e| e.to_event_error())
    }

    /// Avanza el iterador del contexto y construye el evento del siguiente
    /// elemento. `None` si el iterador se agotó.
    fn next_part(&self, key: ContextKey, current: &Event) -> Result<Option<Event>, RoutingError> {
        let advanced = self.registry
                           .with_context(key, |ctx| ctx.advance().map(|r| r.map(|element| (element, ctx.element_number()))))?;
        let (element, position) = match advanced {
            None => return Ok(None),
            Some(Ok(next)) => next,
            Some(Err(error)) => return Err(self.abort(key, current.clone(), error.to_event_error())),
        };

        let mut builder: EventBuilder = Event::builder(current).item_sequence(Some(ItemSequenceInfo::of(position)))
                                                               .split_key(Some(key));
        match element {
            SplitElement::Value(value) => builder = builder.message(Message::with_typed_payload(value)),
            SplitElement::Message(message) => builder = builder.message(message),
            SplitElement::Configurer(configurer) => {
                configurer.configure(&mut builder);
                self.registry
                    .with_context(key, |ctx| ctx.set_on_complete(Box::new(move || configurer.event_completed())))?;
            }
        }
        let part = builder.add_variable(self.config.counter_variable_name.clone(), TypedValue::of(position))
                          .build();
        debug!("foreach:element component={} key={key} position={position}", self.config.component);
        Ok(Some(part))
    }

    fn finalize(&self, key: ContextKey, event: Event) -> Result<Event, RoutingError> {
        let context = self.registry.remove(key).ok_or(RegistryError::MissingContext(key))?;
        let mut builder = Event::builder(&event).message(context.original_message().clone())
                                                .item_sequence(context.item_sequence())
                                                .split_key(context.previous_split_key());
        builder = restore(builder, &self.config.counter_variable_name, context.previous_counter());
        builder = restore(builder, &self.config.root_message_variable_name, context.previous_root_message());
        debug!("foreach:done component={} key={key} elements={}",
               self.config.component,
               context.element_number());
        Ok(builder.build())
    }

    /// Error al avanzar el iterador: elimina el contexto y propaga.
    fn abort(&self, key: ContextKey, event: Event, error: EventError) -> RoutingError {
        let context = self.registry.remove(key);
        let item_sequence = context.as_ref().and_then(ForeachContext::item_sequence);
        let split_key = context.as_ref().and_then(ForeachContext::previous_split_key);
        let event = Event::builder(&event).split_key(split_key).build();
        self.fail(event, item_sequence, error)
    }

    /// Error devuelto por la cadena anidada.
    fn abort_chain(&self, key: ContextKey, failure: RouteExecutionError) -> RoutingError {
        let context = self.registry.remove(key);
        let item_sequence = context.as_ref().and_then(ForeachContext::item_sequence);
        let split_key = context.as_ref().and_then(ForeachContext::previous_split_key);
        let restored = Event::builder(&failure.event).item_sequence(item_sequence)
                                                     .split_key(split_key)
                                                     .build();
        warn!("foreach:failed component={} key={key} error={}", self.config.component, failure.error.error_type);
        let failure = failure.with_event(restored);
        let failure = if failure.component.is_some() {
            failure
        } else {
            failure.with_component(self.config.component.clone())
        };
        failure.into()
    }

    fn fail(&self, event: Event, item_sequence: Option<ItemSequenceInfo>, error: EventError) -> RoutingError {
        warn!("foreach:failed component={} event_id={} error={}", self.config.component, event.id(), error.error_type);
        let event = Event::builder(&event).item_sequence(item_sequence).build();
        RouteExecutionError::new(event, error).with_component(self.config.component.clone())
                                               .into()
    }
}

/// Elimina el contexto si `split` no llega a FINALIZE ni a un abort: la
/// cadena hizo panic o el futuro se descartó a mitad del loop.
struct ContextGuard<'a> {
    registry: &'a ContextRegistry,
    key: ContextKey,
    component: &'a str,
}

impl Drop for ContextGuard<'_> {
    fn drop(&mut self) {
        if self.registry.remove(self.key).is_some() {
            warn!("foreach:context_dropped component={} key={}", self.component, self.key);
        }
    }
}

/// Restaura una variable a su valor previo al loop (o la elimina si no
/// existía).
fn restore(builder: EventBuilder, name: &str, previous: Option<&TypedValue>) -> EventBuilder {
    match previous {
        Some(value) => builder.add_variable(name.to_string(), value.clone()),
        None => builder.remove_variable(name),
    }
}
