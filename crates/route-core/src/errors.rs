//! Taxonomía de errores del núcleo de ruteo.
//!
//! - `ValidationError`: destino de split ilegal (se rechaza antes de
//!   despachar trabajo).
//! - `RouteTimeoutError`: una rama excedió su plazo (modo fail-fast).
//! - `RouteExecutionError`: error surgido de una ruta o cadena anidada.
//! - `CompositeRoutingError`: agregación de fallos por ruta (delay-errors).

use thiserror::Error;

use crate::event::Event;
use crate::model::{ContextKey, ErrorCause, ErrorType, EventError};
pub use crate::routing::CompositeRoutingError;

#[derive(Debug, Error, Clone)]
pub enum RoutingError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Timeout(#[from] RouteTimeoutError),
    #[error(transparent)]
    Execution(#[from] RouteExecutionError),
    #[error(transparent)]
    Composite(#[from] CompositeRoutingError),
    #[error(transparent)]
    Scheduler(#[from] SchedulerError),
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

impl RoutingError {
    /// Errores de rama individuales que componen este error (uno para los
    /// errores simples, N para el compuesto).
    pub fn event_errors(&self) -> Vec<EventError> {
        match self {
            Self::Execution(e) => vec![e.error.clone()],
            Self::Composite(c) => c.errors(),
            _ => Vec::new(),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("validation failed: {message}")]
pub struct ValidationError {
    pub message: String,
}

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

/// Timeout de una rama en modo fail-fast.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{description}")]
pub struct RouteTimeoutError {
    pub sequence: u64,
    pub description: String,
}

impl RouteTimeoutError {
    pub fn new(sequence: u64) -> Self {
        Self { sequence,
               description: timeout_detailed_description(sequence) }
    }
}

/// `"Timeout while processing route/part: '<sequence>'"`.
pub fn timeout_detailed_description(sequence: u64) -> String {
    format!("{} '{}'", crate::constants::TIMEOUT_DETAILED_DESCRIPTION_PREFIX, sequence)
}

/// Error de una ruta: el evento parcialmente procesado más el error que
/// lo detuvo, opcionalmente etiquetado con el componente dueño.
#[derive(Debug, Error, Clone)]
#[error("{}{}", component_prefix(.component), .error)]
pub struct RouteExecutionError {
    pub event: Box<Event>,
    pub error: EventError,
    pub component: Option<String>,
}

impl RouteExecutionError {
    /// Construye el error y deja `error` también registrado en el evento.
    pub fn new(event: Event, error: EventError) -> Self {
        let event = Event::builder(&event).error(error.clone()).build();
        Self { event: Box::new(event),
               error,
               component: None }
    }

    /// Atajo para rutas de usuario: error con causa `kind: message`.
    pub fn failure(event: Event, error_type: ErrorType, kind: &str, message: &str) -> Self {
        Self::new(event, EventError::new(error_type, message, ErrorCause::new(kind, message)))
    }

    pub fn with_component(mut self, component: impl Into<String>) -> Self {
        self.component = Some(component.into());
        self
    }

    /// Reemplaza el evento procesado conservando el error.
    pub fn with_event(mut self, event: Event) -> Self {
        self.event = Box::new(Event::builder(&event).error(self.error.clone()).build());
        self
    }

    pub fn into_event(self) -> Event {
        *self.event
    }
}

fn component_prefix(component: &Option<String>) -> String {
    component.as_deref().map(|c| format!("[{c}] ")).unwrap_or_default()
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SchedulerError {
    #[error("scheduler rejected work: {0}")]
    Rejected(String),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("foreach context already registered: {0}")]
    DuplicateContext(ContextKey),
    #[error("foreach context not found: {0}")]
    MissingContext(ContextKey),
}

/// Fallo al evaluar la expresión de split o al avanzar su iterador.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SplitError {
    #[error("split expression failed: {0}")]
    Expression(String),
    #[error("iteration failed: {0}")]
    Iteration(String),
    #[error("builder configurer elements cannot be batched")]
    UnbatchableElement,
}

impl SplitError {
    /// Convierte el fallo en un `EventError` de tipo `ROUTING:SPLIT`.
    pub fn to_event_error(&self) -> EventError {
        let kind = match self {
            Self::Expression(_) => "SplitExpressionException",
            Self::Iteration(_) => "IterationException",
            Self::UnbatchableElement => "IllegalArgumentException",
        };
        let message = self.to_string();
        EventError::new(ErrorType::split(), message.clone(), ErrorCause::new(kind, message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn timeout_description_format() {
        let e = RouteTimeoutError::new(3);
        assert_eq!(e.to_string(), "Timeout while processing route/part: '3'");
    }

    #[test]
    fn execution_error_records_error_on_event() {
        let err = RouteExecutionError::failure(Event::of(json!(1)), ErrorType::new("APP", "BAD"), "IllegalStateException", "bad");
        assert_eq!(err.event.error(), Some(&err.error));
        let tagged = err.with_component("foreach");
        assert!(tagged.to_string().starts_with("[foreach] APP:BAD"));
    }

    #[test]
    fn split_error_maps_to_split_type() {
        let e = SplitError::Iteration("broken".into()).to_event_error();
        assert_eq!(e.error_type, ErrorType::split());
        assert_eq!(e.cause.kind, "IterationException");
    }
}
