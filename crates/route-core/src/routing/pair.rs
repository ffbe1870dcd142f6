use std::fmt;
use std::sync::Arc;

use crate::errors::RouteExecutionError;
use crate::event::Event;
use crate::runtime::Processor;

/// Unidad enviada al fork-join: la variante del evento para una rama y la
/// ruta que la procesa. El orden de los pares es significativo.
#[derive(Clone)]
pub struct RoutingPair {
    pub event: Event,
    pub route: Arc<dyn Processor>,
}

impl RoutingPair {
    pub fn of(event: Event, route: Arc<dyn Processor>) -> Self {
        Self { event, route }
    }
}

impl fmt::Debug for RoutingPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RoutingPair")
         .field("event", &self.event.id())
         .field("route", &self.route.name())
         .finish()
    }
}

/// Resultado de una rama.
#[derive(Debug, Clone)]
pub enum RouteOutcome {
    Success(Event),
    /// El evento lleva el `EventError` que disparó el fallo; `error` guarda
    /// el error de ruta completo cuando se conserva el detalle.
    Failure {
        event: Event,
        error: Option<RouteExecutionError>,
    },
}

impl RouteOutcome {
    pub fn event(&self) -> &Event {
        match self {
            Self::Success(event) | Self::Failure { event, .. } => event,
        }
    }

    pub fn into_event(self) -> Event {
        match self {
            Self::Success(event) | Self::Failure { event, .. } => event,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failure { .. })
    }
}
