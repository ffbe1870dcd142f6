//! `CompositeRoutingError`: agregación de los fallos de varias rutas de un
//! mismo router.
//!
//! El mensaje enumera cada ruta fallida en orden de clave con el tipo y el
//! mensaje de su causa:
//!
//! ```text
//! Exception(s) were found for route(s):
//! 	1: IllegalStateException: boom
//! 	3: TimeoutException: Timeout while processing route/part: '3'
//! ```
use thiserror::Error;

use crate::constants::COMPOSITE_MESSAGE_TITLE;
use crate::model::{ErrorCause, ErrorType, EventError};

use super::RoutingResult;

#[derive(Debug, Error, Clone)]
#[error("{message}")]
pub struct CompositeRoutingError {
    message: String,
    routing_result: RoutingResult,
}

impl CompositeRoutingError {
    pub fn new(routing_result: RoutingResult) -> Self {
        let message = build_message(&routing_result);
        Self { message,
               routing_result }
    }

    pub fn routing_result(&self) -> &RoutingResult {
        &self.routing_result
    }

    /// Un error por ruta fallida, en orden de inserción.
    pub fn errors(&self) -> Vec<EventError> {
        self.routing_result.failures().values().map(|f| f.error.clone()).collect()
    }

    /// Claves de las rutas fallidas, en orden.
    pub fn failed_routes(&self) -> Vec<&str> {
        self.routing_result.failures().keys().map(String::as_str).collect()
    }

    /// Mensaje extendido, una línea por ruta fallida.
    pub fn detailed_message(&self) -> String {
        let mut out = String::from(COMPOSITE_MESSAGE_TITLE);
        out.push('\n');
        for (key, failure) in self.routing_result.failures() {
            out.push_str(&format!("Route {key}: Caught exception in Exception Strategy: {}\n", failure.error.cause.message));
        }
        out
    }

    /// Compone un único `EventError` para reportar aguas abajo.
    pub fn to_event_error(&self, error_type: ErrorType) -> EventError {
        EventError::new(error_type, self.message.clone(), ErrorCause::new("CompositeRoutingException", self.message.clone()))
            .with_detailed_description(self.detailed_message())
    }
}

fn build_message(result: &RoutingResult) -> String {
    let mut out = String::from(COMPOSITE_MESSAGE_TITLE);
    for (key, failure) in result.failures() {
        let cause = &failure.error.cause;
        out.push_str(&format!("\n\t{key}: {}: {}", cause.kind, cause.message));
    }
    out
}
