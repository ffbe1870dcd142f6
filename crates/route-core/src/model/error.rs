//! Error transportado por un evento (`EventError`).
//!
//! Un `EventError` es el registro inmutable de un fallo que viaja con el
//! evento aguas abajo. Dos errores son iguales sólo si tienen el mismo `id`:
//! así el fork-join distingue un error heredado del evento original de uno
//! nuevo producido por una rama aunque describan lo mismo.
use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Tipo de error `NAMESPACE:IDENTIFIER`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ErrorType {
    pub namespace: String,
    pub identifier: String,
}

impl ErrorType {
    pub fn new(namespace: impl Into<String>, identifier: impl Into<String>) -> Self {
        Self { namespace: namespace.into(),
               identifier: identifier.into() }
    }

    /// `ROUTING:TIMEOUT`, tipo por defecto de los timeouts de rama.
    pub fn timeout() -> Self {
        Self::new(crate::constants::ROUTING_NAMESPACE, "TIMEOUT")
    }

    /// `ROUTING:COMPOSITE_ROUTING`.
    pub fn composite_routing() -> Self {
        Self::new(crate::constants::ROUTING_NAMESPACE, "COMPOSITE_ROUTING")
    }

    /// `ROUTING:BRANCH_ABORTED`, tarea de rama o de foreach que terminó sin
    /// entregar resultado (panic o cancelación).
    pub fn branch_aborted() -> Self {
        Self::new(crate::constants::ROUTING_NAMESPACE, "BRANCH_ABORTED")
    }

    /// `ROUTING:SPLIT`, errores al dividir o avanzar el iterador del foreach.
    pub fn split() -> Self {
        Self::new(crate::constants::ROUTING_NAMESPACE, "SPLIT")
    }
}

impl fmt::Display for ErrorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.namespace, self.identifier)
    }
}

/// Causa original del error: nombre de tipo + mensaje.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorCause {
    pub kind: String,
    pub message: String,
}

impl ErrorCause {
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self { kind: kind.into(),
               message: message.into() }
    }
}

impl fmt::Display for ErrorCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventError {
    id: Uuid,
    pub error_type: ErrorType,
    pub description: String,
    pub detailed_description: String,
    pub cause: ErrorCause,
}

impl EventError {
    /// Crea un error nuevo (identidad nueva). Descripción detallada = descripción.
    pub fn new(error_type: ErrorType, description: impl Into<String>, cause: ErrorCause) -> Self {
        let description = description.into();
        Self { id: Uuid::new_v4(),
               error_type,
               detailed_description: description.clone(),
               description,
               cause }
    }

    pub fn with_detailed_description(mut self, detailed: impl Into<String>) -> Self {
        self.detailed_description = detailed.into();
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }
}

impl PartialEq for EventError {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for EventError {}

impl fmt::Display for EventError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): {}", self.error_type, self.description, self.cause)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equality_is_by_identity() {
        let cause = ErrorCause::new("IllegalStateException", "boom");
        let a = EventError::new(ErrorType::new("APP", "FAIL"), "boom", cause.clone());
        let b = EventError::new(ErrorType::new("APP", "FAIL"), "boom", cause);
        assert_ne!(a, b);
        assert_eq!(a, a.clone());
    }

    #[test]
    fn display_includes_type_and_cause() {
        let e = EventError::new(ErrorType::timeout(), "Route Timeout", ErrorCause::new("TimeoutException", "late"));
        assert_eq!(e.to_string(), "ROUTING:TIMEOUT (Route Timeout): TimeoutException: late");
    }
}
