//! Mensaje lógico: payload tipado + atributos.
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::TypedValue;

/// Mensaje transportado por un `Event`. El router no interpreta su semántica.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub payload: TypedValue,
    pub attributes: Value, // metadatos del conector de origen (opaco)
}

impl Message {
    /// Mensaje con payload inferido y sin atributos.
    pub fn of(payload: impl Into<Value>) -> Self {
        Self { payload: TypedValue::of(payload),
               attributes: Value::Null }
    }

    pub fn with_typed_payload(payload: TypedValue) -> Self {
        Self { payload,
               attributes: Value::Null }
    }

    pub fn null() -> Self {
        Self { payload: TypedValue::null(),
               attributes: Value::Null }
    }

    /// Copia el mensaje reemplazando sólo el payload (conserva atributos).
    pub fn with_payload(&self, payload: TypedValue) -> Self {
        Self { payload,
               attributes: self.attributes.clone() }
    }

    pub fn with_attributes(mut self, attributes: Value) -> Self {
        self.attributes = attributes;
        self
    }
}

impl Default for Message {
    fn default() -> Self {
        Self::null()
    }
}
