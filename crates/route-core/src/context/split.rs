//! Elementos producidos por un split.
use std::fmt;

use crate::errors::SplitError;
use crate::event::EventBuilder;
use crate::model::{Message, TypedValue};

/// Configurador de builder transportado como valor de un elemento. Permite
/// que un caller construya el evento del elemento a su manera y sea
/// notificado cuando la cadena anidada termina con él.
pub trait EventBuilderConfigurer: Send + Sync {
    fn configure(&self, builder: &mut EventBuilder);

    /// Se invoca una vez, tras completar la cadena anidada para el elemento.
    fn event_completed(&self) {}
}

pub enum SplitElement {
    /// Valor simple: se envuelve en un mensaje nuevo.
    Value(TypedValue),
    /// Mensaje completo: se usa tal cual (conserva atributos).
    Message(Message),
    Configurer(Box<dyn EventBuilderConfigurer>),
}

impl SplitElement {
    pub fn value(value: impl Into<serde_json::Value>) -> Self {
        Self::Value(TypedValue::of(value))
    }
}

impl fmt::Debug for SplitElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(v) => f.debug_tuple("Value").field(v).finish(),
            Self::Message(m) => f.debug_tuple("Message").field(m).finish(),
            Self::Configurer(_) => f.write_str("Configurer(..)"),
        }
    }
}

/// Iterador de elementos de un split. Un `Err` al avanzar aborta la
/// iteración del evento fuente.
pub type SplitIter = Box<dyn Iterator<Item = Result<SplitElement, SplitError>> + Send + Sync>;

/// Callback de finalización de un elemento.
pub type CompletionCallback = Box<dyn FnOnce() + Send + Sync>;
