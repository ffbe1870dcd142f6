//! Estado efímero de la iteración de un evento fuente.
//!
//! Invariantes:
//! - Un contexto pertenece a un único evento fuente en vuelo.
//! - Se crea en el split, se actualiza una vez por elemento y se elimina
//!   exactamente una vez (éxito, error o aborto).
use std::fmt;
use std::iter::Peekable;

use crate::errors::SplitError;
use crate::model::{ContextKey, ItemSequenceInfo, Message, TypedValue};

use super::split::{CompletionCallback, SplitElement, SplitIter};

pub struct ForeachContext {
    iterator: Peekable<SplitIter>,
    element_number: u64,
    previous_counter: Option<TypedValue>,
    previous_root_message: Option<TypedValue>,
    previous_split_key: Option<ContextKey>,
    original_message: Message,
    item_sequence: Option<ItemSequenceInfo>,
    on_complete: Option<CompletionCallback>,
}

impl ForeachContext {
    pub fn new(iterator: SplitIter, original_message: Message, item_sequence: Option<ItemSequenceInfo>) -> Self {
        Self { iterator: iterator.peekable(),
               element_number: 0,
               previous_counter: None,
               previous_root_message: None,
               previous_split_key: None,
               original_message,
               item_sequence,
               on_complete: None }
    }

    /// Valores previos de contador / mensaje raíz / clave de split, a
    /// restaurar al salir del loop (soporte de foreach anidados).
    pub fn with_previous(mut self,
                         counter: Option<TypedValue>,
                         root_message: Option<TypedValue>,
                         split_key: Option<ContextKey>)
                         -> Self {
        self.previous_counter = counter;
        self.previous_root_message = root_message;
        self.previous_split_key = split_key;
        self
    }

    pub fn has_next(&mut self) -> bool {
        self.iterator.peek().is_some()
    }

    /// Avanza al siguiente elemento e incrementa el número de elemento.
    /// `None` cuando el iterador está agotado.
    pub fn advance(&mut self) -> Option<Result<SplitElement, SplitError>> {
        let next = self.iterator.next()?;
        if next.is_ok() {
            self.element_number += 1;
        }
        Some(next)
    }

    /// Número (1-based) del último elemento emitido; 0 antes del primero.
    pub fn element_number(&self) -> u64 {
        self.element_number
    }

    pub fn previous_counter(&self) -> Option<&TypedValue> {
        self.previous_counter.as_ref()
    }

    pub fn previous_root_message(&self) -> Option<&TypedValue> {
        self.previous_root_message.as_ref()
    }

    pub fn previous_split_key(&self) -> Option<ContextKey> {
        self.previous_split_key
    }

    pub fn original_message(&self) -> &Message {
        &self.original_message
    }

    pub fn item_sequence(&self) -> Option<ItemSequenceInfo> {
        self.item_sequence
    }

    pub fn set_on_complete(&mut self, callback: CompletionCallback) {
        self.on_complete = Some(callback);
    }

    /// Retira el callback pendiente (se ejecuta a lo sumo una vez).
    pub fn take_on_complete(&mut self) -> Option<CompletionCallback> {
        self.on_complete.take()
    }
}

impl fmt::Debug for ForeachContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ForeachContext")
         .field("element_number", &self.element_number)
         .field("previous_counter", &self.previous_counter)
         .field("previous_split_key", &self.previous_split_key)
         .field("item_sequence", &self.item_sequence)
         .field("on_complete", &self.on_complete.is_some())
         .finish_non_exhaustive()
    }
}
