//! Builder de revisiones de `Event`.
//!
//! Todas las modificaciones sobre un evento pasan por aquí: el builder parte
//! de una copia del evento base y `build()` produce la nueva revisión. El
//! evento base nunca se muta.
use crate::model::{ContextKey, EventError, GroupCorrelation, ItemSequenceInfo, Message, TypedValue};

use super::Event;

#[derive(Debug, Clone)]
pub struct EventBuilder {
    event: Event,
}

impl EventBuilder {
    pub(crate) fn from_event(event: &Event) -> Self {
        Self { event: event.clone() }
    }

    pub(crate) fn from_owned(event: Event) -> Self {
        Self { event }
    }

    pub fn message(mut self, message: Message) -> Self {
        self.event.message = message;
        self
    }

    /// Reemplaza sólo el payload, conservando los atributos.
    pub fn payload(mut self, payload: TypedValue) -> Self {
        self.event.message.payload = payload;
        self
    }

    pub fn add_variable(mut self, name: impl Into<String>, value: TypedValue) -> Self {
        self.event.variables.insert(name.into(), value);
        self
    }

    pub fn remove_variable(mut self, name: &str) -> Self {
        self.event.variables.shift_remove(name);
        self
    }

    /// Variante `&mut` para callers que configuran el builder in situ
    /// (p.ej. `EventBuilderConfigurer`).
    pub fn set_variable(&mut self, name: impl Into<String>, value: TypedValue) {
        self.event.variables.insert(name.into(), value);
    }

    pub fn set_message(&mut self, message: Message) {
        self.event.message = message;
    }

    pub fn error(mut self, error: EventError) -> Self {
        self.event.error = Some(error);
        self
    }

    pub fn clear_error(mut self) -> Self {
        self.event.error = None;
        self
    }

    pub fn group_correlation(mut self, correlation: Option<GroupCorrelation>) -> Self {
        self.event.group_correlation = correlation;
        self
    }

    pub fn item_sequence(mut self, info: Option<ItemSequenceInfo>) -> Self {
        self.event.item_sequence = info;
        self
    }

    pub fn split_key(mut self, key: Option<ContextKey>) -> Self {
        self.event.split_key = key;
        self
    }

    /// Vista de sólo lectura del estado acumulado.
    pub fn peek(&self) -> &Event {
        &self.event
    }

    pub fn build(self) -> Event {
        self.event
    }
}
