//! Estructura `Event`: el mensaje lógico que atraviesa los routers.
//!
//! Rol en el flujo:
//! - Un `Event` es inmutable una vez publicado; cada cambio produce una nueva
//!   revisión vía [`EventBuilder`](super::EventBuilder).
//! - `id` identifica al evento lógico y se conserva entre revisiones.
//! - Las etiquetas `group_correlation` / `item_sequence` permiten reconstruir
//!   el orden original de ramas y elementos.
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::{ContextKey, EventError, GroupCorrelation, ItemSequenceInfo, Message, TypedValue};

use super::EventBuilder;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub(crate) id: Uuid,
    pub(crate) message: Message,
    pub(crate) variables: IndexMap<String, TypedValue>,
    pub(crate) error: Option<EventError>,
    pub(crate) group_correlation: Option<GroupCorrelation>,
    pub(crate) item_sequence: Option<ItemSequenceInfo>,
    pub(crate) split_key: Option<ContextKey>,
    pub(crate) created_at: DateTime<Utc>, // metadato, no participa en comparaciones
}

impl Event {
    /// Evento nuevo con el mensaje dado.
    pub fn new(message: Message) -> Self {
        Self { id: Uuid::new_v4(),
               message,
               variables: IndexMap::new(),
               error: None,
               group_correlation: None,
               item_sequence: None,
               split_key: None,
               created_at: Utc::now() }
    }

    /// Atajo: evento cuyo payload es `payload`.
    pub fn of(payload: impl Into<serde_json::Value>) -> Self {
        Self::new(Message::of(payload))
    }

    /// Builder para producir una nueva revisión de `event`.
    pub fn builder(event: &Event) -> EventBuilder {
        EventBuilder::from_event(event)
    }

    /// Equivalente a `Event::builder(&self)`, consumiendo el evento.
    pub fn into_builder(self) -> EventBuilder {
        EventBuilder::from_owned(self)
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn message(&self) -> &Message {
        &self.message
    }

    pub fn payload(&self) -> &TypedValue {
        &self.message.payload
    }

    pub fn variables(&self) -> &IndexMap<String, TypedValue> {
        &self.variables
    }

    pub fn variable(&self, name: &str) -> Option<&TypedValue> {
        self.variables.get(name)
    }

    pub fn error(&self) -> Option<&EventError> {
        self.error.as_ref()
    }

    pub fn group_correlation(&self) -> Option<GroupCorrelation> {
        self.group_correlation
    }

    pub fn item_sequence(&self) -> Option<ItemSequenceInfo> {
        self.item_sequence
    }

    pub fn split_key(&self) -> Option<ContextKey> {
        self.split_key
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
