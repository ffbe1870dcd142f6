//! Registro concurrente `ContextKey -> ForeachContext`.
//!
//! Cada clave tiene un único dueño lógico (el evento fuente que la creó), por
//! lo que el mapa concurrente basta sin locks adicionales. Regla de uso:
//! nunca retener una referencia del mapa a través de un `.await`; por eso la
//! API sólo expone acceso mediante closures.
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use log::debug;

use crate::errors::RegistryError;
use crate::event::Event;
use crate::model::ContextKey;

use super::ForeachContext;

#[derive(Debug, Default)]
pub struct ContextRegistry {
    contexts: DashMap<ContextKey, ForeachContext>,
}

impl ContextRegistry {
    pub fn new() -> Self {
        Self { contexts: DashMap::new() }
    }

    /// Registra un contexto. Falla si la clave ya tiene dueño.
    pub fn insert(&self, key: ContextKey, context: ForeachContext) -> Result<(), RegistryError> {
        match self.contexts.entry(key) {
            Entry::Occupied(_) => Err(RegistryError::DuplicateContext(key)),
            Entry::Vacant(slot) => {
                slot.insert(context);
                debug!("registry:insert key={key}");
                Ok(())
            }
        }
    }

    /// Ejecuta `f` con acceso exclusivo al contexto de `key`.
    pub fn with_context<R>(&self, key: ContextKey, f: impl FnOnce(&mut ForeachContext) -> R) -> Result<R, RegistryError> {
        let mut entry = self.contexts.get_mut(&key).ok_or(RegistryError::MissingContext(key))?;
        Ok(f(entry.value_mut()))
    }

    /// Variante que resuelve la clave a partir del `split_key` del evento.
    pub fn with_event_context<R>(&self, event: &Event, f: impl FnOnce(&mut ForeachContext) -> R) -> Option<R> {
        let key = event.split_key()?;
        self.with_context(key, f).ok()
    }

    pub fn remove(&self, key: ContextKey) -> Option<ForeachContext> {
        let removed = self.contexts.remove(&key).map(|(_, ctx)| ctx);
        if removed.is_some() {
            debug!("registry:remove key={key}");
        }
        removed
    }

    pub fn contains(&self, key: ContextKey) -> bool {
        self.contexts.contains_key(&key)
    }

    pub fn len(&self) -> usize {
        self.contexts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contexts.is_empty()
    }
}
