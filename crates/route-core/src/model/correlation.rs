//! Etiquetas de secuencia/correlación.
//!
//! - `GroupCorrelation`: posición de una rama dentro de un fork-join.
//! - `ItemSequenceInfo`: posición de un elemento dentro de un foreach.
//! - `ContextKey`: id explícito que correlaciona un evento con su
//!   `ForeachContext` en el registro (se genera en cada split).
use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Secuencia (1-based) de una rama y tamaño del grupo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupCorrelation {
    pub sequence: u64,
    pub group_size: Option<u64>,
}

impl GroupCorrelation {
    pub fn of(sequence: u64) -> Self {
        Self { sequence,
               group_size: None }
    }

    pub fn with_size(sequence: u64, group_size: u64) -> Self {
        Self { sequence,
               group_size: Some(group_size) }
    }
}

/// Posición (1-based) de un elemento dentro de un split.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemSequenceInfo {
    pub position: u64,
    pub size: Option<u64>,
}

impl ItemSequenceInfo {
    pub fn of(position: u64) -> Self {
        Self { position, size: None }
    }
}

/// Clave del registro de contextos de foreach.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContextKey(Uuid);

impl ContextKey {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ContextKey {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ContextKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
