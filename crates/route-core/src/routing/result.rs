//! `RoutingResult`: resultado inmutable de rutear un evento a N rutas.
//!
//! Los resultados se indexan por la clave de ruta (la secuencia 1-based de
//! la rama, como texto) y conservan el orden de inserción, que es el orden
//! original de las ramas.
use indexmap::IndexMap;

use crate::errors::RouteExecutionError;
use crate::model::{EventError, Message};

use super::RouteOutcome;

/// Fallo de una ruta: el error del evento y, si se pidió detalle, el error
/// de ruta que lo causó.
#[derive(Debug, Clone)]
pub struct RouteFailure {
    pub error: EventError,
    pub exception: Option<RouteExecutionError>,
}

#[derive(Debug, Clone, Default)]
pub struct RoutingResult {
    results: IndexMap<String, Message>,
    failures: IndexMap<String, RouteFailure>,
}

impl RoutingResult {
    pub fn new(results: IndexMap<String, Message>, failures: IndexMap<String, RouteFailure>) -> Self {
        Self { results, failures }
    }

    /// Construye el resultado a partir de los outcomes ya ordenados. Un
    /// evento con error cuenta como fallo aunque venga como `Success`.
    /// Con `detailed = false` se descarta el error de ruta causante.
    pub fn from_outcomes<I>(outcomes: I, detailed: bool) -> Self
        where I: IntoIterator<Item = RouteOutcome>
    {
        let mut results = IndexMap::new();
        let mut failures = IndexMap::new();
        for (index, outcome) in outcomes.into_iter().enumerate() {
            let key = outcome.event()
                             .group_correlation()
                             .map(|g| g.sequence)
                             .unwrap_or(index as u64 + 1)
                             .to_string();
            let (event, exception) = match outcome {
                RouteOutcome::Success(event) => (event, None),
                RouteOutcome::Failure { event, error } => (event, error),
            };
            match event.error() {
                Some(error) => {
                    failures.insert(key,
                                    RouteFailure { error: error.clone(),
                                                   exception: if detailed { exception } else { None } });
                }
                None => {
                    results.insert(key, event.message().clone());
                }
            }
        }
        Self { results, failures }
    }

    pub fn results(&self) -> &IndexMap<String, Message> {
        &self.results
    }

    pub fn failures(&self) -> &IndexMap<String, RouteFailure> {
        &self.failures
    }

    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}
