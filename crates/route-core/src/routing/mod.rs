//! Pares de ruteo, resultados por rama y agregación de errores.

mod composite;
mod pair;
mod result;

pub use composite::CompositeRoutingError;
pub use pair::{RouteOutcome, RoutingPair};
pub use result::{RouteFailure, RoutingResult};
